use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The owning entity every ingested file record is attached to.
///
/// Bound to the orchestrator before any ingestion call and not reassignable
/// mid-run. The surrounding system owns the item lifecycle; the pipeline only
/// references it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub title: Option<String>,
}

impl Item {
    pub fn new(id: Uuid) -> Self {
        Item { id, title: None }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
