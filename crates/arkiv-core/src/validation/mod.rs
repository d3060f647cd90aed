//! Validation modules

pub mod filename;

pub use filename::{
    sanitize_filename, validate_file_extension, validate_file_size, MAX_FILENAME_LENGTH,
};
