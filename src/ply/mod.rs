//! Core PLY reader module

pub mod codec;
pub mod format;
pub mod reader;
pub mod source;
pub mod types;
mod utils;

pub use reader::{PlyReader, read_bytes};
pub use types::error::{PlyError, Result};
