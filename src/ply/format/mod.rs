//! File format parsing layer for PLY files.
//!
//! This module sits between raw input (see [`source`](crate::ply::source))
//! and the high-level [`PlyReader`](crate::ply::reader::PlyReader).
//!
//! # Module Organization
//!
//! - [`header`]: Parses the textual header into element/property schemas
//! - [`decoder`]: Compiles schemas into decoders and decodes binary payloads
//!
//! # Architecture
//!
//! ```text
//! File Structure:
//! ┌─────────────────┐
//! │  ply            │
//! │  format ...     │ ← header::parse()
//! │  element ...    │
//! │  property ...   │
//! │  end_header     │
//! ├─────────────────┤
//! │  element 0 recs │ ← decoder::DocumentDecoder::decode()
//! │  element 1 recs │
//! │  ...            │
//! └─────────────────┘
//! ```

pub mod decoder;
pub mod header;
