//! # ply-reader
//!
//! A reader for PLY (Polygon File Format) files.
//! Parses the textual header into a schema of elements and properties, then
//! decodes `binary_little_endian` and `binary_big_endian` payloads into
//! records keyed by element and property name.
//!
//! **Note:** `ascii` payloads are recognized in the header but cannot be
//! decoded; [`PlyReader::read_data`] reports them as
//! [`PlyError::UnsupportedMode`].
//!
//! ```no_run
//! use ply_reader::PlyReader;
//!
//! let data = PlyReader::open("mesh.ply", false)?.read_data()?;
//! for vertex in data.element("vertex")? {
//!     let x = vertex.scalar("x")?.to_f64();
//!     println!("{}", x);
//! }
//! # Ok::<(), ply_reader::PlyError>(())
//! ```
pub mod ply;

// Re-export the main types for convenience
pub use ply::{
    PlyError, PlyReader, Result, read_bytes,
    format::decoder::{DocumentDecoder, ElementDecoder, PropertyDecoder},
    source::{BorrowedSource, ByteSource, FileSource},
    types::models::{
        ElementSchema, Endianness, FileFormat, PlyData, PlyHeader, PropertySchema, Record, Scalar,
        ScalarType, Value,
    },
};
