//! Core data structures for PLY schemas and decoded payloads.
//!
//! This module defines the fundamental types used throughout the library:
//! - The header schema (format tag, elements, properties, scalar types)
//! - Decoded values, records and documents

use std::fmt;
use std::sync::Arc;

use super::error::{PlyError, Result};

/// Byte order used for every binary scalar in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

/// Document-wide payload encoding declared by the `format` header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl FileFormat {
    /// Maps a header format name to its tag.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ascii" => Some(Self::Ascii),
            "binary_little_endian" => Some(Self::BinaryLittleEndian),
            "binary_big_endian" => Some(Self::BinaryBigEndian),
            _ => None,
        }
    }

    /// The name used for this format in a PLY header.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::BinaryLittleEndian => "binary_little_endian",
            Self::BinaryBigEndian => "binary_big_endian",
        }
    }

    /// Byte order of the payload, or `None` for textual payloads.
    pub fn endianness(&self) -> Option<Endianness> {
        match self {
            Self::Ascii => None,
            Self::BinaryLittleEndian => Some(Endianness::Little),
            Self::BinaryBigEndian => Some(Endianness::Big),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the eight fixed-width numeric encodings a property may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    Float32,
    Float64,
}

impl ScalarType {
    /// Resolves a header type token.
    ///
    /// Both the classic names (`uchar`, `int`, `float`, ...) and the sized
    /// names (`uint8`, `int32`, `float32`, ...) are accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "uchar" | "uint8" => Some(Self::UInt8),
            "char" | "int8" => Some(Self::Int8),
            "ushort" | "uint16" => Some(Self::UInt16),
            "short" | "int16" => Some(Self::Int16),
            "uint" | "uint32" => Some(Self::UInt32),
            "int" | "int32" => Some(Self::Int32),
            "float" | "float32" => Some(Self::Float32),
            "double" | "float64" => Some(Self::Float64),
            _ => None,
        }
    }

    /// Classic header name of this type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UInt8 => "uchar",
            Self::Int8 => "char",
            Self::UInt16 => "ushort",
            Self::Int16 => "short",
            Self::UInt32 => "uint",
            Self::Int32 => "int",
            Self::Float32 => "float",
            Self::Float64 => "double",
        }
    }

    /// Number of bytes one binary value of this type occupies.
    pub fn width(&self) -> usize {
        match self {
            Self::UInt8 | Self::Int8 => 1,
            Self::UInt16 | Self::Int16 => 2,
            Self::UInt32 | Self::Int32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    pub fn is_integer(&self) -> bool {
        !matches!(self, Self::Float32 | Self::Float64)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declaration of a single property of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertySchema {
    Scalar {
        name: String,
        data_type: ScalarType,
    },
    /// A variable-length list, prefixed in the payload by its length
    /// encoded as `count_type`.
    List {
        name: String,
        count_type: ScalarType,
        item_type: ScalarType,
    },
}

impl PropertySchema {
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar { name, .. } | Self::List { name, .. } => name,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List { .. })
    }

    /// Smallest number of payload bytes one value of this property can take.
    ///
    /// An empty list still carries its length prefix.
    pub fn min_width(&self) -> usize {
        match self {
            Self::Scalar { data_type, .. } => data_type.width(),
            Self::List { count_type, .. } => count_type.width(),
        }
    }
}

impl fmt::Display for PropertySchema {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Scalar { name, data_type } => write!(f, "property: {} [{}]", name, data_type),
            Self::List { name, item_type, .. } => {
                write!(f, "property: {} [list of {}]", name, item_type)
            }
        }
    }
}

/// A named, repeated record type declared in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSchema {
    pub name: String,
    /// Number of records stored in the payload for this element.
    pub count: usize,
    pub properties: Vec<PropertySchema>,
}

impl ElementSchema {
    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.iter().find(|p| p.name() == name)
    }
}

impl fmt::Display for ElementSchema {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "element: {} [{}]", self.name, self.count)?;
        for property in &self.properties {
            write!(f, "\n\t{}", property)?;
        }
        Ok(())
    }
}

/// Complete parsed header of a PLY file.
///
/// Built once per file and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PlyHeader {
    pub format: FileFormat,
    pub version: f32,
    /// Elements in declaration order, which is also payload order.
    pub elements: Vec<ElementSchema>,
    /// Text of every `comment` line, in order.
    pub comments: Vec<String>,
    /// Text of every `obj_info` line, in order.
    pub obj_info: Vec<String>,
}

impl PlyHeader {
    pub fn element(&self, name: &str) -> Option<&ElementSchema> {
        self.elements.iter().find(|e| e.name == name)
    }
}

/// A single decoded binary value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    UInt8(u8),
    Int8(i8),
    UInt16(u16),
    Int16(i16),
    UInt32(u32),
    Int32(i32),
    Float32(f32),
    Float64(f64),
}

impl Scalar {
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Self::UInt8(_) => ScalarType::UInt8,
            Self::Int8(_) => ScalarType::Int8,
            Self::UInt16(_) => ScalarType::UInt16,
            Self::Int16(_) => ScalarType::Int16,
            Self::UInt32(_) => ScalarType::UInt32,
            Self::Int32(_) => ScalarType::Int32,
            Self::Float32(_) => ScalarType::Float32,
            Self::Float64(_) => ScalarType::Float64,
        }
    }

    /// Widens the value to `f64`. Lossless for every type.
    pub fn to_f64(&self) -> f64 {
        match *self {
            Self::UInt8(v) => f64::from(v),
            Self::Int8(v) => f64::from(v),
            Self::UInt16(v) => f64::from(v),
            Self::Int16(v) => f64::from(v),
            Self::UInt32(v) => f64::from(v),
            Self::Int32(v) => f64::from(v),
            Self::Float32(v) => f64::from(v),
            Self::Float64(v) => v,
        }
    }

    /// Widens an integer value to `i64`; `None` for floating point values.
    pub fn to_i64(&self) -> Option<i64> {
        match *self {
            Self::UInt8(v) => Some(i64::from(v)),
            Self::Int8(v) => Some(i64::from(v)),
            Self::UInt16(v) => Some(i64::from(v)),
            Self::Int16(v) => Some(i64::from(v)),
            Self::UInt32(v) => Some(i64::from(v)),
            Self::Int32(v) => Some(i64::from(v)),
            Self::Float32(_) | Self::Float64(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UInt8(v) => write!(f, "{}", v),
            Self::Int8(v) => write!(f, "{}", v),
            Self::UInt16(v) => write!(f, "{}", v),
            Self::Int16(v) => write!(f, "{}", v),
            Self::UInt32(v) => write!(f, "{}", v),
            Self::Int32(v) => write!(f, "{}", v),
            Self::Float32(v) => write!(f, "{}", v),
            Self::Float64(v) => write!(f, "{}", v),
        }
    }
}

/// Decoded value of one property of one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::List(_) => "list",
        }
    }

    pub fn as_scalar(&self) -> Result<Scalar> {
        match self {
            Self::Scalar(s) => Ok(*s),
            other => Err(PlyError::TypeMismatch {
                expected: "scalar",
                found: other.kind(),
            }),
        }
    }

    pub fn as_list(&self) -> Result<&[Scalar]> {
        match self {
            Self::List(items) => Ok(items),
            other => Err(PlyError::TypeMismatch {
                expected: "list",
                found: other.kind(),
            }),
        }
    }

    /// Reads a list of integers, e.g. a face's `vertex_index`.
    pub fn to_indices(&self) -> Result<Vec<i64>> {
        self.as_list()?
            .iter()
            .map(|s| {
                s.to_i64().ok_or(PlyError::TypeMismatch {
                    expected: "integer",
                    found: "float",
                })
            })
            .collect()
    }
}

/// Property names of an element, shared by all of its records.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct RecordLayout {
    pub element: String,
    pub properties: Vec<String>,
}

impl RecordLayout {
    /// Index of `property` in declaration order.
    pub fn position(&self, property: &str) -> Result<usize> {
        self.properties
            .iter()
            .position(|name| name == property)
            .ok_or_else(|| PlyError::MissingProperty {
                element: self.element.clone(),
                property: property.to_string(),
            })
    }
}

/// Decoded values of one element instance, keyed by property name in
/// declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    layout: Arc<RecordLayout>,
    values: Vec<Value>,
}

impl Record {
    pub(crate) fn new(layout: Arc<RecordLayout>, values: Vec<Value>) -> Self {
        debug_assert_eq!(layout.properties.len(), values.len());
        Self { layout, values }
    }

    /// Name of the element this record belongs to.
    pub fn element(&self) -> &str {
        &self.layout.element
    }

    /// Looks up a property value by name.
    pub fn get(&self, property: &str) -> Result<&Value> {
        let idx = self.layout.position(property)?;
        Ok(&self.values[idx])
    }

    /// Shortcut for `get(property)?.as_scalar()`.
    pub fn scalar(&self, property: &str) -> Result<Scalar> {
        self.get(property)?.as_scalar()
    }

    /// `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.layout
            .properties
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layout.properties.iter().map(String::as_str)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All property values as one numeric row (e.g. a vertex's `x y z`).
    ///
    /// Fails if the record holds a list property.
    pub fn to_f64_row(&self) -> Result<Vec<f64>> {
        self.values
            .iter()
            .map(|v| v.as_scalar().map(|s| s.to_f64()))
            .collect()
    }
}

/// Decoded payload: every element's records, in declaration order.
///
/// Each element keeps its property layout, so lookups on an element with
/// no records are still checked against its declared properties.
#[derive(Debug, Clone, PartialEq)]
pub struct PlyData {
    elements: Vec<(Arc<RecordLayout>, Vec<Record>)>,
    bytes_consumed: usize,
}

impl PlyData {
    pub(crate) fn new(elements: Vec<(Arc<RecordLayout>, Vec<Record>)>, bytes_consumed: usize) -> Self {
        Self {
            elements,
            bytes_consumed,
        }
    }

    fn entry(&self, name: &str) -> Result<&(Arc<RecordLayout>, Vec<Record>)> {
        self.elements
            .iter()
            .find(|(layout, _)| layout.element == name)
            .ok_or_else(|| PlyError::MissingElement(name.to_string()))
    }

    /// Records of the named element.
    pub fn element(&self, name: &str) -> Result<&[Record]> {
        self.entry(name).map(|(_, records)| records.as_slice())
    }

    /// Declared property names of the named element, in order.
    pub fn properties(&self, element: &str) -> Result<impl Iterator<Item = &str>> {
        let (layout, _) = self.entry(element)?;
        Ok(layout.properties.iter().map(String::as_str))
    }

    /// One property's values across all records of an element.
    pub fn column(&self, element: &str, property: &str) -> Result<Vec<&Value>> {
        let (layout, records) = self.entry(element)?;
        let idx = layout.position(property)?;
        Ok(records.iter().map(|record| &record.values[idx]).collect())
    }

    /// `(element name, records)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Record])> {
        self.elements
            .iter()
            .map(|(layout, records)| (layout.element.as_str(), records.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|(layout, _)| layout.element.as_str())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Payload bytes read by the decoder. Anything past this offset is
    /// trailing data that no element claims.
    pub fn bytes_consumed(&self) -> usize {
        self.bytes_consumed
    }
}
