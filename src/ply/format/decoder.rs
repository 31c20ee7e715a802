//! # Payload Decoding
//!
//! Turns a binary payload into records using a schema discovered at runtime.
//! Decoders are compiled once per header and are stateless afterwards, so
//! the same [`DocumentDecoder`] can decode any number of payloads from any
//! thread.
//!
//! ## Layers
//! 1.  **[`PropertyDecoder`]**: one scalar, or one length-prefixed list.
//! 2.  **[`ElementDecoder`]**: applies its property decoders in declaration
//!     order to build one record, repeated `count` times.
//! 3.  **[`DocumentDecoder`]**: runs every element decoder in declaration
//!     order over a single payload.
//!
//! A single byte offset is threaded through every read. Each step starts
//! exactly where the previous one stopped: no padding, alignment or seeking.

use std::sync::Arc;

use log::{debug, trace};

use crate::ply::codec::scalar;
use crate::ply::types::error::{PlyError, Result};
use crate::ply::types::models::{
    ElementSchema, Endianness, PlyData, PlyHeader, PropertySchema, Record, RecordLayout, Scalar,
    ScalarType, Value,
};

/// Why a single property read failed, before element context is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    OutOfBounds {
        offset: usize,
        requested: usize,
        available: usize,
    },
    NegativeCount {
        offset: usize,
        count: i64,
    },
}

/// Decoder for one property, compiled from its schema and the document's
/// byte order.
#[derive(Debug, Clone)]
pub struct PropertyDecoder {
    name: String,
    shape: Shape,
    endianness: Endianness,
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    Scalar(ScalarType),
    List {
        count_type: ScalarType,
        item_type: ScalarType,
    },
}

impl PropertyDecoder {
    pub fn new(schema: &PropertySchema, endianness: Endianness) -> Self {
        let shape = match *schema {
            PropertySchema::Scalar { data_type, .. } => Shape::Scalar(data_type),
            PropertySchema::List {
                count_type,
                item_type,
                ..
            } => Shape::List {
                count_type,
                item_type,
            },
        };
        Self {
            name: schema.name().to_string(),
            shape,
            endianness,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decodes one value at `offset`, returning it with the offset of the
    /// next unread byte.
    fn decode(&self, data: &[u8], offset: usize) -> std::result::Result<(Value, usize), Fault> {
        match self.shape {
            Shape::Scalar(data_type) => {
                let (value, next) = self.read_scalar(data, offset, data_type)?;
                Ok((Value::Scalar(value), next))
            }
            Shape::List {
                count_type,
                item_type,
            } => {
                let (count, start) = self.read_scalar(data, offset, count_type)?;
                let count = count.to_i64().unwrap_or_else(|| count.to_f64() as i64);
                let count = usize::try_from(count).map_err(|_| Fault::NegativeCount { offset, count })?;

                // Validate the untrusted length before allocating for it.
                let width = item_type.width();
                let available = data.len().saturating_sub(start);
                let requested = count.saturating_mul(width);
                if requested > available {
                    return Err(Fault::OutOfBounds {
                        offset: start,
                        requested,
                        available,
                    });
                }

                let end = start + requested;
                let items = data[start..end]
                    .chunks_exact(width)
                    .map(|chunk| scalar::decode(item_type, self.endianness, chunk))
                    .collect::<Option<Vec<_>>>()
                    .ok_or(Fault::OutOfBounds {
                        offset: start,
                        requested,
                        available,
                    })?;
                Ok((Value::List(items), end))
            }
        }
    }

    fn read_scalar(
        &self,
        data: &[u8],
        offset: usize,
        data_type: ScalarType,
    ) -> std::result::Result<(Scalar, usize), Fault> {
        let width = data_type.width();
        let available = data.len().saturating_sub(offset);
        let out_of_bounds = Fault::OutOfBounds {
            offset,
            requested: width,
            available,
        };
        if width > available {
            return Err(out_of_bounds);
        }
        let value = scalar::decode(data_type, self.endianness, &data[offset..]).ok_or(out_of_bounds)?;
        Ok((value, offset + width))
    }
}

/// Decoder for every record of one element.
#[derive(Debug, Clone)]
pub struct ElementDecoder {
    layout: Arc<RecordLayout>,
    count: usize,
    properties: Vec<PropertyDecoder>,
    min_record_width: usize,
}

impl ElementDecoder {
    pub fn new(schema: &ElementSchema, endianness: Endianness) -> Self {
        let layout = RecordLayout {
            element: schema.name.clone(),
            properties: schema.properties.iter().map(|p| p.name().to_string()).collect(),
        };
        Self {
            layout: Arc::new(layout),
            count: schema.count,
            properties: schema
                .properties
                .iter()
                .map(|p| PropertyDecoder::new(p, endianness))
                .collect(),
            min_record_width: schema.properties.iter().map(PropertySchema::min_width).sum(),
        }
    }

    pub fn name(&self) -> &str {
        &self.layout.element
    }

    /// Number of records this decoder reads.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Decodes one record at `offset`.
    pub fn decode_record(&self, data: &[u8], offset: usize) -> Result<(Record, usize)> {
        let mut offset = offset;
        let mut values = Vec::with_capacity(self.properties.len());
        for property in &self.properties {
            let (value, next) = property
                .decode(data, offset)
                .map_err(|fault| self.error(property, fault))?;
            values.push(value);
            offset = next;
        }
        Ok((Record::new(Arc::clone(&self.layout), values), offset))
    }

    /// Decodes all `count` records starting at `offset`.
    pub fn decode(&self, data: &[u8], offset: usize) -> Result<(Vec<Record>, usize)> {
        // The declared count is untrusted: never reserve more records than
        // the remaining bytes could possibly hold.
        let remaining = data.len().saturating_sub(offset);
        let capacity = match self.min_record_width {
            // Records without properties read nothing, so the payload cannot
            // bound their number. Cap it at one record per remaining byte.
            0 if self.count > remaining => {
                return Err(PlyError::UnboundedElement {
                    element: self.name().to_string(),
                    count: self.count,
                    available: remaining,
                });
            }
            0 => self.count,
            width => self.count.min(remaining / width),
        };

        let mut records = Vec::with_capacity(capacity);
        let mut offset = offset;
        for _ in 0..self.count {
            let (record, next) = self.decode_record(data, offset)?;
            records.push(record);
            offset = next;
        }
        Ok((records, offset))
    }

    fn error(&self, property: &PropertyDecoder, fault: Fault) -> PlyError {
        match fault {
            Fault::OutOfBounds {
                offset,
                requested,
                available,
            } => PlyError::Truncated {
                element: self.name().to_string(),
                property: property.name().to_string(),
                offset,
                requested,
                available,
            },
            Fault::NegativeCount { offset, count } => PlyError::InvalidListCount {
                element: self.name().to_string(),
                property: property.name().to_string(),
                offset,
                count,
            },
        }
    }
}

/// Decoder for a whole payload, compiled once from a parsed header.
#[derive(Debug, Clone)]
pub struct DocumentDecoder {
    elements: Vec<ElementDecoder>,
}

impl DocumentDecoder {
    /// Compiles decoders for every element of `header`.
    ///
    /// # Errors
    /// [`PlyError::UnsupportedMode`] if the header declares an ASCII payload.
    pub fn new(header: &PlyHeader) -> Result<Self> {
        let endianness = header
            .format
            .endianness()
            .ok_or(PlyError::UnsupportedMode(header.format))?;
        Ok(Self {
            elements: header
                .elements
                .iter()
                .map(|e| ElementDecoder::new(e, endianness))
                .collect(),
        })
    }

    pub fn elements(&self) -> &[ElementDecoder] {
        &self.elements
    }

    /// Decodes `payload`, which must start at the first byte after the
    /// header. Bytes after the last element are left unread.
    pub fn decode(&self, payload: &[u8]) -> Result<PlyData> {
        let mut offset = 0;
        let mut elements = Vec::with_capacity(self.elements.len());
        for element in &self.elements {
            trace!(
                "Decoding {} x '{}' at payload offset {}",
                element.count(),
                element.name(),
                offset
            );
            let (records, next) = element.decode(payload, offset)?;
            elements.push((Arc::clone(&element.layout), records));
            offset = next;
        }

        if offset < payload.len() {
            debug!(
                "{} trailing payload bytes after the last element",
                payload.len() - offset
            );
        }
        Ok(PlyData::new(elements, offset))
    }
}
