//! Binary encoding of the eight PLY scalar types.
//!
//! Every value is a fixed-width IEEE / two's-complement encoding whose byte
//! order is chosen once per document by its format tag.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::ply::types::models::{Endianness, Scalar, ScalarType};

/// Decodes one value of `data_type` from the start of `bytes`.
///
/// Reads exactly `data_type.width()` bytes. Returns `None` if `bytes` is
/// shorter than that; callers bounds-check beforehand to report context.
pub fn decode(data_type: ScalarType, endianness: Endianness, bytes: &[u8]) -> Option<Scalar> {
    let bytes = bytes.get(..data_type.width())?;
    let value = match endianness {
        Endianness::Little => decode_with::<LittleEndian>(data_type, bytes),
        Endianness::Big => decode_with::<BigEndian>(data_type, bytes),
    };
    Some(value)
}

fn decode_with<B: ByteOrder>(data_type: ScalarType, bytes: &[u8]) -> Scalar {
    match data_type {
        ScalarType::UInt8 => Scalar::UInt8(bytes[0]),
        ScalarType::Int8 => Scalar::Int8(bytes[0] as i8),
        ScalarType::UInt16 => Scalar::UInt16(B::read_u16(bytes)),
        ScalarType::Int16 => Scalar::Int16(B::read_i16(bytes)),
        ScalarType::UInt32 => Scalar::UInt32(B::read_u32(bytes)),
        ScalarType::Int32 => Scalar::Int32(B::read_i32(bytes)),
        ScalarType::Float32 => Scalar::Float32(B::read_f32(bytes)),
        ScalarType::Float64 => Scalar::Float64(B::read_f64(bytes)),
    }
}

/// Appends the binary encoding of `value` to `out`.
///
/// Used to build payloads for tests and tooling; the reader itself never
/// writes.
pub fn encode(value: Scalar, endianness: Endianness, out: &mut Vec<u8>) {
    match endianness {
        Endianness::Little => encode_with::<LittleEndian>(value, out),
        Endianness::Big => encode_with::<BigEndian>(value, out),
    }
}

fn encode_with<B: ByteOrder>(value: Scalar, out: &mut Vec<u8>) {
    let mut buf = [0u8; 8];
    match value {
        Scalar::UInt8(v) => buf[0] = v,
        Scalar::Int8(v) => buf[0] = v as u8,
        Scalar::UInt16(v) => B::write_u16(&mut buf, v),
        Scalar::Int16(v) => B::write_i16(&mut buf, v),
        Scalar::UInt32(v) => B::write_u32(&mut buf, v),
        Scalar::Int32(v) => B::write_i32(&mut buf, v),
        Scalar::Float32(v) => B::write_f32(&mut buf, v),
        Scalar::Float64(v) => B::write_f64(&mut buf, v),
    }
    out.extend_from_slice(&buf[..value.scalar_type().width()]);
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[Scalar] = &[
        Scalar::UInt8(200),
        Scalar::Int8(-7),
        Scalar::UInt16(0xBEEF),
        Scalar::Int16(-12345),
        Scalar::UInt32(0xDEAD_BEEF),
        Scalar::Int32(-2_000_000_000),
        Scalar::Float32(1.5),
        Scalar::Float64(-0.125),
    ];

    #[test]
    fn encoded_width_matches_type_table() {
        for endianness in [Endianness::Little, Endianness::Big] {
            for &sample in SAMPLES {
                let mut out = Vec::new();
                encode(sample, endianness, &mut out);
                assert_eq!(
                    out.len(),
                    sample.scalar_type().width(),
                    "width mismatch for {:?}",
                    sample
                );
                assert_eq!(decode(sample.scalar_type(), endianness, &out), Some(sample));
            }
        }
    }

    #[test]
    fn byte_order_is_respected() {
        let bytes = [0x01, 0x02];
        assert_eq!(
            decode(ScalarType::UInt16, Endianness::Little, &bytes),
            Some(Scalar::UInt16(0x0201))
        );
        assert_eq!(
            decode(ScalarType::UInt16, Endianness::Big, &bytes),
            Some(Scalar::UInt16(0x0102))
        );
        assert_eq!(
            decode(ScalarType::Float32, Endianness::Big, &[0x3F, 0x80, 0x00, 0x00]),
            Some(Scalar::Float32(1.0))
        );
    }

    #[test]
    fn decode_reads_only_the_type_width() {
        let bytes = [0xFF, 0x00, 0x00, 0x00, 0x99];
        assert_eq!(
            decode(ScalarType::Int32, Endianness::Little, &bytes),
            Some(Scalar::Int32(255))
        );
        assert_eq!(
            decode(ScalarType::Int8, Endianness::Little, &bytes),
            Some(Scalar::Int8(-1))
        );
    }

    #[test]
    fn short_input_is_rejected() {
        assert_eq!(decode(ScalarType::Float64, Endianness::Little, &[0; 7]), None);
        assert_eq!(decode(ScalarType::UInt8, Endianness::Big, &[]), None);
    }
}
