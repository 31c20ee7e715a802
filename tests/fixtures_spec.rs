use ply_reader::ply::codec::scalar;
use ply_reader::{
    Endianness, FileFormat, PlyError, PlyReader, Scalar, ScalarType, Value, read_bytes,
};
use std::fs;
use std::io::{BufReader, Cursor, Read};

const VERTEX_HEADER: &str = "ply\n\
    format binary_little_endian 1.0\n\
    element vertex 2\n\
    property float x\n\
    property float y\n\
    property float z\n\
    end_header\n";

const FACE_HEADER: &str = "ply\n\
    format binary_little_endian 1.0\n\
    element face 1\n\
    property list uchar int vertex_index\n\
    end_header\n";

fn encode_all(values: &[Scalar], endianness: Endianness) -> Vec<u8> {
    let mut out = Vec::new();
    for &value in values {
        scalar::encode(value, endianness, &mut out);
    }
    out
}

fn document(header: &str, payload: &[u8]) -> Vec<u8> {
    let mut data = header.as_bytes().to_vec();
    data.extend_from_slice(payload);
    data
}

fn vertex_payload() -> Vec<u8> {
    let coords = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0].map(Scalar::Float32);
    encode_all(&coords, Endianness::Little)
}

/// Header and payload of a mesh using every scalar type and two lists.
fn mixed_document(endianness: Endianness) -> (Vec<u8>, usize) {
    let format = match endianness {
        Endianness::Little => "binary_little_endian",
        Endianness::Big => "binary_big_endian",
    };
    let header = format!(
        "ply\n\
         format {} 1.0\n\
         comment every scalar type\n\
         element sample 2\n\
         property uchar a\n\
         property char b\n\
         property ushort c\n\
         property short d\n\
         property uint e\n\
         property int f\n\
         property float g\n\
         property double h\n\
         element face 2\n\
         property list ushort uint vertex_index\n\
         property list uchar double weights\n\
         end_header\n",
        format
    );

    let mut values = Vec::new();
    for i in 0..2u8 {
        values.extend_from_slice(&[
            Scalar::UInt8(250 + i),
            Scalar::Int8(-1 - i as i8),
            Scalar::UInt16(60_000 + u16::from(i)),
            Scalar::Int16(-30_000 + i16::from(i)),
            Scalar::UInt32(4_000_000_000 + u32::from(i)),
            Scalar::Int32(-2_000_000_000 + i32::from(i)),
            Scalar::Float32(0.5 + f32::from(i)),
            Scalar::Float64(-1.25 - f64::from(i)),
        ]);
    }
    // face 0: three indices, one weight; face 1: empty lists
    values.extend_from_slice(&[
        Scalar::UInt16(3),
        Scalar::UInt32(7),
        Scalar::UInt32(8),
        Scalar::UInt32(9),
        Scalar::UInt8(1),
        Scalar::Float64(0.75),
        Scalar::UInt16(0),
        Scalar::UInt8(0),
    ]);
    let payload = encode_all(&values, endianness);
    let expected_len = 2 * (1 + 1 + 2 + 2 + 4 + 4 + 4 + 8) + (2 + 3 * 4 + 1 + 8) + (2 + 1);
    assert_eq!(payload.len(), expected_len, "fixture payload size");
    (document(&header, &payload), payload.len())
}

#[test]
fn scenario_a_vertex_triples() {
    let data = document(VERTEX_HEADER, &vertex_payload());
    let (header, decoded) = read_bytes(&data).expect("decode vertices");

    assert_eq!(header.format, FileFormat::BinaryLittleEndian);
    let vertices = decoded.element("vertex").expect("vertex element");
    assert_eq!(vertices.len(), 2);

    let rows: Vec<Vec<f64>> = vertices
        .iter()
        .map(|v| v.to_f64_row().expect("numeric row"))
        .collect();
    assert_eq!(rows, vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);

    let names: Vec<&str> = vertices[0].names().collect();
    assert_eq!(names, ["x", "y", "z"], "property order must follow the header");
    assert_eq!(vertices[1].scalar("y").unwrap(), Scalar::Float32(5.0));
    assert_eq!(decoded.bytes_consumed(), 24);
}

#[test]
fn scenario_b_face_list() {
    let payload = [3, 0, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0];
    let data = document(FACE_HEADER, &payload);
    let (_, decoded) = read_bytes(&data).expect("decode faces");

    let faces = decoded.element("face").expect("face element");
    assert_eq!(faces.len(), 1);
    assert_eq!(
        faces[0].get("vertex_index").unwrap(),
        &Value::List(vec![Scalar::Int32(0), Scalar::Int32(1), Scalar::Int32(2)])
    );
    assert_eq!(faces[0].get("vertex_index").unwrap().to_indices().unwrap(), vec![0, 1, 2]);
    assert_eq!(decoded.bytes_consumed(), payload.len());
}

#[test]
fn scenario_c_wrong_magic_case() {
    let data = document(&VERTEX_HEADER.replacen("ply", "PLY", 1), &vertex_payload());
    let err = read_bytes(&data).unwrap_err();
    assert!(err.is_format_error(), "expected a format error, got {:?}", err);
    assert!(matches!(err, PlyError::InvalidFormat { line: 1, .. }), "got {:?}", err);
}

#[test]
fn scenario_d_ascii_header_parses_but_payload_does_not() {
    let text = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nend_header\n1.0\n";
    let mut cursor = Cursor::new(text.as_bytes());
    let reader = PlyReader::from_reader(&mut cursor, false).expect("ascii header should parse");
    assert_eq!(reader.header().format, FileFormat::Ascii);
    assert_eq!(reader.header().elements[0].name, "vertex");

    let err = reader.read_data().unwrap_err();
    assert!(
        matches!(err, PlyError::UnsupportedMode(FileFormat::Ascii)),
        "got {:?}",
        err
    );
}

#[test]
fn every_scalar_type_in_both_byte_orders() {
    for endianness in [Endianness::Little, Endianness::Big] {
        let (data, payload_len) = mixed_document(endianness);
        let (header, decoded) = read_bytes(&data).expect("decode mixed document");
        assert_eq!(header.comments, vec!["every scalar type"]);
        assert_eq!(decoded.bytes_consumed(), payload_len, "cursor must end at payload end");

        let samples = decoded.element("sample").unwrap();
        assert_eq!(samples[1].scalar("a").unwrap(), Scalar::UInt8(251));
        assert_eq!(samples[1].scalar("b").unwrap(), Scalar::Int8(-2));
        assert_eq!(samples[0].scalar("c").unwrap(), Scalar::UInt16(60_000));
        assert_eq!(samples[0].scalar("d").unwrap(), Scalar::Int16(-30_000));
        assert_eq!(samples[1].scalar("e").unwrap(), Scalar::UInt32(4_000_000_001));
        assert_eq!(samples[0].scalar("f").unwrap(), Scalar::Int32(-2_000_000_000));
        assert_eq!(samples[1].scalar("g").unwrap(), Scalar::Float32(1.5));
        assert_eq!(samples[1].scalar("h").unwrap(), Scalar::Float64(-2.25));

        let faces = decoded.element("face").unwrap();
        assert_eq!(
            faces[0].get("vertex_index").unwrap().to_indices().unwrap(),
            vec![7, 8, 9]
        );
        assert_eq!(
            faces[0].get("weights").unwrap().as_list().unwrap(),
            &[Scalar::Float64(0.75)]
        );
        assert!(faces[1].get("vertex_index").unwrap().as_list().unwrap().is_empty());
        assert!(faces[1].get("weights").unwrap().as_list().unwrap().is_empty());
    }
}

#[test]
fn cursor_advances_by_exact_property_widths() {
    let (data, payload_len) = mixed_document(Endianness::Little);
    let (header, offset) = ply_reader::ply::format::header::parse_bytes(&data).unwrap();
    let decoder = ply_reader::DocumentDecoder::new(&header).unwrap();
    let payload = &data[offset..];
    assert_eq!(payload.len(), payload_len);

    let elements = decoder.elements();
    let (samples, after_samples) = elements[0].decode(payload, 0).unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(after_samples, 2 * 26, "fixed-width records: 26 bytes each");

    let (_, after_first_face) = elements[1].decode_record(payload, after_samples).unwrap();
    assert_eq!(after_first_face, after_samples + 2 + 3 * 4 + 1 + 8);

    let (faces, end) = elements[1].decode(payload, after_samples).unwrap();
    assert_eq!(faces.len(), 2);
    assert_eq!(end, payload.len());
}

#[test]
fn payload_one_byte_short_is_truncation() {
    for (header, payload) in [
        (VERTEX_HEADER, vertex_payload()),
        (FACE_HEADER, vec![3, 0, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0]),
    ] {
        let full = document(header, &payload);
        read_bytes(&full).expect("complete payload decodes");

        let short = &full[..full.len() - 1];
        let err = read_bytes(short).unwrap_err();
        assert!(err.is_truncation(), "expected truncation, got {:?}", err);
    }

    let (data, _) = mixed_document(Endianness::Big);
    let err = read_bytes(&data[..data.len() - 1]).unwrap_err();
    match err {
        PlyError::Truncated {
            element,
            property,
            requested,
            available,
            ..
        } => {
            assert_eq!(element, "face");
            assert_eq!(property, "weights");
            assert_eq!(requested, 1);
            assert_eq!(available, 0);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn empty_payload_with_declared_records_is_truncation() {
    let err = read_bytes(VERTEX_HEADER.as_bytes()).unwrap_err();
    match err {
        PlyError::Truncated {
            element,
            property,
            offset,
            requested,
            available,
        } => {
            assert_eq!((element.as_str(), property.as_str()), ("vertex", "x"));
            assert_eq!((offset, requested, available), (0, 4, 0));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn trailing_bytes_are_left_unread() {
    let mut payload = vertex_payload();
    payload.extend_from_slice(&[0xAA, 0xBB]);
    let (_, decoded) = read_bytes(&document(VERTEX_HEADER, &payload)).unwrap();
    assert_eq!(decoded.bytes_consumed(), 24);
    assert_eq!(decoded.element("vertex").unwrap().len(), 2);
}

#[test]
fn missing_names_are_distinct_errors() {
    let (_, decoded) = read_bytes(&document(VERTEX_HEADER, &vertex_payload())).unwrap();

    let err = decoded.element("edge").unwrap_err();
    assert!(matches!(err, PlyError::MissingElement(ref name) if name == "edge"), "got {:?}", err);

    let err = decoded.column("vertex", "density").unwrap_err();
    assert!(
        matches!(err, PlyError::MissingProperty { ref element, ref property } if element == "vertex" && property == "density"),
        "got {:?}",
        err
    );

    let xs: Vec<f64> = decoded
        .column("vertex", "x")
        .unwrap()
        .into_iter()
        .map(|v| v.as_scalar().unwrap().to_f64())
        .collect();
    assert_eq!(xs, vec![1.0, 4.0]);

    let err = decoded.element("vertex").unwrap()[0].get("x").unwrap().as_list().unwrap_err();
    assert!(matches!(err, PlyError::TypeMismatch { expected: "list", .. }), "got {:?}", err);
}

#[test]
fn empty_element_still_checks_property_names() {
    let header = "ply\n\
        format binary_little_endian 1.0\n\
        element vertex 0\n\
        property float x\n\
        property float y\n\
        end_header\n";
    let (_, decoded) = read_bytes(&document(header, &[])).unwrap();

    assert!(decoded.element("vertex").unwrap().is_empty());
    assert!(decoded.column("vertex", "x").unwrap().is_empty());
    assert_eq!(
        decoded.properties("vertex").unwrap().collect::<Vec<_>>(),
        vec!["x", "y"]
    );

    let err = decoded.column("vertex", "density").unwrap_err();
    assert!(
        matches!(err, PlyError::MissingProperty { ref element, ref property } if element == "vertex" && property == "density"),
        "got {:?}",
        err
    );
}

#[test]
fn elements_keep_declaration_order() {
    let header = "ply\n\
        format binary_big_endian 1.0\n\
        element vertex 1\n\
        property short x\n\
        element edge 1\n\
        property int vertex1\n\
        property int vertex2\n\
        property uchar density\n\
        element nothing 0\n\
        end_header\n";
    let payload = encode_all(
        &[
            Scalar::Int16(-4),
            Scalar::Int32(0),
            Scalar::Int32(1),
            Scalar::UInt8(201),
        ],
        Endianness::Big,
    );
    let (_, decoded) = read_bytes(&document(header, &payload)).unwrap();

    let names: Vec<&str> = decoded.names().collect();
    assert_eq!(names, ["vertex", "edge", "nothing"]);
    assert!(decoded.element("nothing").unwrap().is_empty());

    let edge = &decoded.element("edge").unwrap()[0];
    assert_eq!(edge.scalar("vertex2").unwrap().to_i64(), Some(1));
    assert_eq!(edge.scalar("density").unwrap(), Scalar::UInt8(201));
}

#[test]
fn reads_from_path_and_from_borrowed_handle() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("mesh.ply");
    let data = document(FACE_HEADER, &[3, 0, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0]);
    fs::write(&path, &data).expect("write fixture");

    let from_path = PlyReader::open(&path, true)
        .expect("open by path")
        .read_data()
        .expect("decode by path");

    let file = fs::File::open(&path).expect("open handle");
    let mut handle = BufReader::new(file);
    let from_handle = PlyReader::from_reader(&mut handle, false)
        .expect("parse from handle")
        .read_data()
        .expect("decode from handle");

    assert_eq!(from_path, from_handle);

    // The caller still owns the handle and can keep using it.
    let mut rest = Vec::new();
    handle.read_to_end(&mut rest).expect("handle still usable");
    assert!(rest.is_empty());
}

#[test]
fn header_is_exposed_before_payload_decode() {
    let data = document(FACE_HEADER, &[]);
    let mut cursor = Cursor::new(data);
    let reader = PlyReader::from_reader(&mut cursor, false).unwrap();
    let face = reader.header().element("face").expect("face schema");
    assert_eq!(face.count, 1);
    assert!(face.property("vertex_index").unwrap().is_list());
    assert_eq!(cursor_position_after_header(FACE_HEADER), FACE_HEADER.len() as u64);
}

fn cursor_position_after_header(header: &str) -> u64 {
    let mut cursor = Cursor::new(document(header, &[1, 2, 3]));
    PlyReader::from_reader(&mut cursor, false).unwrap();
    cursor.position()
}

#[test]
fn directory_path_is_an_invalid_argument() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = PlyReader::open(dir.path(), false).unwrap_err();
    assert!(matches!(err, PlyError::InvalidArgument(_)), "got {:?}", err);
}

#[test]
fn unknown_type_is_reported_with_its_token() {
    let header = VERTEX_HEADER.replace("property float y", "property quad y");
    let err = read_bytes(header.as_bytes()).unwrap_err();
    match err {
        PlyError::UnknownScalarType { token, line } => {
            assert_eq!(token, "quad");
            assert_eq!(line, 5);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(ScalarType::from_name("quad"), None);
}
