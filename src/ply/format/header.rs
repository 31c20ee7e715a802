//! PLY header parsing.
//!
//! This module handles:
//! - Validating the `ply` magic line
//! - Collecting header lines up to the `end_header` terminator
//! - Separating `comment` / `obj_info` lines from the schema grammar
//! - Building the element and property schemas in declaration order

use log::{debug, info, trace};

use crate::ply::source::{BorrowedSource, ByteSource};
use crate::ply::types::error::{PlyError, Result};
use crate::ply::types::models::{ElementSchema, FileFormat, PlyHeader, PropertySchema, ScalarType};
use crate::ply::utils;

const MAGIC: &[u8] = b"ply";
const END_HEADER: &str = "end_header";

/// One non-comment header line, with its 1-based position in the file.
#[derive(Debug)]
struct HeaderLine {
    number: usize,
    text: String,
}

impl HeaderLine {
    fn keyword(&self) -> &str {
        utils::split_keyword(&self.text).0
    }

    fn args(&self) -> Vec<&str> {
        utils::split_keyword(&self.text).1.split_whitespace().collect()
    }

    fn invalid(&self, reason: impl Into<String>) -> PlyError {
        PlyError::InvalidFormat {
            line: self.number,
            text: self.text.clone(),
            reason: reason.into(),
        }
    }

    fn arity(&self, keyword: &'static str, expected: &'static str, found: usize) -> PlyError {
        PlyError::ArgumentCount {
            line: self.number,
            text: self.text.clone(),
            keyword,
            expected,
            found,
        }
    }
}

/// Forward-only cursor over the schema lines.
struct LineCursor<'a> {
    lines: &'a [HeaderLine],
    pos: usize,
}

impl<'a> LineCursor<'a> {
    fn new(lines: &'a [HeaderLine]) -> Self {
        Self { lines, pos: 0 }
    }

    fn peek_line(&self) -> Option<&'a HeaderLine> {
        self.lines.get(self.pos)
    }

    fn next_line(&mut self) -> Option<&'a HeaderLine> {
        let line = self.lines.get(self.pos)?;
        self.pos += 1;
        Some(line)
    }
}

/// Parses a PLY header from `source`, leaving it positioned at the first
/// payload byte.
///
/// # Header Structure
/// ```text
/// ply
/// format <ascii|binary_little_endian|binary_big_endian> <version>
/// comment ...                                  (anywhere, any number)
/// element <name> <count>
/// property <type> <name>                       (zero or more per element)
/// property list <count-type> <item-type> <name>
/// ...
/// end_header
/// ```
pub fn parse<S: ByteSource + ?Sized>(source: &mut S) -> Result<PlyHeader> {
    let (lines, end_line) = read_header_lines(source)?;

    let mut comments = Vec::new();
    let mut obj_info = Vec::new();
    let mut schema_lines = Vec::new();
    for line in lines {
        let (keyword, rest) = utils::split_keyword(&line.text);
        if keyword == "comment" {
            debug!("comment: {}", rest);
            comments.push(rest.to_string());
        } else if keyword == "obj_info" {
            debug!("obj_info: {}", rest);
            obj_info.push(rest.to_string());
        } else {
            schema_lines.push(line);
        }
    }

    let mut cursor = LineCursor::new(&schema_lines);
    let (format, version) = parse_format(&mut cursor, end_line)?;
    let elements = parse_elements(&mut cursor)?;

    info!(
        "PLY header parsed: format={} {}, {} elements, {} comments",
        format,
        version,
        elements.len(),
        comments.len()
    );

    Ok(PlyHeader {
        format,
        version,
        elements,
        comments,
        obj_info,
    })
}

/// Parses a header at the start of an in-memory buffer.
///
/// Returns the header and the offset of the first payload byte in `data`.
pub fn parse_bytes(data: &[u8]) -> Result<(PlyHeader, usize)> {
    let mut rest = data;
    let header = parse(&mut BorrowedSource::new(&mut rest))?;
    Ok((header, data.len() - rest.len()))
}

/// Reads the magic line and every line up to (and consuming) `end_header`.
///
/// Returns the collected lines and the line number of the terminator.
fn read_header_lines<S: ByteSource + ?Sized>(source: &mut S) -> Result<(Vec<HeaderLine>, usize)> {
    let mut buf = Vec::new();
    source.read_line(&mut buf)?;
    if utils::strip_line_terminator(&buf) != MAGIC {
        return Err(PlyError::InvalidFormat {
            line: 1,
            text: String::from_utf8_lossy(utils::strip_line_terminator(&buf)).into_owned(),
            reason: "not a PLY file: first line must be 'ply'".to_string(),
        });
    }

    let mut lines = Vec::new();
    let mut number = 1;
    loop {
        buf.clear();
        number += 1;
        if source.read_line(&mut buf)? == 0 {
            return Err(PlyError::InvalidFormat {
                line: number,
                text: String::new(),
                reason: format!("input ended before '{}'", END_HEADER),
            });
        }

        let raw = utils::strip_line_terminator(&buf);
        let text = std::str::from_utf8(raw).map_err(|_| PlyError::InvalidFormat {
            line: number,
            text: String::from_utf8_lossy(raw).into_owned(),
            reason: "header line is not valid UTF-8".to_string(),
        })?;
        trace!("Header line {}: {:?}", number, text);

        if text == END_HEADER {
            return Ok((lines, number));
        }
        lines.push(HeaderLine {
            number,
            text: text.to_string(),
        });
    }
}

fn parse_format(cursor: &mut LineCursor, end_line: usize) -> Result<(FileFormat, f32)> {
    let line = cursor.next_line().ok_or_else(|| PlyError::InvalidFormat {
        line: end_line,
        text: END_HEADER.to_string(),
        reason: "missing 'format' line".to_string(),
    })?;
    if line.keyword() != "format" {
        return Err(line.invalid("the first non-comment line must specify a format"));
    }

    let args = line.args();
    if args.len() != 2 {
        return Err(line.arity("format", "2", args.len()));
    }

    let format = FileFormat::from_name(args[0])
        .ok_or_else(|| line.invalid(format!("unrecognized format '{}'", args[0])))?;
    let version: f32 = args[1]
        .parse()
        .map_err(|e| line.invalid(format!("invalid format version '{}': {}", args[1], e)))?;
    debug!("format: {} {}", format, version);

    Ok((format, version))
}

fn parse_elements(cursor: &mut LineCursor) -> Result<Vec<ElementSchema>> {
    let mut elements: Vec<ElementSchema> = Vec::new();

    while let Some(line) = cursor.next_line() {
        // Stricter than the historical check, which only rejected a wrong
        // keyword paired with exactly 2 arguments: either failure rejects.
        if line.keyword() != "element" {
            return Err(line.invalid(format!(
                "expected keyword 'element', found '{}'",
                line.keyword()
            )));
        }
        let args = line.args();
        if args.len() != 2 {
            return Err(line.arity("element", "2", args.len()));
        }

        let name = args[0];
        if elements.iter().any(|e| e.name == name) {
            return Err(line.invalid(format!("duplicate element '{}'", name)));
        }
        let count: usize = args[1]
            .parse()
            .map_err(|e| line.invalid(format!("invalid element count '{}': {}", args[1], e)))?;

        let mut properties: Vec<PropertySchema> = Vec::new();
        while let Some(p_line) = cursor.peek_line().filter(|l| l.keyword() == "property") {
            cursor.next_line();
            let property = parse_property(p_line)?;
            if properties.iter().any(|p| p.name() == property.name()) {
                return Err(p_line.invalid(format!(
                    "duplicate property '{}' in element '{}'",
                    property.name(),
                    name
                )));
            }
            properties.push(property);
        }

        let element = ElementSchema {
            name: name.to_string(),
            count,
            properties,
        };
        debug!("{}", element);
        elements.push(element);
    }

    Ok(elements)
}

/// Parses `property <type> <name>` or
/// `property list <count-type> <item-type> <name>`.
fn parse_property(line: &HeaderLine) -> Result<PropertySchema> {
    let args = line.args();
    let Some((&name, type_tokens)) = args.split_last() else {
        return Err(line.arity("property", "2 or 4", 0));
    };

    let resolve = |token: &str| {
        ScalarType::from_name(token).ok_or_else(|| PlyError::UnknownScalarType {
            line: line.number,
            token: token.to_string(),
        })
    };

    match type_tokens {
        ["list", count_token, item_token] => {
            let count_type = resolve(*count_token)?;
            let item_type = resolve(*item_token)?;
            if !count_type.is_integer() {
                return Err(line.invalid(format!(
                    "list length type must be an integer type, found '{}'",
                    count_token
                )));
            }
            Ok(PropertySchema::List {
                name: name.to_string(),
                count_type,
                item_type,
            })
        }
        ["list", ..] => Err(line.arity("property", "4", args.len())),
        [type_token] => Ok(PropertySchema::Scalar {
            name: name.to_string(),
            data_type: resolve(*type_token)?,
        }),
        _ => Err(line.arity("property", "2", args.len())),
    }
}
