//! Convex collision shape files
//!
//! ```text
//! shape_type: TYPE_HULL
//! data: 0.0
//! data: 0.0
//! data: 1.0
//! ...
//! ```
//!
//! Only hull vertex coordinates are stored, x then y then z per vertex. Faces
//! are left out because consuming physics engines rebuild the hull from its
//! points. Scalars are written as `f32` in the shortest positional decimal
//! that parses back to the same value, so a round trip is exact.

use convex_hull::HullPolytope;
use std::fmt;
use std::io::{self, Write};

/// Type tag for convex hull shapes
pub const SHAPE_TYPE_HULL: &str = "TYPE_HULL";

/// File extension of shape files
pub const SHAPE_EXT: &str = "convexshape";

const TYPE_KEY: &str = "shape_type:";
const DATA_KEY: &str = "data:";

/// A typed, flat list of shape scalars
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRecord {
    pub shape_type: String,
    pub data: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeParseError {
    #[error("Missing `shape_type:` header line")]
    MissingHeader,

    #[error("Line {line}: expected `data: <float>`, found {content:?}")]
    UnexpectedLine { line: usize, content: String },

    #[error("Line {line}: {value:?} is not a finite number")]
    InvalidScalar { line: usize, value: String },

    #[error("{count} scalars do not form whole xyz triples")]
    IncompleteVertex { count: usize },
}

/// Flattens the hull's vertices into a hull shape record.
pub fn serialize_shape(hull: &HullPolytope) -> ShapeRecord {
    let data = hull
        .vertices()
        .iter()
        .flat_map(|v| [v.x as f32, v.y as f32, v.z as f32])
        .collect();

    ShapeRecord {
        shape_type: SHAPE_TYPE_HULL.to_string(),
        data,
    }
}

impl ShapeRecord {
    /// Number of xyz triples
    pub fn vertex_count(&self) -> usize {
        self.data.len() / 3
    }

    pub fn points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.data.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    /// Writes the record in shape file format.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "{self}")
    }

    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ShapeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{TYPE_KEY} {}", self.shape_type)?;
        for &value in &self.data {
            writeln!(f, "{DATA_KEY} {}", format_scalar(value))?;
        }
        Ok(())
    }
}

/// Formats a scalar in positional notation with at least one fractional digit.
///
/// Rust's `Display` for floats already emits the shortest digits that round
/// trip and never switches to exponent notation; this only adds `.0` to
/// integral values.
pub fn format_scalar(value: f32) -> String {
    let mut text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}

/// Reads shape text back into a record.
///
/// Blank lines are ignored. Lines end with `\n` or `\r\n`.
pub fn parse_shape(text: &str) -> Result<ShapeRecord, ShapeParseError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let shape_type = match lines.next() {
        Some((_, line)) => match line.strip_prefix(TYPE_KEY) {
            Some(tag) => tag.trim().to_string(),
            None => return Err(ShapeParseError::MissingHeader),
        },
        None => return Err(ShapeParseError::MissingHeader),
    };

    let mut data = Vec::new();
    for (line, content) in lines {
        let Some(value) = content.strip_prefix(DATA_KEY).map(str::trim) else {
            return Err(ShapeParseError::UnexpectedLine {
                line,
                content: content.to_string(),
            });
        };
        match value.parse::<f32>() {
            Ok(v) if v.is_finite() => data.push(v),
            _ => {
                return Err(ShapeParseError::InvalidScalar {
                    line,
                    value: value.to_string(),
                });
            }
        }
    }

    if data.len() % 3 != 0 {
        return Err(ShapeParseError::IncompleteVertex { count: data.len() });
    }

    Ok(ShapeRecord { shape_type, data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use convex_hull::{compute_hull, Point3};

    #[test]
    fn test_format_scalar() {
        assert_eq!(format_scalar(1.0), "1.0");
        assert_eq!(format_scalar(-0.5), "-0.5");
        assert_eq!(format_scalar(0.0), "0.0");
        assert_eq!(format_scalar(-0.0), "-0.0");
        assert_eq!(format_scalar(0.1), "0.1");
        assert_eq!(format_scalar(1e-6), "0.000001");
        assert_eq!(format_scalar(123456.0), "123456.0");
        assert!(!format_scalar(3.0e20).contains('e'));
    }

    #[test]
    fn test_serialize_hull_vertices_in_order() {
        let hull = compute_hull(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(0.0, 0.0, 3.0),
        ]);
        let record = serialize_shape(&hull);

        assert_eq!(record.shape_type, "TYPE_HULL");
        assert_eq!(
            record.data,
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 3.0]
        );
        assert_eq!(record.vertex_count(), 4);
    }

    #[test]
    fn test_text_layout() {
        let record = ShapeRecord {
            shape_type: SHAPE_TYPE_HULL.to_string(),
            data: vec![1.0, -2.5, 0.25],
        };
        assert_eq!(
            record.to_text(),
            "shape_type: TYPE_HULL\ndata: 1.0\ndata: -2.5\ndata: 0.25\n"
        );
    }

    #[test]
    fn test_written_bytes_match_text() {
        let record = ShapeRecord {
            shape_type: SHAPE_TYPE_HULL.to_string(),
            data: vec![0.5, 2.0, -3.0],
        };
        let mut bytes = Vec::new();
        record.write_to(&mut bytes).unwrap();
        assert_eq!(bytes, record.to_text().into_bytes());
    }

    #[test]
    fn test_parse_recovers_exact_values() {
        let record = ShapeRecord {
            shape_type: SHAPE_TYPE_HULL.to_string(),
            data: vec![0.1, 1.0 / 3.0, -1234.5678, 1e-7, 16777216.0, f32::MIN_POSITIVE],
        };
        let parsed = parse_shape(&record.to_text()).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(parsed.points().count(), 2);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_shape(""), Err(ShapeParseError::MissingHeader));
        assert_eq!(parse_shape("data: 1.0\n"), Err(ShapeParseError::MissingHeader));
        assert!(matches!(
            parse_shape("shape_type: TYPE_HULL\nvertex: 1.0\n"),
            Err(ShapeParseError::UnexpectedLine { line: 2, .. })
        ));
        assert!(matches!(
            parse_shape("shape_type: TYPE_HULL\ndata: abc\n"),
            Err(ShapeParseError::InvalidScalar { line: 2, .. })
        ));
        assert_eq!(
            parse_shape("shape_type: TYPE_HULL\ndata: 1.0\ndata: 2.0\n"),
            Err(ShapeParseError::IncompleteVertex { count: 2 })
        );
    }

    #[test]
    fn test_parse_accepts_crlf_and_blank_lines() {
        let parsed = parse_shape("shape_type: TYPE_HULL\r\n\r\ndata: 1\r\ndata: 2\r\ndata: 3\r\n").unwrap();
        assert_eq!(parsed.data, vec![1.0, 2.0, 3.0]);
    }
}
