use std::collections::BTreeMap;

use foundation::math::Vec3;

use crate::error::ValidationError;
use crate::point_set::PointSet;
use crate::xyz::parse_number;

const MIN_ROW_BYTES: usize = 6;

pub const REQUIRED_HEADER_FIELDS: [&str; 9] = [
    "VERSION",
    "FIELDS",
    "SIZE",
    "TYPE",
    "COUNT",
    "WIDTH",
    "HEIGHT",
    "VIEWPOINT",
    "POINTS",
];

/// Parsed PCD header block.
#[derive(Debug, Clone, PartialEq)]
pub struct PcdHeader {
    /// Raw `KEY value...` pairs in key order, values joined by single spaces.
    pub entries: BTreeMap<String, String>,
    pub fields: Vec<String>,
    /// Column offset of every field (fields with `COUNT > 1` span several columns).
    pub columns: Vec<usize>,
    pub points: usize,
}

impl PcdHeader {
    pub fn column_of(&self, field: &str) -> Option<usize> {
        let idx = self.fields.iter().position(|f| f == field)?;
        self.columns.get(idx).copied()
    }

    fn xyz_columns(&self) -> Result<[usize; 3], ValidationError> {
        let mut out = [0usize; 3];
        for (slot, name) in out.iter_mut().zip(["x", "y", "z"]) {
            *slot = self
                .column_of(name)
                .ok_or_else(|| header_err(format!("FIELDS does not include `{name}`")))?;
        }
        Ok(out)
    }
}

/// Parses a PCD file with an ASCII payload.
///
/// The header is a block of `KEY value...` lines terminated by `DATA <mode>`;
/// `#` lines are comments. Only `DATA ascii` is accepted. Exactly `POINTS`
/// rows are read from the payload; `x`, `y`, `z` columns are located through
/// `FIELDS` (and `COUNT`), never by position.
pub fn parse_pcd(bytes: &[u8]) -> Result<(PcdHeader, PointSet), ValidationError> {
    let (entries, payload) = split_header(bytes)?;
    let header = build_header(entries)?;
    let [cx, cy, cz] = header.xyz_columns()?;

    let text = std::str::from_utf8(payload)
        .map_err(|_| data_err("payload is not valid UTF-8 text".to_string()))?;

    let mut set = PointSet::with_capacity(initial_capacity(header.points, payload));
    let mut rows = text.lines().map(str::trim).filter(|l| !l.is_empty());
    while set.count() < header.points {
        let Some(row) = rows.next() else {
            return Err(data_err(format!(
                "header declares {} points but only {} rows are present",
                header.points,
                set.count()
            )));
        };
        let cells: Vec<&str> = row.split_whitespace().collect();
        let value_at = |col: usize| -> Result<f64, ValidationError> {
            let cell = cells.get(col).ok_or_else(|| {
                data_err(format!(
                    "row {} has {} columns, expected at least {}",
                    set.count() + 1,
                    cells.len(),
                    col.saturating_add(1)
                ))
            })?;
            parse_number(cell).ok_or_else(|| {
                data_err(format!("row {}: `{cell}` is not a number", set.count() + 1))
            })
        };
        let p = Vec3::new(value_at(cx)?, value_at(cy)?, value_at(cz)?);
        set.push(p);
    }

    tracing::debug!(points = set.count(), fields = ?header.fields, "parsed pcd");
    Ok((header, set))
}

/// `POINTS` bounded by what the payload could hold; every row needs at least
/// `x y z` plus a line break.
fn initial_capacity(declared: usize, payload: &[u8]) -> usize {
    declared.min(payload.len() / MIN_ROW_BYTES)
}

fn split_header(bytes: &[u8]) -> Result<(BTreeMap<String, String>, &[u8]), ValidationError> {
    let mut entries = BTreeMap::new();
    let mut offset = 0usize;

    while offset < bytes.len() {
        let end = bytes[offset..]
            .iter()
            .position(|b| *b == b'\n')
            .map(|i| offset + i + 1)
            .unwrap_or(bytes.len());
        let raw = String::from_utf8_lossy(&bytes[offset..end]);
        offset = end;

        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let Some(key) = tokens.next() else {
            continue;
        };
        let value = tokens.collect::<Vec<_>>().join(" ");

        if key == "DATA" {
            if value.eq_ignore_ascii_case("ascii") {
                return Ok((entries, &bytes[offset..]));
            }
            return Err(ValidationError::UnsupportedPcdEncoding { encoding: value });
        }
        entries.insert(key.to_string(), value);
    }

    Err(header_err("missing `DATA ascii` line".to_string()))
}

fn build_header(entries: BTreeMap<String, String>) -> Result<PcdHeader, ValidationError> {
    for field in REQUIRED_HEADER_FIELDS {
        if !entries.contains_key(field) {
            return Err(header_err(format!("missing required field `{field}`")));
        }
    }

    let fields: Vec<String> = entries["FIELDS"]
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let counts: Vec<usize> = entries["COUNT"]
        .split_whitespace()
        .map(|c| c.parse::<usize>())
        .collect::<Result<_, _>>()
        .map_err(|_| header_err(format!("COUNT `{}` is not a list of integers", entries["COUNT"])))?;
    if counts.len() != fields.len() {
        return Err(header_err(format!(
            "COUNT has {} entries but FIELDS has {}",
            counts.len(),
            fields.len()
        )));
    }

    let mut columns = Vec::with_capacity(fields.len());
    let mut next = 0usize;
    for (field, c) in fields.iter().zip(&counts) {
        columns.push(next);
        next = next
            .checked_add(*c)
            .ok_or_else(|| header_err(format!("COUNT of `{field}` overflows the row width")))?;
    }

    let points = entries["POINTS"]
        .trim()
        .parse::<usize>()
        .map_err(|_| header_err(format!("POINTS `{}` is not an integer", entries["POINTS"])))?;

    Ok(PcdHeader {
        entries,
        fields,
        columns,
        points,
    })
}

fn header_err(reason: String) -> ValidationError {
    ValidationError::MalformedPcdHeader { reason }
}

fn data_err(reason: String) -> ValidationError {
    ValidationError::MalformedPcdData { reason }
}

#[cfg(test)]
mod tests {
    use super::{initial_capacity, parse_pcd};
    use crate::error::ValidationError;
    use foundation::math::Vec3;

    const HEADER: &str = "# .PCD v0.7 - Point Cloud Data file format
VERSION 0.7
FIELDS x y z rgb
SIZE 4 4 4 4
TYPE F F F F
COUNT 1 1 1 1
WIDTH 3
HEIGHT 1
VIEWPOINT 0 0 0 1 0 0 0
POINTS 3
";

    #[test]
    fn parses_ascii_payload() {
        let text = format!("{HEADER}DATA ascii\n0 0 0 4.2e6\n1 2 3 4.2e6\n-1 5 0.5 4.2e6\n");
        let (header, set) = parse_pcd(text.as_bytes()).expect("parse pcd");
        assert_eq!(header.points, 3);
        assert_eq!(header.fields, vec!["x", "y", "z", "rgb"]);
        assert_eq!(header.entries["VERSION"], "0.7");
        assert_eq!(set.count(), 3);
        let b = set.bounding_box().expect("bounds");
        assert_eq!(b.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 5.0, 3.0));
    }

    #[test]
    fn column_order_comes_from_fields() {
        let text = "VERSION 0.7
FIELDS intensity z y x
SIZE 4 4 4 4
TYPE F F F F
COUNT 1 1 1 1
WIDTH 1
HEIGHT 1
VIEWPOINT 0 0 0 1 0 0 0
POINTS 1
DATA ascii
9 3 2 1
";
        let (_, set) = parse_pcd(text.as_bytes()).expect("parse pcd");
        assert_eq!(set.points(), &[Vec3::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn multi_count_fields_shift_columns() {
        let text = "VERSION 0.7
FIELDS normal x y z
SIZE 4 4 4 4
TYPE F F F F
COUNT 3 1 1 1
WIDTH 1
HEIGHT 1
VIEWPOINT 0 0 0 1 0 0 0
POINTS 1
DATA ascii
0 0 1 7 8 9
";
        let (header, set) = parse_pcd(text.as_bytes()).expect("parse pcd");
        assert_eq!(header.column_of("x"), Some(3));
        assert_eq!(set.points(), &[Vec3::new(7.0, 8.0, 9.0)]);
    }

    #[test]
    fn missing_header_field_is_reported() {
        let text = HEADER.replace("VIEWPOINT 0 0 0 1 0 0 0\n", "") + "DATA ascii\n0 0 0 1\n";
        let err = parse_pcd(text.as_bytes()).expect_err("missing viewpoint");
        assert_eq!(
            err,
            ValidationError::MalformedPcdHeader {
                reason: "missing required field `VIEWPOINT`".to_string()
            }
        );
    }

    #[test]
    fn fields_without_z_are_rejected() {
        let text = HEADER.replace("FIELDS x y z rgb", "FIELDS x y w rgb") + "DATA ascii\n";
        let err = parse_pcd(text.as_bytes()).expect_err("no z");
        assert!(matches!(err, ValidationError::MalformedPcdHeader { .. }));
    }

    #[test]
    fn missing_data_line_is_a_header_error() {
        let err = parse_pcd(HEADER.as_bytes()).expect_err("no DATA");
        assert!(matches!(err, ValidationError::MalformedPcdHeader { .. }));
    }

    #[test]
    fn binary_payload_is_unsupported() {
        let mut bytes = format!("{HEADER}DATA binary\n").into_bytes();
        bytes.extend_from_slice(&[0xff, 0x00, 0x13, 0x80, 0xfe]);
        let err = parse_pcd(&bytes).expect_err("binary");
        assert_eq!(
            err,
            ValidationError::UnsupportedPcdEncoding {
                encoding: "binary".to_string()
            }
        );
    }

    #[test]
    fn short_or_bad_rows_are_data_errors() {
        let short = format!("{HEADER}DATA ascii\n0 0 0 1\n1 1 1 1\n");
        assert!(matches!(
            parse_pcd(short.as_bytes()),
            Err(ValidationError::MalformedPcdData { .. })
        ));

        let bad = format!("{HEADER}DATA ascii\n0 0 0 1\n1 x 1 1\n2 2 2 2\n");
        assert!(matches!(
            parse_pcd(bad.as_bytes()),
            Err(ValidationError::MalformedPcdData { .. })
        ));
    }

    #[test]
    fn huge_count_is_a_header_error() {
        let text = HEADER.replace("COUNT 1 1 1 1", "COUNT 18446744073709551615 1 1 1")
            + "DATA ascii\n0 0 0 1\n";
        let err = parse_pcd(text.as_bytes()).expect_err("overflowing COUNT");
        assert_eq!(
            err,
            ValidationError::MalformedPcdHeader {
                reason: "COUNT of `y` overflows the row width".to_string()
            }
        );

        let text = HEADER
            .replace("FIELDS x y z rgb", "FIELDS rgb x y z")
            .replace("COUNT 1 1 1 1", "COUNT 18446744073709551615 0 0 0")
            + "DATA ascii\n0 0 0 1\n";
        assert!(matches!(
            parse_pcd(text.as_bytes()),
            Err(ValidationError::MalformedPcdData { .. })
        ));
    }

    #[test]
    fn declared_points_do_not_size_the_allocation() {
        let text = HEADER.replace("POINTS 3", "POINTS 999999999") + "DATA ascii\n0 0 0 1\n";
        let err = parse_pcd(text.as_bytes()).expect_err("missing rows");
        assert_eq!(
            err,
            ValidationError::MalformedPcdData {
                reason: "header declares 999999999 points but only 1 rows are present"
                    .to_string()
            }
        );
        assert_eq!(initial_capacity(999_999_999, b"0 0 0 1\n"), 1);
        assert_eq!(initial_capacity(2, &[b' '; 4096]), 2);
    }

    #[test]
    fn rows_beyond_points_are_ignored() {
        let text = format!("{HEADER}DATA ascii\n0 0 0 1\n1 1 1 1\n2 2 2 2\ngarbage row\n");
        let (_, set) = parse_pcd(text.as_bytes()).expect("parse pcd");
        assert_eq!(set.count(), 3);
    }
}
