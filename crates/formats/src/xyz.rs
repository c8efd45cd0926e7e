use foundation::math::Vec3;

use crate::error::ValidationError;
use crate::point_set::PointSet;

/// Parses plain-text XYZ: one point per line, whitespace separated, the first
/// three columns are `x y z`.
///
/// Blank lines are skipped. Every token on every other line must be a finite
/// number and each line needs at least three of them; a single bad token
/// rejects the whole file. Fewer than `min_points` rows is also an error.
pub fn parse_xyz(text: &str, min_points: usize) -> Result<PointSet, ValidationError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut set = PointSet::new();

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let mut values = [0.0f64; 3];
        let mut n = 0usize;
        for token in line.split_whitespace() {
            let v = parse_number(token).ok_or_else(|| ValidationError::MalformedXyz {
                line: Some(line_no),
                reason: format!("`{token}` is not a number"),
            })?;
            if n < 3 {
                values[n] = v;
            }
            n += 1;
        }
        if n == 0 {
            continue;
        }
        if n < 3 {
            return Err(ValidationError::MalformedXyz {
                line: Some(line_no),
                reason: format!("expected at least 3 values, found {n}"),
            });
        }
        set.push(Vec3::new(values[0], values[1], values[2]));
    }

    if set.count() < min_points {
        return Err(ValidationError::MalformedXyz {
            line: None,
            reason: format!(
                "expected at least {min_points} points, found {}",
                set.count()
            ),
        });
    }

    tracing::debug!(points = set.count(), "parsed xyz");
    Ok(set)
}

/// Finite `f64` or nothing; rejects `NaN`/`inf` spellings that `str::parse` accepts.
pub(crate) fn parse_number(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::parse_xyz;
    use crate::error::ValidationError;
    use foundation::math::Vec3;

    #[test]
    fn parses_rows_and_bounds() {
        let text = "0 0 0\n1.5 -2 3\n\n  -1 4 0.25 extra 7\n";
        let set = parse_xyz(text, 3).expect("parse xyz");
        assert_eq!(set.count(), 3);
        let b = set.bounding_box().expect("bounds");
        assert_eq!(b.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.5, 4.0, 3.0));
    }

    #[test]
    fn count_matches_line_count() {
        let text: String = (0..50)
            .map(|i| format!("{i} {} {}\r\n", i * 2, -i))
            .collect();
        let set = parse_xyz(&text, 3).expect("parse xyz");
        assert_eq!(set.count(), 50);
        assert_eq!(set.z_range(), Some((-49.0, 0.0)));
    }

    #[test]
    fn any_non_numeric_token_rejects_file() {
        let text = "0 0 0\n1 1 1\n2 2 abc\n3 3 3\n";
        let err = parse_xyz(text, 3).expect_err("non-numeric");
        assert!(matches!(
            err,
            ValidationError::MalformedXyz { line: Some(3), .. }
        ));

        let err = parse_xyz("0 0 0 0\n1 1 1 NaN\n2 2 2\n", 3).expect_err("nan");
        assert!(matches!(
            err,
            ValidationError::MalformedXyz { line: Some(2), .. }
        ));
    }

    #[test]
    fn short_row_rejects_file() {
        let err = parse_xyz("0 0 0\n1 1\n2 2 2\n", 3).expect_err("short row");
        assert_eq!(
            err,
            ValidationError::MalformedXyz {
                line: Some(2),
                reason: "expected at least 3 values, found 2".to_string(),
            }
        );
    }

    #[test]
    fn too_few_points_rejects_file() {
        let err = parse_xyz("0 0 0\n1 1 1\n\n", 3).expect_err("too few");
        assert!(matches!(err, ValidationError::MalformedXyz { line: None, .. }));
    }
}
