use std::fmt::Write as _;

use formats::{FileMetadata, ImportResult};
use foundation::math::Vec3;

/// Human-readable summary of an ingestion batch, one block per file.
pub fn summarize(result: &ImportResult) -> String {
    let mut out = String::new();
    for file in &result.accepted {
        let _ = writeln!(
            out,
            "{}  ({}, {})",
            file.name,
            file.kind,
            format_size(file.size_bytes)
        );
        if let Some(meta) = result.metadata_by_file.get(&file.name) {
            write_metadata(&mut out, meta);
        }
    }
    for err in &result.errors {
        let _ = writeln!(out, "rejected: {err}");
    }
    if result.accepted.is_empty() && result.errors.is_empty() {
        out.push_str("no files\n");
    }
    out
}

fn write_metadata(out: &mut String, meta: &FileMetadata) {
    if let Some(count) = meta.point_count {
        let _ = writeln!(out, "  points:   {count}");
    }
    if let Some(b) = meta.bounding_box {
        let _ = writeln!(out, "  bounds:   min {}  max {}", fmt_vec(b.min), fmt_vec(b.max));
    }
    if let Some(count) = meta.feature_count {
        let _ = writeln!(out, "  features: {count}");
    }
    if let Some(b) = meta.geo_bounds {
        let _ = writeln!(
            out,
            "  extent:   lon {:.6}..{:.6}  lat {:.6}..{:.6}",
            b.min[0], b.max[0], b.min[1], b.max[1]
        );
    }
    if let Some(header) = &meta.header {
        for (key, value) in header {
            let _ = writeln!(out, "  {key}: {value}");
        }
    }
}

/// Kilobytes with two decimals.
pub fn format_size(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

fn fmt_vec(v: Vec3) -> String {
    format!("({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)
}
