//! Flat tabular export of clash records and spectral points.
//!
//! One row per record or point, with a header row. Free text is quoted when
//! it contains a comma, quote or line break.

use std::fmt::Write;

use crate::clash::ClashRecord;
use crate::seismic::SpectralPoint;

const CLASH_HEADER: &str = "Id,Elements,X,Y,Z,Distance,Ignored,Remark";
const SPECTRUM_HEADER: &str = "Id,Time Period (s),Acceleration (g)";

/// Clash list as CSV text.
pub fn clash_records_csv(records: &[ClashRecord]) -> String {
    let mut out = String::from(CLASH_HEADER);
    out.push('\n');
    for record in records {
        let _ = writeln!(
            out,
            "{},{},{:.3},{:.3},{:.3},{:.4},{},{}",
            record.id,
            escape_csv(&record.element_names()),
            record.pos.x,
            record.pos.y,
            record.pos.z,
            record.distance,
            if record.ignore { "Yes" } else { "No" },
            escape_csv(&record.remark)
        );
    }
    out
}

/// Spectral points as CSV text, ordered by time period.
pub fn spectral_points_csv(points: &[SpectralPoint]) -> String {
    let mut sorted: Vec<&SpectralPoint> = points.iter().collect();
    sorted.sort_by(|a, b| a.time_period.total_cmp(&b.time_period));

    let mut out = String::from(SPECTRUM_HEADER);
    out.push('\n');
    for point in sorted {
        let _ = writeln!(out, "{},{},{}", point.id, point.time_period, point.acceleration);
    }
    out
}

fn escape_csv(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clash::ElementRef;
    use crate::geometry::Point3;

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("a, b"), "\"a, b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_clash_rows() {
        let record = ClashRecord {
            id: 3,
            elements: vec![ElementRef::new("Steel", "B1"), ElementRef::new("Pipes", "P1")],
            pos: Point3::new(1.0, 3.025, 0.5),
            distance: 0.05,
            ignore: true,
            remark: "clear by 50mm, \"ok\"".to_string(),
        };
        let csv = clash_records_csv(&[record]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CLASH_HEADER);
        assert_eq!(
            lines[1],
            "3,B1 (Steel) / P1 (Pipes),1.000,3.025,0.500,0.0500,Yes,\"clear by 50mm, \"\"ok\"\"\""
        );
    }

    #[test]
    fn test_spectrum_rows_sorted() {
        let points = vec![
            SpectralPoint { id: 1, time_period: 1.0, acceleration: 0.8 },
            SpectralPoint { id: 2, time_period: 0.0, acceleration: 1.0 },
        ];
        let csv = spectral_points_csv(&points);
        assert_eq!(csv, "Id,Time Period (s),Acceleration (g)\n2,0,1\n1,1,0.8\n");
    }
}
