use crate::Result;
use crate::model::{DerivedMetricRow, Report};
use anyhow::Context;
use std::io::Write;

/// Column names of [`DerivedMetricRow`], in order, as serde names them.
pub fn column_names() -> Result<csv::StringRecord> {
    let mut scratch = csv::Writer::from_writer(Vec::new());
    scratch.serialize(DerivedMetricRow::default())?;
    let bytes = scratch.into_inner().context("flush header")?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(bytes.as_slice());
    match reader.records().next() {
        Some(header) => Ok(header?),
        None => anyhow::bail!("row type serialized no header"),
    }
}

/// Render the report as CSV. The header row is written even when there are no rows.
pub fn render_csv<W: Write>(report: &Report, out: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);

    writer.write_record(&column_names()?)?;
    for row in &report.rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Render the report as a pretty-printed JSON array of row objects.
pub fn render_json<W: Write>(report: &Report, mut out: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, &report.rows)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::OperationDescriptor;
    use crate::model::derive_metrics;
    use crate::profile::Profile;
    use crate::stats::FieldMap;
    use pretty_assertions::assert_eq;

    fn report(n: u64) -> Report {
        let profile = Profile::default();
        Report {
            rows: (1..=n)
                .map(|i| derive_metrics(&OperationDescriptor::new(i, i, i), &FieldMap::new(), &profile))
                .collect(),
        }
    }

    #[test]
    fn test_column_order() {
        let header = column_names().unwrap();
        assert_eq!(
            header.iter().collect::<Vec<_>>(),
            vec![
                "Layer",
                "M",
                "N",
                "K",
                "L1 Cache [kB]",
                "L2 Cache [kB]",
                "L3 Cache [MB]",
                "Memory Clock [MHz]",
                "Mean Runtime (RDTSC) [s]",
                "Mean CPI",
                "Mean DP [MFLOP/s]",
                "Memory Bandwidth [MB/s]",
                "Energy [J]",
                "Power [W]",
                "Operational Intensity",
                "MaxFLOPS",
                "FLOP Rate [FLOP/s]",
                "DRAM Energy [J]",
                "CPU Energy [J]",
            ]
        );
    }

    #[test]
    fn test_csv_header_matches_serialized_rows() {
        // A header-producing writer must agree with the explicit header row.
        let mut buf = Vec::new();
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.serialize(&report(1).rows[0]).unwrap();
        writer.flush().unwrap();
        drop(writer);

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        assert_eq!(reader.headers().unwrap(), &column_names().unwrap());
    }

    #[test]
    fn test_csv_rows() {
        let mut buf = Vec::new();
        render_csv(&report(2), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Layer,M,N,K,L1 Cache [kB]"));
        assert!(lines[1].starts_with("\"GEMM Layer (1, 1, 1)\",1,1,1,32.0,256.0,3.0"));
        assert!(lines[2].starts_with("\"GEMM Layer (2, 2, 2)\",2,2,2,"));
    }

    #[test]
    fn test_csv_empty_report_keeps_header() {
        let mut buf = Vec::new();
        render_csv(&Report::default(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("Layer,M,N,K,"));
        assert!(text.ends_with("CPU Energy [J]\n"));
    }

    #[test]
    fn test_json_rows() {
        let mut buf = Vec::new();
        render_json(&report(2), &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["Layer"], "GEMM Layer (2, 2, 2)");
        assert_eq!(rows[0]["Mean CPI"], 0.0);
        assert_eq!(rows[0]["Mean Runtime (RDTSC) [s]"], 1e-9);
    }
}
