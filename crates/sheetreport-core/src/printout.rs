use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::format::format_usd;
use crate::record::SalesRecord;
use crate::report::AiReport;

/// Render the report and its data sheet as a printable Markdown document
pub fn render_printable(report: &AiReport, records: &[SalesRecord], printed_on: NaiveDate) -> String {
    let mut out = String::new();

    out.push_str("# Sales Analysis Report\n\n");
    out.push_str(&format!(
        "Confidential Business Data • {}\n\n",
        printed_on.format("%m/%d/%Y")
    ));

    out.push_str("## Executive Summary\n\n");
    out.push_str(report.summary.trim());
    out.push_str("\n\n");

    out.push_str("## Key Insights\n\n");
    for (i, insight) in report.key_insights.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, insight.trim()));
    }
    out.push('\n');

    out.push_str("## Strategic Recommendation\n\n");
    out.push_str(report.recommendation.trim());
    out.push_str("\n\n");

    out.push_str("## Data Sheet\n\n");
    out.push_str("| Date | Product | Category | Units | Revenue | Status |\n");
    out.push_str("|---|---|---|---:|---:|---|\n");
    for record in records {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            record.date,
            record.product.replace('|', "\\|"),
            record.category.as_str(),
            record.units,
            format_usd(record.revenue),
            record.status.as_str(),
        ));
    }

    let total_units: u64 = records.iter().map(|r| u64::from(r.units)).sum();
    let total_revenue: Decimal = records.iter().map(|r| r.revenue).sum();
    out.push_str(&format!(
        "| **Total** | | | {} | {} | |\n\n",
        total_units,
        format_usd(total_revenue)
    ));
    out.push_str(&format!(
        "_Report generated {}_\n",
        report.generated_at.format("%m/%d/%Y")
    ));

    out
}

pub fn print_file_name(printed_on: NaiveDate) -> String {
    format!("sales-report-{}.md", printed_on.format("%Y-%m-%d"))
}

/// Write the printable report into `dir`, returning the file path
pub fn write_printable(
    dir: &Path,
    report: &AiReport,
    records: &[SalesRecord],
    printed_on: NaiveDate,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(print_file_name(printed_on));
    fs::write(&path, render_printable(report, records, printed_on))?;
    info!(path = %path.display(), "report printed");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample_records;
    use tempfile::TempDir;

    fn report() -> AiReport {
        AiReport {
            summary: "Revenue reached $15.7k across six deals.".to_string(),
            key_insights: vec![
                "Software carries the largest deals".to_string(),
                "One maintenance contract was cancelled".to_string(),
            ],
            recommendation: "Bundle maintenance with hardware kits.".to_string(),
            generated_at: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        }
    }

    #[test]
    fn test_render_contains_sections_and_totals() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
        let text = render_printable(&report(), &sample_records(), day);

        assert!(text.starts_with("# Sales Analysis Report"));
        assert!(text.contains("Confidential Business Data • 06/04/2024"));
        assert!(text.contains("2. One maintenance contract was cancelled"));
        assert!(text.contains("| 2023-10-01 | Consulting Pro | Services | 5 | $2,500.00 | Completed |"));
        assert!(text.contains("| **Total** | | | 33 | $15,700.00 | |"));
        assert!(text.contains("_Report generated 06/03/2024_"));
    }

    #[test]
    fn test_totals_count_every_listed_row() {
        let mut records = sample_records();
        records.push(records[0].clone());
        let day = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
        let text = render_printable(&report(), &records, day);

        assert_eq!(text.matches("| Consulting Pro |").count(), 2);
        assert!(text.contains("| **Total** | | | 38 | $18,200.00 | |"));
    }

    #[test]
    fn test_write_printable_creates_file() {
        let dir = TempDir::new().unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
        let path = write_printable(&dir.path().join("out"), &report(), &sample_records(), day).unwrap();

        assert!(path.ends_with("sales-report-2024-06-04.md"));
        let written = fs::read_to_string(path).unwrap();
        assert!(written.contains("Strategic Recommendation"));
    }
}
