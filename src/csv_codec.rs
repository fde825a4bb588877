//! CSV export encoding and the upload column contract.

use crate::models::BatchResult;
use chrono::NaiveDate;

pub const EXPORT_HEADER: &str = "ID,Text,Sentiment,Confidence";

/// Column names the service accepts as review text, in lookup priority.
pub const TEXT_COLUMNS: [&str; 4] = ["text", "review", "comment", "feedback"];

pub const EXPORT_PREFIX: &str = "sentiment_analysis_results_";

/// Encodes batch results as CSV, header first, rows joined by `\n`.
///
/// Only the text field is quoted. Embedded newlines are passed through as-is,
/// so a text containing a line break will not re-import as a single row.
pub fn encode_results(results: &[BatchResult]) -> String {
    let mut lines = Vec::with_capacity(results.len() + 1);
    lines.push(EXPORT_HEADER.to_string());
    for r in results {
        lines.push(format!(
            "{},{},{},{}",
            r.id,
            quote_field(&r.text),
            r.sentiment,
            r.confidence
        ));
    }
    lines.join("\n")
}

fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Output column of the preprocessing pipeline. The service reads it when
/// none of [`TEXT_COLUMNS`] is present; it is not advertised to users.
pub const PREPROCESSED_COLUMN: &str = "processed_review";

/// Finds the column the service would read review text from.
///
/// Only the header record is parsed. Matching is case-sensitive and follows
/// [`TEXT_COLUMNS`] order, not header order, then [`PREPROCESSED_COLUMN`].
pub fn find_text_column(data: &[u8]) -> Result<Option<&'static str>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);
    let headers = reader.headers()?;
    Ok(TEXT_COLUMNS
        .iter()
        .copied()
        .chain(std::iter::once(PREPROCESSED_COLUMN))
        .find(|col| headers.iter().any(|h| h == *col)))
}

pub fn export_filename(date: NaiveDate) -> String {
    format!("{}{}.csv", EXPORT_PREFIX, date.format("%Y-%m-%d"))
}

/// Help text shown next to the upload control.
pub fn column_help() -> String {
    format!(
        "CSV file should contain a {} column",
        TEXT_COLUMNS
            .iter()
            .map(|c| format!("'{c}'"))
            .collect::<Vec<_>>()
            .join(", ")
    )
}
