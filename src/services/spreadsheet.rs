use chrono::Local;
use itertools::Itertools;

use crate::domain::{ExtractionResult, WorkItem};

const URL_COLUMN: &str = "URL";
const CATEGORY_COLUMN: &str = "Category";
// How many offending values a validation message lists before cutting off.
const MAX_REPORTED_URLS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("failed to read the uploaded file: {0}")]
    Read(#[from] csv::Error),
    #[error("the file must contain 'URL' and 'Category' columns")]
    MissingColumns,
    #[error("invalid URLs found: {}", format_offenders(.0))]
    InvalidUrls(Vec<String>),
}

fn format_offenders(urls: &[String]) -> String {
    urls.iter().take(MAX_REPORTED_URLS).join(", ")
}

/// Parses an uploaded CSV into work items. The whole file is rejected when a
/// required column is missing or any URL fails the scheme check; the batch
/// never starts on a structurally broken file.
pub fn work_items_from_csv(bytes: &[u8]) -> Result<Vec<WorkItem>, ValidationError> {
    let mut reader = csv::Reader::from_reader(bytes);

    let headers = reader.headers()?.clone();
    let url_index = headers.iter().position(|h| h == URL_COLUMN);
    let category_index = headers.iter().position(|h| h == CATEGORY_COLUMN);
    let (url_index, category_index) = match (url_index, category_index) {
        (Some(url_index), Some(category_index)) => (url_index, category_index),
        _ => return Err(ValidationError::MissingColumns),
    };

    let mut items = Vec::new();
    let mut invalid_urls = Vec::new();
    for record in reader.records() {
        let record = record?;
        let url = record.get(url_index).unwrap_or("").to_string();
        let category = record.get(category_index).unwrap_or("").to_string();

        if !url.starts_with("http://") && !url.starts_with("https://") {
            invalid_urls.push(url.clone());
        }
        items.push(WorkItem { url, category });
    }

    if !invalid_urls.is_empty() {
        return Err(ValidationError::InvalidUrls(invalid_urls));
    }

    Ok(items)
}

/// Serializes the full result collection in the export column order:
/// url, category, full_text, link_count, status, error_message.
pub fn results_to_csv(results: &[ExtractionResult]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for result in results {
        writer.serialize(result)?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush the csv writer: {}", e))
}

pub fn export_filename() -> String {
    format!("results_{}.csv", Local::now().format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::{export_filename, results_to_csv, work_items_from_csv, ValidationError};
    use crate::domain::{ExtractionResult, WorkItem};

    #[test]
    fn work_items_from_csv_reads_rows_in_order() {
        let csv = "URL,Category\n\
            https://a.example.com,news\n\
            http://b.example.com,blogs\n";

        let items = work_items_from_csv(csv.as_bytes()).unwrap();

        assert_eq!(
            items,
            vec![
                WorkItem {
                    url: "https://a.example.com".to_string(),
                    category: "news".to_string(),
                },
                WorkItem {
                    url: "http://b.example.com".to_string(),
                    category: "blogs".to_string(),
                },
            ]
        );
    }

    #[test]
    fn work_items_from_csv_ignores_extra_columns() {
        let csv = "Notes,URL,Category\nsomething,https://a.example.com,news\n";

        let items = work_items_from_csv(csv.as_bytes()).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "https://a.example.com");
    }

    #[test]
    fn work_items_from_csv_rejects_a_missing_category_column() {
        let csv = "URL,Tag\nhttps://a.example.com,news\n";

        let error = work_items_from_csv(csv.as_bytes()).unwrap_err();

        assert!(matches!(error, ValidationError::MissingColumns));
        assert!(error.to_string().contains("'Category'"));
    }

    #[test]
    fn work_items_from_csv_rejects_urls_without_a_scheme() {
        let csv = "URL,Category\n\
            www.one.com,a\n\
            ftp://two.com,b\n\
            three.com,c\n\
            four.com,d\n\
            https://ok.example.com,e\n";

        let error = work_items_from_csv(csv.as_bytes()).unwrap_err();

        let message = error.to_string();
        assert!(message.contains("www.one.com"));
        assert!(message.contains("ftp://two.com"));
        assert!(message.contains("three.com"));
        // Only the first three offenders are listed.
        assert!(!message.contains("four.com"));
    }

    #[test]
    fn results_to_csv_writes_the_export_columns() {
        let results = vec![
            ExtractionResult::success(
                WorkItem {
                    url: "https://a.example.com".to_string(),
                    category: "news".to_string(),
                },
                "some page text".to_string(),
                4,
            ),
            ExtractionResult::failure(
                WorkItem {
                    url: "https://b.example.com".to_string(),
                    category: "blogs".to_string(),
                },
                "Error processing URL https://b.example.com: unexpected status 404 Not Found"
                    .to_string(),
            ),
        ];

        let bytes = results_to_csv(&results).unwrap();
        let output = String::from_utf8(bytes).unwrap();
        let mut lines = output.lines();

        assert_eq!(
            lines.next(),
            Some("url,category,full_text,link_count,status,error_message")
        );
        assert_eq!(
            lines.next(),
            Some("https://a.example.com,news,some page text,4,success,")
        );
        let error_row = lines.next().unwrap();
        assert!(error_row.starts_with("https://b.example.com,blogs,,0,error,"));
        assert!(error_row.contains("404"));
    }

    #[test]
    fn export_filename_is_timestamped() {
        let name = export_filename();

        assert!(name.starts_with("results_"));
        assert!(name.ends_with(".csv"));
        // results_YYYYmmdd_HHMMSS.csv
        assert_eq!(name.len(), "results_20240101_120000.csv".len());
    }
}
