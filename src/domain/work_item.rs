use std::fmt;

use serde::Serialize;

/// Longest text body kept on a result; anything longer gets an ellipsis.
pub const TEXT_LIMIT: usize = 1000;
const ELLIPSIS: &str = "...";

/// One spreadsheet row. Consumed exactly once by the batch runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub url: String,
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Error,
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultStatus::Success => write!(f, "success"),
            ResultStatus::Error => write!(f, "error"),
        }
    }
}

/// One output record per WorkItem. Field order matches the export columns.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub url: String,
    pub category: String,
    pub full_text: String,
    pub link_count: usize,
    pub status: ResultStatus,
    pub error_message: Option<String>,
}

impl ExtractionResult {
    pub fn success(item: WorkItem, full_text: String, link_count: usize) -> Self {
        ExtractionResult {
            url: item.url,
            category: item.category,
            full_text: truncate_text(&full_text),
            link_count,
            status: ResultStatus::Success,
            error_message: None,
        }
    }

    pub fn failure(item: WorkItem, message: String) -> Self {
        ExtractionResult {
            url: item.url,
            category: item.category,
            full_text: String::new(),
            link_count: 0,
            status: ResultStatus::Error,
            error_message: Some(message),
        }
    }
}

pub fn truncate_text(text: &str) -> String {
    if text.chars().count() > TEXT_LIMIT {
        let mut truncated: String = text.chars().take(TEXT_LIMIT).collect();
        truncated.push_str(ELLIPSIS);
        truncated
    } else {
        text.to_string()
    }
}
