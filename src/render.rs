// Data -> display conversions, free of egui types. Output is plain text;
// server fields are never interpreted as markup.
use crate::session::{Entry, LogEntry};
use chrono::{DateTime, NaiveDate};

pub const NO_LOGS_TEXT: &str = "No emails sent yet.";
pub const LOGS_FAILED_TEXT: &str = "Failed to load logs.";
pub const LOGS_LOADING_TEXT: &str = "Loading logs...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOption {
    /// The entry's page id.
    pub value: String,
    pub label: String,
}

pub fn entry_options(entries: &[Entry]) -> Vec<EntryOption> {
    entries
        .iter()
        .map(|e| EntryOption {
            value: e.page_id.clone(),
            label: format!("{} — {}", e.recipient_email, e.category),
        })
        .collect()
}

/// One refinement exchange as shown in the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub user_text: String,
    pub response_lines: Vec<String>,
}

pub fn transcript_entry(user_text: &str, response_body: &str) -> TranscriptEntry {
    TranscriptEntry {
        user_text: user_text.to_string(),
        response_lines: body_lines(response_body),
    }
}

/// Splits free text on newlines so each line renders on its own row.
pub fn body_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    pub date_sent: String,
    pub recipient: String,
    pub subject: String,
    pub body_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogsView {
    #[default]
    Loading,
    Empty,
    Table(Vec<LogRow>),
    Failed,
}

impl LogsView {
    /// Placeholder text for the non-table states.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            LogsView::Loading => Some(LOGS_LOADING_TEXT),
            LogsView::Empty => Some(NO_LOGS_TEXT),
            LogsView::Failed => Some(LOGS_FAILED_TEXT),
            LogsView::Table(_) => None,
        }
    }
}

pub fn logs_view(logs: &[LogEntry]) -> LogsView {
    if logs.is_empty() {
        return LogsView::Empty;
    }
    LogsView::Table(
        logs.iter()
            .map(|l| LogRow {
                date_sent: display_date(&l.date_sent),
                recipient: l.recipient.clone(),
                subject: l.subject.clone(),
                body_lines: body_lines(&l.final_body),
            })
            .collect(),
    )
}

/// Backend dates arrive as `YYYY-MM-DD` (sometimes a full timestamp).
/// Unrecognized values are shown as-is.
pub fn display_date(raw: &str) -> String {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()));
    match date {
        Some(d) => d.format("%b %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}
