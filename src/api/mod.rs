// Contract with the drafting backend: five JSON-over-HTTP endpoints.
pub mod http;

#[cfg(test)]
pub mod fake;

use crate::session::{DraftToken, Entry, LogEntry};
use log::debug;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

// --- Error Handling ---
#[derive(Error, Debug)]
pub enum ApiError {
    /// Message from the backend's `{"error": ...}` body.
    #[error("{0}")]
    Backend(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Body of `POST /draft_email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateDraftRequest {
    pub page_id: String,
    pub recipient_email: String,
    pub category: String,
    pub job_description: String,
    pub prompt: String,
}

impl GenerateDraftRequest {
    pub fn new(entry: &Entry, prompt: &str) -> Self {
        Self {
            page_id: entry.page_id.clone(),
            recipient_email: entry.recipient_email.clone(),
            category: entry.category.clone(),
            job_description: entry.job_description.clone(),
            prompt: prompt.to_string(),
        }
    }

    /// The entry as it was when the request was sent.
    pub fn entry(&self) -> Entry {
        Entry {
            page_id: self.page_id.clone(),
            recipient_email: self.recipient_email.clone(),
            category: self.category.clone(),
            job_description: self.job_description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratedDraft {
    pub email_body: String,
    #[serde(default)]
    pub subject: Option<String>,
}

/// Body of `POST /refine_draft`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefineDraftRequest {
    pub page_id: String,
    pub body: String,
    pub refinement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefinedDraft {
    pub email_body: String,
}

/// Body of `POST /approve_email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApproveRequest {
    pub page_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Approval {
    #[serde(default)]
    pub message: String,
}

/// Shape of every non-2xx body the backend sends.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// One method per backend endpoint.
pub trait Backend {
    fn list_entries(&self) -> impl Future<Output = Result<Vec<Entry>, ApiError>> + Send;

    fn draft_email(
        &self,
        request: &GenerateDraftRequest,
    ) -> impl Future<Output = Result<GeneratedDraft, ApiError>> + Send;

    fn refine_draft(
        &self,
        request: &RefineDraftRequest,
    ) -> impl Future<Output = Result<RefinedDraft, ApiError>> + Send;

    fn approve_email(
        &self,
        request: &ApproveRequest,
    ) -> impl Future<Output = Result<Approval, ApiError>> + Send;

    fn list_logs(&self) -> impl Future<Output = Result<Vec<LogEntry>, ApiError>> + Send;
}

/// A request produced by a controller trigger, waiting to be sent. Requests
/// about an existing draft carry its token so a late answer can be matched
/// against the draft that is current when it arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ListEntries,
    ListLogs,
    Generate(GenerateDraftRequest),
    Refine(DraftToken, RefineDraftRequest),
    Approve(DraftToken, ApproveRequest),
}

impl Request {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Request::ListEntries => "GET /entries",
            Request::ListLogs => "GET /logs",
            Request::Generate(_) => "POST /draft_email",
            Request::Refine(..) => "POST /refine_draft",
            Request::Approve(..) => "POST /approve_email",
        }
    }
}

/// Outcome of a [`Request`], carrying the request back so the controller can
/// apply it without keeping its own copy.
#[derive(Debug)]
pub enum Response {
    Entries(Result<Vec<Entry>, ApiError>),
    Logs(Result<Vec<LogEntry>, ApiError>),
    Generated {
        request: GenerateDraftRequest,
        result: Result<GeneratedDraft, ApiError>,
    },
    Refined {
        draft: DraftToken,
        request: RefineDraftRequest,
        result: Result<RefinedDraft, ApiError>,
    },
    Approved {
        draft: DraftToken,
        request: ApproveRequest,
        result: Result<Approval, ApiError>,
    },
}

/// Sends one request to the backend.
pub async fn dispatch<B: Backend>(backend: &B, request: Request) -> Response {
    debug!("-> {}", request.endpoint());
    match request {
        Request::ListEntries => Response::Entries(backend.list_entries().await),
        Request::ListLogs => Response::Logs(backend.list_logs().await),
        Request::Generate(request) => {
            let result = backend.draft_email(&request).await;
            Response::Generated { request, result }
        }
        Request::Refine(draft, request) => {
            let result = backend.refine_draft(&request).await;
            Response::Refined {
                draft,
                request,
                result,
            }
        }
        Request::Approve(draft, request) => {
            let result = backend.approve_email(&request).await;
            Response::Approved {
                draft,
                request,
                result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generate_request_serializes_entry_fields_and_prompt() {
        let entry = Entry {
            page_id: "p1".to_string(),
            recipient_email: "ada@example.com".to_string(),
            category: "Networking".to_string(),
            job_description: "Rust \"backend\" role".to_string(),
        };
        let request = GenerateDraftRequest::new(&entry, "Write a follow-up");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "page_id": "p1",
                "recipient_email": "ada@example.com",
                "category": "Networking",
                "job_description": "Rust \"backend\" role",
                "prompt": "Write a follow-up",
            })
        );
        assert_eq!(request.entry(), entry);
    }

    #[test]
    fn generated_draft_subject_is_optional() {
        let parsed: GeneratedDraft = serde_json::from_str(r#"{"email_body":"Hi"}"#).unwrap();
        assert_eq!(parsed.subject, None);
    }

    #[test]
    fn error_messages() {
        assert_eq!(ApiError::Backend("send failed".into()).to_string(), "send failed");
        assert_eq!(ApiError::Status(502).to_string(), "HTTP 502");
    }
}
