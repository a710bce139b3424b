// Scripted in-memory backend for controller tests.
use super::{
    ApiError, Approval, ApproveRequest, Backend, GenerateDraftRequest, GeneratedDraft,
    RefineDraftRequest, RefinedDraft,
};
use crate::session::{Entry, LogEntry};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A call as the backend saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListEntries,
    ListLogs,
    Generate(GenerateDraftRequest),
    Refine(RefineDraftRequest),
    Approve(ApproveRequest),
}

impl Call {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Call::ListEntries => "GET /entries",
            Call::ListLogs => "GET /logs",
            Call::Generate(_) => "POST /draft_email",
            Call::Refine(_) => "POST /refine_draft",
            Call::Approve(_) => "POST /approve_email",
        }
    }
}

/// Records every call and answers from per-endpoint queues. The list
/// endpoints answer with an empty list once their queue runs dry; the draft
/// endpoints panic, since an unscripted POST is a test bug.
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    entries: Mutex<VecDeque<Result<Vec<Entry>, ApiError>>>,
    logs: Mutex<VecDeque<Result<Vec<LogEntry>, ApiError>>>,
    drafts: Mutex<VecDeque<Result<GeneratedDraft, ApiError>>>,
    refinements: Mutex<VecDeque<Result<RefinedDraft, ApiError>>>,
    approvals: Mutex<VecDeque<Result<Approval, ApiError>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(self, result: Result<Vec<Entry>, ApiError>) -> Self {
        self.entries.lock().unwrap().push_back(result);
        self
    }

    pub fn logs(self, result: Result<Vec<LogEntry>, ApiError>) -> Self {
        self.logs.lock().unwrap().push_back(result);
        self
    }

    pub fn draft(self, result: Result<GeneratedDraft, ApiError>) -> Self {
        self.drafts.lock().unwrap().push_back(result);
        self
    }

    pub fn refinement(self, result: Result<RefinedDraft, ApiError>) -> Self {
        self.refinements.lock().unwrap().push_back(result);
        self
    }

    pub fn approval(self, result: Result<Approval, ApiError>) -> Self {
        self.approvals.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, endpoint: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.endpoint() == endpoint)
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn next<T>(queue: &Mutex<VecDeque<Result<T, ApiError>>>, endpoint: &str) -> Result<T, ApiError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| panic!("unscripted call to {}", endpoint))
}

impl Backend for FakeBackend {
    async fn list_entries(&self) -> Result<Vec<Entry>, ApiError> {
        self.record(Call::ListEntries);
        self.entries.lock().unwrap().pop_front().unwrap_or(Ok(Vec::new()))
    }

    async fn draft_email(&self, request: &GenerateDraftRequest) -> Result<GeneratedDraft, ApiError> {
        self.record(Call::Generate(request.clone()));
        next(&self.drafts, "POST /draft_email")
    }

    async fn refine_draft(&self, request: &RefineDraftRequest) -> Result<RefinedDraft, ApiError> {
        self.record(Call::Refine(request.clone()));
        next(&self.refinements, "POST /refine_draft")
    }

    async fn approve_email(&self, request: &ApproveRequest) -> Result<Approval, ApiError> {
        self.record(Call::Approve(request.clone()));
        next(&self.approvals, "POST /approve_email")
    }

    async fn list_logs(&self) -> Result<Vec<LogEntry>, ApiError> {
        self.record(Call::ListLogs);
        self.logs.lock().unwrap().pop_front().unwrap_or(Ok(Vec::new()))
    }
}
