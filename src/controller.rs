use crate::api::{ApproveRequest, GenerateDraftRequest, RefineDraftRequest, Request, Response};
use crate::render::{self, EntryOption, LogsView, TranscriptEntry};
use crate::session::{Draft, DraftSession, Entry};
use log::{debug, error, info, warn};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use thiserror::Error;

/// User actions that talk to the backend and may only run one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Generate,
    Refine,
    Approve,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Generate => "Draft generation",
            Action::Refine => "Refinement",
            Action::Approve => "Sending",
        })
    }
}

// --- Error Handling ---
/// Reasons a trigger is refused locally. Nothing is sent to the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select an entry first.")]
    NoEntrySelected,

    #[error("Please enter a prompt first.")]
    EmptyPrompt,

    #[error("Generate a draft first.")]
    NoDraft,

    #[error("Type a refinement first.")]
    EmptyRefinement,

    #[error("Nothing to approve.")]
    NothingToApprove,

    #[error("{0} is already in progress.")]
    InFlight(Action),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message the user has to acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// Controller for one drafting session.
///
/// Every user action is split in two halves. The trigger (`generate_draft`,
/// `refine_draft`, `approve_draft`, `load_entries`, `load_logs`) validates
/// local state and hands back the [`Request`] to send. [`apply`] takes the
/// matching [`Response`], updates state and returns any follow-up requests.
/// Both halves run on the UI thread, so handlers never interleave their
/// effects; only the network wait happens elsewhere.
///
/// [`apply`]: DraftController::apply
pub struct DraftController {
    entries: Vec<Entry>,
    entry_options: Vec<EntryOption>,
    selected_entry: Option<String>,

    /// Free-text instruction sent with the next generation.
    pub prompt_input: String,
    /// Pending refinement text.
    pub chat_input: String,

    draft_surface: String,
    transcript: Vec<TranscriptEntry>,
    logs: LogsView,

    session: DraftSession,
    in_flight: HashSet<Action>,
    notices: VecDeque<Notice>,
    status_message: String,
}

impl Default for DraftController {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            entry_options: Vec::new(),
            selected_entry: None,
            prompt_input: String::new(),
            chat_input: String::new(),
            draft_surface: String::new(),
            transcript: Vec::new(),
            logs: LogsView::Loading,
            session: DraftSession::new(),
            in_flight: HashSet::new(),
            notices: VecDeque::new(),
            status_message: "Loading entries...".to_string(),
        }
    }
}

impl DraftController {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Triggers ---

    pub fn load_entries(&mut self) -> Request {
        Request::ListEntries
    }

    pub fn load_logs(&mut self) -> Request {
        Request::ListLogs
    }

    pub fn generate_draft(&mut self) -> Result<Request, ValidationError> {
        self.ensure_idle(Action::Generate)?;

        let Some(entry) = self.selected_entry().cloned() else {
            return Err(self.reject(ValidationError::NoEntrySelected));
        };
        let prompt = self.prompt_input.trim().to_string();
        if prompt.is_empty() {
            return Err(self.reject(ValidationError::EmptyPrompt));
        }

        info!("Requesting draft for {} ({})", entry.recipient_email, entry.page_id);
        self.begin(Action::Generate, format!("Generating draft for {}...", entry.recipient_email));
        Ok(Request::Generate(GenerateDraftRequest::new(&entry, &prompt)))
    }

    pub fn refine_draft(&mut self) -> Result<Request, ValidationError> {
        self.ensure_idle(Action::Refine)?;

        let (Some(token), Some(draft)) = (self.session.token(), self.session.current()) else {
            return Err(self.reject(ValidationError::NoDraft));
        };
        let request = RefineDraftRequest {
            page_id: draft.page_id.clone(),
            body: draft.body.clone(),
            refinement: self.chat_input.trim().to_string(),
        };
        if request.refinement.is_empty() {
            return Err(self.reject(ValidationError::EmptyRefinement));
        }

        self.begin(Action::Refine, "Refining draft...".to_string());
        Ok(Request::Refine(token, request))
    }

    pub fn approve_draft(&mut self) -> Result<Request, ValidationError> {
        self.ensure_idle(Action::Approve)?;

        let (Some(token), Some(draft)) = (self.session.token(), self.session.current()) else {
            return Err(self.reject(ValidationError::NothingToApprove));
        };

        info!("Approving draft for {} ({})", draft.recipient, draft.page_id);
        let request = ApproveRequest {
            page_id: draft.page_id.clone(),
        };
        let status = format!("Sending email to {}...", draft.recipient);
        self.begin(Action::Approve, status);
        Ok(Request::Approve(token, request))
    }

    // --- Responses ---

    /// Applies a backend response and returns the requests it triggers.
    pub fn apply(&mut self, response: Response) -> Vec<Request> {
        match response {
            Response::Entries(Ok(entries)) => {
                debug!("Loaded {} entries", entries.len());
                self.set_entries(entries);
                self.status_message = format!("{} pending entries.", self.entries.len());
            }
            Response::Entries(Err(e)) => {
                // Passive refresh: log only, keep the previous options.
                error!("Failed to load entries: {}", e);
            }
            Response::Logs(Ok(logs)) => {
                debug!("Loaded {} sent logs", logs.len());
                self.logs = render::logs_view(&logs);
            }
            Response::Logs(Err(e)) => {
                error!("Failed to load logs: {}", e);
                self.logs = LogsView::Failed;
            }
            Response::Generated { request, result } => {
                self.finish(Action::Generate);
                match result {
                    Ok(generated) => {
                        let draft =
                            Draft::generated(&request.entry(), generated.subject, generated.email_body);
                        self.draft_surface = draft.body.clone();
                        self.status_message = format!("Draft ready for {}.", draft.recipient);
                        self.session.start(draft);
                        self.transcript.clear();
                    }
                    Err(e) => {
                        error!("Draft generation failed: {}", e);
                        self.status_message = "Draft generation failed.".to_string();
                        self.notify(NoticeLevel::Error, format!("Draft generation failed:\n{}", e));
                    }
                }
            }
            Response::Refined {
                draft,
                request,
                result,
            } => {
                self.finish(Action::Refine);
                match result {
                    Ok(refined) => {
                        if self.session.refine(draft, refined.email_body.clone()) {
                            self.transcript
                                .push(render::transcript_entry(&request.refinement, &refined.email_body));
                            self.draft_surface = refined.email_body;
                            self.chat_input.clear();
                            self.status_message = "Draft refined.".to_string();
                        } else {
                            warn!(
                                "Dropping refinement for {}: the draft was replaced meanwhile",
                                request.page_id
                            );
                            self.status_message = "Refinement discarded; the draft changed.".to_string();
                        }
                    }
                    Err(e) => {
                        error!("Refinement failed: {}", e);
                        self.status_message = "Refinement failed.".to_string();
                        self.notify(NoticeLevel::Error, format!("Refinement failed:\n{}", e));
                    }
                }
            }
            Response::Approved {
                draft,
                request,
                result,
            } => {
                self.finish(Action::Approve);
                match result {
                    Ok(approval) => {
                        info!("Email for {} sent", request.page_id);
                        let message = if approval.message.trim().is_empty() {
                            "Email sent.".to_string()
                        } else {
                            approval.message
                        };
                        self.notify(NoticeLevel::Info, message);
                        // A draft generated while sending stays untouched.
                        if self.session.clear(draft).is_some() {
                            self.draft_surface.clear();
                            self.transcript.clear();
                        } else {
                            debug!("Sent draft for {} was already replaced", request.page_id);
                        }
                        self.status_message = "Email sent.".to_string();
                        return vec![self.load_entries(), self.load_logs()];
                    }
                    Err(e) => {
                        error!("Sending {} failed: {}", request.page_id, e);
                        self.status_message = "Send failed.".to_string();
                        self.notify(NoticeLevel::Error, format!("Send failed:\n{}", e));
                    }
                }
            }
        }
        Vec::new()
    }

    // --- View state ---

    pub fn entry_options(&self) -> &[EntryOption] {
        &self.entry_options
    }

    pub fn selected_entry_id(&self) -> Option<&str> {
        self.selected_entry.as_deref()
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        let id = self.selected_entry.as_deref()?;
        self.entries.iter().find(|e| e.page_id == id)
    }

    pub fn select_entry(&mut self, page_id: &str) {
        if self.entries.iter().any(|e| e.page_id == page_id) {
            self.selected_entry = Some(page_id.to_string());
        }
    }

    pub fn draft_surface(&self) -> &str {
        &self.draft_surface
    }

    pub fn current_draft(&self) -> Option<&Draft> {
        self.session.current()
    }

    pub fn has_draft(&self) -> bool {
        self.session.is_active()
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn logs(&self) -> &LogsView {
        &self.logs
    }

    pub fn is_in_flight(&self, action: Action) -> bool {
        self.in_flight.contains(&action)
    }

    pub fn is_busy(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// The oldest notice not yet dismissed.
    pub fn notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }

    // --- Internals ---

    fn set_entries(&mut self, entries: Vec<Entry>) {
        self.entry_options = render::entry_options(&entries);
        // Same as a select control: keep the selection if it survived,
        // otherwise the first option is selected.
        let kept = self
            .selected_entry
            .take()
            .filter(|id| entries.iter().any(|e| &e.page_id == id));
        self.selected_entry = kept.or_else(|| entries.first().map(|e| e.page_id.clone()));
        self.entries = entries;
    }

    fn ensure_idle(&mut self, action: Action) -> Result<(), ValidationError> {
        if self.in_flight.contains(&action) {
            let err = ValidationError::InFlight(action);
            self.status_message = err.to_string();
            return Err(err);
        }
        Ok(())
    }

    /// Reports a refused trigger. An empty refinement is ignored silently.
    fn reject(&mut self, err: ValidationError) -> ValidationError {
        debug!("Rejected: {}", err);
        if err != ValidationError::EmptyRefinement {
            self.notify(NoticeLevel::Info, err.to_string());
        }
        err
    }

    fn begin(&mut self, action: Action, status: String) {
        self.in_flight.insert(action);
        self.status_message = status;
    }

    fn finish(&mut self, action: Action) {
        self.in_flight.remove(&action);
    }

    fn notify(&mut self, level: NoticeLevel, text: String) {
        self.notices.push_back(Notice { level, text });
    }
}
