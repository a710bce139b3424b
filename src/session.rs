use serde::{Deserialize, Serialize};

/// A pending unit of work as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub page_id: String,
    pub recipient_email: String,
    pub category: String,
    #[serde(default)]
    pub job_description: String,
}

/// A previously sent email. Read-only on this side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub date_sent: String,
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub final_body: String,
}

/// The email currently under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub page_id: String,
    pub recipient: String,
    pub category: String,
    pub job_description: String,
    pub subject: String,
    pub body: String,
}

impl Draft {
    /// Builds a draft from the entry it was generated for. A missing or blank
    /// subject falls back to the entry's category.
    pub fn generated(entry: &Entry, subject: Option<String>, body: String) -> Self {
        let subject = subject
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| entry.category.clone());
        Self {
            page_id: entry.page_id.clone(),
            recipient: entry.recipient_email.clone(),
            category: entry.category.clone(),
            job_description: entry.job_description.clone(),
            subject,
            body,
        }
    }
}

/// Identifies one generated draft. Refinements keep the token; every new
/// generation gets a fresh one, even for the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DraftToken(u64);

/// Owner of the single "current draft" slot of a session.
///
/// Lifecycle: empty -> populated on generate -> mutated on refine -> cleared
/// on approve. Exactly one draft exists at a time and no history is kept.
#[derive(Debug, Default)]
pub struct DraftSession {
    current: Option<(DraftToken, Draft)>,
    generation: u64,
}

impl DraftSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Draft> {
        self.current.as_ref().map(|(_, draft)| draft)
    }

    /// Token of the held draft, if any.
    pub fn token(&self) -> Option<DraftToken> {
        self.current.as_ref().map(|(token, _)| *token)
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Replaces whatever draft was held before.
    pub fn start(&mut self, draft: Draft) -> DraftToken {
        self.generation += 1;
        let token = DraftToken(self.generation);
        self.current = Some((token, draft));
        token
    }

    /// Swaps in a refined body. Returns `false` when the draft `token` refers
    /// to is no longer the held one.
    pub fn refine(&mut self, token: DraftToken, body: String) -> bool {
        match self.current.as_mut() {
            Some((held, draft)) if *held == token => {
                draft.body = body;
                true
            }
            _ => false,
        }
    }

    /// Drops the held draft if it is still the one `token` refers to.
    pub fn clear(&mut self, token: DraftToken) -> Option<Draft> {
        match self.current.take() {
            Some((held, draft)) if held == token => Some(draft),
            other => {
                self.current = other;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> Entry {
        Entry {
            page_id: "page-1".to_string(),
            recipient_email: "ada@example.com".to_string(),
            category: "Networking".to_string(),
            job_description: "Backend engineer".to_string(),
        }
    }

    #[test]
    fn generated_draft_keeps_returned_subject() {
        let draft = Draft::generated(&entry(), Some("Follow-up".to_string()), "Hi".to_string());
        assert_eq!(draft.subject, "Follow-up");
        assert_eq!(draft.recipient, "ada@example.com");
        assert_eq!(draft.body, "Hi");
    }

    #[test]
    fn generated_draft_falls_back_to_category() {
        let draft = Draft::generated(&entry(), None, "Hi".to_string());
        assert_eq!(draft.subject, "Networking");

        let blank = Draft::generated(&entry(), Some("  ".to_string()), "Hi".to_string());
        assert_eq!(blank.subject, "Networking");
    }

    #[test]
    fn session_lifecycle() {
        let mut session = DraftSession::new();
        assert!(!session.is_active());
        assert_eq!(session.token(), None);

        let token = session.start(Draft::generated(&entry(), None, "v1".to_string()));
        assert_eq!(session.token(), Some(token));
        assert!(session.refine(token, "v2".to_string()));
        assert_eq!(session.current().map(|d| d.body.as_str()), Some("v2"));

        let cleared = session.clear(token);
        assert_eq!(cleared.map(|d| d.body), Some("v2".to_string()));
        assert!(session.current().is_none());
        assert!(!session.refine(token, "late".to_string()));
    }

    #[test]
    fn regenerating_same_entry_invalidates_old_token() {
        let mut session = DraftSession::new();
        let old = session.start(Draft::generated(&entry(), None, "old".to_string()));
        let new = session.start(Draft::generated(&entry(), None, "new".to_string()));
        assert_ne!(old, new);

        assert!(!session.refine(old, "refined old".to_string()));
        assert_eq!(session.clear(old), None);
        assert_eq!(session.current().map(|d| d.body.as_str()), Some("new"));

        assert!(session.clear(new).is_some());
    }

    #[test]
    fn entry_without_job_description_deserializes() {
        let json = r#"{"page_id":"p","recipient_email":"a@b.c","category":"Intro"}"#;
        let parsed: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.job_description, "");
    }
}
