use std::fmt;

use crate::error::RadExtractError;
use crate::extraction::ReportExtractor;
use crate::model::SessionRecord;
use crate::pipeline::{extract_manual, BatchOutcome};
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Input,
    Review,
    Summary,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Input => write!(f, "input"),
            View::Review => write!(f, "review"),
            View::Summary => write!(f, "summary"),
        }
    }
}

/// Application state for one session: the current view, the accepted
/// records, and the extraction under review (if any).
///
/// All changes go through the transition methods.
#[derive(Debug, Default)]
pub struct Workflow {
    view: View,
    session: SessionStore,
    draft: Option<SessionRecord>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn draft(&self) -> Option<&SessionRecord> {
        self.draft.as_ref()
    }

    /// Extract one report and move to review. On error the view stays at
    /// input so the user can revise and retry.
    pub fn submit(
        &mut self,
        key_id: &str,
        order_id: &str,
        text: &str,
        extractor: &dyn ReportExtractor,
    ) -> Result<&SessionRecord, RadExtractError> {
        self.require(View::Input, "submit")?;
        let record = extract_manual(key_id, order_id, text, extractor)?;
        self.view = View::Review;
        Ok(self.draft.insert(record))
    }

    /// Accept the draft and go back to input for the next report.
    pub fn save_and_next(&mut self) -> Result<(), RadExtractError> {
        self.require(View::Review, "save")?;
        let record = self.draft.take().ok_or(RadExtractError::NothingToSave)?;
        self.session.append(record);
        self.view = View::Input;
        Ok(())
    }

    /// Drop the draft and go back to input.
    pub fn discard(&mut self) -> Result<(), RadExtractError> {
        self.require(View::Review, "discard")?;
        self.draft = None;
        self.view = View::Input;
        Ok(())
    }

    /// Go to the summary, saving a pending draft first.
    pub fn finish(&mut self) {
        if let Some(record) = self.draft.take() {
            self.session.append(record);
        }
        self.view = View::Summary;
    }

    /// Append the accepted records of a batch run and go to the summary.
    pub fn ingest_batch(&mut self, outcome: BatchOutcome) -> Result<usize, RadExtractError> {
        if self.view() == View::Review {
            return Err(self.invalid("load batch"));
        }
        let added = outcome.records.len();
        self.session.append_many(outcome.records);
        self.view = View::Summary;
        Ok(added)
    }

    /// Leave the summary to enter more reports, keeping the session.
    pub fn resume(&mut self) -> Result<(), RadExtractError> {
        self.require(View::Summary, "resume")?;
        self.view = View::Input;
        Ok(())
    }

    /// Clear the whole session. Confirmation is the caller's job.
    pub fn reset(&mut self) {
        self.session.reset();
        self.draft = None;
        self.view = View::Input;
    }

    fn require(&self, view: View, action: &'static str) -> Result<(), RadExtractError> {
        if self.view() == view {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> RadExtractError {
        RadExtractError::InvalidTransition {
            action,
            view: self.view().to_string(),
        }
    }
}
