use crate::model::SessionRecord;

/// Accepted extraction records for the current session.
///
/// Append-only and in insertion order; the only removal is a full reset.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    records: Vec<SessionRecord>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: SessionRecord) {
        self.records.push(record);
    }

    pub fn append_many(&mut self, records: impl IntoIterator<Item = SessionRecord>) {
        self.records.extend(records);
    }

    /// Drop every record. Irreversible.
    pub fn reset(&mut self) {
        let dropped = self.records.len();
        self.records.clear();
        tracing::info!(dropped, "session reset");
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
