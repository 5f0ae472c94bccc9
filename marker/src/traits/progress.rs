use async_trait::async_trait;

use crate::types::ReportEntry;

/// Receives every report entry transition while a suite runs.
///
/// The driver only calls this for the current attempt; superseded attempts
/// stop publishing before they write anything else.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn entry_updated(&self, index: usize, entry: &ReportEntry);
}

/// Sink that drops every update.
pub struct NoProgress;

#[async_trait]
impl ProgressSink for NoProgress {
    async fn entry_updated(&self, _index: usize, _entry: &ReportEntry) {}
}

#[async_trait]
impl ProgressSink for tokio::sync::mpsc::UnboundedSender<(usize, ReportEntry)> {
    async fn entry_updated(&self, index: usize, entry: &ReportEntry) {
        let _ = self.send((index, entry.clone()));
    }
}
