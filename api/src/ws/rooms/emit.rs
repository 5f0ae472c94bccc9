use async_trait::async_trait;
use marker::ProgressSink;
use marker::types::{EvaluationReport, ReportEntry};
use serde::Serialize;
use services::room::RoomView;
use util::ws::WebSocketManager;

use super::topics::{room_topic, submission_topic};
use crate::ws::core::{envelope, event::Event};

#[derive(Debug, Serialize)]
pub struct RoomUpdated<'a> {
    #[serde(flatten)]
    pub room: &'a RoomView,
}

impl Event for RoomUpdated<'_> {
    const NAME: &'static str = "room.updated";
    fn topic_path(&self) -> String {
        room_topic(&self.room.code)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostTransferred {
    pub new_host: i64,
    #[serde(skip)]
    pub code: String,
}

impl Event for HostTransferred {
    const NAME: &'static str = "room.host_transferred";
    fn topic_path(&self) -> String {
        room_topic(&self.code)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleStarted {
    pub assigned_problem_id: i64,
    #[serde(skip)]
    pub code: String,
}

impl Event for BattleStarted {
    const NAME: &'static str = "battle.started";
    fn topic_path(&self) -> String {
        room_topic(&self.code)
    }
}

#[derive(Debug, Serialize)]
pub struct SubmissionEntry<'a> {
    pub index: usize,
    pub entry: &'a ReportEntry,
    #[serde(skip)]
    pub code: &'a str,
    #[serde(skip)]
    pub user_id: i64,
}

impl Event for SubmissionEntry<'_> {
    const NAME: &'static str = "submission.entry";
    fn topic_path(&self) -> String {
        submission_topic(self.code, self.user_id)
    }
}

#[derive(Debug, Serialize)]
pub struct SubmissionCompleted<'a> {
    pub report: &'a EvaluationReport,
    #[serde(skip)]
    pub code: &'a str,
    #[serde(skip)]
    pub user_id: i64,
}

impl Event for SubmissionCompleted<'_> {
    const NAME: &'static str = "submission.completed";
    fn topic_path(&self) -> String {
        submission_topic(self.code, self.user_id)
    }
}

pub async fn room_updated(ws: &WebSocketManager, room: &RoomView) {
    envelope::emit(ws, &RoomUpdated { room }).await;
}

pub async fn host_transferred(ws: &WebSocketManager, code: &str, new_host: i64) {
    let ev = HostTransferred {
        new_host,
        code: code.to_owned(),
    };
    envelope::emit(ws, &ev).await;
}

pub async fn battle_started(ws: &WebSocketManager, code: &str, assigned_problem_id: i64) {
    let ev = BattleStarted {
        assigned_problem_id,
        code: code.to_owned(),
    };
    envelope::emit(ws, &ev).await;
}

pub async fn submission_completed(
    ws: &WebSocketManager,
    code: &str,
    user_id: i64,
    report: &EvaluationReport,
) {
    envelope::emit(ws, &SubmissionCompleted { report, code, user_id }).await;
}

/// Publishes each report entry transition on the submitter's private topic.
pub struct SubmissionProgress {
    pub ws: WebSocketManager,
    pub code: String,
    pub user_id: i64,
}

#[async_trait]
impl ProgressSink for SubmissionProgress {
    async fn entry_updated(&self, index: usize, entry: &ReportEntry) {
        let ev = SubmissionEntry {
            index,
            entry,
            code: &self.code,
            user_id: self.user_id,
        };
        envelope::emit(&self.ws, &ev).await;
    }
}
