use chrono::{DateTime, Utc};
use db::models::{room, room_participant};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;

pub use db::models::room::Model as Room;

/// Failures of room lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("Room not found")]
    NotFound,
    #[error("Only the host can perform this action")]
    Forbidden,
    #[error("Battle already started")]
    AlreadyStarted,
    #[error("{0}")]
    InvalidState(String),
    #[error("Room store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<DbErr> for RoomError {
    fn from(err: DbErr) -> Self {
        RoomError::StoreUnavailable(err.to_string())
    }
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    pub user_id: i64,
    pub score: i32,
    pub joined_at: DateTime<Utc>,
}

impl From<room_participant::Model> for ParticipantView {
    fn from(p: room_participant::Model) -> Self {
        Self {
            user_id: p.user_id,
            score: p.score,
            joined_at: p.joined_at,
        }
    }
}

/// Public projection of a room.
///
/// `participants` is the member list in join order; `members` carries the same
/// users with their scores.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub code: String,
    pub host_id: i64,
    pub participants: Vec<i64>,
    pub members: Vec<ParticipantView>,
    pub battle_started: bool,
    pub assigned_problem_id: Option<i64>,
    pub battle_started_at: Option<DateTime<Utc>>,
    pub battle_ends_at: Option<DateTime<Utc>>,
    pub version: i64,
}

impl RoomView {
    pub fn from_parts(
        room: room::Model,
        members: Vec<room_participant::Model>,
        battle_duration_secs: i64,
    ) -> Self {
        let battle_ends_at = room.battle_ends_at(battle_duration_secs);
        let members: Vec<ParticipantView> = members.into_iter().map(Into::into).collect();
        Self {
            participants: members.iter().map(|m| m.user_id).collect(),
            members,
            code: room.code,
            host_id: room.host_id,
            battle_started: room.battle_started,
            assigned_problem_id: room.assigned_problem_id,
            battle_started_at: room.battle_started_at,
            battle_ends_at,
            version: room.version,
        }
    }

    pub fn is_participant(&self, user_id: i64) -> bool {
        self.participants.contains(&user_id)
    }
}

#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub room: RoomView,
    pub already_joined: bool,
    /// Set when the joiner took over an empty room as its host.
    pub new_host: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct LeaveOutcome {
    pub room: RoomView,
    /// Set only when the leaver was host and someone else took over.
    pub new_host: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct StartOutcome {
    pub room: RoomView,
    pub assigned_problem_id: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub code: String,
    pub created_by: i64,
    pub participant_count: usize,
    pub battle_started: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub rank: usize,
    pub user_id: i64,
    pub score: i32,
}
