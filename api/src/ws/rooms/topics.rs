/// Room-wide topic: membership, host and battle state changes.
pub fn room_topic(code: &str) -> String {
    format!("room:{code}")
}

/// Private topic carrying one user's graded-run progress in a room.
pub fn submission_topic(code: &str, user_id: i64) -> String {
    format!("room:{code}:user:{user_id}:submission")
}
