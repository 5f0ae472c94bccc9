//! Room lifecycle: creation, membership, host transfer and the one-shot
//! battle start.
//!
//! Join and leave are read-modify-write cycles run inside a transaction and
//! closed by a version-checked update of the room row. When another writer
//! got there first the cycle is retried, up to `max_retries` times. Start is a
//! single conditional update, so exactly one concurrent caller can win it.

use chrono::Utc;
use rand::Rng;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};

use crate::room::{
    JoinOutcome, LeaveOutcome, RoomError, RoomSummary, RoomView, ScoreEntry, StartOutcome,
    is_unique_violation,
};
use db::models::room::{self, Entity as RoomEntity};
use db::models::room_participant::{self, Entity as ParticipantEntity};
use util::config;
use util::problem_bank::ProblemBank;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draws a room code of `len` characters from `A-Z0-9`.
pub fn random_code(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

#[derive(Clone)]
pub struct RoomService {
    db: DatabaseConnection,
    code_length: usize,
    max_retries: u32,
    battle_duration_secs: i64,
}

impl RoomService {
    /// Builds a service using the code length, retry bound and battle duration
    /// from the global config.
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            code_length: config::room_code_length(),
            max_retries: config::room_mutation_max_retries(),
            battle_duration_secs: config::battle_duration_seconds(),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_battle_duration_secs(mut self, secs: i64) -> Self {
        self.battle_duration_secs = secs;
        self
    }

    pub fn battle_duration_secs(&self) -> i64 {
        self.battle_duration_secs
    }

    pub async fn create(&self, creator_id: i64) -> Result<RoomView, RoomError> {
        let len = self.code_length;
        self.create_with(creator_id, || random_code(len)).await
    }

    /// Creates a room using `next_code` as the candidate source.
    ///
    /// Candidates are drawn until one is free both at the pre-check and at
    /// insert time. The unique index on `code` is the final authority.
    pub async fn create_with<F>(&self, creator_id: i64, mut next_code: F) -> Result<RoomView, RoomError>
    where
        F: FnMut() -> String,
    {
        loop {
            let code = next_code();
            if room::Model::code_exists(&self.db, &code).await? {
                tracing::debug!(code = %code, "Room code collision, drawing again");
                continue;
            }

            let txn = self.db.begin().await?;
            let created = match room::Model::create(&txn, &code, creator_id).await {
                Ok(created) => created,
                Err(e) if is_unique_violation(&e) => {
                    txn.rollback().await?;
                    tracing::debug!(code = %code, "Lost room code race, drawing again");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let host = room_participant::Model::add(&txn, created.id, creator_id).await?;
            txn.commit().await?;

            tracing::info!(code = %created.code, host = creator_id, "Room created");
            return Ok(RoomView::from_parts(created, vec![host], self.battle_duration_secs));
        }
    }

    pub async fn join(&self, code: &str, user_id: i64) -> Result<JoinOutcome, RoomError> {
        for attempt in 0..self.max_retries {
            let txn = self.db.begin().await?;
            let room = room::Model::find_by_code(&txn, code)
                .await?
                .ok_or(RoomError::NotFound)?;

            if room_participant::Model::find_membership(&txn, room.id, user_id)
                .await?
                .is_some()
            {
                txn.commit().await?;
                return Ok(JoinOutcome {
                    room: self.get(code).await?,
                    already_joined: true,
                    new_host: None,
                });
            }

            // A room emptied by leaves is claimed by whoever joins next.
            let claims_host = room_participant::Model::list_for_room(&txn, room.id)
                .await?
                .is_empty();

            match room_participant::Model::add(&txn, room.id, user_id).await {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => {
                    // Another request for the same user won; the next pass
                    // will see the membership.
                    txn.rollback().await?;
                    continue;
                }
                Err(e) => return Err(e.into()),
            }

            let new_host = claims_host.then_some(user_id);
            if !room::Model::bump_version(&txn, room.id, room.version, new_host).await? {
                txn.rollback().await?;
                tracing::debug!(code, user_id, attempt, "Join conflicted, retrying");
                continue;
            }
            txn.commit().await?;

            tracing::info!(code, user_id, claims_host, "User joined room");
            return Ok(JoinOutcome {
                room: self.get(code).await?,
                already_joined: false,
                new_host,
            });
        }

        Err(self.retries_exhausted("join", code))
    }

    pub async fn leave(&self, code: &str, user_id: i64) -> Result<LeaveOutcome, RoomError> {
        for attempt in 0..self.max_retries {
            let txn = self.db.begin().await?;
            let room = room::Model::find_by_code(&txn, code)
                .await?
                .ok_or(RoomError::NotFound)?;

            if !room_participant::Model::remove(&txn, room.id, user_id).await? {
                txn.rollback().await?;
                return Err(RoomError::InvalidState(
                    "You are not a participant in this room".into(),
                ));
            }

            let remaining = room_participant::Model::list_for_room(&txn, room.id).await?;
            let new_host = match remaining.first() {
                Some(oldest) if room.host_id == user_id => Some(oldest.user_id),
                _ => None,
            };

            if !room::Model::bump_version(&txn, room.id, room.version, new_host).await? {
                txn.rollback().await?;
                tracing::debug!(code, user_id, attempt, "Leave conflicted, retrying");
                continue;
            }
            txn.commit().await?;

            match new_host {
                Some(host) => tracing::info!(code, user_id, new_host = host, "Host left, host transferred"),
                None => tracing::info!(code, user_id, "User left room"),
            }
            return Ok(LeaveOutcome {
                room: self.get(code).await?,
                new_host,
            });
        }

        Err(self.retries_exhausted("leave", code))
    }

    /// Starts the battle, assigning a problem drawn uniformly from `bank`.
    pub async fn start(
        &self,
        code: &str,
        requester_id: i64,
        bank: &ProblemBank,
    ) -> Result<StartOutcome, RoomError> {
        let current = room::Model::find_by_code(&self.db, code)
            .await?
            .ok_or(RoomError::NotFound)?;
        Self::check_startable(&current, requester_id)?;

        let problem_id = bank.pick_random().id;
        if !room::Model::try_start(&self.db, code, requester_id, problem_id).await? {
            // Lost to a concurrent start or host change; report what happened.
            let latest = room::Model::find_by_code(&self.db, code)
                .await?
                .ok_or(RoomError::NotFound)?;
            Self::check_startable(&latest, requester_id)?;
            return Err(RoomError::StoreUnavailable(
                "Battle start did not apply".into(),
            ));
        }

        tracing::info!(code, host = requester_id, problem_id, "Battle started");
        Ok(StartOutcome {
            room: self.get(code).await?,
            assigned_problem_id: problem_id,
        })
    }

    fn check_startable(room: &room::Model, requester_id: i64) -> Result<(), RoomError> {
        if room.host_id != requester_id {
            return Err(RoomError::Forbidden);
        }
        if room.battle_started {
            return Err(RoomError::AlreadyStarted);
        }
        Ok(())
    }

    pub async fn get(&self, code: &str) -> Result<RoomView, RoomError> {
        let room = room::Model::find_by_code(&self.db, code)
            .await?
            .ok_or(RoomError::NotFound)?;
        let members = room_participant::Model::list_for_room(&self.db, room.id).await?;
        Ok(RoomView::from_parts(room, members, self.battle_duration_secs))
    }

    /// Rooms the user hosts or belongs to, oldest first.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<RoomSummary>, RoomError> {
        let member_of = room_participant::Model::room_ids_for_user(&self.db, user_id).await?;
        let rooms = RoomEntity::find()
            .filter(
                Condition::any()
                    .add(room::Column::HostId.eq(user_id))
                    .add(room::Column::Id.is_in(member_of)),
            )
            .order_by_asc(room::Column::Id)
            .all(&self.db)
            .await?;

        let mut summaries = Vec::with_capacity(rooms.len());
        for r in rooms {
            let participant_count = ParticipantEntity::find()
                .filter(room_participant::Column::RoomId.eq(r.id))
                .count(&self.db)
                .await? as usize;
            summaries.push(RoomSummary {
                code: r.code,
                created_by: r.host_id,
                participant_count,
                battle_started: r.battle_started,
            });
        }
        Ok(summaries)
    }

    /// Credits one solve to `user_id` while the battle clock is running.
    pub async fn record_solve(&self, code: &str, user_id: i64) -> Result<RoomView, RoomError> {
        let txn = self.db.begin().await?;
        let room = room::Model::find_by_code(&txn, code)
            .await?
            .ok_or(RoomError::NotFound)?;
        if !room.battle_started {
            txn.rollback().await?;
            return Err(RoomError::InvalidState("Battle has not started".into()));
        }
        if room
            .battle_ends_at(self.battle_duration_secs)
            .is_some_and(|ends_at| Utc::now() > ends_at)
        {
            txn.rollback().await?;
            return Err(RoomError::InvalidState("Battle has ended".into()));
        }
        if !room_participant::Model::add_score(&txn, room.id, user_id, 1).await? {
            txn.rollback().await?;
            return Err(RoomError::InvalidState(
                "You are not a participant in this room".into(),
            ));
        }
        room::Model::touch(&txn, room.id).await?;
        txn.commit().await?;

        tracing::info!(code, user_id, "Solve recorded");
        self.get(code).await
    }

    /// Participants ranked by score, ties broken by join order.
    pub async fn scoreboard(&self, code: &str) -> Result<Vec<ScoreEntry>, RoomError> {
        let view = self.get(code).await?;
        let mut members = view.members;
        // Stable sort keeps join order among equal scores.
        members.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(members
            .into_iter()
            .enumerate()
            .map(|(i, m)| ScoreEntry {
                rank: i + 1,
                user_id: m.user_id,
                score: m.score,
            })
            .collect())
    }

    fn retries_exhausted(&self, op: &str, code: &str) -> RoomError {
        tracing::warn!(op, code, retries = self.max_retries, "Room mutation kept conflicting");
        RoomError::StoreUnavailable(format!(
            "Could not {op} room {code} after {} attempts",
            self.max_retries
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::test_utils::setup_test_db;
    use util::problem_bank::{Problem, ProblemBank};

    fn bank(ids: &[i64]) -> ProblemBank {
        ProblemBank::new(
            ids.iter()
                .map(|&id| Problem {
                    id,
                    title: format!("Problem {id}"),
                    difficulty: "Easy".into(),
                    tags: vec![],
                    description: String::new(),
                    input_format: String::new(),
                    output_format: String::new(),
                    constraints: vec![],
                    sample_testcase: None,
                    testcases: vec![],
                })
                .collect(),
        )
        .unwrap()
    }

    async fn service() -> RoomService {
        RoomService::new(setup_test_db().await)
    }

    #[test]
    fn random_codes_use_the_alphabet() {
        let code = random_code(6);
        assert_eq!(code.len(), 6);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[tokio::test]
    async fn create_makes_creator_host_and_sole_participant() {
        let svc = service().await;
        let room = svc.create(1).await.unwrap();

        assert_eq!(room.host_id, 1);
        assert_eq!(room.participants, vec![1]);
        assert!(!room.battle_started);
        assert!(room.assigned_problem_id.is_none());
    }

    #[tokio::test]
    async fn create_redraws_until_code_is_free() {
        let svc = service().await;
        svc.create_with(1, || "AAAAAA".to_string()).await.unwrap();

        let mut candidates = vec!["BBBBBB", "AAAAAA", "AAAAAA"];
        let room = svc
            .create_with(2, || candidates.pop().unwrap().to_string())
            .await
            .unwrap();

        assert_eq!(room.code, "BBBBBB");
        assert_eq!(svc.get("AAAAAA").await.unwrap().host_id, 1);
    }

    #[tokio::test]
    async fn join_is_idempotent() {
        let svc = service().await;
        let room = svc.create(1).await.unwrap();

        let first = svc.join(&room.code, 2).await.unwrap();
        let second = svc.join(&room.code, 2).await.unwrap();

        assert!(!first.already_joined);
        assert!(second.already_joined);
        assert_eq!(second.room.participants, vec![1, 2]);
        assert_eq!(first.room.participants, second.room.participants);
    }

    #[tokio::test]
    async fn join_unknown_room_is_not_found() {
        let svc = service().await;
        assert!(matches!(svc.join("NOPE00", 1).await, Err(RoomError::NotFound)));
    }

    #[tokio::test]
    async fn host_leaving_transfers_to_oldest_member() {
        let svc = service().await;
        let room = svc.create(1).await.unwrap();
        svc.join(&room.code, 2).await.unwrap();
        svc.join(&room.code, 3).await.unwrap();

        let out = svc.leave(&room.code, 1).await.unwrap();

        assert_eq!(out.new_host, Some(2));
        assert_eq!(out.room.host_id, 2);
        assert_eq!(out.room.participants, vec![2, 3]);
    }

    #[tokio::test]
    async fn non_host_leaving_keeps_host() {
        let svc = service().await;
        let room = svc.create(1).await.unwrap();
        svc.join(&room.code, 2).await.unwrap();

        let out = svc.leave(&room.code, 2).await.unwrap();

        assert_eq!(out.new_host, None);
        assert_eq!(out.room.host_id, 1);
    }

    #[tokio::test]
    async fn leave_by_stranger_is_invalid_state() {
        let svc = service().await;
        let room = svc.create(1).await.unwrap();

        assert!(matches!(svc.leave(&room.code, 9).await, Err(RoomError::InvalidState(_))));
        assert!(matches!(svc.leave("NOPE00", 1).await, Err(RoomError::NotFound)));
    }

    #[tokio::test]
    async fn last_member_leaving_keeps_the_empty_room() {
        let svc = service().await;
        let room = svc.create(1).await.unwrap();

        let out = svc.leave(&room.code, 1).await.unwrap();

        assert_eq!(out.new_host, None);
        assert!(out.room.participants.is_empty());
        assert!(svc.get(&room.code).await.is_ok());
    }

    #[tokio::test]
    async fn next_joiner_claims_an_emptied_room() {
        let svc = service().await;
        let bank = bank(&[10]);
        let room = svc.create(1).await.unwrap();
        svc.leave(&room.code, 1).await.unwrap();

        let joined = svc.join(&room.code, 2).await.unwrap();
        assert_eq!(joined.new_host, Some(2));
        assert_eq!(joined.room.participants, vec![2]);
        assert_eq!(joined.room.host_id, 2);

        let second = svc.join(&room.code, 3).await.unwrap();
        assert_eq!(second.new_host, None);
        assert_eq!(second.room.host_id, 2);

        assert!(svc.start(&room.code, 2, &bank).await.is_ok());
    }

    #[tokio::test]
    async fn host_stays_a_participant_across_join_leave_orders() {
        let svc = service().await;
        let room = svc.create(1).await.unwrap();
        let steps: &[(bool, i64)] = &[
            (true, 2),
            (true, 3),
            (false, 1),
            (true, 4),
            (false, 3),
            (false, 2),
            (true, 1),
            (false, 4),
        ];

        for &(join, user) in steps {
            let view = if join {
                svc.join(&room.code, user).await.unwrap().room
            } else {
                svc.leave(&room.code, user).await.unwrap().room
            };
            if !view.participants.is_empty() {
                assert!(view.is_participant(view.host_id), "host {} not in {:?}", view.host_id, view.participants);
            }
        }
        assert_eq!(svc.get(&room.code).await.unwrap().host_id, 1);
    }

    #[tokio::test]
    async fn start_checks_host_and_only_happens_once() {
        let svc = service().await;
        let bank = bank(&[10, 20, 30]);
        let room = svc.create(1).await.unwrap();
        svc.join(&room.code, 2).await.unwrap();

        assert!(matches!(svc.start(&room.code, 2, &bank).await, Err(RoomError::Forbidden)));

        let started = svc.start(&room.code, 1, &bank).await.unwrap();
        assert!(bank.get(started.assigned_problem_id).is_some());
        assert!(started.room.battle_started);
        assert!(started.room.battle_ends_at.is_some());

        assert!(matches!(svc.start(&room.code, 1, &bank).await, Err(RoomError::AlreadyStarted)));
        assert!(matches!(svc.start("NOPE00", 1, &bank).await, Err(RoomError::NotFound)));

        for _ in 0..3 {
            let view = svc.get(&room.code).await.unwrap();
            assert_eq!(view.assigned_problem_id, Some(started.assigned_problem_id));
        }
    }

    #[tokio::test]
    async fn concurrent_starts_have_exactly_one_winner() {
        let svc = service().await;
        let bank = std::sync::Arc::new(bank(&[1, 2, 3, 4, 5]));
        let room = svc.create(1).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let svc = svc.clone();
            let bank = bank.clone();
            let code = room.code.clone();
            handles.push(tokio::spawn(async move { svc.start(&code, 1, &bank).await }));
        }

        let mut winners = Vec::new();
        for h in handles {
            match h.await.unwrap() {
                Ok(out) => winners.push(out.assigned_problem_id),
                Err(RoomError::AlreadyStarted) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(winners.len(), 1);
        let view = svc.get(&room.code).await.unwrap();
        assert_eq!(view.assigned_problem_id, Some(winners[0]));
    }

    #[tokio::test]
    async fn scenario_host_transfer_then_start() {
        let svc = service().await;
        let bank = bank(&[7]);
        let room = svc.create_with(100, || "K3F9".to_string()).await.unwrap();
        svc.join("K3F9", 200).await.unwrap();

        let out = svc.leave("K3F9", 100).await.unwrap();
        assert_eq!(out.new_host, Some(200));

        let started = svc.start(&room.code, 200, &bank).await.unwrap();
        assert_eq!(started.assigned_problem_id, 7);
        assert_eq!(svc.get("K3F9").await.unwrap().assigned_problem_id, Some(7));
    }

    #[tokio::test]
    async fn my_rooms_lists_hosted_and_joined_rooms_with_counts() {
        let svc = service().await;
        let mine = svc.create(1).await.unwrap();
        let theirs = svc.create(2).await.unwrap();
        svc.join(&theirs.code, 1).await.unwrap();
        svc.join(&theirs.code, 3).await.unwrap();
        svc.create(4).await.unwrap();

        let rooms = svc.list_for_user(1).await.unwrap();

        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].code, mine.code);
        assert_eq!(rooms[0].participant_count, 1);
        assert_eq!(rooms[1].code, theirs.code);
        assert_eq!(rooms[1].created_by, 2);
        assert_eq!(rooms[1].participant_count, 3);
    }

    #[tokio::test]
    async fn solves_feed_the_scoreboard() {
        let svc = service().await;
        let bank = bank(&[1]);
        let room = svc.create(1).await.unwrap();
        svc.join(&room.code, 2).await.unwrap();
        svc.join(&room.code, 3).await.unwrap();

        assert!(matches!(
            svc.record_solve(&room.code, 2).await,
            Err(RoomError::InvalidState(_))
        ));

        svc.start(&room.code, 1, &bank).await.unwrap();
        svc.record_solve(&room.code, 3).await.unwrap();
        svc.record_solve(&room.code, 3).await.unwrap();
        svc.record_solve(&room.code, 2).await.unwrap();
        assert!(matches!(
            svc.record_solve(&room.code, 99).await,
            Err(RoomError::InvalidState(_))
        ));

        let board = svc.scoreboard(&room.code).await.unwrap();
        let order: Vec<(usize, i64, i32)> = board.iter().map(|e| (e.rank, e.user_id, e.score)).collect();
        assert_eq!(order, vec![(1, 3, 2), (2, 2, 1), (3, 1, 0)]);
    }

    #[tokio::test]
    async fn solves_after_the_battle_clock_are_rejected() {
        let svc = service().await.with_battle_duration_secs(0);
        let bank = bank(&[1]);
        let room = svc.create(1).await.unwrap();
        svc.start(&room.code, 1, &bank).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        match svc.record_solve(&room.code, 1).await {
            Err(RoomError::InvalidState(msg)) => assert_eq!(msg, "Battle has ended"),
            other => panic!("expected InvalidState, got {other:?}"),
        }
        let board = svc.scoreboard(&room.code).await.unwrap();
        assert_eq!(board[0].score, 0);
    }
}
