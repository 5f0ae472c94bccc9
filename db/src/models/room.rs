use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ConnectionTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;

/// A battle room. `version` is bumped on every membership or lifecycle change
/// so concurrent writers can detect that the row moved underneath them.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub code: String,
    pub host_id: i64,
    pub battle_started: bool,
    pub assigned_problem_id: Option<i64>,
    pub battle_started_at: Option<DateTime<Utc>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::room_participant::Entity")]
    Participants,
}

impl Related<super::room_participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Inserts a fresh, not-yet-started room hosted by `host_id`.
    ///
    /// Fails with a unique-constraint error when `code` is already taken.
    pub async fn create<C: ConnectionTrait>(db: &C, code: &str, host_id: i64) -> Result<Model, DbErr> {
        let now = Utc::now();
        ActiveModel {
            code: Set(code.to_owned()),
            host_id: Set(host_id),
            battle_started: Set(false),
            assigned_problem_id: Set(None),
            battle_started_at: Set(None),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn find_by_code<C: ConnectionTrait>(db: &C, code: &str) -> Result<Option<Model>, DbErr> {
        Entity::find().filter(Column::Code.eq(code)).one(db).await
    }

    pub async fn code_exists<C: ConnectionTrait>(db: &C, code: &str) -> Result<bool, DbErr> {
        Ok(Entity::find()
            .filter(Column::Code.eq(code))
            .count(db)
            .await?
            > 0)
    }

    /// Moves the room to a new version if nobody else has since `expected_version`.
    ///
    /// `host_id` is rewritten only when provided. Returns `false` when the
    /// version check lost.
    pub async fn bump_version<C: ConnectionTrait>(
        db: &C,
        room_id: i64,
        expected_version: i64,
        host_id: Option<i64>,
    ) -> Result<bool, DbErr> {
        let mut update = Entity::update_many()
            .col_expr(Column::Version, Expr::value(expected_version + 1))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(room_id))
            .filter(Column::Version.eq(expected_version));

        if let Some(host_id) = host_id {
            update = update.col_expr(Column::HostId, Expr::value(host_id));
        }

        Ok(update.exec(db).await?.rows_affected == 1)
    }

    /// Flips the room into the started state in a single conditional write.
    ///
    /// Only succeeds for the current host while the battle has not started, so
    /// at most one caller ever observes `true`.
    pub async fn try_start<C: ConnectionTrait>(
        db: &C,
        code: &str,
        requester_id: i64,
        problem_id: i64,
    ) -> Result<bool, DbErr> {
        let now = Utc::now();
        let result = Entity::update_many()
            .col_expr(Column::BattleStarted, Expr::value(true))
            .col_expr(Column::AssignedProblemId, Expr::value(problem_id))
            .col_expr(Column::BattleStartedAt, Expr::value(now))
            .col_expr(Column::Version, Expr::col(Column::Version).add(1))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Code.eq(code))
            .filter(Column::HostId.eq(requester_id))
            .filter(Column::BattleStarted.eq(false))
            .exec(db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Unconditionally bumps the version, for changes that cannot conflict
    /// with membership edits (score updates).
    pub async fn touch<C: ConnectionTrait>(db: &C, room_id: i64) -> Result<(), DbErr> {
        Entity::update_many()
            .col_expr(Column::Version, Expr::col(Column::Version).add(1))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(room_id))
            .exec(db)
            .await?;
        Ok(())
    }

    /// End of the battle clock, if the battle has started.
    pub fn battle_ends_at(&self, duration_secs: i64) -> Option<DateTime<Utc>> {
        self.battle_started_at
            .map(|started| started + chrono::Duration::seconds(duration_secs))
    }
}
