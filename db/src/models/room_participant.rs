use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder};
use serde::Serialize;

/// Membership of a user in a room. Rows are ordered by `id`, which is the
/// order participants joined in.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "room_participants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub room_id: i64,
    pub user_id: i64,
    pub score: i32,
    pub joined_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id",
        on_delete = "Cascade"
    )]
    Room,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn add<C: ConnectionTrait>(db: &C, room_id: i64, user_id: i64) -> Result<Model, DbErr> {
        ActiveModel {
            room_id: Set(room_id),
            user_id: Set(user_id),
            score: Set(0),
            joined_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Deletes the membership. Returns `false` if the user was not a member.
    pub async fn remove<C: ConnectionTrait>(db: &C, room_id: i64, user_id: i64) -> Result<bool, DbErr> {
        let result = Entity::delete_many()
            .filter(Column::RoomId.eq(room_id))
            .filter(Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn find_membership<C: ConnectionTrait>(
        db: &C,
        room_id: i64,
        user_id: i64,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::RoomId.eq(room_id))
            .filter(Column::UserId.eq(user_id))
            .one(db)
            .await
    }

    /// Participants of a room in join order.
    pub async fn list_for_room<C: ConnectionTrait>(db: &C, room_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::RoomId.eq(room_id))
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    pub async fn room_ids_for_user<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<Vec<i64>, DbErr> {
        Ok(Entity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_asc(Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(|p| p.room_id)
            .collect())
    }

    /// Adds `points` to the member's score. Returns `false` if not a member.
    pub async fn add_score<C: ConnectionTrait>(
        db: &C,
        room_id: i64,
        user_id: i64,
        points: i32,
    ) -> Result<bool, DbErr> {
        let result = Entity::update_many()
            .col_expr(Column::Score, Expr::col(Column::Score).add(points))
            .filter(Column::RoomId.eq(room_id))
            .filter(Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected == 1)
    }
}
