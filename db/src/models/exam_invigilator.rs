use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, QueryFilter};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "exam_invigilators")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub exam_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    pub role: String,
    pub assigned_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exam::Entity",
        from = "Column::ExamId",
        to = "super::exam::Column::Id"
    )]
    Exam,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::exam::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exam.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn assign(
        db: &DbConn,
        exam_id: i64,
        user_id: i64,
        role: &str,
    ) -> Result<Model, DbErr> {
        let invigilator = ActiveModel {
            exam_id: Set(exam_id),
            user_id: Set(user_id),
            role: Set(role.to_owned()),
            assigned_at: Set(Utc::now()),
        };

        invigilator.insert(db).await
    }

    pub async fn remove(db: &DbConn, exam_id: i64, user_id: i64) -> Result<(), DbErr> {
        Entity::delete_many()
            .filter(Column::ExamId.eq(exam_id))
            .filter(Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        Ok(())
    }

    /// Whether `user_id` is assigned to invigilate `exam_id`. Gates the
    /// invigilator-initiated status transitions.
    pub async fn is_assigned(db: &DbConn, exam_id: i64, user_id: i64) -> Result<bool, DbErr> {
        Ok(Entity::find()
            .filter(Column::ExamId.eq(exam_id))
            .filter(Column::UserId.eq(user_id))
            .one(db)
            .await?
            .is_some())
    }

    pub async fn list_for_exam(db: &DbConn, exam_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::ExamId.eq(exam_id))
            .all(db)
            .await
    }
}
