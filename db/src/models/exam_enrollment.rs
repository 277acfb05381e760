use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, QueryFilter};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "exam_enrollments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub exam_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub student_id: i64,
    pub seat_number: Option<String>,
    pub enrolled_at: DateTimeUtc,
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
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
}

impl Related<super::exam::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exam.def()
    }
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Adds a student to an exam's enrollment list. The composite primary key
    /// rejects duplicates; callers surface that as a conflict.
    pub async fn enroll(
        db: &DbConn,
        exam_id: i64,
        student_id: i64,
        seat_number: Option<&str>,
    ) -> Result<Model, DbErr> {
        let enrollment = ActiveModel {
            exam_id: Set(exam_id),
            student_id: Set(student_id),
            seat_number: Set(seat_number.map(str::to_owned)),
            enrolled_at: Set(Utc::now()),
        };

        enrollment.insert(db).await
    }

    /// Membership + seat lookup used by the reconciler's enrollment gate.
    pub async fn find_for(
        db: &DbConn,
        exam_id: i64,
        student_id: i64,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::ExamId.eq(exam_id))
            .filter(Column::StudentId.eq(student_id))
            .one(db)
            .await
    }

    pub async fn unenroll(db: &DbConn, exam_id: i64, student_id: i64) -> Result<(), DbErr> {
        Entity::delete_many()
            .filter(Column::ExamId.eq(exam_id))
            .filter(Column::StudentId.eq(student_id))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn list_for_exam(db: &DbConn, exam_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::ExamId.eq(exam_id))
            .all(db)
            .await
    }
}
