use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{ColumnTrait, DeriveActiveEnum, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One ledger row per (student, civil day, exam-or-null) tuple. The scan
/// reconciler is the sole writer; uniqueness is enforced by the indexes in
/// the attendance migration.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    /// `None` means general (non-exam) attendance.
    pub exam_id: Option<i64>,
    pub rfid_uid: String,
    /// Null when the first-ever scan for the tuple was an exit scan.
    pub entry_at: Option<DateTime<Utc>>,
    pub entry_time: Option<String>,
    pub exit_at: Option<DateTime<Utc>>,
    pub exit_time: Option<String>,
    /// Civil date (`YYYY-MM-DD`) in the configured timezone; reconciliation key.
    pub attendance_date: String,
    pub day_of_week: String,
    pub status: AttendanceStatus,
    /// Direction of the most recent scan. Not a cumulative entered/exited
    /// pair; the original system only tracked the latest direction and that
    /// behavior is preserved.
    pub entry_type: EntryType,
    pub seat_number: Option<String>,
    /// Denormalized exam summary for display.
    pub exam_code: Option<String>,
    pub exam_name: Option<String>,
    pub exam_subject: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "present")]
    Present,
    #[sea_orm(string_value = "late")]
    Late,
    #[sea_orm(string_value = "absent")]
    Absent,
    #[sea_orm(string_value = "excused")]
    Excused,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EntryType {
    #[sea_orm(string_value = "entry")]
    Entry,
    #[sea_orm(string_value = "exit")]
    Exit,
}

impl Default for EntryType {
    fn default() -> Self {
        EntryType::Entry
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::exam::Entity",
        from = "Column::ExamId",
        to = "super::exam::Column::Id"
    )]
    Exam,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::exam::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exam.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Looks up the ledger row for a reconciliation tuple. A `None` exam id
    /// matches only general-attendance rows, never "any exam".
    pub async fn find_for_tuple(
        db: &DbConn,
        student_id: i64,
        attendance_date: &str,
        exam_id: Option<i64>,
    ) -> Result<Option<Model>, DbErr> {
        let mut query = Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::AttendanceDate.eq(attendance_date));
        query = match exam_id {
            Some(id) => query.filter(Column::ExamId.eq(id)),
            None => query.filter(Column::ExamId.is_null()),
        };
        query.one(db).await
    }

    pub async fn count_for_date(db: &DbConn, attendance_date: &str) -> Result<u64, DbErr> {
        Entity::find()
            .filter(Column::AttendanceDate.eq(attendance_date))
            .count(db)
            .await
    }

    pub async fn count_between(
        db: &DbConn,
        from_date: &str,
        to_date: &str,
    ) -> Result<u64, DbErr> {
        Entity::find()
            .filter(Column::AttendanceDate.gte(from_date))
            .filter(Column::AttendanceDate.lte(to_date))
            .count(db)
            .await
    }

    pub async fn count_all(db: &DbConn) -> Result<u64, DbErr> {
        Entity::find().count(db).await
    }

    /// `(student_id, scan_count)` pairs for the most frequently seen students.
    pub async fn top_students(db: &DbConn, limit: u64) -> Result<Vec<(i64, i64)>, DbErr> {
        Entity::find()
            .select_only()
            .column(Column::StudentId)
            .column_as(Column::Id.count(), "scan_count")
            .group_by(Column::StudentId)
            .order_by_desc(Expr::col(Alias::new("scan_count")))
            .limit(limit)
            .into_tuple()
            .all(db)
            .await
    }
}
