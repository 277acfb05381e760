use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, DeriveActiveEnum, QueryFilter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "exams")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Public exam code (e.g. `MATH101`); unique among active exams.
    pub exam_code: String,
    pub exam_name: String,
    pub subject: String,
    pub course: String,
    pub exam_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: ExamStatus,
    pub venue_room: Option<String>,
    pub venue_building: Option<String>,
    pub allow_late_entry: bool,
    /// Minutes before the official start during which entry scans are accepted.
    pub late_entry_grace_period: i32,
    pub require_exit_scan: bool,
    pub auto_mark_absent: bool,
    pub absent_marking_time: i32,
    pub is_active: bool,
    pub created_by: i64,
    pub last_modified_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ExamStatus {
    #[sea_orm(string_value = "Scheduled")]
    #[strum(serialize = "Scheduled")]
    #[serde(rename = "Scheduled")]
    Scheduled,
    #[sea_orm(string_value = "In Progress")]
    #[strum(serialize = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    #[sea_orm(string_value = "Completed")]
    #[strum(serialize = "Completed")]
    #[serde(rename = "Completed")]
    Completed,
    #[sea_orm(string_value = "Cancelled")]
    #[strum(serialize = "Cancelled")]
    #[serde(rename = "Cancelled")]
    Cancelled,
    #[sea_orm(string_value = "Postponed")]
    #[strum(serialize = "Postponed")]
    #[serde(rename = "Postponed")]
    Postponed,
}

impl ExamStatus {
    /// Only these states accept scans.
    pub fn accepts_scans(&self) -> bool {
        matches!(self, ExamStatus::Scheduled | ExamStatus::InProgress)
    }

    /// Whether an administrator may move an exam from `self` to `to`.
    /// Admins may force any state change.
    pub fn admin_may_transition(&self, _to: ExamStatus) -> bool {
        true
    }

    /// Whether an assigned invigilator may move an exam from `self` to `to`.
    /// Invigilators may only start a scheduled exam or complete a running one.
    pub fn invigilator_may_transition(&self, to: ExamStatus) -> bool {
        matches!(
            (self, to),
            (ExamStatus::Scheduled, ExamStatus::InProgress)
                | (ExamStatus::InProgress, ExamStatus::Completed)
        )
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::exam_enrollment::Entity")]
    Enrollments,
    #[sea_orm(has_many = "super::exam_invigilator::Entity")]
    Invigilators,
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    AttendanceRecords,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    Creator,
}

impl Related<super::exam_enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl Related<super::exam_invigilator::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invigilators.def()
    }
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Everything needed to create an exam row.
#[derive(Debug, Clone)]
pub struct NewExam {
    pub exam_code: String,
    pub exam_name: String,
    pub subject: String,
    pub course: String,
    pub exam_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub venue_room: Option<String>,
    pub venue_building: Option<String>,
    pub allow_late_entry: bool,
    pub late_entry_grace_period: i32,
    pub require_exit_scan: bool,
    pub auto_mark_absent: bool,
    pub absent_marking_time: i32,
}

impl Model {
    pub async fn create(db: &DbConn, new: NewExam, created_by: i64) -> Result<Model, DbErr> {
        if new.end_time <= new.start_time {
            return Err(DbErr::Custom("End time must be after start time".into()));
        }

        let now = Utc::now();
        let exam = ActiveModel {
            exam_code: Set(new.exam_code.trim().to_uppercase()),
            exam_name: Set(new.exam_name),
            subject: Set(new.subject),
            course: Set(new.course),
            exam_date: Set(new.exam_date),
            start_time: Set(new.start_time),
            end_time: Set(new.end_time),
            status: Set(ExamStatus::Scheduled),
            venue_room: Set(new.venue_room),
            venue_building: Set(new.venue_building),
            allow_late_entry: Set(new.allow_late_entry),
            late_entry_grace_period: Set(new.late_entry_grace_period),
            require_exit_scan: Set(new.require_exit_scan),
            auto_mark_absent: Set(new.auto_mark_absent),
            absent_marking_time: Set(new.absent_marking_time),
            is_active: Set(true),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        exam.insert(db).await
    }

    /// Scan-target lookup: active exam with the given code in a state that
    /// accepts scans.
    pub async fn find_active_by_code(db: &DbConn, exam_code: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::ExamCode.eq(exam_code.trim().to_uppercase()))
            .filter(Column::IsActive.eq(true))
            .filter(
                Column::Status
                    .eq(ExamStatus::Scheduled)
                    .or(Column::Status.eq(ExamStatus::InProgress)),
            )
            .one(db)
            .await
    }

    pub async fn find_by_id(db: &DbConn, id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::Id.eq(id))
            .filter(Column::IsActive.eq(true))
            .one(db)
            .await
    }

    pub async fn update_status(
        &self,
        db: &DbConn,
        status: ExamStatus,
        user_id: i64,
    ) -> Result<Model, DbErr> {
        let mut exam: ActiveModel = self.clone().into();
        exam.status = Set(status);
        exam.last_modified_by = Set(Some(user_id));
        exam.updated_at = Set(Utc::now());
        exam.update(db).await
    }

    /// Deactivates the exam rather than deleting it, so historical attendance
    /// keeps a valid reference.
    pub async fn soft_delete(&self, db: &DbConn, user_id: i64) -> Result<Model, DbErr> {
        let mut exam: ActiveModel = self.clone().into();
        exam.is_active = Set(false);
        exam.last_modified_by = Set(Some(user_id));
        exam.updated_at = Set(Utc::now());
        exam.update(db).await
    }

    /// The exam's start instant in the configured civil timezone.
    pub fn start_instant(&self, tz: FixedOffset) -> DateTime<FixedOffset> {
        self.exam_date
            .and_time(self.start_time)
            .and_local_timezone(tz)
            .single()
            .expect("fixed offsets have no ambiguous local times")
    }

    /// The exam's end instant in the configured civil timezone.
    pub fn end_instant(&self, tz: FixedOffset) -> DateTime<FixedOffset> {
        self.exam_date
            .and_time(self.end_time)
            .and_local_timezone(tz)
            .single()
            .expect("fixed offsets have no ambiguous local times")
    }

    /// Earliest instant an entry scan is accepted: start minus grace period.
    pub fn allowed_entry_start(&self, tz: FixedOffset) -> DateTime<FixedOffset> {
        self.start_instant(tz) - Duration::minutes(self.late_entry_grace_period as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invigilator_transitions_are_restricted_to_start_and_complete() {
        assert!(ExamStatus::Scheduled.invigilator_may_transition(ExamStatus::InProgress));
        assert!(ExamStatus::InProgress.invigilator_may_transition(ExamStatus::Completed));

        assert!(!ExamStatus::Scheduled.invigilator_may_transition(ExamStatus::Cancelled));
        assert!(!ExamStatus::Scheduled.invigilator_may_transition(ExamStatus::Completed));
        assert!(!ExamStatus::InProgress.invigilator_may_transition(ExamStatus::Postponed));
        assert!(!ExamStatus::Completed.invigilator_may_transition(ExamStatus::InProgress));
    }

    #[test]
    fn only_scheduled_and_in_progress_accept_scans() {
        assert!(ExamStatus::Scheduled.accepts_scans());
        assert!(ExamStatus::InProgress.accepts_scans());
        assert!(!ExamStatus::Completed.accepts_scans());
        assert!(!ExamStatus::Cancelled.accepts_scans());
        assert!(!ExamStatus::Postponed.accepts_scans());
    }

    #[test]
    fn allowed_entry_start_subtracts_grace_from_start() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let exam = Model {
            id: 1,
            exam_code: "MATH101".into(),
            exam_name: "Mathematics I".into(),
            subject: "Mathematics".into(),
            course: "BSc CS".into(),
            exam_date: NaiveDate::from_ymd_opt(2026, 6, 10).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            status: ExamStatus::Scheduled,
            venue_room: None,
            venue_building: None,
            allow_late_entry: true,
            late_entry_grace_period: 15,
            require_exit_scan: false,
            auto_mark_absent: true,
            absent_marking_time: 30,
            is_active: true,
            created_by: 1,
            last_modified_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let allowed = exam.allowed_entry_start(tz);
        assert_eq!(allowed.time(), NaiveTime::from_hms_opt(8, 45, 0).unwrap());
        assert_eq!(exam.end_instant(tz).time(), NaiveTime::from_hms_opt(11, 0, 0).unwrap());
    }
}
