use db::models::attendance_record::{self, EntryType};
use db::models::student;
use db::scan::{AttendanceView, RejectReason};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ScanReq {
    pub rfid_uid: String,
    /// ISO-8601; omitted means "now" in the configured civil timezone.
    pub timestamp: Option<String>,
    /// Omitted or blank means general (non-exam) attendance.
    pub exam_code: Option<String>,
    pub entry_type: Option<EntryType>,
}

#[derive(Debug, Serialize)]
pub struct StudentSummary {
    pub id: i64,
    pub name: String,
    pub reg_no: String,
    pub course: String,
}

impl From<student::Model> for StudentSummary {
    fn from(m: student::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            reg_no: m.reg_no,
            course: m.course,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AttendanceRecordResponse {
    pub id: i64,
    pub student_id: i64,
    pub exam_id: Option<i64>,
    pub rfid_uid: String,
    pub entry_time: Option<String>,
    pub exit_time: Option<String>,
    pub attendance_date: String,
    pub day_of_week: String,
    pub status: String,
    pub entry_type: String,
    pub seat_number: Option<String>,
    pub exam_code: Option<String>,
    pub exam_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<attendance_record::Model> for AttendanceRecordResponse {
    fn from(m: attendance_record::Model) -> Self {
        Self {
            id: m.id,
            student_id: m.student_id,
            exam_id: m.exam_id,
            rfid_uid: m.rfid_uid,
            entry_time: m.entry_time,
            exit_time: m.exit_time,
            attendance_date: m.attendance_date,
            day_of_week: m.day_of_week,
            status: m.status.to_string(),
            entry_type: m.entry_type.to_string(),
            seat_number: m.seat_number,
            exam_code: m.exam_code,
            exam_name: m.exam_name,
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

/// Scan endpoint payload; partially populated depending on the outcome.
#[derive(Debug, Serialize, Default)]
pub struct ScanResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<AttendanceRecordResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
}

impl From<AttendanceView> for ScanResponse {
    fn from(v: AttendanceView) -> Self {
        Self {
            record: Some(v.record.into()),
            student: Some(v.student.into()),
            reason: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    /// Inclusive date bounds, `YYYY-MM-DD`.
    pub from: Option<String>,
    pub to: Option<String>,
    pub student_id: Option<i64>,
    pub exam_id: Option<i64>,
    /// Filter by the student's course.
    pub course: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListedRecord {
    #[serde(flatten)]
    pub record: AttendanceRecordResponse,
    pub student: Option<StudentSummary>,
}

#[derive(Debug, Serialize, Default)]
pub struct ListResponse {
    pub records: Vec<ListedRecord>,
    pub page: i32,
    pub per_page: i32,
    pub total: i32,
}
