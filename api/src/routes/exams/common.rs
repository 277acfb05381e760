use chrono::{NaiveDate, NaiveTime};
use db::models::exam::{self, ExamStatus};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Public exam codes as printed on papers and sent by scanners.
pub static EXAM_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9]{2,9}$").expect("valid regex"));

#[derive(Debug, Serialize)]
pub struct ExamResponse {
    pub id: i64,
    pub exam_code: String,
    pub exam_name: String,
    pub subject: String,
    pub course: String,
    pub exam_date: String,
    pub start_time: String,
    pub end_time: String,
    pub status: ExamStatus,
    pub venue_room: Option<String>,
    pub venue_building: Option<String>,
    pub allow_late_entry: bool,
    pub late_entry_grace_period: i32,
    pub require_exit_scan: bool,
    pub auto_mark_absent: bool,
    pub absent_marking_time: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<exam::Model> for ExamResponse {
    fn from(m: exam::Model) -> Self {
        Self {
            id: m.id,
            exam_code: m.exam_code,
            exam_name: m.exam_name,
            subject: m.subject,
            course: m.course,
            exam_date: m.exam_date.format("%Y-%m-%d").to_string(),
            start_time: m.start_time.format("%H:%M:%S").to_string(),
            end_time: m.end_time.format("%H:%M:%S").to_string(),
            status: m.status,
            venue_room: m.venue_room,
            venue_building: m.venue_building,
            allow_late_entry: m.allow_late_entry,
            late_entry_grace_period: m.late_entry_grace_period,
            require_exit_scan: m.require_exit_scan,
            auto_mark_absent: m.auto_mark_absent,
            absent_marking_time: m.absent_marking_time,
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateExamReq {
    pub exam_code: String,
    pub exam_name: String,
    pub subject: String,
    pub course: String,
    pub exam_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub venue_room: Option<String>,
    pub venue_building: Option<String>,
    pub allow_late_entry: Option<bool>,
    pub late_entry_grace_period: Option<i32>,
    pub require_exit_scan: Option<bool>,
    pub auto_mark_absent: Option<bool>,
    pub absent_marking_time: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct EditExamReq {
    pub exam_name: Option<String>,
    pub subject: Option<String>,
    pub course: Option<String>,
    pub exam_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub venue_room: Option<String>,
    pub venue_building: Option<String>,
    pub allow_late_entry: Option<bool>,
    pub late_entry_grace_period: Option<i32>,
    pub require_exit_scan: Option<bool>,
    pub auto_mark_absent: Option<bool>,
    pub absent_marking_time: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct StatusReq {
    pub status: ExamStatus,
}

#[derive(Debug, Deserialize)]
pub struct EnrollReq {
    pub student_id: i64,
    pub seat_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InvigilatorReq {
    pub user_id: i64,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    /// Fuzzy match on name or code.
    pub q: Option<String>,
    pub status: Option<ExamStatus>,
    pub course: Option<String>,
}

#[derive(Debug, Serialize, Default)]
pub struct ListResponse {
    pub exams: Vec<ExamResponse>,
    pub page: i32,
    pub per_page: i32,
    pub total: i32,
}
