use db::models::student;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentReq {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(min = 3, max = 20, message = "reg_no must be 3-20 characters"))]
    pub reg_no: String,
    #[validate(length(min = 1, max = 100, message = "course must be 1-100 characters"))]
    pub course: String,
    #[validate(length(min = 4, max = 32, message = "rfid_uid must be 4-32 characters"))]
    pub rfid_uid: String,
}

/// Identity keys (reg_no, rfid_uid) are immutable; only descriptive fields
/// and the active flag may change.
#[derive(Debug, Deserialize, Validate)]
pub struct EditStudentReq {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "course must be 1-100 characters"))]
    pub course: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct StudentResponse {
    pub id: i64,
    pub name: String,
    pub reg_no: String,
    pub course: String,
    pub rfid_uid: String,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<student::Model> for StudentResponse {
    fn from(m: student::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            reg_no: m.reg_no,
            course: m.course,
            rfid_uid: m.rfid_uid,
            active: m.active,
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    /// Fuzzy match on name or reg_no.
    pub q: Option<String>,
    pub course: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, Default)]
pub struct ListResponse {
    pub students: Vec<StudentResponse>,
    pub page: i32,
    pub per_page: i32,
    pub total: i32,
}
