pub mod attendance_record;
pub mod exam;
pub mod exam_enrollment;
pub mod exam_invigilator;
pub mod student;
pub mod user;
