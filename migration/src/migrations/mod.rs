pub mod m202601050001_create_users;
pub mod m202601050002_create_students;
pub mod m202601050003_create_exams;
pub mod m202601050004_create_exam_enrollments;
pub mod m202601050005_create_exam_invigilators;
pub mod m202601050006_create_attendance_records;
