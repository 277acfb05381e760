use super::{AttendanceView, RejectReason, Rejection, ScanError, ScanEvent, ScanOutcome};
use crate::models::attendance_record::{self, AttendanceStatus, EntryType};
use crate::models::{exam, exam_enrollment, student};
use chrono::{FixedOffset, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, DbConn, SqlErr};

pub(super) struct ExamContext {
    exam: exam::Model,
    seat_number: Option<String>,
}

/// Reconciles one scan against the attendance ledger.
///
/// Pure with respect to side channels: no notifications, no cache writes.
/// Callers inspect the returned [`ScanOutcome`] and react. Concurrent scans
/// for the same tuple are safe; a lost insert race degrades into the update
/// path via the uniqueness index.
pub async fn reconcile(
    db: &DbConn,
    tz: FixedOffset,
    event: ScanEvent,
) -> Result<ScanOutcome, ScanError> {
    let Some(student) = student::Model::find_by_rfid(db, &event.rfid_uid).await? else {
        tracing::info!(rfid_uid = %event.rfid_uid, "scan from unregistered card");
        return Ok(ScanOutcome::UnknownCard {
            rfid_uid: event.rfid_uid,
            scanned_at: event.scan_time,
        });
    };

    let exam_ctx = match &event.exam_code {
        Some(code) => match gate_exam(db, tz, &event, &student, code).await? {
            Ok(ctx) => Some(ctx),
            Err(rejection) => return Ok(ScanOutcome::Rejected(rejection)),
        },
        None => None,
    };

    let status = scan_status(&event, tz, exam_ctx.as_ref().map(|ctx| &ctx.exam));

    let existing = attendance_record::Model::find_for_tuple(
        db,
        student.id,
        &event.attendance_date(),
        exam_ctx.as_ref().map(|ctx| ctx.exam.id),
    )
    .await?;

    merge_into_ledger(db, student, &event, status, exam_ctx, existing).await
}

/// Applies the classified scan to the ledger, given the row the lookup saw.
/// When the lookup saw nothing but a concurrent scan inserted the tuple row
/// first, the insert trips the uniqueness index and the merge recovers by
/// updating the winner's row.
pub(super) async fn merge_into_ledger(
    db: &DbConn,
    student: student::Model,
    event: &ScanEvent,
    status: AttendanceStatus,
    exam_ctx: Option<ExamContext>,
    existing: Option<attendance_record::Model>,
) -> Result<ScanOutcome, ScanError> {
    let attendance_date = event.attendance_date();
    let exam_id = exam_ctx.as_ref().map(|ctx| ctx.exam.id);

    let outcome = match existing {
        Some(record) => {
            let record = apply_scan(db, record, &event, status).await?;
            ScanOutcome::Updated(view(record, student, exam_ctx))
        }
        None => match insert_record(db, &student, &event, status, exam_ctx.as_ref()).await {
            Ok(record) => ScanOutcome::Created(view(record, student, exam_ctx)),
            // Lost an insert race for the tuple; fold into the row the
            // winner created.
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                tracing::debug!(
                    student_id = student.id,
                    date = %attendance_date,
                    "concurrent scan for tuple, retrying as update"
                );
                let record = attendance_record::Model::find_for_tuple(
                    db,
                    student.id,
                    &attendance_date,
                    exam_id,
                )
                .await?
                .ok_or_else(|| {
                    sea_orm::DbErr::Custom(
                        "attendance row vanished after uniqueness conflict".to_string(),
                    )
                })?;
                let record = apply_scan(db, record, &event, status).await?;
                ScanOutcome::Updated(view(record, student, exam_ctx))
            }
            Err(err) => return Err(err.into()),
        },
    };

    Ok(outcome)
}

/// Exam gate: active exam in a scannable state, student enrolled, and for
/// entry scans the clock inside the accepted window.
async fn gate_exam(
    db: &DbConn,
    tz: FixedOffset,
    event: &ScanEvent,
    student: &student::Model,
    code: &str,
) -> Result<Result<ExamContext, Rejection>, ScanError> {
    let reject = |reason, exam_code: &str, message: String| Rejection {
        reason,
        rfid_uid: event.rfid_uid.clone(),
        exam_code: exam_code.to_string(),
        student: student.clone(),
        message,
    };

    let Some(exam) = exam::Model::find_active_by_code(db, code).await? else {
        return Ok(Err(reject(
            RejectReason::ExamNotFound,
            code,
            format!("No active exam found for code {code}"),
        )));
    };

    let Some(enrollment) = exam_enrollment::Model::find_for(db, exam.id, student.id).await?
    else {
        return Ok(Err(reject(
            RejectReason::NotEnrolled,
            &exam.exam_code,
            format!("{} is not enrolled for {}", student.name, exam.exam_name),
        )));
    };

    match event.entry_type {
        EntryType::Entry => {
            let allowed_from = exam.allowed_entry_start(tz);
            if event.scan_time < allowed_from {
                return Ok(Err(reject(
                    RejectReason::OutsideWindow,
                    &exam.exam_code,
                    format!(
                        "Entry opens at {} ({} min before start)",
                        allowed_from.format("%H:%M:%S"),
                        exam.late_entry_grace_period
                    ),
                )));
            }
            if event.scan_time > exam.start_instant(tz) && !exam.allow_late_entry {
                return Ok(Err(reject(
                    RejectReason::OutsideWindow,
                    &exam.exam_code,
                    format!("Late entry is not allowed for {}", exam.exam_name),
                )));
            }
        }
        EntryType::Exit => {
            // Exits are never window-gated; students may leave after the end.
            if event.scan_time > exam.end_instant(tz) {
                tracing::debug!(
                    exam_code = %exam.exam_code,
                    student_id = student.id,
                    "exit scan after scheduled end"
                );
            }
        }
    }

    Ok(Ok(ExamContext {
        exam,
        seat_number: enrollment.seat_number,
    }))
}

/// Status an entry scan earns. Exit-only rows keep the present default.
fn scan_status(
    event: &ScanEvent,
    tz: FixedOffset,
    exam: Option<&exam::Model>,
) -> AttendanceStatus {
    match (event.entry_type, exam) {
        (EntryType::Entry, Some(exam)) if event.scan_time > exam.start_instant(tz) => {
            AttendanceStatus::Late
        }
        _ => AttendanceStatus::Present,
    }
}

async fn insert_record(
    db: &DbConn,
    student: &student::Model,
    event: &ScanEvent,
    status: AttendanceStatus,
    exam_ctx: Option<&ExamContext>,
) -> Result<attendance_record::Model, sea_orm::DbErr> {
    let now = Utc::now();
    let instant = event.scan_time.with_timezone(&Utc);
    let clock_face = event.scan_time.format("%H:%M:%S").to_string();

    let mut record = attendance_record::ActiveModel {
        student_id: Set(student.id),
        exam_id: Set(exam_ctx.map(|ctx| ctx.exam.id)),
        rfid_uid: Set(event.rfid_uid.clone()),
        attendance_date: Set(event.attendance_date()),
        day_of_week: Set(event.day_of_week()),
        status: Set(status),
        entry_type: Set(event.entry_type),
        seat_number: Set(exam_ctx.and_then(|ctx| ctx.seat_number.clone())),
        exam_code: Set(exam_ctx.map(|ctx| ctx.exam.exam_code.clone())),
        exam_name: Set(exam_ctx.map(|ctx| ctx.exam.exam_name.clone())),
        exam_subject: Set(exam_ctx.map(|ctx| ctx.exam.subject.clone())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match event.entry_type {
        EntryType::Entry => {
            record.entry_at = Set(Some(instant));
            record.entry_time = Set(Some(clock_face));
        }
        EntryType::Exit => {
            record.exit_at = Set(Some(instant));
            record.exit_time = Set(Some(clock_face));
        }
    }

    record.insert(db).await
}

/// Merges a scan into an existing row. Entry scans refresh the entry side and
/// the status; exit scans touch only the exit side. The direction tag always
/// follows the latest scan.
async fn apply_scan(
    db: &DbConn,
    record: attendance_record::Model,
    event: &ScanEvent,
    status: AttendanceStatus,
) -> Result<attendance_record::Model, sea_orm::DbErr> {
    let instant = event.scan_time.with_timezone(&Utc);
    let clock_face = event.scan_time.format("%H:%M:%S").to_string();

    let mut active: attendance_record::ActiveModel = record.into();
    match event.entry_type {
        EntryType::Entry => {
            active.entry_at = Set(Some(instant));
            active.entry_time = Set(Some(clock_face));
            active.status = Set(status);
        }
        EntryType::Exit => {
            active.exit_at = Set(Some(instant));
            active.exit_time = Set(Some(clock_face));
        }
    }
    active.entry_type = Set(event.entry_type);
    active.updated_at = Set(Utc::now());

    active.update(db).await
}

fn view(
    record: attendance_record::Model,
    student: student::Model,
    exam_ctx: Option<ExamContext>,
) -> AttendanceView {
    AttendanceView {
        record,
        student,
        exam: exam_ctx.map(|ctx| ctx.exam),
    }
}
