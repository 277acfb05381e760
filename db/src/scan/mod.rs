//! Scan reconciliation: the state machine that turns a raw RFID scan into a
//! ledger write (or a classified refusal).
//!
//! A scan is resolved against the student directory, optionally against a
//! scheduled exam (enrollment + time window), and then merged into the
//! attendance ledger under the invariant that at most one record exists per
//! (student, civil day, exam-or-null) tuple. Business outcomes are returned,
//! never thrown; only validation and store failures surface as errors.

mod event;
mod reconciler;

pub use event::ScanEvent;
pub use reconciler::reconcile;

use crate::models::{attendance_record, exam, student};
use chrono::{DateTime, FixedOffset};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// Failures that are not business outcomes.
///
/// `Validation` is raised before any lookup; `Db` wraps store errors and is
/// retryable by the caller (the reconcile pass is idempotent once the
/// uniqueness indexes hold).
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid scan input: {0}")]
    Validation(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Why an otherwise-valid scan was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Exam code given but no active exam in a scannable state matches it.
    ExamNotFound,
    /// Student is not on the exam's enrollment list.
    NotEnrolled,
    /// Entry scan outside the accepted window for the exam.
    OutsideWindow,
}

/// A refusal, with enough context for actionable operator feedback.
#[derive(Debug, Clone)]
pub struct Rejection {
    pub reason: RejectReason,
    pub rfid_uid: String,
    pub exam_code: String,
    /// The student is always known by the time a policy gate fires.
    pub student: student::Model,
    pub message: String,
}

/// Ledger row joined with the display fields callers render.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceView {
    pub record: attendance_record::Model,
    pub student: student::Model,
    pub exam: Option<exam::Model>,
}

/// The four classified outcomes of reconciling one scan.
#[derive(Debug)]
pub enum ScanOutcome {
    /// No student matches the UID. Nothing is written; the dashboard is still
    /// notified so missing enrollments are visible.
    UnknownCard {
        rfid_uid: String,
        scanned_at: DateTime<FixedOffset>,
    },
    /// Student found but policy disallows the scan. Nothing is written.
    Rejected(Rejection),
    /// First scan for the tuple today; a new ledger row was inserted.
    Created(AttendanceView),
    /// The tuple's existing row was brought up to date in place.
    Updated(AttendanceView),
}

impl ScanOutcome {
    pub fn wrote_ledger(&self) -> bool {
        matches!(self, ScanOutcome::Created(_) | ScanOutcome::Updated(_))
    }
}
