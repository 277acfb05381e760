use super::ScanError;
use crate::models::attendance_record::EntryType;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

/// A validated, normalized scan ready for reconciliation.
///
/// Produced from raw device input by [`ScanEvent::resolve`]; once constructed,
/// the reconciler can trust that the UID is non-empty and uppercased, the
/// exam code (if any) likewise, and the timestamp sits in the configured
/// civil timezone.
#[derive(Debug, Clone)]
pub struct ScanEvent {
    pub rfid_uid: String,
    pub scan_time: DateTime<FixedOffset>,
    pub exam_code: Option<String>,
    pub entry_type: EntryType,
}

impl ScanEvent {
    /// Normalize raw scanner input.
    ///
    /// `timestamp` accepts RFC 3339 or a bare `YYYY-MM-DDTHH:MM:SS` local
    /// datetime; bare datetimes are interpreted in `tz`. When absent the
    /// current instant is used. Offsets carried by RFC 3339 input are
    /// honored and the instant converted into `tz`.
    pub fn resolve(
        rfid_uid: &str,
        timestamp: Option<&str>,
        exam_code: Option<&str>,
        entry_type: Option<EntryType>,
        tz: FixedOffset,
        now: DateTime<Utc>,
    ) -> Result<Self, ScanError> {
        let uid = rfid_uid.trim().to_uppercase();
        if uid.is_empty() {
            return Err(ScanError::Validation("rfid_uid must not be empty".to_string()));
        }

        let scan_time = match timestamp {
            None => now.with_timezone(&tz),
            Some(raw) => parse_timestamp(raw.trim(), tz)?,
        };

        let exam_code = exam_code
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty());

        Ok(Self {
            rfid_uid: uid,
            scan_time,
            exam_code,
            entry_type: entry_type.unwrap_or_default(),
        })
    }

    /// Civil calendar day the scan falls on, `YYYY-MM-DD`.
    pub fn attendance_date(&self) -> String {
        self.scan_time.format("%Y-%m-%d").to_string()
    }

    pub fn day_of_week(&self) -> String {
        self.scan_time.format("%A").to_string()
    }
}

fn parse_timestamp(raw: &str, tz: FixedOffset) -> Result<DateTime<FixedOffset>, ScanError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&tz));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            // Fixed offsets map every local datetime to exactly one instant.
            if let Some(dt) = tz.from_local_datetime(&naive).single() {
                return Ok(dt);
            }
        }
    }
    Err(ScanError::Validation(format!(
        "timestamp '{raw}' is not a recognized ISO-8601 datetime"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn cat() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    #[test]
    fn uid_is_trimmed_and_uppercased() {
        let ev = ScanEvent::resolve("  ab12cd34 ", None, None, None, cat(), Utc::now()).unwrap();
        assert_eq!(ev.rfid_uid, "AB12CD34");
        assert_eq!(ev.entry_type, EntryType::Entry);
    }

    #[test]
    fn empty_uid_is_rejected() {
        let err = ScanEvent::resolve("   ", None, None, None, cat(), Utc::now()).unwrap_err();
        assert!(matches!(err, ScanError::Validation(_)));
    }

    #[test]
    fn bare_datetime_is_read_in_civil_timezone() {
        let ev = ScanEvent::resolve(
            "CARD1",
            Some("2026-03-09T08:45:00"),
            Some("math101"),
            None,
            cat(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(ev.scan_time.hour(), 8);
        assert_eq!(ev.scan_time.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(ev.exam_code.as_deref(), Some("MATH101"));
        assert_eq!(ev.attendance_date(), "2026-03-09");
        assert_eq!(ev.day_of_week(), "Monday");
    }

    #[test]
    fn rfc3339_offset_is_converted_not_discarded() {
        // 06:45Z is 08:45 CAT.
        let ev = ScanEvent::resolve(
            "CARD1",
            Some("2026-03-09T06:45:00Z"),
            None,
            None,
            cat(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(ev.scan_time.hour(), 8);
    }

    #[test]
    fn garbage_timestamp_is_a_validation_error() {
        let err =
            ScanEvent::resolve("CARD1", Some("yesterday"), None, None, cat(), Utc::now())
                .unwrap_err();
        assert!(matches!(err, ScanError::Validation(_)));
    }

    #[test]
    fn blank_exam_code_means_general_attendance() {
        let ev = ScanEvent::resolve("CARD1", None, Some("  "), None, cat(), Utc::now()).unwrap();
        assert!(ev.exam_code.is_none());
    }
}
