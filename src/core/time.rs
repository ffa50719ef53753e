use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime, PrimitiveDateTime};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

/// Start of an attempt that ended at `end` after `elapsed_seconds`.
pub(crate) fn seconds_before(end: PrimitiveDateTime, elapsed_seconds: i64) -> PrimitiveDateTime {
    end.checked_sub(Duration::seconds(elapsed_seconds.max(0))).unwrap_or(end)
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}
