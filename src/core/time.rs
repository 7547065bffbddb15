use time::{format_description::well_known::Rfc3339, OffsetDateTime, PrimitiveDateTime, UtcOffset};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    to_primitive_utc(OffsetDateTime::now_utc())
}

pub(crate) fn to_primitive_utc(value: OffsetDateTime) -> PrimitiveDateTime {
    let utc = value.to_offset(UtcOffset::UTC);
    PrimitiveDateTime::new(utc.date(), utc.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// True when `now` lies strictly after `deadline`; a missing deadline never passes.
pub(crate) fn is_past(deadline: Option<PrimitiveDateTime>, now: PrimitiveDateTime) -> bool {
    deadline.is_some_and(|deadline| now > deadline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Duration, Time};

    fn sample() -> PrimitiveDateTime {
        let date = Date::from_calendar_date(2025, time::Month::January, 2).unwrap();
        let time = Time::from_hms(10, 20, 30).unwrap();
        PrimitiveDateTime::new(date, time)
    }

    #[test]
    fn format_primitive_outputs_utc_z() {
        assert_eq!(format_primitive(sample()), "2025-01-02T10:20:30Z");
    }

    #[test]
    fn to_primitive_utc_normalizes_offset() {
        let offset = UtcOffset::from_hms(3, 0, 0).unwrap();
        let shifted = sample().assume_utc().to_offset(offset);
        assert_eq!(to_primitive_utc(shifted), sample());
    }

    #[test]
    fn is_past_treats_deadline_as_inclusive() {
        let deadline = sample();
        assert!(!is_past(Some(deadline), deadline));
        assert!(is_past(Some(deadline), deadline + Duration::seconds(1)));
        assert!(!is_past(None, deadline + Duration::days(365)));
    }
}
