use chrono::{DateTime, TimeZone, Utc};

/// Fallback instant used whenever a timestamp is missing, zero, or the
/// unix epoch sentinel (`1970-01-01T00:00:00Z`), matching the "safe
/// fallback instant" rule for the `timestamp_utc` column.
const FALLBACK_SECS: i64 = 24 * 60 * 60;
/// Upper clamp bound: 2106-02-07, the edge of a 32-bit unsigned unix
/// timestamp — the column's storage ceiling in the target schema.
const MAX_SECS: i64 = 4_294_944_000;

fn fallback() -> DateTime<Utc> {
    Utc.timestamp_opt(FALLBACK_SECS, 0).single().expect("fallback instant is always valid")
}

/// Clamps a row's canonical timestamp to the target column's storable
/// range, substituting the fallback instant for the epoch sentinel or
/// any value outside `(0, 4_294_944_000)` seconds since epoch.
pub fn clamp_timestamp(ts: DateTime<Utc>) -> DateTime<Utc> {
    let secs = ts.timestamp();
    if secs <= 0 || secs >= MAX_SECS {
        fallback()
    } else {
        ts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_sentinel_falls_back() {
        let ts = Utc.timestamp_opt(0, 0).unwrap();
        assert_eq!(clamp_timestamp(ts), fallback());
    }

    #[test]
    fn in_range_timestamp_passes_through() {
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(clamp_timestamp(ts), ts);
    }

    #[test]
    fn far_future_timestamp_falls_back() {
        let ts = Utc.timestamp_opt(MAX_SECS + 1, 0).unwrap();
        assert_eq!(clamp_timestamp(ts), fallback());
    }
}
