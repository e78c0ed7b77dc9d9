use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod common;
pub mod connectivity;
pub mod health;
pub mod player;
pub mod schedule;
pub mod sse;
pub mod team_config;
pub mod validation;

/// Render a millisecond Unix timestamp as RFC 3339.
fn format_timestamp_ms(ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .ok()
        .and_then(|time| time.format(&Rfc3339).ok())
        .unwrap_or_else(|| "invalid-timestamp".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_millisecond_timestamps() {
        assert_eq!(format_timestamp_ms(0), "1970-01-01T00:00:00Z");
        assert_eq!(format_timestamp_ms(1_700_000_000_000), "2023-11-14T22:13:20Z");
    }
}
