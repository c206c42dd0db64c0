//! Channel index descriptors
//!
//! A log orders its data along one or more index axes; the first is the
//! primary axis and drives all chunking and ordering. Time indices are held
//! internally as microseconds since the epoch so depth and time logs share
//! one numeric range domain; the original time-zone offset is kept so
//! date-times echo back the way they arrived.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::channel::error::{ChannelError, ChannelResult};
use crate::channel::range::{IndexDirection, IndexRange};

/// Descriptor for one index axis of a log
///
/// When embedded in a chunk document, `start` and `end` bracket the records
/// actually present in that chunk, inclusive on both sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelIndex {
    pub mnemonic: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub direction: IndexDirection,
    #[serde(default)]
    pub is_time_index: bool,
    /// Time-zone offset in seconds captured from the first observed reader
    #[serde(default)]
    pub offset_seconds: i32,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
}

impl ChannelIndex {
    /// A depth axis in the given direction
    pub fn depth(mnemonic: impl Into<String>, unit: impl Into<String>, direction: IndexDirection) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            unit: unit.into(),
            direction,
            is_time_index: false,
            offset_seconds: 0,
            start: 0.0,
            end: 0.0,
        }
    }

    /// A time axis; time logs are always increasing
    pub fn time(mnemonic: impl Into<String>, offset_seconds: i32) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            unit: "datetime".to_string(),
            direction: IndexDirection::Increasing,
            is_time_index: true,
            offset_seconds,
            start: 0.0,
            end: 0.0,
        }
    }

    pub fn is_increasing(&self) -> bool {
        self.direction.is_increasing()
    }

    /// The per-chunk record span as a range in log order
    pub fn range(&self) -> IndexRange {
        IndexRange::bounded(self.start, self.end)
    }

    /// Copy of this descriptor with fresh per-chunk bounds
    pub fn with_range(&self, start: f64, end: f64) -> Self {
        let mut index = self.clone();
        index.start = start;
        index.end = end;
        index
    }
}

/// Parse an ISO-8601 date-time into (microseconds since epoch, offset seconds)
pub fn micros_from_iso(value: &str) -> ChannelResult<(f64, i32)> {
    let parsed: DateTime<FixedOffset> = DateTime::parse_from_rfc3339(value)
        .map_err(|e| ChannelError::InvalidRange(format!("Bad date-time '{}': {}", value, e)))?;
    let micros = parsed.timestamp_micros() as f64;
    let offset = parsed.offset().local_minus_utc();
    Ok((micros, offset))
}

/// Format microseconds since epoch as ISO-8601 with the given offset
pub fn iso_from_micros(micros: f64, offset_seconds: i32) -> String {
    let utc = Utc
        .timestamp_micros(micros as i64)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    match FixedOffset::east_opt(offset_seconds) {
        Some(offset) => utc.with_timezone(&offset).to_rfc3339(),
        None => utc.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_micros_round_trip_preserves_offset() {
        let (micros, offset) = micros_from_iso("2024-03-01T08:30:00+05:00").unwrap();
        assert_eq!(offset, 5 * 3600);

        let formatted = iso_from_micros(micros, offset);
        assert_eq!(formatted, "2024-03-01T08:30:00+05:00");
    }

    #[test]
    fn test_micros_from_iso_utc() {
        let (micros, offset) = micros_from_iso("1970-01-01T00:00:01Z").unwrap();
        assert_eq!(micros, 1_000_000.0);
        assert_eq!(offset, 0);
    }

    #[test]
    fn test_bad_date_time_rejected() {
        assert!(matches!(
            micros_from_iso("not-a-date"),
            Err(ChannelError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_with_range() {
        let index = ChannelIndex::depth("DEPTH", "m", IndexDirection::Increasing);
        let bounded = index.with_range(100.0, 300.0);
        assert_eq!(bounded.start, 100.0);
        assert_eq!(bounded.end, 300.0);
        assert_eq!(bounded.mnemonic, "DEPTH");
        assert_eq!(bounded.range(), IndexRange::bounded(100.0, 300.0));
    }
}
