//! Log header documents
//!
//! A log header names its index axis, direction and curves, and carries the
//! index-range bookkeeping the channel engine maintains: per-curve min/max
//! (numeric or date-time) and the log-level start/end. The header is owned
//! by the objects layer; the engine only ever mutates those range fields.

use serde::{Deserialize, Serialize};

use crate::channel::{micros_from_iso, ChannelIndex, ChannelLayout, IndexDirection, IndexRange};

/// Kind of primary index a log is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexType {
    #[serde(rename = "measured depth")]
    MeasuredDepth,
    #[serde(rename = "date time")]
    DateTime,
}

/// One curve of a log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LogCurve {
    pub mnemonic: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_index: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_index: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date_time_index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date_time_index: Option<String>,
    #[serde(default)]
    pub min_date_time_index_specified: bool,
    #[serde(default)]
    pub max_date_time_index_specified: bool,
}

impl LogCurve {
    pub fn new(mnemonic: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            unit: unit.into(),
            ..Default::default()
        }
    }
}

/// Embedded data block echoed back on queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogData {
    pub mnemonic_list: String,
    pub unit_list: String,
    pub data: Vec<String>,
    /// Set when context limits cut the result short
    #[serde(default)]
    pub truncated: bool,
}

/// A log header document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub uid: String,
    #[serde(default)]
    pub uid_well: String,
    #[serde(default)]
    pub uid_wellbore: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri: String,
    /// Absent only on projected responses; a stored log always carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_type: Option<IndexType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<IndexDirection>,
    /// Mnemonic of the primary index curve
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub index_curve: String,
    /// Log-wide default null sentinel, overridable per curve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_index: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date_time_index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date_time_index: Option<String>,
    #[serde(default)]
    pub log_curve_info: Vec<LogCurve>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_data: Option<LogData>,
}

impl Log {
    pub fn is_time_index(&self) -> bool {
        self.index_type == Some(IndexType::DateTime)
    }

    pub fn is_increasing(&self) -> bool {
        self.direction.unwrap_or_default().is_increasing()
    }

    pub fn curve(&self, mnemonic: &str) -> Option<&LogCurve> {
        self.log_curve_info.iter().find(|c| c.mnemonic == mnemonic)
    }

    pub fn curve_mut(&mut self, mnemonic: &str) -> Option<&mut LogCurve> {
        self.log_curve_info
            .iter_mut()
            .find(|c| c.mnemonic == mnemonic)
    }

    /// Null sentinel for a curve, falling back to the log-wide default
    pub fn null_value_for(&self, curve: &LogCurve) -> String {
        curve
            .null_value
            .clone()
            .or_else(|| self.null_value.clone())
            .unwrap_or_default()
    }

    /// Curves with the index curve first, the rest in header order
    fn ordered_curves(&self) -> Vec<&LogCurve> {
        let mut curves: Vec<&LogCurve> = Vec::with_capacity(self.log_curve_info.len());
        if let Some(primary) = self.curve(&self.index_curve) {
            curves.push(primary);
        }
        curves.extend(
            self.log_curve_info
                .iter()
                .filter(|c| c.mnemonic != self.index_curve),
        );
        curves
    }

    /// The channel layout this header describes; primary index at position 0
    pub fn layout(&self) -> ChannelLayout {
        let curves = self.ordered_curves();
        ChannelLayout {
            mnemonics: curves.iter().map(|c| c.mnemonic.clone()).collect(),
            units: curves.iter().map(|c| c.unit.clone()).collect(),
            null_values: curves.iter().map(|c| self.null_value_for(c)).collect(),
        }
    }

    /// Descriptor of the primary index axis
    pub fn primary_index(&self, offset_seconds: i32) -> ChannelIndex {
        ChannelIndex {
            mnemonic: self.index_curve.clone(),
            unit: self
                .curve(&self.index_curve)
                .map(|c| c.unit.clone())
                .unwrap_or_default(),
            direction: self.direction.unwrap_or_default(),
            is_time_index: self.is_time_index(),
            offset_seconds,
            start: 0.0,
            end: 0.0,
        }
    }

    /// The log-level index span, numeric or parsed from date-times
    pub fn header_range(&self) -> IndexRange {
        if self.is_time_index() {
            let parse = |s: &Option<String>| {
                s.as_deref()
                    .and_then(|v| micros_from_iso(v).ok())
                    .map(|(micros, _)| micros)
            };
            IndexRange::new(
                parse(&self.start_date_time_index),
                parse(&self.end_date_time_index),
            )
        } else {
            IndexRange::new(self.start_index, self.end_index)
        }
    }

    /// Time-zone offset preserved on the header, from its date-time fields
    pub fn header_offset(&self) -> i32 {
        self.start_date_time_index
            .as_deref()
            .or(self.end_date_time_index.as_deref())
            .and_then(|v| micros_from_iso(v).ok())
            .map(|(_, offset)| offset)
            .unwrap_or(0)
    }
}
