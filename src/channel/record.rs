//! Channel records and the forward-only reader
//!
//! A record is one row of a log: the primary index value followed by one
//! value per channel. Arity and column order are fixed by the owning layout,
//! whose mnemonic, unit and null-sentinel lists stay parallel to the row.
//!
//! The reader materializes an incoming stream, validates its shape, converts
//! time indices to microseconds, and exposes per-channel sub-ranges and
//! mnemonic slicing. Consumers downstream (merger, chunker) see plain record
//! iterators.

use serde_json::Value;

use crate::channel::error::{ChannelError, ChannelResult};
use crate::channel::index::{micros_from_iso, ChannelIndex};
use crate::channel::range::IndexRange;

/// Column metadata for a record stream; position 0 is the primary index
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChannelLayout {
    pub mnemonics: Vec<String>,
    pub units: Vec<String>,
    pub null_values: Vec<String>,
}

impl ChannelLayout {
    pub fn new(
        mnemonics: Vec<String>,
        units: Vec<String>,
        null_values: Vec<String>,
    ) -> ChannelResult<Self> {
        if mnemonics.len() != units.len() || mnemonics.len() != null_values.len() {
            return Err(ChannelError::InvalidRange(format!(
                "Mismatched channel lists: {} mnemonics, {} units, {} null values",
                mnemonics.len(),
                units.len(),
                null_values.len()
            )));
        }
        Ok(Self {
            mnemonics,
            units,
            null_values,
        })
    }

    /// Parse comma-joined lists as stored on a chunk document
    pub fn from_lists(mnemonics: &str, units: &str, null_values: &str) -> ChannelResult<Self> {
        let split = |s: &str| -> Vec<String> {
            if s.is_empty() {
                Vec::new()
            } else {
                s.split(',').map(str::to_string).collect()
            }
        };
        Self::new(split(mnemonics), split(units), split(null_values))
    }

    /// Number of columns, primary index included
    pub fn arity(&self) -> usize {
        self.mnemonics.len()
    }

    pub fn position(&self, mnemonic: &str) -> Option<usize> {
        self.mnemonics.iter().position(|m| m == mnemonic)
    }

    pub fn null_value(&self, column: usize) -> &str {
        self.null_values.get(column).map(String::as_str).unwrap_or("")
    }

    /// Whether `value` is the null sentinel for `column`
    pub fn is_null(&self, column: usize, value: &Value) -> bool {
        let sentinel = self.null_value(column);
        match value {
            Value::Null => true,
            Value::String(s) => s.is_empty() || s == sentinel,
            Value::Number(n) => match sentinel.parse::<f64>() {
                Ok(null_num) => n.as_f64() == Some(null_num),
                Err(_) => false,
            },
            _ => false,
        }
    }

    /// The null sentinel of `column` as a row value
    pub fn null_for(&self, column: usize) -> Value {
        let sentinel = self.null_value(column);
        match sentinel.parse::<f64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::Null,
        }
    }

    /// Union of two layouts: `self`'s columns first, `other`'s additions after
    ///
    /// The same mnemonic carrying two different units is rejected.
    pub fn union(&self, other: &ChannelLayout) -> ChannelResult<ChannelLayout> {
        let mut merged = self.clone();
        for (pos, mnemonic) in other.mnemonics.iter().enumerate() {
            match merged.position(mnemonic) {
                Some(existing) => {
                    let known = &merged.units[existing];
                    let offered = &other.units[pos];
                    if !known.is_empty() && !offered.is_empty() && known != offered {
                        return Err(ChannelError::InvalidRange(format!(
                            "Unit mismatch for {}: {} vs {}",
                            mnemonic, known, offered
                        )));
                    }
                }
                None => {
                    merged.mnemonics.push(mnemonic.clone());
                    merged.units.push(other.units[pos].clone());
                    merged.null_values.push(other.null_values[pos].clone());
                }
            }
        }
        Ok(merged)
    }

    /// For each of `self`'s columns, its position in `target`
    pub fn mapping_into(&self, target: &ChannelLayout) -> ChannelResult<Vec<usize>> {
        self.mnemonics
            .iter()
            .map(|m| {
                target.position(m).ok_or_else(|| {
                    ChannelError::InvalidRange(format!("Channel {} missing from layout", m))
                })
            })
            .collect()
    }

    pub fn mnemonic_list(&self) -> String {
        self.mnemonics.join(",")
    }

    pub fn unit_list(&self) -> String {
        self.units.join(",")
    }

    pub fn null_value_list(&self) -> String {
        self.null_values.join(",")
    }
}

/// One row of channel data
///
/// `values[0]` is the primary index. `chunk_id` names the chunk the row was
/// read from, when any; rows from an incoming reader have none until the
/// merger assigns placement.
#[derive(Debug, Clone)]
pub struct ChannelDataRecord {
    pub chunk_id: Option<String>,
    pub values: Vec<Value>,
}

impl ChannelDataRecord {
    pub fn new(chunk_id: Option<String>, values: Vec<Value>) -> Self {
        Self { chunk_id, values }
    }

    /// The primary index value
    pub fn index(&self) -> f64 {
        self.values.first().and_then(Value::as_f64).unwrap_or(f64::NAN)
    }

    pub fn value(&self, column: usize) -> &Value {
        self.values.get(column).unwrap_or(&Value::Null)
    }

    /// Whether any non-index column holds a non-null value
    pub fn has_values(&self, layout: &ChannelLayout) -> bool {
        self.values
            .iter()
            .enumerate()
            .skip(1)
            .any(|(col, value)| !layout.is_null(col, value))
    }
}

/// Records are identified by their primary index value
impl PartialEq for ChannelDataRecord {
    fn eq(&self, other: &Self) -> bool {
        self.index() == other.index()
    }
}

/// A validated, ordered stream of channel data rows
#[derive(Debug, Clone)]
pub struct ChannelDataReader {
    uri: String,
    indices: Vec<ChannelIndex>,
    layout: ChannelLayout,
    rows: Vec<Vec<Value>>,
}

impl ChannelDataReader {
    /// Build a reader over raw rows
    ///
    /// Validates arity against the layout and, for time logs, converts
    /// ISO-8601 index values to microseconds, capturing the time-zone offset
    /// of the first row into the primary index descriptor.
    pub fn new(
        uri: impl Into<String>,
        mut indices: Vec<ChannelIndex>,
        layout: ChannelLayout,
        mut rows: Vec<Vec<Value>>,
    ) -> ChannelResult<Self> {
        let primary = indices
            .first()
            .ok_or_else(|| ChannelError::InvalidRange("Reader has no index descriptor".into()))?
            .clone();

        if layout.arity() > 0 && layout.mnemonics[0] != primary.mnemonic {
            return Err(ChannelError::InvalidRange(format!(
                "Primary mnemonic {} does not lead the mnemonic list",
                primary.mnemonic
            )));
        }

        let mut offset: Option<i32> = None;
        for row in rows.iter_mut() {
            if row.len() != layout.arity() {
                return Err(ChannelError::InvalidRange(format!(
                    "Row arity {} does not match {} channels",
                    row.len(),
                    layout.arity()
                )));
            }
            if primary.is_time_index {
                if let Value::String(text) = &row[0] {
                    let (micros, row_offset) = micros_from_iso(text)?;
                    row[0] = Value::from(micros);
                    offset.get_or_insert(row_offset);
                }
            }
            if row.first().and_then(Value::as_f64).is_none() {
                return Err(ChannelError::InvalidRange(
                    "Primary index value is not numeric".into(),
                ));
            }
        }
        if let Some(offset) = offset {
            indices[0].offset_seconds = offset;
        }

        Ok(Self {
            uri: uri.into(),
            indices,
            layout,
            rows,
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn indices(&self) -> &[ChannelIndex] {
        &self.indices
    }

    pub fn primary_index(&self) -> &ChannelIndex {
        &self.indices[0]
    }

    pub fn layout(&self) -> &ChannelLayout {
        &self.layout
    }

    pub fn is_increasing(&self) -> bool {
        self.primary_index().is_increasing()
    }

    pub fn is_time_index(&self) -> bool {
        self.primary_index().is_time_index
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// The span from first to last row, in log order
    pub fn index_range(&self) -> IndexRange {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => IndexRange::bounded(
                first[0].as_f64().unwrap_or(f64::NAN),
                last[0].as_f64().unwrap_or(f64::NAN),
            ),
            _ => IndexRange::unbounded(),
        }
    }

    /// The sub-range over which `column` holds non-null values
    pub fn channel_range(&self, column: usize) -> Option<IndexRange> {
        let mut first = None;
        let mut last = None;
        for row in &self.rows {
            if !self.layout.is_null(column, &row[column]) {
                let index = row[0].as_f64().unwrap_or(f64::NAN);
                first.get_or_insert(index);
                last = Some(index);
            }
        }
        match (first, last) {
            (Some(first), Some(last)) => Some(IndexRange::bounded(first, last)),
            _ => None,
        }
    }

    /// Per-column sub-ranges; position 0 carries the overall index range
    pub fn channel_ranges(&self) -> Vec<Option<IndexRange>> {
        (0..self.layout.arity())
            .map(|col| {
                if col == 0 {
                    let range = self.index_range();
                    if range.is_unbounded() {
                        None
                    } else {
                        Some(range)
                    }
                } else {
                    self.channel_range(col)
                }
            })
            .collect()
    }

    /// Restrict to a subset of mnemonics; the primary index always survives
    pub fn slice(&self, mnemonics: &[String]) -> ChannelDataReader {
        let keep: Vec<usize> = (0..self.layout.arity())
            .filter(|&col| col == 0 || mnemonics.contains(&self.layout.mnemonics[col]))
            .collect();

        let pick = |list: &[String]| -> Vec<String> {
            keep.iter().map(|&col| list[col].clone()).collect()
        };
        let layout = ChannelLayout {
            mnemonics: pick(&self.layout.mnemonics),
            units: pick(&self.layout.units),
            null_values: pick(&self.layout.null_values),
        };
        let rows = self
            .rows
            .iter()
            .map(|row| keep.iter().map(|&col| row[col].clone()).collect())
            .collect();

        ChannelDataReader {
            uri: self.uri.clone(),
            indices: self.indices.clone(),
            layout,
            rows,
        }
    }

    /// Iterate rows as records
    pub fn records(&self) -> impl Iterator<Item = ChannelDataRecord> + '_ {
        self.rows
            .iter()
            .map(|row| ChannelDataRecord::new(None, row.clone()))
    }

    /// Consume the reader into its record stream
    pub fn into_records(self) -> impl Iterator<Item = ChannelDataRecord> {
        self.rows
            .into_iter()
            .map(|row| ChannelDataRecord::new(None, row))
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }
}
