//! Three-way merge of stored and incoming record streams
//!
//! The merger walks two strictly monotonic streams in log order and yields
//! the stream to be rechunked. Where both sides carry a row at the same
//! primary index, incoming values overwrite existing columns channel by
//! channel, but only where the incoming stream actually has data for that
//! channel (its per-channel sub-range contains the index). Existing rows
//! inside the update range that the incoming stream skipped are cleared the
//! same way, channel by channel, and dropped entirely once no value
//! remains. Rows keep the uid of the chunk they came from; rows that are
//! new adopt the id carried from the preceding existing row so they land
//! with their neighbors when rechunked.

use std::iter::Peekable;

use crate::channel::error::ChannelResult;
use crate::channel::range::IndexRange;
use crate::channel::record::{ChannelDataRecord, ChannelLayout};

/// Merging iterator over an existing and an incoming record stream
pub struct ChannelDataMerger<E, I>
where
    E: Iterator<Item = ChannelDataRecord>,
    I: Iterator<Item = ChannelDataRecord>,
{
    existing: Peekable<E>,
    incoming: Peekable<I>,
    /// Union of both input layouts; the output layout
    layout: ChannelLayout,
    existing_map: Vec<usize>,
    incoming_map: Vec<usize>,
    /// Per-column sub-ranges of the incoming stream, in incoming layout order
    incoming_ranges: Vec<Option<IndexRange>>,
    update_range: IndexRange,
    increasing: bool,
    carried_id: Option<String>,
}

impl<E, I> ChannelDataMerger<E, I>
where
    E: Iterator<Item = ChannelDataRecord>,
    I: Iterator<Item = ChannelDataRecord>,
{
    pub fn new(
        existing_layout: &ChannelLayout,
        existing: E,
        incoming_layout: &ChannelLayout,
        incoming_ranges: Vec<Option<IndexRange>>,
        incoming: I,
        update_range: IndexRange,
        increasing: bool,
    ) -> ChannelResult<Self> {
        let layout = existing_layout.union(incoming_layout)?;
        let existing_map = existing_layout.mapping_into(&layout)?;
        let incoming_map = incoming_layout.mapping_into(&layout)?;

        Ok(Self {
            existing: existing.peekable(),
            incoming: incoming.peekable(),
            layout,
            existing_map,
            incoming_map,
            incoming_ranges,
            update_range,
            increasing,
            carried_id: None,
        })
    }

    /// The layout merged records are produced in
    pub fn layout(&self) -> &ChannelLayout {
        &self.layout
    }

    fn precedes(&self, a: f64, b: f64) -> bool {
        if self.increasing {
            a < b
        } else {
            a > b
        }
    }

    /// Whether the incoming stream has data for column `col` at `index`
    fn incoming_covers(&self, col: usize, index: f64) -> bool {
        self.incoming_ranges
            .get(col)
            .and_then(|r| r.as_ref())
            .map_or(false, |r| r.contains(index, self.increasing, true))
    }

    fn remap(&self, values: &[serde_json::Value], map: &[usize]) -> Vec<serde_json::Value> {
        let mut row: Vec<serde_json::Value> = (0..self.layout.arity())
            .map(|col| self.layout.null_for(col))
            .collect();
        for (from, value) in values.iter().enumerate() {
            row[map[from]] = value.clone();
        }
        row
    }

    fn remap_existing(&self, record: ChannelDataRecord) -> ChannelDataRecord {
        let values = self.remap(&record.values, &self.existing_map);
        ChannelDataRecord::new(record.chunk_id, values)
    }

    fn remap_incoming(&self, record: ChannelDataRecord) -> ChannelDataRecord {
        let values = self.remap(&record.values, &self.incoming_map);
        ChannelDataRecord::new(self.carried_id.clone(), values)
    }

    /// Both sides hold a row at the same index: overwrite column-wise
    fn merge_equal(
        &mut self,
        existing: ChannelDataRecord,
        incoming: ChannelDataRecord,
    ) -> ChannelDataRecord {
        self.carried_id = existing.chunk_id.clone();
        let index = existing.index();
        let mut merged = self.remap_existing(existing);
        for (col, value) in incoming.values.iter().enumerate().skip(1) {
            if self.incoming_covers(col, index) {
                merged.values[self.incoming_map[col]] = value.clone();
            }
        }
        merged
    }

    /// An existing row the incoming stream passed over
    ///
    /// Outside the update range it survives untouched. Inside, every channel
    /// the incoming stream covers at this index is cleared to its null
    /// sentinel; the row is dropped once nothing remains.
    fn pass_existing(&mut self, existing: ChannelDataRecord) -> Option<ChannelDataRecord> {
        self.carried_id = existing.chunk_id.clone();
        let index = existing.index();
        let mut row = self.remap_existing(existing);

        if !self.update_range.contains(index, self.increasing, true) {
            return Some(row);
        }

        for col in 1..self.incoming_map.len() {
            if self.incoming_covers(col, index) {
                let target = self.incoming_map[col];
                row.values[target] = self.layout.null_for(target);
            }
        }

        if row.has_values(&self.layout) {
            Some(row)
        } else {
            None
        }
    }
}

impl<E, I> Iterator for ChannelDataMerger<E, I>
where
    E: Iterator<Item = ChannelDataRecord>,
    I: Iterator<Item = ChannelDataRecord>,
{
    type Item = ChannelDataRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let existing_index = self.existing.peek().map(ChannelDataRecord::index);
            let incoming_index = self.incoming.peek().map(ChannelDataRecord::index);

            match (existing_index, incoming_index) {
                (None, None) => return None,
                (None, Some(_)) => {
                    let incoming = self.incoming.next()?;
                    return Some(self.remap_incoming(incoming));
                }
                (Some(_), None) => {
                    let existing = self.existing.next()?;
                    if let Some(row) = self.pass_existing(existing) {
                        return Some(row);
                    }
                }
                (Some(e), Some(u)) => {
                    if e == u {
                        let existing = self.existing.next()?;
                        let incoming = self.incoming.next()?;
                        return Some(self.merge_equal(existing, incoming));
                    } else if self.precedes(u, e) {
                        let incoming = self.incoming.next()?;
                        return Some(self.remap_incoming(incoming));
                    } else {
                        let existing = self.existing.next()?;
                        if let Some(row) = self.pass_existing(existing) {
                            return Some(row);
                        }
                    }
                }
            }
        }
    }
}
