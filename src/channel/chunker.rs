//! Partitioning a record stream into aligned chunks
//!
//! A single forward pass walks the records, validating monotonicity, and
//! cuts a chunk whenever a record falls outside the planned extent. Extent
//! containment is open-ended, so a record sitting exactly on an extent
//! boundary starts the next chunk.

use serde_json::Value;

use crate::channel::chunk::ChannelDataChunk;
use crate::channel::error::{ChannelError, ChannelResult};
use crate::channel::index::ChannelIndex;
use crate::channel::range::{aligned_extent, IndexRange};
use crate::channel::record::ChannelDataRecord;
use crate::store::StoreError;
use std::collections::HashSet;

/// Cuts an ordered record stream into fixed-extent chunks
pub struct DataChunker {
    range_size: f64,
    increasing: bool,
}

struct ChunkAccumulator {
    extent: IndexRange,
    start: f64,
    end: f64,
    id: Option<String>,
    rows: Vec<Vec<Value>>,
}

impl ChunkAccumulator {
    fn seed(record: ChannelDataRecord, extent: IndexRange) -> Self {
        let index = record.index();
        Self {
            extent,
            start: index,
            end: index,
            id: record.chunk_id,
            rows: vec![record.values],
        }
    }

    fn push(&mut self, record: ChannelDataRecord) {
        self.end = record.index();
        if self.id.is_none() {
            self.id = record.chunk_id;
        }
        self.rows.push(record.values);
    }
}

impl DataChunker {
    pub fn new(range_size: f64, increasing: bool) -> Self {
        Self {
            range_size,
            increasing,
        }
    }

    /// Partition `records` into chunks aligned to the configured range size
    ///
    /// Fails on a duplicate or out-of-order primary index before anything is
    /// emitted, so a violating stream never produces a partial result. The
    /// emitted chunks carry their own index bounds, data and record count;
    /// shared write attributes (uri and channel lists) are applied by the
    /// store at bulk-write time.
    ///
    /// A chunk adopts the first originating-chunk id seen among its records.
    /// An id claimed by an earlier chunk of the same pass is not taken
    /// again; the later chunk inserts as new, keeping stored extents
    /// disjoint when merged rows carry ids across an extent boundary.
    pub fn chunk(
        &self,
        records: impl IntoIterator<Item = ChannelDataRecord>,
        indices: &[ChannelIndex],
    ) -> ChannelResult<Vec<ChannelDataChunk>> {
        let mut chunks = Vec::new();
        let mut current: Option<ChunkAccumulator> = None;
        let mut previous: Option<f64> = None;
        let mut claimed_ids: HashSet<String> = HashSet::new();

        for record in records {
            let index = record.index();

            if let Some(previous) = previous {
                if previous == index {
                    return Err(ChannelError::DuplicateIndex(index));
                }
                let out_of_order = if self.increasing {
                    previous > index
                } else {
                    previous < index
                };
                if out_of_order {
                    return Err(ChannelError::IndexOutOfOrder {
                        previous,
                        current: index,
                    });
                }
            }
            previous = Some(index);

            let fits = current
                .as_ref()
                .map_or(false, |acc| acc.extent.contains(index, self.increasing, false));
            if fits {
                if let Some(accumulator) = current.as_mut() {
                    accumulator.push(record);
                }
            } else {
                let extent = aligned_extent(index, self.range_size, self.increasing);
                if let Some(finished) = current.replace(ChunkAccumulator::seed(record, extent)) {
                    chunks.push(self.emit(finished, indices, &mut claimed_ids)?);
                }
            }
        }

        if let Some(trailing) = current {
            chunks.push(self.emit(trailing, indices, &mut claimed_ids)?);
        }

        Ok(chunks)
    }

    fn emit(
        &self,
        accumulator: ChunkAccumulator,
        indices: &[ChannelIndex],
        claimed_ids: &mut HashSet<String>,
    ) -> ChannelResult<ChannelDataChunk> {
        let uid = accumulator
            .id
            .filter(|id| claimed_ids.insert(id.clone()));

        let record_count = accumulator.rows.len();
        let data = serde_json::to_string(&accumulator.rows)
            .map_err(|e| ChannelError::Write(StoreError::Serialization(e.to_string())))?;

        let mut chunk_indices: Vec<ChannelIndex> = indices.to_vec();
        if let Some(primary) = chunk_indices.first_mut() {
            primary.start = accumulator.start;
            primary.end = accumulator.end;
        }

        Ok(ChannelDataChunk {
            uid,
            uri: String::new(),
            indices: chunk_indices,
            mnemonic_list: String::new(),
            unit_list: String::new(),
            null_value_list: String::new(),
            data,
            record_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::range::IndexDirection;
    use serde_json::json;

    fn indices() -> Vec<ChannelIndex> {
        vec![ChannelIndex::depth("DEPTH", "m", IndexDirection::Increasing)]
    }

    fn record(index: f64, value: f64) -> ChannelDataRecord {
        ChannelDataRecord::new(None, vec![json!(index), json!(value)])
    }

    fn record_with_id(index: f64, value: f64, id: &str) -> ChannelDataRecord {
        ChannelDataRecord::new(Some(id.to_string()), vec![json!(index), json!(value)])
    }

    #[test]
    fn test_single_extent() {
        let chunker = DataChunker::new(1000.0, true);
        let chunks = chunker
            .chunk(
                vec![record(100.0, 1.0), record(200.0, 2.0), record(300.0, 3.0)],
                &indices(),
            )
            .unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].record_count, 3);
        assert_eq!(chunks[0].indices[0].start, 100.0);
        assert_eq!(chunks[0].indices[0].end, 300.0);
        assert!(chunks[0].uid.is_none());
    }

    #[test]
    fn test_splits_on_extent_rollover() {
        let chunker = DataChunker::new(1000.0, true);
        let chunks = chunker
            .chunk(
                vec![record(100.0, 1.0), record(1500.0, 2.0), record(2500.0, 3.0)],
                &indices(),
            )
            .unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].indices[0].start, 100.0);
        assert_eq!(chunks[1].indices[0].start, 1500.0);
        assert_eq!(chunks[2].indices[0].start, 2500.0);
    }

    #[test]
    fn test_boundary_value_starts_next_chunk() {
        let chunker = DataChunker::new(1000.0, true);
        let chunks = chunker
            .chunk(vec![record(999.0, 1.0), record(1000.0, 2.0)], &indices())
            .unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].indices[0].start, 1000.0);
    }

    #[test]
    fn test_single_record_chunk() {
        let chunker = DataChunker::new(1000.0, true);
        let chunks = chunker.chunk(vec![record(100.0, 1.0)], &indices()).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].indices[0].start, chunks[0].indices[0].end);
    }

    #[test]
    fn test_empty_stream_is_noop() {
        let chunker = DataChunker::new(1000.0, true);
        let chunks = chunker.chunk(Vec::new(), &indices()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_duplicate_index_fails() {
        let chunker = DataChunker::new(1000.0, true);
        let result = chunker.chunk(vec![record(100.0, 1.0), record(100.0, 2.0)], &indices());
        assert!(matches!(result, Err(ChannelError::DuplicateIndex(i)) if i == 100.0));
    }

    #[test]
    fn test_out_of_order_fails() {
        let chunker = DataChunker::new(1000.0, true);
        let result = chunker.chunk(vec![record(300.0, 1.0), record(200.0, 2.0)], &indices());
        assert!(matches!(result, Err(ChannelError::IndexOutOfOrder { .. })));
    }

    #[test]
    fn test_decreasing_direction() {
        let chunker = DataChunker::new(1000.0, false);
        let chunks = chunker
            .chunk(
                vec![record(2500.0, 1.0), record(1500.0, 2.0), record(500.0, 3.0)],
                &[ChannelIndex::depth("DEPTH", "m", IndexDirection::Decreasing)],
            )
            .unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].indices[0].start, 2500.0);
        assert_eq!(chunks[2].indices[0].start, 500.0);

        // Out of order for a decreasing log is ascending input
        let result = chunker.chunk(
            vec![record(500.0, 1.0), record(1500.0, 2.0)],
            &[ChannelIndex::depth("DEPTH", "m", IndexDirection::Decreasing)],
        );
        assert!(matches!(result, Err(ChannelError::IndexOutOfOrder { .. })));
    }

    #[test]
    fn test_chunk_adopts_first_record_id() {
        let chunker = DataChunker::new(1000.0, true);
        let chunks = chunker
            .chunk(
                vec![
                    record(50.0, 1.0),
                    record_with_id(100.0, 2.0, "c1"),
                    record(200.0, 3.0),
                ],
                &indices(),
            )
            .unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].uid.as_deref(), Some("c1"));
    }

    #[test]
    fn test_claimed_id_not_reused_across_extents() {
        let chunker = DataChunker::new(1000.0, true);
        let chunks = chunker
            .chunk(
                vec![
                    record_with_id(100.0, 1.0, "c1"),
                    record_with_id(1500.0, 2.0, "c1"),
                ],
                &indices(),
            )
            .unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].uid.as_deref(), Some("c1"));
        assert!(chunks[1].uid.is_none());
    }
}
