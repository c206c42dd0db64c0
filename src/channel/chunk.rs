//! Chunk documents and record reassembly
//!
//! A chunk is the storage atom: a fixed-extent window of records for one
//! log, serialized as a JSON array of rows inside the document. The record
//! payload is opaque to every other component; [`ChunkReader`] is the only
//! place it is parsed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::channel::error::{ChannelError, ChannelResult};
use crate::channel::index::ChannelIndex;
use crate::channel::range::IndexRange;
use crate::channel::record::{ChannelDataRecord, ChannelLayout};
use crate::store::StoreError;

/// One stored window of channel data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDataChunk {
    /// Assigned at first insert; never changes afterwards
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Parent log URI, immutable
    #[serde(default)]
    pub uri: String,
    /// Index descriptors; the first is the primary axis
    pub indices: Vec<ChannelIndex>,
    #[serde(default)]
    pub mnemonic_list: String,
    #[serde(default)]
    pub unit_list: String,
    #[serde(default)]
    pub null_value_list: String,
    /// JSON array of rows; row\[0\] is the primary index value
    pub data: String,
    pub record_count: usize,
}

impl ChannelDataChunk {
    /// The primary-axis span of the records in this chunk
    pub fn primary_range(&self) -> IndexRange {
        self.indices
            .first()
            .map(ChannelIndex::range)
            .unwrap_or_default()
    }

    /// Column metadata stored on this chunk
    pub fn layout(&self) -> ChannelResult<ChannelLayout> {
        ChannelLayout::from_lists(&self.mnemonic_list, &self.unit_list, &self.null_value_list)
    }

    /// Parse the record payload
    pub fn rows(&self) -> ChannelResult<Vec<Vec<Value>>> {
        serde_json::from_str(&self.data)
            .map_err(|e| ChannelError::Read(StoreError::Serialization(e.to_string())))
    }
}

/// Reassembles records across an ordered run of chunks
///
/// Chunks written at different times may carry different channel sets; the
/// reader exposes one layout, the union over all chunks, and pads missing
/// channels with their null sentinels. Each record keeps the uid of the
/// chunk it came from so a later rechunk can preserve placement.
pub struct ChunkReader {
    layout: ChannelLayout,
    records: std::vec::IntoIter<ChannelDataRecord>,
    len: usize,
}

impl ChunkReader {
    pub fn new(chunks: &[ChannelDataChunk]) -> ChannelResult<Self> {
        let mut layout = match chunks.first() {
            Some(chunk) => chunk.layout()?,
            None => ChannelLayout::default(),
        };
        for chunk in chunks.iter().skip(1) {
            layout = layout.union(&chunk.layout()?)?;
        }

        let mut records = Vec::new();
        for chunk in chunks {
            let chunk_layout = chunk.layout()?;
            let mapping = chunk_layout.mapping_into(&layout)?;
            for row in chunk.rows()? {
                if row.len() != chunk_layout.arity() {
                    return Err(ChannelError::Read(StoreError::Serialization(format!(
                        "Chunk {:?} row arity {} does not match {} channels",
                        chunk.uid,
                        row.len(),
                        chunk_layout.arity()
                    ))));
                }
                let mut values: Vec<Value> = (0..layout.arity())
                    .map(|col| layout.null_for(col))
                    .collect();
                for (from, value) in row.into_iter().enumerate() {
                    values[mapping[from]] = value;
                }
                records.push(ChannelDataRecord::new(chunk.uid.clone(), values));
            }
        }

        let len = records.len();
        Ok(Self {
            layout,
            records: records.into_iter(),
            len,
        })
    }

    /// The unified layout records are delivered in
    pub fn layout(&self) -> &ChannelLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Iterator for ChunkReader {
    type Item = ChannelDataRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::range::IndexDirection;
    use serde_json::json;

    fn chunk(uid: &str, mnemonics: &str, units: &str, nulls: &str, rows: Value) -> ChannelDataChunk {
        ChannelDataChunk {
            uid: Some(uid.to_string()),
            uri: "uri:l1".to_string(),
            indices: vec![ChannelIndex::depth("DEPTH", "m", IndexDirection::Increasing)],
            mnemonic_list: mnemonics.to_string(),
            unit_list: units.to_string(),
            null_value_list: nulls.to_string(),
            data: rows.to_string(),
            record_count: rows.as_array().map(Vec::len).unwrap_or(0),
        }
    }

    #[test]
    fn test_reader_preserves_chunk_ids() {
        let chunks = vec![
            chunk(
                "c1",
                "DEPTH,GR",
                "m,gAPI",
                "-999.25,-999.25",
                json!([[100.0, 10.0], [200.0, 11.0]]),
            ),
            chunk(
                "c2",
                "DEPTH,GR",
                "m,gAPI",
                "-999.25,-999.25",
                json!([[1500.0, 12.0]]),
            ),
        ];

        let reader = ChunkReader::new(&chunks).unwrap();
        let records: Vec<_> = reader.collect();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].chunk_id.as_deref(), Some("c1"));
        assert_eq!(records[2].chunk_id.as_deref(), Some("c2"));
        assert_eq!(records[2].index(), 1500.0);
    }

    #[test]
    fn test_reader_unions_channel_sets() {
        let chunks = vec![
            chunk(
                "c1",
                "DEPTH,GR",
                "m,gAPI",
                "-999.25,-999.25",
                json!([[100.0, 10.0]]),
            ),
            chunk(
                "c2",
                "DEPTH,ROP",
                "m,m/h",
                "-999.25,-999.25",
                json!([[1500.0, 20.0]]),
            ),
        ];

        let reader = ChunkReader::new(&chunks).unwrap();
        assert_eq!(reader.layout().mnemonics, vec!["DEPTH", "GR", "ROP"]);

        let records: Vec<_> = reader.collect();
        // GR-only row gets the ROP null sentinel, and vice versa
        assert_eq!(records[0].values, vec![json!(100.0), json!(10.0), json!(-999.25)]);
        assert_eq!(records[1].values, vec![json!(1500.0), json!(-999.25), json!(20.0)]);
    }

    #[test]
    fn test_reader_empty_chunks() {
        let reader = ChunkReader::new(&[]).unwrap();
        assert!(reader.is_empty());
        assert_eq!(reader.count(), 0);
    }

    #[test]
    fn test_corrupt_data_is_read_error() {
        let mut bad = chunk("c1", "DEPTH", "m", "-999.25", json!([[100.0]]));
        bad.data = "not json".to_string();
        assert!(matches!(
            ChunkReader::new(&[bad]),
            Err(ChannelError::Read(_))
        ));
    }
}
