//! Log adapter over the channel engine
//!
//! Maps log objects onto channel-engine operations: data queries reassemble
//! records from stored chunks, slice them by mnemonic and format rows for
//! echo; data updates merge the incoming reader with overlapping chunks,
//! rechunk, bulk-write, and push widened index ranges back into the header.
//! Every write batch runs under a store transaction with attach-then-save
//! discipline; a failed batch is rolled back.

use std::collections::HashMap;
use std::sync::Arc;

use crate::channel::{
    ChannelDataMerger, ChannelDataReader, ChannelError, ChannelResult, ChunkReader, ChunkStore,
    DataChunker, IndexRange,
};
use crate::config::ChannelSettings;
use crate::logs::header::Log;
use crate::logs::query::{build_log_data, project, LogQuery, RequestContext, ReturnElements};
use crate::logs::shape::LogShape;
use crate::store::{DocumentStore, Filter, StoreError, Transaction, TransactionAction, LOG};

/// The channel-data surface of logs
pub struct LogAdapter {
    store: Arc<dyn DocumentStore>,
    chunks: ChunkStore,
    settings: ChannelSettings,
}

impl LogAdapter {
    pub fn new(store: Arc<dyn DocumentStore>, settings: ChannelSettings) -> Self {
        let chunks = ChunkStore::new(Arc::clone(&store));
        Self {
            store,
            chunks,
            settings,
        }
    }

    fn range_size(&self, is_time_index: bool) -> f64 {
        if is_time_index {
            self.settings.time_chunk_size
        } else {
            self.settings.depth_chunk_size
        }
    }

    /// Load a log header by URI; a missing log is an empty result
    pub async fn get_log(&self, uri: &str) -> ChannelResult<Option<Log>> {
        let docs = self
            .store
            .fetch(LOG, &Filter::eq_ci("uri", uri), None)
            .await
            .map_err(ChannelError::Read)?;
        docs.into_iter()
            .next()
            .map(|doc| {
                serde_json::from_value(doc)
                    .map_err(|e| ChannelError::Read(StoreError::Serialization(e.to_string())))
            })
            .transpose()
    }

    /// Administrative listing with a generic store filter
    pub async fn list_logs(&self, filter: &Filter) -> ChannelResult<Vec<Log>> {
        let docs = self
            .store
            .fetch(LOG, filter, None)
            .await
            .map_err(ChannelError::Read)?;
        docs.into_iter()
            .map(|doc| {
                serde_json::from_value(doc)
                    .map_err(|e| ChannelError::Read(StoreError::Serialization(e.to_string())))
            })
            .collect()
    }

    /// Register a new log header
    pub async fn add_log(&self, log: &Log) -> ChannelResult<()> {
        let doc = serde_json::to_value(log)
            .map_err(|e| ChannelError::Write(StoreError::Serialization(e.to_string())))?;
        self.store
            .insert(LOG, doc)
            .await
            .map_err(ChannelError::Write)?;
        tracing::info!(uri = %log.uri, "Added log");
        Ok(())
    }

    /// Produce headers with optionally embedded data
    pub async fn query_headers_and_data(
        &self,
        query: &LogQuery,
        context: &RequestContext,
    ) -> ChannelResult<Vec<Log>> {
        let Some(log) = self.get_log(&query.uri).await? else {
            return Ok(Vec::new());
        };

        match query.return_elements {
            ReturnElements::IdOnly | ReturnElements::HeaderOnly => {
                Ok(vec![project(&log, query.return_elements)])
            }
            _ => {
                let assembled = self.assemble_data(&log, query, context).await?;
                Ok(vec![assembled])
            }
        }
    }

    /// Alternate retrieval: walk the log in reversed direction and stop once
    /// every channel has accumulated `n` values
    pub async fn request_latest_values(
        &self,
        query: &LogQuery,
        n: usize,
        context: &RequestContext,
    ) -> ChannelResult<Option<Log>> {
        let Some(log) = self.get_log(&query.uri).await? else {
            return Ok(None);
        };

        let increasing = log.is_increasing();
        let chunks = self
            .chunks
            .fetch(&log.uri, &log.index_curve, &IndexRange::unbounded(), increasing)
            .await?;
        let reader = ChunkReader::new(&chunks)?;
        let layout = reader.layout().clone();
        let records: Vec<_> = reader.collect();

        let arity = layout.arity();
        let mut counts = vec![0usize; arity];
        let mut rows = Vec::new();
        let mut points = 0usize;
        let mut truncated = false;

        for record in records.into_iter().rev() {
            if arity > 1 && (1..arity).all(|col| counts[col] >= n) {
                break;
            }
            if rows.len() >= context.max_data_nodes
                || points + record.values.len() > context.max_data_points
            {
                truncated = true;
                break;
            }
            let contributes = (1..arity)
                .any(|col| counts[col] < n && !layout.is_null(col, &record.values[col]));
            if !contributes {
                continue;
            }
            for col in 1..arity {
                if !layout.is_null(col, &record.values[col]) {
                    counts[col] += 1;
                }
            }
            points += record.values.len();
            rows.push(record.values);
        }

        let assembled = self.finish_log(&log, query, layout, rows, truncated)?;
        Ok(Some(assembled))
    }

    /// Fetch, reassemble, slice and format data for one query
    async fn assemble_data(
        &self,
        log: &Log,
        query: &LogQuery,
        context: &RequestContext,
    ) -> ChannelResult<Log> {
        if let Some(n) = query.request_latest_values {
            let assembled = self.request_latest_values(query, n, context).await?;
            return assembled.ok_or_else(|| ChannelError::NotFound(query.uri.clone()));
        }

        let increasing = log.is_increasing();
        let range = query.range(log.is_time_index())?;
        let chunks = self
            .chunks
            .fetch(&log.uri, &log.index_curve, &range, increasing)
            .await?;
        let reader = ChunkReader::new(&chunks)?;
        let layout = reader.layout().clone();

        let mut rows = Vec::new();
        let mut points = 0usize;
        let mut truncated = false;
        for record in reader {
            if !range.contains(record.index(), increasing, true) {
                continue;
            }
            if rows.len() >= context.max_data_nodes
                || points + record.values.len() > context.max_data_points
            {
                truncated = true;
                break;
            }
            points += record.values.len();
            rows.push(record.values);
        }

        self.finish_log(log, query, layout, rows, truncated)
    }

    /// Slice, format and attach data to a projected header echo
    fn finish_log(
        &self,
        log: &Log,
        query: &LogQuery,
        layout: crate::channel::ChannelLayout,
        rows: Vec<Vec<serde_json::Value>>,
        truncated: bool,
    ) -> ChannelResult<Log> {
        let offset = log.header_offset();
        let indices = vec![log.primary_index(offset)];
        let reader = ChannelDataReader::new(log.uri.clone(), indices, layout, rows)?;
        let sliced = match &query.mnemonics {
            Some(mnemonics) => reader.slice(mnemonics),
            None => reader,
        };

        let mut header = project(log, query.return_elements);
        if let Some(mnemonics) = &query.mnemonics {
            header
                .log_curve_info
                .retain(|c| c.mnemonic == log.index_curve || mnemonics.contains(&c.mnemonic));
        }

        // Echo the ranges actually observed in this slice, not the stored ones
        let mut observed = HashMap::new();
        for (col, range) in sliced.channel_ranges().iter().enumerate() {
            if let Some(range) = range {
                observed.insert(sliced.layout().mnemonics[col].clone(), *range);
            }
        }
        for curve in &mut header.log_curve_info {
            curve.min_index = None;
            curve.max_index = None;
            curve.min_date_time_index = None;
            curve.max_date_time_index = None;
            curve.min_date_time_index_specified = false;
            curve.max_date_time_index_specified = false;
        }
        header.update_header_ranges(&observed, offset);

        header.log_data = Some(build_log_data(
            &sliced,
            log.is_time_index(),
            offset,
            self.settings.stream_index_value_pairs,
            truncated,
        ));
        Ok(header)
    }

    /// Apply one or more incoming readers to a log's channel data
    pub async fn update_data(
        &self,
        uri: &str,
        readers: Vec<ChannelDataReader>,
    ) -> ChannelResult<()> {
        let Some(mut log) = self.get_log(uri).await? else {
            return Err(ChannelError::NotFound(uri.to_string()));
        };

        let mut txn = Transaction::new(Arc::clone(&self.store));
        match self.apply_update(&mut log, uri, readers, &mut txn).await {
            Ok(()) => txn.commit().await.map_err(ChannelError::Write),
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!(uri = uri, error = %rollback_err, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn apply_update(
        &self,
        log: &mut Log,
        uri: &str,
        readers: Vec<ChannelDataReader>,
        txn: &mut Transaction,
    ) -> ChannelResult<()> {
        let increasing = log.is_increasing();
        let is_time = log.is_time_index();
        let range_size = self.range_size(is_time);
        let chunker = DataChunker::new(range_size, increasing);

        let mut affected: HashMap<String, IndexRange> = HashMap::new();
        let mut offset = log.header_offset();
        let mut offset_locked = log.start_date_time_index.is_some();
        let mut wrote = false;

        for reader in readers {
            if reader.is_empty() {
                continue;
            }
            if reader.is_increasing() != increasing || reader.is_time_index() != is_time {
                return Err(ChannelError::InvalidRange(
                    "Reader direction does not match the stored log".to_string(),
                ));
            }
            if reader.layout().mnemonics[0] != log.index_curve {
                return Err(ChannelError::InvalidRange(format!(
                    "Reader index {} does not match log index curve {}",
                    reader.layout().mnemonics[0],
                    log.index_curve
                )));
            }

            if is_time && !offset_locked {
                offset = reader.primary_index().offset_seconds;
                offset_locked = true;
            }

            // Per-channel spans observed in this reader, for header widening
            for (col, range) in reader.channel_ranges().iter().enumerate() {
                if let Some(range) = range {
                    let mnemonic = reader.layout().mnemonics[col].clone();
                    let entry = affected.entry(mnemonic).or_insert(*range);
                    if let (Some(start), Some(end)) = (range.start, range.end) {
                        entry.widen(start, increasing);
                        entry.widen(end, increasing);
                    }
                }
            }

            let update_range = reader.index_range();
            let existing_range = update_range.extent_expanded(range_size, increasing);
            let stored = self
                .chunks
                .fetch(uri, &log.index_curve, &existing_range, increasing)
                .await?;

            let indices = vec![log.primary_index(reader.primary_index().offset_seconds)];

            let (layout, new_chunks) = if stored.is_empty() {
                let layout = reader.layout().clone();
                let chunks = chunker.chunk(reader.into_records(), &indices)?;
                (layout, chunks)
            } else {
                let existing = ChunkReader::new(&stored)?;
                let existing_layout = existing.layout().clone();
                let incoming_layout = reader.layout().clone();
                let incoming_ranges = reader.channel_ranges();
                let merger = ChannelDataMerger::new(
                    &existing_layout,
                    existing,
                    &incoming_layout,
                    incoming_ranges,
                    reader.into_records(),
                    update_range,
                    increasing,
                )?;
                let layout = merger.layout().clone();
                let chunks = chunker.chunk(merger, &indices)?;
                (layout, chunks)
            };

            if new_chunks.is_empty() {
                continue;
            }
            self.chunks
                .bulk_write(uri, new_chunks, &layout, Some(&mut *txn))
                .await?;
            wrote = true;
        }

        // Header ranges move only when chunk data actually landed
        if wrote {
            let snapshot = serde_json::to_value(&*log)
                .map_err(|e| ChannelError::Update(StoreError::Serialization(e.to_string())))?;
            log.update_header_ranges(&affected, offset);

            txn.attach(TransactionAction::Update, LOG, uri, &log.uid, Some(snapshot));
            let doc = serde_json::to_value(&*log)
                .map_err(|e| ChannelError::Update(StoreError::Serialization(e.to_string())))?;
            self.store
                .update(LOG, &Filter::eq_ci("uri", uri), doc)
                .await
                .map_err(ChannelError::Update)?;
            txn.save().await.map_err(ChannelError::Update)?;

            tracing::info!(uri = uri, curves = affected.len(), "Applied data update");
        }
        Ok(())
    }

    /// Cascade-delete a log's chunks and header
    pub async fn delete_data(&self, uri: &str) -> ChannelResult<usize> {
        let Some(log) = self.get_log(uri).await? else {
            return Err(ChannelError::NotFound(uri.to_string()));
        };

        let mut txn = Transaction::new(Arc::clone(&self.store));
        match self.apply_delete(&log, uri, &mut txn).await {
            Ok(removed) => {
                txn.commit().await.map_err(ChannelError::Delete)?;
                tracing::info!(uri = uri, chunks = removed, "Deleted log");
                Ok(removed)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!(uri = uri, error = %rollback_err, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn apply_delete(
        &self,
        log: &Log,
        uri: &str,
        txn: &mut Transaction,
    ) -> ChannelResult<usize> {
        let removed = self.chunks.delete_by_uri(uri, Some(&mut *txn)).await?;

        let snapshot = serde_json::to_value(log)
            .map_err(|e| ChannelError::Delete(StoreError::Serialization(e.to_string())))?;
        txn.attach(TransactionAction::Delete, LOG, uri, &log.uid, Some(snapshot));
        self.store
            .delete(LOG, &Filter::eq_ci("uri", uri))
            .await
            .map_err(ChannelError::Delete)?;
        txn.save().await.map_err(ChannelError::Delete)?;
        Ok(removed)
    }
}
