//! The `LogShape` capability surface
//!
//! The channel engine never looks inside a log header directly; everything
//! it needs — index kind, direction, channel metadata, and a way to push
//! observed index ranges back — comes through this trait. Version-specific
//! header layouts implement it once and the engine stays unaware of them.

use std::collections::HashMap;

use crate::channel::{iso_from_micros, micros_from_iso, ChannelLayout, IndexRange};
use crate::logs::header::Log;

/// What the engine may ask of a log
pub trait LogShape {
    fn is_time_index(&self) -> bool;
    fn is_increasing(&self) -> bool;
    fn primary_mnemonic(&self) -> &str;
    /// Mnemonics, units and null sentinels, primary index first
    fn channel_layout(&self) -> ChannelLayout;
    /// Widen per-curve and log-level index ranges to cover `ranges`
    ///
    /// Date-time fields are formatted ISO-8601 with `offset_seconds`.
    fn update_header_ranges(&mut self, ranges: &HashMap<String, IndexRange>, offset_seconds: i32);
}

impl LogShape for Log {
    fn is_time_index(&self) -> bool {
        Log::is_time_index(self)
    }

    fn is_increasing(&self) -> bool {
        Log::is_increasing(self)
    }

    fn primary_mnemonic(&self) -> &str {
        &self.index_curve
    }

    fn channel_layout(&self) -> ChannelLayout {
        self.layout()
    }

    fn update_header_ranges(&mut self, ranges: &HashMap<String, IndexRange>, offset_seconds: i32) {
        let time_index = self.is_time_index();

        for (mnemonic, range) in ranges {
            let (min, max) = range.min_max();
            let (Some(min), Some(max)) = (min, max) else {
                continue;
            };
            let Some(curve) = self.curve_mut(mnemonic) else {
                continue;
            };

            if time_index {
                let widened_min = match curve
                    .min_date_time_index
                    .as_deref()
                    .and_then(|v| micros_from_iso(v).ok())
                {
                    Some((current, _)) => current.min(min),
                    None => min,
                };
                let widened_max = match curve
                    .max_date_time_index
                    .as_deref()
                    .and_then(|v| micros_from_iso(v).ok())
                {
                    Some((current, _)) => current.max(max),
                    None => max,
                };
                curve.min_date_time_index = Some(iso_from_micros(widened_min, offset_seconds));
                curve.max_date_time_index = Some(iso_from_micros(widened_max, offset_seconds));
                curve.min_date_time_index_specified = true;
                curve.max_date_time_index_specified = true;
            } else {
                curve.min_index = Some(curve.min_index.map_or(min, |v| v.min(min)));
                curve.max_index = Some(curve.max_index.map_or(max, |v| v.max(max)));
            }
        }

        // Log-level start/end track the primary curve, in log order
        let primary = self.index_curve.clone();
        let increasing = self.is_increasing();
        if let Some(curve) = self.curve(&primary) {
            if time_index {
                let (min, max) = (
                    curve.min_date_time_index.clone(),
                    curve.max_date_time_index.clone(),
                );
                if increasing {
                    self.start_date_time_index = min;
                    self.end_date_time_index = max;
                } else {
                    self.start_date_time_index = max;
                    self.end_date_time_index = min;
                }
            } else {
                let (min, max) = (curve.min_index, curve.max_index);
                if increasing {
                    self.start_index = min;
                    self.end_index = max;
                } else {
                    self.start_index = max;
                    self.end_index = min;
                }
            }
        }
    }
}
