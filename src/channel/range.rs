//! Range arithmetic for channel indices
//!
//! Every log orders its data along a primary index axis, increasing or
//! decreasing. Ranges over that axis are half-open by default: the end bound
//! is owned by the *next* interval, which is what makes chunk extents tile
//! the axis without overlap. Closed containment is used when deciding whether
//! an index belongs in a query result.
//!
//! Time indices take part in the same arithmetic after conversion to
//! microseconds since the epoch.

use serde::{Deserialize, Serialize};

/// Direction of a log's primary index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexDirection {
    Increasing,
    Decreasing,
}

impl IndexDirection {
    pub fn is_increasing(&self) -> bool {
        matches!(self, IndexDirection::Increasing)
    }
}

impl Default for IndexDirection {
    fn default() -> Self {
        IndexDirection::Increasing
    }
}

/// An optionally bounded interval on the primary index axis
///
/// `start` and `end` are in log order: for a decreasing log the start is the
/// numerically larger bound. A missing bound leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IndexRange {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl IndexRange {
    pub fn new(start: Option<f64>, end: Option<f64>) -> Self {
        Self { start, end }
    }

    /// A range with both bounds present
    pub fn bounded(start: f64, end: f64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// A range with no bounds; contains every index
    pub fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether `value` lies inside this range
    ///
    /// The start bound is always inclusive. `closed` makes the end bound
    /// inclusive too; with `closed == false` a value equal to the end belongs
    /// to the next interval. Missing bounds do not constrain.
    pub fn contains(&self, value: f64, increasing: bool, closed: bool) -> bool {
        let after_start = match self.start {
            Some(start) => {
                if increasing {
                    value >= start
                } else {
                    value <= start
                }
            }
            None => true,
        };
        let before_end = match self.end {
            Some(end) => {
                if increasing {
                    if closed {
                        value <= end
                    } else {
                        value < end
                    }
                } else if closed {
                    value >= end
                } else {
                    value > end
                }
            }
            None => true,
        };
        after_start && before_end
    }

    /// Whether this range begins past `value` in log order
    pub fn starts_after(&self, value: f64, increasing: bool) -> bool {
        match self.start {
            Some(start) => {
                if increasing {
                    start > value
                } else {
                    start < value
                }
            }
            None => false,
        }
    }

    /// Whether this range finishes before `value` in log order
    pub fn ends_before(&self, value: f64, increasing: bool) -> bool {
        match self.end {
            Some(end) => {
                if increasing {
                    end < value
                } else {
                    end > value
                }
            }
            None => false,
        }
    }

    /// The bounds sorted numerically, smallest first
    pub fn min_max(&self) -> (Option<f64>, Option<f64>) {
        match (self.start, self.end) {
            (Some(s), Some(e)) if s > e => (Some(e), Some(s)),
            other => other,
        }
    }

    /// Widen this range to cover `value`, in log order
    pub fn widen(&mut self, value: f64, increasing: bool) {
        self.start = Some(match self.start {
            Some(start) => {
                if increasing {
                    start.min(value)
                } else {
                    start.max(value)
                }
            }
            None => value,
        });
        self.end = Some(match self.end {
            Some(end) => {
                if increasing {
                    end.max(value)
                } else {
                    end.min(value)
                }
            }
            None => value,
        });
    }

    /// Expand both bounds outward to the extents that enclose them
    ///
    /// Used when collecting the stored chunks a data update may touch: every
    /// chunk whose aligned extent overlaps the update range lies inside the
    /// expanded range.
    pub fn extent_expanded(&self, range_size: f64, increasing: bool) -> IndexRange {
        IndexRange {
            start: self
                .start
                .map(|s| aligned_extent(s, range_size, increasing).start.unwrap_or(s)),
            end: self
                .end
                .map(|e| aligned_extent(e, range_size, increasing).end.unwrap_or(e)),
        }
    }
}

/// The aligned extent that encloses `value`
///
/// Extents tile the index axis with step `range_size`, anchored at zero. The
/// tiling mirrors when the direction flips, so the extent always runs from
/// its start toward its open end in log order and a value equal to a tile
/// boundary belongs to the tile that begins there.
pub fn aligned_extent(value: f64, range_size: f64, increasing: bool) -> IndexRange {
    let start = if increasing {
        (value / range_size).floor() * range_size
    } else {
        (value / range_size).ceil() * range_size
    };
    let end = if increasing {
        start + range_size
    } else {
        start - range_size
    };
    IndexRange::bounded(start, end)
}
