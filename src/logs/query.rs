//! Query types and row formatting for the log surface

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::channel::{iso_from_micros, micros_from_iso, ChannelDataReader, ChannelResult, IndexRange};
use crate::logs::header::{Log, LogData};

/// Which parts of a log a query wants back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReturnElements {
    #[default]
    All,
    IdOnly,
    HeaderOnly,
    DataOnly,
    Requested,
}

/// Per-request limits on data assembly
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    /// Maximum rows returned per log
    pub max_data_nodes: usize,
    /// Maximum individual values returned per log
    pub max_data_points: usize,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            max_data_nodes: 10_000,
            max_data_points: 100_000,
        }
    }
}

/// A data query against one log
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    pub uri: String,
    #[serde(default)]
    pub start_index: Option<f64>,
    #[serde(default)]
    pub end_index: Option<f64>,
    #[serde(default)]
    pub start_date_time_index: Option<String>,
    #[serde(default)]
    pub end_date_time_index: Option<String>,
    /// Mnemonic subset to return; the primary index always survives
    #[serde(default)]
    pub mnemonics: Option<Vec<String>>,
    #[serde(default)]
    pub return_elements: ReturnElements,
    /// Alternate retrieval: the last n values per channel
    #[serde(default)]
    pub request_latest_values: Option<usize>,
}

impl LogQuery {
    pub fn for_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    /// The requested index range in the numeric domain of the log
    pub fn range(&self, is_time_index: bool) -> ChannelResult<IndexRange> {
        if is_time_index {
            let parse = |value: &Option<String>| -> ChannelResult<Option<f64>> {
                value
                    .as_deref()
                    .map(|v| micros_from_iso(v).map(|(micros, _)| micros))
                    .transpose()
            };
            Ok(IndexRange::new(
                parse(&self.start_date_time_index)?,
                parse(&self.end_date_time_index)?,
            ))
        } else {
            Ok(IndexRange::new(self.start_index, self.end_index))
        }
    }
}

/// Strip a header down to what the return-elements mode allows
///
/// Id-only keeps the identity and parent fields: the uid, the well and
/// wellbore uids, and the log's URI (the stable identifier the rest of the
/// surface addresses it by). Data-only keeps the uid and the parent uids
/// alone; the data block is attached by the caller.
pub fn project(log: &Log, elements: ReturnElements) -> Log {
    match elements {
        ReturnElements::All | ReturnElements::Requested => log.clone(),
        ReturnElements::HeaderOnly => {
            let mut header = log.clone();
            header.log_data = None;
            header
        }
        ReturnElements::IdOnly => Log {
            uid: log.uid.clone(),
            uid_well: log.uid_well.clone(),
            uid_wellbore: log.uid_wellbore.clone(),
            name: String::new(),
            uri: log.uri.clone(),
            index_type: None,
            direction: None,
            index_curve: String::new(),
            null_value: None,
            start_index: None,
            end_index: None,
            start_date_time_index: None,
            end_date_time_index: None,
            log_curve_info: Vec::new(),
            log_data: None,
        },
        ReturnElements::DataOnly => Log {
            uid: log.uid.clone(),
            uid_well: log.uid_well.clone(),
            uid_wellbore: log.uid_wellbore.clone(),
            name: String::new(),
            uri: String::new(),
            index_type: None,
            direction: None,
            index_curve: String::new(),
            null_value: None,
            start_index: None,
            end_index: None,
            start_date_time_index: None,
            end_date_time_index: None,
            log_curve_info: Vec::new(),
            log_data: None,
        },
    }
}

/// Render one channel value for a data row
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => match other.as_f64() {
            Some(n) => n.to_string(),
            None => other.to_string(),
        },
    }
}

/// Assemble the embedded data block from a sliced reader
///
/// Rows always lead with the primary index value; `stream_index_value_pairs`
/// controls whether the index column also appears in the metadata lists.
pub fn build_log_data(
    reader: &ChannelDataReader,
    is_time_index: bool,
    offset_seconds: i32,
    stream_index_value_pairs: bool,
    truncated: bool,
) -> LogData {
    let layout = reader.layout();
    let skip = usize::from(!stream_index_value_pairs);

    let data = reader
        .rows()
        .iter()
        .map(|row| {
            let mut fields = Vec::with_capacity(row.len());
            let index = row[0].as_f64().unwrap_or(f64::NAN);
            if is_time_index {
                fields.push(iso_from_micros(index, offset_seconds));
            } else {
                fields.push(index.to_string());
            }
            for (col, value) in row.iter().enumerate().skip(1) {
                if layout.is_null(col, value) {
                    fields.push(String::new());
                } else {
                    fields.push(format_value(value));
                }
            }
            fields.join(",")
        })
        .collect();

    LogData {
        mnemonic_list: layout.mnemonics.get(skip..).unwrap_or_default().join(","),
        unit_list: layout.units.get(skip..).unwrap_or_default().join(","),
        data,
        truncated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ChannelIndex, ChannelLayout, IndexDirection};
    use crate::logs::header::tests::depth_log;
    use serde_json::json;

    fn reader() -> ChannelDataReader {
        ChannelDataReader::new(
            "uri:l1",
            vec![ChannelIndex::depth("DEPTH", "m", IndexDirection::Increasing)],
            ChannelLayout::from_lists("DEPTH,GR", "m,gAPI", "-999.25,-999.25").unwrap(),
            vec![
                vec![json!(100.0), json!(10.5)],
                vec![json!(200.0), json!(-999.25)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_return_elements_serde() {
        assert_eq!(
            serde_json::from_str::<ReturnElements>("\"id-only\"").unwrap(),
            ReturnElements::IdOnly
        );
        assert_eq!(
            serde_json::to_string(&ReturnElements::DataOnly).unwrap(),
            "\"data-only\""
        );
    }

    #[test]
    fn test_query_range_numeric() {
        let mut query = LogQuery::for_uri("uri:l1");
        query.start_index = Some(100.0);
        let range = query.range(false).unwrap();
        assert_eq!(range, IndexRange::new(Some(100.0), None));
    }

    #[test]
    fn test_query_range_date_time() {
        let mut query = LogQuery::for_uri("uri:l1");
        query.start_date_time_index = Some("1970-01-01T00:00:01Z".to_string());
        let range = query.range(true).unwrap();
        assert_eq!(range.start, Some(1_000_000.0));
    }

    #[test]
    fn test_project_id_only_keeps_identity_and_parents() {
        let mut log = depth_log();
        log.start_index = Some(100.0);
        let projected = project(&log, ReturnElements::IdOnly);

        assert_eq!(projected.uid, "l1");
        assert_eq!(projected.uid_well, "w1");
        assert_eq!(projected.uid_wellbore, "wb1");
        assert_eq!(projected.uri, log.uri);

        // Nothing structural survives
        assert!(projected.name.is_empty());
        assert!(projected.index_type.is_none());
        assert!(projected.direction.is_none());
        assert!(projected.index_curve.is_empty());
        assert!(projected.null_value.is_none());
        assert!(projected.log_curve_info.is_empty());
        assert!(projected.start_index.is_none());
        assert!(projected.log_data.is_none());
    }

    #[test]
    fn test_project_data_only_keeps_ids_alone() {
        let mut log = depth_log();
        log.start_index = Some(100.0);
        let projected = project(&log, ReturnElements::DataOnly);

        assert_eq!(projected.uid, "l1");
        assert_eq!(projected.uid_well, "w1");
        assert_eq!(projected.uid_wellbore, "wb1");

        assert!(projected.uri.is_empty());
        assert!(projected.name.is_empty());
        assert!(projected.index_type.is_none());
        assert!(projected.direction.is_none());
        assert!(projected.index_curve.is_empty());
        assert!(projected.null_value.is_none());
        assert!(projected.log_curve_info.is_empty());
        assert!(projected.start_index.is_none());
    }

    #[test]
    fn test_projected_response_omits_cleared_fields() {
        let projected = project(&depth_log(), ReturnElements::DataOnly);
        let value = serde_json::to_value(&projected).unwrap();
        let body = value.as_object().unwrap();

        assert!(!body.contains_key("name"));
        assert!(!body.contains_key("uri"));
        assert!(!body.contains_key("indexType"));
        assert!(!body.contains_key("direction"));
        assert!(!body.contains_key("indexCurve"));
    }

    #[test]
    fn test_build_log_data_rows_and_nulls() {
        let data = build_log_data(&reader(), false, 0, true, false);

        assert_eq!(data.mnemonic_list, "DEPTH,GR");
        assert_eq!(data.unit_list, "m,gAPI");
        assert_eq!(data.data, vec!["100,10.5", "200,"]);
        assert!(!data.truncated);
    }

    #[test]
    fn test_build_log_data_without_index_pairs() {
        let data = build_log_data(&reader(), false, 0, false, false);
        assert_eq!(data.mnemonic_list, "GR");
        // Rows still lead with the index value
        assert_eq!(data.data[0], "100,10.5");
    }
}
