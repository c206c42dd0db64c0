//! Request and response types for the API layer

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::error::{ApiError, ApiResult};
use crate::channel::{ChannelDataReader, ChannelLayout};
use crate::logs::{Log, LogQuery, ReturnElements};

/// Common listing parameters: an optional filter expression
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub filter: Option<String>,
}

/// Query-string form of a log data request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogDataParams {
    pub uri: String,
    #[serde(default)]
    pub start_index: Option<f64>,
    #[serde(default)]
    pub end_index: Option<f64>,
    #[serde(default)]
    pub start_date_time_index: Option<String>,
    #[serde(default)]
    pub end_date_time_index: Option<String>,
    /// Comma-joined mnemonic subset
    #[serde(default)]
    pub mnemonic_list: Option<String>,
    #[serde(default)]
    pub return_elements: Option<ReturnElements>,
    #[serde(default)]
    pub request_latest_values: Option<usize>,
}

impl From<LogDataParams> for LogQuery {
    fn from(params: LogDataParams) -> Self {
        LogQuery {
            uri: params.uri,
            start_index: params.start_index,
            end_index: params.end_index,
            start_date_time_index: params.start_date_time_index,
            end_date_time_index: params.end_date_time_index,
            mnemonics: params.mnemonic_list.map(|list| {
                list.split(',')
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .collect()
            }),
            return_elements: params.return_elements.unwrap_or_default(),
            request_latest_values: params.request_latest_values,
        }
    }
}

/// Body of a data append/update request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogDataRequest {
    pub uri: String,
    /// Comma-joined, primary index mnemonic first
    pub mnemonic_list: String,
    #[serde(default)]
    pub unit_list: Option<String>,
    #[serde(default)]
    pub null_value_list: Option<String>,
    /// Comma-joined rows, index value first
    pub data: Vec<String>,
}

impl LogDataRequest {
    /// Build a validated reader against the stored log's shape
    pub fn into_reader(self, log: &Log) -> ApiResult<ChannelDataReader> {
        let mnemonics: Vec<String> = self
            .mnemonic_list
            .split(',')
            .map(|m| m.trim().to_string())
            .collect();

        let units = match self.unit_list {
            Some(list) => list.split(',').map(|u| u.trim().to_string()).collect(),
            None => mnemonics
                .iter()
                .map(|m| log.curve(m).map(|c| c.unit.clone()).unwrap_or_default())
                .collect(),
        };
        let null_values = match self.null_value_list {
            Some(list) => list.split(',').map(|n| n.trim().to_string()).collect(),
            None => mnemonics
                .iter()
                .map(|m| {
                    log.curve(m)
                        .map(|c| log.null_value_for(c))
                        .or_else(|| log.null_value.clone())
                        .unwrap_or_default()
                })
                .collect(),
        };

        let layout = ChannelLayout::new(mnemonics, units, null_values)
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        let rows: Vec<Vec<Value>> = self
            .data
            .iter()
            .map(|line| line.split(',').map(parse_field).collect())
            .collect();

        let indices = vec![log.primary_index(0)];
        ChannelDataReader::new(log.uri.clone(), indices, layout, rows)
            .map_err(|e| ApiError::Validation(e.to_string()))
    }
}

/// Parse one data field: empty is null, numbers stay numeric
fn parse_field(field: &str) -> Value {
    let field = field.trim();
    if field.is_empty() {
        return Value::Null;
    }
    match field.parse::<f64>() {
        Ok(n) => Value::from(n),
        Err(_) => Value::String(field.to_string()),
    }
}

/// Response for list endpoints
#[derive(Debug, Serialize)]
pub struct LogListResponse {
    pub total: usize,
    pub logs: Vec<Log>,
}

/// Response for delete endpoints
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::header::tests::depth_log;
    use serde_json::json;

    #[test]
    fn test_params_into_query_splits_mnemonics() {
        let params = LogDataParams {
            uri: "uri:l1".to_string(),
            mnemonic_list: Some("GR, ROP".to_string()),
            ..Default::default()
        };
        let query: LogQuery = params.into();
        assert_eq!(
            query.mnemonics,
            Some(vec!["GR".to_string(), "ROP".to_string()])
        );
    }

    #[test]
    fn test_request_into_reader_parses_rows() {
        let log = depth_log();
        let request = LogDataRequest {
            uri: log.uri.clone(),
            mnemonic_list: "DEPTH,GR,ROP".to_string(),
            unit_list: None,
            null_value_list: None,
            data: vec!["100,10,20".to_string(), "200,,21".to_string()],
        };

        let reader = request.into_reader(&log).unwrap();
        assert_eq!(reader.len(), 2);
        assert_eq!(reader.layout().units, vec!["m", "gAPI", "m/h"]);
        assert_eq!(reader.layout().null_values, vec!["-999.25"; 3]);
        assert_eq!(reader.rows()[1], vec![json!(200.0), Value::Null, json!(21.0)]);
    }

    #[test]
    fn test_request_arity_mismatch_rejected() {
        let log = depth_log();
        let request = LogDataRequest {
            uri: log.uri.clone(),
            mnemonic_list: "DEPTH,GR".to_string(),
            unit_list: None,
            null_value_list: None,
            data: vec!["100,10,20".to_string()],
        };
        assert!(matches!(
            request.into_reader(&log),
            Err(ApiError::Validation(_))
        ));
    }
}
