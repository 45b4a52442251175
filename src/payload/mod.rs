use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum Status {
    #[default]
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "ERROR")]
    Error,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Timing {
    #[serde(default)]
    pub total: Value,
    #[serde(default, rename = "computeResult")]
    pub compute_result: Value,
}

impl Timing {
    pub fn total_ms(&self) -> Option<f64> {
        utils::parse_duration_ms(&self.total)
    }

    pub fn compute_ms(&self) -> Option<f64> {
        utils::parse_duration_ms(&self.compute_result)
    }

    /// Time spent outside result computation (serialization, transfer).
    /// Never negative.
    pub fn overhead_ms(&self) -> Option<f64> {
        let total = self.total_ms()?;
        let compute = self.compute_ms()?;
        Some((total - compute).max(0.0))
    }
}

/// Position of a parse error inside the submitted query. Indices are
/// character offsets, `stop_index` is inclusive.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMetadata {
    #[serde(default)]
    pub start_index: usize,
    #[serde(default)]
    pub stop_index: usize,
    #[serde(default)]
    pub line: usize,
    #[serde(default)]
    pub position_in_line: usize,
}

/// The JSON answer of the query service.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ResultPayload {
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub selected: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_rows")]
    pub res: Vec<Vec<Option<String>>>,
    #[serde(default)]
    pub resultsize: u64,
    #[serde(default)]
    pub time: Timing,
    #[serde(default)]
    pub exception: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ErrorMetadata>,
}

impl ResultPayload {
    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }

    pub fn rows_sent(&self) -> u64 {
        self.res.len() as u64
    }

    /// True when the row cap `cap` is what kept rows back. `resultsize` counts
    /// rows before any LIMIT in the query, so a short answer alone says
    /// nothing; without a positive cap nothing was held back by the client.
    pub fn truncated_by(&self, cap: Option<u64>) -> bool {
        match cap {
            Some(cap) => cap > 0 && cap <= self.rows_sent() && cap < self.resultsize,
            None => false,
        }
    }

    /// Number of columns: the header width, or the widest row when the
    /// service did not report the selected variables.
    pub fn column_count(&self) -> usize {
        let widest = self.res.iter().map(|r| r.len()).max().unwrap_or(0);
        widest.max(self.selected.len())
    }

    /// Cell text with missing and null cells read as the empty string.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.res
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
            .unwrap_or("")
    }
}

// Cells are normally strings or null; anything else is kept in its JSON form.
fn deserialize_rows<'de, D>(deserializer: D) -> Result<Vec<Vec<Option<String>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Option<Vec<Value>>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|row| {
            row.unwrap_or_default()
                .iter()
                .map(utils::scalar_text)
                .collect()
        })
        .collect())
}

/// The answer of `cmd=stats`: named counters.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct StatsPayload(pub Map<String, Value>);

impl StatsPayload {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(utils::scalar_text)
    }

    /// Counter value with thousands separators, empty when absent.
    pub fn display(&self, key: &str) -> String {
        self.get(key).map(utils::display_counter).unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}
