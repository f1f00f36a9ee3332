//! SQL text generation for the `_xpack/sql` endpoint.
//!
//! Filter keys prefixed with `s_` are string-typed and their values are
//! quoted; every other key is compared against a bare literal. Values are
//! interpolated verbatim, see [`render_condition`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix marking a string-typed filter key.
pub const STRING_KEY_PREFIX: &str = "s_";

/// Field that date bounds and ordering apply to.
pub const TIMESTAMP_FIELD: &str = "ts_created";

/// Page size hint sent with every query.
pub const FETCH_SIZE: u32 = 10_000;

/// A filter literal.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Text(s) => f.write_str(s),
            FilterValue::Integer(n) => write!(f, "{}", n),
            FilterValue::Float(x) => write!(f, "{}", x),
            FilterValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Integer(value.into())
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        FilterValue::Integer(value.into())
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Float(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

/// Equality filters, kept in insertion order.
///
/// Setting a key that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    entries: Vec<(String, FilterValue)>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Filters
where
    K: Into<String>,
    V: Into<FilterValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Filters::new();
        for (k, v) in iter {
            filters.insert(k, v);
        }
        filters
    }
}

/// Render one equality condition.
///
/// `s_` keys produce `key = 'value'`, all others `key=value`. The value is
/// not escaped: callers must not pass untrusted input here.
// TODO: send values through the SQL endpoint's `params` array instead of
// interpolating them once callers no longer rely on raw fragments.
pub fn render_condition(key: &str, value: &FilterValue) -> String {
    if key.starts_with(STRING_KEY_PREFIX) {
        format!("{} = '{}'", key, value)
    } else {
        format!("{}={}", key, value)
    }
}

/// Body of the WHERE clause: filters first, then the inclusive date bounds,
/// joined with `AND`. Empty when there is nothing to filter on.
pub fn where_clause(filters: &Filters, start_date: Option<&str>, end_date: Option<&str>) -> String {
    let mut conditions: Vec<String> = filters
        .iter()
        .map(|(key, value)| render_condition(key, value))
        .collect();

    if let Some(start) = start_date {
        conditions.push(format!("{} >= '{}'", TIMESTAMP_FIELD, start));
    }
    if let Some(end) = end_date {
        conditions.push(format!("{} <= '{}'", TIMESTAMP_FIELD, end));
    }

    conditions.join(" AND ")
}

/// Full query text, newest rows first. A `limit` of 0 leaves the result
/// unbounded.
pub fn build_query<S: AsRef<str>>(index: &str, fields: &[S], where_body: &str, limit: u64) -> String {
    let fields = fields.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ");
    let mut query = format!(
        "SELECT {} FROM \"{}\" WHERE ({}) ORDER BY CAST({} AS DATE) DESC",
        fields, index, where_body, TIMESTAMP_FIELD
    );
    if limit > 0 {
        query.push_str(&format!(" LIMIT {}", limit));
    }
    query
}

/// Request body for `POST /_xpack/sql`.
#[derive(Debug, Serialize)]
pub struct SqlRequest<'a> {
    pub query: &'a str,
    pub fetch_size: u32,
}

impl<'a> SqlRequest<'a> {
    pub fn new(query: &'a str) -> Self {
        Self {
            query,
            fetch_size: FETCH_SIZE,
        }
    }
}

/// Rows in the order the fields were requested.
pub type Rows = Vec<Vec<serde_json::Value>>;

/// Response of `POST /_xpack/sql?format=json`.
///
/// Only `rows` is used; `columns` and `cursor` are accepted so the response
/// deserializes whether or not the engine sends them.
#[derive(Debug, Deserialize)]
pub struct SqlResponse {
    pub rows: Rows,
    #[serde(default)]
    pub columns: Vec<SqlColumn>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SqlColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}
