use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Scalar filter value supplied by a screen's selectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Integer(i64),
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl FilterValue {
    /// Best-effort typing of a raw `key=value` argument. Numbers are typed
    /// only when they print back to the same text, so codes like `007` or
    /// `1e3` reach the server as written.
    pub fn parse(raw: &str) -> Self {
        if let Ok(i) = raw.parse::<i64>() {
            if i.to_string() == raw {
                return FilterValue::Integer(i);
            }
        }
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() && f.to_string() == raw {
                return FilterValue::Number(f);
            }
        }
        if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return FilterValue::Date(d);
        }
        FilterValue::Text(raw.to_string())
    }

    /// An unselected dropdown hands over an empty string
    pub fn is_blank(&self) -> bool {
        matches!(self, FilterValue::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Integer(i) => write!(f, "{}", i),
            FilterValue::Number(n) => write!(f, "{}", n),
            FilterValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FilterValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Integer(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        FilterValue::Integer(i64::from(v))
    }
}

impl From<u32> for FilterValue {
    fn from(v: u32) -> Self {
        FilterValue::Integer(i64::from(v))
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(v: NaiveDate) -> Self {
        FilterValue::Date(v)
    }
}

/// Filters merged into every list request, ordered by key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(BTreeMap<String, FilterValue>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Entries that should reach the server: blank values are skipped
    pub fn active(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.0
            .iter()
            .filter(|(_, v)| !v.is_blank())
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Parse `key=value` arguments
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = FilterSet::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("expected key=value, got '{}'", pair))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(format!("empty filter key in '{}'", pair));
            }
            set.insert(key, FilterValue::parse(value.trim()));
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_picks_the_narrowest_type() {
        assert_eq!(FilterValue::parse("9"), FilterValue::Integer(9));
        assert_eq!(FilterValue::parse("2.5"), FilterValue::Number(2.5));
        assert_eq!(
            FilterValue::parse("2024-06-01"),
            FilterValue::Date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
        );
        assert_eq!(FilterValue::parse("TEACHER"), FilterValue::Text("TEACHER".into()));
    }

    #[test]
    fn parse_keeps_numbers_that_would_change_shape() {
        assert_eq!(FilterValue::parse("007"), FilterValue::Text("007".into()));
        assert_eq!(FilterValue::parse("1e3"), FilterValue::Text("1e3".into()));
        assert_eq!(FilterValue::parse("+4"), FilterValue::Text("+4".into()));
        assert_eq!(FilterValue::parse("-12"), FilterValue::Integer(-12));

        let filters = FilterSet::from_pairs(["rollno=007"]).unwrap();
        assert_eq!(serde_json::to_value(&filters).unwrap(), serde_json::json!({"rollno": "007"}));
    }

    #[test]
    fn blank_values_are_not_active() {
        let filters = FilterSet::new().with("classId", 3).with("divisionId", "");
        let active: Vec<_> = filters.active().map(|(k, _)| k).collect();
        assert_eq!(active, vec!["classId"]);
    }

    #[test]
    fn pairs_parse_and_reject_garbage() {
        let filters = FilterSet::from_pairs(["classId=3", "divisionId = 9"]).unwrap();
        assert_eq!(filters.get("divisionId"), Some(&FilterValue::Integer(9)));
        assert!(FilterSet::from_pairs(["classId"]).is_err());
        assert!(FilterSet::from_pairs(["=3"]).is_err());
    }

    #[test]
    fn dates_serialize_as_iso_strings() {
        let filters = FilterSet::new().with("from", NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(serde_json::to_value(&filters).unwrap(), serde_json::json!({"from": "2024-01-31"}));
    }
}
