//! Generation parameters: flat key/value settings read from the JSON
//! parameter files of each domain.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Date-time format used by `start_date` / `end_date` and by table indices.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Errors raised while reading a parameter value.
#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    #[error("missing parameter \"{0}\"")]
    Missing(String),
    #[error("parameter \"{key}\": expected {expected}, got {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: String,
    },
    #[error("parameter \"{key}\": {message}")]
    Invalid { key: String, message: String },
}

/// Flat mapping of scalar settings for one generation domain.
///
/// Keys are kept sorted so that serialized parameters are stable across
/// runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationParameters {
    values: BTreeMap<String, Value>,
}

impl GenerationParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a flat JSON object. Nested objects and arrays are rejected.
    pub fn from_json_str(raw: &str) -> Result<Self, String> {
        let value: Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        let Value::Object(map) = value else {
            return Err("expected a JSON object at the top level".to_string());
        };
        let mut values = BTreeMap::new();
        for (key, value) in map {
            if value.is_object() || value.is_array() {
                return Err(format!("at `$.{key}`: expected a scalar value"));
            }
            values.insert(key, value);
        }
        Ok(Self { values })
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merges `global` into this domain set. Global values win on key
    /// collision, so merging the same global set twice is a no-op.
    pub fn merge_global(&mut self, global: &GenerationParameters) {
        for (key, value) in &global.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Returns a copy of `self` with `global` merged in.
    pub fn merged_with(&self, global: &GenerationParameters) -> Self {
        let mut merged = self.clone();
        merged.merge_global(global);
        merged
    }

    fn require(&self, key: &str) -> Result<&Value, ParameterError> {
        self.values
            .get(key)
            .ok_or_else(|| ParameterError::Missing(key.to_string()))
    }

    pub fn f64(&self, key: &str) -> Result<f64, ParameterError> {
        let value = self.require(key)?;
        value.as_f64().ok_or_else(|| wrong_type(key, "number", value))
    }

    /// Like [`f64`](Self::f64) but falls back to `default` when absent.
    pub fn f64_or(&self, key: &str, default: f64) -> Result<f64, ParameterError> {
        if self.contains_key(key) {
            self.f64(key)
        } else {
            Ok(default)
        }
    }

    pub fn u64(&self, key: &str) -> Result<u64, ParameterError> {
        let value = self.require(key)?;
        value
            .as_u64()
            .ok_or_else(|| wrong_type(key, "unsigned integer", value))
    }

    pub fn bool(&self, key: &str) -> Result<bool, ParameterError> {
        let value = self.require(key)?;
        value.as_bool().ok_or_else(|| wrong_type(key, "boolean", value))
    }

    pub fn str(&self, key: &str) -> Result<&str, ParameterError> {
        let value = self.require(key)?;
        value.as_str().ok_or_else(|| wrong_type(key, "string", value))
    }

    pub fn datetime(&self, key: &str) -> Result<NaiveDateTime, ParameterError> {
        let raw = self.str(key)?;
        NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT).map_err(|e| {
            ParameterError::Invalid {
                key: key.to_string(),
                message: format!("cannot parse \"{raw}\" as {DATETIME_FORMAT}: {e}"),
            }
        })
    }

    /// Applies caller-supplied time overrides and recomputes the derived
    /// horizon keys `horizon_minutes` and `n_steps`.
    pub fn apply_time_parameters(
        &mut self,
        time_params: &GenerationParameters,
    ) -> Result<(), ParameterError> {
        self.merge_global(time_params);
        let horizon = TimeHorizon::from_params(self)?;
        self.insert("horizon_minutes", horizon.minutes());
        self.insert("n_steps", horizon.n_steps as u64);
        Ok(())
    }

    /// Reads the time horizon described by `start_date`, `end_date` and `dt`.
    pub fn horizon(&self) -> Result<TimeHorizon, ParameterError> {
        TimeHorizon::from_params(self)
    }
}

fn wrong_type(key: &str, expected: &'static str, found: &Value) -> ParameterError {
    ParameterError::WrongType {
        key: key.to_string(),
        expected,
        found: found.to_string(),
    }
}

/// Regular time grid shared by every table of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeHorizon {
    pub start: NaiveDateTime,
    pub dt_minutes: u64,
    pub n_steps: usize,
}

impl TimeHorizon {
    fn from_params(params: &GenerationParameters) -> Result<Self, ParameterError> {
        let start = params.datetime("start_date")?;
        let end = params.datetime("end_date")?;
        let dt_minutes = params.u64("dt")?;
        if dt_minutes == 0 {
            return Err(ParameterError::Invalid {
                key: "dt".to_string(),
                message: "must be > 0".to_string(),
            });
        }
        let span = (end - start).num_minutes();
        if span <= 0 {
            return Err(ParameterError::Invalid {
                key: "end_date".to_string(),
                message: "must be after start_date".to_string(),
            });
        }
        if dt_minutes > span as u64 {
            return Err(ParameterError::Invalid {
                key: "dt".to_string(),
                message: format!("must not exceed the {span} min horizon, got {dt_minutes}"),
            });
        }
        let n_steps = (span as u64).div_ceil(dt_minutes) as usize;
        Ok(Self {
            start,
            dt_minutes,
            n_steps,
        })
    }

    /// Total covered duration in minutes.
    pub fn minutes(&self) -> u64 {
        self.dt_minutes * self.n_steps as u64
    }

    /// Length of one step in hours.
    pub fn dt_hours(&self) -> f64 {
        self.dt_minutes as f64 / 60.0
    }

    /// Timestamps of every step, starting at `start`.
    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        (0..self.n_steps as u64)
            .map(|i| self.start + TimeDelta::minutes((i * self.dt_minutes) as i64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global() -> GenerationParameters {
        GenerationParameters::new()
            .with("dt", 60)
            .with("start_date", "2012-01-01 00:00")
            .with("end_date", "2012-01-02 00:00")
            .with("planned_std", 0.01)
    }

    #[test]
    fn global_wins_on_collision() {
        let mut load = GenerationParameters::new().with("dt", 5).with("load_noise_std", 0.1);
        load.merge_global(&global());
        assert_eq!(load.u64("dt"), Ok(60));
        assert_eq!(load.f64("load_noise_std"), Ok(0.1));
    }

    #[test]
    fn merge_is_idempotent() {
        let domain = GenerationParameters::new().with("alpha", 0.9).with("dt", 15);
        let once = domain.merged_with(&global());
        let twice = once.merged_with(&global());
        assert_eq!(once, twice);
    }

    #[test]
    fn rejects_nested_json() {
        let err = GenerationParameters::from_json_str(r#"{"a": {"b": 1}}"#).unwrap_err();
        assert!(err.contains("$.a"));
        assert!(GenerationParameters::from_json_str("[1, 2]").is_err());
    }

    #[test]
    fn parses_flat_json() {
        let params =
            GenerationParameters::from_json_str(r#"{"dt": 30, "name": "x", "flag": true}"#)
                .unwrap();
        assert_eq!(params.u64("dt"), Ok(30));
        assert_eq!(params.str("name"), Ok("x"));
        assert_eq!(params.bool("flag"), Ok(true));
    }

    #[test]
    fn typed_getters_report_key() {
        let params = GenerationParameters::new().with("dt", "hourly");
        let err = params.u64("dt").unwrap_err();
        assert!(err.to_string().contains("dt"));
        assert_eq!(
            params.f64("missing"),
            Err(ParameterError::Missing("missing".into()))
        );
        assert_eq!(params.f64_or("missing", 2.5), Ok(2.5));
    }

    #[test]
    fn time_parameters_override_and_derive_steps() {
        let mut params = global();
        let overrides = GenerationParameters::new().with("dt", 30);
        params.apply_time_parameters(&overrides).unwrap();
        assert_eq!(params.u64("n_steps"), Ok(48));
        assert_eq!(params.u64("horizon_minutes"), Ok(24 * 60));
    }

    #[test]
    fn horizon_rejects_zero_dt_and_empty_span() {
        let zero_dt = global().with("dt", 0);
        assert!(zero_dt.horizon().is_err());

        let empty = global().with("end_date", "2012-01-01 00:00");
        assert!(empty.horizon().is_err());
    }

    #[test]
    fn horizon_rejects_step_longer_than_span() {
        let huge = global().with("dt", 1_000_000_000_000_000_u64);
        match huge.horizon() {
            Err(ParameterError::Invalid { key, .. }) => assert_eq!(key, "dt"),
            other => panic!("unexpected horizon: {other:?}"),
        }

        let whole_day = global().with("dt", 24 * 60).horizon().unwrap();
        assert_eq!(whole_day.timestamps().len(), 1);
    }

    #[test]
    fn timestamps_follow_dt() {
        let horizon = global().with("dt", 360).horizon().unwrap();
        let stamps = horizon.timestamps();
        assert_eq!(stamps.len(), 4);
        assert_eq!(
            stamps[1].format(DATETIME_FORMAT).to_string(),
            "2012-01-01 06:00"
        );
        assert_eq!(horizon.dt_hours(), 6.0);
    }
}
