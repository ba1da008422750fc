//! Tree generation settings

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Founders' birth year
pub const DEFAULT_START_YEAR: i32 = 1950;
/// No one is born after this year
pub const DEFAULT_END_YEAR: i32 = 2120;

/// Years accepted for `start_year` and `end_year`
pub const YEAR_RANGE: RangeInclusive<i32> = -100_000..=100_000;
/// Widest accepted `spouse_age_gap`
pub const MAX_SPOUSE_AGE_GAP: i32 = 100;
/// Widest accepted `death_year_spread`
pub const MAX_DEATH_YEAR_SPREAD: i32 = 100;
/// Widest accepted `child_count_spread`; more than the child cap is meaningless
pub const MAX_CHILD_COUNT_SPREAD: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub start_year: i32,
    pub end_year: i32,
    /// `None` seeds from OS entropy
    pub seed: Option<u64>,
    pub factory: FactoryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Max years between spouses' births
    pub spouse_age_gap: i32,
    /// Max years a death strays from life expectancy
    pub death_year_spread: i32,
    /// Half-width of the uniform perturbation added to the birth rate
    pub child_count_spread: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
            seed: None,
            factory: FactoryConfig::default(),
        }
    }
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            spouse_age_gap: 10,
            death_year_spread: 10,
            child_count_spread: 1.5,
        }
    }
}

impl TreeConfig {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse and validate
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_year("start_year", self.start_year)?;
        check_year("end_year", self.end_year)?;
        self.factory.validate()
    }
}

impl FactoryConfig {
    /// Reject values that would overflow year arithmetic or the RNG range
    pub fn validate(&self) -> Result<()> {
        check_range("spouse_age_gap", self.spouse_age_gap as f64, 0.0, MAX_SPOUSE_AGE_GAP as f64)?;
        check_range("death_year_spread", self.death_year_spread as f64, 0.0, MAX_DEATH_YEAR_SPREAD as f64)?;
        check_range("child_count_spread", self.child_count_spread, 0.0, MAX_CHILD_COUNT_SPREAD)
    }
}

fn check_year(field: &'static str, year: i32) -> Result<()> {
    check_range(field, year as f64, *YEAR_RANGE.start() as f64, *YEAR_RANGE.end() as f64)
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    // NaN fails the contains check
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SimulationError::ConfigOutOfRange { field, value, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TreeConfig::default();
        assert_eq!(config.start_year, 1950);
        assert_eq!(config.end_year, 2120);
        assert_eq!(config.seed, None);
        assert_eq!(config.factory.child_count_spread, 1.5);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = TreeConfig::from_json(r#"{"seed": 42, "factory": {"child_count_spread": 0.0}}"#).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.end_year, DEFAULT_END_YEAR);
        assert_eq!(config.factory.child_count_spread, 0.0);
        assert_eq!(config.factory.spouse_age_gap, 10);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(TreeConfig::from_json("{ not json").is_err());
        assert!(TreeConfig::from_json_file("/definitely/not/here.json").is_err());
    }

    #[test]
    fn test_defaults_validate() {
        assert!(TreeConfig::default().validate().is_ok());
        assert!(FactoryConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_huge_spouse_age_gap() {
        let err = TreeConfig::from_json(r#"{"factory": {"spouse_age_gap": 2147483647}}"#).unwrap_err();
        assert!(matches!(err, SimulationError::ConfigOutOfRange { field: "spouse_age_gap", .. }));
        assert!(TreeConfig::from_json(r#"{"factory": {"spouse_age_gap": -1}}"#).is_err());
        assert!(TreeConfig::from_json(r#"{"factory": {"spouse_age_gap": 100}}"#).is_ok());
    }

    #[test]
    fn test_rejects_huge_death_year_spread() {
        let err = TreeConfig::from_json(r#"{"factory": {"death_year_spread": 2147483647}}"#).unwrap_err();
        assert!(matches!(err, SimulationError::ConfigOutOfRange { field: "death_year_spread", .. }));
        assert!(TreeConfig::from_json(r#"{"factory": {"death_year_spread": -5}}"#).is_err());
        assert!(TreeConfig::from_json(r#"{"factory": {"death_year_spread": 0}}"#).is_ok());
    }

    #[test]
    fn test_rejects_huge_child_count_spread() {
        let err = TreeConfig::from_json(r#"{"factory": {"child_count_spread": 1e308}}"#).unwrap_err();
        assert!(matches!(err, SimulationError::ConfigOutOfRange { field: "child_count_spread", .. }));
        assert!(TreeConfig::from_json(r#"{"factory": {"child_count_spread": -0.5}}"#).is_err());
        assert!(TreeConfig::from_json(r#"{"factory": {"child_count_spread": 20.0}}"#).is_ok());

        let nan = FactoryConfig {
            child_count_spread: f64::NAN,
            ..FactoryConfig::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_rejects_extreme_years() {
        assert!(TreeConfig::from_json(r#"{"start_year": 2147483647}"#).is_err());
        assert!(TreeConfig::from_json(r#"{"end_year": -2147483648}"#).is_err());
        assert!(TreeConfig::from_json(r#"{"start_year": 1900, "end_year": 1940}"#).is_ok());
    }
}
