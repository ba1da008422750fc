//! Demographic lookup tables keyed by decade
//!
//! Life expectancy, birth rate and marriage rate. Lookups accept any year
//! and normalize it to its decade; a missing decade yields `None`.

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Longest life expectancy a table accepts
pub const MAX_LIFE_EXPECTANCY: f64 = 150.0;

/// Round a year down to its decade (1987 -> 1980, -3 -> -10)
pub fn decade_of(year: i32) -> i32 {
    year.div_euclid(10) * 10
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecadeRates {
    /// Expected children per person
    pub birth_rate: f64,
    /// Probability of marrying, 0.0..=1.0
    pub marriage_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemographicTables {
    life_expectancy: BTreeMap<i32, f64>,
    rates: BTreeMap<i32, DecadeRates>,
}

/// Life expectancy at birth, projected forward past the 2010s
const LIFE_EXPECTANCY: &[(i32, f64)] = &[
    (1950, 68.2), (1960, 69.7), (1970, 70.8), (1980, 73.7), (1990, 75.4),
    (2000, 76.8), (2010, 78.7), (2020, 77.3), (2030, 79.5), (2040, 80.3),
    (2050, 81.0), (2060, 81.7), (2070, 82.3), (2080, 82.9), (2090, 83.4),
    (2100, 83.9), (2110, 84.3), (2120, 84.7),
];

/// (decade, birth rate, marriage rate)
const RATES: &[(i32, f64, f64)] = &[
    (1950, 3.5, 0.88), (1960, 3.2, 0.85), (1970, 2.1, 0.78), (1980, 1.8, 0.70),
    (1990, 2.0, 0.66), (2000, 2.0, 0.62), (2010, 1.9, 0.58), (2020, 1.7, 0.55),
    (2030, 1.7, 0.55), (2040, 1.7, 0.55), (2050, 1.7, 0.55), (2060, 1.7, 0.55),
    (2070, 1.7, 0.55), (2080, 1.7, 0.55), (2090, 1.7, 0.55), (2100, 1.7, 0.55),
    (2110, 1.7, 0.55), (2120, 1.7, 0.55),
];

static BUILTIN: Lazy<Arc<DemographicTables>> = Lazy::new(|| {
    Arc::new(DemographicTables {
        life_expectancy: LIFE_EXPECTANCY.iter().copied().collect(),
        rates: RATES
            .iter()
            .map(|&(decade, birth_rate, marriage_rate)| {
                (decade, DecadeRates { birth_rate, marriage_rate })
            })
            .collect(),
    })
});

impl DemographicTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared built-in data set, initialized on first use
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    pub fn with_life_expectancy(mut self, decade: i32, years: f64) -> Result<Self> {
        let decade = decade_of(decade);
        if !years.is_finite() || years <= 0.0 || years > MAX_LIFE_EXPECTANCY {
            return Err(SimulationError::InvalidValue { decade, value: years });
        }
        self.life_expectancy.insert(decade, years);
        Ok(self)
    }

    pub fn with_rates(mut self, decade: i32, birth_rate: f64, marriage_rate: f64) -> Result<Self> {
        let decade = decade_of(decade);
        if !birth_rate.is_finite() || birth_rate < 0.0 {
            return Err(SimulationError::InvalidValue { decade, value: birth_rate });
        }
        if !(0.0..=1.0).contains(&marriage_rate) {
            return Err(SimulationError::RateOutOfRange { decade, value: marriage_rate });
        }
        self.rates.insert(decade, DecadeRates { birth_rate, marriage_rate });
        Ok(self)
    }

    pub fn life_expectancy(&self, year: i32) -> Option<f64> {
        self.life_expectancy.get(&decade_of(year)).copied()
    }

    pub fn rates(&self, year: i32) -> Option<DecadeRates> {
        self.rates.get(&decade_of(year)).copied()
    }

    pub fn birth_rate(&self, year: i32) -> Option<f64> {
        self.rates(year).map(|r| r.birth_rate)
    }

    pub fn marriage_rate(&self, year: i32) -> Option<f64> {
        self.rates(year).map(|r| r.marriage_rate)
    }

    /// Earliest decade with any data
    pub fn earliest_decade(&self) -> Option<i32> {
        let le = self.life_expectancy.keys().next().copied();
        let rates = self.rates.keys().next().copied();
        match (le, rates) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
