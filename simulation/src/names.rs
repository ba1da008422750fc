//! Name Generation for People
//!
//! First names are weighted by popularity within a birth decade and sex.
//! Last names are weighted through a rank-to-probability mapping.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};

use crate::components::Sex;
use crate::error::{Result, SimulationError};
use crate::tables::decade_of;

/// Returned when no table can supply a name
pub const UNKNOWN_NAME: &str = "Unknown";

/// Popular male first names by decade with relative frequency (births, thousands)
const MALE_FIRST_NAMES: &[(i32, &[(&str, f64)])] = &[
    (1950, &[("James", 86.2), ("Michael", 83.6), ("Robert", 83.1), ("John", 79.3), ("David", 76.0), ("William", 61.3), ("Richard", 51.2), ("Thomas", 47.1)]),
    (1960, &[("Michael", 83.3), ("David", 78.5), ("John", 72.7), ("James", 71.9), ("Robert", 70.0), ("Mark", 53.8), ("William", 49.3), ("Richard", 38.2)]),
    (1970, &[("Michael", 85.2), ("Christopher", 53.6), ("Jason", 46.4), ("David", 45.1), ("James", 42.7), ("John", 41.3), ("Robert", 39.8), ("Brian", 35.0)]),
    (1980, &[("Michael", 66.4), ("Christopher", 55.5), ("Matthew", 46.1), ("Joshua", 39.9), ("David", 36.9), ("James", 33.4), ("Daniel", 33.1), ("Robert", 31.9)]),
    (1990, &[("Michael", 46.2), ("Christopher", 36.0), ("Matthew", 35.2), ("Joshua", 34.1), ("Jacob", 29.8), ("Nicholas", 26.5), ("Andrew", 25.7), ("Daniel", 25.6)]),
    (2000, &[("Jacob", 27.3), ("Michael", 25.6), ("Joshua", 23.1), ("Matthew", 22.1), ("Daniel", 20.2), ("Christopher", 19.9), ("Andrew", 19.5), ("Ethan", 19.5)]),
    (2010, &[("Noah", 18.2), ("Liam", 18.1), ("Jacob", 16.8), ("William", 16.7), ("Mason", 16.4), ("Ethan", 15.6), ("Michael", 15.5), ("Alexander", 15.0)]),
];

/// Popular female first names by decade with relative frequency (births, thousands)
const FEMALE_FIRST_NAMES: &[(i32, &[(&str, f64)])] = &[
    (1950, &[("Mary", 62.7), ("Linda", 56.6), ("Patricia", 46.2), ("Susan", 43.8), ("Deborah", 42.5), ("Barbara", 30.8), ("Debra", 30.4), ("Karen", 29.6)]),
    (1960, &[("Lisa", 49.6), ("Mary", 47.6), ("Susan", 40.5), ("Karen", 40.0), ("Kimberly", 35.5), ("Patricia", 34.4), ("Linda", 33.3), ("Donna", 30.1)]),
    (1970, &[("Jennifer", 58.1), ("Amy", 24.8), ("Melissa", 23.7), ("Michelle", 22.8), ("Kimberly", 22.1), ("Lisa", 21.1), ("Angela", 20.5), ("Heather", 19.6)]),
    (1980, &[("Jessica", 46.9), ("Jennifer", 44.0), ("Amanda", 37.0), ("Ashley", 36.3), ("Sarah", 29.6), ("Stephanie", 24.0), ("Melissa", 22.7), ("Nicole", 21.1)]),
    (1990, &[("Jessica", 30.3), ("Ashley", 30.1), ("Emily", 24.1), ("Sarah", 22.5), ("Samantha", 22.4), ("Amanda", 19.0), ("Brittany", 18.2), ("Elizabeth", 17.4)]),
    (2000, &[("Emily", 22.3), ("Madison", 19.3), ("Emma", 18.1), ("Olivia", 15.8), ("Hannah", 15.7), ("Abigail", 15.3), ("Isabella", 14.9), ("Samantha", 13.1)]),
    (2010, &[("Emma", 19.8), ("Olivia", 19.1), ("Sophia", 17.9), ("Isabella", 16.0), ("Ava", 15.1), ("Mia", 13.7), ("Emily", 12.2), ("Abigail", 11.9)]),
];

/// Common last names in rank order (rank = index + 1)
const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis",
    "Rodriguez", "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson",
    "Thomas", "Taylor", "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson",
    "White", "Harris", "Sanchez", "Clark", "Ramirez", "Lewis", "Robinson", "Walker",
    "Young", "Allen", "King", "Wright", "Scott", "Torres", "Nguyen", "Hill",
    "Flores", "Green", "Adams", "Nelson", "Baker", "Hall", "Rivera", "Campbell",
    "Mitchell", "Carter", "Roberts",
];

/// Share of the population holding the surname at each rank, in percent
const RANK_PROBABILITY: &[(u32, f64)] = &[
    (1, 0.828), (2, 0.655), (3, 0.550), (4, 0.487), (5, 0.475), (6, 0.404),
    (7, 0.386), (8, 0.362), (9, 0.362), (10, 0.353), (11, 0.344), (12, 0.302),
    (13, 0.296), (14, 0.247), (15, 0.240), (16, 0.234), (17, 0.233), (18, 0.226),
    (19, 0.222), (20, 0.221), (21, 0.213), (22, 0.210), (23, 0.204), (24, 0.191),
    (25, 0.189), (26, 0.186), (27, 0.183), (28, 0.178), (29, 0.176), (30, 0.174),
    (31, 0.164), (32, 0.155), (33, 0.151), (34, 0.150), (35, 0.150), (36, 0.147),
    (37, 0.146), (38, 0.145), (39, 0.141), (40, 0.140), (41, 0.139), (42, 0.137),
    (43, 0.135), (44, 0.133), (45, 0.133), (46, 0.132), (47, 0.132), (48, 0.129),
    (49, 0.129), (50, 0.125),
];

static BUILTIN: Lazy<Arc<NameTables>> = Lazy::new(|| {
    let mut first_names: HashMap<(i32, Sex), Vec<(String, f64)>> = HashMap::new();
    for (sex, table) in [(Sex::Male, MALE_FIRST_NAMES), (Sex::Female, FEMALE_FIRST_NAMES)] {
        for &(decade, names) in table {
            first_names.insert(
                (decade, sex),
                names.iter().map(|&(name, weight)| (name.to_string(), weight)).collect(),
            );
        }
    }

    Arc::new(NameTables {
        first_names,
        last_names: LAST_NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i as u32 + 1))
            .collect(),
        rank_probability: RANK_PROBABILITY.iter().copied().collect(),
    })
});

/// Raw name frequency data, as loaded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameTables {
    first_names: HashMap<(i32, Sex), Vec<(String, f64)>>,
    last_names: Vec<(String, u32)>,
    rank_probability: BTreeMap<u32, f64>,
}

impl NameTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared built-in name set (US-style names, 1950s-2010s)
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    pub fn with_first_name(mut self, decade: i32, sex: Sex, name: &str, weight: f64) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SimulationError::EmptyName);
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(SimulationError::InvalidWeight { name: name.to_string(), weight });
        }
        self.first_names
            .entry((decade_of(decade), sex))
            .or_default()
            .push((name.to_string(), weight));
        Ok(self)
    }

    pub fn with_last_name(mut self, name: &str, rank: u32) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SimulationError::EmptyName);
        }
        if rank == 0 {
            return Err(SimulationError::InvalidRank { name: name.to_string(), rank });
        }
        self.last_names.push((name.to_string(), rank));
        Ok(self)
    }

    pub fn with_rank_probability(mut self, rank: u32, probability: f64) -> Result<Self> {
        if rank == 0 {
            return Err(SimulationError::InvalidRank { name: String::new(), rank });
        }
        if !probability.is_finite() || probability < 0.0 {
            return Err(SimulationError::InvalidWeight { name: format!("rank {rank}"), weight: probability });
        }
        self.rank_probability.insert(rank, probability);
        Ok(self)
    }
}

struct WeightedNames {
    names: Vec<String>,
    index: WeightedIndex<f64>,
}

impl WeightedNames {
    fn new(entries: Vec<(String, f64)>) -> Option<Self> {
        let index = WeightedIndex::new(entries.iter().map(|(_, w)| *w)).ok()?;
        let names = entries.into_iter().map(|(name, _)| name).collect();
        Some(Self { names, index })
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.names[self.index.sample(rng)]
    }
}

/// Prepared, ready-to-sample view of a `NameTables`
pub struct NameSampler {
    first_names: HashMap<(i32, Sex), WeightedNames>,
    last_names: Vec<String>,
    /// `None` = uniform choice over `last_names`
    last_name_index: Option<WeightedIndex<f64>>,
}

impl NameSampler {
    pub fn new(tables: &NameTables) -> Self {
        let first_names = tables
            .first_names
            .iter()
            .filter_map(|(key, entries)| WeightedNames::new(entries.clone()).map(|w| (*key, w)))
            .collect();

        // Only ranked names take part in weighted sampling
        let (ranked, weights): (Vec<String>, Vec<f64>) = tables
            .last_names
            .iter()
            .filter_map(|(name, rank)| {
                tables.rank_probability.get(rank).map(|p| (name.clone(), *p))
            })
            .unzip();

        let (last_names, last_name_index) = match WeightedIndex::new(&weights) {
            Ok(index) => (ranked, Some(index)),
            Err(_) => {
                tracing::debug!("No usable rank probabilities, sampling last names uniformly");
                let all = tables.last_names.iter().map(|(name, _)| name.clone()).collect();
                (all, None)
            }
        };

        Self { first_names, last_names, last_name_index }
    }

    /// Draw a first name for someone born in `year`.
    ///
    /// Falls back to the other sex in the same decade, then to the nearest
    /// decade that has names, then to [`UNKNOWN_NAME`].
    pub fn first_name<R: Rng + ?Sized>(&self, year: i32, sex: Sex, rng: &mut R) -> String {
        let decade = decade_of(year);

        let table = self
            .first_names
            .get(&(decade, sex))
            .or_else(|| self.first_names.get(&(decade, sex.opposite())))
            .or_else(|| self.nearest_decade(decade, sex))
            .or_else(|| self.nearest_decade(decade, sex.opposite()));

        match table {
            Some(names) => names.sample(rng).to_string(),
            None => UNKNOWN_NAME.to_string(),
        }
    }

    pub fn last_name<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let chosen = match &self.last_name_index {
            Some(index) => self.last_names.get(index.sample(rng)),
            None => self.last_names.choose(rng),
        };
        chosen.cloned().unwrap_or_else(|| UNKNOWN_NAME.to_string())
    }

    /// Closest decade with names for `sex`; ties go to the earlier decade
    fn nearest_decade(&self, decade: i32, sex: Sex) -> Option<&WeightedNames> {
        self.first_names
            .iter()
            .filter(|((_, s), _)| *s == sex)
            .min_by_key(|((d, _), _)| (d.abs_diff(decade), *d))
            .map(|(_, names)| names)
    }
}
