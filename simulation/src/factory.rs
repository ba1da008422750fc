//! Person Factory
//!
//! Creates people from the demographic tables: names, death year, spouse
//! draws, and child counts. Never fails; missing table data degrades to
//! "no spouse", "no children" or an unknown death year.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::{Person, PersonId, Sex};
use crate::config::{FactoryConfig, MAX_CHILD_COUNT_SPREAD, MAX_DEATH_YEAR_SPREAD, MAX_SPOUSE_AGE_GAP};
use crate::names::{NameSampler, NameTables};
use crate::tables::DemographicTables;

/// Parents' age at the start of the child-bearing window
pub const FERTILITY_START_AGE: i32 = 25;
/// Length of the child-bearing window in years
pub const FERTILITY_WINDOW: i32 = 20;
/// Distinct whole years strictly inside the window
pub const MAX_CHILDREN: u32 = (FERTILITY_WINDOW - 1) as u32;

pub struct PersonFactory {
    tables: Arc<DemographicTables>,
    names: NameSampler,
    config: FactoryConfig,
}

impl PersonFactory {
    pub fn new(tables: Arc<DemographicTables>, names: &NameTables, config: FactoryConfig) -> Self {
        Self {
            tables,
            names: NameSampler::new(names),
            config,
        }
    }

    /// Factory over the built-in tables
    pub fn builtin(config: FactoryConfig) -> Self {
        Self::new(DemographicTables::builtin(), &NameTables::builtin(), config)
    }

    pub fn tables(&self) -> &DemographicTables {
        &self.tables
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Create a person with freshly drawn first and last names
    pub fn create_person<R: Rng + ?Sized>(
        &self,
        id: PersonId,
        birth_year: i32,
        sex: Sex,
        rng: &mut R,
    ) -> Person {
        Person {
            id,
            first_name: self.names.first_name(birth_year, sex, rng),
            last_name: self.names.last_name(rng),
            sex,
            birth_year,
            death_year: self.death_year(birth_year, rng),
        }
    }

    /// Birth year + life expectancy of the birth decade, give or take
    /// `death_year_spread` years
    pub fn death_year<R: Rng + ?Sized>(&self, birth_year: i32, rng: &mut R) -> Option<i32> {
        let expectancy = self.tables.life_expectancy(birth_year)?;
        let spread = self.config.death_year_spread.clamp(0, MAX_DEATH_YEAR_SPREAD);
        Some(
            birth_year
                .saturating_add(expectancy.floor() as i32)
                .saturating_add(rng.gen_range(-spread..=spread)),
        )
    }

    /// Draw against the marriage rate of the person's birth decade
    pub fn wants_spouse<R: Rng + ?Sized>(&self, person: &Person, rng: &mut R) -> bool {
        match self.tables.marriage_rate(person.birth_year) {
            Some(rate) => rng.gen::<f64>() < rate,
            None => false,
        }
    }

    /// Spouse of the opposite sex, born within `spouse_age_gap` years.
    ///
    /// The birth year is clamped to the earliest decade the tables cover
    /// and to `latest_birth_year`, but never past the person's own year.
    pub fn create_spouse<R: Rng + ?Sized>(
        &self,
        id: PersonId,
        person: &Person,
        latest_birth_year: i32,
        rng: &mut R,
    ) -> Person {
        let gap = self.config.spouse_age_gap.clamp(0, MAX_SPOUSE_AGE_GAP);
        let mut birth_year = person.birth_year.saturating_add(rng.gen_range(-gap..=gap));
        if let Some(earliest) = self.tables.earliest_decade() {
            birth_year = birth_year.max(earliest.min(person.birth_year));
        }
        birth_year = birth_year.min(latest_birth_year.max(person.birth_year));
        self.create_person(id, birth_year, person.sex.opposite(), rng)
    }

    /// ceil(birth rate +/- spread), one fewer without a spouse, never negative
    pub fn child_count<R: Rng + ?Sized>(&self, elder: &Person, has_spouse: bool, rng: &mut R) -> u32 {
        let Some(rate) = self.tables.birth_rate(elder.birth_year) else {
            tracing::trace!(decade = elder.decade(), "No birth rate, no children");
            return 0;
        };

        let spread = match self.config.child_count_spread {
            s if s.is_nan() => 0.0,
            s => s.clamp(0.0, MAX_CHILD_COUNT_SPREAD),
        };
        let perturbation = if spread > 0.0 {
            rng.gen_range(-spread..=spread)
        } else {
            0.0
        };

        let mut count = (rate + perturbation).ceil() as i64;
        if !has_spouse {
            count -= 1;
        }
        count.clamp(0, MAX_CHILDREN as i64) as u32
    }

    /// A newborn who takes the last name of one of its parents
    pub fn create_child<R: Rng + ?Sized>(
        &self,
        id: PersonId,
        birth_year: i32,
        parent_last_names: &[&str],
        rng: &mut R,
    ) -> Person {
        let sex = if rng.gen::<bool>() { Sex::Male } else { Sex::Female };
        let first_name = self.names.first_name(birth_year, sex, rng);
        let last_name = match parent_last_names.choose(rng) {
            Some(name) => name.to_string(),
            None => self.names.last_name(rng),
        };

        Person {
            id,
            first_name,
            last_name,
            sex,
            birth_year,
            death_year: self.death_year(birth_year, rng),
        }
    }

    /// Evenly spaced birth years strictly inside
    /// (elder + 25, elder + 45), in ascending order
    pub fn child_birth_years(elder_birth_year: i32, count: u32) -> Vec<i32> {
        let count = count.min(MAX_CHILDREN) as i32;
        let start = elder_birth_year.saturating_add(FERTILITY_START_AGE);
        (1..=count)
            .map(|i| start.saturating_add(FERTILITY_WINDOW * i / (count + 1)))
            .collect()
    }
}
