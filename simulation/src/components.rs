//! ECS Components for family tree entities
//!
//! Every person in the tree is a `hecs` entity carrying a `Person`.
//! Relationships are expressed as entity links, decision state as markers.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Identity Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonId(pub u64);

// ============================================================================
// Person Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn opposite(self) -> Self {
        match self {
            Sex::Male => Sex::Female,
            Sex::Female => Sex::Male,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub first_name: String,
    pub last_name: String,
    pub sex: Sex,
    pub birth_year: i32,
    /// `None` when no life expectancy is known for the birth decade
    pub death_year: Option<i32>,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Age at death, if a death year is known
    pub fn lifespan(&self) -> Option<i32> {
        self.death_year.map(|death| death - self.birth_year)
    }

    pub fn decade(&self) -> i32 {
        crate::tables::decade_of(self.birth_year)
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.death_year {
            Some(death) => write!(f, "{} ({} - {})", self.full_name(), self.birth_year, death),
            None => write!(f, "{} ({} - ?)", self.full_name(), self.birth_year),
        }
    }
}

// ============================================================================
// Relationship Components
// ============================================================================

/// Spouse link. Always present on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partner(pub hecs::Entity);

/// The couple (or single parent) a child was born to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parents {
    pub elder: hecs::Entity,
    pub other: Option<hecs::Entity>,
}

impl Parents {
    pub fn iter(&self) -> impl Iterator<Item = hecs::Entity> {
        std::iter::once(self.elder).chain(self.other)
    }
}

/// Children in birth order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Children(pub Vec<hecs::Entity>);

/// Marker: spouse decision made, no spouse drawn
#[derive(Debug, Clone, Copy, Default)]
pub struct Single;

/// Marker: this person's family has already had its children generated
#[derive(Debug, Clone, Copy, Default)]
pub struct Settled;
