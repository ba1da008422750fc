//! Family Tree Simulation Engine
//!
//! Grows a family tree from a founding couple using decade-keyed
//! demographic tables, then answers population queries over it.

pub mod components;
pub mod config;
pub mod error;
pub mod factory;
pub mod names;
pub mod query;
pub mod tables;
pub mod tree;

pub use components::*;
pub use config::{FactoryConfig, TreeConfig};
pub use error::SimulationError;
pub use factory::PersonFactory;
pub use names::{NameSampler, NameTables};
pub use query::{DuplicateName, PopulationReport, QueryEngine};
pub use tables::{decade_of, DemographicTables};
pub use tree::{BuildReport, FamilyTree};
