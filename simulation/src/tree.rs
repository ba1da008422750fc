//! Family Tree - generation-by-generation orchestrator
//!
//! Starts from a founding couple and settles one family per person:
//! draw a spouse once, then lay out that couple's children in the
//! elder parent's child-bearing window. Newborns form the next generation.

use std::collections::HashMap;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::components::*;
use crate::config::TreeConfig;
use crate::factory::PersonFactory;
use crate::tables::decade_of;

/// Outcome of a `build` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub generations: u32,
    pub births: usize,
    pub population: usize,
}

pub struct FamilyTree {
    world: World,
    factory: PersonFactory,
    rng: ChaCha8Rng,
    start_year: i32,
    next_person_id: u64,
    founders: Option<(Entity, Entity)>,
    index: HashMap<PersonId, Entity>,
}

impl FamilyTree {
    /// Tree seeded from `config.seed`, or from OS entropy when unset
    pub fn new(factory: PersonFactory, config: &TreeConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(factory, config.start_year, rng)
    }

    pub fn with_rng(factory: PersonFactory, start_year: i32, rng: ChaCha8Rng) -> Self {
        Self {
            world: World::new(),
            factory,
            rng,
            start_year,
            next_person_id: 1,
            founders: None,
            index: HashMap::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    fn allocate_id(&mut self) -> PersonId {
        let id = PersonId(self.next_person_id);
        self.next_person_id += 1;
        id
    }

    fn spawn(&mut self, person: Person) -> Entity {
        let id = person.id;
        let entity = self.world.spawn((person, Children::default()));
        self.index.insert(id, entity);
        entity
    }

    /// Two founders born in the start year, married to each other.
    /// Nobody is born after `until_year`, founders included.
    fn create_founders(&mut self, until_year: i32) -> (Entity, Entity) {
        let year = self.start_year.min(until_year);
        if year != self.start_year {
            warn!(
                "Until year {} precedes start year {}; founders born in {}",
                until_year, self.start_year, year
            );
        }
        if self.factory.tables().rates(year).is_none() {
            warn!("No demographic rates for the {}s; the tree will not grow", decade_of(year));
        }

        let id = self.allocate_id();
        let first = self.factory.create_person(id, year, Sex::Male, &mut self.rng);
        let id = self.allocate_id();
        let second = self.factory.create_person(id, year, Sex::Female, &mut self.rng);

        info!("Founders: {} AND {}", first, second);

        let a = self.spawn(first);
        let b = self.spawn(second);
        let _ = self.world.insert_one(a, Partner(b));
        let _ = self.world.insert_one(b, Partner(a));

        self.founders = Some((a, b));
        (a, b)
    }

    /// Grow the tree until a generation produces no births at or before
    /// `until_year`. Calling again only settles people not yet settled.
    pub fn build(&mut self, until_year: i32) -> BuildReport {
        if self.founders.is_none() {
            self.create_founders(until_year);
        }

        let mut queue: Vec<(PersonId, Entity)> = self
            .world
            .query::<&Person>()
            .without::<&Settled>()
            .iter()
            .map(|(entity, person)| (person.id, entity))
            .collect();
        queue.sort_unstable_by_key(|(id, _)| *id);
        let mut queue: Vec<Entity> = queue.into_iter().map(|(_, entity)| entity).collect();

        let mut generations = 0u32;
        let mut births = 0usize;

        while !queue.is_empty() {
            generations += 1;
            let mut next = Vec::new();

            for &entity in &queue {
                next.extend(self.settle(entity, until_year));
            }

            debug!(
                generation = generations,
                settled = queue.len(),
                born = next.len(),
                population = self.len(),
                "Generation complete"
            );

            births += next.len();
            queue = next;
        }

        let report = BuildReport {
            generations,
            births,
            population: self.len(),
        };
        info!(
            "Tree built through {}: {} generations, {} people",
            until_year, report.generations, report.population
        );
        report
    }

    /// Decide the spouse (once) and generate the family's children.
    /// Returns the newborns.
    fn settle(&mut self, entity: Entity, until_year: i32) -> Vec<Entity> {
        if self.world.get::<&Settled>(entity).is_ok() {
            return Vec::new();
        }
        let person = match self.world.get::<&Person>(entity) {
            Ok(person) => (*person).clone(),
            Err(_) => return Vec::new(),
        };

        let partner = self.resolve_partner(entity, &person, until_year);
        let spouse = partner.and_then(|p| self.world.get::<&Person>(p).ok().map(|s| (*s).clone()));

        // Elder parent anchors the window; ties go to the person being settled
        let (elder_entity, elder, other) = match (&spouse, partner) {
            (Some(s), Some(p)) if s.birth_year < person.birth_year => (p, s, Some(entity)),
            (Some(_), Some(p)) => (entity, &person, Some(p)),
            _ => (entity, &person, None),
        };

        let count = self.factory.child_count(elder, partner.is_some(), &mut self.rng);
        let years = PersonFactory::child_birth_years(elder.birth_year, count);

        let mut last_names: Vec<&str> = vec![person.last_name.as_str()];
        if let Some(s) = &spouse {
            last_names.push(s.last_name.as_str());
        }

        let parents = Parents { elder: elder_entity, other };
        let mut newborns = Vec::with_capacity(years.len());

        for year in years.into_iter().take_while(|&y| y <= until_year) {
            let id = self.allocate_id();
            let child = self.factory.create_child(id, year, &last_names, &mut self.rng);
            let child_entity = self.spawn(child);
            let _ = self.world.insert_one(child_entity, parents);
            newborns.push(child_entity);
        }

        for parent in std::iter::once(entity).chain(partner) {
            if let Ok(mut children) = self.world.get::<&mut Children>(parent) {
                children.0.extend_from_slice(&newborns);
            }
            let _ = self.world.insert_one(parent, Settled);
        }

        newborns
    }

    /// Existing spouse, or a memoized draw against the marriage rate
    fn resolve_partner(&mut self, entity: Entity, person: &Person, until_year: i32) -> Option<Entity> {
        if let Ok(partner) = self.world.get::<&Partner>(entity) {
            return Some(partner.0);
        }
        if self.world.get::<&Single>(entity).is_ok() {
            return None;
        }

        if !self.factory.wants_spouse(person, &mut self.rng) {
            let _ = self.world.insert_one(entity, Single);
            return None;
        }

        let id = self.allocate_id();
        let spouse = self.factory.create_spouse(id, person, until_year, &mut self.rng);
        let spouse_entity = self.spawn(spouse);
        let _ = self.world.insert_one(spouse_entity, Partner(entity));
        let _ = self.world.insert_one(entity, Partner(spouse_entity));
        Some(spouse_entity)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn founders(&self) -> Option<(PersonId, PersonId)> {
        let (a, b) = self.founders?;
        Some((self.id_of(a)?, self.id_of(b)?))
    }

    pub fn person(&self, id: PersonId) -> Option<Person> {
        let entity = *self.index.get(&id)?;
        self.world.get::<&Person>(entity).ok().map(|p| (*p).clone())
    }

    pub fn spouse_of(&self, id: PersonId) -> Option<PersonId> {
        let entity = *self.index.get(&id)?;
        let partner = self.world.get::<&Partner>(entity).ok()?.0;
        self.id_of(partner)
    }

    /// Children in birth order
    pub fn children_of(&self, id: PersonId) -> Vec<PersonId> {
        let Some(&entity) = self.index.get(&id) else {
            return Vec::new();
        };
        match self.world.get::<&Children>(entity) {
            Ok(children) => children.0.iter().filter_map(|&c| self.id_of(c)).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Elder parent first; empty for founders and people who married in
    pub fn parents_of(&self, id: PersonId) -> Vec<PersonId> {
        let Some(&entity) = self.index.get(&id) else {
            return Vec::new();
        };
        match self.world.get::<&Parents>(entity) {
            Ok(parents) => parents.iter().filter_map(|p| self.id_of(p)).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Everyone, ordered by id
    pub fn people(&self) -> Vec<Person> {
        let mut people: Vec<Person> = self
            .world
            .query::<&Person>()
            .iter()
            .map(|(_, person)| person.clone())
            .collect();
        people.sort_unstable_by_key(|p| p.id);
        people
    }

    fn id_of(&self, entity: Entity) -> Option<PersonId> {
        self.world.get::<&Person>(entity).ok().map(|p| p.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::FactoryConfig;
    use crate::names::NameTables;
    use crate::tables::DemographicTables;

    fn tree_with(tables: DemographicTables, spread: f64, seed: u64) -> FamilyTree {
        let config = FactoryConfig {
            child_count_spread: spread,
            ..FactoryConfig::default()
        };
        let factory = PersonFactory::new(Arc::new(tables), &NameTables::builtin(), config);
        FamilyTree::with_rng(factory, 1950, ChaCha8Rng::seed_from_u64(seed))
    }

    #[test]
    fn test_founding_couple_two_children() {
        let tables = DemographicTables::new()
            .with_life_expectancy(1950, 68.0)
            .unwrap()
            .with_rates(1950, 2.0, 1.0)
            .unwrap();
        let mut tree = tree_with(tables, 0.0, 1);

        let report = tree.build(2120);

        // The 1980s have no rates, so the children neither marry nor have kids
        assert_eq!(report.population, 4);
        assert_eq!(report.births, 2);
        assert_eq!(report.generations, 2);

        let (a, b) = tree.founders().unwrap();
        assert_eq!(tree.spouse_of(a), Some(b));
        assert_eq!(tree.spouse_of(b), Some(a));

        let kids = tree.children_of(a);
        assert_eq!(kids, tree.children_of(b));
        let years: Vec<i32> = kids.iter().map(|&k| tree.person(k).unwrap().birth_year).collect();
        assert_eq!(years, vec![1981, 1988]);

        for &kid in &kids {
            let parents = tree.parents_of(kid);
            assert_eq!(parents.len(), 2);
            assert!(parents.contains(&a) && parents.contains(&b));
            assert_eq!(tree.person(kid).unwrap().death_year, None);
            assert_eq!(tree.spouse_of(kid), None);
        }
    }

    #[test]
    fn test_until_year_cuts_off_births() {
        let mut tree = tree_with((*DemographicTables::builtin()).clone(), 1.5, 3);
        assert!(tree.is_empty());
        let report = tree.build(1950);
        assert!(!tree.is_empty());

        assert_eq!(report.population, 2);
        assert_eq!(report.births, 0);
        assert_eq!(report.generations, 1);
    }

    #[test]
    fn test_founders_respect_early_until_year() {
        let mut tree = tree_with((*DemographicTables::builtin()).clone(), 1.5, 3);
        let report = tree.build(1940);

        assert_eq!(tree.start_year(), 1950);
        assert_eq!(report.population, 2);
        assert_eq!(report.births, 0);
        assert!(tree.people().iter().all(|p| p.birth_year <= 1940));

        let (a, b) = tree.founders().unwrap();
        assert_eq!(tree.spouse_of(a), Some(b));
        assert_eq!(tree.person(a).unwrap().birth_year, 1940);
    }

    #[test]
    fn test_empty_tables_never_panic() {
        let mut tree = tree_with(DemographicTables::new(), 1.5, 4);
        let report = tree.build(2120);

        assert_eq!(report.population, 2);
        for person in tree.people() {
            assert_eq!(person.death_year, None);
            assert!(!person.first_name.is_empty());
        }
    }

    #[test]
    fn test_spouse_decision_is_memoized() {
        let tables = DemographicTables::new()
            .with_rates(1950, 2.0, 1.0)
            .unwrap()
            .with_rates(1980, 2.0, 1.0)
            .unwrap()
            .with_rates(1990, 2.0, 1.0)
            .unwrap();
        let mut tree = tree_with(tables, 0.0, 5);
        tree.build(2000);
        let before = tree.people();

        // Everyone is settled; a second build changes nothing
        let report = tree.build(2120);
        assert_eq!(report.births, 0);
        assert_eq!(tree.people(), before);

        // Each spouse link is symmetric and unique
        for person in &before {
            if let Some(spouse) = tree.spouse_of(person.id) {
                assert_eq!(tree.spouse_of(spouse), Some(person.id));
            }
        }
    }

    #[test]
    fn test_same_seed_same_tree() {
        let mut first = tree_with((*DemographicTables::builtin()).clone(), 1.5, 42);
        let mut second = tree_with((*DemographicTables::builtin()).clone(), 1.5, 42);
        first.build(2050);
        second.build(2050);

        assert_eq!(first.people(), second.people());
    }
}
