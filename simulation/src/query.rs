//! Read-only population queries over a built tree

use std::collections::{BTreeMap, HashMap};

use hecs::World;
use serde::Serialize;

use crate::components::Person;
use crate::tables::decade_of;
use crate::tree::FamilyTree;

/// A (first, last) name pair held by more than one person
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateName {
    pub first_name: String,
    pub last_name: String,
    /// Both parts joined for display
    pub name: String,
    pub count: usize,
}

/// All three standard queries in one serializable value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopulationReport {
    pub total: usize,
    pub by_decade: BTreeMap<i32, usize>,
    pub duplicate_names: Vec<DuplicateName>,
}

pub struct QueryEngine<'a> {
    world: &'a World,
}

impl<'a> QueryEngine<'a> {
    pub fn new(tree: &'a FamilyTree) -> Self {
        Self { world: tree.world() }
    }

    pub fn total(&self) -> usize {
        self.world.query::<&Person>().iter().count()
    }

    /// Head count per birth decade, ascending
    pub fn by_decade(&self) -> BTreeMap<i32, usize> {
        self.count_by(|p| decade_of(p.birth_year))
    }

    /// Head count per exact birth year, ascending
    pub fn by_year(&self) -> BTreeMap<i32, usize> {
        self.count_by(|p| p.birth_year)
    }

    pub fn born_in_decade(&self, decade: i32) -> usize {
        let decade = decade_of(decade);
        self.count_where(|p| decade_of(p.birth_year) == decade)
    }

    pub fn born_in_year(&self, year: i32) -> usize {
        self.count_where(|p| p.birth_year == year)
    }

    /// (first, last) name pairs held by more than one person, most common
    /// first, then alphabetically
    pub fn duplicate_names(&self) -> Vec<DuplicateName> {
        duplicates_of(self.world.query::<&Person>().iter().map(|(_, person)| person))
    }

    /// Number of distinct name pairs that occur more than once
    pub fn duplicate_name_count(&self) -> usize {
        self.duplicate_names().len()
    }

    pub fn report(&self) -> PopulationReport {
        PopulationReport {
            total: self.total(),
            by_decade: self.by_decade(),
            duplicate_names: self.duplicate_names(),
        }
    }

    fn count_by(&self, key: impl Fn(&Person) -> i32) -> BTreeMap<i32, usize> {
        let mut counts = BTreeMap::new();
        for (_, person) in self.world.query::<&Person>().iter() {
            *counts.entry(key(person)).or_default() += 1;
        }
        counts
    }

    fn count_where(&self, pred: impl Fn(&Person) -> bool) -> usize {
        self.world
            .query::<&Person>()
            .iter()
            .filter(|(_, person)| pred(*person))
            .count()
    }
}

fn duplicates_of<'p>(people: impl IntoIterator<Item = &'p Person>) -> Vec<DuplicateName> {
    let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
    for person in people {
        *counts
            .entry((person.first_name.as_str(), person.last_name.as_str()))
            .or_default() += 1;
    }

    let mut dups: Vec<DuplicateName> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|((first, last), count)| DuplicateName {
            first_name: first.to_string(),
            last_name: last.to_string(),
            name: format!("{first} {last}"),
            count,
        })
        .collect();
    dups.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.first_name.cmp(&b.first_name))
    });
    dups
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::components::{PersonId, Sex};
    use crate::config::FactoryConfig;
    use crate::factory::PersonFactory;
    use crate::names::NameTables;
    use crate::tables::DemographicTables;

    /// One first name per sex and one surname, so every sibling of the
    /// same sex shares a full name
    fn uniform_name_tree() -> FamilyTree {
        let names = NameTables::new()
            .with_first_name(1950, Sex::Male, "Alan", 1.0)
            .unwrap()
            .with_first_name(1950, Sex::Female, "Beth", 1.0)
            .unwrap()
            .with_last_name("Smith", 1)
            .unwrap();
        let tables = DemographicTables::new().with_rates(1950, 4.0, 1.0).unwrap();
        let config = FactoryConfig {
            child_count_spread: 0.0,
            ..FactoryConfig::default()
        };
        let factory = PersonFactory::new(Arc::new(tables), &names, config);
        let mut tree = FamilyTree::with_rng(factory, 1950, ChaCha8Rng::seed_from_u64(12));
        tree.build(2120);
        tree
    }

    #[test]
    fn test_counts() {
        let tree = uniform_name_tree();
        let q = QueryEngine::new(&tree);

        // Founding couple plus four children born 1979, 1983, 1987, 1991
        assert_eq!(q.total(), 6);
        assert_eq!(q.by_decade(), BTreeMap::from([(1950, 2), (1970, 1), (1980, 2), (1990, 1)]));
        assert_eq!(q.born_in_decade(1985), 2);
        assert_eq!(q.born_in_year(1983), 1);
        assert_eq!(q.born_in_year(1984), 0);
        assert_eq!(q.by_year().values().sum::<usize>(), 6);
        assert_eq!(q.by_year().get(&1991), Some(&1));
    }

    #[test]
    fn test_duplicate_names() {
        let tree = uniform_name_tree();
        let q = QueryEngine::new(&tree);

        let dups = q.duplicate_names();
        assert!(dups.iter().all(|d| d.name == "Alan Smith" || d.name == "Beth Smith"));
        assert!(dups.iter().all(|d| d.count > 1));

        // Six people share two full names, so at most one of them is unique
        let total: usize = dups.iter().map(|d| d.count).sum();
        assert!(total == 5 || total == 6, "{dups:?}");
        assert!(dups.windows(2).all(|w| {
            w[0].count > w[1].count || (w[0].count == w[1].count && w[0].name < w[1].name)
        }));
        assert_eq!(q.duplicate_name_count(), dups.len());
        assert!(q.duplicate_name_count() >= 1);
    }

    fn named(id: u64, first: &str, last: &str) -> Person {
        Person {
            id: PersonId(id),
            first_name: first.to_string(),
            last_name: last.to_string(),
            sex: Sex::Female,
            birth_year: 1980,
            death_year: None,
        }
    }

    #[test]
    fn test_duplicates_keep_name_parts_apart() {
        let people = [
            named(1, "Mary Ann", "Smith"),
            named(2, "Mary", "Ann Smith"),
            named(3, "Mary Ann", "Smith"),
            named(4, "Mary", "Ann Smith"),
            named(5, "Mary", "Ann Smith"),
            named(6, "Joan", "Smith"),
        ];

        let dups = duplicates_of(&people);
        assert_eq!(dups.len(), 2, "{dups:?}");

        // Same display name, different pairs, counted separately
        assert_eq!((dups[0].first_name.as_str(), dups[0].last_name.as_str()), ("Mary", "Ann Smith"));
        assert_eq!(dups[0].count, 3);
        assert_eq!((dups[1].first_name.as_str(), dups[1].last_name.as_str()), ("Mary Ann", "Smith"));
        assert_eq!(dups[1].count, 2);
        assert!(dups.iter().all(|d| d.name == "Mary Ann Smith"));

        // One of each is not a duplicate
        assert!(duplicates_of(&[named(1, "Mary Ann", "Smith"), named(2, "Mary", "Ann Smith")]).is_empty());
    }

    #[test]
    fn test_report_bundles_queries() {
        let tree = uniform_name_tree();
        let q = QueryEngine::new(&tree);
        let report = q.report();

        assert_eq!(report.total, q.total());
        assert_eq!(report.by_decade, q.by_decade());
        assert_eq!(report.duplicate_names, q.duplicate_names());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total"], 6);
    }
}
