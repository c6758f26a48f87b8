//! Display-name allocation from a fixed descriptor x subject pool.

use std::collections::HashSet;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use thiserror::Error;

use crate::DisplayName;

/// Default descriptor words.
pub const DEFAULT_DESCRIPTORS: [&str; 8] = [
    "Red", "Blue", "Green", "Yellow", "Purple", "Orange", "Black", "White",
];

/// Default subject words.
pub const DEFAULT_SUBJECTS: [&str; 8] = [
    "Tiger", "Shark", "Monkey", "Elephant", "Eagle", "Dolphin", "Panda", "Wolf",
];

/// Prefix of synthetic names handed out once the pool is exhausted.
pub const GUEST_PREFIX: &str = "Guest#";

/// Name allocation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("Name pool exhausted: all {capacity} names in use")]
    Exhausted { capacity: usize },
}

/// Allocates unique display names and recycles them on release.
///
/// Names are `"<descriptor> <subject>"`. Each allocation is drawn uniformly
/// from the combinations not currently in use.
pub struct NameAllocator {
    combinations: Vec<DisplayName>,
    used: HashSet<DisplayName>,
    rng: StdRng,
}

impl Default for NameAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NameAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameAllocator")
            .field("capacity", &self.capacity())
            .field("used", &self.used.len())
            .finish_non_exhaustive()
    }
}

impl NameAllocator {
    /// Create an allocator over the default colour x animal pool.
    #[must_use]
    pub fn new() -> Self {
        Self::with_words(DEFAULT_DESCRIPTORS, DEFAULT_SUBJECTS)
    }

    /// Create an allocator over custom word lists.
    ///
    /// Repeated words are dropped so every combination is distinct.
    #[must_use]
    pub fn with_words<D, S>(descriptors: D, subjects: S) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        let descriptors = dedup(descriptors);
        let subjects = dedup(subjects);

        let combinations = descriptors
            .iter()
            .flat_map(|d| subjects.iter().map(move |s| format!("{d} {s}")))
            .collect();

        Self {
            combinations,
            used: HashSet::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the random source, e.g. with a seeded one for tests.
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Allocate an unused name.
    ///
    /// # Errors
    /// Returns [`NameError::Exhausted`] when every combination is in use.
    pub fn allocate(&mut self) -> Result<DisplayName, NameError> {
        let available: Vec<&DisplayName> = self
            .combinations
            .iter()
            .filter(|name| !self.used.contains(*name))
            .collect();

        let name = available
            .choose(&mut self.rng)
            .map(|name| (*name).clone())
            .ok_or(NameError::Exhausted {
                capacity: self.combinations.len(),
            })?;

        self.used.insert(name.clone());
        Ok(name)
    }

    /// Return a name to the pool.
    ///
    /// Returns `false` (and does nothing) if the name was not allocated,
    /// which covers double releases and synthetic guest names.
    pub fn release(&mut self, name: &str) -> bool {
        self.used.remove(name)
    }

    /// Number of names still available.
    #[must_use]
    pub fn remaining_count(&self) -> usize {
        self.combinations.len() - self.used.len()
    }

    /// Total size of the namespace.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.combinations.len()
    }

    /// Whether `name` is currently allocated.
    #[must_use]
    pub fn is_allocated(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Draw a synthetic `Guest#<n>` name with `n` in `0..limit`.
    ///
    /// Not tracked: it may collide with other guest names and releasing it
    /// is a no-op.
    pub fn guest_name(&mut self, limit: u32) -> DisplayName {
        let tag = self.rng.gen_range(0..limit.max(1));
        format!("{GUEST_PREFIX}{tag}")
    }
}

fn dedup<I>(words: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut seen = HashSet::new();
    words
        .into_iter()
        .map(Into::into)
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> NameAllocator {
        NameAllocator::new().with_rng(StdRng::seed_from_u64(42))
    }

    #[test]
    fn test_default_pool_size() {
        let names = seeded();
        assert_eq!(names.capacity(), 64);
        assert_eq!(names.remaining_count(), 64);
    }

    #[test]
    fn test_allocates_unique_names_until_exhausted() {
        let mut names = seeded();
        let mut issued = HashSet::new();

        while names.remaining_count() > 0 {
            let name = names.allocate().unwrap();
            assert!(issued.insert(name), "name issued twice");
        }

        assert_eq!(issued.len(), 64);
        assert_eq!(
            names.allocate(),
            Err(NameError::Exhausted { capacity: 64 })
        );
    }

    #[test]
    fn test_names_are_descriptor_then_subject() {
        let mut names = seeded();
        let name = names.allocate().unwrap();
        let (descriptor, subject) = name.split_once(' ').unwrap();
        assert!(DEFAULT_DESCRIPTORS.contains(&descriptor));
        assert!(DEFAULT_SUBJECTS.contains(&subject));
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut names = seeded();
        let name = names.allocate().unwrap();
        assert_eq!(names.remaining_count(), 63);

        assert!(names.release(&name));
        assert_eq!(names.remaining_count(), 64);

        assert!(!names.release(&name));
        assert_eq!(names.remaining_count(), 64);
    }

    #[test]
    fn test_is_allocated_follows_allocate_and_release() {
        let mut names = seeded();
        let name = names.allocate().unwrap();
        assert!(names.is_allocated(&name));

        names.release(&name);
        assert!(!names.is_allocated(&name));

        let guest = names.guest_name(10_000);
        assert!(!names.is_allocated(&guest));
    }

    #[test]
    fn test_release_ignores_foreign_names() {
        let mut names = seeded();
        names.allocate().unwrap();
        let guest = names.guest_name(10_000);

        assert!(guest.starts_with(GUEST_PREFIX));
        assert!(!names.release(&guest));
        assert!(!names.release("Mauve Axolotl"));
        assert_eq!(names.remaining_count(), 63);
    }

    #[test]
    fn test_released_name_is_reissued() {
        let mut names = NameAllocator::with_words(["Red"], ["Tiger", "Wolf"])
            .with_rng(StdRng::seed_from_u64(1));
        let first = names.allocate().unwrap();
        let second = names.allocate().unwrap();
        assert_ne!(first, second);
        assert!(names.allocate().is_err());

        names.release(&first);
        assert_eq!(names.allocate().unwrap(), first);
    }

    #[test]
    fn test_custom_words_are_deduplicated() {
        let names = NameAllocator::with_words(["Red", "Red", "Blue"], ["Owl", "Owl"]);
        assert_eq!(names.capacity(), 2);
    }

    #[test]
    fn test_empty_pool_is_exhausted() {
        let mut names = NameAllocator::with_words(Vec::<String>::new(), ["Owl"]);
        assert_eq!(names.allocate(), Err(NameError::Exhausted { capacity: 0 }));
    }

    #[test]
    fn test_guest_name_with_zero_limit() {
        let mut names = seeded();
        assert_eq!(names.guest_name(0), "Guest#0");
    }
}
