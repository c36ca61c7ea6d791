//! Weighted random category selection.
//!
//! A weight table `{fast_enemy: 70, slow_enemy: 30}` behaves like a flattened
//! list holding each category `weight` times, from which one slot is drawn
//! uniformly. The list is never materialized: the selector keeps cumulative
//! weights and maps the drawn slot back to its category by binary search, so
//! memory does not grow with the weights.

use rand::Rng;

use crate::config::SpawnWeight;
use crate::entity::CategoryId;
use crate::error::SelectError;

/// Proportional random choice among categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightedSelector {
    categories: Vec<CategoryId>,
    /// `cumulative[i]` = sum of weights of entries `0..=i`.
    cumulative: Vec<u64>,
}

impl WeightedSelector {
    /// Build from a weight table. Zero weights are omitted.
    #[must_use]
    pub fn from_table(entries: &[SpawnWeight]) -> Self {
        let mut selector = Self::default();
        selector.rebuild(entries);
        selector
    }

    /// Replace the cached table after a config change.
    pub fn rebuild(&mut self, entries: &[SpawnWeight]) {
        self.categories.clear();
        self.cumulative.clear();
        let mut total = 0u64;
        for entry in entries.iter().filter(|e| e.weight > 0) {
            total += u64::from(entry.weight);
            self.categories.push(entry.category_id.clone());
            self.cumulative.push(total);
        }
    }

    /// Number of slots in the flattened table (sum of weights).
    #[must_use]
    pub fn len(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    /// True if there is nothing to pick.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Chance that [`WeightedSelector::select`] returns `category`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn probability(&self, category: &CategoryId) -> f64 {
        let total = self.len();
        if total == 0 {
            return 0.0;
        }
        let weight: u64 = self
            .categories
            .iter()
            .enumerate()
            .filter(|(_, c)| *c == category)
            .map(|(i, _)| self.weight_at(i))
            .sum();
        weight as f64 / total as f64
    }

    fn weight_at(&self, index: usize) -> u64 {
        let previous = if index == 0 { 0 } else { self.cumulative[index - 1] };
        self.cumulative[index] - previous
    }

    /// Category owning slot `slot` of the flattened table.
    fn category_at(&self, slot: u64) -> Option<&CategoryId> {
        let index = self.cumulative.partition_point(|&end| end <= slot);
        self.categories.get(index)
    }

    /// Draw one category.
    ///
    /// # Errors
    ///
    /// [`SelectError::NoCandidates`] if the table is empty.
    pub fn select<R: Rng>(&self, rng: &mut R) -> Result<&CategoryId, SelectError> {
        if self.is_empty() {
            return Err(SelectError::NoCandidates);
        }
        let slot = rng.gen_range(0..self.len());
        self.category_at(slot).ok_or(SelectError::NoCandidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn table() -> Vec<SpawnWeight> {
        vec![SpawnWeight::new("a", 70), SpawnWeight::new("b", 30)]
    }

    #[test]
    fn slots_map_to_categories_in_order() {
        let selector = WeightedSelector::from_table(&table());
        assert_eq!(selector.len(), 100);
        assert_eq!(selector.category_at(0).unwrap().as_str(), "a");
        assert_eq!(selector.category_at(69).unwrap().as_str(), "a");
        assert_eq!(selector.category_at(70).unwrap().as_str(), "b");
        assert_eq!(selector.category_at(99).unwrap().as_str(), "b");
        assert!(selector.category_at(100).is_none());
    }

    #[test]
    fn sampled_ratio_matches_weights() {
        let selector = WeightedSelector::from_table(&table());
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let a = CategoryId::new("a");

        let hits = (0..10_000)
            .filter(|_| selector.select(&mut rng).unwrap() == &a)
            .count();

        #[allow(clippy::cast_precision_loss)]
        let ratio = hits as f64 / 10_000.0;
        assert!((ratio - 0.70).abs() < 0.02, "ratio was {ratio}");
    }

    #[test]
    fn same_seed_same_sequence() {
        let selector = WeightedSelector::from_table(&table());
        let mut r1 = ChaCha8Rng::seed_from_u64(7);
        let mut r2 = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(selector.select(&mut r1), selector.select(&mut r2));
        }
    }

    #[test]
    fn empty_table_has_no_candidates() {
        let selector = WeightedSelector::from_table(&[]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(selector.select(&mut rng), Err(SelectError::NoCandidates));
    }

    #[test]
    fn zero_weights_are_omitted() {
        let selector =
            WeightedSelector::from_table(&[SpawnWeight::new("a", 0), SpawnWeight::new("b", 5)]);
        assert_eq!(selector.len(), 5);
        assert_eq!(selector.probability(&CategoryId::new("a")), 0.0);
        assert_eq!(selector.probability(&CategoryId::new("b")), 1.0);
    }

    #[test]
    fn duplicate_entries_add_up() {
        let selector = WeightedSelector::from_table(&[
            SpawnWeight::new("a", 1),
            SpawnWeight::new("b", 2),
            SpawnWeight::new("a", 1),
        ]);
        assert!((selector.probability(&CategoryId::new("a")) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn rebuild_replaces_table() {
        let mut selector = WeightedSelector::from_table(&table());
        selector.rebuild(&[SpawnWeight::new("c", 1)]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(selector.select(&mut rng).unwrap().as_str(), "c");
        assert_eq!(selector.probability(&CategoryId::new("a")), 0.0);
    }
}
