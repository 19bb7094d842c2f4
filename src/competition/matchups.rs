//! Matchup enumeration and balanced scheduling
//!
//! Matchups are drawn from the exhaustive list of k-combinations of the pool.
//! Each pass through the list starts with a fresh shuffle, so a request for at
//! most `C(n, k)` matchups never repeats a combination and repeats only appear
//! once every combination has been used.

use crate::types::{ContestantId, Matchup};
use rand::seq::SliceRandom;
use rand::Rng;

/// All k-combinations of `ids`, each preserving the order of `ids`
pub fn combinations(ids: &[ContestantId], k: usize) -> Vec<Matchup> {
    let n = ids.len();
    if k > n {
        return Vec::new();
    }

    let mut result = Vec::new();
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        result.push(indices.iter().map(|&i| ids[i].clone()).collect());

        // Rightmost index that can still advance
        let Some(pivot) = (0..k).rev().find(|&i| indices[i] < n - k + i) else {
            return result;
        };
        indices[pivot] += 1;
        for i in (pivot + 1)..k {
            indices[i] = indices[i - 1] + 1;
        }
    }
}

/// Draw `count` matchups from the exhaustive list, reshuffling at each pass start
pub fn schedule<R: Rng + ?Sized>(ideal: &mut [Matchup], count: usize, rng: &mut R) -> Vec<Matchup> {
    if ideal.is_empty() {
        return Vec::new();
    }

    let mut matchups = Vec::with_capacity(count);
    for n in 0..count {
        let index = n % ideal.len();
        if index == 0 {
            ideal.shuffle(rng);
        }
        matchups.push(ideal[index].clone());
    }
    matchups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::n_choose_k;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{BTreeSet, HashMap};

    fn ids(n: usize) -> Vec<ContestantId> {
        (0..n).map(|i| format!("c{}", i)).collect()
    }

    fn canonical(matchup: &Matchup) -> Vec<ContestantId> {
        let mut sorted = matchup.clone();
        sorted.sort();
        sorted
    }

    #[test]
    fn test_combinations_small() {
        let pool = ids(4);
        let pairs = combinations(&pool, 2);
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[0], vec!["c0".to_string(), "c1".to_string()]);
        assert_eq!(pairs[5], vec!["c2".to_string(), "c3".to_string()]);

        assert_eq!(combinations(&pool, 4).len(), 1);
        assert!(combinations(&pool, 5).is_empty());
        assert_eq!(combinations(&pool, 0), vec![Vec::<ContestantId>::new()]);
    }

    #[test]
    fn test_schedule_empty_list() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut ideal: Vec<Matchup> = Vec::new();
        assert!(schedule(&mut ideal, 5, &mut rng).is_empty());
    }

    #[test]
    fn test_schedule_wraps_with_fresh_passes() {
        let pool = ids(5);
        let mut ideal = combinations(&pool, 3);
        let mut rng = StdRng::seed_from_u64(42);

        let matchups = schedule(&mut ideal, 25, &mut rng);
        assert_eq!(matchups.len(), 25);

        // First pass covers all ten combinations, second pass too
        let first: BTreeSet<_> = matchups[..10].iter().map(canonical).collect();
        let second: BTreeSet<_> = matchups[10..20].iter().map(canonical).collect();
        assert_eq!(first.len(), 10);
        assert_eq!(second.len(), 10);
        let third: BTreeSet<_> = matchups[20..].iter().map(canonical).collect();
        assert_eq!(third.len(), 5);
    }

    proptest! {
        #[test]
        fn prop_combinations_count_and_uniqueness(n in 0usize..9, k in 0usize..5) {
            let pool = ids(n);
            let combos = combinations(&pool, k);
            prop_assert_eq!(combos.len() as u64, n_choose_k(n, k));

            let distinct: BTreeSet<_> = combos.iter().map(canonical).collect();
            prop_assert_eq!(distinct.len(), combos.len());
            for combo in &combos {
                let members: BTreeSet<_> = combo.iter().collect();
                prop_assert_eq!(members.len(), k);
            }
        }

        #[test]
        fn prop_schedule_is_balanced(n in 4usize..8, k in 2usize..4, passes in 1usize..4, seed in any::<u64>()) {
            let pool = ids(n);
            let mut ideal = combinations(&pool, k);
            let total = ideal.len();
            let mut rng = StdRng::seed_from_u64(seed);

            let matchups = schedule(&mut ideal, passes * total, &mut rng);
            let mut counts: HashMap<Vec<ContestantId>, usize> = HashMap::new();
            for matchup in &matchups {
                *counts.entry(canonical(matchup)).or_default() += 1;
            }

            prop_assert_eq!(counts.len(), total);
            prop_assert!(counts.values().all(|&c| c == passes));
        }
    }
}
