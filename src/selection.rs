//! Coin selection over a snapshot of unspent outputs
//!
//! Selection is a pure function of its inputs. Candidates are ordered with a
//! stable ascending sort by value, so equal values keep their original
//! relative order and results are deterministic.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::point::{PointValue, PointsValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionAlgorithm {
    /// Smallest single sufficient output, else the shortest ascending prefix
    #[default]
    Greedy,
    /// Every output that covers the minimum on its own
    Individual,
}

/// Select outputs covering `minimum_value`.
///
/// An unsatisfiable request returns an empty set. A zero minimum is satisfied
/// by the empty set.
pub fn select_outputs(
    unspent: &PointsValue,
    minimum_value: u64,
    algorithm: SelectionAlgorithm,
) -> PointsValue {
    if minimum_value == 0 || unspent.is_empty() {
        return PointsValue::new();
    }

    let selected = match algorithm {
        SelectionAlgorithm::Greedy => select_greedy(unspent, minimum_value),
        SelectionAlgorithm::Individual => select_individual(unspent, minimum_value),
    };

    debug!(
        ?algorithm,
        candidates = unspent.len(),
        minimum_value,
        selected = selected.len(),
        "coin selection finished"
    );

    selected
}

fn sorted_ascending(unspent: &PointsValue) -> Vec<PointValue> {
    let mut candidates = unspent.points.clone();
    // sort_by_key is stable
    candidates.sort_by_key(|point| point.value);
    candidates
}

fn select_greedy(unspent: &PointsValue, minimum_value: u64) -> PointsValue {
    let candidates = sorted_ascending(unspent);

    if let Some(single) = candidates.iter().find(|point| point.value >= minimum_value) {
        return PointsValue::from(vec![*single]);
    }

    let mut selected = Vec::new();
    let mut sum = 0u64;
    for candidate in candidates {
        sum = sum.saturating_add(candidate.value);
        selected.push(candidate);
        if sum >= minimum_value {
            return PointsValue::from(selected);
        }
    }

    PointsValue::new()
}

fn select_individual(unspent: &PointsValue, minimum_value: u64) -> PointsValue {
    sorted_ascending(unspent)
        .into_iter()
        .filter(|point| point.value >= minimum_value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point;

    fn points(values: &[u64]) -> PointsValue {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| PointValue::new(Point::new([i as u8; 32], i as u32), value))
            .collect()
    }

    fn values(points: &PointsValue) -> Vec<u64> {
        points.iter().map(|p| p.value).collect()
    }

    #[test]
    fn test_greedy_single_smallest_sufficient() {
        let selected = select_outputs(&points(&[10, 25, 40]), 25, SelectionAlgorithm::Greedy);
        assert_eq!(values(&selected), vec![25]);
    }

    #[test]
    fn test_greedy_accumulates_ascending() {
        let selected = select_outputs(&points(&[5, 10, 8]), 20, SelectionAlgorithm::Greedy);
        assert_eq!(values(&selected), vec![5, 8, 10]);
        assert_eq!(selected.total(), Ok(23));
    }

    #[test]
    fn test_greedy_stops_at_minimum() {
        let selected = select_outputs(&points(&[1, 2, 3, 4]), 3, SelectionAlgorithm::Greedy);
        assert_eq!(values(&selected), vec![3]);

        let selected = select_outputs(&points(&[1, 1, 1, 1]), 3, SelectionAlgorithm::Greedy);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_greedy_insufficient_is_empty() {
        let selected = select_outputs(&points(&[1, 2]), 10, SelectionAlgorithm::Greedy);
        assert!(selected.is_empty());
    }

    #[test]
    fn test_greedy_stable_on_ties() {
        let unspent = points(&[30, 30, 30]);
        let selected = select_outputs(&unspent, 25, SelectionAlgorithm::Greedy);
        assert_eq!(selected.points, vec![unspent.points[0]]);
    }

    #[test]
    fn test_greedy_saturates() {
        let selected = select_outputs(
            &points(&[u64::MAX - 1, u64::MAX - 1]),
            u64::MAX,
            SelectionAlgorithm::Greedy,
        );
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_individual_all_sufficient() {
        let selected =
            select_outputs(&points(&[10, 25, 40]), 25, SelectionAlgorithm::Individual);
        assert_eq!(values(&selected), vec![25, 40]);

        let selected = select_outputs(&points(&[40, 10, 25]), 25, SelectionAlgorithm::Individual);
        assert_eq!(values(&selected), vec![25, 40]);
    }

    #[test]
    fn test_zero_minimum_is_empty() {
        for algorithm in [SelectionAlgorithm::Greedy, SelectionAlgorithm::Individual] {
            assert!(select_outputs(&points(&[1, 2]), 0, algorithm).is_empty());
        }
    }
}
