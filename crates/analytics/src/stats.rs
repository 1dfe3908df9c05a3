//! Small numeric helpers shared by the scorers: percentile rank, median,
//! mean, and first-seen grouping.

use std::collections::HashMap;

/// Rank returned for any value when the reference set is empty.
pub const EMPTY_SET_RANK: f64 = 50.0;

/// Percentage of `values` strictly below `value`, rounded to an integer.
pub fn percentile_rank(values: &[f64], value: f64) -> f64 {
    if values.is_empty() {
        return EMPTY_SET_RANK;
    }
    let below = values.iter().filter(|v| **v < value).count();
    (below as f64 / values.len() as f64 * 100.0).round()
}

/// Sorted copy of a reference set, answering rank queries by binary search.
/// Same results as [`percentile_rank`] in O(log n) per query.
#[derive(Debug, Clone)]
pub struct PercentileIndex {
    sorted: Vec<f64>,
}

impl PercentileIndex {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let mut sorted: Vec<f64> = values.into_iter().collect();
        sorted.sort_by(f64::total_cmp);
        Self { sorted }
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    pub fn rank(&self, value: f64) -> f64 {
        if self.sorted.is_empty() {
            return EMPTY_SET_RANK;
        }
        let below = self.sorted.partition_point(|v| *v < value);
        (below as f64 / self.sorted.len() as f64 * 100.0).round()
    }
}

/// Upper median (element at `len / 2` after sorting); 0 for an empty set.
pub fn median(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sorted: Vec<f64> = values.into_iter().collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(f64::total_cmp);
    sorted[sorted.len() / 2]
}

/// Arithmetic mean; 0 for an empty set.
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Group items by a string key, keeping groups (and members) in first-seen
/// order. Items without a key are skipped.
pub fn group_in_order<'a, T, F>(items: &[&'a T], key: F) -> Vec<(String, Vec<&'a T>)>
where
    F: Fn(&T) -> Option<&str>,
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&'a T>)> = Vec::new();
    for item in items {
        let Some(k) = key(item).filter(|k| !k.is_empty()) else {
            continue;
        };
        match positions.get(k) {
            Some(&idx) => groups[idx].1.push(*item),
            None => {
                positions.insert(k.to_string(), groups.len());
                groups.push((k.to_string(), vec![*item]));
            }
        }
    }
    groups
}

/// Distinct keys in first-seen order.
pub fn distinct_in_order<'a, T: 'a, F>(items: impl IntoIterator<Item = &'a T>, key: F) -> Vec<String>
where
    F: Fn(&T) -> Option<&str>,
{
    let mut seen: Vec<String> = Vec::new();
    for item in items {
        if let Some(k) = key(item).filter(|k| !k.is_empty()) {
            if !seen.iter().any(|s| s == k) {
                seen.push(k.to_string());
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_ranks_fifty() {
        assert_eq!(percentile_rank(&[], 3.0), 50.0);
        assert_eq!(PercentileIndex::new(Vec::new()).rank(3.0), 50.0);
    }

    #[test]
    fn test_min_and_max_ranks() {
        let values = [4.0, 1.0, 3.0, 2.0, 5.0];
        assert_eq!(percentile_rank(&values, 1.0), 0.0);
        // max ranks 100 * (n - 1) / n
        assert_eq!(percentile_rank(&values, 5.0), 80.0);

        let three = [1.0, 2.0, 3.0];
        assert_eq!(percentile_rank(&three, 3.0), 67.0);
    }

    #[test]
    fn test_index_matches_naive_scan() {
        let values = vec![0.5, 2.0, 2.0, 7.25, -1.0, 3.0, 3.0, 3.0, 10.0];
        let index = PercentileIndex::new(values.clone());
        for value in [-2.0, -1.0, 0.5, 2.0, 2.5, 3.0, 7.25, 10.0, 11.0] {
            assert_eq!(index.rank(value), percentile_rank(&values, value), "value {value}");
        }
    }

    #[test]
    fn test_ties_do_not_count_as_below() {
        let values = [2.0, 2.0, 2.0];
        assert_eq!(percentile_rank(&values, 2.0), 0.0);
    }

    #[test]
    fn test_negated_zero_is_not_below_zero() {
        let index = PercentileIndex::new([-0.0, -1.0]);
        assert_eq!(index.rank(0.0), 50.0);
        assert_eq!(index.rank(-0.0), 50.0);
    }

    #[test]
    fn test_median_takes_upper_middle() {
        assert_eq!(median([3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median([4.0, 1.0, 3.0, 2.0]), 3.0);
        assert_eq!(median(Vec::new()), 0.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean([1.0, 2.0, 6.0]), 3.0);
        assert_eq!(mean(Vec::new()), 0.0);
    }

    #[test]
    fn test_group_in_order_keeps_first_seen_order() {
        let items = vec![("b", 1), ("a", 2), ("b", 3), ("", 4), ("c", 5)];
        let refs: Vec<&(&str, i32)> = items.iter().collect();
        let groups = group_in_order(&refs, |(k, _)| Some(*k));
        let keys: Vec<&str> = groups.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn test_distinct_in_order() {
        let items = vec![Some("x"), None, Some("y"), Some("x")];
        let keys = distinct_in_order(items.iter(), |v| *v);
        assert_eq!(keys, vec!["x", "y"]);
    }
}
