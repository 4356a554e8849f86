use crate::registry::Registry;
use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProgress {
    pub total: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourProgress {
    pub total_tours: usize,
    pub completed_tours: usize,
    /// 0–100, rounded half away from zero.
    pub percentage: u32,
    /// Always carries every category, including empty ones.
    pub by_category: BTreeMap<Category, CategoryProgress>,
}

/// Completion read-model over a registry. Completed ids that are not in the
/// registry (retired tours) are ignored, so they never inflate the count.
pub fn compute_progress(registry: &Registry, completed_tour_ids: &[String]) -> TourProgress {
    let completed: HashSet<&str> = completed_tour_ids.iter().map(String::as_str).collect();

    let mut by_category: BTreeMap<Category, CategoryProgress> = Category::all()
        .iter()
        .map(|&c| (c, CategoryProgress::default()))
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut total_tours = 0;
    let mut completed_tours = 0;
    for tour in registry.iter() {
        if !seen.insert(tour.id.as_str()) {
            continue;
        }
        total_tours += 1;
        let entry = by_category.entry(tour.category).or_default();
        entry.total += 1;
        if completed.contains(tour.id.as_str()) {
            completed_tours += 1;
            entry.completed += 1;
        }
    }

    let percentage = if total_tours == 0 {
        0
    } else {
        (100.0 * completed_tours as f64 / total_tours as f64).round() as u32
    };

    TourProgress {
        total_tours,
        completed_tours,
        percentage,
        by_category,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TourDefinition;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn half_complete_across_categories() {
        let registry = Registry::new(vec![
            TourDefinition::new("a", Category::Operations),
            TourDefinition::new("b", Category::Management),
        ]);
        let p = compute_progress(&registry, &ids(&["a"]));
        assert_eq!(p.total_tours, 2);
        assert_eq!(p.completed_tours, 1);
        assert_eq!(p.percentage, 50);
        assert_eq!(
            p.by_category[&Category::Operations],
            CategoryProgress {
                total: 1,
                completed: 1
            }
        );
        assert_eq!(
            p.by_category[&Category::Management],
            CategoryProgress {
                total: 1,
                completed: 0
            }
        );
        assert_eq!(
            p.by_category[&Category::Administration],
            CategoryProgress::default()
        );
    }

    #[test]
    fn empty_registry_is_zero_percent() {
        let p = compute_progress(&Registry::default(), &ids(&["ghost"]));
        assert_eq!(p.total_tours, 0);
        assert_eq!(p.completed_tours, 0);
        assert_eq!(p.percentage, 0);
        assert_eq!(p.by_category.len(), 3);
    }

    #[test]
    fn retired_ids_do_not_count() {
        let registry = Registry::new(vec![TourDefinition::new("a", Category::Operations)]);
        let p = compute_progress(&registry, &ids(&["retired", "also-retired"]));
        assert_eq!(p.completed_tours, 0);
        assert_eq!(p.percentage, 0);
    }

    #[test]
    fn percentage_rounds() {
        let registry = Registry::new(vec![
            TourDefinition::new("a", Category::Operations),
            TourDefinition::new("b", Category::Operations),
            TourDefinition::new("c", Category::Administration),
        ]);
        assert_eq!(compute_progress(&registry, &ids(&["a"])).percentage, 33);
        assert_eq!(compute_progress(&registry, &ids(&["a", "c"])).percentage, 67);
        assert_eq!(
            compute_progress(&registry, &ids(&["a", "b", "c"])).percentage,
            100
        );
    }

    #[test]
    fn json_shape() {
        let registry = Registry::new(vec![TourDefinition::new("a", Category::Operations)]);
        let json = serde_json::to_value(compute_progress(&registry, &ids(&["a"]))).unwrap();
        assert_eq!(json["total_tours"], 1);
        assert_eq!(json["by_category"]["operations"]["completed"], 1);
        assert_eq!(json["by_category"]["administration"]["total"], 0);
    }

    #[test]
    fn duplicate_ids_count_once_under_first_category() {
        let registry = Registry::new(vec![
            TourDefinition::new("a", Category::Operations),
            TourDefinition::new("a", Category::Management),
            TourDefinition::new("b", Category::Management),
        ]);
        let p = compute_progress(&registry, &ids(&["a"]));
        assert_eq!(p.total_tours, 2);
        assert_eq!(p.completed_tours, 1);
        assert_eq!(p.percentage, 50);
        assert_eq!(
            p.by_category[&Category::Operations],
            CategoryProgress {
                total: 1,
                completed: 1
            }
        );
        assert_eq!(
            p.by_category[&Category::Management],
            CategoryProgress {
                total: 1,
                completed: 0
            }
        );
    }
}
