//! Rubric data model — the ordered set of criteria used to grade one
//! submission.

pub mod handlers;

use serde::{Deserialize, Serialize};

/// One named rubric dimension with a maximum point value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    /// Fraction 0–1. Submitted as a percentage; converted at the boundary.
    pub weight: f64,
    pub points_possible: f64,
    pub detailed_breakdown: String,
}

/// Append-only list of criteria plus a cached point total.
///
/// Invariant: `total_points_possible` equals the sum of every stored
/// criterion's `points_possible`, recomputed on every `add` and reset by
/// `clear`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rubric {
    criteria: Vec<Criterion>,
    total_points_possible: f64,
}

impl Rubric {
    pub fn add(&mut self, criterion: Criterion) {
        self.criteria.push(criterion);
        self.total_points_possible = self.criteria.iter().map(|c| c.points_possible).sum();
    }

    pub fn clear(&mut self) {
        self.criteria.clear();
        self.total_points_possible = 0.0;
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn total_points_possible(&self) -> f64 {
        self.total_points_possible
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criterion(name: &str, points: f64) -> Criterion {
        Criterion {
            name: name.to_string(),
            weight: 0.25,
            points_possible: points,
            detailed_breakdown: String::new(),
        }
    }

    #[test]
    fn test_total_tracks_sum_after_each_add() {
        let mut rubric = Rubric::default();
        assert_eq!(rubric.total_points_possible(), 0.0);

        rubric.add(criterion("Content", 10.0));
        assert_eq!(rubric.total_points_possible(), 10.0);

        rubric.add(criterion("Organization", 5.5));
        assert_eq!(rubric.total_points_possible(), 15.5);

        rubric.add(criterion("Grammar", 4.5));
        assert_eq!(rubric.total_points_possible(), 20.0);
    }

    #[test]
    fn test_clear_resets_list_and_total() {
        let mut rubric = Rubric::default();
        rubric.add(criterion("Content", 10.0));
        rubric.add(criterion("Grammar", 5.0));

        rubric.clear();
        assert!(rubric.is_empty());
        assert_eq!(rubric.criteria().len(), 0);
        assert_eq!(rubric.total_points_possible(), 0.0);
    }

    #[test]
    fn test_add_preserves_order() {
        let mut rubric = Rubric::default();
        rubric.add(criterion("First", 1.0));
        rubric.add(criterion("Second", 2.0));
        let names: Vec<&str> = rubric.criteria().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_add_after_clear_starts_fresh() {
        let mut rubric = Rubric::default();
        rubric.add(criterion("Old", 10.0));
        rubric.clear();
        rubric.add(criterion("New", 3.0));
        assert_eq!(rubric.total_points_possible(), 3.0);
        assert_eq!(rubric.criteria().len(), 1);
    }
}
