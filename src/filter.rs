//! # Filter Engine
//!
//! Pure row-inclusion mask over the loaded dataset. A selection with empty
//! sets means "all values"; with no user input the engine is an identity
//! transform. Filtering never mutates the dataset; it produces a cheap
//! index view that the renderers and the export path share.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, Record};

/// User-selected filter state for the three categorical dimensions plus the
/// alerts toggle. Empty set = no restriction on that dimension.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub wards: BTreeSet<String>,
    #[serde(default)]
    pub waste_types: BTreeSet<String>,
    #[serde(default)]
    pub actors: BTreeSet<String>,
    #[serde(default)]
    pub alerts_only: bool,
}

impl FilterSelection {
    /// Apply the selection, producing a view over `dataset`.
    ///
    /// Pure in its inputs: the same selection over the same dataset always
    /// yields the same view. Unknown selected values simply match nothing.
    pub fn apply(&self, dataset: &Arc<Dataset>) -> FilteredView {
        let indices = dataset
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| self.keeps(r))
            .map(|(i, _)| i)
            .collect();
        FilteredView {
            dataset: Arc::clone(dataset),
            indices,
        }
    }

    fn keeps(&self, r: &Record) -> bool {
        (self.wards.is_empty() || self.wards.contains(&r.ward))
            && (self.waste_types.is_empty() || self.waste_types.contains(&r.waste_types))
            && (self.actors.is_empty() || self.actors.contains(&r.actors))
            && (!self.alerts_only || r.alert)
    }
}

/// The subset of records satisfying the current selection. Holds the dataset
/// by `Arc` plus retained row indices; discardable, no identity beyond the
/// current render cycle.
#[derive(Debug, Clone)]
pub struct FilteredView {
    dataset: Arc<Dataset>,
    indices: Vec<usize>,
}

impl FilteredView {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.indices.iter().map(|&i| &self.dataset.records[i])
    }

    /// Retained row indices into the underlying dataset, in table order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The four headline counters shown above the map.
    ///
    /// Blank ward and waste-type values stay out of the distinct counts,
    /// matching the blank exclusion in [`options`].
    pub fn summary(&self) -> Summary {
        let mut wards = HashSet::new();
        let mut waste_types = HashSet::new();
        let mut alerts = 0usize;
        for r in self.iter() {
            if !r.ward.trim().is_empty() {
                wards.insert(r.ward.as_str());
            }
            if !r.waste_types.trim().is_empty() {
                waste_types.insert(r.waste_types.as_str());
            }
            if r.alert {
                alerts += 1;
            }
        }
        Summary {
            dumpsites: self.len(),
            wards: wards.len(),
            waste_types: waste_types.len(),
            alerts,
        }
    }
}

/// Headline counters for the filtered view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub dumpsites: usize,
    pub wards: usize,
    pub waste_types: usize,
    pub alerts: usize,
}

/// Distinct values offered by the sidebar multi-selects.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub wards: Vec<String>,
    pub waste_types: Vec<String>,
    pub actors: Vec<String>,
}

/// Sorted distinct non-blank values per dimension, over the full table.
pub fn options(dataset: &Dataset) -> FilterOptions {
    FilterOptions {
        wards: distinct(dataset, |r| &r.ward),
        waste_types: distinct(dataset, |r| &r.waste_types),
        actors: distinct(dataset, |r| &r.actors),
    }
}

fn distinct<F>(dataset: &Dataset, field: F) -> Vec<String>
where
    F: Fn(&Record) -> &String,
{
    let set: BTreeSet<&str> = dataset
        .records
        .iter()
        .map(|r| field(r).as_str())
        .filter(|v| !v.trim().is_empty())
        .collect();
    set.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(name: &str, ward: &str, waste: &str, actor: &str, alert: bool) -> Record {
        Record {
            name: name.into(),
            ward: ward.into(),
            waste_types: waste.into(),
            actors: actor.into(),
            community_interventions: String::new(),
            reasons: String::new(),
            proposed_interventions: String::new(),
            photo_url: String::new(),
            latitude: 0.52,
            longitude: 35.28,
            waste_category: String::new(),
            alert,
            reasons_normalized: String::new(),
            interventions_normalized: String::new(),
        }
    }

    fn dataset() -> Arc<Dataset> {
        Arc::new(Dataset {
            path: PathBuf::from("test.csv"),
            records: vec![
                record("A", "Kapsoya", "Plastic", "County", true),
                record("B", "Langas", "Organic", "Community", false),
                record("C", "Kapsoya", "Organic", "County", false),
                record("D", "Huruma", "Mixed", "NGO", true),
            ],
        })
    }

    fn set(vals: &[&str]) -> BTreeSet<String> {
        vals.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_selection_is_identity() {
        let ds = dataset();
        let view = FilterSelection::default().apply(&ds);
        assert_eq!(view.len(), ds.records.len());
    }

    #[test]
    fn empty_dimension_equals_selecting_every_value() {
        let ds = dataset();
        let all_wards = FilterSelection {
            wards: set(&["Kapsoya", "Langas", "Huruma"]),
            ..Default::default()
        };
        let none = FilterSelection::default();
        assert_eq!(
            all_wards.apply(&ds).indices(),
            none.apply(&ds).indices()
        );
    }

    #[test]
    fn filter_returns_a_subset_and_is_idempotent() {
        let ds = dataset();
        let sel = FilterSelection {
            wards: set(&["Kapsoya"]),
            alerts_only: true,
            ..Default::default()
        };
        let a = sel.apply(&ds);
        let b = sel.apply(&ds);
        assert_eq!(a.indices(), b.indices());
        assert!(a.len() <= ds.records.len());
        for r in a.iter() {
            assert_eq!(r.ward, "Kapsoya");
            assert!(r.alert);
        }
    }

    #[test]
    fn alert_toggle_and_ward_selection_scenario() {
        // Kapsoya/Plastic/alert record: kept by alerts_only, excluded by Langas.
        let ds = dataset();
        let alerts = FilterSelection {
            alerts_only: true,
            ..Default::default()
        };
        let view = alerts.apply(&ds);
        let kept: Vec<&str> = view.iter().map(|r| r.name.as_str()).collect();
        assert!(kept.contains(&"A"));

        let langas = FilterSelection {
            wards: set(&["Langas"]),
            ..Default::default()
        };
        let view = langas.apply(&ds);
        let kept: Vec<&str> = view.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(kept, vec!["B"]);
    }

    #[test]
    fn unknown_values_match_nothing() {
        let ds = dataset();
        let sel = FilterSelection {
            wards: set(&["Nowhere"]),
            ..Default::default()
        };
        assert!(sel.apply(&ds).is_empty());
    }

    #[test]
    fn summary_counts_distinct_values_and_alerts() {
        let ds = dataset();
        let s = FilterSelection::default().apply(&ds).summary();
        assert_eq!(
            s,
            Summary {
                dumpsites: 4,
                wards: 3,
                waste_types: 3,
                alerts: 2,
            }
        );
    }

    #[test]
    fn summary_skips_blank_values_in_distinct_counts() {
        let ds = Arc::new(Dataset {
            path: PathBuf::from("test.csv"),
            records: vec![
                record("A", "Kapsoya", "Plastic", "County", true),
                record("B", "", " ", "NGO", true),
            ],
        });
        let s = FilterSelection::default().apply(&ds).summary();
        // the blank-valued record counts as a dumpsite and an alert,
        // but inflates neither distinct counter
        assert_eq!(
            s,
            Summary {
                dumpsites: 2,
                wards: 1,
                waste_types: 1,
                alerts: 2,
            }
        );
    }

    #[test]
    fn options_are_sorted_distinct_and_skip_blanks() {
        let mut ds = Dataset {
            path: PathBuf::from("test.csv"),
            records: vec![
                record("A", "Langas", "Plastic", "County", false),
                record("B", "Kapsoya", "Plastic", "", false),
            ],
        };
        ds.records.push(record("C", " ", "Organic", "NGO", false));
        let opts = options(&ds);
        assert_eq!(opts.wards, vec!["Kapsoya", "Langas"]);
        assert_eq!(opts.waste_types, vec!["Organic", "Plastic"]);
        assert_eq!(opts.actors, vec!["County", "NGO"]);
    }
}
