//! Relationship rows and the category lookup table.
//!
//! # Overview
//!
//! The data source delivers relationship rows in one of two layouts:
//!
//! - **Long**: one [`RelationshipRecord`] per `(source, target, weight?)` tie.
//! - **Wide**: one [`WideRow`] per origin with several destination columns
//!   (survey exports with `Destino.1 … Destino.N` columns).
//!   [`melt_wide_rows`] turns these into long records.
//!
//! [`normalize_records`] trims identifiers, drops rows without a usable
//! source or target, defaults missing weights to `1.0`, and rejects weights
//! that are negative or not finite. The resulting [`Relationship`] list is
//! what the graph builder consumes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, Result};

/// Weight assigned to rows that do not carry one.
pub const DEFAULT_WEIGHT: f64 = 1.0;

// ---------------------------------------------------------------------------
// Relationship rows
// ---------------------------------------------------------------------------

/// A validated directed tie: `source` funds or collaborates with `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

impl Relationship {
    /// Build a relationship with the default weight.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight: DEFAULT_WEIGHT,
        }
    }

    /// Build a relationship with an explicit weight.
    #[must_use]
    pub fn weighted(source: impl Into<String>, target: impl Into<String>, weight: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
        }
    }
}

/// A raw relationship row as delivered by the tabular data source.
///
/// Any field may be missing or null; see [`normalize_records`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    #[serde(default, alias = "origin")]
    pub source: Option<String>,
    #[serde(default, alias = "destination")]
    pub target: Option<String>,
    #[serde(default, alias = "count")]
    pub weight: Option<f64>,
}

impl RelationshipRecord {
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            target: Some(target.into()),
            weight: None,
        }
    }

    #[must_use]
    pub const fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// One origin with several destination columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WideRow {
    #[serde(default, alias = "origin")]
    pub source: Option<String>,
    #[serde(default)]
    pub destinations: Vec<Option<String>>,
}

/// Melt wide rows into long relationship records.
///
/// Each non-null destination yields one record with the row's source and no
/// explicit weight. Null destination cells are empty columns, not malformed
/// rows, so they produce nothing. A row whose source is null still emits its
/// records; normalization drops and counts them.
#[must_use]
pub fn melt_wide_rows(rows: &[WideRow]) -> Vec<RelationshipRecord> {
    rows.iter()
        .flat_map(|row| {
            row.destinations
                .iter()
                .flatten()
                .map(move |dest| RelationshipRecord {
                    source: row.source.clone(),
                    target: Some(dest.clone()),
                    weight: None,
                })
        })
        .collect()
}

/// Output of [`normalize_records`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRelationships {
    /// Valid relationships in input order.
    pub relationships: Vec<Relationship>,
    /// Rows discarded for a missing or blank source/target.
    pub dropped_rows: usize,
}

/// Trim identifiers, drop incomplete rows, and validate weights.
///
/// # Errors
///
/// Returns [`EngineError::InvalidWeight`] for the first complete row whose
/// weight is negative, NaN, or infinite. Rows that are dropped for a missing
/// endpoint are not weight-checked.
pub fn normalize_records(records: &[RelationshipRecord]) -> Result<NormalizedRelationships> {
    let mut relationships = Vec::with_capacity(records.len());
    let mut dropped_rows = 0usize;

    for (row, record) in records.iter().enumerate() {
        let (Some(source), Some(target)) = (
            clean_id(record.source.as_deref()),
            clean_id(record.target.as_deref()),
        ) else {
            debug!(row, "dropping relationship row without source or target");
            dropped_rows += 1;
            continue;
        };

        let weight = record.weight.unwrap_or(DEFAULT_WEIGHT);
        if !weight.is_finite() || weight < 0.0 {
            return Err(EngineError::InvalidWeight { row, weight });
        }

        relationships.push(Relationship {
            source,
            target,
            weight,
        });
    }

    Ok(NormalizedRelationships {
        relationships,
        dropped_rows,
    })
}

/// Trim an identifier; blank strings count as missing.
fn clean_id(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// Category lookup
// ---------------------------------------------------------------------------

/// One row of the node → category lookup table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    #[serde(default, alias = "organization")]
    pub id: Option<String>,
    #[serde(default, alias = "community")]
    pub category: Option<String>,
}

impl CategoryEntry {
    #[must_use]
    pub fn new(id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            category: Some(category.into()),
        }
    }
}

/// Node id → optional category label, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTable {
    ids: Vec<String>,
    labels: HashMap<String, Option<String>>,
    ignored_duplicates: usize,
}

impl CategoryTable {
    /// Build the table from raw entries.
    ///
    /// Entries without an id are skipped. For duplicate ids the first entry
    /// wins.
    #[must_use]
    pub fn from_entries(entries: &[CategoryEntry]) -> Self {
        let mut table = Self::default();
        for entry in entries {
            let Some(id) = clean_id(entry.id.as_deref()) else {
                continue;
            };
            if table.labels.contains_key(&id) {
                table.ignored_duplicates += 1;
                continue;
            }
            let label = clean_id(entry.category.as_deref());
            table.ids.push(id.clone());
            table.labels.insert(id, label);
        }

        if table.ignored_duplicates > 0 {
            warn!(
                ignored = table.ignored_duplicates,
                "category table has duplicate ids; keeping first occurrence"
            );
        }
        table
    }

    /// Category label for `id`, if the id is listed and labelled.
    #[must_use]
    pub fn category(&self, id: &str) -> Option<&str> {
        self.labels.get(id).and_then(Option::as_deref)
    }

    /// Whether `id` is listed, labelled or not.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.labels.contains_key(id)
    }

    /// Listed ids in first-seen order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of duplicate entries that were ignored.
    #[must_use]
    pub const fn ignored_duplicates(&self) -> usize {
        self.ignored_duplicates
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn missing_target_rows_are_dropped() {
        let records = vec![
            RelationshipRecord::new("A", "B"),
            RelationshipRecord {
                source: Some("A".into()),
                target: None,
                weight: Some(3.0),
            },
            RelationshipRecord {
                source: None,
                target: Some("C".into()),
                weight: None,
            },
        ];

        let norm = normalize_records(&records).expect("normalize");
        assert_eq!(norm.relationships, vec![Relationship::new("A", "B")]);
        assert_eq!(norm.dropped_rows, 2);
    }

    #[test]
    fn identifiers_are_trimmed_and_blank_is_missing() {
        let records = vec![
            RelationshipRecord::new("  Fundación X ", "\tRed Y\n"),
            RelationshipRecord::new("A", "   "),
        ];

        let norm = normalize_records(&records).expect("normalize");
        assert_eq!(norm.relationships.len(), 1);
        assert_eq!(norm.relationships[0].source, "Fundación X");
        assert_eq!(norm.relationships[0].target, "Red Y");
        assert_eq!(norm.dropped_rows, 1);
    }

    #[test]
    fn missing_weight_defaults_to_one() {
        let norm = normalize_records(&[RelationshipRecord::new("A", "B")]).expect("normalize");
        assert!((norm.relationships[0].weight - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_weight_is_accepted() {
        let norm = normalize_records(&[RelationshipRecord::new("A", "B").with_weight(0.0)])
            .expect("normalize");
        assert!(norm.relationships[0].weight.abs() < f64::EPSILON);
    }

    #[test]
    fn negative_weight_is_rejected_with_row_index() {
        let records = vec![
            RelationshipRecord::new("A", "B"),
            RelationshipRecord::new("B", "C").with_weight(-1.0),
        ];

        let err = normalize_records(&records).expect_err("negative weight must fail");
        match err {
            EngineError::InvalidWeight { row, weight } => {
                assert_eq!(row, 1);
                assert!((weight + 1.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn nan_weight_is_rejected() {
        let records = vec![RelationshipRecord::new("A", "B").with_weight(f64::NAN)];
        assert!(matches!(
            normalize_records(&records),
            Err(EngineError::InvalidWeight { row: 0, .. })
        ));
    }

    #[test]
    fn dropped_rows_skip_weight_validation() {
        let records = vec![RelationshipRecord {
            source: Some("A".into()),
            target: None,
            weight: Some(-5.0),
        }];
        let norm = normalize_records(&records).expect("incomplete row is dropped, not fatal");
        assert!(norm.relationships.is_empty());
        assert_eq!(norm.dropped_rows, 1);
    }

    #[test]
    fn empty_input_normalizes_to_empty() {
        let norm = normalize_records(&[]).expect("normalize");
        assert!(norm.relationships.is_empty());
        assert_eq!(norm.dropped_rows, 0);
    }

    #[test]
    fn melt_skips_null_destinations() {
        let rows = vec![WideRow {
            source: Some("Org A".into()),
            destinations: vec![Some("Org B".into()), None, Some("Org C".into()), None],
        }];

        let records = melt_wide_rows(&rows);
        assert_eq!(
            records,
            vec![
                RelationshipRecord::new("Org A", "Org B"),
                RelationshipRecord::new("Org A", "Org C"),
            ]
        );
    }

    #[test]
    fn melt_with_null_source_is_dropped_by_normalization() {
        let rows = vec![
            WideRow {
                source: None,
                destinations: vec![Some("B".into()), Some("C".into())],
            },
            WideRow {
                source: Some("A".into()),
                destinations: vec![Some("B".into())],
            },
        ];

        let norm = normalize_records(&melt_wide_rows(&rows)).expect("normalize");
        assert_eq!(norm.relationships, vec![Relationship::new("A", "B")]);
        assert_eq!(norm.dropped_rows, 2);
    }

    #[test]
    fn records_deserialize_with_aliases_and_nulls() {
        let json = r#"[
            {"source": "A", "target": "B", "weight": 2.5},
            {"origin": "A", "destination": "C"},
            {"source": "A", "target": null}
        ]"#;
        let records: Vec<RelationshipRecord> = serde_json::from_str(json).expect("parse");
        assert_eq!(records[0].weight, Some(2.5));
        assert_eq!(records[1].target.as_deref(), Some("C"));
        assert!(records[2].target.is_none());
    }

    #[test]
    fn category_table_first_entry_wins() {
        let table = CategoryTable::from_entries(&[
            CategoryEntry::new("A", "Comunidad A"),
            CategoryEntry::new(" A ", "Comunidad B"),
            CategoryEntry::new("B", "Comunidad B"),
            CategoryEntry {
                id: None,
                category: Some("orphan".into()),
            },
            CategoryEntry {
                id: Some("C".into()),
                category: None,
            },
        ]);

        assert_eq!(table.len(), 3);
        assert_eq!(table.category("A"), Some("Comunidad A"));
        assert_eq!(table.category("B"), Some("Comunidad B"));
        assert!(table.contains("C"));
        assert_eq!(table.category("C"), None);
        assert_eq!(table.ignored_duplicates(), 1);
        assert_eq!(table.ids().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }

    fn arb_id() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            Just(Some("   ".to_string())),
            "[a-e]{1,3}".prop_map(Some),
            " [a-e]{1,3} ".prop_map(Some),
        ]
    }

    proptest! {
        #[test]
        fn normalization_conserves_rows(
            rows in prop::collection::vec((arb_id(), arb_id(), 0.0f64..10.0), 0..40)
        ) {
            let records: Vec<RelationshipRecord> = rows
                .into_iter()
                .map(|(source, target, w)| RelationshipRecord { source, target, weight: Some(w) })
                .collect();

            let norm = normalize_records(&records).expect("valid weights");
            prop_assert_eq!(norm.relationships.len() + norm.dropped_rows, records.len());
            for rel in &norm.relationships {
                prop_assert!(!rel.source.is_empty());
                prop_assert_eq!(rel.source.trim(), rel.source.as_str());
                prop_assert_eq!(rel.target.trim(), rel.target.as_str());
            }
        }
    }
}
