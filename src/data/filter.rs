use std::collections::{BTreeMap, BTreeSet};

use super::model::{Dataset, Demographic, Record, ALL_LABEL};

// ---------------------------------------------------------------------------
// Filter predicate: the current selector snapshot
// ---------------------------------------------------------------------------

/// Value chosen in a single-choice demographic selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// The "Allir" entry – no restriction.
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Map a selector label to a selection, treating the sentinel as [`Selection::All`].
    pub fn from_label(label: &str) -> Self {
        if label == ALL_LABEL {
            Selection::All
        } else {
            Selection::Only(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Selection::All => ALL_LABEL,
            Selection::Only(value) => value,
        }
    }
}

/// Conjunction of optional predicates.
///
/// * `school` – `None` means every school
/// * `years`  – `None` means every year; an empty set selects nothing
/// * `demographics` – a missing entry or [`Selection::All`] means no restriction
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterCriteria {
    pub school: Option<String>,
    pub years: Option<BTreeSet<i32>>,
    pub demographics: BTreeMap<Demographic, Selection>,
}

impl FilterCriteria {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// A single school over every year in the dataset, demographics left at "All".
    pub fn for_school(dataset: &Dataset, school: &str) -> Self {
        FilterCriteria {
            school: Some(school.to_string()),
            years: Some(dataset.years.iter().copied().collect()),
            demographics: BTreeMap::new(),
        }
    }

    pub fn selection(&self, demographic: Demographic) -> &Selection {
        static ALL: Selection = Selection::All;
        self.demographics.get(&demographic).unwrap_or(&ALL)
    }

    /// Whether `record` passes every predicate the dataset schema supports.
    pub fn matches(&self, dataset: &Dataset, record: &Record) -> bool {
        if let Some(school) = &self.school {
            if record.school != *school {
                return false;
            }
        }
        if let Some(years) = &self.years {
            if !years.contains(&record.year) {
                return false;
            }
        }
        self.demographics.iter().all(|(demographic, selection)| {
            match selection {
                Selection::All => true,
                // Column absent from the file: the filter does not apply.
                Selection::Only(_) if !dataset.supported.supports(*demographic) => true,
                Selection::Only(value) => record.demographic(*demographic) == Some(value.as_str()),
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Rows of a dataset that passed a [`FilterCriteria`], in file order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    #[cfg(test)]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the rows that pass all active filters.  An empty view is a valid
/// result, not an error.
pub fn apply<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> FilteredView<'a> {
    let indices = dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| criteria.matches(dataset, record))
        .map(|(i, _)| i)
        .collect();

    FilteredView { dataset, indices }
}
