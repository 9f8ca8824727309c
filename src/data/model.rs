use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Column names – must match the survey export exactly (case-sensitive)
// ---------------------------------------------------------------------------

pub const SCHOOL_COLUMN: &str = "Skóli";
pub const YEAR_COLUMN: &str = "Ár";

/// Label of the "no restriction" entry in every demographic selector.
pub const ALL_LABEL: &str = "Allir";

pub const METRIC_COUNT: usize = 6;

// ---------------------------------------------------------------------------
// Metric – one of the six wellbeing scores
// ---------------------------------------------------------------------------

/// The six numeric wellbeing scores, in canonical column order.
///
/// The order of [`Metric::ALL`] is significant: it is the tie-break order
/// used when ranking metrics against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Wellbeing,
    Anxiety,
    Loneliness,
    ScreenTime,
    TeacherRelationship,
    SchoolSatisfaction,
}

impl Metric {
    pub const ALL: [Metric; METRIC_COUNT] = [
        Metric::Wellbeing,
        Metric::Anxiety,
        Metric::Loneliness,
        Metric::ScreenTime,
        Metric::TeacherRelationship,
        Metric::SchoolSatisfaction,
    ];

    /// Source column name.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Wellbeing => "Líðan",
            Metric::Anxiety => "Kvíði",
            Metric::Loneliness => "Einmanaleiki",
            Metric::ScreenTime => "Skjástund",
            Metric::TeacherRelationship => "Tengsl við kennara",
            Metric::SchoolSatisfaction => "Ánægja með skólann",
        }
    }

    /// Position in [`Metric::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// Demographic – optional categorical attributes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Demographic {
    Gender,
    Background,
    FinancialStatus,
    Grade,
}

impl Demographic {
    pub const ALL: [Demographic; 4] = [
        Demographic::Gender,
        Demographic::Background,
        Demographic::FinancialStatus,
        Demographic::Grade,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Demographic::Gender => "Kyn",
            Demographic::Background => "Bakgrunnur",
            Demographic::FinancialStatus => "Fjárhagsstaða",
            Demographic::Grade => "Bekkur",
        }
    }

    /// Selector label shown in the side panel.
    pub fn label(self) -> &'static str {
        match self {
            Demographic::Grade => "Árganga",
            other => other.column(),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// Record – one survey response
// ---------------------------------------------------------------------------

/// A single survey response (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub school: String,
    pub year: i32,
    /// Indexed by [`Demographic`]; `None` when the cell is blank or the
    /// column is absent.
    pub demographics: [Option<String>; 4],
    /// Indexed by [`Metric::index`]; `None` for missing values.
    pub metrics: [Option<f64>; METRIC_COUNT],
}

impl Record {
    pub fn new(school: impl Into<String>, year: i32) -> Self {
        Record {
            school: school.into(),
            year,
            demographics: Default::default(),
            metrics: [None; METRIC_COUNT],
        }
    }

    pub fn with_demographic(mut self, demographic: Demographic, value: impl Into<String>) -> Self {
        self.demographics[demographic.index()] = Some(value.into());
        self
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics[metric.index()]
    }

    pub fn demographic(&self, demographic: Demographic) -> Option<&str> {
        self.demographics[demographic.index()].as_deref()
    }
}

// ---------------------------------------------------------------------------
// SupportedFilters – schema capabilities detected at load time
// ---------------------------------------------------------------------------

/// Which demographic columns were present in the source header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupportedFilters([bool; 4]);

impl SupportedFilters {
    #[cfg(test)]
    pub fn all() -> Self {
        SupportedFilters([true; 4])
    }

    pub fn set(&mut self, demographic: Demographic, supported: bool) {
        self.0[demographic.index()] = supported;
    }

    pub fn supports(&self, demographic: Demographic) -> bool {
        self.0[demographic.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = Demographic> + '_ {
        Demographic::ALL.into_iter().filter(|d| self.supports(*d))
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded survey
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed selector values.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All responses, in file order.
    pub records: Vec<Record>,
    pub supported: SupportedFilters,
    /// Sorted distinct school names.
    pub schools: Vec<String>,
    /// Sorted distinct years.
    pub years: Vec<i32>,
    /// Distinct non-blank values for each supported demographic, in
    /// [`option_order`].
    pub options: BTreeMap<Demographic, Vec<String>>,
}

impl Dataset {
    /// Build selector indices from the loaded records.
    pub fn new(records: Vec<Record>, supported: SupportedFilters) -> Self {
        let mut schools: BTreeSet<String> = BTreeSet::new();
        let mut years: BTreeSet<i32> = BTreeSet::new();
        let mut distinct: BTreeMap<Demographic, BTreeSet<String>> =
            supported.iter().map(|d| (d, BTreeSet::new())).collect();

        for record in &records {
            schools.insert(record.school.clone());
            years.insert(record.year);
            for (demographic, values) in distinct.iter_mut() {
                if let Some(value) = record.demographic(*demographic) {
                    values.insert(value.to_string());
                }
            }
        }

        let options = distinct
            .into_iter()
            .map(|(demographic, values)| {
                let mut values: Vec<String> = values.into_iter().collect();
                values.sort_by(|a, b| option_order(a, b));
                (demographic, values)
            })
            .collect();

        Dataset {
            records,
            supported,
            schools: schools.into_iter().collect(),
            years: years.into_iter().collect(),
            options,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Selector order: integer values numerically (grade `5` before `10`), then
/// everything else alphabetically.
pub fn option_order(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_order_matches_index() {
        for (i, metric) in Metric::ALL.iter().enumerate() {
            assert_eq!(metric.index(), i);
        }
        assert_eq!(Metric::TeacherRelationship.to_string(), "Tengsl við kennara");
    }

    #[test]
    fn dataset_collects_sorted_selector_values() {
        let records = vec![
            Record::new("Holtaskóli", 2023).with_demographic(Demographic::Gender, "Stúlka"),
            Record::new("Akurskóli", 2021).with_demographic(Demographic::Gender, "Drengur"),
            Record::new("Holtaskóli", 2021),
        ];
        let mut supported = SupportedFilters::default();
        supported.set(Demographic::Gender, true);

        let ds = Dataset::new(records, supported);
        assert_eq!(ds.schools, vec!["Akurskóli", "Holtaskóli"]);
        assert_eq!(ds.years, vec![2021, 2023]);
        assert_eq!(ds.options.len(), 1);
        let genders: Vec<&str> = ds.options[&Demographic::Gender]
            .iter()
            .map(|s| s.as_str())
            .collect();
        assert_eq!(genders, vec!["Drengur", "Stúlka"]);
    }

    #[test]
    fn grades_sort_numerically() {
        let records = ["10", "5", "9", "Óþekkt", "5"]
            .into_iter()
            .map(|grade| Record::new("A", 2022).with_demographic(Demographic::Grade, grade))
            .collect();
        let mut supported = SupportedFilters::default();
        supported.set(Demographic::Grade, true);

        let ds = Dataset::new(records, supported);
        assert_eq!(ds.options[&Demographic::Grade], vec!["5", "9", "10", "Óþekkt"]);
    }

    #[test]
    fn grade_uses_cohort_label() {
        assert_eq!(Demographic::Grade.column(), "Bekkur");
        assert_eq!(Demographic::Grade.label(), "Árganga");
        assert_eq!(Demographic::Gender.label(), "Kyn");
    }
}
