use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::color::SeriesColors;
use crate::config::DashboardConfig;
use crate::data::filter::{FilterCriteria, Selection};
use crate::data::loader::DatasetCache;
use crate::data::model::{Dataset, Demographic, Metric};
use crate::pipeline::{self, DashboardViews};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded datasets, keyed by path.
    cache: DatasetCache,

    /// Dataset currently shown.
    pub dataset: Arc<Dataset>,
    pub dataset_path: PathBuf,

    /// Current selector snapshot.
    pub criteria: FilterCriteria,

    /// Metric plotted in the trend chart.
    pub trend_metric: Metric,

    /// Output of the last pipeline run for `criteria`.
    pub views: DashboardViews,

    pub series_colors: SeriesColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(
        config: DashboardConfig,
        cache: DatasetCache,
        dataset: Arc<Dataset>,
        dataset_path: PathBuf,
    ) -> Self {
        let criteria = default_criteria(&dataset);
        let trend_metric = Metric::Wellbeing;
        let views = pipeline::run(&dataset, &criteria, trend_metric, config.ranking_size);
        Self {
            series_colors: SeriesColors::new(&dataset.schools),
            config,
            cache,
            dataset,
            dataset_path,
            criteria,
            trend_metric,
            views,
            status_message: None,
        }
    }

    /// Switch to another dataset and reset every selector.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>, path: PathBuf) {
        self.criteria = default_criteria(&dataset);
        self.series_colors = SeriesColors::new(&dataset.schools);
        self.dataset = dataset;
        self.dataset_path = path;
        self.status_message = None;
        self.refresh();
    }

    /// Load `path` through the cache.  On failure the current dataset stays.
    pub fn open_path(&mut self, path: &Path) {
        match self.cache.get_or_load(path) {
            Ok(dataset) => self.set_dataset(dataset, path.to_path_buf()),
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Villa: {e}"));
            }
        }
    }

    /// Re-run the pipeline after a selection change.
    pub fn refresh(&mut self) {
        self.views = pipeline::run(
            &self.dataset,
            &self.criteria,
            self.trend_metric,
            self.config.ranking_size,
        );
    }

    pub fn selected_school(&self) -> &str {
        self.criteria.school.as_deref().unwrap_or_default()
    }

    pub fn select_school(&mut self, school: &str) {
        if self.criteria.school.as_deref() != Some(school) {
            self.criteria.school = Some(school.to_string());
            self.refresh();
        }
    }

    pub fn is_year_selected(&self, year: i32) -> bool {
        self.criteria
            .years
            .as_ref()
            .map(|years| years.contains(&year))
            .unwrap_or(true)
    }

    pub fn toggle_year(&mut self, year: i32) {
        let all_years = &self.dataset.years;
        let years = self
            .criteria
            .years
            .get_or_insert_with(|| all_years.iter().copied().collect());
        if !years.remove(&year) {
            years.insert(year);
        }
        self.refresh();
    }

    pub fn select_all_years(&mut self) {
        self.criteria.years = Some(self.dataset.years.iter().copied().collect());
        self.refresh();
    }

    pub fn select_no_years(&mut self) {
        self.criteria.years = Some(BTreeSet::new());
        self.refresh();
    }

    pub fn set_demographic(&mut self, demographic: Demographic, selection: Selection) {
        if self.criteria.selection(demographic) != &selection {
            self.criteria.demographics.insert(demographic, selection);
            self.refresh();
        }
    }

    pub fn set_trend_metric(&mut self, metric: Metric) {
        if self.trend_metric != metric {
            self.trend_metric = metric;
            self.refresh();
        }
    }
}

/// First school alphabetically, every year, no demographic restriction.
fn default_criteria(dataset: &Dataset) -> FilterCriteria {
    match dataset.schools.first() {
        Some(school) => FilterCriteria::for_school(dataset, school),
        None => FilterCriteria::unrestricted(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::aggregate::YearlyMeans;
    use crate::data::loader::parse_delimited;

    const SURVEY: &str = "\
Skóli,Ár,Kyn,Líðan,Kvíði,Einmanaleiki,Skjástund,Tengsl við kennara,Ánægja með skólann
Holtaskóli,2021,Stúlka,7,3,2,5,8,7
Akurskóli,2021,Drengur,9,4,3,6,7,6
Akurskóli,2022,Stúlka,5,5,4,7,6,5";

    fn state() -> AppState {
        let dataset = Arc::new(parse_delimited(SURVEY, None).unwrap());
        AppState::new(
            DashboardConfig::default(),
            DatasetCache::default(),
            dataset,
            PathBuf::from("survey.csv"),
        )
    }

    #[test]
    fn starts_on_first_school_with_every_year() {
        let state = state();
        assert_eq!(state.selected_school(), "Akurskóli");
        assert!(state.is_year_selected(2021));
        assert!(state.is_year_selected(2022));
        assert_eq!(state.views.visible_rows, 2);
    }

    #[test]
    fn selector_changes_rerun_the_pipeline() {
        let mut state = state();

        state.toggle_year(2021);
        assert!(!state.is_year_selected(2021));
        assert_eq!(state.views.visible_rows, 1);

        state.set_demographic(Demographic::Gender, Selection::Only("Drengur".into()));
        assert_eq!(state.views.yearly, YearlyMeans::NoData);

        state.set_demographic(Demographic::Gender, Selection::All);
        state.select_all_years();
        assert_eq!(state.views.visible_rows, 2);

        state.select_no_years();
        assert_eq!(state.views.visible_rows, 0);

        state.select_school("Holtaskóli");
        state.select_all_years();
        assert_eq!(state.views.visible_rows, 1);
    }

    #[test]
    fn trend_metric_switch_updates_series() {
        let mut state = state();
        state.set_trend_metric(Metric::Anxiety);
        assert_eq!(state.views.trend[0].points, vec![(2021, 4.0), (2022, 5.0)]);
    }

    #[test]
    fn failed_open_keeps_current_dataset() {
        let mut state = state();
        let before = Arc::clone(&state.dataset);
        state.open_path(Path::new("does-not-exist.csv"));
        assert!(Arc::ptr_eq(&before, &state.dataset));
        assert!(state.status_message.is_some());
    }

    #[test]
    fn open_switches_dataset_and_resets_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            "Skóli,Ár,Líðan,Kvíði,Einmanaleiki,Skjástund,Tengsl við kennara,Ánægja með skólann\n\
             Stapaskóli,2024,6,4,3,6,7,6\n"
        )
        .unwrap();
        drop(file);

        let mut state = state();
        state.select_no_years();
        state.open_path(&path);

        assert_eq!(state.selected_school(), "Stapaskóli");
        assert_eq!(state.views.visible_rows, 1);
        assert_eq!(state.dataset_path, path);
        assert!(state.status_message.is_none());
    }
}
