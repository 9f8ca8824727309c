use crate::data::aggregate::{
    school_comparison, strengths_and_challenges, trend_series, yearly_means, GroupedMeans,
    SchoolRanking, TrendSeries, YearlyMeans,
};
use crate::data::filter::{apply, FilterCriteria};
use crate::data::model::{Dataset, Metric};

// ---------------------------------------------------------------------------
// One recomputation pass per selection change
// ---------------------------------------------------------------------------

/// Everything the dashboard renders for one selection snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardViews {
    /// Rows passing the current filter.
    pub visible_rows: usize,
    /// Filtered detail view.
    pub yearly: YearlyMeans,
    /// Unfiltered baseline: per-school strengths and challenges.
    pub rankings: Vec<SchoolRanking>,
    /// Unfiltered baseline: one row per school.
    pub comparison: GroupedMeans<String>,
    /// Unfiltered baseline: `trend_metric` per school over the years.
    pub trend: Vec<TrendSeries>,
}

pub fn run(
    dataset: &Dataset,
    criteria: &FilterCriteria,
    trend_metric: Metric,
    ranking_size: usize,
) -> DashboardViews {
    let view = apply(dataset, criteria);
    let yearly = yearly_means(view.records());

    if view.is_empty() {
        log::warn!("No responses match {criteria:?}");
    }
    log::debug!(
        "Pipeline run: {} of {} rows visible, trend metric {trend_metric}",
        view.len(),
        dataset.len()
    );

    DashboardViews {
        visible_rows: view.len(),
        yearly,
        rankings: strengths_and_challenges(dataset, ranking_size),
        comparison: school_comparison(dataset),
        trend: trend_series(dataset, trend_metric),
    }
}
