use std::collections::BTreeMap;
use std::fmt;

use super::model::{Dataset, Metric, Record, METRIC_COUNT};

// ---------------------------------------------------------------------------
// Means
// ---------------------------------------------------------------------------

/// One mean per metric; `None` where the group has no values for it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricMeans([Option<f64>; METRIC_COUNT]);

impl MetricMeans {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.0[metric.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, Option<f64>)> + '_ {
        Metric::ALL.into_iter().zip(self.0.iter().copied())
    }

    fn rounded(self) -> Self {
        MetricMeans(self.0.map(|v| v.map(round2)))
    }
}

/// Running sums over non-missing values.
#[derive(Debug, Clone, Default)]
struct MeanAccumulator {
    sums: [f64; METRIC_COUNT],
    counts: [usize; METRIC_COUNT],
}

impl MeanAccumulator {
    fn push(&mut self, record: &Record) {
        for metric in Metric::ALL {
            if let Some(v) = record.metric(metric) {
                self.sums[metric.index()] += v;
                self.counts[metric.index()] += 1;
            }
        }
    }

    fn finish(&self) -> MetricMeans {
        let mut means = [None; METRIC_COUNT];
        for (i, mean) in means.iter_mut().enumerate() {
            if self.counts[i] > 0 {
                *mean = Some(self.sums[i] / self.counts[i] as f64);
            }
        }
        MetricMeans(means)
    }
}

/// Round to 2 decimals, ties to even (`7.125` → `7.12`).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn group_by<'a, K: Ord>(
    records: impl IntoIterator<Item = &'a Record>,
    key: impl Fn(&Record) -> K,
) -> BTreeMap<K, MeanAccumulator> {
    let mut groups: BTreeMap<K, MeanAccumulator> = BTreeMap::new();
    for record in records {
        groups.entry(key(record)).or_default().push(record);
    }
    groups
}

/// Rows of `(group key, rounded means)` ordered by key.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedMeans<K> {
    pub rows: Vec<(K, MetricMeans)>,
}

impl<K: Ord> GroupedMeans<K> {
    fn from_groups(groups: BTreeMap<K, MeanAccumulator>) -> Self {
        GroupedMeans {
            rows: groups
                .into_iter()
                .map(|(key, acc)| (key, acc.finish().rounded()))
                .collect(),
        }
    }
}

#[cfg(test)]
impl<K: Ord> GroupedMeans<K> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, key: &K) -> Option<&MetricMeans> {
        self.rows.iter().find(|(k, _)| k == key).map(|(_, m)| m)
    }
}

// ---------------------------------------------------------------------------
// Yearly means of the filtered view
// ---------------------------------------------------------------------------

/// Per-year summary of the current selection.
#[derive(Debug, Clone, PartialEq)]
pub enum YearlyMeans {
    Table(GroupedMeans<i32>),
    /// The selection matched no rows.
    NoData,
}

pub fn yearly_means<'a>(records: impl IntoIterator<Item = &'a Record>) -> YearlyMeans {
    let groups = group_by(records, |r| r.year);
    if groups.is_empty() {
        YearlyMeans::NoData
    } else {
        YearlyMeans::Table(GroupedMeans::from_groups(groups))
    }
}

// ---------------------------------------------------------------------------
// Cross-school comparison (full dataset)
// ---------------------------------------------------------------------------

/// One row per school over every response, independent of the active filter.
pub fn school_comparison(dataset: &Dataset) -> GroupedMeans<String> {
    GroupedMeans::from_groups(group_by(&dataset.records, |r| r.school.clone()))
}

// ---------------------------------------------------------------------------
// Strengths and challenges (full dataset)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricScore {
    pub metric: Metric,
    pub value: f64,
}

impl fmt::Display for MetricScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.2}", self.metric, self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchoolRanking {
    pub school: String,
    /// Highest means, best first.
    pub strengths: Vec<MetricScore>,
    /// Lowest means among the remaining metrics, lowest first.
    pub challenges: Vec<MetricScore>,
}

/// Pick the `n` highest metrics, then the `n` lowest of the rest.
///
/// Ranking uses unrounded means; ties keep [`Metric::ALL`] order because both
/// sorts are stable. Metrics without a mean are left out, so the two lists
/// are always disjoint.
pub fn rank_metrics(means: &MetricMeans, n: usize) -> (Vec<MetricScore>, Vec<MetricScore>) {
    let mut candidates: Vec<MetricScore> = means
        .iter()
        .filter_map(|(metric, mean)| mean.map(|value| MetricScore { metric, value }))
        .collect();

    candidates.sort_by(|a, b| b.value.total_cmp(&a.value));
    let rest = candidates.split_off(n.min(candidates.len()));
    let strengths = candidates;

    let mut challenges = rest;
    challenges.sort_by(|a, b| {
        a.value
            .total_cmp(&b.value)
            .then(a.metric.index().cmp(&b.metric.index()))
    });
    challenges.truncate(n);

    let round = |scores: Vec<MetricScore>| -> Vec<MetricScore> {
        scores
            .into_iter()
            .map(|s| MetricScore {
                value: round2(s.value),
                ..s
            })
            .collect()
    };
    (round(strengths), round(challenges))
}

pub fn strengths_and_challenges(dataset: &Dataset, n: usize) -> Vec<SchoolRanking> {
    group_by(&dataset.records, |r| r.school.clone())
        .into_iter()
        .map(|(school, acc)| {
            let (strengths, challenges) = rank_metrics(&acc.finish(), n);
            SchoolRanking {
                school,
                strengths,
                challenges,
            }
        })
        .collect()
}

/// `"Líðan: 7.00, Kvíði: 3.10"`
pub fn format_scores(scores: &[MetricScore]) -> String {
    scores
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Trend series (full dataset)
// ---------------------------------------------------------------------------

/// Yearly means of one metric for one school, ascending by year.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    pub school: String,
    pub points: Vec<(i32, f64)>,
}

pub fn trend_series(dataset: &Dataset, metric: Metric) -> Vec<TrendSeries> {
    let groups = group_by(&dataset.records, |r| (r.school.clone(), r.year));

    let mut series: Vec<TrendSeries> = Vec::new();
    for ((school, year), acc) in groups {
        if series.last().map(|s| s.school != school).unwrap_or(true) {
            series.push(TrendSeries {
                school,
                points: Vec::new(),
            });
        }
        if let (Some(current), Some(mean)) = (series.last_mut(), acc.finish().get(metric)) {
            current.points.push((year, mean));
        }
    }
    series
}
