//! Week-over-week / day-over-day statistics and the light forecasting model

use crate::series::{Series, SeriesSource};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Percent change of `delta` relative to `base`; 0 when the base is 0
fn pct_change(delta: f64, base: f64) -> f64 {
    if base == 0.0 { 0.0 } else { delta / base * 100.0 }
}

/// Latest reading compared with the one before it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub date: NaiveDate,
    pub value: Option<f64>,
    pub previous: Option<(NaiveDate, f64)>,
    pub delta: f64,
    pub pct: f64,
    pub label: String,
    pub series_id: String,
}

impl SeriesStats {
    /// Stats for the two most recent observations; `None` for an empty series
    ///
    /// A gap in either observation yields delta and pct of 0.
    pub fn latest(series: &Series) -> Option<Self> {
        let n = series.observations.len();
        let last = series.observations.last()?;
        let previous = n
            .checked_sub(2)
            .and_then(|i| series.observations.get(i))
            .and_then(|o| o.value.map(|v| (o.date, v)));

        let (delta, pct) = match (last.value, previous) {
            (Some(value), Some((_, prev))) => {
                let delta = value - prev;
                (delta, pct_change(delta, prev))
            }
            _ => (0.0, 0.0),
        };

        Some(Self {
            date: last.date,
            value: last.value,
            previous,
            delta,
            pct,
            label: series.label.clone(),
            series_id: series.id.clone(),
        })
    }
}

/// Direction label for a percent move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Alta,
    Queda,
    Estabilidade,
}

impl Trend {
    pub const DEFAULT_THRESHOLD: f64 = 1.0;

    /// `Alta` at or above `threshold`, `Queda` at or below `-threshold`
    pub fn classify(pct: f64, threshold: f64) -> Self {
        if pct >= threshold {
            Trend::Alta
        } else if pct <= -threshold {
            Trend::Queda
        } else {
            Trend::Estabilidade
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Trend::Alta => "alta",
            Trend::Queda => "queda",
            Trend::Estabilidade => "estabilidade",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything the daily context block says about a price series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub series_id: String,
    pub source: SeriesSource,
    pub latest: (NaiveDate, f64),
    pub previous: Option<(NaiveDate, f64)>,
    pub delta: f64,
    pub pct: f64,
    pub min: f64,
    pub max: f64,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub count: usize,
}

impl PriceSummary {
    /// Summary over the valued observations; `None` when there are none
    pub fn from_series(series: &Series) -> Option<Self> {
        let values: Vec<(NaiveDate, f64)> = series.valued().collect();
        let latest = *values.last()?;
        let previous = values.len().checked_sub(2).map(|i| values[i]);

        let (delta, pct) = previous.map_or((0.0, 0.0), |(_, prev)| {
            let delta = latest.1 - prev;
            (delta, pct_change(delta, prev))
        });

        let min = values.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
        let max = values.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            series_id: series.id.clone(),
            source: series.source,
            latest,
            previous,
            delta,
            pct,
            min,
            max,
            first_date: values[0].0,
            last_date: latest.0,
            count: values.len(),
        })
    }

    pub fn trend(&self, threshold: f64) -> Trend {
        Trend::classify(self.pct, threshold)
    }
}

/// Change between the latest value and one `periods` observations earlier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowChange {
    pub base_date: NaiveDate,
    pub delta: f64,
    pub pct: f64,
}

/// Compare the last valued observation with the one `periods` steps back
///
/// Needs at least `periods + 1` valued observations.
pub fn trend_over(series: &Series, periods: usize) -> Option<WindowChange> {
    let values: Vec<(NaiveDate, f64)> = series.valued().collect();
    if periods == 0 || values.len() < periods + 1 {
        return None;
    }

    let (_, last) = values[values.len() - 1];
    let (base_date, base) = values[values.len() - 1 - periods];
    let delta = last - base;

    Some(WindowChange {
        base_date,
        delta,
        pct: pct_change(delta, base),
    })
}

/// Four-week crude trend used by the weekly summary
pub fn crude_4w_trend(series: &Series) -> Option<WindowChange> {
    trend_over(series, 4)
}

/// First differences over the last `max_weeks + 1` observations
///
/// Differences touching a gap are dropped.
pub fn weekly_changes(series: &Series, max_weeks: usize) -> Vec<f64> {
    let obs = &series.observations;
    let tail = &obs[obs.len().saturating_sub(max_weeks + 1)..];

    tail.windows(2)
        .filter_map(|w| match (w[0].value, w[1].value) {
            (Some(a), Some(b)) => Some(b - a),
            _ => None,
        })
        .collect()
}

/// Z-score of the latest weekly change plus a straight-line projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangeOutlook {
    pub zscore: f64,
    pub is_outlier: bool,
    pub slope: f64,
    pub intercept: f64,
    pub forecast_4w: f64,
    pub last_change: f64,
}

impl ChangeOutlook {
    pub const MIN_CHANGES: usize = 8;
    pub const OUTLIER_Z: f64 = 2.0;

    /// Fit the outlook; `None` with fewer than eight changes
    pub fn from_changes(changes: &[f64]) -> Option<Self> {
        let n = changes.len();
        if n < Self::MIN_CHANGES {
            return None;
        }

        let nf = n as f64;
        let last_change = changes[n - 1];
        let mean = changes.iter().sum::<f64>() / nf;

        // sample standard deviation
        let variance = changes.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / (nf - 1.0);
        let std = variance.sqrt();
        let zscore = if std > 0.0 && std.is_finite() {
            (last_change - mean) / std
        } else {
            0.0
        };

        // least squares over (index, change)
        let x_mean = (nf - 1.0) / 2.0;
        let (mut sxy, mut sxx) = (0.0, 0.0);
        for (i, c) in changes.iter().enumerate() {
            let dx = i as f64 - x_mean;
            sxy += dx * (c - mean);
            sxx += dx * dx;
        }
        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        let intercept = mean - slope * x_mean;

        let forecast_4w = (n..n + 4).map(|i| slope * i as f64 + intercept).sum();

        Some(Self {
            zscore,
            is_outlier: zscore.abs() >= Self::OUTLIER_Z,
            slope,
            intercept,
            forecast_4w,
            last_change,
        })
    }

    /// Outlook over the last 60 weekly changes of `series`
    pub fn for_series(series: &Series) -> Option<Self> {
        Self::from_changes(&weekly_changes(series, 60))
    }
}

/// Mean value per ISO week over the five calendar years before `year`
///
/// Only years present in the data contribute.
pub fn five_year_weekly_average(series: &Series, year: i32) -> BTreeMap<u32, f64> {
    let mut sums: BTreeMap<u32, (f64, usize)> = BTreeMap::new();

    for (date, value) in series.valued() {
        if (year - 5..year).contains(&date.year()) {
            let entry = sums.entry(date.iso_week().week()).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(week, (sum, count))| (week, sum / count as f64))
        .collect()
}

/// Five-year average for the ISO week of `date`
pub fn seasonal_average_for(series: &Series, date: NaiveDate) -> Option<f64> {
    five_year_weekly_average(series, date.year())
        .get(&date.iso_week().week())
        .copied()
}

/// One row of the "current year vs five-year average" comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub five_year_avg: Option<f64>,
}

/// Current-year readings next to the five-year average of their week
pub fn seasonal_comparison(series: &Series) -> Vec<SeasonalPoint> {
    let Some(year) = series.valued().map(|(d, _)| d.year()).max() else {
        return Vec::new();
    };
    let averages = five_year_weekly_average(series, year);

    series
        .valued()
        .filter(|(d, _)| d.year() == year)
        .map(|(date, value)| SeasonalPoint {
            date,
            value,
            five_year_avg: averages.get(&date.iso_week().week()).copied(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Observation;
    use chrono::Duration;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekly(start: NaiveDate, values: &[Option<f64>]) -> Series {
        let obs = values
            .iter()
            .enumerate()
            .map(|(i, v)| Observation::new(start + Duration::weeks(i as i64), *v))
            .collect();
        Series::new("PET.WCESTUS1.W", "Crude", SeriesSource::Eia, obs)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_latest_stats() {
        let s = weekly(day(2025, 1, 3), &[Some(400.0), Some(404.0)]);
        let stats = SeriesStats::latest(&s).unwrap();
        assert_eq!(stats.value, Some(404.0));
        assert!(approx(stats.delta, 4.0));
        assert!(approx(stats.pct, 1.0));
        assert_eq!(stats.previous, Some((day(2025, 1, 3), 400.0)));
        assert_eq!(stats.series_id, "PET.WCESTUS1.W");
    }

    #[test]
    fn test_latest_stats_edge_cases() {
        let empty = weekly(day(2025, 1, 3), &[]);
        assert!(SeriesStats::latest(&empty).is_none());

        let single = weekly(day(2025, 1, 3), &[Some(10.0)]);
        let stats = SeriesStats::latest(&single).unwrap();
        assert!(approx(stats.delta, 0.0) && approx(stats.pct, 0.0));

        let gap = weekly(day(2025, 1, 3), &[None, Some(10.0)]);
        assert!(approx(SeriesStats::latest(&gap).unwrap().delta, 0.0));

        let zero = weekly(day(2025, 1, 3), &[Some(0.0), Some(5.0)]);
        let stats = SeriesStats::latest(&zero).unwrap();
        assert!(approx(stats.delta, 5.0) && approx(stats.pct, 0.0));
    }

    #[test]
    fn test_trend_classification() {
        assert_eq!(Trend::classify(1.0, 1.0), Trend::Alta);
        assert_eq!(Trend::classify(-1.0, 1.0), Trend::Queda);
        assert_eq!(Trend::classify(0.99, 1.0), Trend::Estabilidade);
        assert_eq!(Trend::Queda.to_string(), "queda");
    }

    #[test]
    fn test_price_summary_ignores_gaps() {
        let s = weekly(day(2025, 1, 3), &[Some(2.0), Some(3.0), None, Some(2.5)]);
        let summary = PriceSummary::from_series(&s).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.previous.unwrap().1, 3.0);
        assert!(approx(summary.delta, -0.5));
        assert!(approx(summary.min, 2.0) && approx(summary.max, 3.0));
        assert_eq!(summary.trend(1.0), Trend::Queda);
        assert!(PriceSummary::from_series(&weekly(day(2025, 1, 3), &[None])).is_none());
    }

    #[test]
    fn test_trend_over_four_weeks() {
        let s = weekly(day(2025, 1, 3), &[Some(100.0), Some(1.0), Some(1.0), Some(1.0), Some(103.0)]);
        let change = crude_4w_trend(&s).unwrap();
        assert!(approx(change.delta, 3.0));
        assert!(approx(change.pct, 3.0));
        assert_eq!(change.base_date, day(2025, 1, 3));

        let short = weekly(day(2025, 1, 3), &[Some(1.0); 4]);
        assert!(crude_4w_trend(&short).is_none());
    }

    #[test]
    fn test_weekly_changes_window_and_gaps() {
        let s = weekly(day(2025, 1, 3), &[Some(1.0), Some(2.0), None, Some(5.0), Some(4.0)]);
        assert_eq!(weekly_changes(&s, 60), vec![1.0, -1.0]);
        assert_eq!(weekly_changes(&s, 1), vec![-1.0]);
    }

    #[test]
    fn test_outlook_requires_eight_changes() {
        assert!(ChangeOutlook::from_changes(&[1.0; 7]).is_none());

        let flat = ChangeOutlook::from_changes(&[2.0; 8]).unwrap();
        assert!(approx(flat.zscore, 0.0));
        assert!(!flat.is_outlier);
        assert!(approx(flat.forecast_4w, 8.0));
    }

    #[test]
    fn test_outlook_linear_fit_and_outlier() {
        // changes = 0, 1, ..., 7 lie on y = x
        let linear: Vec<f64> = (0..8).map(f64::from).collect();
        let fit = ChangeOutlook::from_changes(&linear).unwrap();
        assert!(approx(fit.slope, 1.0));
        assert!(approx(fit.intercept, 0.0));
        assert!(approx(fit.forecast_4w, 8.0 + 9.0 + 10.0 + 11.0));

        let mut spike = vec![0.0; 9];
        spike.push(50.0);
        let fit = ChangeOutlook::from_changes(&spike).unwrap();
        assert!(fit.is_outlier);
        assert!(fit.zscore > 2.0);
        assert!(approx(fit.last_change, 50.0));
    }

    #[test]
    fn test_five_year_average() {
        let week10 = |y| NaiveDate::from_isoywd_opt(y, 10, chrono::Weekday::Wed).unwrap();
        let obs = (2019..=2025)
            .map(|y| Observation::new(week10(y), Some(f64::from(y - 2000))))
            .collect();
        let s = Series::new("NG", "Gas", SeriesSource::Eia, obs);

        // 2020..=2024 contribute: (20 + 21 + 22 + 23 + 24) / 5
        let target = week10(2025);
        let avg = seasonal_average_for(&s, target).unwrap();
        assert!(approx(avg, 22.0));

        let comparison = seasonal_comparison(&s);
        assert_eq!(comparison.len(), 1);
        assert_eq!(comparison[0].value, 25.0);
        assert!(comparison[0].five_year_avg.is_some());

        assert!(seasonal_average_for(&s, day(2025, 7, 1)).is_none());
    }
}
