//! Line-chart model: one dataset per year over the shared date axis.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::cache::YearSeries;
use crate::metrics::ChartMetric;

const CURRENT_WIDTH: u8 = 2;
const HISTORY_WIDTH: u8 = 1;
const TENSION: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub year: i32,
    pub data: Vec<Option<f64>>,
    pub border_color: String,
    pub border_width: u8,
    pub tension: f64,
    pub point_radius: u8,
}

/// Dashed vertical line at today's date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodayMarker {
    pub date: NaiveDate,
    pub label: String,
    pub color: &'static str,
    pub dash: [u8; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartModel {
    pub metric: ChartMetric,
    pub title: &'static str,
    pub units: &'static str,
    pub range_label: String,
    pub labels: Vec<NaiveDate>,
    pub datasets: Vec<Dataset>,
    pub today: TodayMarker,
}

impl ChartModel {
    /// `today` is the window's reference date; its year is the bold line.
    pub fn build(
        metric: ChartMetric,
        series: &YearSeries,
        today: NaiveDate,
        years_back: u32,
        current_temp_c: Option<f64>,
    ) -> Self {
        let reference_year = today.year();
        let years = selected_years(series, reference_year, years_back);
        let n = years.len();

        let datasets = years
            .iter()
            .enumerate()
            .filter_map(|(i, &year)| {
                let data = series.get(year)?.to_vec();
                let (border_color, border_width) = if year == reference_year {
                    (metric.color().to_string(), CURRENT_WIDTH)
                } else {
                    (history_color(i, n), HISTORY_WIDTH)
                };
                Some(Dataset {
                    label: year.to_string(),
                    year,
                    data,
                    border_color,
                    border_width,
                    tension: TENSION,
                    point_radius: 0,
                })
            })
            .collect();

        let label = match current_temp_c {
            Some(t) => format!("{:.1} °C", t),
            None => "Today".to_string(),
        };

        Self {
            metric,
            title: metric.label(),
            units: metric.units(),
            range_label: year_range_label(reference_year, years_back),
            labels: series.dates.clone(),
            datasets,
            today: TodayMarker {
                date: today,
                label,
                color: "red",
                dash: [6, 4],
            },
        }
    }
}

/// The reference year plus up to `years_back` earlier years that are present, newest first.
pub fn selected_years(series: &YearSeries, reference_year: i32, years_back: u32) -> Vec<i32> {
    (0..=years_back as i32)
        .map(|back| reference_year - back)
        .filter(|&year| series.contains(year))
        .collect()
}

/// Older years fade toward a lighter blue.
pub fn history_color(position: usize, total: usize) -> String {
    let lightness = 85.0 - 60.0 * position as f64 / total.max(1) as f64;
    format!("hsla(210,70%,{}%,.6)", lightness)
}

/// Slider caption, e.g. "2020 to 2025" or "Just 2025".
pub fn year_range_label(reference_year: i32, years_back: u32) -> String {
    if years_back == 0 {
        format!("Just {}", reference_year)
    } else {
        format!("{} to {}", reference_year - years_back as i32, reference_year)
    }
}
