use crate::analyzer::efficiency::concluded_days;
use crate::analyzer::stats::{ecdf, gaussian_kde};
use crate::config::AppConfig;
use crate::model::{ChartError, TimedCase, YearlyIndicator};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::error::Error;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const MEDIAN_DIR: &str = "mediana";
pub const CUMULATIVE_DIR: &str = "distribuciones_acumulativas";
pub const DENSITY_DIR: &str = "distribuciones_temporales";

const CANVAS: (u32, u32) = (1200, 720);
const ECDF_MAX_DAYS: f64 = 730.0;
const DENSITY_MIN_DAYS: f64 = -10.0;
const REFERENCE_PERCENTILES: [f64; 4] = [25.0, 50.0, 75.0, 90.0];
const REFERENCE_GREY: RGBColor = RGBColor(128, 128, 128);

/// Y-axis upper bound of the median bar chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MedianScale {
    Fixed(f64),
    Auto,
}

impl MedianScale {
    pub fn for_outcome(outcome: &str) -> Self {
        match outcome {
            "sobre" => MedianScale::Fixed(400.0),
            "admis" => MedianScale::Fixed(65.0),
            _ => MedianScale::Auto,
        }
    }

    pub fn upper_bound(self, medians: &[f64]) -> f64 {
        match self {
            MedianScale::Fixed(max) => max,
            MedianScale::Auto => {
                let max = medians.iter().copied().fold(0.0, f64::max);
                if max > 0.0 { max * 1.1 } else { 1.0 }
            }
        }
    }
}

/// One line of a per-year distribution chart.
#[derive(Debug, Clone, PartialEq)]
pub struct YearSeries {
    pub year: i32,
    pub color: RGBColor,
    pub points: Vec<(f64, f64)>,
}

pub fn chart_path(output_dir: &Path, category_dir: &str, outcome: &str, zone: &str) -> PathBuf {
    output_dir
        .join(category_dir)
        .join(format!("{}_sub{}.png", outcome, zone))
}

/// Evenly spaced hue for the `index`-th of `count` years.
pub fn year_color(index: usize, count: usize) -> RGBColor {
    let hue = index as f64 / count.max(1) as f64;
    hsl_to_rgb(hue, 0.65, 0.5)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> RGBColor {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h.rem_euclid(1.0)) * 6.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    RGBColor(channel(r), channel(g), channel(b))
}

fn year_position(years: &RangeInclusive<i32>, year: i32) -> usize {
    (year - years.start()).max(0) as usize
}

fn year_count(years: &RangeInclusive<i32>) -> usize {
    (years.end() - years.start() + 1).max(1) as usize
}

/// ECDF of concluded elapsed days per year, clipped to the chart's x range.
pub fn cumulative_series(cases: &[TimedCase], years: RangeInclusive<i32>) -> Vec<YearSeries> {
    let count = year_count(&years);
    years
        .clone()
        .filter_map(|year| {
            let days = concluded_days(cases, year);
            let points = clip_after(ecdf(&days), ECDF_MAX_DAYS);
            (!points.is_empty()).then(|| YearSeries {
                year,
                color: year_color(year_position(&years, year), count),
                points,
            })
        })
        .collect()
}

/// Keeps points up to `max_x` plus the first one beyond it, so the line runs
/// to the edge of the plotting area.
fn clip_after(points: Vec<(f64, f64)>, max_x: f64) -> Vec<(f64, f64)> {
    let inside = points.iter().take_while(|(x, _)| *x <= max_x).count();
    let keep = (inside + 1).min(points.len());
    points.into_iter().take(keep).collect()
}

/// Kernel density of concluded elapsed days per year.
pub fn density_series(cases: &[TimedCase], years: RangeInclusive<i32>) -> Vec<YearSeries> {
    let count = year_count(&years);
    years
        .clone()
        .filter_map(|year| {
            let days = concluded_days(cases, year);
            let points: Vec<(f64, f64)> = gaussian_kde(&days)?
                .into_iter()
                .filter(|(x, _)| *x >= DENSITY_MIN_DAYS)
                .collect();
            (!points.is_empty()).then(|| YearSeries {
                year,
                color: year_color(year_position(&years, year), count),
                points,
            })
        })
        .collect()
}

/// Writes the three PNG charts for one outcome/zone combination.
pub struct ChartRenderer {
    output_dir: PathBuf,
    outcome: String,
    zone: String,
    years: RangeInclusive<i32>,
}

impl ChartRenderer {
    pub fn new(output_dir: impl AsRef<Path>, outcome: &str, zone: &str, years: RangeInclusive<i32>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            outcome: outcome.to_string(),
            zone: zone.to_string(),
            years,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.output_dir, &config.outcome, &config.zone, config.years())
    }

    pub fn path_for(&self, category_dir: &str) -> PathBuf {
        chart_path(&self.output_dir, category_dir, &self.outcome, &self.zone)
    }

    fn prepare(&self, category_dir: &str) -> Result<PathBuf, ChartError> {
        let path = self.path_for(category_dir);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    /// Renders every chart. Failures are logged and do not stop the others.
    pub fn render_all(&self, indicators: &[YearlyIndicator], cases: &[TimedCase]) -> Vec<PathBuf> {
        let results = [
            ("median", self.render_median_bars(indicators)),
            ("cumulative", self.render_cumulative(cases)),
            ("density", self.render_density(cases)),
        ];
        let mut written = Vec::new();
        for (name, result) in results {
            match result {
                Ok(path) => {
                    info!("Saved {} chart: {}", name, path.display());
                    written.push(path);
                }
                Err(e) => warn!("{} chart failed: {}", name, e),
            }
        }
        written
    }

    pub fn render_median_bars(&self, indicators: &[YearlyIndicator]) -> Result<PathBuf, ChartError> {
        let path = self.prepare(MEDIAN_DIR)?;
        let count = year_count(&self.years);
        let bars: Vec<(i32, Option<f64>, RGBColor)> = indicators
            .iter()
            .map(|r| {
                let color = year_color(year_position(&self.years, r.year), count);
                (r.year, r.median_days, color)
            })
            .collect();
        let medians: Vec<f64> = bars.iter().filter_map(|(_, m, _)| *m).collect();
        let y_max = MedianScale::for_outcome(&self.outcome).upper_bound(&medians);

        draw_median_bars(&path, &bars, y_max).map_err(|e| ChartError::Render(e.to_string()))?;
        Ok(path)
    }

    pub fn render_cumulative(&self, cases: &[TimedCase]) -> Result<PathBuf, ChartError> {
        let path = self.prepare(CUMULATIVE_DIR)?;
        let series = cumulative_series(cases, self.years.clone());
        draw_cumulative(&path, &series).map_err(|e| ChartError::Render(e.to_string()))?;
        Ok(path)
    }

    pub fn render_density(&self, cases: &[TimedCase]) -> Result<PathBuf, ChartError> {
        let path = self.prepare(DENSITY_DIR)?;
        let series = density_series(cases, self.years.clone());
        let title = format!("Distribution of time to conclusion, zone {}", self.zone);
        draw_density(&path, &title, &series).map_err(|e| ChartError::Render(e.to_string()))?;
        Ok(path)
    }
}

fn segment_label(value: &SegmentValue<i32>, labels: &[String]) -> String {
    match value {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
            labels.get(*i as usize).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    }
}

fn draw_median_bars(
    path: &Path,
    bars: &[(i32, Option<f64>, RGBColor)],
    y_max: f64,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;

    let slots = bars.len().max(1) as i32;
    let mut chart = ChartBuilder::on(&root)
        .caption("Median time to conclusion (days)", ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0..slots).into_segmented(), 0f64..y_max)?;

    let labels: Vec<String> = bars.iter().map(|(year, _, _)| year.to_string()).collect();
    let formatter = |v: &SegmentValue<i32>| segment_label(v, &labels);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Days")
        .x_labels(bars.len().max(1))
        .x_label_formatter(&formatter)
        .draw()?;

    let label_style =
        TextStyle::from(("sans-serif", 18).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    for (idx, (_, median, color)) in bars.iter().enumerate() {
        let Some(value) = *median else {
            continue;
        };
        let x = idx as i32;
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(x), 0.0), (SegmentValue::Exact(x + 1), value)],
            color.mix(0.7).filled(),
        );
        bar.set_margin(0, 0, 12, 12);
        chart.draw_series(std::iter::once(bar))?;
        chart.draw_series(std::iter::once(Text::new(
            format!("{:.0}", value),
            (SegmentValue::CenterOf(x), value),
            label_style.clone(),
        )))?;
    }

    root.present()?;
    Ok(())
}

fn draw_cumulative(path: &Path, series: &[YearSeries]) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Cumulative distribution of time to conclusion", ("sans-serif", 26))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..ECDF_MAX_DAYS, 0f64..100f64)?;
    chart
        .configure_mesh()
        .x_desc("Days to conclusion")
        .y_desc("Concluded cases (%)")
        .draw()?;

    for level in REFERENCE_PERCENTILES {
        chart.draw_series(LineSeries::new(
            vec![(0.0, level), (ECDF_MAX_DAYS, level)],
            &REFERENCE_GREY.mix(0.5),
        ))?;
    }
    draw_year_lines(&mut chart, series)?;

    root.present()?;
    Ok(())
}

fn draw_density(path: &Path, title: &str, series: &[YearSeries]) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = series
        .iter()
        .flat_map(|s| s.points.iter().map(|(x, _)| *x))
        .fold(DENSITY_MIN_DAYS + 100.0, f64::max);
    let y_max = series
        .iter()
        .flat_map(|s| s.points.iter().map(|(_, y)| *y))
        .fold(0.0, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 26))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(80)
        .build_cartesian_2d(DENSITY_MIN_DAYS..x_max, 0f64..y_max)?;
    chart
        .configure_mesh()
        .x_desc("Days to conclusion")
        .y_desc("Density")
        .draw()?;

    draw_year_lines(&mut chart, series)?;

    root.present()?;
    Ok(())
}

fn draw_year_lines<'a>(
    chart: &mut ChartContext<'a, BitMapBackend<'a>, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    series: &[YearSeries],
) -> Result<(), Box<dyn Error>> {
    for s in series {
        let color = s.color;
        chart
            .draw_series(LineSeries::new(s.points.iter().copied(), color.stroke_width(3)))?
            .label(format!("Year {}", s.year))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));
    }
    if !series.is_empty() {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }
    Ok(())
}
