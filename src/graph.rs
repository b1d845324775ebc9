#![cfg(feature = "web")]
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::Serialize;
use std::f64::consts::PI;

use crate::assessment::{Assessment, AssessmentClass, ClassCounts, IndicatorAssessment, sanitize_name};
use crate::error::{FairError, Result};

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Size of a rendered chart in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
}

impl ChartOptions {
    pub fn polar() -> Self {
        Self {
            width: 480,
            height: 520,
        }
    }

    pub fn bar() -> Self {
        Self {
            width: 800,
            height: 420,
        }
    }

    /// Small inline chart for table cells
    pub fn sparkbar() -> Self {
        Self {
            width: 96,
            height: 32,
        }
    }
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self::polar()
    }
}

/// Fill colour of an assessment class
pub fn class_color(class: AssessmentClass) -> RGBColor {
    match class {
        AssessmentClass::NotAssessed => RGBColor(189, 189, 189),
        AssessmentClass::Zero => RGBColor(214, 39, 40),
        AssessmentClass::Half => RGBColor(255, 127, 14),
        AssessmentClass::One => RGBColor(44, 160, 44),
    }
}

/// One bar of a polar bar chart
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PolarPoint {
    pub id: String,
    pub category: String,
    pub assessment: Option<f64>,
    /// Direction in degrees, clockwise from north
    pub theta: f64,
    /// Radial length in [0, 1]
    pub r: f64,
    pub class: Option<AssessmentClass>,
}

/// Spread indicators evenly around the circle
///
/// Indicator `k` of `n` points at `360 * k / n` degrees; its radius is the
/// assessment score, with missing scores at 0.
pub fn create_polar_points<'a>(rows: impl IntoIterator<Item = &'a IndicatorAssessment>) -> Vec<PolarPoint> {
    let rows: Vec<&IndicatorAssessment> = rows.into_iter().collect();
    let n = rows.len();
    rows.into_iter()
        .enumerate()
        .map(|(k, row)| PolarPoint {
            id: row.id.clone(),
            category: row.category.clone(),
            assessment: row.assessment,
            theta: 360.0 * k as f64 / n as f64,
            r: row.assessment.unwrap_or(0.0).clamp(0.0, 1.0),
            class: row.class(),
        })
        .collect()
}

/// Render a polar bar chart as SVG
///
/// Each indicator is a wedge whose length follows its score and whose colour
/// follows its class. Unassessed indicators are drawn as faint full-length
/// wedges so gaps stay visible.
pub fn polar_barplot(title: &str, points: &[PolarPoint], options: &ChartOptions) -> Result<String> {
    let mut svg = String::new();
    draw_polar(&mut svg, title, points, options).map_err(|e| FairError::Chart(e.to_string()))?;
    Ok(svg)
}

fn draw_polar(svg: &mut String, title: &str, points: &[PolarPoint], options: &ChartOptions) -> DrawResult {
    let root = SVGBackend::with_string(svg, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let (w, h) = (options.width as f64, options.height as f64);
    let (title_height, legend_height) = (34.0, 30.0);
    let cx = w / 2.0;
    let cy = title_height + (h - title_height - legend_height) / 2.0;
    let radius = (w.min(h - title_height - legend_height) / 2.0 - 28.0).max(10.0);

    root.draw(&Text::new(
        title.to_string(),
        (cx as i32, 8),
        TextStyle::from(("sans-serif", 18).into_font()).pos(Pos::new(HPos::Center, VPos::Top)),
    ))?;

    if points.is_empty() {
        root.draw(&Text::new(
            "No indicators".to_string(),
            (cx as i32, cy as i32),
            TextStyle::from(("sans-serif", 14).into_font()).pos(Pos::new(HPos::Center, VPos::Center)),
        ))?;
        root.present()?;
        return Ok(());
    }

    let span = 360.0 / points.len() as f64;
    for point in points {
        let (start, end) = (point.theta - span * 0.45, point.theta + span * 0.45);
        let style = match point.class {
            Some(AssessmentClass::NotAssessed) | None => {
                class_color(AssessmentClass::NotAssessed).mix(0.35).filled()
            }
            Some(class) => class_color(class).filled(),
        };
        let length = match point.class {
            Some(AssessmentClass::NotAssessed) | None => 1.0,
            // Keep zero scores visible as a short stub
            Some(_) => point.r.max(0.04),
        };
        root.draw(&Polygon::new(wedge((cx, cy), radius * length, start, end), style))?;
    }

    for ring in [0.5, 1.0] {
        root.draw(&Circle::new(
            (cx as i32, cy as i32),
            (radius * ring) as i32,
            BLACK.mix(0.25).stroke_width(1),
        ))?;
    }

    let label_style = TextStyle::from(("sans-serif", 10).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
    for point in points {
        root.draw(&Text::new(
            point.id.clone(),
            polar_to_pixel((cx, cy), radius + 14.0, point.theta),
            label_style.clone(),
        ))?;
    }

    draw_legend(&root, h - legend_height + 8.0, w)?;
    root.present()?;
    Ok(())
}

fn draw_legend(root: &DrawingArea<SVGBackend<'_>, Shift>, y: f64, width: f64) -> DrawResult {
    let item_width = 70.0;
    let x0 = (width - item_width * AssessmentClass::ALL.len() as f64) / 2.0;
    let label_style = TextStyle::from(("sans-serif", 12).into_font()).pos(Pos::new(HPos::Left, VPos::Center));
    for (i, class) in AssessmentClass::ALL.iter().enumerate() {
        let x = (x0 + i as f64 * item_width) as i32;
        let y = y as i32;
        root.draw(&Rectangle::new([(x, y - 6), (x + 12, y + 6)], class_color(*class).filled()))?;
        root.draw(&Text::new(class.label().to_string(), (x + 16, y), label_style.clone()))?;
    }
    Ok(())
}

fn polar_to_pixel(center: (f64, f64), r: f64, theta_deg: f64) -> (i32, i32) {
    let theta = theta_deg * PI / 180.0;
    (
        (center.0 + r * theta.sin()).round() as i32,
        (center.1 - r * theta.cos()).round() as i32,
    )
}

fn wedge(center: (f64, f64), r: f64, start_deg: f64, end_deg: f64) -> Vec<(i32, i32)> {
    const STEPS: usize = 12;
    let mut points = Vec::with_capacity(STEPS + 2);
    points.push((center.0.round() as i32, center.1.round() as i32));
    for step in 0..=STEPS {
        let theta = start_deg + (end_deg - start_deg) * step as f64 / STEPS as f64;
        points.push(polar_to_pixel(center, r, theta));
    }
    points
}

/// File name `<model>_<key>.svg` for a written chart
///
/// Both parts are sanitized, so a category such as `Model / Archive` cannot
/// point outside the output directory.
pub fn chart_file_name(model_id: &str, key: &str) -> String {
    format!("{}_{}.svg", sanitize_name(model_id), sanitize_name(key))
}

/// One polar chart per category of the assessment
///
/// Returns the rendered charts together with their category keys.
pub fn visualize_polar_barplots(assessment: &Assessment) -> Result<(Vec<String>, Vec<String>)> {
    let keys = assessment.categories();
    let figs = keys
        .iter()
        .map(|category| {
            let points = create_polar_points(assessment.in_category(category));
            polar_barplot(category, &points, &ChartOptions::polar())
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((figs, keys))
}

/// Polar chart of one category; `None` when the assessment has no such category
pub fn category_polar_barplot(assessment: &Assessment, category: &str) -> Option<Result<String>> {
    let rows: Vec<&IndicatorAssessment> = assessment.in_category(category).collect();
    if rows.is_empty() {
        return None;
    }
    let points = create_polar_points(rows);
    Some(polar_barplot(category, &points, &ChartOptions::polar()))
}

/// Grouped bar chart of class counts per category
pub fn visualize_barplot(assessment: &Assessment) -> Result<String> {
    let groups = assessment.counts_by_category();
    let title = format!("{}: indicators per assessment", assessment.model_id);
    let mut svg = String::new();
    draw_barplot(&mut svg, &title, &groups, &ChartOptions::bar()).map_err(|e| FairError::Chart(e.to_string()))?;
    Ok(svg)
}

fn draw_barplot(svg: &mut String, title: &str, groups: &[(String, ClassCounts)], options: &ChartOptions) -> DrawResult {
    let root = SVGBackend::with_string(svg, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    // Four bars and one gap slot per category
    let slots = (groups.len() as i32 * 5).max(1);
    let max_count = groups.iter().map(|(_, c)| c.max()).max().unwrap_or(0).max(1) as i32;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(0..slots, 0..max_count + 1)?;

    let category_label = |x: &i32| {
        if x % 5 == 2 {
            groups
                .get((x / 5) as usize)
                .map(|(category, _)| category.clone())
                .unwrap_or_default()
        } else {
            String::new()
        }
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots as usize + 1)
        .x_label_formatter(&category_label)
        .draw()?;

    for class in AssessmentClass::ALL {
        let color = class_color(class);
        chart
            .draw_series(groups.iter().enumerate().map(move |(g, (_, counts))| {
                let x = g as i32 * 5 + class.index() as i32;
                Rectangle::new([(x, 0), (x + 1, counts.get(class) as i32)], color.filled())
            }))?
            .label(class.label())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Tiny four-bar chart of an indicator's class counts
pub fn indicator_barchart(counts: &ClassCounts, options: &ChartOptions) -> Result<String> {
    let mut svg = String::new();
    draw_sparkbar(&mut svg, counts, options).map_err(|e| FairError::Chart(e.to_string()))?;
    Ok(svg)
}

fn draw_sparkbar(svg: &mut String, counts: &ClassCounts, options: &ChartOptions) -> DrawResult {
    let root = SVGBackend::with_string(svg, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let max = counts.max().max(1) as f64;
    let bar_width = options.width as f64 / AssessmentClass::ALL.len() as f64;
    let height = options.height as f64;
    for class in AssessmentClass::ALL {
        let n = counts.get(class);
        if n == 0 {
            continue;
        }
        let x0 = (class.index() as f64 * bar_width + 1.0) as i32;
        let x1 = ((class.index() + 1) as f64 * bar_width - 1.0) as i32;
        let top = (height - height * n as f64 / max) as i32;
        root.draw(&Rectangle::new([(x0, top), (x1, height as i32)], class_color(class).filled()))?;
    }

    root.present()?;
    Ok(())
}
