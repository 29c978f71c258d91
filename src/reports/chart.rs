//! Raster charts for the PDF report
//!
//! Charts are drawn into a plain RGB pixel buffer. Text (titles, axis
//! labels, legends) is not rasterized: it travels alongside the image and
//! the PDF writer places it as real text.

use std::f64::consts::{FRAC_PI_2, TAU};

pub type Rgb = [u8; 3];

pub const WHITE: Rgb = [255, 255, 255];
pub const AXIS: Rgb = [90, 90, 90];
pub const GRID: Rgb = [225, 225, 225];

/// Slice and bar colors, cycled
pub const PALETTE: [Rgb; 8] = [
    [31, 119, 180],
    [255, 127, 14],
    [44, 160, 44],
    [214, 39, 40],
    [148, 103, 189],
    [140, 86, 75],
    [227, 119, 194],
    [127, 127, 127],
];

pub const CHART_WIDTH: u32 = 480;
pub const CHART_HEIGHT: u32 = 192;
const MARGIN: i64 = 12;

pub const NO_DATA: &str = "Sem dados";

pub fn palette(index: usize) -> Rgb {
    PALETTE[index % PALETTE.len()]
}

/// An RGB image, row-major, top row first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            pixels.extend_from_slice(&background);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGB bytes, 3 per pixel
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 3) as usize;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }

    /// Out-of-bounds writes are dropped
    pub fn set(&mut self, x: i64, y: i64, color: Rgb) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = ((y as usize) * self.width as usize + x as usize) * 3;
        self.pixels[i..i + 3].copy_from_slice(&color);
    }

    pub fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: Rgb) {
        for py in y..y + h {
            for px in x..x + w {
                self.set(px, py, color);
            }
        }
    }

    /// Bresenham line with a square brush of `thickness` pixels
    pub fn line(&mut self, from: (i64, i64), to: (i64, i64), color: Rgb, thickness: i64) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        let half = thickness / 2;

        loop {
            self.fill_rect(x - half, y - half, thickness.max(1), thickness.max(1), color);
            if x == to.0 && y == to.1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    pub fn fill_circle(&mut self, cx: i64, cy: i64, radius: i64, color: Rgb) {
        for y in cy - radius..=cy + radius {
            for x in cx - radius..=cx + radius {
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy <= radius * radius {
                    self.set(x, y, color);
                }
            }
        }
    }
}

/// A label under the plot area, centered at `position` (0..1 of the width)
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabel {
    pub position: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub color: Rgb,
    pub text: String,
}

/// A rendered chart plus the text that goes around it
#[derive(Debug, Clone)]
pub struct Chart {
    pub title: String,
    pub image: Canvas,
    pub axis_labels: Vec<AxisLabel>,
    pub legend: Vec<LegendEntry>,
    /// Scale hint printed next to the plot, e.g. the maximum value
    pub note: Option<String>,
    /// Shown centered on the image when there is nothing to plot
    pub placeholder: Option<&'static str>,
}

struct PlotArea {
    left: i64,
    top: i64,
    width: i64,
    height: i64,
}

impl PlotArea {
    fn standard() -> Self {
        Self {
            left: MARGIN,
            top: MARGIN,
            width: CHART_WIDTH as i64 - 2 * MARGIN,
            height: CHART_HEIGHT as i64 - 2 * MARGIN,
        }
    }

    fn bottom(&self) -> i64 {
        self.top + self.height
    }

    fn slot_center(&self, index: usize, count: usize) -> i64 {
        let slot = self.width as f64 / count.max(1) as f64;
        self.left + (slot * (index as f64 + 0.5)).round() as i64
    }

    fn draw_frame(&self, canvas: &mut Canvas) {
        for step in 1..=4 {
            let y = self.bottom() - self.height * step / 4;
            canvas.line((self.left, y), (self.left + self.width, y), GRID, 1);
        }
        canvas.line((self.left, self.top), (self.left, self.bottom()), AXIS, 1);
        canvas.line(
            (self.left, self.bottom()),
            (self.left + self.width, self.bottom()),
            AXIS,
            1,
        );
    }
}

fn axis_labels(labels: &[String]) -> Vec<AxisLabel> {
    let area = PlotArea::standard();
    labels
        .iter()
        .enumerate()
        .map(|(i, text)| AxisLabel {
            position: area.slot_center(i, labels.len()) as f64 / CHART_WIDTH as f64,
            text: text.clone(),
        })
        .collect()
}

/// Vertical bars, one per label
pub fn bar_chart(title: &str, labels: &[String], values: &[u64]) -> Chart {
    let mut canvas = Canvas::new(CHART_WIDTH, CHART_HEIGHT, WHITE);
    let area = PlotArea::standard();
    area.draw_frame(&mut canvas);

    let max = values.iter().copied().max().unwrap_or(0);
    if max > 0 {
        let slot = area.width / values.len() as i64;
        let bar_width = (slot * 3 / 5).max(1);
        for (i, &value) in values.iter().enumerate() {
            let height = (area.height as f64 * value as f64 / max as f64).round() as i64;
            let center = area.slot_center(i, values.len());
            canvas.fill_rect(
                center - bar_width / 2,
                area.bottom() - height,
                bar_width,
                height,
                PALETTE[0],
            );
        }
    }

    Chart {
        title: title.to_string(),
        image: canvas,
        axis_labels: axis_labels(labels),
        legend: Vec::new(),
        note: (max > 0).then(|| format!("Qtd máx: {}", max)),
        placeholder: None,
    }
}

/// Pie starting at 12 o'clock, counterclockwise; "Sem dados" when the
/// values sum to zero
pub fn pie_chart(title: &str, labels: &[String], values: &[u64]) -> Chart {
    let mut canvas = Canvas::new(CHART_WIDTH, CHART_HEIGHT, WHITE);
    let total: u64 = values.iter().sum();

    if total == 0 {
        return Chart {
            title: title.to_string(),
            image: canvas,
            axis_labels: Vec::new(),
            legend: Vec::new(),
            note: None,
            placeholder: Some(NO_DATA),
        };
    }

    // Cumulative slice ends, as fractions of a full turn
    let mut bounds = Vec::with_capacity(values.len());
    let mut acc = 0u64;
    for &value in values {
        acc += value;
        bounds.push(acc as f64 / total as f64);
    }

    let radius = (CHART_HEIGHT as i64 / 2) - MARGIN;
    let cx = CHART_HEIGHT as i64 / 2 + MARGIN;
    let cy = CHART_HEIGHT as i64 / 2;
    for y in cy - radius..=cy + radius {
        for x in cx - radius..=cx + radius {
            let (dx, dy) = ((x - cx) as f64, (cy - y) as f64);
            if dx * dx + dy * dy > (radius * radius) as f64 {
                continue;
            }
            let turn = (dy.atan2(dx) - FRAC_PI_2).rem_euclid(TAU) / TAU;
            let slice = bounds.iter().position(|&end| turn < end).unwrap_or(values.len() - 1);
            canvas.set(x, y, palette(slice));
        }
    }

    let legend = labels
        .iter()
        .zip(values)
        .enumerate()
        .map(|(i, (label, &value))| LegendEntry {
            color: palette(i),
            text: format!("{} ({:.0}%)", label, value as f64 * 100.0 / total as f64),
        })
        .collect();

    Chart {
        title: title.to_string(),
        image: canvas,
        axis_labels: Vec::new(),
        legend,
        note: None,
        placeholder: None,
    }
}

/// Polyline with round markers; `note` describes the top of the scale
pub fn line_chart(title: &str, labels: &[String], values: &[f64], note: Option<String>) -> Chart {
    let mut canvas = Canvas::new(CHART_WIDTH, CHART_HEIGHT, WHITE);
    let area = PlotArea::standard();
    area.draw_frame(&mut canvas);

    let max = values.iter().copied().fold(0.0_f64, f64::max);
    let points: Vec<(i64, i64)> = values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let ratio = if max > 0.0 { value.max(0.0) / max } else { 0.0 };
            (
                area.slot_center(i, values.len()),
                area.bottom() - (area.height as f64 * ratio).round() as i64,
            )
        })
        .collect();

    for pair in points.windows(2) {
        canvas.line(pair[0], pair[1], PALETTE[0], 2);
    }
    for &(x, y) in &points {
        canvas.fill_circle(x, y, 3, PALETTE[0]);
    }

    Chart {
        title: title.to_string(),
        image: canvas,
        axis_labels: axis_labels(labels),
        legend: Vec::new(),
        note,
        placeholder: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_canvas_bounds() {
        let mut canvas = Canvas::new(4, 3, WHITE);
        assert_eq!(canvas.pixels().len(), 36);

        canvas.set(-1, 0, AXIS);
        canvas.set(4, 0, AXIS);
        canvas.set(3, 2, AXIS);
        assert_eq!(canvas.get(3, 2), Some(AXIS));
        assert_eq!(canvas.get(0, 0), Some(WHITE));
        assert_eq!(canvas.get(4, 0), None);
    }

    #[test]
    fn test_line_reaches_both_ends() {
        let mut canvas = Canvas::new(10, 10, WHITE);
        canvas.line((1, 8), (8, 2), AXIS, 1);
        assert_eq!(canvas.get(1, 8), Some(AXIS));
        assert_eq!(canvas.get(8, 2), Some(AXIS));
    }

    #[test]
    fn test_bar_heights_scale_to_max() {
        let chart = bar_chart("Convênios por Tipo", &labels(&["A", "B"]), &[4, 2]);
        let area = PlotArea::standard();
        let tall = area.slot_center(0, 2) as u32;
        let short = area.slot_center(1, 2) as u32;

        // Just below the top of the plot only the tallest bar is painted
        let near_top = (area.top + 2) as u32;
        assert_eq!(chart.image.get(tall, near_top), Some(PALETTE[0]));
        assert_ne!(chart.image.get(short, near_top), Some(PALETTE[0]));
        assert_eq!(chart.axis_labels.len(), 2);
        assert!(chart.axis_labels[0].position < chart.axis_labels[1].position);
        assert_eq!(chart.note.as_deref(), Some("Qtd máx: 4"));
    }

    #[test]
    fn test_pie_slices_and_legend() {
        let chart = pie_chart("Convênios por Status", &labels(&["PROPOSTA", "EXECUCAO"]), &[3, 1]);
        assert!(chart.placeholder.is_none());
        assert_eq!(chart.legend[0].text, "PROPOSTA (75%)");
        assert_eq!(chart.legend[1].text, "EXECUCAO (25%)");

        let cx = (CHART_HEIGHT / 2) as u32 + MARGIN as u32;
        let cy = CHART_HEIGHT / 2;
        // Left of center lies in the first quarter turn counterclockwise from the top
        assert_eq!(chart.image.get(cx - 20, cy), Some(PALETTE[0]));
        // Just right of the top, at the very end of the turn
        assert_eq!(chart.image.get(cx + 20, cy - 40), Some(PALETTE[1]));
    }

    #[test]
    fn test_empty_pie_has_placeholder() {
        let chart = pie_chart("Convênios por Status", &[], &[]);
        assert_eq!(chart.placeholder, Some(NO_DATA));
        assert!(chart.image.pixels().chunks(3).all(|p| p == WHITE));
    }

    #[test]
    fn test_line_chart_marks_each_point() {
        let values = [0.0, 500.0, 1000.0];
        let chart = line_chart("Repasse por mês", &labels(&["2025-01", "2025-02", "2025-03"]), &values, None);
        let area = PlotArea::standard();

        let x = area.slot_center(2, 3) as u32;
        assert_eq!(chart.image.get(x, area.top as u32), Some(PALETTE[0]));
        let x0 = area.slot_center(0, 3) as u32;
        assert_eq!(chart.image.get(x0, area.bottom() as u32), Some(PALETTE[0]));
    }
}
