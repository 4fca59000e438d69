//! Terminal plots using braille graphics
//!
//! Three renderings: the stacked breakdown of one repeat unit, the lithiation
//! curve of each electrode with its stoichiometry window, and a Ragone plot.
//! All of them are drawn on a [`drawille::Canvas`] and returned as text.

use drawille::Canvas;

use crate::core::breakdown::{Kind, Part, StackBreakdown};
use crate::core::names::{Compartment, Electrode};
use crate::core::ocp::OcpCurve;
use crate::core::ragone::RagoneSeries;
use crate::core::stoichiometry::StoichiometryWindow;

/// Default canvas size in pixels (2 x 4 pixels per character)
pub const PLOT_WIDTH: u32 = 120;
pub const PLOT_HEIGHT: u32 = 40;
pub const BAR_HEIGHT: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Solid,
    Hatched,
    Dotted,
    Empty,
}

impl Fill {
    fn covers(self, x: u32, y: u32) -> bool {
        match self {
            Fill::Solid => true,
            Fill::Hatched => (x + y) % 4 == 0,
            Fill::Dotted => x % 3 == 0 && y % 3 == 0,
            Fill::Empty => false,
        }
    }

    pub fn legend(self) -> &'static str {
        match self {
            Fill::Solid => "solid",
            Fill::Hatched => "hatched",
            Fill::Dotted => "dotted",
            Fill::Empty => "empty",
        }
    }
}

/// One slice of a stacked bar
#[derive(Debug, Clone)]
pub struct Segment {
    pub label: String,
    pub value: f64,
    pub fill: Fill,
}

/// Slices of one repeat unit in stack order
///
/// Current collectors are shared by two repeat units, so only half of each
/// is drawn. The breakdown itself holds the full values.
pub fn breakdown_segments(breakdown: &StackBreakdown, kind: Kind) -> Vec<Segment> {
    let mut segments = Vec::new();
    for compartment in Compartment::ALL {
        let parts: &[(Option<Part>, Fill)] = if compartment.is_current_collector() {
            &[(None, Fill::Solid)]
        } else if compartment == Compartment::Separator {
            &[(Some(Part::Dry), Fill::Hatched), (Some(Part::Electrolyte), Fill::Empty)]
        } else {
            &[
                (Some(Part::ActiveMaterial), Fill::Solid),
                (Some(Part::InactiveMaterial), Fill::Hatched),
                (Some(Part::Electrolyte), Fill::Dotted),
            ]
        };
        for (part, fill) in parts {
            let Some(entry) = breakdown.entry(compartment, *part) else {
                continue;
            };
            let value = entry.value(kind) * compartment.stack_share();
            if value <= 0.0 {
                continue;
            }
            let label = if compartment.is_current_collector() {
                format!("{} (half)", entry.name())
            } else {
                entry.name()
            };
            segments.push(Segment {
                label,
                value,
                fill: *fill,
            });
        }
    }
    segments
}

/// Draw slices side by side, widths proportional to their values
pub fn render_stacked_bar(segments: &[Segment], width: u32, height: u32) -> String {
    let total: f64 = segments.iter().map(|s| s.value).sum();
    if total <= 0.0 || width < 2 || height < 2 {
        return "  (nothing to draw)".to_string();
    }
    let mut canvas = Canvas::new(width, height);
    let right = width - 1;
    let bottom = height - 1;
    let to_x = |v: f64| ((v / total) * right as f64).round() as u32;

    let mut cursor = 0.0;
    for segment in segments {
        let x0 = to_x(cursor);
        cursor += segment.value;
        let x1 = to_x(cursor);
        for x in x0..=x1 {
            for y in 0..=bottom {
                if segment.fill.covers(x, y) {
                    canvas.set(x, y);
                }
            }
        }
        canvas.line(x0, 0, x0, bottom);
        canvas.line(x1, 0, x1, bottom);
    }
    canvas.line(0, 0, right, 0);
    canvas.line(0, bottom, right, bottom);
    canvas.frame()
}

/// Map `value` in `[min, max]` onto `[0, pixels - 1]`
fn scale(value: f64, min: f64, max: f64, pixels: u32) -> u32 {
    let span = max - min;
    let t = if span > 0.0 { (value - min) / span } else { 0.5 };
    (t.clamp(0.0, 1.0) * (pixels - 1) as f64).round() as u32
}

/// OCP of one electrode across the full stoichiometry range, with the window
/// bounds marked by dashed vertical lines
pub fn render_lithiation(
    electrode: Electrode,
    curve: &OcpCurve,
    window: &StoichiometryWindow,
    width: u32,
    height: u32,
) -> String {
    let samples = width.max(2);
    let points: Vec<(f64, f64)> = (0..samples)
        .map(|i| {
            let sto = i as f64 / (samples - 1) as f64;
            (sto, curve.evaluate(sto))
        })
        .filter(|(_, v)| v.is_finite())
        .collect();
    if points.len() < 2 {
        return "  (curve could not be evaluated)".to_string();
    }
    let v_min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let v_max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

    let mut canvas = Canvas::new(width, height);
    let to_px = |(sto, v): (f64, f64)| {
        (
            scale(sto, 0.0, 1.0, width),
            // Canvas y grows downwards
            height - 1 - scale(v, v_min, v_max, height),
        )
    };
    for pair in points.windows(2) {
        let (x0, y0) = to_px(pair[0]);
        let (x1, y1) = to_px(pair[1]);
        canvas.line(x0, y0, x1, y1);
    }

    let (low, high) = window.bounds(electrode);
    for bound in [low, high] {
        let x = scale(bound, 0.0, 1.0, width);
        for y in (0..height).step_by(3) {
            canvas.set(x, y);
        }
    }

    let symbol = match electrode {
        Electrode::Negative => "x",
        Electrode::Positive => "y",
    };
    format!(
        "{} OCP [V], {:.3} to {:.3} V over {} in [0, 1]; window {:.4} to {:.4}\n{}",
        electrode.label(),
        v_min,
        v_max,
        symbol,
        low,
        high,
        canvas.frame()
    )
}

/// Log-log energy against power, one polyline per series
pub fn render_ragone(series: &[RagoneSeries], width: u32, height: u32) -> String {
    let points: Vec<(f64, f64)> = series
        .iter()
        .flat_map(|s| s.points.iter())
        .filter(|p| p.energy_density > 0.0 && p.power_density > 0.0)
        .map(|p| (p.power_density.log10(), p.energy_density.log10()))
        .collect();
    if points.is_empty() {
        return "  (no points)".to_string();
    }
    let (x_min, x_max) = bounds(points.iter().map(|p| p.0));
    let (y_min, y_max) = bounds(points.iter().map(|p| p.1));

    let mut canvas = Canvas::new(width, height);
    let to_px = |(x, y): (f64, f64)| (scale(x, x_min, x_max, width), height - 1 - scale(y, y_min, y_max, height));

    for s in series {
        let pixels: Vec<(u32, u32)> = s
            .points
            .iter()
            .filter(|p| p.energy_density > 0.0 && p.power_density > 0.0)
            .map(|p| to_px((p.power_density.log10(), p.energy_density.log10())))
            .collect();
        for pair in pixels.windows(2) {
            canvas.line(pair[0].0, pair[0].1, pair[1].0, pair[1].1);
        }
        for &(x, y) in &pixels {
            // Small cross on each point
            canvas.set(x, y);
            canvas.set(x.saturating_sub(1), y);
            canvas.set((x + 1).min(width - 1), y);
            canvas.set(x, y.saturating_sub(1));
            canvas.set(x, (y + 1).min(height - 1));
        }
    }

    format!(
        "Energy density {:.1} to {:.1} Wh.kg-1 (up), power density {:.1} to {:.1} W.kg-1 (right), log scales\n{}",
        10f64.powf(y_min),
        10f64.powf(y_max),
        10f64.powf(x_min),
        10f64.powf(x_max),
        canvas.frame()
    )
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ragone::{DischargeMode, RagonePoint};

    fn is_braille(c: char) -> bool {
        ('\u{2800}'..='\u{28FF}').contains(&c)
    }

    #[test]
    fn test_stacked_bar_draws() {
        let segments = vec![
            Segment {
                label: "a".to_string(),
                value: 1.0,
                fill: Fill::Solid,
            },
            Segment {
                label: "b".to_string(),
                value: 3.0,
                fill: Fill::Dotted,
            },
        ];
        let frame = render_stacked_bar(&segments, 40, 8);
        assert!(frame.chars().any(is_braille));
        // 8 pixel rows fill two rows of braille cells, padding rows stay blank
        let drawn = frame
            .lines()
            .filter(|line| line.chars().any(|c| is_braille(c) && c != '\u{2800}'))
            .count();
        assert_eq!(drawn, 2);
    }

    #[test]
    fn test_empty_bar() {
        assert_eq!(render_stacked_bar(&[], 40, 8), "  (nothing to draw)");
    }

    #[test]
    fn test_scale_endpoints() {
        assert_eq!(scale(0.0, 0.0, 1.0, 100), 0);
        assert_eq!(scale(1.0, 0.0, 1.0, 100), 99);
        assert_eq!(scale(2.0, 0.0, 1.0, 100), 99);
        assert_eq!(scale(3.0, 3.0, 3.0, 101), 50);
    }

    #[test]
    fn test_lithiation_header() {
        let curve = OcpCurve::from_fn(|x| 4.2 - x);
        let window = StoichiometryWindow {
            x0: 0.1,
            x100: 0.9,
            y100: 0.2,
            y0: 0.95,
        };
        let text = render_lithiation(Electrode::Positive, &curve, &window, 60, 20);
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "Positive electrode OCP [V], 3.200 to 4.200 V over y in [0, 1]; window 0.2000 to 0.9500"
        );
    }

    #[test]
    fn test_ragone_without_points() {
        let series = vec![RagoneSeries {
            label: "empty".to_string(),
            mode: DischargeMode::Current,
            points: Vec::new(),
        }];
        assert_eq!(render_ragone(&series, 60, 20), "  (no points)");

        let series = vec![RagoneSeries {
            label: "one".to_string(),
            mode: DischargeMode::Current,
            points: vec![RagonePoint {
                rate: 1.0,
                energy_density: 200.0,
                power_density: 200.0,
                utilisation: 1.0,
            }],
        }];
        assert!(render_ragone(&series, 60, 20).chars().any(is_braille));
    }
}
