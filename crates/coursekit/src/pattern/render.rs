//! SVG output for traced patterns.

use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use super::{Canvas, Point, Segment};
use crate::error::{Error, Result};

/// Map a world point (y up) to backend pixels (y down).
#[allow(clippy::cast_possible_truncation)]
fn to_pixel(p: Point, canvas: &Canvas) -> (i32, i32) {
    let height = f64::from(canvas.height);
    (p.x.round() as i32, (height - p.y).round() as i32)
}

/// Collapse consecutive segments into polylines, one per pen-down stroke.
fn polylines(segments: &[Segment], canvas: &Canvas) -> Vec<Vec<(i32, i32)>> {
    let mut lines: Vec<Vec<(i32, i32)>> = Vec::new();
    let mut last_end: Option<Point> = None;

    for seg in segments {
        let continues = last_end.is_some_and(|end| end.distance(seg.from) < 1e-9);
        match lines.last_mut() {
            Some(line) if continues => line.push(to_pixel(seg.to, canvas)),
            _ => lines.push(vec![to_pixel(seg.from, canvas), to_pixel(seg.to, canvas)]),
        }
        last_end = Some(seg.to);
    }

    lines
}

/// Render `segments` as black 1px strokes on a white canvas.
///
/// # Errors
///
/// Returns an error if the SVG file cannot be written.
pub fn render_svg(segments: &[Segment], canvas: &Canvas, path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, (canvas.width, canvas.height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| Error::render(e.to_string()))?;

    let lines = polylines(segments, canvas);
    for line in &lines {
        root.draw(&PathElement::new(line.clone(), BLACK.stroke_width(1)))
            .map_err(|e| Error::render(e.to_string()))?;
    }

    root.present().map_err(|e| Error::render(e.to_string()))?;
    info!(
        file = %path.display(),
        segments = segments.len(),
        strokes = lines.len(),
        "Pattern rendered"
    );
    Ok(())
}
