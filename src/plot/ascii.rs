//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal or a CI log
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - forecast (`yhat`): `-` line
//! - actual sales: `o`

use crate::app::pipeline::WindowPanels;
use crate::charts::series::day_number;

/// Render actual vs forecast for the selected window.
pub fn render_ascii_plot(window: &WindowPanels, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let t_min = day_number(window.range.start());
    let t_max = day_number(window.range.end()).max(t_min + 1.0);

    let actual: Vec<(f64, f64)> = window.actual.iter().map(|p| (day_number(p.date), p.sales)).collect();
    let forecast: Vec<(f64, f64)> = window.forecast.iter().map(|p| (day_number(p.date), p.yhat)).collect();

    let (y_min, y_max) = y_range(&actual, &forecast).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Forecast first so actual points overlay it.
    draw_polyline(&mut grid, &forecast, t_min, t_max, y_min, y_max);

    for &(t, y) in &actual {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        grid[yy][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: ds=[{}, {}] | y=[{y_min:.2}, {y_max:.2}]\n",
        window.range.start(),
        window.range.end(),
    ));
    for row in grid {
        let line: String = row.into_iter().collect();
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn y_range(actual: &[(f64, f64)], forecast: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in actual.iter().chain(forecast) {
        if y.is_finite() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        Some((min_y - 1.0, min_y + 1.0))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(grid: &mut [Vec<char>], points: &[(f64, f64)], t_min: f64, t_max: f64, y_min: f64, y_max: f64) {
    let Some(&(t0, y0)) = points.first() else {
        return;
    };
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = (map_x(t0, t_min, t_max, width), map_y(y0, y_min, y_max, height));
    grid[prev.1][prev.0] = '-';
    for &(t, y) in &points[1..] {
        let next = (map_x(t, t_min, t_max, width), map_y(y, y_min, y_max, height));
        draw_line(grid, prev, next, '-');
        prev = next;
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let (mut x0, mut y0) = (from.0 as isize, from.1 as isize);
    let (x1, y1) = (to.0 as isize, to.1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
