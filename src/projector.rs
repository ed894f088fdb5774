//! Continuous-to-discrete coordinate projection for canvas drawings.
//!
//! A drawing is authored in a float viewport and projected onto a grid of
//! terminal cells. Terminal cells are roughly twice as tall as they are wide,
//! so [`CoordinateProjector::fit`] picks a grid twice as wide as it is tall
//! per unit of viewport aspect.
//!
//! Structure:
//! - Types: viewport, drawables
//! - Pure functions: project / unproject / rasterize
//!
//! Rounding: `f64::round` (half away from zero). The viewport centre of a
//! `[-1,1]×[-1,1]` viewport on a 10×5 grid lands on `(5, 3)`.

use std::collections::BTreeSet;

// ============================================================================
// TYPES
// ============================================================================

/// A point in viewport space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatPoint {
    pub x: f64,
    pub y: f64,
}

impl FloatPoint {
    pub const ZERO: FloatPoint = FloatPoint { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        FloatPoint { x, y }
    }
}

/// The continuous rectangle a drawing is authored in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Viewport {
    /// Viewport from an origin and a size, like a float frame.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Viewport {
            min_x: x,
            min_y: y,
            max_x: x + width,
            max_y: y + height,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn contains(&self, p: FloatPoint) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Something that can be drawn on a projected canvas.
pub enum Drawable<'a> {
    /// Straight segment between two viewport points.
    Line(FloatPoint, FloatPoint),
    /// `y = f(x)`, sampled once per grid column.
    Function(&'a dyn Fn(f64) -> f64),
    /// Outline of the whole viewport.
    Border,
}

// ============================================================================
// PROJECTOR
// ============================================================================

/// Maps a viewport onto a `width × height` cell grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateProjector {
    viewport: Viewport,
    width: u16,
    height: u16,
}

impl CoordinateProjector {
    pub fn new(viewport: Viewport, width: u16, height: u16) -> Self {
        CoordinateProjector {
            viewport,
            width,
            height,
        }
    }

    /// Largest grid inside `max_width × max_height` that keeps the
    /// viewport's shape, counting each cell as one unit wide and two tall.
    pub fn fit(viewport: Viewport, max_width: u16, max_height: u16) -> Self {
        let aspect = if viewport.height() == 0.0 {
            1.0
        } else {
            viewport.width() / viewport.height()
        };
        let by_height = f64::from(max_height);
        let by_width = f64::from(max_width) / (2.0 * aspect);
        let height = by_height.min(by_width).floor().max(0.0);
        let width = (height * 2.0 * aspect).round().min(f64::from(max_width));
        CoordinateProjector::new(viewport, width as u16, height as u16)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Raw projection: `round((x - minX) / w * W)`, `round((maxY - y) / h * H)`.
    ///
    /// Points on the max edges land one past the last cell; [`Self::cell`]
    /// folds them back in.
    pub fn project(&self, p: FloatPoint) -> (i64, i64) {
        let vp = &self.viewport;
        let gx = ((p.x - vp.min_x) / vp.width() * f64::from(self.width)).round();
        let gy = ((vp.max_y - p.y) / vp.height() * f64::from(self.height)).round();
        (gx as i64, gy as i64)
    }

    /// Inverse of [`Self::project`] for a grid coordinate.
    pub fn unproject(&self, gx: i64, gy: i64) -> FloatPoint {
        let vp = &self.viewport;
        FloatPoint {
            x: vp.min_x + gx as f64 / f64::from(self.width) * vp.width(),
            y: vp.max_y - gy as f64 / f64::from(self.height) * vp.height(),
        }
    }

    /// The grid cell a viewport point falls in, or None when it lies
    /// outside the viewport or the grid is empty.
    pub fn cell(&self, p: FloatPoint) -> Option<(u16, u16)> {
        if self.width == 0 || self.height == 0 || !self.viewport.contains(p) {
            return None;
        }
        let (gx, gy) = self.project(p);
        let col = gx.clamp(0, i64::from(self.width) - 1);
        let row = gy.clamp(0, i64::from(self.height) - 1);
        Some((col as u16, row as u16))
    }

    /// Every cell a drawable covers, in (column, row) order, deduplicated.
    pub fn rasterize(&self, drawable: &Drawable<'_>) -> Vec<(u16, u16)> {
        let mut cells = BTreeSet::new();
        match drawable {
            Drawable::Line(a, b) => self.rasterize_line(*a, *b, &mut cells),
            Drawable::Function(f) => {
                for col in 0..self.width {
                    let x = self.unproject(i64::from(col), 0).x;
                    let p = FloatPoint::new(x, f(x));
                    if let Some((_, row)) = self.cell(p) {
                        cells.insert((col, row));
                    }
                }
            }
            Drawable::Border => {
                let vp = self.viewport;
                let corners = [
                    FloatPoint::new(vp.min_x, vp.min_y),
                    FloatPoint::new(vp.max_x, vp.min_y),
                    FloatPoint::new(vp.max_x, vp.max_y),
                    FloatPoint::new(vp.min_x, vp.max_y),
                ];
                for i in 0..corners.len() {
                    let next = corners[(i + 1) % corners.len()];
                    self.rasterize_line(corners[i], next, &mut cells);
                }
            }
        }
        cells.into_iter().collect()
    }

    /// Sample the segment at twice the grid distance it spans so that
    /// consecutive samples never skip a cell.
    fn rasterize_line(&self, a: FloatPoint, b: FloatPoint, cells: &mut BTreeSet<(u16, u16)>) {
        let (ax, ay) = self.project(a);
        let (bx, by) = self.project(b);
        let span = (bx - ax).abs().max((by - ay).abs());
        let steps = (span * 2).max(1);
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let p = FloatPoint::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
            if let Some(cell) = self.cell(p) {
                cells.insert(cell);
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit() -> Viewport {
        Viewport::new(-1.0, -1.0, 2.0, 2.0)
    }

    #[test]
    fn centre_of_unit_viewport_rounds_half_away_from_zero() {
        let projector = CoordinateProjector::new(unit(), 10, 5);
        assert_eq!(projector.project(FloatPoint::ZERO), (5, 3));
    }

    #[test]
    fn y_axis_is_inverted() {
        let projector = CoordinateProjector::new(unit(), 10, 5);
        assert_eq!(projector.project(FloatPoint::new(-1.0, 1.0)), (0, 0));
        assert_eq!(projector.project(FloatPoint::new(1.0, -1.0)), (10, 5));
    }

    #[test]
    fn max_edge_folds_into_last_cell() {
        let projector = CoordinateProjector::new(unit(), 10, 5);
        assert_eq!(projector.cell(FloatPoint::new(1.0, -1.0)), Some((9, 4)));
    }

    #[test]
    fn points_outside_viewport_have_no_cell() {
        let projector = CoordinateProjector::new(unit(), 10, 5);
        assert_eq!(projector.cell(FloatPoint::new(1.5, 0.0)), None);
        assert_eq!(projector.cell(FloatPoint::new(0.0, -1.01)), None);
    }

    #[test]
    fn fit_doubles_width_for_square_viewport() {
        let projector = CoordinateProjector::fit(unit(), 100, 12);
        assert_eq!(projector.height(), 12);
        assert_eq!(projector.width(), 24);
    }

    #[test]
    fn fit_is_limited_by_narrow_width() {
        let projector = CoordinateProjector::fit(unit(), 10, 40);
        assert_eq!(projector.width(), 10);
        assert_eq!(projector.height(), 5);
    }

    #[test]
    fn horizontal_line_has_no_gaps() {
        let projector = CoordinateProjector::new(unit(), 20, 10);
        let cells = projector.rasterize(&Drawable::Line(
            FloatPoint::new(-1.0, 0.0),
            FloatPoint::new(1.0, 0.0),
        ));
        let cols: Vec<u16> = cells.iter().map(|(c, _)| *c).collect();
        assert_eq!(cols, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn diagonal_line_is_connected() {
        let projector = CoordinateProjector::new(unit(), 20, 10);
        let cells = projector.rasterize(&Drawable::Line(FloatPoint::ZERO, FloatPoint::new(1.0, 1.0)));
        for window in cells.windows(2) {
            let (a, b) = (window[0], window[1]);
            assert!(b.0.abs_diff(a.0) <= 1, "gap between {:?} and {:?}", a, b);
        }
    }

    #[test]
    fn function_is_sampled_once_per_column() {
        let projector = CoordinateProjector::new(unit(), 16, 8);
        let flat = |_x: f64| 0.0;
        let cells = projector.rasterize(&Drawable::Function(&flat));
        assert_eq!(cells.len(), 16);
        assert!(cells.iter().all(|(_, row)| *row == 4));
    }

    #[test]
    fn border_touches_all_four_edges() {
        let projector = CoordinateProjector::new(unit(), 8, 4);
        let cells = projector.rasterize(&Drawable::Border);
        assert!(cells.contains(&(0, 0)));
        assert!(cells.contains(&(7, 0)));
        assert!(cells.contains(&(0, 3)));
        assert!(cells.contains(&(7, 3)));
        assert!(!cells.contains(&(3, 2)));
    }

    #[test]
    fn empty_grid_draws_nothing() {
        let projector = CoordinateProjector::new(unit(), 0, 0);
        assert!(projector.rasterize(&Drawable::Border).is_empty());
    }

    proptest! {
        #[test]
        fn round_trip_within_one_cell(
            x in -1.0f64..=1.0,
            y in -1.0f64..=1.0,
            w in 1u16..200,
            h in 1u16..100,
        ) {
            let projector = CoordinateProjector::new(unit(), w, h);
            let (gx, gy) = projector.project(FloatPoint::new(x, y));
            let back = projector.unproject(gx, gy);
            let cell_w = 2.0 / f64::from(w);
            let cell_h = 2.0 / f64::from(h);
            prop_assert!((back.x - x).abs() <= cell_w);
            prop_assert!((back.y - y).abs() <= cell_h);
        }
    }
}
