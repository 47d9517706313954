// src/surface.rs

//! Owned RGB raster the views paint into. Coordinates arrive as f64 and
//! floor to pixels; writes outside the buffer are clipped silently.
//!
//! Primitives cover exactly what the passes need: square plots, clipped
//! rects with optional alpha, Bresenham strokes with width, flattened
//! quadratic curves, gradient-filled convex polygons with multiply
//! compositing, filled circles, and binary PPM output.

use crate::color::Rgb;
use crate::geometry::Point;
use std::collections::HashSet;
use std::io::{self, Write};

/// Segment count a quadratic curve is flattened into.
const QUAD_SEGMENTS: u32 = 16;

#[derive(Debug, Clone)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    data: Vec<Rgb>,
}

impl RasterSurface {
    #[must_use]
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        Self {
            width,
            height,
            data: vec![background; (width as usize) * (height as usize)],
        }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixel rows, `y * width + x` indexed.
    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &[Rgb] {
        &self.data
    }

    pub fn clear(&mut self, color: Rgb) {
        self.data.fill(color);
    }

    #[inline]
    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    #[inline]
    pub fn set_px(&mut self, x: i64, y: i64, color: Rgb) {
        if let Some(i) = self.index(x, y) {
            self.data[i] = color;
        }
    }

    #[inline]
    #[must_use]
    pub fn px(&self, x: i64, y: i64) -> Option<Rgb> {
        self.index(x, y).map(|i| self.data[i])
    }

    #[inline]
    fn blend_px(&mut self, x: i64, y: i64, color: Rgb, alpha: f64) {
        if let Some(i) = self.index(x, y) {
            self.data[i] = self.data[i].blend_over(color, alpha);
        }
    }

    #[inline]
    fn multiply_px(&mut self, x: i64, y: i64, color: Rgb) {
        if let Some(i) = self.index(x, y) {
            self.data[i] = self.data[i].multiply(color);
        }
    }

    /// Axis-aligned rect. Fractional extents below one pixel still paint a
    /// single pixel column/row (background stripes rely on this).
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb, alpha: f64) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let x1 = ((x + w).floor() as i64).max(x0 + 1);
        let y1 = ((y + h).floor() as i64).max(y0 + 1);
        for py in y0..y1 {
            for px in x0..x1 {
                if alpha >= 1.0 {
                    self.set_px(px, py, color);
                } else {
                    self.blend_px(px, py, color, alpha);
                }
            }
        }
    }

    /// `size x size` opaque square anchored at the floored position: the
    /// plot primitive of the point variants.
    #[inline]
    pub fn fill_square(&mut self, x: f64, y: f64, size: u32, color: Rgb) {
        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        for py in y0..y0 + i64::from(size) {
            for px in x0..x0 + i64::from(size) {
                self.set_px(px, py, color);
            }
        }
    }

    pub fn stroke_line(&mut self, a: Point, b: Point, width: u32, color: Rgb, alpha: f64) {
        self.stroke_polyline(&[a, b], width, color, alpha);
    }

    /// Strokes connected segments. Interior joints are painted once, so
    /// translucent polylines do not double-darken where segments meet.
    pub fn stroke_polyline(&mut self, points: &[Point], width: u32, color: Rgb, alpha: f64) {
        if points.len() < 2 {
            return;
        }
        let width = width.max(1);
        // Thick translucent strokes need coverage dedup: stamped squares
        // overlap along the line and would compound the alpha.
        let mut covered: Option<HashSet<(i64, i64)>> =
            (alpha < 1.0 && width > 1).then(HashSet::new);

        for (si, pair) in points.windows(2).enumerate() {
            let last_segment = si == points.len() - 2;
            let pixels = line_pixels(pair[0], pair[1]);
            let cut = if last_segment { 0 } else { 1 };
            for &(px, py) in &pixels[..pixels.len() - cut.min(pixels.len())] {
                self.stamp(px, py, width, color, alpha, covered.as_mut());
            }
        }
        if let Some(set) = covered {
            for (px, py) in set {
                self.blend_px(px, py, color, alpha);
            }
        }
    }

    #[inline]
    fn stamp(
        &mut self,
        x: i64,
        y: i64,
        width: u32,
        color: Rgb,
        alpha: f64,
        covered: Option<&mut HashSet<(i64, i64)>>,
    ) {
        let half = i64::from(width / 2);
        match covered {
            Some(set) => {
                for py in y - half..y - half + i64::from(width) {
                    for px in x - half..x - half + i64::from(width) {
                        set.insert((px, py));
                    }
                }
            }
            None => {
                for py in y - half..y - half + i64::from(width) {
                    for px in x - half..x - half + i64::from(width) {
                        if alpha >= 1.0 {
                            self.set_px(px, py, color);
                        } else {
                            self.blend_px(px, py, color, alpha);
                        }
                    }
                }
            }
        }
    }

    /// Quadratic Bezier from `p0` to `p1` bent toward `ctrl`, flattened into
    /// line segments.
    pub fn stroke_quad(
        &mut self,
        p0: Point,
        ctrl: Point,
        p1: Point,
        width: u32,
        color: Rgb,
        alpha: f64,
    ) {
        let mut flat = Vec::with_capacity(QUAD_SEGMENTS as usize + 1);
        for i in 0..=QUAD_SEGMENTS {
            let t = f64::from(i) / f64::from(QUAD_SEGMENTS);
            let u = 1.0 - t;
            let x = u * u * p0.x + 2.0 * u * t * ctrl.x + t * t * p1.x;
            let y = u * u * p0.y + 2.0 * u * t * ctrl.y + t * t * p1.y;
            flat.push(Point::new(x, y));
        }
        self.stroke_polyline(&flat, width, color, alpha);
    }

    /// Fills a convex polygon with a linear gradient along `from -> to`.
    /// Scanline spans paint every covered pixel exactly once, so multiply
    /// compositing leaves no seam between adjacent fills.
    pub fn fill_convex_polygon_gradient(
        &mut self,
        verts: &[Point],
        from: Point,
        to: Point,
        c_from: Rgb,
        c_to: Rgb,
        multiply: bool,
    ) {
        if verts.len() < 3 {
            return;
        }
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let len_sq = dx * dx + dy * dy;

        let y_min = verts.iter().map(|v| v.y).fold(f64::INFINITY, f64::min);
        let y_max = verts.iter().map(|v| v.y).fold(f64::NEG_INFINITY, f64::max);
        let y0 = (y_min.floor() as i64).max(0);
        let y1 = (y_max.ceil() as i64).min(i64::from(self.height) - 1);

        for py in y0..=y1 {
            let scan = py as f64 + 0.5;
            let mut xs: Vec<f64> = Vec::with_capacity(2);
            for i in 0..verts.len() {
                let a = verts[i];
                let b = verts[(i + 1) % verts.len()];
                if (a.y <= scan && b.y > scan) || (b.y <= scan && a.y > scan) {
                    let t = (scan - a.y) / (b.y - a.y);
                    xs.push(a.x + t * (b.x - a.x));
                }
            }
            xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            for pair in xs.chunks_exact(2) {
                let x_start = pair[0].floor() as i64;
                let x_end = pair[1].ceil() as i64;
                for px in x_start..x_end {
                    let t = if len_sq == 0.0 {
                        0.0
                    } else {
                        let proj = ((px as f64 + 0.5 - from.x) * dx
                            + (py as f64 + 0.5 - from.y) * dy)
                            / len_sq;
                        proj.clamp(0.0, 1.0)
                    };
                    let color = c_from.lerp(c_to, t);
                    if multiply {
                        self.multiply_px(px, py, color);
                    } else {
                        self.set_px(px, py, color);
                    }
                }
            }
        }
    }

    pub fn fill_circle(&mut self, center: Point, radius: f64, color: Rgb) {
        let r = radius.max(0.0);
        let x0 = (center.x - r).floor() as i64;
        let x1 = (center.x + r).ceil() as i64;
        let y0 = (center.y - r).floor() as i64;
        let y1 = (center.y + r).ceil() as i64;
        let r_sq = r * r;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f64 + 0.5 - center.x;
                let dy = py as f64 + 0.5 - center.y;
                if dx * dx + dy * dy <= r_sq {
                    self.set_px(px, py, color);
                }
            }
        }
    }

    /// Blends `color` once into every pixel of `coverage`. Callers collect
    /// a whole stroke batch with [`line_coverage`]/[`quad_coverage`] first,
    /// so overlap inside the batch darkens once rather than per segment.
    pub fn blend_pixels(&mut self, coverage: &HashSet<(i64, i64)>, color: Rgb, alpha: f64) {
        for &(px, py) in coverage {
            self.blend_px(px, py, color, alpha);
        }
    }

    /// Binary PPM (P6, 8-bit).
    pub fn write_ppm<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "P6")?;
        writeln!(writer, "{} {}", self.width, self.height)?;
        writeln!(writer, "255")?;
        let mut bytes = Vec::with_capacity(self.data.len() * 3);
        for px in &self.data {
            bytes.extend_from_slice(&[px.r, px.g, px.b]);
        }
        writer.write_all(&bytes)
    }
}

/// Collects the 1 px coverage of the segment `a -> b` into `out`.
pub fn line_coverage(a: Point, b: Point, out: &mut HashSet<(i64, i64)>) {
    out.extend(line_pixels(a, b));
}

/// Collects the 1 px coverage of a flattened quadratic into `out`.
pub fn quad_coverage(p0: Point, ctrl: Point, p1: Point, out: &mut HashSet<(i64, i64)>) {
    let mut prev = p0;
    for i in 1..=QUAD_SEGMENTS {
        let t = f64::from(i) / f64::from(QUAD_SEGMENTS);
        let u = 1.0 - t;
        let x = u * u * p0.x + 2.0 * u * t * ctrl.x + t * t * p1.x;
        let y = u * u * p0.y + 2.0 * u * t * ctrl.y + t * t * p1.y;
        let next = Point::new(x, y);
        out.extend(line_pixels(prev, next));
        prev = next;
    }
}

/// Integer Bresenham between the floored endpoints, inclusive.
fn line_pixels(a: Point, b: Point) -> Vec<(i64, i64)> {
    let (mut x, mut y) = (a.x.floor() as i64, a.y.floor() as i64);
    let (x1, y1) = (b.x.floor() as i64, b.y.floor() as i64);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut out = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    loop {
        out.push((x, y));
        if x == x1 && y == y1 {
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
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_of(surface: &RasterSurface, color: Rgb) -> usize {
        surface.pixels().iter().filter(|&&p| p == color).count()
    }

    #[test]
    fn set_and_get_round_trip() {
        let mut s = RasterSurface::new(8, 8, Rgb::WHITE);
        s.set_px(3, 4, Rgb::BLACK);
        assert_eq!(s.px(3, 4), Some(Rgb::BLACK));
        assert_eq!(s.px(4, 3), Some(Rgb::WHITE));
    }

    #[test]
    fn out_of_bounds_writes_are_clipped() {
        let mut s = RasterSurface::new(4, 4, Rgb::WHITE);
        s.set_px(-1, 0, Rgb::BLACK);
        s.set_px(0, 99, Rgb::BLACK);
        s.fill_square(3.5, 3.5, 4, Rgb::BLACK);
        assert_eq!(s.px(99, 0), None);
        assert_eq!(count_of(&s, Rgb::BLACK), 1); // only (3, 3) landed
    }

    #[test]
    fn fill_rect_clips_and_counts() {
        let mut s = RasterSurface::new(10, 10, Rgb::WHITE);
        s.fill_rect(2.0, 2.0, 3.0, 2.0, Rgb::BLACK, 1.0);
        assert_eq!(count_of(&s, Rgb::BLACK), 6);
    }

    #[test]
    fn subpixel_rect_paints_one_column() {
        let mut s = RasterSurface::new(10, 10, Rgb::WHITE);
        s.fill_rect(5.2, 0.0, 0.3, 10.0, Rgb::BLACK, 1.0);
        assert_eq!(count_of(&s, Rgb::BLACK), 10);
    }

    #[test]
    fn diagonal_line_hits_both_endpoints() {
        let mut s = RasterSurface::new(10, 10, Rgb::WHITE);
        s.stroke_line(
            Point::new(0.0, 0.0),
            Point::new(9.0, 9.0),
            1,
            Rgb::BLACK,
            1.0,
        );
        assert_eq!(s.px(0, 0), Some(Rgb::BLACK));
        assert_eq!(s.px(9, 9), Some(Rgb::BLACK));
        assert_eq!(count_of(&s, Rgb::BLACK), 10);
    }

    #[test]
    fn thick_line_covers_width() {
        let mut s = RasterSurface::new(10, 10, Rgb::WHITE);
        s.stroke_line(
            Point::new(0.0, 5.0),
            Point::new(9.0, 5.0),
            3,
            Rgb::BLACK,
            1.0,
        );
        for x in 0..10 {
            assert_eq!(s.px(x, 4), Some(Rgb::BLACK));
            assert_eq!(s.px(x, 5), Some(Rgb::BLACK));
            assert_eq!(s.px(x, 6), Some(Rgb::BLACK));
        }
    }

    #[test]
    fn translucent_polyline_does_not_double_blend_joints() {
        let mut s = RasterSurface::new(20, 20, Rgb::WHITE);
        let pts = [
            Point::new(2.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(18.0, 10.0),
        ];
        s.stroke_polyline(&pts, 1, Rgb::BLACK, 0.5);
        let expected = Rgb::WHITE.blend_over(Rgb::BLACK, 0.5);
        assert_eq!(s.px(10, 10), Some(expected));
    }

    #[test]
    fn batched_coverage_blends_crossings_once() {
        let mut s = RasterSurface::new(20, 20, Rgb::WHITE);
        let mut coverage = HashSet::new();
        // Two segments crossing at (10, 10).
        line_coverage(Point::new(2.0, 10.0), Point::new(18.0, 10.0), &mut coverage);
        line_coverage(Point::new(10.0, 2.0), Point::new(10.0, 18.0), &mut coverage);
        s.blend_pixels(&coverage, Rgb::BLACK, 0.5);
        let expected = Rgb::WHITE.blend_over(Rgb::BLACK, 0.5);
        assert_eq!(s.px(10, 10), Some(expected));
        assert_eq!(s.px(5, 10), Some(expected));
        assert_eq!(s.px(10, 5), Some(expected));
    }

    #[test]
    fn quad_coverage_spans_the_endpoints() {
        let mut coverage = HashSet::new();
        quad_coverage(
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 10.0),
            &mut coverage,
        );
        assert!(coverage.contains(&(0, 10)));
        assert!(coverage.contains(&(20, 10)));
        // The curve bends toward the control point.
        assert!(coverage.iter().any(|&(_, y)| y < 8));
    }

    #[test]
    fn quad_curve_touches_its_endpoints() {
        let mut s = RasterSurface::new(30, 30, Rgb::WHITE);
        s.stroke_quad(
            Point::new(2.0, 20.0),
            Point::new(15.0, 0.0),
            Point::new(28.0, 20.0),
            1,
            Rgb::BLACK,
            1.0,
        );
        assert_eq!(s.px(2, 20), Some(Rgb::BLACK));
        assert_eq!(s.px(28, 20), Some(Rgb::BLACK));
        // The curve bends toward the control point above the chord.
        assert!(s
            .pixels()
            .iter()
            .enumerate()
            .any(|(i, &p)| p == Rgb::BLACK && (i as u32) / 30 < 15));
    }

    #[test]
    fn gradient_fill_runs_from_start_to_end_color() {
        let mut s = RasterSurface::new(12, 12, Rgb::WHITE);
        let verts = [
            Point::new(0.0, 0.0),
            Point::new(12.0, 0.0),
            Point::new(12.0, 12.0),
            Point::new(0.0, 12.0),
        ];
        s.fill_convex_polygon_gradient(
            &verts,
            Point::new(0.0, 0.0),
            Point::new(12.0, 0.0),
            Rgb::BLACK,
            Rgb::WHITE,
            false,
        );
        let left = s.px(0, 6).unwrap();
        let right = s.px(11, 6).unwrap();
        assert!(left.r < 20);
        assert!(right.r > 235);
    }

    #[test]
    fn multiply_fill_darkens_underlying_pixels() {
        let mut s = RasterSurface::new(8, 8, Rgb::new(200, 200, 200));
        let verts = [
            Point::new(0.0, 0.0),
            Point::new(8.0, 0.0),
            Point::new(8.0, 8.0),
            Point::new(0.0, 8.0),
        ];
        let half = Rgb::new(128, 128, 128);
        s.fill_convex_polygon_gradient(&verts, Point::new(0.0, 0.0), Point::new(8.0, 0.0), half, half, true);
        let px = s.px(4, 4).unwrap();
        assert_eq!(px.r, (200u16 * 128 / 255) as u8);
    }

    #[test]
    fn circle_fill_is_bounded_by_radius() {
        let mut s = RasterSurface::new(20, 20, Rgb::WHITE);
        s.fill_circle(Point::new(10.0, 10.0), 4.0, Rgb::BLACK);
        assert_eq!(s.px(10, 10), Some(Rgb::BLACK));
        assert_eq!(s.px(10, 3), Some(Rgb::WHITE));
        assert_eq!(s.px(17, 10), Some(Rgb::WHITE));
    }

    #[test]
    fn ppm_header_and_payload_size() {
        let s = RasterSurface::new(3, 2, Rgb::new(1, 2, 3));
        let mut out = Vec::new();
        s.write_ppm(&mut out).unwrap();
        let header = b"P6\n3 2\n255\n";
        assert!(out.starts_with(header));
        assert_eq!(out.len(), header.len() + 3 * 2 * 3);
        assert_eq!(&out[header.len()..header.len() + 3], &[1, 2, 3]);
    }
}
