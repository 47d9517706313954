// src/views/polygon.rs

//! Concentric polygon view: layer `L` is a ring of `S` strokes, one per
//! integer, so residue classes mod `S` line up radially. The cube variant
//! fixes a rotated hexagon and finishes with a shaded isometric overlay.

use std::f64::consts::FRAC_PI_6;

use log::{debug, warn};

use crate::color::{Rgb, BLACK};
use crate::config::{CubeConfig, PerformanceConfig, PolygonConfig};
use crate::geometry::{polygon_index, polygon_vertices, ring_point, Point};
use crate::scheduler::RunToken;
use crate::sieve::{Classification, SieveParts, SieveTable};
use crate::views::{classification_color, ControlEvent, View, ViewContext};

const BACKGROUND: Rgb = Rgb::new(0xf5, 0xf5, 0xf5);

/// Fewest sides that still make a ring.
const MIN_SIDES: u32 = 3;

/// Overlay frame stroke: width, paint, coverage.
const FRAME_WIDTH: u32 = 5;
const FRAME_ALPHA: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonVariant {
    General,
    Cube,
}

pub struct PolygonView {
    variant: PolygonVariant,
    sides: u32,
    spacing: f64,
    rotation: f64,
    limit: u64,
    chunk: u64,
    verts: Vec<Point>,
    token: Option<RunToken>,
    /// Next layer to draw, 1-based; equals the layer cap once done.
    next_layer: u64,
    done: bool,
}

impl PolygonView {
    #[must_use]
    pub fn polygon(config: &PolygonConfig, perf: &PerformanceConfig) -> Self {
        Self {
            variant: PolygonVariant::General,
            sides: config.sides.max(MIN_SIDES),
            spacing: config.spacing,
            rotation: 0.0,
            limit: config.limit,
            chunk: perf.layer_chunk,
            verts: Vec::new(),
            token: None,
            next_layer: 1,
            done: false,
        }
    }

    /// Hexagon rotated so a vertex points straight up; the finished rings
    /// read as an isometric cube once the overlay lands.
    #[must_use]
    pub fn cube(config: &CubeConfig, perf: &PerformanceConfig) -> Self {
        Self {
            variant: PolygonVariant::Cube,
            sides: 6,
            spacing: config.spacing,
            rotation: FRAC_PI_6,
            limit: config.limit,
            chunk: perf.layer_chunk,
            verts: Vec::new(),
            token: None,
            next_layer: 1,
            done: false,
        }
    }

    #[must_use]
    pub fn variant(&self) -> PolygonVariant {
        self.variant
    }

    #[must_use]
    pub fn sides(&self) -> u32 {
        self.sides
    }

    /// Classification of the side count itself, previewed while the user
    /// edits it. `None` past the sieve domain.
    #[must_use]
    pub fn side_classification(&self, table: &SieveTable) -> Option<Classification> {
        table.classify(u64::from(self.sides))
    }

    /// Rings drawn run `1..cap`; the overlay radius and the final count
    /// both use the cap itself.
    fn layer_cap(&self, surface_min: u32) -> u64 {
        let half = f64::from(surface_min) / 2.0;
        (half / self.spacing).floor() as u64
    }

    fn stroke_width(&self) -> u32 {
        // Slight overlap between rings so no background bleeds through.
        (self.spacing + 1.0).round() as u32
    }

    fn center(surface_w: u32, surface_h: u32) -> Point {
        Point::new(f64::from(surface_w) / 2.0, f64::from(surface_h) / 2.0)
    }

    fn draw_layer(&self, ctx: &mut ViewContext<'_>, layer: u64) {
        let center = Self::center(ctx.surface.width(), ctx.surface.height());
        let radius = layer as f64 * self.spacing;
        let width = self.stroke_width();
        for s in 0..self.sides {
            let n = polygon_index(layer, s, self.sides);
            let color = classification_color(ctx.table, n, &ctx.palette);
            let p1 = ring_point(center, radius, self.verts[s as usize]);
            let p2 = ring_point(center, radius, self.verts[s as usize + 1]);
            ctx.surface.stroke_line(p1, p2, width, color, 1.0);
        }
    }

    /// Shaded isometric overlay at the outermost ring: three multiply
    /// gradient faces, then the frame and the inner "Y".
    fn draw_cube_overlay(&self, ctx: &mut ViewContext<'_>, radius: f64) {
        let center = Self::center(ctx.surface.width(), ctx.surface.height());
        let v: Vec<Point> = self.verts[..6]
            .iter()
            .map(|&vert| ring_point(center, radius, vert))
            .collect();

        // Top face, lit white at the apex vertex and falling to grey.
        ctx.surface.fill_convex_polygon_gradient(
            &[center, v[3], v[4], v[5]],
            v[4],
            center,
            Rgb::new(0xff, 0xff, 0xff),
            Rgb::new(0xaa, 0xaa, 0xaa),
            true,
        );
        // Left face, shaded top to bottom.
        ctx.surface.fill_convex_polygon_gradient(
            &[center, v[1], v[2], v[3]],
            v[3],
            v[1],
            Rgb::new(0xdd, 0xdd, 0xdd),
            Rgb::new(0x77, 0x77, 0x77),
            true,
        );
        // Right face, darkest.
        ctx.surface.fill_convex_polygon_gradient(
            &[center, v[5], v[0], v[1]],
            v[5],
            v[1],
            Rgb::new(0x55, 0x55, 0x55),
            Rgb::new(0x11, 0x11, 0x11),
            true,
        );

        // Frame: the outer hexagon, then spokes to every second vertex.
        let ring: Vec<Point> = v.iter().copied().chain([v[0]]).collect();
        ctx.surface
            .stroke_polyline(&ring, FRAME_WIDTH, BLACK, FRAME_ALPHA);
        for &i in &[1usize, 3, 5] {
            ctx.surface
                .stroke_line(center, v[i], FRAME_WIDTH, BLACK, FRAME_ALPHA);
        }
    }

    fn finish(&mut self, ctx: &mut ViewContext<'_>) {
        if self.variant == PolygonVariant::Cube {
            let radius = self.next_layer as f64 * self.spacing;
            self.draw_cube_overlay(ctx, radius);
        }
        self.done = true;
    }
}

impl View for PolygonView {
    fn name(&self) -> &'static str {
        match self.variant {
            PolygonVariant::General => "polygon",
            PolygonVariant::Cube => "cube",
        }
    }

    fn required_limit(&self, _size: u32) -> u64 {
        self.limit
    }

    fn required_parts(&self) -> SieveParts {
        SieveParts::PRIMALITY | SieveParts::MOBIUS
    }

    fn restart(&mut self, ctx: &mut ViewContext<'_>) {
        ctx.surface.clear(ctx.background_or(BACKGROUND));
        self.verts = polygon_vertices(self.sides, self.rotation);
        self.next_layer = 1;
        self.done = false;
        let cap = self.layer_cap(ctx.surface.width().min(ctx.surface.height()));
        self.token = Some(ctx.scheduler.begin(cap.saturating_sub(1), self.chunk));
    }

    fn tick(&mut self, ctx: &mut ViewContext<'_>) {
        if self.done {
            return;
        }
        let Some(token) = self.token else { return };
        if let Some(range) = ctx.scheduler.next_slice(token) {
            for index in range {
                let layer = index + 1;
                self.draw_layer(ctx, layer);
                self.next_layer = layer + 1;
            }
        }
        if ctx.scheduler.is_idle() {
            self.finish(ctx);
        }
    }

    fn handle_event(&mut self, ctx: &mut ViewContext<'_>, event: &ControlEvent) {
        match event {
            ControlEvent::Reset
            | ControlEvent::Resized { .. }
            | ControlEvent::ThemeChanged => self.restart(ctx),
            ControlEvent::SidesChanged(sides) => {
                if self.variant == PolygonVariant::Cube {
                    return;
                }
                if *sides < MIN_SIDES {
                    warn!("side count {sides} below {MIN_SIDES}; clamping");
                }
                self.sides = (*sides).max(MIN_SIDES);
                debug!(
                    "side count {} classifies as {:?}",
                    self.sides,
                    self.side_classification(ctx.table),
                );
                self.restart(ctx);
            }
            _ => {}
        }
    }

    fn status(&self) -> String {
        let count = self.next_layer * u64::from(self.sides);
        if self.done {
            format!("{count}")
        } else {
            format!("⏳ {count}")
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ChunkedScheduler;
    use crate::sieve;
    use crate::surface::RasterSurface;
    use crate::theme::ThemeColors;

    fn sieve_table() -> SieveTable {
        sieve::build(1000, SieveParts::PRIMALITY | SieveParts::MOBIUS).expect("sieve")
    }

    fn run_to_done(view: &mut PolygonView, size: u32) -> RasterSurface {
        let mut surface = RasterSurface::new(size, size, BACKGROUND);
        let mut scheduler = ChunkedScheduler::new();
        let table = sieve_table();
        let mut ctx = ViewContext {
            surface: &mut surface,
            table: &table,
            scheduler: &mut scheduler,
            palette: ThemeColors::default(),
            background: None,
        };
        view.restart(&mut ctx);
        for _ in 0..100 {
            if view.is_done() {
                break;
            }
            view.tick(&mut ctx);
        }
        surface
    }

    fn small_polygon(sides: u32) -> PolygonView {
        let config = PolygonConfig {
            limit: 1000,
            spacing: 2.0,
            sides,
        };
        PolygonView::polygon(&config, &PerformanceConfig::default())
    }

    fn small_cube() -> PolygonView {
        let config = CubeConfig {
            limit: 1000,
            spacing: 2.0,
        };
        PolygonView::cube(&config, &PerformanceConfig::default())
    }

    #[test]
    fn final_count_is_layer_cap_times_sides() {
        let mut view = small_polygon(6);
        let surface = run_to_done(&mut view, 100);
        assert!(view.is_done());
        // cap = (100 / 2) / 2 = 25 layers.
        assert_eq!(view.status(), "150");
        // The rings stay inside the inscribed circle.
        assert_eq!(surface.px(0, 0), Some(BACKGROUND));
    }

    #[test]
    fn square_variant_counts_four_per_layer() {
        let mut view = small_polygon(4);
        let surface = run_to_done(&mut view, 40);
        assert_eq!(view.name(), "polygon");
        assert_eq!(view.status(), "40");
        assert_eq!(surface.px(0, 0), Some(BACKGROUND));
    }

    #[test]
    fn rings_paint_something() {
        let mut view = small_polygon(6);
        let surface = run_to_done(&mut view, 100);
        let painted = surface
            .pixels()
            .iter()
            .filter(|&&px| px != BACKGROUND)
            .count();
        assert!(painted > 100, "painted {painted} pixels");
    }

    #[test]
    fn cube_overlay_darkens_the_center() {
        let mut view = small_cube();
        let surface = run_to_done(&mut view, 20);
        assert_eq!(view.name(), "cube");
        // cap = 5 layers of 6.
        assert_eq!(view.status(), "30");
        // The frame "Y" meets at the center; multiply plus the stroke can
        // only darken.
        let center = surface.px(10, 10).expect("in bounds");
        assert!(center.r < 0xf5 && center.g < 0xf5 && center.b < 0xf5);
        // Corners sit outside the hexagon and the rings.
        assert_eq!(surface.px(0, 0), Some(BACKGROUND));
    }

    #[test]
    fn side_count_edits_clamp_and_restart() {
        let mut view = small_polygon(6);
        run_to_done(&mut view, 40);
        assert!(view.is_done());

        let mut surface = RasterSurface::new(40, 40, BACKGROUND);
        let mut scheduler = ChunkedScheduler::new();
        let table = sieve_table();
        let mut ctx = ViewContext {
            surface: &mut surface,
            table: &table,
            scheduler: &mut scheduler,
            palette: ThemeColors::default(),
            background: None,
        };
        view.handle_event(&mut ctx, &ControlEvent::SidesChanged(1));
        assert_eq!(view.sides(), 3);
        assert!(!view.is_done());
        assert_eq!(view.side_classification(&table), Some(Classification::Prime));

        view.handle_event(&mut ctx, &ControlEvent::SidesChanged(12));
        assert_eq!(view.sides(), 12);
        assert_eq!(
            view.side_classification(&table),
            Some(Classification::MuZero),
        );
    }

    #[test]
    fn cube_ignores_side_count_edits() {
        let mut view = small_cube();
        run_to_done(&mut view, 20);

        let mut surface = RasterSurface::new(20, 20, BACKGROUND);
        let mut scheduler = ChunkedScheduler::new();
        let table = sieve_table();
        let mut ctx = ViewContext {
            surface: &mut surface,
            table: &table,
            scheduler: &mut scheduler,
            palette: ThemeColors::default(),
            background: None,
        };
        view.handle_event(&mut ctx, &ControlEvent::SidesChanged(8));
        assert_eq!(view.sides(), 6);
        assert!(view.is_done());
    }
}
