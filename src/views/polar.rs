// src/views/polar.rs

//! Residue-class disc with gap drill-down. Working-set members (primes at
//! the root, gap occurrences once drilled) map to polar spokes; ranked gap
//! candidates overlay as translucent connectors, drawn as petal loops when
//! both endpoints share a slice. An optional finishing pass traces the mean
//! factor count per slice as a smoothed wave.

use std::collections::HashSet;
use std::f64::consts::PI;

use log::{debug, warn};

use crate::color::{Rgb, WHITE};
use crate::config::{ExplorerConfig, PerformanceConfig};
use crate::explorer::{Explorer, GapAnalysisOptions, GapRecord};
use crate::geometry::{polar_map, same_slice, slice_angle, Point, SliceTable};
use crate::scheduler::RunToken;
use crate::sieve::{SieveParts, SieveTable};
use crate::surface::{line_coverage, quad_coverage};
use crate::views::{ControlEvent, View, ViewContext};

const BACKGROUND: Rgb = WHITE;
const GUIDE: Rgb = Rgb::new(0xe0, 0xe0, 0xe0);
const CONNECTOR: Rgb = Rgb::new(0, 150, 255);
const CONNECTOR_ALPHA: f64 = 0.4;
const WAVE_ALPHA: f64 = 0.35;
const WAVE_WIDTH: u32 = 2;

/// Mapped angles closer than this count as the same slice.
const SLICE_EPSILON: f64 = 0.01;

pub const MIN_MODULUS: u32 = 12;
pub const MAX_MODULUS: u32 = 144;

pub struct PolarView {
    limit: u64,
    pixel_size: u32,
    modulus: u32,
    margin: f64,
    frequency_wave: bool,
    options: GapAnalysisOptions,
    chunk: u64,
    connector_batch: usize,
    slice_table: SliceTable,
    explorer: Option<Explorer>,
    /// Ranked candidates for the current working set, in display order;
    /// hover and select events index into this list.
    candidates: Vec<GapRecord>,
    /// Last drilled record, re-overlaid when the modulus changes.
    selected: Option<GapRecord>,
    /// Overlay to draw when the point pass completes, consumed once.
    pending_overlay: Option<GapRecord>,
    /// Sieve bound the explorer was built against.
    domain: u64,
    token: Option<RunToken>,
    cursor: u64,
    done: bool,
}

impl PolarView {
    #[must_use]
    pub fn new(config: &ExplorerConfig, perf: &PerformanceConfig) -> Self {
        let modulus = config.modulus.clamp(MIN_MODULUS, MAX_MODULUS);
        Self {
            limit: config.limit,
            pixel_size: config.pixel_size,
            modulus,
            margin: config.margin,
            frequency_wave: config.frequency_wave,
            options: config.analysis,
            chunk: perf.polar_chunk,
            connector_batch: perf.connector_batch,
            slice_table: SliceTable::new(modulus),
            explorer: None,
            candidates: Vec::new(),
            selected: None,
            pending_overlay: None,
            domain: 0,
            token: None,
            cursor: 0,
            done: false,
        }
    }

    #[must_use]
    pub fn modulus(&self) -> u32 {
        self.modulus
    }

    #[must_use]
    pub fn candidates(&self) -> &[GapRecord] {
        &self.candidates
    }

    /// Ranked candidate labels with occurrence counts, in display order.
    #[must_use]
    pub fn candidate_labels(&self) -> Vec<String> {
        let parent = self
            .explorer
            .as_ref()
            .map_or("Primes", Explorer::parent_label);
        self.candidates
            .iter()
            .map(|record| {
                format!(
                    "{} ({})",
                    crate::explorer::gap_label(parent, record.gap),
                    record.count,
                )
            })
            .collect()
    }

    #[must_use]
    pub fn breadcrumb(&self) -> String {
        self.explorer
            .as_ref()
            .map_or_else(|| String::from("Primes"), Explorer::breadcrumb)
    }

    /// Candidate panel headline.
    #[must_use]
    pub fn summary_line(&self) -> String {
        if self.candidates.is_empty() {
            String::from("No significant patterns found.")
        } else {
            let len = self.explorer.as_ref().map_or(0, |e| e.working_set().len());
            format!("Found {len} items")
        }
    }

    #[must_use]
    pub fn displayed(&self) -> u64 {
        let len = self.explorer.as_ref().map_or(0, |e| e.working_set().len());
        (len as u64).min(self.limit)
    }

    /// Rebuilds the explorer when the sieve bound moved (startup, or a
    /// reconfigured domain). Drops any drill-down into the old sequence.
    fn sync_with_table(&mut self, table: &SieveTable) {
        let bound = table.limit() as u64;
        if self.domain == bound && self.explorer.is_some() {
            return;
        }
        let explorer = Explorer::new(table.primes(), self.options);
        self.candidates = explorer.candidates();
        debug!(
            "explorer over {} primes below {bound}; {} candidates",
            explorer.working_set().len(),
            self.candidates.len(),
        );
        self.explorer = Some(explorer);
        self.domain = bound;
        self.selected = None;
        self.pending_overlay = None;
    }

    fn center(surface_w: u32, surface_h: u32) -> Point {
        Point::new(f64::from(surface_w) / 2.0, f64::from(surface_h) / 2.0)
    }

    fn max_radius(&self, surface_w: u32, surface_h: u32) -> f64 {
        f64::from(surface_w.min(surface_h)) / 2.0 - self.margin
    }

    fn draw_guides(&self, ctx: &mut ViewContext<'_>) {
        let center = Self::center(ctx.surface.width(), ctx.surface.height());
        let max_radius = self.max_radius(ctx.surface.width(), ctx.surface.height());
        for residue in 0..self.modulus {
            let rim = Point::new(
                center.x + max_radius * self.slice_table.cos(residue),
                center.y + max_radius * self.slice_table.sin(residue),
            );
            ctx.surface.stroke_line(center, rim, 1, GUIDE, 1.0);
        }
    }

    /// Connector overlay for one gap record: `mapped(p) -> mapped(p+gap)`
    /// per occurrence, petal loops for same-slice pairs. Coverage is
    /// flushed per batch so overlap inside a batch darkens once.
    fn draw_connectors(&self, ctx: &mut ViewContext<'_>, record: &GapRecord) {
        let center = Self::center(ctx.surface.width(), ctx.surface.height());
        let max_radius = self.max_radius(ctx.surface.width(), ctx.surface.height());
        let mut coverage = HashSet::new();
        let mut in_batch = 0usize;

        for &start in record.occurrences.iter() {
            if start > self.domain {
                break;
            }
            let p1 = polar_map(start, self.modulus, self.domain, max_radius, center);
            let p2 = polar_map(
                start + record.gap,
                self.modulus,
                self.domain,
                max_radius,
                center,
            );
            let a = Point::new(p1.x, p1.y);
            let b = Point::new(p2.x, p2.y);
            if same_slice(p1.angle, p2.angle, SLICE_EPSILON) {
                let loop_height = 30.0 + (p1.radius / max_radius) * 50.0;
                let ctrl = Point::new(
                    (p1.x + p2.x) / 2.0 - p1.angle.sin() * loop_height,
                    (p1.y + p2.y) / 2.0 + p1.angle.cos() * loop_height,
                );
                quad_coverage(a, ctrl, b, &mut coverage);
            } else {
                line_coverage(a, b, &mut coverage);
            }
            in_batch += 1;
            if in_batch == self.connector_batch {
                ctx.surface.blend_pixels(&coverage, CONNECTOR, CONNECTOR_ALPHA);
                coverage.clear();
                in_batch = 0;
            }
        }
        ctx.surface.blend_pixels(&coverage, CONNECTOR, CONNECTOR_ALPHA);
    }

    /// Mean distinct-factor count per residue class over the whole sieve
    /// domain, normalized min..max and traced as a closed smoothed loop at
    /// each slice's midpoint angle.
    fn draw_frequency_wave(&self, ctx: &mut ViewContext<'_>) {
        let m = self.modulus as usize;
        let mut sums = vec![0u64; m];
        let mut counts = vec![0u64; m];
        for n in 2..self.domain {
            if let Some(w) = ctx.table.omega(n) {
                let residue = (n % u64::from(self.modulus)) as usize;
                sums[residue] += u64::from(w);
                counts[residue] += 1;
            }
        }

        let mut means = vec![0.0f64; m];
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for i in 0..m {
            if counts[i] > 0 {
                means[i] = sums[i] as f64 / counts[i] as f64;
            }
            lo = lo.min(means[i]);
            hi = hi.max(means[i]);
        }
        if hi <= lo {
            return;
        }

        let center = Self::center(ctx.surface.width(), ctx.surface.height());
        let max_radius = self.max_radius(ctx.surface.width(), ctx.surface.height());
        let half_slice = PI / f64::from(self.modulus);
        let samples: Vec<Point> = (0..m)
            .map(|i| {
                let t = (means[i] - lo) / (hi - lo);
                let radius = t * max_radius;
                let angle = slice_angle(i as u32, self.modulus) + half_slice;
                Point::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                )
            })
            .collect();

        let mid = |a: Point, b: Point| Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        let mut anchor = mid(samples[m - 1], samples[0]);
        for i in 0..m {
            let next = mid(samples[i], samples[(i + 1) % m]);
            ctx.surface
                .stroke_quad(anchor, samples[i], next, WAVE_WIDTH, CONNECTOR, WAVE_ALPHA);
            anchor = next;
        }
    }

    fn finalize(&mut self, ctx: &mut ViewContext<'_>) {
        self.draw_guides(ctx);
        if let Some(record) = self.pending_overlay.take() {
            self.draw_connectors(ctx, &record);
        }
        if self.frequency_wave {
            self.draw_frequency_wave(ctx);
        }
        self.done = true;
    }
}

impl View for PolarView {
    fn name(&self) -> &'static str {
        "gaps"
    }

    fn required_limit(&self, _size: u32) -> u64 {
        self.limit
    }

    fn required_parts(&self) -> SieveParts {
        if self.frequency_wave {
            SieveParts::PRIMALITY | SieveParts::OMEGA
        } else {
            SieveParts::PRIMALITY
        }
    }

    fn restart(&mut self, ctx: &mut ViewContext<'_>) {
        self.sync_with_table(ctx.table);
        ctx.surface.clear(ctx.background_or(BACKGROUND));
        self.cursor = 0;
        self.done = false;
        let total = self
            .explorer
            .as_ref()
            .map_or(0, |e| e.working_set().len() as u64);
        self.token = Some(ctx.scheduler.begin(total, self.chunk));
    }

    fn tick(&mut self, ctx: &mut ViewContext<'_>) {
        if self.done {
            return;
        }
        let Some(token) = self.token else { return };
        let Some(explorer) = self.explorer.as_ref() else {
            return;
        };
        if let Some(range) = ctx.scheduler.next_slice(token) {
            let working = explorer.working_arc();
            let center = Self::center(ctx.surface.width(), ctx.surface.height());
            let max_radius = self.max_radius(ctx.surface.width(), ctx.surface.height());
            let domain = self.domain as f64;
            let color = ctx.palette.prime;

            for index in range {
                let n = working[index as usize];
                if n > self.domain {
                    ctx.scheduler.finish(token);
                    break;
                }
                let residue = (n % u64::from(self.modulus)) as u32;
                let radius = (n as f64 / domain).sqrt() * max_radius;
                let x = center.x + radius * self.slice_table.cos(residue);
                let y = center.y + radius * self.slice_table.sin(residue);
                ctx.surface.fill_square(x, y, self.pixel_size, color);
                self.cursor = index + 1;
            }
        }
        if ctx.scheduler.is_idle() {
            self.finalize(ctx);
        }
    }

    fn handle_event(&mut self, ctx: &mut ViewContext<'_>, event: &ControlEvent) {
        match event {
            ControlEvent::Reset => {
                if let Some(explorer) = self.explorer.as_mut() {
                    explorer.reset();
                    self.candidates = explorer.candidates();
                }
                self.selected = None;
                self.pending_overlay = None;
                self.restart(ctx);
            }
            ControlEvent::Resized { .. } | ControlEvent::ThemeChanged => self.restart(ctx),
            ControlEvent::ModulusChanged(modulus) => {
                let clamped = (*modulus).clamp(MIN_MODULUS, MAX_MODULUS);
                if clamped != *modulus {
                    warn!("slice count {modulus} outside {MIN_MODULUS}..={MAX_MODULUS}; clamping");
                }
                if clamped != self.modulus {
                    self.modulus = clamped;
                    self.slice_table = SliceTable::new(clamped);
                }
                self.pending_overlay = self.selected.clone();
                self.restart(ctx);
            }
            ControlEvent::SelectCandidate(index) => {
                let Some(record) = self.candidates.get(*index).cloned() else {
                    warn!("candidate index {index} out of range");
                    return;
                };
                if let Some(explorer) = self.explorer.as_mut() {
                    explorer.select(&record);
                    self.candidates = explorer.candidates();
                }
                self.selected = Some(record.clone());
                self.pending_overlay = Some(record);
                self.restart(ctx);
            }
            ControlEvent::HoverCandidate(index) => {
                if let Some(record) = self.candidates.get(*index).cloned() {
                    self.draw_connectors(ctx, &record);
                }
            }
            ControlEvent::HoverEnd => {
                self.pending_overlay = None;
                self.restart(ctx);
            }
            _ => {}
        }
    }

    fn status(&self) -> String {
        if self.done {
            format!("Displayed: {}", self.displayed())
        } else {
            format!("⏳ {}", self.cursor)
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::ScoreStrategy;
    use crate::scheduler::ChunkedScheduler;
    use crate::sieve;
    use crate::surface::RasterSurface;
    use crate::theme::ThemeColors;

    const PRIME: Rgb = Rgb::new(0x44, 0x44, 0x44);

    fn config(frequency_wave: bool) -> ExplorerConfig {
        ExplorerConfig {
            limit: 1000,
            pixel_size: 1,
            modulus: 12,
            margin: 10.0,
            analysis: GapAnalysisOptions {
                min_support: 2,
                top_k: 10,
                strategy: ScoreStrategy::Count,
            },
            frequency_wave,
        }
    }

    fn harness(view: &PolarView) -> (RasterSurface, ChunkedScheduler, SieveTable) {
        let surface = RasterSurface::new(100, 100, WHITE);
        let scheduler = ChunkedScheduler::new();
        let table = sieve::build(1000, view.required_parts()).expect("sieve");
        (surface, scheduler, table)
    }

    fn run_to_done(
        view: &mut PolarView,
        surface: &mut RasterSurface,
        scheduler: &mut ChunkedScheduler,
        table: &SieveTable,
        restart: bool,
    ) {
        let mut ctx = ViewContext {
            surface,
            table,
            scheduler,
            palette: ThemeColors::default(),
            background: None,
        };
        if restart {
            view.restart(&mut ctx);
        }
        for _ in 0..100 {
            if view.is_done() {
                break;
            }
            view.tick(&mut ctx);
        }
    }

    fn count_color(surface: &RasterSurface, color: Rgb) -> usize {
        surface.pixels().iter().filter(|&&px| px == color).count()
    }

    // Connector blue blended once over the white background.
    fn connector_on_white() -> Rgb {
        WHITE.blend_over(CONNECTOR, CONNECTOR_ALPHA)
    }

    #[test]
    fn root_pass_plots_spokes_and_guides() {
        let mut view = PolarView::new(&config(false), &PerformanceConfig::default());
        let (mut surface, mut scheduler, table) = harness(&view);
        run_to_done(&mut view, &mut surface, &mut scheduler, &table, true);

        assert!(view.is_done());
        // 168 primes below 1000.
        assert_eq!(view.status(), "Displayed: 168");
        assert_eq!(view.breadcrumb(), "Primes");
        // The guides pass over the spokes last, so only dots whose
        // rasterization differs from the guide line survive.
        assert!(count_color(&surface, PRIME) > 20);
        assert!(count_color(&surface, GUIDE) > 100);
        assert_eq!(surface.px(0, 0), Some(WHITE));
    }

    #[test]
    fn selection_drills_and_overlays_connectors() {
        let mut view = PolarView::new(&config(false), &PerformanceConfig::default());
        let (mut surface, mut scheduler, table) = harness(&view);
        run_to_done(&mut view, &mut surface, &mut scheduler, &table, true);

        let index = view
            .candidates()
            .iter()
            .position(|record| record.gap == 2)
            .expect("gap 2 ranked");
        let expected = view.candidates()[index].count as u64;

        let mut ctx = ViewContext {
            surface: &mut surface,
            table: &table,
            scheduler: &mut scheduler,
            palette: ThemeColors::default(),
            background: None,
        };
        view.handle_event(&mut ctx, &ControlEvent::SelectCandidate(index));
        assert!(!view.is_done());
        run_to_done(&mut view, &mut surface, &mut scheduler, &table, false);

        assert_eq!(view.breadcrumb(), "Primes > Twin Primes");
        assert_eq!(view.displayed(), expected);
        assert!(count_color(&surface, connector_on_white()) > 0);
        assert!(view.summary_line().starts_with("Found"));
    }

    #[test]
    fn hover_preview_is_transient() {
        let mut view = PolarView::new(&config(false), &PerformanceConfig::default());
        let (mut surface, mut scheduler, table) = harness(&view);
        run_to_done(&mut view, &mut surface, &mut scheduler, &table, true);
        assert_eq!(count_color(&surface, connector_on_white()), 0);

        let mut ctx = ViewContext {
            surface: &mut surface,
            table: &table,
            scheduler: &mut scheduler,
            palette: ThemeColors::default(),
            background: None,
        };
        view.handle_event(&mut ctx, &ControlEvent::HoverCandidate(0));
        // Hover draws straight onto the finished raster.
        assert!(view.is_done());
        assert!(count_color(&surface, connector_on_white()) > 0);

        let mut ctx = ViewContext {
            surface: &mut surface,
            table: &table,
            scheduler: &mut scheduler,
            palette: ThemeColors::default(),
            background: None,
        };
        view.handle_event(&mut ctx, &ControlEvent::HoverEnd);
        assert!(!view.is_done());
        run_to_done(&mut view, &mut surface, &mut scheduler, &table, false);
        assert_eq!(count_color(&surface, connector_on_white()), 0);
    }

    #[test]
    fn modulus_change_clamps_and_keeps_the_selection() {
        let mut view = PolarView::new(&config(false), &PerformanceConfig::default());
        let (mut surface, mut scheduler, table) = harness(&view);
        run_to_done(&mut view, &mut surface, &mut scheduler, &table, true);

        let index = view
            .candidates()
            .iter()
            .position(|record| record.gap == 2)
            .expect("gap 2 ranked");
        let mut ctx = ViewContext {
            surface: &mut surface,
            table: &table,
            scheduler: &mut scheduler,
            palette: ThemeColors::default(),
            background: None,
        };
        view.handle_event(&mut ctx, &ControlEvent::SelectCandidate(index));
        run_to_done(&mut view, &mut surface, &mut scheduler, &table, false);

        let mut ctx = ViewContext {
            surface: &mut surface,
            table: &table,
            scheduler: &mut scheduler,
            palette: ThemeColors::default(),
            background: None,
        };
        view.handle_event(&mut ctx, &ControlEvent::ModulusChanged(7));
        assert_eq!(view.modulus(), MIN_MODULUS);
        run_to_done(&mut view, &mut surface, &mut scheduler, &table, false);
        // The drilled selection's connectors come back after the redraw.
        assert!(count_color(&surface, connector_on_white()) > 0);
        assert_eq!(view.breadcrumb(), "Primes > Twin Primes");
    }

    #[test]
    fn reset_returns_to_the_root_sequence() {
        let mut view = PolarView::new(&config(false), &PerformanceConfig::default());
        let (mut surface, mut scheduler, table) = harness(&view);
        run_to_done(&mut view, &mut surface, &mut scheduler, &table, true);

        let mut ctx = ViewContext {
            surface: &mut surface,
            table: &table,
            scheduler: &mut scheduler,
            palette: ThemeColors::default(),
            background: None,
        };
        view.handle_event(&mut ctx, &ControlEvent::SelectCandidate(0));
        run_to_done(&mut view, &mut surface, &mut scheduler, &table, false);
        assert_ne!(view.breadcrumb(), "Primes");

        let mut ctx = ViewContext {
            surface: &mut surface,
            table: &table,
            scheduler: &mut scheduler,
            palette: ThemeColors::default(),
            background: None,
        };
        view.handle_event(&mut ctx, &ControlEvent::Reset);
        run_to_done(&mut view, &mut surface, &mut scheduler, &table, false);
        assert_eq!(view.breadcrumb(), "Primes");
        assert_eq!(view.displayed(), 168);
        assert_eq!(count_color(&surface, connector_on_white()), 0);
    }

    #[test]
    fn frequency_wave_is_opt_in() {
        let plain = PolarView::new(&config(false), &PerformanceConfig::default());
        assert!(!plain.required_parts().contains(SieveParts::OMEGA));

        let mut view = PolarView::new(&config(true), &PerformanceConfig::default());
        assert!(view.required_parts().contains(SieveParts::OMEGA));

        let (mut surface, mut scheduler, table) = harness(&view);
        run_to_done(&mut view, &mut surface, &mut scheduler, &table, true);
        let wave_on_white = WHITE.blend_over(CONNECTOR, WAVE_ALPHA);
        assert!(count_color(&surface, wave_on_white) > 0);
    }
}
