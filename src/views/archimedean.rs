// src/views/archimedean.rs

//! Archimedean spiral view: integers wind outward along `r = pitch*sqrt(n)`
//! and stop at the inscribed circle, so consecutive integers land next to
//! each other and prime rays curve visibly.

use crate::color::{Rgb, WHITE};
use crate::config::{ArchimedeanConfig, PerformanceConfig};
use crate::geometry::{archimedean, Point};
use crate::scheduler::RunToken;
use crate::sieve::SieveParts;
use crate::views::{classification_color, ControlEvent, View, ViewContext};

const BACKGROUND: Rgb = WHITE;

pub struct ArchimedeanView {
    limit: u64,
    pixel_size: u32,
    pitch: f64,
    chunk: u64,
    token: Option<RunToken>,
    /// Next integer to place; after the run stops, the first one that fell
    /// outside the inscribed circle.
    cursor: u64,
    done: bool,
}

impl ArchimedeanView {
    #[must_use]
    pub fn new(config: &ArchimedeanConfig, perf: &PerformanceConfig) -> Self {
        Self {
            limit: config.limit,
            pixel_size: config.pixel_size,
            pitch: config.pitch,
            chunk: perf.archimedean_chunk,
            token: None,
            cursor: 1,
            done: false,
        }
    }

    /// Enumeration bound handed to the scheduler. The radius check is the
    /// real terminator; this just needs to lie past it.
    fn enumeration_bound(&self, max_radius: f64) -> u64 {
        (max_radius / self.pitch).powi(2).ceil() as u64 + 16
    }
}

impl View for ArchimedeanView {
    fn name(&self) -> &'static str {
        "archimedean"
    }

    fn required_limit(&self, _size: u32) -> u64 {
        self.limit
    }

    fn required_parts(&self) -> SieveParts {
        SieveParts::PRIMALITY | SieveParts::MOBIUS
    }

    fn restart(&mut self, ctx: &mut ViewContext<'_>) {
        ctx.surface.clear(ctx.background_or(BACKGROUND));
        let max_radius =
            f64::from(ctx.surface.width().min(ctx.surface.height())) / 2.0;
        self.cursor = 1;
        self.done = false;
        self.token = Some(
            ctx.scheduler
                .begin(self.enumeration_bound(max_radius), self.chunk),
        );
    }

    fn tick(&mut self, ctx: &mut ViewContext<'_>) {
        if self.done {
            return;
        }
        let Some(token) = self.token else { return };
        let Some(range) = ctx.scheduler.next_slice(token) else {
            return;
        };

        let center = Point::new(
            f64::from(ctx.surface.width()) / 2.0,
            f64::from(ctx.surface.height()) / 2.0,
        );
        let max_radius =
            f64::from(ctx.surface.width().min(ctx.surface.height())) / 2.0;

        for index in range {
            let num = index + 1;
            let p = archimedean(num, self.pitch, center);
            if p.radius > max_radius {
                ctx.scheduler.finish(token);
                self.cursor = num;
                self.done = true;
                return;
            }
            if (num as usize) < ctx.table.limit() {
                let color = classification_color(ctx.table, num, &ctx.palette);
                ctx.surface.fill_square(p.x, p.y, self.pixel_size, color);
            }
            self.cursor = num + 1;
        }

        if ctx.scheduler.is_idle() {
            self.done = true;
        }
    }

    fn handle_event(&mut self, ctx: &mut ViewContext<'_>, event: &ControlEvent) {
        match event {
            ControlEvent::Reset
            | ControlEvent::Resized { .. }
            | ControlEvent::ThemeChanged => self.restart(ctx),
            _ => {}
        }
    }

    fn status(&self) -> String {
        if self.done {
            format!("{}", self.cursor)
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
    use crate::scheduler::ChunkedScheduler;
    use crate::sieve;
    use crate::surface::RasterSurface;
    use crate::theme::ThemeColors;
    use crate::views::TWIN_DARKEN;

    fn view() -> ArchimedeanView {
        let config = ArchimedeanConfig {
            limit: 10_000,
            pixel_size: 2,
            pitch: 1.5,
        };
        ArchimedeanView::new(&config, &PerformanceConfig::default())
    }

    fn run_to_done(
        view: &mut ArchimedeanView,
        surface: &mut RasterSurface,
        scheduler: &mut ChunkedScheduler,
    ) {
        let table = sieve::build(10_000, SieveParts::PRIMALITY | SieveParts::MOBIUS)
            .expect("sieve");
        let mut ctx = ViewContext {
            surface,
            table: &table,
            scheduler,
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
    }

    #[test]
    fn stops_at_the_inscribed_circle() {
        let mut view = view();
        let mut surface = RasterSurface::new(200, 200, WHITE);
        let mut scheduler = ChunkedScheduler::new();
        run_to_done(&mut view, &mut surface, &mut scheduler);

        assert!(view.is_done());
        // First n with 1.5*sqrt(n) > 100 is 4445.
        assert_eq!(view.status(), "4445");
        assert!(scheduler.is_idle());
    }

    #[test]
    fn paints_twin_primes_darker() {
        let mut view = view();
        let mut surface = RasterSurface::new(200, 200, WHITE);
        let mut scheduler = ChunkedScheduler::new();
        run_to_done(&mut view, &mut surface, &mut scheduler);

        let palette = ThemeColors::default();
        // n = 5 (twin) lands at (100, 103) on a 200x200 surface.
        assert_eq!(
            surface.px(100, 103),
            Some(palette.prime.darken(TWIN_DARKEN)),
        );
        // The spiral never reaches the corners.
        assert_eq!(surface.px(0, 0), Some(WHITE));
    }

    #[test]
    fn restart_clears_previous_output() {
        let mut view = view();
        let mut surface = RasterSurface::new(200, 200, WHITE);
        let mut scheduler = ChunkedScheduler::new();
        run_to_done(&mut view, &mut surface, &mut scheduler);
        assert_ne!(surface.px(100, 103), Some(WHITE));

        let table = sieve::build(10_000, SieveParts::PRIMALITY | SieveParts::MOBIUS)
            .expect("sieve");
        let mut ctx = ViewContext {
            surface: &mut surface,
            table: &table,
            scheduler: &mut scheduler,
            palette: ThemeColors::default(),
            background: None,
        };
        view.handle_event(&mut ctx, &ControlEvent::Reset);
        assert!(!view.is_done());
        assert_eq!(ctx.surface.px(100, 103), Some(WHITE));
        assert!(view.status().starts_with('⏳'));
    }

    #[test]
    fn declares_its_sieve_needs() {
        let view = view();
        assert_eq!(view.required_limit(800), 10_000);
        assert!(view.required_parts().contains(SieveParts::MOBIUS));
    }
}
