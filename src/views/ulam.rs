// src/views/ulam.rs

//! Ulam spiral view: integers on an outward square-lattice walk. The walk
//! step equals the plot size, so the lattice tiles the canvas exactly and
//! the sieve domain is derived from canvas area rather than fixed.

use crate::color::{Rgb, WHITE};
use crate::config::{PerformanceConfig, UlamConfig};
use crate::geometry::{Point, UlamWalk};
use crate::scheduler::RunToken;
use crate::sieve::SieveParts;
use crate::views::{classification_color, ControlEvent, View, ViewContext};

const BACKGROUND: Rgb = WHITE;

pub struct UlamView {
    pixel_size: u32,
    exit_margin: u32,
    chunk: u64,
    walk: Option<UlamWalk>,
    token: Option<RunToken>,
    /// Next integer to place; after the run stops, the one whose cell sat
    /// past the exit margin on both axes.
    cursor: u64,
    done: bool,
}

impl UlamView {
    #[must_use]
    pub fn new(config: &UlamConfig, perf: &PerformanceConfig) -> Self {
        Self {
            pixel_size: config.pixel_size,
            exit_margin: config.exit_margin,
            chunk: perf.ulam_chunk,
            walk: None,
            token: None,
            cursor: 1,
            done: false,
        }
    }

    /// Enumeration bound for the scheduler: a ring count that safely
    /// covers the canvas plus the exit margin. The margin check is the
    /// real terminator.
    fn enumeration_bound(&self, width: u32, height: u32) -> u64 {
        let px = u64::from(self.pixel_size.max(1));
        let margin = 2 * u64::from(self.exit_margin);
        let cols = (u64::from(width) + margin) / px + 6;
        let rows = (u64::from(height) + margin) / px + 6;
        cols * rows
    }
}

impl View for UlamView {
    fn name(&self) -> &'static str {
        "ulam"
    }

    /// One cell per `pixel_size` square of canvas, plus slack so the last
    /// partially visible ring still classifies.
    fn required_limit(&self, size: u32) -> u64 {
        let area = u64::from(size) * u64::from(size);
        let cell = u64::from(self.pixel_size.max(1));
        (area + cell * cell - 1) / (cell * cell) + 1000
    }

    fn required_parts(&self) -> SieveParts {
        SieveParts::PRIMALITY | SieveParts::MOBIUS
    }

    fn restart(&mut self, ctx: &mut ViewContext<'_>) {
        ctx.surface.clear(ctx.background_or(BACKGROUND));
        let center = Point::new(
            f64::from(ctx.surface.width() / 2),
            f64::from(ctx.surface.height() / 2),
        );
        self.walk = Some(UlamWalk::new(center, f64::from(self.pixel_size)));
        self.cursor = 1;
        self.done = false;
        self.token = Some(ctx.scheduler.begin(
            self.enumeration_bound(ctx.surface.width(), ctx.surface.height()),
            self.chunk,
        ));
    }

    fn tick(&mut self, ctx: &mut ViewContext<'_>) {
        if self.done {
            return;
        }
        let Some(token) = self.token else { return };
        let Some(walk) = self.walk.as_mut() else { return };
        let Some(range) = ctx.scheduler.next_slice(token) else {
            return;
        };

        let cx = f64::from(ctx.surface.width() / 2);
        let cy = f64::from(ctx.surface.height() / 2);
        let exit_x = f64::from(ctx.surface.width()) / 2.0 + f64::from(self.exit_margin);
        let exit_y = f64::from(ctx.surface.height()) / 2.0 + f64::from(self.exit_margin);

        for index in range {
            let num = index + 1;
            let p = walk.advance();
            if (p.x - cx).abs() > exit_x && (p.y - cy).abs() > exit_y {
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
