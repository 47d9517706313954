// src/views/zeta.rs

//! Critical-line trajectory of the zeta function: the path of
//! `zeta(1/2 + it)` as `t` climbs, over Möbius-colored background stripes,
//! with the partial-sum spiral for the current height. This view is a
//! continuous animation, so it bypasses the chunked scheduler entirely;
//! every tick redraws the whole frame and `is_done` never fires.

use std::collections::VecDeque;

use crate::color::{Rgb, BLACK, WHITE};
use crate::config::ZetaConfig;
use crate::geometry::Point;
use crate::sieve::SieveParts;
use crate::views::{ControlEvent, View, ViewContext};
use crate::zeta::{partial_sums, zeta_half_line, Complex};

const BACKGROUND: Rgb = WHITE;
const AXIS: Rgb = Rgb::new(0xee, 0xee, 0xee);
const STRIPE_ALPHA: f64 = 0.2;
const TRAIL_WIDTH: u32 = 2;
const POINT_RADIUS: f64 = 4.0;

pub struct ZetaView {
    eta_terms: u32,
    sum_terms: u32,
    history_cap: usize,
    dt: f64,
    zoom_lerp: f64,
    range_pad: f64,
    stripe_count: u64,
    t: f64,
    playing: bool,
    history: VecDeque<Complex>,
    /// Zoom factor carried between frames; `None` until the first frame
    /// snaps it to the target. Reset does not clear it, so the camera eases
    /// back instead of jumping.
    scale: Option<f64>,
}

impl ZetaView {
    #[must_use]
    pub fn new(config: &ZetaConfig) -> Self {
        Self {
            eta_terms: config.eta_terms,
            sum_terms: config.sum_terms,
            history_cap: config.history_cap,
            dt: config.dt,
            zoom_lerp: config.zoom_lerp,
            range_pad: config.range_pad,
            stripe_count: config.stripe_count,
            t: 0.0,
            playing: true,
            history: VecDeque::new(),
            scale: None,
        }
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// One full frame: stripes, axes, trail, partial-sum spiral, current
    /// point. While playing this also records the point and advances `t`.
    fn draw_frame(&mut self, ctx: &mut ViewContext<'_>) {
        let w = f64::from(ctx.surface.width());
        let h = f64::from(ctx.surface.height());
        ctx.surface.clear(ctx.background_or(BACKGROUND));
        let cx = w / 2.0;
        let cy = h / 2.0;

        // Ease the zoom toward whatever range the trail has reached.
        let mut max_range = 2.0f64;
        for p in &self.history {
            max_range = max_range.max(p.abs());
        }
        let target = (w.min(h) / 2.0) / (max_range * self.range_pad);
        let scale = match self.scale {
            None => target,
            Some(s) => s + (target - s) * self.zoom_lerp,
        };
        self.scale = Some(scale);

        // One stripe per integer, mirrored around the imaginary axis.
        let unit = scale / 2.0;
        for n in 1..self.stripe_count {
            let Some(m) = ctx.table.mobius(n) else { break };
            let color = match m {
                -1 => ctx.palette.mu_neg,
                0 => ctx.palette.mu_zero,
                _ => ctx.palette.mu_pos,
            };
            let x_right = cx + (n - 1) as f64 * unit;
            if x_right < w {
                ctx.surface
                    .fill_rect(x_right, 0.0, unit, h, color, STRIPE_ALPHA);
            }
            let x_left = cx - n as f64 * unit;
            if x_left + unit > 0.0 {
                ctx.surface
                    .fill_rect(x_left, 0.0, unit, h, color, STRIPE_ALPHA);
            }
        }

        ctx.surface
            .stroke_line(Point::new(0.0, cy), Point::new(w, cy), 1, AXIS, 1.0);
        ctx.surface
            .stroke_line(Point::new(cx, 0.0), Point::new(cx, h), 1, AXIS, 1.0);

        let z = zeta_half_line(self.t, self.eta_terms);
        if self.playing {
            self.history.push_back(z);
            if self.history.len() > self.history_cap {
                self.history.pop_front();
            }
        }

        // Screen y is flipped: positive imaginary part points up.
        if self.history.len() > 1 {
            let trail: Vec<Point> = self
                .history
                .iter()
                .map(|p| Point::new(cx + p.re * scale, cy - p.im * scale))
                .collect();
            ctx.surface
                .stroke_polyline(&trail, TRAIL_WIDTH, ctx.palette.zeta_curve, 1.0);
        }

        let mut spiral = Vec::with_capacity(self.sum_terms as usize + 1);
        spiral.push(Point::new(cx, cy));
        for s in partial_sums(0.5, self.t, self.sum_terms) {
            spiral.push(Point::new(cx + s.re * scale, cy - s.im * scale));
        }
        ctx.surface
            .stroke_polyline(&spiral, 1, ctx.palette.zeta_sum, 1.0);

        ctx.surface.fill_circle(
            Point::new(cx + z.re * scale, cy - z.im * scale),
            POINT_RADIUS,
            BLACK,
        );

        if self.playing {
            self.t += self.dt;
        }
    }
}

impl View for ZetaView {
    fn name(&self) -> &'static str {
        "zeta"
    }

    fn required_limit(&self, _size: u32) -> u64 {
        self.stripe_count
    }

    fn required_parts(&self) -> SieveParts {
        SieveParts::PRIMALITY | SieveParts::MOBIUS
    }

    /// Draws the first frame. The clock and trail survive restarts; only
    /// the raster is rebuilt.
    fn restart(&mut self, ctx: &mut ViewContext<'_>) {
        self.draw_frame(ctx);
    }

    fn tick(&mut self, ctx: &mut ViewContext<'_>) {
        if self.playing {
            self.draw_frame(ctx);
        }
    }

    fn handle_event(&mut self, ctx: &mut ViewContext<'_>, event: &ControlEvent) {
        match event {
            ControlEvent::PlayPause => {
                self.playing = !self.playing;
            }
            ControlEvent::SetTime(value) => {
                self.t = if value.is_finite() { *value } else { 0.0 };
                if !self.playing {
                    self.draw_frame(ctx);
                }
            }
            ControlEvent::Reset => {
                self.t = 0.0;
                self.history.clear();
                if !self.playing {
                    self.draw_frame(ctx);
                }
            }
            ControlEvent::Resized { .. } | ControlEvent::ThemeChanged => {
                if !self.playing {
                    self.draw_frame(ctx);
                }
            }
            _ => {}
        }
    }

    fn status(&self) -> String {
        format!("t = {:.2}", self.t)
    }

    fn is_done(&self) -> bool {
        false
    }
}
