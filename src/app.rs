// src/app.rs

//! The application shell. Owns the long-lived pieces a render pass borrows
//! (surface, sieve table, scheduler, theme store, viewport) and drives the
//! active view through restarts, frames, and control events. Views never
//! allocate these; everything they touch is lent per call through
//! [`ViewContext`].

use anyhow::{Context, Result};
use log::{debug, info};

use crate::color::Rgb;
use crate::config::Config;
use crate::scheduler::{ChunkedScheduler, Progress};
use crate::sieve::{self, SieveTable};
use crate::surface::RasterSurface;
use crate::theme::ThemeStore;
use crate::viewport::Viewport;
use crate::views::{ControlEvent, View, ViewContext};

/// Coordinates one view against the shared surface, sieve, and scheduler.
///
/// The shell is the only place that reallocates: a resize rebuilds the
/// surface (and the sieve when the view's domain depends on the canvas),
/// cancelling the in-flight run first so no stale continuation paints into
/// the new buffer. Theme edits are picked up by polling the store's
/// revision counter at the top of each frame.
pub struct App {
    config: Config,
    theme: ThemeStore,
    /// Revision last rendered with; a mismatch at frame start restarts.
    theme_revision: u64,
    viewport: Viewport,
    surface: RasterSurface,
    table: SieveTable,
    scheduler: ChunkedScheduler,
    view: Box<dyn View>,
    status: String,
}

impl App {
    /// Builds the shell around `view`, sizing the canvas from the
    /// configured fit mode and the sieve from the view's stated domain.
    pub fn new(
        view: Box<dyn View>,
        config: Config,
        theme: ThemeStore,
        avail_width: u32,
        avail_height: u32,
    ) -> Result<Self> {
        let viewport = Viewport::new(config.appearance.mode, avail_width, avail_height);
        let size = viewport.size();
        let limit = config.capped_limit(view.required_limit(size));
        info!(
            "{}: {size}x{size} canvas, sieve domain 0..{limit}",
            view.name()
        );
        let table = sieve::build(limit as usize, view.required_parts())
            .with_context(|| format!("building the sieve for `{}`", view.name()))?;
        let background = config.appearance.background.unwrap_or(Rgb::WHITE);
        let theme_revision = theme.revision();
        let mut app = Self {
            config,
            theme,
            theme_revision,
            viewport,
            surface: RasterSurface::new(size, size, background),
            table,
            scheduler: ChunkedScheduler::new(),
            view,
            status: String::new(),
        };
        app.restart();
        Ok(app)
    }

    /// Lends the shared state to the view for one call, then refreshes the
    /// cached status line.
    fn drive<F>(&mut self, f: F)
    where
        F: FnOnce(&mut dyn View, &mut ViewContext<'_>),
    {
        let mut ctx = ViewContext {
            surface: &mut self.surface,
            table: &self.table,
            scheduler: &mut self.scheduler,
            palette: self.theme.colors(),
            background: self.config.appearance.background,
        };
        f(&mut *self.view, &mut ctx);
        self.status = self.view.status();
    }

    /// Discards painted output and begins a fresh run.
    pub fn restart(&mut self) {
        self.drive(|view, ctx| view.restart(ctx));
    }

    /// One frame: applies any pending theme edit, then lets the view run at
    /// most one scheduler slice.
    pub fn tick(&mut self) {
        if self.theme.revision() != self.theme_revision {
            self.theme_revision = self.theme.revision();
            debug!(
                "theme revision {}; restarting the view",
                self.theme_revision
            );
            self.drive(|view, ctx| view.handle_event(ctx, &ControlEvent::ThemeChanged));
        }
        self.drive(|view, ctx| view.tick(ctx));
    }

    /// Ticks until the view reports done, bounded by `max_frames`. Returns
    /// the frames executed. The trajectory view never finishes, so for it
    /// the bound is the only exit.
    pub fn run(&mut self, max_frames: u64) -> u64 {
        for frame in 0..max_frames {
            if self.view.is_done() {
                return frame;
            }
            self.tick();
        }
        max_frames
    }

    /// Routes a host control change. `Resized` is handled here because only
    /// the shell may reallocate the surface and sieve; everything else goes
    /// straight to the view.
    pub fn handle_event(&mut self, event: &ControlEvent) -> Result<()> {
        if let ControlEvent::Resized { width, height } = *event {
            return self.resize(width, height);
        }
        self.drive(|view, ctx| view.handle_event(ctx, event));
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let Some(size) = self.viewport.resize(width, height) else {
            debug!("resize to {width}x{height} keeps the canvas dimension");
            return Ok(());
        };
        self.scheduler.cancel();
        let background = self.config.appearance.background.unwrap_or(Rgb::WHITE);
        self.surface = RasterSurface::new(size, size, background);
        let limit = self.config.capped_limit(self.view.required_limit(size));
        if limit != self.table.limit() as u64 {
            info!("resize to {size}px moves the sieve domain to 0..{limit}");
            self.table = sieve::build(limit as usize, self.view.required_parts())
                .context("rebuilding the sieve after a resize")?;
        }
        self.drive(|view, ctx| {
            view.handle_event(ctx, &ControlEvent::Resized { width, height });
        });
        Ok(())
    }

    #[must_use]
    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    #[must_use]
    pub fn table(&self) -> &SieveTable {
        &self.table
    }

    #[must_use]
    pub fn view(&self) -> &dyn View {
        &*self.view
    }

    /// Cached copy of the view's status line, refreshed after every call
    /// into the view.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.view.is_done()
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        self.scheduler.progress()
    }

    /// Current square canvas dimension.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.viewport.size()
    }

    #[must_use]
    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    /// Edits land on the next frame via the revision poll.
    pub fn theme_mut(&mut self) -> &mut ThemeStore {
        &mut self.theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test; // For logging within tests

    use crate::theme::ThemeKey;
    use crate::viewport::FitMode;
    use crate::views::{ArchimedeanView, ZetaView, TWIN_DARKEN};

    fn small_config() -> Config {
        let mut config = Config::default();
        config.archimedean.limit = 2_000;
        config.performance.archimedean_chunk = 500;
        config.appearance.mode = FitMode::Fixed(100);
        config
    }

    fn archimedean_app() -> App {
        let config = small_config();
        let view = Box::new(ArchimedeanView::new(
            &config.archimedean,
            &config.performance,
        ));
        App::new(view, config, ThemeStore::load(None), 0, 0).expect("app")
    }

    #[test]
    fn construction_builds_the_sieve_for_the_view() {
        let app = archimedean_app();
        assert_eq!(app.size(), 100);
        assert_eq!(app.surface().width(), 100);
        assert_eq!(app.table().limit(), 2_000);
        assert_eq!(app.view().name(), "archimedean");
        assert!(!app.is_done());
        assert!(app.status().starts_with('⏳'));
    }

    #[test]
    fn run_stops_when_the_view_finishes() {
        let mut app = archimedean_app();
        let frames = app.run(100);
        assert!(app.is_done());
        // Enumeration bound ceil((50 / 1.5)^2) + 16 = 1128, in slices of 500.
        assert_eq!(frames, 3);
        // First n with 1.5 * sqrt(n) > 50 is 1112.
        assert_eq!(app.status(), "1112");
    }

    #[test]
    fn run_caps_frames_for_the_trajectory_view() {
        let mut config = Config::default();
        config.appearance.mode = FitMode::Fixed(100);
        config.zeta.stripe_count = 100;
        let view = Box::new(ZetaView::new(&config.zeta));
        let mut app = App::new(view, config, ThemeStore::load(None), 0, 0).expect("app");
        assert_eq!(app.run(5), 5);
        assert!(!app.is_done());
        assert_eq!(app.status(), "t = 0.30");
    }

    #[test]
    fn resize_reallocates_and_restarts() {
        let mut config = small_config();
        config.appearance.mode = FitMode::Fit;
        let view = Box::new(ArchimedeanView::new(
            &config.archimedean,
            &config.performance,
        ));
        let mut app = App::new(view, config, ThemeStore::load(None), 500, 500).expect("app");
        assert_eq!(app.size(), 500);
        app.run(100);
        assert!(app.is_done());

        app.handle_event(&ControlEvent::Resized {
            width: 640,
            height: 900,
        })
        .expect("resize");
        assert_eq!(app.size(), 640);
        assert_eq!(app.surface().width(), 640);
        assert!(!app.is_done());
        assert!(app.status().starts_with('⏳'));
    }

    #[test]
    fn same_size_resize_keeps_the_run() {
        let mut app = archimedean_app();
        app.tick();
        let before = app.status().to_string();
        app.handle_event(&ControlEvent::Resized {
            width: 3000,
            height: 3000,
        })
        .expect("resize");
        assert_eq!(app.status(), before);
        assert!(!app.is_done());
    }

    #[test]
    fn theme_edit_restarts_on_the_next_tick() {
        let mut app = archimedean_app();
        app.run(100);
        assert!(app.is_done());

        app.theme_mut().set(ThemeKey::Prime, Rgb::new(0xaa, 0x00, 0x00));
        app.tick();
        assert!(!app.is_done());
        assert_eq!(app.status(), "⏳ 501");

        app.run(100);
        // n = 5 is a twin prime; it lands at (50, 53) on the 100px canvas.
        let twin = Rgb::new(0xaa, 0x00, 0x00).darken(TWIN_DARKEN);
        assert_eq!(app.surface().px(50, 53), Some(twin));
    }

    #[test]
    fn untouched_theme_never_restarts() {
        let mut app = archimedean_app();
        app.run(100);
        assert!(app.is_done());
        app.tick();
        assert!(app.is_done());
        assert_eq!(app.status(), "1112");
    }
}
