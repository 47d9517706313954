// src/views/mod.rs
// Declares the view modules and defines the common trait.

// Declare the sub-modules within this directory
pub mod archimedean;
pub mod polar;
pub mod polygon;
pub mod ulam;
pub mod zeta;

// --- Re-export the view implementations ---
pub use archimedean::ArchimedeanView;
pub use polar::PolarView;
pub use polygon::{PolygonVariant, PolygonView};
pub use ulam::UlamView;
pub use zeta::ZetaView;

use crate::color::Rgb;
use crate::scheduler::ChunkedScheduler;
use crate::sieve::{Classification, SieveParts, SieveTable};
use crate::surface::RasterSurface;
use crate::theme::ThemeColors;

/// Twin primes darken the prime color by this factor so pairs stand out.
pub const TWIN_DARKEN: f64 = 0.85;

/// Paint for integers past the sieve domain.
pub const OUT_OF_DOMAIN: Rgb = Rgb::new(0xdd, 0xdd, 0xdd);

/// Host-originated control changes, delivered between ticks. Each view
/// reacts to the variants that concern it and ignores the rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    /// Discard painted output and start over.
    Reset,
    /// Polygon spiral side count.
    SidesChanged(u32),
    /// Residue-disc slice count.
    ModulusChanged(u32),
    /// Commit a drill-down candidate, by list position.
    SelectCandidate(usize),
    /// Preview a drill-down candidate, by list position.
    HoverCandidate(usize),
    /// End a drill-down preview.
    HoverEnd,
    /// Toggle the trajectory clock.
    PlayPause,
    /// Jump the trajectory clock to a height.
    SetTime(f64),
    /// Surface dimensions changed. The app shell resizes the surface and
    /// sieve before forwarding; views treat it as a restart.
    Resized { width: u32, height: u32 },
    /// Palette edited in the theme store.
    ThemeChanged,
}

/// Everything a view borrows for one call. Views own only their cursor
/// and parameters; surface, sieve, and scheduler live in the app shell.
pub struct ViewContext<'a> {
    pub surface: &'a mut RasterSurface,
    pub table: &'a SieveTable,
    pub scheduler: &'a mut ChunkedScheduler,
    pub palette: ThemeColors,
    /// Configured background override; each view has its own default.
    pub background: Option<Rgb>,
}

impl ViewContext<'_> {
    /// Background to clear with: the configured override, else the view's
    /// own default.
    #[inline]
    #[must_use]
    pub fn background_or(&self, default: Rgb) -> Rgb {
        self.background.unwrap_or(default)
    }
}

/// One visualization. The app shell drives the lifecycle: `restart` after
/// anything that invalidates painted output, then `tick` once per frame
/// until `is_done`.
pub trait View {
    fn name(&self) -> &'static str;

    /// Largest integer classified on a square surface of this size. The
    /// shell sizes the sieve table to cover it before calling `restart`.
    fn required_limit(&self, size: u32) -> u64;

    /// Sieve layers the view reads. Primality always exists; this adds
    /// the Möbius and factor-count layers only where a view needs them.
    fn required_parts(&self) -> SieveParts;

    /// Clears the surface and begins a fresh scheduler run.
    fn restart(&mut self, ctx: &mut ViewContext<'_>);

    /// Performs at most one scheduler slice of work. No-op once done.
    fn tick(&mut self, ctx: &mut ViewContext<'_>);

    /// Applies a control change, restarting when it invalidates output.
    fn handle_event(&mut self, ctx: &mut ViewContext<'_>, event: &ControlEvent);

    /// One-line progress text for the status bar.
    fn status(&self) -> String;

    fn is_done(&self) -> bool;
}

/// Paint for integer `n` under the active palette.
///
/// Primes use the prime color, darkened for twins. Composites split on the
/// Möbius sign when that layer is present; otherwise (and past the sieve
/// domain) the neutral out-of-domain grey applies.
#[must_use]
pub fn classification_color(table: &SieveTable, n: u64, palette: &ThemeColors) -> Rgb {
    match table.classify(n) {
        Some(Classification::Prime) => {
            if table.is_twin_prime(n) {
                palette.prime.darken(TWIN_DARKEN)
            } else {
                palette.prime
            }
        }
        Some(Classification::MuNeg) => palette.mu_neg,
        Some(Classification::MuZero) => palette.mu_zero,
        Some(Classification::MuPos) => palette.mu_pos,
        None => OUT_OF_DOMAIN,
    }
}
