// src/viewport.rs

//! Viewport sizing: decides the square canvas dimension and reports when a
//! host resize actually changes it.

use log::debug;
use serde::{Deserialize, Serialize};

/// Smallest canvas the fit calculation will produce.
pub const MIN_SIZE: u32 = 400;
/// Largest canvas the fit calculation will produce.
pub const MAX_SIZE: u32 = 1200;
/// Dimension used when fitting is disabled.
pub const DEFAULT_SIZE: u32 = 800;

/// How the canvas dimension is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Track the available area, clamped to `[MIN_SIZE, MAX_SIZE]`.
    Fit,
    /// Always use a fixed dimension.
    Fixed(u32),
}

impl Default for FitMode {
    fn default() -> Self {
        FitMode::Fit
    }
}

/// Clamped square dimension for an available `width x height` area.
#[inline]
#[must_use]
pub fn fit_size(avail_width: u32, avail_height: u32) -> u32 {
    avail_width.min(avail_height).min(MAX_SIZE).max(MIN_SIZE)
}

/// Tracks the effective canvas size across resize reports.
#[derive(Debug, Clone)]
pub struct Viewport {
    mode: FitMode,
    size: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(mode: FitMode, avail_width: u32, avail_height: u32) -> Self {
        let size = match mode {
            FitMode::Fit => fit_size(avail_width, avail_height),
            FitMode::Fixed(px) => px.max(1),
        };
        Self { mode, size }
    }

    /// Current square dimension in pixels.
    #[inline]
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Applies a host resize. Returns the new dimension only when it
    /// differs from the current one, so callers can skip pointless
    /// cancel-and-restart cycles.
    pub fn resize(&mut self, avail_width: u32, avail_height: u32) -> Option<u32> {
        let next = match self.mode {
            FitMode::Fit => fit_size(avail_width, avail_height),
            FitMode::Fixed(px) => px.max(1),
        };
        if next == self.size {
            return None;
        }
        debug!("viewport resized {} -> {}", self.size, next);
        self.size = next;
        Some(next)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            mode: FitMode::Fixed(DEFAULT_SIZE),
            size: DEFAULT_SIZE,
        }
    }
}
