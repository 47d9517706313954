// src/config.rs

//! Configuration for every visualization variant, deserialized from a JSON
//! file. Each section carries hand-written defaults matching the documented
//! constants, so an absent or empty file behaves identically to the stock
//! setup. Out-of-range values are clamped with a warning rather than
//! rejected; this is an interactive tool, not a validating API.

use crate::color::Rgb;
use crate::explorer::GapAnalysisOptions;
use crate::sieve::MAX_SIEVE_LIMIT;
use crate::viewport::FitMode;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root of the configuration tree.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub appearance: AppearanceConfig,
    pub sieve: SieveConfig,
    pub archimedean: ArchimedeanConfig,
    pub ulam: UlamConfig,
    pub polygon: PolygonConfig,
    pub cube: CubeConfig,
    pub explorer: ExplorerConfig,
    pub zeta: ZetaConfig,
    pub performance: PerformanceConfig,
}

/// Canvas sizing and background override.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppearanceConfig {
    /// `fit` clamps the smaller window axis into [400, 1200]; `fixed` uses
    /// the given edge length.
    pub mode: FitMode,
    /// Overrides the per-variant background when set.
    pub background: Option<Rgb>,
}

/// Sieve sizing policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SieveConfig {
    /// Upper bound applied to every variant's domain. Lowering it trades
    /// range for memory; it can never exceed the built-in ceiling.
    pub max_limit: u64,
}

impl Default for SieveConfig {
    fn default() -> Self {
        SieveConfig {
            max_limit: MAX_SIEVE_LIMIT as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArchimedeanConfig {
    pub limit: u64,
    /// Plot square edge in pixels.
    pub pixel_size: u32,
    /// Spiral pitch `c` in `r = c * sqrt(n)`.
    pub pitch: f64,
}

impl Default for ArchimedeanConfig {
    fn default() -> Self {
        ArchimedeanConfig {
            limit: 200_000,
            pixel_size: 2,
            pitch: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UlamConfig {
    /// Plot square edge; also the walk step, so the domain scales with
    /// canvas area.
    pub pixel_size: u32,
    /// How far the walk may leave the canvas on both axes before the run
    /// finishes early.
    pub exit_margin: u32,
}

impl Default for UlamConfig {
    fn default() -> Self {
        UlamConfig {
            pixel_size: 2,
            exit_margin: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PolygonConfig {
    pub limit: u64,
    /// Distance between consecutive rings; stroke width is `spacing + 1`.
    pub spacing: f64,
    /// Side count of the ring polygon, minimum 3.
    pub sides: u32,
}

impl Default for PolygonConfig {
    fn default() -> Self {
        PolygonConfig {
            limit: 5_000_000,
            spacing: 2.0,
            sides: 6,
        }
    }
}

/// The hexagonal variant with the shaded cube overlay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CubeConfig {
    pub limit: u64,
    pub spacing: f64,
}

impl Default for CubeConfig {
    fn default() -> Self {
        CubeConfig {
            limit: 200_000,
            spacing: 2.0,
        }
    }
}

/// Polar gap explorer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExplorerConfig {
    pub limit: u64,
    pub pixel_size: u32,
    /// Angular slice count, clamped to 12..=144.
    pub modulus: u32,
    /// Gap between the outermost ring and the canvas edge, in pixels.
    pub margin: f64,
    pub analysis: GapAnalysisOptions,
    /// Overlay the per-slice mean-ω wave after the point pass.
    pub frequency_wave: bool,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        ExplorerConfig {
            limit: 20_000_000,
            pixel_size: 1,
            modulus: 28,
            margin: 40.0,
            analysis: GapAnalysisOptions::default(),
            frequency_wave: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ZetaConfig {
    /// Eta-series truncation for each evaluation.
    pub eta_terms: u32,
    /// Partial-sum spiral length.
    pub sum_terms: u32,
    /// Trail length before old points are dropped.
    pub history_cap: usize,
    /// Height step per frame while playing.
    pub dt: f64,
    /// Fraction of the distance to the target zoom covered each frame.
    pub zoom_lerp: f64,
    /// Head-room multiplier applied to the observed range when zooming.
    pub range_pad: f64,
    /// Sieve domain behind the Möbius background stripes.
    pub stripe_count: u64,
}

impl Default for ZetaConfig {
    fn default() -> Self {
        ZetaConfig {
            eta_terms: 500,
            sum_terms: 50,
            history_cap: 2000,
            dt: 0.05,
            zoom_lerp: 0.1,
            range_pad: 1.2,
            stripe_count: 500,
        }
    }
}

/// Chunk and batch sizes: units of work per scheduler slice. Layer chunks
/// are far smaller than integer chunks because one layer does a full ring
/// of segment draws.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PerformanceConfig {
    pub archimedean_chunk: u64,
    pub ulam_chunk: u64,
    pub layer_chunk: u64,
    pub polar_chunk: u64,
    /// Connector segments per stroke flush in the gap overlay.
    pub connector_batch: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        PerformanceConfig {
            archimedean_chunk: 1000,
            ulam_chunk: 2000,
            layer_chunk: 100,
            polar_chunk: 100_000,
            connector_batch: 2000,
        }
    }
}

impl Config {
    /// Reads `path` when given, falling back to defaults on a missing,
    /// unreadable, or invalid file. The result is already normalized.
    #[must_use]
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let mut config = match path {
            Some(p) => match fs::read_to_string(p) {
                Ok(text) => match serde_json::from_str::<Config>(&text) {
                    Ok(config) => config,
                    Err(e) => {
                        warn!("invalid config at {} ({e}); using defaults", p.display());
                        Config::default()
                    }
                },
                Err(_) => {
                    debug!("no config at {}; using defaults", p.display());
                    Config::default()
                }
            },
            None => Config::default(),
        };
        config.normalize();
        config
    }

    /// Clamps out-of-range values in place, warning once per correction.
    /// Call again after applying command-line overrides.
    pub fn normalize(&mut self) {
        if self.polygon.sides < 3 {
            warn!("polygon sides {} below 3; clamping", self.polygon.sides);
            self.polygon.sides = 3;
        }
        let modulus = self.explorer.modulus.clamp(12, 144);
        if modulus != self.explorer.modulus {
            warn!(
                "slice count {} outside 12..=144; clamping to {modulus}",
                self.explorer.modulus
            );
            self.explorer.modulus = modulus;
        }
        if self.sieve.max_limit > MAX_SIEVE_LIMIT as u64 {
            warn!(
                "sieve ceiling {} above the supported maximum; clamping to {MAX_SIEVE_LIMIT}",
                self.sieve.max_limit
            );
            self.sieve.max_limit = MAX_SIEVE_LIMIT as u64;
        }
        for pixel in [
            &mut self.archimedean.pixel_size,
            &mut self.ulam.pixel_size,
            &mut self.explorer.pixel_size,
        ] {
            if *pixel == 0 {
                warn!("pixel size 0; clamping to 1");
                *pixel = 1;
            }
        }
        for spacing in [&mut self.polygon.spacing, &mut self.cube.spacing] {
            if *spacing <= 0.0 {
                warn!("ring spacing {spacing} not positive; resetting to 2");
                *spacing = 2.0;
            }
        }
        for chunk in [
            &mut self.performance.archimedean_chunk,
            &mut self.performance.ulam_chunk,
            &mut self.performance.layer_chunk,
            &mut self.performance.polar_chunk,
        ] {
            if *chunk == 0 {
                warn!("chunk size 0; clamping to 1");
                *chunk = 1;
            }
        }
        if self.performance.connector_batch == 0 {
            warn!("connector batch 0; clamping to 1");
            self.performance.connector_batch = 1;
        }
        if self.zeta.dt <= 0.0 {
            warn!("zeta dt {} not positive; resetting to 0.05", self.zeta.dt);
            self.zeta.dt = 0.05;
        }
    }

    /// Domain bound for a variant after the configured ceiling.
    #[inline]
    #[must_use]
    pub fn capped_limit(&self, requested: u64) -> u64 {
        requested.min(self.sieve.max_limit)
    }
}
