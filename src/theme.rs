// src/theme.rs

//! Persisted color theme: a six-key color map with documented defaults,
//! stored as a small JSON object. Views snapshot it at pass start; the app
//! watches the revision counter to restart rendering after edits.

use crate::color::Rgb;
use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Resolved once per process; `None` when no home directory is set.
static DEFAULT_PATH: Lazy<Option<PathBuf>> = Lazy::new(|| {
    std::env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("primescope")
            .join("theme.json")
    })
});

/// The six theme slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeKey {
    Prime,
    MuNeg,
    MuZero,
    MuPos,
    ZetaCurve,
    ZetaSum,
}

impl ThemeKey {
    /// The persisted JSON field name for this slot.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeKey::Prime => "prime",
            ThemeKey::MuNeg => "muNeg",
            ThemeKey::MuZero => "muZero",
            ThemeKey::MuPos => "muPos",
            ThemeKey::ZetaCurve => "zetaCurve",
            ThemeKey::ZetaSum => "zetaSum",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "prime" => Some(ThemeKey::Prime),
            "muNeg" => Some(ThemeKey::MuNeg),
            "muZero" => Some(ThemeKey::MuZero),
            "muPos" => Some(ThemeKey::MuPos),
            "zetaCurve" => Some(ThemeKey::ZetaCurve),
            "zetaSum" => Some(ThemeKey::ZetaSum),
            _ => None,
        }
    }
}

/// One full set of theme colors. `Copy`, so render passes snapshot it once
/// at restart and never observe a half-applied edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeColors {
    pub prime: Rgb,
    pub mu_neg: Rgb,
    pub mu_zero: Rgb,
    pub mu_pos: Rgb,
    pub zeta_curve: Rgb,
    pub zeta_sum: Rgb,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            prime: Rgb::new(0x44, 0x44, 0x44),
            mu_neg: Rgb::new(0xec, 0x64, 0x6f),
            mu_zero: Rgb::new(0x92, 0xda, 0x9f),
            mu_pos: Rgb::new(0x6a, 0x9a, 0xca),
            zeta_curve: Rgb::new(0x44, 0x44, 0x44),
            zeta_sum: Rgb::new(0x6a, 0x9a, 0xca),
        }
    }
}

impl ThemeColors {
    #[inline]
    #[must_use]
    pub fn get(&self, key: ThemeKey) -> Rgb {
        match key {
            ThemeKey::Prime => self.prime,
            ThemeKey::MuNeg => self.mu_neg,
            ThemeKey::MuZero => self.mu_zero,
            ThemeKey::MuPos => self.mu_pos,
            ThemeKey::ZetaCurve => self.zeta_curve,
            ThemeKey::ZetaSum => self.zeta_sum,
        }
    }

    fn set(&mut self, key: ThemeKey, color: Rgb) {
        match key {
            ThemeKey::Prime => self.prime = color,
            ThemeKey::MuNeg => self.mu_neg = color,
            ThemeKey::MuZero => self.mu_zero = color,
            ThemeKey::MuPos => self.mu_pos = color,
            ThemeKey::ZetaCurve => self.zeta_curve = color,
            ThemeKey::ZetaSum => self.zeta_sum = color,
        }
    }
}

/// Owns the theme colors and their on-disk copy.
#[derive(Debug)]
pub struct ThemeStore {
    colors: ThemeColors,
    path: Option<PathBuf>,
    revision: u64,
}

impl ThemeStore {
    /// `~/.config/primescope/theme.json`, when a home directory exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        DEFAULT_PATH.clone()
    }

    /// Loads from `path` when given. A missing file starts from defaults; a
    /// file that fails to parse is ignored with a warning, matching the
    /// interactive contract that theme handling never faults.
    #[must_use]
    pub fn load(path: Option<PathBuf>) -> Self {
        let colors = match &path {
            Some(p) => match fs::read_to_string(p) {
                Ok(text) => match serde_json::from_str::<ThemeColors>(&text) {
                    Ok(colors) => colors,
                    Err(e) => {
                        warn!("theme file {} unreadable ({e}); using defaults", p.display());
                        ThemeColors::default()
                    }
                },
                Err(_) => {
                    debug!("no theme file at {}; using defaults", p.display());
                    ThemeColors::default()
                }
            },
            None => ThemeColors::default(),
        };
        Self {
            colors,
            path,
            revision: 0,
        }
    }

    /// Snapshot for a render pass.
    #[inline]
    #[must_use]
    pub fn colors(&self) -> ThemeColors {
        self.colors
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: ThemeKey) -> Rgb {
        self.colors.get(key)
    }

    /// Bumped on every successful `set`/`reset`; the app compares it against
    /// the value it last rendered with.
    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set(&mut self, key: ThemeKey, color: Rgb) {
        self.colors.set(key, color);
        self.revision += 1;
        self.persist();
    }

    pub fn reset(&mut self) {
        self.colors = ThemeColors::default();
        self.revision += 1;
        self.persist();
    }

    fn persist(&self) {
        let Some(path) = &self.path else { return };
        let text = match serde_json::to_string_pretty(&self.colors) {
            Ok(text) => text,
            Err(e) => {
                warn!("theme serialization failed: {e}");
                return;
            }
        };
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Err(e) = fs::write(path, text) {
            warn!("could not persist theme to {}: {e}", path.display());
        }
    }
}

impl Default for ThemeStore {
    fn default() -> Self {
        Self::load(None)
    }
}
