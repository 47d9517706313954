// src/main.rs

// Declare modules
pub mod app;
pub mod color;
pub mod config;
pub mod explorer;
pub mod geometry;
pub mod scheduler;
pub mod sieve;
pub mod surface;
pub mod theme;
pub mod viewport;
pub mod views;
pub mod zeta;

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;

use crate::{
    app::App,
    config::Config,
    theme::ThemeStore,
    viewport::{FitMode, DEFAULT_SIZE},
    views::{ArchimedeanView, PolarView, PolygonView, UlamView, View, ZetaView},
};

/// Renders one visualization variant to a PPM image.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Output image path (binary PPM)
    #[arg(long, default_value = "primescope.ppm")]
    out: PathBuf,

    /// Path to config JSON; built-in defaults apply when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to theme JSON; ~/.config/primescope/theme.json when unset
    #[arg(long)]
    theme: Option<PathBuf>,

    /// Frame cap; finite variants may stop earlier on their own
    #[arg(long, default_value_t = 10_000)]
    frames: u64,

    /// Fixed canvas edge in pixels, overriding the configured fit mode
    #[arg(long)]
    size: Option<u32>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Archimedean spiral of classified integers
    Archimedean,
    /// Square-walk spiral sized from the canvas area
    Ulam,
    /// Concentric N-gon spiral
    Polygon {
        /// Side count override (minimum 3)
        #[arg(long)]
        sides: Option<u32>,
    },
    /// Hexagonal spiral finished with the shaded cube overlay
    Cube,
    /// Polar gap explorer over the prime sequence
    Gaps {
        /// Residue slice count override (12..=144)
        #[arg(long)]
        slices: Option<u32>,
        /// Overlay the per-slice mean factor-count wave
        #[arg(long, default_value_t = false)]
        wave: bool,
    },
    /// Trajectory of zeta(1/2 + it) with its partial-sum spiral
    Zeta,
}

/// Folds command-line overrides into the loaded config and re-clamps.
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(size) = cli.size {
        config.appearance.mode = FitMode::Fixed(size);
    }
    match &cli.command {
        Cmd::Polygon { sides: Some(sides) } => config.polygon.sides = *sides,
        Cmd::Gaps { slices, wave } => {
            if let Some(slices) = *slices {
                config.explorer.modulus = slices;
            }
            if *wave {
                config.explorer.frequency_wave = true;
            }
        }
        _ => {}
    }
    config.normalize();
}

fn build_view(command: &Cmd, config: &Config) -> Box<dyn View> {
    match command {
        Cmd::Archimedean => Box::new(ArchimedeanView::new(
            &config.archimedean,
            &config.performance,
        )),
        Cmd::Ulam => Box::new(UlamView::new(&config.ulam, &config.performance)),
        Cmd::Polygon { .. } => Box::new(PolygonView::polygon(&config.polygon, &config.performance)),
        Cmd::Cube => Box::new(PolygonView::cube(&config.cube, &config.performance)),
        Cmd::Gaps { .. } => Box::new(PolarView::new(&config.explorer, &config.performance)),
        Cmd::Zeta => Box::new(ZetaView::new(&config.zeta)),
    }
}

/// Main entry point for the `primescope` application.
fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let cli = Cli::parse();
    info!("Starting primescope...");

    // --- Configuration ---
    let mut config = Config::load_or_default(cli.config.as_deref());
    apply_overrides(&mut config, &cli);
    info!("Configuration loaded.");

    let theme_path = cli.theme.clone().or_else(ThemeStore::default_path);
    let theme = ThemeStore::load(theme_path);

    // --- Build the view and the shell around it ---
    let view = build_view(&cli.command, &config);
    let mut app = App::new(view, config, theme, DEFAULT_SIZE, DEFAULT_SIZE)
        .context("initializing the application shell")?;

    // --- Render ---
    info!("Rendering up to {} frames...", cli.frames);
    let frames = app.run(cli.frames);
    info!(
        "{} after {frames} frame(s); status: {}",
        if app.is_done() { "Finished" } else { "Stopped" },
        app.status()
    );

    // --- Write the image ---
    let file =
        File::create(&cli.out).with_context(|| format!("creating {}", cli.out.display()))?;
    let mut writer = BufWriter::new(file);
    app.surface()
        .write_ppm(&mut writer)
        .with_context(|| format!("writing {}", cli.out.display()))?;
    info!(
        "Wrote {}x{} image to {}",
        app.surface().width(),
        app.surface().height(),
        cli.out.display()
    );

    info!("primescope exited successfully.");
    Ok(())
}
