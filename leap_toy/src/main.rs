//! leap_toy — interactive entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gesture_intent::{CirclePolicy, GestureConfig};
use leap_toy::app::{run, AppConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Policy {
    /// Indicator follows the circle and hides when it stops.
    Continuous,
    /// Each completed circle grabs what's inside; indicator hides after a quiet period.
    Grab,
}

impl From<Policy> for CirclePolicy {
    fn from(p: Policy) -> Self {
        match p {
            Policy::Continuous => CirclePolicy::ContinuousIndicator,
            Policy::Grab       => CirclePolicy::GrabAndDebounce,
        }
    }
}

/// Gesture sandbox: circles, swipes, taps and tilt drive a small 2D scene.
#[derive(Debug, Parser)]
#[command(name = "leap_toy", version, about)]
struct Cli {
    /// Gesture configuration (TOML). Missing keys take defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Circle gesture policy; overrides the config file.
    #[arg(long, value_enum)]
    policy: Option<Policy>,

    /// Start in the breakout level.
    #[arg(long)]
    breakout: bool,

    /// Start with the mouse driving the cursor instead of the device.
    #[arg(long)]
    no_cursor_control: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("leap_toy=info,gesture_intent=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Leap Toy — gesture-driven physics sandbox           ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware (keyboard simulation also active)");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Keyboard simulation  (use --features leap for hardware)");
    println!();

    let mut gesture = match &cli.config {
        Some(path) => GestureConfig::load(path)
            .with_context(|| format!("loading gesture config {}", path.display()))?,
        None => GestureConfig::default(),
    };
    if let Some(policy) = cli.policy {
        gesture = gesture.with_policy(policy.into());
    }
    info!(policy = ?gesture.circle_policy, breakout = cli.breakout, "configuration ready");

    let cfg = AppConfig {
        gesture,
        cursor_control: !cli.no_cursor_control,
        breakout: cli.breakout,
        ..AppConfig::default()
    };

    println!("  Opening visualizer window…");
    println!();

    run(cfg)
}
