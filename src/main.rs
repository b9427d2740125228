mod app;
mod strategy;
mod util;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use strategy::{PortfolioSource, SettingsStore};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Portfolio JSON with initiatives, operations, milestones and tasks.
    /// Without it a generated sample portfolio is shown.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Scale of the generated sample portfolio.
    #[arg(long, default_value_t = 6, conflicts_with = "data")]
    sample_scale: usize,

    /// Where graph settings are loaded from and saved to.
    #[arg(long, default_value = "strategic-graph-settings.json")]
    settings: PathBuf,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> eframe::Result<()> {
    init_logging();
    let args = Args::parse();

    let source = match args.data {
        Some(path) => PortfolioSource::File(path),
        None => PortfolioSource::Sample {
            scale: args.sample_scale,
        },
    };
    let settings_store = SettingsStore::new(args.settings);
    tracing::info!(
        source = %source.describe(),
        settings = %settings_store.path().display(),
        "starting strategic-graph"
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "strategic-graph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::StrategicGraphApp::new(
                cc,
                source,
                settings_store,
            )))
        }),
    )
}
