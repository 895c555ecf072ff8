use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use feature_map_viewer::camera::CameraPose;
use feature_map_viewer::features::{ALL_PATTERN, FeatureSet, INSTATE_PATTERN, gather_features};
use feature_map_viewer::io::object_from_json;
use feature_map_viewer::replay::{ReplayConfig, replay};
use feature_map_viewer::rerun_viewer::{RerunSink, RerunViewer};
use feature_map_viewer::viewer::{ViewerConfig, init_vis_with};

#[derive(Parser)]
#[command(version, about = "Display features in map", author)]
struct PlotMapCli {
    /// How many frames to keep
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    keep: u32,

    /// Plot all features
    #[arg(long)]
    all: bool,

    /// Folder holding the feature files, relative to the working directory
    #[arg(long, default_value = "map")]
    map_dir: PathBuf,

    /// Frames per second
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Viewer config json
    #[arg(long)]
    config: Option<PathBuf>,

    /// Camera pose json placed as the initial camera
    #[arg(long)]
    view: Option<PathBuf>,

    /// Write the recording to an .rrd file instead of spawning a viewer
    #[arg(long)]
    save: Option<PathBuf>,

    /// Exit right after the last frame
    #[arg(long)]
    no_wait: bool,
}

fn wait_for_key() -> feature_map_viewer::Result<()> {
    print!("Press key to exit");
    if let Err(e) = std::io::stdout().flush() {
        log::warn!("failed to flush stdout: {}", e);
    }
    let mut line = String::new();
    if let Err(e) = std::io::stdin().read_line(&mut line) {
        log::warn!("failed to read stdin: {}", e);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = PlotMapCli::parse();

    let all_features = gather_features(&cli.map_dir, ALL_PATTERN)?;
    let instate_features = gather_features(&cli.map_dir, INSTATE_PATTERN)?;
    if instate_features.is_empty() {
        log::warn!(
            "no {} files in {}",
            INSTATE_PATTERN,
            cli.map_dir.display()
        );
    }

    let mut viewer_config: ViewerConfig = match &cli.config {
        Some(path) => object_from_json(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(path) = &cli.view {
        viewer_config.initial_view = Some(object_from_json::<CameraPose>(path)?);
    }

    let sink = match cli.save {
        Some(path) => RerunSink::Save(path),
        None => RerunSink::Spawn,
    };
    let mut viewer = RerunViewer::new(sink);
    let mut handle = init_vis_with(&mut viewer, &viewer_config)?;

    let replay_config = ReplayConfig {
        include_all: cli.all,
        keep: cli.keep as usize,
        ..Default::default()
    }
    .with_fps(cli.fps)?;
    let no_all = FeatureSet::default();
    let all = if cli.all { &all_features } else { &no_all };

    let no_wait = cli.no_wait;
    replay(
        &mut viewer,
        &mut handle,
        &instate_features,
        all,
        replay_config,
        || if no_wait { Ok(()) } else { wait_for_key() },
    )?;
    Ok(())
}
