use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use formats::{FileUpload, ImportResult, Ingestor};
use layers::TagFilter;
use tools::ToolsConfig;
use tools::report::summarize;
use tools::session::{frame_point_cloud, simulate_playback};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect point clouds and GeoJSON, replay tagged features")]
struct Args {
    /// JSON config with optional `ingest` and `renderer` sections
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate and parse one batch of .xyz, .pcd and .geojson files
    Inspect {
        files: Vec<PathBuf>,

        /// Print the import result as JSON
        #[arg(long)]
        json: bool,

        /// Frame the accepted point cloud in a headless viewer
        #[arg(long)]
        render: bool,

        /// Color the rendered cloud by altitude
        #[arg(long)]
        gradient: bool,
    },

    /// Play back the features of a GeoJSON file in simulated time
    Playback {
        file: PathBuf,

        /// Tag to play back, or `All`
        #[arg(long, default_value = "All")]
        tag: String,

        /// Print reveals as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = ToolsConfig::load(args.config.as_deref())?;

    match args.command {
        Command::Inspect {
            files,
            json,
            render,
            gradient,
        } => inspect(&config, &files, json, render, gradient),
        Command::Playback { file, tag, json } => playback(&config, &file, &tag, json),
    }
}

fn read_batch(paths: &[PathBuf]) -> anyhow::Result<Vec<FileUpload>> {
    paths
        .iter()
        .map(|p| FileUpload::from_path(p).with_context(|| format!("load {}", p.display())))
        .collect()
}

fn run_ingest(config: &ToolsConfig, paths: &[PathBuf]) -> anyhow::Result<ImportResult> {
    let batch = read_batch(paths)?;
    let mut ingestor = Ingestor::new(config.ingest.clone());
    let result = ingestor.ingest(&batch);
    info!(
        accepted = result.accepted.len(),
        rejected = result.errors.len(),
        "batch ingested"
    );
    Ok(result)
}

fn inspect(
    config: &ToolsConfig,
    paths: &[PathBuf],
    as_json: bool,
    render: bool,
    gradient: bool,
) -> anyhow::Result<()> {
    if paths.is_empty() {
        bail!("inspect requires at least one file");
    }
    let mut result = run_ingest(config, paths)?;

    let framing = match (render, result.point_cloud.take()) {
        (true, Some(points)) => Some(frame_point_cloud(points, &config.renderer, gradient)?),
        (true, None) => {
            warn!("--render given but no point cloud was accepted");
            None
        }
        (false, _) => None,
    };

    if as_json {
        let payload = json!({ "import": result, "framing": framing });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!("{}", summarize(&result));
        if let Some(report) = framing {
            println!(
                "framed {} points in {} frames: target {:?}, camera {:?}",
                report.points, report.frames, report.target, report.position
            );
            for line in report.log {
                println!("  {line}");
            }
        }
    }
    Ok(())
}

fn playback(config: &ToolsConfig, path: &Path, tag: &str, as_json: bool) -> anyhow::Result<()> {
    let result = run_ingest(config, &[path.to_path_buf()])?;
    if let Some(err) = result.errors.first() {
        bail!("{err}");
    }
    let Some(collection) = result.geo_data else {
        bail!("{} is not a GeoJSON file", path.display());
    };

    let (reveals, log) = simulate_playback(collection, TagFilter::parse(tag));

    if as_json {
        let payload = json!({ "reveals": reveals, "log": log });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    for line in &log {
        println!("# {line}");
    }
    for r in &reveals {
        let id = r.id.as_deref().unwrap_or("-");
        let tag = r.tag.as_deref().unwrap_or("-");
        match (r.lon, r.lat) {
            (Some(lon), Some(lat)) => println!("{:>6.1}s  {id}  [{tag}]  {lon:.6}, {lat:.6}", r.at_s),
            _ => println!("{:>6.1}s  {id}  [{tag}]", r.at_s),
        }
    }
    Ok(())
}
