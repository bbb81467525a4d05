//! Gas transmission network analysis pipeline.
//!
//! Fetches the network nodes and pipelines, renders the full network on a
//! map, computes descriptive statistics, and renders the cross-border
//! subset on a second map.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use geo_types::LineString;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use url::Url;

use alder::analysis::{self, CrossBorderReport};
use alder::models::Pipeline;
use alder::render::{viridis, Extent, MapFigure, Rgb};
use alder::scigrid::{DatasetFetcher, COUNTRIES_URL, NODES_URL, PIPELINES_URL};

use crate::config::Config;

// Stroke width at the maximum rated pressure
const STROKE_SCALE: f64 = 2.5;
const CROSSBORDER_COLOR: Rgb = Rgb::new(255, 0, 0);

#[derive(Parser, Debug)]
#[command(name = "analyze")]
#[command(about = "Analyze and map the European gas transmission network")]
struct Args {
    /// Nodes dataset URL (GeoJSON points)
    #[arg(long, default_value = NODES_URL)]
    nodes_url: String,

    /// Pipelines dataset URL (GeoJSON lines)
    #[arg(long, default_value = PIPELINES_URL)]
    pipelines_url: String,

    /// Countries basemap URL (GeoJSON polygons)
    #[arg(long, default_value = COUNTRIES_URL)]
    countries_url: String,

    /// Skip the country outline basemap
    #[arg(long)]
    no_basemap: bool,

    /// Output directory for rendered figures
    #[arg(short, long, default_value = "figures")]
    out_dir: PathBuf,

    /// Optional TOML config overriding the dataset endpoints
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn apply_config(&mut self, config: &Config) {
        self.nodes_url = config.datasets.nodes_url.clone();
        self.pipelines_url = config.datasets.pipelines_url.clone();
        if let Some(basemap) = &config.basemap {
            self.countries_url = basemap.countries_url.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut args = Args::parse();

    if let Some(path) = &args.config {
        let config = Config::load_from_file(path)?;
        args.apply_config(&config);
    }

    for url in [&args.nodes_url, &args.pipelines_url, &args.countries_url] {
        Url::parse(url).with_context(|| format!("Invalid dataset URL: {}", url))?;
    }

    info!("Alder Network Analysis");

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    // Load both datasets; any failure here terminates the run
    let fetcher = DatasetFetcher::new();
    let nodes = fetcher.fetch_nodes(&args.nodes_url).await?;
    let pipelines = fetcher.fetch_pipelines(&args.pipelines_url).await?;

    if nodes.is_empty() {
        anyhow::bail!("Nodes dataset is empty");
    }
    if pipelines.is_empty() {
        anyhow::bail!("Pipelines dataset is empty");
    }

    // The basemap is decoration; a fetch failure degrades to no basemap
    let outlines = if args.no_basemap {
        Vec::new()
    } else {
        match fetcher.fetch_country_outlines(&args.countries_url).await {
            Ok(outlines) => outlines,
            Err(e) => {
                warn!("Basemap unavailable, rendering without it: {:#}", e);
                Vec::new()
            }
        }
    };

    // Both figures share the network's extent
    let extent = Extent::from_lines(pipelines.iter().map(|p| &p.geometry))
        .context("No pipeline has drawable geometry")?
        .padded(0.05);

    // Pass 1: the full network, colored by capacity, width by pressure
    let network_figure = render_network(&pipelines, &outlines, extent)?;
    let network_path = args.out_dir.join("network.svg");
    network_figure.write_to(&network_path)?;
    info!("Wrote {}", network_path.display());

    // Statistics
    let max_pressure = analysis::max_pressure_pipelines(&pipelines);
    let bidirectional_share = analysis::bidirectional_share(&pipelines);
    let report = analysis::join_countries(&pipelines, &nodes);
    if report.unmatched > 0 {
        warn!(
            "{} pipelines had an endpoint missing from the node table",
            report.unmatched
        );
    }

    // Pass 2: the cross-border subset
    let crossborder_figure = render_crossborder(&report, &outlines, extent);
    let crossborder_path = args.out_dir.join("crossborder.svg");
    crossborder_figure.write_to(&crossborder_path)?;
    info!("Wrote {}", crossborder_path.display());

    print_report(&pipelines, &max_pressure, bidirectional_share, &report);

    Ok(())
}

/// Draw every pipeline, colored by normalized capacity and width-scaled by
/// normalized pressure, with a capacity colorbar.
fn render_network(
    pipelines: &[Pipeline],
    outlines: &[LineString<f64>],
    extent: Extent,
) -> Result<MapFigure> {
    let mut figure = MapFigure::new("European gas transmission network", extent);
    for outline in outlines {
        figure.add_outline(outline);
    }

    let capacities: Vec<f64> = pipelines.iter().map(|p| p.max_cap_m_m3_per_d).collect();
    let pressures: Vec<f64> = pipelines.iter().map(|p| p.max_pressure_bar).collect();
    let capacity_norm = analysis::normalized(&capacities);
    let pressure_norm = analysis::normalized(&pressures);

    let pb = ProgressBar::new(pipelines.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )?
            .progress_chars("#>-"),
    );

    for (i, pipeline) in pipelines.iter().enumerate() {
        figure.add_line(
            &pipeline.geometry,
            viridis(capacity_norm[i]),
            pressure_norm[i] * STROKE_SCALE,
        );
        pb.inc(1);
    }
    pb.finish_and_clear();

    // Legend spans the raw capacity range
    let cap_min = capacities
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::INFINITY, f64::min);
    let cap_max = analysis::max_finite(capacities.iter().copied()).unwrap_or(0.0);
    figure.with_colorbar(
        "Pipeline capacity (million cubic meters per day)",
        if cap_min.is_finite() { cap_min } else { 0.0 },
        cap_max,
    );

    Ok(figure)
}

/// Draw only the cross-border subset in a single accent color.
fn render_crossborder(
    report: &CrossBorderReport,
    outlines: &[LineString<f64>],
    extent: Extent,
) -> MapFigure {
    let mut figure = MapFigure::new("Cross-border pipelines", extent);
    for outline in outlines {
        figure.add_outline(outline);
    }
    for joined in report.crossborder() {
        figure.add_line(&joined.pipeline.geometry, CROSSBORDER_COLOR, 1.2);
    }
    figure
}

/// Print the statistics summary to stdout.
fn print_report(
    pipelines: &[Pipeline],
    max_pressure: &[&Pipeline],
    bidirectional_share: f64,
    report: &CrossBorderReport,
) {
    println!();
    println!(
        "Gas transmission network summary ({})",
        chrono::Utc::now().format("%Y-%m-%d %H:%M UTC")
    );
    println!("  Pipelines: {}", pipelines.len());

    match max_pressure {
        [] => println!("  Highest rated pressure: n/a"),
        [single] => println!(
            "  Highest rated pressure: {} bar (pipeline {})",
            single.max_pressure_bar, single.id
        ),
        many => {
            let ids: Vec<&str> = many.iter().map(|p| p.id.as_str()).collect();
            println!(
                "  Highest rated pressure: {} bar (pipelines {})",
                many[0].max_pressure_bar,
                ids.join(", ")
            );
        }
    }

    println!("  Bidirectional share: {:.1}%", bidirectional_share);
    println!(
        "  Cross-border share: {:.1}% ({} of {} joined pipelines, {} unmatched)",
        report.share(),
        report.crossborder_count(),
        report.joined.len(),
        report.unmatched
    );
}
