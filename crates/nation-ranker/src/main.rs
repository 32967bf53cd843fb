//! Nation Ranking CLI
//!
//! Ranks countries from a CSV under a set of weights and prints the best
//! and worst lists.
//!
//! Usage:
//!   rank-nations --data data/data.csv \
//!                --weight "GDP per capita=1.0" --weight "Gini Coefficient=0" \
//!                --output data/ranking.json --geometry data/world.geojson

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use nation_ranker::{
    choropleth, compute_ranking, loader, score_breakdown, ColorScale, DisplayConfig, ListSize,
    Metric, WeightStore,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "rank-nations",
    about = "Rank countries by a weighted sum of their statistics"
)]
struct Args {
    /// Path to the country CSV file
    #[arg(short, long, default_value = "data/data.csv")]
    data: PathBuf,

    /// Weight override as "<Metric>=<weight>", repeatable
    #[arg(short, long = "weight", value_name = "METRIC=WEIGHT")]
    weights: Vec<String>,

    /// JSON file with a weight for every metric (applied before --weight)
    #[arg(long)]
    weights_file: Option<PathBuf>,

    /// Entries in each of the best and worst lists ("all" or a count)
    #[arg(short, long, default_value_t = ListSize::default())]
    limit: ListSize,

    /// JSON key used for scores in the report
    #[arg(long, default_value = "score")]
    score_field: String,

    /// Output JSON report
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// World GeoJSON to bind scores onto (written next to --output)
    #[arg(long)]
    geometry: Option<PathBuf>,

    /// Feature property holding the country name
    #[arg(long, default_value = choropleth::DEFAULT_NAME_PROPERTY)]
    name_property: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Split `"<Metric>=<weight>"` at the last `=`
fn parse_override(raw: &str) -> Result<(String, f64)> {
    let (name, weight) = raw
        .rsplit_once('=')
        .ok_or_else(|| anyhow!("expected METRIC=WEIGHT, got {:?}", raw))?;
    let weight: f64 = weight
        .trim()
        .parse()
        .with_context(|| format!("invalid weight in {:?}", raw))?;
    Ok((name.trim().to_string(), weight))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{}", "=".repeat(60));
    info!("Nation Ranker");
    info!("{}", "=".repeat(60));

    let records = loader::load_records(&args.data)?;

    let mut store = match &args.weights_file {
        Some(path) => WeightStore::with_weights(loader::load_weights(path)?),
        None => WeightStore::new(),
    };
    for raw in &args.weights {
        let (name, weight) = parse_override(raw)?;
        let metric = store.set_named(&name, weight)?;
        debug!("Weight override: {} = {:.2}", metric, weight);
    }

    let weights = store.all_weights();
    for control in store.controls() {
        info!("  {}", control.label);
    }

    let ranking = compute_ranking(&records, &weights);
    let range = ranking.value_range();
    info!(
        "Ranked {} nations, scores {:.2} to {:.2}",
        ranking.len(),
        range.min,
        range.max
    );

    let display = DisplayConfig {
        list_size: args.limit,
        score_field: args.score_field.clone(),
    };

    let lists = display.lists(&ranking);
    info!("\nBest nations:");
    for entry in &lists.best {
        info!("  {:>3}. {}", entry.rank, entry.label());
    }

    info!("\nWorst nations:");
    for entry in &lists.worst {
        info!("  {:>3}. {}", entry.rank, entry.label());
    }

    if args.verbose {
        for record in records.iter().filter(|r| r.nation_name().is_some()) {
            let breakdown = score_breakdown(record, &weights);
            let parts: Vec<String> = breakdown
                .contributions
                .iter()
                .filter(|c| c.contribution != 0.0)
                .map(|c| format!("{}={:.2}", c.metric, c.contribution))
                .collect();
            debug!(
                "{}: {:.2} [{}]",
                breakdown.name.unwrap_or_default(),
                breakdown.score,
                parts.join(", ")
            );
        }
    }

    if let Some(output) = &args.output {
        info!("\nWriting output to {:?}", output);
        let report = serde_json::json!({
            "ranking": display.ranking_json(&ranking),
            "range": range,
            "weights": weights,
            "metrics": Metric::ALL,
            "generated_at": chrono::Utc::now().to_rfc3339(),
        });
        let file = File::create(output)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)?;

        if let Some(geometry_path) = &args.geometry {
            let geometry = choropleth::load_geometry(geometry_path)?;
            let series = choropleth::MapSeries::from_ranking(&ranking);
            let scale = ColorScale::default();
            let bound = choropleth::bind_geometry(&geometry, &series, &scale, &args.name_property);

            for name in &bound.unmatched {
                debug!("No geometry for {}", name);
            }

            let geojson_path = output.with_extension("geojson");
            info!("Writing GeoJSON to {:?}", geojson_path);
            let file = File::create(&geojson_path)?;
            serde_json::to_writer_pretty(
                BufWriter::new(file),
                &choropleth::to_geojson(&bound, &series, &scale),
            )?;
        }
    } else if args.geometry.is_some() {
        info!("--geometry ignored without --output");
    }

    // Summary
    info!("\n{}", "=".repeat(60));
    info!("SUMMARY");
    info!("{}", "=".repeat(60));
    info!("Rows loaded: {}", records.len());
    info!("Nations ranked: {}", ranking.len());
    if let Some(top) = ranking.entries().first() {
        info!("Top nation: {} ({:.2})", top.name, top.score);
    }

    Ok(())
}
