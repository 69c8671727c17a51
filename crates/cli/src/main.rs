#![deny(unsafe_code)]
//! CLI binary for the flowhatch flow-line generator.
//!
//! Subcommands:
//! - `trace <field>`: fill a domain with flow lines, write them as JSON
//! - `list`: print available field sources and density maps

mod error;
mod output;

use clap::{Parser, Subcommand};
use error::{CliError, Document};
use flowhatch_core::{FlowConfig, FlowLineGenerator, Seed};
use flowhatch_fields::{build_field, density_from_name, list_densities, FieldKind};
use log::info;
use output::{write_json, LineRecord, LineSet};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "flowhatch", about = "Space-filling flow-line generator")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fill a domain with flow lines and write them as JSON.
    Trace {
        /// Field source name (e.g. "curl").
        field: String,

        /// Domain width.
        #[arg(short = 'W', long)]
        width: Option<f64>,

        /// Domain height.
        #[arg(short = 'H', long)]
        height: Option<f64>,

        /// PRNG seed for deterministic output.
        #[arg(long)]
        seed: Option<u64>,

        /// Field and generator parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// JSON file of generator and field parameters; `--params` and
        /// explicit flags take precedence.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Density map name (none, radial, noise).
        #[arg(short, long, default_value = "none")]
        density: String,

        /// Stop after this many lines are kept (0 = run until seeds run out).
        #[arg(short, long, default_value_t = 0)]
        lines: usize,

        /// Drop lines with fewer points than this.
        #[arg(long, default_value_t = 2)]
        min_points: usize,

        /// Output file path; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List available field sources and density maps.
    List,
}

/// Parses a JSON document that must be an object.
fn parse_object(text: &str, document: Document) -> Result<Value, CliError> {
    let bad = |reason: String| CliError::BadDocument { document, reason };
    let value: Value =
        serde_json::from_str(text).map_err(|e| bad(format!("invalid JSON: {e}")))?;
    if !value.is_object() {
        return Err(bad("must be a JSON object".to_owned()));
    }
    Ok(value)
}

fn read_config(path: &Path) -> Result<Value, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
    parse_object(&text, Document::ConfigFile)
}

/// Shallow merge: keys in `overlay` replace keys in `base`.
fn merge_params(mut base: Value, overlay: Value) -> Value {
    if let (Some(base_map), Value::Object(overlay_map)) = (base.as_object_mut(), overlay) {
        base_map.extend(overlay_map);
    }
    base
}

/// Runs a generator dry (or up to `seed.lines` kept lines).
fn trace(seed: &Seed, density: &str, min_points: usize) -> Result<LineSet, CliError> {
    let config: FlowConfig = seed.to_config()?;
    let field = build_field(&seed.field, seed.width, seed.height, seed.seed, &seed.params)?;
    let density = density_from_name(density, seed.width, seed.height, seed.seed, &seed.params)?;
    let generator = FlowLineGenerator::new(config, field, density)?;

    let limit = if seed.lines == 0 { usize::MAX } else { seed.lines };
    let lines: Vec<LineRecord> = generator
        .filter(|line| line.len() >= min_points)
        .take(limit)
        .map(|line| LineRecord::from(&line))
        .collect();

    Ok(LineSet {
        width: seed.width,
        height: seed.height,
        seed: seed.clone(),
        lines,
    })
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let fields = FieldKind::list_fields();
            let densities = list_densities();
            if cli.json {
                let info = serde_json::json!({
                    "fields": fields,
                    "densities": densities,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Fields:");
                for name in fields {
                    println!("  {name}");
                }
                println!("Densities:");
                println!("  {}", densities.join(", "));
            }
        }
        Command::Trace {
            field,
            width,
            height,
            seed,
            params,
            config,
            density,
            lines,
            min_points,
            output,
        } => {
            let base = match &config {
                Some(path) => read_config(path)?,
                None => Value::Object(serde_json::Map::new()),
            };
            let params = merge_params(base, parse_object(&params, Document::Params)?);
            let defaults = FlowConfig::from_json(&params)?;

            let mut run_seed = Seed::new(
                &field,
                width.unwrap_or(defaults.width),
                height.unwrap_or(defaults.height),
                seed.unwrap_or(defaults.seed),
            );
            run_seed.params = params;
            run_seed.lines = lines;
            info!("tracing {field} with density {density}");

            let set = trace(&run_seed, &density, min_points)?;

            match &output {
                Some(path) => write_json(&set, path)?,
                None => println!("{}", serde_json::to_string_pretty(&set)?),
            }

            if cli.json {
                let info = serde_json::json!({
                    "field": field,
                    "density": density,
                    "width": set.width,
                    "height": set.height,
                    "seed": run_seed.seed,
                    "lines": set.lines.len(),
                    "points": set.point_count(),
                    "total_length": set.total_length(),
                    "output": output.as_ref().map(|p| p.display().to_string()),
                });
                eprintln!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "traced {field} ({}x{}, seed {}, density {density}): {} lines, {} points",
                    set.width,
                    set.height,
                    run_seed.seed,
                    set.lines.len(),
                    set.point_count()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({
                "error": e.to_string(),
                "kind": e.kind(),
                "exit_code": e.exit_code(),
            });
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
