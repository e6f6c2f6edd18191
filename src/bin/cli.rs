// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe expression CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use polyframe_expr::environment::EnvironmentConfig;
use polyframe_expr::io::{write_stl, PartSelection, ResultDump};
use polyframe_expr::{BuildResult, Environment, EvaluationContext, Node};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "polyframe-expr")]
#[command(about = "Inspect and realize dumped Polyframe geometry nodes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Realize a node and print its measurements
    Eval {
        /// Node or result dump as JSON
        input: PathBuf,

        /// Write the realized geometry as binary STL
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the simplified form of a node
    Simplify {
        input: PathBuf,
    },

    /// Print the content fingerprint of a node
    Fingerprint {
        input: PathBuf,
    },

    /// Show the segment count an environment resolves for a radius
    Segments {
        radius: f64,

        /// Environment TOML; defaults to ./polyframe.toml and POLYFRAME_* variables
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Arc angle in degrees
        #[arg(short, long, default_value = "360")]
        angle: f64,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Eval { input, output } => eval_command(input, output.as_deref(), cli.verbose)?,
        Commands::Simplify { input } => {
            let node = load_node(input)?;
            println!("{}", node.simplified().to_json_pretty()?);
        }
        Commands::Fingerprint { input } => {
            println!("{}", load_node(input)?.fingerprint());
        }
        Commands::Segments {
            radius,
            config,
            angle,
        } => segments_command(*radius, *angle, config.as_deref(), cli.verbose)?,
        Commands::Version => {
            println!("Polyframe expression core v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// Accept both a bare node and a result dump
fn load_node(path: &Path) -> Result<Arc<Node>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read node file: {:?}", path))?;
    match Node::from_json(&source) {
        Ok(node) => Ok(Arc::new(node)),
        Err(_) => {
            let dump: ResultDump = serde_json::from_str(&source)
                .with_context(|| format!("Failed to parse node file: {:?}", path))?;
            Ok(dump.node)
        }
    }
}

fn eval_command(input: &Path, output: Option<&Path>, verbose: bool) -> Result<()> {
    let node = load_node(input)?;
    if verbose {
        println!("{} {}", "Node:".bold(), node.fingerprint().cyan());
        println!("{} {}", "Size:".bold(), node.node_count());
    }

    let ctx = EvaluationContext::default();
    let result = BuildResult::new(node);

    let start = Instant::now();
    let concrete = ctx
        .realize(&result.node)
        .with_context(|| format!("Failed to realize {:?}", input))?;
    let elapsed = start.elapsed();

    println!("{}", "Measurements:".bold());
    print!("{}", ctx.kernel().measure(&concrete));
    println!("{} {:.2?}", "Realized in".bright_black(), elapsed);

    if let Some(output) = output {
        let file = File::create(output)
            .with_context(|| format!("Failed to create STL file: {:?}", output))?;
        write_stl(&ctx, &result, &mut BufWriter::new(file), PartSelection::All)
            .context("Failed to write STL file")?;
        println!("{} {}", "Wrote".green(), output.display());
    }

    if verbose {
        println!("{} {}", "Cache:".bold(), ctx.stats());
    }
    Ok(())
}

fn segments_command(radius: f64, angle: f64, config: Option<&Path>, verbose: bool) -> Result<()> {
    let env = match config {
        Some(path) => Environment::from_file(path)?,
        None => EnvironmentConfig::load()?.environment(),
    };
    if verbose {
        println!("{} {:?}", "Segmentation:".bold(), env.segmentation);
    }
    let count = if angle >= 360.0 {
        env.segment_count(radius)
    } else {
        env.segment_count_for_arc(radius, angle)
    };
    println!("{}", count);
    Ok(())
}
