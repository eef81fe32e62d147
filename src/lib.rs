// src/lib.rs

pub mod cli;
pub mod config;
pub mod cursor;
pub mod engine;
pub mod errors;
pub mod exchange;
pub mod job;
pub mod logging;
pub mod processor;
pub mod progress;
pub mod stream;
pub mod tasklet;
pub mod types;

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::job::Job;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - job assembly (sources, processor tasklet, sink tasklets)
/// - the execution service
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let job = Job::from_config(&cfg)?;
    info!(tasklets = ?job.tasklet_names(), "starting job");
    job.run().await?;
    info!("job finished");
    Ok(())
}

/// Simple dry-run output: print sources, processor and sinks.
fn print_dry_run(cfg: &ConfigFile) {
    println!("sluice dry-run");
    println!("  tasklet.high_water_mark = {}", cfg.tasklet.high_water_mark);
    println!(
        "  engine.idle_backoff = {}us..{}ms",
        cfg.engine.idle_backoff_min_us, cfg.engine.idle_backoff_max_ms
    );
    if cfg.engine.max_idle_rounds > 0 {
        println!("  engine.max_idle_rounds = {}", cfg.engine.max_idle_rounds);
    }
    println!();

    println!("sources ({}):", cfg.source.len());
    let mut sources: Vec<_> = cfg.source.iter().collect();
    sources.sort_by_key(|s| (s.priority, s.ordinal));
    for source in sources {
        println!("  - {}", source.name);
        println!(
            "      ordinal: {}  priority: {}  batch_size: {}",
            source.ordinal, source.priority, source.batch_size
        );
        println!("      items: {}", source.items.len());
    }
    println!();

    println!("processor: {} ({:?})", cfg.processor.name, cfg.processor.kind);
    if cfg.processor.blocking {
        println!("  blocking: true");
    }
    println!();

    println!("sinks ({}):", cfg.sink.len());
    for sink in cfg.sink.iter() {
        println!("  - {}", sink.name);
        println!("      ordinal: {}  capacity: {}", sink.ordinal, sink.capacity);
    }

    debug!("dry-run complete (no execution)");
}
