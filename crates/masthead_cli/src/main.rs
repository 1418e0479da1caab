//! Masthead CLI
//!
//! Replay scroll and resize scripts against page fixtures and inspect how
//! the sticky header reacts.

use anyhow::Result;
use clap::{Parser, Subcommand};
use masthead_dom::{Document, ElementId, MemoryDocument};
use masthead_engine::prelude::*;
use masthead_engine::InertReason;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod fixture;

#[derive(Parser)]
#[command(name = "masthead")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sticky header behavior replay tool", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a script against a page and print the header after each step
    Replay {
        /// Page fixture (JSON)
        #[arg(short, long)]
        page: PathBuf,

        /// Configuration injected as the page's data island (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Script of steps to replay (JSON)
        #[arg(short, long)]
        script: PathBuf,
    },

    /// Resolve a configuration file and print the result
    CheckConfig {
        /// Configuration file (JSON)
        config: PathBuf,

        /// Platform reports a reduced-motion preference
        #[arg(long)]
        prefers_reduced_motion: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Replay {
            page,
            config,
            script,
        } => cmd_replay(&page, config.as_deref(), &script),

        Commands::CheckConfig {
            config,
            prefers_reduced_motion,
        } => cmd_check_config(&config, prefers_reduced_motion),
    }
}

fn cmd_replay(page: &Path, config: Option<&Path>, script: &Path) -> Result<()> {
    let mut doc = fixture::load_page(page)?;
    if let Some(path) = config {
        let value = fixture::load_config(path)?;
        fixture::inject_config(&mut doc, &value);
    }
    let script = fixture::load_script(script)?;
    debug!("Replaying {} steps", script.steps.len());

    let mut host = ScriptedHost::new(doc, script);
    let capabilities = host.capabilities();
    let mut engine = Engine::install(host.document_mut(), None, capabilities);

    match &engine {
        Engine::Inert(reason) => warn!("Engine inert: {}", reason),
        Engine::Pending { .. } => println!("install: deferred until ready"),
        Engine::Running(_) => {}
    }
    print_state("install", &engine, host.document());

    while let Some(tick) = host.next_tick() {
        if let Some(notification) = tick.notification {
            engine.handle(host.document_mut(), notification, tick.now);
        }
        let label = host
            .last_step()
            .map(describe_step)
            .unwrap_or_else(|| "?".to_string());
        print_state(&label, &engine, host.document());
    }

    Ok(())
}

fn cmd_check_config(path: &Path, prefers_reduced_motion: bool) -> Result<()> {
    let value = fixture::load_config(path)?;
    match Configuration::from_json(&value, prefers_reduced_motion) {
        Ok(config) => {
            println!("{:#?}", config);
            if !config.enabled {
                println!("inert: {}", InertReason::Disabled);
            }
        }
        Err(e) => println!("inert: {}", InertReason::Config(e)),
    }
    Ok(())
}

fn describe_step(step: &Step) -> String {
    match step {
        Step::Ready => "ready".to_string(),
        Step::ScrollTo { y } => format!("scroll_to {}", y),
        Step::ResizeViewport { width, height } => format!("resize_viewport {}x{}", width, height),
        Step::ResizeHeader { height } => format!("resize_header {}", height),
        Step::Wait { ms } => format!("wait {}ms", ms),
    }
}

fn print_state(label: &str, engine: &Engine<ElementId>, doc: &MemoryDocument) {
    let Some(coordinator) = engine.coordinator() else {
        println!("{:<24} scroll={:<8} (not running)", label, doc.scroll_y());
        return;
    };
    let header = coordinator.header();
    let variable = |name: &str| doc.style_property(header, name).unwrap_or_else(|| "-".to_string());

    println!(
        "{:<24} scroll={:<8} active={:<5} hidden={:<5} bg={:<24} text={:<8} classes=[{}]",
        label,
        doc.scroll_y(),
        coordinator.is_active(),
        coordinator.is_hidden(),
        variable(vars::BG),
        variable(vars::TEXT_COLOR),
        doc.classes(header).join(" "),
    );
}
