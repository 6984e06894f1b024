// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! quill-node CLI - inspect the built-in module registry

use clap::Parser;
use owo_colors::OwoColorize;
use quill_node::modules::timers::TimerQueue;
use quill_node::modules::util::inspect;
use quill_node::{
    builtin_modules, create_require_in, ModuleRegistry, Namespace, RequireContext,
    RuntimeConfig, Value, VERSION,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "quill-node",
    about = "Require Node.js built-in modules and inspect their namespaces",
    version = VERSION,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    /// Specifiers to require, e.g. `node:timers` or `buffer`
    specifiers: Vec<String>,

    /// List the built-in modules and exit
    #[arg(short, long)]
    list: bool,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };
    config.apply_env()?;

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("quill_node=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let registry = Arc::new(ModuleRegistry::from_config(&config));

    if cli.list || cli.specifiers.is_empty() {
        for name in builtin_modules(&registry) {
            println!("{}", name.cyan());
        }
        return Ok(());
    }

    // Two independent front-ends over one registry
    let main = create_require_in(Arc::clone(&registry), RequireContext::new("<cli:main>"));
    let other = create_require_in(Arc::clone(&registry), RequireContext::new("<cli:other>"));

    for specifier in &cli.specifiers {
        let loaded = main
            .call(specifier)
            .and_then(|first| other.call(specifier).map(|second| (first, second)));

        match loaded {
            Ok((first, second)) => print_namespace(specifier, &first, &second),
            Err(e) => {
                let name = e.exception_name();
                let message = e.to_string();
                let message = message.strip_prefix(&format!("{}: ", name)).unwrap_or(&message);
                eprintln!("{}: {} ({})", name.red().bold(), message, e.code().dimmed());
                std::process::exit(1);
            }
        }
    }

    // No event loop runs here; release anything the namespaces scheduled
    let abandoned = TimerQueue::global().drain();
    if !abandoned.is_empty() {
        debug!("Discarded {} pending timers", abandoned.len());
    }

    if cli.verbose {
        let stats = registry.stats();
        eprintln!(
            "{} hits={} misses={} builds={} failures={} not_found={}",
            "registry".dimmed(),
            stats.hits,
            stats.misses,
            stats.builds,
            stats.build_failures,
            stats.not_found
        );
    }

    Ok(())
}

fn print_namespace(specifier: &str, first: &Namespace, second: &Namespace) {
    let same = Namespace::ptr_eq(first, second);
    println!(
        "{} {}",
        specifier.cyan().bold(),
        if same {
            "(same object)".green().to_string()
        } else {
            "(different objects)".red().to_string()
        }
    );

    for (key, value) in first.entries() {
        let rendered = match &value {
            Value::Function(func) => format!("[Function: {}]", func.name()),
            other => inspect(other, None),
        };
        println!("  {}: {}", key.yellow(), rendered);
    }
}
