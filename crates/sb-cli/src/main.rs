//! sigblock CLI
//!
//! CLI tool for checking requests against filter lists and inspecting
//! what a set of lists compiles to.

use std::fs;
use std::path::Path;
use std::time::Instant;

use clap::{Parser, Subcommand};

use sb_compiler::{load_filter_list, LoadStats};
use sb_core::{FilterEngine, RuleAction, TestFlags};
use sb_service::{FileFeed, FilterConfig, UriTester};

#[derive(Parser)]
#[command(name = "sb-cli")]
#[command(about = "sigblock filter list tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check request URLs against filter lists
    Check {
        /// Input filter list files
        #[arg(short, long)]
        list: Vec<String>,

        /// Request URLs to test
        #[arg(short, long, required = true)]
        url: Vec<String>,

        /// URL of the page issuing the requests
        #[arg(short, long)]
        page: Option<String>,

        /// JSON filter config (`enabled`, `filters`)
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Load filter lists and print rule and index statistics
    Stats {
        /// Input filter list files
        #[arg(short, long, required = true)]
        list: Vec<String>,
    },

    /// Print element hiding output
    Css {
        /// Input filter list files
        #[arg(short, long, required = true)]
        list: Vec<String>,

        /// Only print selectors for this domain
        #[arg(short, long)]
        domain: Option<String>,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            list,
            url,
            page,
            config,
        } => cmd_check(&list, &url, page.as_deref(), config.as_deref()),
        Commands::Stats { list } => cmd_stats(&list),
        Commands::Css { list, domain } => cmd_css(&list, domain.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_check(
    lists: &[String],
    urls: &[String],
    page: Option<&str>,
    config_path: Option<&str>,
) -> Result<(), String> {
    let mut config = match config_path {
        Some(path) => FilterConfig::load(path).map_err(|e| e.to_string())?,
        None => FilterConfig::default(),
    };
    config.filters.extend(lists.iter().cloned());

    if config.enabled && config.filters.is_empty() {
        return Err("No filter lists specified".to_string());
    }

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to start runtime: {}", e))?;

    runtime.block_on(async {
        let tester = UriTester::new(FileFeed::new(), config);
        let stats = tester.reload().await;

        if !stats.failed.is_empty() {
            return Err(format!("Failed to load: {}", stats.failed.join(", ")));
        }

        for url in urls {
            let decision = tester.test_uri(url, page, TestFlags::ADBLOCK).await;
            let verdict = if decision.is_blocked() { "BLOCKED" } else { "ALLOWED" };
            println!("{:<8} {}", verdict, url);
        }
        Ok(())
    })
}

fn cmd_stats(lists: &[String]) -> Result<(), String> {
    let start = Instant::now();
    let mut engine = FilterEngine::new();
    let mut total = LoadStats::default();

    for (list_id, path) in lists.iter().enumerate() {
        let content = read_list(path)?;

        let list_start = Instant::now();
        let stats = load_filter_list(&mut engine, &content);
        let elapsed = list_start.elapsed();

        println!(
            "  [{}] {} - {} lines, {} rules ({} failed), {} hide rules, {} skipped, {:.1}ms",
            list_id,
            Path::new(path).file_name().unwrap_or_default().to_string_lossy(),
            stats.lines,
            stats.network_rules(),
            stats.failed_rules,
            stats.hide_rules,
            stats.skipped.total(),
            elapsed.as_secs_f64() * 1000.0,
        );
        total.merge(&stats);
    }

    let total_time = start.elapsed();
    let block = engine.rule_set(RuleAction::Block);
    let allow = engine.rule_set(RuleAction::Allow);

    println!();
    println!("Loaded {} filter lists", lists.len());
    println!("  Lines:       {}", total.lines);
    println!("  Rules:       {} block, {} exception, {} failed", total.block_rules, total.allow_rules, total.failed_rules);
    println!("  Hide rules:  {} ({} rejected)", total.hide_rules, total.rejected_hide_rules);
    println!(
        "  Skipped:     {} (comments {}, sections {}, domain= {}, malformed {}, legacy # {}, subdocument {})",
        total.skipped.total(),
        total.skipped.comments,
        total.skipped.sections,
        total.skipped.domain_options,
        total.skipped.malformed,
        total.skipped.legacy_hides,
        total.skipped.subdocuments,
    );
    println!();
    println!("Indices:");
    println!("  Block:       {} signatures, {} patterns", block.signature_count(), block.pattern_count());
    println!("  Exception:   {} signatures, {} patterns", allow.signature_count(), allow.pattern_count());
    println!("  Hide domains: {}", engine.css().domain_count());
    println!("  Time:        {:.1}ms", total_time.as_secs_f64() * 1000.0);

    Ok(())
}

fn cmd_css(lists: &[String], domain: Option<&str>) -> Result<(), String> {
    let mut engine = FilterEngine::new();
    for path in lists {
        let content = read_list(path)?;
        load_filter_list(&mut engine, &content);
    }

    let css = engine.css();
    match domain {
        Some(domain) => {
            for selector in css.selectors_for(domain) {
                println!("{}", selector);
            }
        }
        None => {
            println!("{}", css.stylesheet());
            if !css.domain_script().is_empty() {
                println!("{}", css.domain_script());
            }
        }
    }

    Ok(())
}

fn read_list(path: &str) -> Result<String, String> {
    let bytes = fs::read(path).map_err(|e| format!("Failed to read '{}': {}", path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
