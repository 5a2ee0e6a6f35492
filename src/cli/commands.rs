use std::path::Path;

use crate::app::{AppContext, RankscoutError, Result};
use crate::config::Config;
use crate::delivery::DeliveryOutcome;
use crate::domain::{Category, Platform};
use crate::orchestrator::{CategoryReport, CategoryStatus, RunSummary};

pub async fn run(ctx: &AppContext, platform: Option<Platform>, dry_run: bool) -> Result<RunSummary> {
    let platforms = match platform {
        Some(p) => vec![p],
        None => Platform::ALL.to_vec(),
    };

    if dry_run {
        println!("Dry run: nothing will be delivered");
    } else {
        println!("Delivering to {}", ctx.delivery.endpoint());
    }

    let adapters = ctx.adapters(&platforms)?;
    let summary = ctx.orchestrator(dry_run).run(adapters).await;

    print_summary(&summary);
    Ok(summary)
}

fn format_category(report: &CategoryReport) -> String {
    match &report.status {
        CategoryStatus::Collected { count } => format!("  {:<6} {}", report.category, count),
        CategoryStatus::Failed { reason } => format!("  {:<6} failed: {}", report.category, reason),
        CategoryStatus::NotAttempted => format!("  {:<6} not attempted", report.category),
    }
}

pub fn print_summary(summary: &RunSummary) {
    for report in &summary.platforms {
        println!("[{}] {} entries", report.platform, report.total());
        for category in &report.categories {
            println!("{}", format_category(category));
        }
        if let Some(reason) = &report.aborted {
            println!("  aborted: {}", reason);
        }
        match &report.delivery {
            DeliveryOutcome::Skipped => println!("  delivery: nothing to send"),
            DeliveryOutcome::Delivered { count } => println!("  delivery: sent {} entries", count),
            DeliveryOutcome::Failed { reason } => println!("  delivery: FAILED ({})", reason),
            DeliveryOutcome::DryRun { count } => println!("  delivery: dry run, {} entries", count),
        }
    }

    let elapsed = summary.finished_at - summary.started_at;
    println!("Run complete in {}s", elapsed.num_seconds());
}

pub async fn show(ctx: &AppContext, platform: Platform, category: Option<Category>) -> Result<()> {
    let categories = match category {
        Some(c) => vec![c],
        None => Category::ALL.to_vec(),
    };

    let adapter = ctx.adapter(platform)?;
    let collection = ctx
        .orchestrator(true)
        .with_categories(categories)
        .collect(adapter.as_ref())
        .await;

    if collection.entries.is_empty() {
        println!("No entries");
    }

    for entry in &collection.entries {
        println!(
            "{:<6} {:>3}. {} | {}\n           {}",
            entry.category(),
            entry.rank(),
            entry.title(),
            entry.publisher(),
            entry.link()
        );
    }

    for report in &collection.categories {
        if !matches!(report.status, CategoryStatus::Collected { .. }) {
            eprintln!("{}", format_category(report));
        }
    }

    Ok(())
}

pub fn show_config(config: &Config, path: &Path) -> Result<()> {
    println!("Config file: {}", path.display());

    let mut shown = config.clone();
    if !shown.delivery.secret_key.is_empty() {
        shown.delivery.secret_key = "********".to_string();
    }

    let rendered = toml::to_string(&shown).map_err(|e| RankscoutError::Other(e.to_string()))?;
    println!("{}", rendered);
    Ok(())
}
