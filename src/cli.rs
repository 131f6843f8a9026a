use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::info;

use crate::ingest;
use crate::ingest::url::{deep_link, extract_deep_link};
use crate::model::plan::RecentPlan;
use crate::render;
use crate::store::Store;
use crate::telemetry;

const DEFAULT_STORE_PATH: &str = "tripsheet_store.json";
const DEFAULT_SHARE_BASE: &str = "https://tripsheet.app";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Parser)]
#[command(name = "tripsheet", version, about = "Itinerary viewer for shared spreadsheets")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load an itinerary from a sheet link and display it
    Load {
        /// Sheet link or share deep link. Omitted: reload the last sheet.
        link: Option<String>,

        /// Request the CSV export even for published-HTML links
        #[arg(long)]
        force_csv: bool,

        /// Print the stop list as JSON instead of the list view
        #[arg(long)]
        json: bool,

        /// Show only stops with this category label
        #[arg(long)]
        filter: Option<String>,
    },

    /// List recently loaded plans
    Recent {
        /// Remove a plan (by sheet link) from the list
        #[arg(long)]
        remove: Option<String>,
    },

    /// Toggle the visited flag of a stop in the last loaded sheet
    Visit { id: usize },

    /// Print a shareable deep link for a sheet
    Share { link: Option<String> },

    /// Forget the last loaded sheet
    Reset,
}

fn open_store() -> Result<Store> {
    let path = dotenvy::var("TRIPSHEET_STORE").unwrap_or_else(|_| DEFAULT_STORE_PATH.to_string());
    Store::open(path)
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("building http client")
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Load { link, force_csv, json, filter } => {
            load(link, force_csv, json, filter).await
        }
        Command::Recent { remove } => recent(remove),
        Command::Visit { id } => visit(id),
        Command::Share { link } => share(link),
        Command::Reset => reset(),
    }
}

async fn load(
    link: Option<String>,
    force_csv: bool,
    json: bool,
    filter: Option<String>,
) -> Result<()> {
    let mut store = open_store()?;

    let link = match link {
        // A share deep link carries the sheet link as a query parameter.
        Some(l) => extract_deep_link(&l).unwrap_or(l),
        None => store
            .last_url()
            .map(str::to_string)
            .context("no sheet link given and none stored; run `tripsheet load <link>`")?,
    };

    let client = http_client()?;
    let mut trace = Vec::new();

    let itinerary = match ingest::load(&client, &link, force_csv, &mut trace).await {
        Ok(itinerary) => itinerary,
        Err(e) => {
            eprintln!("Error: {e}");
            if !force_csv {
                eprintln!("Retry in forced-CSV mode with: tripsheet load --force-csv");
            }
            eprintln!("\nDiagnostic trace:");
            for line in &trace {
                eprintln!("  {line}");
            }
            std::process::exit(1);
        }
    };

    store.set_last_url(&link)?;
    store.record_plan(RecentPlan {
        url: link.clone(),
        name: itinerary.plan_name(),
        location_count: itinerary.location_count(),
        last_opened: Utc::now(),
    })?;

    if json {
        println!("{}", render::render_json(&itinerary)?);
    } else {
        let visited = store.visited(&link);
        print!("{}", render::render_list(&itinerary, filter.as_deref(), &visited));
    }

    if let Ok(endpoint) = dotenvy::var("LOGGING_URL") {
        if !endpoint.is_empty() {
            telemetry::log_visit(&client, &endpoint).await;
        }
    }

    Ok(())
}

fn recent(remove: Option<String>) -> Result<()> {
    let mut store = open_store()?;

    if let Some(url) = remove {
        store.remove_plan(&url)?;
        info!("removed plan {url}");
    }

    let plans = store.recent_plans();
    if plans.is_empty() {
        println!("No recent plans.");
        return Ok(());
    }
    for plan in plans {
        println!(
            "{}  ({} locations, last opened {})\n    {}",
            plan.name,
            plan.location_count,
            plan.last_opened.format("%Y-%m-%d"),
            plan.url
        );
    }
    Ok(())
}

fn visit(id: usize) -> Result<()> {
    let mut store = open_store()?;
    let url = store
        .last_url()
        .map(str::to_string)
        .context("no sheet loaded yet")?;
    let flag = store.toggle_visited(&url, id)?;
    println!("Stop {id}: {}", if flag { "visited" } else { "not visited" });
    Ok(())
}

fn share(link: Option<String>) -> Result<()> {
    let store = open_store()?;
    let link = match link {
        Some(l) => l,
        None => store
            .last_url()
            .map(str::to_string)
            .context("no sheet loaded yet")?,
    };
    let base =
        dotenvy::var("TRIPSHEET_SHARE_BASE").unwrap_or_else(|_| DEFAULT_SHARE_BASE.to_string());
    println!("{}", deep_link(&base, &link));
    Ok(())
}

fn reset() -> Result<()> {
    let mut store = open_store()?;
    store.clear_last_url()?;
    println!("Forgot the last loaded sheet.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn load_accepts_flags() {
        let cli = Cli::try_parse_from([
            "tripsheet", "load", "https://docs.google.com/spreadsheets/d/x/edit",
            "--force-csv", "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Load { link, force_csv, json, filter } => {
                assert!(link.unwrap().contains("/spreadsheets/d/x/"));
                assert!(force_csv);
                assert!(json);
                assert!(filter.is_none());
            }
            _ => panic!("expected load"),
        }
    }
}
