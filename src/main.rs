#![allow(missing_docs)]

//! Msgsync CLI — aggregate a customer's messaging history and publish it
//! into a Sync list, or read a previously published list back.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::error;

use msgsync::config::Config;
use msgsync::pipeline::name::list_name_for;
use msgsync::pipeline::run::{RunPayload, Runner};
use msgsync::platform::sync::TwilioSync;
use msgsync::platform::twilio::TwilioPlatform;
use msgsync::platform::ListStore;

#[derive(Parser)]
#[command(name = "msgsync", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Aggregate messaging history for a payload and republish it.
    Run {
        /// Customer id the published list is named after.
        #[arg(long)]
        customer_id: Option<String>,

        /// Address or conversation-capable identifier; repeatable.
        #[arg(long = "identifier")]
        identifiers: Vec<String>,
    },
    /// Print the items of a previously published list.
    Show {
        /// Customer id used to derive the list name.
        #[arg(long)]
        customer_id: Option<String>,

        /// Identifier used to derive the list name; repeatable.
        #[arg(long = "identifier")]
        identifiers: Vec<String>,

        /// Explicit list name, bypassing derivation.
        #[arg(long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    // A missing .env is fine; the environment may carry everything.
    dotenvy::dotenv().ok();
    msgsync::logging::init();

    if let Err(e) = dispatch(Cli::parse()).await {
        error!("{e:#}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command {
        Command::Run {
            customer_id,
            identifiers,
        } => {
            let platform = Arc::new(TwilioPlatform::new(
                config.credentials.clone(),
                &config.endpoints,
            ));
            let store = Arc::new(TwilioSync::new(
                config.credentials.clone(),
                &config.endpoints,
            ));
            let runner = Runner::new(platform, store, config.sync_service_sid.clone());
            let payload = RunPayload {
                customer_id,
                identifiers,
            };
            let report = runner
                .run(&payload)
                .await
                .context("aggregation run failed")?;
            if !report.failures.is_empty() {
                anyhow::bail!(
                    "published {} of {} items to {}",
                    report.written,
                    report.written.saturating_add(report.failures.len()),
                    report.list_name
                );
            }
            Ok(())
        }
        Command::Show {
            customer_id,
            identifiers,
            name,
        } => {
            let list_name = match name {
                Some(name) => name,
                None => list_name_for(customer_id.as_deref(), &identifiers)
                    .context("cannot derive a list name from the given arguments")?,
            };
            let store = TwilioSync::new(config.credentials.clone(), &config.endpoints);
            let items = store
                .list_items(&config.sync_service_sid, &list_name)
                .await
                .with_context(|| format!("failed to read list {list_name}"))?;
            for item in items {
                println!("Item {}", item.index);
                println!("{}", serde_json::to_string_pretty(&item.data)?);
                println!("-------------------------");
            }
            Ok(())
        }
    }
}
