// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::process::ExitCode;

use anyhow::Result;

use spendsight::commands::{self, print_notice, AppContext};
use spendsight::config::AppConfig;
use spendsight::errors::TrackerError;
use spendsight::session::Notice;
use spendsight::cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<TrackerError>() {
                Some(te) => print_notice(&Notice::from_error(te)),
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let matches = cli::build_cli().get_matches();
    let ctx = AppContext::open(AppConfig::load()?)?;

    match matches.subcommand() {
        Some(("signup", sub)) => commands::account::signup(&ctx, sub).await?,
        Some(("login", sub)) => commands::account::login(&ctx, sub).await?,
        Some(("logout", _)) => commands::account::logout(&ctx).await?,
        Some(("whoami", _)) => commands::account::whoami(&ctx).await?,
        Some(("expense", sub)) => commands::expenses::handle(&ctx, sub).await?,
        Some(("summary", sub)) => commands::summary::handle(&ctx, sub).await?,
        Some(("budget", sub)) => commands::budgets::handle(&ctx, sub).await?,
        Some(("currency", sub)) => commands::currency::handle(&ctx, sub).await?,
        Some(("export", sub)) => commands::exporter::handle(&ctx, sub).await?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
