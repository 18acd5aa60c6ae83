// ABOUTME: NutriLog HTTP server binary
// ABOUTME: Loads environment configuration, opens the database, and serves the JSON API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # `NutriLog` Server Binary
//!
//! Configuration comes from the environment; the flags below override the
//! matching variables.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use nutrilog::{
    config::{DatabaseUrl, ServerConfig},
    logging,
    resources::ServerResources,
    server,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "nutrilog-server")]
#[command(about = "NutriLog - nutrition tracking API with USDA food import")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL (e.g. `sqlite:./data/nutrilog.db` or `sqlite::memory:`)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(url) = args.database_url {
        config.database_url = DatabaseUrl::parse_url(&url)?;
    }
    config.validate()?;

    info!("Starting NutriLog server");
    info!("{}", config.summary());

    let resources = Arc::new(ServerResources::initialize(config).await?);

    if let Err(e) = server::run_server(resources).await {
        error!("Server error: {e:#}");
        return Err(e);
    }
    Ok(())
}
