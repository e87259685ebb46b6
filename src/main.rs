// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Garage-Desk development shell.
//!
//! Logs in with `GARAGE_EMAIL` / `GARAGE_PASSWORD` when set, warms the
//! caches, and runs the reader bridge against a line-based driver on stdin:
//!
//! ```text
//! attach <reader>    detach <reader>    card <uid>    off    error <message>
//! ```

use garage_desk::{
    config::Config,
    reader::{self, DriverEvent, ReaderState},
    AppContext,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(
        api = %config.api_base_url,
        cache_dir = %config.cache_dir.display(),
        "Starting Garage-Desk"
    );

    let ctx = AppContext::new(config)?;

    if let (Ok(email), Ok(password)) = (
        std::env::var("GARAGE_EMAIL"),
        std::env::var("GARAGE_PASSWORD"),
    ) {
        let user = ctx.auth.login(&email, &password).await?;
        tracing::info!(user = %user.full_name(), role = ?user.role, "Session started");
        warm_caches(&ctx).await;
    }

    let (driver_tx, driver_rx) = mpsc::channel(64);
    let (mut hub, bridge) = reader::start(driver_rx, ctx.config.reader_poll_interval);
    let mut reader_state = bridge.subscribe();

    let stdin = tokio::spawn(read_driver_lines(driver_tx));

    loop {
        tokio::select! {
            changed = reader_state.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = reader_state.borrow_and_update().clone();
                report_reader_state(&ctx, &state).await;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
            _ = &mut hub => {
                tracing::info!("Reader driver closed");
                break;
            }
        }
    }

    bridge.dispose();
    stdin.abort();
    tracing::info!("Garage-Desk stopped");
    Ok(())
}

/// Fill every cache so the UI starts warm; failures are logged only.
async fn warm_caches(ctx: &AppContext) {
    match ctx.garages.get_garages().await {
        Ok(garages) => tracing::info!(count = garages.len(), "Garages ready"),
        Err(e) => tracing::warn!(error = %e, "Failed to load garages"),
    }
    match ctx.users.get_users().await {
        Ok(users) => tracing::info!(count = users.len(), "Users ready"),
        Err(e) => tracing::warn!(error = %e, "Failed to load users"),
    }
    match ctx.tasks.get_active_tasks().await {
        Ok(tasks) => tracing::info!(count = tasks.len(), "Active tasks ready"),
        Err(e) => tracing::warn!(error = %e, "Failed to load tasks"),
    }
}

async fn report_reader_state(ctx: &AppContext, state: &ReaderState) {
    tracing::info!(connected = state.is_connected(), card = ?state.card_uid(), "Reader state");

    let Some(uid) = state.card_uid() else {
        return;
    };
    if !ctx.session.is_authenticated() {
        return;
    }
    match ctx.users.find_user_by_card_uid(uid).await {
        Ok(Some(user)) => tracing::info!(user_id = %user.id, name = %user.full_name(), "Card holder"),
        Ok(None) => tracing::info!(uid, "Card not associated with any worker"),
        Err(e) => tracing::warn!(error = %e, "Failed to resolve card holder"),
    }
}

/// Turn stdin lines into driver events until EOF.
async fn read_driver_lines(driver: mpsc::Sender<DriverEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let Some(event) = parse_driver_line(&line) else {
            tracing::warn!(line = %line, "Unrecognized driver command");
            continue;
        };
        if driver.send(event).await.is_err() {
            break;
        }
    }
}

fn parse_driver_line(line: &str) -> Option<DriverEvent> {
    let mut parts = line.split_whitespace();
    let command = parts.next()?;
    let arg = parts.collect::<Vec<_>>().join(" ");
    let reader = || {
        if arg.is_empty() {
            "stdin".to_string()
        } else {
            arg.clone()
        }
    };

    match command {
        "attach" => Some(DriverEvent::ReaderAttached { reader: reader() }),
        "detach" => Some(DriverEvent::ReaderDetached { reader: reader() }),
        "card" if !arg.is_empty() => Some(DriverEvent::CardPresent {
            reader: "stdin".to_string(),
            uid: arg.clone(),
        }),
        "off" => Some(DriverEvent::CardOff {
            reader: "stdin".to_string(),
        }),
        "error" => Some(DriverEvent::Error { message: arg.clone() }),
        _ => None,
    }
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("garage_desk=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
