pub mod network;
pub mod token;

use anyhow::Context;
use notify::{RecursiveMode, Watcher};
use std::path::Path;
use std::time::{Duration, Instant};
use tabled::{Table, Tabled};
use tokio::sync::mpsc;

use crate::factory_dapp::session::SessionManager;
use crate::factory_dapp::wallet::WalletBridge;
use crate::factory_dapp::FactoryDapp;
use crate::util::{shorten_address, MARKER};
use crate::Manifest;

fn show_table<T: Tabled>(t: impl IntoIterator<Item = T>) {
    println!("{}", Table::new(t).with(tabled::settings::Style::markdown()))
}

pub async fn init() -> Result<(), anyhow::Error> {
    Manifest::create().context("failed to create `Basemint.toml`")?;

    println!("{MARKER} Created `Basemint.toml`.");
    println!("NOTE: you start on Base Sepolia. Switch with `basemint network switch mainnet`.");

    Ok(())
}

pub async fn status() -> Result<(), anyhow::Error> {
    let dapp = FactoryDapp::load()?;
    let snapshot = dapp.session().connect().await?;

    let account = snapshot
        .account
        .map(|account| shorten_address(&account))
        .unwrap_or_else(|| "(none)".to_owned());
    let network = match (&snapshot.network_name, snapshot.chain_id) {
        (Some(name), Some(chain_id)) => format!("{name} ({chain_id})"),
        _ => "(unknown)".to_owned(),
    };

    println!("{MARKER} Account: {account}");
    println!("{MARKER} Network: {network}");
    println!(
        "{MARKER} Writes:  {}",
        if snapshot.read_only {
            "disabled (no factory on this network)"
        } else {
            "enabled"
        }
    );

    if !snapshot.read_only {
        let stats = dapp.session().ledger().await.stats;
        println!(
            "{MARKER} Factory: {} tokens from {} creators",
            stats.total_tokens, stats.total_creators
        );
    }

    Ok(())
}

pub async fn stats() -> Result<(), anyhow::Error> {
    let dapp = FactoryDapp::load()?;
    dapp.session().connect().await?;
    let gateway = dapp.session().bound_gateway().await?;
    let stats = gateway.factory_stats().await?;

    #[derive(Tabled)]
    struct Row {
        total_tokens: u64,
        total_creators: u64,
        paused: bool,
    }

    show_table([Row {
        total_tokens: stats.total_tokens,
        total_creators: stats.total_creators,
        paused: stats.is_paused,
    }]);

    Ok(())
}

pub async fn watch() -> Result<(), anyhow::Error> {
    /// Minimum time between manifest reloads.
    const MIN_WAIT: Duration = Duration::from_secs(1);

    let dapp = FactoryDapp::load()?;

    // Subscribe before connecting: the connect itself emits events.
    let mut events = dapp.wallet().subscribe();
    dapp.session().connect().await?;
    render(dapp.session()).await;

    // Spawn file watcher.
    let (send, mut recv) = mpsc::unbounded_channel();
    let mut watcher = notify::recommended_watcher(move |event| match event {
        Ok(event) => {
            send.send(event).ok();
        }
        Err(err) => {
            tracing::error!("Notify error: {err}");
        }
    })?;
    watcher.watch(Path::new("."), RecursiveMode::NonRecursive)?;

    tracing::info!("Watching `Basemint.toml` for wallet changes");

    let wallet = dapp.wallet().clone();
    tokio::spawn(async move {
        // Last time the manifest was reloaded.
        let mut last_exec = Instant::now();

        while let Some(event) = recv.recv().await {
            let now = Instant::now();
            let manifest_changed = event
                .paths
                .iter()
                .any(|path| Manifest::is_manifest_path(path));

            if manifest_changed && now > last_exec + MIN_WAIT {
                if let Err(err) = wallet.reload_manifest().await {
                    println!("Error while reloading manifest: {err}");
                }

                last_exec = Instant::now();
            }
        }
    });

    // The session follows the wallet.
    while let Some(event) = events.recv().await {
        dapp.session().apply_event(event).await;
        render(dapp.session()).await;
    }

    Ok(())
}

async fn render(session: &SessionManager) {
    let snapshot = session.snapshot().await;

    let account = snapshot
        .account
        .map(|account| shorten_address(&account))
        .unwrap_or_else(|| "(disconnected)".to_owned());
    let network = snapshot
        .network_name
        .as_deref()
        .unwrap_or("an unknown network");
    let read_only = if snapshot.read_only { " [read-only]" } else { "" };

    println!();
    println!("{MARKER} {account} on {network}{read_only}");
    token::render_tokens(session).await;
}
