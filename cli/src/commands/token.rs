//! Commands for creating and inspecting tokens.

use anyhow::Context;
use ethers::types::Address;
use ethers::utils::to_checksum;
use tabled::Tabled;

use basemint_common::CreateTokenForm;

use crate::factory_dapp::session::SessionManager;
use crate::factory_dapp::FactoryDapp;
use crate::util::{read, MARKER};
use crate::Manifest;

use super::show_table;

pub async fn create(form: CreateTokenForm, yes: bool, no_wait: bool) -> Result<(), anyhow::Error> {
    let dapp = FactoryDapp::load()?;
    dapp.session().connect().await?;
    let gateway = dapp.session().bound_gateway().await?;

    let validated = form.validate()?;
    let stats = gateway.factory_stats().await.unwrap_or_default();
    if stats.is_paused {
        anyhow::bail!("The factory is paused; token creation is currently disabled.");
    }

    println!(
        "{MARKER} Creating token {:?} ({}) on {}",
        validated.name,
        validated.symbol,
        gateway.descriptor().display_name,
    );
    println!("  Decimals:       {}", validated.decimals);
    println!(
        "  Initial supply: {} ({} raw units)",
        form.initial_supply.trim(),
        validated.initial_supply
    );
    println!(
        "  Max supply:     {} ({} raw units)",
        form.max_supply.trim(),
        validated.max_supply
    );
    println!();

    if !yes && read("Type \"yes\" to proceed") != "yes" {
        println!("Not proceeding with transaction.");
        return Ok(());
    }

    let pending = dapp
        .session()
        .create_token(&form, !no_wait)
        .await
        .context("Sending `createToken` transaction to the factory")?;

    if no_wait {
        println!("{MARKER} Submitted `createToken` transaction.");
    } else {
        println!("{MARKER} Token created.");
    }
    println!(
        "{MARKER} View transaction at {}",
        gateway.descriptor().transaction_url(pending.tx_hash)
    );

    if !no_wait {
        render_tokens(dapp.session()).await;
    }

    Ok(())
}

pub async fn ls() -> Result<(), anyhow::Error> {
    let dapp = FactoryDapp::load()?;
    dapp.session().connect().await?;
    render_tokens(dapp.session()).await;

    Ok(())
}

pub async fn open(token: Address) -> Result<(), anyhow::Error> {
    let manifest = Manifest::find()?;
    let registry = manifest.registry()?;
    let url = registry
        .get(manifest.network.active)
        .descriptor
        .address_url(token);

    println!("{MARKER} Opening {url}");
    webbrowser::open(&url)?;

    Ok(())
}

/// Prints the connected creator's tokens and the factory totals.
pub(crate) async fn render_tokens(session: &SessionManager) {
    let snapshot = session.snapshot().await;
    let ledger = session.ledger().await;

    if ledger.tokens.is_empty() {
        println!("{}", empty_listing_note(snapshot.account.is_some()));
        return;
    }

    #[derive(Tabled)]
    struct Row {
        symbol: String,
        name: String,
        decimals: u8,
        initial_supply: String,
        max_supply: String,
        active: bool,
        created: String,
        explorer: String,
    }

    show_table(ledger.tokens.iter().map(|token| {
        let checksummed = to_checksum(&token.address, None);
        Row {
            symbol: token.symbol.clone(),
            name: token.name.clone(),
            decimals: token.decimals,
            initial_supply: token.initial_supply.clone(),
            max_supply: token.max_supply.clone(),
            active: token.is_active,
            created: token.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            explorer: snapshot
                .explorer_endpoint
                .as_ref()
                .map(|endpoint| format!("{endpoint}/address/{checksummed}"))
                .unwrap_or(checksummed),
        }
    }));

    let stats = ledger.stats;
    println!(
        "  Factory totals: {} tokens from {} creators{}",
        stats.total_tokens,
        stats.total_creators,
        if stats.is_paused {
            " (the factory is paused)"
        } else {
            ""
        },
    );
}

fn empty_listing_note(connected: bool) -> &'static str {
    if connected {
        "No tokens created yet."
    } else {
        "Connect wallet to view your tokens."
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_listing_notes_tell_connection_state_apart() {
        assert_eq!(empty_listing_note(true), "No tokens created yet.");
        assert_eq!(
            empty_listing_note(false),
            "Connect wallet to view your tokens."
        );
    }
}
