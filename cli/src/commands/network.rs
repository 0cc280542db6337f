//! Commands for listing and switching networks.

use ethers::utils::to_checksum;
use tabled::Tabled;

use basemint_common::Network;

use crate::factory_dapp::FactoryDapp;
use crate::util::MARKER;
use crate::Manifest;

use super::show_table;

pub async fn ls() -> Result<(), anyhow::Error> {
    let manifest = Manifest::find()?;
    let registry = manifest.registry()?;

    #[derive(Tabled)]
    struct Row {
        network: String,
        chain_id: String,
        rpc_endpoint: String,
        explorer: String,
        factory: String,
    }

    show_table(registry.entries().map(|entry| Row {
        network: if entry.network == manifest.network.active {
            format!("{} (active)", entry.network)
        } else {
            entry.network.to_string()
        },
        chain_id: entry.descriptor.chain_id.to_string(),
        rpc_endpoint: entry.descriptor.rpc_endpoint.clone(),
        explorer: entry.descriptor.explorer_endpoint.clone(),
        factory: entry
            .factory_address
            .map(|address| to_checksum(&address, None))
            .unwrap_or_else(|| "(not deployed)".to_owned()),
    }));

    Ok(())
}

pub async fn switch(network: Network) -> Result<(), anyhow::Error> {
    let dapp = FactoryDapp::load()?;
    dapp.session().connect().await?;
    let snapshot = dapp.session().switch_network(network).await?;

    println!(
        "{MARKER} Now on {}.",
        snapshot.network_name.as_deref().unwrap_or("the new network")
    );

    if snapshot.read_only {
        println!("NOTE: no factory is deployed on this network; the session is read-only.");
    }

    Ok(())
}
