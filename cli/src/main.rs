mod cli;
mod commands;
mod factory_dapp;
mod util;
mod manifest;

pub use manifest::Manifest;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    cli::init_cli()?;
    basemint_common::logger::init(cli::cli().verbose);

    tracing::debug!("Arguments from command line: {:#?}", cli::cli());

    cli::cli().command.clone().execute().await?;

    Ok(())
}
