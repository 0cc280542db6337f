use ethers::types::Address;
use std::sync::OnceLock;
use structopt::StructOpt;

use basemint_common::{CreateTokenForm, Network};

use crate::commands;

static CLI: OnceLock<Cli> = OnceLock::new();

pub fn init_cli() -> Result<(), anyhow::Error> {
    CLI.set(Cli::from_args())
        .map_err(|_| anyhow::anyhow!("cli initialized twice"))?;

    Ok(())
}

pub fn cli<'a>() -> &'a Cli {
    CLI.get().expect("cli not initialized")
}

#[derive(Clone, Debug, StructOpt)]
pub struct Cli {
    /// Prints detailed information on what the CLI is doing.
    #[structopt(long, short)]
    pub verbose: bool,
    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, StructOpt)]
pub enum Command {
    /// Starts a new Basemint project in this folder.
    Init,
    /// Connects the wallet and shows the current session.
    Status,
    /// Shows the global counters of the token factory.
    Stats,
    /// Follows the wallet session, reacting to account and network changes.
    Watch,
    /// Commands for managing networks.
    Network {
        #[structopt(subcommand)]
        command: NetworkCommand,
    },
    /// Commands for managing tokens.
    Token {
        #[structopt(subcommand)]
        command: TokenCommand,
    },
}

impl Command {
    pub async fn execute(self) -> Result<(), anyhow::Error> {
        match self {
            Command::Init => commands::init().await,
            Command::Status => commands::status().await,
            Command::Stats => commands::stats().await,
            Command::Watch => commands::watch().await,
            Command::Network { command } => command.execute().await,
            Command::Token { command } => command.execute().await,
        }
    }
}

#[derive(Clone, Debug, StructOpt)]
pub enum NetworkCommand {
    /// Lists the supported networks.
    Ls,
    /// Asks the wallet to move to another network.
    Switch { network: Network },
}

impl NetworkCommand {
    async fn execute(self) -> Result<(), anyhow::Error> {
        match self {
            NetworkCommand::Ls => commands::network::ls().await,
            NetworkCommand::Switch { network } => commands::network::switch(network).await,
        }
    }
}

#[derive(Clone, Debug, StructOpt)]
pub enum TokenCommand {
    /// Creates a new token through the factory.
    Create {
        /// The display name of the new token.
        #[structopt(long)]
        name: String,
        /// The ticker symbol of the new token. Uppercased before use.
        #[structopt(long)]
        symbol: String,
        /// How many decimals the new token has.
        #[structopt(long, default_value = "18")]
        decimals: u8,
        /// How many tokens to mint on creation, in display units.
        #[structopt(long)]
        initial_supply: String,
        /// The supply cap, in display units.
        #[structopt(long)]
        max_supply: String,
        /// Skips the confirmation prompt.
        #[structopt(long)]
        yes: bool,
        /// Returns right after submission, without waiting for the transaction
        /// to be mined.
        #[structopt(long)]
        no_wait: bool,
    },
    /// Lists the tokens created by the connected account.
    Ls,
    /// Opens a token in the block explorer.
    Open { token: Address },
}

impl TokenCommand {
    async fn execute(self) -> Result<(), anyhow::Error> {
        match self {
            TokenCommand::Create {
                name,
                symbol,
                decimals,
                initial_supply,
                max_supply,
                yes,
                no_wait,
            } => {
                let form = CreateTokenForm {
                    name,
                    symbol,
                    decimals,
                    initial_supply,
                    max_supply,
                };
                commands::token::create(form, yes, no_wait).await
            }
            TokenCommand::Ls => commands::token::ls().await,
            TokenCommand::Open { token } => commands::token::open(token).await,
        }
    }
}
