pub mod blockchain;
pub mod logger;

mod error;
mod network;
mod token;

pub use error::{Error, SwitchError};
pub use network::{ChainId, Network, NetworkDescriptor, NetworkEntry, NetworkRegistry};
pub use token::{
    format_supply, parse_supply, CreateTokenForm, FactoryStats, TokenRecord, ValidatedForm,
};
