use thiserror::Error as ThisError;

use crate::network::ChainId;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("{0}")]
    Message(String),
    #[error("no wallet key is available (set BASEMINT_PRIVATE_KEY or run interactively)")]
    WalletUnavailable,
    #[error("user declined the wallet request")]
    UserRejected,
    #[error("no factory is deployed on {0}; switch to Base Sepolia or Base Mainnet")]
    UnsupportedNetwork(String),
    #[error("could not switch to {network}: {reason}")]
    NetworkSwitchFailed { network: String, reason: String },
    #[error("no wallet session; connect first")]
    NotConnected,
    #[error("the wallet refused to submit the transaction: {0}")]
    SubmissionRejected(String),
    #[error("the chain rejected the transaction: {0}")]
    ChainRejected(String),
    #[error("failed to read from the factory: {0}")]
    ReadFailed(String),
    #[error("initial supply {initial} exceeds max supply {max}")]
    SupplyExceedsMax { initial: String, max: String },
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("another create transaction is still in flight")]
    WriteInFlight,
}

impl From<String> for Error {
    fn from(e: String) -> Error {
        Error::Message(e)
    }
}

impl From<&'static str> for Error {
    fn from(e: &'static str) -> Error {
        Error::Message(e.to_string())
    }
}

/// The outcome of asking a wallet to switch chains.
#[derive(Debug, ThisError)]
pub enum SwitchError {
    /// The wallet has no record of the chain. Callers may register it with
    /// `add_chain` and try the switch again, once.
    #[error("the wallet does not recognize chain {0}")]
    UnrecognizedChain(ChainId),
    #[error("{0}")]
    Failed(String),
}
