//! The networks on which the token factory can be reached.

use ethers::types::{Address, TxHash};
use ethers::utils::to_checksum;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::blockchain;
use crate::error::Error;

/// An EIP-155 chain id. Displays as the `0x`-prefixed hexadecimal string that
/// wallets exchange, but parses from both hexadecimal and decimal forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChainId(pub u64);

impl Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> ChainId {
        ChainId(id)
    }
}

impl FromStr for ChainId {
    type Err = Error;

    fn from_str(s: &str) -> Result<ChainId, Error> {
        let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u64::from_str_radix(hex, 16)
        } else {
            s.parse::<u64>()
        };

        parsed.map(ChainId).map_err(|err| Error::InvalidField {
            field: "chain id",
            reason: err.to_string(),
        })
    }
}

/// The Base networks the factory ships on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Sepolia,
    Mainnet,
}

impl Network {
    pub const ALL: [Network; 2] = [Network::Sepolia, Network::Mainnet];

    pub fn chain_id(self) -> ChainId {
        match self {
            Network::Sepolia => ChainId(blockchain::SEPOLIA_CHAIN_ID),
            Network::Mainnet => ChainId(blockchain::MAINNET_CHAIN_ID),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Network::Sepolia => "sepolia",
            Network::Mainnet => "mainnet",
        }
    }

    /// The supported network with this chain id, if any.
    pub fn by_chain_id(chain_id: ChainId) -> Option<Network> {
        Network::ALL
            .into_iter()
            .find(|network| network.chain_id() == chain_id)
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Network, Error> {
        match s.to_lowercase().as_str() {
            "sepolia" | "base-sepolia" | "test" | "testnet" => Ok(Network::Sepolia),
            "mainnet" | "base" | "base-mainnet" | "production" => Ok(Network::Mainnet),
            _ => Err(Error::InvalidField {
                field: "network",
                reason: format!("unknown network {s:?}; expected \"sepolia\" or \"mainnet\""),
            }),
        }
    }
}

impl Serialize for Network {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Network, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(D::Error::custom)
    }
}

/// Everything a wallet needs to know to register and use a network, plus the
/// block explorer the CLI links to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDescriptor {
    pub chain_id: ChainId,
    pub display_name: String,
    pub rpc_endpoint: String,
    pub explorer_endpoint: String,
    pub currency_symbol: String,
}

impl NetworkDescriptor {
    /// The explorer page for an address on this network.
    pub fn address_url(&self, address: Address) -> String {
        format!(
            "{}/address/{}",
            self.explorer_endpoint,
            to_checksum(&address, None)
        )
    }

    /// The explorer page for a transaction on this network.
    pub fn transaction_url(&self, tx_hash: TxHash) -> String {
        format!("{}/tx/{:?}", self.explorer_endpoint, tx_hash)
    }
}

/// A supported network together with the factory deployment on it, if any.
#[derive(Debug, Clone)]
pub struct NetworkEntry {
    pub network: Network,
    pub descriptor: NetworkDescriptor,
    pub factory_address: Option<Address>,
}

/// The set of networks this build knows how to talk to.
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    entries: Vec<NetworkEntry>,
}

impl NetworkRegistry {
    pub fn with_defaults() -> NetworkRegistry {
        NetworkRegistry {
            entries: vec![
                NetworkEntry {
                    network: Network::Sepolia,
                    descriptor: NetworkDescriptor {
                        chain_id: Network::Sepolia.chain_id(),
                        display_name: "Base Sepolia".to_owned(),
                        rpc_endpoint: blockchain::SEPOLIA_RPC_ENDPOINT.to_owned(),
                        explorer_endpoint: blockchain::SEPOLIA_EXPLORER_ENDPOINT.to_owned(),
                        currency_symbol: blockchain::TOKEN_NAME.to_owned(),
                    },
                    factory_address: Some(
                        blockchain::SEPOLIA_FACTORY_ADDRESS
                            .parse()
                            .expect("factory address constant is valid"),
                    ),
                },
                NetworkEntry {
                    network: Network::Mainnet,
                    descriptor: NetworkDescriptor {
                        chain_id: Network::Mainnet.chain_id(),
                        display_name: "Base Mainnet".to_owned(),
                        rpc_endpoint: blockchain::MAINNET_RPC_ENDPOINT.to_owned(),
                        explorer_endpoint: blockchain::MAINNET_EXPLORER_ENDPOINT.to_owned(),
                        currency_symbol: blockchain::TOKEN_NAME.to_owned(),
                    },
                    // No factory deployed on mainnet yet.
                    factory_address: None,
                },
            ],
        }
    }

    pub fn get(&self, network: Network) -> &NetworkEntry {
        self.entries
            .iter()
            .find(|entry| entry.network == network)
            .expect("all supported networks are registered")
    }

    pub fn by_chain_id(&self, chain_id: ChainId) -> Option<&NetworkEntry> {
        self.entries
            .iter()
            .find(|entry| entry.descriptor.chain_id == chain_id)
    }

    /// A name for the chain, suitable for messages. Falls back to a placeholder
    /// for chains outside the registry.
    pub fn display_name_for(&self, chain_id: ChainId) -> String {
        match self.by_chain_id(chain_id) {
            Some(entry) => entry.descriptor.display_name.clone(),
            None => format!("Unknown Network ({chain_id})"),
        }
    }

    pub fn set_rpc_endpoint(&mut self, network: Network, rpc_endpoint: String) {
        self.entry_mut(network).descriptor.rpc_endpoint = rpc_endpoint;
    }

    pub fn set_factory_address(&mut self, network: Network, factory_address: Address) {
        self.entry_mut(network).factory_address = Some(factory_address);
    }

    pub fn entries(&self) -> impl Iterator<Item = &NetworkEntry> {
        self.entries.iter()
    }

    fn entry_mut(&mut self, network: Network) -> &mut NetworkEntry {
        self.entries
            .iter_mut()
            .find(|entry| entry.network == network)
            .expect("all supported networks are registered")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn chain_ids_round_trip_through_hex() {
        assert_eq!(ChainId(84532).to_string(), "0x14a34");
        assert_eq!("0x14a34".parse::<ChainId>().unwrap(), ChainId(84532));
        assert_eq!(ChainId(8453).to_string(), "0x2105");
        assert_eq!("0x2105".parse::<ChainId>().unwrap(), ChainId(8453));
        assert_eq!("84532".parse::<ChainId>().unwrap(), ChainId(84532));
        assert!("henlo".parse::<ChainId>().is_err());
    }

    #[test]
    fn network_names_and_aliases() {
        assert_eq!("sepolia".parse::<Network>().unwrap(), Network::Sepolia);
        assert_eq!("base-sepolia".parse::<Network>().unwrap(), Network::Sepolia);
        assert_eq!("testnet".parse::<Network>().unwrap(), Network::Sepolia);
        assert_eq!("Mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("base".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("production".parse::<Network>().unwrap(), Network::Mainnet);
        assert!("goerli".parse::<Network>().is_err());
    }

    #[test]
    fn the_default_registry_covers_both_networks() {
        let registry = NetworkRegistry::with_defaults();

        let sepolia = registry.get(Network::Sepolia);
        assert_eq!(sepolia.descriptor.chain_id, ChainId(84532));
        assert_eq!(sepolia.descriptor.rpc_endpoint, "https://sepolia.base.org");
        assert!(sepolia.factory_address.is_some());

        let mainnet = registry.get(Network::Mainnet);
        assert_eq!(mainnet.descriptor.chain_id, ChainId(8453));
        assert!(mainnet.factory_address.is_none());

        assert_eq!(
            registry.by_chain_id(ChainId(84532)).unwrap().network,
            Network::Sepolia
        );
        assert!(registry.by_chain_id(ChainId(1)).is_none());
    }

    #[test]
    fn overrides_change_the_registry() {
        let mut registry = NetworkRegistry::with_defaults();
        registry.set_rpc_endpoint(Network::Sepolia, "http://localhost:8545".to_owned());
        registry.set_factory_address(Network::Mainnet, Address::from_low_u64_be(0xfac));

        assert_eq!(
            registry.get(Network::Sepolia).descriptor.rpc_endpoint,
            "http://localhost:8545"
        );
        assert!(registry.get(Network::Mainnet).factory_address.is_some());
    }

    #[test]
    fn explorer_urls_point_at_the_right_pages() {
        let registry = NetworkRegistry::with_defaults();
        let descriptor = &registry.get(Network::Sepolia).descriptor;

        assert_eq!(
            descriptor.address_url(Address::from_low_u64_be(0xaa)),
            "https://sepolia.basescan.org/address/0x00000000000000000000000000000000000000AA"
        );
        assert_eq!(
            descriptor.transaction_url(TxHash::from_low_u64_be(1)),
            "https://sepolia.basescan.org/tx/\
             0x0000000000000000000000000000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn unknown_chains_get_a_placeholder_name() {
        let registry = NetworkRegistry::with_defaults();

        assert_eq!(registry.display_name_for(ChainId(8453)), "Base Mainnet");
        assert_eq!(
            registry.display_name_for(ChainId(1337)),
            "Unknown Network (0x539)"
        );
    }
}
