use std::time::Duration;

pub const SEPOLIA_CHAIN_ID: u64 = 84532u64; // Base Sepolia
pub const SEPOLIA_RPC_ENDPOINT: &str = "https://sepolia.base.org";
pub const SEPOLIA_EXPLORER_ENDPOINT: &str = "https://sepolia.basescan.org";
pub const SEPOLIA_FACTORY_ADDRESS: &str = "0x7C0F5e0B4E2A63F3b1d9c8745a96d40e21c5A8D4";
pub const MAINNET_CHAIN_ID: u64 = 8453u64; // Base Mainnet
pub const MAINNET_RPC_ENDPOINT: &str = "https://mainnet.base.org";
pub const MAINNET_EXPLORER_ENDPOINT: &str = "https://basescan.org";
pub const TOKEN_NAME: &str = "ETH";
pub const THROTTLE_LIMIT: Duration = Duration::from_millis(1_000);
