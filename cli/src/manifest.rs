//! The `Basemint.toml` manifest format.
//!
//! The manifest is the wallet's memory: it records which network is currently
//! active and which networks the wallet knows an RPC endpoint for. Private keys
//! are never stored here; they come from `BASEMINT_PRIVATE_KEY` or from an
//! interactive prompt.

use askama::Template;
use serde_derive::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{fs, io};

use basemint_common::{blockchain, Error, Network, NetworkRegistry};

/// Template for generating new Basemint.toml files.
#[derive(askama::Template)]
#[template(path = "Basemint.toml.txt")]
pub struct ManifestTemplate<'a> {
    /// The network new projects start on.
    pub active: &'a str,
    /// Default RPC endpoint for Base Sepolia.
    pub sepolia_endpoint: &'a str,
    /// The factory deployment on Base Sepolia.
    pub sepolia_factory: &'a str,
    /// Default RPC endpoint for Base Mainnet, left commented out.
    pub mainnet_endpoint: &'a str,
}

/// Configuration for a Basemint project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Manifest {
    /// Where this manifest was loaded from.
    #[serde(skip)]
    path: PathBuf,
    /// The active-network pointer.
    pub network: NetworkSection,
    /// Per-network settings.
    #[serde(default)]
    pub networks: Networks,
}

/// The active-network pointer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkSection {
    /// The network the wallet is currently on.
    pub active: Network,
}

/// Per-network settings, keyed by network name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Networks {
    #[serde(default)]
    pub sepolia: NetworkOverride,
    #[serde(default)]
    pub mainnet: NetworkOverride,
}

/// Settings for a single network.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkOverride {
    /// The RPC endpoint the wallet uses to reach this network. A network
    /// without an endpoint is one the wallet does not know.
    pub rpc_endpoint: Option<String>,
    /// The address of the token factory on this network.
    pub factory_address: Option<String>,
}

impl Manifest {
    /// Possible filenames for the manifest, in order of preference.
    const FILENAME_HIERARCHY: [&'static str; 2] = ["./Basemint.toml", "./basemint.toml"];

    /// Attempts to find and load an existing manifest file in the current
    /// directory. Returns `None` if no manifest is found.
    pub fn find_opt() -> Result<Option<Manifest>, anyhow::Error> {
        for filename in Manifest::FILENAME_HIERARCHY {
            match fs::read_to_string(filename) {
                Ok(contents) => {
                    let mut manifest: Manifest = toml::from_str(&contents)?;
                    manifest.path = filename.into();
                    return Ok(Some(manifest));
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }

        Ok(None)
    }

    /// Finds and loads the manifest, failing if there is none.
    pub fn find() -> Result<Manifest, anyhow::Error> {
        Manifest::find_opt()?
            .ok_or_else(|| anyhow::anyhow!("`Basemint.toml` not found. Run `basemint init` first."))
    }

    /// Loads the manifest at a specific path.
    pub fn load(path: &Path) -> Result<Manifest, anyhow::Error> {
        let mut manifest: Manifest = toml::from_str(&fs::read_to_string(path)?)?;
        manifest.path = path.to_owned();

        Ok(manifest)
    }

    /// Creates a new manifest with the default networks.
    pub fn create() -> Result<Manifest, anyhow::Error> {
        if Manifest::find_opt()?.is_some() {
            anyhow::bail!("`Basemint.toml` already exists.");
        }

        let rendered = ManifestTemplate {
            active: Network::Sepolia.name(),
            sepolia_endpoint: blockchain::SEPOLIA_RPC_ENDPOINT,
            sepolia_factory: blockchain::SEPOLIA_FACTORY_ADDRESS,
            mainnet_endpoint: blockchain::MAINNET_RPC_ENDPOINT,
        }
        .render()
        .expect("can render");

        fs::write("./Basemint.toml", rendered)?;

        Manifest::load(Path::new("./Basemint.toml"))
    }

    /// Writes the manifest back to where it was loaded from.
    pub fn persist(&self) -> Result<(), anyhow::Error> {
        fs::write(&self.path, toml::to_string_pretty(self)?)?;

        Ok(())
    }

    /// Whether a path refers to a manifest file.
    pub fn is_manifest_path(path: &Path) -> bool {
        Manifest::FILENAME_HIERARCHY
            .iter()
            .any(|filename| path.ends_with(filename.trim_start_matches("./")))
    }

    /// The RPC endpoint the wallet knows for a network, if any.
    pub fn rpc_endpoint(&self, network: Network) -> Option<String> {
        self.overrides(network).rpc_endpoint.clone()
    }

    /// Records the RPC endpoint for a network.
    pub fn set_rpc_endpoint(&mut self, network: Network, rpc_endpoint: String) {
        self.overrides_mut(network).rpc_endpoint = Some(rpc_endpoint);
    }

    fn overrides(&self, network: Network) -> &NetworkOverride {
        match network {
            Network::Sepolia => &self.networks.sepolia,
            Network::Mainnet => &self.networks.mainnet,
        }
    }

    fn overrides_mut(&mut self, network: Network) -> &mut NetworkOverride {
        match network {
            Network::Sepolia => &mut self.networks.sepolia,
            Network::Mainnet => &mut self.networks.mainnet,
        }
    }

    /// Builds the network registry for this project: the compiled-in defaults
    /// overlaid with whatever the manifest sets.
    pub fn registry(&self) -> Result<NetworkRegistry, Error> {
        let mut registry = NetworkRegistry::with_defaults();

        for network in Network::ALL {
            let overrides = self.overrides(network);

            if let Some(rpc_endpoint) = &overrides.rpc_endpoint {
                registry.set_rpc_endpoint(network, rpc_endpoint.clone());
            }

            if let Some(factory_address) = &overrides.factory_address {
                let address = factory_address.parse().map_err(|err| Error::InvalidField {
                    field: "factory-address",
                    reason: format!("{err}"),
                })?;
                registry.set_factory_address(network, address);
            }
        }

        Ok(registry)
    }
}
