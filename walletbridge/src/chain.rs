//! Chain primitives.
//!
//! - [`ChainId`] - A numeric EIP-155 chain ID (e.g., `8453` for Base)
//! - [`ChainDescriptor`] - Display and connectivity data for one chain
//! - [`ChainRegistry`] - Ordered set of descriptors; the first entry is the default chain

use serde::{Deserialize, Serialize};
use url::Url;

use crate::networks;

/// An EIP-155 chain ID (e.g., 8453 for Base, 137 for Polygon).
pub type ChainId = u64;

/// Native currency of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Currency name (e.g., `"Ether"`).
    pub name: String,
    /// Ticker symbol (e.g., `"ETH"`).
    pub symbol: String,
    /// Number of decimals of the smallest unit.
    pub decimals: u8,
}

impl NativeCurrency {
    /// Creates a native currency description.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
        }
    }

    /// 18-decimal Ether, shared by most rollups.
    #[must_use]
    pub fn ether() -> Self {
        Self::new("Ether", "ETH", 18)
    }
}

/// Read-only description of a supported chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    /// EIP-155 chain ID.
    pub id: ChainId,
    /// Human-readable chain name.
    pub name: String,
    /// Native gas currency.
    pub native_currency: NativeCurrency,
    /// Default block explorer, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<Url>,
    /// Default HTTP JSON-RPC endpoint, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<Url>,
}

impl ChainDescriptor {
    /// Creates a descriptor without explorer or RPC endpoints.
    pub fn new(id: ChainId, name: impl Into<String>, native_currency: NativeCurrency) -> Self {
        Self {
            id,
            name: name.into(),
            native_currency,
            explorer_url: None,
            rpc_url: None,
        }
    }

    /// Sets the block explorer URL.
    #[must_use]
    pub fn with_explorer_url(mut self, url: Url) -> Self {
        self.explorer_url = Some(url);
        self
    }

    /// Sets the JSON-RPC endpoint.
    #[must_use]
    pub fn with_rpc_url(mut self, url: Url) -> Self {
        self.rpc_url = Some(url);
        self
    }
}

/// Ordered registry of supported chains.
///
/// Order matters: the first descriptor is the default chain used when a
/// connection has no chain selected yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ChainDescriptor>")]
pub struct ChainRegistry(Vec<ChainDescriptor>);

impl ChainRegistry {
    /// Creates a registry from descriptors, keeping their order.
    ///
    /// Later duplicates of an already registered chain ID are ignored.
    #[must_use]
    pub fn new(chains: Vec<ChainDescriptor>) -> Self {
        let mut unique: Vec<ChainDescriptor> = Vec::with_capacity(chains.len());
        for chain in chains {
            if !unique.iter().any(|c| c.id == chain.id) {
                unique.push(chain);
            }
        }
        Self(unique)
    }

    /// Looks up a chain by ID.
    #[must_use]
    pub fn by_id(&self, chain_id: ChainId) -> Option<&ChainDescriptor> {
        self.0.iter().find(|c| c.id == chain_id)
    }

    /// Returns `true` if the chain is registered.
    #[must_use]
    pub fn contains(&self, chain_id: ChainId) -> bool {
        self.by_id(chain_id).is_some()
    }

    /// Returns the default (first) chain.
    #[must_use]
    pub fn default_chain(&self) -> Option<&ChainDescriptor> {
        self.0.first()
    }

    /// Iterates over the registered chains in order.
    pub fn iter(&self) -> impl Iterator<Item = &ChainDescriptor> {
        self.0.iter()
    }

    /// Returns the registered chain IDs in order.
    #[must_use]
    pub fn ids(&self) -> Vec<ChainId> {
        self.0.iter().map(|c| c.id).collect()
    }

    /// Number of registered chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no chain is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overrides the RPC endpoint of a registered chain.
    ///
    /// Unknown chain IDs are left untouched.
    #[must_use]
    pub fn with_rpc_url(mut self, chain_id: ChainId, url: Url) -> Self {
        if let Some(chain) = self.0.iter_mut().find(|c| c.id == chain_id) {
            chain.rpc_url = Some(url);
        }
        self
    }

    /// Returns the descriptors as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[ChainDescriptor] {
        &self.0
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        networks::supported_chains()
    }
}

impl From<Vec<ChainDescriptor>> for ChainRegistry {
    fn from(chains: Vec<ChainDescriptor>) -> Self {
        Self::new(chains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(id: ChainId, name: &str) -> ChainDescriptor {
        ChainDescriptor::new(id, name, NativeCurrency::ether())
    }

    #[test]
    fn test_registry_keeps_order_and_default() {
        let registry = ChainRegistry::new(vec![chain(10, "OP"), chain(1, "Ethereum")]);
        assert_eq!(registry.ids(), vec![10, 1]);
        assert_eq!(registry.default_chain().map(|c| c.id), Some(10));
    }

    #[test]
    fn test_registry_ignores_duplicate_ids() {
        let registry = ChainRegistry::new(vec![chain(1, "first"), chain(1, "second")]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.by_id(1).map(|c| c.name.as_str()), Some("first"));
    }

    #[test]
    fn test_registry_deserialize_drops_duplicates() {
        let json = serde_json::json!([
            { "id": 1, "name": "first", "nativeCurrency": { "name": "Ether", "symbol": "ETH", "decimals": 18 } },
            { "id": 1, "name": "second", "nativeCurrency": { "name": "Ether", "symbol": "ETH", "decimals": 18 } }
        ]);
        let registry: ChainRegistry = serde_json::from_value(json).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.by_id(1).map(|c| c.name.as_str()), Some("first"));
        assert_eq!(serde_json::to_value(&registry).unwrap().as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_registry_rpc_override() {
        let url: Url = "http://localhost:8545".parse().unwrap();
        let registry = ChainRegistry::new(vec![chain(1, "Ethereum")])
            .with_rpc_url(1, url.clone())
            .with_rpc_url(999, "http://ignored".parse().unwrap());
        assert_eq!(registry.by_id(1).unwrap().rpc_url.as_ref(), Some(&url));
        assert!(!registry.contains(999));
    }

    #[test]
    fn test_descriptor_serializes_camel_case() {
        let descriptor = chain(8453, "Base")
            .with_explorer_url("https://basescan.org".parse().unwrap());
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["id"], 8453);
        assert_eq!(json["nativeCurrency"]["symbol"], "ETH");
        assert_eq!(json["explorerUrl"], "https://basescan.org/");
        assert!(json.get("rpcUrl").is_none());
    }

    #[test]
    fn test_empty_registry_has_no_default() {
        let registry = ChainRegistry::new(vec![]);
        assert!(registry.is_empty());
        assert!(registry.default_chain().is_none());
    }
}
