//! The static registry of supported EVM chains.
//!
//! Every backend exposes the same chain list to the widget client. Explorer
//! and RPC endpoints are the public defaults; deployments override RPC URLs
//! with [`ChainRegistry::with_rpc_url`].

use url::Url;

use crate::chain::{ChainDescriptor, ChainId, ChainRegistry, NativeCurrency};

/// Ethereum Mainnet chain ID.
pub const ETHEREUM_MAINNET: ChainId = 1;

/// Arbitrum One chain ID.
pub const ARBITRUM_ONE: ChainId = 42161;

/// Base Mainnet chain ID.
pub const BASE_MAINNET: ChainId = 8453;

/// OP Mainnet chain ID.
pub const OPTIMISM_MAINNET: ChainId = 10;

/// Polygon Mainnet chain ID.
pub const POLYGON_MAINNET: ChainId = 137;

/// BNB Smart Chain chain ID.
pub const BSC_MAINNET: ChainId = 56;

/// Avalanche C-Chain chain ID.
pub const AVALANCHE_MAINNET: ChainId = 43114;

/// Linea Mainnet chain ID.
pub const LINEA_MAINNET: ChainId = 59144;

/// Scroll Mainnet chain ID.
pub const SCROLL_MAINNET: ChainId = 534_352;

/// Scroll Sepolia (testnet) chain ID.
pub const SCROLL_SEPOLIA: ChainId = 534_351;

/// Returns the supported chains, Ethereum Mainnet first.
#[must_use]
pub fn supported_chains() -> ChainRegistry {
    ChainRegistry::new(vec![
        chain(
            ETHEREUM_MAINNET,
            "Ethereum",
            NativeCurrency::ether(),
            "https://etherscan.io",
            "https://eth.merkle.io",
        ),
        chain(
            ARBITRUM_ONE,
            "Arbitrum One",
            NativeCurrency::ether(),
            "https://arbiscan.io",
            "https://arb1.arbitrum.io/rpc",
        ),
        chain(
            BASE_MAINNET,
            "Base",
            NativeCurrency::ether(),
            "https://basescan.org",
            "https://mainnet.base.org",
        ),
        chain(
            OPTIMISM_MAINNET,
            "OP Mainnet",
            NativeCurrency::ether(),
            "https://optimistic.etherscan.io",
            "https://mainnet.optimism.io",
        ),
        chain(
            POLYGON_MAINNET,
            "Polygon",
            NativeCurrency::new("POL", "POL", 18),
            "https://polygonscan.com",
            "https://polygon-rpc.com",
        ),
        chain(
            BSC_MAINNET,
            "BNB Smart Chain",
            NativeCurrency::new("BNB", "BNB", 18),
            "https://bscscan.com",
            "https://bsc-dataseed1.bnbchain.org",
        ),
        chain(
            AVALANCHE_MAINNET,
            "Avalanche",
            NativeCurrency::new("Avalanche", "AVAX", 18),
            "https://snowtrace.io",
            "https://api.avax.network/ext/bc/C/rpc",
        ),
        chain(
            LINEA_MAINNET,
            "Linea Mainnet",
            NativeCurrency::new("Linea Ether", "ETH", 18),
            "https://lineascan.build",
            "https://rpc.linea.build",
        ),
        chain(
            SCROLL_MAINNET,
            "Scroll",
            NativeCurrency::ether(),
            "https://scrollscan.com",
            "https://rpc.scroll.io",
        ),
        chain(
            SCROLL_SEPOLIA,
            "Scroll Sepolia",
            NativeCurrency::ether(),
            "https://sepolia.scrollscan.com",
            "https://sepolia-rpc.scroll.io",
        ),
    ])
}

/// Returns the IDs of all supported chains.
#[must_use]
pub fn supported_chain_ids() -> Vec<ChainId> {
    supported_chains().ids()
}

fn chain(
    id: ChainId,
    name: &str,
    currency: NativeCurrency,
    explorer: &'static str,
    rpc: &'static str,
) -> ChainDescriptor {
    ChainDescriptor::new(id, name, currency)
        .with_explorer_url(static_url(explorer))
        .with_rpc_url(static_url(rpc))
}

fn static_url(url: &'static str) -> Url {
    Url::parse(url).expect("static chain URL is valid")
}
