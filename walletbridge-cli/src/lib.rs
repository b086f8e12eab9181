//! Library half of the `walletbridge` binary: configuration loading and
//! backend composition.

pub mod backend;
pub mod config;
