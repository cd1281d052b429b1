//! Location provider adapters.
//!
//! Platforms compose a [`LocationStrategyChain`] from their own strategies;
//! the CLI and desktop hosts use a [`StaticLocationProvider`].

mod chain;
mod fixed;

pub use chain::LocationStrategyChain;
pub use fixed::StaticLocationProvider;
