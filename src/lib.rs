//! Funding and dust-registration orchestration for the Midnight local
//! development network ("undeployed").
//!
//! The crate derives wallets deterministically from a mnemonic, funds them
//! from the fixed genesis wallet, and optionally registers their unshielded
//! coins for dust generation. The wallet engine itself is a collaborator
//! behind the [`engine::WalletFacade`] trait; [`engine::local`] provides the
//! in-process engine used for local-network runs and tests.

pub mod address;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod input;
pub mod logging;
pub mod protocol;
pub mod utils;
pub mod wallet;

pub use config::{FundingConfig, NetworkConfig};
pub use driver::Orchestrator;
pub use error::FaucetError;
pub use input::ReceiverInput;
