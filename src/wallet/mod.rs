//! Wallet-side orchestration building blocks: the bundle factory that turns a
//! seed into an opened composite wallet, and sync barriers over the wallet
//! state stream.

pub mod barrier;
pub mod bundle;

pub use barrier::{BarrierError, wait_until, wait_until_within};
pub use bundle::{WalletBundle, init_wallet_with_seed};
