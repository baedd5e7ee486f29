//! Funding and dust-registration protocols built on top of the wallet
//! engine's staged transaction operations.

pub mod dust;
pub mod funding;

pub use dust::{DustRegistrationOutcome, register_dust_generation};
pub use funding::{fund_from_genesis, funding_outputs};
