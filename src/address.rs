//! Network-scoped bech32m address encoding.
//!
//! Every address is scoped to a network through its human-readable part:
//! `mn_addr_undeployed1…` for unshielded, `mn_shield-addr_undeployed1…` for
//! shielded, `mn_dust-addr_undeployed1…` for dust receivers. Inputs scoped to
//! any other network must be rejected by the caller.

use bech32::{Bech32m, Hrp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base HRP of a shielded address, before the network suffix.
pub const SHIELDED_HRP_BASE: &str = "mn_shield-addr";
/// Base HRP of an unshielded address, before the network suffix.
pub const UNSHIELDED_HRP_BASE: &str = "mn_addr";
/// Base HRP of a dust receiver address, before the network suffix.
pub const DUST_HRP_BASE: &str = "mn_dust-addr";
/// Base HRP of a shielded viewing key, before the network suffix.
pub const VIEWING_KEY_HRP_BASE: &str = "mn_shield-esk";

/// Midnight network identifier. Orchestration always runs against
/// [`NetworkId::Undeployed`]; the other variants exist so address encoding
/// stays honest about scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkId {
	MainNet,
	TestNet,
	DevNet,
	Undeployed,
}

impl NetworkId {
	/// HRP suffix appended to the address base for this network.
	pub fn hrp_suffix(&self) -> &'static str {
		match self {
			NetworkId::MainNet => "",
			NetworkId::TestNet => "_test",
			NetworkId::DevNet => "_dev",
			NetworkId::Undeployed => "_undeployed",
		}
	}

	/// Network token as it appears inside an HRP, e.g. `undeployed`.
	pub fn token(&self) -> &'static str {
		match self {
			NetworkId::MainNet => "mainnet",
			NetworkId::TestNet => "test",
			NetworkId::DevNet => "dev",
			NetworkId::Undeployed => "undeployed",
		}
	}
}

impl std::fmt::Display for NetworkId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.token())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
	#[error("invalid address HRP: {0}")]
	InvalidHrp(String),

	#[error("bech32m encoding failed: {0}")]
	Encode(String),
}

/// Full HRP for a shielded address on `network`.
pub fn shielded_hrp(network: NetworkId) -> String {
	format!("{SHIELDED_HRP_BASE}{}", network.hrp_suffix())
}

/// Full HRP for an unshielded address on `network`.
pub fn unshielded_hrp(network: NetworkId) -> String {
	format!("{UNSHIELDED_HRP_BASE}{}", network.hrp_suffix())
}

/// Full HRP for a dust receiver address on `network`.
pub fn dust_hrp(network: NetworkId) -> String {
	format!("{DUST_HRP_BASE}{}", network.hrp_suffix())
}

fn encode(hrp: &str, data: &[u8]) -> Result<String, AddressError> {
	let hrp = Hrp::parse(hrp).map_err(|e| AddressError::InvalidHrp(e.to_string()))?;
	bech32::encode::<Bech32m>(hrp, data).map_err(|e| AddressError::Encode(e.to_string()))
}

/// Encode a raw shielded address for `network`.
pub fn encode_shielded_address(network: NetworkId, data: &[u8]) -> Result<String, AddressError> {
	encode(&shielded_hrp(network), data)
}

/// Encode an unshielded public key as an address for `network`.
pub fn encode_unshielded_address(network: NetworkId, data: &[u8]) -> Result<String, AddressError> {
	encode(&unshielded_hrp(network), data)
}

/// Encode a dust public key as a dust receiver address for `network`.
pub fn encode_dust_address(network: NetworkId, data: &[u8]) -> Result<String, AddressError> {
	encode(&dust_hrp(network), data)
}

/// Encode a shielded viewing key for `network`.
pub fn encode_viewing_key(network: NetworkId, data: &[u8]) -> Result<String, AddressError> {
	encode(
		&format!("{VIEWING_KEY_HRP_BASE}{}", network.hrp_suffix()),
		data,
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn undeployed_addresses_carry_the_expected_prefixes() {
		let data = [7u8; 32];
		let shielded = encode_shielded_address(NetworkId::Undeployed, &data).unwrap();
		let unshielded = encode_unshielded_address(NetworkId::Undeployed, &data).unwrap();
		let dust = encode_dust_address(NetworkId::Undeployed, &data).unwrap();

		assert!(shielded.starts_with("mn_shield-addr_undeployed1"));
		assert!(unshielded.starts_with("mn_addr_undeployed1"));
		assert!(dust.starts_with("mn_dust-addr_undeployed1"));
	}

	#[test]
	fn mainnet_has_no_network_suffix() {
		let addr = encode_unshielded_address(NetworkId::MainNet, &[1u8; 32]).unwrap();
		assert!(addr.starts_with("mn_addr1"));
	}

	#[test]
	fn encoding_is_deterministic_and_checksummed() {
		let data = [42u8; 32];
		let a = encode_unshielded_address(NetworkId::Undeployed, &data).unwrap();
		let b = encode_unshielded_address(NetworkId::Undeployed, &data).unwrap();
		assert_eq!(a, b);

		let (hrp, decoded) = bech32::decode(&a).unwrap();
		assert_eq!(hrp.as_str(), "mn_addr_undeployed");
		assert_eq!(decoded, data);
	}
}
