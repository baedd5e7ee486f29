//! Network configuration and orchestration constants.
//!
//! Endpoint ports come from the environment with fixed well-known defaults;
//! they select the configuration handed to the wallet bundle factory but
//! never affect protocol logic. The orchestration constants (genesis seed,
//! transfer amount, transaction TTLs) are injected into the driver through
//! [`FundingConfig`] so tests can override them.

use crate::address::NetworkId;
use chrono::Duration;

pub const DEFAULT_INDEXER_PORT: u16 = 8088;
pub const DEFAULT_NODE_PORT: u16 = 9944;
pub const DEFAULT_PROOF_SERVER_PORT: u16 = 6300;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Seed of the pre-funded genesis wallet. Constant and public; the local
/// network resets it on every run.
pub const GENESIS_WALLET_SEED: [u8; 32] = {
	let mut seed = [0u8; 32];
	seed[31] = 0x01;
	seed
};

/// Amount transferred to each funded receiver, in raw token units.
pub const TRANSFER_AMOUNT: u128 = 31_337_000_000;

/// Fee computation parameters forwarded to the wallet engine.
#[derive(Debug, Clone, Copy)]
pub struct CostParameters {
	pub additional_fee_overhead: u128,
	pub fee_blocks_margin: u32,
}

impl Default for CostParameters {
	fn default() -> Self {
		Self {
			additional_fee_overhead: 300_000_000_000_000_000,
			fee_blocks_margin: 5,
		}
	}
}

/// Fixed network configuration for one orchestration run.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
	pub network_id: NetworkId,
	pub cost_parameters: CostParameters,
	pub relay_url: String,
	pub proving_server_url: String,
	pub indexer_http_url: String,
	pub indexer_ws_url: String,
}

impl NetworkConfig {
	/// Local "undeployed" network configuration with explicit ports.
	pub fn undeployed(indexer_port: u16, node_port: u16, proof_server_port: u16) -> Self {
		Self {
			network_id: NetworkId::Undeployed,
			cost_parameters: CostParameters::default(),
			relay_url: format!("ws://localhost:{node_port}"),
			proving_server_url: format!("http://localhost:{proof_server_port}"),
			indexer_http_url: format!("http://localhost:{indexer_port}/api/v3/graphql"),
			indexer_ws_url: format!("ws://localhost:{indexer_port}/api/v3/graphql/ws"),
		}
	}

	/// Read endpoint ports from the environment, falling back to the
	/// well-known defaults when unset or unparsable.
	pub fn from_env() -> Self {
		Self::undeployed(
			port_from_env("INDEXER_PORT", DEFAULT_INDEXER_PORT),
			port_from_env("NODE_PORT", DEFAULT_NODE_PORT),
			port_from_env("PROOF_SERVER_PORT", DEFAULT_PROOF_SERVER_PORT),
		)
	}
}

impl Default for NetworkConfig {
	fn default() -> Self {
		Self::undeployed(
			DEFAULT_INDEXER_PORT,
			DEFAULT_NODE_PORT,
			DEFAULT_PROOF_SERVER_PORT,
		)
	}
}

fn port_from_env(var: &str, default: u16) -> u16 {
	std::env::var(var)
		.ok()
		.and_then(|v| v.parse().ok())
		.unwrap_or(default)
}

/// Orchestration constants injected into the driver.
#[derive(Debug, Clone)]
pub struct FundingConfig {
	/// Seed the genesis sender bundle is derived from.
	pub genesis_seed: [u8; 32],
	/// Amount of each transfer output built for a receiver.
	pub transfer_amount: u128,
	/// Validity window of a funding transaction.
	pub funding_ttl: Duration,
	/// Validity window of a dust-generation transaction.
	pub dust_ttl: Duration,
	/// Optional deadline layered over every sync-barrier wait. `None`
	/// preserves the engine contract of blocking until the condition holds.
	pub barrier_deadline: Option<std::time::Duration>,
}

impl Default for FundingConfig {
	fn default() -> Self {
		Self {
			genesis_seed: GENESIS_WALLET_SEED,
			transfer_amount: TRANSFER_AMOUNT,
			funding_ttl: Duration::minutes(30),
			dust_ttl: Duration::minutes(10),
			barrier_deadline: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn genesis_seed_is_one() {
		assert_eq!(GENESIS_WALLET_SEED[31], 1);
		assert!(GENESIS_WALLET_SEED[..31].iter().all(|b| *b == 0));
		assert_eq!(
			hex::encode(GENESIS_WALLET_SEED),
			"0000000000000000000000000000000000000000000000000000000000000001"
		);
	}

	#[test]
	fn default_endpoints_use_well_known_ports() {
		let config = NetworkConfig::default();
		assert_eq!(config.network_id, NetworkId::Undeployed);
		assert_eq!(config.relay_url, "ws://localhost:9944");
		assert_eq!(config.proving_server_url, "http://localhost:6300");
		assert_eq!(
			config.indexer_http_url,
			"http://localhost:8088/api/v3/graphql"
		);
	}

	#[test]
	fn funding_config_defaults_match_protocol_constants() {
		let config = FundingConfig::default();
		assert_eq!(config.transfer_amount, 31_337_000_000);
		assert_eq!(config.funding_ttl, Duration::minutes(30));
		assert_eq!(config.dust_ttl, Duration::minutes(10));
		assert!(config.barrier_deadline.is_none());
	}
}
