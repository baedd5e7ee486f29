//! Orchestration driver tying input parsing, wallet bundles and the funding
//! and dust-registration protocols together.
//!
//! Every run follows the same shape: open wallets, run the protocol steps,
//! then stop every opened wallet. Cleanup runs unconditionally, whether the
//! run succeeded or failed at any step, and each wallet is stopped exactly
//! once.

use crate::address::{self, NetworkId};
use crate::config::FundingConfig;
use crate::engine::types::{TransactionId, UnshieldedState};
use crate::engine::{WalletFacade, WalletProvider};
use crate::error::FaucetError;
use crate::input::{self, ReceiverInput};
use crate::protocol::dust::{self, DustRegistrationOutcome};
use crate::protocol::funding;
use crate::wallet::{WalletBundle, barrier, bundle};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of one fund-and-register-dust run, as reported to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DustRunReport {
	pub funding_tx: String,
	pub registration: DustRegistrationOutcome,
}

/// One-shot orchestration runner bound to a wallet provider and network.
pub struct Orchestrator<'a> {
	provider: &'a dyn WalletProvider,
	network: NetworkId,
	config: FundingConfig,
}

impl<'a> Orchestrator<'a> {
	pub fn new(provider: &'a dyn WalletProvider, network: NetworkId, config: FundingConfig) -> Self {
		Self {
			provider,
			network,
			config,
		}
	}

	/// Fund the receiver from the genesis wallet.
	///
	/// A mnemonic receiver is funded at both its shielded and unshielded
	/// addresses; a bare address receives at that address only.
	pub async fn fund(&self, receiver: ReceiverInput) -> Result<TransactionId, FaucetError> {
		let mut opened = Vec::new();
		let result = self.fund_inner(receiver, &mut opened).await;
		stop_all(opened).await;
		result
	}

	async fn fund_inner(
		&self,
		receiver: ReceiverInput,
		opened: &mut Vec<Arc<dyn WalletFacade>>,
	) -> Result<TransactionId, FaucetError> {
		let genesis = self.open_genesis_wallet(opened).await?;

		let (shielded, unshielded) = match receiver {
			ReceiverInput::Mnemonic(phrase) => {
				let bundle = self.open_receiver_wallet(&phrase, opened).await?;
				let (shielded, unshielded) =
					resolve_receiver_addresses(&bundle, self.network, &self.config).await?;
				(Some(shielded), Some(unshielded))
			}
			ReceiverInput::ShieldedAddress(address) => (Some(address), None),
			ReceiverInput::UnshieldedAddress(address) => (None, Some(address)),
		};

		let outputs = funding::funding_outputs(
			self.config.transfer_amount,
			shielded.as_deref(),
			unshielded.as_deref(),
		);
		funding::fund_from_genesis(&genesis, outputs, &self.config).await
	}

	/// Fund the mnemonic's unshielded address, then register the funded coins
	/// for dust generation.
	pub async fn fund_and_register_dust(
		&self,
		mnemonic: &str,
	) -> Result<DustRunReport, FaucetError> {
		let mut opened = Vec::new();
		let result = self.fund_and_register_dust_inner(mnemonic, &mut opened).await;
		stop_all(opened).await;
		result
	}

	async fn fund_and_register_dust_inner(
		&self,
		mnemonic: &str,
		opened: &mut Vec<Arc<dyn WalletFacade>>,
	) -> Result<DustRunReport, FaucetError> {
		let phrase = input::parse_mnemonic(mnemonic)?;

		let receiver = self.open_receiver_wallet(&phrase, opened).await?;
		let genesis = self.open_genesis_wallet(opened).await?;
		let (_, unshielded) =
			resolve_receiver_addresses(&receiver, self.network, &self.config).await?;

		let outputs =
			funding::funding_outputs(self.config.transfer_amount, None, Some(&unshielded));
		let funding_tx = funding::fund_from_genesis(&genesis, outputs, &self.config).await?;

		// The registration input is the receiver's view of its own coins, so
		// wait for the funded coins to land in a snapshot first.
		let unshielded_state = wait_for_available_coins(&receiver, &self.config).await?;

		let dust_address = receiver.dust_secret_key.dust_address(self.network)?;
		let registration = dust::register_dust_generation(
			receiver.wallet.as_ref(),
			&unshielded_state,
			&dust_address,
			&receiver.unshielded_keystore.public_key(),
			&|payload| receiver.unshielded_keystore.sign_data(payload),
			&self.config,
		)
		.await?;

		Ok(DustRunReport {
			funding_tx: funding_tx.to_string(),
			registration,
		})
	}

	async fn open_genesis_wallet(
		&self,
		opened: &mut Vec<Arc<dyn WalletFacade>>,
	) -> Result<WalletBundle, FaucetError> {
		let genesis =
			bundle::init_wallet_with_seed(self.provider, self.network, &self.config.genesis_seed)
				.await?;
		opened.push(genesis.wallet.clone());

		barrier::wait_until_within(
			&genesis.wallet.state(),
			self.config.barrier_deadline,
			|state| state.is_synced.then_some(()),
		)
		.await?;
		debug!("Genesis wallet synced");
		Ok(genesis)
	}

	async fn open_receiver_wallet(
		&self,
		phrase: &str,
		opened: &mut Vec<Arc<dyn WalletFacade>>,
	) -> Result<WalletBundle, FaucetError> {
		let seed = input::mnemonic_to_seed(phrase)?;
		let receiver =
			bundle::init_wallet_with_seed(self.provider, self.network, seed.as_slice()).await?;
		opened.push(receiver.wallet.clone());
		Ok(receiver)
	}
}

/// Wait for the receiver wallet to sync, then return its shielded and
/// unshielded receiving addresses.
pub async fn resolve_receiver_addresses(
	receiver: &WalletBundle,
	network: NetworkId,
	config: &FundingConfig,
) -> Result<(String, String), FaucetError> {
	let state = barrier::wait_until_within(
		&receiver.wallet.state(),
		config.barrier_deadline,
		|state| state.is_synced.then(|| state.clone()),
	)
	.await?;

	let shielded = address::encode_shielded_address(network, &state.shielded.address)?;
	let unshielded = receiver.unshielded_keystore.bech32_address()?;
	info!(
		shielded_address = %shielded,
		unshielded_address = %unshielded,
		"Resolved receiver addresses"
	);
	Ok((shielded, unshielded))
}

async fn wait_for_available_coins(
	receiver: &WalletBundle,
	config: &FundingConfig,
) -> Result<UnshieldedState, FaucetError> {
	let state = barrier::wait_until_within(
		&receiver.wallet.state(),
		config.barrier_deadline,
		|state| {
			(state.is_synced && !state.unshielded.available_coins.is_empty())
				.then(|| state.unshielded.clone())
		},
	)
	.await?;
	debug!(
		coins = state.available_coins.len(),
		"Receiver wallet observed funded coins"
	);
	Ok(state)
}

async fn stop_all(opened: Vec<Arc<dyn WalletFacade>>) {
	for wallet in opened {
		wallet.stop().await;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn run_report_serializes_camel_case() {
		let report = DustRunReport {
			funding_tx: "0xfeed".to_string(),
			registration: DustRegistrationOutcome::NoEligibleCoins,
		};
		let json = serde_json::to_value(&report).unwrap();
		assert_eq!(json["fundingTx"], "0xfeed");
		assert_eq!(json["registration"]["status"], "noEligibleCoins");
	}
}
