//! Dust registration protocol.
//!
//! Registers a wallet's not-yet-registered coins for dust generation and
//! waits for dust to start accruing. The eligibility filter makes the
//! protocol idempotent: a re-run over an already-registered coin set selects
//! nothing and reports [`DustRegistrationOutcome::NoEligibleCoins`] without
//! touching the chain.

use crate::config::FundingConfig;
use crate::engine::types::{UnshieldedState, eligible_dust_coins};
use crate::engine::{SignFn, WalletFacade};
use crate::error::{FaucetError, TxStage, submission};
use crate::wallet::barrier;
use chrono::Utc;
use ed25519_dalek::VerifyingKey;
use serde::Serialize;
use tracing::{debug, info};

/// Index of the intent carrying the owner signature within a dust-generation
/// transaction.
pub const DUST_REGISTRATION_INTENT_INDEX: u16 = 1;

/// Outcome of one dust-registration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum DustRegistrationOutcome {
	/// Every available coin was already registered; nothing was submitted.
	NoEligibleCoins,
	/// A registration transaction was submitted and dust started accruing.
	#[serde(rename_all = "camelCase")]
	Submitted { tx_id: String, dust_balance: u128 },
}

/// Register all eligible coins of `unshielded_state` for dust generation,
/// paying dust out to `dust_receiver_address`.
///
/// On submission, blocks until the dust sub-wallet reports a synced state and
/// a positive dust balance, bounded by the configured barrier deadline.
pub async fn register_dust_generation(
	wallet: &dyn WalletFacade,
	unshielded_state: &UnshieldedState,
	dust_receiver_address: &str,
	unshielded_public_key: &VerifyingKey,
	sign_with_unshielded: SignFn<'_>,
	config: &FundingConfig,
) -> Result<DustRegistrationOutcome, FaucetError> {
	wallet.wait_for_dust_synced_state().await?;
	debug!("Dust wallet reports synced state");

	let coins = eligible_dust_coins(&unshielded_state.available_coins);
	if coins.is_empty() {
		info!(
			available = unshielded_state.available_coins.len(),
			"All available coins already registered for dust generation"
		);
		return Ok(DustRegistrationOutcome::NoEligibleCoins);
	}
	info!(
		eligible = coins.len(),
		available = unshielded_state.available_coins.len(),
		dust_receiver = %dust_receiver_address,
		"Registering coins for dust generation"
	);

	let now = Utc::now();
	let ttl = now + config.dust_ttl;
	let transaction = wallet
		.create_dust_generation_transaction(
			now,
			ttl,
			coins,
			unshielded_public_key,
			dust_receiver_address,
		)
		.await
		.map_err(submission(TxStage::RecipeCreation))?;

	let intent = transaction
		.intents
		.get(&DUST_REGISTRATION_INTENT_INDEX)
		.ok_or_else(|| {
			FaucetError::Protocol(format!(
				"dust-generation transaction is missing intent {DUST_REGISTRATION_INTENT_INDEX}"
			))
		})?;
	let signature = sign_with_unshielded(&intent.signature_data(DUST_REGISTRATION_INTENT_INDEX));

	let signed = wallet
		.add_dust_generation_signature(transaction, signature)
		.await
		.map_err(submission(TxStage::Signing))?;
	let finalized = wallet
		.finalize_transaction(signed)
		.await
		.map_err(submission(TxStage::Finalization))?;
	let tx_id = wallet
		.submit_transaction(finalized)
		.await
		.map_err(submission(TxStage::Submission))?;
	info!(tx_hash = %tx_id, "Dust registration transaction submitted");

	let dust_balance = barrier::wait_until_within(
		&wallet.state(),
		config.barrier_deadline,
		|state| {
			let balance = state.dust.wallet_balance(Utc::now());
			(balance > 0).then_some(balance)
		},
	)
	.await?;
	info!(dust_balance = %dust_balance, "Dust is accruing");

	Ok(DustRegistrationOutcome::Submitted {
		tx_id: tx_id.to_string(),
		dust_balance,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn outcome_serializes_with_a_status_tag() {
		let none = serde_json::to_value(DustRegistrationOutcome::NoEligibleCoins).unwrap();
		assert_eq!(none["status"], "noEligibleCoins");

		let submitted = serde_json::to_value(DustRegistrationOutcome::Submitted {
			tx_id: "0xabc".to_string(),
			dust_balance: 1_234,
		})
		.unwrap();
		assert_eq!(submitted["status"], "submitted");
		assert_eq!(submitted["txId"], "0xabc");
		assert_eq!(submitted["dustBalance"], 1_234);
	}
}
