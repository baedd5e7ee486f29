//! Funding protocol: move tokens from the genesis wallet to receiver
//! addresses through the staged transfer pipeline.

use crate::config::FundingConfig;
use crate::engine::types::{
	TokenTransfer, TokenType, TransactionId, TransferKeys, TransferOptions, TransferOutput,
};
use crate::error::{FaucetError, TxStage, submission};
use crate::utils::{NATIVE_TOKEN_DECIMALS, format_token_amount};
use crate::wallet::WalletBundle;
use chrono::Utc;
use tracing::{debug, info};

/// Build the transfer output groups for one funding run: one shielded group
/// and/or one unshielded group, each carrying `amount`.
pub fn funding_outputs(
	amount: u128,
	shielded_address: Option<&str>,
	unshielded_address: Option<&str>,
) -> Vec<TransferOutput> {
	let mut outputs = Vec::new();
	if let Some(address) = shielded_address {
		outputs.push(TransferOutput::Shielded {
			outputs: vec![TokenTransfer {
				amount,
				receiver_address: address.to_string(),
				token_type: TokenType::Shielded,
			}],
		});
	}
	if let Some(address) = unshielded_address {
		outputs.push(TransferOutput::Unshielded {
			outputs: vec![TokenTransfer {
				amount,
				receiver_address: address.to_string(),
				token_type: TokenType::Unshielded,
			}],
		});
	}
	outputs
}

/// Run the staged funding pipeline from `sender`: recipe, sign, finalize,
/// submit. Each stage consumes the previous stage's output, and a failure at
/// any stage aborts the run with the stage recorded in the error.
pub async fn fund_from_genesis(
	sender: &WalletBundle,
	outputs: Vec<TransferOutput>,
	config: &FundingConfig,
) -> Result<TransactionId, FaucetError> {
	let total: u128 = outputs
		.iter()
		.fold(0u128, |acc, o| acc.saturating_add(o.total_amount()));
	info!(
		total = %format_token_amount(total, NATIVE_TOKEN_DECIMALS),
		recipients = outputs.len(),
		"Funding receiver addresses"
	);

	let ttl = Utc::now() + config.funding_ttl;
	let recipe = sender
		.wallet
		.transfer_transaction(
			outputs,
			&TransferKeys {
				shielded_secret_keys: &sender.shielded_secret_keys,
				dust_secret_key: &sender.dust_secret_key,
			},
			TransferOptions { ttl, pay_fees: true },
		)
		.await
		.map_err(submission(TxStage::RecipeCreation))?;
	debug!(ttl = %recipe.ttl, "Created transfer recipe");

	let signed = sender
		.wallet
		.sign_unproven_transaction(recipe, &|payload| {
			sender.unshielded_keystore.sign_data(payload)
		})
		.await
		.map_err(submission(TxStage::Signing))?;

	let finalized = sender
		.wallet
		.finalize_transaction(signed)
		.await
		.map_err(submission(TxStage::Finalization))?;

	let tx_id = sender
		.wallet
		.submit_transaction(finalized)
		.await
		.map_err(submission(TxStage::Submission))?;

	info!(tx_hash = %tx_id, "Funding transaction submitted");
	Ok(tx_id)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn outputs_cover_the_requested_addresses_only() {
		let both = funding_outputs(100, Some("mn_shield-addr_undeployed1a"), Some("mn_addr_undeployed1b"));
		assert_eq!(both.len(), 2);
		assert!(matches!(both[0], TransferOutput::Shielded { .. }));
		assert!(matches!(both[1], TransferOutput::Unshielded { .. }));

		let unshielded_only = funding_outputs(100, None, Some("mn_addr_undeployed1b"));
		assert_eq!(unshielded_only.len(), 1);
		assert!(matches!(
			unshielded_only[0],
			TransferOutput::Unshielded { .. }
		));

		assert!(funding_outputs(100, None, None).is_empty());
	}

	#[test]
	fn each_output_group_carries_the_full_amount() {
		let outputs = funding_outputs(
			31_337_000_000,
			Some("mn_shield-addr_undeployed1a"),
			Some("mn_addr_undeployed1b"),
		);
		for output in &outputs {
			assert_eq!(output.total_amount(), 31_337_000_000);
		}
	}
}
