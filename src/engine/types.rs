//! Data model shared between the orchestration protocols and the wallet
//! engine: wallet-state snapshots, coins, transfer outputs and the staged
//! transaction types.

use crate::engine::keystore::{DustSecretKey, ShieldedSecretKeys};
use chrono::{DateTime, Utc};
use ed25519_dalek::Signature;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Kind of token moved by a transfer output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
	Unshielded,
	Shielded,
}

/// An unspent output owned by a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
	/// Raw token amount.
	pub value: u128,
	pub token_type: TokenType,
	/// Unique output identifier within the chain state.
	pub nonce: [u8; 32],
}

/// Wallet-local metadata attached to a coin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoMeta {
	/// Creation time of the coin.
	pub ctime: DateTime<Utc>,
	/// Whether the coin has already been registered for dust generation.
	/// Coins are included in a new dust-generation transaction only while
	/// this is `false`.
	pub registered_for_dust_generation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoWithMeta {
	pub utxo: Utxo,
	pub meta: UtxoMeta,
}

/// A coin paired with its creation time, the shape the engine expects for
/// dust-generation requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoWithCtime {
	pub utxo: Utxo,
	pub ctime: DateTime<Utc>,
}

/// Select the coins eligible for a new dust-generation transaction: exactly
/// those not yet flagged as registered. Re-running registration against an
/// already-registered coin set therefore yields an empty selection.
pub fn eligible_dust_coins(coins: &[UtxoWithMeta]) -> Vec<UtxoWithCtime> {
	coins
		.iter()
		.filter(|coin| !coin.meta.registered_for_dust_generation)
		.map(|coin| UtxoWithCtime {
			utxo: coin.utxo.clone(),
			ctime: coin.meta.ctime,
		})
		.collect()
}

/// A single (amount, receiver, token) transfer entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTransfer {
	pub amount: u128,
	pub receiver_address: String,
	pub token_type: TokenType,
}

/// One output group of a transfer transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferOutput {
	Shielded { outputs: Vec<TokenTransfer> },
	Unshielded { outputs: Vec<TokenTransfer> },
}

impl TransferOutput {
	pub fn transfers(&self) -> &[TokenTransfer] {
		match self {
			TransferOutput::Shielded { outputs } | TransferOutput::Unshielded { outputs } => {
				outputs
			}
		}
	}

	/// Total amount across all transfers in this output group.
	pub fn total_amount(&self) -> u128 {
		self.transfers()
			.iter()
			.fold(0u128, |acc, t| acc.saturating_add(t.amount))
	}
}

/// Options for a transfer recipe request.
#[derive(Debug, Clone, Copy)]
pub struct TransferOptions {
	/// Deadline after which the submitted transaction is no longer valid
	/// for inclusion.
	pub ttl: DateTime<Utc>,
	/// Whether the engine should compute and deduct fees from the sender.
	pub pay_fees: bool,
}

/// Secret material the engine needs to assemble a transfer recipe.
pub struct TransferKeys<'a> {
	pub shielded_secret_keys: &'a ShieldedSecretKeys,
	pub dust_secret_key: &'a DustSecretKey,
}

/// Identifier of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub String);

impl std::fmt::Display for TransactionId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// Semantic content of a staged transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionBody {
	Transfer {
		sender_address: String,
		/// Hex-encoded ed25519 key the unshielded signature is checked
		/// against at finalization.
		sender_public_key: String,
		outputs: Vec<TransferOutput>,
		/// Fee computed by the engine at recipe creation.
		fee: u128,
	},
	DustRegistration {
		/// Hex-encoded ed25519 key of the coin owner.
		owner_public_key: String,
		dust_address: String,
		coins: Vec<UtxoWithCtime>,
	},
}

impl TransactionBody {
	fn digest_into(&self, hasher: &mut Sha256) {
		match self {
			TransactionBody::Transfer {
				sender_address,
				sender_public_key,
				outputs,
				fee,
			} => {
				hasher.update([0u8]);
				hasher.update(sender_address.as_bytes());
				hasher.update(sender_public_key.as_bytes());
				hasher.update(fee.to_le_bytes());
				for output in outputs {
					let kind: u8 = match output {
						TransferOutput::Shielded { .. } => 0,
						TransferOutput::Unshielded { .. } => 1,
					};
					hasher.update([kind]);
					for transfer in output.transfers() {
						hasher.update(transfer.amount.to_le_bytes());
						hasher.update(transfer.receiver_address.as_bytes());
						hasher.update([transfer.token_type as u8]);
					}
				}
			}
			TransactionBody::DustRegistration {
				owner_public_key,
				dust_address,
				coins,
			} => {
				hasher.update([1u8]);
				hasher.update(owner_public_key.as_bytes());
				hasher.update(dust_address.as_bytes());
				for coin in coins {
					hasher.update(coin.utxo.value.to_le_bytes());
					hasher.update(coin.utxo.nonce);
					hasher.update(coin.ctime.timestamp_millis().to_le_bytes());
				}
			}
		}
	}
}

/// An unsigned, fee-computed draft of a transaction.
///
/// The staged types form a linear, non-reentrant progression:
/// `TransactionRecipe` → [`SignedTransaction`] → [`FinalizedTransaction`] →
/// [`TransactionId`].
#[derive(Debug, Clone)]
pub struct TransactionRecipe {
	pub body: TransactionBody,
	pub ttl: DateTime<Utc>,
	pub pay_fees: bool,
	/// Uniqueness nonce mixed in at recipe creation so otherwise identical
	/// transfers produce distinct identifiers.
	pub nonce: [u8; 32],
}

impl TransactionRecipe {
	/// Bytes the unshielded signature is computed over.
	pub fn signature_payload(&self) -> Vec<u8> {
		let mut hasher = Sha256::new();
		self.body.digest_into(&mut hasher);
		hasher.update(self.ttl.timestamp_millis().to_le_bytes());
		hasher.update(self.nonce);
		hasher.finalize().to_vec()
	}
}

/// A recipe carrying one or more signatures keyed by intent index.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
	pub recipe: TransactionRecipe,
	pub signatures: BTreeMap<u16, Signature>,
}

/// A signature-checked transaction ready for submission.
#[derive(Debug, Clone)]
pub struct FinalizedTransaction {
	pub body: TransactionBody,
	pub ttl: DateTime<Utc>,
	pub id: TransactionId,
}

/// A signable component of a dust-generation transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionIntent {
	payload: Vec<u8>,
}

impl TransactionIntent {
	pub fn new(payload: Vec<u8>) -> Self {
		Self { payload }
	}

	/// Bytes to sign for this intent at `index`. The index is bound into
	/// the message so a signature cannot be replayed across intents.
	pub fn signature_data(&self, index: u16) -> Vec<u8> {
		let mut data = self.payload.clone();
		data.extend_from_slice(&index.to_le_bytes());
		data
	}
}

/// A dust-generation transaction as returned by the engine, awaiting its
/// owner signature.
#[derive(Debug, Clone)]
pub struct DustGenerationTransaction {
	pub intents: BTreeMap<u16, TransactionIntent>,
	pub recipe: TransactionRecipe,
}

/// Point-in-time view of the shielded sub-wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShieldedState {
	/// Raw shielded address; encode with
	/// [`crate::address::encode_shielded_address`] for display.
	pub address: [u8; 32],
	pub balance: u128,
}

/// Point-in-time view of the unshielded sub-wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnshieldedState {
	pub address: String,
	pub available_coins: Vec<UtxoWithMeta>,
}

/// A coin registered for dust generation, accruing from `since`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DustAccrual {
	pub value: u128,
	pub since: DateTime<Utc>,
}

/// Point-in-time view of the dust sub-wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DustState {
	pub synced: bool,
	pub dust_address: String,
	pub generation: Vec<DustAccrual>,
}

impl DustState {
	/// Dust balance evaluated at `at`. Dust accrues over time once a coin
	/// is registered, proportionally to the coin's value.
	pub fn wallet_balance(&self, at: DateTime<Utc>) -> u128 {
		self.generation
			.iter()
			.map(|accrual| {
				let elapsed_ms = (at - accrual.since).num_milliseconds().max(0) as u128;
				accrual.value.saturating_mul(elapsed_ms) / 1_000
			})
			.fold(0u128, u128::saturating_add)
	}
}

/// Immutable snapshot of a wallet's sync status and balances, emitted
/// repeatedly on the wallet state stream as the engine advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletState {
	pub is_synced: bool,
	pub shielded: ShieldedState,
	pub unshielded: UnshieldedState,
	pub dust: DustState,
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Duration;

	fn coin(value: u128, registered: bool, nonce_byte: u8) -> UtxoWithMeta {
		UtxoWithMeta {
			utxo: Utxo {
				value,
				token_type: TokenType::Unshielded,
				nonce: [nonce_byte; 32],
			},
			meta: UtxoMeta {
				ctime: Utc::now(),
				registered_for_dust_generation: registered,
			},
		}
	}

	#[test]
	fn filter_keeps_only_unregistered_coins() {
		let coins = vec![
			coin(100, false, 1),
			coin(200, true, 2),
			coin(300, false, 3),
			coin(400, true, 4),
			coin(500, true, 5),
		];
		let eligible = eligible_dust_coins(&coins);
		assert_eq!(eligible.len(), 2);
		assert_eq!(eligible[0].utxo.nonce, [1u8; 32]);
		assert_eq!(eligible[1].utxo.nonce, [3u8; 32]);
	}

	#[test]
	fn filter_of_fully_registered_set_is_empty() {
		let coins = vec![coin(1, true, 1), coin(2, true, 2)];
		assert!(eligible_dust_coins(&coins).is_empty());
		assert!(eligible_dust_coins(&[]).is_empty());
	}

	#[test]
	fn recipe_payload_changes_with_nonce() {
		let body = TransactionBody::Transfer {
			sender_address: "mn_addr_undeployed1sender".into(),
			sender_public_key: "00".into(),
			outputs: vec![],
			fee: 50_000,
		};
		let ttl = Utc::now();
		let a = TransactionRecipe {
			body: body.clone(),
			ttl,
			pay_fees: true,
			nonce: [1u8; 32],
		};
		let b = TransactionRecipe {
			body,
			ttl,
			pay_fees: true,
			nonce: [2u8; 32],
		};
		assert_ne!(a.signature_payload(), b.signature_payload());
		assert_eq!(a.signature_payload(), a.signature_payload());
	}

	#[test]
	fn intent_signature_data_binds_the_index() {
		let intent = TransactionIntent::new(vec![9u8; 32]);
		assert_ne!(intent.signature_data(0), intent.signature_data(1));
	}

	#[test]
	fn dust_balance_accrues_over_time() {
		let now = Utc::now();
		let state = DustState {
			synced: true,
			dust_address: "mn_dust-addr_undeployed1x".into(),
			generation: vec![DustAccrual {
				value: 1_000_000,
				since: now,
			}],
		};
		assert_eq!(state.wallet_balance(now), 0);
		assert!(state.wallet_balance(now + Duration::seconds(1)) > 0);
		// Never negative before registration time.
		assert_eq!(state.wallet_balance(now - Duration::seconds(5)), 0);
	}
}
