//! Wallet engine contract.
//!
//! The orchestration core treats the wallet engine as a black box exposing a
//! multicast state-snapshot stream plus the staged transaction operations.
//! [`local`] implements this contract in-process for the local development
//! network; the trait seam is also where tests inject failures.

pub mod hd;
pub mod keystore;
pub mod local;
pub mod types;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, VerifyingKey};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

use crate::engine::keystore::{DustSecretKey, ShieldedSecretKeys, UnshieldedKeystore};
use crate::engine::types::{
	DustGenerationTransaction, FinalizedTransaction, SignedTransaction, TransactionId,
	TransactionRecipe, TransferKeys, TransferOptions, TransferOutput, UtxoWithCtime, WalletState,
};

/// Errors reported by a wallet engine.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
	#[error("insufficient balance: {0}")]
	InsufficientBalance(String),

	#[error("transaction expired: ttl {ttl} is in the past")]
	Expired { ttl: DateTime<Utc> },

	#[error("missing signature for intent {0}")]
	MissingSignature(u16),

	#[error("invalid signature for intent {0}")]
	InvalidSignature(u16),

	#[error("transaction rejected: {0}")]
	Rejected(String),

	#[error("wallet is stopped")]
	Stopped,
}

/// Signing callback bound to an unshielded key.
pub type SignFn<'a> = &'a (dyn Fn(&[u8]) -> Signature + Send + Sync);

/// Composite wallet facade: shielded, unshielded and dust sub-wallets behind
/// one surface, continuously emitting [`WalletState`] snapshots.
#[async_trait]
pub trait WalletFacade: Send + Sync {
	/// Subscribe to the wallet state stream. The stream is multicast: any
	/// number of subscribers may observe it independently, and it outlives
	/// each individual subscription.
	fn state(&self) -> watch::Receiver<WalletState>;

	/// Build a fee-computed transfer recipe for `outputs`.
	async fn transfer_transaction(
		&self,
		outputs: Vec<TransferOutput>,
		keys: &TransferKeys<'_>,
		options: TransferOptions,
	) -> Result<TransactionRecipe, EngineError>;

	/// Sign the recipe's unshielded signing payload with `sign`.
	async fn sign_unproven_transaction(
		&self,
		recipe: TransactionRecipe,
		sign: SignFn<'_>,
	) -> Result<SignedTransaction, EngineError>;

	/// Check signatures and convert the signed recipe into a submittable
	/// transaction.
	async fn finalize_transaction(
		&self,
		signed: SignedTransaction,
	) -> Result<FinalizedTransaction, EngineError>;

	/// Submit a finalized transaction, returning its identifier.
	async fn submit_transaction(
		&self,
		transaction: FinalizedTransaction,
	) -> Result<TransactionId, EngineError>;

	/// Build a dust-generation transaction registering `coins` for the dust
	/// receiver `dust_address`.
	async fn create_dust_generation_transaction(
		&self,
		now: DateTime<Utc>,
		ttl: DateTime<Utc>,
		coins: Vec<UtxoWithCtime>,
		owner_public_key: &VerifyingKey,
		dust_address: &str,
	) -> Result<DustGenerationTransaction, EngineError>;

	/// Attach the owner signature to a dust-generation transaction,
	/// producing a signed recipe.
	async fn add_dust_generation_signature(
		&self,
		transaction: DustGenerationTransaction,
		signature: Signature,
	) -> Result<SignedTransaction, EngineError>;

	/// Resolve once the dust sub-wallet reports a synced state.
	async fn wait_for_dust_synced_state(&self) -> Result<(), EngineError>;

	/// Release all background resources. Called exactly once per wallet by
	/// the orchestration cleanup phase.
	async fn stop(&self);
}

/// Constructor seam for composite wallets. The returned wallet is started:
/// it is already emitting state snapshots when this call returns.
#[async_trait]
pub trait WalletProvider: Send + Sync {
	async fn open_wallet(
		&self,
		shielded: &ShieldedSecretKeys,
		dust: &DustSecretKey,
		keystore: &UnshieldedKeystore,
	) -> Result<Arc<dyn WalletFacade>, EngineError>;
}
