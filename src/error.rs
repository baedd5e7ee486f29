//! Error taxonomy for the funding and dust-registration flows.

use crate::engine::EngineError;
use crate::input::InputError;
use crate::wallet::barrier::BarrierError;
use thiserror::Error;

/// Exit code for malformed or missing CLI input.
pub const EXIT_USAGE: i32 = 2;
/// Exit code for any downstream protocol failure.
pub const EXIT_FAILURE: i32 = 1;

/// Stage of the staged transaction pipeline that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStage {
	RecipeCreation,
	Signing,
	Finalization,
	Submission,
}

impl std::fmt::Display for TxStage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let stage = match self {
			TxStage::RecipeCreation => "recipe creation",
			TxStage::Signing => "signing",
			TxStage::Finalization => "finalization",
			TxStage::Submission => "submission",
		};
		f.write_str(stage)
	}
}

/// Top-level error type for one orchestration run.
#[derive(Debug, Error)]
pub enum FaucetError {
	/// Malformed mnemonic, malformed or wrong-network address, missing
	/// argument. Raised before any wallet bundle is allocated.
	#[error("invalid input: {0}")]
	InvalidInput(#[from] InputError),

	/// Seed or role-key derivation reported a non-success variant. Fatal;
	/// a given seed either derives correctly or indicates corrupted input.
	#[error("key derivation failed: {0}")]
	Derivation(String),

	/// The wallet engine violated its contract (e.g. a dust-generation
	/// transaction missing its signable intent). Fatal, never retried.
	#[error("wallet engine contract violation: {0}")]
	Protocol(String),

	/// Failure during recipe creation, signing, finalization or network
	/// submission. Not retried by this layer.
	#[error("transaction {stage} failed: {source}")]
	Submission {
		stage: TxStage,
		#[source]
		source: EngineError,
	},

	/// Engine failure outside the staged transaction pipeline (wallet
	/// construction, dust sync wait).
	#[error("wallet engine error: {0}")]
	Engine(#[from] EngineError),

	/// A sync-barrier wait could not resolve.
	#[error("wallet state wait failed: {0}")]
	Barrier(#[from] BarrierError),

	/// Address encoding failed.
	#[error("address encoding failed: {0}")]
	Address(#[from] crate::address::AddressError),
}

impl FaucetError {
	/// Process exit code for this error, per the CLI contract.
	pub fn exit_code(&self) -> i32 {
		match self {
			FaucetError::InvalidInput(_) => EXIT_USAGE,
			_ => EXIT_FAILURE,
		}
	}

}

/// Map an engine error into [`FaucetError::Submission`] at `stage`.
pub(crate) fn submission(stage: TxStage) -> impl FnOnce(EngineError) -> FaucetError {
	move |source| FaucetError::Submission { stage, source }
}
