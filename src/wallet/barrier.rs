//! Sync barriers over the wallet state stream.
//!
//! A barrier subscribes to the stream, evaluates a predicate against the
//! current snapshot and every subsequent one, and resolves with the
//! predicate's value on the first match. Re-evaluating from the current
//! snapshot first means a barrier whose condition already holds resolves
//! immediately instead of waiting for the next emission.

use crate::engine::types::WalletState;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BarrierError {
	/// The wallet stopped emitting snapshots before the condition held.
	#[error("wallet state stream closed before the condition was met")]
	StreamClosed,

	/// The optional deadline elapsed before the condition held.
	#[error("condition not met within {0:?}")]
	DeadlineExceeded(Duration),
}

/// Wait until `predicate` returns `Some` for a wallet state snapshot.
///
/// Blocks indefinitely while the stream stays open. Use
/// [`wait_until_within`] to bound the wait.
pub async fn wait_until<T>(
	state: &watch::Receiver<WalletState>,
	mut predicate: impl FnMut(&WalletState) -> Option<T>,
) -> Result<T, BarrierError> {
	let mut rx = state.clone();
	loop {
		if let Some(value) = predicate(&rx.borrow_and_update()) {
			return Ok(value);
		}
		if rx.changed().await.is_err() {
			return Err(BarrierError::StreamClosed);
		}
	}
}

/// [`wait_until`] with an optional deadline. `None` waits indefinitely.
pub async fn wait_until_within<T>(
	state: &watch::Receiver<WalletState>,
	deadline: Option<Duration>,
	predicate: impl FnMut(&WalletState) -> Option<T>,
) -> Result<T, BarrierError> {
	match deadline {
		None => wait_until(state, predicate).await,
		Some(limit) => tokio::time::timeout(limit, wait_until(state, predicate))
			.await
			.map_err(|_| BarrierError::DeadlineExceeded(limit))?,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::types::{DustState, ShieldedState, UnshieldedState};

	fn state(synced: bool) -> WalletState {
		WalletState {
			is_synced: synced,
			shielded: ShieldedState {
				address: [0u8; 32],
				balance: 0,
			},
			unshielded: UnshieldedState {
				address: "mn_addr_undeployed1test".to_string(),
				available_coins: Vec::new(),
			},
			dust: DustState {
				synced,
				dust_address: "mn_dust-addr_undeployed1test".to_string(),
				generation: Vec::new(),
			},
		}
	}

	#[tokio::test]
	async fn resolves_immediately_when_the_condition_already_holds() {
		let (_tx, rx) = watch::channel(state(true));
		let result = wait_until(&rx, |s| s.is_synced.then_some(())).await;
		assert_eq!(result, Ok(()));
	}

	#[tokio::test]
	async fn resolves_on_a_later_snapshot() {
		let (tx, rx) = watch::channel(state(false));
		let waiter = tokio::spawn(async move {
			wait_until(&rx, |s| s.is_synced.then_some(())).await
		});
		tx.send(state(false)).unwrap();
		tx.send(state(true)).unwrap();
		assert_eq!(waiter.await.unwrap(), Ok(()));
	}

	#[tokio::test]
	async fn reports_a_closed_stream() {
		let (tx, rx) = watch::channel(state(false));
		drop(tx);
		let result = wait_until(&rx, |s| s.is_synced.then_some(())).await;
		assert_eq!(result, Err(BarrierError::StreamClosed));
	}

	#[tokio::test]
	async fn deadline_bounds_the_wait() {
		let (_tx, rx) = watch::channel(state(false));
		let limit = Duration::from_millis(20);
		let result = wait_until_within(&rx, Some(limit), |s| s.is_synced.then_some(())).await;
		assert_eq!(result, Err(BarrierError::DeadlineExceeded(limit)));
	}

	#[tokio::test]
	async fn multiple_barriers_observe_the_same_stream() {
		let (tx, rx) = watch::channel(state(false));
		let a = {
			let rx = rx.clone();
			tokio::spawn(async move { wait_until(&rx, |s| s.is_synced.then_some(())).await })
		};
		let b = tokio::spawn(async move { wait_until(&rx, |s| s.is_synced.then_some(())).await });
		tx.send(state(true)).unwrap();
		assert_eq!(a.await.unwrap(), Ok(()));
		assert_eq!(b.await.unwrap(), Ok(()));
	}
}
