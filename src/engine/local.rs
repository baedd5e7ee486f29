//! In-process wallet engine for the local development network.
//!
//! One [`LocalNetwork`] owns the chain state shared by every wallet opened
//! against it. The genesis address is pre-funded at network start; submitted
//! transactions mutate the chain state, and each wallet publishes state
//! snapshots on an interval so barrier waits observe effects as they land.

use crate::address::{self, NetworkId};
use crate::config::NetworkConfig;
use crate::engine::keystore::{DustSecretKey, ShieldedSecretKeys, UnshieldedKeystore};
use crate::engine::types::{
	DustAccrual, DustGenerationTransaction, DustState, FinalizedTransaction, ShieldedState,
	SignedTransaction, TokenType, TransactionBody, TransactionId, TransactionIntent,
	TransactionRecipe, TransferKeys, TransferOptions, TransferOutput, UnshieldedState, Utxo,
	UtxoMeta, UtxoWithCtime, UtxoWithMeta, WalletState,
};
use crate::engine::{EngineError, SignFn, WalletFacade, WalletProvider};
use crate::error::FaucetError;
use crate::utils::{NATIVE_TOKEN_DECIMALS, format_token_amount};
use crate::wallet::barrier;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, VerifyingKey};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Flat transfer fee charged by the local engine.
pub const LOCAL_TRANSFER_FEE: u128 = 50_000;

/// Signature index of a plain transfer's unshielded intent.
pub const TRANSFER_SIGNATURE_INDEX: u16 = 0;
/// Signature index of the dust-registration intent.
pub const DUST_SIGNATURE_INDEX: u16 = 1;

const SNAPSHOT_INTERVAL: std::time::Duration = std::time::Duration::from_millis(25);
const GENESIS_UTXO_COUNT: usize = 4;
const GENESIS_UTXO_VALUE: u128 = 1_000_000_000_000_000;

/// One unspent output tracked by the chain state.
#[derive(Debug, Clone)]
struct UtxoRecord {
	value: u128,
	token_type: TokenType,
	nonce: [u8; 32],
	ctime: DateTime<Utc>,
	registered_for_dust: bool,
}

impl UtxoRecord {
	fn with_meta(&self) -> UtxoWithMeta {
		UtxoWithMeta {
			utxo: Utxo {
				value: self.value,
				token_type: self.token_type,
				nonce: self.nonce,
			},
			meta: UtxoMeta {
				ctime: self.ctime,
				registered_for_dust_generation: self.registered_for_dust,
			},
		}
	}
}

/// Mutable chain state shared by every wallet of one local network.
struct ChainState {
	network: NetworkId,
	unshielded_utxos: HashMap<String, Vec<UtxoRecord>>,
	shielded_balances: HashMap<String, u128>,
	dust_generation: HashMap<String, Vec<DustAccrual>>,
	submitted_count: u64,
}

impl ChainState {
	fn unshielded_balance(&self, address: &str) -> u128 {
		self.unshielded_utxos
			.get(address)
			.map(|coins| coins.iter().fold(0u128, |acc, c| acc.saturating_add(c.value)))
			.unwrap_or(0)
	}

	fn credit_unshielded(&mut self, address: &str, value: u128, now: DateTime<Utc>) {
		self.unshielded_utxos
			.entry(address.to_string())
			.or_default()
			.push(UtxoRecord {
				value,
				token_type: TokenType::Unshielded,
				nonce: random_nonce(),
				ctime: now,
				registered_for_dust: false,
			});
	}

	fn apply(&mut self, body: &TransactionBody, now: DateTime<Utc>) -> Result<(), EngineError> {
		match body {
			TransactionBody::Transfer {
				sender_address,
				outputs,
				fee,
				..
			} => self.apply_transfer(sender_address, outputs, *fee, now),
			TransactionBody::DustRegistration {
				owner_public_key,
				dust_address,
				coins,
			} => self.apply_dust_registration(owner_public_key, dust_address, coins, now),
		}
	}

	fn apply_transfer(
		&mut self,
		sender_address: &str,
		outputs: &[TransferOutput],
		fee: u128,
		now: DateTime<Utc>,
	) -> Result<(), EngineError> {
		let total: u128 = outputs
			.iter()
			.fold(0u128, |acc, o| acc.saturating_add(o.total_amount()));
		let needed = total.saturating_add(fee);

		let coins = self.unshielded_utxos.entry(sender_address.to_string()).or_default();
		let available: u128 = coins.iter().fold(0u128, |acc, c| acc.saturating_add(c.value));
		if available < needed {
			return Err(EngineError::InsufficientBalance(format!(
				"requested {} + {} fee = {} total, but only {} available",
				format_token_amount(total, NATIVE_TOKEN_DECIMALS),
				format_token_amount(fee, NATIVE_TOKEN_DECIMALS),
				format_token_amount(needed, NATIVE_TOKEN_DECIMALS),
				format_token_amount(available, NATIVE_TOKEN_DECIMALS),
			)));
		}

		// Spend coins until the requirement is covered, then return change.
		let mut selected = 0u128;
		while selected < needed {
			let coin = match coins.pop() {
				Some(coin) => coin,
				None => break,
			};
			selected = selected.saturating_add(coin.value);
		}
		let change = selected - needed;
		if change > 0 {
			self.credit_unshielded(sender_address, change, now);
		}

		for output in outputs {
			match output {
				TransferOutput::Unshielded { outputs } => {
					for transfer in outputs {
						self.credit_unshielded(&transfer.receiver_address, transfer.amount, now);
					}
				}
				TransferOutput::Shielded { outputs } => {
					for transfer in outputs {
						let balance = self
							.shielded_balances
							.entry(transfer.receiver_address.clone())
							.or_insert(0);
						*balance = balance.saturating_add(transfer.amount);
					}
				}
			}
		}

		Ok(())
	}

	fn apply_dust_registration(
		&mut self,
		owner_public_key: &str,
		dust_address: &str,
		coins: &[UtxoWithCtime],
		now: DateTime<Utc>,
	) -> Result<(), EngineError> {
		let owner_address = owner_address_from_hex(self.network, owner_public_key)?;
		let owned = self.unshielded_utxos.entry(owner_address).or_default();

		let mut newly_registered = Vec::new();
		for coin in coins {
			let record = owned
				.iter_mut()
				.find(|record| record.nonce == coin.utxo.nonce)
				.ok_or_else(|| {
					EngineError::Rejected(format!(
						"unknown coin {} in dust registration",
						hex::encode(coin.utxo.nonce)
					))
				})?;
			// Registration is idempotent per coin: already-registered coins
			// accrue from their original registration only.
			if !record.registered_for_dust {
				record.registered_for_dust = true;
				newly_registered.push(DustAccrual {
					value: record.value,
					since: now,
				});
			}
		}

		self.dust_generation
			.entry(dust_address.to_string())
			.or_default()
			.extend(newly_registered);

		Ok(())
	}
}

/// In-process local development network; implements [`WalletProvider`].
pub struct LocalNetwork {
	chain: Arc<Mutex<ChainState>>,
	config: NetworkConfig,
}

impl LocalNetwork {
	/// Start a fresh local network with the genesis address pre-funded.
	///
	/// The genesis wallet is derived from `genesis_seed` through the same
	/// account-0 path the bundle factory uses, so funding runs find the
	/// pre-funded coins under the genesis sender's unshielded address.
	pub fn start(config: NetworkConfig, genesis_seed: &[u8; 32]) -> Result<Self, FaucetError> {
		let keys = crate::wallet::bundle::derive_role_keys(genesis_seed)?;
		let keystore = UnshieldedKeystore::from_seed(keys.unshielded, config.network_id);
		let genesis_address = keystore.bech32_address()?;

		let now = Utc::now();
		let mut chain = ChainState {
			network: config.network_id,
			unshielded_utxos: HashMap::new(),
			shielded_balances: HashMap::new(),
			dust_generation: HashMap::new(),
			submitted_count: 0,
		};
		for _ in 0..GENESIS_UTXO_COUNT {
			chain.credit_unshielded(&genesis_address, GENESIS_UTXO_VALUE, now);
		}

		info!(
			network = %config.network_id,
			relay_url = %config.relay_url,
			proving_server_url = %config.proving_server_url,
			indexer_ws_url = %config.indexer_ws_url,
			genesis_address = %genesis_address,
			"Started local network"
		);

		Ok(Self {
			chain: Arc::new(Mutex::new(chain)),
			config,
		})
	}

	/// Number of transactions applied to the chain so far.
	pub fn submitted_transactions(&self) -> u64 {
		self.chain.lock().unwrap().submitted_count
	}
}

#[async_trait]
impl WalletProvider for LocalNetwork {
	async fn open_wallet(
		&self,
		shielded: &ShieldedSecretKeys,
		dust: &DustSecretKey,
		keystore: &UnshieldedKeystore,
	) -> Result<Arc<dyn WalletFacade>, EngineError> {
		let network = self.config.network_id;
		let identity = WalletIdentity {
			shielded_address: shielded.address(),
			unshielded_address: keystore
				.bech32_address()
				.map_err(|e| EngineError::Rejected(e.to_string()))?,
			dust_address: dust
				.dust_address(network)
				.map_err(|e| EngineError::Rejected(e.to_string()))?,
		};

		let viewing_key = shielded
			.viewing_key(network)
			.map_err(|e| EngineError::Rejected(e.to_string()))?;
		debug!(session = %viewing_key, "Established wallet session");

		let wallet = LocalWallet::open(
			self.chain.clone(),
			network,
			identity,
			keystore.public_key(),
		);
		Ok(wallet)
	}
}

#[derive(Debug, Clone)]
struct WalletIdentity {
	shielded_address: [u8; 32],
	unshielded_address: String,
	dust_address: String,
}

/// One composite wallet attached to a [`LocalNetwork`].
pub struct LocalWallet {
	chain: Arc<Mutex<ChainState>>,
	identity: WalletIdentity,
	public_key: VerifyingKey,
	state_tx: Mutex<Option<watch::Sender<WalletState>>>,
	state_rx: watch::Receiver<WalletState>,
	publisher: Mutex<Option<JoinHandle<()>>>,
}

impl LocalWallet {
	fn open(
		chain: Arc<Mutex<ChainState>>,
		network: NetworkId,
		identity: WalletIdentity,
		public_key: VerifyingKey,
	) -> Arc<Self> {
		// The first snapshot is unsynced; the publisher flips to synced
		// snapshots immediately after start.
		let initial = {
			let chain = chain.lock().unwrap();
			snapshot(&chain, &identity, false)
		};
		let (state_tx, state_rx) = watch::channel(initial);

		let wallet = Arc::new(Self {
			chain,
			identity,
			public_key,
			state_tx: Mutex::new(Some(state_tx)),
			state_rx,
			publisher: Mutex::new(None),
		});

		let handle = tokio::spawn(publish_snapshots(Arc::downgrade(&wallet)));
		*wallet.publisher.lock().unwrap() = Some(handle);
		debug!(address = %wallet.identity.unshielded_address, network = %network, "Started wallet");
		wallet
	}

	fn sender_public_key_hex(&self) -> String {
		hex::encode(self.public_key.as_bytes())
	}

	fn publish(&self) {
		let state = {
			let chain = self.chain.lock().unwrap();
			snapshot(&chain, &self.identity, true)
		};
		if let Some(tx) = self.state_tx.lock().unwrap().as_ref() {
			// Send only fails when every receiver is gone; the wallet keeps
			// its own receiver, so this is unreachable until stop.
			let _ = tx.send(state);
		}
	}
}

async fn publish_snapshots(wallet: std::sync::Weak<LocalWallet>) {
	let mut interval = tokio::time::interval(SNAPSHOT_INTERVAL);
	loop {
		interval.tick().await;
		let Some(wallet) = wallet.upgrade() else {
			return;
		};
		if wallet.state_tx.lock().unwrap().is_none() {
			return;
		}
		wallet.publish();
	}
}

fn snapshot(chain: &ChainState, identity: &WalletIdentity, synced: bool) -> WalletState {
	let shielded_encoded =
		address::encode_shielded_address(chain.network, &identity.shielded_address)
			.unwrap_or_default();
	WalletState {
		is_synced: synced,
		shielded: ShieldedState {
			address: identity.shielded_address,
			balance: chain
				.shielded_balances
				.get(&shielded_encoded)
				.copied()
				.unwrap_or(0),
		},
		unshielded: UnshieldedState {
			address: identity.unshielded_address.clone(),
			available_coins: chain
				.unshielded_utxos
				.get(&identity.unshielded_address)
				.map(|coins| coins.iter().map(UtxoRecord::with_meta).collect())
				.unwrap_or_default(),
		},
		dust: DustState {
			synced,
			dust_address: identity.dust_address.clone(),
			generation: chain
				.dust_generation
				.get(&identity.dust_address)
				.cloned()
				.unwrap_or_default(),
		},
	}
}

#[async_trait]
impl WalletFacade for LocalWallet {
	fn state(&self) -> watch::Receiver<WalletState> {
		self.state_rx.clone()
	}

	async fn transfer_transaction(
		&self,
		outputs: Vec<TransferOutput>,
		keys: &TransferKeys<'_>,
		options: TransferOptions,
	) -> Result<TransactionRecipe, EngineError> {
		if outputs.is_empty() {
			return Err(EngineError::Rejected("no transfer outputs".to_string()));
		}
		if keys.shielded_secret_keys.address() != self.identity.shielded_address {
			return Err(EngineError::Rejected(
				"transfer keys do not match this wallet".to_string(),
			));
		}

		let fee = if options.pay_fees { LOCAL_TRANSFER_FEE } else { 0 };
		let total: u128 = outputs
			.iter()
			.fold(0u128, |acc, o| acc.saturating_add(o.total_amount()));
		{
			let chain = self.chain.lock().unwrap();
			let available = chain.unshielded_balance(&self.identity.unshielded_address);
			if available < total.saturating_add(fee) {
				return Err(EngineError::InsufficientBalance(format!(
					"requested {} + {} fee, but only {} available",
					format_token_amount(total, NATIVE_TOKEN_DECIMALS),
					format_token_amount(fee, NATIVE_TOKEN_DECIMALS),
					format_token_amount(available, NATIVE_TOKEN_DECIMALS),
				)));
			}
		}

		Ok(TransactionRecipe {
			body: TransactionBody::Transfer {
				sender_address: self.identity.unshielded_address.clone(),
				sender_public_key: self.sender_public_key_hex(),
				outputs,
				fee,
			},
			ttl: options.ttl,
			pay_fees: options.pay_fees,
			nonce: random_nonce(),
		})
	}

	async fn sign_unproven_transaction(
		&self,
		recipe: TransactionRecipe,
		sign: SignFn<'_>,
	) -> Result<SignedTransaction, EngineError> {
		let payload = recipe.signature_payload();
		let signature = sign(&payload);
		let mut signatures = BTreeMap::new();
		signatures.insert(TRANSFER_SIGNATURE_INDEX, signature);
		Ok(SignedTransaction { recipe, signatures })
	}

	async fn finalize_transaction(
		&self,
		signed: SignedTransaction,
	) -> Result<FinalizedTransaction, EngineError> {
		let (index, public_key_hex) = match &signed.recipe.body {
			TransactionBody::Transfer {
				sender_public_key, ..
			} => (TRANSFER_SIGNATURE_INDEX, sender_public_key.clone()),
			TransactionBody::DustRegistration {
				owner_public_key, ..
			} => (DUST_SIGNATURE_INDEX, owner_public_key.clone()),
		};

		let signature = signed
			.signatures
			.get(&index)
			.ok_or(EngineError::MissingSignature(index))?;

		let payload = signed.recipe.signature_payload();
		let message = match index {
			TRANSFER_SIGNATURE_INDEX => payload.clone(),
			_ => TransactionIntent::new(payload.clone()).signature_data(index),
		};

		let verifying_key = verifying_key_from_hex(&public_key_hex)?;
		verifying_key
			.verify_strict(&message, signature)
			.map_err(|_| EngineError::InvalidSignature(index))?;

		let mut hasher = Sha256::new();
		hasher.update(&payload);
		hasher.update(signature.to_bytes());
		let id = TransactionId(format!("0x{}", hex::encode(hasher.finalize())));

		Ok(FinalizedTransaction {
			body: signed.recipe.body,
			ttl: signed.recipe.ttl,
			id,
		})
	}

	async fn submit_transaction(
		&self,
		transaction: FinalizedTransaction,
	) -> Result<TransactionId, EngineError> {
		let now = Utc::now();
		if now > transaction.ttl {
			return Err(EngineError::Expired {
				ttl: transaction.ttl,
			});
		}

		{
			let mut chain = self.chain.lock().unwrap();
			chain.apply(&transaction.body, now)?;
			chain.submitted_count += 1;
		}
		self.publish();

		debug!(tx_hash = %transaction.id, "Applied transaction to local chain");
		Ok(transaction.id)
	}

	async fn create_dust_generation_transaction(
		&self,
		now: DateTime<Utc>,
		ttl: DateTime<Utc>,
		coins: Vec<UtxoWithCtime>,
		owner_public_key: &VerifyingKey,
		dust_address: &str,
	) -> Result<DustGenerationTransaction, EngineError> {
		if coins.is_empty() {
			return Err(EngineError::Rejected(
				"no coins to register for dust generation".to_string(),
			));
		}
		if ttl <= now {
			return Err(EngineError::Expired { ttl });
		}

		let recipe = TransactionRecipe {
			body: TransactionBody::DustRegistration {
				owner_public_key: hex::encode(owner_public_key.as_bytes()),
				dust_address: dust_address.to_string(),
				coins,
			},
			ttl,
			pay_fees: true,
			nonce: random_nonce(),
		};

		let payload = recipe.signature_payload();
		let mut intents = BTreeMap::new();
		intents.insert(
			TRANSFER_SIGNATURE_INDEX,
			TransactionIntent::new(payload.clone()),
		);
		intents.insert(DUST_SIGNATURE_INDEX, TransactionIntent::new(payload));

		Ok(DustGenerationTransaction { intents, recipe })
	}

	async fn add_dust_generation_signature(
		&self,
		transaction: DustGenerationTransaction,
		signature: Signature,
	) -> Result<SignedTransaction, EngineError> {
		let mut signatures = BTreeMap::new();
		signatures.insert(DUST_SIGNATURE_INDEX, signature);
		Ok(SignedTransaction {
			recipe: transaction.recipe,
			signatures,
		})
	}

	async fn wait_for_dust_synced_state(&self) -> Result<(), EngineError> {
		barrier::wait_until(&self.state_rx, |state| state.dust.synced.then_some(()))
			.await
			.map_err(|_| EngineError::Stopped)
	}

	async fn stop(&self) {
		let publisher = self.publisher.lock().unwrap().take();
		let channel = self.state_tx.lock().unwrap().take();
		match (publisher, channel) {
			(Some(handle), Some(_)) => {
				handle.abort();
				debug!(address = %self.identity.unshielded_address, "Stopped wallet");
			}
			_ => {
				warn!(
					address = %self.identity.unshielded_address,
					"Wallet already stopped"
				);
			}
		}
	}
}

fn verifying_key_from_hex(hex_key: &str) -> Result<VerifyingKey, EngineError> {
	let bytes = hex::decode(hex_key)
		.map_err(|e| EngineError::Rejected(format!("invalid public key encoding: {e}")))?;
	let bytes: [u8; 32] = bytes
		.try_into()
		.map_err(|_| EngineError::Rejected("public key must be 32 bytes".to_string()))?;
	VerifyingKey::from_bytes(&bytes)
		.map_err(|e| EngineError::Rejected(format!("invalid public key: {e}")))
}

fn owner_address_from_hex(network: NetworkId, hex_key: &str) -> Result<String, EngineError> {
	let key = verifying_key_from_hex(hex_key)?;
	address::encode_unshielded_address(network, key.as_bytes())
		.map_err(|e| EngineError::Rejected(e.to_string()))
}

/// Random transaction nonce with the current timestamp mixed in, so repeated
/// transfers with identical outputs still produce distinct identifiers.
fn random_nonce() -> [u8; 32] {
	let mut nonce = [0u8; 32];
	rand::rng().fill(&mut nonce);

	let timestamp = std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.unwrap_or_default()
		.as_nanos() as u64;
	for (i, byte) in timestamp.to_le_bytes().iter().enumerate() {
		nonce[i] ^= byte;
	}
	nonce
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::GENESIS_WALLET_SEED;
	use crate::engine::types::TokenTransfer;
	use crate::wallet::bundle::init_wallet_with_seed;
	use chrono::Duration;

	fn network() -> LocalNetwork {
		LocalNetwork::start(NetworkConfig::default(), &GENESIS_WALLET_SEED).unwrap()
	}

	#[tokio::test]
	async fn genesis_wallet_sees_prefunded_coins() {
		let network = network();
		let bundle = init_wallet_with_seed(&network, NetworkId::Undeployed, &GENESIS_WALLET_SEED)
			.await
			.unwrap();

		let state = barrier::wait_until(&bundle.wallet.state(), |s| {
			s.is_synced.then(|| s.clone())
		})
		.await
		.unwrap();
		assert_eq!(state.unshielded.available_coins.len(), GENESIS_UTXO_COUNT);

		bundle.wallet.stop().await;
	}

	#[tokio::test]
	async fn transfer_with_insufficient_balance_is_rejected_at_recipe_creation() {
		let network = network();
		// A wallet derived from a random seed owns nothing.
		let bundle = init_wallet_with_seed(&network, NetworkId::Undeployed, &[9u8; 32])
			.await
			.unwrap();

		let outputs = vec![TransferOutput::Unshielded {
			outputs: vec![TokenTransfer {
				amount: 1_000,
				receiver_address: "mn_addr_undeployed1receiver".to_string(),
				token_type: TokenType::Unshielded,
			}],
		}];
		let result = bundle
			.wallet
			.transfer_transaction(
				outputs,
				&TransferKeys {
					shielded_secret_keys: &bundle.shielded_secret_keys,
					dust_secret_key: &bundle.dust_secret_key,
				},
				TransferOptions {
					ttl: Utc::now() + Duration::minutes(30),
					pay_fees: true,
				},
			)
			.await;
		assert!(matches!(result, Err(EngineError::InsufficientBalance(_))));

		bundle.wallet.stop().await;
	}

	#[tokio::test]
	async fn expired_ttl_is_rejected_at_submission() {
		let network = network();
		let bundle = init_wallet_with_seed(&network, NetworkId::Undeployed, &GENESIS_WALLET_SEED)
			.await
			.unwrap();

		let outputs = vec![TransferOutput::Unshielded {
			outputs: vec![TokenTransfer {
				amount: 1_000,
				receiver_address: "mn_addr_undeployed1receiver".to_string(),
				token_type: TokenType::Unshielded,
			}],
		}];
		let recipe = bundle
			.wallet
			.transfer_transaction(
				outputs,
				&TransferKeys {
					shielded_secret_keys: &bundle.shielded_secret_keys,
					dust_secret_key: &bundle.dust_secret_key,
				},
				TransferOptions {
					ttl: Utc::now() - Duration::seconds(1),
					pay_fees: true,
				},
			)
			.await
			.unwrap();
		let signed = bundle
			.wallet
			.sign_unproven_transaction(recipe, &|payload| {
				bundle.unshielded_keystore.sign_data(payload)
			})
			.await
			.unwrap();
		let finalized = bundle.wallet.finalize_transaction(signed).await.unwrap();
		let result = bundle.wallet.submit_transaction(finalized).await;
		assert!(matches!(result, Err(EngineError::Expired { .. })));

		bundle.wallet.stop().await;
	}

	#[tokio::test]
	async fn finalize_rejects_a_signature_from_the_wrong_key() {
		let network = network();
		let bundle = init_wallet_with_seed(&network, NetworkId::Undeployed, &GENESIS_WALLET_SEED)
			.await
			.unwrap();
		let stranger = UnshieldedKeystore::from_seed([41u8; 32], NetworkId::Undeployed);

		let outputs = vec![TransferOutput::Unshielded {
			outputs: vec![TokenTransfer {
				amount: 1_000,
				receiver_address: "mn_addr_undeployed1receiver".to_string(),
				token_type: TokenType::Unshielded,
			}],
		}];
		let recipe = bundle
			.wallet
			.transfer_transaction(
				outputs,
				&TransferKeys {
					shielded_secret_keys: &bundle.shielded_secret_keys,
					dust_secret_key: &bundle.dust_secret_key,
				},
				TransferOptions {
					ttl: Utc::now() + Duration::minutes(30),
					pay_fees: true,
				},
			)
			.await
			.unwrap();
		let signed = bundle
			.wallet
			.sign_unproven_transaction(recipe, &|payload| stranger.sign_data(payload))
			.await
			.unwrap();
		let result = bundle.wallet.finalize_transaction(signed).await;
		assert!(matches!(
			result,
			Err(EngineError::InvalidSignature(TRANSFER_SIGNATURE_INDEX))
		));

		bundle.wallet.stop().await;
	}
}
