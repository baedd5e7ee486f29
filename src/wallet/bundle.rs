//! Bundle factory: seed in, opened composite wallet plus role keys out.

use crate::address::NetworkId;
use crate::engine::hd::{HdWallet, KeyDerivation, Role, SeedImport};
use crate::engine::keystore::{DustSecretKey, ShieldedSecretKeys, UnshieldedKeystore};
use crate::engine::{WalletFacade, WalletProvider};
use crate::error::FaucetError;
use std::sync::Arc;
use tracing::debug;

const WALLET_ACCOUNT: u32 = 0;
const WALLET_INDEX: u32 = 0;
const WALLET_ROLES: [Role; 3] = [Role::ShieldedSpend, Role::UnshieldedExternal, Role::Dust];

/// One 32-byte key per wallet role, extracted at account 0, index 0.
pub struct RoleKeys {
	pub shielded: [u8; 32],
	pub unshielded: [u8; 32],
	pub dust: [u8; 32],
}

/// Derive the three role keys from a seed. The intermediate master key is
/// cleared before this returns, success or not.
pub fn derive_role_keys(seed: &[u8]) -> Result<RoleKeys, FaucetError> {
	let mut hd = match HdWallet::from_seed(seed) {
		SeedImport::SeedOk(hd) => hd,
		SeedImport::InvalidSeed { reason } => {
			return Err(FaucetError::Derivation(format!("seed import failed: {reason}")));
		}
	};

	let derivation = hd.derive_keys_at(WALLET_ACCOUNT, &WALLET_ROLES, WALLET_INDEX);
	hd.clear();

	let mut keys = match derivation {
		KeyDerivation::KeysDerived(keys) => keys,
		KeyDerivation::Failure { reason } => {
			return Err(FaucetError::Derivation(format!("key derivation failed: {reason}")));
		}
	};

	let mut take = |role: Role| {
		keys.remove(&role)
			.ok_or_else(|| FaucetError::Derivation(format!("missing key for role {role:?}")))
	};
	Ok(RoleKeys {
		shielded: take(Role::ShieldedSpend)?,
		unshielded: take(Role::UnshieldedExternal)?,
		dust: take(Role::Dust)?,
	})
}

/// An opened composite wallet together with the role keys that own it.
pub struct WalletBundle {
	pub wallet: Arc<dyn WalletFacade>,
	pub shielded_secret_keys: ShieldedSecretKeys,
	pub dust_secret_key: DustSecretKey,
	pub unshielded_keystore: UnshieldedKeystore,
}

/// Derive role keys from `seed` and open a started wallet for them.
///
/// Identical seeds always produce identical key material and addresses, so a
/// wallet can be re-opened across runs by re-supplying its seed.
pub async fn init_wallet_with_seed(
	provider: &dyn WalletProvider,
	network: NetworkId,
	seed: &[u8],
) -> Result<WalletBundle, FaucetError> {
	let keys = derive_role_keys(seed)?;

	let shielded_secret_keys = ShieldedSecretKeys::from_seed(keys.shielded);
	let dust_secret_key = DustSecretKey::from_seed(keys.dust);
	let unshielded_keystore = UnshieldedKeystore::from_seed(keys.unshielded, network);

	let wallet = provider
		.open_wallet(&shielded_secret_keys, &dust_secret_key, &unshielded_keystore)
		.await?;
	debug!(
		unshielded_address = %unshielded_keystore.bech32_address()?,
		"Opened wallet bundle"
	);

	Ok(WalletBundle {
		wallet,
		shielded_secret_keys,
		dust_secret_key,
		unshielded_keystore,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn role_keys_are_deterministic_per_seed() {
		let a = derive_role_keys(&[7u8; 32]).unwrap();
		let b = derive_role_keys(&[7u8; 32]).unwrap();
		assert_eq!(a.shielded, b.shielded);
		assert_eq!(a.unshielded, b.unshielded);
		assert_eq!(a.dust, b.dust);
	}

	#[test]
	fn role_keys_differ_across_roles_and_seeds() {
		let keys = derive_role_keys(&[7u8; 32]).unwrap();
		assert_ne!(keys.shielded, keys.unshielded);
		assert_ne!(keys.unshielded, keys.dust);

		let other = derive_role_keys(&[8u8; 32]).unwrap();
		assert_ne!(keys.shielded, other.shielded);
	}

	#[test]
	fn short_seed_is_a_derivation_error() {
		let result = derive_role_keys(&[1u8; 4]);
		assert!(matches!(result, Err(FaucetError::Derivation(_))));
	}
}
