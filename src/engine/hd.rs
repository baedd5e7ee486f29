//! Hierarchical seed-to-key derivation.
//!
//! Derivation is deterministic HMAC-SHA512 chaining: a master key is imported
//! from the input seed, then one 32-byte key is derived per (account, role,
//! index) path. Both steps report explicit success/failure variants; any
//! non-success outcome is fatal for the caller. The master key material is
//! cleared with [`HdWallet::clear`] as soon as role keys are extracted.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::collections::BTreeMap;
use zeroize::{Zeroize, Zeroizing};

type HmacSha512 = Hmac<Sha512>;

const MASTER_KEY_DOMAIN: &[u8] = b"midnight-local-faucet hd seed";
const MIN_SEED_LEN: usize = 16;
const MAX_SEED_LEN: usize = 64;

/// Key roles derivable from one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
	/// Shielded spending key.
	ShieldedSpend,
	/// Unshielded signing key (external chain).
	UnshieldedExternal,
	/// Dust key.
	Dust,
}

impl Role {
	fn path_index(&self) -> u32 {
		match self {
			Role::ShieldedSpend => 0,
			Role::UnshieldedExternal => 1,
			Role::Dust => 2,
		}
	}
}

/// Result of importing a seed.
pub enum SeedImport {
	SeedOk(HdWallet),
	InvalidSeed { reason: String },
}

/// Result of deriving role keys at an index.
pub enum KeyDerivation {
	KeysDerived(BTreeMap<Role, [u8; 32]>),
	Failure { reason: String },
}

/// Master derivation handle. Must not be retained past its one use; call
/// [`HdWallet::clear`] after extracting role keys.
pub struct HdWallet {
	master: Zeroizing<[u8; 64]>,
}

impl HdWallet {
	/// Import a seed. Seeds outside 16..=64 bytes are rejected as corrupted
	/// input rather than silently truncated.
	pub fn from_seed(seed: &[u8]) -> SeedImport {
		if seed.len() < MIN_SEED_LEN || seed.len() > MAX_SEED_LEN {
			return SeedImport::InvalidSeed {
				reason: format!(
					"seed must be {MIN_SEED_LEN}..={MAX_SEED_LEN} bytes, got {}",
					seed.len()
				),
			};
		}

		let mut mac = match HmacSha512::new_from_slice(MASTER_KEY_DOMAIN) {
			Ok(mac) => mac,
			Err(e) => {
				return SeedImport::InvalidSeed {
					reason: e.to_string(),
				};
			}
		};
		mac.update(seed);

		let mut master = Zeroizing::new([0u8; 64]);
		master.copy_from_slice(&mac.finalize().into_bytes());
		SeedImport::SeedOk(HdWallet { master })
	}

	/// Derive one key per requested role for `account` at `index`.
	pub fn derive_keys_at(&self, account: u32, roles: &[Role], index: u32) -> KeyDerivation {
		if roles.is_empty() {
			return KeyDerivation::Failure {
				reason: "no roles requested".to_string(),
			};
		}
		if self.master.iter().all(|b| *b == 0) {
			return KeyDerivation::Failure {
				reason: "master key material already cleared".to_string(),
			};
		}

		let mut keys = BTreeMap::new();
		for role in roles {
			let mut mac = match HmacSha512::new_from_slice(self.master.as_slice()) {
				Ok(mac) => mac,
				Err(e) => {
					return KeyDerivation::Failure {
						reason: e.to_string(),
					};
				}
			};
			mac.update(&account.to_be_bytes());
			mac.update(&role.path_index().to_be_bytes());
			mac.update(&index.to_be_bytes());
			let digest = mac.finalize().into_bytes();

			let mut key = [0u8; 32];
			key.copy_from_slice(&digest[..32]);
			keys.insert(*role, key);
		}

		KeyDerivation::KeysDerived(keys)
	}

	/// Zeroize the master key material. Further derivations fail.
	pub fn clear(&mut self) {
		self.master.zeroize();
	}
}
