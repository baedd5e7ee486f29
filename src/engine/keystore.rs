//! Role-key holders: shielded secret keys, dust secret key and the
//! unshielded keystore.

use crate::address::{self, AddressError, NetworkId};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

const SHIELDED_ADDRESS_DOMAIN: &[u8] = b"midnight-shielded-address";
const DUST_PUBLIC_DOMAIN: &[u8] = b"midnight-dust-public";

/// Shielded spending key set derived from the shielded-spend role key.
pub struct ShieldedSecretKeys {
	secret: Zeroizing<[u8; 32]>,
	address: [u8; 32],
}

impl ShieldedSecretKeys {
	pub fn from_seed(seed: [u8; 32]) -> Self {
		let mut hasher = Sha256::new();
		hasher.update(SHIELDED_ADDRESS_DOMAIN);
		hasher.update(seed);
		let address: [u8; 32] = hasher.finalize().into();
		Self {
			secret: Zeroizing::new(seed),
			address,
		}
	}

	/// Raw shielded address bound to this key set.
	pub fn address(&self) -> [u8; 32] {
		self.address
	}

	/// bech32m viewing key the engine uses to establish a wallet session.
	pub fn viewing_key(&self, network: NetworkId) -> Result<String, AddressError> {
		address::encode_viewing_key(network, self.secret.as_slice())
	}
}

/// Dust key derived from the dust role key.
pub struct DustSecretKey {
	secret: Zeroizing<[u8; 32]>,
}

impl DustSecretKey {
	pub fn from_seed(seed: [u8; 32]) -> Self {
		Self {
			secret: Zeroizing::new(seed),
		}
	}

	/// Public commitment the dust receiver address encodes.
	pub fn public_bytes(&self) -> [u8; 32] {
		let mut hasher = Sha256::new();
		hasher.update(DUST_PUBLIC_DOMAIN);
		hasher.update(self.secret.as_slice());
		hasher.finalize().into()
	}

	/// Dust receiver address for `network`.
	pub fn dust_address(&self, network: NetworkId) -> Result<String, AddressError> {
		address::encode_dust_address(network, &self.public_bytes())
	}
}

/// Keystore holding the unshielded ed25519 signing key and exposing the
/// public-key and address accessors.
pub struct UnshieldedKeystore {
	signing_key: SigningKey,
	network: NetworkId,
}

impl UnshieldedKeystore {
	pub fn from_seed(seed: [u8; 32], network: NetworkId) -> Self {
		Self {
			signing_key: SigningKey::from_bytes(&seed),
			network,
		}
	}

	pub fn public_key(&self) -> VerifyingKey {
		self.signing_key.verifying_key()
	}

	/// bech32m address of the unshielded public key.
	pub fn bech32_address(&self) -> Result<String, AddressError> {
		address::encode_unshielded_address(self.network, self.public_key().as_bytes())
	}

	/// Sign an unshielded signing payload.
	pub fn sign_data(&self, payload: &[u8]) -> Signature {
		self.signing_key.sign(payload)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn shielded_address_is_deterministic_per_seed() {
		let a = ShieldedSecretKeys::from_seed([3u8; 32]);
		let b = ShieldedSecretKeys::from_seed([3u8; 32]);
		let c = ShieldedSecretKeys::from_seed([4u8; 32]);
		assert_eq!(a.address(), b.address());
		assert_ne!(a.address(), c.address());
	}

	#[test]
	fn dust_address_is_network_scoped() {
		let key = DustSecretKey::from_seed([5u8; 32]);
		let undeployed = key.dust_address(NetworkId::Undeployed).unwrap();
		let dev = key.dust_address(NetworkId::DevNet).unwrap();
		assert!(undeployed.starts_with("mn_dust-addr_undeployed1"));
		assert!(dev.starts_with("mn_dust-addr_dev1"));
	}

	#[test]
	fn keystore_signatures_verify_under_its_public_key() {
		let keystore = UnshieldedKeystore::from_seed([6u8; 32], NetworkId::Undeployed);
		let payload = b"signing payload";
		let signature = keystore.sign_data(payload);
		assert!(
			keystore
				.public_key()
				.verify_strict(payload, &signature)
				.is_ok()
		);
	}

	#[test]
	fn keystore_address_is_stable() {
		let a = UnshieldedKeystore::from_seed([7u8; 32], NetworkId::Undeployed);
		let b = UnshieldedKeystore::from_seed([7u8; 32], NetworkId::Undeployed);
		assert_eq!(a.bech32_address().unwrap(), b.bech32_address().unwrap());
		assert!(
			a.bech32_address()
				.unwrap()
				.starts_with("mn_addr_undeployed1")
		);
	}
}
