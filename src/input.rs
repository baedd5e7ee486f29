//! Pure validation of the receiver argument.
//!
//! Validation runs before any wallet bundle is allocated, so rejected inputs
//! never require cleanup. Accepted inputs are a BIP-39 mnemonic, a shielded
//! address, or an unshielded address; both address kinds must be scoped to
//! the "undeployed" network.

use crate::address::{self, NetworkId, SHIELDED_HRP_BASE, UNSHIELDED_HRP_BASE};
use bip39::Mnemonic;
use thiserror::Error;
use zeroize::Zeroizing;

/// Network this tool funds against.
pub const EXPECTED_NETWORK: &str = "undeployed";

const ARG_PREVIEW_LEN: usize = 60;

/// Which address encoding an argument was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
	Shielded,
	Unshielded,
}

impl AddressKind {
	fn base(&self) -> &'static str {
		match self {
			AddressKind::Shielded => SHIELDED_HRP_BASE,
			AddressKind::Unshielded => UNSHIELDED_HRP_BASE,
		}
	}

	fn expected_prefix(&self) -> String {
		match self {
			AddressKind::Shielded => address::shielded_hrp(NetworkId::Undeployed),
			AddressKind::Unshielded => address::unshielded_hrp(NetworkId::Undeployed),
		}
	}
}

impl std::fmt::Display for AddressKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			AddressKind::Shielded => f.write_str("shielded"),
			AddressKind::Unshielded => f.write_str("unshielded"),
		}
	}
}

/// Validated receiver descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiverInput {
	Mnemonic(String),
	ShieldedAddress(String),
	UnshieldedAddress(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
	#[error("no receiver argument provided")]
	Missing,

	#[error("invalid mnemonic provided")]
	InvalidMnemonic,

	#[error(
		"unsupported network in address: '{network}'. This tool supports only \
		 the '{EXPECTED_NETWORK}' network (expected prefix: {expected_prefix}...)"
	)]
	UnsupportedNetwork {
		network: String,
		expected_prefix: String,
	},

	#[error("malformed {kind} address: {reason}")]
	MalformedAddress { kind: AddressKind, reason: String },

	#[error("invalid argument provided: {0}")]
	Unrecognized(String),
}

/// Classify and validate a receiver argument without side effects.
///
/// Mnemonics are tried first (mirroring the CLI contract: a mnemonic is
/// never mistaken for an address), then the two address encodings. A
/// recognized address scoped to any network other than "undeployed" is
/// rejected naming the offending network token.
pub fn parse_receiver(arg: &str) -> Result<ReceiverInput, InputError> {
	let arg = arg.trim();
	if arg.is_empty() {
		return Err(InputError::Missing);
	}

	if Mnemonic::parse_normalized(arg).is_ok() {
		return Ok(ReceiverInput::Mnemonic(arg.to_string()));
	}

	if let Some(rest) = arg.strip_prefix(SHIELDED_HRP_BASE) {
		return parse_scoped_address(arg, rest, AddressKind::Shielded);
	}
	if let Some(rest) = arg.strip_prefix(UNSHIELDED_HRP_BASE) {
		return parse_scoped_address(arg, rest, AddressKind::Unshielded);
	}

	// Space-separated words that failed the word-list checksum are a bad
	// mnemonic, not an unknown address format.
	if arg.contains(' ') {
		return Err(InputError::InvalidMnemonic);
	}

	Err(InputError::Unrecognized(preview(arg)))
}

/// Validate an argument that must be a mnemonic (the dust-registration flow
/// does not accept addresses).
pub fn parse_mnemonic(arg: &str) -> Result<String, InputError> {
	let arg = arg.trim();
	if arg.is_empty() {
		return Err(InputError::Missing);
	}
	Mnemonic::parse_normalized(arg)
		.map(|_| arg.to_string())
		.map_err(|_| InputError::InvalidMnemonic)
}

/// Derive the 64-byte BIP-39 seed from a validated mnemonic (empty
/// passphrase). Invalid mnemonics never reach key derivation.
pub fn mnemonic_to_seed(mnemonic: &str) -> Result<Zeroizing<[u8; 64]>, InputError> {
	let mnemonic =
		Mnemonic::parse_normalized(mnemonic.trim()).map_err(|_| InputError::InvalidMnemonic)?;
	Ok(Zeroizing::new(mnemonic.to_seed_normalized("")))
}

fn parse_scoped_address(
	full: &str,
	rest: &str,
	kind: AddressKind,
) -> Result<ReceiverInput, InputError> {
	// `rest` is what follows the base HRP: either `_<network>1<data>` or,
	// for mainnet-form addresses, directly `1<data>`.
	let network_token = match rest.strip_prefix('_') {
		Some(scoped) => scoped.split('1').next().unwrap_or("").to_string(),
		None => String::new(),
	};

	if network_token != EXPECTED_NETWORK {
		let network = if network_token.is_empty() {
			NetworkId::MainNet.token().to_string()
		} else {
			network_token
		};
		return Err(InputError::UnsupportedNetwork {
			network,
			expected_prefix: kind.expected_prefix(),
		});
	}

	match bech32::decode(full) {
		Ok((hrp, _)) if hrp.as_str() == kind.expected_prefix() => Ok(match kind {
			AddressKind::Shielded => ReceiverInput::ShieldedAddress(full.to_string()),
			AddressKind::Unshielded => ReceiverInput::UnshieldedAddress(full.to_string()),
		}),
		Ok((hrp, _)) => Err(InputError::MalformedAddress {
			kind,
			reason: format!("unexpected HRP '{}'", hrp.as_str()),
		}),
		Err(e) => Err(InputError::MalformedAddress {
			kind,
			reason: e.to_string(),
		}),
	}
}

fn preview(arg: &str) -> String {
	// Truncate on character boundaries; a byte slice would panic on
	// multibyte input.
	if arg.chars().count() > ARG_PREVIEW_LEN {
		let truncated: String = arg.chars().take(ARG_PREVIEW_LEN).collect();
		format!("{truncated}...")
	} else {
		arg.to_string()
	}
}
