//! Fund a mnemonic-derived wallet and register its coins for dust
//! generation on the local network.

use clap::Parser;
use midnight_local_faucet::config::{FundingConfig, NetworkConfig};
use midnight_local_faucet::engine::local::LocalNetwork;
use midnight_local_faucet::error::FaucetError;
use midnight_local_faucet::{Orchestrator, input, logging};
use tracing::error;

#[derive(Debug, Parser)]
#[command(
	name = "fund-and-register-dust",
	about = "Fund a wallet and register its coins for dust generation on the local network",
	version
)]
struct Cli {
	/// BIP-39 mnemonic of the wallet to fund and register. Addresses are not
	/// accepted: registration needs the wallet's keys.
	mnemonic: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
	logging::init_tracing();
	let cli = Cli::parse();

	if let Err(err) = run(cli).await {
		error!(error = %err, "Dust registration run failed");
		std::process::exit(err.exit_code());
	}
}

async fn run(cli: Cli) -> Result<(), FaucetError> {
	// Validate before any chain state is allocated.
	let mnemonic = input::parse_mnemonic(&cli.mnemonic)?;

	let network_config = NetworkConfig::from_env();
	let funding_config = FundingConfig::default();
	let network_id = network_config.network_id;
	let network = LocalNetwork::start(network_config, &funding_config.genesis_seed)?;

	let orchestrator = Orchestrator::new(&network, network_id, funding_config);
	let report = orchestrator.fund_and_register_dust(&mnemonic).await?;

	match serde_json::to_string(&report) {
		Ok(json) => println!("{json}"),
		Err(e) => return Err(FaucetError::Protocol(format!("report serialization: {e}"))),
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use midnight_local_faucet::error::EXIT_USAGE;

	#[test]
	fn missing_mnemonic_argument_is_a_usage_error() {
		let err = Cli::try_parse_from(["fund-and-register-dust"]).unwrap_err();
		assert_eq!(err.exit_code(), EXIT_USAGE);
	}

	#[tokio::test]
	async fn invalid_mnemonic_is_rejected_before_anything_starts() {
		let err = run(Cli {
			mnemonic: "definitely not a mnemonic".to_string(),
		})
		.await
		.unwrap_err();
		assert!(matches!(err, FaucetError::InvalidInput(_)));
		assert_eq!(err.exit_code(), EXIT_USAGE);
	}
}
