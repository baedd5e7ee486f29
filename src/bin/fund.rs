//! Fund a wallet from the genesis wallet on the local network.

use clap::Parser;
use midnight_local_faucet::config::{FundingConfig, NetworkConfig};
use midnight_local_faucet::engine::local::LocalNetwork;
use midnight_local_faucet::error::FaucetError;
use midnight_local_faucet::{Orchestrator, input, logging};
use tracing::error;

#[derive(Debug, Parser)]
#[command(
	name = "fund",
	about = "Fund a wallet from the pre-funded genesis wallet on the local network",
	version
)]
struct Cli {
	/// Receiver of the funds: a BIP-39 mnemonic, a shielded address or an
	/// unshielded address scoped to the "undeployed" network.
	receiver: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
	logging::init_tracing();
	let cli = Cli::parse();

	if let Err(err) = run(cli).await {
		error!(error = %err, "Funding run failed");
		std::process::exit(err.exit_code());
	}
}

async fn run(cli: Cli) -> Result<(), FaucetError> {
	let receiver = input::parse_receiver(&cli.receiver)?;

	let network_config = NetworkConfig::from_env();
	let funding_config = FundingConfig::default();
	let network_id = network_config.network_id;
	let network = LocalNetwork::start(network_config, &funding_config.genesis_seed)?;

	let orchestrator = Orchestrator::new(&network, network_id, funding_config);
	let tx_id = orchestrator.fund(receiver).await?;

	println!("{}", serde_json::json!({ "fundingTx": tx_id.to_string() }));
	Ok(())
}
