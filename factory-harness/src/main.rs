use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use ethers::abi::Token;
use factory_harness::config::gas;
use factory_harness::{child_id_from_record, MirrorClient, RelayClient, Session};
use ledger_core::{setup_logger, AbiScope, OperatorConfig, PollConfig, PollOutcome};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Compiled-artifact directory (hardhat layout)
    #[arg(long, default_value = "factory-harness/artifacts")]
    artifacts: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deploy the factory contract from its compiled bytecode
    Deploy {
        /// Raw solc .bin file; defaults to the artifact's bytecode
        #[arg(long)]
        bin: Option<PathBuf>,
        #[arg(long, default_value_t = gas::DEPLOY)]
        gas: u64,
    },
    /// Create a child via the deployed factory and exercise it
    Interact {
        #[arg(long, default_value_t = 1_000_000)]
        gas: u64,
        /// Seconds to wait for the mirror node to index the event
        #[arg(long, default_value_t = 30)]
        mirror_timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = setup_logger();
    dotenv().ok();

    let args = Args::parse();

    // Fail on configuration before any network call
    let operator = match OperatorConfig::from_env() {
        Ok(op) => op,
        Err(e) => {
            error!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    let client = Arc::new(RelayClient::connect(&operator).await?);
    let mut session = Session::new(client, &args.artifacts)?;

    match args.command {
        Command::Deploy { bin, gas } => {
            info!("========== Deploying Factory Contract ===========");
            let handle = match bin {
                Some(path) => {
                    factory_harness::deploy::deploy_from_bin_file(session.client(), &path, gas)
                        .await?
                }
                None => session.deploy_factory(gas).await?,
            };
            info!("- The Factory Contract ID is: {}", handle.contract_id);
            info!(
                "- The Factory Contract address in Solidity format is: {}",
                handle.solidity_address
            );
            info!("================================================");
        }
        Command::Interact { gas, mirror_timeout } => {
            let factory_id = OperatorConfig::factory_contract_id()?;
            session.factory_id = Some(factory_id);

            // Ask the factory for a new child and pull its id out of the
            // emitted ContractCreated log.
            let result = session
                .execute(factory_id, gas, "createContract", &[], AbiScope::Factory, 0)
                .await?;
            info!("- createContract status: {}", result.status);
            info!("TransactionId: {}", result.record.transaction_id);

            let child_id =
                child_id_from_record(session.interface(AbiScope::Factory), &result.record.logs)?;
            session.register_child(child_id);
            info!("Instance Contract ID: {}", child_id);

            let add = session
                .execute(
                    child_id,
                    300_000,
                    "addStudentDetails",
                    &[
                        Token::Uint(11u64.into()),
                        Token::String("TWO".to_string()),
                        Token::Uint(340u64.into()),
                        Token::Uint(111u64.into()),
                        Token::String("Amrita".to_string()),
                        Token::Uint(60u64.into()),
                        Token::Uint(0u64.into()),
                    ],
                    AbiScope::Child,
                    0,
                )
                .await?;
            info!("- Contract function call status: {}", add.status);

            // Out-of-band verification: wait for the mirror node to index
            // the creation event, then print it.
            let mirror = MirrorClient::new(operator.profile.mirror_base_url());
            let token = CancellationToken::new();
            let outcome = mirror
                .wait_for_log(
                    session.interface(AbiScope::Factory),
                    factory_id,
                    PollConfig::new(2000, mirror_timeout * 1000),
                    &token,
                )
                .await;
            match outcome {
                PollOutcome::Found(_) => {
                    mirror.check_last_event(session.interface(AbiScope::Factory), factory_id).await
                }
                PollOutcome::TimedOut => {
                    warn!("Mirror node did not index the event within {}s", mirror_timeout)
                }
                PollOutcome::Cancelled => {}
            }
        }
    }

    Ok(())
}
