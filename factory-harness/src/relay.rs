//! `LedgerClient` over the network's EVM JSON-RPC relay.
//!
//! The relay speaks standard Ethereum JSON-RPC, so the teacher stack
//! (Provider + LocalWallet + SignerMiddleware, EIP-1559 requests) carries
//! the whole surface. Relay receipts do not expose return data, so
//! mutating calls are simulated with `eth_call` at submission time to
//! capture the bytes the record would carry.

use anyhow::{Context, Result};
use async_trait::async_trait;
use ethers::prelude::*;
use ethers::providers::MiddlewareError;
use ethers::types::transaction::eip2718::TypedTransaction;
use ledger_core::config::{NetworkProfile, OperatorConfig, LOCAL_ROOT_KEY};
use ledger_core::{
    EntityId, LedgerClient, LedgerError, LogEntry, ReceiptStatus, TransactionReceipt,
    TransactionRecord,
};
use std::sync::Arc;
use tracing::info;

/// Hbar funding for the bootstrapped local operator.
const LOCAL_BOOTSTRAP_HBAR: u64 = 1000;

/// 1 tinybar = 10^10 wei on the relay's 18-decimal view.
fn tinybar_to_wei(tinybar: u64) -> U256 {
    U256::from(tinybar) * U256::exp10(10)
}

pub struct RelayClient {
    client: Arc<SignerMiddleware<Provider<Http>, LocalWallet>>,
    operator_address: Address,
}

impl RelayClient {
    /// Binds a client to the profile's relay. For the LOCAL profile this
    /// first provisions a fresh operator funded by the hardcoded root
    /// credential, then rebinds to it - a one-time bootstrap, not retried.
    pub async fn connect(config: &OperatorConfig) -> Result<Self> {
        let profile = config.profile;
        let provider = Provider::<Http>::try_from(profile.relay_url())
            .context("invalid relay URL")?;

        let wallet = if profile == NetworkProfile::Local {
            bootstrap_local_operator(&provider, profile).await?
        } else {
            config
                .private_key
                .as_str()
                .parse::<LocalWallet>()
                .context("MYACCOUNT_PVKEY is not a valid private key")?
                .with_chain_id(profile.chain_id())
        };

        let operator_address = wallet.address();
        info!("-Using ENVIRONMENT: {}", profile);
        info!("-Using Operator: {} / {:?}", config.account_id, operator_address);

        Ok(Self {
            client: Arc::new(SignerMiddleware::new(provider, wallet)),
            operator_address,
        })
    }

    async fn send(
        &self,
        tx: Eip1559TransactionRequest,
    ) -> Result<ethers::types::TransactionReceipt, LedgerError> {
        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(|e| LedgerError::Rejected {
                reason: e.to_string(),
            })?;
        let tx_hash = *pending;

        pending
            .await
            .map_err(|e| LedgerError::Transport {
                reason: e.to_string(),
            })?
            .ok_or(LedgerError::Dropped {
                transaction_id: format!("{tx_hash:?}"),
            })
    }

    /// Captures what the call would return, before submitting it. A revert
    /// here is not a failure: the bytes flow into the record either way
    /// and the decode layer classifies them.
    async fn simulate(&self, tx: &Eip1559TransactionRequest) -> Vec<u8> {
        let typed = TypedTransaction::Eip1559(tx.clone());
        match self.client.call(&typed, None).await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => revert_data(&e).unwrap_or_default(),
        }
    }
}

/// Revert payload carried by a JSON-RPC error response, if any.
fn revert_data<M: MiddlewareError>(e: &M) -> Option<Vec<u8>> {
    e.as_error_response()
        .and_then(|rpc_err| rpc_err.as_revert_data())
        .map(|bytes| bytes.to_vec())
}

fn receipt_status(receipt: &ethers::types::TransactionReceipt) -> ReceiptStatus {
    if receipt.status == Some(U64::one()) {
        ReceiptStatus::Success
    } else {
        ReceiptStatus::Other("CONTRACT_REVERT_EXECUTED".to_string())
    }
}

fn record_from_receipt(
    receipt: &ethers::types::TransactionReceipt,
    return_bytes: Vec<u8>,
    created: Vec<EntityId>,
) -> TransactionRecord {
    TransactionRecord {
        transaction_id: format!("{:?}", receipt.transaction_hash),
        return_bytes,
        logs: receipt
            .logs
            .iter()
            .map(|log| LogEntry {
                data: log.data.to_vec(),
                topics: log.topics.clone(),
            })
            .collect(),
        created_contract_ids: created,
    }
}

#[async_trait]
impl LedgerClient for RelayClient {
    async fn create_contract(
        &self,
        bytecode: &[u8],
        gas: u64,
    ) -> Result<(TransactionReceipt, TransactionRecord), LedgerError> {
        let tx = Eip1559TransactionRequest::new()
            .from(self.operator_address)
            .data(Bytes::from(bytecode.to_vec()))
            .gas(gas);

        let receipt = self.send(tx).await?;

        let contract_id = receipt.contract_address.map(EntityId::from_evm_address);
        let created = contract_id.into_iter().collect();

        Ok((
            TransactionReceipt {
                status: receipt_status(&receipt),
                contract_id,
            },
            record_from_receipt(&receipt, Vec::new(), created),
        ))
    }

    async fn execute_contract(
        &self,
        contract: EntityId,
        gas: u64,
        call_data: &[u8],
        payable_tinybar: u64,
    ) -> Result<(TransactionReceipt, TransactionRecord), LedgerError> {
        let tx = Eip1559TransactionRequest::new()
            .from(self.operator_address)
            .to(contract.to_evm_address())
            .data(Bytes::from(call_data.to_vec()))
            .value(tinybar_to_wei(payable_tinybar))
            .gas(gas);

        let return_bytes = self.simulate(&tx).await;
        let receipt = self.send(tx).await?;

        Ok((
            TransactionReceipt {
                status: receipt_status(&receipt),
                contract_id: None,
            },
            record_from_receipt(&receipt, return_bytes, Vec::new()),
        ))
    }

    async fn call_query(
        &self,
        contract: EntityId,
        gas: u64,
        call_data: &[u8],
        _max_payment_tinybar: u64,
    ) -> Result<Vec<u8>, LedgerError> {
        let tx = Eip1559TransactionRequest::new()
            .from(self.operator_address)
            .to(contract.to_evm_address())
            .data(Bytes::from(call_data.to_vec()))
            .gas(gas);

        let typed = TypedTransaction::Eip1559(tx);
        self.client
            .call(&typed, None)
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|e| match revert_data(&e) {
                Some(revert) => LedgerError::Rejected {
                    reason: format!("query reverted: 0x{}", hex::encode(revert)),
                },
                None => LedgerError::Transport {
                    reason: e.to_string(),
                },
            })
    }
}

/// One-shot LOCAL bootstrap: generate a fresh operator key and fund it
/// from the local node's root credential.
async fn bootstrap_local_operator(
    provider: &Provider<Http>,
    profile: NetworkProfile,
) -> Result<LocalWallet> {
    let root = LOCAL_ROOT_KEY
        .parse::<LocalWallet>()
        .context("bad local root key")?
        .with_chain_id(profile.chain_id());
    let operator = LocalWallet::new(&mut rand::thread_rng()).with_chain_id(profile.chain_id());

    info!(
        "Provisioning local operator {:?} from root account",
        operator.address()
    );

    let root_client = SignerMiddleware::new(provider.clone(), root);
    let tx = Eip1559TransactionRequest::new()
        .to(operator.address())
        .value(tinybar_to_wei(LOCAL_BOOTSTRAP_HBAR * 100_000_000));

    root_client
        .send_transaction(tx, None)
        .await
        .context("local operator funding rejected")?
        .await
        .context("local operator funding dropped")?
        .context("local operator funding produced no receipt")?;

    Ok(operator)
}
