//! Contract deployment: submit bytecode, await the receipt, extract the id.

use anyhow::{bail, Result};
use ledger_core::{EntityId, LedgerClient, ReceiptStatus};
use tracing::info;

/// A deployed contract: ledger id plus the derived 20-byte address form.
#[derive(Debug, Clone)]
pub struct ContractHandle {
    pub contract_id: EntityId,
    pub solidity_address: String,
}

/// Submits `bytecode` with `gas` and returns the new contract's handle.
/// Network rejection or a non-success receipt propagates; there is no
/// retry here, the caller decides whether to re-invoke.
pub async fn deploy_contract(
    client: &dyn LedgerClient,
    bytecode: &[u8],
    gas: u64,
) -> Result<ContractHandle> {
    info!("- Deploying contract ({} bytes of bytecode), gas@ {}", bytecode.len(), gas);

    let (receipt, record) = client.create_contract(bytecode, gas).await?;

    if let ReceiptStatus::Other(status) = &receipt.status {
        bail!(
            "deployment transaction {} finished with status {}",
            record.transaction_id,
            status
        );
    }
    let Some(contract_id) = receipt.contract_id else {
        bail!("deployment receipt carried no contract id");
    };

    let handle = ContractHandle {
        contract_id,
        solidity_address: contract_id.to_solidity_address(),
    };

    info!("TransactionId: {}", record.transaction_id);
    info!(
        "Contract created with ID: {} / {}",
        handle.contract_id, handle.solidity_address
    );

    Ok(handle)
}

/// Deploys from a raw solc `.bin` file (hex, no `0x` prefix).
pub async fn deploy_from_bin_file(
    client: &dyn LedgerClient,
    path: &std::path::Path,
    gas: u64,
) -> Result<ContractHandle> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read bytecode file {}: {e}", path.display()))?;
    let bytecode = hex::decode(raw.trim().trim_start_matches("0x"))
        .map_err(|e| anyhow::anyhow!("bad bytecode hex in {}: {e}", path.display()))?;
    deploy_contract(client, &bytecode, gas).await
}
