//! The seam between the harness and the ledger network.
//!
//! Everything that touches the network goes through [`LedgerClient`], so the
//! test suite can plug in an in-memory ledger while the binaries talk to a
//! real relay. Implementations submit exactly once per call; retrying is the
//! caller's decision, never the client's.

use crate::entity::EntityId;
use crate::error::LedgerError;
use async_trait::async_trait;
use ethers::types::H256;

/// Terminal status from a transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptStatus {
    Success,
    Other(String),
}

impl ReceiptStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ReceiptStatus::Success)
    }
}

impl std::fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReceiptStatus::Success => write!(f, "SUCCESS"),
            ReceiptStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Status confirmation for a submitted transaction.
#[derive(Debug, Clone)]
pub struct TransactionReceipt {
    pub status: ReceiptStatus,
    /// Set on contract-creation receipts.
    pub contract_id: Option<EntityId>,
}

/// One emitted log: raw data plus topic list, signature topic first.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub data: Vec<u8>,
    pub topics: Vec<H256>,
}

/// Detailed transaction outcome: return bytes and emitted logs.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub return_bytes: Vec<u8>,
    pub logs: Vec<LogEntry>,
    pub created_contract_ids: Vec<EntityId>,
}

#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submits bytecode with a constructor call and awaits the receipt and
    /// record. The receipt carries the new contract id on success.
    async fn create_contract(
        &self,
        bytecode: &[u8],
        gas: u64,
    ) -> Result<(TransactionReceipt, TransactionRecord), LedgerError>;

    /// Submits a mutating call, awaiting receipt (status) and record
    /// (return bytes, logs). `payable_tinybar` attaches value to the call.
    async fn execute_contract(
        &self,
        contract: EntityId,
        gas: u64,
        call_data: &[u8],
        payable_tinybar: u64,
    ) -> Result<(TransactionReceipt, TransactionRecord), LedgerError>;

    /// Submits a read-only call-query and returns the raw result bytes.
    /// No receipt is produced; `max_payment_tinybar` caps the query fee.
    async fn call_query(
        &self,
        contract: EntityId,
        gas: u64,
        call_data: &[u8],
        max_payment_tinybar: u64,
    ) -> Result<Vec<u8>, LedgerError>;
}
