//! The contract-call dispatcher.
//!
//! One path for mutating calls (execute transaction, await receipt and
//! record, decode return bytes) and one for read-only calls (call-query,
//! decode directly). Decode outcomes are an explicit enum: an empty (`0x`)
//! return is "no data", not a failure, and anything else that fails to
//! decode is run through the ABI's error-parsing path before being
//! surfaced.

use crate::session::Session;
use anyhow::Result;
use ethers::abi::Token;
use ledger_core::abi::DecodedError;
use ledger_core::{AbiScope, ContractInterface, EntityId, ReceiptStatus, TransactionRecord};
use tracing::{info, warn};

/// Decoded outcome of one call.
#[derive(Debug)]
pub enum CallReturn {
    /// Named output fields in ABI order.
    Value(Vec<(String, Token)>),
    /// The contract returned `0x`.
    Empty,
    /// Return bytes existed but did not decode as the function's outputs.
    DecodeFailed {
        reason: String,
        parsed_error: Option<DecodedError>,
    },
}

impl CallReturn {
    pub fn is_empty(&self) -> bool {
        matches!(self, CallReturn::Empty)
    }

    pub fn value(&self) -> Option<&[(String, Token)]> {
        match self {
            CallReturn::Value(fields) => Some(fields),
            _ => None,
        }
    }
}

/// The (status, decoded value, record) triple produced per mutating call.
/// The decoded value is only meaningful when `status` is SUCCESS and the
/// function is non-void.
#[derive(Debug)]
pub struct CallResult {
    pub status: ReceiptStatus,
    pub ret: CallReturn,
    pub record: TransactionRecord,
}

/// Looks up a named output field in decoded results.
pub fn field<'a>(fields: &'a [(String, Token)], name: &str) -> Option<&'a Token> {
    fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
}

/// Decodes return bytes for `fcn`, classifying the outcome rather than
/// throwing: empty bytes are soft "no data".
pub(crate) fn decode_return(
    iface: &ContractInterface,
    fcn: &str,
    transaction_id: &str,
    bytes: &[u8],
) -> CallReturn {
    if bytes.is_empty() {
        // only worth a note when the function was supposed to return data
        if iface.function_has_outputs(fcn).unwrap_or(false) {
            info!("{} No data returned from contract - check the call", transaction_id);
        }
        return CallReturn::Empty;
    }
    match iface.decode_function_result(fcn, bytes) {
        Ok(fields) => CallReturn::Value(fields),
        Err(e) => {
            let parsed_error = iface.parse_error(bytes);
            match &parsed_error {
                Some(contract_error) => {
                    warn!("{} contract error: {}", transaction_id, contract_error)
                }
                None => warn!("{} decode error: {}", transaction_id, e),
            }
            CallReturn::DecodeFailed {
                reason: e.to_string(),
                parsed_error,
            }
        }
    }
}

impl Session {
    /// Mutating call: encode against the scoped ABI, submit exactly once,
    /// await receipt and record, decode the return bytes.
    pub async fn execute(
        &self,
        target: EntityId,
        gas: u64,
        fcn: &str,
        args: &[Token],
        scope: AbiScope,
        payable_tinybar: u64,
    ) -> Result<CallResult> {
        let iface = self.interface(scope);
        let call_data = iface.encode_function(fcn, args)?;

        let (receipt, record) = self
            .client()
            .execute_contract(target, gas, &call_data, payable_tinybar)
            .await?;

        let ret = decode_return(iface, fcn, &record.transaction_id, &record.return_bytes);

        Ok(CallResult {
            status: receipt.status,
            ret,
            record,
        })
    }

    /// Read-only call: encode, submit a call-query with a payment cap,
    /// decode the returned bytes directly. No receipt, no status.
    pub async fn query(
        &self,
        target: EntityId,
        gas: u64,
        fcn: &str,
        args: &[Token],
        scope: AbiScope,
        max_payment_tinybar: u64,
    ) -> Result<Vec<(String, Token)>> {
        let iface = self.interface(scope);
        let call_data = iface.encode_function(fcn, args)?;

        let bytes = self
            .client()
            .call_query(target, gas, &call_data, max_payment_tinybar)
            .await?;

        Ok(iface.decode_function_result(fcn, &bytes)?)
    }
}
