//! Event-log consumers: child-address extraction and display formatting.

use anyhow::{Context, Result};
use ethers::abi::Token;
use ledger_core::{ContractInterface, DecodedEvent, EntityId, LogEntry};

/// Decodes a `ContractCreated` log from a transaction record and returns
/// the new child contract's ledger id. The record's topics carry the event
/// signature first; it is stripped before decoding, as the ABI expects
/// only the indexed-parameter topics.
pub fn child_id_from_log(factory: &ContractInterface, entry: &LogEntry) -> Result<EntityId> {
    let stripped = entry.topics.get(1..).unwrap_or(&[]);
    let event = factory.decode_event("ContractCreated", &entry.data, stripped)?;

    match event.field("newContract") {
        Some(Token::Address(addr)) => Ok(EntityId::from_evm_address(*addr)),
        other => anyhow::bail!("unexpected 'newContract' field in ContractCreated: {other:?}"),
    }
}

/// Extracts the child id from the first log of a record's log list.
pub fn child_id_from_record(
    factory: &ContractInterface,
    logs: &[LogEntry],
) -> Result<EntityId> {
    let first = logs.first().context("record carried no logs")?;
    child_id_from_log(factory, first)
}

/// Renders one decoded event argument. Raw-address forms (address tokens,
/// or hex strings of address width) become the ledger-native id string;
/// everything else uses its native display form.
pub fn format_event_arg(token: &Token) -> String {
    match token {
        Token::Address(addr) => EntityId::from_evm_address(*addr).to_string(),
        Token::String(s) if looks_like_address(s) => {
            match EntityId::from_solidity_address(s) {
                Ok(id) => id.to_string(),
                Err(_) => s.clone(),
            }
        }
        // Token's own Display renders integers as hex
        Token::Uint(v) | Token::Int(v) => v.to_string(),
        other => other.to_string(),
    }
}

/// One line per event, in the mirror check's output shape.
pub fn format_event_line(block_number: u64, tx_hash: &str, event: &DecodedEvent) -> String {
    let mut out = format!("Block: {block_number} : Tx Hash: {tx_hash} : Event: {} : ", event.name);
    for (i, (_, value)) in event.fields.iter().enumerate() {
        if i > 0 {
            out.push_str(" : ");
        }
        out.push_str(&format_event_arg(value));
    }
    out
}

fn looks_like_address(s: &str) -> bool {
    s.starts_with("0x") && s.len() == 42
}
