//! # Ledger Core - Shared Utilities for the Factory Harness
//!
//! This crate provides the pieces shared by every binary and test in the
//! workspace: typed errors, entity-id handling, environment configuration,
//! ABI interface loading and event decoding, the ledger client seam, and
//! a bounded polling primitive.
//!
//! ## Modules
//!
//! - [`abi`] - Contract interface loading, encode/decode, event parsing
//! - [`config`] - Operator credentials and network profile selection
//! - [`entity`] - `shard.realm.num` entity identifiers
//! - [`error`] - Typed error handling with thiserror
//! - [`traits`] - The `LedgerClient` trait and receipt/record types
//! - [`utils`] - Logger setup and the bounded poller

pub mod abi;
pub mod config;
pub mod entity;
pub mod error;
pub mod traits;
pub(crate) mod utils;

pub use abi::{AbiScope, ContractInterface, DecodedEvent, ResultSchema};
pub use config::{NetworkProfile, OperatorConfig, PrivateKeyHex};
pub use entity::EntityId;
pub use error::{ConfigError, HarnessError, InterfaceError, LedgerError, MirrorError};
pub use traits::{
    LedgerClient, LogEntry, ReceiptStatus, TransactionReceipt, TransactionRecord,
};

// Utils are pub(crate) - only export the public surface
pub use utils::logger::setup_logger;
pub use utils::poll::{poll_until, PollConfig, PollOutcome};
