//! # Harness Error Types
//!
//! Centralized error definitions for the workspace, one enum per failure
//! family from the harness' taxonomy: configuration, ABI/interface, ledger
//! and mirror-node errors.

use thiserror::Error;

/// Unified error type wrapping the per-family enums.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    Interface(InterfaceError),

    #[error(transparent)]
    Ledger(LedgerError),

    #[error("Mirror node error: {0}")]
    Mirror(MirrorError),
}

impl From<ConfigError> for HarnessError {
    fn from(e: ConfigError) -> Self {
        HarnessError::Config(e)
    }
}

impl From<InterfaceError> for HarnessError {
    fn from(e: InterfaceError) -> Self {
        HarnessError::Interface(e)
    }
}

impl From<LedgerError> for HarnessError {
    fn from(e: LedgerError) -> Self {
        HarnessError::Ledger(e)
    }
}

impl From<MirrorError> for HarnessError {
    fn from(e: MirrorError) -> Self {
        HarnessError::Mirror(e)
    }
}

/// Configuration errors. Always raised before any network call.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Missing required environment variable: '{name}'")]
    MissingEnv { name: String },

    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("Unknown environment '{value}': must be TEST, MAIN or LOCAL")]
    UnknownEnvironment { value: String },

    #[error("Invalid entity id '{value}': expected shard.realm.num")]
    InvalidEntityId { value: String },
}

/// ABI interface and decode errors.
#[derive(Error, Debug)]
pub enum InterfaceError {
    #[error("Contract artifact not found at {path}")]
    ArtifactMissing { path: String },

    #[error("Malformed artifact {path}: {reason}")]
    ArtifactMalformed { path: String, reason: String },

    #[error("Function '{name}' is not defined in the {contract} ABI")]
    UnknownFunction { contract: String, name: String },

    #[error("Event '{name}' is not defined in the {contract} ABI")]
    UnknownEvent { contract: String, name: String },

    #[error("Schema mismatch for '{contract}': {reason}")]
    SchemaMismatch { contract: String, reason: String },

    #[error("Failed to encode call to '{name}': {source}")]
    EncodeFailed {
        name: String,
        #[source]
        source: ethers::abi::Error,
    },

    #[error("Failed to decode output of '{name}': {source}")]
    DecodeFailed {
        name: String,
        #[source]
        source: ethers::abi::Error,
    },

    #[error("Log did not match event '{name}': {source}")]
    EventMismatch {
        name: String,
        #[source]
        source: ethers::abi::Error,
    },
}

/// Ledger/network errors: transaction rejected, receipt non-success, RPC
/// transport failure. Propagated to the caller, never retried implicitly.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Transaction rejected by the network: {reason}")]
    Rejected { reason: String },

    #[error("Receipt status {status} for transaction {transaction_id}")]
    NonSuccessStatus {
        transaction_id: String,
        status: String,
    },

    #[error("Transaction {transaction_id} was dropped before inclusion")]
    Dropped { transaction_id: String },

    #[error("Deployment receipt carried no contract id")]
    MissingContractId,

    #[error("RPC transport failure: {reason}")]
    Transport { reason: String },
}

/// Mirror-node query errors. Caught at the poller boundary and logged;
/// never affect the outcome of any other operation.
#[derive(Error, Debug, Clone)]
pub enum MirrorError {
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("Unparseable response from {url}: {reason}")]
    BadPayload { url: String, reason: String },
}
