//! # Factory Harness
//!
//! Deploys a factory contract, drives it (and the child contracts it
//! spawns) through the ledger client seam, decodes returns and event logs
//! against the contract ABIs, and cross-checks indexed events via the
//! mirror-node REST API.

pub mod config;
pub mod deploy;
pub mod dispatch;
pub mod events;
pub mod mirror;
pub mod relay;
pub mod session;

pub use config::{child_schema, factory_schema, CHILD_CONTRACT, FACTORY_CONTRACT};
pub use deploy::{deploy_contract, ContractHandle};
pub use dispatch::{field, CallResult, CallReturn};
pub use events::{child_id_from_log, child_id_from_record};
pub use mirror::MirrorClient;
pub use relay::RelayClient;
pub use session::Session;
