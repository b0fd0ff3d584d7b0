//! Contract names, default gas limits and the declared result schemas.

use ledger_core::ResultSchema;

pub const FACTORY_CONTRACT: &str = "FactoryContract";
pub const CHILD_CONTRACT: &str = "StudentNestedContract";

/// Gas limits from the original workload, caller-overridable per call.
pub mod gas {
    pub const DEPLOY: u64 = 1_200_000;
    pub const EXECUTE: u64 = 500_000;
    pub const QUERY_SMALL: u64 = 100_000;
    pub const QUERY_LIST: u64 = 200_000;
}

/// Default max query payment, in tinybar (2 hbar).
pub const DEFAULT_MAX_QUERY_PAYMENT: u64 = 200_000_000;

/// Output/field names the harness indexes into, validated against the
/// loaded ABI before the first network call.
pub fn factory_schema() -> ResultSchema {
    ResultSchema::new()
        .function("getDeployedContracts", &["contracts"])
        .function("getStudents", &["students"])
        .event("ContractCreated", &["newContract"])
}

pub fn child_schema() -> ResultSchema {
    ResultSchema::new()
        .function("getAllStudentsDetailsById", &["studentInfo"])
        .function("getStudentsFromMap", &["studentInfo"])
        .function("getAllStudentsDetails", &["studentList"])
}
