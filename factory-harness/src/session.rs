//! The session context threaded through every operation.
//!
//! Replaces the globals the workflow would otherwise accumulate (shared
//! client handle, ABI singletons, "most recently created contract"): one
//! explicit object owns the client, both interfaces and the ids discovered
//! so far.

use crate::config::{self, child_schema, factory_schema, CHILD_CONTRACT, FACTORY_CONTRACT};
use crate::deploy::{deploy_contract, ContractHandle};
use crate::dispatch::{field, CallResult};
use anyhow::{Context, Result};
use ethers::abi::Token;
use ledger_core::{AbiScope, ContractInterface, EntityId, HarnessError, LedgerClient};
use std::path::Path;
use std::sync::Arc;

pub struct Session {
    client: Arc<dyn LedgerClient>,
    factory: ContractInterface,
    child: ContractInterface,
    pub factory_id: Option<EntityId>,
    pub children: Vec<EntityId>,
}

impl Session {
    /// Loads both interfaces (validating their result schemas) and binds
    /// the client. No network traffic happens here.
    pub fn new(client: Arc<dyn LedgerClient>, artifacts_dir: &Path) -> Result<Self, HarnessError> {
        let contracts_dir = artifacts_dir.join("contracts");
        let factory =
            ContractInterface::load_with_schema(FACTORY_CONTRACT, &contracts_dir, &factory_schema())?;
        let child =
            ContractInterface::load_with_schema(CHILD_CONTRACT, &contracts_dir, &child_schema())?;
        Ok(Self {
            client,
            factory,
            child,
            factory_id: None,
            children: Vec::new(),
        })
    }

    pub fn client(&self) -> &dyn LedgerClient {
        self.client.as_ref()
    }

    pub fn interface(&self, scope: AbiScope) -> &ContractInterface {
        match scope {
            AbiScope::Factory => &self.factory,
            AbiScope::Child => &self.child,
        }
    }

    /// The factory id, or an error when no deployment receipt has been
    /// seen yet. Calls must never race ahead of deployment.
    pub fn require_factory(&self) -> Result<EntityId> {
        self.factory_id
            .context("no factory contract deployed or registered in this session")
    }

    /// Deploys the factory from its artifact bytecode and records the
    /// resulting handle.
    pub async fn deploy_factory(&mut self, gas: u64) -> Result<ContractHandle> {
        let bytecode = self.factory.bytecode_bytes()?;
        let handle = deploy_contract(self.client.as_ref(), &bytecode, gas).await?;
        self.factory_id = Some(handle.contract_id);
        Ok(handle)
    }

    pub fn register_child(&mut self, id: EntityId) {
        self.children.push(id);
    }

    // Workflow helpers mirroring the original suite's call shapes.

    pub async fn create_contract(&self) -> Result<CallResult> {
        let factory = self.require_factory()?;
        self.execute(factory, config::gas::EXECUTE, "createContract", &[], AbiScope::Factory, 0)
            .await
    }

    pub async fn get_deployed_contracts(&self) -> Result<Vec<Token>> {
        let factory = self.require_factory()?;
        let fields = self
            .query(
                factory,
                config::gas::EXECUTE,
                "getDeployedContracts",
                &[],
                AbiScope::Factory,
                config::DEFAULT_MAX_QUERY_PAYMENT,
            )
            .await?;
        match field(&fields, "contracts") {
            Some(Token::Array(items)) => Ok(items.clone()),
            other => anyhow::bail!("unexpected 'contracts' shape: {other:?}"),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn add_student_via_factory(
        &self,
        contract_offset: u64,
        roll_no: u64,
        class: &str,
        fees: u64,
        id: u64,
        name: &str,
        marks: u64,
        result: u64,
    ) -> Result<CallResult> {
        let factory = self.require_factory()?;
        let args = [
            Token::Uint(contract_offset.into()),
            Token::Uint(roll_no.into()),
            Token::String(class.to_string()),
            Token::Uint(fees.into()),
            Token::Uint(id.into()),
            Token::String(name.to_string()),
            Token::Uint(marks.into()),
            Token::Uint(result.into()),
        ];
        self.execute(
            factory,
            config::gas::EXECUTE,
            "addStudentToContract",
            &args,
            AbiScope::Factory,
            0,
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn add_student_direct(
        &self,
        contract: EntityId,
        roll_no: u64,
        class: &str,
        fees: u64,
        id: u64,
        name: &str,
        marks: u64,
        result: u64,
    ) -> Result<CallResult> {
        let args = [
            Token::Uint(roll_no.into()),
            Token::String(class.to_string()),
            Token::Uint(fees.into()),
            Token::Uint(id.into()),
            Token::String(name.to_string()),
            Token::Uint(marks.into()),
            Token::Uint(result.into()),
        ];
        self.execute(
            contract,
            config::gas::EXECUTE,
            "addStudentDetails",
            &args,
            AbiScope::Child,
            0,
        )
        .await
    }

    /// Linear-scan lookup on the child contract.
    pub async fn get_student_by_id(&self, contract: EntityId, id: u64) -> Result<Token> {
        let fields = self
            .query(
                contract,
                config::gas::QUERY_SMALL,
                "getAllStudentsDetailsById",
                &[Token::Uint(id.into())],
                AbiScope::Child,
                config::DEFAULT_MAX_QUERY_PAYMENT,
            )
            .await?;
        field(&fields, "studentInfo")
            .cloned()
            .context("missing 'studentInfo' in result")
    }

    /// Mapping-based lookup on the child contract.
    pub async fn get_student_from_map(&self, contract: EntityId, id: u64) -> Result<Token> {
        let fields = self
            .query(
                contract,
                config::gas::QUERY_SMALL,
                "getStudentsFromMap",
                &[Token::Uint(id.into())],
                AbiScope::Child,
                config::DEFAULT_MAX_QUERY_PAYMENT,
            )
            .await?;
        field(&fields, "studentInfo")
            .cloned()
            .context("missing 'studentInfo' in result")
    }

    pub async fn get_students_direct(&self, contract: EntityId) -> Result<Vec<Token>> {
        let fields = self
            .query(
                contract,
                config::gas::QUERY_LIST,
                "getAllStudentsDetails",
                &[],
                AbiScope::Child,
                config::DEFAULT_MAX_QUERY_PAYMENT,
            )
            .await?;
        match field(&fields, "studentList") {
            Some(Token::Array(items)) => Ok(items.clone()),
            other => anyhow::bail!("unexpected 'studentList' shape: {other:?}"),
        }
    }

    pub async fn get_students_via_factory(&self, contract_offset: u64) -> Result<Vec<Token>> {
        let factory = self.require_factory()?;
        let fields = self
            .query(
                factory,
                config::gas::QUERY_LIST,
                "getStudents",
                &[Token::Uint(contract_offset.into())],
                AbiScope::Factory,
                config::DEFAULT_MAX_QUERY_PAYMENT,
            )
            .await?;
        match field(&fields, "students") {
            Some(Token::Array(items)) => Ok(items.clone()),
            other => anyhow::bail!("unexpected 'students' shape: {other:?}"),
        }
    }
}
