//! In-memory ledger used by the integration tests.
//!
//! Implements `LedgerClient` ABI-faithfully: calls are dispatched by
//! selector, inputs decoded against the real artifacts, and returns and
//! logs ABI-encoded, so the harness' encode/decode paths are exercised
//! end to end without a network.

use async_trait::async_trait;
use ethers::abi::{Function, Token};
use ethers::utils::keccak256;
use ledger_core::{
    ContractInterface, EntityId, LedgerClient, LedgerError, LogEntry, ReceiptStatus,
    TransactionReceipt, TransactionRecord,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

const FIRST_ENTITY_NUM: u64 = 2001;

pub struct MockLedger {
    factory: ContractInterface,
    child: ContractInterface,
    state: Mutex<State>,
}

struct State {
    next_num: u64,
    tx_counter: u64,
    submissions: u64,
    contracts: HashMap<EntityId, Entry>,
}

enum Entry {
    Factory { children: Vec<EntityId> },
    /// Students stored in call-argument order:
    /// (rollNo, class, fees, id, name, marks, result)
    Child { students: Vec<Vec<Token>> },
}

impl MockLedger {
    pub fn new(artifacts_dir: &Path) -> Self {
        let contracts_dir = artifacts_dir.join("contracts");
        Self {
            factory: ContractInterface::load("FactoryContract", &contracts_dir)
                .expect("factory artifact"),
            child: ContractInterface::load("StudentNestedContract", &contracts_dir)
                .expect("child artifact"),
            state: Mutex::new(State {
                next_num: FIRST_ENTITY_NUM,
                tx_counter: 0,
                submissions: 0,
                contracts: HashMap::new(),
            }),
        }
    }

    fn find_function<'a>(iface: &'a ContractInterface, selector: &[u8]) -> Option<&'a Function> {
        iface
            .abi()
            .functions()
            .find(|f| f.short_signature() == selector)
    }

    fn resolve(&self, call_data: &[u8]) -> Result<(&Function, Vec<Token>), LedgerError> {
        if call_data.len() < 4 {
            return Err(LedgerError::Rejected {
                reason: "call data shorter than a selector".to_string(),
            });
        }
        let selector = &call_data[..4];
        let function = Self::find_function(&self.factory, selector)
            .or_else(|| Self::find_function(&self.child, selector))
            .ok_or_else(|| LedgerError::Rejected {
                reason: format!("unknown selector 0x{}", hex::encode(selector)),
            })?;
        let args = function
            .decode_input(&call_data[4..])
            .map_err(|e| LedgerError::Rejected {
                reason: format!("undecodable call data: {e}"),
            })?;
        Ok((function, args))
    }

    /// How many submissions this ledger has seen, across all call kinds.
    pub fn submissions(&self) -> u64 {
        self.state.lock().unwrap().submissions
    }

    fn success_receipt() -> TransactionReceipt {
        TransactionReceipt {
            status: ReceiptStatus::Success,
            contract_id: None,
        }
    }
}

impl State {
    fn allocate(&mut self) -> EntityId {
        let id = EntityId::new(0, 0, self.next_num);
        self.next_num += 1;
        id
    }

    fn transaction_id(&mut self) -> String {
        self.tx_counter += 1;
        format!("0.0.2@1700000000.{:09}", self.tx_counter)
    }

    fn child_students(&mut self, id: EntityId) -> Result<&mut Vec<Vec<Token>>, LedgerError> {
        match self.contracts.get_mut(&id) {
            Some(Entry::Child { students }) => Ok(students),
            _ => Err(LedgerError::Rejected {
                reason: format!("no child contract at {id}"),
            }),
        }
    }

    fn factory_children(&self, id: EntityId) -> Result<&Vec<EntityId>, LedgerError> {
        match self.contracts.get(&id) {
            Some(Entry::Factory { children }) => Ok(children),
            _ => Err(LedgerError::Rejected {
                reason: format!("no factory contract at {id}"),
            }),
        }
    }
}

fn student_tuple(args: &[Token]) -> Token {
    Token::Tuple(args.to_vec())
}

fn student_id(student: &[Token]) -> Option<&Token> {
    student.get(3)
}

fn revert_bytes(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut bytes = keccak256(signature.as_bytes())[..4].to_vec();
    bytes.extend(ethers::abi::encode(args));
    bytes
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn create_contract(
        &self,
        bytecode: &[u8],
        _gas: u64,
    ) -> Result<(TransactionReceipt, TransactionRecord), LedgerError> {
        if bytecode.is_empty() {
            return Err(LedgerError::Rejected {
                reason: "empty bytecode".to_string(),
            });
        }
        let mut state = self.state.lock().unwrap();
        state.submissions += 1;
        let id = state.allocate();
        state.contracts.insert(id, Entry::Factory { children: vec![] });
        let transaction_id = state.transaction_id();

        Ok((
            TransactionReceipt {
                status: ReceiptStatus::Success,
                contract_id: Some(id),
            },
            TransactionRecord {
                transaction_id,
                return_bytes: Vec::new(),
                logs: Vec::new(),
                created_contract_ids: vec![id],
            },
        ))
    }

    async fn execute_contract(
        &self,
        contract: EntityId,
        _gas: u64,
        call_data: &[u8],
        _payable_tinybar: u64,
    ) -> Result<(TransactionReceipt, TransactionRecord), LedgerError> {
        let (function, args) = self.resolve(call_data)?;
        let mut state = self.state.lock().unwrap();
        state.submissions += 1;
        let transaction_id = state.transaction_id();

        match function.name.as_str() {
            "createContract" => {
                let child_id = state.allocate();
                match state.contracts.get_mut(&contract) {
                    Some(Entry::Factory { children }) => children.push(child_id),
                    _ => {
                        return Err(LedgerError::Rejected {
                            reason: format!("no factory contract at {contract}"),
                        })
                    }
                }
                state
                    .contracts
                    .insert(child_id, Entry::Child { students: vec![] });

                let event = self.factory.abi().event("ContractCreated").unwrap();
                let log = LogEntry {
                    data: ethers::abi::encode(&[Token::Address(child_id.to_evm_address())]),
                    topics: vec![event.signature()],
                };

                Ok((
                    Self::success_receipt(),
                    TransactionRecord {
                        transaction_id,
                        return_bytes: Vec::new(),
                        logs: vec![log],
                        created_contract_ids: vec![child_id],
                    },
                ))
            }
            "addStudentToContract" => {
                let offset = match &args[0] {
                    Token::Uint(v) => v.as_usize(),
                    _ => unreachable!("offset is uint256"),
                };
                let children = state.factory_children(contract)?.clone();
                if offset >= children.len() {
                    // Mirrors an on-chain revert with a declared error
                    let bytes = revert_bytes(
                        "ContractOffsetOutOfRange(uint256,uint256)",
                        &[
                            Token::Uint(offset.into()),
                            Token::Uint(children.len().into()),
                        ],
                    );
                    return Ok((
                        TransactionReceipt {
                            status: ReceiptStatus::Other("CONTRACT_REVERT_EXECUTED".to_string()),
                            contract_id: None,
                        },
                        TransactionRecord {
                            transaction_id,
                            return_bytes: bytes,
                            logs: Vec::new(),
                            created_contract_ids: Vec::new(),
                        },
                    ));
                }
                let target = children[offset];
                state.child_students(target)?.push(args[1..].to_vec());
                Ok((
                    Self::success_receipt(),
                    TransactionRecord {
                        transaction_id,
                        return_bytes: Vec::new(),
                        logs: Vec::new(),
                        created_contract_ids: Vec::new(),
                    },
                ))
            }
            "addStudentDetails" => {
                state.child_students(contract)?.push(args.to_vec());
                Ok((
                    Self::success_receipt(),
                    TransactionRecord {
                        transaction_id,
                        return_bytes: Vec::new(),
                        logs: Vec::new(),
                        created_contract_ids: Vec::new(),
                    },
                ))
            }
            other => Err(LedgerError::Rejected {
                reason: format!("'{other}' is not a mutating function"),
            }),
        }
    }

    async fn call_query(
        &self,
        contract: EntityId,
        _gas: u64,
        call_data: &[u8],
        _max_payment_tinybar: u64,
    ) -> Result<Vec<u8>, LedgerError> {
        let (function, args) = self.resolve(call_data)?;
        let mut state = self.state.lock().unwrap();
        state.submissions += 1;

        match function.name.as_str() {
            "getDeployedContracts" => {
                let addresses = state
                    .factory_children(contract)?
                    .iter()
                    .map(|id| Token::Address(id.to_evm_address()))
                    .collect();
                Ok(ethers::abi::encode(&[Token::Array(addresses)]))
            }
            "getStudents" => {
                let offset = match &args[0] {
                    Token::Uint(v) => v.as_usize(),
                    _ => unreachable!("offset is uint256"),
                };
                let children = state.factory_children(contract)?.clone();
                let target = *children.get(offset).ok_or_else(|| LedgerError::Rejected {
                    reason: format!("offset {offset} out of range"),
                })?;
                let students = state
                    .child_students(target)?
                    .iter()
                    .map(|s| student_tuple(s))
                    .collect();
                Ok(ethers::abi::encode(&[Token::Array(students)]))
            }
            "getAllStudentsDetails" => {
                let students = state
                    .child_students(contract)?
                    .iter()
                    .map(|s| student_tuple(s))
                    .collect();
                Ok(ethers::abi::encode(&[Token::Array(students)]))
            }
            "getAllStudentsDetailsById" | "getStudentsFromMap" => {
                let wanted = &args[0];
                let students = state.child_students(contract)?;
                let found = students
                    .iter()
                    .find(|s| student_id(s.as_slice()) == Some(wanted))
                    .cloned()
                    .ok_or_else(|| LedgerError::Rejected {
                        reason: format!("query reverted: StudentNotFound({wanted})"),
                    })?;
                Ok(ethers::abi::encode(&[student_tuple(&found)]))
            }
            other => Err(LedgerError::Rejected {
                reason: format!("'{other}' is not a view function"),
            }),
        }
    }
}
