//! Contract interface loading and ABI encode/decode.
//!
//! A [`ContractInterface`] wraps one compiled artifact (`abi` + `bytecode`)
//! and exposes function encoding, result decoding, event parsing and the
//! structured-contract-error parsing path. Two instances exist per run, one
//! for the factory contract and one for the child contract type; call sites
//! pick one via [`AbiScope`].

use crate::error::InterfaceError;
use ethers::abi::{Abi, Function, RawLog, Token};
use ethers::types::H256;
use ethers::utils::keccak256;
use std::fmt;
use std::path::Path;

/// Which of the two loaded interfaces a call targets. Deliberately a closed
/// two-variant enum: the factory/child split is fixed, not extensible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbiScope {
    Factory,
    Child,
}

/// An event decoded against the ABI: ordered, named, typed fields.
#[derive(Debug, Clone)]
pub struct DecodedEvent {
    pub name: String,
    pub fields: Vec<(String, Token)>,
}

impl DecodedEvent {
    pub fn field(&self, name: &str) -> Option<&Token> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }
}

/// A structured contract error recovered from revert bytes.
#[derive(Debug, Clone)]
pub struct DecodedError {
    pub name: String,
    pub fields: Vec<Token>,
}

impl fmt::Display for DecodedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.name, self.fields)
    }
}

/// Declared result shape per function/event, checked against the loaded ABI
/// at startup so a field-name typo fails before the first network call.
#[derive(Debug, Default, Clone)]
pub struct ResultSchema {
    functions: Vec<(String, Vec<String>)>,
    events: Vec<(String, Vec<String>)>,
}

impl ResultSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn function(mut self, name: &str, output_names: &[&str]) -> Self {
        self.functions.push((
            name.to_string(),
            output_names.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn event(mut self, name: &str, field_names: &[&str]) -> Self {
        self.events.push((
            name.to_string(),
            field_names.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }
}

/// One contract's ABI plus deployment bytecode, loaded from a hardhat-style
/// artifact (`{dir}/{name}.sol/{name}.json`).
#[derive(Debug, Clone)]
pub struct ContractInterface {
    name: String,
    abi: Abi,
    bytecode: String,
}

impl ContractInterface {
    pub fn load(name: &str, artifacts_dir: &Path) -> Result<Self, InterfaceError> {
        let path = artifacts_dir.join(format!("{name}.sol")).join(format!("{name}.json"));
        let display = path.display().to_string();

        let raw = std::fs::read_to_string(&path).map_err(|_| InterfaceError::ArtifactMissing {
            path: display.clone(),
        })?;
        let artifact: serde_json::Value =
            serde_json::from_str(&raw).map_err(|e| InterfaceError::ArtifactMalformed {
                path: display.clone(),
                reason: e.to_string(),
            })?;

        let abi_value = artifact
            .get("abi")
            .cloned()
            .ok_or_else(|| InterfaceError::ArtifactMalformed {
                path: display.clone(),
                reason: "missing 'abi' field".to_string(),
            })?;
        let abi: Abi =
            serde_json::from_value(abi_value).map_err(|e| InterfaceError::ArtifactMalformed {
                path: display.clone(),
                reason: format!("bad abi: {e}"),
            })?;

        let bytecode = artifact
            .get("bytecode")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            name: name.to_string(),
            abi,
            bytecode,
        })
    }

    /// Loads the artifact and validates the declared result schema against
    /// it in one step.
    pub fn load_with_schema(
        name: &str,
        artifacts_dir: &Path,
        schema: &ResultSchema,
    ) -> Result<Self, InterfaceError> {
        let iface = Self::load(name, artifacts_dir)?;
        iface.validate_schema(schema)?;
        Ok(iface)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    /// Deployment bytecode as raw bytes (artifact stores it hex-encoded).
    pub fn bytecode_bytes(&self) -> Result<Vec<u8>, InterfaceError> {
        let stripped = self.bytecode.strip_prefix("0x").unwrap_or(&self.bytecode);
        hex::decode(stripped).map_err(|e| InterfaceError::ArtifactMalformed {
            path: self.name.clone(),
            reason: format!("bad bytecode hex: {e}"),
        })
    }

    fn function(&self, name: &str) -> Result<&Function, InterfaceError> {
        self.abi
            .function(name)
            .map_err(|_| InterfaceError::UnknownFunction {
                contract: self.name.clone(),
                name: name.to_string(),
            })
    }

    /// Encodes a call (selector + arguments) to `name`.
    pub fn encode_function(&self, name: &str, args: &[Token]) -> Result<Vec<u8>, InterfaceError> {
        let function = self.function(name)?;
        function
            .encode_input(args)
            .map_err(|source| InterfaceError::EncodeFailed {
                name: name.to_string(),
                source,
            })
    }

    /// Decodes return bytes of `name` into named output fields, in ABI
    /// declaration order.
    pub fn decode_function_result(
        &self,
        name: &str,
        data: &[u8],
    ) -> Result<Vec<(String, Token)>, InterfaceError> {
        let function = self.function(name)?;
        let tokens = function
            .decode_output(data)
            .map_err(|source| InterfaceError::DecodeFailed {
                name: name.to_string(),
                source,
            })?;
        Ok(function
            .outputs
            .iter()
            .map(|p| p.name.clone())
            .zip(tokens)
            .collect())
    }

    /// True when `name` returns at least one value.
    pub fn function_has_outputs(&self, name: &str) -> Result<bool, InterfaceError> {
        Ok(!self.function(name)?.outputs.is_empty())
    }

    /// Decodes a log against the named event. `topics` excludes the event
    /// signature topic; the caller has already stripped it.
    pub fn decode_event(
        &self,
        event_name: &str,
        data: &[u8],
        topics: &[H256],
    ) -> Result<DecodedEvent, InterfaceError> {
        let event = self
            .abi
            .event(event_name)
            .map_err(|_| InterfaceError::UnknownEvent {
                contract: self.name.clone(),
                name: event_name.to_string(),
            })?;

        let mut full_topics = Vec::with_capacity(topics.len() + 1);
        full_topics.push(event.signature());
        full_topics.extend_from_slice(topics);

        let log = event
            .parse_log(RawLog {
                topics: full_topics,
                data: data.to_vec(),
            })
            .map_err(|source| InterfaceError::EventMismatch {
                name: event_name.to_string(),
                source,
            })?;

        Ok(DecodedEvent {
            name: event.name.clone(),
            fields: log.params.into_iter().map(|p| (p.name, p.value)).collect(),
        })
    }

    /// Decodes a raw log whose first topic is the event signature, trying
    /// every event in the ABI (the mirror-node path).
    pub fn parse_log(
        &self,
        topics: Vec<H256>,
        data: Vec<u8>,
    ) -> Result<DecodedEvent, InterfaceError> {
        let signature = topics.first().copied();
        for event in self.abi.events() {
            if signature != Some(event.signature()) {
                continue;
            }
            let log = event
                .parse_log(RawLog {
                    topics: topics.clone(),
                    data: data.clone(),
                })
                .map_err(|source| InterfaceError::EventMismatch {
                    name: event.name.clone(),
                    source,
                })?;
            return Ok(DecodedEvent {
                name: event.name.clone(),
                fields: log.params.into_iter().map(|p| (p.name, p.value)).collect(),
            });
        }
        Err(InterfaceError::UnknownEvent {
            contract: self.name.clone(),
            name: signature
                .map(|s| format!("{s:#x}"))
                .unwrap_or_else(|| "<no topics>".to_string()),
        })
    }

    /// Attempts to decode revert bytes as one of the ABI's declared errors.
    /// Returns None when no declared error matches.
    pub fn parse_error(&self, data: &[u8]) -> Option<DecodedError> {
        if data.len() < 4 {
            return None;
        }
        for (name, overloads) in &self.abi.errors {
            for declared in overloads {
                let types: Vec<String> =
                    declared.inputs.iter().map(|p| p.kind.to_string()).collect();
                let selector = &keccak256(format!("{}({})", name, types.join(",")).as_bytes())[..4];
                if selector != &data[..4] {
                    continue;
                }
                let kinds: Vec<_> = declared.inputs.iter().map(|p| p.kind.clone()).collect();
                if let Ok(fields) = ethers::abi::decode(&kinds, &data[4..]) {
                    return Some(DecodedError {
                        name: name.clone(),
                        fields,
                    });
                }
            }
        }
        None
    }

    fn validate_schema(&self, schema: &ResultSchema) -> Result<(), InterfaceError> {
        for (fcn_name, expected) in &schema.functions {
            let function = self.function(fcn_name)?;
            let actual: Vec<&str> = function.outputs.iter().map(|p| p.name.as_str()).collect();
            if actual != expected.iter().map(String::as_str).collect::<Vec<_>>() {
                return Err(InterfaceError::SchemaMismatch {
                    contract: self.name.clone(),
                    reason: format!(
                        "function '{fcn_name}' outputs are {actual:?}, schema expects {expected:?}"
                    ),
                });
            }
        }
        for (event_name, expected) in &schema.events {
            let event =
                self.abi
                    .event(event_name)
                    .map_err(|_| InterfaceError::UnknownEvent {
                        contract: self.name.clone(),
                        name: event_name.clone(),
                    })?;
            let actual: Vec<&str> = event.inputs.iter().map(|p| p.name.as_str()).collect();
            if actual != expected.iter().map(String::as_str).collect::<Vec<_>>() {
                return Err(InterfaceError::SchemaMismatch {
                    contract: self.name.clone(),
                    reason: format!(
                        "event '{event_name}' fields are {actual:?}, schema expects {expected:?}"
                    ),
                });
            }
        }
        Ok(())
    }
}
