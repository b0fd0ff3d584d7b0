//! Operator credentials and network profile selection.
//!
//! Everything here is resolved from the environment before the first network
//! call; a missing or unrecognized value is a fatal [`ConfigError`].

use crate::entity::EntityId;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const ENV_ACCOUNT_ID: &str = "MYACCOUNT_ID";
pub const ENV_PRIVATE_KEY: &str = "MYACCOUNT_PVKEY";
pub const ENV_ENVIRONMENT: &str = "ENVIRONMENT";
pub const ENV_FACTORY_CONTRACT_ID: &str = "FACTORY_CONTACT_ID";

/// Root credential of the local node, used once to fund a fresh operator
/// when running against the LOCAL profile.
pub const LOCAL_ROOT_ACCOUNT: &str = "0.0.2";
pub const LOCAL_ROOT_KEY: &str =
    "105d050185ccb907fba04536ff8da2fb4d16c7b1f44ddad9c7f9401945dd0e51";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkProfile {
    Test,
    Main,
    Local,
}

impl NetworkProfile {
    /// JSON-RPC relay endpoint for this profile.
    pub fn relay_url(&self) -> &'static str {
        match self {
            NetworkProfile::Test => "https://testnet.hashio.io/api",
            NetworkProfile::Main => "https://mainnet.hashio.io/api",
            NetworkProfile::Local => "http://127.0.0.1:7546",
        }
    }

    /// Mirror-node REST base URL for this profile.
    pub fn mirror_base_url(&self) -> &'static str {
        match self {
            NetworkProfile::Test => "https://testnet.mirrornode.hedera.com",
            NetworkProfile::Main => "https://mainnet-public.mirrornode.hedera.com",
            NetworkProfile::Local => "http://localhost:5551",
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            NetworkProfile::Test => 296,
            NetworkProfile::Main => 295,
            NetworkProfile::Local => 298,
        }
    }
}

impl fmt::Display for NetworkProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkProfile::Test => write!(f, "TEST"),
            NetworkProfile::Main => write!(f, "MAIN"),
            NetworkProfile::Local => write!(f, "LOCAL"),
        }
    }
}

impl FromStr for NetworkProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TEST" => Ok(NetworkProfile::Test),
            "MAIN" => Ok(NetworkProfile::Main),
            "LOCAL" => Ok(NetworkProfile::Local),
            other => Err(ConfigError::UnknownEnvironment {
                value: other.to_string(),
            }),
        }
    }
}

/// Hex-encoded private key, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKeyHex(String);

impl PrivateKeyHex {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Never print key material.
impl fmt::Debug for PrivateKeyHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKeyHex(***)")
    }
}

/// Operator identity plus the selected network profile. Loaded once at
/// process start; immutable afterwards.
#[derive(Debug, Clone)]
pub struct OperatorConfig {
    pub account_id: EntityId,
    pub private_key: PrivateKeyHex,
    pub profile: NetworkProfile,
}

impl OperatorConfig {
    /// Reads `MYACCOUNT_ID`, `MYACCOUNT_PVKEY` and `ENVIRONMENT`, failing
    /// fast on anything missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let account_raw = required_env(ENV_ACCOUNT_ID)?;
        let key_raw = required_env(ENV_PRIVATE_KEY)?;
        let env_raw = required_env(ENV_ENVIRONMENT)?;

        let account_id = account_raw
            .parse::<EntityId>()
            .map_err(|_| ConfigError::InvalidValue {
                name: ENV_ACCOUNT_ID.to_string(),
                reason: format!("'{account_raw}' is not a shard.realm.num id"),
            })?;
        let profile = env_raw.parse::<NetworkProfile>()?;

        Ok(Self {
            account_id,
            private_key: PrivateKeyHex::new(key_raw),
            profile,
        })
    }

    /// The deployed factory id for the interact path, from
    /// `FACTORY_CONTACT_ID`.
    pub fn factory_contract_id() -> Result<EntityId, ConfigError> {
        let raw = required_env(ENV_FACTORY_CONTRACT_ID)?;
        raw.parse::<EntityId>()
            .map_err(|_| ConfigError::InvalidValue {
                name: ENV_FACTORY_CONTRACT_ID.to_string(),
                reason: format!("'{raw}' is not a shard.realm.num id"),
            })
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingEnv {
            name: name.to_string(),
        }),
    }
}
