//! `shard.realm.num` entity identifiers and their EVM address form.
//!
//! The ledger assigns every contract and account a triplet id. The EVM side
//! of the network sees the same number as a 20-byte "long zero" address:
//! 4 bytes of shard, 8 bytes of realm, 8 bytes of entity number. Both forms
//! encode the same fixed-width integer, so the mapping is bidirectional.

use crate::error::ConfigError;
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    pub shard: u32,
    pub realm: u64,
    pub num: u64,
}

impl EntityId {
    pub fn new(shard: u32, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }

    /// The 20-byte EVM address carrying this id (long-zero form).
    pub fn to_evm_address(&self) -> Address {
        let mut bytes = [0u8; 20];
        bytes[0..4].copy_from_slice(&self.shard.to_be_bytes());
        bytes[4..12].copy_from_slice(&self.realm.to_be_bytes());
        bytes[12..20].copy_from_slice(&self.num.to_be_bytes());
        Address::from(bytes)
    }

    /// Hex string form of [`to_evm_address`](Self::to_evm_address), without
    /// a `0x` prefix, as the ledger SDKs print it.
    pub fn to_solidity_address(&self) -> String {
        hex::encode(self.to_evm_address().as_bytes())
    }

    pub fn from_evm_address(address: Address) -> Self {
        let bytes = address.as_fixed_bytes();
        let mut shard = [0u8; 4];
        let mut realm = [0u8; 8];
        let mut num = [0u8; 8];
        shard.copy_from_slice(&bytes[0..4]);
        realm.copy_from_slice(&bytes[4..12]);
        num.copy_from_slice(&bytes[12..20]);
        Self {
            shard: u32::from_be_bytes(shard),
            realm: u64::from_be_bytes(realm),
            num: u64::from_be_bytes(num),
        }
    }

    /// Parses a hex address string (with or without `0x`) into an id.
    pub fn from_solidity_address(address: &str) -> Result<Self, ConfigError> {
        let stripped = address.strip_prefix("0x").unwrap_or(address);
        let bytes = hex::decode(stripped).map_err(|_| ConfigError::InvalidEntityId {
            value: address.to_string(),
        })?;
        if bytes.len() != 20 {
            return Err(ConfigError::InvalidEntityId {
                value: address.to_string(),
            });
        }
        Ok(Self::from_evm_address(Address::from_slice(&bytes)))
    }

    /// True when the string is a well-formed `shard.realm.num` id with an
    /// assigned (non-zero) entity number.
    pub fn is_assigned_id(s: &str) -> bool {
        matches!(s.parse::<EntityId>(), Ok(id) if id.num > 0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for EntityId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidEntityId {
            value: s.to_string(),
        };
        let mut parts = s.split('.');
        let shard = parts.next().ok_or_else(invalid)?;
        let realm = parts.next().ok_or_else(invalid)?;
        let num = parts.next().ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self {
            shard: shard.parse().map_err(|_| invalid())?,
            realm: realm.parse().map_err(|_| invalid())?,
            num: num.parse().map_err(|_| invalid())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        let id: EntityId = "0.0.4851717".parse().unwrap();
        assert_eq!(id, EntityId::new(0, 0, 4851717));
        assert_eq!(id.to_string(), "0.0.4851717");
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!("0.0".parse::<EntityId>().is_err());
        assert!("0.0.1.2".parse::<EntityId>().is_err());
        assert!("0.x.1".parse::<EntityId>().is_err());
        assert!("".parse::<EntityId>().is_err());
    }

    #[test]
    fn solidity_address_round_trip() {
        let id = EntityId::new(0, 0, 1234);
        let addr = id.to_solidity_address();
        assert_eq!(addr.len(), 40);
        assert_eq!(addr, "00000000000000000000000000000000000004d2");
        let back = EntityId::from_solidity_address(&addr).unwrap();
        assert_eq!(back, id);
        let prefixed = EntityId::from_solidity_address(&format!("0x{addr}")).unwrap();
        assert_eq!(prefixed, id);
    }

    #[test]
    fn nonzero_shard_and_realm_survive_conversion() {
        let id = EntityId::new(1, 2, 3);
        assert_eq!(EntityId::from_evm_address(id.to_evm_address()), id);
    }

    #[test]
    fn assigned_id_check() {
        assert!(EntityId::is_assigned_id("0.0.1001"));
        assert!(!EntityId::is_assigned_id("0.0.0"));
        assert!(!EntityId::is_assigned_id("not-an-id"));
    }

    #[test]
    fn rejects_short_addresses() {
        assert!(EntityId::from_solidity_address("0xdeadbeef").is_err());
    }
}
