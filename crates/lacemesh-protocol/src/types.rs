//! Core peer identifier types

use crate::error::{ProtocolError, Result};
use crate::{PEER_NAME_SIZE, PEER_SHORT_ID_BITS};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const PEER_NAME_MASK: u64 = (1u64 << (8 * PEER_NAME_SIZE)) - 1;

/// Name of a peer in the mesh
///
/// Names are unique mesh-wide and totally ordered. The ordering is what the
/// route computation sorts by, so it must never depend on anything but the
/// encoded bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PeerName(u64);

impl PeerName {
    /// Sentinel meaning "no next hop": the destination is the local peer
    pub const UNKNOWN: PeerName = PeerName(0);

    /// Decode a name from its byte encoding
    ///
    /// Bytes are folded big-endian; only the trailing `PEER_NAME_SIZE` bytes
    /// contribute.
    pub fn from_bin(bytes: &[u8]) -> Self {
        let value = bytes
            .iter()
            .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte));
        PeerName(value & PEER_NAME_MASK)
    }

    /// Encode this name as fixed-width bytes
    pub fn to_bin(&self) -> [u8; PEER_NAME_SIZE] {
        let mut out = [0u8; PEER_NAME_SIZE];
        out.copy_from_slice(&self.0.to_be_bytes()[8 - PEER_NAME_SIZE..]);
        out
    }

    /// Check whether this is the `UNKNOWN` sentinel
    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }
}

impl fmt::Display for PeerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bin();
        for (i, byte) in bytes.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for PeerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerName({})", self)
    }
}

impl FromStr for PeerName {
    type Err = ProtocolError;

    /// Parse `aa:bb:cc:dd:ee:ff` or a bare 12-digit hex string
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| ProtocolError::InvalidPeerName(format!("{:?}: {}", s, reason));

        let digits = if s.contains(':') {
            let groups: Vec<&str> = s.split(':').collect();
            if groups.len() != PEER_NAME_SIZE || groups.iter().any(|g| g.len() != 2) {
                return Err(invalid("expected six colon-separated octets"));
            }
            groups.concat()
        } else {
            s.to_string()
        };

        let bytes = hex::decode(&digits).map_err(|e| invalid(&e.to_string()))?;
        if bytes.len() != PEER_NAME_SIZE {
            return Err(invalid(&format!(
                "expected {} bytes, got {}",
                PEER_NAME_SIZE,
                bytes.len()
            )));
        }

        Ok(PeerName::from_bin(&bytes))
    }
}

impl Serialize for PeerName {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeerName {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Random identifier of one incarnation of a peer
///
/// A peer that leaves and rejoins under the same name gets a fresh UID.
/// UID 0 is reserved for placeholder records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerUid(u64);

impl PeerUid {
    /// UID carried by placeholder records; never minted
    pub const PLACEHOLDER: PeerUid = PeerUid(0);

    pub fn from_u64(value: u64) -> Self {
        PeerUid(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn is_placeholder(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for PeerUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PeerUid {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        crate::identity::parse_peer_uid(s)
    }
}

/// Compact peer identifier for fast-path lookup tables
///
/// Only the low `PEER_SHORT_ID_BITS` bits are used. Short IDs are randomly
/// assigned and may collide; the peer registry detects and resolves that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct PeerShortId(u16);

impl PeerShortId {
    /// Largest representable short ID (4095)
    pub const MAX: u16 = (1 << PEER_SHORT_ID_BITS) - 1;

    /// Create a short ID, rejecting values wider than 12 bits
    pub fn new(value: u16) -> Result<Self> {
        if value > Self::MAX {
            return Err(ProtocolError::ShortIdOutOfRange(value));
        }
        Ok(PeerShortId(value))
    }

    /// Create a short ID from the low 12 bits of `value`
    pub fn from_masked(value: u16) -> Self {
        PeerShortId(value & Self::MAX)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for PeerShortId {
    type Error = ProtocolError;

    fn try_from(value: u16) -> Result<Self> {
        PeerShortId::new(value)
    }
}

impl From<PeerShortId> for u16 {
    fn from(id: PeerShortId) -> u16 {
        id.0
    }
}

impl fmt::Display for PeerShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifying information for a peer, as exchanged by gossip
///
/// The summary is replaced wholesale rather than edited; `version` is bumped
/// by the owner on every change and only the gossip layer interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeerSummary {
    #[serde(with = "hex_bytes")]
    pub name_bytes: Vec<u8>,
    pub nickname: String,
    pub uid: PeerUid,
    pub version: u64,
    pub short_id: PeerShortId,
    pub has_short_id: bool,
}

impl PeerSummary {
    /// Decode the peer name carried by this summary
    pub fn name(&self) -> PeerName {
        PeerName::from_bin(&self.name_bytes)
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_name_bin() {
        let bytes = [0x02, 0x42, 0xac, 0x11, 0x00, 0x02];
        let name = PeerName::from_bin(&bytes);

        assert_eq!(name.to_bin(), bytes);
        assert!(!name.is_unknown());
    }

    #[test]
    fn test_peer_name_from_long_bin_keeps_trailing_bytes() {
        let name = PeerName::from_bin(&[0xff, 0xff, 0, 0, 0, 0, 0, 7]);
        assert_eq!(name.to_bin(), [0, 0, 0, 0, 0, 7]);
    }

    #[test]
    fn test_unknown_name() {
        assert!(PeerName::UNKNOWN.is_unknown());
        assert_eq!(PeerName::from_bin(&[]), PeerName::UNKNOWN);
        assert_eq!(PeerName::default(), PeerName::UNKNOWN);
        assert_eq!(PeerName::UNKNOWN.to_string(), "00:00:00:00:00:00");
    }

    #[test]
    fn test_peer_name_parse() {
        let name: PeerName = "02:42:ac:11:00:02".parse().unwrap();
        assert_eq!(name.to_string(), "02:42:ac:11:00:02");

        let bare: PeerName = "0242ac110002".parse().unwrap();
        assert_eq!(name, bare);

        let upper: PeerName = "02:42:AC:11:00:02".parse().unwrap();
        assert_eq!(name, upper);
    }

    #[test]
    fn test_peer_name_parse_rejects_malformed() {
        for input in ["", "02:42", "02:42:ac:11:00:02:03", "0242ac11000", "zz:42:ac:11:00:02", "2:42:ac:11:00:002"] {
            assert!(
                matches!(input.parse::<PeerName>(), Err(ProtocolError::InvalidPeerName(_))),
                "{:?} should not parse",
                input
            );
        }
    }

    #[test]
    fn test_peer_name_ordering_follows_bytes() {
        let a = PeerName::from_bin(&[0, 0, 0, 0, 0, 0x0a]);
        let b = PeerName::from_bin(&[0, 0, 0, 0, 0, 0x0b]);
        let high = PeerName::from_bin(&[1, 0, 0, 0, 0, 0]);

        assert!(a < b);
        assert!(b < high);
        assert!(PeerName::UNKNOWN < a);
    }

    #[test]
    fn test_peer_name_serde_as_string() {
        let name: PeerName = "00:00:00:00:00:0a".parse().unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"00:00:00:00:00:0a\"");

        let back: PeerName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }

    #[test]
    fn test_short_id_range() {
        assert_eq!(PeerShortId::MAX, 4095);
        assert!(PeerShortId::new(0).is_ok());
        assert!(PeerShortId::new(4095).is_ok());
        assert_eq!(
            PeerShortId::new(4096),
            Err(ProtocolError::ShortIdOutOfRange(4096))
        );
        assert_eq!(PeerShortId::from_masked(0xffff).as_u16(), 4095);
        assert_eq!(PeerShortId::from_masked(0x1001).as_u16(), 1);
    }

    #[test]
    fn test_short_id_deserialize_rejects_wide_values() {
        assert!(serde_json::from_str::<PeerShortId>("4095").is_ok());
        assert!(serde_json::from_str::<PeerShortId>("4096").is_err());
    }

    #[test]
    fn test_peer_uid_placeholder() {
        assert!(PeerUid::PLACEHOLDER.is_placeholder());
        assert!(PeerUid::default().is_placeholder());
        assert!(!PeerUid::from_u64(1).is_placeholder());
        assert_eq!(PeerUid::from_u64(42).to_string(), "42");
    }

    #[test]
    fn test_summary_name() {
        let summary = PeerSummary {
            name_bytes: vec![0, 0, 0, 0, 0, 0x0c],
            nickname: "carol".to_string(),
            uid: PeerUid::from_u64(7),
            version: 3,
            short_id: PeerShortId::from_masked(12),
            has_short_id: true,
        };

        assert_eq!(summary.name().to_string(), "00:00:00:00:00:0c");
    }

    #[test]
    fn test_summary_serde_hex_name_bytes() {
        let summary = PeerSummary {
            name_bytes: vec![0xde, 0xad, 0xbe, 0xef, 0, 1],
            nickname: "dave".to_string(),
            uid: PeerUid::from_u64(99),
            version: 1,
            short_id: PeerShortId::from_masked(5),
            has_short_id: true,
        };

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["name_bytes"], "deadbeef0001");
        assert_eq!(value["uid"], 99);

        let back: PeerSummary = serde_json::from_value(value).unwrap();
        assert_eq!(back, summary);
    }
}
