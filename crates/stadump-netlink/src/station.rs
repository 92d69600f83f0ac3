use std::fmt;

use serde::{Serialize, Serializer};

use crate::attrs::{self, AttrPolicy, NlAttrSlice};
use crate::error::DecodeError;
use crate::nl80211::*;

/// Reported when the kernel omits `NL80211_STA_INFO_INACTIVE_TIME`.
pub const INACTIVE_UNREPORTED: i32 = -1;

const STA_INFO_POLICY: [AttrPolicy; 2] = [
    AttrPolicy {
        nla_type: NL80211_STA_INFO_INACTIVE_TIME,
        min_len: 4,
    },
    AttrPolicy {
        nla_type: NL80211_STA_INFO_STA_FLAGS,
        min_len: STA_FLAG_UPDATE_LEN,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddr(pub [u8; ETH_ALEN]);

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl TryFrom<&[u8]> for MacAddr {
    type Error = DecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        bytes
            .get(..ETH_ALEN)
            .and_then(|b| b.try_into().ok())
            .map(MacAddr)
            .ok_or(DecodeError::InvalidMac { len: bytes.len() })
    }
}

/// `struct nl80211_sta_flag_update`.
///
/// A bit is only meaningful when it is present in `mask`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StationFlags {
    pub mask: u32,
    pub set: u32,
}

impl StationFlags {
    fn from_payload(payload: &[u8]) -> Option<Self> {
        let mask = u32::from_ne_bytes(payload.get(0..4)?.try_into().ok()?);
        let set = u32::from_ne_bytes(payload.get(4..8)?.try_into().ok()?);
        Some(Self { mask, set })
    }

    /// True only when the kernel reports the flag and it is on. Unknown reads
    /// as false.
    pub fn is_set(&self, flag: u32) -> bool {
        let bit = sta_flag_bit(flag);
        self.mask & bit != 0 && self.set & bit != 0
    }
}

/// One associated station, as printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StationRecord {
    pub mac: MacAddr,
    pub authenticated: bool,
    pub authorized: bool,
    /// Milliseconds since last activity, or [`INACTIVE_UNREPORTED`].
    pub inactive_ms: i32,
}

impl StationRecord {
    /// Decode the top-level attributes of one `NL80211_CMD_NEW_STATION` reply.
    pub fn decode(top: &[NlAttrSlice<'_>]) -> Result<Self, DecodeError> {
        let sta_info =
            attrs::find(top, NL80211_ATTR_STA_INFO).ok_or(DecodeError::MissingStationInfo)?;
        let sta_attrs = attrs::parse_nested_with_policy(sta_info.payload, &STA_INFO_POLICY)?;

        let mac = attrs::find(top, NL80211_ATTR_MAC).ok_or(DecodeError::MissingMac)?;
        let mac = MacAddr::try_from(mac.payload)?;

        // u32 on the wire; the printed field is signed
        let inactive_ms = attrs::find(&sta_attrs, NL80211_STA_INFO_INACTIVE_TIME)
            .and_then(|a| a.u32_ne())
            .map(|v| v as i32)
            .unwrap_or(INACTIVE_UNREPORTED);

        let flags = attrs::find(&sta_attrs, NL80211_STA_INFO_STA_FLAGS)
            .and_then(|a| StationFlags::from_payload(a.payload))
            .unwrap_or_default();

        Ok(Self {
            mac,
            authenticated: flags.is_set(NL80211_STA_FLAG_AUTHENTICATED),
            authorized: flags.is_set(NL80211_STA_FLAG_AUTHORIZED),
            inactive_ms,
        })
    }
}

impl fmt::Display for StationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Station [{}] authenticated: [{}], authorized: [{}], inactive: [{}] ms",
            self.mac,
            u8::from(self.authenticated),
            u8::from(self.authorized),
            self.inactive_ms
        )
    }
}
