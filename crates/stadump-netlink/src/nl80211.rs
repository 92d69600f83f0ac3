//! nl80211 ABI values used by the station dump.
//!
//! Mirrors `include/uapi/linux/nl80211.h`. Only the subset needed to list
//! stations is declared.

pub const NL80211_GENL_NAME: &str = "nl80211";

/// `genlmsg_put` version used for station queries.
pub const NL80211_GENL_VERSION: u8 = 0;

// Netlink control message types
pub const NLMSG_HDRLEN: usize = 16;
pub const NLMSG_ERROR: u16 = 2;
pub const NLMSG_DONE: u16 = 3;
/// Types below this are reserved for netlink control messages.
pub const NLMSG_MIN_TYPE: u16 = 0x10;

pub const GENL_HDRLEN: usize = 4;

// nl80211 commands
pub const NL80211_CMD_GET_STATION: u8 = 17;

// nl80211 attributes
pub const NL80211_ATTR_IFINDEX: u16 = 3;
pub const NL80211_ATTR_MAC: u16 = 6;
pub const NL80211_ATTR_STA_INFO: u16 = 21;

// Nested inside NL80211_ATTR_STA_INFO
pub const NL80211_STA_INFO_INACTIVE_TIME: u16 = 1;
pub const NL80211_STA_INFO_STA_FLAGS: u16 = 17;

// Bit positions in struct nl80211_sta_flag_update
pub const NL80211_STA_FLAG_AUTHORIZED: u32 = 1;
pub const NL80211_STA_FLAG_AUTHENTICATED: u32 = 5;

/// `sizeof(struct nl80211_sta_flag_update)`: `__u32 mask; __u32 set;`
pub const STA_FLAG_UPDATE_LEN: usize = 8;

pub const ETH_ALEN: usize = 6;

pub const fn sta_flag_bit(flag: u32) -> u32 {
    1 << flag
}
