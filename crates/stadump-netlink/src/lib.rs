//! # stadump-netlink
//!
//! Reads the associated-station table of a wireless interface through the
//! generic netlink `nl80211` family.
//!
//! One `NL80211_CMD_GET_STATION` dump request is sent; replies are drained
//! until the kernel signals completion, and each reply is decoded into a
//! [`StationRecord`] (MAC address, authenticated/authorized flags and
//! inactivity time).
//!
//! ## Platform Support
//!
//! Linux-only. Everything that touches neli or the socket is gated with
//! `#[cfg(target_os = "linux")]`; the attribute decoder and reply pump build
//! everywhere.
//!
//! ## Usage
//!
//! ```no_run
//! use stadump_netlink::{dump_stations, DumpOptions};
//!
//! fn main() -> stadump_netlink::Result<()> {
//!     let opts = DumpOptions {
//!         interface: "wlan0".to_string(),
//!         timeout: None,
//!     };
//!     dump_stations(&opts, |station| println!("{}", station))?;
//!     Ok(())
//! }
//! ```

pub mod attrs;
#[cfg(target_os = "linux")]
pub mod dump;
pub mod error;
#[cfg(target_os = "linux")]
pub mod interface;
pub mod nl80211;
pub mod reply;
#[cfg(target_os = "linux")]
pub mod request;
#[cfg(target_os = "linux")]
pub mod session;
pub mod station;

pub use error::{DecodeError, NetlinkError, Result};
pub use reply::{pump, Completion, DumpSummary, OwnedAttr, Reply, ReplySource};
pub use station::{MacAddr, StationFlags, StationRecord, INACTIVE_UNREPORTED};

#[cfg(target_os = "linux")]
pub use dump::{dump_stations, DumpOptions, DumpReport};
#[cfg(target_os = "linux")]
pub use interface::interface_index;
#[cfg(target_os = "linux")]
pub use request::station_dump_request;
#[cfg(target_os = "linux")]
pub use session::{Nl80211Session, SOCKET_BUFFER_SIZE};
