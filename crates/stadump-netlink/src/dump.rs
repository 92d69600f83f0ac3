use std::time::Duration;

use tracing::{debug, info};

use crate::error::Result;
use crate::interface::interface_index;
use crate::reply::{self, DumpSummary};
use crate::request::station_dump_request;
use crate::session::Nl80211Session;
use crate::station::StationRecord;

/// Which interface to query and how long to wait for the kernel.
#[derive(Debug, Clone)]
pub struct DumpOptions {
    pub interface: String,
    /// `None` blocks until the kernel answers.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct DumpReport {
    pub interface: String,
    pub ifindex: u32,
    pub summary: DumpSummary,
}

/// Dump the station table of one interface.
///
/// `on_station` runs for every decoded station as replies arrive. The
/// netlink socket is released before this returns, on success or failure.
///
/// # Errors
///
/// Returns error if:
/// - The nl80211 session cannot be opened
/// - Interface not found
/// - The request cannot be built or sent
/// - The kernel answers with an error, or the receive times out
pub fn dump_stations<F>(opts: &DumpOptions, on_station: F) -> Result<DumpReport>
where
    F: FnMut(&StationRecord),
{
    let mut session = Nl80211Session::open(opts.timeout)?;
    let ifindex = interface_index(&opts.interface)?;
    debug!(
        "nl80211 get_station dump iface={} ifindex={} family_id={}",
        opts.interface,
        ifindex,
        session.family_id()
    );

    let request = station_dump_request(session.family_id(), ifindex)?;
    session.send(request, "GET_STATION")?;

    let summary = reply::pump(&mut session, on_station)?;
    info!(
        "nl80211 station dump complete iface={} stations={} skipped={}",
        opts.interface, summary.stations, summary.skipped
    );

    Ok(DumpReport {
        interface: opts.interface.clone(),
        ifindex,
        summary,
    })
}
