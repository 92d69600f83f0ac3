//! Reply pump for a single dump exchange.
//!
//! The receive loop owns a [`Completion`] value; only finish, ack and error
//! replies change it. Data replies are decoded and handed to the caller.

use tracing::{debug, warn};

use crate::attrs::NlAttrSlice;
use crate::error::{DecodeError, NetlinkError, Result};
use crate::station::StationRecord;

/// Top-level attribute copied out of a received message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedAttr {
    pub nla_type: u16,
    pub payload: Vec<u8>,
}

impl OwnedAttr {
    pub fn new(nla_type: u16, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            nla_type,
            payload: payload.into(),
        }
    }

    pub fn as_slice(&self) -> NlAttrSlice<'_> {
        NlAttrSlice::new(self.nla_type, &self.payload)
    }
}

/// One received netlink message, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A data-bearing message with its generic netlink attributes.
    Data(Vec<OwnedAttr>),
    /// A data-bearing message whose generic netlink body could not be parsed.
    Malformed(DecodeError),
    /// `NLMSG_DONE`: end of a multi-part dump.
    Finish,
    /// `NLMSG_ERROR` with code 0.
    Ack,
    /// `NLMSG_ERROR` with a non-zero (negative errno) code.
    Error(i32),
}

/// Anything that can hand the pump one reply at a time.
///
/// Each call blocks until a message is available.
pub trait ReplySource {
    fn recv_reply(&mut self) -> Result<Reply>;
}

/// Outcome of the exchange so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    InProgress,
    Done,
    Failed(i32),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpSummary {
    pub stations: usize,
    pub skipped: usize,
}

/// Drain replies until the kernel finishes, acknowledges or fails the dump.
///
/// `on_station` runs once per decoded record, in arrival order. Records that
/// fail to decode are logged and counted in [`DumpSummary::skipped`].
pub fn pump<S, F>(source: &mut S, mut on_station: F) -> Result<DumpSummary>
where
    S: ReplySource + ?Sized,
    F: FnMut(&StationRecord),
{
    let mut summary = DumpSummary::default();
    let mut completion = Completion::InProgress;
    while completion == Completion::InProgress {
        let reply = source.recv_reply()?;
        completion = dispatch(reply, &mut summary, &mut on_station);
    }

    match completion {
        Completion::Failed(code) => Err(NetlinkError::kernel("station dump", code)),
        _ => Ok(summary),
    }
}

fn dispatch<F>(reply: Reply, summary: &mut DumpSummary, on_station: &mut F) -> Completion
where
    F: FnMut(&StationRecord),
{
    match reply {
        Reply::Data(attrs) => {
            let slices: Vec<NlAttrSlice<'_>> = attrs.iter().map(OwnedAttr::as_slice).collect();
            match StationRecord::decode(&slices) {
                Ok(record) => {
                    debug!("nl80211 station mac={}", record.mac);
                    summary.stations += 1;
                    on_station(&record);
                }
                Err(e) => {
                    warn!("Failed to parse station attributes, skipping record: {}", e);
                    summary.skipped += 1;
                }
            }
            Completion::InProgress
        }
        Reply::Malformed(e) => {
            warn!("Failed to parse station message, skipping record: {}", e);
            summary.skipped += 1;
            Completion::InProgress
        }
        Reply::Finish => {
            debug!("nl80211 station dump finished");
            Completion::Done
        }
        Reply::Ack => {
            debug!("nl80211 station dump acknowledged");
            Completion::Done
        }
        Reply::Error(0) => Completion::Done,
        Reply::Error(code) => {
            debug!("nl80211 station dump error code={}", code);
            Completion::Failed(code)
        }
    }
}
