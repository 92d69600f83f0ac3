use neli::{
    consts::nl::{NlmF, NlmFFlags},
    genl::{Genlmsghdr, Nlattr},
    nl::{NlPayload, Nlmsghdr},
    types::GenlBuffer,
};

use crate::error::{NetlinkError, Result};
use crate::nl80211::{NL80211_ATTR_IFINDEX, NL80211_CMD_GET_STATION, NL80211_GENL_VERSION};

pub type Nl80211Msg = Nlmsghdr<u16, Genlmsghdr<u8, u16>>;

/// Build the `NL80211_CMD_GET_STATION` dump request for one interface.
///
/// Port and sequence number are left for the socket to fill in.
pub fn station_dump_request(family_id: u16, ifindex: u32) -> Result<Nl80211Msg> {
    let mut attrs = GenlBuffer::new();
    attrs.push(
        Nlattr::new(false, false, NL80211_ATTR_IFINDEX, ifindex).map_err(|e| {
            NetlinkError::AttributeError {
                what: "ifindex".to_string(),
                reason: e.to_string(),
            }
        })?,
    );

    let genlhdr = Genlmsghdr::new(NL80211_CMD_GET_STATION, NL80211_GENL_VERSION, attrs);
    Ok(Nlmsghdr::new(
        None,
        family_id,
        NlmFFlags::new(&[NlmF::Request, NlmF::Dump]),
        None,
        None,
        NlPayload::Payload(genlhdr),
    ))
}
