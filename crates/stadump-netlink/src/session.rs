use std::collections::VecDeque;
use std::io::{self, Cursor};
use std::os::unix::io::AsRawFd;
use std::time::Duration;

use neli::{
    attr::Attribute,
    consts::socket::NlFamily,
    nl::NlPayload,
    socket::{NlSocket, NlSocketHandle},
    FromBytes, ToBytes,
};
use tracing::debug;

use crate::error::{DecodeError, NetlinkError, Result};
use crate::nl80211::{NL80211_GENL_NAME, NLMSG_DONE, NLMSG_ERROR, NLMSG_HDRLEN, NLMSG_MIN_TYPE};
use crate::reply::{OwnedAttr, Reply, ReplySource};
use crate::request::Nl80211Msg;

/// Send and receive buffer size. Station dumps on busy APs span many
/// datagrams; the kernel default has been seen to truncate them.
pub const SOCKET_BUFFER_SIZE: usize = 8192;

/// Largest datagram the kernel builds for a dump.
const RECV_BUFFER_LEN: usize = 32 * 1024;

/// Generic netlink socket bound to the nl80211 family.
///
/// Replies are read from the raw socket and classified here, so an
/// unsolicited `NLMSG_ERROR` with code 0 arrives as [`Reply::Ack`] and an
/// expired receive timeout as [`NetlinkError::Timeout`].
///
/// The socket is closed when the session is dropped.
pub struct Nl80211Session {
    socket: NlSocket,
    family_id: u16,
    timeout: Option<Duration>,
    buffer: Vec<u8>,
    pending: VecDeque<Reply>,
}

impl Nl80211Session {
    /// Open a generic netlink socket and resolve the nl80211 family.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Cannot create or bind the netlink socket
    /// - Socket buffer sizes or the receive timeout cannot be applied
    /// - nl80211 family not found (cfg80211 not loaded)
    pub fn open(timeout: Option<Duration>) -> Result<Self> {
        let mut handle = NlSocketHandle::connect(NlFamily::Generic, None, &[]).map_err(|e| {
            NetlinkError::ConnectionFailed(format!("Failed to create nl80211 socket: {}", e))
        })?;
        configure_socket(&handle, timeout)?;

        let family_id = handle.resolve_genl_family(NL80211_GENL_NAME).map_err(|e| {
            NetlinkError::FamilyResolution {
                family: NL80211_GENL_NAME.to_string(),
                reason: e.to_string(),
            }
        })?;
        debug!("nl80211 family resolved id={}", family_id);

        Ok(Self::new(NlSocket::from(handle), family_id, timeout))
    }

    fn new(socket: NlSocket, family_id: u16, timeout: Option<Duration>) -> Self {
        Self {
            socket,
            family_id,
            timeout,
            buffer: vec![0; RECV_BUFFER_LEN],
            pending: VecDeque::new(),
        }
    }

    pub fn family_id(&self) -> u16 {
        self.family_id
    }

    pub fn send(&mut self, msg: Nl80211Msg, operation: &str) -> Result<()> {
        let send_failed = |reason: String| NetlinkError::SendFailed {
            operation: operation.to_string(),
            reason,
        };
        let mut buffer = Cursor::new(Vec::new());
        msg.to_bytes(&mut buffer)
            .map_err(|e| send_failed(e.to_string()))?;
        self.socket
            .send(buffer.get_ref(), 0)
            .map_err(|e| send_failed(e.to_string()))?;
        Ok(())
    }

    fn recv_datagram(&mut self) -> Result<usize> {
        loop {
            match self.socket.recv(&mut self.buffer, 0) {
                Ok(0) => {
                    return Err(NetlinkError::ConnectionClosed {
                        operation: "station dump".to_string(),
                    })
                }
                Ok(len) => return Ok(len),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.recv_error(e)),
            }
        }
    }

    fn recv_error(&self, err: io::Error) -> NetlinkError {
        match (err.kind(), self.timeout) {
            (io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut, Some(timeout)) => {
                NetlinkError::Timeout {
                    operation: "waiting for nl80211 station dump".to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                }
            }
            _ => NetlinkError::ReceiveFailed {
                operation: "station dump".to_string(),
                reason: err.to_string(),
            },
        }
    }
}

impl ReplySource for Nl80211Session {
    fn recv_reply(&mut self) -> Result<Reply> {
        loop {
            if let Some(reply) = self.pending.pop_front() {
                return Ok(reply);
            }
            let len = self.recv_datagram()?;
            let replies = parse_datagram(&self.buffer[..len])?;
            self.pending.extend(replies);
        }
    }
}

impl Drop for Nl80211Session {
    fn drop(&mut self) {
        debug!("closing nl80211 socket family_id={}", self.family_id);
    }
}

/// Split one received datagram into classified replies.
///
/// Control messages are classified from the raw header so that neli's
/// ACK bookkeeping never sees them. Data messages go through neli.
fn parse_datagram(buf: &[u8]) -> Result<Vec<Reply>> {
    let mut replies = Vec::new();
    let mut offset = 0usize;
    while buf.len().saturating_sub(offset) >= NLMSG_HDRLEN {
        let header = &buf[offset..offset + NLMSG_HDRLEN];
        let len = u32::from_ne_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let nl_type = u16::from_ne_bytes([header[4], header[5]]);
        if len < NLMSG_HDRLEN || offset + len > buf.len() {
            return Err(malformed_frame(offset, len));
        }
        let frame = &buf[offset..offset + len];

        match nl_type {
            NLMSG_DONE => replies.push(Reply::Finish),
            NLMSG_ERROR => {
                let code = frame
                    .get(NLMSG_HDRLEN..NLMSG_HDRLEN + 4)
                    .map(|b| i32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
                    .ok_or_else(|| malformed_frame(offset, len))?;
                replies.push(error_reply(code));
            }
            t if t < NLMSG_MIN_TYPE => {
                debug!("nl80211 ignoring control message nl_type={}", t);
            }
            _ => replies.push(data_reply(frame)),
        }
        offset += nlmsg_align(len);
    }
    Ok(replies)
}

fn data_reply(frame: &[u8]) -> Reply {
    let msg = match Nl80211Msg::from_bytes(&mut Cursor::new(frame)) {
        Ok(msg) => msg,
        Err(e) => {
            return Reply::Malformed(DecodeError::MalformedMessage {
                reason: e.to_string(),
            })
        }
    };
    match msg.nl_payload {
        NlPayload::Payload(genl) => {
            let attrs = genl
                .get_attr_handle()
                .iter()
                .map(|attr| {
                    let payload: &[u8] = attr.payload().as_ref();
                    OwnedAttr::new(attr.nla_type.nla_type, payload)
                })
                .collect();
            Reply::Data(attrs)
        }
        other => Reply::Malformed(DecodeError::MalformedMessage {
            reason: format!("unexpected payload {:?}", other),
        }),
    }
}

fn error_reply(code: i32) -> Reply {
    if code == 0 {
        Reply::Ack
    } else {
        Reply::Error(code)
    }
}

fn malformed_frame(offset: usize, len: usize) -> NetlinkError {
    NetlinkError::ReceiveFailed {
        operation: "station dump".to_string(),
        reason: format!("malformed netlink frame at offset {} (nlmsg_len {})", offset, len),
    }
}

fn nlmsg_align(len: usize) -> usize {
    (len + 3) & !3
}

fn configure_socket<S: AsRawFd>(sock: &S, timeout: Option<Duration>) -> Result<()> {
    set_buffer_sizes(sock, SOCKET_BUFFER_SIZE)?;
    if let Some(timeout) = timeout {
        set_recv_timeout(sock, timeout)?;
    }
    Ok(())
}

fn set_buffer_sizes<S: AsRawFd>(sock: &S, size: usize) -> Result<()> {
    let size = size as libc::c_int;
    setsockopt(sock, libc::SO_SNDBUF, "SO_SNDBUF", &size)?;
    setsockopt(sock, libc::SO_RCVBUF, "SO_RCVBUF", &size)
}

fn set_recv_timeout<S: AsRawFd>(sock: &S, timeout: Duration) -> Result<()> {
    let tv = libc::timeval {
        tv_sec: timeout.as_secs() as libc::time_t,
        tv_usec: timeout.subsec_micros() as libc::suseconds_t,
    };
    setsockopt(sock, libc::SO_RCVTIMEO, "SO_RCVTIMEO", &tv)
}

fn setsockopt<S: AsRawFd, T>(
    sock: &S,
    name: libc::c_int,
    label: &'static str,
    value: &T,
) -> Result<()> {
    let rc = unsafe {
        libc::setsockopt(
            sock.as_raw_fd(),
            libc::SOL_SOCKET,
            name,
            value as *const T as *const libc::c_void,
            std::mem::size_of::<T>() as libc::socklen_t,
        )
    };
    if rc != 0 {
        return Err(NetlinkError::SocketOption {
            option: label,
            source: io::Error::last_os_error(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::encode;
    use crate::nl80211::*;

    fn frame(nl_type: u16, body: &[u8]) -> Vec<u8> {
        let len = NLMSG_HDRLEN + body.len();
        let mut out = Vec::with_capacity(nlmsg_align(len));
        out.extend_from_slice(&(len as u32).to_ne_bytes());
        out.extend_from_slice(&nl_type.to_ne_bytes());
        out.extend_from_slice(&0x2u16.to_ne_bytes());
        out.extend_from_slice(&7u32.to_ne_bytes());
        out.extend_from_slice(&4242u32.to_ne_bytes());
        out.extend_from_slice(body);
        out.resize(nlmsg_align(len), 0);
        out
    }

    /// `struct nlmsgerr`: the code followed by the echoed request header.
    fn error_frame(code: i32) -> Vec<u8> {
        let mut body = code.to_ne_bytes().to_vec();
        body.extend(&frame(0x1c, &[])[..NLMSG_HDRLEN]);
        frame(NLMSG_ERROR, &body)
    }

    fn station_frame(mac: [u8; 6]) -> Vec<u8> {
        let mut body = vec![NL80211_CMD_GET_STATION, 1, 0, 0];
        body.extend(encode(NL80211_ATTR_IFINDEX, &3u32.to_ne_bytes()));
        body.extend(encode(NL80211_ATTR_MAC, &mac));
        body.extend(encode(
            NL80211_ATTR_STA_INFO,
            &encode(NL80211_STA_INFO_INACTIVE_TIME, &40u32.to_ne_bytes()),
        ));
        frame(0x1c, &body)
    }

    #[test]
    fn test_parse_datagram_ack() {
        assert_eq!(parse_datagram(&error_frame(0)).unwrap(), vec![Reply::Ack]);
    }

    #[test]
    fn test_parse_datagram_kernel_error() {
        assert_eq!(
            parse_datagram(&error_frame(-libc::ENODEV)).unwrap(),
            vec![Reply::Error(-libc::ENODEV)]
        );
    }

    #[test]
    fn test_parse_datagram_multipart() {
        let mut buf = station_frame([0x02, 0, 0, 0, 0, 0x01]);
        buf.extend(frame(1, &[]));
        buf.extend(station_frame([0x02, 0, 0, 0, 0, 0x02]));
        buf.extend(frame(NLMSG_DONE, &0i32.to_ne_bytes()));

        let replies = parse_datagram(&buf).unwrap();
        assert_eq!(replies.len(), 3);
        match &replies[1] {
            Reply::Data(attrs) => {
                let mac = attrs
                    .iter()
                    .find(|a| a.nla_type == NL80211_ATTR_MAC)
                    .expect("mac attr");
                assert_eq!(mac.payload, vec![0x02, 0, 0, 0, 0, 0x02]);
                assert_eq!(attrs.len(), 3);
            }
            other => panic!("expected data reply, got {:?}", other),
        }
        assert_eq!(replies[2], Reply::Finish);
    }

    #[test]
    fn test_parse_datagram_rejects_overrun() {
        let mut buf = error_frame(0);
        buf[0] = 200;
        let err = parse_datagram(&buf).unwrap_err();
        assert!(matches!(err, NetlinkError::ReceiveFailed { .. }));
    }

    #[test]
    fn test_parse_datagram_truncated_error_frame() {
        let buf = frame(NLMSG_ERROR, &[]);
        assert!(parse_datagram(&buf).is_err());
    }

    #[test]
    fn test_recv_reply_times_out_without_kernel_reply() {
        let socket = NlSocket::connect(NlFamily::Generic, None, &[]).expect("generic socket");
        let timeout = Duration::from_millis(100);
        configure_socket(&socket, Some(timeout)).expect("socket options");

        let mut session = Nl80211Session::new(socket, 0, Some(timeout));
        let err = session.recv_reply().unwrap_err();
        assert!(err.is_timeout(), "unexpected error {:?}", err);
        assert!(matches!(err, NetlinkError::Timeout { timeout_ms: 100, .. }));
    }
}
