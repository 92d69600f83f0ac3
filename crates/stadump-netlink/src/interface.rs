use std::ffi::CString;

use crate::error::{NetlinkError, Result};

/// Resolve an interface name to its kernel index.
pub fn interface_index(interface: &str) -> Result<u32> {
    if interface.is_empty() {
        return Err(NetlinkError::InvalidInput(
            "Interface name must not be empty".to_string(),
        ));
    }
    let cstr = CString::new(interface)
        .map_err(|_| NetlinkError::InvalidInput(format!("Invalid interface name '{interface}'")))?;
    let idx = unsafe { libc::if_nametoindex(cstr.as_ptr()) };
    if idx == 0 {
        return Err(NetlinkError::InterfaceIndexError {
            interface: interface.to_string(),
            reason: std::io::Error::last_os_error().to_string(),
        });
    }
    Ok(idx)
}
