//! Walker for raw netlink attribute (TLV) buffers.
//!
//! neli hands back nested attributes as opaque payload bytes, so nested sets
//! such as `NL80211_ATTR_STA_INFO` are split here.

use crate::error::DecodeError;

const NLA_HDRLEN: usize = 4;
const NLA_TYPE_MASK: u16 = 0x3fff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NlAttrSlice<'a> {
    pub nla_type: u16,
    pub payload: &'a [u8],
}

impl<'a> NlAttrSlice<'a> {
    pub fn new(nla_type: u16, payload: &'a [u8]) -> Self {
        Self {
            nla_type: nla_type & NLA_TYPE_MASK,
            payload,
        }
    }

    pub fn u32_ne(&self) -> Option<u32> {
        let bytes: [u8; 4] = self.payload.get(..4)?.try_into().ok()?;
        Some(u32::from_ne_bytes(bytes))
    }
}

/// Minimum payload length for one attribute type.
#[derive(Debug, Clone, Copy)]
pub struct AttrPolicy {
    pub nla_type: u16,
    pub min_len: usize,
}

/// Split a nested attribute buffer into its attributes.
///
/// A header that claims more bytes than remain is a structural error, even
/// after valid attributes. libnl's `nla_parse` stops at such a header and
/// keeps what it has; here the whole set is rejected. Trailing padding shorter
/// than a header is ignored.
pub fn parse_nested(payload: &[u8]) -> Result<Vec<NlAttrSlice<'_>>, DecodeError> {
    let mut attrs = Vec::new();
    let mut offset = 0usize;
    while payload.len().saturating_sub(offset) >= NLA_HDRLEN {
        let header = &payload[offset..offset + NLA_HDRLEN];
        let len = u16::from_ne_bytes([header[0], header[1]]) as usize;
        let nla_type = u16::from_ne_bytes([header[2], header[3]]);
        if len < NLA_HDRLEN || offset + len > payload.len() {
            return Err(DecodeError::Truncated { offset });
        }
        attrs.push(NlAttrSlice::new(
            nla_type,
            &payload[offset + NLA_HDRLEN..offset + len],
        ));
        offset = offset.saturating_add(nla_align(len));
    }
    Ok(attrs)
}

/// Like [`parse_nested`], then reject any attribute shorter than its policy.
pub fn parse_nested_with_policy<'a>(
    payload: &'a [u8],
    policy: &[AttrPolicy],
) -> Result<Vec<NlAttrSlice<'a>>, DecodeError> {
    let attrs = parse_nested(payload)?;
    for attr in &attrs {
        if let Some(rule) = policy.iter().find(|p| p.nla_type == attr.nla_type) {
            if attr.payload.len() < rule.min_len {
                return Err(DecodeError::AttributeTooShort {
                    attr: attr.nla_type,
                    len: attr.payload.len(),
                    min: rule.min_len,
                });
            }
        }
    }
    Ok(attrs)
}

/// Last attribute of the given type wins, as with `nla_parse`.
pub fn find<'a, 'b>(attrs: &'b [NlAttrSlice<'a>], nla_type: u16) -> Option<&'b NlAttrSlice<'a>> {
    attrs.iter().rev().find(|a| a.nla_type == nla_type)
}

fn nla_align(len: usize) -> usize {
    (len + 3) & !3
}

#[cfg(test)]
pub(crate) fn encode(nla_type: u16, payload: &[u8]) -> Vec<u8> {
    let len = (NLA_HDRLEN + payload.len()) as u16;
    let mut out = Vec::with_capacity(nla_align(len as usize));
    out.extend_from_slice(&len.to_ne_bytes());
    out.extend_from_slice(&nla_type.to_ne_bytes());
    out.extend_from_slice(payload);
    out.resize(nla_align(len as usize), 0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_walks_aligned_attrs() {
        let mut buf = encode(1, &[0xAA, 0xBB, 0xCC]);
        buf.extend(encode(2, &7u32.to_ne_bytes()));
        let attrs = parse_nested(&buf).unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].nla_type, 1);
        assert_eq!(attrs[0].payload, &[0xAA, 0xBB, 0xCC]);
        assert_eq!(attrs[1].u32_ne(), Some(7));
    }

    #[test]
    fn test_parse_nested_masks_flag_bits() {
        // NLA_F_NESTED
        let buf = encode(0x8000 | 9, &[]);
        let attrs = parse_nested(&buf).unwrap();
        assert_eq!(attrs[0].nla_type, 9);
    }

    #[test]
    fn test_parse_nested_rejects_overrun() {
        let mut buf = encode(1, &1u32.to_ne_bytes());
        buf[0] = 40;
        assert_eq!(parse_nested(&buf), Err(DecodeError::Truncated { offset: 0 }));
    }

    #[test]
    fn test_parse_nested_rejects_overrun_after_valid_attr() {
        let mut buf = encode(1, &1u32.to_ne_bytes());
        let mut tail = encode(2, &2u32.to_ne_bytes());
        tail[0] = 12;
        buf.extend(tail);
        assert_eq!(parse_nested(&buf), Err(DecodeError::Truncated { offset: 8 }));
    }

    #[test]
    fn test_parse_nested_empty() {
        assert!(parse_nested(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_policy_min_len() {
        let buf = encode(3, &[1, 2]);
        let policy = [AttrPolicy { nla_type: 3, min_len: 4 }];
        assert_eq!(
            parse_nested_with_policy(&buf, &policy),
            Err(DecodeError::AttributeTooShort { attr: 3, len: 2, min: 4 })
        );
        // types without a rule pass through
        assert!(parse_nested_with_policy(&buf, &[]).is_ok());
    }

    #[test]
    fn test_find_prefers_last() {
        let mut buf = encode(4, &1u32.to_ne_bytes());
        buf.extend(encode(4, &2u32.to_ne_bytes()));
        let attrs = parse_nested(&buf).unwrap();
        assert_eq!(find(&attrs, 4).and_then(|a| a.u32_ne()), Some(2));
        assert!(find(&attrs, 5).is_none());
    }
}
