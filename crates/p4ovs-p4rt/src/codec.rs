//! Canonical byte-string encoding of native values.
//!
//! The programming protocol represents every match key and action
//! parameter as a byte string in network (big-endian) order, sized to the
//! field's declared width. Some pipeline fields are narrower than the
//! native type carrying them (a VNI travelling in a u32 may program a
//! one-byte mod-blob pointer), so the width is always explicit and values
//! are truncated to it by keeping the low-order bytes.
//!
//! All functions here are deterministic and side-effect-free.

use crate::error::CodecError;
use p4ovs_types::MacAddress;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Encodes an unsigned integer as exactly `width` big-endian bytes.
///
/// Values wider than `width` are truncated to the low-order bytes; values
/// narrower are left-padded with zeros.
pub fn encode_uint(value: u64, width: usize) -> Vec<u8> {
    let be = value.to_be_bytes();
    if width >= 8 {
        let mut out = vec![0u8; width - 8];
        out.extend_from_slice(&be);
        out
    } else {
        be[8 - width..].to_vec()
    }
}

/// Encodes a MAC address as its six octets.
pub fn encode_mac(mac: &MacAddress) -> Vec<u8> {
    mac.octets().to_vec()
}

/// Encodes an IPv4 address as four bytes in network order.
pub fn encode_ipv4(addr: Ipv4Addr) -> Vec<u8> {
    addr.octets().to_vec()
}

/// Encodes an IPv6 address as sixteen bytes, always full width.
pub fn encode_ipv6(addr: Ipv6Addr) -> Vec<u8> {
    addr.octets().to_vec()
}

/// Decodes a big-endian byte string back into an unsigned integer.
///
/// Inverse of [`encode_uint`] for widths up to 8 bytes. Used by the
/// reconciliation path to recover integer values previously written as
/// action parameters.
pub fn decode_uint(bytes: &[u8]) -> Result<u64, CodecError> {
    if bytes.len() > 8 {
        return Err(CodecError::Overflow(bytes.len()));
    }
    let mut value = 0u64;
    for &b in bytes {
        value = value << 8 | u64::from(b);
    }
    Ok(value)
}
