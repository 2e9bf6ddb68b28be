//! Address primitives shared by the IPAM configuration sources.
//!
//! This crate provides type-safe representations of the network values that
//! appear in interface descriptor files and host interface listings:
//!
//! - [`MacAddress`]: 48-bit Ethernet hardware addresses, plus the lenient
//!   textual normalization used for descriptor matching
//! - [`IpAddress`]: IPv4 and IPv6 addresses
//! - [`IpPrefix`]: IP network prefixes (CIDR notation) with network masking

mod ip;
mod mac;

pub use ip::{IpAddress, IpPrefix, Ipv4Address, Ipv6Address};
pub use mac::MacAddress;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("invalid IP prefix format: {0}")]
    InvalidIpPrefix(String),
}
