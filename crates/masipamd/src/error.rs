//! Error types for the MAS IPAM source.
//!
//! Errors fall in two tiers. Fatal errors abort a refresh and are returned to
//! the caller; recoverable errors are raised by the address storage types and
//! absorbed by the populator, which logs them and records them in its report.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for IPAM source operations.
pub type IpamResult<T> = Result<T, IpamError>;

/// Errors that can occur while loading or populating address spaces.
#[derive(Debug, Error)]
pub enum IpamError {
    /// The descriptor file could not be opened or read.
    #[error("Failed to read interface descriptor file {}: {source}", path.display())]
    DescriptorRead {
        /// Path of the descriptor file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The descriptor file content is not a valid interface list.
    #[error("Failed to parse interface descriptor file {}: {source}", path.display())]
    DescriptorParse {
        /// Path of the descriptor file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Host interface enumeration failed.
    #[error("Failed to enumerate host interfaces: {message}")]
    HostInterfaces {
        /// Error message.
        message: String,
    },

    /// The storage sink rejected an address-space operation.
    #[error("Address sink operation failed: {operation}: {message}")]
    Sink {
        /// The operation that failed (e.g., "new_address_space").
        operation: String,
        /// Error message.
        message: String,
    },

    /// A pool for this network already exists in the address space.
    #[error("Address pool {network} already exists (interface '{interface}')")]
    PoolExists {
        /// Canonical network key.
        network: String,
        /// Interface owning the existing pool.
        interface: String,
    },

    /// The address is already recorded in the pool.
    #[error("Address {address} already exists in pool {network}")]
    AddressExists {
        /// Address literal.
        address: String,
        /// Canonical network key of the pool.
        network: String,
    },

    /// Refresh was called before a sink was attached.
    #[error("Address config source '{source_name}' has not been started")]
    NotStarted {
        /// Name of the source.
        source_name: String,
    },

    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl IpamError {
    /// Creates a host interface enumeration error.
    pub fn host_interfaces(message: impl Into<String>) -> Self {
        Self::HostInterfaces {
            message: message.into(),
        }
    }

    /// Creates a sink error.
    pub fn sink(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Sink {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
