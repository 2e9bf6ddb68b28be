//! MAS IPAM configuration source.
//!
//! Reconciles the interface descriptor file written by the MAS host agent
//! with the host's live network interfaces and publishes the result as a
//! local address space of allocatable pools:
//!
//! - [`descriptor`]: descriptor file loading
//! - [`host`]: host interface enumeration
//! - [`matcher`]: MAC-first, name-fallback interface matching
//! - [`populate`]: pool and address population with an explicit report
//! - [`address_space`]: address spaces, pools, records and the sink trait
//! - [`source`]: the one-shot [`MasSource`] controller
//! - [`config`]: descriptor path resolution and daemon configuration

pub mod address_space;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod host;
pub mod matcher;
pub mod populate;
pub mod source;

pub use address_space::{
    AddressConfigSink, AddressManager, AddressPool, AddressRecord, AddressScope, AddressSpace,
    LOCAL_DEFAULT_ADDRESS_SPACE_ID,
};
pub use config::{MasSourceConfig, MasipamdConfig};
pub use descriptor::{AddressDescriptor, InterfaceDescriptor, SubnetDescriptor};
pub use error::{IpamError, IpamResult};
pub use host::{HostInterface, HostInterfaceSource, StaticInterfaces, SystemInterfaces};
pub use populate::{
    AddressSkipReason, PopulateReport, SkippedAddress, SkippedSubnet, SubnetSkipReason,
};
pub use source::{AddressConfigSource, MasSource, RefreshOutcome, SourceState};
