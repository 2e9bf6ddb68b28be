//! Address spaces, pools and records, and the sink that owns them.
//!
//! An [`AddressSpace`] is handed out by an [`AddressConfigSink`], filled in
//! locally by a configuration source, and handed back through
//! [`AddressConfigSink::set_address_space`]. Until that call the sink holds no
//! reference to the space, so a refresh that fails half way leaves the sink's
//! state untouched.

use crate::error::{IpamError, IpamResult};
use ipam_types::{IpAddress, IpPrefix};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::info;

/// Identifier of the default address space for the local scope.
pub const LOCAL_DEFAULT_ADDRESS_SPACE_ID: &str = "local";

/// Pool priority for addresses on the host's primary interface.
pub const PRIMARY_PRIORITY: u8 = 0;

/// Pool priority for addresses on secondary interfaces.
pub const SECONDARY_PRIORITY: u8 = 1;

/// Visibility scope of an address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AddressScope {
    /// Addresses usable on this host only.
    Local,
}

impl AddressScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressScope::Local => "local",
        }
    }
}

impl fmt::Display for AddressScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single pooled address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressRecord {
    pub address: IpAddress,
}

/// Allocatable addresses sharing one network, bound to one host interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressPool {
    /// Host interface the addresses are reachable through.
    pub interface_name: String,
    /// 0 for the primary interface, 1 otherwise.
    pub priority: u8,
    /// Canonical network.
    pub network: IpPrefix,
    /// Records keyed by address literal.
    pub addresses: BTreeMap<String, AddressRecord>,
}

impl AddressPool {
    fn new(interface_name: &str, priority: u8, network: IpPrefix) -> Self {
        Self {
            interface_name: interface_name.to_string(),
            priority,
            network,
            addresses: BTreeMap::new(),
        }
    }

    /// Adds an address to the pool.
    ///
    /// Returns [`IpamError::AddressExists`] if the address is already
    /// recorded; the pool is left unchanged in that case.
    pub fn new_address_record(&mut self, address: IpAddress) -> IpamResult<&AddressRecord> {
        let key = address.to_string();
        if self.addresses.contains_key(&key) {
            return Err(IpamError::AddressExists {
                address: key,
                network: self.network.to_string(),
            });
        }

        Ok(self
            .addresses
            .entry(key)
            .or_insert(AddressRecord { address }))
    }

    /// Returns true if the address literal is recorded in this pool.
    pub fn contains(&self, address: &str) -> bool {
        self.addresses.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// A scoped collection of address pools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressSpace {
    pub id: String,
    pub scope: AddressScope,
    /// Pools keyed by canonical network prefix.
    pub pools: BTreeMap<String, AddressPool>,
}

impl AddressSpace {
    /// Creates an empty address space.
    pub fn new(id: impl Into<String>, scope: AddressScope) -> Self {
        Self {
            id: id.into(),
            scope,
            pools: BTreeMap::new(),
        }
    }

    /// Creates a pool for `network`.
    ///
    /// The network is canonicalized first, so `10.240.0.4/12` and
    /// `10.240.0.0/12` name the same pool. An existing pool is never
    /// overwritten: the call fails with [`IpamError::PoolExists`] naming the
    /// interface that owns it.
    pub fn new_address_pool(
        &mut self,
        interface_name: &str,
        priority: u8,
        network: &IpPrefix,
    ) -> IpamResult<&mut AddressPool> {
        let network = network.network();
        let key = network.to_string();

        if let Some(existing) = self.pools.get(&key) {
            return Err(IpamError::PoolExists {
                network: key,
                interface: existing.interface_name.clone(),
            });
        }

        Ok(self
            .pools
            .entry(key)
            .or_insert_with(|| AddressPool::new(interface_name, priority, network)))
    }

    /// Looks up a pool by canonical network prefix (e.g., "10.240.0.0/12").
    pub fn pool(&self, network: &str) -> Option<&AddressPool> {
        self.pools.get(network)
    }

    /// Total number of pooled addresses across all pools.
    pub fn address_count(&self) -> usize {
        self.pools.values().map(AddressPool::len).sum()
    }
}

/// Storage collaborator that owns address spaces.
pub trait AddressConfigSink {
    /// Returns a fresh, empty address space to be populated by the caller.
    fn new_address_space(&self, id: &str, scope: AddressScope) -> IpamResult<AddressSpace>;

    /// Activates `space` as the canonical address space for its id.
    fn set_address_space(&self, space: AddressSpace) -> IpamResult<()>;
}

/// In-memory address space store.
///
/// Shared through an `Arc` between the configuration source that commits
/// spaces and the readers that inspect them.
#[derive(Debug, Default)]
pub struct AddressManager {
    spaces: RwLock<HashMap<String, AddressSpace>>,
}

impl AddressManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the active address space with the given id.
    pub fn address_space(&self, id: &str) -> Option<AddressSpace> {
        self.spaces.read().get(id).cloned()
    }
}

impl AddressConfigSink for AddressManager {
    fn new_address_space(&self, id: &str, scope: AddressScope) -> IpamResult<AddressSpace> {
        if id.is_empty() {
            return Err(IpamError::sink("new_address_space", "empty address space id"));
        }
        Ok(AddressSpace::new(id, scope))
    }

    fn set_address_space(&self, space: AddressSpace) -> IpamResult<()> {
        info!(
            id = %space.id,
            scope = %space.scope,
            pools = space.pools.len(),
            addresses = space.address_count(),
            "Activating address space"
        );
        // Replaces any previous space with the same id.
        self.spaces.write().insert(space.id.clone(), space);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prefix(s: &str) -> IpPrefix {
        s.parse().unwrap()
    }

    fn addr(s: &str) -> IpAddress {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_address_pool_canonical_key() {
        let mut space = AddressSpace::new(LOCAL_DEFAULT_ADDRESS_SPACE_ID, AddressScope::Local);
        let pool = space
            .new_address_pool("eth0", SECONDARY_PRIORITY, &prefix("10.240.0.4/12"))
            .unwrap();
        assert_eq!(pool.network.to_string(), "10.240.0.0/12");

        let pool = space.pool("10.240.0.0/12").unwrap();
        assert_eq!(pool.interface_name, "eth0");
        assert_eq!(pool.priority, SECONDARY_PRIORITY);
    }

    #[test]
    fn test_new_address_pool_rejects_existing() {
        let mut space = AddressSpace::new(LOCAL_DEFAULT_ADDRESS_SPACE_ID, AddressScope::Local);
        space
            .new_address_pool("eth0", PRIMARY_PRIORITY, &prefix("1.0.0.0/12"))
            .unwrap();

        match space.new_address_pool("eth1", SECONDARY_PRIORITY, &prefix("1.2.3.4/12")) {
            Err(IpamError::PoolExists { network, interface }) => {
                assert_eq!(network, "1.0.0.0/12");
                assert_eq!(interface, "eth0");
            }
            other => panic!("Expected PoolExists, got {:?}", other),
        }

        // The first pool keeps its owner and priority.
        let pool = space.pool("1.0.0.0/12").unwrap();
        assert_eq!(pool.interface_name, "eth0");
        assert_eq!(pool.priority, PRIMARY_PRIORITY);
        assert_eq!(space.pools.len(), 1);
    }

    #[test]
    fn test_new_address_record_rejects_duplicate() {
        let mut space = AddressSpace::new(LOCAL_DEFAULT_ADDRESS_SPACE_ID, AddressScope::Local);
        let pool = space
            .new_address_pool("eth0", PRIMARY_PRIORITY, &prefix("1.0.0.0/12"))
            .unwrap();

        pool.new_address_record(addr("1.1.1.6")).unwrap();
        let err = pool.new_address_record(addr("1.1.1.6")).unwrap_err();
        assert!(matches!(err, IpamError::AddressExists { .. }));
        assert_eq!(pool.len(), 1);
        assert!(pool.contains("1.1.1.6"));
    }

    #[test]
    fn test_manager_replaces_space() {
        let manager = AddressManager::new();

        let mut space = manager
            .new_address_space(LOCAL_DEFAULT_ADDRESS_SPACE_ID, AddressScope::Local)
            .unwrap();
        space
            .new_address_pool("eth0", PRIMARY_PRIORITY, &prefix("1.0.0.0/12"))
            .unwrap();
        manager.set_address_space(space).unwrap();
        assert_eq!(
            manager
                .address_space(LOCAL_DEFAULT_ADDRESS_SPACE_ID)
                .unwrap()
                .pools
                .len(),
            1
        );

        let empty = manager
            .new_address_space(LOCAL_DEFAULT_ADDRESS_SPACE_ID, AddressScope::Local)
            .unwrap();
        manager.set_address_space(empty).unwrap();
        assert!(manager
            .address_space(LOCAL_DEFAULT_ADDRESS_SPACE_ID)
            .unwrap()
            .pools
            .is_empty());
    }

    #[test]
    fn test_manager_new_space_is_detached() {
        let manager = AddressManager::new();
        let _space = manager
            .new_address_space(LOCAL_DEFAULT_ADDRESS_SPACE_ID, AddressScope::Local)
            .unwrap();
        assert!(manager.address_space(LOCAL_DEFAULT_ADDRESS_SPACE_ID).is_none());
        assert!(manager.new_address_space("", AddressScope::Local).is_err());
    }
}
