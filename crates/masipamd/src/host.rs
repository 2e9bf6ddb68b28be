//! Host network interface enumeration.
//!
//! The matcher needs the live interface list as `(name, hardware address)`
//! pairs in a stable order. [`SystemInterfaces`] reads it from the kernel via
//! `getifaddrs(3)`; [`StaticInterfaces`] serves a fixed list for tests and
//! dry runs.
//!
//! System enumeration is implemented for Linux, Android and macOS only. On
//! other platforms, Windows included, [`SystemInterfaces`] fails every
//! refresh, so a daemon there must be driven by another
//! [`HostInterfaceSource`] even though the Windows descriptor path is known.

use crate::error::{IpamError, IpamResult};

/// A live host interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInterface {
    /// Kernel interface name (e.g., "eth0").
    pub name: String,

    /// Hardware address in colon form, empty when the interface has none.
    pub hardware_address: String,
}

impl HostInterface {
    pub fn new(name: impl Into<String>, hardware_address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hardware_address: hardware_address.into(),
        }
    }
}

/// Supplier of the host interface list.
///
/// Called once per refresh attempt; the order of the returned list is the
/// order in which the matcher scans it.
pub trait HostInterfaceSource {
    fn interfaces(&self) -> IpamResult<Vec<HostInterface>>;
}

/// Fixed interface list.
#[derive(Debug, Clone, Default)]
pub struct StaticInterfaces(pub Vec<HostInterface>);

impl HostInterfaceSource for StaticInterfaces {
    fn interfaces(&self) -> IpamResult<Vec<HostInterface>> {
        Ok(self.0.clone())
    }
}

/// Enumerates the interfaces of the running host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

#[cfg(any(target_os = "linux", target_os = "android", target_os = "macos"))]
impl HostInterfaceSource for SystemInterfaces {
    fn interfaces(&self) -> IpamResult<Vec<HostInterface>> {
        use nix::ifaddrs::getifaddrs;
        use nix::net::if_::if_nametoindex;

        let addrs =
            getifaddrs().map_err(|e| IpamError::host_interfaces(format!("getifaddrs: {}", e)))?;

        let entries = addrs.map(|ifaddr| {
            let index = if_nametoindex(ifaddr.interface_name.as_str()).ok();
            let link = ifaddr
                .address
                .as_ref()
                .and_then(|address| address.as_link_addr())
                .and_then(|link| link.addr());
            (ifaddr.interface_name, index, link)
        });

        let interfaces = fold_links(entries);
        tracing::debug!(count = interfaces.len(), "Enumerated host interfaces");
        Ok(interfaces)
    }
}

/// Folds per-address `(name, ifindex, link address)` entries into one
/// interface per link, ordered by interface index.
///
/// Names without an index are address labels (`eth0:1`), not links, and are
/// dropped. All-zero link addresses (loopback, tunnels) count as absent.
#[cfg(any(target_os = "linux", target_os = "android", target_os = "macos"))]
fn fold_links(
    entries: impl IntoIterator<Item = (String, Option<u32>, Option<[u8; 6]>)>,
) -> Vec<HostInterface> {
    use ipam_types::MacAddress;
    use std::collections::BTreeMap;

    let mut links: BTreeMap<(u32, String), String> = BTreeMap::new();
    for (name, index, link) in entries {
        let Some(index) = index else {
            tracing::debug!(name = %name, "Skipping interface label without an index");
            continue;
        };

        let hardware_address = links.entry((index, name)).or_default();
        if let Some(mac) = link.map(MacAddress::new).filter(|mac| !mac.is_zero()) {
            *hardware_address = mac.to_string();
        }
    }

    links
        .into_iter()
        .map(|((_, name), hardware_address)| HostInterface {
            name,
            hardware_address,
        })
        .collect()
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "macos")))]
impl HostInterfaceSource for SystemInterfaces {
    fn interfaces(&self) -> IpamResult<Vec<HostInterface>> {
        Err(IpamError::host_interfaces(
            "interface enumeration is not supported on this platform",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_interfaces_preserve_order() {
        let source = StaticInterfaces(vec![
            HostInterface::new("eth1", "00:0d:3a:6e:18:26"),
            HostInterface::new("eth0", "00:0d:3a:6e:18:25"),
        ]);

        let interfaces = source.interfaces().unwrap();
        assert_eq!(interfaces.len(), 2);
        assert_eq!(interfaces[0].name, "eth1");
        assert_eq!(interfaces[1].name, "eth0");
    }

    #[cfg(any(target_os = "linux", target_os = "android", target_os = "macos"))]
    #[test]
    fn test_fold_links_drops_labels_and_orders_by_index() {
        let mac = [0x00, 0x0d, 0x3a, 0x6e, 0x18, 0x25];
        let interfaces = fold_links(vec![
            ("eth0".to_string(), Some(2), None),
            ("lo".to_string(), Some(1), Some([0; 6])),
            ("eth0:1".to_string(), None, None),
            ("eth0".to_string(), Some(2), Some(mac)),
            ("lo".to_string(), Some(1), None),
        ]);

        assert_eq!(
            interfaces,
            vec![
                HostInterface::new("lo", ""),
                HostInterface::new("eth0", "00:0d:3a:6e:18:25"),
            ]
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_system_interfaces_include_loopback() {
        let interfaces = SystemInterfaces.interfaces().unwrap();
        let lo = interfaces
            .iter()
            .find(|intf| intf.name == "lo")
            .expect("loopback interface");
        assert!(lo.hardware_address.is_empty());
    }
}
