//! Descriptor to host interface matching.
//!
//! A descriptor that carries a MAC address is matched on the hardware address
//! only; its name is ignored even when it would match another interface. A
//! descriptor without a MAC address is matched on exact interface name.

use crate::descriptor::InterfaceDescriptor;
use crate::host::HostInterface;
use ipam_types::MacAddress;

/// Returns the first host interface, in enumeration order, that the
/// descriptor refers to.
pub fn match_interface<'a>(
    descriptor: &InterfaceDescriptor,
    interfaces: &'a [HostInterface],
) -> Option<&'a HostInterface> {
    match descriptor.mac_address() {
        Some(mac) => {
            let mac = MacAddress::normalize(mac);
            // Interfaces without a hardware address never match a declared MAC.
            interfaces.iter().find(|intf| {
                !intf.hardware_address.is_empty()
                    && MacAddress::normalize(&intf.hardware_address) == mac
            })
        }
        None => {
            let name = descriptor.name()?;
            interfaces.iter().find(|intf| intf.name == name)
        }
    }
}
