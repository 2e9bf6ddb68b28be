//! Address space population from matched interface descriptors.
//!
//! Nothing in this pass is fatal. Every descriptor, subnet or address that
//! cannot be used is logged and recorded in the returned [`PopulateReport`].

use crate::address_space::{AddressSpace, PRIMARY_PRIORITY, SECONDARY_PRIORITY};
use crate::descriptor::{InterfaceDescriptor, SubnetDescriptor};
use crate::error::IpamError;
use crate::host::HostInterface;
use crate::matcher::match_interface;
use ipam_types::{IpAddress, IpPrefix};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// A descriptor that was paired with a host interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedInterface {
    /// Position of the descriptor in the file.
    pub index: usize,
    pub interface: String,
    pub priority: u8,
}

/// A descriptor with no matching host interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedDescriptor {
    pub index: usize,
    pub mac_address: Option<String>,
    pub name: Option<String>,
}

/// Why a subnet contributed no pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SubnetSkipReason {
    /// The prefix is not valid CIDR notation.
    InvalidPrefix(String),
    /// Another subnet already claimed this network.
    PoolConflict { owner: String },
    /// The address space refused the pool for another reason.
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSubnet {
    pub interface: String,
    pub prefix: String,
    pub reason: SubnetSkipReason,
}

/// Why an address was left out of its pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AddressSkipReason {
    /// Marked primary in the descriptor; reserved for the host.
    HostReserved,
    /// Not a valid IP literal.
    InvalidAddress(String),
    /// The pool refused the record for another reason.
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedAddress {
    pub interface: String,
    pub prefix: String,
    pub address: String,
    pub reason: AddressSkipReason,
}

/// Outcome of one population pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PopulateReport {
    pub matched: Vec<MatchedInterface>,
    pub unmatched: Vec<UnmatchedDescriptor>,
    pub skipped_subnets: Vec<SkippedSubnet>,
    pub skipped_addresses: Vec<SkippedAddress>,
    pub pools_created: usize,
    pub addresses_added: usize,
    /// Addresses declared more than once for the same pool.
    pub duplicate_addresses: usize,
}

impl PopulateReport {
    /// Number of addresses skipped for the given reason class.
    pub fn skipped_addresses_where(&self, pred: impl Fn(&AddressSkipReason) -> bool) -> usize {
        self.skipped_addresses
            .iter()
            .filter(|skip| pred(&skip.reason))
            .count()
    }
}

/// Returns the pool priority for a descriptor.
pub fn priority_for(descriptor: &InterfaceDescriptor) -> u8 {
    if descriptor.is_primary {
        PRIMARY_PRIORITY
    } else {
        SECONDARY_PRIORITY
    }
}

/// Matches every descriptor to a host interface and adds its subnets and
/// non-reserved addresses to `space`.
pub fn populate_address_space(
    space: &mut AddressSpace,
    descriptors: &[InterfaceDescriptor],
    interfaces: &[HostInterface],
) -> PopulateReport {
    let mut report = PopulateReport::default();
    let reserved = reserved_addresses(descriptors);

    for (index, descriptor) in descriptors.iter().enumerate() {
        let Some(host_intf) = match_interface(descriptor, interfaces) else {
            warn!(
                mac_address = descriptor.mac_address().unwrap_or_default(),
                name = descriptor.name().unwrap_or_default(),
                "Failed to find host interface for descriptor"
            );
            report.unmatched.push(UnmatchedDescriptor {
                index,
                mac_address: descriptor.mac_address().map(str::to_string),
                name: descriptor.name().map(str::to_string),
            });
            continue;
        };

        let priority = priority_for(descriptor);
        debug!(
            interface = %host_intf.name,
            priority,
            subnets = descriptor.subnets.len(),
            "Matched descriptor to host interface"
        );
        report.matched.push(MatchedInterface {
            index,
            interface: host_intf.name.clone(),
            priority,
        });

        for subnet in &descriptor.subnets {
            populate_subnet(space, &host_intf.name, priority, subnet, &reserved, &mut report);
        }
    }

    info!(
        matched = report.matched.len(),
        unmatched = report.unmatched.len(),
        pools = report.pools_created,
        addresses = report.addresses_added,
        skipped_subnets = report.skipped_subnets.len(),
        skipped_addresses = report.skipped_addresses.len(),
        "Populated address space {}",
        space.id
    );

    report
}

/// Collects every address marked primary anywhere in the descriptor list.
fn reserved_addresses(descriptors: &[InterfaceDescriptor]) -> HashSet<IpAddress> {
    descriptors
        .iter()
        .flat_map(|descriptor| &descriptor.subnets)
        .flat_map(|subnet| &subnet.addresses)
        .filter(|declared| declared.is_primary)
        .filter_map(|declared| declared.address.parse().ok())
        .collect()
}

fn populate_subnet(
    space: &mut AddressSpace,
    interface: &str,
    priority: u8,
    subnet: &SubnetDescriptor,
    reserved: &HashSet<IpAddress>,
    report: &mut PopulateReport,
) {
    let skip_subnet = |report: &mut PopulateReport, reason: SubnetSkipReason| {
        warn!(interface, prefix = %subnet.prefix, ?reason, "Skipping subnet");
        report.skipped_subnets.push(SkippedSubnet {
            interface: interface.to_string(),
            prefix: subnet.prefix.clone(),
            reason,
        });
    };

    let network = match subnet.prefix.parse::<IpPrefix>() {
        Ok(prefix) => prefix.network(),
        Err(e) => {
            skip_subnet(report, SubnetSkipReason::InvalidPrefix(e.to_string()));
            return;
        }
    };

    let pool = match space.new_address_pool(interface, priority, &network) {
        Ok(pool) => pool,
        Err(IpamError::PoolExists { interface: owner, .. }) => {
            skip_subnet(report, SubnetSkipReason::PoolConflict { owner });
            return;
        }
        Err(e) => {
            skip_subnet(report, SubnetSkipReason::Rejected(e.to_string()));
            return;
        }
    };
    report.pools_created += 1;

    for declared in &subnet.addresses {
        let skip = |reason: AddressSkipReason| SkippedAddress {
            interface: interface.to_string(),
            prefix: subnet.prefix.clone(),
            address: declared.address.clone(),
            reason,
        };

        if declared.is_primary {
            debug!(interface, address = %declared.address, "Reserving primary address for host");
            report
                .skipped_addresses
                .push(skip(AddressSkipReason::HostReserved));
            continue;
        }

        let address = match declared.address.parse::<IpAddress>() {
            Ok(address) => address,
            Err(e) => {
                warn!(
                    interface,
                    address = %declared.address,
                    error = %e,
                    "Skipping invalid address"
                );
                report
                    .skipped_addresses
                    .push(skip(AddressSkipReason::InvalidAddress(e.to_string())));
                continue;
            }
        };

        // Reserved on some interface; a secondary declaration elsewhere does
        // not release it.
        if reserved.contains(&address) {
            debug!(interface, %address, "Address is reserved for the host elsewhere");
            report
                .skipped_addresses
                .push(skip(AddressSkipReason::HostReserved));
            continue;
        }

        match pool.new_address_record(address) {
            Ok(_) => report.addresses_added += 1,
            Err(IpamError::AddressExists { .. }) => {
                debug!(interface, %address, "Ignoring repeated address");
                report.duplicate_addresses += 1;
            }
            Err(e) => {
                warn!(interface, %address, error = %e, "Failed to create address record");
                report
                    .skipped_addresses
                    .push(skip(AddressSkipReason::Rejected(e.to_string())));
            }
        }
    }
}
