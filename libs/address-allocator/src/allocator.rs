// Copyright 2025 Anapaya Systems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Lowest-free IP address allocation.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnet::IpNet;
use thiserror::Error;

/// Address allocation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocationError {
    /// A reserved address is not a usable host address of the subnet.
    #[error("reserved address {address} is not a usable host address in {subnet}")]
    InvalidReservedAddress { address: IpAddr, subnet: IpNet },
    /// No free host address left in the subnet.
    #[error("subnet {subnet} has no free host addresses")]
    SubnetExhausted { subnet: IpNet },
}

/// Returns the lowest unused host address in `subnet`.
///
/// `reserved` holds every address already in use, including the interface's
/// own address. Each reserved address is validated against the subnet on
/// every call, so a roster that was hand-edited into an invalid state (for
/// example a peer sitting on the broadcast address) is rejected before
/// anything new is assigned.
///
/// The scan returns the first gap in the sorted reserved sequence, so
/// addresses freed by removals are handed out again before the high end of
/// the range grows.
pub fn next_free_address(subnet: IpNet, reserved: &[IpAddr]) -> Result<IpAddr, AllocationError> {
    for &address in reserved {
        if !is_usable_host(address, &subnet) {
            return Err(AllocationError::InvalidReservedAddress { address, subnet });
        }
    }

    // The network address anchors the scan. It sorts below every valid
    // reserved address, so the first host address shows up as a gap.
    let mut occupied = Vec::with_capacity(reserved.len() + 1);
    occupied.push(address_bits(subnet.network()));
    occupied.extend(reserved.iter().copied().map(address_bits));
    occupied.sort_unstable();
    occupied.dedup();

    if let Some(pair) = occupied.windows(2).find(|pair| pair[1] - pair[0] > 1) {
        let address = address_from_bits(pair[0] + 1, &subnet)
            .expect("gap candidates sit below a validated reserved address");
        return Ok(address);
    }

    // No gap: the candidate is one past the highest reserved address. This
    // is the only candidate that can fall off the end of the subnet.
    let last = occupied[occupied.len() - 1];
    last.checked_add(1)
        .and_then(|bits| address_from_bits(bits, &subnet))
        .filter(|candidate| is_usable_host(*candidate, &subnet))
        .ok_or(AllocationError::SubnetExhausted { subnet })
}

/// Checks that `address` lies in `subnet` and is neither the network nor
/// the broadcast address.
fn is_usable_host(address: IpAddr, subnet: &IpNet) -> bool {
    subnet.contains(&address) && address != subnet.network() && address != subnet.broadcast()
}

/// The address as an unsigned integer; the width is fixed by the family.
fn address_bits(address: IpAddr) -> u128 {
    match address {
        IpAddr::V4(addr) => u128::from(addr.to_bits()),
        IpAddr::V6(addr) => addr.to_bits(),
    }
}

/// Converts bits back to an address of the subnet's family. Returns `None`
/// if the value does not fit the family's address width.
fn address_from_bits(bits: u128, subnet: &IpNet) -> Option<IpAddr> {
    match subnet {
        IpNet::V4(_) => u32::try_from(bits)
            .ok()
            .map(|bits| IpAddr::V4(Ipv4Addr::from_bits(bits))),
        IpNet::V6(_) => Some(IpAddr::V6(Ipv6Addr::from_bits(bits))),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn subnet(s: &str) -> IpNet {
        IpNet::from_str(s).unwrap()
    }

    fn addr(s: &str) -> IpAddr {
        IpAddr::from_str(s).unwrap()
    }

    fn addrs(list: &[&str]) -> Vec<IpAddr> {
        list.iter().map(|s| addr(s)).collect()
    }

    #[test]
    fn test_empty_reserved_yields_first_host() {
        let result = next_free_address(subnet("192.168.3.0/24"), &[]);
        assert_eq!(result, Ok(addr("192.168.3.1")));
    }

    #[test]
    fn test_appends_after_highest_reserved() {
        let reserved = addrs(&["192.168.3.1", "192.168.3.2"]);
        let result = next_free_address(subnet("192.168.3.0/24"), &reserved);
        assert_eq!(result, Ok(addr("192.168.3.3")));
    }

    #[test]
    fn test_prefers_lowest_gap() {
        let reserved = addrs(&["192.168.3.1", "192.168.3.5"]);
        let result = next_free_address(subnet("192.168.3.0/24"), &reserved);
        assert_eq!(result, Ok(addr("192.168.3.2")));
    }

    #[test]
    fn test_reserved_order_is_irrelevant() {
        let reserved = addrs(&["192.168.3.5", "192.168.3.1", "192.168.3.2"]);
        let result = next_free_address(subnet("192.168.3.0/24"), &reserved);
        assert_eq!(result, Ok(addr("192.168.3.3")));
    }

    #[test]
    fn test_freed_address_is_reused() {
        let full = addrs(&["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4"]);
        assert_eq!(
            next_free_address(subnet("10.0.0.0/29"), &full),
            Ok(addr("10.0.0.5"))
        );

        // Drop 10.0.0.2 and the same address comes back instead of 10.0.0.5.
        let after_removal = addrs(&["10.0.0.1", "10.0.0.3", "10.0.0.4"]);
        assert_eq!(
            next_free_address(subnet("10.0.0.0/29"), &after_removal),
            Ok(addr("10.0.0.2"))
        );
    }

    #[test]
    fn test_subnet_with_host_bits_in_notation() {
        // The interface address form `192.168.3.1/24` describes the same
        // subnet as `192.168.3.0/24`.
        let result = next_free_address(subnet("192.168.3.1/24"), &addrs(&["192.168.3.1"]));
        assert_eq!(result, Ok(addr("192.168.3.2")));
    }

    #[test]
    fn test_ipv6_allocation() {
        let reserved = addrs(&["2001:db8::1", "2001:db8::2"]);
        let result = next_free_address(subnet("2001:db8::/64"), &reserved);
        assert_eq!(result, Ok(addr("2001:db8::3")));
    }

    #[test]
    fn test_rejects_reserved_outside_subnet() {
        let net = subnet("192.168.3.0/24");
        let result = next_free_address(net, &addrs(&["192.168.4.1"]));
        assert_eq!(
            result,
            Err(AllocationError::InvalidReservedAddress {
                address: addr("192.168.4.1"),
                subnet: net,
            })
        );
    }

    #[test]
    fn test_rejects_reserved_network_address() {
        let net = subnet("192.168.3.0/24");
        let result = next_free_address(net, &addrs(&["192.168.3.0"]));
        assert_eq!(
            result,
            Err(AllocationError::InvalidReservedAddress {
                address: addr("192.168.3.0"),
                subnet: net,
            })
        );
    }

    #[test]
    fn test_rejects_reserved_broadcast_address() {
        let net = subnet("192.168.3.0/24");
        let result = next_free_address(net, &addrs(&["192.168.3.255"]));
        assert_eq!(
            result,
            Err(AllocationError::InvalidReservedAddress {
                address: addr("192.168.3.255"),
                subnet: net,
            })
        );
    }

    #[test]
    fn test_rejects_reserved_of_other_family() {
        let net = subnet("192.168.3.0/24");
        let result = next_free_address(net, &addrs(&["2001:db8::1"]));
        assert_eq!(
            result,
            Err(AllocationError::InvalidReservedAddress {
                address: addr("2001:db8::1"),
                subnet: net,
            })
        );
    }

    #[test]
    fn test_slash_30_exhausts_after_two_hosts() {
        let net = subnet("192.168.3.0/30");
        assert_eq!(
            next_free_address(net, &[]),
            Ok(addr("192.168.3.1")),
            "first host"
        );
        assert_eq!(
            next_free_address(net, &addrs(&["192.168.3.1"])),
            Ok(addr("192.168.3.2")),
            "second host"
        );
        assert_eq!(
            next_free_address(net, &addrs(&["192.168.3.1", "192.168.3.2"])),
            Err(AllocationError::SubnetExhausted { subnet: net }),
            "third allocation must fail"
        );
    }

    #[test]
    fn test_host_only_subnets_exhaust_immediately() {
        for net in ["192.168.3.0/31", "192.168.3.0/32", "2001:db8::/127", "2001:db8::/128"] {
            let net = subnet(net);
            assert_eq!(
                next_free_address(net, &[]),
                Err(AllocationError::SubnetExhausted { subnet: net }),
                "{net} must have no usable host address"
            );
        }
    }

    #[test]
    fn test_allocations_stay_inside_subnet_until_exhaustion() {
        let net = subnet("10.0.0.0/29");
        let mut reserved = Vec::new();
        loop {
            match next_free_address(net, &reserved) {
                Ok(address) => {
                    assert!(net.contains(&address));
                    assert_ne!(address, net.network());
                    assert_ne!(address, net.broadcast());
                    assert!(!reserved.contains(&address));
                    reserved.push(address);
                }
                Err(error) => {
                    assert_eq!(error, AllocationError::SubnetExhausted { subnet: net });
                    break;
                }
            }
        }
        // A /29 has exactly six usable host addresses.
        assert_eq!(reserved.len(), 6);
    }
}
