//! Removing entries.
//!
//! Removal takes out a single `(key, netmask)` entry and hands its payload
//! back. When the entry was the last one on its node the tree structure
//! shrinks again: leaves are unlinked, prefix-less single-child parents
//! collapse into the surviving sibling, and propagation masks move with the
//! collapsing node. Removing the exact entries an insertion created restores
//! the structure the tree had before that insertion.

use std::mem;
use std::net::{Ipv4Addr, Ipv6Addr};

use log::debug;

use crate::bits::bit_test;
use crate::inner::transfer_masks;
use crate::{key_bitlen, RadixTree};

impl<T> RadixTree<T> {
    /// Remove a generic byte key, returning its payload. Absent keys are a
    /// silent no-op.
    ///
    /// ```
    /// let mut tree = netradix::RadixTree::new();
    /// tree.add_generic(b"Victor", 1).unwrap();
    /// assert_eq!(tree.remove_generic(b"Victor"), Some(1));
    /// assert_eq!(tree.remove_generic(b"Victor"), None);
    /// assert!(tree.is_empty());
    /// ```
    pub fn remove_generic(&mut self, key: &[u8]) -> Option<T> {
        let bitlen = key_bitlen(key).ok()?;
        self.remove(key, bitlen, bitlen)
    }

    /// Remove an exact IPv4 host entry.
    pub fn remove_ipv4(&mut self, addr: Ipv4Addr) -> Option<T> {
        self.remove(&addr.octets(), 32, 32)
    }

    /// Remove an exact IPv6 host entry.
    pub fn remove_ipv6(&mut self, addr: Ipv6Addr) -> Option<T> {
        self.remove(&addr.octets(), 128, 128)
    }

    /// Remove an IPv4 netblock entry. `addr` must be the canonical network
    /// address (host bits zero), the form insertion stored.
    ///
    /// ```
    /// use std::net::Ipv4Addr;
    ///
    /// let mut tree = netradix::RadixTree::new();
    /// tree.add_ipv4_netblock(Ipv4Addr::new(10, 1, 0, 0), 16, "lan").unwrap();
    /// assert_eq!(tree.remove_ipv4_netblock(Ipv4Addr::new(10, 1, 0, 0), 16), Some("lan"));
    /// assert_eq!(tree.remove_ipv4_netblock(Ipv4Addr::new(10, 1, 0, 0), 16), None);
    /// ```
    pub fn remove_ipv4_netblock(&mut self, addr: Ipv4Addr, netmask: u8) -> Option<T> {
        if netmask > 32 {
            return None;
        }
        self.remove(&addr.octets(), 32, netmask as u16)
    }

    /// Remove an IPv6 netblock entry; see
    /// [`remove_ipv4_netblock`](Self::remove_ipv4_netblock).
    pub fn remove_ipv6_netblock(&mut self, addr: Ipv6Addr, netmask: u8) -> Option<T> {
        if netmask > 128 {
            return None;
        }
        self.remove(&addr.octets(), 128, netmask as u16)
    }

    /// Remove an [`ipnet::Ipv4Net`] entry. The net is canonicalized first,
    /// so this is symmetric with [`add_ipv4_net`](Self::add_ipv4_net).
    #[cfg(feature = "ipnet")]
    pub fn remove_ipv4_net(&mut self, net: ipnet::Ipv4Net) -> Option<T> {
        self.remove(&net.network().octets(), 32, net.prefix_len() as u16)
    }

    /// Remove an [`ipnet::Ipv6Net`] entry.
    #[cfg(feature = "ipnet")]
    pub fn remove_ipv6_net(&mut self, net: ipnet::Ipv6Net) -> Option<T> {
        self.remove(&net.network().octets(), 128, net.prefix_len() as u16)
    }

    pub(crate) fn remove(&mut self, key: &[u8], bitlen: u16, netmask: u16) -> Option<T> {
        let mut idx = self.root?;
        while self.table[idx].bit < bitlen {
            idx = self.table.child(idx, bit_test(key, self.table[idx].bit))?;
        }

        let bytes = (bitlen / 8) as usize;
        {
            let node = &self.table[idx];
            if node.bit != bitlen {
                return None;
            }
            let prefix = node.prefix.as_ref()?;
            if prefix.stream[..] != key[..bytes] {
                debug!("no stored key matches the removal request");
                return None;
            }
            if !prefix.contains_netmask(netmask) {
                debug!("stored key has no /{netmask} entry to remove");
                return None;
            }
        }

        // unregister the propagation entry before any surgery, while the
        // climb still sees the registration-time parent chain
        if netmask < bitlen {
            let reg = self.mask_node(idx, netmask);
            let masks = &mut self.table[reg].masks;
            match masks.iter().position(|&m| m == netmask) {
                Some(pos) => {
                    masks.remove(pos);
                }
                None => debug!("propagation list out of sync for netmask /{netmask}"),
            }
        }

        let prefix = self.table[idx].prefix.as_mut().unwrap();
        if prefix.entry_count() > 1 {
            let user = prefix.remove_entry(netmask);
            self.count -= 1;
            return user;
        }

        // sole entry: the node stops storing a key
        let user = self.table[idx]
            .prefix
            .take()
            .and_then(|mut p| p.remove_entry(netmask));
        self.count -= 1;

        match (self.table[idx].left, self.table[idx].right) {
            (Some(_), Some(_)) => {
                // both subtrees still need the discriminator; the node stays
                // as a pure interior
            }
            (Some(child), None) | (None, Some(child)) => {
                // splice the node out, handing its masks to the child
                let masks = mem::take(&mut self.table[idx].masks);
                transfer_masks(&mut self.table[child].masks, masks);
                self.replace_in_parent(idx, child);
                self.free_node(idx);
            }
            (None, None) => self.unlink_leaf(idx),
        }
        user
    }

    /// Point the parent slot (or the root) of `old` at `new`.
    fn replace_in_parent(&mut self, old: usize, new: usize) {
        let parent = self.table[old].parent;
        self.table[new].parent = parent;
        match parent {
            None => self.root = Some(new),
            Some(p) => {
                let right = self.table.which_child(p, old);
                self.table.set_child(p, Some(new), right);
            }
        }
    }

    /// Unlink a leaf. A parent left behind as a prefix-less single-child
    /// node collapses into the surviving sibling, which inherits its
    /// propagation masks.
    fn unlink_leaf(&mut self, idx: usize) {
        let Some(parent) = self.table[idx].parent else {
            self.root = None;
            self.free_node(idx);
            return;
        };
        let right = self.table.which_child(parent, idx);
        self.table.set_child(parent, None, right);
        self.free_node(idx);

        if self.table[parent].prefix.is_some() {
            return;
        }
        if let Some(sibling) = self.table.child(parent, !right) {
            let masks = mem::take(&mut self.table[parent].masks);
            transfer_masks(&mut self.table[sibling].masks, masks);
            self.replace_in_parent(parent, sibling);
            self.free_node(parent);
        }
    }
}
