//! Inserting keys and netblocks.

use std::net::{Ipv4Addr, Ipv6Addr};

use log::debug;

use crate::bits::{bit_test, chop, first_differ};
use crate::inner::register_mask;
use crate::prefix::Prefix;
use crate::{key_bitlen, RadixError, RadixTree};

impl<T> RadixTree<T> {
    /// Insert a generic byte key. The key is stored as-is (no
    /// canonicalization) with a bit length of `8 * key.len()`.
    ///
    /// Returns `Ok(true)` when the entry was inserted and `Ok(false)` for a
    /// duplicate, in which case `user` is dropped.
    ///
    /// ```
    /// let mut tree = netradix::RadixTree::new();
    /// assert_eq!(tree.add_generic(b"abaa", 1)?, true);
    /// assert_eq!(tree.add_generic(b"abab", 2)?, true);
    /// assert_eq!(tree.add_generic(b"abab", 3)?, false);
    /// assert!(tree.add_generic(b"", 4).is_err());
    /// # Ok::<(), netradix::RadixError>(())
    /// ```
    pub fn add_generic(&mut self, key: &[u8], user: T) -> Result<bool, RadixError> {
        let bitlen = key_bitlen(key)?;
        Ok(self.add(key, bitlen, bitlen, user))
    }

    /// Insert an exact IPv4 host.
    ///
    /// ```
    /// use std::net::Ipv4Addr;
    ///
    /// let mut tree = netradix::RadixTree::new();
    /// assert!(tree.add_ipv4(Ipv4Addr::new(192, 168, 1, 1), ()));
    /// assert!(!tree.add_ipv4(Ipv4Addr::new(192, 168, 1, 1), ()));
    /// ```
    pub fn add_ipv4(&mut self, addr: Ipv4Addr, user: T) -> bool {
        self.add(&addr.octets(), 32, 32, user)
    }

    /// Insert an exact IPv6 host.
    pub fn add_ipv6(&mut self, addr: Ipv6Addr, user: T) -> bool {
        self.add(&addr.octets(), 128, 128, user)
    }

    /// Insert an IPv4 netblock. `addr` is chopped against `netmask` first,
    /// so `10.1.7.9/16` and `10.1.0.0/16` store the same entry.
    ///
    /// ```
    /// use std::net::Ipv4Addr;
    ///
    /// let mut tree = netradix::RadixTree::new();
    /// tree.add_ipv4_netblock(Ipv4Addr::new(10, 1, 7, 9), 16, "lan")?;
    /// assert_eq!(tree.find_best_ipv4(Ipv4Addr::new(10, 1, 200, 3)), Some(&"lan"));
    /// assert!(tree.add_ipv4_netblock(Ipv4Addr::new(10, 1, 0, 0), 33, "bad").is_err());
    /// # Ok::<(), netradix::RadixError>(())
    /// ```
    pub fn add_ipv4_netblock(
        &mut self,
        addr: Ipv4Addr,
        netmask: u8,
        user: T,
    ) -> Result<bool, RadixError> {
        if netmask > 32 {
            return Err(RadixError::InvalidNetmask { netmask, bits: 32 });
        }
        Ok(self.add(&addr.octets(), 32, netmask as u16, user))
    }

    /// Insert an IPv6 netblock; the IPv6 counterpart of
    /// [`add_ipv4_netblock`](Self::add_ipv4_netblock).
    pub fn add_ipv6_netblock(
        &mut self,
        addr: Ipv6Addr,
        netmask: u8,
        user: T,
    ) -> Result<bool, RadixError> {
        if netmask > 128 {
            return Err(RadixError::InvalidNetmask { netmask, bits: 128 });
        }
        Ok(self.add(&addr.octets(), 128, netmask as u16, user))
    }

    /// Insert an [`ipnet::Ipv4Net`]; the netmask is taken from the net, so
    /// this cannot fail.
    ///
    /// ```
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree = netradix::RadixTree::new();
    /// tree.add_ipv4_net("10.1.0.0/16".parse()?, "lan");
    /// assert_eq!(tree.find_best_ipv4("10.1.200.3".parse()?), Some(&"lan"));
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    #[cfg(feature = "ipnet")]
    pub fn add_ipv4_net(&mut self, net: ipnet::Ipv4Net, user: T) -> bool {
        self.add(&net.network().octets(), 32, net.prefix_len() as u16, user)
    }

    /// Insert an [`ipnet::Ipv6Net`].
    #[cfg(feature = "ipnet")]
    pub fn add_ipv6_net(&mut self, net: ipnet::Ipv6Net, user: T) -> bool {
        self.add(&net.network().octets(), 128, net.prefix_len() as u16, user)
    }

    /// The insertion algorithm. `netmask == bitlen` stores a host entry;
    /// anything smaller is a netblock and also registers itself in the
    /// propagation list of the node that roots its subtree.
    pub(crate) fn add(&mut self, key: &[u8], bitlen: u16, netmask: u16, user: T) -> bool {
        let bytes = (bitlen / 8) as usize;
        let mut stream = key[..bytes].to_vec();
        if netmask < bitlen {
            chop(&mut stream, netmask);
        }

        let Some(root) = self.root else {
            let node = self.alloc(bitlen, Some(Prefix::new(stream, bitlen, netmask, user)));
            if netmask < bitlen {
                self.table[node].masks.push(netmask);
            }
            self.root = Some(node);
            self.count += 1;
            return true;
        };

        // Walk down to a prefix-bearing node. A key shorter than the current
        // discriminator has nothing to test; either path then ends at a node
        // whose divergence from the key lies within the key's length.
        let mut idx = root;
        loop {
            let node = &self.table[idx];
            if node.bit >= bitlen && node.prefix.is_some() {
                break;
            }
            let right = bitlen <= node.bit || bit_test(&stream, node.bit);
            match self.table.child(idx, right) {
                Some(child) => idx = child,
                None => break,
            }
        }
        let bottom = idx;

        let check = self.table[bottom].bit.min(bitlen);
        let bottom_stream = &self.table[bottom].prefix.as_ref().unwrap().stream;
        let differ = first_differ(&stream, bottom_stream, check);

        // climb to the attachment point
        let mut idx = bottom;
        while let Some(parent) = self.table[idx].parent {
            if differ > self.table[parent].bit {
                break;
            }
            idx = parent;
        }

        if differ == bitlen && self.table[idx].bit == bitlen {
            return self.add_at_existing(idx, stream, bitlen, netmask, user);
        }

        if differ < bitlen && differ == self.table[idx].bit {
            // the key extends a stored key that ends exactly at the
            // divergence: the new leaf hangs directly below it, in the child
            // slot the walk found empty
            let side = bit_test(&stream, differ);
            debug_assert!(self.table.child(idx, side).is_none());
            let new_node = self.alloc(bitlen, Some(Prefix::new(stream, bitlen, netmask, user)));
            self.count += 1;
            self.table.link(idx, new_node, side);
            if netmask < bitlen {
                let reg = self.mask_node(new_node, netmask);
                register_mask(&mut self.table[reg].masks, netmask);
            }
            return true;
        }

        let orient_right = if differ == bitlen {
            // the key is a strict prefix of everything below `idx`: the new
            // leaf adopts that subtree, on the side named by the subtree's
            // own bit at the divergence
            bit_test(&self.table[bottom].prefix.as_ref().unwrap().stream, differ)
        } else {
            bit_test(&stream, differ)
        };

        let new_node = self.alloc(bitlen, Some(Prefix::new(stream, bitlen, netmask, user)));
        self.count += 1;

        if differ == bitlen {
            self.splice_above(idx, new_node);
            self.table.link(new_node, idx, orient_right);
        } else {
            let inter = self.alloc(differ, None);

            // propagation masks at or below the divergence now root at the
            // new interior node; wider ones stay put
            let node_masks = &mut self.table[idx].masks;
            let split = node_masks
                .iter()
                .position(|&m| m <= differ)
                .unwrap_or(node_masks.len());
            let moved = node_masks.split_off(split);
            self.table[inter].masks = moved;

            self.splice_above(idx, inter);
            self.table.link(inter, new_node, orient_right);
            self.table.link(inter, idx, !orient_right);
        }

        if netmask < bitlen {
            let reg = self.mask_node(new_node, netmask);
            register_mask(&mut self.table[reg].masks, netmask);
        }
        true
    }

    /// The key's divergence point is an existing node: extend its entry
    /// list, or give a pure interior node its first prefix.
    fn add_at_existing(
        &mut self,
        idx: usize,
        stream: Vec<u8>,
        bitlen: u16,
        netmask: u16,
        user: T,
    ) -> bool {
        if self.table[idx].prefix.is_some() {
            let prefix = self.table[idx].prefix.as_mut().unwrap();
            if prefix.contains_netmask(netmask) {
                debug!("duplicate entry for stored key, netmask /{netmask}");
                return false;
            }
            prefix.add_entry(netmask, user);
            self.count += 1;
            if netmask < bitlen {
                let reg = self.mask_node(idx, netmask);
                register_mask(&mut self.table[reg].masks, netmask);
            }
        } else {
            // an interior node whose discriminator equals the key's length
            // becomes the host entry for that key
            self.table[idx].prefix = Some(Prefix::new(stream, bitlen, bitlen, user));
            self.count += 1;
        }
        true
    }

    /// Put `new` where `old` sits in the parent chain. The caller re-attaches
    /// `old` below `new` afterwards.
    fn splice_above(&mut self, old: usize, new: usize) {
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
}
