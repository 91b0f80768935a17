//! Exact-match and best-match (longest-prefix) lookups.

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::bits::{bit_test, chop};
use crate::{key_bitlen, RadixTree};

impl<T> RadixTree<T> {
    /// Look up a generic byte key, matching exactly.
    ///
    /// ```
    /// let mut tree = netradix::RadixTree::new();
    /// tree.add_generic(b"Victor", 1).unwrap();
    /// assert_eq!(tree.find_exact_generic(b"Victor"), Some(&1));
    /// assert_eq!(tree.find_exact_generic(b"Victoria"), None);
    /// assert_eq!(tree.find_exact_generic(b"Vic"), None);
    /// ```
    pub fn find_exact_generic(&self, key: &[u8]) -> Option<&T> {
        let bitlen = key_bitlen(key).ok()?;
        self.find(key, bitlen, true)
    }

    /// Look up an exact IPv4 host entry. Netblocks containing `addr` do not
    /// count; use [`find_best_ipv4`](Self::find_best_ipv4) for those.
    ///
    /// ```
    /// use std::net::Ipv4Addr;
    ///
    /// let mut tree = netradix::RadixTree::new();
    /// tree.add_ipv4(Ipv4Addr::new(192, 168, 1, 1), "host");
    /// tree.add_ipv4_netblock(Ipv4Addr::new(192, 168, 0, 0), 16, "net").unwrap();
    /// assert_eq!(tree.find_exact_ipv4(Ipv4Addr::new(192, 168, 1, 1)), Some(&"host"));
    /// assert_eq!(tree.find_exact_ipv4(Ipv4Addr::new(192, 168, 1, 6)), None);
    /// ```
    pub fn find_exact_ipv4(&self, addr: Ipv4Addr) -> Option<&T> {
        self.find(&addr.octets(), 32, true)
    }

    /// Look up an exact IPv6 host entry.
    pub fn find_exact_ipv6(&self, addr: Ipv6Addr) -> Option<&T> {
        self.find(&addr.octets(), 128, true)
    }

    /// Longest-prefix match for an IPv4 address: the host entry if one is
    /// stored, otherwise the most specific stored netblock containing
    /// `addr`.
    ///
    /// ```
    /// use std::net::Ipv4Addr;
    ///
    /// let mut tree = netradix::RadixTree::new();
    /// tree.add_ipv4_netblock(Ipv4Addr::new(192, 168, 0, 0), 16, 16).unwrap();
    /// tree.add_ipv4_netblock(Ipv4Addr::new(192, 168, 1, 0), 24, 24).unwrap();
    /// assert_eq!(tree.find_best_ipv4(Ipv4Addr::new(192, 168, 1, 6)), Some(&24));
    /// assert_eq!(tree.find_best_ipv4(Ipv4Addr::new(192, 168, 2, 6)), Some(&16));
    /// assert_eq!(tree.find_best_ipv4(Ipv4Addr::new(192, 169, 0, 1)), None);
    /// ```
    pub fn find_best_ipv4(&self, addr: Ipv4Addr) -> Option<&T> {
        self.find(&addr.octets(), 32, false)
    }

    /// Longest-prefix match for an IPv6 address.
    pub fn find_best_ipv6(&self, addr: Ipv6Addr) -> Option<&T> {
        self.find(&addr.octets(), 128, false)
    }

    /// Whether an exact host entry for `addr` is stored.
    pub fn contains_ipv4(&self, addr: Ipv4Addr) -> bool {
        self.find_exact_ipv4(addr).is_some()
    }

    /// Whether an exact host entry for `addr` is stored.
    pub fn contains_ipv6(&self, addr: Ipv6Addr) -> bool {
        self.find_exact_ipv6(addr).is_some()
    }

    /// Whether `key` is stored.
    pub fn contains_generic(&self, key: &[u8]) -> bool {
        self.find_exact_generic(key).is_some()
    }

    fn find(&self, key: &[u8], bitlen: u16, exact: bool) -> Option<&T> {
        let mut idx = self.root?;
        while self.table[idx].bit < bitlen {
            idx = self.table.child(idx, bit_test(key, self.table[idx].bit))?;
        }
        let node = &self.table[idx];
        if node.bit != bitlen {
            return None;
        }
        let prefix = node.prefix.as_ref()?;
        let bytes = (bitlen / 8) as usize;
        if prefix.stream[..] == key[..bytes] {
            if let Some(user) = prefix.host_user() {
                return Some(user);
            }
        }
        if exact {
            return None;
        }
        self.find_netblock(key, bitlen, idx)
    }

    /// The netblock search: climb from the failed lookup towards the root;
    /// at every node with a non-empty propagation list, re-try the descent
    /// with the query chopped to each recorded mask. The lists are sorted
    /// descending and deeper nodes hold more specific masks, so the first
    /// hit is the longest matching prefix.
    fn find_netblock(&self, key: &[u8], bitlen: u16, start: usize) -> Option<&T> {
        let bytes = (bitlen / 8) as usize;
        let mut cursor = Some(start);
        while let Some(at) = cursor {
            cursor = self.table[at].parent;
            for &mask in &self.table[at].masks {
                let mut chopped = key[..bytes].to_vec();
                chop(&mut chopped, mask);

                let mut idx = at;
                let found = loop {
                    if self.table[idx].bit >= bitlen {
                        break Some(idx);
                    }
                    match self.table.child(idx, bit_test(&chopped, self.table[idx].bit)) {
                        Some(child) => idx = child,
                        None => break None,
                    }
                };
                let Some(found) = found else { continue };
                let node = &self.table[found];
                if node.bit != bitlen {
                    continue;
                }
                let Some(prefix) = node.prefix.as_ref() else {
                    continue;
                };
                if prefix.stream[..] == chopped[..] {
                    if let Some(user) = prefix.netblock_user(mask) {
                        return Some(user);
                    }
                }
            }
        }
        None
    }
}
