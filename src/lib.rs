//! A bit-level Patricia trie for longest-prefix matching on fixed-width
//! keys: IPv4 and IPv6 addresses in network byte order, and generic byte
//! keys of any whole-byte length.
//!
//! # Description of the tree
//!
//! Every stored key lives on a node together with a list of
//! `(netmask, payload)` entries, so a single address can simultaneously be
//! an exact host and the canonical form of one or more enclosing netblocks
//! (`10.1.0.0` may carry a host entry, `10.1.0.0/24`, and `10.1.0.0/16` at
//! once). Interior nodes carry the bit position at which their two subtrees
//! diverge, plus a *propagation list* of the netblock masks rooted beneath
//! them; best-match lookups use those lists to re-try the search with the
//! query chopped down to each stored netblock width.
//!
//! # Operations
//!
//! - [`RadixTree::add_ipv4`], [`RadixTree::add_ipv4_netblock`] and their
//!   IPv6 and generic counterparts insert keys. Duplicate insertions are
//!   silently ignored.
//! - [`RadixTree::remove_ipv4`] and friends remove a single
//!   `(key, netmask)` entry and hand its payload back; removing something
//!   that was never stored is a silent no-op.
//! - [`RadixTree::find_exact_ipv4`] matches hosts only;
//!   [`RadixTree::find_best_ipv4`] performs longest-prefix matching across
//!   hosts and netblocks.
//!
//! ```
//! use std::net::Ipv4Addr;
//! use netradix::RadixTree;
//!
//! let mut tree = RadixTree::new();
//! tree.add_ipv4_netblock(Ipv4Addr::new(10, 1, 0, 0), 16, "backbone")?;
//! tree.add_ipv4(Ipv4Addr::new(10, 1, 7, 9), "sensor");
//!
//! assert_eq!(tree.find_best_ipv4(Ipv4Addr::new(10, 1, 7, 9)), Some(&"sensor"));
//! assert_eq!(tree.find_best_ipv4(Ipv4Addr::new(10, 1, 200, 3)), Some(&"backbone"));
//! assert_eq!(tree.find_best_ipv4(Ipv4Addr::new(10, 2, 0, 1)), None);
//! # Ok::<(), netradix::RadixError>(())
//! ```
//!
//! The tree is a plain single-threaded value: no interior locking, no
//! atomics. Wrap it yourself if you mutate it from several threads.

mod add;
mod bits;
mod fmt;
mod get;
mod inner;
mod prefix;
mod remove;

#[cfg(test)]
mod fuzzing;

use inner::Table;
use thiserror::Error;

/// Keys longer than this cannot be represented with a `u16` bit length.
const MAX_KEY_BYTES: usize = (u16::MAX / 8) as usize;

/// The error type for insertions.
///
/// Everything else (lookups that find nothing, removals of absent entries,
/// duplicate insertions) is not an error and is reported through `Option`
/// and `bool` returns instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RadixError {
    /// The key stream is empty, or too long for its bit length to be
    /// representable.
    #[error("invalid key: {0} bytes (keys must be 1..=8191 bytes)")]
    InvalidKey(usize),
    /// A netblock mask exceeding the width of its address family.
    #[error("invalid netmask: /{netmask} exceeds the {bits}-bit address width")]
    InvalidNetmask { netmask: u8, bits: u16 },
}

/// A Patricia trie mapping byte-stream keys and netblocks to payloads of
/// type `T`.
///
/// Nodes are stored in an index-based arena; removal recycles slots through
/// a free list, and dropping the tree drops every payload still inside it.
pub struct RadixTree<T> {
    pub(crate) table: Table<T>,
    free: Vec<usize>,
    pub(crate) root: Option<usize>,
    count: usize,
}

impl<T> Default for RadixTree<T> {
    fn default() -> Self {
        RadixTree {
            table: Table::default(),
            free: Vec::new(),
            root: None,
            count: 0,
        }
    }
}

impl<T> RadixTree<T> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of stored `(key, netmask)` entries.
    ///
    /// ```
    /// use std::net::Ipv4Addr;
    /// use netradix::RadixTree;
    ///
    /// let mut tree = RadixTree::new();
    /// let addr = Ipv4Addr::new(10, 1, 0, 0);
    /// tree.add_ipv4(addr, 0);
    /// tree.add_ipv4_netblock(addr, 16, 1).unwrap();
    /// assert_eq!(tree.len(), 2);
    /// ```
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the tree stores no entries.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Drop every entry and payload, releasing the arena.
    pub fn clear(&mut self) {
        self.table.clear();
        self.free.clear();
        self.root = None;
        self.count = 0;
    }

    /// Allocate a node, preferring a recycled slot.
    pub(crate) fn alloc(&mut self, bit: u16, prefix: Option<prefix::Prefix<T>>) -> usize {
        self.table.alloc(&mut self.free, bit, prefix)
    }

    /// Return a node's slot to the free list, dropping whatever it held.
    pub(crate) fn free_node(&mut self, idx: usize) {
        let node = &mut self.table[idx];
        node.prefix = None;
        node.left = None;
        node.right = None;
        node.parent = None;
        node.masks.clear();
        self.free.push(idx);
    }

    /// Walk up from `idx` to the node that owns the propagation entry for
    /// `netmask`: the shallowest ancestor whose discriminator bit is still
    /// inside the netblock (`bit >= netmask`, parent `bit < netmask`).
    pub(crate) fn mask_node(&self, mut idx: usize, netmask: u16) -> usize {
        while let Some(parent) = self.table[idx].parent {
            if netmask > self.table[parent].bit {
                break;
            }
            idx = parent;
        }
        idx
    }
}

/// Validate a generic key and return its bit length.
pub(crate) fn key_bitlen(key: &[u8]) -> Result<u16, RadixError> {
    if key.is_empty() || key.len() > MAX_KEY_BYTES {
        return Err(RadixError::InvalidKey(key.len()));
    }
    Ok((key.len() * 8) as u16)
}
