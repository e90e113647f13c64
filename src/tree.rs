//! Data structures for restricting which switches a trace may hop to.
use std::fs::File;
use std::io::Read;
use std::net::Ipv6Addr;
use std::path::Path;

use anyhow::{bail, Context, Result};
use ip_network_table_deps_treebitmap::IpLookupTable;
use log::{error, trace};

use crate::utilities::{parse_as_ipv6, read_lines_lossy};

/// A radix tree for fast IP lookups.
///
/// ```
/// use l2trace::tree::IpTree;
/// use l2trace::utilities::parse_as_ipv6;
///
/// let mut tree = IpTree::default();
/// tree.insert_string("10.1.0.0/16").unwrap();
/// tree.insert_string("2001:db8::/32").unwrap();
///
/// assert!(tree.contains(parse_as_ipv6("10.1.2.3").unwrap()));
/// assert!(!tree.contains(parse_as_ipv6("10.2.2.3").unwrap()));
/// assert!(tree.contains(parse_as_ipv6("2001:db8::1").unwrap()));
/// ```
#[derive(Default)]
pub struct IpTree {
    table: IpLookupTable<Ipv6Addr, ()>,
}

impl IpTree {
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("cannot open {path:?}"))?;
        Ok(Self::from_reader(file))
    }

    /// Build a tree from one prefix per line. Comments and invalid lines are skipped.
    pub fn from_reader<T: Read>(input: T) -> Self {
        let mut tree = Self::default();
        read_lines_lossy(input)
            .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
            .for_each(|line| match tree.insert_string(&line) {
                Ok(_) => {}
                Err(error) => error!("{}: {}", error, line),
            });
        tree
    }

    /// Insert a prefix such as `10.0.0.0/8`. A bare address is inserted as a host route.
    pub fn insert_string(&mut self, line: &str) -> Result<()> {
        // Only the first column is considered, so that files may carry descriptions.
        let first_col = line.split_whitespace().next().context("Empty line")?;
        let elems: Vec<&str> = first_col.split('/').collect();
        let addr = parse_as_ipv6(elems[0])?;
        let mut masklen: u32 = match elems.len() {
            1 if addr.to_ipv4_mapped().is_some() => 32,
            1 => 128,
            2 => elems[1].parse()?,
            _ => bail!("Invalid line"),
        };
        if addr.to_ipv4_mapped().is_some() {
            masklen += 96;
        }
        if masklen > 128 {
            bail!("Invalid prefix length");
        }
        self.table.insert(addr, masklen, ());
        Ok(())
    }

    pub fn contains(&self, addr: Ipv6Addr) -> bool {
        self.table.longest_match(addr).is_some()
    }
}

/// Allow and block lists of switch management addresses.
#[derive(Default)]
pub struct SwitchFilter {
    pub allowed: Option<IpTree>,
    pub blocked: Option<IpTree>,
}

impl SwitchFilter {
    /// Return true if the walk may hop to this switch.
    ///
    /// Without an allow list, any switch not blocked is permitted. Addresses that are not
    /// IP literals (e.g. hostnames) only pass when no list is configured.
    pub fn permits(&self, switch_address: &str) -> bool {
        if self.allowed.is_none() && self.blocked.is_none() {
            return true;
        }
        let Ok(addr) = parse_as_ipv6(switch_address) else {
            trace!("switch={} filter=not_an_ip", switch_address);
            return false;
        };
        if let Some(tree) = &self.allowed {
            if !tree.contains(addr) {
                trace!("switch={} filter=not_allowed", switch_address);
                return false;
            }
        }
        if let Some(tree) = &self.blocked {
            if tree.contains(addr) {
                trace!("switch={} filter=blocked", switch_address);
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::tree::{IpTree, SwitchFilter};
    use crate::utilities::parse_as_ipv6;

    #[test]
    fn test_from_reader_skips_comments_and_invalid_lines() {
        let input = "# management networks\n10.1.0.0/16 core\n\nnot-a-prefix\n10.9.9.9\n";
        let tree = IpTree::from_reader(input.as_bytes());
        assert!(tree.contains(parse_as_ipv6("10.1.200.1").unwrap()));
        assert!(tree.contains(parse_as_ipv6("10.9.9.9").unwrap()));
        assert!(!tree.contains(parse_as_ipv6("10.9.9.8").unwrap()));
    }

    #[test]
    fn test_from_reader_past_invalid_utf8() {
        let input: &[u8] = b"10.1.0.0/16\n\xff\xfe\n10.2.0.0/16\n";
        let tree = IpTree::from_reader(input);
        assert!(tree.contains(parse_as_ipv6("10.1.0.1").unwrap()));
        assert!(tree.contains(parse_as_ipv6("10.2.0.1").unwrap()));
    }

    #[test]
    fn test_empty_tree() {
        let tree = IpTree::default();
        assert!(!tree.contains(parse_as_ipv6("10.0.0.1").unwrap()));
    }

    #[test]
    fn test_insert_invalid() {
        let mut tree = IpTree::default();
        assert!(tree.insert_string("").is_err());
        assert!(tree.insert_string("10.0.0.0/8/8").is_err());
        assert!(tree.insert_string("10.0.0.0/40").is_err());
    }

    #[test]
    fn test_switch_filter() {
        let filter = SwitchFilter::default();
        assert!(filter.permits("10.0.0.1"));
        assert!(filter.permits("core-sw1"));

        let filter = SwitchFilter {
            allowed: Some(IpTree::from_reader("10.0.0.0/8".as_bytes())),
            blocked: Some(IpTree::from_reader("10.255.0.0/16".as_bytes())),
        };
        assert!(filter.permits("10.1.1.1"));
        assert!(!filter.permits("10.255.0.1"));
        assert!(!filter.permits("192.168.1.1"));
        assert!(!filter.permits("core-sw1"));
    }
}
