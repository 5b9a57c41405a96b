//! CIDR range loading
//!
//! Reads a plain-text list of IPv4 networks, one per line, and keeps the
//! lines that parse as a valid network in their original order. Blank and
//! malformed lines are skipped; a missing or unreadable file simply yields no
//! ranges and the caller decides what that means.

use crate::error::{AppError, Result};
use ipnet::Ipv4Net;
use std::fmt;
use std::net::Ipv4Addr;
use std::path::Path;
use std::str::FromStr;

/// A validated IPv4 network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressRange {
    net: Ipv4Net,
}

impl AddressRange {
    /// Build a range from a base address and prefix length.
    ///
    /// Fails when the prefix is longer than 32 or the base has host bits set.
    pub fn new(base: Ipv4Addr, prefix_len: u8) -> Result<Self> {
        let net = Ipv4Net::new(base, prefix_len)
            .map_err(|e| AppError::parse(format!("Invalid prefix length {}: {}", prefix_len, e)))?;
        Self::from_net(net)
    }

    /// Single-address range
    pub fn host(address: Ipv4Addr) -> Self {
        Self {
            net: Ipv4Net::from(address),
        }
    }

    fn from_net(net: Ipv4Net) -> Result<Self> {
        if net.addr() != net.network() {
            return Err(AppError::parse(format!(
                "{} has host bits set (network is {})",
                net,
                net.trunc()
            )));
        }
        Ok(Self { net })
    }

    /// First address of the network
    pub fn base(&self) -> Ipv4Addr {
        self.net.network()
    }

    pub fn prefix_len(&self) -> u8 {
        self.net.prefix_len()
    }

    /// Number of addresses covered, network and broadcast included
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.net.prefix_len()))
    }

    /// Address at `offset` from the base, if it lies inside the range
    pub fn nth(&self, offset: u64) -> Option<Ipv4Addr> {
        if offset >= self.size() {
            return None;
        }
        let base = u64::from(u32::from(self.base()));
        u32::try_from(base + offset).ok().map(Ipv4Addr::from)
    }

    pub fn contains(&self, address: &Ipv4Addr) -> bool {
        self.net.contains(address)
    }
}

impl FromStr for AddressRange {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.contains('/') {
            let net: Ipv4Net = s.parse()?;
            Self::from_net(net)
        } else {
            // A bare address is a single-host network
            let address: Ipv4Addr = s
                .parse()
                .map_err(|e| AppError::parse(format!("Invalid address '{}': {}", s, e)))?;
            Ok(Self::host(address))
        }
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.net)
    }
}

/// Ranges found in a source together with what was skipped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Valid ranges in input order
    pub ranges: Vec<AddressRange>,
    /// Lines that were empty after trimming
    pub blank_lines: usize,
    /// Lines that failed CIDR validation
    pub invalid_lines: usize,
    /// Why the source could not be read, if it could not
    pub read_error: Option<String>,
}

impl LoadReport {
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Parse CIDR text, keeping valid lines in order
pub fn parse_with_report(text: &str) -> LoadReport {
    let mut report = LoadReport::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            report.blank_lines += 1;
            continue;
        }

        match line.parse::<AddressRange>() {
            Ok(range) => report.ranges.push(range),
            Err(_) => report.invalid_lines += 1,
        }
    }

    report
}

/// Parse CIDR text and return only the valid ranges
pub fn parse_ranges(text: &str) -> Vec<AddressRange> {
    parse_with_report(text).ranges
}

/// Load a CIDR file; an unreadable source yields an empty report with `read_error` set
pub fn load_with_report(path: &Path) -> LoadReport {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_with_report(&text),
        Err(e) => LoadReport {
            read_error: Some(format!("{}: {}", path.display(), e)),
            ..LoadReport::default()
        },
    }
}

/// Load a CIDR file and return only the valid ranges
pub fn load_ranges(path: &Path) -> Vec<AddressRange> {
    load_with_report(path).ranges
}
