//! Random address sampling across CIDR ranges
//!
//! Each draw picks one range uniformly (regardless of its size) and then one
//! address uniformly inside it. Small ranges are therefore over-represented
//! relative to the combined address space; existing deployments rely on this
//! distribution, so it is kept.

use crate::ranges::AddressRange;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::net::Ipv4Addr;

/// Outcome of one sampling pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sample {
    /// Distinct addresses in the order they were first drawn
    pub addresses: Vec<Ipv4Addr>,
    /// Number of draws performed
    pub attempts: usize,
}

impl Sample {
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Draws distinct addresses from a set of ranges
#[derive(Debug, Clone, Copy)]
pub struct AddressSampler {
    /// Draw budget per requested address
    attempt_factor: usize,
}

impl Default for AddressSampler {
    fn default() -> Self {
        Self {
            attempt_factor: crate::defaults::SAMPLE_ATTEMPT_FACTOR,
        }
    }
}

impl AddressSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw budget for a given target count
    pub fn max_attempts(&self, target: usize) -> usize {
        target.saturating_mul(self.attempt_factor)
    }

    /// Draw up to `target` distinct addresses.
    ///
    /// Stops once `target` addresses are collected or the draw budget is spent;
    /// a short sample is a valid result when ranges are small or overlapping.
    pub fn sample<R: Rng + ?Sized>(&self, ranges: &[AddressRange], target: usize, rng: &mut R) -> Sample {
        let mut sample = Sample::default();
        if ranges.is_empty() {
            return sample;
        }

        let max_attempts = self.max_attempts(target);
        let mut seen = HashSet::with_capacity(target);

        while sample.addresses.len() < target && sample.attempts < max_attempts {
            sample.attempts += 1;

            let Some(range) = ranges.choose(rng) else {
                break;
            };
            let address = draw_address(range, rng);

            if seen.insert(address) {
                sample.addresses.push(address);
            }
        }

        sample
    }
}

/// One uniformly random address from `range`
fn draw_address<R: Rng + ?Sized>(range: &AddressRange, rng: &mut R) -> Ipv4Addr {
    let size = range.size();
    if size == 1 {
        return range.base();
    }
    let offset = rng.gen_range(0..size);
    range.nth(offset).unwrap_or_else(|| range.base())
}

/// Sample with the thread-local RNG and default draw budget
pub fn sample_addresses(ranges: &[AddressRange], target: usize) -> Vec<Ipv4Addr> {
    AddressSampler::default()
        .sample(ranges, target, &mut rand::thread_rng())
        .addresses
}
