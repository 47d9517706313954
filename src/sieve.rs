// src/sieve.rs

//! Combined arithmetic sieve: primality, the Möbius function, and the
//! distinct-prime-factor count ω, computed for `0..limit` in one pass.
//!
//! The table is built once per session (rebuilt only when the domain bound
//! changes) and read-shared by every render pass afterwards.

use anyhow::{ensure, Result};
use bitflags::bitflags;
use log::debug;

/// Hard ceiling on the sieve domain. Limits above this risk memory
/// exhaustion and must be rejected at build time, not truncated.
pub const MAX_SIEVE_LIMIT: usize = 20_000_000;

bitflags! {
    /// Which arrays a [`SieveTable`] materializes.
    ///
    /// `PRIMALITY` is always tracked; requesting `MOBIUS` or `OMEGA`
    /// switches the build to the full multiples sweep that accumulates
    /// per-factor data alongside compositeness.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SieveParts: u8 {
        const PRIMALITY = 1 << 0;
        const MOBIUS    = 1 << 1;
        const OMEGA     = 1 << 2;
    }
}

/// Sieve classification of a single integer, in display priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Prime,
    /// Squarefree with an odd number of prime factors (μ = -1).
    MuNeg,
    /// Has a squared prime factor (μ = 0).
    MuZero,
    /// Squarefree with an even number of prime factors (μ = +1).
    MuPos,
}

/// Immutable per-integer arithmetic data for `n` in `[0, limit)`.
#[derive(Debug, Clone)]
pub struct SieveTable {
    limit: usize,
    parts: SieveParts,
    is_prime: Vec<bool>,
    mobius: Vec<i8>,
    omega: Vec<u8>,
}

impl SieveTable {
    /// Builds the table for `[0, limit)`.
    ///
    /// With only `PRIMALITY` requested this runs the classic sieve of
    /// Eratosthenes with the outer loop bounded by `sqrt(limit)`. When
    /// `MOBIUS` or `OMEGA` is requested, every prime's full multiple chain
    /// is walked once, negating μ (and counting ω) as it clears composites,
    /// then multiples of the prime's square force μ to zero. One sweep
    /// populates everything; the table is never partially built.
    ///
    /// # Errors
    /// `limit` must be in `1..=MAX_SIEVE_LIMIT`.
    pub fn build(limit: usize, parts: SieveParts) -> Result<Self> {
        ensure!(limit > 0, "sieve limit must be positive");
        ensure!(
            limit <= MAX_SIEVE_LIMIT,
            "sieve limit {limit} exceeds the supported ceiling {MAX_SIEVE_LIMIT}"
        );
        let parts = parts | SieveParts::PRIMALITY;

        let mut is_prime = vec![true; limit];
        is_prime[0] = false;
        if limit > 1 {
            is_prime[1] = false;
        }

        let track_mobius = parts.contains(SieveParts::MOBIUS);
        let track_omega = parts.contains(SieveParts::OMEGA);
        let mut mobius: Vec<i8> = if track_mobius { vec![1; limit] } else { Vec::new() };
        let mut omega: Vec<u8> = if track_omega { vec![0; limit] } else { Vec::new() };
        if track_mobius {
            // mu(0): zero has every squared factor.
            mobius[0] = 0;
        }

        if track_mobius || track_omega {
            for i in 2..limit {
                if !is_prime[i] {
                    continue;
                }
                let mut j = i;
                while j < limit {
                    if j > i {
                        is_prime[j] = false;
                    }
                    if track_mobius {
                        mobius[j] = -mobius[j];
                    }
                    if track_omega {
                        omega[j] += 1;
                    }
                    j += i;
                }
                if track_mobius {
                    let sq = i * i;
                    let mut j = sq;
                    while j < limit {
                        mobius[j] = 0;
                        j += sq;
                    }
                }
            }
        } else {
            let mut i = 2;
            while i * i < limit {
                if is_prime[i] {
                    let mut j = i * i;
                    while j < limit {
                        is_prime[j] = false;
                        j += i;
                    }
                }
                i += 1;
            }
        }

        debug!("sieve built: limit={limit}, parts={parts:?}");
        Ok(Self {
            limit,
            parts,
            is_prime,
            mobius,
            omega,
        })
    }

    /// Exclusive upper bound of the built domain.
    #[inline]
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[inline]
    #[must_use]
    pub fn parts(&self) -> SieveParts {
        self.parts
    }

    /// False for out-of-domain `n` as well as composites.
    #[inline]
    #[must_use]
    pub fn is_prime(&self, n: u64) -> bool {
        (n as usize) < self.limit && self.is_prime[n as usize]
    }

    /// μ(n), or `None` when `n` is out of domain or μ was not built.
    #[inline]
    #[must_use]
    pub fn mobius(&self, n: u64) -> Option<i8> {
        if !self.parts.contains(SieveParts::MOBIUS) || (n as usize) >= self.limit {
            return None;
        }
        Some(self.mobius[n as usize])
    }

    /// ω(n), or `None` when `n` is out of domain or ω was not built.
    #[inline]
    #[must_use]
    pub fn omega(&self, n: u64) -> Option<u8> {
        if !self.parts.contains(SieveParts::OMEGA) || (n as usize) >= self.limit {
            return None;
        }
        Some(self.omega[n as usize])
    }

    /// Prime in a twin pair: `n` prime and `n-2` or `n+2` prime, within the
    /// built domain.
    #[must_use]
    pub fn is_twin_prime(&self, n: u64) -> bool {
        if !self.is_prime(n) {
            return false;
        }
        let below = n >= 2 && self.is_prime(n - 2);
        let above = ((n + 2) as usize) < self.limit && self.is_prime(n + 2);
        below || above
    }

    /// Classification used by the renderers. `None` means "unknown": `n` is
    /// outside the built domain, or the table lacks μ and `n` is composite.
    /// Unknown values render in the neutral fallback color, never fault.
    #[must_use]
    pub fn classify(&self, n: u64) -> Option<Classification> {
        if (n as usize) >= self.limit {
            return None;
        }
        if self.is_prime[n as usize] {
            return Some(Classification::Prime);
        }
        match self.mobius(n)? {
            -1 => Some(Classification::MuNeg),
            0 => Some(Classification::MuZero),
            _ => Some(Classification::MuPos),
        }
    }

    /// The ascending prime sequence of the domain.
    #[must_use]
    pub fn primes(&self) -> Vec<u64> {
        self.is_prime
            .iter()
            .enumerate()
            .filter_map(|(n, &p)| p.then_some(n as u64))
            .collect()
    }
}

/// Shorthand for [`SieveTable::build`].
///
/// # Errors
/// Same conditions as [`SieveTable::build`].
pub fn build(limit: usize, parts: SieveParts) -> Result<SieveTable> {
    SieveTable::build(limit, parts)
}
