//! Energy accounting.
//!
//! ```text
//! plain:      A * signatures + B * (60 + payloadSize) + base
//! sponsored:  A * (sender + sponsor signatures)
//!               + B * (2 + 60 [+ 32 if sponsored] + payloadSize) + base
//! ```
//!
//! `A` and `B` are [`ENERGY_PER_SIGNATURE`] and [`ENERGY_PER_BYTE`]. `base`
//! is the payload's own cost (see [`super::payload::Payload::base_energy_cost`]).
//! Signature counts are the *declared* ones from the builder header, so the
//! energy is fixed before anyone signs and the sign digest stays stable.
//!
//! The conversion from energy to microCCD is plain rational arithmetic
//! against the chain's exchange rates, rounded up.

use serde::{Deserialize, Serialize};

use super::error::TransactionError;
use super::header::{HeaderV0, HeaderV1};
use crate::config::{ENERGY_PER_BYTE, ENERGY_PER_SIGNATURE};
use crate::types::{CcdAmount, Energy, TypeError};

/// Energy for a plain (v0) transaction.
pub fn calculate_energy_v0(
    signature_count: u64,
    payload_size: u64,
    base: Energy,
) -> Result<Energy, TransactionError> {
    total_energy(signature_count, HeaderV0::SIZE, payload_size, base)
}

/// Energy for a sponsored (v1) transaction. `sponsor_signatures` is `None`
/// when there is no sponsor, which also shrinks the header.
pub fn calculate_energy_v1(
    sender_signatures: u64,
    sponsor_signatures: Option<u64>,
    payload_size: u64,
    base: Energy,
) -> Result<Energy, TransactionError> {
    let count = sender_signatures
        .checked_add(sponsor_signatures.unwrap_or(0))
        .ok_or(TransactionError::EnergyOverflow)?;
    let header = HeaderV1::size_for(sponsor_signatures.is_some());
    total_energy(count, header, payload_size, base)
}

fn total_energy(
    signature_count: u64,
    header_size: u64,
    payload_size: u64,
    base: Energy,
) -> Result<Energy, TransactionError> {
    ENERGY_PER_SIGNATURE
        .checked_mul(signature_count)
        .zip(
            header_size
                .checked_add(payload_size)
                .and_then(|bytes| ENERGY_PER_BYTE.checked_mul(bytes)),
        )
        .and_then(|(signatures, size)| signatures.checked_add(size))
        .and_then(|fixed| Energy::new(fixed).checked_add(base))
        .ok_or(TransactionError::EnergyOverflow)
}

// ---------------------------------------------------------------------------
// Exchange rates
// ---------------------------------------------------------------------------

/// A non-negative rational number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratio {
    pub numerator: u64,
    pub denominator: u64,
}

impl Ratio {
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, TypeError> {
        if denominator == 0 {
            return Err(TypeError::invalid("ratio", "denominator must not be zero"));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }
}

/// The two chain parameters that price energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub euro_per_energy: Ratio,
    pub micro_ccd_per_euro: Ratio,
}

/// Converts energy to the microCCD the sender pays for it, rounding up.
pub fn energy_to_micro_ccd(energy: Energy, rate: &ExchangeRate) -> Result<CcdAmount, TypeError> {
    let overflow = || TypeError::invalid("exchange rate", "cost does not fit in a CCD amount");
    let numerator = u128::from(rate.euro_per_energy.numerator)
        .checked_mul(u128::from(rate.micro_ccd_per_euro.numerator))
        .and_then(|n| n.checked_mul(u128::from(energy.value())))
        .ok_or_else(overflow)?;
    let denominator = u128::from(rate.euro_per_energy.denominator)
        .checked_mul(u128::from(rate.micro_ccd_per_euro.denominator))
        .filter(|d| *d != 0)
        .ok_or_else(|| TypeError::invalid("exchange rate", "denominator must not be zero"))?;
    let micro_ccd = numerator.div_ceil(denominator);
    u64::try_from(micro_ccd)
        .map(CcdAmount::from_micro_ccd)
        .map_err(|_| overflow())
}
