//! Human-facing token amounts
//!
//! A `UiAmount` is what a person types ("100", "12.5"). It only becomes a
//! ledger quantity once scaled by a token's decimals, and the scaling is
//! exact: no floating point is involved at any step.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

use super::{SdkError, SdkResult, MAX_DECIMALS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiAmount {
    whole: u64,
    /// Fractional digits exactly as written, without the dot
    fraction: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Integer(u64),
    Text(String),
}

impl UiAmount {
    /// Scale to base units: `amount * 10^decimals`
    pub fn to_base_units(&self, decimals: u8) -> SdkResult<u64> {
        if decimals > MAX_DECIMALS {
            return Err(SdkError::InvalidParameters(format!(
                "decimals {} exceeds maximum {}",
                decimals, MAX_DECIMALS
            )));
        }

        let significant = self.fraction.trim_end_matches('0');
        if significant.len() > decimals as usize {
            return Err(SdkError::InvalidParameters(format!(
                "amount {} has more precision than {} decimals",
                self, decimals
            )));
        }

        let scale = 10u64
            .checked_pow(decimals as u32)
            .ok_or(SdkError::MathOverflow)?;
        let whole_units = self
            .whole
            .checked_mul(scale)
            .ok_or(SdkError::MathOverflow)?;

        let fraction_units = if significant.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", significant, width = decimals as usize);
            padded.parse::<u64>().map_err(|_| SdkError::MathOverflow)?
        };

        whole_units
            .checked_add(fraction_units)
            .ok_or(SdkError::MathOverflow)
    }

    pub fn is_zero(&self) -> bool {
        self.whole == 0 && self.fraction.chars().all(|c| c == '0')
    }
}

impl FromStr for UiAmount {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || SdkError::InvalidParameters(format!("invalid token amount: {:?}", s));

        let (whole, fraction) = match s.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (s, ""),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if s.contains('.') && fraction.is_empty() {
            return Err(invalid());
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole = whole.parse::<u64>().map_err(|_| SdkError::MathOverflow)?;
        Ok(Self {
            whole,
            fraction: fraction.to_string(),
        })
    }
}

impl From<u64> for UiAmount {
    fn from(whole: u64) -> Self {
        Self {
            whole,
            fraction: String::new(),
        }
    }
}

impl<'de> Deserialize<'de> for UiAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawAmount::deserialize(deserializer)? {
            RawAmount::Integer(whole) => Ok(Self::from(whole)),
            RawAmount::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl Serialize for UiAmount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl From<UiAmount> for String {
    fn from(amount: UiAmount) -> Self {
        amount.to_string()
    }
}

impl fmt::Display for UiAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fraction.is_empty() {
            write!(f, "{}", self.whole)
        } else {
            write!(f, "{}.{}", self.whole, self.fraction)
        }
    }
}
