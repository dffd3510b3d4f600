//! Donation amount value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Minimum accepted donation, in whole currency units.
pub const MIN_DONATION_AMOUNT: f64 = 1.0;

/// Monetary amount of a donation, in whole currency units.
///
/// Guaranteed finite and at least [`MIN_DONATION_AMOUNT`]. The float
/// representation matches the upstream schema; comparisons in aggregate
/// checks should allow for float rounding.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DonationAmount(f64);

impl DonationAmount {
    /// Creates a validated donation amount.
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::invalid_format("amount", "not a number"));
        }
        if value < MIN_DONATION_AMOUNT {
            return Err(ValidationError::below_minimum(
                "amount",
                MIN_DONATION_AMOUNT,
                value,
            ));
        }
        Ok(Self(value))
    }

    /// Returns the amount as a float.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Returns the amount in minor units (cents), rounded to the nearest cent.
    ///
    /// Used when the payment gateway expects integer minor units.
    pub fn as_minor_units(&self) -> i64 {
        (self.0 * 100.0).round() as i64
    }
}

impl fmt::Display for DonationAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_minimum_amount() {
        let amount = DonationAmount::new(1.0).unwrap();
        assert_eq!(amount.value(), 1.0);
    }

    #[test]
    fn rejects_below_minimum() {
        assert!(DonationAmount::new(0.99).is_err());
        assert!(DonationAmount::new(0.0).is_err());
        assert!(DonationAmount::new(-5.0).is_err());
    }

    #[test]
    fn rejects_non_finite_values() {
        assert!(DonationAmount::new(f64::NAN).is_err());
        assert!(DonationAmount::new(f64::INFINITY).is_err());
    }

    #[test]
    fn converts_to_minor_units() {
        assert_eq!(DonationAmount::new(25.0).unwrap().as_minor_units(), 2500);
        assert_eq!(DonationAmount::new(19.99).unwrap().as_minor_units(), 1999);
    }

    #[test]
    fn displays_with_two_decimals() {
        assert_eq!(DonationAmount::new(25.0).unwrap().to_string(), "25.00");
        assert_eq!(DonationAmount::new(10.5).unwrap().to_string(), "10.50");
    }

    #[test]
    fn serializes_transparently() {
        let amount = DonationAmount::new(42.5).unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "42.5");

        let back: DonationAmount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }
}
