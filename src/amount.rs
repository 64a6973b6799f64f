// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

use core::fmt;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::CreationError;

/// Longest transaction amount EMV-MPM accepts, decimal point included.
const MAX_AMOUNT_LEN: usize = 13;

const AMOUNT_DECIMAL_PLACES: u32 = 2;

/// A non-negative BRL amount rounded to cents.
///
/// Midpoints round away from zero, so `10.005` becomes `10.01`. The amount always displays with
/// exactly two decimal places and a `.` separator.
///
/// # Invariants
/// The value is non-negative, has a scale of two and renders in at most 13 characters.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(Decimal);

impl Amount {
	/// Rounds `value` to cents, returning [`CreationError::InvalidAmount`] if it is negative or
	/// [`CreationError::AmountTooLong`] if it can't be written in 13 characters.
	pub fn from_decimal(value: Decimal) -> Result<Amount, CreationError> {
		if value.is_sign_negative() && !value.is_zero() {
			return Err(CreationError::InvalidAmount);
		}

		let mut rounded =
			value.round_dp_with_strategy(AMOUNT_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
		if rounded.is_zero() {
			// drops the sign of a negative zero
			rounded = Decimal::ZERO;
		}
		rounded.rescale(AMOUNT_DECIMAL_PLACES);

		if rounded.to_string().len() > MAX_AMOUNT_LEN {
			return Err(CreationError::AmountTooLong);
		}
		Ok(Amount(rounded))
	}

	/// Converts a float through its shortest decimal representation, then rounds it like
	/// [`Amount::from_decimal`]. NaN, infinities, values below zero and values out of the decimal
	/// range are rejected with [`CreationError::InvalidAmount`].
	pub fn from_f64(value: f64) -> Result<Amount, CreationError> {
		if !value.is_finite() || value < 0.0 {
			return Err(CreationError::InvalidAmount);
		}
		let decimal = Decimal::from_f64(value).ok_or(CreationError::InvalidAmount)?;
		Amount::from_decimal(decimal)
	}

	/// Returns the rounded amount.
	pub fn to_decimal(&self) -> Decimal {
		self.0
	}
}

impl TryFrom<Decimal> for Amount {
	type Error = CreationError;

	fn try_from(value: Decimal) -> Result<Self, Self::Error> {
		Amount::from_decimal(value)
	}
}

impl TryFrom<f64> for Amount {
	type Error = CreationError;

	fn try_from(value: f64) -> Result<Self, Self::Error> {
		Amount::from_f64(value)
	}
}

impl fmt::Display for Amount {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		fmt::Display::fmt(&self.0, f)
	}
}

#[cfg(test)]
mod tests {
	use super::Amount;
	use crate::CreationError;
	use rust_decimal::Decimal;

	fn fmt_decimal(num: i64, scale: u32) -> String {
		Amount::from_decimal(Decimal::new(num, scale)).unwrap().to_string()
	}

	#[test]
	fn test_two_decimal_places() {
		assert_eq!(fmt_decimal(10, 0), "10.00");
		assert_eq!(fmt_decimal(125, 1), "12.50");
		assert_eq!(fmt_decimal(0, 0), "0.00");
		assert_eq!(fmt_decimal(2500, 2), "25.00");
	}

	#[test]
	fn test_midpoint_rounds_away_from_zero() {
		assert_eq!(fmt_decimal(10005, 3), "10.01");
		assert_eq!(fmt_decimal(10004, 3), "10.00");
		assert_eq!(fmt_decimal(2675, 3), "2.68");
		assert_eq!(fmt_decimal(1, 3), "0.00");
	}

	#[test]
	fn test_from_f64() {
		assert_eq!(Amount::from_f64(10.0).unwrap().to_string(), "10.00");
		assert_eq!(Amount::from_f64(12.5).unwrap().to_string(), "12.50");
		assert_eq!(Amount::from_f64(0.1 + 0.2).unwrap().to_string(), "0.30");
		assert_eq!(Amount::from_f64(-0.0).unwrap().to_string(), "0.00");
		assert_eq!(Amount::try_from(42.5).unwrap(), Amount::from_decimal(Decimal::new(425, 1)).unwrap());
	}

	#[test]
	fn test_rejected_amounts() {
		assert_eq!(Amount::from_f64(f64::NAN), Err(CreationError::InvalidAmount));
		assert_eq!(Amount::from_f64(f64::INFINITY), Err(CreationError::InvalidAmount));
		assert_eq!(Amount::from_f64(f64::NEG_INFINITY), Err(CreationError::InvalidAmount));
		assert_eq!(Amount::from_f64(-1.0), Err(CreationError::InvalidAmount));
		assert_eq!(Amount::from_decimal(Decimal::new(-1, 3)), Err(CreationError::InvalidAmount));

		// Anything below zero is rejected before rounding, however small
		assert_eq!(Amount::from_f64(-1e-30), Err(CreationError::InvalidAmount));
		assert_eq!(Amount::from_decimal(Decimal::new(-1, 28)), Err(CreationError::InvalidAmount));
	}

	#[test]
	fn test_length_limit() {
		assert_eq!(fmt_decimal(999_999_999_999, 2), "9999999999.99");
		assert_eq!(Amount::from_decimal(Decimal::new(10_000_000_000, 0)), Err(CreationError::AmountTooLong));
		assert_eq!(Amount::try_from(Decimal::new(9_999_999_999_995, 3)), Err(CreationError::AmountTooLong));
	}
}
