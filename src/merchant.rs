// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! A tenant's Pix settings and the checkout-side helpers built on them.

use core::ops::Deref;
use core::time::Duration;

use std::time::{SystemTime, UNIX_EPOCH};

use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::util::logger::Logger;
use crate::{CreationError, PixEncodingRequest, PixPayload};

/// Prefix of every reference generated at checkout.
pub const CHECKOUT_REFERENCE_PREFIX: &str = "PED";

const CHECKOUT_REFERENCE_MODULUS: u128 = 1_000_000;

/// Pix settings of a store, as configured by the tenant. Every setting is optional; a store
/// without a key simply doesn't offer Pix at checkout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MerchantConfig {
	/// The Pix key receiving payments
	pub pix_key: Option<String>,
	/// Name of the account holder, shown to the payer by their bank
	pub pix_name: Option<String>,
	/// City of the account holder
	pub pix_city: Option<String>,
}

impl MerchantConfig {
	/// Creates a configuration with all settings present.
	pub fn new<K: Into<String>, N: Into<String>, C: Into<String>>(key: K, name: N, city: C) -> Self {
		MerchantConfig { pix_key: Some(key.into()), pix_name: Some(name.into()), pix_city: Some(city.into()) }
	}

	/// Whether Pix should be offered at checkout, i.e. a non-blank key is configured.
	pub fn accepts_pix(&self) -> bool {
		self.pix_key.as_deref().map_or(false, |key| !key.trim().is_empty())
	}

	/// Builds the payload charging `total` (already net of delivery fee and discount) under the
	/// given checkout reference.
	///
	/// The merchant key is never logged.
	pub fn checkout_payload<L: Deref>(
		&self, total: Decimal, reference: Option<&str>, logger: &L,
	) -> Result<PixPayload, CreationError>
	where
		L::Target: Logger,
	{
		if !self.accepts_pix() {
			log_trace!(logger, "Pix requested for a store without a Pix key");
			return Err(CreationError::MissingMerchantKey);
		}

		let request = PixEncodingRequest {
			merchant_key: self.pix_key.clone().unwrap_or_default(),
			merchant_name: self.pix_name.clone().unwrap_or_default(),
			merchant_city: self.pix_city.clone().unwrap_or_default(),
			transaction_id: reference.map(str::to_owned),
			amount: total,
		};

		match request.encode() {
			Ok(payload) => {
				log_debug!(logger, "Built Pix payload {} for {} BRL with checksum {}",
					payload.transaction_id(), payload.amount(), crate::checksum::Crc16Hex(payload.checksum()));
				Ok(payload)
			},
			Err(e) => {
				log_warn!(logger, "Rejected Pix checkout {}: {}", crate::reference_label(reference), e);
				Err(e)
			},
		}
	}
}

/// Generates the checkout reference used as transaction id: [`CHECKOUT_REFERENCE_PREFIX`]
/// followed by the last six digits of the Unix time in milliseconds.
///
/// References repeat every 1000 seconds; they only need to tell apart the attempts a store
/// sees at the same time.
pub fn checkout_reference(since_epoch: Duration) -> String {
	format!("{}{:06}", CHECKOUT_REFERENCE_PREFIX, since_epoch.as_millis() % CHECKOUT_REFERENCE_MODULUS)
}

/// [`checkout_reference`] for the current system time. A clock set before the Unix epoch yields
/// `PED000000`.
pub fn checkout_reference_now() -> String {
	let since_epoch = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or(Duration::from_secs(0));
	checkout_reference(since_epoch)
}
