// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! The CRC-16/CCITT-FALSE checksum terminating every payload.
//!
//! Polynomial `0x1021`, initial register `0xFFFF`, MSB first, no reflection and no final XOR.
//! The catalog calls this variant CRC-16/IBM-3740.

use core::fmt;

use crc::{Crc, CRC_16_IBM_3740};

const PIX_CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Number of hex digits the checksum is rendered with.
pub const CHECKSUM_LEN: usize = 4;

/// Computes the CRC-16/CCITT-FALSE of `data`.
pub fn crc16(data: &[u8]) -> u16 {
	PIX_CRC.checksum(data)
}

/// Displays a checksum as four zero-padded uppercase hex digits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Crc16Hex(pub u16);

impl fmt::Display for Crc16Hex {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{:04X}", self.0)
	}
}

/// Returns true if the last four characters of `payload` are the checksum of everything before
/// them, as produced by [`crate::PixPayload`].
///
/// Only the checksum is checked; the TLV structure is not parsed.
pub fn verify(payload: &str) -> bool {
	if !payload.is_ascii() || payload.len() < CHECKSUM_LEN {
		return false;
	}
	let (body, checksum) = payload.split_at(payload.len() - CHECKSUM_LEN);
	Crc16Hex(crc16(body.as_bytes())).to_string() == checksum
}
