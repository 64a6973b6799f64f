// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Normalization of the free-text merchant name and city.

use unicode_normalization::UnicodeNormalization;

/// Combining Diacritical Marks block
fn is_combining_diacritic(c: char) -> bool {
	('\u{0300}'..='\u{036F}').contains(&c)
}

/// Prepares a merchant name or city for the payload.
///
/// The steps run in a fixed order: keep the first `max_chars` characters, decompose (NFD), drop
/// combining diacritics and upper-case. Truncating first means stripping accents can leave the
/// value shorter than `max_chars`. Characters outside printable ASCII that survive (`ø`, CJK, ...)
/// are then dropped and the result is clamped to `max_chars` again, since upper-casing may
/// expand a character (`ß` becomes `SS`).
pub(crate) fn merchant_text(input: &str, max_chars: usize) -> String {
	let truncated: String = input.chars().take(max_chars).collect();
	let stripped: String = truncated.nfd().filter(|c| !is_combining_diacritic(*c)).collect();
	stripped
		.to_uppercase()
		.chars()
		.filter(|c| *c == ' ' || c.is_ascii_graphic())
		.take(max_chars)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::merchant_text;
	use crate::{MAX_MERCHANT_CITY_CHARS, MAX_MERCHANT_NAME_CHARS};

	#[test]
	fn test_strips_accents_and_uppercases() {
		assert_eq!(merchant_text("São Paulo", MAX_MERCHANT_CITY_CHARS), "SAO PAULO");
		assert_eq!(merchant_text("Lanchonete São João", MAX_MERCHANT_NAME_CHARS), "LANCHONETE SAO JOAO");
		assert_eq!(merchant_text("Açaí & Cia.", MAX_MERCHANT_NAME_CHARS), "ACAI & CIA.");
	}

	#[test]
	fn test_truncates_before_normalizing() {
		assert_eq!(merchant_text(&"x".repeat(30), MAX_MERCHANT_NAME_CHARS), "X".repeat(25));
		assert_eq!(merchant_text("Ribeirão das Neves", MAX_MERCHANT_CITY_CHARS), "RIBEIRAO DAS NE");

		// An already decomposed accent counts as its own character before it is stripped
		let decomposed = "Sa\u{0303}o Paulo do Norte";
		assert_eq!(merchant_text(decomposed, MAX_MERCHANT_CITY_CHARS), "SAO PAULO DO N");
	}

	#[test]
	fn test_output_is_ascii() {
		assert_eq!(merchant_text("Smørrebrød", MAX_MERCHANT_NAME_CHARS), "SMRREBRD");
		assert_eq!(merchant_text("Straße", MAX_MERCHANT_CITY_CHARS), "STRASSE");
		assert_eq!(merchant_text("Großgaststätten Straße", MAX_MERCHANT_CITY_CHARS), "GROSSGASTSTATTE");
		assert_eq!(merchant_text("Tab\there", MAX_MERCHANT_CITY_CHARS), "TABHERE");
		assert_eq!(merchant_text("", MAX_MERCHANT_CITY_CHARS), "");
	}
}
