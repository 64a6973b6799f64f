// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

use core::fmt;
use core::fmt::{Display, Formatter};

use super::{Field, FieldValue, PixPayload, Tag};

/// Length of the tag and length prefixes of every field
const FIELD_HEADER_LEN: usize = 4;

impl Field {
	/// Number of characters of the serialized value, which is what the length prefix carries.
	pub fn value_len(&self) -> usize {
		match self.value {
			// Text values are ASCII, so bytes and characters agree
			FieldValue::Text(ref text) => text.len(),
			FieldValue::Nested(ref fields) => fields.iter().map(|f| f.encoded_len()).sum(),
		}
	}

	/// Number of characters of the whole serialized field, prefixes included.
	pub fn encoded_len(&self) -> usize {
		FIELD_HEADER_LEN + self.value_len()
	}
}

impl Display for Tag {
	fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
		write!(f, "{:02}", self.0)
	}
}

impl Display for Field {
	fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
		write!(f, "{}{:02}{}", self.tag, self.value_len(), self.value)
	}
}

impl Display for FieldValue {
	fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
		match *self {
			FieldValue::Text(ref text) => f.write_str(text),
			FieldValue::Nested(ref fields) => {
				for field in fields.iter() {
					Display::fmt(field, f)?;
				}
				Ok(())
			},
		}
	}
}

impl Display for PixPayload {
	fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod test {
	use crate::constants::*;
	use crate::{Field, PIX_GUI};

	#[test]
	fn test_tag_padding() {
		assert_eq!(TAG_PAYLOAD_FORMAT_INDICATOR.to_string(), "00");
		assert_eq!(TAG_REFERENCE_LABEL.to_string(), "05");
		assert_eq!(TAG_MERCHANT_CITY.to_string(), "60");
	}

	#[test]
	fn test_text_field() {
		let field = Field::text(TAG_PAYLOAD_FORMAT_INDICATOR, "01").unwrap();
		assert_eq!(field.to_string(), "000201");
		assert_eq!(field.value_len(), 2);
		assert_eq!(field.encoded_len(), 6);

		let empty = Field::text(TAG_MERCHANT_NAME, "").unwrap();
		assert_eq!(empty.to_string(), "5900");

		let long = Field::text(TAG_PIX_KEY, "x".repeat(99)).unwrap();
		assert!(long.to_string().starts_with("0199xxx"));
	}

	#[test]
	fn test_merchant_account_template() {
		let template = Field::nested(TAG_MERCHANT_ACCOUNT_INFORMATION, vec![
			Field::text(TAG_GUI, PIX_GUI).unwrap(),
			Field::text(TAG_PIX_KEY, "chave@teste.com").unwrap(),
		]).unwrap();

		assert_eq!(template.value_len(), 37);
		assert_eq!(template.to_string(), "26370014BR.GOV.BCB.PIX0115chave@teste.com");
		assert_eq!(template.encoded_len(), template.to_string().len());
	}

	#[test]
	fn test_additional_data_template() {
		let template = Field::nested(TAG_ADDITIONAL_DATA_FIELD, vec![
			Field::text(TAG_REFERENCE_LABEL, "***").unwrap(),
		]).unwrap();
		assert_eq!(template.to_string(), "62070503***");
	}
}
