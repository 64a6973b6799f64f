// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(missing_docs)]
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! This crate builds static Pix "Copia e Cola" payment strings, the EMV QR Code
//! Merchant-Presented Mode payloads that Brazilian banking apps read from a QR code or accept
//! pasted as text. If you just want to charge a checkout total this should get you started:
//!
//!   * For constructing payloads use the [`PixPayloadBuilder`] or fill a [`PixEncodingRequest`]
//!   * For serializing payloads use the `Display`/`ToString` traits or [`PixPayload::as_str`]
//!   * For a tenant's stored Pix settings use [`MerchantConfig`]
//!
//! Parsing payloads is out of scope; [`checksum::verify`] only re-checks the CRC of a string.

#[macro_use]
pub mod util;

pub mod checksum;
pub mod merchant;

mod amount;
mod normalize;
mod ser;

pub use crate::amount::Amount;
pub use crate::merchant::{checkout_reference, checkout_reference_now, MerchantConfig};

use core::fmt::{self, Display, Formatter};

use rust_decimal::Decimal;

/// Globally Unique Identifier of the Pix arrangement, carried in the Merchant Account
/// Information template.
pub const PIX_GUI: &str = "BR.GOV.BCB.PIX";

/// Maximum number of characters kept from the merchant name.
pub const MAX_MERCHANT_NAME_CHARS: usize = 25;

/// Maximum number of characters kept from the merchant city.
pub const MAX_MERCHANT_CITY_CHARS: usize = 15;

/// Largest value a single TLV field can carry, bounded by its two-digit length.
pub const MAX_FIELD_VALUE_LEN: usize = 99;

/// Reference label used when no transaction id is given, meaning "no specific id".
pub const DEFAULT_TRANSACTION_ID: &str = "***";

/// The CRC tag and its fixed length. Written before the checksum and covered by it.
pub const CRC_FIELD_PREFIX: &str = "6304";

const PAYLOAD_FORMAT_VERSION: &str = "01";
const MERCHANT_CATEGORY_CODE_UNSPECIFIED: &str = "0000";
// ISO 4217 numeric code for BRL
const CURRENCY_BRL: &str = "986";
const COUNTRY_CODE_BR: &str = "BR";

/// Tags of the EMV-MPM fields emitted by this crate. Tags inside the `26` and `62` templates
/// reuse low numbers and are only meaningful within their template.
#[allow(missing_docs)]
pub mod constants {
	use crate::Tag;

	pub const TAG_PAYLOAD_FORMAT_INDICATOR: Tag = Tag(0);
	pub const TAG_MERCHANT_ACCOUNT_INFORMATION: Tag = Tag(26);
	pub const TAG_MERCHANT_CATEGORY_CODE: Tag = Tag(52);
	pub const TAG_TRANSACTION_CURRENCY: Tag = Tag(53);
	pub const TAG_TRANSACTION_AMOUNT: Tag = Tag(54);
	pub const TAG_COUNTRY_CODE: Tag = Tag(58);
	pub const TAG_MERCHANT_NAME: Tag = Tag(59);
	pub const TAG_MERCHANT_CITY: Tag = Tag(60);
	pub const TAG_ADDITIONAL_DATA_FIELD: Tag = Tag(62);
	pub const TAG_CRC: Tag = Tag(63);

	// Within TAG_MERCHANT_ACCOUNT_INFORMATION
	pub const TAG_GUI: Tag = Tag(0);
	pub const TAG_PIX_KEY: Tag = Tag(1);

	// Within TAG_ADDITIONAL_DATA_FIELD
	pub const TAG_REFERENCE_LABEL: Tag = Tag(5);
}

use crate::constants::*;

/// Two-digit identifier of a TLV field.
///
/// # Invariants
/// The id is at most 99.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Tag(u8);

impl Tag {
	/// Creates a tag if `id` fits in two decimal digits.
	pub fn new(id: u8) -> Option<Tag> {
		if id <= 99 {
			Some(Tag(id))
		} else {
			None
		}
	}

	/// Returns the numeric id of the tag.
	pub fn id(&self) -> u8 {
		self.0
	}
}

/// Value of a TLV field: either plain text or an ordered list of nested fields (a template).
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum FieldValue {
	/// An ASCII text value
	Text(String),
	/// A template whose value is the concatenation of the nested fields
	Nested(Vec<Field>),
}

/// A single Tag-Length-Value field.
///
/// # Invariants
/// The serialized value is ASCII and at most [`MAX_FIELD_VALUE_LEN`] characters long, so the
/// length always fits the two-digit length prefix.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Field {
	tag: Tag,
	value: FieldValue,
}

impl Field {
	/// Creates a text field, returning [`CreationError::NonAsciiField`] or
	/// [`CreationError::FieldTooLong`] if `value` can't be encoded.
	pub fn text<S: Into<String>>(tag: Tag, value: S) -> Result<Field, CreationError> {
		let value = value.into();
		if !value.is_ascii() {
			return Err(CreationError::NonAsciiField(tag));
		}
		Field::checked(tag, FieldValue::Text(value))
	}

	/// Creates a template field from already valid nested fields, returning
	/// [`CreationError::FieldTooLong`] if together they exceed [`MAX_FIELD_VALUE_LEN`].
	pub fn nested(tag: Tag, fields: Vec<Field>) -> Result<Field, CreationError> {
		Field::checked(tag, FieldValue::Nested(fields))
	}

	fn checked(tag: Tag, value: FieldValue) -> Result<Field, CreationError> {
		let field = Field { tag, value };
		if field.value_len() > MAX_FIELD_VALUE_LEN {
			Err(CreationError::FieldTooLong(tag))
		} else {
			Ok(field)
		}
	}

	/// Returns the tag of the field.
	pub fn tag(&self) -> Tag {
		self.tag
	}

	/// Returns the value of the field.
	pub fn value(&self) -> &FieldValue {
		&self.value
	}

	/// Returns the text value, or `None` for templates.
	pub fn as_text(&self) -> Option<&str> {
		match self.value {
			FieldValue::Text(ref text) => Some(text.as_str()),
			FieldValue::Nested(_) => None,
		}
	}

	/// Returns the nested field with the given tag, or `None` for text fields.
	pub fn find(&self, tag: Tag) -> Option<&Field> {
		match self.value {
			FieldValue::Text(_) => None,
			FieldValue::Nested(ref fields) => fields.iter().find(|f| f.tag == tag),
		}
	}
}

/// The reference label written for `transaction_id`, [`DEFAULT_TRANSACTION_ID`] when it is absent
/// or empty.
pub(crate) fn reference_label(transaction_id: Option<&str>) -> &str {
	match transaction_id {
		Some(id) if !id.is_empty() => id,
		_ => DEFAULT_TRANSACTION_ID,
	}
}

/// The parameters of a single checkout attempt. Fill it and call [`PixEncodingRequest::encode`],
/// or use the [`PixPayloadBuilder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixEncodingRequest {
	/// The Pix key receiving the payment (email, phone, random key or tax id)
	pub merchant_key: String,
	/// Display name of the receiver, normalized and cut to [`MAX_MERCHANT_NAME_CHARS`]
	pub merchant_name: String,
	/// City of the receiver, normalized and cut to [`MAX_MERCHANT_CITY_CHARS`]
	pub merchant_city: String,
	/// Reference of the checkout; [`DEFAULT_TRANSACTION_ID`] is used when absent or empty
	pub transaction_id: Option<String>,
	/// Amount to charge, in BRL
	pub amount: Decimal,
}

impl PixEncodingRequest {
	/// Validates the request and encodes it.
	///
	/// Never emits a payload with an empty key, name or city; see [`CreationError`] for what is
	/// rejected.
	pub fn encode(&self) -> Result<PixPayload, CreationError> {
		let merchant_key = self.merchant_key.trim();
		if merchant_key.is_empty() {
			return Err(CreationError::MissingMerchantKey);
		}

		let amount = Amount::from_decimal(self.amount)?;

		let merchant_name = normalize::merchant_text(&self.merchant_name, MAX_MERCHANT_NAME_CHARS);
		if merchant_name.trim().is_empty() {
			return Err(CreationError::MissingMerchantName);
		}

		let merchant_city = normalize::merchant_text(&self.merchant_city, MAX_MERCHANT_CITY_CHARS);
		if merchant_city.trim().is_empty() {
			return Err(CreationError::MissingMerchantCity);
		}

		let transaction_id = reference_label(self.transaction_id.as_deref());

		let fields = vec![
			Field::text(TAG_PAYLOAD_FORMAT_INDICATOR, PAYLOAD_FORMAT_VERSION)?,
			Field::nested(TAG_MERCHANT_ACCOUNT_INFORMATION, vec![
				Field::text(TAG_GUI, PIX_GUI)?,
				Field::text(TAG_PIX_KEY, merchant_key)?,
			])?,
			Field::text(TAG_MERCHANT_CATEGORY_CODE, MERCHANT_CATEGORY_CODE_UNSPECIFIED)?,
			Field::text(TAG_TRANSACTION_CURRENCY, CURRENCY_BRL)?,
			Field::text(TAG_TRANSACTION_AMOUNT, amount.to_string())?,
			Field::text(TAG_COUNTRY_CODE, COUNTRY_CODE_BR)?,
			Field::text(TAG_MERCHANT_NAME, merchant_name)?,
			Field::text(TAG_MERCHANT_CITY, merchant_city)?,
			Field::nested(TAG_ADDITIONAL_DATA_FIELD, vec![
				Field::text(TAG_REFERENCE_LABEL, transaction_id)?,
			])?,
		];

		Ok(PixPayload::from_fields(fields))
	}
}

/// Builder for [`PixPayload`]s. Setters never fail; the first problem found is kept and returned
/// by [`PixPayloadBuilder::build`].
///
/// ```
/// use pix_payload::PixPayloadBuilder;
///
/// let payload = PixPayloadBuilder::new()
/// 	.merchant_key("chave@teste.com")
/// 	.merchant_name("Loja Teste")
/// 	.merchant_city("São Paulo")
/// 	.transaction_id("TXID01")
/// 	.amount_f64(25.0)
/// 	.build()
/// 	.unwrap();
///
/// assert!(payload.to_string().starts_with("000201"));
/// assert!(pix_payload::checksum::verify(payload.as_str()));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PixPayloadBuilder {
	merchant_key: Option<String>,
	merchant_name: Option<String>,
	merchant_city: Option<String>,
	transaction_id: Option<String>,
	amount: Option<Decimal>,
	error: Option<CreationError>,
}

impl PixPayloadBuilder {
	/// Construct new, empty `PixPayloadBuilder`. Key, name, city and amount have to be set before
	/// [`PixPayloadBuilder::build`] succeeds.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the Pix key receiving the payment.
	pub fn merchant_key<S: Into<String>>(mut self, key: S) -> Self {
		self.merchant_key = Some(key.into());
		self
	}

	/// Sets the receiver's display name.
	pub fn merchant_name<S: Into<String>>(mut self, name: S) -> Self {
		self.merchant_name = Some(name.into());
		self
	}

	/// Sets the receiver's city.
	pub fn merchant_city<S: Into<String>>(mut self, city: S) -> Self {
		self.merchant_city = Some(city.into());
		self
	}

	/// Sets the reference label of the checkout.
	pub fn transaction_id<S: Into<String>>(mut self, id: S) -> Self {
		self.transaction_id = Some(id.into());
		self
	}

	/// Sets the amount in BRL.
	pub fn amount(mut self, amount: Decimal) -> Self {
		self.amount = Some(amount);
		self
	}

	/// Sets the amount in BRL from a float, as checkout totals are computed by the storefront.
	/// NaN, infinite or negative values make [`PixPayloadBuilder::build`] fail with
	/// [`CreationError::InvalidAmount`].
	pub fn amount_f64(mut self, amount: f64) -> Self {
		match Amount::from_f64(amount) {
			Ok(a) => self.amount = Some(a.to_decimal()),
			Err(e) => self.set_error(e),
		}
		self
	}

	fn set_error(&mut self, error: CreationError) {
		if self.error.is_none() {
			self.error = Some(error);
		}
	}

	/// Validates all fields and encodes the payload.
	pub fn build(self) -> Result<PixPayload, CreationError> {
		// If an error occurred at any time before, return it now
		if let Some(e) = self.error {
			return Err(e);
		}

		let request = PixEncodingRequest {
			merchant_key: self.merchant_key.ok_or(CreationError::MissingMerchantKey)?,
			merchant_name: self.merchant_name.ok_or(CreationError::MissingMerchantName)?,
			merchant_city: self.merchant_city.ok_or(CreationError::MissingMerchantCity)?,
			transaction_id: self.transaction_id,
			amount: self.amount.ok_or(CreationError::InvalidAmount)?,
		};
		request.encode()
	}
}

/// Represents a syntactically correct static Pix payload, ready to be rendered as a QR code or
/// copied as text.
///
/// There are two ways to construct a `PixPayload`:
///  1. using [`PixPayloadBuilder`]
///  2. using [`PixEncodingRequest::encode`]
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct PixPayload {
	fields: Vec<Field>,
	checksum: u16,
	/// The full payload string, checksum included
	encoded: String,
}

impl PixPayload {
	fn from_fields(fields: Vec<Field>) -> PixPayload {
		let mut encoded = String::with_capacity(
			fields.iter().map(|f| f.encoded_len()).sum::<usize>() + CRC_FIELD_PREFIX.len() + checksum::CHECKSUM_LEN,
		);
		for field in fields.iter() {
			encoded.push_str(&field.to_string());
		}
		encoded.push_str(CRC_FIELD_PREFIX);

		let checksum = checksum::crc16(encoded.as_bytes());
		encoded.push_str(&checksum::Crc16Hex(checksum).to_string());

		PixPayload { fields, checksum, encoded }
	}

	/// Returns the top-level fields, excluding the trailing CRC field.
	pub fn fields(&self) -> &[Field] {
		&self.fields
	}

	/// Returns the top-level field with the given tag.
	pub fn field(&self, tag: Tag) -> Option<&Field> {
		self.fields.iter().find(|f| f.tag == tag)
	}

	/// Returns the CRC-16/CCITT-FALSE checksum terminating the payload.
	pub fn checksum(&self) -> u16 {
		self.checksum
	}

	/// Returns the normalized merchant name as encoded.
	pub fn merchant_name(&self) -> &str {
		self.text_field(TAG_MERCHANT_NAME)
	}

	/// Returns the normalized merchant city as encoded.
	pub fn merchant_city(&self) -> &str {
		self.text_field(TAG_MERCHANT_CITY)
	}

	/// Returns the two-decimal amount as encoded.
	pub fn amount(&self) -> &str {
		self.text_field(TAG_TRANSACTION_AMOUNT)
	}

	/// Returns the reference label, [`DEFAULT_TRANSACTION_ID`] if none was given.
	pub fn transaction_id(&self) -> &str {
		self.field(TAG_ADDITIONAL_DATA_FIELD)
			.and_then(|f| f.find(TAG_REFERENCE_LABEL))
			.and_then(Field::as_text)
			.unwrap_or(DEFAULT_TRANSACTION_ID)
	}

	fn text_field(&self, tag: Tag) -> &str {
		self.field(tag).and_then(Field::as_text).unwrap_or("")
	}

	/// Returns the payload string.
	pub fn as_str(&self) -> &str {
		&self.encoded
	}

	/// Returns the underlying payload `String`
	pub fn into_string(self) -> String {
		self.encoded
	}
}

impl AsRef<str> for PixPayload {
	fn as_ref(&self) -> &str {
		&self.encoded
	}
}

/// Errors that may occur when constructing a [`PixPayload`].
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CreationError {
	/// No Pix key was given, or it was blank
	MissingMerchantKey,

	/// The merchant name was missing or nothing was left of it after normalization
	MissingMerchantName,

	/// The merchant city was missing or nothing was left of it after normalization
	MissingMerchantCity,

	/// The amount was missing, negative, NaN or infinite
	InvalidAmount,

	/// The amount needs more than the 13 characters allowed for the transaction amount field
	AmountTooLong,

	/// The value of the field with the given tag was longer than [`MAX_FIELD_VALUE_LEN`]
	/// characters
	FieldTooLong(Tag),

	/// The value of the field with the given tag contained non-ASCII characters
	NonAsciiField(Tag),
}

impl Display for CreationError {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			CreationError::MissingMerchantKey => f.write_str("No Pix key was supplied"),
			CreationError::MissingMerchantName => f.write_str("The merchant name was empty after normalization"),
			CreationError::MissingMerchantCity => f.write_str("The merchant city was empty after normalization"),
			CreationError::InvalidAmount => f.write_str("The amount was missing, negative or not a finite number"),
			CreationError::AmountTooLong => f.write_str("The amount does not fit in 13 characters"),
			CreationError::FieldTooLong(tag) => write!(f, "The value of field {} was longer than 99 characters", tag),
			CreationError::NonAsciiField(tag) => write!(f, "The value of field {} contained non-ASCII characters", tag),
		}
	}
}

impl std::error::Error for CreationError {}
