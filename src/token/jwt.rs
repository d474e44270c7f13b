//! JWT expiry decoding used to decide whether an access token needs a refresh.
//!
//! Only the payload segment is inspected; signatures are the API's concern, not the
//! client's.

// crates.io
use base64::{
	Engine,
	alphabet,
	engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
// self
use crate::_prelude::*;

const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
	&alphabet::URL_SAFE,
	GeneralPurposeConfig::new()
		.with_encode_padding(false)
		.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Failures raised while decoding a token's expiry claim.
#[derive(Debug, ThisError)]
pub enum TokenDecodeError {
	/// Token does not have the `header.payload.signature` shape.
	#[error("JWT must have 3 parts.")]
	Malformed,
	/// Payload segment is not base64url.
	#[error("JWT payload is not valid base64url.")]
	Encoding(#[from] base64::DecodeError),
	/// Payload is not a JSON object with a numeric `exp`.
	#[error("JWT claims cannot be parsed.")]
	Claims(#[from] serde_path_to_error::Error<serde_json::Error>),
	/// `exp` is outside the representable date range.
	#[error("JWT expiry {exp} is out of range.")]
	ExpiryOutOfRange {
		/// Raw `exp` claim in seconds since the Unix epoch.
		exp: i64,
	},
}

/// Decodes the expiry instant embedded in an access token.
pub trait ExpiryDecoder
where
	Self: Send + Sync,
{
	/// Returns the token's expiry, or `None` when the token carries no expiry.
	fn expires_at(&self, token: &str) -> Result<Option<OffsetDateTime>, TokenDecodeError>;

	/// Returns `true` when `now + margin` has reached the token's expiry.
	///
	/// Tokens without an expiry never expire.
	fn is_expired_at(
		&self,
		token: &str,
		margin: Duration,
		now: OffsetDateTime,
	) -> Result<bool, TokenDecodeError> {
		let Some(expiry) = self.expires_at(token)? else {
			return Ok(false);
		};

		Ok(match now.checked_add(margin) {
			Some(deadline) => deadline >= expiry,
			None => true,
		})
	}

	/// [`ExpiryDecoder::is_expired_at`] evaluated against the current UTC instant.
	fn is_expired(&self, token: &str, margin: Duration) -> Result<bool, TokenDecodeError> {
		self.is_expired_at(token, margin, OffsetDateTime::now_utc())
	}
}

#[derive(Deserialize)]
struct ExpiryClaims {
	#[serde(default)]
	exp: Option<f64>,
}

/// Default [`ExpiryDecoder`] reading the `exp` claim of a compact JWS.
#[derive(Clone, Copy, Debug, Default)]
pub struct JwtDecoder;
impl ExpiryDecoder for JwtDecoder {
	fn expires_at(&self, token: &str) -> Result<Option<OffsetDateTime>, TokenDecodeError> {
		let mut parts = token.split('.');
		let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
			(Some(_), Some(payload), Some(_), None) => payload,
			_ => return Err(TokenDecodeError::Malformed),
		};
		let bytes = PAYLOAD_ENGINE.decode(payload)?;
		let mut de = serde_json::Deserializer::from_slice(&bytes);
		let claims: ExpiryClaims = serde_path_to_error::deserialize(&mut de)?;
		let Some(exp) = claims.exp else {
			return Ok(None);
		};
		let exp = exp.trunc() as i64;

		OffsetDateTime::from_unix_timestamp(exp)
			.map(Some)
			.map_err(|_| TokenDecodeError::ExpiryOutOfRange { exp })
	}
}
