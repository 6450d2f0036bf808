// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! GitHub-style HMAC-SHA256 webhook signature utilities.
//!
//! GitHub sends the signature of the raw request body in the
//! `x-hub-signature-256` header as `sha256=<hex>`. Verification must run
//! over the exact bytes received on the wire; re-serializing a parsed JSON
//! body can reorder keys and change whitespace, producing a different byte
//! sequence than the one GitHub signed.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// The header GitHub sends the payload signature in.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// The header GitHub sends the event name in.
pub const EVENT_HEADER: &str = "x-github-event";

const SIGNATURE_PREFIX: &str = "sha256=";

/// Compute the signature header value for a payload.
///
/// Returns `sha256=<hex>`, the exact format GitHub puts in
/// `x-hub-signature-256`.
pub fn compute_signature(secret: &[u8], payload: &[u8]) -> String {
	let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
	mac.update(payload);
	let result = mac.finalize();
	format!("{SIGNATURE_PREFIX}{}", hex::encode(result.into_bytes()))
}

/// Verify a `sha256=<hex>` signature header against a payload.
///
/// Fails closed: a header without the `sha256=` prefix, with invalid hex,
/// or with a digest of the wrong length is rejected. The digest comparison
/// is constant-time (`Mac::verify_slice`), never a string equality.
pub fn verify_signature(secret: &[u8], payload: &[u8], signature_header: &str) -> bool {
	let signature_hex = match signature_header.strip_prefix(SIGNATURE_PREFIX) {
		Some(hex) => hex,
		None => return false,
	};

	let expected_bytes = match hex::decode(signature_hex) {
		Ok(bytes) => bytes,
		Err(_) => return false,
	};

	let mut mac = match HmacSha256::new_from_slice(secret) {
		Ok(m) => m,
		Err(_) => return false,
	};

	mac.update(payload);
	mac.verify_slice(&expected_bytes).is_ok()
}
