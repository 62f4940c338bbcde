//! Request signing
//!
//! Every API call carries an `Authorization` header of the form
//! `base64("{auth_id}:{hex(hmac_sha1(access_key, query))}")`, where `query` is
//! the canonical (sorted, form-encoded) parameter string that is sent on the wire.

mod signer;

pub use signer::{canonical_query, Signer};
