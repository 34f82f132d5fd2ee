//! Bearer token verification. Tokens are issued elsewhere; this service only
//! checks signature, issuer, audience and expiry.

mod claims;
pub(crate) mod extractors;
