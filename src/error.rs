//! Error types for key loading and proof generation.
//!
//! Everything here fails closed: no value that did not pass every structural
//! check is ever returned, and nothing retries or falls back. A malformed key
//! or unsupported curve is a permanent configuration error that must surface
//! to the operator.

use thiserror::Error;

/// Failures while loading SEC1 key material.
#[derive(Debug, Error)]
pub enum KeyError {
    /// PEM input without recognizable BEGIN/END delimiter lines
    #[error("PEM block is missing its BEGIN/END delimiter lines")]
    MissingPemDelimiter,

    /// PEM body that does not decode with the standard base64 alphabet
    #[error("PEM body is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// An element that would read past the end of the buffer
    #[error("DER truncated at offset {offset} while reading {context}")]
    TruncatedDer { offset: usize, context: &'static str },

    /// A length encoding DER forbids (indefinite, or more than 4 length bytes)
    #[error("invalid DER length at offset {offset}: {reason}")]
    InvalidLength { offset: usize, reason: &'static str },

    /// An element whose tag does not match the SEC1 grammar
    #[error("unexpected DER tag {tag:#04x} at offset {offset}, expected {expected}")]
    UnexpectedTag {
        tag: u8,
        offset: usize,
        expected: &'static str,
    },

    /// Key structure version other than 1 (ecPrivkeyVer1)
    #[error("unsupported key structure version {0:02x?}, expected 1")]
    WrongVersion(Vec<u8>),

    /// RFC 5915 marks the curve parameters optional; this implementation
    /// requires them.
    #[error("key has no curve OID parameter")]
    MissingCurveOid,

    /// RFC 5915 marks the public key optional; this implementation only
    /// accepts self-contained keys.
    #[error("key has no embedded public key")]
    MissingPublicKey,

    /// BIT STRING without the 0x04 uncompressed-point marker, with an odd
    /// coordinate length, or carrying a point that is not on the curve
    #[error("malformed public key bit string: {0}")]
    MalformedPublicKey(&'static str),

    /// Any curve identifier other than prime256v1
    #[error("unsupported curve OID {0:02x?}, only P-256 is supported")]
    UnsupportedCurve(Vec<u8>),

    /// Private scalar that is zero, too wide for the field, or otherwise
    /// rejected by the curve arithmetic
    #[error("invalid private scalar: {0}")]
    InvalidScalar(&'static str),
}

/// Failures while generating a proof for one request.
#[derive(Debug, Error)]
pub enum ProofError {
    #[error("failed to serialize proof JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ECDSA signing failed: {0}")]
    Signing(#[from] p256::ecdsa::Error),

    /// The signing primitive handed back a DER signature that failed the
    /// codec's structural self-check. A correct primitive never produces
    /// this, so it is an internal defect rather than a recoverable condition.
    #[error("malformed DER signature from signing primitive: {0}")]
    MalformedSignature(&'static str),

    #[error("system clock is before the Unix epoch")]
    Clock,

    /// Request URI missing the parts htu is built from
    #[error("request URI unusable for htu: {0}")]
    RequestUri(&'static str),

    #[error("generated proof is not a valid header value")]
    InvalidHeaderValue,
}
