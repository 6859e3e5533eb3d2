//! DPoP proof construction (RFC 9449).
//!
//! One signing call builds the JOSE header with the embedded public JWK, the
//! claims payload, and the compact `header.payload.signature` token. The
//! generator is a pure function of its inputs: no caching, no retries, no
//! internal state.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use p256::ecdsa::{signature::Signer, Signature};
use serde::{Deserialize, Serialize};

use crate::error::ProofError;
use crate::identity::DpopIdentity;
use crate::jws;

/// Claims carried by one proof. Built fresh per signing call and discarded
/// immediately after; replay-window enforcement belongs to the verifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofClaims {
    /// Unique token for this proof, recommended to be a UUID
    pub jti: String,
    /// HTTP method, uppercase
    pub htm: String,
    /// Target endpoint, scheme://host\[:port\]/path without query or fragment
    pub htu: String,
    /// Creation time in epoch seconds
    pub iat: i64,
    /// Server-provided nonce, when one has been issued
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

/// JOSE header with the embedded public JWK.
///
/// Field declaration order is the wire order, which keeps the serialized
/// bytes deterministic for tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofHeader {
    pub typ: String,
    pub alg: String,
    pub jwk: EcPublicJwk,
}

/// EC public key in JWK form (P-256 / ES256).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcPublicJwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub y: String,
}

impl EcPublicJwk {
    /// JWK for an identity's embedded public point. Coordinates are encoded
    /// as their integer value, leading zero octets stripped.
    pub fn for_identity(identity: &DpopIdentity) -> Self {
        let (x, y) = identity.key_pair().coordinates();
        Self {
            kty: "EC".to_string(),
            crv: "P-256".to_string(),
            x: URL_SAFE_NO_PAD.encode(strip_leading_zeros(x)),
            y: URL_SAFE_NO_PAD.encode(strip_leading_zeros(y)),
        }
    }
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first = bytes
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(bytes.len() - 1);
    &bytes[first..]
}

/// Generate one compact DPoP proof for `identity`.
///
/// The caller supplies the unique token and timestamp, so the result is a
/// pure function of the arguments. The ES256 signature is produced in DER
/// form by the underlying primitive and converted to the raw 64-byte JWS
/// layout before encoding.
pub fn generate_proof(
    identity: &DpopIdentity,
    method: &str,
    endpoint: &str,
    jti: &str,
    iat: i64,
    nonce: Option<&str>,
) -> Result<String, ProofError> {
    let header = ProofHeader {
        typ: "dpop+jwt".to_string(),
        alg: "ES256".to_string(),
        jwk: EcPublicJwk::for_identity(identity),
    };
    let claims = ProofClaims {
        jti: jti.to_string(),
        htm: method.to_uppercase(),
        htu: endpoint.to_string(),
        iat,
        nonce: nonce.map(String::from),
    };

    let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?);
    let claims_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
    let signing_input = format!("{header_b64}.{claims_b64}");

    let signature: Signature = identity
        .key_pair()
        .signing_key()
        .try_sign(signing_input.as_bytes())?;
    let raw = jws::der_signature_to_jws(
        signature.to_der().as_bytes(),
        identity.key_pair().curve().field_size(),
    )?;

    Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(raw)))
}
