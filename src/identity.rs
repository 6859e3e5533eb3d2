//! Key materialization and the long-lived signing identity.

use p256::ecdsa::{SigningKey, VerifyingKey};

use crate::error::KeyError;
use crate::sec1::{self, NamedCurve, ParsedEcKey};

/// P-256 key pair materialized from a parsed SEC1 key.
///
/// The public half is taken from the key's embedded point as-is and is not
/// checked against scalar·G. A key file whose halves disagree is accepted
/// here and will fail verification downstream instead; this matches the
/// behavior of the system this loader replaces.
#[derive(Clone)]
pub struct EcKeyPair {
    curve: NamedCurve,
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
    public_point: Vec<u8>,
}

impl EcKeyPair {
    pub fn from_parsed(parsed: ParsedEcKey) -> Result<Self, KeyError> {
        let scalar = normalize_scalar(&parsed.private_scalar, parsed.curve.field_size())?;
        let signing_key = SigningKey::from_slice(&scalar)
            .map_err(|_| KeyError::InvalidScalar("not a valid P-256 scalar"))?;
        let verifying_key = VerifyingKey::from_sec1_bytes(&parsed.public_point)
            .map_err(|_| KeyError::MalformedPublicKey("point is not on the curve"))?;

        Ok(Self {
            curve: parsed.curve,
            signing_key,
            verifying_key,
            public_point: parsed.public_point,
        })
    }

    pub fn curve(&self) -> NamedCurve {
        self.curve
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Uncompressed public point, exactly as carried in the key file.
    pub fn public_point(&self) -> &[u8] {
        &self.public_point
    }

    /// The (X, Y) halves of the embedded point.
    pub fn coordinates(&self) -> (&[u8], &[u8]) {
        let half = (self.public_point.len() - 1) / 2;
        (
            &self.public_point[1..1 + half],
            &self.public_point[1 + half..],
        )
    }
}

/// Interpret the OCTET STRING contents as a big-endian unsigned integer and
/// left-pad it to the curve's field width. OCTET STRING carries no sign bit,
/// so there is no sign byte to trim, but leading zero octets are tolerated.
fn normalize_scalar(bytes: &[u8], width: usize) -> Result<Vec<u8>, KeyError> {
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let significant = &bytes[first..];

    if significant.is_empty() {
        return Err(KeyError::InvalidScalar("scalar is zero"));
    }
    if significant.len() > width {
        return Err(KeyError::InvalidScalar("scalar wider than the curve field"));
    }

    let mut out = vec![0u8; width];
    out[width - significant.len()..].copy_from_slice(significant);
    Ok(out)
}

/// Read-only signing identity.
///
/// Wraps one key pair, resolved once at configuration time and reused for
/// the lifetime of the signing client. Immutable after construction, so it
/// can be shared across arbitrarily many concurrent signing calls without
/// locking.
#[derive(Clone)]
pub struct DpopIdentity {
    key_pair: EcKeyPair,
}

impl DpopIdentity {
    /// Load an identity from a SEC1 PEM text block.
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        let parsed = sec1::parse_sec1_pem(pem)?;
        let key_pair = EcKeyPair::from_parsed(parsed)?;
        tracing::debug!(curve = "P-256", "loaded DPoP signing identity from PEM");
        Ok(Self { key_pair })
    }

    pub fn key_pair(&self) -> &EcKeyPair {
        &self.key_pair
    }
}

impl std::fmt::Debug for DpopIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of debug output.
        f.debug_struct("DpopIdentity").finish_non_exhaustive()
    }
}

/// Source of the signing identity for an auth scheme.
///
/// There is only ever one identity per configured client, so the production
/// implementation below returns a constant; test doubles substitute trivially.
pub trait IdentityProvider: Send + Sync {
    fn identity(&self) -> &DpopIdentity;
}

/// Provider that always hands out the same identity.
pub struct StaticIdentityProvider {
    identity: DpopIdentity,
}

impl StaticIdentityProvider {
    pub fn new(identity: DpopIdentity) -> Self {
        Self { identity }
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn identity(&self) -> &DpopIdentity {
        &self.identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TEST_KEY_PEM;

    #[test]
    fn test_embedded_point_matches_derived_public_key() {
        // For a consistent key the embedded point re-encodes to exactly the
        // bytes the private scalar derives.
        let identity = DpopIdentity::from_pem(TEST_KEY_PEM).unwrap();
        let pair = identity.key_pair();
        let derived = pair.verifying_key().to_encoded_point(false);
        assert_eq!(pair.public_point(), derived.as_bytes());

        let from_scalar = pair.signing_key().verifying_key().to_encoded_point(false);
        assert_eq!(pair.public_point(), from_scalar.as_bytes());
    }

    #[test]
    fn test_coordinates_split_evenly() {
        let identity = DpopIdentity::from_pem(TEST_KEY_PEM).unwrap();
        let (x, y) = identity.key_pair().coordinates();
        assert_eq!(x.len(), 32);
        assert_eq!(y.len(), 32);
    }

    #[test]
    fn test_normalize_scalar_pads_short_input() {
        let out = normalize_scalar(&[0x01, 0x02], 32).unwrap();
        assert_eq!(out.len(), 32);
        assert_eq!(&out[30..], &[0x01, 0x02]);
        assert!(out[..30].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_normalize_scalar_strips_leading_zeros() {
        let mut input = vec![0x00, 0x00];
        input.extend([0xAA; 32]);
        let out = normalize_scalar(&input, 32).unwrap();
        assert_eq!(out, vec![0xAA; 32]);
    }

    #[test]
    fn test_normalize_scalar_rejects_zero() {
        assert!(matches!(
            normalize_scalar(&[0x00; 32], 32),
            Err(KeyError::InvalidScalar("scalar is zero"))
        ));
    }

    #[test]
    fn test_normalize_scalar_rejects_oversized_input() {
        assert!(matches!(
            normalize_scalar(&[0xAA; 33], 32),
            Err(KeyError::InvalidScalar(_))
        ));
    }

    #[test]
    fn test_rejects_point_off_curve() {
        let mut parsed = crate::sec1::parse_sec1_pem(TEST_KEY_PEM).unwrap();
        // Corrupt Y so the point no longer satisfies the curve equation.
        let last = parsed.public_point.len() - 1;
        parsed.public_point[last] ^= 0x01;
        assert!(matches!(
            EcKeyPair::from_parsed(parsed),
            Err(KeyError::MalformedPublicKey(_))
        ));
    }

    #[test]
    fn test_identity_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DpopIdentity>();
        assert_send_sync::<StaticIdentityProvider>();
    }

    #[test]
    fn test_static_provider_returns_same_identity() {
        let identity = DpopIdentity::from_pem(TEST_KEY_PEM).unwrap();
        let point = identity.key_pair().public_point().to_vec();
        let provider = StaticIdentityProvider::new(identity);
        assert_eq!(provider.identity().key_pair().public_point(), point);
        assert_eq!(provider.identity().key_pair().public_point(), point);
    }
}
