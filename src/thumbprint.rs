//! JWK thumbprint computation (RFC 7638).

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use sha2::{Digest, Sha256};

use crate::identity::DpopIdentity;
use crate::proof::EcPublicJwk;

/// Compute the thumbprint of an EC public JWK: SHA-256 over the canonical
/// JSON with required members in lexicographic order (crv, kty, x, y),
/// base64url-encoded. Used for `cnf.jkt` token binding.
pub fn compute_thumbprint(jwk: &EcPublicJwk) -> String {
    let canonical = format!(
        r#"{{"crv":"{}","kty":"{}","x":"{}","y":"{}"}}"#,
        jwk.crv, jwk.kty, jwk.x, jwk.y
    );
    URL_SAFE_NO_PAD.encode(Sha256::digest(canonical.as_bytes()))
}

/// Thumbprint of an identity's public key.
pub fn identity_thumbprint(identity: &DpopIdentity) -> String {
    compute_thumbprint(&EcPublicJwk::for_identity(identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TEST_KEY_PEM;

    #[test]
    fn test_thumbprint_is_deterministic() {
        let identity = DpopIdentity::from_pem(TEST_KEY_PEM).unwrap();
        assert_eq!(
            identity_thumbprint(&identity),
            identity_thumbprint(&identity)
        );
    }

    #[test]
    fn test_thumbprint_format() {
        let identity = DpopIdentity::from_pem(TEST_KEY_PEM).unwrap();
        // SHA-256 = 32 bytes = 43 base64url chars without padding
        assert_eq!(identity_thumbprint(&identity).len(), 43);
    }

    #[test]
    fn test_thumbprint_depends_on_coordinates() {
        let identity = DpopIdentity::from_pem(TEST_KEY_PEM).unwrap();
        let mut jwk = EcPublicJwk::for_identity(&identity);
        let original = compute_thumbprint(&jwk);
        jwk.x = jwk.y.clone();
        assert_ne!(compute_thumbprint(&jwk), original);
    }
}
