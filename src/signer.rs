//! Request signing adapters.
//!
//! [`DpopRequestSigner`] attaches a proof header to an outgoing
//! [`http::Request`]; [`DpopAuthScheme`] bundles the signer with the static
//! identity it signs under, advertising a fixed scheme identifier to the
//! surrounding request-signing framework.

use http::header::HeaderName;
use http::{HeaderValue, Request, Uri};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::error::ProofError;
use crate::identity::{DpopIdentity, IdentityProvider, StaticIdentityProvider};
use crate::proof;

/// Header carrying the compact proof token.
pub const DPOP_HEADER: HeaderName = HeaderName::from_static("dpop");

/// Identifier this scheme advertises to the surrounding framework.
pub const DPOP_SCHEME_ID: &str = "dpop";

/// Stateless request signer. All per-call state (unique token, timestamp) is
/// allocated fresh inside the call, so one signer instance serves any number
/// of concurrent requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct DpopRequestSigner;

impl DpopRequestSigner {
    pub fn new() -> Self {
        Self
    }

    /// Sign `request` with `identity`: derive the target endpoint from the
    /// request URI, generate a fresh unique token, build the proof with the
    /// current time, and return the request with the `DPoP` header attached
    /// and nothing else changed.
    pub fn sign_request<B>(
        &self,
        identity: &DpopIdentity,
        mut request: Request<B>,
    ) -> Result<Request<B>, ProofError> {
        let endpoint = request_endpoint(request.uri())?;
        let method = request.method().as_str().to_owned();
        let jti = Uuid::new_v4().to_string();
        let iat = epoch_seconds()?;

        let token = proof::generate_proof(identity, &method, &endpoint, &jti, iat, None)?;
        let value = HeaderValue::from_str(&token).map_err(|_| ProofError::InvalidHeaderValue)?;
        request.headers_mut().insert(DPOP_HEADER, value);

        tracing::debug!(htm = %method, htu = %endpoint, "attached DPoP proof header");
        Ok(request)
    }

    /// Async flavor of [`sign_request`](Self::sign_request). The computation
    /// is CPU-bound and never suspends, so both call paths produce
    /// equivalent results.
    pub async fn sign_request_async<B>(
        &self,
        identity: &DpopIdentity,
        request: Request<B>,
    ) -> Result<Request<B>, ProofError> {
        self.sign_request(identity, request)
    }
}

/// Build the htu value: `scheme://host[:port]/path`, the port elided when it
/// is the default for the scheme, query and fragment never read.
fn request_endpoint(uri: &Uri) -> Result<String, ProofError> {
    let scheme = uri
        .scheme_str()
        .ok_or(ProofError::RequestUri("missing scheme"))?;
    let host = uri.host().ok_or(ProofError::RequestUri("missing host"))?;
    let path = uri.path();

    match uri.port_u16() {
        Some(port) if !is_default_port(scheme, port) => {
            Ok(format!("{scheme}://{host}:{port}{path}"))
        }
        _ => Ok(format!("{scheme}://{host}{path}")),
    }
}

fn is_default_port(scheme: &str, port: u16) -> bool {
    matches!((scheme, port), ("https", 443) | ("http", 80))
}

fn epoch_seconds() -> Result<i64, ProofError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .map_err(|_| ProofError::Clock)
}

/// Auth scheme adapter: a fixed scheme identifier plus the identity and
/// signer it supplies to the framework. Identity resolution is static; the
/// same identity is returned for every request.
pub struct DpopAuthScheme<P = StaticIdentityProvider> {
    provider: P,
    signer: DpopRequestSigner,
}

impl DpopAuthScheme<StaticIdentityProvider> {
    /// Scheme over one fixed identity, the only configuration this
    /// implementation supports.
    pub fn new(identity: DpopIdentity) -> Self {
        Self::with_provider(StaticIdentityProvider::new(identity))
    }
}

impl<P: IdentityProvider> DpopAuthScheme<P> {
    pub fn with_provider(provider: P) -> Self {
        Self {
            provider,
            signer: DpopRequestSigner::new(),
        }
    }

    pub fn scheme_id(&self) -> &'static str {
        DPOP_SCHEME_ID
    }

    pub fn identity(&self) -> &DpopIdentity {
        self.provider.identity()
    }

    pub fn signer(&self) -> &DpopRequestSigner {
        &self.signer
    }

    /// Resolve the identity and sign in one step.
    pub fn sign<B>(&self, request: Request<B>) -> Result<Request<B>, ProofError> {
        self.signer.sign_request(self.provider.identity(), request)
    }
}
