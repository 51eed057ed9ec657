//! Request signing and verification.
//!
//! The signer owns the merchant's API key for its whole lifetime and is
//! otherwise stateless: every operation is a pure function of its inputs
//! plus, for [`Signer::signed_query`], the current wall-clock time. Safe to
//! share across threads without coordination.

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha224;
use tracing::debug;

use crate::canonical;
use crate::errors::SigningError;
use crate::method::Method;
use crate::params::{ParamValue, Params};

type HmacSha224 = Hmac<Sha224>;

/// Immutable signing configuration.
///
/// The hash algorithm is fixed (HMAC-SHA224); signer and verifier must
/// agree on it exactly or every verification fails. These knobs only name
/// the protocol-reserved parameters.
#[derive(Debug, Clone)]
pub struct SigningConfig {
    /// Parameter names stripped from the payload before signing.
    pub reserved: Vec<String>,
    /// Query parameter that carries the signature.
    pub signature_param: String,
    /// Query parameter that carries the injected timestamp.
    pub timestamp_param: String,
}

impl Default for SigningConfig {
    fn default() -> Self {
        SigningConfig {
            reserved: vec!["hmac".to_owned(), "gettoken".to_owned()],
            signature_param: "hmac".to_owned(),
            timestamp_param: "ts".to_owned(),
        }
    }
}

/// Signs outgoing requests and verifies echoed ones with one shared secret.
#[derive(Debug, Clone)]
pub struct Signer {
    secret: String,
    config: SigningConfig,
}

impl Signer {
    /// Create a signer with the default protocol configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::EmptySecret`] if `secret` is empty; an empty
    /// key must never silently produce a signature.
    pub fn new(secret: impl Into<String>) -> Result<Self, SigningError> {
        Self::with_config(secret, SigningConfig::default())
    }

    pub fn with_config(
        secret: impl Into<String>,
        config: SigningConfig,
    ) -> Result<Self, SigningError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(SigningError::EmptySecret);
        }
        Ok(Signer { secret, config })
    }

    /// Compute the lowercase hex HMAC-SHA224 digest for a request.
    ///
    /// Reserved parameters (`hmac`, `gettoken`) are stripped first; they
    /// are signature/transport artifacts, never part of the signed payload.
    pub fn sign(&self, params: &Params, url: &str, method: Method) -> String {
        let mut params = params.clone();
        for name in &self.config.reserved {
            params.remove(name);
        }
        let message = canonical::build_message(&params, url, method);
        let mut mac = HmacSha224::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Sign a request and encode it as a ready-to-append query string.
    ///
    /// A `ts` parameter holding the current unix time is injected when the
    /// caller did not supply one, and any pre-existing `hmac` parameter is
    /// dropped so a stale signature cannot be smuggled in. Appended to
    /// `url + "?"`, the result reproduces a request that passes
    /// [`verify`](Self::verify) against the same secret.
    pub fn signed_query(&self, params: &Params, url: &str, method: Method) -> String {
        self.signed_query_at(params, url, method, unix_now())
    }

    /// [`signed_query`](Self::signed_query) with an explicit timestamp, for
    /// callers that need a reproducible clock.
    pub fn signed_query_at(
        &self,
        params: &Params,
        url: &str,
        method: Method,
        timestamp: u64,
    ) -> String {
        let mut params = params.clone();
        if !params.contains(&self.config.timestamp_param) {
            params.insert(self.config.timestamp_param.clone(), timestamp.to_string());
        }
        params.remove(&self.config.signature_param);

        let digest = self.sign(&params, url, method);
        let query = canonical::encode_query(&params);
        format!("{query}&{}={digest}", self.config.signature_param)
    }

    /// Verify a signature against the recomputed digest for the request.
    ///
    /// The signature is accepted either as a raw string or as a
    /// single-element list, matching how differing callers hand over parsed
    /// query parameters. Any other shape is
    /// [`SigningError::MalformedSignature`]. A mismatch returns
    /// `Ok(false)`, never an error.
    pub fn verify(
        &self,
        signature: impl Into<ParamValue>,
        params: &Params,
        url: &str,
        method: Method,
    ) -> Result<bool, SigningError> {
        let signature = match signature.into() {
            ParamValue::Single(value) => value,
            ParamValue::Many(mut values) if values.len() == 1 => values.remove(0),
            ParamValue::Many(_) => return Err(SigningError::MalformedSignature),
        };

        let expected = self.sign(params, url, method);
        let matched = time_independent_eq(&expected, &signature)?;
        if !matched {
            debug!(url, "request signature mismatch");
        }
        Ok(matched)
    }
}

/// Compare a known digest against a caller-supplied one without leaking the
/// position of the first mismatch through timing.
///
/// Equal length is not assumed; the accumulator walks the full given string
/// and indexes the known one cyclically, folding the length difference in
/// up front. An empty known digest can never safely authenticate anything
/// and is rejected as misuse.
fn time_independent_eq(known: &str, given: &str) -> Result<bool, SigningError> {
    if known.is_empty() {
        return Err(SigningError::EmptyDigest);
    }
    let known = known.as_bytes();
    let given = given.as_bytes();

    let mut acc = known.len() ^ given.len();
    for (i, byte) in given.iter().enumerate() {
        acc |= usize::from(known[i % known.len()] ^ byte);
    }
    Ok(acc == 0)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "s3cr3t";
    const ACCESS_URL: &str = "https://api.example.test/access";

    fn signer() -> Signer {
        Signer::new(SECRET).unwrap()
    }

    fn access_params() -> Params {
        Params::new()
            .with("cp", "42")
            .with("article_id", vec!["7", "9"])
    }

    #[test]
    fn test_sign_matches_pinned_digest() {
        let digest = signer().sign(&access_params(), ACCESS_URL, Method::Get);
        assert_eq!(
            digest,
            "a8145802ba8b147ff555a4fd9b035b1915e3c22cdb0ab1feb081102d"
        );
    }

    #[test]
    fn test_sign_is_deterministic() {
        let signer = signer();
        assert_eq!(
            signer.sign(&access_params(), ACCESS_URL, Method::Get),
            signer.sign(&access_params(), ACCESS_URL, Method::Get),
        );
    }

    #[test]
    fn test_sign_is_order_independent() {
        let signer = signer();
        let forward = Params::new().with("a", "1").with("b", "2");
        let backward = Params::new().with("b", "2").with("a", "1");
        assert_eq!(
            signer.sign(&forward, ACCESS_URL, Method::Get),
            signer.sign(&backward, ACCESS_URL, Method::Get),
        );
    }

    #[test]
    fn test_sign_treats_scalar_and_singleton_list_alike() {
        let signer = signer();
        let scalar = Params::new().with("a", "1");
        let list = Params::new().with("a", vec!["1"]);
        assert_eq!(
            signer.sign(&scalar, ACCESS_URL, Method::Get),
            signer.sign(&list, ACCESS_URL, Method::Get),
        );
    }

    #[test]
    fn test_reserved_keys_are_excluded_from_signing() {
        let signer = signer();
        let clean = Params::new().with("a", "1");
        let polluted = Params::new()
            .with("a", "1")
            .with("hmac", "garbage")
            .with("gettoken", "x");
        assert_eq!(
            signer.sign(&clean, ACCESS_URL, Method::Get),
            signer.sign(&polluted, ACCESS_URL, Method::Get),
        );
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert_eq!(Signer::new("").unwrap_err(), SigningError::EmptySecret);
    }

    #[test]
    fn test_signed_query_at_matches_pinned_query() {
        let query = signer().signed_query_at(&access_params(), ACCESS_URL, Method::Get, 1_577_836_800);
        assert_eq!(
            query,
            "article_id=7&article_id=9&cp=42&ts=1577836800&hmac=12e4aab6238d14f7aa94b752f0f125c0480d746b31e9dd159db41223"
        );
    }

    #[test]
    fn test_signed_query_injects_timestamp_when_absent() {
        let query = signer().signed_query(&access_params(), ACCESS_URL, Method::Get);
        let parsed = Params::from_query(&query);
        assert!(parsed.contains("ts"));
        assert!(parsed.contains("hmac"));
    }

    #[test]
    fn test_signed_query_keeps_caller_timestamp() {
        let params = access_params().with("ts", "123");
        let query = signer().signed_query_at(&params, ACCESS_URL, Method::Get, 999);
        let parsed = Params::from_query(&query);
        assert_eq!(parsed.get("ts"), Some(&["123".to_owned()][..]));
    }

    #[test]
    fn test_signed_query_drops_stale_signature() {
        let params = access_params().with("hmac", "stale");
        let query = signer().signed_query_at(&params, ACCESS_URL, Method::Get, 1_577_836_800);
        let parsed = Params::from_query(&query);
        assert_eq!(
            parsed.get("hmac"),
            Some(&["12e4aab6238d14f7aa94b752f0f125c0480d746b31e9dd159db41223".to_owned()][..])
        );
    }

    #[test]
    fn test_signed_query_round_trips_through_verify() {
        let signer = signer();
        let query = signer.signed_query_at(&access_params(), ACCESS_URL, Method::Post, 1_577_836_800);

        let mut parsed = Params::from_query(&query);
        let signature = parsed.remove("hmac").unwrap();
        assert!(signer.verify(signature, &parsed, ACCESS_URL, Method::Post).unwrap());
    }

    #[test]
    fn test_verify_rejects_tampered_digest() {
        let signer = signer();
        let digest = signer.sign(&access_params(), ACCESS_URL, Method::Get);
        let mut tampered = digest.clone();
        let flipped = if tampered.ends_with('0') { '1' } else { '0' };
        tampered.pop();
        tampered.push(flipped);
        assert!(!signer.verify(tampered, &access_params(), ACCESS_URL, Method::Get).unwrap());
    }

    #[test]
    fn test_verify_rejects_tampered_params() {
        let signer = signer();
        let digest = signer.sign(&access_params(), ACCESS_URL, Method::Get);
        let tampered = access_params().with("cp", "43");
        assert!(!signer.verify(digest, &tampered, ACCESS_URL, Method::Get).unwrap());
    }

    #[test]
    fn test_verify_accepts_single_element_list() {
        let signer = signer();
        let digest = signer.sign(&access_params(), ACCESS_URL, Method::Get);
        assert!(signer.verify(vec![digest], &access_params(), ACCESS_URL, Method::Get).unwrap());
    }

    #[test]
    fn test_verify_rejects_multi_element_list() {
        let err = signer()
            .verify(vec!["a", "b"], &access_params(), ACCESS_URL, Method::Get)
            .unwrap_err();
        assert_eq!(err, SigningError::MalformedSignature);
    }

    #[test]
    fn test_compare_handles_length_mismatch_without_branching_out() {
        assert!(time_independent_eq("abcd", "abcd").unwrap());
        assert!(!time_independent_eq("abcd", "abce").unwrap());
        assert!(!time_independent_eq("abcd", "abc").unwrap());
        assert!(!time_independent_eq("abcd", "abcdabcd").unwrap());
        assert!(!time_independent_eq("abcd", "").unwrap());
    }

    #[test]
    fn test_compare_rejects_empty_reference() {
        assert_eq!(
            time_independent_eq("", "anything").unwrap_err(),
            SigningError::EmptyDigest
        );
    }
}
