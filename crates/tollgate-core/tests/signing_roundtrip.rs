//! End-to-end exercise of the public signing surface: build a signed query
//! the way an outgoing request would, parse it back the way a callback
//! handler would, and verify it.

use tollgate_core::{Method, Params, Signer};

const SECRET: &str = "s3cr3t";
const URL: &str = "https://api.example.test/access";

#[test]
fn signed_query_parses_back_and_verifies() {
    let signer = Signer::new(SECRET).unwrap();
    let params = Params::new()
        .with("cp", "42")
        .with("article_id", vec!["7", "9"])
        .with("redir", "https://shop.example.test/back?id=1");

    let query = signer.signed_query(&params, URL, Method::Get);

    let mut echoed = Params::from_query(&query);
    let signature = echoed.remove("hmac").unwrap();
    assert!(signer.verify(signature, &echoed, URL, Method::Get).unwrap());
}

#[test]
fn mutated_parameter_fails_verification() {
    let signer = Signer::new(SECRET).unwrap();
    let params = Params::new().with("cp", "42");

    let query = signer.signed_query(&params, URL, Method::Get);

    let mut echoed = Params::from_query(&query);
    let signature = echoed.remove("hmac").unwrap();
    echoed.insert("cp", "43");
    assert!(!signer.verify(signature, &echoed, URL, Method::Get).unwrap());
}

#[test]
fn verification_ignores_query_component_of_url() {
    let signer = Signer::new(SECRET).unwrap();
    let params = Params::new().with("cp", "42");

    let query = signer.signed_query(&params, URL, Method::Get);

    // A verifier that was handed the full request URL, query included,
    // must reach the same verdict.
    let full_url = format!("{URL}?{query}");
    let mut echoed = Params::from_query(&query);
    let signature = echoed.remove("hmac").unwrap();
    assert!(signer.verify(signature, &echoed, &full_url, Method::Get).unwrap());
}

#[test]
fn signers_with_different_secrets_disagree() {
    let signer = Signer::new(SECRET).unwrap();
    let other = Signer::new("someone-else").unwrap();
    let params = Params::new().with("cp", "42");

    let query = signer.signed_query(&params, URL, Method::Get);

    let mut echoed = Params::from_query(&query);
    let signature = echoed.remove("hmac").unwrap();
    assert!(!other.verify(signature, &echoed, URL, Method::Get).unwrap());
}
