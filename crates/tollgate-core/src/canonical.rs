//! Deterministic serialization of a (method, url, params) triple.
//!
//! The canonical message has the form:
//!
//! ```text
//! METHOD&encodedURL&doublyEncodedParamBlock
//! ```
//!
//! The parameter block is built from singly-encoded `name=value` pairs,
//! joined with `&`, then percent-encoded once more as a whole. The wire
//! query string produced by [`encode_query`] stays singly encoded; the
//! server verifies against the double-encoded form bit-for-bit, so the two
//! encodings must not be unified.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::method::Method;
use crate::params::Params;

/// RFC 3986 "raw" encoding: everything except unreserved characters
/// (A-Z, a-z, 0-9, `-`, `_`, `.`, `~`) is encoded. Space becomes `%20`.
const RAW_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a UTF-8 string with the RFC 3986 raw set.
pub fn raw_encode(input: &str) -> String {
    utf8_percent_encode(input, RAW_ENCODE_SET).to_string()
}

/// Build the canonical message for a request.
///
/// Parameter names are sorted by raw byte value, each name's value list is
/// sorted the same way, and any query component of `url` is stripped before
/// encoding. Pure function of its inputs; no filtering of reserved names
/// happens here.
pub fn build_message(params: &Params, url: &str, method: Method) -> String {
    let url = url.split('?').next().unwrap_or(url);
    let block = raw_encode(&encode_pairs(params).join("&"));
    format!("{}&{}&{}", method.as_str(), raw_encode(url), block)
}

/// Build the externally visible query string: sorted, singly encoded
/// `name=value` pairs joined with `&`.
pub fn encode_query(params: &Params) -> String {
    encode_pairs(params).join("&")
}

/// Singly-encoded `name=value` pairs in canonical order.
fn encode_pairs(params: &Params) -> Vec<String> {
    let mut pairs = Vec::new();
    for (name, values) in params.iter() {
        let encoded_name = raw_encode(name);
        let mut values: Vec<&str> = values.iter().map(String::as_str).collect();
        values.sort_unstable();
        for value in values {
            pairs.push(format!("{encoded_name}={}", raw_encode(value)));
        }
    }
    pairs
}
