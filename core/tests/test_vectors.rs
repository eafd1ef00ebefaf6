//! Verify the encoders and the header consumer against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Each vector file lists inputs and the exact expected output, so other
//! implementations of the wrapper can be checked against the same data.

use easyreq::encode::{build_cookie, build_url, prepare_data};
use easyreq::{Client, ClientConfig, RequestBody, RequestUrl, ResponseHeaders, UreqEngine};

fn pairs(value: &serde_json::Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| {
            let arr = pair.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// URL building
// ---------------------------------------------------------------------------

#[test]
fn build_url_test_vectors() {
    let raw = include_str!("../../test-vectors/build_url.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let base = case["url"].as_str().unwrap();
        let url = if case["params"].is_null() {
            RequestUrl::from(base)
        } else {
            RequestUrl::WithQuery {
                base: base.to_string(),
                params: pairs(&case["params"]),
            }
        };
        assert_eq!(build_url(&url), case["expected"].as_str().unwrap(), "{name}");
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[test]
fn form_body_test_vectors() {
    let raw = include_str!("../../test-vectors/form_body.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let body = match case.get("raw") {
            Some(raw) => RequestBody::from(raw.as_str().unwrap()),
            None => RequestBody::Form(pairs(&case["form"])),
        };
        let encoded = String::from_utf8(prepare_data(&body)).unwrap();
        assert_eq!(encoded, case["expected"].as_str().unwrap(), "{name}");
    }
}

// ---------------------------------------------------------------------------
// Cookies
// ---------------------------------------------------------------------------

#[test]
fn cookie_test_vectors() {
    let raw = include_str!("../../test-vectors/cookies.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected = case["expected"].as_str().unwrap();

        let mut client = Client::with_engine(UreqEngine::new(), ClientConfig::default());
        for (key, value) in pairs(&case["set"]) {
            client.set_cookie(key, value);
        }
        assert_eq!(client.engine_options().cookie.as_deref(), Some(expected), "{name}: client");
        assert_eq!(build_cookie(client.request_cookie()), expected, "{name}: encoder");
    }
}

// ---------------------------------------------------------------------------
// Response header lines
// ---------------------------------------------------------------------------

#[test]
fn response_header_test_vectors() {
    let raw = include_str!("../../test-vectors/response_headers.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let mut headers = ResponseHeaders::new();
        for line in case["lines"].as_array().unwrap() {
            let line = line.as_str().unwrap();
            assert_eq!(headers.consume(line.as_bytes()), line.len(), "{name}: consumed");
        }
        let expected: Vec<String> = serde_json::from_value(case["expected"].clone()).unwrap();
        assert_eq!(headers.lines(), expected.as_slice(), "{name}");
    }
}
