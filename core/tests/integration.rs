//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `Client` over real
//! HTTP with the built-in engine. The server echoes what it received, so
//! each test checks both what went out and what was captured coming back.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use easyreq::{Client, ClientConfig, EngineOption, RequestBody};
use mock_server::Echo;

fn spawn_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn echo(client: &Client) -> Echo {
    assert_eq!(client.error_code(), 0, "{}", client.error_message());
    client.response_json().unwrap()
}

#[test]
fn get_sends_query_params() {
    let addr = spawn_server();
    let mut client = Client::new().unwrap();

    client.get((format!("http://{addr}/echo"), [("a", 1), ("b", 2)]));
    let seen = echo(&client);
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.query.as_deref(), Some("a=1&b=2"));
    assert_eq!(client.request_url(), Some(format!("http://{addr}/echo?a=1&b=2").as_str()));
    assert_eq!(client.response_code(), 200);
    assert_eq!(client.response_header().lines()[0], "HTTP/1.1 200 OK");
    assert_eq!(client.response_header().get("content-type"), Some("application/json"));
    // Names come out lowercased.
    assert!(client
        .response_header()
        .lines()
        .contains(&"content-type: application/json".to_string()));
}

#[test]
fn post_sends_form_body() {
    let addr = spawn_server();
    let mut client = Client::new().unwrap();

    client.post(format!("http://{addr}/echo"), [("name", "a b")]);
    let seen = echo(&client);
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.body, "name=a+b");
    assert_eq!(seen.headers["content-type"], "application/x-www-form-urlencoded");
    assert_eq!(client.response_info().size_upload, 8);
}

#[test]
fn put_and_patch_send_raw_body() {
    let addr = spawn_server();
    let mut client = Client::new().unwrap();
    client.set_header("Content-Type", "application/json");

    client.put(format!("http://{addr}/echo"), r#"{"name":"Grass"}"#);
    let seen = echo(&client);
    assert_eq!(seen.method, "PUT");
    assert_eq!(seen.body, r#"{"name":"Grass"}"#);
    assert_eq!(seen.headers["content-type"], "application/json");

    client.patch(format!("http://{addr}/echo"), r#"{"name":"Moss"}"#);
    let seen = echo(&client);
    assert_eq!(seen.method, "PATCH");
    assert_eq!(seen.body, r#"{"name":"Moss"}"#);
}

#[test]
fn delete_and_options_without_data() {
    let addr = spawn_server();
    let mut client = Client::new().unwrap();

    client.delete(format!("http://{addr}/echo"), RequestBody::default());
    assert_eq!(echo(&client).method, "DELETE");

    client.options(format!("http://{addr}/echo"), RequestBody::default());
    assert_eq!(echo(&client).method, "OPTIONS");

    client.get(format!("http://{addr}/echo"));
    assert_eq!(echo(&client).method, "GET");
}

#[test]
fn delete_and_options_send_their_data() {
    let addr = spawn_server();
    let mut client = Client::new().unwrap();

    client.delete(format!("http://{addr}/echo"), [("id", 1)]);
    let seen = echo(&client);
    assert_eq!(seen.method, "DELETE");
    assert_eq!(seen.body, "id=1");
    assert_eq!(seen.headers["content-type"], "application/x-www-form-urlencoded");

    client.options(format!("http://{addr}/echo"), "raw");
    let seen = echo(&client);
    assert_eq!(seen.method, "OPTIONS");
    assert_eq!(seen.body, "raw");
}

#[test]
fn repeated_header_key_sends_latest_value_once() {
    let addr = spawn_server();
    let mut client = Client::new().unwrap();

    client
        .set_header("X-Token", "one")
        .set_header("X-Token", "two")
        .get(format!("http://{addr}/echo"));
    let seen = echo(&client);
    assert_eq!(seen.headers["x-token"], "two");
    let sent: Vec<_> = client
        .request_header()
        .iter()
        .filter(|line| line.to_ascii_lowercase().starts_with("x-token:"))
        .collect();
    assert_eq!(sent.len(), 1);
}

#[test]
fn cookies_are_sent_as_one_header() {
    let addr = spawn_server();
    let mut client = Client::new().unwrap();

    client
        .set_cookie("k1", "v1")
        .set_cookie("k2", "v2")
        .get(format!("http://{addr}/echo"));
    let seen = echo(&client);
    assert_eq!(seen.headers["cookie"], "k1=v1; k2=v2");
}

#[test]
fn outgoing_headers_are_captured() {
    let addr = spawn_server();
    let mut client = Client::new().unwrap();

    client.get(format!("http://{addr}/echo?x=1"));
    let header = client.request_header();
    assert_eq!(header[0], "GET /echo?x=1 HTTP/1.1");
    assert!(header.contains(&format!("Host: {addr}")));

    // Every header the server saw is listed in the captured block.
    let seen = echo(&client);
    for (name, value) in &seen.headers {
        if name == "host" {
            continue;
        }
        let line = format!("{name}: {value}");
        assert!(header.contains(&line), "missing {line:?} in {header:?}");
    }
    let agent = &seen.headers["user-agent"];
    assert!(agent.starts_with("easyreq/"));
    assert!(header.contains(&format!("user-agent: {agent}")));
    assert_eq!(seen.headers["accept"], "*/*");
}

#[test]
fn configured_user_agent_replaces_default() {
    let addr = spawn_server();
    let config = ClientConfig {
        user_agent: Some("pokedex/1.0".to_string()),
        ..ClientConfig::default()
    };
    let mut client = Client::with_config(config).unwrap();

    client.get(format!("http://{addr}/echo"));
    let seen = echo(&client);
    assert_eq!(seen.headers["user-agent"], "pokedex/1.0");
    assert!(client.request_header().contains(&"user-agent: pokedex/1.0".to_string()));
}

#[test]
fn redirects_are_followed_with_referer() {
    let addr = spawn_server();
    let mut client = Client::new().unwrap();

    client.get(format!("http://{addr}/redirect/2"));
    let seen = echo(&client);
    assert_eq!(seen.path, "/echo");
    assert_eq!(seen.headers["referer"], format!("http://{addr}/redirect/0"));

    let info = client.response_info();
    assert_eq!(info.redirect_count, 3);
    assert_eq!(info.url, format!("http://{addr}/echo"));

    let status_lines: Vec<_> = client
        .response_header()
        .lines()
        .iter()
        .filter(|line| line.starts_with("HTTP/"))
        .collect();
    assert_eq!(
        status_lines,
        ["HTTP/1.1 302 Found", "HTTP/1.1 302 Found", "HTTP/1.1 302 Found", "HTTP/1.1 200 OK"]
    );
}

#[test]
fn post_through_found_becomes_get() {
    let addr = spawn_server();
    let mut client = Client::new().unwrap();

    client.post(format!("http://{addr}/redirect/0"), [("a", 1)]);
    let seen = echo(&client);
    assert_eq!(seen.method, "GET");
    assert!(seen.body.is_empty());
}

#[test]
fn redirect_limit_is_enforced() {
    let addr = spawn_server();
    let config = ClientConfig {
        max_redirects: 1,
        ..ClientConfig::default()
    };
    let mut client = Client::with_config(config).unwrap();

    client.get(format!("http://{addr}/redirect/3"));
    assert_eq!(client.error_code(), 47);
    assert!(client.response().is_none());
}

#[test]
fn redirects_can_be_disabled() {
    let addr = spawn_server();
    let mut client = Client::new().unwrap();

    client
        .set_opt(EngineOption::FollowLocation(false))
        .get(format!("http://{addr}/redirect/0"));
    assert_eq!(client.error_code(), 0);
    assert_eq!(client.response_code(), 302);
    assert_eq!(client.response_header().get("location"), Some("/echo"));
}

#[test]
fn timeout_covers_the_whole_redirect_chain() {
    let addr = spawn_server();
    let config = ClientConfig {
        timeout_secs: 1,
        ..ClientConfig::default()
    };
    let mut client = Client::with_config(config).unwrap();

    // Four hops of `SLOW_HOP` each: every hop fits in the timeout, the chain does not.
    let started = Instant::now();
    client.get(format!("http://{addr}/slow-redirect/3"));
    let elapsed = started.elapsed();

    assert_eq!(client.error_code(), 28, "{}", client.error_message());
    assert!(client.response().is_none());
    assert!(elapsed < Duration::from_secs(1) + mock_server::SLOW_HOP, "took {elapsed:?}");
}

#[test]
fn body_larger_than_ten_mebibytes_is_read_whole() {
    let addr = spawn_server();
    let mut client = Client::new().unwrap();
    let len = 11 * 1024 * 1024;

    client.get(format!("http://{addr}/bytes/{len}"));
    assert_eq!(client.error_code(), 0, "{}", client.error_message());
    assert_eq!(client.response_code(), 200);
    let body = client.response().unwrap();
    assert_eq!(body.len(), len);
    assert!(body.iter().all(|&b| b == b'x'));
    assert_eq!(client.response_info().size_download, len as u64);
}

#[test]
fn error_status_is_data_not_failure() {
    let addr = spawn_server();
    let mut client = Client::new().unwrap();

    client.get(format!("http://{addr}/status/404"));
    assert_eq!(client.error_code(), 0);
    assert_eq!(client.response_code(), 404);
    assert_eq!(client.response_text().as_deref(), Some("status 404"));
}

#[test]
fn unreachable_host_sets_soft_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut client = Client::new().unwrap();

    let code = client.get(format!("http://127.0.0.1:{port}/")).error_code();
    assert_ne!(code, 0);
    assert!(!client.error_message().is_empty());
    assert_eq!(client.response_code(), 0);
    assert!(client.response().is_none());
}

#[test]
fn close_is_idempotent() {
    let addr = spawn_server();
    let mut client = Client::new().unwrap();

    client.get(format!("http://{addr}/echo"));
    assert_eq!(client.error_code(), 0);

    client.close().close();
    assert!(client.is_closed());
    client.get(format!("http://{addr}/echo"));
    assert_eq!(client.error_code(), 2);
}

#[test]
fn each_request_overwrites_previous_state() {
    let addr = spawn_server();
    let mut client = Client::new().unwrap();

    client.get(format!("http://{addr}/status/500"));
    assert_eq!(client.response_code(), 500);

    client.post(format!("http://{addr}/echo"), "raw");
    assert_eq!(client.response_code(), 200);
    assert_eq!(client.request_body(), &RequestBody::from("raw"));
    assert_eq!(echo(&client).body, "raw");
}
