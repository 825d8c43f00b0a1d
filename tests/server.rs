use async_std::io::{ReadExt, WriteExt};
use async_std::net::{SocketAddr, TcpStream};
use async_std::task;
use flate2::read::GzDecoder;
use mockstore::{Server, ServerConfig};
use serde_json::{Value, json};
use std::io::Read;

const GATE: &str = "X-Requested-With: XMLHttpRequest\r\nAuthorization: Bearer your_token\r\n";

async fn start(config: ServerConfig) -> SocketAddr {
    let server = Server::bind(ServerConfig { port: 0, ..config }).await.unwrap();
    let addr = server.local_addr().unwrap();
    task::spawn(server.run());
    addr
}

struct RawResponse {
    status: u16,
    head: String,
    body: Vec<u8>,
}

impl RawResponse {
    fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (n, v) = line.split_once(':')?;
            n.eq_ignore_ascii_case(name).then(|| v.trim())
        })
    }

    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

async fn send(addr: SocketAddr, raw: &[u8]) -> RawResponse {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();

    // The server closes the connection after one response
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes).await.unwrap();

    let split = bytes
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has a header section");
    let head = String::from_utf8(bytes[..split].to_vec()).unwrap();
    let status = head
        .split(' ')
        .nth(1)
        .and_then(|s| s.parse().ok())
        .expect("status line");

    RawResponse {
        status,
        head,
        body: bytes[split + 4..].to_vec(),
    }
}

fn with_body(method: &str, target: &str, extra: &str, body: &str) -> Vec<u8> {
    format!(
        "{method} {target} HTTP/1.1\r\nHost: localhost\r\n{extra}Content-Length: {}\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}

fn without_body(method: &str, target: &str, extra: &str) -> Vec<u8> {
    format!("{method} {target} HTTP/1.1\r\nHost: localhost\r\n{extra}\r\n").into_bytes()
}

#[async_std::test]
async fn full_document_lifecycle() {
    let addr = start(ServerConfig::default()).await;
    let json_gate = format!("{GATE}Content-Type: application/json\r\n");

    let res = send(addr, &with_body("POST", "/post", &json_gate, r#"{"a":0,"b":2}"#)).await;
    assert_eq!(res.status, 201);
    assert_eq!(
        res.json(),
        json!({ "message": "Data received", "data": { "a": 0, "b": 2 } })
    );

    let res = send(addr, &with_body("PATCH", "/patch/0", &json_gate, r#"{"a":1}"#)).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json()["data"], json!({ "a": 1, "b": 2 }));

    let res = send(addr, &with_body("PUT", "/put/0", &json_gate, r#"{"c":3}"#)).await;
    assert_eq!(res.status, 200);

    let res = send(addr, &without_body("GET", "/get", GATE)).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json(), json!({ "data": [{ "c": 3 }] }));
    assert_eq!(res.header("Content-Type"), Some("application/json"));
    assert_eq!(res.header("Connection"), Some("close"));

    let res = send(addr, &without_body("DELETE", "/delete/0", GATE)).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json()["data"], json!({ "c": 3 }));

    let res = send(addr, &without_body("DELETE", "/delete/0", GATE)).await;
    assert_eq!(res.status, 404);
}

#[async_std::test]
async fn gate_rejection_over_the_wire() {
    let addr = start(ServerConfig::default()).await;

    let extra = "X-Requested-With: XMLHttpRequest\r\nContent-Type: application/json\r\n";
    let res = send(addr, &with_body("POST", "/post", extra, r#"{"key":"value""#)).await;

    assert_eq!(res.status, 400);
    assert_eq!(
        res.json()["description"],
        "Missing or invalid header: Authorization"
    );
}

#[async_std::test]
async fn body_split_across_writes() {
    let addr = start(ServerConfig::default()).await;
    let raw = with_body(
        "POST",
        "/post",
        &format!("{GATE}Content-Type: application/json\r\n"),
        r#"{"key":"value"}"#,
    );

    let mut stream = TcpStream::connect(addr).await.unwrap();
    let (first, second) = raw.split_at(raw.len() - 5);
    stream.write_all(first).await.unwrap();
    stream.flush().await.unwrap();
    task::sleep(std::time::Duration::from_millis(20)).await;
    stream.write_all(second).await.unwrap();

    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes).await.unwrap();
    assert!(bytes.starts_with(b"HTTP/1.1 201 Created\r\n"));
}

#[async_std::test]
async fn malformed_request_line() {
    let addr = start(ServerConfig::default()).await;
    let res = send(addr, b"GARBAGE\r\n\r\n").await;

    assert_eq!(res.status, 400);
    assert_eq!(res.json()["error"], "Bad Request");
}

#[async_std::test]
async fn oversized_body_is_refused_before_reading_it() {
    let addr = start(ServerConfig {
        max_body_size: 16,
        ..ServerConfig::default()
    })
    .await;

    let raw = format!(
        "POST /post HTTP/1.1\r\nHost: localhost\r\n{GATE}Content-Type: application/json\r\nContent-Length: 17\r\n\r\n"
    );
    let res = send(addr, raw.as_bytes()).await;
    assert_eq!(res.status, 413);
}

#[async_std::test]
async fn chunked_request_needs_length() {
    let addr = start(ServerConfig::default()).await;
    let res = send(
        addr,
        &without_body("POST", "/post", "Transfer-Encoding: chunked\r\n"),
    )
    .await;
    assert_eq!(res.status, 411);
}

#[async_std::test]
async fn chunked_request_with_length_is_refused() {
    let addr = start(ServerConfig::default()).await;
    let extra = format!("{GATE}Transfer-Encoding: chunked\r\n");
    let res = send(addr, &with_body("POST", "/post", &extra, "")).await;
    assert_eq!(res.status, 400);
}

#[async_std::test]
async fn malformed_content_length_is_refused() {
    let addr = start(ServerConfig::default()).await;
    let raw = format!("POST /post HTTP/1.1\r\nHost: localhost\r\n{GATE}Content-Length: ten\r\n\r\n");
    let res = send(addr, raw.as_bytes()).await;
    assert_eq!(res.status, 400);
}

#[async_std::test]
async fn conflicting_content_lengths_are_refused() {
    let addr = start(ServerConfig::default()).await;
    let raw = format!(
        "POST /post HTTP/1.1\r\nHost: localhost\r\n{GATE}Content-Type: application/json\r\nContent-Length: 2\r\nContent-Length: 0\r\n\r\n"
    );
    let res = send(addr, raw.as_bytes()).await;
    assert_eq!(res.status, 400);

    let res = send(addr, &without_body("GET", "/get", GATE)).await;
    assert_eq!(res.json(), json!({ "data": [] }));
}

#[async_std::test]
async fn gzip_when_accepted() {
    let addr = start(ServerConfig {
        compression_min_size: 0,
        ..ServerConfig::default()
    })
    .await;

    let extra = format!("{GATE}Accept-Encoding: gzip, deflate\r\n");
    let res = send(addr, &without_body("GET", "/get", &extra)).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.header("Content-Encoding"), Some("gzip"));

    let mut decoded = String::new();
    GzDecoder::new(res.body.as_slice())
        .read_to_string(&mut decoded)
        .unwrap();
    assert_eq!(decoded, r#"{"data":[]}"#);
}

#[async_std::test]
async fn concurrent_posts_all_land() {
    let addr = start(ServerConfig::default()).await;
    let json_gate = format!("{GATE}Content-Type: application/json\r\n");

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let raw = with_body("POST", "/post", &json_gate, &json!({ "n": i }).to_string());
            task::spawn(async move { send(addr, &raw).await.status })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await, 201);
    }

    let res = send(addr, &without_body("GET", "/get", GATE)).await;
    let mut seen: Vec<i64> = res.json()["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|doc| doc["n"].as_i64().unwrap())
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..20).collect::<Vec<_>>());
}
