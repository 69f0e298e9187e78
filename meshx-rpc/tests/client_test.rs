//! RpcClient against a canned local HTTP responder

use meshx_rpc::{BlockSource, Error, RpcClient, RpcConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn block_json(height: u64, hash: &str, prev: &str) -> String {
    format!(
        r#"{{"result":{{"block_id":{{"hash":"{}"}},"block":{{"header":{{"height":"{}","last_block_id":{{"hash":"{}"}}}},"data":{{"txs":[]}}}}}}}}"#,
        hash, height, prev
    )
}

/// Serve one 200 response per connection; returns the address and a handle
/// yielding the request lines that were seen.
async fn serve(bodies: Vec<String>) -> (String, tokio::task::JoinHandle<Vec<String>>) {
    serve_with_status(bodies.into_iter().map(|body| ("200 OK", body)).collect()).await
}

async fn serve_with_status(
    responses: Vec<(&'static str, String)>,
) -> (String, tokio::task::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let handle = tokio::spawn(async move {
        let mut seen = Vec::new();
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            seen.push(request.lines().next().unwrap_or_default().to_string());

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
        seen
    });

    (addr, handle)
}

#[tokio::test]
async fn test_head_and_block_at() {
    let (addr, handle) = serve(vec![block_json(9, "H9", "H8"), block_json(4, "H4", "H3")]).await;
    let client = RpcClient::new(&RpcConfig { url: addr, timeout_secs: 5 }).unwrap();

    let head = client.head().await.unwrap();
    assert_eq!(head.height, 9);
    assert_eq!(head.hash, "H9");

    let block = client.block_at(4).await.unwrap();
    assert_eq!(block.prev_hash, "H3");

    let seen = handle.await.unwrap();
    assert_eq!(seen[0], "GET /block HTTP/1.1");
    assert_eq!(seen[1], "GET /block?height=4 HTTP/1.1");
}

#[tokio::test]
async fn test_block_at_height_mismatch() {
    let (addr, _handle) = serve(vec![block_json(5, "H5", "H4")]).await;
    let client = RpcClient::new(&RpcConfig { url: addr, timeout_secs: 5 }).unwrap();

    assert!(matches!(client.block_at(6).await, Err(Error::Malformed(_))));
}

#[tokio::test]
async fn test_unreachable_node() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let client = RpcClient::new(&RpcConfig { url: addr, timeout_secs: 2 }).unwrap();
    assert!(matches!(client.head().await, Err(Error::Unavailable(_))));
}

#[tokio::test]
async fn test_gateway_error_is_unavailable() {
    let (addr, _handle) = serve_with_status(vec![
        ("502 Bad Gateway", "<html>bad gateway</html>".to_string()),
        ("503 Service Unavailable", String::new()),
    ])
    .await;
    let client = RpcClient::new(&RpcConfig { url: addr, timeout_secs: 5 }).unwrap();

    assert!(matches!(client.head().await, Err(Error::Unavailable(_))));
    assert!(matches!(client.block_at(3).await, Err(Error::Unavailable(_))));
}

#[tokio::test]
async fn test_json_rpc_error_on_server_error_is_malformed() {
    let body = r#"{"jsonrpc":"2.0","id":-1,"error":{"code":-32603,"message":"Internal error","data":"height 7 must be less than or equal to the current blockchain height 5"}}"#;
    let (addr, _handle) = serve_with_status(vec![("500 Internal Server Error", body.to_string())]).await;
    let client = RpcClient::new(&RpcConfig { url: addr, timeout_secs: 5 }).unwrap();

    match client.block_at(7).await {
        Err(Error::Malformed(message)) => assert!(message.contains("height 7")),
        other => panic!("expected Malformed, got {:?}", other),
    }
}
