//! End-to-end calls against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `JsonClient` with its
//! default `ureq` transport over real HTTP. Covers every verb plus the status
//! and decoding folds.

use json_client_core::{ApiError, ClientConfig, JsonClient, JsonCodecFactory};
use mock_server::User;

fn start_server() -> String {
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

    format!("http://{addr}")
}

#[test]
fn user_lifecycle() {
    let base = start_server();
    let client = JsonClient::new();

    // Step 1: list — should be empty.
    let users: Vec<User> = client.get(&format!("{base}/users")).unwrap();
    assert!(users.is_empty(), "expected empty list");

    // Step 2: create.
    let grace = User {
        id: 0,
        name: "Grace".to_string(),
    };
    let created: User = client.post(&format!("{base}/users"), &grace).unwrap();
    assert_eq!(created.name, "Grace");
    assert_ne!(created.id, 0);
    let url = format!("{base}/users/{}", created.id);

    // Step 3: get.
    let fetched: User = client.get(&url).unwrap();
    assert_eq!(fetched, created);

    // Step 4: update.
    let renamed = User {
        id: created.id,
        name: "Grace Hopper".to_string(),
    };
    let updated: User = client.put(&url, &renamed).unwrap();
    assert_eq!(updated, renamed);

    // Step 5: delete returns the removed user.
    let removed: User = client.delete(&url).unwrap();
    assert_eq!(removed, renamed);

    // Step 6: get after delete — ResourceNotFound naming the address.
    let err = client.get::<User>(&url).unwrap_err();
    assert!(matches!(&err, ApiError::ResourceNotFound(msg) if msg.contains(&url)));

    // Step 7: delete again — same.
    assert!(client.delete::<User>(&url).unwrap_err().is_not_found());
}

#[test]
fn status_codes_map_to_error_kinds() {
    let base = start_server();
    let client = JsonClient::new();

    let err = client.get::<User>(&format!("{base}/status/401")).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { status: 401, .. }));

    let err = client.get::<User>(&format!("{base}/status/500")).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { status: 500, .. }));

    let err = client.get::<User>(&format!("{base}/status/404")).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn non_json_body_is_resource_not_found() {
    let base = start_server();
    let client = JsonClient::new();

    let err = client.get::<User>(&format!("{base}/garbage")).unwrap_err();
    assert!(matches!(err, ApiError::ResourceNotFound(msg) if msg == "Unexpected response received"));
}

#[test]
fn unreachable_host_is_resource_not_found() {
    // Bind and drop to get a port nobody listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = JsonClient::new();

    let err = client.get::<User>(&format!("http://127.0.0.1:{port}/users")).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn tls_client_refuses_plain_http() {
    let base = start_server();
    let client = JsonClient::with_config(JsonCodecFactory::default(), ClientConfig::tls());

    let err = client.get::<Vec<User>>(&format!("{base}/users")).unwrap_err();
    assert!(err.is_not_found());
}
