//! Integration tests for the host bridge
//!
//! Drives the bridge over a real TCP socket while lookups hit a mock
//! provider.

use country_block::adapters::bridge_protocol::HostCommand;
use country_block::adapters::inbound::HostBridge;
use country_block::adapters::outbound::{
    BridgeSessions, ReqwestGeoLookupClient, StaticPermissions, TemplateLocalizer,
};
use country_block::config::load_config_with;
use country_block::{LookupOrchestrator, RejectionHandler, ShutdownController};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Wire the service the same way the binary does, from variables.
async fn start_bridge(vars: &[(&str, String)]) -> (std::net::SocketAddr, ShutdownController) {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    let cfg = load_config_with(|key| vars.get(key).cloned()).unwrap();

    let sessions = Arc::new(BridgeSessions::new());
    let shutdown = ShutdownController::new();
    let policy = Arc::new(cfg.policy());
    let rejection = RejectionHandler::new(
        sessions.clone(),
        Arc::new(TemplateLocalizer::new()),
        policy.ban_instantly,
    );
    let orchestrator = LookupOrchestrator::new(
        cfg.registry().unwrap(),
        Arc::new(ReqwestGeoLookupClient::new(cfg.http_timeout()).unwrap()),
        sessions.clone(),
        Arc::new(StaticPermissions::from_ids(&cfg.bypass_ids, &cfg.admin_ids)),
        rejection,
        policy,
        cfg.retry_policy(),
    )
    .with_rng_seed(cfg.rng_seed)
    .with_shutdown(shutdown.clone());

    let bridge = HostBridge::new(
        Arc::new(orchestrator),
        sessions,
        cfg.listen_addr.clone(),
        shutdown.clone(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { bridge.serve(listener).await });

    (addr, shutdown)
}

async fn next_command(
    lines: &mut tokio::io::Lines<BufReader<tokio::net::tcp::OwnedReadHalf>>,
    wait: Duration,
) -> Option<HostCommand> {
    match tokio::time::timeout(wait, lines.next_line()).await {
        Ok(Ok(Some(line))) => Some(serde_json::from_str(&line).unwrap()),
        _ => None,
    }
}

async fn provider() -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/8.8.8.8"))
        .respond_with(ResponseTemplate::new(200).set_body_string("CN"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/9.9.9.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "country": {"code": "US"}
        })))
        .mount(&mock_server)
        .await;
    mock_server
}

/// Connected events lead to kicks only for denied countries
#[tokio::test]
async fn test_bridge_kicks_denied_players() {
    let mock_server = provider().await;
    let (addr, _shutdown) = start_bridge(&[(
        "COUNTRYBLOCK_PROVIDERS",
        format!("{}/{{ip}}", mock_server.uri()),
    )])
    .await;

    let stream = TcpStream::connect(addr).await.unwrap();
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    write
        .write_all(
            concat!(
                "{\"event\":\"connected\",\"id\":\"us\",\"name\":\"bob\",\"address\":\"9.9.9.9:1\"}\n",
                "{\"event\":\"connected\",\"id\":\"cn\",\"name\":\"li\",\"address\":\"8.8.8.8:1\"}\n",
            )
            .as_bytes(),
        )
        .await
        .unwrap();

    assert_eq!(
        next_command(&mut lines, Duration::from_secs(5)).await,
        Some(HostCommand::Kick {
            id: "cn".to_string(),
            message: "This server doesn't allow players from CN".to_string(),
        })
    );
    assert_eq!(next_command(&mut lines, Duration::from_millis(300)).await, None);
}

/// Admins and bypass holders are never looked up
#[tokio::test]
async fn test_bridge_respects_admins_and_bypass() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("CN"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (addr, _shutdown) = start_bridge(&[
        (
            "COUNTRYBLOCK_PROVIDERS",
            format!("{}/{{ip}}", mock_server.uri()),
        ),
        ("COUNTRYBLOCK_BYPASS_IDS", "vip".to_string()),
    ])
    .await;

    let stream = TcpStream::connect(addr).await.unwrap();
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    write
        .write_all(
            concat!(
                "{\"event\":\"connected\",\"id\":\"adm\",\"name\":\"a\",\"address\":\"8.8.8.8\",\"admin\":true}\n",
                "{\"event\":\"connected\",\"id\":\"vip\",\"name\":\"v\",\"address\":\"8.8.8.8\"}\n",
            )
            .as_bytes(),
        )
        .await
        .unwrap();

    assert_eq!(next_command(&mut lines, Duration::from_millis(500)).await, None);
}

/// A player who leaves before the answer arrives is not kicked
#[tokio::test]
async fn test_bridge_player_leaving_before_answer() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("CN")
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    let (addr, _shutdown) = start_bridge(&[(
        "COUNTRYBLOCK_PROVIDERS",
        format!("{}/{{ip}}", mock_server.uri()),
    )])
    .await;

    let stream = TcpStream::connect(addr).await.unwrap();
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    write
        .write_all(
            concat!(
                "{\"event\":\"connected\",\"id\":\"1\",\"name\":\"a\",\"address\":\"8.8.8.8\"}\n",
                "{\"event\":\"disconnected\",\"id\":\"1\"}\n",
            )
            .as_bytes(),
        )
        .await
        .unwrap();

    assert_eq!(next_command(&mut lines, Duration::from_secs(1)).await, None);
}

/// Shutdown closes the bridge and waits for running lookups
#[tokio::test]
async fn test_bridge_shutdown_drains_lookups() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("US")
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&mock_server)
        .await;

    let (addr, shutdown) = start_bridge(&[(
        "COUNTRYBLOCK_PROVIDERS",
        format!("{}/{{ip}}", mock_server.uri()),
    )])
    .await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"{\"event\":\"connected\",\"id\":\"1\",\"name\":\"a\",\"address\":\"8.8.8.8\"}\n")
        .await
        .unwrap();

    for _ in 0..50 {
        if shutdown.in_flight() > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(shutdown.in_flight(), 1);

    shutdown.shutdown();
    assert!(shutdown.wait_for_drain(Duration::from_secs(5)).await);
    assert_eq!(shutdown.in_flight(), 0);
}

/// Players denied while shutdown drains are still kicked before the bridge closes
#[tokio::test]
async fn test_bridge_shutdown_still_kicks_denied_players() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("CN")
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    let (addr, shutdown) = start_bridge(&[(
        "COUNTRYBLOCK_PROVIDERS",
        format!("{}/{{ip}}", mock_server.uri()),
    )])
    .await;

    let stream = TcpStream::connect(addr).await.unwrap();
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    write
        .write_all(b"{\"event\":\"connected\",\"id\":\"1\",\"name\":\"a\",\"address\":\"8.8.8.8\"}\n")
        .await
        .unwrap();

    for _ in 0..50 {
        if shutdown.in_flight() > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(shutdown.in_flight(), 1);

    shutdown.shutdown();
    assert!(shutdown.wait_for_drain(Duration::from_secs(5)).await);

    assert_eq!(
        next_command(&mut lines, Duration::from_secs(5)).await,
        Some(HostCommand::Kick {
            id: "1".to_string(),
            message: "This server doesn't allow players from CN".to_string(),
        })
    );
    assert_eq!(next_command(&mut lines, Duration::from_secs(5)).await, None);
}

/// A player who reconnects during a lookup is only kicked by the newer check
#[tokio::test]
async fn test_bridge_reconnect_kicks_once() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("CN")
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    let (addr, _shutdown) = start_bridge(&[(
        "COUNTRYBLOCK_PROVIDERS",
        format!("{}/{{ip}}", mock_server.uri()),
    )])
    .await;

    let stream = TcpStream::connect(addr).await.unwrap();
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    write
        .write_all(
            concat!(
                "{\"event\":\"connected\",\"id\":\"1\",\"name\":\"a\",\"address\":\"8.8.8.8\"}\n",
                "{\"event\":\"disconnected\",\"id\":\"1\"}\n",
                "{\"event\":\"connected\",\"id\":\"1\",\"name\":\"a\",\"address\":\"8.8.8.8\"}\n",
            )
            .as_bytes(),
        )
        .await
        .unwrap();

    assert_eq!(
        next_command(&mut lines, Duration::from_secs(5)).await,
        Some(HostCommand::Kick {
            id: "1".to_string(),
            message: "This server doesn't allow players from CN".to_string(),
        })
    );
    assert_eq!(next_command(&mut lines, Duration::from_millis(600)).await, None);
}
