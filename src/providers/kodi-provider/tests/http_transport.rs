use kodi_provider::{EntityKind, HttpTransport, KodiLibrary, RpcError, RpcTransport};
use serde_json::json;
use skinkit_core::{DbId, KodiConfig};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> KodiConfig {
    KodiConfig {
        url: format!("{}/jsonrpc", server.uri()),
        ..KodiConfig::default()
    }
}

#[tokio::test]
async fn posts_request_and_returns_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jsonrpc"))
        .and(body_partial_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "VideoLibrary.GetMovieDetails",
            "params": {"movieid": 12}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "jsonrpc": "2.0",
            "result": {"moviedetails": {"label": "Heat", "movieid": 12}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let result = tokio::task::spawn_blocking(move || {
        let transport = HttpTransport::new(&config)?;
        transport.call(
            "VideoLibrary.GetMovieDetails",
            json!({"movieid": 12, "properties": ["title"]}),
        )
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(result["moviedetails"]["label"], "Heat");
}

#[tokio::test]
async fn remote_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jsonrpc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "jsonrpc": "2.0",
            "error": {"code": -32602, "message": "Invalid params."}
        })))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let err = tokio::task::spawn_blocking(move || {
        let transport = HttpTransport::new(&config)?;
        transport.call("VideoLibrary.GetMovieDetails", json!({"movieid": -4}))
    })
    .await
    .unwrap()
    .unwrap_err();

    match err {
        RpcError::Remote { code, message, .. } => {
            assert_eq!(code, -32602);
            assert_eq!(message, "Invalid params.");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn sends_basic_auth_and_maps_401() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jsonrpc"))
        .and(header("authorization", "Basic a29kaTpzZWNyZXQ="))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let config = KodiConfig {
        username: Some("kodi".into()),
        password: Some("secret".into()),
        ..config_for(&server)
    };
    let err = tokio::task::spawn_blocking(move || {
        let transport = HttpTransport::new(&config)?;
        transport.call("JSONRPC.Ping", json!({}))
    })
    .await
    .unwrap()
    .unwrap_err();

    assert!(matches!(err, RpcError::Unauthorized { .. }));
}

#[tokio::test]
async fn server_error_is_an_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jsonrpc"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let err = tokio::task::spawn_blocking(move || {
        let transport = HttpTransport::new(&config)?;
        transport.call("JSONRPC.Ping", json!({}))
    })
    .await
    .unwrap()
    .unwrap_err();

    assert!(matches!(err, RpcError::Http { status: 500, .. }));
}

#[tokio::test]
async fn mismatched_response_id_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jsonrpc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 99,
            "jsonrpc": "2.0",
            "result": "pong"
        })))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let err = tokio::task::spawn_blocking(move || {
        let transport = HttpTransport::new(&config)?;
        transport.call("JSONRPC.Ping", json!({}))
    })
    .await
    .unwrap()
    .unwrap_err();

    assert!(matches!(
        err,
        RpcError::IdMismatch {
            sent: 1,
            received: 99
        }
    ));
}

#[tokio::test]
async fn episode_listing_runs_sub_lookups_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "VideoLibrary.GetEpisodeDetails"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "result": {"episodedetails": {
                "label": "Pilot", "rating": 8.4, "season": 1, "seasonid": 30, "tvshowid": 5
            }}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "VideoLibrary.GetSeasonDetails",
            "params": {"seasonid": 30}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "result": {"seasondetails": {"title": "Season 1", "episode": 8}}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "VideoLibrary.GetTVShowDetails",
            "params": {"tvshowid": 5}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "result": {"tvshowdetails": {"title": "Twin Peaks"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let items = tokio::task::spawn_blocking(move || {
        let library = KodiLibrary::from_config(&config)?;
        Ok::<_, RpcError>(library.get_items(EntityKind::Episode, &DbId::Number(77)))
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(items.len(), 1);
    let item = &items[0].item;
    assert_eq!(items[0].path, "videodb://tvshows/titles/5/1/77");
    assert_eq!(item.property("rating_integer"), Some("8"));
    // both lookups land on the same prefix, the later one wins on clashes
    assert_eq!(item.property("item.title"), Some("Twin Peaks"));
    assert_eq!(item.property("item.episode"), Some("8"));
    assert_eq!(
        item.property("title.collection"),
        Some("Season 1 / Twin Peaks")
    );
}
