use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tiny_http::{Header, Response, Server, StatusCode};
use url::Url;
use ygocatalog::{fetch_all, FetchError, HttpSource, Language, SourceFetcher};

fn json_header() -> Header {
    Header::from_bytes("Content-Type", "application/json").unwrap()
}

fn query_of(url: &str) -> HashMap<String, String> {
    let parsed = Url::parse(&format!("http://localhost{url}")).unwrap();
    parsed.query_pairs().into_owned().collect()
}

fn source_for(server: &Server) -> HttpSource {
    let addr = server.server_addr().to_ip().expect("ip listener");
    HttpSource::new(&format!("http://{addr}/api/v7/cardinfo.php"), Duration::from_secs(5))
        .expect("http source")
}

#[test]
fn paginates_until_a_short_page() {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let source = source_for(&server);

    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for _ in 0..2 {
            let Ok(request) = server.recv() else { break };
            let query = query_of(request.url());
            let offset: u64 = query["offset"].parse().unwrap();
            let ids: Vec<u64> = if offset == 0 { vec![1, 2] } else { vec![3] };
            let body = json!({
                "data": ids.iter().map(|id| json!({"id": id, "name": format!("Carta {id}")})).collect::<Vec<_>>(),
                "meta": {"total_rows": 3}
            });
            seen.push(query);
            request
                .respond(Response::from_string(body.to_string()).with_header(json_header()))
                .expect("respond");
        }
        seen
    });

    let items = fetch_all(&source, Some(Language::It), 2).expect("fetch");
    let seen = handle.join().expect("server thread");

    assert_eq!(items.iter().map(|item| item.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(items[2].name.as_deref(), Some("Carta 3"));
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0]["language"], "it");
    assert_eq!(seen[0]["misc"], "yes");
    assert_eq!(seen[0]["num"], "2");
    assert_eq!(seen[1]["offset"], "2");
}

#[test]
fn non_success_status_is_reported_with_body() {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let source = source_for(&server);

    let handle = thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let response = Response::from_string("{\"error\":\"maintenance\"}")
                .with_status_code(StatusCode(503));
            request.respond(response).expect("respond");
        }
    });

    let err = source.fetch_page(None, 0, 500).unwrap_err();
    handle.join().expect("server thread");

    match err {
        FetchError::Status {
            status,
            offset,
            body,
            ..
        } => {
            assert_eq!(status, 503);
            assert_eq!(offset, 0);
            assert!(body.contains("maintenance"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[test]
fn malformed_body_is_a_decode_error() {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let source = source_for(&server);

    let handle = thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let response = Response::from_string("<html>oops</html>").with_header(json_header());
            request.respond(response).expect("respond");
        }
    });

    let err = source.fetch_page(Some(Language::De), 500, 500).unwrap_err();
    handle.join().expect("server thread");
    assert!(matches!(err, FetchError::Decode { offset: 500, .. }));
}
