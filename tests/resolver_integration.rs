//! Integration tests for the site resolvers and the CDN probe walk.

use gallery_core::cdn::probe_candidates;
use gallery_core::http::build_session;
use gallery_core::resolver::{BunkrResolver, CyberdropResolver, ResolveContext, UrlResolver};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(body.to_string())
}

// ==================== Bunkr Resolver ====================

#[tokio::test]
async fn bunkr_resolves_source_element_over_styled_img() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v/clip"))
        .respond_with(html(
            r#"<html><body>
                <img class="max-h-full" src="https://cdn.example.com/B.jpg">
                <source src="https://cdn.example.com/A.mp4">
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let client = build_session().unwrap();
    let ctx = ResolveContext {
        client: &client,
        cdn_hosts: &[],
    };
    let item = BunkrResolver::new()
        .resolve(&ctx, &format!("{}/v/clip", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(item.url, "https://cdn.example.com/A.mp4");
    assert!(item.size_hint.is_none());
    assert!(item.name_hint.is_none());
}

#[tokio::test]
async fn bunkr_resolves_styled_img_when_no_player() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/i/pic"))
        .respond_with(html(
            r#"<html><body>
                <img class="max-h-full" src="https://cdn.example.com/pic.jpg">
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let client = build_session().unwrap();
    let ctx = ResolveContext {
        client: &client,
        cdn_hosts: &[],
    };
    let item = BunkrResolver::new()
        .resolve(&ctx, &format!("{}/i/pic", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(item.url, "https://cdn.example.com/pic.jpg");
}

#[tokio::test]
async fn bunkr_http_error_resolves_to_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = build_session().unwrap();
    let ctx = ResolveContext {
        client: &client,
        cdn_hosts: &[],
    };
    let item = BunkrResolver::new()
        .resolve(&ctx, &format!("{}/v/gone", mock_server.uri()))
        .await;

    assert!(item.is_none());
}

#[tokio::test]
async fn bunkr_page_without_media_or_heading_resolves_to_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v/empty"))
        .respond_with(html("<html><body><p>nothing</p></body></html>"))
        .mount(&mock_server)
        .await;

    let client = build_session().unwrap();
    let ctx = ResolveContext {
        client: &client,
        cdn_hosts: &[],
    };
    let item = BunkrResolver::new()
        .resolve(&ctx, &format!("{}/v/empty", mock_server.uri()))
        .await;

    assert!(item.is_none());
}

#[tokio::test]
async fn bunkr_gallery_heading_with_empty_cdn_list_resolves_to_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/d/file.zip"))
        .respond_with(html(
            r#"<html><body><h1 class="truncate">file.zip</h1></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let client = build_session().unwrap();
    let ctx = ResolveContext {
        client: &client,
        cdn_hosts: &[],
    };
    let item = BunkrResolver::new()
        .resolve(&ctx, &format!("{}/d/file.zip", mock_server.uri()))
        .await;

    assert!(item.is_none());
}

// ==================== Cyberdrop Resolver ====================

#[tokio::test]
async fn cyberdrop_resolves_via_json_api() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/f/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "url": "https://fs-01.cyberdrop.cc/abc123.jpg",
            "name": "holiday.jpg"
        })))
        .mount(&mock_server)
        .await;

    let client = build_session().unwrap();
    let ctx = ResolveContext {
        client: &client,
        cdn_hosts: &[],
    };
    let item = CyberdropResolver::new()
        .resolve(&ctx, &format!("{}/f/abc123", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(item.url, "https://fs-01.cyberdrop.cc/abc123.jpg");
    assert_eq!(item.name_hint.as_deref(), Some("holiday.jpg"));
}

#[tokio::test]
async fn cyberdrop_malformed_json_resolves_to_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/f/bad"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let client = build_session().unwrap();
    let ctx = ResolveContext {
        client: &client,
        cdn_hosts: &[],
    };
    let item = CyberdropResolver::new()
        .resolve(&ctx, &format!("{}/f/bad", mock_server.uri()))
        .await;

    assert!(item.is_none());
}

#[tokio::test]
async fn cyberdrop_http_error_resolves_to_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/f/gone"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = build_session().unwrap();
    let ctx = ResolveContext {
        client: &client,
        cdn_hosts: &[],
    };
    let item = CyberdropResolver::new()
        .resolve(&ctx, &format!("{}/f/gone", mock_server.uri()))
        .await;

    assert!(item.is_none());
}

// ==================== CDN Probe Walk ====================

#[tokio::test]
async fn probe_returns_first_host_answering_200_and_stops() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/h1/file.zip"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/h2/file.zip"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/h3/file.zip"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let candidates: Vec<String> = ["h1", "h2", "h3"]
        .iter()
        .map(|h| format!("{}/{h}/file.zip", mock_server.uri()))
        .collect();
    let client = build_session().unwrap();
    let found = probe_candidates(&client, "https://bunkr.sk/d/file.zip", &candidates).await;

    assert_eq!(found.as_deref(), Some(candidates[1].as_str()));
}

#[tokio::test]
async fn probe_403_aborts_without_trying_later_hosts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/h1/file.zip"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/h2/file.zip"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let candidates: Vec<String> = ["h1", "h2"]
        .iter()
        .map(|h| format!("{}/{h}/file.zip", mock_server.uri()))
        .collect();
    let client = build_session().unwrap();
    let found = probe_candidates(&client, "https://bunkr.sk/d/file.zip", &candidates).await;

    assert!(found.is_none());
}

#[tokio::test]
async fn probe_unexpected_status_aborts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/h1/file.zip"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/h2/file.zip"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let candidates: Vec<String> = ["h1", "h2"]
        .iter()
        .map(|h| format!("{}/{h}/file.zip", mock_server.uri()))
        .collect();
    let client = build_session().unwrap();
    let found = probe_candidates(&client, "https://bunkr.sk/d/file.zip", &candidates).await;

    assert!(found.is_none());
}

#[tokio::test]
async fn probe_transport_error_moves_to_next_host() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/h2/file.zip"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    // First candidate points at a port nothing listens on.
    let dead = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/h1/file.zip")
    };
    let candidates = vec![dead, format!("{}/h2/file.zip", mock_server.uri())];
    let client = build_session().unwrap();
    let found = probe_candidates(&client, "https://bunkr.sk/d/file.zip", &candidates).await;

    assert_eq!(found.as_deref(), Some(candidates[1].as_str()));
}

#[tokio::test]
async fn probe_all_hosts_404_resolves_to_none() {
    let mock_server = MockServer::start().await;

    for h in ["h1", "h2"] {
        Mock::given(method("GET"))
            .and(path(format!("/{h}/file.zip")))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let candidates: Vec<String> = ["h1", "h2"]
        .iter()
        .map(|h| format!("{}/{h}/file.zip", mock_server.uri()))
        .collect();
    let client = build_session().unwrap();
    let found = probe_candidates(&client, "https://bunkr.sk/d/file.zip", &candidates).await;

    assert!(found.is_none());
}
