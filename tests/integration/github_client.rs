//! `GitHubClient` against a local mock of the GitHub REST API.

use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;
use unhacs_cli::core::UnhacsError;
use unhacs_cli::source::{GitHubClient, RepoId, SourceClient};
use unhacs_cli::test_utils::zip_archive;

fn client(server: &MockServer) -> GitHubClient {
    GitHubClient::new(&server.base_url(), None, Duration::from_secs(5)).unwrap()
}

fn repo() -> RepoId {
    RepoId::new("someone", "card")
}

#[tokio::test]
async fn test_list_versions_sorts_newest_first_and_skips_drafts() {
    let server = MockServer::start();
    let releases = server.mock(|when, then| {
        when.method(GET).path("/repos/someone/card/releases").query_param("per_page", "100");
        then.status(200).json_body(json!([
            {"tag_name": "v1.0", "draft": false, "published_at": "2024-01-01T00:00:00Z", "assets": []},
            {"tag_name": "v3.0-draft", "draft": true, "published_at": null, "assets": []},
            {"tag_name": "v2.0", "draft": false, "published_at": "2024-03-01T00:00:00Z", "assets": []},
            {"tag_name": "v1.5", "draft": false, "published_at": "2024-02-01T00:00:00Z", "assets": []}
        ]));
    });

    let listed = client(&server).list_versions(&repo()).await.unwrap();

    releases.assert();
    let tags: Vec<&str> = listed.iter().map(|r| r.tag.as_str()).collect();
    assert_eq!(tags, ["v2.0", "v1.5", "v1.0"]);
}

#[tokio::test]
async fn test_list_versions_follows_next_page_links() {
    let server = MockServer::start();
    let next = server.url("/repositories/42/releases?per_page=100&page=2");
    let first = server.mock(|when, then| {
        when.method(GET).path("/repos/someone/card/releases");
        then.status(200)
            .header("link", format!(r#"<{next}>; rel="next", <{next}>; rel="last""#))
            .json_body(json!([
                {"tag_name": "v3.0", "draft": false, "published_at": "2024-05-01T00:00:00Z", "assets": []},
                {"tag_name": "v2.0", "draft": false, "published_at": "2024-03-01T00:00:00Z", "assets": []}
            ]));
    });
    let second = server.mock(|when, then| {
        when.method(GET).path("/repositories/42/releases").query_param("page", "2");
        then.status(200).json_body(json!([
            {"tag_name": "v2.5", "draft": false, "published_at": "2024-04-01T00:00:00Z", "assets": []},
            {"tag_name": "v1.0", "draft": false, "published_at": "2024-01-01T00:00:00Z", "assets": []}
        ]));
    });

    let listed = client(&server).list_versions(&repo()).await.unwrap();

    first.assert_calls(1);
    second.assert_calls(1);
    let tags: Vec<&str> = listed.iter().map(|r| r.tag.as_str()).collect();
    assert_eq!(tags, ["v3.0", "v2.5", "v2.0", "v1.0"]);
}

#[tokio::test]
async fn test_list_versions_empty() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/someone/card/releases");
        then.status(200).json_body(json!([]));
    });

    assert!(client(&server).list_versions(&repo()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_versions_maps_status_codes() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/someone/gone/releases");
        then.status(404).json_body(json!({"message": "Not Found"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/someone/card/releases");
        then.status(502).body("bad gateway");
    });
    let client = client(&server);

    let err = client.list_versions(&RepoId::new("someone", "gone")).await.unwrap_err();
    assert!(matches!(err, UnhacsError::RepoNotFound { ref repo } if repo == "someone/gone"), "{err:?}");
    assert!(!err.is_retryable());

    let err = client.list_versions(&repo()).await.unwrap_err();
    assert!(matches!(err, UnhacsError::SourceUnavailable { ref reason, .. } if reason.contains("502")), "{err:?}");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_list_versions_rejects_malformed_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/someone/card/releases");
        then.status(200).body("<html>rate limited</html>");
    });

    let err = client(&server).list_versions(&repo()).await.unwrap_err();
    assert!(matches!(err, UnhacsError::SourceUnavailable { .. }), "{err:?}");
}

#[tokio::test]
async fn test_fetch_downloads_asset_named_by_hacs_json() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/someone/card/releases/tags/v1.0");
        then.status(200).json_body(json!({
            "tag_name": "v1.0",
            "published_at": "2024-01-01T00:00:00Z",
            "assets": [
                {"name": "card.js", "browser_download_url": server.url("/downloads/card.js")},
                {"name": "card.js.gz", "browser_download_url": server.url("/downloads/card.js.gz")}
            ]
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/someone/card/contents/hacs.json").query_param("ref", "v1.0");
        then.status(200).body(r#"{"name": "Card", "filename": "card.js"}"#);
    });
    let download = server.mock(|when, then| {
        when.method(GET).path("/downloads/card.js");
        then.status(200).body("customElements.define('card', Card);");
    });

    let artifact = client(&server).fetch(&repo(), "v1.0").await.unwrap();

    download.assert();
    assert_eq!(artifact.filename, "card.js");
    assert_eq!(artifact.bytes, b"customElements.define('card', Card);");
}

#[tokio::test]
async fn test_fetch_falls_back_to_zipball() {
    let server = MockServer::start();
    let archive = zip_archive(&[("someone-card-abc123/", ""), ("someone-card-abc123/card.js", "x")]);
    server.mock(|when, then| {
        when.method(GET).path("/repos/someone/card/releases/tags/v2.0");
        then.status(200).json_body(json!({"tag_name": "v2.0", "assets": []}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/someone/card/contents/hacs.json");
        then.status(404).json_body(json!({"message": "Not Found"}));
    });
    let zipball = server.mock(|when, then| {
        when.method(GET).path("/repos/someone/card/zipball/v2.0");
        then.status(200).header("content-type", "application/zip").body(archive.clone());
    });

    let artifact = client(&server).fetch(&repo(), "v2.0").await.unwrap();

    zipball.assert();
    assert_eq!(artifact.filename, "card-v2.0.zip");
    assert_eq!(artifact.bytes, archive);
}

#[tokio::test]
async fn test_fetch_uses_zipball_when_named_asset_is_missing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/someone/card/releases/tags/v2.0");
        then.status(200).json_body(json!({"tag_name": "v2.0", "assets": []}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/someone/card/contents/hacs.json");
        then.status(200).body(r#"{"filename": "card.js"}"#);
    });
    let zipball = server.mock(|when, then| {
        when.method(GET).path("/repos/someone/card/zipball/v2.0");
        then.status(200).body(zip_archive(&[("card.js", "x")]));
    });

    let artifact = client(&server).fetch(&repo(), "v2.0").await.unwrap();

    zipball.assert();
    assert_eq!(artifact.filename, "card-v2.0.zip");
}

#[tokio::test]
async fn test_fetch_plugin_asset_without_lovelace_prefix() {
    let server = MockServer::start();
    let repo = RepoId::new("someone", "lovelace-card");
    server.mock(|when, then| {
        when.method(GET).path("/repos/someone/lovelace-card/releases/tags/v1.0");
        then.status(200).json_body(json!({
            "tag_name": "v1.0",
            "assets": [
                {"name": "card.js.map", "browser_download_url": server.url("/downloads/card.js.map")},
                {"name": "card.js", "browser_download_url": server.url("/downloads/card.js")}
            ]
        }));
    });
    let download = server.mock(|when, then| {
        when.method(GET).path("/downloads/card.js");
        then.status(200).body("class Card {}");
    });
    let zipball = server.mock(|when, then| {
        when.method(GET).path("/repos/someone/lovelace-card/zipball/v1.0");
        then.status(200).body(zip_archive(&[("card.js", "x")]));
    });

    let artifact = client(&server).fetch(&repo, "v1.0").await.unwrap();

    download.assert();
    zipball.assert_calls(0);
    assert_eq!(artifact.filename, "card.js");
    assert_eq!(artifact.bytes, b"class Card {}");
}

#[tokio::test]
async fn test_fetch_plugin_from_dist_directory() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/someone/card/releases/tags/v1.0");
        then.status(200).json_body(json!({"tag_name": "v1.0", "assets": []}));
    });
    let dist = server.mock(|when, then| {
        when.method(GET)
            .path("/repos/someone/card/contents/dist/card.js")
            .query_param("ref", "v1.0")
            .header("accept", "application/vnd.github.raw");
        then.status(200).body("class Card {}");
    });
    let zipball = server.mock(|when, then| {
        when.method(GET).path("/repos/someone/card/zipball/v1.0");
        then.status(200).body(zip_archive(&[("card.js", "x")]));
    });

    let artifact = client(&server).fetch(&repo(), "v1.0").await.unwrap();

    dist.assert();
    zipball.assert_calls(0);
    assert_eq!(artifact.filename, "card.js");
    assert_eq!(artifact.bytes, b"class Card {}");
}

#[tokio::test]
async fn test_fetch_unknown_tag_is_version_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/someone/card/releases/tags/v9.9");
        then.status(404).json_body(json!({"message": "Not Found"}));
    });

    let err = client(&server).fetch(&repo(), "v9.9").await.unwrap_err();
    assert!(
        matches!(err, UnhacsError::VersionNotFound { ref version, .. } if version == "v9.9"),
        "{err:?}"
    );
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_requests_carry_token_and_api_headers() {
    let server = MockServer::start();
    let releases = server.mock(|when, then| {
        when.method(GET)
            .path("/repos/someone/card/releases")
            .header("authorization", "Bearer secret-token")
            .header("x-github-api-version", "2022-11-28");
        then.status(200).json_body(json!([]));
    });

    let client = GitHubClient::new(&server.base_url(), Some("secret-token"), Duration::from_secs(5)).unwrap();
    client.list_versions(&repo()).await.unwrap();

    releases.assert();
}
