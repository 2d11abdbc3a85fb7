//! Playlist fetching over HTTP and from disk.

mod common;

use common::event_playlist;
use std::time::Duration;
use timeshift::config::FetchConfig;
use timeshift::engine::{poll_once, ManualPlaylistProvider, TimelineProvider};
use timeshift::fetch::{fetcher_for, FileFetcher, PlaylistFetcher};
use timeshift_common::{Error, PlaylistKind};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn http_fetch_returns_playlist_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/live/cam.m3u8"))
        .respond_with(ResponseTemplate::new(200).set_body_string(event_playlist(4)))
        .mount(&server)
        .await;

    let url = format!("{}/live/cam.m3u8", server.uri());
    let fetcher = fetcher_for(&url, &FetchConfig::default()).unwrap();
    assert_eq!(fetcher.source(), url);

    let timeline = poll_once(fetcher.as_ref()).await.unwrap();
    assert_eq!(timeline.kind(), PlaylistKind::Event);
    assert_eq!(timeline.len(), 4);
    assert_eq!(timeline.end(), Some(24.0));
}

#[tokio::test]
async fn http_error_status_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/missing.m3u8", server.uri());
    let fetcher = fetcher_for(&url, &FetchConfig::default()).unwrap();

    let err = fetcher.fetch().await.unwrap_err();
    assert!(matches!(err, Error::Fetch(_)));
    assert!(err.to_string().contains("404"));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn non_playlist_body_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>502 Bad Gateway</html>"))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&format!("{}/cam.m3u8", server.uri()), &FetchConfig::default())
        .unwrap();

    let err = poll_once(fetcher.as_ref()).await.unwrap_err();
    assert!(matches!(err, Error::Fetch(_)));
    assert!(err.to_string().contains("not an M3U8 playlist"));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn multivariant_playlist_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1280000\n720p/index.m3u8\n",
        ))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&format!("{}/master.m3u8", server.uri()), &FetchConfig::default())
        .unwrap();

    let err = poll_once(fetcher.as_ref()).await.unwrap_err();
    assert!(err.to_string().contains("multivariant"));
}

#[tokio::test]
async fn http_fetch_sends_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "recorder-ui/2.1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(event_playlist(1)))
        .expect(1)
        .mount(&server)
        .await;

    let config = FetchConfig {
        user_agent: "recorder-ui/2.1".to_string(),
        ..FetchConfig::default()
    };
    let fetcher = fetcher_for(&format!("{}/cam.m3u8", server.uri()), &config).unwrap();
    fetcher.fetch().await.unwrap();
}

#[tokio::test]
async fn manual_provider_polls_http_source() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cam.m3u8"))
        .respond_with(ResponseTemplate::new(200).set_body_string(event_playlist(3)))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(
        &format!("{}/cam.m3u8", server.uri()),
        &FetchConfig::default(),
    )
    .unwrap();
    let cancel = CancellationToken::new();
    let (provider, handle) =
        ManualPlaylistProvider::spawn(fetcher, Duration::from_millis(50), cancel.clone());

    tokio::time::timeout(Duration::from_secs(5), async {
        while provider.generation() < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("provider should refresh at least twice");

    assert_eq!(provider.timeline().len(), 3);

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn file_fetcher_rereads_rewritten_playlist() {
    let dir = tempfile::tempdir().unwrap();
    let playlist = dir.path().join("cam.m3u8");

    std::fs::write(&playlist, event_playlist(2)).unwrap();
    let fetcher = FileFetcher::new(&playlist);
    assert_eq!(poll_once(&fetcher).await.unwrap().len(), 2);

    std::fs::write(&playlist, event_playlist(5)).unwrap();
    assert_eq!(poll_once(&fetcher).await.unwrap().len(), 5);
}
