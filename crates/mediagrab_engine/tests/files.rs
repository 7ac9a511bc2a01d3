use mediagrab_engine::{BackendClient, FailureKind, FileEntry, FileLister, StreamSettings};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> BackendClient {
    BackendClient::new(StreamSettings {
        base_url: server.uri(),
        ..StreamSettings::default()
    })
}

async fn mount_listing(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn lists_files_from_backend() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        ResponseTemplate::new(200).set_body_raw(
            r#"{"files":[{"name":"x.mp4","size":2048,"type":"video","modTime":"2024-05-01T10:00:00Z","downloadUrl":"/files/x.mp4"},{"name":"y.mp3","size":10,"type":"audio","modTime":"2024-05-02T10:00:00Z","downloadUrl":"/files/y.mp3"}],"count":2}"#,
            "application/json",
        ),
    )
    .await;

    let files = client(&server).list_files().await.expect("listing ok");

    assert_eq!(
        files,
        vec![
            FileEntry {
                name: "x.mp4".to_string(),
                size: 2048,
                kind: "video".to_string(),
                mod_time: "2024-05-01T10:00:00Z".to_string(),
                download_url: "/files/x.mp4".to_string(),
            },
            FileEntry {
                name: "y.mp3".to_string(),
                size: 10,
                kind: "audio".to_string(),
                mod_time: "2024-05-02T10:00:00Z".to_string(),
                download_url: "/files/y.mp3".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn null_file_list_is_empty() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        ResponseTemplate::new(200).set_body_raw(r#"{"files":null,"count":0}"#, "application/json"),
    )
    .await;

    assert!(client(&server).list_files().await.unwrap().is_empty());
}

#[tokio::test]
async fn listing_failures_are_classified() {
    let server = MockServer::start().await;
    mount_listing(&server, ResponseTemplate::new(500)).await;
    let err = client(&server).list_files().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));

    let server = MockServer::start().await;
    mount_listing(
        &server,
        ResponseTemplate::new(200).set_body_raw("<html>", "text/html"),
    )
    .await;
    let err = client(&server).list_files().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidResponse);
}
