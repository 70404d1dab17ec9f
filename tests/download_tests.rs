//! Integration tests for the download flow
//!
//! These tests use wiremock to stand in for the reader site and run the
//! real HTTP client, page store and driver end-to-end.

use apabi_downloader::config::SiteConfig;
use apabi_downloader::{
    ApabiClient, BookTarget, DirPageStore, DownloadDriver, DriverOptions, Error, SystemClock,
};
use chrono::{Duration, Utc};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const META_ID: &str = "m.20151015-ZCKM-902-0064";

fn site_config(server: &MockServer) -> SiteConfig {
    SiteConfig {
        login_url: format!("{}/Usp/pku/pub.mvc/?pid=login&cult=CN", server.uri()),
        user_agent: "apabi-downloader-tests/1.0".to_string(),
        request_timeout_seconds: 5,
    }
}

fn detail_url(server: &MockServer) -> String {
    format!(
        "{}/Usp/pku/?pid=book.detail&metaid={}&cult=CN",
        server.uri(),
        META_ID
    )
}

fn reader_page() -> String {
    let deadline = (Utc::now() + Duration::hours(1)).timestamp();
    format!(
        r#"<html><body>
        <input id="txtFileID" value="FILE-7">
        <input id="txtMetaId" value="{META_ID}">
        <input id="txtOrgIdentifier" value="pku">
        <input id="txtSessionId" value="SESSION-1">
        <input id="txtuserName" value="guest">
        <input id="txtCultureName" value="CN">
        <input id="txtBookName" value="Integration Book">
        <input id="urlrights" value="rights=1-0_00&amp;time={deadline}&amp;sign=ab%2Bcd">
        </body></html>"#
    )
}

/// Mount the login, detail, reader and content endpoints.
async fn mount_handshake(server: &MockServer, login_body: &str, expected_logins: u64) {
    Mock::given(method("GET"))
        .and(path("/Usp/pku/pub.mvc/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><form method="post" action="/Usp/pku/pub.mvc/login">
               <input type="hidden" name="token" value="t1">
               <input type="hidden" name="LoginType" value="Manual">
               </form></body></html>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/Usp/pku/pub.mvc/login"))
        .and(body_string_contains("token=t1"))
        .and(body_string_contains("LoginType=IPAutoLogin"))
        .and(body_string_contains("cult=CN"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "ASP.NET_SessionId=abc; Path=/")
                .set_body_string(login_body.to_string()),
        )
        .expect(expected_logins)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Usp/pku/"))
        .and(query_param("pid", "book.detail"))
        .and(query_param("metaid", META_ID))
        .and(header("cookie", "ASP.NET_SessionId=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><a type="onlineread" href="../reader/read.aspx?id=9">Read</a></body></html>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Usp/reader/read.aspx"))
        .respond_with(ResponseTemplate::new(200).set_body_string(reader_page()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Usp/reader/Command/Getcontent.ashx"))
        .and(query_param("ServiceType", "getcontent"))
        .and(query_param("objID", "FILE-7"))
        .and(query_param("OrgIdentifier", "pku"))
        .and(query_param("SessionId", "SESSION-1"))
        .and(query_param("parentIndex", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<?xml version="1.0" encoding="utf-8"?><Content TotalNum="3"></Content>"#,
        ))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page: u32, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/Usp/reader/command/imagepage.ashx"))
        .and(query_param("pageid", page.to_string()))
        .and(query_param("ServiceType", "Imagepage"))
        .and(query_param("scale", "1"))
        .and(query_param("width", "9999"))
        .and(query_param("height", "9999"))
        .and(query_param("sign", "ab+cd"))
        .and(query_param("rights", "1-0_00"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(format!("image bytes of page {}", page).into_bytes()),
        )
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_download() {
    let server = MockServer::start().await;
    mount_handshake(&server, "<p>欢迎使用</p>", 1).await;
    for page in 1..=3 {
        mount_page(&server, page, 1).await;
    }

    let dir = tempfile::tempdir().unwrap();
    let target = BookTarget::from_detail_url(&detail_url(&server)).unwrap();
    let store = DirPageStore::open(dir.path().join(target.directory_key()), "png").unwrap();
    let client = ApabiClient::new(&site_config(&server)).unwrap();

    let state = DownloadDriver::new(&client, &store, &SystemClock, &target, DriverOptions::default())
        .run()
        .await
        .unwrap();

    assert_eq!(state.page_total, Some(3));
    assert_eq!(state.downloaded, vec![1, 2, 3]);
    assert_eq!(state.book_name.as_deref(), Some("Integration Book"));
    let book_dir = dir.path().join("20151015-ZCKM-902-0064");
    for page in 1..=3 {
        let bytes = std::fs::read(book_dir.join(format!("{}.png", page))).unwrap();
        assert_eq!(bytes, format!("image bytes of page {}", page).into_bytes());
    }
}

#[tokio::test]
async fn test_resume_skips_existing_page() {
    let server = MockServer::start().await;
    mount_handshake(&server, "<p>欢迎使用</p>", 1).await;
    mount_page(&server, 1, 1).await;
    mount_page(&server, 2, 0).await;
    mount_page(&server, 3, 1).await;

    let dir = tempfile::tempdir().unwrap();
    let target = BookTarget::from_detail_url(&detail_url(&server)).unwrap();
    let store = DirPageStore::open(dir.path(), "png").unwrap();
    std::fs::write(dir.path().join("2.png"), b"from an earlier run").unwrap();
    let client = ApabiClient::new(&site_config(&server)).unwrap();

    let state = DownloadDriver::new(&client, &store, &SystemClock, &target, DriverOptions::default())
        .run()
        .await
        .unwrap();

    assert_eq!(state.already_present, 1);
    assert_eq!(state.downloaded, vec![1, 3]);
    assert_eq!(
        std::fs::read(dir.path().join("2.png")).unwrap(),
        b"from an earlier run"
    );
}

#[tokio::test]
async fn test_forbidden_page_triggers_relogin_and_retry() {
    let server = MockServer::start().await;
    mount_handshake(&server, "<p>欢迎使用</p>", 2).await;
    mount_page(&server, 1, 1).await;

    // First request for page 2 is refused, the retry succeeds.
    Mock::given(method("GET"))
        .and(path("/Usp/reader/command/imagepage.ashx"))
        .and(query_param("pageid", "2"))
        .respond_with(ResponseTemplate::new(403))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, 2, 1).await;
    mount_page(&server, 3, 1).await;

    let dir = tempfile::tempdir().unwrap();
    let target = BookTarget::from_detail_url(&detail_url(&server)).unwrap();
    let store = DirPageStore::open(dir.path(), "png").unwrap();
    let client = ApabiClient::new(&site_config(&server)).unwrap();

    let state = DownloadDriver::new(&client, &store, &SystemClock, &target, DriverOptions::default())
        .run()
        .await
        .unwrap();

    assert_eq!(state.downloaded, vec![1, 2, 3]);
    assert_eq!(state.reauthentications, 1);
    assert_eq!(state.denied, 1);
    assert_eq!(state.logins, 2);
    assert!(dir.path().join("2.png").is_file());
}

#[tokio::test]
async fn test_refused_login_stops_before_detail_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Usp/pku/pub.mvc/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form method='post'></form>"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/Usp/pku/pub.mvc/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><p>您尚未登陆。</p></html>"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Usp/pku/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = BookTarget::from_detail_url(&detail_url(&server)).unwrap();
    let store = DirPageStore::open(dir.path(), "png").unwrap();
    let client = ApabiClient::new(&site_config(&server)).unwrap();

    let err = DownloadDriver::new(&client, &store, &SystemClock, &target, DriverOptions::default())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Authentication(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_server_error_on_page_is_fatal() {
    let server = MockServer::start().await;
    mount_handshake(&server, "<p>欢迎使用</p>", 1).await;
    Mock::given(method("GET"))
        .and(path("/Usp/reader/command/imagepage.ashx"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = BookTarget::from_detail_url(&detail_url(&server)).unwrap();
    let store = DirPageStore::open(dir.path(), "png").unwrap();
    let client = ApabiClient::new(&site_config(&server)).unwrap();

    let err = DownloadDriver::new(&client, &store, &SystemClock, &target, DriverOptions::default())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnexpectedStatus { status: 500, .. }));
}
