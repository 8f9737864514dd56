//! Integration tests for installing extensions through the navigation controller.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::header;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::time::timeout;
use url::Url;

use abrowser::error::{Error, FetchError, ParseError};
use abrowser::extensions::ExtensionLoader;
use abrowser::navigation::{AddressResolver, Navigator};
use abrowser::page::HeadlessPage;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

const DARK_MODE: &str = "name: Dark Mode\nauthor(s): Jane\napplies-to: example\\.com\n------\ndocument.body.style.background='black';\n------\nInverts page colors.\n";

const BAD_PATTERN: &str = "name: Broken\nauthor(s): Jane\napplies-to: (unclosed\n------\nx();\n------\n";

/// Start an Axum server on a random port, return its base URL.
async fn start_server() -> Url {
    let app = Router::new()
        .route(
            "/dark.txt",
            get(|| async { ([(header::CONTENT_TYPE, "text/plain")], DARK_MODE) }),
        )
        .route(
            "/bad-pattern.txt",
            get(|| async { ([(header::CONTENT_TYPE, "text/plain")], BAD_PATTERN) }),
        )
        .route(
            "/dark.json",
            get(|| async { ([(header::CONTENT_TYPE, "application/json")], DARK_MODE) }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap()
}

fn spawn_navigator() -> (Navigator, Arc<HeadlessPage>) {
    let page = Arc::new(HeadlessPage::new());
    let (navigator, _task) = Navigator::spawn(
        page.clone(),
        AddressResolver::default(),
        ExtensionLoader::new(reqwest::Client::new()),
    );
    (navigator, page)
}

#[tokio::test]
async fn installed_extension_runs_on_matching_page() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let (navigator, page) = spawn_navigator();

        let ext = navigator
            .install_extension(base.join("dark.txt").unwrap())
            .await
            .unwrap();
        assert_eq!(ext.name(), "Dark Mode");

        // No page loaded yet, so nothing ran.
        assert!(page.scripts().await.is_empty());

        navigator.load_url("example.com").await.unwrap();
        let scripts = page.scripts().await;
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].url.as_str(), "https://example.com/");
        assert_eq!(scripts[0].code, "document.body.style.background='black';");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn installed_extension_skips_other_pages() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let (navigator, page) = spawn_navigator();

        navigator
            .install_extension(base.join("dark.txt").unwrap())
            .await
            .unwrap();
        navigator.load_url("openai.com").await.unwrap();
        navigator.load_url("hello world").await.unwrap();

        assert!(page.scripts().await.is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn search_mentioning_matching_domain_does_not_run_extension() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let (navigator, page) = spawn_navigator();

        navigator
            .install_extension(base.join("dark.txt").unwrap())
            .await
            .unwrap();
        let url = navigator.load_url("visit example.com").await.unwrap();
        assert!(url.query().unwrap_or_default().contains("example.com"));

        assert!(page.scripts().await.is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn install_on_matching_page_runs_immediately() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let (navigator, page) = spawn_navigator();

        navigator.load_url("https://example.com/news").await.unwrap();
        navigator
            .install_extension(base.join("dark.txt").unwrap())
            .await
            .unwrap();

        let scripts = page.scripts().await;
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].url.as_str(), "https://example.com/news");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn extensions_rerun_after_back_and_reload() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let (navigator, page) = spawn_navigator();

        navigator
            .install_extension(base.join("dark.txt").unwrap())
            .await
            .unwrap();
        navigator.load_url("example.com").await.unwrap();
        navigator.load_url("openai.com").await.unwrap();
        navigator.go_back().await.unwrap();
        navigator.reload().await.unwrap();

        // Initial load, back, reload.
        assert_eq!(page.scripts().await.len(), 3);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn reinstalling_replaces_the_extension() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let (navigator, page) = spawn_navigator();
        let location = base.join("dark.txt").unwrap();

        navigator.install_extension(location.clone()).await.unwrap();
        navigator.install_extension(location).await.unwrap();
        assert_eq!(navigator.extensions().await.unwrap().len(), 1);

        navigator.load_url("example.com").await.unwrap();
        assert_eq!(page.scripts().await.len(), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn install_errors_are_returned_to_caller() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let (navigator, _page) = spawn_navigator();

        let err = navigator
            .install_extension(base.join("nowhere.txt").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::Http { status: 404 })));

        let err = navigator
            .install_extension(base.join("dark.json").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Fetch(FetchError::UnexpectedContentType { .. })
        ));

        let err = navigator
            .install_extension(base.join("bad-pattern.txt").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::InvalidPattern { .. })));

        assert!(navigator.extensions().await.unwrap().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn navigation_continues_while_extension_installs() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let (navigator, page) = spawn_navigator();

        let installer = navigator.clone();
        let location = base.join("dark.txt").unwrap();
        let install = tokio::spawn(async move { installer.install_extension(location).await });

        navigator.load_url("example.com").await.unwrap();
        install.await.unwrap().unwrap();

        // Whichever finished first, the extension ran exactly once on example.com.
        let scripts = page.scripts().await;
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].url.as_str(), "https://example.com/");
    })
    .await
    .expect("test timed out");
}
