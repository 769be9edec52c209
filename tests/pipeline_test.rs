use chrono::NaiveDate;
use mockito::Server;
use std::fs;
use std::path::Path;
use web2md::{Config, Error, RunOptions, run_on};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn config(base: &Path) -> Config {
    Config::builder().base_output_dir(base).timeout_secs(5).build()
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn writes_markdown_and_deduplicated_images() {
    let mut server = Server::new_async().await;
    let page = server
        .mock("GET", "/blog/post")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(
            r#"<html><body>
                 <h1>Photos</h1>
                 <p>First <img src="/img/cat.png" alt="Cat"></p>
                 <p>Again <img src="/img/cat.png" alt="Cat again"></p>
                 <p>Broken <img src="/img/gone.png" alt="Gone"></p>
               </body></html>"#,
        )
        .expect(1)
        .create_async()
        .await;
    let cat = server
        .mock("GET", "/img/cat.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body("png-bytes")
        .expect(1)
        .create_async()
        .await;
    let gone = server
        .mock("GET", "/img/gone.png")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let out = tempfile::tempdir().unwrap();
    let url = format!("{}/blog/post", server.url());
    let report = run_on(date(), &url, &RunOptions::default(), &config(out.path()))
        .await
        .unwrap();

    let site_dir = out.path().join("2024-01-01").join("127.0.0.1");
    assert_eq!(report.markdown_path, site_dir.join("index.md"));
    assert_eq!(report.images_saved, 1);
    assert_eq!(files_in(&site_dir), vec!["cat.png", "index.md"]);
    assert_eq!(fs::read_to_string(site_dir.join("cat.png")).unwrap(), "png-bytes");

    let markdown = fs::read_to_string(&report.markdown_path).unwrap();
    assert_eq!(
        markdown,
        "# Photos\n\n\
         First ![Cat](cat.png)\n\n\
         Again ![Cat again](cat.png)\n\n\
         Broken ![Gone](/img/gone.png)"
    );

    page.assert_async().await;
    cat.assert_async().await;
    gone.assert_async().await;
}

#[tokio::test]
async fn cleans_transcripts_when_requested() {
    let mut server = Server::new_async().await;
    let body = "<p>HOST: Welcome back. GUEST: Glad to be here.</p>";
    let _page = server
        .mock("GET", "/episode")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(body)
        .expect(2)
        .create_async()
        .await;

    let out = tempfile::tempdir().unwrap();
    let url = format!("{}/episode", server.url());

    let plain = run_on(date(), &url, &RunOptions::default(), &config(out.path()))
        .await
        .unwrap();
    assert_eq!(
        fs::read_to_string(&plain.markdown_path).unwrap(),
        "HOST: Welcome back. GUEST: Glad to be here."
    );

    let options = RunOptions {
        clean_transcripts: true,
        ..RunOptions::default()
    };
    let cleaned = run_on(date(), &url, &options, &config(out.path()))
        .await
        .unwrap();
    assert_eq!(
        fs::read_to_string(&cleaned.markdown_path).unwrap(),
        "HOST: Welcome back.\n\nGUEST: Glad to be here."
    );
}

#[tokio::test]
async fn unreachable_url_writes_nothing() {
    let out = tempfile::tempdir().unwrap();
    let result = run_on(
        date(),
        "http://127.0.0.1:1/page",
        &RunOptions::default(),
        &config(out.path()),
    )
    .await;

    assert!(matches!(result, Err(Error::Fetch { .. })));
    assert!(files_in(out.path()).is_empty());
}

#[tokio::test]
async fn http_error_status_is_fatal() {
    let mut server = Server::new_async().await;
    let _page = server
        .mock("GET", "/down")
        .with_status(503)
        .create_async()
        .await;

    let out = tempfile::tempdir().unwrap();
    let url = format!("{}/down", server.url());
    let result = run_on(date(), &url, &RunOptions::default(), &config(out.path())).await;

    assert!(matches!(result, Err(Error::Status { status: 503, .. })));
    assert!(files_in(out.path()).is_empty());
}

#[tokio::test]
async fn empty_page_is_not_written() {
    let mut server = Server::new_async().await;
    let _page = server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html><body><nav>Home</nav><script>x()</script></body></html>")
        .create_async()
        .await;

    let out = tempfile::tempdir().unwrap();
    let result = run_on(
        date(),
        &format!("{}/", server.url()),
        &RunOptions::default(),
        &config(out.path()),
    )
    .await;

    assert!(matches!(result, Err(Error::EmptyContent { .. })));
    assert!(files_in(out.path()).is_empty());
}

#[tokio::test]
async fn invalid_url_is_rejected() {
    let out = tempfile::tempdir().unwrap();
    let result = run_on(date(), "not a url", &RunOptions::default(), &config(out.path())).await;
    assert!(matches!(result, Err(Error::InvalidUrl { .. })));
}
