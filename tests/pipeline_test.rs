//! End-to-end pipeline tests: synthetic export in, CSV reports out.

use std::path::Path;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wxr_reporter::config::Config;
use wxr_reporter::pipeline;

/// Rendered page in the legacy theme: one comment and one reply, both from
/// Jane, labeled the two ways the themes decorate a vcard.
const PAGE_WITH_COMMENTS: &str = r#"<html><body>
<div id="comments">
  <div class="comment-author vcard">Jane says:</div>
  <div class="comment-content"><p>lovely writing, truly</p></div>
  <div class="comment-author vcard">Jane on May 2 at 10:00 said:</div>
  <div class="comment-content"><p>following up on my own comment</p></div>
</div>
</body></html>"#;

const PAGE_WITHOUT_COMMENTS: &str = r#"<html><body>
<div id="comments"></div>
</body></html>"#;

const PAGE_WITH_MISMATCH: &str = r#"<html><body>
<div id="comments">
  <div class="comment-author vcard">Jane says:</div>
  <div class="comment-author vcard">Bob says:</div>
  <div class="comment-content"><p>only one body here</p></div>
</div>
</body></html>"#;

fn full_export(post_url: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"
    xmlns:content="http://purl.org/rss/1.0/modules/content/"
    xmlns:wp="http://wordpress.org/export/1.2/"
    xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Class Blog</title>
    <item>
      <title>First Post</title>
      <link>{post_url}</link>
      <dc:creator>Alice</dc:creator>
      <wp:post_type>post</wp:post_type>
      <wp:status>publish</wp:status>
      <wp:post_date>2020-05-02 10:00:00</wp:post_date>
      <content:encoded><![CDATA[<p>hello world</p>]]></content:encoded>
      <wp:comment>
        <wp:comment_author_email>bob@example.com</wp:comment_author_email>
        <wp:comment_content>nice post, thanks for sharing</wp:comment_content>
        <wp:comment_parent>0</wp:comment_parent>
      </wp:comment>
      <wp:comment>
        <wp:comment_author_email>bob@example.com</wp:comment_author_email>
        <wp:comment_content>replying to myself here</wp:comment_content>
        <wp:comment_parent>17</wp:comment_parent>
      </wp:comment>
    </item>
    <item>
      <title>Unfinished Draft</title>
      <link>https://blog.example.com/draft/</link>
      <dc:creator>Alice</dc:creator>
      <wp:post_type>post</wp:post_type>
      <wp:status>draft</wp:status>
      <wp:post_date>2020-05-03 10:00:00</wp:post_date>
      <content:encoded><![CDATA[<p>not done yet at all</p>]]></content:encoded>
    </item>
    <item>
      <title>About</title>
      <link>https://blog.example.com/about/</link>
      <dc:creator>Alice</dc:creator>
      <wp:post_type>page</wp:post_type>
      <wp:status>publish</wp:status>
      <wp:post_date>2020-05-01 09:00:00</wp:post_date>
      <content:encoded><![CDATA[<p>about this blog</p>]]></content:encoded>
    </item>
  </channel>
</rss>"#
    )
}

fn single_post_export(author: &str, content: &str, post_url: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"
    xmlns:content="http://purl.org/rss/1.0/modules/content/"
    xmlns:wp="http://wordpress.org/export/1.2/"
    xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <item>
      <title>One Post</title>
      <link>{post_url}</link>
      <dc:creator>{author}</dc:creator>
      <wp:post_type>post</wp:post_type>
      <wp:status>publish</wp:status>
      <wp:post_date>2020-05-02 10:00:00</wp:post_date>
      <content:encoded><![CDATA[{content}]]></content:encoded>
    </item>
  </channel>
</rss>"#
    )
}

/// Configuration with every input and output under the given directory.
fn config_in(dir: &Path, export_xml: &str) -> Config {
    let export_path = dir.join("export.xml");
    std::fs::write(&export_path, export_xml).unwrap();
    Config {
        export_path,
        post_report_path: dir.join("postReport.csv"),
        cache_dir: dir.join("postData"),
        comment_report_path: dir.join("commentReport.csv"),
        author_report_path: dir.join("authorReport.csv"),
        ..Config::for_testing()
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_full_run_produces_all_three_reports() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/first"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PAGE_WITH_COMMENTS, "text/html"))
        .mount(&server)
        .await;

    let post_url = format!("{}/posts/first", server.uri());
    let config = config_in(dir.path(), &full_export(&post_url));
    let summary = pipeline::run(&config).await.unwrap();

    // Draft and page are excluded from reporting.
    assert_eq!(summary.load.items_seen, 3);
    assert_eq!(summary.posts_reported, 1);
    assert_eq!(summary.posts_excluded, 2);
    assert_eq!(summary.fetch.fetched, 1);
    assert_eq!(summary.extract.files_extracted, 1);
    assert_eq!(summary.comment_records, 2);
    assert_eq!(summary.authors, 2);

    let post_rows = read_lines(&config.post_report_path);
    assert_eq!(post_rows[0], "author,date,length,title,link");
    assert_eq!(
        post_rows[1],
        format!("Alice,2020-05-02 10:00:00,11,First Post,{post_url}")
    );
    assert_eq!(post_rows.len(), 2);

    // Both labels normalize to the same identity.
    let comment_rows = read_lines(&config.comment_report_path);
    assert_eq!(comment_rows[0], "Commenter,Length");
    assert_eq!(comment_rows[1], "Jane,21");
    assert_eq!(comment_rows[2], "Jane,30");

    let author_rows = read_lines(&config.author_report_path);
    assert_eq!(
        author_rows[0],
        "username,postCount,postTotalLen,commentCount,commentTotalLen,replyCount,replyTotalLen"
    );
    assert_eq!(author_rows[1], "Alice,1,11,0,0,0,0");
    assert_eq!(author_rows[2], "bob,0,0,1,29,1,23");
}

#[tokio::test]
async fn test_second_run_reuses_the_cache() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/first"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PAGE_WITH_COMMENTS, "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let post_url = format!("{}/posts/first", server.uri());
    let config = config_in(dir.path(), &full_export(&post_url));

    let first = pipeline::run(&config).await.unwrap();
    assert_eq!(first.fetch.fetched, 1);

    let second = pipeline::run(&config).await.unwrap();
    assert_eq!(second.fetch.fetched, 0);
    assert_eq!(second.fetch.already_cached, 1);
    assert_eq!(second.comment_records, first.comment_records);

    server.verify().await;
}

#[tokio::test]
async fn test_round_trip_single_post() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/one"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PAGE_WITHOUT_COMMENTS, "text/html"))
        .mount(&server)
        .await;

    let post_url = format!("{}/posts/one", server.uri());
    let config = config_in(
        dir.path(),
        &single_post_export("A", "hello world", &post_url),
    );
    let summary = pipeline::run(&config).await.unwrap();

    assert_eq!(summary.posts_reported, 1);
    assert_eq!(summary.comment_records, 0);

    let post_rows = read_lines(&config.post_report_path);
    assert_eq!(post_rows.len(), 2);
    assert_eq!(
        post_rows[1],
        format!("A,2020-05-02 10:00:00,11,One Post,{post_url}")
    );

    let author_rows = read_lines(&config.author_report_path);
    assert_eq!(author_rows.len(), 2);
    assert_eq!(author_rows[1], "A,1,11,0,0,0,0");
}

#[tokio::test]
async fn test_mismatched_page_contributes_nothing() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/one"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PAGE_WITH_MISMATCH, "text/html"))
        .mount(&server)
        .await;

    let post_url = format!("{}/posts/one", server.uri());
    let config = config_in(
        dir.path(),
        &single_post_export("A", "hello world", &post_url),
    );
    let summary = pipeline::run(&config).await.unwrap();

    assert_eq!(summary.extract.mismatched, 1);
    assert_eq!(summary.comment_records, 0);

    let comment_rows = read_lines(&config.comment_report_path);
    assert_eq!(comment_rows, vec!["Commenter,Length".to_string()]);
}

#[tokio::test]
async fn test_date_cutoff_excludes_old_posts() {
    let dir = TempDir::new().unwrap();
    let export = single_post_export("A", "hello world", "https://blog.example.com/old/");
    let config = Config {
        oldest_post: chrono::NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        ..config_in(dir.path(), &export)
    };
    let summary = pipeline::run(&config).await.unwrap();

    assert_eq!(summary.posts_reported, 0);
    assert_eq!(summary.posts_excluded, 1);
    assert_eq!(summary.fetch.fetched, 0);
}

#[tokio::test]
async fn test_length_cutoff_excludes_short_posts() {
    let dir = TempDir::new().unwrap();
    // "hi" is below the default five-character cutoff.
    let config = config_in(
        dir.path(),
        &single_post_export("A", "hi", "https://blog.example.com/short/"),
    );
    let summary = pipeline::run(&config).await.unwrap();

    assert_eq!(summary.posts_reported, 0);
    assert_eq!(summary.posts_excluded, 1);
}

#[tokio::test]
async fn test_malformed_export_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path(), "this is not xml <at all <");
    assert!(pipeline::run(&config).await.is_err());
}

#[tokio::test]
async fn test_export_without_items_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path(), "<rss><channel><title>t</title></channel></rss>");
    assert!(pipeline::run(&config).await.is_err());
}

#[tokio::test]
async fn test_missing_export_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        export_path: dir.path().join("nope.xml"),
        ..config_in(dir.path(), "<rss><channel><item/></channel></rss>")
    };
    assert!(pipeline::run(&config).await.is_err());
}
