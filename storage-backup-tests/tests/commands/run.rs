//! Tests for the 'run' command
//!
//! A run lists the source bucket, copies every file to the destination and
//! sends exactly one notification.

use test_utils::fixtures::{self, backup_date, BACKUP_FOLDER};
use test_utils::{
    ConfigBuilder, MockDestination, MockFetcher, MockSourceStorage, RunOutcome, RunReport,
    SkipStage, SourceCall, TestContext,
};

fn expect_completed(outcome: RunOutcome) -> RunReport {
    match outcome {
        RunOutcome::Completed(report) => report,
        other => panic!("Expected a completed run, got {:?}", other),
    }
}

fn success_message() -> String {
    format!("Backup completed successfully. Folder: {}", BACKUP_FOLDER)
}

#[tokio::test]
async fn test_run_copies_every_file() {
    let ctx = TestContext::new().with_source(fixtures::photo_bucket());

    let report = expect_completed(ctx.manager().run_backup_on(backup_date()).await);

    assert_eq!(
        ctx.destination.uploaded_keys(),
        vec![
            "2024-01-01-storage-backup/photos/img1.png",
            "2024-01-01-storage-backup/photos/raw/img1.cr2",
            "2024-01-01-storage-backup/docs/report.pdf",
        ]
    );
    assert_eq!(report.folders, 2);
    assert_eq!(report.files_found, 3);
    assert!(report.skipped.is_empty());
    assert_eq!(ctx.notifier.get_messages(), vec![success_message()]);
}

#[tokio::test]
async fn test_signed_urls_last_sixty_seconds() {
    let ctx = TestContext::new().with_source(fixtures::photo_bucket());

    ctx.manager().run_backup_on(backup_date()).await;

    let expiries: Vec<u64> = ctx
        .source
        .get_calls()
        .into_iter()
        .filter_map(|c| match c {
            SourceCall::Sign { expires_in_secs, .. } => Some(expires_in_secs),
            _ => None,
        })
        .collect();
    assert_eq!(expiries, vec![60, 60, 60]);
}

#[tokio::test]
async fn test_destination_key_and_staging_file() {
    let url = MockSourceStorage::signed_url_for("photos/img1.png");
    let ctx = TestContext::new()
        .with_source(fixtures::photo_bucket())
        .with_fetcher(MockFetcher::new().with_body(&url, b"png-bytes"));

    ctx.manager().run_backup_on(backup_date()).await;

    let staging_dir = ctx.staging_dir(BACKUP_FOLDER);
    let upload = ctx
        .destination
        .get_uploads()
        .into_iter()
        .find(|u| u.key == "2024-01-01-storage-backup/photos/img1.png")
        .expect("img1.png should be uploaded");

    assert_eq!(upload.source_path, staging_dir.join("img1.png"));
    assert_eq!(upload.body, b"png-bytes");
    assert!(staging_dir.join("img1.png").exists());
    assert!(!staging_dir.join("photos").exists());
}

#[tokio::test]
async fn test_same_base_name_overwrites_staging_file() {
    let first = MockSourceStorage::signed_url_for("photos/img1.png");
    let second = MockSourceStorage::signed_url_for("photos/raw/img1.png");
    let source = MockSourceStorage::new()
        .with_listing("", &["photos"])
        .with_listing("photos", &["img1.png", "raw/"])
        .with_listing("photos/raw", &["img1.png"]);
    let ctx = TestContext::new()
        .with_source(source)
        .with_fetcher(MockFetcher::new().with_body(&first, b"first").with_body(&second, b"second"));

    ctx.manager().run_backup_on(backup_date()).await;

    // Both keep their full path at the destination
    let uploads = ctx.destination.get_uploads();
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[0].body, b"first");
    assert_eq!(uploads[1].key, "2024-01-01-storage-backup/photos/raw/img1.png");

    let staged = std::fs::read(ctx.staging_dir(BACKUP_FOLDER).join("img1.png")).unwrap();
    assert_eq!(staged, b"second");
}

#[tokio::test]
async fn test_sign_failure_skips_only_that_file() {
    let ctx = TestContext::new()
        .with_source(fixtures::photo_bucket().with_failing_sign("photos/img1.png"));

    let report = expect_completed(ctx.manager().run_backup_on(backup_date()).await);

    assert_eq!(
        ctx.destination.uploaded_keys(),
        vec![
            "2024-01-01-storage-backup/photos/raw/img1.cr2",
            "2024-01-01-storage-backup/docs/report.pdf",
        ]
    );
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "photos/img1.png");
    assert_eq!(report.skipped[0].stage, SkipStage::SignedUrl);
    assert_eq!(ctx.notifier.get_messages(), vec![success_message()]);
}

#[tokio::test]
async fn test_missing_signed_url_skips_file() {
    let ctx = TestContext::new()
        .with_source(fixtures::photo_bucket().with_missing_url("docs/report.pdf"));

    let report = expect_completed(ctx.manager().run_backup_on(backup_date()).await);

    assert_eq!(report.uploaded.len(), 2);
    assert_eq!(report.skipped[0].stage, SkipStage::SignedUrl);
    assert!(report.skipped[0].reason.contains("docs/report.pdf"));
    assert!(!ctx
        .fetcher
        .fetched_urls()
        .contains(&MockSourceStorage::signed_url_for("docs/report.pdf")));
}

#[tokio::test]
async fn test_fetch_failure_skips_file() {
    let failing = MockSourceStorage::signed_url_for("photos/raw/img1.cr2");
    let ctx = TestContext::new()
        .with_source(fixtures::photo_bucket())
        .with_fetcher(MockFetcher::new().with_failing_url(&failing));

    let report = expect_completed(ctx.manager().run_backup_on(backup_date()).await);

    assert_eq!(report.uploaded.len(), 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].stage, SkipStage::Download);
    assert!(!ctx.staging_dir(BACKUP_FOLDER).join("img1.cr2").exists());
    assert_eq!(ctx.notifier.get_messages(), vec![success_message()]);
}

#[tokio::test]
async fn test_upload_failure_still_reports_success() {
    let ctx = TestContext::new()
        .with_source(fixtures::photo_bucket())
        .with_destination(
            MockDestination::new().with_failing_key("2024-01-01-storage-backup/docs/report.pdf"),
        );

    let report = expect_completed(ctx.manager().run_backup_on(backup_date()).await);

    assert_eq!(report.uploaded.len(), 2);
    assert_eq!(report.skipped[0].stage, SkipStage::Upload);
    // The file was still downloaded before the upload was attempted
    assert!(ctx.staging_dir(BACKUP_FOLDER).join("report.pdf").exists());
    assert_eq!(ctx.notifier.get_messages(), vec![success_message()]);
}

#[tokio::test]
async fn test_empty_bucket_fails_once() {
    let ctx = TestContext::new();

    let outcome = ctx.manager().run_backup_on(backup_date()).await;

    assert!(outcome.is_failure());
    let messages = ctx.notifier.get_messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("No folders found"));
    assert!(ctx.source.signed_names().is_empty());
}

#[tokio::test]
async fn test_listing_failure_aborts_run() {
    let ctx = TestContext::new()
        .with_source(fixtures::photo_bucket().with_failing_listing("photos/raw"));

    let outcome = ctx.manager().run_backup_on(backup_date()).await;

    match outcome {
        RunOutcome::Failed(message) => assert!(message.contains("photos/raw")),
        other => panic!("Expected failure, got {:?}", other),
    }
    // Nothing after the failing enumeration is processed
    assert!(ctx.source.signed_names().is_empty());
    assert!(ctx.destination.uploaded_keys().is_empty());

    let messages = ctx.notifier.get_messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Backup failed. Error: "));
}

#[tokio::test]
async fn test_folder_without_files_is_not_an_error() {
    let source = MockSourceStorage::new()
        .with_listing("", &["empty", "docs"])
        .with_listing("docs", &["report.pdf"]);
    let ctx = TestContext::new().with_source(source);

    let report = expect_completed(ctx.manager().run_backup_on(backup_date()).await);

    assert_eq!(report.folders, 2);
    assert_eq!(report.files_found, 1);
    assert_eq!(ctx.notifier.get_messages(), vec![success_message()]);
}

#[tokio::test]
async fn test_rerun_same_day_reuses_folder() {
    let ctx = TestContext::new().with_source(fixtures::photo_bucket());
    let manager = ctx.manager();

    let first = expect_completed(manager.run_backup_on(backup_date()).await);
    let second = expect_completed(manager.run_backup_on(backup_date()).await);

    assert_eq!(first.backup_folder, second.backup_folder);
    assert_eq!(first.staging_dir, second.staging_dir);
    // No dedup: every file is transferred again
    assert_eq!(ctx.destination.uploaded_keys().len(), 6);
    assert_eq!(
        ctx.notifier.get_messages(),
        vec![success_message(), success_message()]
    );
}

#[tokio::test]
async fn test_large_listings_are_paginated() {
    let ctx = TestContext::from_builder(ConfigBuilder::complete().with_page_sizes(1, 2))
        .with_source(fixtures::wide_folder("bulk", 5));

    let report = expect_completed(ctx.manager().run_backup_on(backup_date()).await);

    assert_eq!(report.files_found, 5);
    assert_eq!(report.uploaded.len(), 5);
    assert_eq!(
        ctx.destination.uploaded_keys().last().map(String::as_str),
        Some("2024-01-01-storage-backup/bulk/file004.bin")
    );
}
