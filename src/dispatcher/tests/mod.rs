use super::*;
use crate::config::{RetryConfig, StorageConfig};
use crate::error::Error;
use crate::extractor::PostStep;
use crate::test_helpers::{StubDownload, StubExtractor, sample_metadata};
use std::time::Duration;
use tempfile::{TempDir, tempdir};


const URL: &str = "https://www.youtube.com/watch?v=abc123";

fn test_config(base: &Path) -> Config {
    Config {
        storage: StorageConfig {
            output_base: base.to_path_buf(),
            ..Default::default()
        },
        retry: RetryConfig {
            max_attempts: 0,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
            backoff_multiplier: 1.0,
            jitter: false,
        },
        ..Default::default()
    }
}

/// Acquirer over `stub`, rooted in a fresh temporary directory
fn acquirer_with(stub: StubExtractor) -> (MediaAcquirer, Arc<StubExtractor>, TempDir) {
    let dir = tempdir().unwrap();
    let stub = Arc::new(stub);
    let acquirer = MediaAcquirer::with_extractor(test_config(dir.path()), stub.clone()).unwrap();
    (acquirer, stub, dir)
}

fn temp_entries(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path().join("temp")).unwrap().count()
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let dir = tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.max_concurrent_acquisitions = 0;

    let result = MediaAcquirer::with_extractor(config, Arc::new(StubExtractor::new(None, true)));
    assert!(matches!(result, Err(Error::Config { .. })));
}

#[test]
fn layout_defaults_to_configured_base() {
    let (acquirer, _stub, dir) = acquirer_with(StubExtractor::new(None, true));

    let layout = acquirer.layout_for(None).unwrap();
    assert_eq!(layout.base(), dir.path());

    let other = tempdir().unwrap();
    let layout = acquirer.layout_for(Some(other.path())).unwrap();
    assert_eq!(layout.final_dir(), other.path().join("final"));
}

#[tokio::test]
async fn request_output_base_overrides_config() {
    let stub = StubExtractor::new(Some(sample_metadata("Song", &[])), true).then(StubDownload::Write {
        ext: "mp3",
        bytes: b"audio".to_vec(),
    });
    let (acquirer, _stub, dir) = acquirer_with(stub);
    let other = tempdir().unwrap();

    let request = AcquisitionRequest::new(URL, MediaKind::Audio).with_output_base(other.path());
    let artifact = acquirer.acquire(&request).await.unwrap();

    assert_eq!(artifact.path, other.path().join("final").join("Song.mp3"));
    assert!(!dir.path().join("final").join("Song.mp3").exists());
}

#[tokio::test]
async fn acquire_all_keeps_request_order() {
    let stub = StubExtractor::new(Some(sample_metadata("Song", &[])), true)
        .then(StubDownload::Write {
            ext: "mp3",
            bytes: b"one".to_vec(),
        })
        .then(StubDownload::Write {
            ext: "mp3",
            bytes: b"two".to_vec(),
        })
        .then(StubDownload::Nothing);
    let (acquirer, _stub, _dir) = acquirer_with(stub);

    let requests = vec![
        AcquisitionRequest::new(URL, MediaKind::Audio),
        AcquisitionRequest::new(URL, MediaKind::Audio),
        AcquisitionRequest::new("not a url", MediaKind::Audio),
    ];
    let results = acquirer.acquire_all(&requests).await;

    assert_eq!(results.len(), 3);
    let mut names: Vec<String> = results[..2]
        .iter()
        .map(|r| r.as_ref().unwrap().storage_name.clone())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Song (1).mp3", "Song.mp3"]);
    assert!(matches!(results[2], Err(Error::InvalidRequest(_))));
}

#[tokio::test]
async fn shutdown_refuses_new_acquisitions() {
    let (acquirer, stub, _dir) =
        acquirer_with(StubExtractor::new(Some(sample_metadata("Song", &[])), true));

    acquirer.shutdown();
    let response = acquirer.download(URL, MediaKind::Audio, None, None).await;

    assert!(!response.success);
    assert_eq!(response.code.as_deref(), Some("shutting_down"));
    assert!(stub.invocations().is_empty());
}
