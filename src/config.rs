//! Configuration types for media-acquire

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Where artifacts live and how name collisions in `final/` are handled
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Output base used when a request does not carry one (default: "./downloads")
    ///
    /// Every output base holds a `temp/` and a `final/` subtree.
    #[serde(default = "default_output_base")]
    pub output_base: PathBuf,

    /// File collision handling in `final/`
    #[serde(default)]
    pub file_collision: FileCollisionAction,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_base: default_output_base(),
            file_collision: FileCollisionAction::default(),
        }
    }
}

/// External tool paths (yt-dlp, ffmpeg) and invocation limits
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Path to ffmpeg executable (auto-detected if None)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Whether to search PATH for external binaries if explicit paths not set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Socket timeout passed to the extractor (default: 10 seconds)
    #[serde(default = "default_socket_timeout", with = "duration_serde")]
    pub socket_timeout: Duration,

    /// Extractor-level retry count for HTTP and fragment requests (default: 3)
    #[serde(default = "default_tool_retries")]
    pub retries: u32,

    /// Fragments fetched in parallel by the extractor (default: 4)
    #[serde(default = "default_concurrent_fragments")]
    pub concurrent_fragments: u32,

    /// Hard limit for a metadata query process (default: 30 seconds)
    #[serde(default = "default_metadata_timeout", with = "duration_serde")]
    pub metadata_timeout: Duration,

    /// Hard limit for a download process (default: 600 seconds)
    #[serde(default = "default_download_timeout", with = "duration_serde")]
    pub download_timeout: Duration,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            ffmpeg_path: None,
            search_path: true,
            socket_timeout: default_socket_timeout(),
            retries: default_tool_retries(),
            concurrent_fragments: default_concurrent_fragments(),
            metadata_timeout: default_metadata_timeout(),
            download_timeout: default_download_timeout(),
        }
    }
}

/// Fixed output targets for audio and video acquisitions
///
/// Callers' quality hints are parsed and validated but do not change these.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Audio codec produced by the extraction post-step (default: "mp3")
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Constant audio bitrate in kbps (default: 320)
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate_kbps: u32,

    /// Highest video height requested from the extractor (default: 1080)
    #[serde(default = "default_video_ceiling")]
    pub video_height_ceiling: u32,

    /// Container the muxed video is written in (default: "mp4")
    #[serde(default = "default_video_container")]
    pub video_container: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            audio_codec: default_audio_codec(),
            audio_bitrate_kbps: default_audio_bitrate(),
            video_height_ceiling: default_video_ceiling(),
            video_container: default_video_container(),
        }
    }
}

/// Thumbnail fetch configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PosterConfig {
    /// Base URL of the per-video thumbnail host (default: "https://i.ytimg.com/vi")
    ///
    /// Candidates are built as `{thumbnail_base}/{video_id}/{variant}.jpg`.
    #[serde(default = "default_thumbnail_base")]
    pub thumbnail_base: String,

    /// Timeout for each candidate request (default: 20 seconds)
    #[serde(default = "default_poster_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Smallest body accepted as a real image (default: 1024 bytes)
    ///
    /// Some hosts answer missing thumbnails with a tiny placeholder instead of a 404.
    #[serde(default = "default_min_poster_bytes")]
    pub min_bytes: usize,

    /// Largest body accepted before the download is abandoned (default: 10 MiB)
    #[serde(default = "default_max_poster_bytes")]
    pub max_bytes: usize,

    /// User-Agent header sent with candidate requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            thumbnail_base: default_thumbnail_base(),
            timeout: default_poster_timeout(),
            min_bytes: default_min_poster_bytes(),
            max_bytes: default_max_poster_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

/// Main configuration for the acquisition pipeline
///
/// Fields are organized into logical sub-configs:
/// - [`storage`](StorageConfig) - output base, collision handling
/// - [`tools`](ToolsConfig) - external binary paths, timeouts
/// - [`media`](MediaConfig) - fixed audio bitrate and video ceiling
/// - [`poster`](PosterConfig) - thumbnail host and payload validation
/// - [`retry`](RetryConfig) - metadata retry policy
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Output locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// External tool paths and limits
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Audio/video targets
    #[serde(default)]
    pub media: MediaConfig,

    /// Thumbnail fetching
    #[serde(default)]
    pub poster: PosterConfig,

    /// Retry policy for metadata resolution
    #[serde(default)]
    pub retry: RetryConfig,

    /// Maximum concurrent acquisitions (default: 5)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_acquisitions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            tools: ToolsConfig::default(),
            media: MediaConfig::default(),
            poster: PosterConfig::default(),
            retry: RetryConfig::default(),
            max_concurrent_acquisitions: default_max_concurrent(),
        }
    }
}

impl Config {
    /// Default output base
    pub fn output_base(&self) -> &PathBuf {
        &self.storage.output_base
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_acquisitions == 0 {
            return Err(config_error(
                "max_concurrent_acquisitions must be at least 1",
                "max_concurrent_acquisitions",
            ));
        }
        if self.media.audio_bitrate_kbps == 0 {
            return Err(config_error(
                "audio_bitrate_kbps must be positive",
                "media.audio_bitrate_kbps",
            ));
        }
        if self.media.video_height_ceiling == 0 {
            return Err(config_error(
                "video_height_ceiling must be positive",
                "media.video_height_ceiling",
            ));
        }
        if self.media.audio_codec.is_empty() || self.media.video_container.is_empty() {
            return Err(config_error(
                "audio_codec and video_container must be set",
                "media",
            ));
        }
        if self.poster.max_bytes < self.poster.min_bytes {
            return Err(config_error(
                "poster max_bytes must not be below min_bytes",
                "poster.max_bytes",
            ));
        }
        if url::Url::parse(&self.poster.thumbnail_base).is_err() {
            return Err(config_error(
                format!("invalid thumbnail_base '{}'", self.poster.thumbnail_base),
                "poster.thumbnail_base",
            ));
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>, key: &str) -> Error {
    Error::Config {
        message: message.into(),
        key: Some(key.to_string()),
    }
}

/// Retry configuration for transient failures
///
/// Metadata is resolved inside an interactive request, so every default
/// allows one quick retry at most. Fields left out of a partial config fall
/// back to the same policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 1)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 4 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// File collision handling strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCollisionAction {
    /// Append (1), (2), etc. to filename (default)
    #[default]
    Rename,
    /// Overwrite existing file
    Overwrite,
    /// Refuse the move, keep existing
    Skip,
}

fn default_output_base() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_true() -> bool {
    true
}

fn default_socket_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_tool_retries() -> u32 {
    3
}

fn default_concurrent_fragments() -> u32 {
    4
}

fn default_metadata_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_download_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_audio_codec() -> String {
    "mp3".to_string()
}

fn default_audio_bitrate() -> u32 {
    320
}

fn default_video_ceiling() -> u32 {
    1080
}

fn default_video_container() -> String {
    "mp4".to_string()
}

fn default_thumbnail_base() -> String {
    "https://i.ytimg.com/vi".to_string()
}

fn default_poster_timeout() -> Duration {
    Duration::from_secs(20)
}

fn default_min_poster_bytes() -> usize {
    1024
}

fn default_max_poster_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0 Safari/537.36"
        .to_string()
}

fn default_max_concurrent() -> usize {
    5
}

fn default_max_attempts() -> u32 {
    1
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(4)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_pipeline_targets() {
        let config = Config::default();

        assert_eq!(config.media.audio_bitrate_kbps, 320);
        assert_eq!(config.media.audio_codec, "mp3");
        assert_eq!(config.media.video_height_ceiling, 1080);
        assert_eq!(config.max_concurrent_acquisitions, 5);
        assert_eq!(config.poster.min_bytes, 1024);
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.storage.file_collision, FileCollisionAction::Rename);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_json_deserializes_to_defaults() {
        let config: Config = serde_json::from_str("{}").expect("deserialize failed");

        assert_eq!(config.output_base(), &PathBuf::from("./downloads"));
        assert_eq!(config.tools.socket_timeout, Duration::from_secs(10));
        assert_eq!(config.tools.download_timeout, Duration::from_secs(600));
        assert!(config.tools.search_path);
        assert_eq!(config.poster.thumbnail_base, "https://i.ytimg.com/vi");
    }

    #[test]
    fn durations_serialize_as_whole_seconds() {
        let mut config = Config::default();
        config.poster.timeout = Duration::from_secs(7);

        let json = serde_json::to_value(&config).expect("serialize failed");
        assert_eq!(json["poster"]["timeout"], 7);

        let back: Config = serde_json::from_value(json).expect("deserialize failed");
        assert_eq!(back.poster.timeout, Duration::from_secs(7));
    }

    #[test]
    fn partial_sub_config_keeps_remaining_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"storage": {"file_collision": "overwrite"}, "media": {"video_height_ceiling": 720}}"#,
        )
        .expect("deserialize failed");

        assert_eq!(config.storage.file_collision, FileCollisionAction::Overwrite);
        assert_eq!(config.storage.output_base, PathBuf::from("./downloads"));
        assert_eq!(config.media.video_height_ceiling, 720);
        assert_eq!(config.media.audio_bitrate_kbps, 320);
    }

    #[test]
    fn partial_retry_keeps_metadata_policy() {
        let config: Config = serde_json::from_str(r#"{"retry": {"initial_delay": 2}}"#)
            .expect("deserialize failed");

        assert_eq!(config.retry.initial_delay, Duration::from_secs(2));
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.retry.max_delay, Duration::from_secs(4));
        assert!(config.retry.jitter);
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let config = Config {
            max_concurrent_acquisitions: 0,
            ..Default::default()
        };

        match config.validate() {
            Err(Error::Config { key, .. }) => {
                assert_eq!(key.as_deref(), Some("max_concurrent_acquisitions"))
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_unparseable_thumbnail_base() {
        let mut config = Config::default();
        config.poster.thumbnail_base = "not a url".to_string();

        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }
}
