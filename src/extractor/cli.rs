//! CLI-based extractor using the external yt-dlp binary

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::invocation::{InvocationSpec, PostStep};
use super::parser::parse_metadata_json;
use super::traits::{ExtractorCapabilities, MediaExtractor};
use crate::config::ToolsConfig;
use crate::error::Error;
use crate::types::VideoMetadata;

const TOOL: &str = "yt-dlp";

// Longest stderr excerpt carried in an error
const STDERR_EXCERPT_CHARS: usize = 300;

/// Extractor backed by the `yt-dlp` binary, with optional `ffmpeg`
///
/// Every process is spawned with kill-on-drop and awaited under a timeout,
/// so a stalled or abandoned invocation never outlives its future.
///
/// # Examples
///
/// ```no_run
/// use media_acquire::extractor::YtDlpExtractor;
/// use media_acquire::config::ToolsConfig;
/// use std::path::PathBuf;
///
/// // Explicit binaries
/// let extractor = YtDlpExtractor::new(
///     PathBuf::from("/usr/local/bin/yt-dlp"),
///     Some(PathBuf::from("/usr/bin/ffmpeg")),
///     ToolsConfig::default(),
/// );
///
/// // Or resolve from config / PATH
/// let extractor = YtDlpExtractor::from_config(&ToolsConfig::default());
/// ```
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    binary_path: PathBuf,
    ffmpeg_path: Option<PathBuf>,
    tools: ToolsConfig,
}

impl YtDlpExtractor {
    /// Create an extractor with explicit binary paths
    pub fn new(binary_path: PathBuf, ffmpeg_path: Option<PathBuf>, tools: ToolsConfig) -> Self {
        Self {
            binary_path,
            ffmpeg_path,
            tools,
        }
    }

    /// Resolve binaries from explicit config paths, then PATH when allowed
    ///
    /// Returns `None` when yt-dlp cannot be found. A missing ffmpeg is not
    /// an error: the extractor then reports `can_transcode: false`.
    pub fn from_config(tools: &ToolsConfig) -> Option<Self> {
        let binary_path = resolve_binary(tools.ytdlp_path.as_ref(), TOOL, tools.search_path)?;
        let ffmpeg_path = resolve_binary(tools.ffmpeg_path.as_ref(), "ffmpeg", tools.search_path);
        Some(Self::new(binary_path, ffmpeg_path, tools.clone()))
    }

    /// Arguments for a metadata query
    pub fn metadata_args(&self, url: &str) -> Vec<OsString> {
        let mut args = self.common_args();
        args.extend(
            ["--dump-single-json", "--skip-download", "--", url]
                .into_iter()
                .map(OsString::from),
        );
        args
    }

    /// Arguments for a download invocation
    pub fn download_args(&self, spec: &InvocationSpec) -> Vec<OsString> {
        let mut args = self.common_args();
        args.push("--fragment-retries".into());
        args.push(self.tools.retries.to_string().into());
        args.push("--concurrent-fragments".into());
        args.push(self.tools.concurrent_fragments.to_string().into());
        args.push("--no-part".into());
        args.push("-f".into());
        args.push(spec.format.clone().into());
        args.push("-o".into());
        args.push(spec.output_template().into_os_string());

        if let Some(ffmpeg) = &self.ffmpeg_path {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.clone().into_os_string());
        }

        match &spec.post_step {
            PostStep::None => {}
            PostStep::ExtractAudio {
                codec,
                bitrate_kbps,
            } => {
                args.push("-x".into());
                args.push("--audio-format".into());
                args.push(codec.into());
                args.push("--audio-quality".into());
                args.push(format!("{}K", bitrate_kbps).into());
            }
            PostStep::Merge { container } => {
                args.push("--merge-output-format".into());
                args.push(container.into());
            }
        }

        args.push("--".into());
        args.push(spec.url.clone().into());
        args
    }

    fn common_args(&self) -> Vec<OsString> {
        vec![
            "--no-playlist".into(),
            "--quiet".into(),
            "--no-warnings".into(),
            "--no-progress".into(),
            "--socket-timeout".into(),
            self.tools.socket_timeout.as_secs().to_string().into(),
            "--retries".into(),
            self.tools.retries.to_string().into(),
        ]
    }

    async fn run(&self, args: Vec<OsString>, limit: Duration) -> crate::Result<Vec<u8>> {
        let mut command = Command::new(&self.binary_path);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(limit, command.output())
            .await
            .map_err(|_| tool_failure(format!("timed out after {}s", limit.as_secs_f64())))?
            .map_err(|e| tool_failure(format!("failed to execute {}: {}", self.binary_path.display(), e)))?;

        if !output.status.success() {
            return Err(tool_failure(format!(
                "{}: {}",
                output.status,
                stderr_excerpt(&output.stderr)
            )));
        }

        Ok(output.stdout)
    }
}

fn resolve_binary(explicit: Option<&PathBuf>, name: &str, search_path: bool) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.clone()),
        None if search_path => which::which(name).ok(),
        None => None,
    }
}

fn tool_failure(reason: String) -> Error {
    Error::ExternalToolFailure {
        tool: TOOL.to_string(),
        reason,
    }
}

/// The most telling stderr line: the last `ERROR:` line, else the last non-empty line
fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let line = lines
        .clone()
        .filter(|l| l.starts_with("ERROR"))
        .last()
        .or_else(|| lines.next_back())
        .unwrap_or("no error output");
    line.chars().take(STDERR_EXCERPT_CHARS).collect()
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    async fn extract_metadata(&self, url: &str) -> crate::Result<VideoMetadata> {
        tracing::debug!(url, binary = %self.binary_path.display(), "querying metadata");
        let stdout = self
            .run(self.metadata_args(url), self.tools.metadata_timeout)
            .await?;
        parse_metadata_json(&stdout)
    }

    async fn download(&self, spec: &InvocationSpec) -> crate::Result<()> {
        if spec.post_step.needs_transcoder() && self.ffmpeg_path.is_none() {
            return Err(Error::TranscodeToolMissing("ffmpeg".to_string()));
        }

        tracing::debug!(
            url = %spec.url,
            format = %spec.format,
            staging = ?spec.staging_dir,
            "running download invocation"
        );
        self.run(self.download_args(spec), self.tools.download_timeout)
            .await
            .map(|_| ())
    }

    fn capabilities(&self) -> ExtractorCapabilities {
        ExtractorCapabilities {
            can_extract: true,
            can_transcode: self.ffmpeg_path.is_some(),
        }
    }

    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }
}
