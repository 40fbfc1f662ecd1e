//! Shared test helpers: a scriptable in-process extractor and a fake yt-dlp binary.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::extractor::{ExtractorCapabilities, InvocationSpec, MediaExtractor};
use crate::types::{FormatEntry, VideoMetadata};

/// What the stub does for one `download` call
#[derive(Debug, Clone)]
pub(crate) enum StubDownload {
    /// Write `{base_name}.{ext}` into staging
    Write { ext: &'static str, bytes: Vec<u8> },
    /// Write a file with an unrelated name into staging
    WriteNamed { name: &'static str },
    /// Exit successfully without producing anything
    Nothing,
    /// Exit unsuccessfully
    Fail(&'static str),
}

/// In-process extractor with scripted outcomes
pub(crate) struct StubExtractor {
    metadata: Option<VideoMetadata>,
    can_transcode: bool,
    downloads: Mutex<VecDeque<StubDownload>>,
    pub(crate) invocations: Mutex<Vec<InvocationSpec>>,
    pub(crate) metadata_calls: Mutex<Vec<String>>,
}

impl StubExtractor {
    pub(crate) fn new(metadata: Option<VideoMetadata>, can_transcode: bool) -> Self {
        Self {
            metadata,
            can_transcode,
            downloads: Mutex::new(VecDeque::new()),
            invocations: Mutex::new(Vec::new()),
            metadata_calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn then(self, outcome: StubDownload) -> Self {
        self.downloads.lock().unwrap().push_back(outcome);
        self
    }

    pub(crate) fn invocations(&self) -> Vec<InvocationSpec> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaExtractor for StubExtractor {
    async fn extract_metadata(&self, url: &str) -> crate::Result<VideoMetadata> {
        self.metadata_calls.lock().unwrap().push(url.to_string());
        self.metadata
            .clone()
            .ok_or_else(|| crate::Error::ExternalToolFailure {
                tool: "stub".into(),
                reason: "ERROR: Video unavailable".into(),
            })
    }

    async fn download(&self, spec: &InvocationSpec) -> crate::Result<()> {
        self.invocations.lock().unwrap().push(spec.clone());
        if spec.post_step.needs_transcoder() && !self.can_transcode {
            return Err(crate::Error::TranscodeToolMissing("ffmpeg".into()));
        }

        let outcome = self
            .downloads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(StubDownload::Nothing);

        match outcome {
            StubDownload::Write { ext, bytes } => {
                let path = spec.staging_dir.join(format!("{}.{}", spec.base_name, ext));
                std::fs::write(path, bytes)?;
                Ok(())
            }
            StubDownload::WriteNamed { name } => {
                std::fs::write(spec.staging_dir.join(name), b"other")?;
                Ok(())
            }
            StubDownload::Nothing => Ok(()),
            StubDownload::Fail(reason) => Err(crate::Error::ExternalToolFailure {
                tool: "stub".into(),
                reason: reason.into(),
            }),
        }
    }

    fn capabilities(&self) -> ExtractorCapabilities {
        ExtractorCapabilities {
            can_extract: true,
            can_transcode: self.can_transcode,
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Metadata with the given title and video heights
pub(crate) fn sample_metadata(title: &str, heights: &[u32]) -> VideoMetadata {
    VideoMetadata {
        id: "abc123".into(),
        title: title.into(),
        duration_seconds: 61.0,
        uploader: "Uploader".into(),
        thumbnail_url: None,
        description: "d".repeat(300),
        formats: heights
            .iter()
            .map(|&h| FormatEntry {
                height_pixels: Some(h),
                has_video_track: true,
            })
            .collect(),
    }
}

const FAKE_YTDLP: &str = r#"#!/bin/sh
case "__MODE__" in
  fail) echo "ERROR: [youtube] abc: Video unavailable" >&2; exit 1 ;;
  hang) exec sleep 30 ;;
esac
tmpl=""; ext="webm"; prev=""; meta=0
for a in "$@"; do
  case "$a" in
    --dump-single-json) meta=1 ;;
    -x) ext="mp3" ;;
    --merge-output-format) ext="mp4" ;;
  esac
  if [ "$prev" = "-o" ]; then tmpl="$a"; fi
  prev="$a"
done
if [ "$meta" = 1 ]; then
  printf '%s\n' '{"id":"abc","title":"Fake Song","duration":3,"uploader":"Fake","formats":[{"height":720,"vcodec":"avc1"},{"vcodec":"none"}]}'
  exit 0
fi
out=$(printf '%s' "$tmpl" | sed "s/%(ext)s/$ext/")
printf 'fake-media' > "$out"
"#;

/// Write an executable fake `yt-dlp` into `dir`
///
/// Modes: `ok` answers metadata queries and writes the `-o` template,
/// `fail` exits 1 with an `ERROR:` line, `hang` sleeps.
#[cfg(unix)]
pub(crate) fn write_fake_ytdlp(dir: &Path, mode: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(format!("yt-dlp-{mode}"));
    std::fs::write(&path, FAKE_YTDLP.replace("__MODE__", mode)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
