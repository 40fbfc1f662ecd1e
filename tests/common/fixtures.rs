//! Fake external tools and acquirer construction

use media_acquire::config::{RetryConfig, StorageConfig, ToolsConfig};
use media_acquire::{Config, MediaAcquirer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// URL every fixture answers for
pub const VIDEO_URL: &str = "https://www.youtube.com/watch?v=abc";

/// How the fake `yt-dlp` behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolMode {
    /// Answers metadata queries and writes the `-o` template
    Working,
    /// Exits 1 with an `ERROR:` line for every call
    Broken,
    /// Sleeps past any sane timeout
    Hanging,
}

impl ToolMode {
    fn as_str(self) -> &'static str {
        match self {
            ToolMode::Working => "ok",
            ToolMode::Broken => "fail",
            ToolMode::Hanging => "hang",
        }
    }
}

// The output extension follows what real yt-dlp would produce: the audio
// codec after -x, the merge container after --merge-output-format, else the
// source stream's own container.
const FAKE_YTDLP: &str = r#"#!/bin/sh
case "__MODE__" in
  fail) echo "WARNING: unable to extract uploader" >&2; echo "ERROR: [youtube] abc: Private video" >&2; exit 1 ;;
  hang) exec sleep 30 ;;
esac
tmpl=""; ext="webm"; prev=""; meta=0
for a in "$@"; do
  case "$a" in
    --dump-single-json) meta=1 ;;
  esac
  if [ "$prev" = "-o" ]; then tmpl="$a"; fi
  if [ "$prev" = "--audio-format" ]; then ext="$a"; fi
  if [ "$prev" = "--merge-output-format" ]; then ext="$a"; fi
  prev="$a"
done
if [ "$meta" = 1 ]; then
  printf '%s\n' '{"id":"abc","title":"Fake: Song!","duration":212.4,"channel":"Fake Channel","description":"liner notes","formats":[{"height":1078,"vcodec":"avc1"},{"height":718,"vcodec":"vp9"},{"height":144,"vcodec":"none"},{"acodec":"opus","vcodec":"none"}]}'
  exit 0
fi
out=$(printf '%s' "$tmpl" | sed "s/%(ext)s/$ext/")
printf 'fake-media' > "$out"
"#;

fn write_executable(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, body).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Install a fake `yt-dlp` (and optionally a fake `ffmpeg`) under `dir`
pub fn install_fake_tools(dir: &Path, mode: ToolMode, with_ffmpeg: bool) -> ToolsConfig {
    let ytdlp = dir.join("yt-dlp");
    write_executable(&ytdlp, &FAKE_YTDLP.replace("__MODE__", mode.as_str()));

    let ffmpeg = with_ffmpeg.then(|| {
        let path = dir.join("ffmpeg");
        write_executable(&path, "#!/bin/sh\nexit 0\n");
        path
    });

    ToolsConfig {
        ytdlp_path: Some(ytdlp),
        ffmpeg_path: ffmpeg,
        search_path: false,
        metadata_timeout: Duration::from_secs(2),
        download_timeout: Duration::from_secs(2),
        ..Default::default()
    }
}

/// Config rooted at `output_base` using `tools`, with retries disabled
pub fn test_config(output_base: &Path, tools: ToolsConfig) -> Config {
    Config {
        storage: StorageConfig {
            output_base: output_base.to_path_buf(),
            ..Default::default()
        },
        tools,
        retry: RetryConfig {
            max_attempts: 0,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// A working directory holding the fake tools and the output tree
pub struct Harness {
    /// Keeps the directory alive for the test's duration
    pub dir: TempDir,
    /// Acquirer wired to the fake tools
    pub acquirer: MediaAcquirer,
}

impl Harness {
    /// Harness whose `yt-dlp` behaves per `mode`
    pub fn new(mode: ToolMode, with_ffmpeg: bool) -> Self {
        Self::with_config(mode, with_ffmpeg, |_| {})
    }

    /// Harness with a config adjusted by `customize`
    pub fn with_config(mode: ToolMode, with_ffmpeg: bool, customize: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let tools_dir = dir.path().join("bin");
        std::fs::create_dir_all(&tools_dir).unwrap();

        let tools = install_fake_tools(&tools_dir, mode, with_ffmpeg);
        let mut config = test_config(&dir.path().join("media"), tools);
        customize(&mut config);

        let acquirer = MediaAcquirer::new(config).unwrap();
        Self { dir, acquirer }
    }

    /// Root of the `temp/` and `final/` subtrees
    pub fn output_base(&self) -> PathBuf {
        self.dir.path().join("media")
    }

    /// `final/` under the output base
    pub fn final_dir(&self) -> PathBuf {
        self.output_base().join("final")
    }

    /// `temp/` under the output base
    pub fn temp_dir(&self) -> PathBuf {
        self.output_base().join("temp")
    }
}
