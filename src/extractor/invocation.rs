//! Invocation specs: what to ask the extraction tool for

use std::path::{Path, PathBuf};

use crate::config::MediaConfig;

/// Placeholder the tool replaces with the real extension
pub const EXT_PLACEHOLDER: &str = "%(ext)s";

/// Work the tool runs after fetching streams
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostStep {
    /// Keep the fetched stream as-is
    None,
    /// Transcode the audio stream
    ExtractAudio {
        /// Target codec (e.g., "mp3")
        codec: String,
        /// Constant bitrate in kbps
        bitrate_kbps: u32,
    },
    /// Mux separate video and audio streams into one container
    Merge {
        /// Target container (e.g., "mp4")
        container: String,
    },
}

impl PostStep {
    /// Whether running this step needs a transcoder
    pub fn needs_transcoder(&self) -> bool {
        !matches!(self, PostStep::None)
    }
}

/// One external-tool download, fully described
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSpec {
    /// Cleaned single-video URL
    pub url: String,
    /// Tool format-selection expression
    pub format: String,
    /// Staging directory the tool writes into
    pub staging_dir: PathBuf,
    /// Sanitized base name of the expected output
    pub base_name: String,
    /// Post-download processing
    pub post_step: PostStep,
}

impl InvocationSpec {
    /// Best audio stream, transcoded when a transcoder exists
    ///
    /// Without a transcoder the raw stream is kept and the locator's
    /// rename step recovers it.
    pub fn audio(
        url: &str,
        staging_dir: &Path,
        base_name: &str,
        media: &MediaConfig,
        can_transcode: bool,
    ) -> Self {
        let post_step = if can_transcode {
            PostStep::ExtractAudio {
                codec: media.audio_codec.clone(),
                bitrate_kbps: media.audio_bitrate_kbps,
            }
        } else {
            PostStep::None
        };

        Self {
            url: url.to_string(),
            format: "bestaudio/best".to_string(),
            staging_dir: staging_dir.to_path_buf(),
            base_name: base_name.to_string(),
            post_step,
        }
    }

    /// Best video at or below the ceiling plus best audio, muxed
    pub fn muxed_video(url: &str, staging_dir: &Path, base_name: &str, media: &MediaConfig) -> Self {
        let ceiling = media.video_height_ceiling;
        Self {
            url: url.to_string(),
            format: format!("bestvideo[height<={ceiling}]+bestaudio/best[height<={ceiling}]"),
            staging_dir: staging_dir.to_path_buf(),
            base_name: base_name.to_string(),
            post_step: PostStep::Merge {
                container: media.video_container.clone(),
            },
        }
    }

    /// A stream that is already muxed in the target container
    pub fn direct_video(url: &str, staging_dir: &Path, base_name: &str, media: &MediaConfig) -> Self {
        let ceiling = media.video_height_ceiling;
        let ext = &media.video_container;
        Self {
            url: url.to_string(),
            format: format!(
                "best[height={ceiling}][ext={ext}]/best[height<={ceiling}][ext={ext}]/best[ext={ext}]/best"
            ),
            staging_dir: staging_dir.to_path_buf(),
            base_name: base_name.to_string(),
            post_step: PostStep::None,
        }
    }

    /// Output template: `{staging_dir}/{base_name}.%(ext)s`
    ///
    /// A literal `%` in the base name is doubled so the tool does not read
    /// it as the start of a template field.
    pub fn output_template(&self) -> PathBuf {
        let base = self.base_name.replace('%', "%%");
        self.staging_dir.join(format!("{}.{}", base, EXT_PLACEHOLDER))
    }
}
