//! External extraction service
//!
//! The extraction/transcoding tool is opaque: given a URL it reports
//! metadata, and given a format expression it leaves a file somewhere in a
//! staging directory. This module puts a trait in front of it so the pipeline
//! can run against the real binary, a stub, or nothing at all.
//!
//! ## Architecture
//!
//! - [`MediaExtractor`]: the interface the pipeline drives
//! - [`YtDlpExtractor`]: spawns `yt-dlp` (and hands it `ffmpeg` when present)
//! - [`NoOpExtractor`]: stand-in when `yt-dlp` is not installed
//! - [`InvocationSpec`]: the format/post-step description of one download
//!
//! ## Usage
//!
//! ```no_run
//! use media_acquire::extractor::{MediaExtractor, NoOpExtractor, YtDlpExtractor};
//! use media_acquire::config::ToolsConfig;
//! use std::sync::Arc;
//!
//! let tools = ToolsConfig::default();
//! let extractor: Arc<dyn MediaExtractor> = match YtDlpExtractor::from_config(&tools) {
//!     Some(cli) => Arc::new(cli),
//!     None => Arc::new(NoOpExtractor),
//! };
//! println!("transcoding: {}", extractor.capabilities().can_transcode);
//! ```

mod cli;
mod invocation;
mod noop;
mod parser;
mod traits;

pub use cli::YtDlpExtractor;
pub use invocation::{EXT_PLACEHOLDER, InvocationSpec, PostStep};
pub use noop::NoOpExtractor;
pub use parser::parse_metadata_json;
pub use traits::{ExtractorCapabilities, MediaExtractor};

use crate::config::ToolsConfig;
use std::sync::Arc;

/// Pick the best available extractor for `tools` and log its capabilities
pub fn from_config(tools: &ToolsConfig) -> Arc<dyn MediaExtractor> {
    let extractor: Arc<dyn MediaExtractor> = match YtDlpExtractor::from_config(tools) {
        Some(cli) => Arc::new(cli),
        None => {
            tracing::warn!("yt-dlp not found, acquisitions will fail until it is installed");
            Arc::new(NoOpExtractor)
        }
    };

    let caps = extractor.capabilities();
    tracing::info!(
        extractor = extractor.name(),
        can_extract = caps.can_extract,
        can_transcode = caps.can_transcode,
        "extractor initialized"
    );
    extractor
}
