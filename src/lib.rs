//! # media-acquire
//!
//! Backend library that turns a video URL into a durable local artifact:
//! an MP3 audio track, an MP4 video capped at a fixed height, or a poster
//! image.
//!
//! ## Pipeline
//!
//! Each acquisition runs one sequential pipeline:
//! - **Resolve** metadata through the external extraction tool (`yt-dlp`)
//! - **Invoke** the tool into a per-request staging directory under `temp/`
//! - **Locate** the file the tool actually produced
//! - **Finalize** it into `final/` under a filesystem-safe name
//!
//! Posters skip the tool and are fetched over HTTP from a list of thumbnail
//! candidates. Concurrent acquisitions are bounded by a semaphore.
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_acquire::{Config, MediaAcquirer, MediaKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.storage.output_base = "/srv/media".into();
//!
//!     let acquirer = MediaAcquirer::new(config)?;
//!
//!     let info = acquirer.get_info("https://www.youtube.com/watch?v=abc").await?;
//!     println!("{} offers {:?}", info.title, info.resolutions);
//!
//!     let response = acquirer
//!         .download("https://www.youtube.com/watch?v=abc", MediaKind::Audio, Some("mp3"), None)
//!         .await;
//!     if !response.success {
//!         eprintln!("{}", response.message);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Acquisition dispatcher and request-layer operations
pub mod dispatcher;
/// Error types
pub mod error;
/// External extraction tool integration
pub mod extractor;
/// Durable storage of acquired artifacts
pub mod finalize;
/// Bounded concurrency for acquisitions
pub mod gate;
/// Locating the files the extraction tool produced
pub mod locator;
/// Metadata resolution and URL cleaning
pub mod metadata;
/// Poster (thumbnail) fetching
pub mod poster;
/// Standard resolution ladder
pub mod resolution;
/// Retry logic with exponential backoff
pub mod retry;
/// Filesystem-safe names
pub mod sanitize;
/// Core data model
pub mod types;
/// Utility functions
pub mod utils;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use config::{Config, FileCollisionAction};
pub use dispatcher::MediaAcquirer;
pub use error::{Error, ErrorDetail, Result, ToHttpStatus};
pub use extractor::{
    ExtractorCapabilities, InvocationSpec, MediaExtractor, NoOpExtractor, PostStep, YtDlpExtractor,
};
pub use types::{
    AcquisitionRequest, AcquisitionResponse, FinalArtifact, MediaKind, Quality, ResolutionOffer,
    VideoInfo, VideoMetadata,
};
