//! Standard resolution ladder derivation
//!
//! Extractors report raw frame heights (1078, 718, 1920x800 letterboxed...).
//! Callers are offered rungs of a fixed ladder instead: a rung is offered
//! when some real format sits within a small tolerance of it, and only when
//! nothing matches closely does a looser nearest-rung pass run.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::types::{ResolutionOffer, VideoMetadata};

/// Every standard frame height the pipeline knows about
pub const LADDER: [u32; 8] = [144, 240, 360, 480, 720, 1080, 1440, 2160];

/// Smallest rung offered to callers
pub const MIN_OFFERED: u32 = 360;

/// Largest rung offered to callers
pub const MAX_OFFERED: u32 = 2160;

/// Distance within which a format counts as a rung
pub const TOLERANCE: u32 = 20;

/// Distance allowed by the nearest-rung fallback
pub const FALLBACK_TOLERANCE: u32 = 50;

/// Offers used when a video exposes no usable heights
pub const DEFAULT_OFFERS: [ResolutionOffer; 3] = [
    ResolutionOffer(720),
    ResolutionOffer(480),
    ResolutionOffer(360),
];

/// Standard resolutions obtainable for `metadata`, descending and unique
///
/// Returns an empty list when no format has a video track with a positive
/// height; callers substitute [`DEFAULT_OFFERS`].
pub fn standard_resolutions(metadata: &VideoMetadata) -> Vec<ResolutionOffer> {
    let heights: BTreeSet<u32> = metadata
        .formats
        .iter()
        .filter(|f| f.has_video_track)
        .filter_map(|f| f.height_pixels)
        .filter(|&h| h > 0)
        .collect();

    offers_for_heights(&heights)
}

/// Like [`standard_resolutions`], but an empty result is
/// [`Error::NoResolutionsAvailable`]
pub fn require_resolutions(metadata: &VideoMetadata) -> Result<Vec<ResolutionOffer>> {
    let offers = standard_resolutions(metadata);
    if offers.is_empty() {
        return Err(Error::NoResolutionsAvailable);
    }
    Ok(offers)
}

/// Ladder matching over a set of distinct heights
pub fn offers_for_heights(heights: &BTreeSet<u32>) -> Vec<ResolutionOffer> {
    if heights.is_empty() {
        return Vec::new();
    }

    let mut offered: BTreeSet<u32> = offered_rungs()
        .filter(|&rung| heights.iter().any(|&h| h.abs_diff(rung) <= TOLERANCE))
        .collect();

    if offered.is_empty() {
        for &h in heights.iter().rev() {
            if !(MIN_OFFERED..=MAX_OFFERED).contains(&h) {
                continue;
            }
            if let Some(rung) = nearest_rung(h)
                && rung.abs_diff(h) <= FALLBACK_TOLERANCE
            {
                offered.insert(rung);
            }
        }
    }

    offered.into_iter().rev().map(ResolutionOffer).collect()
}

fn offered_rungs() -> impl Iterator<Item = u32> {
    LADDER
        .into_iter()
        .filter(|r| (MIN_OFFERED..=MAX_OFFERED).contains(r))
}

// Ties go to the lower rung: the ladder is scanned ascending and only a
// strictly closer rung replaces the current best.
fn nearest_rung(height: u32) -> Option<u32> {
    let mut best: Option<u32> = None;
    for rung in offered_rungs() {
        match best {
            Some(b) if rung.abs_diff(height) >= b.abs_diff(height) => {}
            _ => best = Some(rung),
        }
    }
    best
}
