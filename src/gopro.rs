// src/gopro.rs
//
// GoPro chapter ordering. A recording session is split into files named
// `GX<chapter:2><session:4>.MP4`, so plain name order interleaves sessions.

use crate::error::{Result, ScoringError};
use std::path::{Path, PathBuf};

const PREFIX: &str = "GX";
const SCORES_MARKER: &str = "_scores";

/// `(session, chapter)`
pub type GoProKey = (u32, u32);

fn parse_key(name: &str, stem: &str, digit_range: std::ops::RangeInclusive<usize>) -> Result<GoProKey> {
    let invalid = |reason: &str| ScoringError::invalid_file_name(name, reason);

    let digits = stem
        .strip_prefix(PREFIX)
        .ok_or_else(|| invalid("missing GX prefix"))?;
    if !digit_range.contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("expected GX followed by a chapter and session number"));
    }

    let chapter: u32 = digits[..2].parse().map_err(|_| invalid("bad chapter"))?;
    let session: u32 = digits[2..].parse().map_err(|_| invalid("bad session"))?;
    Ok((session, chapter))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().trim().to_string())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().trim().to_string())
        .unwrap_or_default()
}

/// Key for a video file such as `GX011291.MP4`
pub fn video_key(path: &Path) -> Result<GoProKey> {
    parse_key(&file_name(path), &file_stem(path), 6..=6)
}

/// Key for a score file such as `GX011291_scores.csv`
pub fn scores_key(path: &Path) -> Result<GoProKey> {
    let stem = file_stem(path);
    let base = stem.split(SCORES_MARKER).next().unwrap_or_default();
    parse_key(&file_name(path), base, 6..=7)
}

fn sort_by_key(
    paths: Vec<PathBuf>,
    key: impl Fn(&Path) -> Result<GoProKey>,
) -> Result<Vec<PathBuf>> {
    let mut keyed = paths
        .into_iter()
        .map(|p| key(&p).map(|k| (k, p)))
        .collect::<Result<Vec<_>>>()?;
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, p)| p).collect())
}

pub fn sort_gopro_videos(paths: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    sort_by_key(paths, video_key)
}

pub fn sort_gopro_score_csvs(paths: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    sort_by_key(paths, scores_key)
}
