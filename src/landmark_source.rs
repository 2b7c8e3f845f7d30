// src/landmark_source.rs
//
// Frame-by-frame hand landmarks produced by an external hand tracker.
//
// The tracker runs over the decoded video and writes one JSON record per line
// next to it (`<video stem>_landmarks.jsonl`):
//
//   {"type":"header","source":"GX010835.MP4","fps":50.0,"frame_count":90000}
//   {"type":"frame","frame_index":1,"hands":[]}
//   {"type":"frame","frame_index":2,"hands":[[[0.51,0.80],[0.49,0.71],...]]}
//
// Points may be `[x, y]`, `[x, y, z]` or `{"x":..,"y":..}`; z is ignored.

use crate::error::{Result, ScoringError};
use crate::types::{LandmarkFrame, LandmarkPoint, LandmarkSet, StreamInfo};
use serde::Deserialize;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

pub trait LandmarkSource {
    fn info(&self) -> &StreamInfo;

    /// `Ok(None)` at end of stream, `Err(StreamTerminated)` when the upstream
    /// tracker output breaks off
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>>;
}

impl<S: LandmarkSource + ?Sized> LandmarkSource for Box<S> {
    fn info(&self) -> &StreamInfo {
        (**self).info()
    }

    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        (**self).next_frame()
    }
}

// ============================================================================
// JSON LINES
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LandmarkRecord {
    Header {
        source: String,
        fps: f64,
        #[serde(default)]
        frame_count: Option<u64>,
    },
    Frame {
        frame_index: u64,
        #[serde(default)]
        hands: Vec<Vec<RawPoint>>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Xy([f32; 2]),
    Xyz([f32; 3]),
    Named { x: f32, y: f32 },
}

impl From<RawPoint> for LandmarkPoint {
    fn from(raw: RawPoint) -> Self {
        match raw {
            RawPoint::Xy([x, y]) | RawPoint::Xyz([x, y, _]) => LandmarkPoint::new(x, y),
            RawPoint::Named { x, y } => LandmarkPoint::new(x, y),
        }
    }
}

pub struct JsonlLandmarkSource<R: BufRead> {
    reader: R,
    info: StreamInfo,
    line_number: usize,
    buffer: String,
}

impl JsonlLandmarkSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())
            .map_err(|e| ScoringError::io("opening landmark stream", e))?;
        Self::new(BufReader::new(file))
    }
}

impl<R: BufRead> JsonlLandmarkSource<R> {
    /// Read the header record; frames are pulled lazily afterwards
    pub fn new(mut reader: R) -> Result<Self> {
        let mut buffer = String::new();
        let mut line_number = 0;

        loop {
            buffer.clear();
            let read = reader
                .read_line(&mut buffer)
                .map_err(|e| ScoringError::io("reading landmark header", e))?;
            if read == 0 {
                return Err(ScoringError::stream_terminated(
                    "landmark stream has no header record",
                ));
            }
            line_number += 1;
            if !buffer.trim().is_empty() {
                break;
            }
        }

        let record: LandmarkRecord = serde_json::from_str(buffer.trim())
            .map_err(|e| ScoringError::json("parsing landmark header", e))?;

        let LandmarkRecord::Header {
            source,
            fps,
            frame_count,
        } = record
        else {
            return Err(ScoringError::stream_terminated(
                "first landmark record must be a header",
            ));
        };

        if !(fps.is_finite() && fps > 0.0) {
            return Err(ScoringError::stream_terminated(format!(
                "invalid fps {fps} in landmark header"
            )));
        }

        debug!("Landmark stream {} @ {:.2} fps", source, fps);

        Ok(Self {
            reader,
            info: StreamInfo {
                source,
                fps,
                frame_count,
            },
            line_number,
            buffer,
        })
    }
}

impl<R: BufRead> LandmarkSource for JsonlLandmarkSource<R> {
    fn info(&self) -> &StreamInfo {
        &self.info
    }

    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        loop {
            self.buffer.clear();
            let read = self.reader.read_line(&mut self.buffer).map_err(|e| {
                ScoringError::stream_terminated(format!(
                    "read failed after line {}: {e}",
                    self.line_number
                ))
            })?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buffer.trim();
            if line.is_empty() {
                continue;
            }

            let record: LandmarkRecord = serde_json::from_str(line).map_err(|e| {
                ScoringError::stream_terminated(format!("line {}: {e}", self.line_number))
            })?;

            return match record {
                LandmarkRecord::Frame { frame_index, hands } => Ok(Some(LandmarkFrame {
                    frame_index,
                    media_timestamp: frame_index as f64 / self.info.fps,
                    hands: hands
                        .into_iter()
                        .map(|points| {
                            LandmarkSet::new(points.into_iter().map(LandmarkPoint::from).collect())
                        })
                        .collect(),
                })),
                LandmarkRecord::Header { .. } => Err(ScoringError::stream_terminated(format!(
                    "line {}: unexpected second header",
                    self.line_number
                ))),
            };
        }
    }
}

// ============================================================================
// IN-MEMORY
// ============================================================================

/// Pre-built frames, optionally ending in an upstream failure
pub struct MemoryLandmarkSource {
    info: StreamInfo,
    frames: VecDeque<LandmarkFrame>,
    termination: Option<String>,
}

impl MemoryLandmarkSource {
    pub fn new(info: StreamInfo, frames: Vec<LandmarkFrame>) -> Self {
        Self {
            info,
            frames: frames.into(),
            termination: None,
        }
    }

    /// Frames at `fps` with timestamps derived from their index
    pub fn from_hands(source: &str, fps: f64, frames: Vec<(u64, Vec<LandmarkSet>)>) -> Self {
        let frames = frames
            .into_iter()
            .map(|(frame_index, hands)| LandmarkFrame {
                frame_index,
                media_timestamp: frame_index as f64 / fps,
                hands,
            })
            .collect();
        Self::new(
            StreamInfo {
                source: source.to_string(),
                fps,
                frame_count: None,
            },
            frames,
        )
    }

    /// Fail with `StreamTerminated` once the frames run out
    pub fn terminate_with(mut self, reason: impl Into<String>) -> Self {
        self.termination = Some(reason.into());
        self
    }
}

impl LandmarkSource for MemoryLandmarkSource {
    fn info(&self) -> &StreamInfo {
        &self.info
    }

    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        match self.frames.pop_front() {
            Some(frame) => Ok(Some(frame)),
            None => match self.termination.take() {
                Some(reason) => Err(ScoringError::stream_terminated(reason)),
                None => Ok(None),
            },
        }
    }
}

// ============================================================================
// SUBSAMPLING
// ============================================================================

/// Keeps every `interval`-th native frame (`frame_index % interval == 0`)
pub struct FrameSampler<S> {
    inner: S,
    interval: u64,
    frames_read: u64,
}

impl<S: LandmarkSource> FrameSampler<S> {
    pub fn new(inner: S, interval: u64) -> Self {
        Self {
            inner,
            interval: interval.max(1),
            frames_read: 0,
        }
    }

    /// Native frames pulled from the wrapped source so far
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }
}

impl<S: LandmarkSource> LandmarkSource for FrameSampler<S> {
    fn info(&self) -> &StreamInfo {
        self.inner.info()
    }

    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        while let Some(frame) = self.inner.next_frame()? {
            self.frames_read += 1;
            if frame.frame_index % self.interval == 0 {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}
