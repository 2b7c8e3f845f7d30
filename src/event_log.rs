// src/event_log.rs
//
// Ordered, append-only log of confirmed gestures, persisted as the scores CSV
// that highlight assembly reads back:
//
//   <source video>
//   Timestamp,<team one>,<team two>,Highlights
//   Starting Scores,<score one>,<score two>,0
//   HH:MM:SS,1,0,0
//   ...

use crate::error::{Result, ScoringError};
use crate::types::{GestureClass, MatchInfo, ScoreEvent, ScoreKind, Timecode};
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

const TIMESTAMP_HEADER: &str = "Timestamp";
const HIGHLIGHTS_HEADER: &str = "Highlights";
const STARTING_SCORES_LABEL: &str = "Starting Scores";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventLogHeader {
    pub source: String,
    pub team_one: String,
    pub team_two: String,
    pub starting_score_one: u32,
    pub starting_score_two: u32,
}

impl EventLogHeader {
    pub fn new(source: impl Into<String>, match_info: &MatchInfo) -> Self {
        Self {
            source: source.into(),
            team_one: match_info.team_one.clone(),
            team_two: match_info.team_two.clone(),
            starting_score_one: match_info.starting_score_one,
            starting_score_two: match_info.starting_score_two,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventCounts {
    pub team_one: u32,
    pub team_two: u32,
    pub highlights: u32,
}

impl EventCounts {
    pub fn add(&mut self, kind: ScoreKind) {
        match kind {
            ScoreKind::TeamOne => self.team_one += 1,
            ScoreKind::TeamTwo => self.team_two += 1,
            ScoreKind::Highlight => self.highlights += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.team_one + self.team_two + self.highlights
    }
}

/// Accumulates events for one video run
pub struct EventLogBuilder {
    header: EventLogHeader,
    events: Vec<ScoreEvent>,
}

impl EventLogBuilder {
    pub fn new(header: EventLogHeader) -> Self {
        Self {
            header,
            events: Vec::new(),
        }
    }

    /// Append the event for `class` confirmed at `media_timestamp` seconds
    pub fn record(&mut self, class: GestureClass, media_timestamp: f64) -> ScoreEvent {
        let event = ScoreEvent::new(
            Timecode::from_media_seconds(media_timestamp),
            class.score_kind(),
        );
        self.events.push(event);
        event
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn finish(self) -> EventLog {
        EventLog {
            header: self.header,
            events: self.events,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventLog {
    pub header: EventLogHeader,
    pub events: Vec<ScoreEvent>,
}

impl EventLog {
    pub fn counts(&self) -> EventCounts {
        let mut counts = EventCounts::default();
        for event in &self.events {
            counts.add(event.kind);
        }
        counts
    }

    /// Starting scores plus every team delta
    pub fn final_scores(&self) -> (u32, u32) {
        let counts = self.counts();
        (
            self.header.starting_score_one + counts.team_one,
            self.header.starting_score_two + counts.team_two,
        )
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);

        let write_err = |e| ScoringError::csv("writing event log", e);

        csv.write_record([self.header.source.as_str()])
            .map_err(write_err)?;
        csv.write_record([
            TIMESTAMP_HEADER,
            self.header.team_one.as_str(),
            self.header.team_two.as_str(),
            HIGHLIGHTS_HEADER,
        ])
        .map_err(write_err)?;
        csv.write_record([
            STARTING_SCORES_LABEL.to_string(),
            self.header.starting_score_one.to_string(),
            self.header.starting_score_two.to_string(),
            "0".to_string(),
        ])
        .map_err(write_err)?;

        for event in &self.events {
            let (one, two, highlight) = event.deltas();
            csv.write_record([
                event.formatted_timestamp(),
                one.to_string(),
                two.to_string(),
                highlight.to_string(),
            ])
            .map_err(write_err)?;
        }

        csv.flush()
            .map_err(|e| ScoringError::io("flushing event log", e))?;
        Ok(())
    }

    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = csv.records().enumerate();
        let mut next_record = |what: &str| -> Result<(usize, csv::StringRecord)> {
            match records.next() {
                Some((idx, Ok(record))) => Ok((idx + 1, record)),
                Some((_, Err(e))) => Err(ScoringError::csv("reading event log", e)),
                None => Err(ScoringError::invalid_event_log(0, format!("missing {what} row"))),
            }
        };

        let (_, source_row) = next_record("source")?;
        let source = source_row.get(0).unwrap_or_default().to_string();

        let (idx, columns) = next_record("column header")?;
        if columns.len() < 4 {
            return Err(ScoringError::invalid_event_log(
                idx,
                "column header needs 4 fields",
            ));
        }
        let team_one = columns[1].to_string();
        let team_two = columns[2].to_string();

        let (idx, starting) = next_record("starting scores")?;
        if starting.len() < 3 {
            return Err(ScoringError::invalid_event_log(
                idx,
                "starting scores need 3 fields",
            ));
        }
        let starting_score_one = parse_count(&starting[1], idx)?;
        let starting_score_two = parse_count(&starting[2], idx)?;

        let header = EventLogHeader {
            source,
            team_one,
            team_two,
            starting_score_one,
            starting_score_two,
        };

        let mut events = Vec::new();
        for (idx, record) in records {
            let idx = idx + 1;
            let record = record.map_err(|e| ScoringError::csv("reading event log", e))?;
            if record.len() < 4 {
                return Err(ScoringError::invalid_event_log(
                    idx,
                    format!("expected 4 fields, found {}", record.len()),
                ));
            }
            let timecode = Timecode::parse(&record[0]).ok_or_else(|| {
                ScoringError::invalid_event_log(idx, format!("bad timestamp {:?}", &record[0]))
            })?;
            let kind = ScoreKind::from_deltas(
                parse_count(&record[1], idx)?,
                parse_count(&record[2], idx)?,
                parse_count(&record[3], idx)?,
            )
            .ok_or_else(|| ScoringError::invalid_event_log(idx, "deltas are not one-hot"))?;
            events.push(ScoreEvent::new(timecode, kind));
        }

        Ok(Self { header, events })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())
            .map_err(|e| ScoringError::io("creating event log", e))?;
        self.write_csv(file)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file =
            File::open(path.as_ref()).map_err(|e| ScoringError::io("opening event log", e))?;
        Self::read_csv(file)
    }
}

fn parse_count(field: &str, record: usize) -> Result<u32> {
    field
        .trim()
        .parse()
        .map_err(|_| ScoringError::invalid_event_log(record, format!("bad number {field:?}")))
}
