//! Game recorder - append-only log of positions with move times

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use hive_core::{BoardSnapshot, GameResult};

/// Who played, under what clock, and how it ended
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameHeader {
    pub white: String,
    pub black: String,
    pub time_control: String,
    pub result: Option<GameResult>,
    pub date: DateTime<Local>,
}

/// One logged position and the seconds spent reaching it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedPosition {
    pub snapshot: BoardSnapshot,
    pub elapsed_seconds: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub header: GameHeader,
    pub positions: Vec<RecordedPosition>,
}

/// Records one game as it is played
pub struct GameRecorder {
    record: GameRecord,
    last_logged: Option<Instant>,
}

impl GameRecorder {
    pub fn start(white: &str, black: &str, time_control: &str) -> Self {
        Self {
            record: GameRecord {
                header: GameHeader {
                    white: white.to_string(),
                    black: black.to_string(),
                    time_control: time_control.to_string(),
                    result: None,
                    date: Local::now(),
                },
                positions: Vec::new(),
            },
            last_logged: None,
        }
    }

    /// Append a position. The first one logged takes zero seconds.
    pub fn log_position(&mut self, snapshot: BoardSnapshot) {
        let now = Instant::now();
        let elapsed_seconds = self
            .last_logged
            .map_or(0.0, |last| now.duration_since(last).as_secs_f64());
        self.last_logged = Some(now);

        self.record.positions.push(RecordedPosition {
            snapshot,
            elapsed_seconds,
        });
    }

    pub fn log_result(&mut self, result: GameResult) {
        self.record.header.result = Some(result);
    }

    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    /// `hive_game_<white>_VS_<black>_<ddmmyyyy_HHMM>.json`
    pub fn filename(&self) -> String {
        let header = &self.record.header;
        format!(
            "hive_game_{}_VS_{}_{}.json",
            header.white,
            header.black,
            header.date.format("%d%m%Y_%H%M")
        )
    }

    /// Write the record as JSON into `dir`, returning the file path
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.filename());
        let json = serde_json::to_string_pretty(&self.record)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write game record: {}", path.display()))?;
        Ok(path)
    }
}
