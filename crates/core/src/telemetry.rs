//! Per-tick telemetry records, bounded retention, stable digests and JSONL export.

use std::collections::{BTreeMap, VecDeque};
use std::hash::Hasher;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

use crate::types::{GoalType, Retention, Tile};

/// One record per tick, immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Telemetry {
    pub tick: u64,
    pub position: Option<Tile>,
    pub current_goal: GoalType,
    pub action: String,
    pub quest_state: BTreeMap<String, String>,
    pub errors: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct TelemetryLog {
    records: VecDeque<Telemetry>,
    retention: Retention,
    evicted: u64,
}

impl TelemetryLog {
    pub fn new(retention: Retention) -> Self {
        Self { records: VecDeque::new(), retention, evicted: 0 }
    }

    pub fn push(&mut self, record: Telemetry) {
        if let Retention::Ring(capacity) = self.retention {
            if capacity == 0 {
                self.evicted += 1;
                return;
            }
            while self.records.len() >= capacity {
                self.records.pop_front();
                self.evicted += 1;
            }
        }
        self.records.push_back(record);
    }

    /// Hands every buffered record to the caller, oldest first.
    pub fn drain(&mut self) -> Vec<Telemetry> {
        self.records.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Telemetry> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&Telemetry> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records dropped by the ring buffer since creation.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn retention(&self) -> Retention {
        self.retention
    }
}

/// Stable hash over a telemetry sequence for cheap run-to-run comparison.
pub fn digest<'a>(records: impl IntoIterator<Item = &'a Telemetry>) -> u64 {
    let mut hasher = Xxh3::new();
    for record in records {
        hasher.write_u64(record.tick);
        match record.position {
            Some(tile) => {
                hasher.write_u8(1);
                hasher.write_i32(tile.x);
                hasher.write_i32(tile.y);
            }
            None => hasher.write_u8(0),
        }
        hasher.write_u8(record.current_goal as u8);
        write_str(&mut hasher, &record.action);
        for (quest, status) in &record.quest_state {
            write_str(&mut hasher, quest);
            write_str(&mut hasher, status);
        }
        hasher.write_usize(record.errors.len());
        for error in &record.errors {
            write_str(&mut hasher, error);
        }
    }
    hasher.finish()
}

fn write_str(hasher: &mut Xxh3, value: &str) {
    hasher.write_usize(value.len());
    hasher.write(value.as_bytes());
}

/// Writes one JSON object per line.
pub fn write_jsonl<'a, W: Write>(
    mut writer: W,
    records: impl IntoIterator<Item = &'a Telemetry>,
) -> io::Result<()> {
    for record in records {
        let line = serde_json::to_string(record).map_err(io::Error::other)?;
        writeln!(writer, "{line}")?;
    }
    writer.flush()
}
