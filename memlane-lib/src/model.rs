//! The memories dataset shown by the table.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::rows::{SortValue, TableRow};
use crate::state::FilterKey;

/// Workflow status of a memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryStatus {
    Todo,
    InProgress,
    Done,
    Canceled,
}

impl MemoryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for MemoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority of a memory, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl MemoryPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    /// Sort rank; `priority` sorts by urgency, not by name.
    pub fn rank(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for MemoryPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the memories table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub id: String,
    pub task: String,
    pub title: String,
    pub status: MemoryStatus,
    pub priority: MemoryPriority,
    pub est_hours: f64,
    pub created_at: NaiveDate,
    #[serde(rename = "type")]
    pub kind: String,
    pub reviewer: String,
}

impl TableRow for Memory {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn filter_value(&self, key: FilterKey) -> Option<&str> {
        Some(match key {
            FilterKey::Title => self.title.as_str(),
            FilterKey::Status => self.status.as_str(),
            FilterKey::Priority => self.priority.as_str(),
            FilterKey::Type => self.kind.as_str(),
            FilterKey::Reviewer => self.reviewer.as_str(),
        })
    }

    fn sort_value(&self, column: &str) -> Option<SortValue<'_>> {
        let value = match column {
            "id" => SortValue::Text(&self.id),
            "task" => SortValue::Text(&self.task),
            "title" => SortValue::Text(&self.title),
            "status" => SortValue::Text(self.status.as_str()),
            "priority" => SortValue::Number(f64::from(self.priority.rank())),
            "estHours" => SortValue::Number(self.est_hours),
            "createdAt" => SortValue::Date(self.created_at),
            "type" => SortValue::Text(&self.kind),
            "reviewer" => SortValue::Text(&self.reviewer),
            _ => return None,
        };
        Some(value)
    }
}

/// Parses a JSON array of memories. Ids must be unique.
pub fn load_memories(json: &str) -> Result<Vec<Memory>, DataError> {
    let memories: Vec<Memory> = serde_json::from_str(json)?;

    let mut seen = HashSet::with_capacity(memories.len());
    for memory in &memories {
        if !seen.insert(memory.id.as_str()) {
            return Err(DataError::DuplicateId(memory.id.clone()));
        }
    }

    log::debug!("loaded {} memories", memories.len());
    Ok(memories)
}

/// Reads and parses a memories file.
pub fn load_memories_from_path(path: impl AsRef<Path>) -> Result<Vec<Memory>, DataError> {
    let json = std::fs::read_to_string(path)?;
    load_memories(&json)
}
