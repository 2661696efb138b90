use chrono::NaiveDate;

use crate::calendar;
use crate::model::{AssignmentId, ResourceId};

#[derive(Debug)]
pub enum StoreError {
    InvalidRange { start: NaiveDate, end: NaiveDate },
    EmptyName,
    UnknownResource(ResourceId),
    Conflict {
        id: AssignmentId,
        name: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    NotFound(AssignmentId),
    LimitExceeded(&'static str),
    Persist(String),
}

impl StoreError {
    /// Short label for the rejection metric.
    pub fn reason(&self) -> &'static str {
        match self {
            StoreError::InvalidRange { .. } | StoreError::EmptyName => "validation",
            StoreError::UnknownResource(_) => "unknown_resource",
            StoreError::Conflict { .. } => "conflict",
            StoreError::NotFound(_) => "not_found",
            StoreError::LimitExceeded(_) => "limit",
            StoreError::Persist(_) => "persist",
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::InvalidRange { start, end } => write!(
                f,
                "end date {} must be after start date {}",
                calendar::to_iso(*end),
                calendar::to_iso(*start)
            ),
            StoreError::EmptyName => write!(f, "work order name is required"),
            StoreError::UnknownResource(id) => write!(f, "unknown work center: {id}"),
            StoreError::Conflict { name, start, end, .. } => write!(
                f,
                "this time period overlaps with \"{name}\" ({} - {})",
                calendar::to_iso(*start),
                calendar::to_iso(*end)
            ),
            StoreError::NotFound(id) => write!(f, "work order not found: {id}"),
            StoreError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            StoreError::Persist(e) => write!(f, "persist error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}
