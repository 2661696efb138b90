mod error;
mod overlap;
pub mod seed;

pub use error::StoreError;
pub use overlap::{find_conflict, validate_span};

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::kv::KvStore;
use crate::limits::*;
use crate::model::*;

pub const RESOURCES_KEY: &str = "resources";
pub const ASSIGNMENTS_KEY: &str = "assignments";

/// Authoritative resources and assignments, mirrored to a key-value store.
///
/// Every mutation validates first, writes the whole new collection second,
/// and only then changes memory. A rejected or failed call leaves both
/// copies as they were.
pub struct AssignmentStore<K: KvStore> {
    kv: K,
    resources: Vec<Resource>,
    assignments: Vec<Assignment>,
    rule: BoundaryRule,
}

impl<K: KvStore> AssignmentStore<K> {
    /// Restore both collections from `kv`. If either key is missing or does
    /// not parse, or the records break an invariant, both are replaced by
    /// the seed dataset relative to `today`, which is written back
    /// immediately.
    pub fn open(mut kv: K, today: NaiveDate, rule: BoundaryRule) -> Result<Self, StoreError> {
        let resources = load::<Vec<Resource>, _>(&kv, RESOURCES_KEY)?;
        let assignments = load::<Vec<Assignment>, _>(&kv, ASSIGNMENTS_KEY)?;

        let restored = match (resources, assignments) {
            (Some(resources), Some(assignments)) => match check_restored(&resources, &assignments) {
                Ok(()) => Some((resources, assignments)),
                Err(problem) => {
                    warn!("discarding inconsistent stored board: {problem}");
                    None
                }
            },
            _ => None,
        };

        let (resources, assignments) = match restored {
            Some((resources, assignments)) => {
                info!(
                    resources = resources.len(),
                    assignments = assignments.len(),
                    "restored board from store"
                );
                (resources, assignments)
            }
            None => {
                let resources = seed::resources();
                let assignments = seed::assignments(today);
                persist(&mut kv, RESOURCES_KEY, &resources)?;
                persist(&mut kv, ASSIGNMENTS_KEY, &assignments)?;
                metrics::counter!(crate::observability::STORE_RESEEDS_TOTAL).increment(1);
                info!(%today, "seeded board with demo data");
                (resources, assignments)
            }
        };

        Ok(Self {
            kv,
            resources,
            assignments,
            rule,
        })
    }

    pub fn rule(&self) -> BoundaryRule {
        self.rule
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    // ── Queries ──────────────────────────────────────────────

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn resource(&self, id: &ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|r| &r.id == id)
    }

    pub fn assignment(&self, id: &AssignmentId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| &a.id == id)
    }

    /// Assignments on one resource, in insertion order.
    pub fn list_by_resource(&self, resource_id: &ResourceId) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| &a.data.resource_id == resource_id)
            .collect()
    }

    /// Everything `create`/`update` would check, without mutating. `exclude`
    /// is the record being edited.
    pub fn check_overlap(&self, data: &AssignmentData, exclude: Option<&AssignmentId>) -> Result<(), StoreError> {
        if data.name.trim().is_empty() {
            return Err(StoreError::EmptyName);
        }
        if data.name.len() > MAX_NAME_LEN {
            return Err(StoreError::LimitExceeded("work order name too long"));
        }
        let span = data.span();
        validate_span(&span)?;
        if self.resource(&data.resource_id).is_none() {
            return Err(StoreError::UnknownResource(data.resource_id.clone()));
        }
        if let Some(existing) = find_conflict(&self.assignments, &data.resource_id, &span, exclude, self.rule) {
            return Err(StoreError::Conflict {
                id: existing.id.clone(),
                name: existing.data.name.clone(),
                start: existing.data.start_date,
                end: existing.data.end_date,
            });
        }
        Ok(())
    }

    // ── Mutations ────────────────────────────────────────────

    pub fn create(&mut self, data: AssignmentData) -> Result<AssignmentId, StoreError> {
        if self.assignments.len() >= MAX_ASSIGNMENTS {
            return Err(rejected(StoreError::LimitExceeded("too many work orders")));
        }
        self.check_overlap(&data, None).map_err(rejected)?;

        let record = Assignment {
            id: AssignmentId::generate(),
            data,
        };
        let next: Vec<&Assignment> = self.assignments.iter().chain([&record]).collect();
        persist(&mut self.kv, ASSIGNMENTS_KEY, &next)?;

        let id = record.id.clone();
        debug!(%id, resource = %record.data.resource_id, span = %record.span(), "work order created");
        self.assignments.push(record);
        metrics::counter!(crate::observability::ASSIGNMENTS_CREATED_TOTAL).increment(1);
        Ok(id)
    }

    /// Replace `id`'s data wholesale. The record's own current range is
    /// ignored by the overlap check.
    pub fn update(&mut self, id: &AssignmentId, data: AssignmentData) -> Result<(), StoreError> {
        let pos = self
            .assignments
            .iter()
            .position(|a| &a.id == id)
            .ok_or_else(|| rejected(StoreError::NotFound(id.clone())))?;
        self.check_overlap(&data, Some(id)).map_err(rejected)?;

        let record = Assignment { id: id.clone(), data };
        let next: Vec<&Assignment> = self
            .assignments
            .iter()
            .enumerate()
            .map(|(i, a)| if i == pos { &record } else { a })
            .collect();
        persist(&mut self.kv, ASSIGNMENTS_KEY, &next)?;

        debug!(%id, resource = %record.data.resource_id, span = %record.span(), "work order updated");
        self.assignments[pos] = record;
        metrics::counter!(crate::observability::ASSIGNMENTS_UPDATED_TOTAL).increment(1);
        Ok(())
    }

    /// Remove `id` if present and persist either way. Returns whether a
    /// record was removed.
    pub fn delete(&mut self, id: &AssignmentId) -> Result<bool, StoreError> {
        let pos = self.assignments.iter().position(|a| &a.id == id);
        let next: Vec<&Assignment> = self.assignments.iter().filter(|a| &a.id != id).collect();
        persist(&mut self.kv, ASSIGNMENTS_KEY, &next)?;

        match pos {
            Some(pos) => {
                self.assignments.remove(pos);
                debug!(%id, "work order deleted");
                metrics::counter!(crate::observability::ASSIGNMENTS_DELETED_TOTAL).increment(1);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn rejected(e: StoreError) -> StoreError {
    metrics::counter!(crate::observability::ASSIGNMENTS_REJECTED_TOTAL, "reason" => e.reason()).increment(1);
    if let StoreError::Conflict { id, .. } = &e {
        warn!(conflicting = %id, "work order rejected: {e}");
    } else {
        debug!("work order rejected: {e}");
    }
    e
}

/// Parsed state must satisfy the same invariants mutations enforce: unique
/// ids, valid ranges, and no dangling resource references.
fn check_restored(resources: &[Resource], assignments: &[Assignment]) -> Result<(), String> {
    let mut resource_ids = HashSet::new();
    for r in resources {
        if !resource_ids.insert(&r.id) {
            return Err(format!("duplicate work center id {}", r.id));
        }
    }
    let mut ids = HashSet::new();
    for a in assignments {
        if !ids.insert(&a.id) {
            return Err(format!("duplicate work order id {}", a.id));
        }
        validate_span(&a.span()).map_err(|e| format!("work order {}: {e}", a.id))?;
        if !resource_ids.contains(&a.data.resource_id) {
            return Err(format!("work order {} references unknown work center {}", a.id, a.data.resource_id));
        }
    }
    Ok(())
}

/// Read and parse one key. Missing or unparseable values are `None`.
fn load<T: DeserializeOwned, K: KvStore>(kv: &K, key: &str) -> Result<Option<T>, StoreError> {
    let Some(raw) = kv.get(key).map_err(|e| StoreError::Persist(e.to_string()))? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key, "discarding unreadable stored value: {e}");
            Ok(None)
        }
    }
}

fn persist<T: Serialize + ?Sized, K: KvStore>(kv: &mut K, key: &str, value: &T) -> Result<(), StoreError> {
    let start = std::time::Instant::now();
    let json = serde_json::to_string(value).map_err(|e| StoreError::Persist(e.to_string()))?;
    kv.set(key, &json).map_err(|e| StoreError::Persist(e.to_string()))?;
    metrics::histogram!(crate::observability::PERSIST_DURATION_SECONDS).record(start.elapsed().as_secs_f64());
    Ok(())
}
