use chrono::NaiveDate;

use crate::calendar::add_days;
use crate::model::*;

const WORK_CENTERS: [(&str, &str); 5] = [
    ("wc-001", "Genesis Hardware"),
    ("wc-002", "Rodriques Electrics"),
    ("wc-003", "Konsulting Inc"),
    ("wc-004", "McMarrow Distribution"),
    ("wc-005", "Spartan Manufacturing"),
];

/// (id, work center, name, status, start offset, end offset) in days from today.
const WORK_ORDERS: [(&str, &str, &str, Status, i64, i64); 8] = [
    ("wo-001", "wc-001", "Consulting Inc", Status::Complete, -45, -15),
    ("wo-002", "wc-002", "Rodriques Electrics", Status::InProgress, -30, 15),
    ("wo-003", "wc-003", "Konsulting Inc", Status::InProgress, -20, 25),
    ("wo-004", "wc-003", "Compleks Systems", Status::InProgress, 30, 75),
    ("wo-005", "wc-004", "McMarrow Distribution", Status::Blocked, -10, 45),
    ("wo-006", "wc-005", "Assembly Line Alpha", Status::Open, 5, 20),
    ("wo-007", "wc-005", "Quality Check Batch", Status::Complete, -60, -40),
    ("wo-008", "wc-001", "Maintenance Schedule", Status::Open, 10, 25),
];

pub fn resources() -> Vec<Resource> {
    WORK_CENTERS
        .iter()
        .map(|(id, name)| Resource {
            id: ResourceId::from(*id),
            name: (*name).to_string(),
        })
        .collect()
}

/// Demo work orders placed relative to `today`.
pub fn assignments(today: NaiveDate) -> Vec<Assignment> {
    WORK_ORDERS
        .iter()
        .map(|(id, resource, name, status, start, end)| Assignment {
            id: AssignmentId::from(*id),
            data: AssignmentData {
                name: (*name).to_string(),
                resource_id: ResourceId::from(*resource),
                status: *status,
                start_date: add_days(today, *start),
                end_date: add_days(today, *end),
            },
        })
        .collect()
}
