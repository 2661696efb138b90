use crate::model::*;

use super::StoreError;

/// `end > start`, strictly. Must hold before any overlap check.
pub fn validate_span(span: &DateSpan) -> Result<(), StoreError> {
    if span.end <= span.start {
        return Err(StoreError::InvalidRange {
            start: span.start,
            end: span.end,
        });
    }
    Ok(())
}

/// First assignment on `resource_id` whose range overlaps `span` under
/// `rule`, in iteration order. `exclude` skips the record being edited.
pub fn find_conflict<'a, I>(
    assignments: I,
    resource_id: &ResourceId,
    span: &DateSpan,
    exclude: Option<&AssignmentId>,
    rule: BoundaryRule,
) -> Option<&'a Assignment>
where
    I: IntoIterator<Item = &'a Assignment>,
{
    assignments
        .into_iter()
        .filter(|a| &a.data.resource_id == resource_id)
        .filter(|a| exclude != Some(&a.id))
        .find(|a| span.overlaps(&a.span(), rule))
}
