use dashmap::DashMap;
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;

use super::EngineError;

pub(crate) fn now_ms() -> Ms {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as Ms
}

/// Validate a proposed `[start, end)` range and build the Span.
pub(super) fn validate_range(start: Ms, end: Ms) -> Result<Span, EngineError> {
    if start >= end {
        return Err(EngineError::InvalidRange);
    }
    if start < MIN_VALID_TIMESTAMP_MS || end > MAX_VALID_TIMESTAMP_MS {
        return Err(EngineError::LimitExceeded("timestamp out of range"));
    }
    if end - start > MAX_SPAN_DURATION_MS {
        return Err(EngineError::LimitExceeded("range too wide"));
    }
    Ok(Span::new(start, end))
}

/// Exact-match scope rule used for conflict checks: an absent scope is its
/// own value, never a wildcard over scoped records.
pub(super) fn same_scope(a: &Option<String>, b: &Option<String>) -> bool {
    a == b
}

/// Earliest-created confirmed booking overlapping `span` in the same scope.
/// Ulid ids are time-ordered, so min-by-id is creation order — the tie-break
/// is deterministic and total.
pub(super) fn booking_conflict(
    bookings: &DashMap<Ulid, Booking>,
    span: &Span,
    scope_id: &Option<String>,
) -> Option<Ulid> {
    bookings
        .iter()
        .filter(|b| {
            b.status == BookingStatus::Confirmed
                && same_scope(&b.scope_id, scope_id)
                && b.span.overlaps(span)
        })
        .map(|b| b.id)
        .min()
}

/// Earliest-created blocked slot overlapping `span` in the same scope.
pub(super) fn slot_conflict(
    slots: &DashMap<Ulid, AvailabilitySlot>,
    span: &Span,
    scope_id: &Option<String>,
) -> Option<Ulid> {
    slots
        .iter()
        .filter(|s| {
            s.kind == SlotKind::Blocked
                && same_scope(&s.scope_id, scope_id)
                && s.span.overlaps(span)
        })
        .map(|s| s.id)
        .min()
}
