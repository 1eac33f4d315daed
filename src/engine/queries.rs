use std::collections::HashMap;

use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::observability;

use super::{Engine, EngineError};

/// Superset scope rule used for reads: an absent query scope means "all
/// scopes" — unlike the exact-match rule in conflict checking. Listing is a
/// superset view; conflict checking is a same-resource guarantee.
fn scope_visible(record_scope: &Option<String>, query_scope: Option<&str>) -> bool {
    query_scope.is_none_or(|s| record_scope.as_deref() == Some(s))
}

impl Engine {
    pub fn get_booking(&self, id: Ulid) -> Option<Booking> {
        self.bookings.get(&id).map(|b| b.clone())
    }

    /// Bookings visible to a caller, ascending by start. Any status.
    pub fn list_bookings(&self, scope: Option<&str>) -> Vec<Booking> {
        let mut out: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| scope_visible(&b.scope_id, scope))
            .map(|b| b.clone())
            .collect();
        out.sort_by_key(|b| (b.span.start, b.id));
        out.truncate(MAX_LIST_BOOKINGS);
        out
    }

    /// Availability slots, optionally restricted to a window, ascending by
    /// start.
    pub fn list_slots(&self, window: Option<Span>, scope: Option<&str>) -> Vec<AvailabilitySlot> {
        let mut out: Vec<AvailabilitySlot> = self
            .slots
            .iter()
            .filter(|s| scope_visible(&s.scope_id, scope))
            .filter(|s| window.is_none_or(|w| s.span.overlaps(&w)))
            .map(|s| s.clone())
            .collect();
        out.sort_by_key(|s| (s.span.start, s.id));
        out.truncate(MAX_LIST_SLOTS);
        out
    }

    /// Project the merged calendar view for `[from, to)`: one event per
    /// confirmed booking and one per slot overlapping the window, enriched
    /// with listing metadata, ascending by start with bookings before slots
    /// on ties. Read-only and idempotent.
    pub async fn project_events(
        &self,
        from: Ms,
        to: Ms,
        scope: Option<&str>,
    ) -> Result<Vec<CalendarEvent>, EngineError> {
        if from >= to {
            return Err(EngineError::InvalidRange);
        }
        if from < MIN_VALID_TIMESTAMP_MS || to > MAX_VALID_TIMESTAMP_MS {
            return Err(EngineError::LimitExceeded("timestamp out of range"));
        }
        if to - from > MAX_QUERY_WINDOW_MS {
            return Err(EngineError::LimitExceeded("query window too wide"));
        }
        let window = Span::new(from, to);

        let mut bookings: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| {
                b.status == BookingStatus::Confirmed
                    && b.span.overlaps(&window)
                    && scope_visible(&b.scope_id, scope)
            })
            .map(|b| b.clone())
            .collect();
        bookings.sort_by_key(|b| (b.span.start, b.id));

        let mut slots: Vec<AvailabilitySlot> = self
            .slots
            .iter()
            .filter(|s| s.span.overlaps(&window) && scope_visible(&s.scope_id, scope))
            .map(|s| s.clone())
            .collect();
        slots.sort_by_key(|s| (s.span.start, s.id));

        // One directory lookup per distinct scope; failures degrade to None.
        let mut listings: HashMap<String, Option<Listing>> = HashMap::new();
        for scope_id in bookings
            .iter()
            .map(|b| &b.scope_id)
            .chain(slots.iter().map(|s| &s.scope_id))
            .flatten()
        {
            if !listings.contains_key(scope_id) {
                let listing = self.directory.get_listing(scope_id).await;
                listings.insert(scope_id.clone(), listing);
            }
        }
        let resolve = |scope_id: &Option<String>| {
            scope_id
                .as_ref()
                .and_then(|s| listings.get(s).cloned().flatten())
        };

        let mut events: Vec<CalendarEvent> = Vec::with_capacity(bookings.len() + slots.len());
        for b in &bookings {
            events.push(CalendarEvent {
                id: format!("booking_{}", b.id),
                title: format!("Booking: {}", b.customer_name),
                span: b.span,
                kind: CalendarEventKind::Booking { booking_id: b.id },
                scope_id: b.scope_id.clone(),
                listing: resolve(&b.scope_id),
            });
        }
        for s in &slots {
            let title = s.note.clone().unwrap_or_else(|| {
                match s.kind {
                    SlotKind::Blocked => "Blocked",
                    SlotKind::Available => "Available",
                }
                .to_string()
            });
            events.push(CalendarEvent {
                id: format!("slot_{}", s.id),
                title,
                span: s.span,
                kind: CalendarEventKind::Availability {
                    slot_id: s.id,
                    slot_kind: s.kind,
                    owner_booking_id: s.owner_booking_id,
                },
                scope_id: s.scope_id.clone(),
                listing: resolve(&s.scope_id),
            });
        }
        // Stable: keeps bookings before slots on equal starts.
        events.sort_by_key(|e| e.span.start);

        metrics::counter!(observability::PROJECTIONS_TOTAL).increment(1);
        Ok(events)
    }
}
