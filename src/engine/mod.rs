mod conflict;
mod error;
mod mutations;
mod queries;

pub use error::EngineError;

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use tokio::sync::Mutex;
use ulid::Ulid;

use crate::directory::ListingDirectory;
use crate::model::*;
use crate::notify::{NotifyHub, ScopeKey};
use crate::wal::Wal;

use conflict::now_ms;

/// Booking lifecycle manager plus both stores. All mutations are WAL-first:
/// events are durably appended, then applied to the in-memory state, then
/// broadcast to subscribers.
pub struct Engine {
    pub(super) bookings: DashMap<Ulid, Booking>,
    pub(super) slots: DashMap<Ulid, AvailabilitySlot>,
    /// Single-writer queue per scope key: a proposal holds its scope's lock
    /// across the conflict check and the dual write, so two overlapping
    /// proposals on the same scope can never both pass the check.
    scope_locks: DashMap<ScopeKey, Arc<Mutex<()>>>,
    wal: Mutex<Wal>,
    pub notify: Arc<NotifyHub>,
    pub(super) directory: Arc<dyn ListingDirectory>,
}

impl Engine {
    pub fn new(
        wal_path: &Path,
        notify: Arc<NotifyHub>,
        directory: Arc<dyn ListingDirectory>,
    ) -> io::Result<Self> {
        let events = Wal::replay(wal_path)?;
        let wal = Wal::open(wal_path)?;

        let engine = Self {
            bookings: DashMap::new(),
            slots: DashMap::new(),
            scope_locks: DashMap::new(),
            wal: Mutex::new(wal),
            notify,
            directory,
        };

        for event in &events {
            engine.apply(event);
        }
        engine.repair_derived_slots();
        engine.update_gauges();

        Ok(engine)
    }

    /// Apply an event to the in-memory state. Used by replay and by commits.
    fn apply(&self, event: &Event) {
        match event {
            Event::BookingCreated { booking } => {
                self.bookings.insert(booking.id, booking.clone());
            }
            Event::BookingCancelled { id } => {
                if let Some(mut booking) = self.bookings.get_mut(id) {
                    booking.status = BookingStatus::Cancelled;
                }
            }
            Event::PaymentRecorded { id, payment_status } => {
                if let Some(mut booking) = self.bookings.get_mut(id) {
                    booking.payment_status = *payment_status;
                }
            }
            Event::SlotCreated { slot } => {
                self.slots.insert(slot.id, slot.clone());
            }
            Event::SlotDeleted { id } => {
                self.slots.remove(id);
            }
        }
    }

    /// Restore the booking/derived-slot pairing after replay. A crash torn
    /// between the two records of a pair can leave either half dangling:
    /// a slot owned by a cancelled or missing booking is dropped, and a
    /// confirmed booking with no surviving derived block gets one back.
    fn repair_derived_slots(&self) {
        let orphans: Vec<Ulid> = self
            .slots
            .iter()
            .filter(|s| {
                s.owner_booking_id.is_some_and(|owner| {
                    !self
                        .bookings
                        .get(&owner)
                        .is_some_and(|b| b.status == BookingStatus::Confirmed)
                })
            })
            .map(|s| s.id)
            .collect();
        for id in orphans {
            tracing::warn!("replay repair: dropping orphaned derived slot {id}");
            self.slots.remove(&id);
        }

        let covered: std::collections::HashSet<Ulid> = self
            .slots
            .iter()
            .filter_map(|s| s.owner_booking_id)
            .collect();
        let missing: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Confirmed && !covered.contains(&b.id))
            .map(|b| b.clone())
            .collect();
        for booking in missing {
            tracing::warn!(
                "replay repair: re-deriving blocked slot for booking {}",
                booking.id
            );
            let slot = derived_slot(&booking);
            self.slots.insert(slot.id, slot);
        }
    }

    /// Durably append `events` (single fsync), then apply and broadcast them.
    pub(super) async fn commit(
        &self,
        scope: &ScopeKey,
        events: &[Event],
    ) -> Result<(), EngineError> {
        let flush_start = Instant::now();
        {
            let mut wal = self.wal.lock().await;
            wal.append_all(events)
                .map_err(|e| EngineError::WalError(e.to_string()))?;
        }
        metrics::histogram!(crate::observability::WAL_FLUSH_DURATION_SECONDS)
            .record(flush_start.elapsed().as_secs_f64());

        for event in events {
            self.apply(event);
            self.notify.send(scope, event);
        }
        self.update_gauges();
        Ok(())
    }

    /// The scope's proposal lock, created on first use.
    pub(super) fn scope_lock(&self, scope: &ScopeKey) -> Arc<Mutex<()>> {
        self.scope_locks
            .entry(scope.clone())
            .or_default()
            .clone()
    }

    pub(super) fn update_gauges(&self) {
        metrics::gauge!(crate::observability::BOOKINGS_LIVE).set(self.bookings.len() as f64);
        metrics::gauge!(crate::observability::SLOTS_LIVE).set(self.slots.len() as f64);
    }

    pub async fn wal_appends_since_compact(&self) -> u64 {
        self.wal.lock().await.appends_since_compact()
    }
}

/// The blocked slot mirroring a confirmed booking.
pub(super) fn derived_slot(booking: &Booking) -> AvailabilitySlot {
    AvailabilitySlot {
        id: Ulid::new(),
        span: booking.span,
        kind: SlotKind::Blocked,
        note: Some("Booked".into()),
        owner_booking_id: Some(booking.id),
        scope_id: booking.scope_id.clone(),
        created_at: now_ms(),
    }
}
