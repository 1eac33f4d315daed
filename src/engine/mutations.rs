use ulid::Ulid;

use crate::identity::CallerIdentity;
use crate::limits::*;
use crate::model::*;
use crate::observability;

use super::conflict::{booking_conflict, now_ms, slot_conflict, validate_range};
use super::{derived_slot, Engine, EngineError};

impl Engine {
    /// Propose a booking for `[start, end)`. On success the booking and its
    /// derived blocked slot are committed as one durable unit. Conflicts are
    /// terminal: the caller must submit a new, non-overlapping range.
    pub async fn propose_booking(
        &self,
        customer_name: &str,
        customer_email: &str,
        start: Ms,
        end: Ms,
        scope_id: Option<String>,
        deposit_amount: i64,
    ) -> Result<Booking, EngineError> {
        let customer_name = customer_name.trim();
        let customer_email = customer_email.trim();
        if customer_name.is_empty() {
            return Err(EngineError::MissingField("customer_name"));
        }
        if customer_email.is_empty() {
            return Err(EngineError::MissingField("customer_email"));
        }
        if customer_name.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("customer name too long"));
        }
        if customer_email.len() > MAX_EMAIL_LEN {
            return Err(EngineError::LimitExceeded("customer email too long"));
        }
        if let Some(ref scope) = scope_id
            && scope.len() > MAX_SCOPE_ID_LEN {
                return Err(EngineError::LimitExceeded("scope id too long"));
            }
        if deposit_amount < 0 {
            return Err(EngineError::LimitExceeded("deposit must be non-negative"));
        }
        let span = validate_range(start, end)?;
        if self.bookings.len() >= MAX_BOOKINGS || self.slots.len() >= MAX_SLOTS {
            return Err(EngineError::LimitExceeded("store full"));
        }

        // Serialize check-then-write per scope key.
        let lock = self.scope_lock(&scope_id);
        let _guard = lock.lock().await;

        // Bookings first, then blocked slots — the order is part of the API.
        if let Some(id) = booking_conflict(&self.bookings, &span, &scope_id) {
            metrics::counter!(observability::PROPOSAL_CONFLICTS_TOTAL).increment(1);
            return Err(EngineError::SlotBooked(id));
        }
        if let Some(id) = slot_conflict(&self.slots, &span, &scope_id) {
            metrics::counter!(observability::PROPOSAL_CONFLICTS_TOTAL).increment(1);
            return Err(EngineError::SlotUnavailable(id));
        }

        let booking = Booking {
            id: Ulid::new(),
            customer_name: customer_name.to_string(),
            customer_email: customer_email.to_string(),
            scope_id: scope_id.clone(),
            span,
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::NotRequested,
            deposit_amount,
            created_at: now_ms(),
        };
        let slot = derived_slot(&booking);

        self.commit(
            &scope_id,
            &[
                Event::BookingCreated {
                    booking: booking.clone(),
                },
                Event::SlotCreated { slot },
            ],
        )
        .await?;

        metrics::counter!(observability::PROPOSALS_ACCEPTED_TOTAL).increment(1);
        tracing::info!("booking {} confirmed for [{start}, {end})", booking.id);
        Ok(booking)
    }

    /// Cancel a booking. Permitted for admins and for the booking's own
    /// customer (by email); anonymous callers are never authorized.
    /// Re-cancelling is a silent no-op, but the derived-slot cascade always
    /// runs so no orphaned block can survive.
    pub async fn cancel_booking(
        &self,
        id: Ulid,
        caller: Option<&CallerIdentity>,
    ) -> Result<(), EngineError> {
        let booking = self
            .bookings
            .get(&id)
            .map(|b| b.clone())
            .ok_or(EngineError::NotFound(id))?;

        let authorized = caller
            .is_some_and(|c| c.is_admin() || c.email == booking.customer_email);
        if !authorized {
            return Err(EngineError::Forbidden);
        }

        let mut events = Vec::new();
        if booking.status == BookingStatus::Confirmed {
            events.push(Event::BookingCancelled { id });
        }
        let mut owned: Vec<Ulid> = self
            .slots
            .iter()
            .filter(|s| s.owner_booking_id == Some(id))
            .map(|s| s.id)
            .collect();
        owned.sort();
        events.extend(owned.into_iter().map(|id| Event::SlotDeleted { id }));

        if events.is_empty() {
            return Ok(()); // already cancelled, nothing left to cascade
        }
        self.commit(&booking.scope_id, &events).await?;

        metrics::counter!(observability::CANCELLATIONS_TOTAL).increment(1);
        tracing::info!("booking {id} cancelled");
        Ok(())
    }

    /// Create a manual availability slot. Deliberately no conflict check:
    /// admins may stack overlapping safety margins; only `propose_booking`
    /// rejects overlaps. Admin gating happens at the caller's boundary.
    pub async fn create_slot(
        &self,
        start: Ms,
        end: Ms,
        kind: SlotKind,
        note: Option<String>,
        scope_id: Option<String>,
    ) -> Result<AvailabilitySlot, EngineError> {
        if let Some(ref n) = note
            && n.len() > MAX_NOTE_LEN {
                return Err(EngineError::LimitExceeded("note too long"));
            }
        if let Some(ref scope) = scope_id
            && scope.len() > MAX_SCOPE_ID_LEN {
                return Err(EngineError::LimitExceeded("scope id too long"));
            }
        let span = validate_range(start, end)?;
        if self.slots.len() >= MAX_SLOTS {
            return Err(EngineError::LimitExceeded("store full"));
        }

        let slot = AvailabilitySlot {
            id: Ulid::new(),
            span,
            kind,
            note,
            owner_booking_id: None,
            scope_id: scope_id.clone(),
            created_at: now_ms(),
        };
        self.commit(&scope_id, &[Event::SlotCreated { slot: slot.clone() }])
            .await?;

        metrics::counter!(observability::SLOTS_CREATED_TOTAL).increment(1);
        Ok(slot)
    }

    /// Delete a manual slot by id. A slot owned by a booking is refused:
    /// cancellation is the only path that removes a derived block, so the
    /// calendar can never desynchronize from booking status.
    pub async fn delete_slot(&self, id: Ulid) -> Result<(), EngineError> {
        let slot = self
            .slots
            .get(&id)
            .map(|s| s.clone())
            .ok_or(EngineError::NotFound(id))?;
        if let Some(owner) = slot.owner_booking_id {
            return Err(EngineError::SlotOwned(owner));
        }

        self.commit(&slot.scope_id, &[Event::SlotDeleted { id }]).await
    }

    /// Record the payment processor's reported state on a booking. The
    /// deposit flow itself is out of band, keyed by booking id.
    pub async fn record_payment_status(
        &self,
        id: Ulid,
        payment_status: PaymentStatus,
    ) -> Result<(), EngineError> {
        let scope = self
            .bookings
            .get(&id)
            .map(|b| b.scope_id.clone())
            .ok_or(EngineError::NotFound(id))?;

        self.commit(&scope, &[Event::PaymentRecorded { id, payment_status }])
            .await
    }

    /// Rewrite the WAL with only the events needed to recreate current state.
    pub async fn compact_wal(&self) -> Result<(), EngineError> {
        let mut bookings: Vec<Booking> = self.bookings.iter().map(|b| b.clone()).collect();
        bookings.sort_by_key(|b| b.id);
        let mut slots: Vec<AvailabilitySlot> = self.slots.iter().map(|s| s.clone()).collect();
        slots.sort_by_key(|s| s.id);

        let events: Vec<Event> = bookings
            .into_iter()
            .map(|booking| Event::BookingCreated { booking })
            .chain(slots.into_iter().map(|slot| Event::SlotCreated { slot }))
            .collect();

        let mut wal = self.wal.lock().await;
        wal.compact(&events)
            .map_err(|e| EngineError::WalError(e.to_string()))
    }
}
