use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds — the only time type.
pub type Ms = i64;

/// Half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    /// Two ranges overlap iff `a.start < b.end && b.start < a.end`.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    Available,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

/// Last state reported by the payment processor. Recorded verbatim — the
/// engine never drives transitions between these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    NotRequested,
    RequiresPaymentMethod,
    Authorized,
    Captured,
    Refunded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    pub customer_name: String,
    pub customer_email: String,
    pub scope_id: Option<String>,
    pub span: Span,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    /// Deposit in minor currency units. Zero means no deposit required.
    pub deposit_amount: i64,
    pub created_at: Ms,
}

/// A calendar slot. Created explicitly by an admin, or derived from a
/// confirmed booking (`owner_booking_id` set). A derived slot is always
/// `Blocked` and is removed in the same unit as its booking's cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub id: Ulid,
    pub span: Span,
    pub kind: SlotKind,
    pub note: Option<String>,
    pub owner_booking_id: Option<Ulid>,
    pub scope_id: Option<String>,
    pub created_at: Ms,
}

/// The event types — flat, no nesting. This is the WAL record format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    BookingCreated { booking: Booking },
    BookingCancelled { id: Ulid },
    PaymentRecorded { id: Ulid, payment_status: PaymentStatus },
    SlotCreated { slot: AvailabilitySlot },
    SlotDeleted { id: Ulid },
}

// ── Calendar projection ──────────────────────────────────────────

/// Listing-directory metadata attached to calendar events for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub name: String,
    pub price_per_night: i64,
    pub rules: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CalendarEventKind {
    Booking {
        booking_id: Ulid,
    },
    Availability {
        slot_id: Ulid,
        slot_kind: SlotKind,
        owner_booking_id: Option<Ulid>,
    },
}

/// One display-ready calendar entry. Retains the source record's id so a
/// caller can issue the matching cancel/delete later.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub span: Span,
    pub kind: CalendarEventKind,
    pub scope_id: Option<String>,
    pub listing: Option<Listing>,
}
