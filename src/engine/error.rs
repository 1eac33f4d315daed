use ulid::Ulid;

#[derive(Debug)]
pub enum EngineError {
    /// A required field was empty.
    MissingField(&'static str),
    /// `start >= end` or otherwise malformed range.
    InvalidRange,
    /// A confirmed booking already overlaps the proposed range.
    SlotBooked(Ulid),
    /// A blocked availability slot overlaps the proposed range.
    SlotUnavailable(Ulid),
    NotFound(Ulid),
    /// Caller is neither an admin nor the booking's customer.
    Forbidden,
    /// The slot is owned by a booking; cancel the booking instead.
    SlotOwned(Ulid),
    LimitExceeded(&'static str),
    /// Store connectivity failure — internal, distinct from the domain kinds.
    WalError(String),
}

impl EngineError {
    /// True for the two conflict variants — the caller must pick a
    /// different range, never retry the same one.
    pub fn is_conflict(&self) -> bool {
        matches!(self, EngineError::SlotBooked(_) | EngineError::SlotUnavailable(_))
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::MissingField(field) => write!(f, "missing required field: {field}"),
            EngineError::InvalidRange => write!(f, "invalid start/end"),
            EngineError::SlotBooked(id) => {
                write!(f, "time slot already booked (booking {id})")
            }
            EngineError::SlotUnavailable(id) => {
                write!(f, "time slot unavailable (blocked by slot {id})")
            }
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::Forbidden => write!(f, "forbidden"),
            EngineError::SlotOwned(id) => {
                write!(f, "slot is owned by booking {id}: cancel the booking instead")
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::WalError(e) => write!(f, "WAL error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}
