use crate::model::Ms;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_EMAIL_LEN: usize = 320;
pub const MAX_NOTE_LEN: usize = 500;
pub const MAX_SCOPE_ID_LEN: usize = 128;

pub const MIN_VALID_TIMESTAMP_MS: Ms = 0;
/// Largest representable JS `Date` in ms — the original store's sentinel.
pub const MAX_VALID_TIMESTAMP_MS: Ms = 8_640_000_000_000_000;

/// A single booking or block may cover at most one year.
pub const MAX_SPAN_DURATION_MS: Ms = 366 * 24 * 3_600_000;

/// Calendar projections are capped at a five-year window.
pub const MAX_QUERY_WINDOW_MS: Ms = 5 * 366 * 24 * 3_600_000;

pub const MAX_BOOKINGS: usize = 100_000;
pub const MAX_SLOTS: usize = 100_000;

pub const MAX_LIST_BOOKINGS: usize = 500;
pub const MAX_LIST_SLOTS: usize = 1000;
