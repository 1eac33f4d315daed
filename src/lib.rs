pub mod compactor;
pub mod directory;
pub mod engine;
pub mod identity;
pub mod limits;
pub mod model;
pub mod notify;
pub mod observability;
pub mod wal;

pub use engine::{Engine, EngineError};
pub use model::{Booking, CalendarEvent, Span};
