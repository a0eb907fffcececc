//! Small helpers shared by services.

pub mod calendar;
pub mod slug;

pub use calendar::{month_key, month_start, trailing_months};
pub use slug::{ensure_slug, ensure_slug_format, order_number};
