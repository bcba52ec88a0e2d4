//! Formatting and pagination helpers shared by the dashboard views.

pub mod format;
pub mod pager;

pub use format::{
    contains_ignore_case, format_date, format_optional, format_price, format_time,
    truncate_string,
};
pub use pager::{Pager, APPOINTMENT_PAGE_SIZE, DEFAULT_PAGE_SIZE};
