//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Main frame rendering, layout and overlays (login, forms, confirmations)
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling
//! - `tabs`: Per-resource tables (users, cities, destinations, appointments)

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
