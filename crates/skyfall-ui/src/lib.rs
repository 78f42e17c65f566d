//! Terminal presentation for the SkyFall host.
//!
//! [`canvas::TextCanvas`] is the cell surface features draw on through the
//! core `Canvas` contract; the remaining modules are ratatui widgets for the
//! inventory screen, the HUD shell and the drop-down console. State lives
//! with the host, this crate only draws it.

pub mod canvas;
pub mod console;
pub mod inventory;
pub mod layout;
pub mod shell;
