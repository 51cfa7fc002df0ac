//! Terminal UI for the `search` command

pub mod search_display;
pub mod theme;
