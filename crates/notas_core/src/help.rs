//! Static help content.
//!
//! Embedded at compile time and immutable for the process lifetime; the
//! presentation layer displays it verbatim.

/// Returns the help text shown on the help screen.
pub fn help_text() -> &'static str {
    include_str!("../assets/help.md")
}
