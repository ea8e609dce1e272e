pub mod scan_handler;

pub use scan_handler::{health, relay_message, room_state, scan_callout, start_round};
