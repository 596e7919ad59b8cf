mod messages;

pub use messages::{ClientMessage, DEFAULT_PORT, MAX_FETCH_LIMIT, ServerMessage};
