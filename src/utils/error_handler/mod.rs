mod error_handler;

pub use error_handler::{find_cause, handle_global_error};
