mod response_handler;

pub use response_handler::{response_wrapper, HandlerResponse, ResponseFormat};
