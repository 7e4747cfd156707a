pub mod jwt;
pub mod numeric;
pub mod parameter_error_handler;

pub use numeric::round2;
pub use parameter_error_handler::{json_error_handler, path_error_handler, query_error_handler};
