pub mod error;
pub mod middleware;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use middleware::log_request_errors;
pub use routes::{create_gif, index};
