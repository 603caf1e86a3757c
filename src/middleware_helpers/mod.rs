pub mod error_body;
pub mod request_id;

pub use error_body::json_error_body;
pub use request_id::{request_id_middleware, REQUEST_ID_HEADER};
