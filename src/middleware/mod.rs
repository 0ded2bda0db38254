pub mod request_id;

pub use request_id::{http_request_span, propagate_request_id, RequestId, REQUEST_ID_HEADER};
