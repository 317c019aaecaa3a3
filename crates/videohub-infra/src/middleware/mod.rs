//! Shared HTTP middleware

pub mod request_id;

pub use request_id::{
    current_request_context, get_request_id, request_id_middleware, RequestContext, RequestId,
};
