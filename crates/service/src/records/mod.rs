//! Student record handling: the request envelopes, the store contract and
//! the service that dispatches one onto the other.

pub mod envelope;
pub mod service;
pub mod store;

pub use envelope::{InvocationEvent, InvocationResponse, Method, RecordRequest, RecordResponse};
pub use service::RecordService;
pub use store::{Record, RecordStore};
