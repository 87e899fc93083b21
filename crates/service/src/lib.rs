//! Service layer for student records.
//! - `records` holds the request dispatch and the record lifecycle rules.
//! - `storage` holds the store adapters the service is wired to at startup.
//! - Errors are typed in `errors` and always end up as a response.

pub mod errors;
pub mod records;
pub mod storage;
