//! Request admission filtering.

mod admission;
mod response;

pub use admission::{Admission, AdmissionFilter, Downstream, FilterOutcome};
pub use response::{Rejection, MESSAGE_TOO_MANY_REQUESTS, STATUS_TOO_MANY_REQUESTS};
