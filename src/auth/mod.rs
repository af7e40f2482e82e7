//! Credentials for outbound calls: the service-account assertion, its exchange
//! for an IAM token, and the shared-secret token of the feedback API.

pub mod assertion;
pub mod exchange;
pub mod feedback_jwt;
