pub mod classify;

pub use classify::{classify, ClassifiedError, ErrorKind, RawFailure, ReportError};
