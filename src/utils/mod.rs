pub mod error;
pub mod format;

pub use error::{DoctorError, Result};
