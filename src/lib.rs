//! Docker host diagnostics.
//!
//! [`collect`] builds a [`facts::FactSnapshot`] from the docker CLI and the
//! host filesystem, [`rules`] turns it into ordered [`rules::Issue`]s, and
//! [`schema`] normalizes those into the exported report formats.

pub mod collect;
pub mod config;
pub mod facts;
pub mod logging;
pub mod output;
pub mod rules;
pub mod scan;
pub mod schema;
pub mod utils;

pub use config::Config;
pub use facts::FactSnapshot;
pub use rules::{evaluate, Issue, Severity};
pub use utils::{DoctorError, Result};
