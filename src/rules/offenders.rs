//! Largest-first selection for display lists and generated commands.

use crate::utils::format::human_bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offender<'a> {
    pub name: &'a str,
    pub size: u64,
}

impl Offender<'_> {
    /// `name (1.50 GB)`
    pub fn describe(&self) -> String {
        format!("{} ({})", self.name, human_bytes(self.size))
    }
}

/// The `n` largest items, biggest first.
///
/// The sort is stable: equally sized items keep their input order. Callers
/// must not rely on any particular tie order beyond that.
pub fn top_offenders<'a>(items: &[Offender<'a>], n: usize) -> Vec<Offender<'a>> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| b.size.cmp(&a.size));
    sorted.truncate(n);
    sorted
}
