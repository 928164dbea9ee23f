//! Subject keys: what a finding applies to.

pub const PATH_PREFIX: &str = "path=";
pub const CONTAINER_PREFIX: &str = "container=";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKind {
    /// `path=<host path>`
    Path,
    /// `container=<id>`
    Container,
    /// Any other non-empty key.
    Other,
    /// Empty subject, aggregate or daemon-level.
    Global,
}

pub fn path(p: &str) -> String {
    format!("{}{}", PATH_PREFIX, p)
}

pub fn container(id: &str) -> String {
    format!("{}{}", CONTAINER_PREFIX, id)
}

pub fn kind(subject: &str) -> SubjectKind {
    if subject.trim().is_empty() {
        SubjectKind::Global
    } else if subject.starts_with(PATH_PREFIX) {
        SubjectKind::Path
    } else if subject.starts_with(CONTAINER_PREFIX) {
        SubjectKind::Container
    } else {
        SubjectKind::Other
    }
}

pub fn container_id(subject: &str) -> Option<&str> {
    subject.strip_prefix(CONTAINER_PREFIX)
}

pub fn path_of(subject: &str) -> Option<&str> {
    subject.strip_prefix(PATH_PREFIX)
}
