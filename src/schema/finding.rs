//! Issue → Finding: fingerprint, scope, evidence and recommendation buckets.

use super::normalize::{category_for, confidence_for, export_severity, title_for};
use super::v1::{Evidence, Finding, Recommendation, Risk, Scope};
use crate::rules::subject::{self, SubjectKind};
use crate::rules::Issue;

pub const GLOBAL_SUBJECT: &str = "global";
pub const RECOMMENDATION_TITLE: &str = "Recommended actions";

const COMMAND_PATTERNS: [&str; 3] = ["docker image rm", "docker builder prune", "docker system df"];
const NOTE_PATTERNS: [&str; 4] = ["Total", "Top", "Build cache", "Consider"];

// ── Fingerprint ─────────────────────────────────────────────────────────────

/// `<RULE_ID>:<subject>` or `<RULE_ID>:global`. Public contract for cross-scan diffing.
pub fn fingerprint(rule_id: &str, subject: &str) -> String {
    if subject.trim().is_empty() {
        format!("{}:{}", rule_id, GLOBAL_SUBJECT)
    } else {
        format!("{}:{}", rule_id, subject)
    }
}

/// A fingerprint split back into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub rule_id: String,
    /// `None` for global fingerprints.
    pub subject: Option<String>,
}

impl Fingerprint {
    /// Splits at the first `:`; rule ids never contain one, subjects may.
    pub fn parse(s: &str) -> Option<Self> {
        let (rule_id, rest) = s.split_once(':')?;
        if rule_id.is_empty() || rest.is_empty() {
            return None;
        }
        let subject = (rest != GLOBAL_SUBJECT).then(|| rest.to_string());
        Some(Self { rule_id: rule_id.to_string(), subject })
    }

    pub fn subject_kind(&self) -> SubjectKind {
        subject::kind(self.subject.as_deref().unwrap_or(""))
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&fingerprint(&self.rule_id, self.subject.as_deref().unwrap_or("")))
    }
}

// ── Scope / evidence ────────────────────────────────────────────────────────

pub fn scope_for(issue: &Issue) -> Scope {
    let mut scope = Scope::default();
    if let Some(id) = subject::container_id(&issue.subject) {
        scope.container_id = id.to_string();
    }
    if let Some(path) = subject::path_of(&issue.subject) {
        scope.path = path.to_string();
    }
    if let Some(name) = issue.facts.get("container_name").and_then(|v| v.as_str()) {
        scope.container_name = name.to_string();
    }
    scope
}

/// One `fact` entry per key. The facts map is a BTreeMap so keys come out sorted.
pub fn evidence_for(issue: &Issue) -> Vec<Evidence> {
    issue
        .facts
        .iter()
        .map(|(key, value)| Evidence {
            kind: "fact".to_string(),
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

// ── Recommendations ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedSolutions {
    pub steps: Vec<String>,
    pub commands: Vec<String>,
    pub notes: Vec<String>,
}

/// Substring-based bucketing. Commands are checked before notes, so
/// "Run 'docker system df'" is a command even though it could read as a note.
pub fn classify_solutions(solutions: &[String]) -> ClassifiedSolutions {
    let mut out = ClassifiedSolutions::default();
    for sol in solutions {
        let sol = sol.trim().to_string();
        if COMMAND_PATTERNS.iter().any(|p| sol.contains(p)) {
            out.commands.push(sol);
        } else if NOTE_PATTERNS.iter().any(|p| sol.contains(p)) {
            out.notes.push(sol);
        } else {
            out.steps.push(sol);
        }
    }
    out
}

pub fn recommendation_for(issue: &Issue) -> Recommendation {
    let ClassifiedSolutions { steps, commands, notes } = classify_solutions(&issue.solutions);
    Recommendation {
        risk: Risk::Planned,
        title: RECOMMENDATION_TITLE.to_string(),
        steps,
        commands,
        notes,
    }
}

pub fn finding_from_issue(issue: &Issue) -> Finding {
    Finding {
        id: issue.rule_id.clone(),
        fingerprint: fingerprint(&issue.rule_id, &issue.subject),
        severity: export_severity(issue.severity),
        confidence: confidence_for(&issue.rule_id),
        category: category_for(&issue.rule_id).to_string(),
        title: title_for(&issue.rule_id),
        summary: issue.description.clone(),
        scope: scope_for(issue),
        evidence: evidence_for(issue),
        recommendations: vec![recommendation_for(issue)],
        references: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Severity;
    use crate::schema::v1::{Confidence, FindingSeverity};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fingerprint_forms() {
        assert_eq!(fingerprint("OOM_KILLED", "container=abc"), "OOM_KILLED:container=abc");
        assert_eq!(fingerprint("VOLUME_BLOAT", ""), "VOLUME_BLOAT:global");
        assert_eq!(fingerprint("VOLUME_BLOAT", "  "), "VOLUME_BLOAT:global");
    }

    #[test]
    fn test_fingerprint_parse() {
        let fp = Fingerprint::parse("DISK_USAGE_HIGH:path=/var/lib/docker").unwrap();
        assert_eq!(fp.rule_id, "DISK_USAGE_HIGH");
        assert_eq!(fp.subject.as_deref(), Some("path=/var/lib/docker"));
        assert_eq!(fp.subject_kind(), SubjectKind::Path);

        let fp = Fingerprint::parse("NETWORK_OVERLAP:global").unwrap();
        assert_eq!(fp.subject, None);
        assert_eq!(fp.subject_kind(), SubjectKind::Global);
        assert_eq!(fp.to_string(), "NETWORK_OVERLAP:global");

        assert!(Fingerprint::parse("no-colon").is_none());
        assert!(Fingerprint::parse(":global").is_none());
    }

    #[test]
    fn test_classify_buckets_keep_order() {
        let c = classify_solutions(&strings(&[
            "Run 'docker system df' to see usage.",
            "  Total images: 3, total size: 1 GB  ",
            "Remove unused images: 'docker image prune -a'",
            "Remove largest images: 'docker image rm a'",
            "Consider using smaller base images.",
            "Use multi-stage builds.",
        ]));
        assert_eq!(
            c.commands,
            strings(&[
                "Run 'docker system df' to see usage.",
                "Remove largest images: 'docker image rm a'",
            ])
        );
        assert_eq!(
            c.notes,
            strings(&["Total images: 3, total size: 1 GB", "Consider using smaller base images."])
        );
        assert_eq!(
            c.steps,
            strings(&["Remove unused images: 'docker image prune -a'", "Use multi-stage builds."])
        );
    }

    #[test]
    fn test_finding_from_container_issue() {
        let issue = Issue::new(
            "RESTART_LOOP",
            "container=abc123",
            Severity::High,
            "restarts",
            "Container web is restarting",
        )
        .fact("restart_count", 10)
        .fact("container_name", "web")
        .solutions(["Check logs: 'docker logs abc123'"]);

        let f = finding_from_issue(&issue);
        assert_eq!(f.fingerprint, "RESTART_LOOP:container=abc123");
        assert_eq!(f.severity, FindingSeverity::Critical);
        assert_eq!(f.confidence, Confidence::Medium);
        assert_eq!(f.category, "stability");
        assert_eq!(f.scope.container_id, "abc123");
        assert_eq!(f.scope.container_name, "web");
        assert!(f.scope.path.is_empty());

        let keys: Vec<&str> = f.evidence.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["container_name", "restart_count"]);
        assert!(f.evidence.iter().all(|e| e.kind == "fact"));

        assert_eq!(f.recommendations.len(), 1);
        assert_eq!(f.recommendations[0].risk, Risk::Planned);
        assert_eq!(f.recommendations[0].title, RECOMMENDATION_TITLE);
        assert!(f.references.is_empty());
    }

    #[test]
    fn test_scope_json_omits_empty_fields() {
        let issue = Issue::new("DISK_USAGE_HIGH", "path=/", Severity::Low, "disk_usage", "d");
        let json = serde_json::to_value(finding_from_issue(&issue).scope).unwrap();
        assert_eq!(json, serde_json::json!({ "path": "/" }));
    }
}
