//! Restricted-zone risk policy.
//!
//! A zone trips when any touched path contains one of its path tokens
//! (case-insensitive substring) or when its pattern matches anywhere in the
//! diff text.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Sensitive change areas.
///
/// Variants are declared in name order, so the derived `Ord` is the
/// lexicographic order of their names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictedZone {
    Auth,
    Infra,
    Migrations,
    Payments,
    Secrets,
}

impl RestrictedZone {
    pub const ALL: [RestrictedZone; 5] = [
        RestrictedZone::Auth,
        RestrictedZone::Infra,
        RestrictedZone::Migrations,
        RestrictedZone::Payments,
        RestrictedZone::Secrets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RestrictedZone::Auth => "auth",
            RestrictedZone::Infra => "infra",
            RestrictedZone::Migrations => "migrations",
            RestrictedZone::Payments => "payments",
            RestrictedZone::Secrets => "secrets",
        }
    }
}

impl fmt::Display for RestrictedZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detection rule for a single zone.
#[derive(Debug, Clone)]
pub struct ZoneRule {
    pub zone: RestrictedZone,
    /// Lowercase substrings matched against lowercased paths.
    pub path_tokens: Vec<String>,
    /// Case-insensitive pattern matched against diff text.
    pub pattern: Regex,
}

impl ZoneRule {
    pub fn new(zone: RestrictedZone, path_tokens: &[&str], pattern: Regex) -> Self {
        Self {
            zone,
            path_tokens: path_tokens.iter().map(|t| t.to_lowercase()).collect(),
            pattern,
        }
    }

    fn matches_path(&self, lowered_path: &str) -> bool {
        self.path_tokens
            .iter()
            .any(|token| lowered_path.contains(token.as_str()))
    }
}

/// A set of zone rules.
#[derive(Debug, Clone)]
pub struct ZoneCatalog {
    rules: Vec<ZoneRule>,
}

fn zone_pattern(alternatives: &str) -> Regex {
    Regex::new(&format!("(?i){alternatives}")).expect("static zone pattern compiles")
}

impl ZoneCatalog {
    pub fn new(rules: Vec<ZoneRule>) -> Self {
        Self { rules }
    }

    /// The fixed catalog: auth, payments, secrets, infra, migrations.
    pub fn standard() -> Self {
        Self::new(vec![
            ZoneRule::new(
                RestrictedZone::Auth,
                &["auth", "security"],
                zone_pattern("auth|login|oauth|jwt"),
            ),
            ZoneRule::new(
                RestrictedZone::Payments,
                &["payments", "billing"],
                zone_pattern("payment|billing|stripe|paypal"),
            ),
            ZoneRule::new(
                RestrictedZone::Secrets,
                &["secrets", "vault"],
                zone_pattern("secret|token|key"),
            ),
            ZoneRule::new(
                RestrictedZone::Infra,
                &["infra", "terraform", ".github", "ci"],
                zone_pattern("terraform|k8s|docker|ci"),
            ),
            ZoneRule::new(
                RestrictedZone::Migrations,
                &["migrations", "schema"],
                zone_pattern("migration|migrate|schema"),
            ),
        ])
    }

    pub fn rules(&self) -> &[ZoneRule] {
        &self.rules
    }

    /// Zones triggered by `paths` or `diff_text`, sorted by name, no duplicates.
    pub fn detect<P: AsRef<Path>>(&self, paths: &[P], diff_text: &str) -> Vec<RestrictedZone> {
        let lowered: Vec<String> = paths
            .iter()
            .map(|p| p.as_ref().to_string_lossy().to_lowercase())
            .collect();

        let triggered: BTreeSet<RestrictedZone> = self
            .rules
            .iter()
            .filter(|rule| {
                lowered.iter().any(|path| rule.matches_path(path))
                    || rule.pattern.is_match(diff_text)
            })
            .map(|rule| rule.zone)
            .collect();

        let mut zones: Vec<RestrictedZone> = triggered.into_iter().collect();
        zones.sort_by_key(|zone| zone.as_str());
        zones
    }

    pub fn evaluate<P: AsRef<Path>>(
        &self,
        paths: &[P],
        diff_text: &str,
        safe_mode: bool,
    ) -> PolicyResult {
        let restricted_zones = self.detect(paths, diff_text);
        let requires_approval = !restricted_zones.is_empty() && safe_mode;
        PolicyResult {
            restricted_zones,
            requires_approval,
            safe_mode,
        }
    }
}

static STANDARD_CATALOG: Lazy<ZoneCatalog> = Lazy::new(ZoneCatalog::standard);

/// Outcome of one policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyResult {
    pub restricted_zones: Vec<RestrictedZone>,
    pub requires_approval: bool,
    /// Flag the approval decision was computed with; not part of the report.
    #[serde(skip)]
    pub safe_mode: bool,
}

impl PolicyResult {
    pub fn zone_names(&self) -> Vec<&'static str> {
        self.restricted_zones.iter().map(|z| z.as_str()).collect()
    }
}

/// Zones touched by `paths` or `diff_text` under the standard catalog.
pub fn detect_restricted_zones<P: AsRef<Path>>(paths: &[P], diff_text: &str) -> Vec<RestrictedZone> {
    STANDARD_CATALOG.detect(paths, diff_text)
}

/// Evaluate the standard catalog; approval is required only for a non-empty
/// zone set in safe mode.
pub fn evaluate_policy<P: AsRef<Path>>(paths: &[P], diff_text: &str, safe_mode: bool) -> PolicyResult {
    STANDARD_CATALOG.evaluate(paths, diff_text, safe_mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const NO_PATHS: [&str; 0] = [];

    #[test]
    fn test_path_trigger() {
        let zones = detect_restricted_zones(&[Path::new("auth/login.py")], "");
        assert!(zones.contains(&RestrictedZone::Auth));
    }

    #[test]
    fn test_path_trigger_is_case_insensitive() {
        let zones = detect_restricted_zones(&[Path::new("src/Billing/Invoice.rs")], "");
        assert_eq!(zones, vec![RestrictedZone::Payments]);
    }

    #[test]
    fn test_diff_trigger() {
        let zones = detect_restricted_zones(&NO_PATHS, "rotate the API secret key");
        assert!(zones.contains(&RestrictedZone::Secrets));
    }

    #[test]
    fn test_diff_trigger_is_case_insensitive() {
        let zones = detect_restricted_zones(&NO_PATHS, "Bump TERRAFORM provider");
        assert_eq!(zones, vec![RestrictedZone::Infra]);
    }

    #[test]
    fn test_negative() {
        let zones = detect_restricted_zones(&[Path::new("src/app.py")], "add a button");
        assert!(zones.is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        assert!(detect_restricted_zones(&NO_PATHS, "").is_empty());
    }

    #[test]
    fn test_output_sorted_and_deduplicated() {
        let paths = vec![
            PathBuf::from("secrets/vault.yaml"),
            PathBuf::from("auth/session.py"),
            PathBuf::from("auth/oauth.py"),
        ];
        let zones = detect_restricted_zones(&paths, "run the schema migration, update stripe");
        assert_eq!(
            zones,
            vec![
                RestrictedZone::Auth,
                RestrictedZone::Migrations,
                RestrictedZone::Payments,
                RestrictedZone::Secrets,
            ]
        );
    }

    #[test]
    fn test_order_independent_of_catalog_order() {
        let mut rules = ZoneCatalog::standard().rules().to_vec();
        rules.reverse();
        let reversed = ZoneCatalog::new(rules);
        let paths = [Path::new("migrations/001.sql"), Path::new("auth/x.py")];

        assert_eq!(
            reversed.detect(&paths, "payment"),
            ZoneCatalog::standard().detect(&paths, "payment")
        );
        let names: Vec<&str> = reversed
            .detect(&paths, "payment")
            .iter()
            .map(|z| z.as_str())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_approval_gating() {
        let paths = [Path::new("infra/terraform/main.tf")];
        let safe = evaluate_policy(&paths, "", true);
        assert!(safe.requires_approval);
        assert_eq!(safe.restricted_zones, vec![RestrictedZone::Infra]);

        let fast = evaluate_policy(&paths, "", false);
        assert!(!fast.requires_approval);
        assert_eq!(fast.restricted_zones, vec![RestrictedZone::Infra]);
    }

    #[test]
    fn test_no_zones_never_requires_approval() {
        let result = evaluate_policy(&[Path::new("src/app.py")], "add a button", true);
        assert!(!result.requires_approval);
        assert!(result.safe_mode);
    }

    #[test]
    fn test_report_serialization() {
        let result = evaluate_policy(&[Path::new("auth/login.py")], "", true);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"restricted_zones": ["auth"], "requires_approval": true})
        );
    }
}
