//! Resource name templates
//!
//! Builds and parses the slash-separated resource names used by the
//! configuration API, e.g. `projects/{project}/sinks/{sink}`. Placeholders
//! match non-greedily, so a value may itself contain slashes.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Regex for matching template placeholders: {variable}
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").unwrap());

/// A compiled resource name pattern
#[derive(Debug)]
pub struct PathTemplate {
    pattern: &'static str,
    regex: Regex,
}

impl PathTemplate {
    fn new(pattern: &'static str) -> Self {
        let mut source = String::from("^");
        let mut last = 0;
        for cap in PLACEHOLDER_REGEX.captures_iter(pattern) {
            let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
                continue;
            };
            source.push_str(&regex::escape(&pattern[last..whole.start()]));
            source.push_str(&format!("(?P<{}>.+?)", name.as_str()));
            last = whole.end();
        }
        source.push_str(&regex::escape(&pattern[last..]));
        source.push('$');

        Self {
            pattern,
            regex: Regex::new(&source).unwrap(),
        }
    }

    /// The raw pattern, e.g. `projects/{project}`
    pub fn pattern(&self) -> &'static str {
        self.pattern
    }

    /// Placeholder names in order of appearance
    pub fn variables(&self) -> Vec<&'static str> {
        PLACEHOLDER_REGEX
            .captures_iter(self.pattern)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
            .collect()
    }

    /// Substitute values positionally; values are inserted verbatim
    pub fn render(&self, values: &[&str]) -> String {
        let mut values = values.iter();
        PLACEHOLDER_REGEX
            .replace_all(self.pattern, |_: &Captures| {
                values.next().copied().unwrap_or_default().to_string()
            })
            .into_owned()
    }

    /// Split a name into its placeholder values, or `None` if it does not match
    pub fn parse(&self, path: &str) -> Option<HashMap<String, String>> {
        let caps = self.regex.captures(path)?;
        Some(
            self.regex
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    caps.name(name)
                        .map(|m| (name.to_string(), m.as_str().to_string()))
                })
                .collect(),
        )
    }
}

// ============================================================================
// Templates
// ============================================================================

pub static CMEK_SETTINGS: LazyLock<PathTemplate> =
    LazyLock::new(|| PathTemplate::new("projects/{project}/cmekSettings"));

pub static LOG_BUCKET: LazyLock<PathTemplate> = LazyLock::new(|| {
    PathTemplate::new("projects/{project}/locations/{location}/buckets/{bucket}")
});

pub static LOG_EXCLUSION: LazyLock<PathTemplate> =
    LazyLock::new(|| PathTemplate::new("projects/{project}/exclusions/{exclusion}"));

pub static LOG_SINK: LazyLock<PathTemplate> =
    LazyLock::new(|| PathTemplate::new("projects/{project}/sinks/{sink}"));

pub static LOG_VIEW: LazyLock<PathTemplate> = LazyLock::new(|| {
    PathTemplate::new("projects/{project}/locations/{location}/buckets/{bucket}/views/{view}")
});

pub static BILLING_ACCOUNT: LazyLock<PathTemplate> =
    LazyLock::new(|| PathTemplate::new("billingAccounts/{billing_account}"));

pub static FOLDER: LazyLock<PathTemplate> = LazyLock::new(|| PathTemplate::new("folders/{folder}"));

pub static ORGANIZATION: LazyLock<PathTemplate> =
    LazyLock::new(|| PathTemplate::new("organizations/{organization}"));

pub static PROJECT: LazyLock<PathTemplate> =
    LazyLock::new(|| PathTemplate::new("projects/{project}"));

pub static LOCATION: LazyLock<PathTemplate> =
    LazyLock::new(|| PathTemplate::new("projects/{project}/locations/{location}"));

// ============================================================================
// Builders and parsers
// ============================================================================

pub fn cmek_settings_path(project: &str) -> String {
    CMEK_SETTINGS.render(&[project])
}

pub fn parse_cmek_settings_path(path: &str) -> Option<HashMap<String, String>> {
    CMEK_SETTINGS.parse(path)
}

pub fn log_bucket_path(project: &str, location: &str, bucket: &str) -> String {
    LOG_BUCKET.render(&[project, location, bucket])
}

pub fn parse_log_bucket_path(path: &str) -> Option<HashMap<String, String>> {
    LOG_BUCKET.parse(path)
}

pub fn log_exclusion_path(project: &str, exclusion: &str) -> String {
    LOG_EXCLUSION.render(&[project, exclusion])
}

pub fn parse_log_exclusion_path(path: &str) -> Option<HashMap<String, String>> {
    LOG_EXCLUSION.parse(path)
}

pub fn log_sink_path(project: &str, sink: &str) -> String {
    LOG_SINK.render(&[project, sink])
}

pub fn parse_log_sink_path(path: &str) -> Option<HashMap<String, String>> {
    LOG_SINK.parse(path)
}

pub fn log_view_path(project: &str, location: &str, bucket: &str, view: &str) -> String {
    LOG_VIEW.render(&[project, location, bucket, view])
}

pub fn parse_log_view_path(path: &str) -> Option<HashMap<String, String>> {
    LOG_VIEW.parse(path)
}

pub fn common_billing_account_path(billing_account: &str) -> String {
    BILLING_ACCOUNT.render(&[billing_account])
}

pub fn parse_common_billing_account_path(path: &str) -> Option<HashMap<String, String>> {
    BILLING_ACCOUNT.parse(path)
}

pub fn common_folder_path(folder: &str) -> String {
    FOLDER.render(&[folder])
}

pub fn parse_common_folder_path(path: &str) -> Option<HashMap<String, String>> {
    FOLDER.parse(path)
}

pub fn common_organization_path(organization: &str) -> String {
    ORGANIZATION.render(&[organization])
}

pub fn parse_common_organization_path(path: &str) -> Option<HashMap<String, String>> {
    ORGANIZATION.parse(path)
}

pub fn common_project_path(project: &str) -> String {
    PROJECT.render(&[project])
}

pub fn parse_common_project_path(path: &str) -> Option<HashMap<String, String>> {
    PROJECT.parse(path)
}

pub fn common_location_path(project: &str, location: &str) -> String {
    LOCATION.render(&[project, location])
}

pub fn parse_common_location_path(path: &str) -> Option<HashMap<String, String>> {
    LOCATION.parse(path)
}

/// Identify a resource name against every known template
///
/// Templates are tried most specific first; returns the template's kind and
/// its placeholder values.
pub fn parse_resource_name(path: &str) -> Option<(&'static str, HashMap<String, String>)> {
    let templates: [(&'static str, &PathTemplate); 10] = [
        ("log_view", &*LOG_VIEW),
        ("log_bucket", &*LOG_BUCKET),
        ("cmek_settings", &*CMEK_SETTINGS),
        ("log_sink", &*LOG_SINK),
        ("log_exclusion", &*LOG_EXCLUSION),
        ("location", &*LOCATION),
        ("project", &*PROJECT),
        ("billing_account", &*BILLING_ACCOUNT),
        ("folder", &*FOLDER),
        ("organization", &*ORGANIZATION),
    ];

    templates
        .into_iter()
        .find_map(|(kind, template)| template.parse(path).map(|values| (kind, values)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_build_paths() {
        assert_eq!(cmek_settings_path("p"), "projects/p/cmekSettings");
        assert_eq!(
            log_bucket_path("p", "global", "b"),
            "projects/p/locations/global/buckets/b"
        );
        assert_eq!(log_exclusion_path("p", "e"), "projects/p/exclusions/e");
        assert_eq!(log_sink_path("p", "s"), "projects/p/sinks/s");
        assert_eq!(
            log_view_path("p", "global", "b", "v"),
            "projects/p/locations/global/buckets/b/views/v"
        );
        assert_eq!(common_billing_account_path("0123"), "billingAccounts/0123");
        assert_eq!(common_folder_path("f"), "folders/f");
        assert_eq!(common_organization_path("o"), "organizations/o");
        assert_eq!(common_project_path("p"), "projects/p");
        assert_eq!(common_location_path("p", "us"), "projects/p/locations/us");
    }

    #[test]
    fn test_parse_inverts_build() {
        let path = log_view_path("squid", "clam", "whelk", "octopus");
        assert_eq!(
            parse_log_view_path(&path),
            Some(map(&[
                ("project", "squid"),
                ("location", "clam"),
                ("bucket", "whelk"),
                ("view", "octopus"),
            ]))
        );

        let path = common_billing_account_path("cuttlefish");
        assert_eq!(
            parse_common_billing_account_path(&path),
            Some(map(&[("billing_account", "cuttlefish")]))
        );
    }

    #[test_case("projects/p/sinks/s" => true ; "sink")]
    #[test_case("projects/p/exclusions/e" => false ; "exclusion")]
    #[test_case("projects/p/sinks/" => false ; "empty sink id")]
    #[test_case("folders/f/sinks/s" => false ; "folder parent")]
    #[test_case("xprojects/p/sinks/s" => false ; "anchored start")]
    fn test_log_sink_matching(path: &str) -> bool {
        parse_log_sink_path(path).is_some()
    }

    #[test]
    fn test_values_may_contain_slashes() {
        assert_eq!(
            parse_log_sink_path("projects/a/b/sinks/c"),
            Some(map(&[("project", "a/b"), ("sink", "c")]))
        );
    }

    #[test]
    fn test_template_introspection() {
        assert_eq!(LOG_BUCKET.variables(), vec!["project", "location", "bucket"]);
        assert_eq!(CMEK_SETTINGS.pattern(), "projects/{project}/cmekSettings");
    }

    #[test]
    fn test_parse_resource_name_picks_most_specific() {
        let (kind, values) = parse_resource_name("projects/p/locations/l/buckets/b").unwrap();
        assert_eq!(kind, "log_bucket");
        assert_eq!(values["bucket"], "b");

        let (kind, _) = parse_resource_name("projects/p").unwrap();
        assert_eq!(kind, "project");

        assert_eq!(parse_resource_name("nothing/here"), None);
    }
}
