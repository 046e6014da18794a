//! Workflow document normalization.
//!
//! Turns the raw text of one pipeline document into an ordered list of
//! normalized [`Action`] records. Malformed documents, jobs, and steps are
//! skipped at the finest granularity possible; a broken step never
//! discards its siblings.

use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};

use crate::action::{Action, split_uses};

const JOBS_KEY: &str = "jobs";
const STEPS_KEY: &str = "steps";
const USES_KEY: &str = "uses";
const ENV_KEY: &str = "env";
const WITH_KEY: &str = "with";

/// Parse one workflow document into its normalized steps.
///
/// Jobs are walked in lexicographically sorted name order so step ids are
/// deterministic regardless of the document's native job ordering. Steps
/// keep document order. Ids take the form `<document_id>-<ordinal>`; the
/// ordinal counter skips the first slot per document, so only uniqueness
/// should be relied upon.
pub fn parse_workflow(document: &str, document_id: usize) -> Vec<Action> {
    let Ok(root) = serde_yaml::from_str::<Value>(document) else {
        return Vec::new();
    };
    let Some(jobs) = root.get(JOBS_KEY).and_then(Value::as_mapping) else {
        return Vec::new();
    };

    let mut sorted_jobs: Vec<(&str, &Value)> = jobs
        .iter()
        .filter_map(|(name, job)| Some((name.as_str()?, job)))
        .collect();
    sorted_jobs.sort_unstable_by_key(|(name, _)| *name);

    let mut actions = Vec::new();
    let mut ordinal = 1usize;

    for (_name, job) in sorted_jobs {
        let Some(steps) = job.get(STEPS_KEY).and_then(Value::as_sequence) else {
            continue;
        };

        for step in steps {
            ordinal += 1;

            let Some(step_map) = step.as_mapping() else {
                continue;
            };

            let uses = string_property(step_map, USES_KEY);
            let (uses_id, uses_version) = split_uses(&uses);

            let mut action = Action {
                id: format!("{document_id}-{ordinal}"),
                uses: uses_id,
                uses_version,
                settings: other_values(step_map, &[USES_KEY, ENV_KEY, WITH_KEY]),
                env: child_string_map(step_map, ENV_KEY),
                with: child_string_map(step_map, WITH_KEY),
                fingerprint: None,
            };
            action.generate_fingerprint();

            actions.push(action);
        }
    }

    actions
}

fn property<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.iter()
        .find_map(|(candidate, value)| (candidate.as_str() == Some(key)).then_some(value))
}

fn string_property(map: &Mapping, key: &str) -> String {
    property(map, key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn child_string_map(map: &Mapping, key: &str) -> BTreeMap<String, String> {
    property(map, key)
        .and_then(Value::as_mapping)
        .map(convert_string_map)
        .unwrap_or_default()
}

fn convert_string_map(map: &Mapping) -> BTreeMap<String, String> {
    map.iter()
        .filter_map(|(key, value)| Some((key.as_str()?.to_string(), value_to_string(value))))
        .collect()
}

/// Every top-level step property except the excluded keys, string-converted.
fn other_values(map: &Mapping, exclude: &[&str]) -> BTreeMap<String, String> {
    map.iter()
        .filter_map(|(key, value)| {
            let key = key.as_str()?;
            if exclude.contains(&key) {
                return None;
            }
            Some((key.to_string(), value_to_string(value)))
        })
        .collect()
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|text| text.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_workflow;

    const WORKFLOW: &str = "\
name: Build
jobs:
  test:
    steps:
      - name: Checkout
        uses: actions/checkout@v4
        with:
          fetch-depth: 0
      - name: Run tests
        run: cargo test
        env:
          RUST_LOG: debug
  build:
    steps:
      - uses: actions/setup-node@v3
";

    #[test]
    fn walks_jobs_in_sorted_order() {
        let actions = parse_workflow(WORKFLOW, 1);
        assert_eq!(actions.len(), 3);
        // "build" sorts before "test", so its step comes first.
        assert_eq!(actions[0].uses, "actions/setup-node");
        assert_eq!(actions[1].uses, "actions/checkout");
        assert_eq!(actions[2].uses, "");
    }

    #[test]
    fn ids_are_prefixed_with_the_document_id() {
        let actions = parse_workflow(WORKFLOW, 7);
        let ids: Vec<&str> = actions.iter().map(|action| action.id.as_str()).collect();
        assert_eq!(ids, vec!["7-2", "7-3", "7-4"]);
    }

    #[test]
    fn ids_are_unique_within_a_document() {
        let actions = parse_workflow(WORKFLOW, 1);
        let mut ids: Vec<&str> = actions.iter().map(|action| action.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), actions.len());
    }

    #[test]
    fn extracts_with_and_env_maps() {
        let actions = parse_workflow(WORKFLOW, 1);
        assert_eq!(actions[1].with.get("fetch-depth").map(String::as_str), Some("0"));
        assert!(actions[1].env.is_empty());
        assert_eq!(actions[2].env.get("RUST_LOG").map(String::as_str), Some("debug"));
    }

    #[test]
    fn remaining_properties_land_in_settings() {
        let actions = parse_workflow(WORKFLOW, 1);
        assert_eq!(actions[1].settings.get("name").map(String::as_str), Some("Checkout"));
        assert!(!actions[1].settings.contains_key("uses"));
        assert!(!actions[1].settings.contains_key("with"));
        assert_eq!(actions[2].settings.get("run").map(String::as_str), Some("cargo test"));
    }

    #[test]
    fn script_steps_have_empty_reference_and_latest_version() {
        let actions = parse_workflow(WORKFLOW, 1);
        assert_eq!(actions[2].uses, "");
        assert_eq!(actions[2].uses_version, "latest");
    }

    #[test]
    fn invalid_yaml_yields_no_steps() {
        assert!(parse_workflow("jobs: [unbalanced", 1).is_empty());
    }

    #[test]
    fn missing_jobs_yields_no_steps() {
        assert!(parse_workflow("name: No jobs here\n", 1).is_empty());
        assert!(parse_workflow("", 1).is_empty());
    }

    #[test]
    fn jobs_without_steps_are_skipped() {
        let document = "\
jobs:
  empty:
    runs-on: ubuntu-latest
  real:
    steps:
      - uses: actions/checkout@v4
";
        let actions = parse_workflow(document, 1);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].uses, "actions/checkout");
    }

    #[test]
    fn malformed_steps_keep_their_siblings_and_consume_an_ordinal() {
        let document = "\
jobs:
  build:
    steps:
      - just a scalar step
      - uses: actions/checkout@v4
";
        let actions = parse_workflow(document, 1);
        assert_eq!(actions.len(), 1);
        // The scalar step burned ordinal 2.
        assert_eq!(actions[0].id, "1-3");
    }

    #[test]
    fn non_map_env_normalizes_to_empty() {
        let document = "\
jobs:
  build:
    steps:
      - uses: actions/checkout@v4
        env: not-a-map
";
        let actions = parse_workflow(document, 1);
        assert!(actions[0].env.is_empty());
        // The bogus env value still shows up nowhere else.
        assert!(!actions[0].settings.contains_key("env"));
    }

    #[test]
    fn scalar_values_are_string_converted() {
        let document = "\
jobs:
  build:
    steps:
      - uses: actions/cache@v4
        with:
          enabled: true
          retries: 3
";
        let actions = parse_workflow(document, 1);
        assert_eq!(actions[0].with.get("enabled").map(String::as_str), Some("true"));
        assert_eq!(actions[0].with.get("retries").map(String::as_str), Some("3"));
    }

    #[test]
    fn steps_with_rich_configuration_get_a_fingerprint() {
        let document = "\
jobs:
  build:
    steps:
      - name: Run the full verification suite for the service
        run: |
          echo \"starting verification\"
          cargo fmt --all -- --check
          cargo clippy --workspace --all-targets
          cargo test --workspace --no-fail-fast
          echo \"finished verification\"
";
        let actions = parse_workflow(document, 1);
        assert!(actions[0].fingerprint.is_some());
    }
}
