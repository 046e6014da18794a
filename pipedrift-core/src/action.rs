//! Normalized workflow step records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::fingerprint::Fingerprint;

/// Version recorded when a step reference carries no `@` qualifier.
pub const LATEST_VERSION: &str = "latest";

/// One normalized unit of work extracted from a workflow job.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Action {
    /// Unique id within one report run, in `<document>-<ordinal>` form.
    pub id: String,
    /// Identifier of the reusable action the step invokes, without its
    /// version qualifier. Empty for script and built-in steps.
    pub uses: String,
    /// Version qualifier of the action reference.
    pub uses_version: String,
    /// Every other step property apart from the reference, env, and with
    /// maps, with values converted to their string form.
    pub settings: BTreeMap<String, String>,
    /// Step-scoped environment variables.
    pub env: BTreeMap<String, String>,
    /// Named inputs passed to the action.
    pub with: BTreeMap<String, String>,
    /// Locality-sensitive fingerprint of the step configuration, absent
    /// when the step carries no usable configuration.
    #[serde(skip)]
    pub fingerprint: Option<Fingerprint>,
}

impl Action {
    /// Compute and attach the configuration fingerprint for this step.
    pub fn generate_fingerprint(&mut self) {
        self.fingerprint = Fingerprint::from_config(&self.settings, &self.env, &self.with);
    }
}

/// Split a `uses` reference into its action id and version.
///
/// A reference without `@` maps to the `latest` version; a trailing `@`
/// with nothing after it maps to an empty version.
pub fn split_uses(uses: &str) -> (String, String) {
    match uses.split_once('@') {
        Some((id, version)) => (id.to_string(), version.to_string()),
        None => (uses.to_string(), LATEST_VERSION.to_string()),
    }
}

/// Whether two steps invoke the same action at different versions.
///
/// Requires a non-empty reference on the first step and non-empty versions
/// on both sides; script steps never participate in drift.
pub fn has_version_drift(first: &Action, second: &Action) -> bool {
    !first.uses.is_empty()
        && !first.uses_version.is_empty()
        && !second.uses_version.is_empty()
        && first.uses == second.uses
        && first.uses_version != second.uses_version
}
