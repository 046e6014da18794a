//! Pairwise step comparison.
//!
//! Compares the flattened step lists of two repositories for version drift
//! and near-duplicate configuration. Both scans are O(n*m) over the two
//! lists, which is fine for the tens of steps real pipelines carry.

use crate::action::{Action, has_version_drift};

/// Maximum fingerprint distance at which two step configurations are
/// still considered near-duplicates.
pub const HIGH_SIMILARITY: i32 = 30;

/// Reference id reported for script and built-in steps, which have no
/// external reference of their own.
pub const BUILT_IN_STEP: &str = "(built-in step)";

/// Find steps that invoke the same external reference at different
/// versions.
///
/// Returns the implicated step ids (from both sides) and the implicated
/// reference ids, each deduplicated in first-seen order.
pub fn find_steps_with_different_versions(
    list1: &[Action],
    list2: &[Action],
) -> (Vec<String>, Vec<String>) {
    let mut step_ids = Vec::new();
    let mut references = Vec::new();

    for action1 in list1 {
        for action2 in list2 {
            if !has_version_drift(action1, action2) {
                continue;
            }
            push_unique(&mut step_ids, &action1.id);
            push_unique(&mut step_ids, &action2.id);
            push_unique(&mut references, &action1.uses);
        }
    }

    (step_ids, references)
}

/// Find steps with the same external reference whose configurations are
/// within the similarity threshold of each other.
///
/// Steps without a fingerprint can never be judged similar. Script steps
/// (empty reference) are compared against each other and reported under
/// the [`BUILT_IN_STEP`] sentinel.
pub fn find_steps_with_similar_config(
    list1: &[Action],
    list2: &[Action],
) -> (Vec<String>, Vec<String>) {
    let mut step_ids = Vec::new();
    let mut references = Vec::new();

    for action1 in list1 {
        for action2 in list2 {
            if action1.uses != action2.uses {
                continue;
            }
            let (Some(print1), Some(print2)) = (&action1.fingerprint, &action2.fingerprint)
            else {
                continue;
            };
            if print1.distance(print2) > HIGH_SIMILARITY {
                continue;
            }
            push_unique(&mut step_ids, &action1.id);
            push_unique(&mut step_ids, &action2.id);
            if action1.uses.is_empty() {
                push_unique(&mut references, BUILT_IN_STEP);
            } else {
                push_unique(&mut references, &action1.uses);
            }
        }
    }

    (step_ids, references)
}

fn push_unique(values: &mut Vec<String>, candidate: &str) {
    if !values.iter().any(|value| value == candidate) {
        values.push(candidate.to_string());
    }
}
