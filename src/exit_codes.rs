use std::collections::BTreeSet;

use serde::Serialize;

use crate::validation::Validation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExitStatus {
    Success,
    TemporaryFail,
    PermanentFail,
}

/// Exit-code classification. Stored with the tool, consumed by whatever runs it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitCodes {
    pub success: BTreeSet<i32>,
    pub temporary_fail: BTreeSet<i32>,
    pub permanent_fail: BTreeSet<i32>,
}

impl ExitCodes {
    /// Explicit membership wins; with no success codes declared, `0` succeeds;
    /// anything else is a permanent failure.
    pub fn classify(&self, code: i32) -> ExitStatus {
        if self.success.contains(&code) {
            ExitStatus::Success
        } else if self.temporary_fail.contains(&code) {
            ExitStatus::TemporaryFail
        } else if self.permanent_fail.contains(&code) {
            ExitStatus::PermanentFail
        } else if self.success.is_empty() && code == 0 {
            ExitStatus::Success
        } else {
            ExitStatus::PermanentFail
        }
    }

    /// The three sets must be disjoint.
    pub fn validate(&self) -> Validation {
        let mut val = Validation::new();
        let sets = [
            ("successCodes", &self.success),
            ("temporaryFailCodes", &self.temporary_fail),
            ("permanentFailCodes", &self.permanent_fail),
        ];
        for (i, (name, set)) in sets.iter().enumerate() {
            for (other_name, other) in &sets[i + 1..] {
                for code in set.intersection(other) {
                    val.error(*name, format!("Exit code {code} is listed in both {name} and {other_name}"));
                }
            }
        }
        val
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(success: &[i32], temporary: &[i32], permanent: &[i32]) -> ExitCodes {
        ExitCodes {
            success: success.iter().copied().collect(),
            temporary_fail: temporary.iter().copied().collect(),
            permanent_fail: permanent.iter().copied().collect(),
        }
    }

    #[test]
    fn default_classification() {
        let c = ExitCodes::default();
        assert_eq!(c.classify(0), ExitStatus::Success);
        assert_eq!(c.classify(1), ExitStatus::PermanentFail);
    }

    #[test]
    fn explicit_sets() {
        let c = codes(&[0, 1], &[75], &[2]);
        assert_eq!(c.classify(1), ExitStatus::Success);
        assert_eq!(c.classify(75), ExitStatus::TemporaryFail);
        assert_eq!(c.classify(2), ExitStatus::PermanentFail);
        assert_eq!(c.classify(9), ExitStatus::PermanentFail);
        // success declared without 0: 0 is no longer special
        assert_eq!(codes(&[3], &[], &[]).classify(0), ExitStatus::PermanentFail);
    }

    #[test]
    fn overlapping_sets_are_reported() {
        let val = codes(&[0, 2], &[2], &[0]).validate();
        assert_eq!(val.errors.len(), 2);
        assert!(val.errors.iter().any(|e| e.loc == "successCodes" && e.message.contains("permanentFailCodes")));
        assert!(codes(&[0], &[1], &[2]).validate().is_valid());
    }
}
