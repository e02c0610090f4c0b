use super::{CharacterSet, CharacterStates};
use crate::tree::NodeIndex;
use serde::{Deserialize, Serialize};

/// How a node left with several candidate states is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Unresolved nodes get an empty cell.
    #[default]
    Intolerant,
    /// Unresolved nodes list every candidate.
    Tolerant,
}

impl AmbiguityPolicy {
    pub fn from_tolerance(tolerate_ambiguity: bool) -> Self {
        if tolerate_ambiguity {
            AmbiguityPolicy::Tolerant
        } else {
            AmbiguityPolicy::Intolerant
        }
    }
}

/// What a node's final set says about the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved,
    Ambiguous,
    NoData,
}

/// Per-field tally over the labeled nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStats {
    pub resolved: usize,
    pub ambiguous: usize,
    pub no_data: usize,
}

impl FieldStats {
    fn record(&mut self, resolution: Resolution) {
        match resolution {
            Resolution::Resolved => self.resolved += 1,
            Resolution::Ambiguous => self.ambiguous += 1,
            Resolution::NoData => self.no_data += 1,
        }
    }
}

/// Turns a final set into an output cell.
pub fn resolve_cell(set: &CharacterSet<'_>, policy: AmbiguityPolicy, separator: &str) -> (String, Resolution) {
    match set.len() {
        0 => (String::new(), Resolution::NoData),
        1 => {
            let value = set.iter().next().copied().unwrap_or_default();
            (value.to_string(), Resolution::Resolved)
        }
        _ => {
            let cell = match policy {
                AmbiguityPolicy::Intolerant => String::new(),
                AmbiguityPolicy::Tolerant => {
                    set.iter().copied().collect::<Vec<_>>().join(separator)
                }
            };
            (cell, Resolution::Ambiguous)
        }
    }
}

/// Builds one output column, in the order of `labeled`.
pub fn extract_column(
    states: &CharacterStates<'_>,
    labeled: &[NodeIndex],
    policy: AmbiguityPolicy,
    separator: &str,
) -> (Vec<String>, FieldStats) {
    let mut stats = FieldStats::default();
    let values = labeled
        .iter()
        .map(|&index| {
            let (cell, resolution) = resolve_cell(&states[index], policy, separator);
            stats.record(resolution);
            cell
        })
        .collect();
    (values, stats)
}
