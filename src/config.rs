use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

use crate::Result;

/// How leaves resolve shared elements recorded on their ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SharedInheritance {
    /// Only the node's own shared elements.
    Nothing,
    /// Ancestors' elements replace the node's own when present.
    Override,
    /// Ancestors' elements followed by the node's own.
    #[default]
    Append,
    /// Leaves take their parent combination's elements followed by their own.
    FromCombination,
}

/// Which part of a suffix identifies a private link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SuffixMatching {
    /// `1,a` and `1,b` link on `1`.
    #[default]
    FirstToken,
    /// The complete comma-separated suffix must match.
    AllTokens,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Keep `bAND`-joined occurrences of one component in a single leaf sequence.
    #[serde(default = "default_true")]
    pub aggregate_implicit_linkages: bool,

    #[serde(default)]
    pub shared_inheritance: SharedInheritance,

    #[serde(default)]
    pub suffix_matching: SuffixMatching,

    #[serde(default = "default_true")]
    pub include_annotations: bool,

    /// Merge consecutive AND-family operators in reported linkage paths.
    #[serde(default = "default_true")]
    pub collapse_operators: bool,

    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            aggregate_implicit_linkages: default_true(),
            shared_inheritance: SharedInheritance::default(),
            suffix_matching: SuffixMatching::default(),
            include_annotations: default_true(),
            collapse_operators: default_true(),
            max_rows: default_max_rows(),
        }
    }
}

impl DecoderConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_json::from_reader(reader)?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_aggregation(mut self, aggregate: bool) -> Self {
        self.aggregate_implicit_linkages = aggregate;
        self
    }

    pub fn with_shared_inheritance(mut self, mode: SharedInheritance) -> Self {
        self.shared_inheritance = mode;
        self
    }

    pub fn with_suffix_matching(mut self, matching: SuffixMatching) -> Self {
        self.suffix_matching = matching;
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }
}

fn default_true() -> bool {
    true
}

fn default_max_rows() -> usize {
    100_000
}
