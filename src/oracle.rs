//! The request/response boundary to the external section-mutation advisor
//! (§6, §9). The core only defines the shapes; the network-calling LLM
//! adapter that actually proposes actions lives outside the core. Two
//! built-in implementations ship here: `NullOracle` (always proposes
//! nothing) and `JsonFileOracle` (reads a pre-authored actions file, for
//! tests and offline human-in-the-loop review).

use crate::actions::ProposedAction;
use crate::parser::Catalog;
use crate::types::SectionId;
use log::warn;
use std::path::{Path, PathBuf};

/// What the driver hands the oracle: the underutilized sections plus
/// enough catalog context for a human or model to reason about them.
#[derive(Debug, Clone)]
pub struct OracleRequest<'a> {
    pub underutilized: &'a [SectionId],
    pub catalog: &'a Catalog,
}

/// Proposes section-mutation actions given the current underutilized set.
/// A malformed or failed call is non-fatal: callers treat an empty
/// `Vec` as "propose nothing", which the driver's no-structural-change
/// guard (§4.6) turns into a clean stop.
pub trait Oracle {
    fn propose(&self, request: &OracleRequest) -> Vec<ProposedAction>;
}

/// The default oracle when no live adapter is wired in: always proposes
/// nothing. The driver then terminates on the next no-structural-change
/// check rather than looping uselessly.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOracle;

impl Oracle for NullOracle {
    fn propose(&self, _request: &OracleRequest) -> Vec<ProposedAction> {
        Vec::new()
    }
}

/// Reads a JSON array of `ProposedAction` from a fixed path on every call.
/// Useful for tests and for an offline workflow where a human (or an
/// out-of-process LLM adapter) writes the file between runs. Unknown
/// fields are ignored by `serde`; a malformed or missing file yields an
/// empty proposal list rather than erroring, matching the oracle error
/// taxonomy in §7 ("propose nothing" is non-fatal).
#[derive(Debug, Clone)]
pub struct JsonFileOracle {
    path: PathBuf,
}

impl JsonFileOracle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Oracle for JsonFileOracle {
    fn propose(&self, _request: &OracleRequest) -> Vec<ProposedAction> {
        read_actions_file(&self.path).unwrap_or_else(|e| {
            warn!("oracle: {e}, proposing nothing");
            Vec::new()
        })
    }
}

fn read_actions_file(path: &Path) -> Result<Vec<ProposedAction>, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read oracle actions file '{}': {e}", path.display()))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("could not parse oracle actions file '{}': {e}", path.display()))
}
