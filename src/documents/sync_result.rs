use serde::{Deserialize, Serialize};
use valuable::Valuable;

/// Outcome of one platform sync. Counts reflect what was durably written.
#[derive(Serialize, Deserialize, Valuable, Default, Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub imported: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,

    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl SyncResult {
    pub fn fail(&mut self, error: String) {
        self.failed += 1;
        self.errors.push(error);
    }

    pub fn total(&self) -> usize {
        self.imported + self.updated + self.unchanged + self.failed
    }
}
