use serde::{Deserialize, Serialize};

pub const DEFAULT_NARRATIVE_MIN_CHARS: usize = 50;
pub const DEFAULT_MAX_DEPENDENTS: i32 = 20;

/// Thresholds applied by the validation rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    pub narrative_min_chars: usize,
    pub max_dependents: i32,
    pub full_name_min_chars: usize,
    pub national_id_min_chars: usize,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            narrative_min_chars: DEFAULT_NARRATIVE_MIN_CHARS,
            max_dependents: DEFAULT_MAX_DEPENDENTS,
            full_name_min_chars: 2,
            national_id_min_chars: 5,
        }
    }
}
