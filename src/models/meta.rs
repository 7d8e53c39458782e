use serde::{Deserialize, Serialize};

/// Selection lists used to populate wager and cash entry fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaConfig {
    #[serde(default)]
    pub sports: Vec<String>,
    #[serde(default)]
    pub leagues: Vec<String>,
    #[serde(default)]
    pub bookies: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl MetaConfig {
    /// Trim every entry and drop blanks, keeping order. Edits arrive as
    /// newline-split text, so stray empty lines are common.
    pub fn normalized(self) -> Self {
        fn clean(values: Vec<String>) -> Vec<String> {
            values
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect()
        }

        Self {
            sports: clean(self.sports),
            leagues: clean(self.leagues),
            bookies: clean(self.bookies),
            types: clean(self.types),
        }
    }
}
