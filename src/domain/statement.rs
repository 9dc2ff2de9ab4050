use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Crisis,
    Legal,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Crisis => "crisis",
            Stage::Legal => "legal",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Both outputs of a successful run, in pipeline order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementPair {
    pub crisis_statement: String,
    pub legal_statement: String,
}
