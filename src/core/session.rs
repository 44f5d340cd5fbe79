use serde::{Deserialize, Serialize};

/// Which side of the ledger a user is looking at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    All,
    Business,
    Personal,
}

impl Scope {
    pub fn includes(&self, is_business: bool) -> bool {
        match self {
            Scope::All => true,
            Scope::Business => is_business,
            Scope::Personal => !is_business,
        }
    }
}

/// Per-user preferences passed explicitly into every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub display_currency: String,
    pub scope: Scope,
}

impl Session {
    pub fn new(display_currency: &str) -> Self {
        Self {
            display_currency: display_currency.to_string(),
            scope: Scope::All,
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }
}
