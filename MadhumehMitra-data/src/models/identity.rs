use serde::{Deserialize, Serialize};

/// Who a store read or write is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Identity {
    /// Unauthenticated local usage
    Guest,

    /// Signed-in user, addressed by the auth provider's user id
    User(String),
}

impl Identity {
    /// Whether this identity belongs to a signed-in user
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::User(_))
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identity::Guest => write!(f, "guest"),
            Identity::User(id) => write!(f, "user:{}", id),
        }
    }
}
