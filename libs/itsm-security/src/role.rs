use serde::{Deserialize, Serialize};

/// Coarse role assigned by the authorization subsystem.
///
/// Any role string this crate does not recognise deserializes into
/// [`Role::Unknown`], which grants nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Sees every row in every namespace.
    Admin,
    /// Sees rows of their own departments in every namespace.
    Manager,
    /// Service desk agent; visibility comes from explicit permissions.
    Agent,
    /// End user; sees only rows they own, are assigned to, or watch.
    #[default]
    Requester,
    #[serde(other)]
    Unknown,
}

impl Role {
    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Agent => "agent",
            Self::Requester => "requester",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
