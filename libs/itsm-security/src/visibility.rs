use uuid::Uuid;

/// Row visibility a descriptor resolves to for one namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Visibility {
    /// No predicate is needed.
    All,
    /// Rows matching any of the grants are visible. An empty `Grants`
    /// means nothing is visible.
    Restricted(Grants),
}

impl Visibility {
    #[must_use]
    pub fn deny_all() -> Self {
        Self::Restricted(Grants::default())
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Individual visibility grants, OR-ed together by the query layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grants {
    pub departments: Vec<i64>,
    pub filiales: Vec<i64>,
    /// Caller identity for owner / assignee / membership matches.
    pub user: Option<Uuid>,
}

impl Grants {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.departments.is_empty() && self.filiales.is_empty() && self.user.is_none()
    }
}
