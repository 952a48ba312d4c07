use std::fmt;
use std::str::FromStr;

/// Permission area a repository query runs under, e.g. `incidents` or `assets`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(&'static str);

impl Namespace {
    pub const INCIDENTS: Self = Self("incidents");
    pub const CHANGES: Self = Self("changes");
    pub const REQUESTS: Self = Self("requests");
    pub const PROBLEMS: Self = Self("problems");
    pub const ASSETS: Self = Self("assets");
    pub const PROJECTS: Self = Self("projects");
    pub const TIMESHEETS: Self = Self("timesheets");
    pub const AUDIT: Self = Self("audit");

    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Action half of a permission. Only the visibility actions carry meaning for
/// query scoping; anything else is kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    ViewAll,
    ViewDepartment,
    ViewFiliale,
    Other(String),
}

impl Action {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ViewAll => "view_all",
            Self::ViewDepartment => "view_department",
            Self::ViewFiliale => "view_filiale",
            Self::Other(s) => s,
        }
    }

    fn parse(s: &str) -> Self {
        match s {
            "view_all" => Self::ViewAll,
            "view_department" => Self::ViewDepartment,
            "view_filiale" => Self::ViewFiliale,
            other => Self::Other(other.to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionParseError {
    #[error("expected '<namespace>.<action>', got '{0}'")]
    Format(String),
    #[error("permission segments may only contain [a-z0-9_], got '{0}'")]
    Charset(String),
}

/// A granted permission, written as `"<namespace>.<action>"`.
///
/// Examples: `incidents.view_all`, `assets.view_filiale`, `changes.approve`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Permission {
    namespace: String,
    action: Action,
}

impl Permission {
    #[must_use]
    pub fn new(namespace: Namespace, action: Action) -> Self {
        Self {
            namespace: namespace.as_str().to_owned(),
            action,
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn action(&self) -> &Action {
        &self.action
    }

    #[must_use]
    pub fn grants(&self, namespace: Namespace, action: &Action) -> bool {
        self.namespace == namespace.as_str() && &self.action == action
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.action.as_str())
    }
}

impl FromStr for Permission {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, action) = s
            .split_once('.')
            .ok_or_else(|| PermissionParseError::Format(s.to_owned()))?;
        if namespace.is_empty() || action.is_empty() {
            return Err(PermissionParseError::Format(s.to_owned()));
        }
        let valid = |seg: &str| {
            seg.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        };
        if !valid(namespace) || !valid(action) {
            return Err(PermissionParseError::Charset(s.to_owned()));
        }
        Ok(Self {
            namespace: namespace.to_owned(),
            action: Action::parse(action),
        })
    }
}

impl serde::Serialize for Permission {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Permission {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
