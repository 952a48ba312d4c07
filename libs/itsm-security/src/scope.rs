use std::collections::BTreeSet;

use uuid::Uuid;

use crate::permission::{Action, Namespace, Permission};
use crate::role::Role;
use crate::visibility::{Grants, Visibility};

/// Per-request permission context handed to repositories.
///
/// Owned by the authorization subsystem; repositories only read it.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct ScopeDescriptor {
    user_id: Uuid,
    #[serde(default)]
    role: Role,
    #[serde(default)]
    department_ids: Vec<i64>,
    #[serde(default)]
    filiale_ids: Vec<i64>,
    #[serde(default)]
    permissions: BTreeSet<Permission>,
}

impl ScopeDescriptor {
    #[must_use]
    pub fn builder() -> ScopeDescriptorBuilder {
        ScopeDescriptorBuilder::default()
    }

    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn department_ids(&self) -> &[i64] {
        &self.department_ids
    }

    #[must_use]
    pub fn filiale_ids(&self) -> &[i64] {
        &self.filiale_ids
    }

    #[must_use]
    pub fn permissions(&self) -> &BTreeSet<Permission> {
        &self.permissions
    }

    #[must_use]
    pub fn has_permission(&self, namespace: Namespace, action: &Action) -> bool {
        self.permissions.iter().any(|p| p.grants(namespace, action))
    }

    /// True when the descriptor has a shape the visibility rules understand.
    ///
    /// An unrecognised role means the authorization subsystem and this layer
    /// disagree about the contract, so such descriptors see nothing.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.role != Role::Unknown
    }

    /// Resolve the rows this descriptor may see in `namespace`.
    ///
    /// Rules, in order:
    /// 1. malformed descriptor: nothing
    /// 2. admin role or `<ns>.view_all`: everything
    /// 3. `<ns>.view_department` or manager role: own departments
    /// 4. `<ns>.view_filiale`: own filiales
    /// 5. non-nil user id: rows owned by, assigned to, or watched by the user
    ///
    /// Grants from 3-5 are OR-ed.
    #[must_use]
    pub fn visibility(&self, namespace: Namespace) -> Visibility {
        if !self.is_well_formed() {
            return Visibility::deny_all();
        }
        if self.role.is_admin() || self.has_permission(namespace, &Action::ViewAll) {
            return Visibility::All;
        }

        let mut grants = Grants::default();
        if self.role == Role::Manager || self.has_permission(namespace, &Action::ViewDepartment) {
            grants.departments.clone_from(&self.department_ids);
        }
        if self.has_permission(namespace, &Action::ViewFiliale) {
            grants.filiales.clone_from(&self.filiale_ids);
        }
        if !self.user_id.is_nil() {
            grants.user = Some(self.user_id);
        }
        Visibility::Restricted(grants)
    }
}

#[derive(Default)]
pub struct ScopeDescriptorBuilder {
    user_id: Option<Uuid>,
    role: Option<Role>,
    department_ids: Vec<i64>,
    filiale_ids: Vec<i64>,
    permissions: BTreeSet<Permission>,
}

impl ScopeDescriptorBuilder {
    #[must_use]
    pub fn user_id(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    #[must_use]
    pub fn department(mut self, department_id: i64) -> Self {
        self.department_ids.push(department_id);
        self
    }

    #[must_use]
    pub fn filiale(mut self, filiale_id: i64) -> Self {
        self.filiale_ids.push(filiale_id);
        self
    }

    #[must_use]
    pub fn permission(mut self, namespace: Namespace, action: Action) -> Self {
        self.permissions.insert(Permission::new(namespace, action));
        self
    }

    #[must_use]
    pub fn add_permission(mut self, permission: Permission) -> Self {
        self.permissions.insert(permission);
        self
    }

    #[must_use]
    pub fn build(self) -> ScopeDescriptor {
        ScopeDescriptor {
            user_id: self.user_id.unwrap_or_default(),
            role: self.role.unwrap_or_default(),
            department_ids: self.department_ids,
            filiale_ids: self.filiale_ids,
            permissions: self.permissions,
        }
    }
}
