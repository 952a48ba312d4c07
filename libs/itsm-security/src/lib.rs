//! Permission scope descriptors consumed by the ITSM repositories.
//!
//! A [`ScopeDescriptor`] is built once per request by the authorization
//! subsystem and handed to repositories as `Option<&ScopeDescriptor>`.
//! `None` is the trusted system context. Repositories never inspect the
//! descriptor directly; they ask it for the [`Visibility`] that applies to
//! a permission [`Namespace`] and let the query layer turn that into SQL.

pub mod permission;
pub mod role;
pub mod scope;
pub mod visibility;

pub use permission::{Action, Namespace, Permission, PermissionParseError};
pub use role::Role;
pub use scope::{ScopeDescriptor, ScopeDescriptorBuilder};
pub use visibility::{Grants, Visibility};
