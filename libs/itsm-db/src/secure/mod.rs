//! Scoped data access.
//!
//! Every repository query is built as a [`SecureQuery`] and can only run
//! after a visibility predicate has been attached:
//!
//! ```rust,ignore
//! use itsm_db::secure::{SecureConn, ScopableEntity};
//!
//! let assets = db
//!     .find::<asset::Entity>(scope, Namespace::ASSETS)
//!     .filter(asset::Column::Status.eq("in_use"))
//!     .all(db.conn())
//!     .await?;
//! ```
//!
//! `scope = None` is the trusted system context and sees every row. A
//! descriptor the visibility rules cannot interpret sees nothing.

mod cond;
mod conn;
mod entity_traits;
mod select;

pub use cond::{
    build_scope_condition, deny_all, parent_visible, scope_by_discriminator, scope_via_parent,
};
pub use conn::SecureConn;
pub use entity_traits::{Membership, ScopableEntity};
pub use select::{Scoped, SecureQuery, Unscoped};

/// Derive macro for [`ScopableEntity`].
pub use itsm_db_macros::Scopable;
