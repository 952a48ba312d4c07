// Proc-macro crate for itsm-db secure query derives
//
//! # itsm-db-macros
//!
//! ## `#[derive(Scopable)]`
//!
//! Implements `itsm_db::secure::ScopableEntity` for a `SeaORM` entity from
//! `#[secure(...)]` attributes placed on the `Model` struct.
//!
//! Every visibility dimension needs an explicit decision so that adding a
//! table never silently widens what callers can see:
//!
//! - **Resource**: `resource_col = "id"` or `no_resource`
//! - **Department**: `department_col = "department_id"` or `no_department`
//! - **Filiale**: `filiale_col = "filiale_id"` or `no_filiale`
//! - **Owner**: `owner_col = "requester_id"` or `no_owner`
//! - **Soft delete**: `soft_delete_col = "deleted_at"` or `no_soft_delete`
//!
//! Optional:
//!
//! - `assignee_col = "assignee_id"`
//! - `member_table = "ticket_watchers", member_fk = "ticket_id", member_user = "user_id"`
//!   (all three or none)
//! - `unrestricted`: global table; forbids department, filiale, owner,
//!   assignee and membership attributes
//!
//! ```ignore
//! #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Scopable)]
//! #[sea_orm(table_name = "tickets")]
//! #[secure(
//!     resource_col = "id",
//!     department_col = "department_id",
//!     filiale_col = "filiale_id",
//!     owner_col = "requester_id",
//!     assignee_col = "assignee_id",
//!     soft_delete_col = "deleted_at",
//!     member_table = "ticket_watchers",
//!     member_fk = "ticket_id",
//!     member_user = "user_id"
//! )]
//! pub struct Model { /* ... */ }
//! ```

use proc_macro::TokenStream;
use proc_macro_error2::proc_macro_error;
use syn::{DeriveInput, parse_macro_input};

mod scopable;

/// Derive `ScopableEntity` for the `Entity` generated next to this `Model`.
#[proc_macro_derive(Scopable, attributes(secure))]
#[proc_macro_error]
pub fn derive_scopable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    scopable::expand_derive_scopable(&input).into()
}
