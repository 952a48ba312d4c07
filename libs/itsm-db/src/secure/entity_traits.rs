use sea_orm::EntityTrait;

/// Side table that grants a user visibility of a row, e.g. ticket watchers.
///
/// A row is visible when `table` holds a record whose `resource_fk` equals
/// the row's resource column and whose `user_col` equals the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Membership {
    pub table: &'static str,
    pub resource_fk: &'static str,
    pub user_col: &'static str,
}

/// Columns the scope composer filters on.
///
/// Every dimension is declared explicitly as `Some(Column::...)` or `None`;
/// a dimension that is `None` simply contributes no clause. Usually derived:
///
/// ```rust,ignore
/// #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Scopable)]
/// #[sea_orm(table_name = "assets")]
/// #[secure(
///     resource_col = "id",
///     department_col = "department_id",
///     filiale_col = "filiale_id",
///     owner_col = "owner_id",
///     soft_delete_col = "deleted_at"
/// )]
/// pub struct Model { /* ... */ }
/// ```
///
/// Global lookup tables use `#[secure(unrestricted)]` and are never filtered.
pub trait ScopableEntity: EntityTrait {
    /// Set by `#[secure(unrestricted)]`. Scope predicates are skipped entirely.
    const IS_UNRESTRICTED: bool = false;

    /// Primary key, used for id lookups, tiebreak ordering and membership joins.
    fn resource_col() -> Option<Self::Column>;

    fn department_col() -> Option<Self::Column>;

    fn filiale_col() -> Option<Self::Column>;

    /// Creator or requester of the row.
    fn owner_col() -> Option<Self::Column>;

    fn assignee_col() -> Option<Self::Column>;

    /// Nullable timestamp; non-null rows are hidden unless explicitly included.
    fn soft_delete_col() -> Option<Self::Column>;

    fn membership() -> Option<Membership> {
        None
    }
}
