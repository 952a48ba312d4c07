use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use itsm_security::{Namespace, ScopeDescriptor};
use sea_orm::sea_query::{ConditionExpression, Expr};
use sea_orm::{
    Condition, ConnectionTrait, DbErr, DeleteMany, EntityTrait, IdenStatic, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Related, Select, SelectTwo, UpdateMany,
};
use uuid::Uuid;

use crate::paging::Window;
use crate::secure::ScopableEntity;
use crate::secure::cond::{build_scope_condition, deny_all};

/// Typestate marker: no visibility predicate applied yet. Cannot execute.
#[derive(Debug, Clone, Copy)]
pub struct Unscoped;

/// Typestate marker: visibility applied. Can execute.
#[derive(Debug, Clone, Copy)]
pub struct Scoped;

/// Immutable description of a scoped query.
///
/// The visibility predicate, caller filters and the soft-delete rule live in
/// one `Condition`, so `count` and the paged SELECT built from the same value
/// always agree on the row set.
///
/// ```rust,ignore
/// let query = SecureQuery::<asset::Entity, Unscoped>::new()
///     .filter(asset::Column::Status.eq("in_use"))
///     .scoped(scope, Namespace::ASSETS)
///     .order_by(asset::Column::CreatedAt, Order::Desc);
/// let (rows, total) = query.page(conn, window).await?;
/// ```
#[must_use]
#[derive(Clone, Debug)]
pub struct SecureQuery<E: EntityTrait, S> {
    condition: Condition,
    include_deleted: bool,
    order: Vec<(E::Column, Order)>,
    _state: PhantomData<S>,
}

impl<E: ScopableEntity> Default for SecureQuery<E, Unscoped> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ScopableEntity> SecureQuery<E, Unscoped> {
    pub fn new() -> Self {
        Self {
            condition: Condition::all(),
            include_deleted: false,
            order: Vec::new(),
            _state: PhantomData,
        }
    }

    /// Apply the visibility of `scope` in `namespace`.
    pub fn scoped(
        self,
        scope: Option<&ScopeDescriptor>,
        namespace: Namespace,
    ) -> SecureQuery<E, Scoped> {
        self.scoped_by(build_scope_condition::<E>(scope, namespace))
    }

    /// Apply an already composed visibility predicate (`None` = unrestricted),
    /// e.g. one built by `scope_by_discriminator` or `scope_via_parent`.
    pub fn scoped_by(self, visibility: Option<Condition>) -> SecureQuery<E, Scoped> {
        let condition = match visibility {
            Some(v) => self.condition.add(v),
            None => self.condition,
        };
        SecureQuery {
            condition,
            include_deleted: self.include_deleted,
            order: self.order,
            _state: PhantomData,
        }
    }
}

impl<E: ScopableEntity, S> SecureQuery<E, S> {
    /// AND an extra predicate. Visibility is never widened by a filter.
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Into<ConditionExpression>,
    {
        self.condition = self.condition.add(filter);
        self
    }

    /// Apply `filter` only when `value` is present.
    pub fn filter_opt<T, F>(self, value: Option<T>, filter: F) -> Self
    where
        F: FnOnce(T) -> Condition,
    {
        match value {
            Some(v) => self.filter(filter(v)),
            None => self,
        }
    }

    /// Return soft-deleted rows too.
    pub fn include_deleted(mut self, include: bool) -> Self {
        self.include_deleted = include;
        self
    }

    /// Ordering is applied in call order; the resource column is appended
    /// as a final tiebreak so pages are stable.
    pub fn order_by(mut self, col: E::Column, order: Order) -> Self {
        self.order.push((col, order));
        self
    }
}

impl<E> SecureQuery<E, Scoped>
where
    E: ScopableEntity,
    E::Model: Sync,
{
    /// Narrow to one row by primary key. Tables without a resource column
    /// match nothing.
    pub fn and_id(self, id: Uuid) -> Self {
        match E::resource_col() {
            Some(col) => self.filter(Expr::col((E::default(), col)).eq(id)),
            None => self.filter(deny_all()),
        }
    }

    /// The full WHERE predicate: visibility, filters and soft-delete rule.
    #[must_use]
    pub fn condition(&self) -> Condition {
        let mut cond = self.condition.clone();
        if !self.include_deleted
            && let Some(col) = E::soft_delete_col()
        {
            cond = cond.add(Expr::col((E::default(), col)).is_null());
        }
        cond
    }

    fn order_columns(&self) -> Vec<(E::Column, Order)> {
        let mut order = self.order.clone();
        if let Some(pk) = E::resource_col() {
            let already = order
                .iter()
                .any(|(col, _)| col.as_str() == pk.as_str());
            if !already {
                order.push((pk, Order::Desc));
            }
        }
        order
    }

    /// Ordered, filtered `SeaORM` select. Further narrowing is the caller's
    /// responsibility; the predicate cannot be removed from it.
    #[must_use]
    pub fn select(&self) -> Select<E> {
        self.order_columns()
            .into_iter()
            .fold(E::find().filter(self.condition()), |q, (col, ord)| {
                q.order_by(col, ord)
            })
    }

    /// # Errors
    /// Propagates driver errors.
    pub async fn all<C>(&self, conn: &C) -> Result<Vec<E::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        self.select().all(conn).await
    }

    /// # Errors
    /// Propagates driver errors.
    pub async fn one<C>(&self, conn: &C) -> Result<Option<E::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        self.select().one(conn).await
    }

    /// Row count under the same predicate as [`Self::select`], without ordering.
    ///
    /// # Errors
    /// Propagates driver errors.
    pub async fn count<C>(&self, conn: &C) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        E::find().filter(self.condition()).count(conn).await
    }

    /// # Errors
    /// Propagates driver errors.
    pub async fn exists<C>(&self, conn: &C) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        Ok(self.count(conn).await? > 0)
    }

    /// One page plus the total. COUNT runs first, then the windowed SELECT.
    ///
    /// # Errors
    /// Propagates driver errors.
    pub async fn page<C>(&self, conn: &C, window: Window) -> Result<(Vec<E::Model>, u64), DbErr>
    where
        C: ConnectionTrait,
    {
        let total = self.count(conn).await?;
        let items = self
            .select()
            .offset(window.offset)
            .limit(window.page_size)
            .all(conn)
            .await?;
        Ok((items, total))
    }

    /// Like [`Self::page`] with a LEFT JOIN to `R` for display fields.
    /// The join never changes which rows are counted.
    ///
    /// # Errors
    /// Propagates driver errors.
    pub async fn page_also_related<R, C>(
        &self,
        conn: &C,
        window: Window,
    ) -> Result<(Vec<(E::Model, Option<R::Model>)>, u64), DbErr>
    where
        R: EntityTrait,
        E: Related<R>,
        C: ConnectionTrait,
    {
        let total = self.count(conn).await?;
        let query: SelectTwo<E, R> = self.select().find_also_related(R::default());
        let items = query
            .offset(window.offset)
            .limit(window.page_size)
            .all(conn)
            .await?;
        Ok((items, total))
    }

    /// Bulk update restricted to the visible rows.
    #[must_use]
    pub fn update_many(&self) -> UpdateMany<E> {
        E::update_many().filter(self.condition())
    }

    /// Hard delete restricted to the visible rows.
    #[must_use]
    pub fn delete_many(&self) -> DeleteMany<E> {
        E::delete_many().filter(self.condition())
    }

    /// Stamp the soft-delete column on every visible live row.
    ///
    /// # Errors
    /// `DbErr::Custom` if the table has no soft-delete column.
    pub async fn soft_delete<C>(&self, conn: &C, at: DateTime<Utc>) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let col = soft_delete_col::<E>()?;
        let res = E::update_many()
            .col_expr(col, Expr::value(at))
            .filter(
                self.condition
                    .clone()
                    .add(Expr::col((E::default(), col)).is_null()),
            )
            .exec(conn)
            .await?;
        Ok(res.rows_affected)
    }

    /// Clear the soft-delete column on every visible deleted row.
    ///
    /// # Errors
    /// `DbErr::Custom` if the table has no soft-delete column.
    pub async fn restore<C>(&self, conn: &C) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let col = soft_delete_col::<E>()?;
        let res = E::update_many()
            .col_expr(col, Expr::value(Option::<DateTime<Utc>>::None))
            .filter(
                self.condition
                    .clone()
                    .add(Expr::col((E::default(), col)).is_not_null()),
            )
            .exec(conn)
            .await?;
        Ok(res.rows_affected)
    }
}

fn soft_delete_col<E: ScopableEntity>() -> Result<E::Column, DbErr> {
    E::soft_delete_col().ok_or_else(|| {
        DbErr::Custom(format!(
            "table {} has no soft-delete column",
            sea_orm::EntityName::table_name(&E::default())
        ))
    })
}
