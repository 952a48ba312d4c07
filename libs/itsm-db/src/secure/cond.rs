use itsm_security::{Grants, Namespace, ScopeDescriptor, Visibility};
use sea_orm::sea_query::{Alias, Expr, Query, SimpleExpr};
use sea_orm::{Condition, EntityTrait, Value};
use tracing::warn;

use crate::secure::ScopableEntity;

/// Predicate that matches no row.
#[must_use]
pub fn deny_all() -> Condition {
    Condition::all().add(Expr::value(false))
}

/// Build the visibility predicate for `E` under `scope` in `namespace`.
///
/// # Policy
/// - `None` scope (trusted system context) or an unrestricted entity: no predicate
/// - malformed descriptor: deny all, logged at `warn`
/// - admin or `<ns>.view_all`: no predicate
/// - otherwise an OR of department, filiale, owner, assignee and membership
///   clauses, each emitted only when the entity declares the column and the
///   descriptor carries the grant
/// - no clause applicable: deny all, logged at `warn`
///
/// Columns are table-qualified so the predicate stays valid inside joins and
/// correlated subqueries.
pub fn build_scope_condition<E>(
    scope: Option<&ScopeDescriptor>,
    namespace: Namespace,
) -> Option<Condition>
where
    E: ScopableEntity,
{
    let scope = scope?;
    if E::IS_UNRESTRICTED {
        return None;
    }
    if !scope.is_well_formed() {
        warn!(
            table = E::default().table_name(),
            %namespace,
            role = %scope.role(),
            "scope descriptor is malformed; denying all rows"
        );
        return Some(deny_all());
    }
    match scope.visibility(namespace) {
        Visibility::All => None,
        Visibility::Restricted(grants) => Some(grants_condition::<E>(&grants, namespace)),
    }
}

fn grants_condition<E>(grants: &Grants, namespace: Namespace) -> Condition
where
    E: ScopableEntity,
{
    let entity = E::default();
    let mut any = Condition::any();
    let mut clauses = 0usize;

    if !grants.departments.is_empty()
        && let Some(col) = E::department_col()
    {
        any = any.add(Expr::col((entity, col)).is_in(grants.departments.iter().copied()));
        clauses += 1;
    }
    if !grants.filiales.is_empty()
        && let Some(col) = E::filiale_col()
    {
        any = any.add(Expr::col((entity, col)).is_in(grants.filiales.iter().copied()));
        clauses += 1;
    }
    if let Some(user) = grants.user {
        for col in [E::owner_col(), E::assignee_col()].into_iter().flatten() {
            any = any.add(Expr::col((entity, col)).eq(user));
            clauses += 1;
        }
        if let Some(exists) = membership_exists::<E>(user) {
            any = any.add(exists);
            clauses += 1;
        }
    }

    if clauses == 0 {
        warn!(
            table = entity.table_name(),
            %namespace,
            "no visibility grant applies to this table; denying all rows"
        );
        return deny_all();
    }
    any
}

fn membership_exists<E>(user: uuid::Uuid) -> Option<SimpleExpr>
where
    E: ScopableEntity,
{
    let membership = E::membership()?;
    let resource_col = E::resource_col()?;
    let table = Alias::new(membership.table);

    let mut sub = Query::select();
    sub.expr(Expr::value(1))
        .from(table.clone())
        .cond_where(
            Condition::all()
                .add(
                    Expr::col((table.clone(), Alias::new(membership.resource_fk)))
                        .equals((E::default(), resource_col)),
                )
                .add(Expr::col((table, Alias::new(membership.user_col))).eq(user)),
        );
    Some(Expr::exists(sub))
}

/// Scope a table that mixes several permission namespaces in one column,
/// e.g. tickets partitioned by `category`.
///
/// Produces `OR_i (column = value_i AND visibility(ns_i))`. Rows whose
/// discriminator is not listed are never returned for a scoped caller.
/// Returns `None` when every partition is fully visible.
pub fn scope_by_discriminator<E, V>(
    scope: Option<&ScopeDescriptor>,
    column: E::Column,
    partitions: &[(V, Namespace)],
) -> Option<Condition>
where
    E: ScopableEntity,
    V: Into<Value> + Clone,
{
    let scope = scope?;
    if E::IS_UNRESTRICTED {
        return None;
    }

    let branches: Vec<(V, Option<Condition>)> = partitions
        .iter()
        .map(|(value, ns)| (value.clone(), build_scope_condition::<E>(Some(scope), *ns)))
        .collect();
    if branches.iter().all(|(_, cond)| cond.is_none()) {
        return None;
    }

    let mut any = Condition::any();
    for (value, cond) in branches {
        let value: Value = value.into();
        let mut branch = Condition::all().add(Expr::col((E::default(), column)).eq(value));
        if let Some(cond) = cond {
            branch = branch.add(cond);
        }
        any = any.add(branch);
    }
    Some(any)
}

/// `EXISTS (SELECT 1 FROM parent WHERE parent.pk = child.fk AND <parent_cond>)`.
///
/// Soft-deleted parents never match. Parents without a resource column
/// cannot be joined and yield `FALSE`.
pub fn parent_visible<C, P>(child_fk: C::Column, parent_cond: Condition) -> SimpleExpr
where
    C: EntityTrait,
    P: ScopableEntity,
{
    let Some(parent_pk) = P::resource_col() else {
        return Expr::value(false);
    };
    let mut cond = Condition::all()
        .add(Expr::col((P::default(), parent_pk)).equals((C::default(), child_fk)))
        .add(parent_cond);
    if let Some(deleted) = P::soft_delete_col() {
        cond = cond.add(Expr::col((P::default(), deleted)).is_null());
    }
    let mut sub = Query::select();
    sub.expr(Expr::value(1)).from(P::default()).cond_where(cond);
    Expr::exists(sub)
}

/// Visibility for a child table whose rows are also visible through their
/// parent, e.g. time entries through tickets.
///
/// `own OR EXISTS(parent visible)`. `parent_scope` is the parent's already
/// composed predicate (`None` = every parent visible, hence every child).
pub fn scope_via_parent<C, P>(
    scope: Option<&ScopeDescriptor>,
    namespace: Namespace,
    child_fk: C::Column,
    parent_scope: Option<Condition>,
) -> Option<Condition>
where
    C: ScopableEntity,
    P: ScopableEntity,
{
    let own = build_scope_condition::<C>(scope, namespace)?;
    let parent = parent_scope?;
    Some(
        Condition::any()
            .add(own)
            .add(parent_visible::<C, P>(child_fk, parent)),
    )
}
