use itsm_security::{Namespace, ScopeDescriptor};
use sea_orm::DatabaseConnection;

use crate::secure::{ScopableEntity, Scoped, SecureQuery};

/// Database handle shared by the repositories.
///
/// Cheap to clone; the inner connection is a pool.
#[derive(Clone, Debug)]
pub struct SecureConn {
    conn: DatabaseConnection,
}

impl SecureConn {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    #[must_use]
    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Start a query on `E` with the visibility of `scope` in `namespace`.
    #[allow(clippy::unused_self)]
    pub fn find<E: ScopableEntity>(
        &self,
        scope: Option<&ScopeDescriptor>,
        namespace: Namespace,
    ) -> SecureQuery<E, Scoped> {
        SecureQuery::new().scoped(scope, namespace)
    }
}

impl From<DatabaseConnection> for SecureConn {
    fn from(conn: DatabaseConnection) -> Self {
        Self::new(conn)
    }
}
