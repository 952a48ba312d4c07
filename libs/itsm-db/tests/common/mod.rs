#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use itsm_db::{DbConfig, SecureConn};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbBackend, Set, Statement};
use uuid::Uuid;

pub mod doc {
    use itsm_db::secure::Scopable;
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Scopable)]
    #[sea_orm(table_name = "docs")]
    #[secure(
        resource_col = "id",
        department_col = "department_id",
        filiale_col = "filiale_id",
        owner_col = "owner_id",
        assignee_col = "assignee_id",
        soft_delete_col = "deleted_at",
        member_table = "doc_watchers",
        member_fk = "doc_id",
        member_user = "user_id"
    )]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(unique)]
        pub code: String,
        pub category: String,
        pub department_id: Option<i64>,
        pub filiale_id: Option<i64>,
        pub owner_id: Option<Uuid>,
        pub assignee_id: Option<Uuid>,
        pub created_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl itsm_db::CodedEntity for Entity {
        fn code_col() -> Column {
            Column::Code
        }
    }
}

pub mod note {
    use itsm_db::secure::Scopable;
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Scopable)]
    #[sea_orm(table_name = "notes")]
    #[secure(
        resource_col = "id",
        no_department,
        no_filiale,
        owner_col = "author_id",
        no_soft_delete
    )]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub doc_id: Uuid,
        pub author_id: Uuid,
        pub body: String,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::doc::Entity",
            from = "Column::DocId",
            to = "super::doc::Column::Id"
        )]
        Doc,
    }

    impl Related<super::doc::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Doc.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod tag {
    use itsm_db::secure::Scopable;
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Scopable)]
    #[sea_orm(table_name = "tags")]
    #[secure(unrestricted, resource_col = "id")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE docs (
        id BLOB PRIMARY KEY NOT NULL,
        code TEXT NOT NULL,
        category TEXT NOT NULL,
        department_id INTEGER NULL,
        filiale_id INTEGER NULL,
        owner_id BLOB NULL,
        assignee_id BLOB NULL,
        created_at TEXT NOT NULL,
        deleted_at TEXT NULL
    )",
    "CREATE UNIQUE INDEX ux_docs_code ON docs (code)",
    "CREATE TABLE doc_watchers (
        doc_id BLOB NOT NULL,
        user_id BLOB NOT NULL,
        PRIMARY KEY (doc_id, user_id)
    )",
    "CREATE TABLE notes (
        id BLOB PRIMARY KEY NOT NULL,
        doc_id BLOB NOT NULL REFERENCES docs (id),
        author_id BLOB NOT NULL,
        body TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE tags (id BLOB PRIMARY KEY NOT NULL, name TEXT NOT NULL)",
];

/// Single-connection in-memory database; every pooled connection to
/// `sqlite::memory:` would otherwise be a separate database.
pub async fn setup() -> SecureConn {
    let cfg = DbConfig {
        max_conns: Some(1),
        min_conns: Some(1),
        ..DbConfig::default()
    };
    let db = itsm_db::connect(&cfg).await.expect("connect sqlite");
    for stmt in SCHEMA {
        db.conn().execute_unprepared(stmt).await.expect("schema");
    }
    db
}

#[derive(Clone, Debug)]
pub struct NewDoc {
    pub code: String,
    pub category: String,
    pub department_id: Option<i64>,
    pub filiale_id: Option<i64>,
    pub owner_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub age_minutes: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub deleted: bool,
}

impl NewDoc {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_owned(),
            category: "incident".to_owned(),
            department_id: None,
            filiale_id: None,
            owner_id: None,
            assignee_id: None,
            age_minutes: 0,
            created_at: None,
            deleted: false,
        }
    }

    pub fn department(mut self, id: i64) -> Self {
        self.department_id = Some(id);
        self
    }

    pub fn filiale(mut self, id: i64) -> Self {
        self.filiale_id = Some(id);
        self
    }

    pub fn owner(mut self, user: Uuid) -> Self {
        self.owner_id = Some(user);
        self
    }

    pub fn assignee(mut self, user: Uuid) -> Self {
        self.assignee_id = Some(user);
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        category.clone_into(&mut self.category);
        self
    }

    pub fn age(mut self, minutes: i64) -> Self {
        self.age_minutes = minutes;
        self
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    pub async fn insert(self, db: &SecureConn) -> doc::Model {
        let now = Utc::now();
        doc::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(self.code),
            category: Set(self.category),
            department_id: Set(self.department_id),
            filiale_id: Set(self.filiale_id),
            owner_id: Set(self.owner_id),
            assignee_id: Set(self.assignee_id),
            created_at: Set(self
                .created_at
                .unwrap_or_else(|| now - Duration::minutes(self.age_minutes))),
            deleted_at: Set(self.deleted.then_some(now)),
        }
        .insert(db.conn())
        .await
        .expect("insert doc")
    }
}

pub async fn watch(db: &SecureConn, doc_id: Uuid, user: Uuid) {
    db.conn()
        .execute(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            "INSERT INTO doc_watchers (doc_id, user_id) VALUES (?, ?)",
            [doc_id.into(), user.into()],
        ))
        .await
        .expect("insert watcher");
}

pub async fn add_note(db: &SecureConn, doc_id: Uuid, author: Uuid) -> note::Model {
    note::ActiveModel {
        id: Set(Uuid::new_v4()),
        doc_id: Set(doc_id),
        author_id: Set(author),
        body: Set("note".to_owned()),
        created_at: Set(Utc::now()),
    }
    .insert(db.conn())
    .await
    .expect("insert note")
}
