#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use chrono::{Duration, Utc};
use common::{agent, manager, requester, setup};
use itsm_db::{PageRequest, RepoError};
use itsm_security::{Action, Namespace};
use itsm_store::domain::{AuditFilter, NewAuditEntry, NewSla, Priority, SlaPatch, TicketCategory};
use serde_json::json;
use uuid::Uuid;

fn sla(priority: Priority) -> NewSla {
    NewSla {
        name: format!("Requests {priority}"),
        category: TicketCategory::ServiceRequest,
        priority,
        response_minutes: 60,
        resolution_minutes: 2880,
    }
}

#[tokio::test]
async fn applicable_sla_is_the_newest_active_one() {
    let world = setup().await;
    let repo = &world.repos.slas;
    let old = repo.create(sla(Priority::Medium)).await.unwrap();
    let new = repo.create(sla(Priority::Medium)).await.unwrap();
    repo.create(sla(Priority::High)).await.unwrap();

    let found = repo
        .find_applicable(TicketCategory::ServiceRequest, Priority::Medium)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, new.id);

    repo.deactivate(new.id).await.unwrap();
    let found = repo
        .find_applicable(TicketCategory::ServiceRequest, Priority::Medium)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, old.id);

    assert!(
        repo.find_applicable(TicketCategory::Problem, Priority::Medium)
            .await
            .unwrap()
            .is_none()
    );

    let active = repo.list(true, PageRequest::first(10)).await.unwrap();
    assert_eq!(active.total, 2);
    let all = repo.list(false, PageRequest::first(10)).await.unwrap();
    assert_eq!(all.total, 3);
}

#[tokio::test]
async fn sla_updates_are_validated() {
    let world = setup().await;
    let repo = &world.repos.slas;
    let created = repo.create(sla(Priority::Low)).await.unwrap();

    let err = repo
        .update(
            created.id,
            SlaPatch {
                response_minutes: Some(5000),
                ..SlaPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::MalformedInput { field: "response_minutes", .. }));

    let updated = repo
        .update(
            created.id,
            SlaPatch {
                resolution_minutes: Some(1440),
                ..SlaPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.resolution_minutes, 1440);
    assert_eq!(repo.get(created.id).await.unwrap(), updated);
    assert!(repo.get(Uuid::new_v4()).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn audit_is_append_only_and_scoped() {
    let world = setup().await;
    let repo = &world.repos.audit;
    let actor = Uuid::new_v4();
    let ticket = Uuid::new_v4();

    for (action, department) in [("created", 5), ("assigned", 5), ("closed", 6)] {
        repo.record(NewAuditEntry {
            entity_type: "ticket".to_owned(),
            entity_id: ticket,
            action: action.to_owned(),
            actor_id: Some(actor),
            department_id: Some(department),
            filiale_id: None,
            details: json!({ "source": "test" }),
        })
        .await
        .unwrap();
    }
    let bare = repo
        .record(NewAuditEntry {
            entity_type: "asset".to_owned(),
            entity_id: Uuid::new_v4(),
            action: "retired".to_owned(),
            actor_id: None,
            department_id: None,
            filiale_id: None,
            details: serde_json::Value::Null,
        })
        .await
        .unwrap();
    assert_eq!(bare.details, json!({}));

    let filter = AuditFilter {
        entity_id: Some(ticket),
        ..AuditFilter::default()
    };
    let page = repo.list(None, &filter, PageRequest::first(10)).await.unwrap();
    let actions: Vec<_> = page.items.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, ["closed", "assigned", "created"]);

    let dept = manager(5);
    let page = repo.list(Some(&dept), &AuditFilter::default(), PageRequest::first(10)).await.unwrap();
    assert_eq!(page.total, 2);

    let own = requester(actor);
    let page = repo.list(Some(&own), &AuditFilter::default(), PageRequest::first(10)).await.unwrap();
    assert_eq!(page.total, 3);

    let auditor = agent(Uuid::new_v4(), &[(Namespace::AUDIT, Action::ViewAll)]);
    let page = repo.list(Some(&auditor), &AuditFilter::default(), PageRequest::first(10)).await.unwrap();
    assert_eq!(page.total, 4);

    let future = AuditFilter {
        from: Some(Utc::now() + Duration::hours(1)),
        ..AuditFilter::default()
    };
    assert_eq!(repo.list(None, &future, PageRequest::first(10)).await.unwrap().total, 0);

    let err = repo
        .record(NewAuditEntry {
            entity_type: "ticket".to_owned(),
            entity_id: ticket,
            action: " ".to_owned(),
            actor_id: None,
            department_id: None,
            filiale_id: None,
            details: json!({}),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::MalformedInput { field: "action", .. }));
}
