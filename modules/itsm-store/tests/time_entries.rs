#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use chrono::NaiveDate;
use common::{manager, open_ticket, requester, setup};
use itsm_db::{PageRequest, RepoError};
use itsm_store::domain::NewTimeEntry;
use uuid::Uuid;

fn entry(ticket_id: Uuid, user_id: Uuid, minutes: i32) -> NewTimeEntry {
    NewTimeEntry {
        ticket_id,
        user_id,
        minutes,
        work_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        description: Some("diagnosis".to_owned()),
    }
}

#[tokio::test]
async fn entries_are_visible_via_ticket_or_authorship() {
    let world = setup().await;
    let repo = &world.repos.time_entries;
    let ticket = open_ticket(&world, 5).await;
    let tech = Uuid::new_v4();
    let other = Uuid::new_v4();

    let own = repo.create(entry(ticket.id, tech, 30)).await.unwrap();
    repo.create(entry(ticket.id, other, 45)).await.unwrap();

    // Department manager sees everything logged on the ticket.
    let dept = manager(5);
    let page = repo
        .list_for_ticket(Some(&dept), ticket.id, PageRequest::first(10))
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(repo.total_minutes_for_ticket(Some(&dept), ticket.id).await.unwrap(), 75);

    // The technician cannot see the ticket, only their own entry.
    let me = requester(tech);
    let page = repo
        .list_for_ticket(Some(&me), ticket.id, PageRequest::first(10))
        .await
        .unwrap();
    assert_eq!(page.items.iter().map(|e| e.id).collect::<Vec<_>>(), vec![own.id]);
    assert_eq!(repo.total_minutes_for_ticket(Some(&me), ticket.id).await.unwrap(), 30);

    let stranger = manager(9);
    assert_eq!(repo.total_minutes_for_ticket(Some(&stranger), ticket.id).await.unwrap(), 0);
    assert!(repo.get(Some(&stranger), own.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn create_validates_minutes_and_ticket() {
    let world = setup().await;
    let repo = &world.repos.time_entries;
    let ticket = open_ticket(&world, 1).await;

    let err = repo.create(entry(ticket.id, Uuid::new_v4(), 0)).await.unwrap_err();
    assert!(matches!(err, RepoError::MalformedInput { field: "minutes", .. }));

    let err = repo
        .create(entry(Uuid::new_v4(), Uuid::new_v4(), 10))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    world.repos.tickets.soft_delete(None, ticket.id).await.unwrap();
    let err = repo.create(entry(ticket.id, Uuid::new_v4(), 10)).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_respects_visibility() {
    let world = setup().await;
    let repo = &world.repos.time_entries;
    let ticket = open_ticket(&world, 2).await;
    let tech = Uuid::new_v4();
    let logged = repo.create(entry(ticket.id, tech, 15)).await.unwrap();

    let err = repo.delete(Some(&manager(7)), logged.id).await.unwrap_err();
    assert!(err.is_not_found());

    repo.delete(Some(&requester(tech)), logged.id).await.unwrap();
    assert!(repo.get(None, logged.id).await.unwrap_err().is_not_found());
    assert_eq!(repo.total_minutes_for_ticket(None, ticket.id).await.unwrap(), 0);
}

#[tokio::test]
async fn entries_of_a_deleted_ticket_are_hidden() {
    let world = setup().await;
    let repo = &world.repos.time_entries;
    let ticket = open_ticket(&world, 5).await;
    let tech = Uuid::new_v4();
    let logged = repo.create(entry(ticket.id, tech, 20)).await.unwrap();

    world.repos.tickets.soft_delete(None, ticket.id).await.unwrap();

    let dept = manager(5);
    let page = repo
        .list_for_ticket(Some(&dept), ticket.id, PageRequest::first(10))
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert_eq!(repo.total_minutes_for_ticket(Some(&dept), ticket.id).await.unwrap(), 0);
    assert!(repo.get(Some(&dept), logged.id).await.unwrap_err().is_not_found());
    assert!(repo.delete(Some(&dept), logged.id).await.unwrap_err().is_not_found());

    // The author keeps access to their own entry.
    let author = requester(tech);
    assert_eq!(repo.get(Some(&author), logged.id).await.unwrap().id, logged.id);
}
