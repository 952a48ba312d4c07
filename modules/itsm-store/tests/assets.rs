#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use chrono::{Datelike, NaiveDate, Utc};
use common::{World, manager, requester, setup};
use itsm_db::{PageRequest, RepoError};
use itsm_security::{Action, Namespace, Role, ScopeDescriptor};
use itsm_store::domain::{Asset, AssetFilter, AssetPatch, AssetStatus, NewAsset};
use uuid::Uuid;

fn laptop(filiale: i64) -> NewAsset {
    NewAsset {
        name: "ThinkPad T14".to_owned(),
        asset_type: "laptop".to_owned(),
        status: AssetStatus::InStock,
        serial_number: Some("PF-3XK2".to_owned()),
        department_id: None,
        filiale_id: filiale,
        owner_id: None,
        purchased_at: NaiveDate::from_ymd_opt(2024, 2, 1),
    }
}

async fn add(world: &World, new: NewAsset) -> Asset {
    world.repos.assets.create(new).await.unwrap()
}

#[tokio::test]
async fn create_allocates_asset_codes() {
    let world = setup().await;
    let first = add(&world, laptop(1)).await;
    let second = add(&world, laptop(1)).await;
    let year = Utc::now().year();
    assert_eq!(first.code, format!("AST-{year}-0001"));
    assert_eq!(second.code, format!("AST-{year}-0002"));

    let by_code = world.repos.assets.get_by_code(None, &second.code).await.unwrap();
    assert_eq!(by_code.id, second.id);
    assert_eq!(by_code.purchased_at, NaiveDate::from_ymd_opt(2024, 2, 1));
}

#[tokio::test]
async fn filiale_and_owner_visibility() {
    let world = setup().await;
    let owner = Uuid::new_v4();
    let in_branch = add(&world, laptop(10)).await;
    let owned = add(
        &world,
        NewAsset {
            owner_id: Some(owner),
            ..laptop(20)
        },
    )
    .await;
    let in_department = add(
        &world,
        NewAsset {
            department_id: Some(3),
            ..laptop(30)
        },
    )
    .await;

    let branch_agent = ScopeDescriptor::builder()
        .user_id(Uuid::new_v4())
        .role(Role::Agent)
        .filiale(10)
        .permission(Namespace::ASSETS, Action::ViewFiliale)
        .build();
    let page = world
        .repos
        .assets
        .list(Some(&branch_agent), &AssetFilter::default(), PageRequest::first(10))
        .await
        .unwrap();
    assert_eq!(page.items.iter().map(|a| a.id).collect::<Vec<_>>(), vec![in_branch.id]);

    let mine = requester(owner);
    assert_eq!(world.repos.assets.get(Some(&mine), owned.id).await.unwrap().id, owned.id);
    assert!(world.repos.assets.get(Some(&mine), in_branch.id).await.unwrap_err().is_not_found());

    let dept = manager(3);
    assert_eq!(
        world.repos.assets.count(Some(&dept), &AssetFilter::default()).await.unwrap(),
        1
    );
    assert!(world.repos.assets.get(Some(&dept), in_department.id).await.is_ok());
}

#[tokio::test]
async fn filters_and_updates() {
    let world = setup().await;
    let laptop_a = add(&world, laptop(1)).await;
    add(
        &world,
        NewAsset {
            name: "Dell U2720Q".to_owned(),
            asset_type: "monitor".to_owned(),
            ..laptop(1)
        },
    )
    .await;

    let monitors = AssetFilter {
        asset_type: Some("monitor".to_owned()),
        ..AssetFilter::default()
    };
    assert_eq!(world.repos.assets.count(None, &monitors).await.unwrap(), 1);

    let by_name = AssetFilter {
        search: Some("thinkpad".to_owned()),
        ..AssetFilter::default()
    };
    assert_eq!(world.repos.assets.count(None, &by_name).await.unwrap(), 1);

    let updated = world
        .repos
        .assets
        .update(
            None,
            laptop_a.id,
            AssetPatch {
                status: Some(AssetStatus::Maintenance),
                serial_number: Some(None),
                ..AssetPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, AssetStatus::Maintenance);
    assert_eq!(updated.serial_number, None);
    assert!(updated.updated_at >= laptop_a.updated_at);

    let in_maintenance = AssetFilter {
        statuses: vec![AssetStatus::Maintenance],
        ..AssetFilter::default()
    };
    assert_eq!(world.repos.assets.count(None, &in_maintenance).await.unwrap(), 1);

    let err = world
        .repos
        .assets
        .update(
            None,
            laptop_a.id,
            AssetPatch {
                name: Some(String::new()),
                ..AssetPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::MalformedInput { field: "name", .. }));
}

#[tokio::test]
async fn owner_assignment_and_soft_delete() {
    let world = setup().await;
    let asset = add(&world, laptop(1)).await;
    let owner = Uuid::new_v4();

    let assigned = world
        .repos
        .assets
        .assign_owner(None, asset.id, Some(owner))
        .await
        .unwrap();
    assert_eq!(assigned.owner_id, Some(owner));

    let scope = requester(owner);
    world.repos.assets.soft_delete(Some(&scope), asset.id).await.unwrap();
    assert!(world.repos.assets.get(None, asset.id).await.unwrap_err().is_not_found());

    let with_deleted = AssetFilter {
        include_deleted: true,
        ..AssetFilter::default()
    };
    let page = world
        .repos
        .assets
        .list(None, &with_deleted, PageRequest::first(5))
        .await
        .unwrap();
    assert!(page.items[0].deleted_at.is_some());

    // The code stays taken.
    let next = add(&world, laptop(1)).await;
    assert!(next.code.ends_with("-0002"));
}
