#![allow(clippy::unwrap_used, clippy::expect_used)]

use itsm_security::{Action, Grants, Namespace, Role, ScopeDescriptor, Visibility};
use uuid::Uuid;

#[test]
fn admin_sees_everything() {
    let scope = ScopeDescriptor::builder()
        .user_id(Uuid::new_v4())
        .role(Role::Admin)
        .build();
    assert_eq!(scope.visibility(Namespace::INCIDENTS), Visibility::All);
    assert_eq!(scope.visibility(Namespace::ASSETS), Visibility::All);
}

#[test]
fn view_all_is_namespace_specific() {
    let scope = ScopeDescriptor::builder()
        .user_id(Uuid::new_v4())
        .role(Role::Agent)
        .permission(Namespace::CHANGES, Action::ViewAll)
        .build();
    assert!(scope.visibility(Namespace::CHANGES).is_all());
    assert!(!scope.visibility(Namespace::INCIDENTS).is_all());
}

#[test]
fn agent_with_department_permission() {
    let user = Uuid::new_v4();
    let scope = ScopeDescriptor::builder()
        .user_id(user)
        .role(Role::Agent)
        .department(5)
        .department(7)
        .filiale(2)
        .permission(Namespace::INCIDENTS, Action::ViewDepartment)
        .build();

    assert_eq!(
        scope.visibility(Namespace::INCIDENTS),
        Visibility::Restricted(Grants {
            departments: vec![5, 7],
            filiales: vec![],
            user: Some(user),
        })
    );
    // No grant in another namespace: only own rows.
    assert_eq!(
        scope.visibility(Namespace::ASSETS),
        Visibility::Restricted(Grants {
            departments: vec![],
            filiales: vec![],
            user: Some(user),
        })
    );
}

#[test]
fn manager_gets_departments_everywhere() {
    let scope = ScopeDescriptor::builder()
        .user_id(Uuid::new_v4())
        .role(Role::Manager)
        .department(3)
        .build();
    for ns in [Namespace::INCIDENTS, Namespace::PROJECTS, Namespace::AUDIT] {
        match scope.visibility(ns) {
            Visibility::Restricted(g) => assert_eq!(g.departments, vec![3]),
            Visibility::All => panic!("manager must not see everything in {ns}"),
        }
    }
}

#[test]
fn filiale_permission() {
    let scope = ScopeDescriptor::builder()
        .user_id(Uuid::new_v4())
        .filiale(11)
        .permission(Namespace::ASSETS, Action::ViewFiliale)
        .build();
    match scope.visibility(Namespace::ASSETS) {
        Visibility::Restricted(g) => {
            assert_eq!(g.filiales, vec![11]);
            assert!(g.departments.is_empty());
        }
        Visibility::All => panic!("filiale grant is not unrestricted"),
    }
}

#[test]
fn unknown_role_is_denied_even_with_permissions() {
    let scope = ScopeDescriptor::builder()
        .user_id(Uuid::new_v4())
        .role(Role::Unknown)
        .permission(Namespace::INCIDENTS, Action::ViewAll)
        .build();
    assert!(!scope.is_well_formed());
    assert_eq!(scope.visibility(Namespace::INCIDENTS), Visibility::deny_all());
}

#[test]
fn anonymous_descriptor_grants_nothing() {
    let scope = ScopeDescriptor::builder().build();
    match scope.visibility(Namespace::INCIDENTS) {
        Visibility::Restricted(g) => assert!(g.is_empty()),
        Visibility::All => panic!("anonymous descriptor must not see everything"),
    }
}
