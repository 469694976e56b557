// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Account and role administration is gated and audited like the directory.

use staffgate_server::{DirectoryError, NewRole, NewUser, RolePatch, UserPatch};
use staffgate_server_audit::AuditEventType;
use staffgate_server_auth::{Action, Grant, ResourceKind, RoleId, RoleType, UserId};
use staffgate_server_db::AuditQuery;

use super::support::Fixture;

fn new_user(username: &str) -> NewUser {
	NewUser {
		username: username.to_string(),
		email: format!("{username}@example.com"),
		employee_id: None,
	}
}

mod accounts {
	use super::*;

	#[tokio::test]
	async fn admin_manages_the_account_lifecycle() {
		let fx = Fixture::new().await;
		let it = fx.department("IT").await;
		let e = fx.employee("IT001", it.id, 1).await;

		let created = fx
			.users
			.create_user(
				fx.admin,
				NewUser {
					employee_id: Some(e.id),
					..new_user("  erin ")
				},
			)
			.await
			.unwrap();
		assert_eq!(created.username, "erin");
		assert!(created.is_active);

		let updated = fx
			.users
			.update_user(
				fx.admin,
				created.id,
				UserPatch {
					email: Some("erin@corp.example.com".to_string()),
					employee_id: Some(None),
					..Default::default()
				},
			)
			.await
			.unwrap();
		assert_eq!(updated.email, "erin@corp.example.com");
		assert_eq!(updated.employee_id, None);

		let listed = fx.users.list_users(fx.admin).await.unwrap();
		assert!(listed.iter().any(|u| u.id == created.id));

		fx.users.delete_user(fx.admin, created.id).await.unwrap();
		let err = fx.users.get_user(fx.admin, created.id).await.unwrap_err();
		assert!(matches!(err, DirectoryError::NotFound { kind: "user", .. }));
	}

	#[tokio::test]
	async fn invalid_input_is_rejected_before_writing() {
		let fx = Fixture::new().await;
		let before = fx.users.list_users(fx.admin).await.unwrap().len();

		let err = fx
			.users
			.create_user(fx.admin, NewUser {
				email: "nobody".to_string(),
				..new_user("nobody")
			})
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::Validation(_)));

		let err = fx
			.users
			.create_user(fx.admin, NewUser {
				employee_id: Some(staffgate_server_auth::EmployeeId::generate()),
				..new_user("ghost")
			})
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::NotFound { kind: "employee", .. }));

		assert_eq!(fx.users.list_users(fx.admin).await.unwrap().len(), before);
	}

	#[tokio::test]
	async fn duplicate_username_conflicts() {
		let fx = Fixture::new().await;
		fx.users.create_user(fx.admin, new_user("erin")).await.unwrap();

		let err = fx
			.users
			.create_user(fx.admin, NewUser {
				email: "other@example.com".to_string(),
				..new_user("erin")
			})
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::Conflict(_)));
	}

	#[tokio::test]
	async fn hr_manager_lists_but_cannot_touch_accounts() {
		let fx = Fixture::new().await;
		let hr = fx.department("HR").await;
		let head = fx.employee("HR001", hr.id, 1).await;
		let user = fx.user("head", Some(&head), &[RoleType::HrManager]).await;

		assert!(!fx.users.list_users(user).await.unwrap().is_empty());

		let err = fx.users.get_user(user, fx.admin).await.unwrap_err();
		assert!(matches!(err, DirectoryError::Forbidden));
		let err = fx
			.users
			.update_user(user, user, UserPatch {
				is_active: Some(false),
				..Default::default()
			})
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::Forbidden));
		let err = fx
			.users
			.create_user(user, new_user("erin"))
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::Forbidden));
	}

	#[tokio::test]
	async fn employees_cannot_list_accounts() {
		let fx = Fixture::new().await;
		let it = fx.department("IT").await;
		let e = fx.employee("IT001", it.id, 1).await;
		let user = fx.user("plain", Some(&e), &[RoleType::Employee]).await;

		let err = fx.users.list_users(user).await.unwrap_err();
		assert!(matches!(err, DirectoryError::Forbidden));
		let err = fx.roles.list_roles(user).await.unwrap_err();
		assert!(matches!(err, DirectoryError::Forbidden));
	}

	#[tokio::test]
	async fn missing_account_is_not_found() {
		let fx = Fixture::new().await;
		let err = fx
			.users
			.delete_user(fx.admin, UserId::generate())
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::NotFound { kind: "user", .. }));
	}
}

mod assignments {
	use super::*;

	#[tokio::test]
	async fn assigned_roles_take_effect_immediately() {
		let fx = Fixture::new().await;
		let it = fx.department("IT").await;
		let sales = fx.department("Sales").await;
		let e = fx.employee("IT001", it.id, 1).await;
		let other = fx.employee("SA001", sales.id, 1).await;
		let user = fx.user("e", Some(&e), &[RoleType::Employee]).await;
		let accounting = fx.role(RoleType::Accounting).await;

		let authz = &fx.state.authz;
		assert!(!authz.include_salary(user, other.id).await.unwrap());

		fx.users.assign_role(fx.admin, user, accounting.id).await.unwrap();
		assert!(authz.include_salary(user, other.id).await.unwrap());
		let held = fx.users.list_user_roles(fx.admin, user).await.unwrap();
		assert_eq!(held.len(), 2);

		fx.users.revoke_role(fx.admin, user, accounting.id).await.unwrap();
		assert!(!authz.include_salary(user, other.id).await.unwrap());
	}

	#[tokio::test]
	async fn duplicate_and_missing_assignments_are_reported() {
		let fx = Fixture::new().await;
		let user = fx.user("e", None, &[RoleType::Employee]).await;
		let employee = fx.role(RoleType::Employee).await;
		let manager = fx.role(RoleType::Manager).await;

		let err = fx
			.users
			.assign_role(fx.admin, user, employee.id)
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::Conflict(_)));

		let err = fx
			.users
			.revoke_role(fx.admin, user, manager.id)
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::NotFound { kind: "role assignment", .. }));

		let err = fx
			.users
			.assign_role(fx.admin, user, RoleId::generate())
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::NotFound { kind: "role", .. }));
	}
}

mod roles {
	use super::*;

	fn auditor() -> NewRole {
		NewRole {
			name: "Auditor".to_string(),
			description: Some("Reads the directory".to_string()),
			role_type: RoleType::Employee,
			grants: vec![
				Grant::new(ResourceKind::Employee, Action::Read),
				Grant::new(ResourceKind::Department, Action::Read),
			],
		}
	}

	#[tokio::test]
	async fn admin_manages_custom_roles() {
		let fx = Fixture::new().await;

		let role = fx.roles.create_role(fx.admin, auditor()).await.unwrap();
		assert_eq!(role.grants().count(), 2);

		let salary = Grant::new(ResourceKind::EmployeeSalary, Action::Read);
		let role = fx
			.roles
			.update_role(fx.admin, role.id, RolePatch {
				role_type: Some(RoleType::Accounting),
				grants: Some(vec![salary]),
				..Default::default()
			})
			.await
			.unwrap();
		assert_eq!(role.role_type, RoleType::Accounting);
		assert_eq!(role.grants().collect::<Vec<_>>(), vec![salary]);
		assert_eq!(role.description.as_deref(), Some("Reads the directory"));

		fx.roles.delete_role(fx.admin, role.id).await.unwrap();
		let err = fx.roles.get_role(fx.admin, role.id).await.unwrap_err();
		assert!(matches!(err, DirectoryError::NotFound { kind: "role", .. }));
	}

	#[tokio::test]
	async fn held_roles_cannot_be_deleted() {
		let fx = Fixture::new().await;
		let role = fx.role(RoleType::Admin).await;

		let err = fx.roles.delete_role(fx.admin, role.id).await.unwrap_err();
		assert!(matches!(err, DirectoryError::Conflict(_)));
		assert!(fx.roles.get_role(fx.admin, role.id).await.is_ok());
	}

	#[tokio::test]
	async fn grants_outside_the_catalog_are_rejected() {
		let fx = Fixture::new().await;
		let err = fx
			.roles
			.create_role(fx.admin, NewRole {
				grants: vec![Grant::new(ResourceKind::EmployeeSalary, Action::Update)],
				..auditor()
			})
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::Validation(_)));

		let err = fx
			.roles
			.create_role(fx.admin, NewRole {
				name: "Employee".to_string(),
				..auditor()
			})
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::Conflict(_)));
	}

	#[tokio::test]
	async fn permission_catalog_is_admin_only() {
		let fx = Fixture::new().await;
		let permissions = fx.roles.list_permissions(fx.admin).await.unwrap();
		assert_eq!(permissions.len(), 17);

		let hr = fx.department("HR").await;
		let head = fx.employee("HR001", hr.id, 1).await;
		let user = fx.user("head", Some(&head), &[RoleType::HrManager]).await;
		let err = fx.roles.list_permissions(user).await.unwrap_err();
		assert!(matches!(err, DirectoryError::Forbidden));
	}
}

#[tokio::test]
async fn administration_is_audited() {
	let fx = Fixture::new().await;
	let user = fx
		.users
		.create_user(fx.admin, new_user("erin"))
		.await
		.unwrap();
	let role = fx
		.roles
		.create_role(fx.admin, NewRole {
			name: "Reader".to_string(),
			description: None,
			role_type: RoleType::Employee,
			grants: vec![Grant::new(ResourceKind::Employee, Action::Read)],
		})
		.await
		.unwrap();
	fx.users.assign_role(fx.admin, user.id, role.id).await.unwrap();
	fx.users.revoke_role(fx.admin, user.id, role.id).await.unwrap();
	fx.roles.delete_role(fx.admin, role.id).await.unwrap();
	fx.users.delete_user(fx.admin, user.id).await.unwrap();
	fx.flush_audit().await;

	for (event, resource_id) in [
		(AuditEventType::UserCreated, user.id.to_string()),
		(AuditEventType::RoleCreated, role.id.to_string()),
		(AuditEventType::RoleAssigned, user.id.to_string()),
		(AuditEventType::RoleRevoked, user.id.to_string()),
		(AuditEventType::RoleDeleted, role.id.to_string()),
		(AuditEventType::UserDeleted, user.id.to_string()),
	] {
		let query = AuditQuery {
			event_type: Some(event),
			actor_id: Some(fx.admin),
			..Default::default()
		};
		let page = fx.audit_log.query(fx.admin, &query).await.unwrap();
		assert_eq!(page.total, 1, "expected one {event} entry");
		assert_eq!(page.entries[0].resource_id.as_deref(), Some(resource_id.as_str()));
	}
}
