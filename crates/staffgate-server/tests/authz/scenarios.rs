// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end authorization decisions through the store-backed authorizer.

use staffgate_server::{DirectoryError, RolePatch, UserPatch};
use staffgate_server_auth::{Action, ResourceKind, RoleType, UserId};

use super::support::{id, Fixture};

#[tokio::test]
async fn admin_is_allowed_everything() {
	let fx = Fixture::new().await;
	let it = fx.department("IT").await;
	let j = fx.employee("IT001", it.id, 100).await;

	for kind in [ResourceKind::Employee, ResourceKind::EmployeeSalary] {
		for action in Action::all() {
			assert!(fx
				.state
				.authz
				.authorize(fx.admin, kind, *action, id(j.id))
				.await
				.unwrap());
		}
	}
	assert!(fx
		.state
		.authz
		.authorize(fx.admin, ResourceKind::Department, Action::Delete, id(it.id))
		.await
		.unwrap());
	assert!(fx.state.authz.include_salary(fx.admin, j.id).await.unwrap());
}

#[tokio::test]
async fn roles_union_rather_than_restrict() {
	let fx = Fixture::new().await;
	let a = fx.department("A").await;
	let b = fx.department("B").await;
	let outsider = fx.employee("A001", a.id, 1).await;
	let lead = fx.employee("B001", b.id, 1).await;
	let report = fx.employee("B002", b.id, 1).await;
	fx.make_manager(&b, &lead).await;

	let plain = fx.user("plain", Some(&report), &[RoleType::Employee]).await;
	let both = fx
		.user("both", Some(&lead), &[RoleType::Employee, RoleType::Manager])
		.await;

	let authz = &fx.state.authz;
	assert!(authz
		.authorize(plain, ResourceKind::Employee, Action::Read, id(lead.id))
		.await
		.unwrap());
	assert!(!authz
		.authorize(plain, ResourceKind::EmployeeSalary, Action::Read, id(lead.id))
		.await
		.unwrap());

	// Holding Employee as well never takes away the Manager salary read.
	assert!(authz
		.authorize(both, ResourceKind::Employee, Action::Read, id(report.id))
		.await
		.unwrap());
	assert!(authz
		.authorize(both, ResourceKind::EmployeeSalary, Action::Read, id(report.id))
		.await
		.unwrap());
	assert!(authz.include_salary(both, report.id).await.unwrap());
	assert!(!authz
		.authorize(both, ResourceKind::Employee, Action::Read, id(outsider.id))
		.await
		.unwrap());
}

mod hr {
	use super::*;

	#[tokio::test]
	async fn same_department_is_read_only() {
		let fx = Fixture::new().await;
		let hr = fx.department("HR").await;
		let actor = fx.employee("HR001", hr.id, 1).await;
		let peer = fx.employee("HR002", hr.id, 1).await;
		let user = fx.user("hr", Some(&actor), &[RoleType::HrStaff]).await;

		let authz = &fx.state.authz;
		assert!(!authz
			.authorize(user, ResourceKind::Employee, Action::Update, id(peer.id))
			.await
			.unwrap());
		assert!(authz
			.authorize(user, ResourceKind::Employee, Action::Read, id(peer.id))
			.await
			.unwrap());
		assert!(!authz.include_salary(user, peer.id).await.unwrap());
	}

	#[tokio::test]
	async fn other_departments_are_administered() {
		let fx = Fixture::new().await;
		let hr = fx.department("HR").await;
		let it = fx.department("IT").await;
		let actor = fx.employee("HR001", hr.id, 1).await;
		let target = fx.employee("IT001", it.id, 1).await;
		let user = fx.user("hr", Some(&actor), &[RoleType::HrStaff]).await;

		let authz = &fx.state.authz;
		for action in [Action::Update, Action::Delete] {
			assert!(authz
				.authorize(user, ResourceKind::Employee, action, id(target.id))
				.await
				.unwrap());
		}
		assert!(authz.include_salary(user, target.id).await.unwrap());
	}

	#[tokio::test]
	async fn hr_manager_sees_peer_salaries() {
		let fx = Fixture::new().await;
		let hr = fx.department("HR").await;
		let head = fx.employee("HR001", hr.id, 1).await;
		let peer = fx.employee("HR002", hr.id, 1).await;
		let user = fx.user("head", Some(&head), &[RoleType::HrManager]).await;

		assert!(fx.state.authz.include_salary(user, peer.id).await.unwrap());
		assert!(fx.state.authz.include_salary(user, head.id).await.unwrap());
		assert!(fx
			.state
			.authz
			.authorize(user, ResourceKind::Employee, Action::Update, id(peer.id))
			.await
			.unwrap());
	}
}

#[tokio::test]
async fn manager_reads_but_cannot_edit_reports() {
	let fx = Fixture::new().await;
	let it = fx.department("IT").await;
	let m = fx.employee("IT001", it.id, 300).await;
	let j = fx.employee("IT002", it.id, 100).await;
	fx.make_manager(&it, &m).await;
	let user = fx.user("m", Some(&m), &[RoleType::Manager]).await;

	let authz = &fx.state.authz;
	assert!(authz
		.authorize(user, ResourceKind::Employee, Action::Read, id(j.id))
		.await
		.unwrap());
	assert!(!authz
		.authorize(user, ResourceKind::Employee, Action::Update, id(j.id))
		.await
		.unwrap());
	assert!(authz.include_salary(user, j.id).await.unwrap());
}

#[tokio::test]
async fn accounting_reads_salaries_elsewhere_but_cannot_edit() {
	let fx = Fixture::new().await;
	let accounting = fx.department("Accounting").await;
	let sales = fx.department("Sales").await;
	let a = fx.employee("AC001", accounting.id, 1).await;
	let t = fx.employee("SA001", sales.id, 1).await;
	let user = fx.user("acct", Some(&a), &[RoleType::Accounting]).await;

	let authz = &fx.state.authz;
	assert!(authz
		.authorize(user, ResourceKind::EmployeeSalary, Action::Read, id(t.id))
		.await
		.unwrap());
	assert!(!authz
		.authorize(user, ResourceKind::Employee, Action::Update, id(t.id))
		.await
		.unwrap());
	assert!(!authz
		.authorize(user, ResourceKind::EmployeeSalary, Action::Update, id(t.id))
		.await
		.unwrap());
}

mod edges {
	use super::*;

	#[tokio::test]
	async fn inactive_user_is_denied() {
		let fx = Fixture::new().await;
		let it = fx.department("IT").await;
		let e = fx.employee("IT001", it.id, 1).await;
		let user = fx.user("gone", Some(&e), &[RoleType::Admin]).await;
		fx.users
			.update_user(
				fx.admin,
				user,
				UserPatch {
					is_active: Some(false),
					..Default::default()
				},
			)
			.await
			.unwrap();

		assert!(!fx
			.state
			.authz
			.authorize(user, ResourceKind::Employee, Action::Read, id(e.id))
			.await
			.unwrap());
	}

	#[tokio::test]
	async fn user_without_profile_is_denied_targets() {
		let fx = Fixture::new().await;
		let it = fx.department("IT").await;
		let e = fx.employee("IT001", it.id, 1).await;
		let user = fx.user("bare", None, &[RoleType::HrManager]).await;

		let authz = &fx.state.authz;
		assert!(authz
			.authorize(user, ResourceKind::Employee, Action::Read, None)
			.await
			.unwrap());
		assert!(!authz
			.authorize(user, ResourceKind::Employee, Action::Read, id(e.id))
			.await
			.unwrap());
		assert!(!authz.include_salary(user, e.id).await.unwrap());
	}

	#[tokio::test]
	async fn missing_actor_and_target_are_not_found() {
		let fx = Fixture::new().await;
		let authz = &fx.state.authz;

		let err = authz
			.authorize(UserId::generate(), ResourceKind::Employee, Action::Read, None)
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::NotFound { kind: "user", .. }));

		let err = authz
			.authorize(fx.admin, ResourceKind::Employee, Action::Read, Some(uuid::Uuid::new_v4()))
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::NotFound { kind: "employee", .. }));

		let err = authz
			.authorize(fx.admin, ResourceKind::Role, Action::Read, Some(uuid::Uuid::new_v4()))
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::NotFound { kind: "role", .. }));
	}

	#[tokio::test]
	async fn unscoped_targets_are_admin_only() {
		let fx = Fixture::new().await;
		let hr = fx.department("HR").await;
		let head = fx.employee("HR001", hr.id, 1).await;
		let user = fx.user("head", Some(&head), &[RoleType::HrManager]).await;

		let authz = &fx.state.authz;
		assert!(authz
			.authorize(user, ResourceKind::User, Action::Read, None)
			.await
			.unwrap());
		assert!(!authz
			.authorize(user, ResourceKind::User, Action::Read, id(fx.admin))
			.await
			.unwrap());
		assert!(authz
			.authorize(fx.admin, ResourceKind::User, Action::Read, id(user))
			.await
			.unwrap());
	}

	#[tokio::test]
	async fn role_type_changes_apply_to_the_next_decision() {
		let fx = Fixture::new().await;
		let hr = fx.department("HR").await;
		let it = fx.department("IT").await;
		let actor = fx.employee("HR001", hr.id, 1).await;
		let target = fx.employee("IT001", it.id, 1).await;
		let user = fx.user("hr", Some(&actor), &[RoleType::HrStaff]).await;

		let authz = &fx.state.authz;
		assert!(authz
			.authorize(user, ResourceKind::Employee, Action::Update, id(target.id))
			.await
			.unwrap());

		let role = fx.role(RoleType::HrStaff).await;
		let updated = fx
			.roles
			.update_role(
				fx.admin,
				role.id,
				RolePatch {
					role_type: Some(RoleType::Employee),
					..Default::default()
				},
			)
			.await
			.unwrap();
		assert_eq!(updated.permissions.len(), role.permissions.len());

		assert!(!authz
			.authorize(user, ResourceKind::Employee, Action::Update, id(target.id))
			.await
			.unwrap());
	}

	#[tokio::test]
	async fn store_failure_is_unavailable_not_denied() {
		let fx = Fixture::new().await;
		fx.pool.close().await;

		let err = fx
			.state
			.authz
			.authorize(fx.admin, ResourceKind::Employee, Action::Read, None)
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::Unavailable(_)));
	}
}
