// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Department service: administration and the manager invariant.

use staffgate_server::{DepartmentPatch, DirectoryError, NewDepartment};
use staffgate_server_auth::RoleType;

use super::support::Fixture;

fn named(name: &str) -> NewDepartment {
	NewDepartment {
		name: name.to_string(),
		..Default::default()
	}
}

mod manager_invariant {
	use super::*;

	#[tokio::test]
	async fn non_member_is_rejected_member_is_accepted() {
		let fx = Fixture::new().await;
		let a = fx.department("A").await;
		let b = fx.department("B").await;
		let e = fx.employee("A001", a.id, 1).await;

		let err = fx
			.departments
			.assign_manager(fx.admin, b.id, Some(e.id))
			.await
			.unwrap_err();
		match err {
			DirectoryError::InvalidAssignment(invalid) => {
				assert_eq!(invalid.department_id, b.id);
				assert_eq!(invalid.member_of, a.id);
			}
			other => panic!("expected InvalidAssignment, got {other:?}"),
		}
		let b_now = fx.departments.get_department(fx.admin, b.id).await.unwrap();
		assert!(b_now.manager_id.is_none());

		let a_now = fx
			.departments
			.assign_manager(fx.admin, a.id, Some(e.id))
			.await
			.unwrap();
		assert_eq!(a_now.manager_id, Some(e.id));

		let cleared = fx.departments.assign_manager(fx.admin, a.id, None).await.unwrap();
		assert!(cleared.manager_id.is_none());
	}

	#[tokio::test]
	async fn update_path_checks_membership_too() {
		let fx = Fixture::new().await;
		let a = fx.department("A").await;
		let b = fx.department("B").await;
		let e = fx.employee("A001", a.id, 1).await;

		let patch = DepartmentPatch {
			manager_id: Some(Some(e.id)),
			..Default::default()
		};
		let err = fx
			.departments
			.update_department(fx.admin, b.id, patch.clone())
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::InvalidAssignment(_)));

		let updated = fx.departments.update_department(fx.admin, a.id, patch).await.unwrap();
		assert_eq!(updated.manager_id, Some(e.id));
	}

	#[tokio::test]
	async fn rejected_manager_discards_the_whole_update() {
		let fx = Fixture::new().await;
		let a = fx.department("A").await;
		let b = fx.department("B").await;
		let e = fx.employee("A001", a.id, 1).await;

		let patch = DepartmentPatch {
			name: Some("B-renamed".to_string()),
			description: Some(Some("moved".to_string())),
			manager_id: Some(Some(e.id)),
		};
		let err = fx
			.departments
			.update_department(fx.admin, b.id, patch)
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::InvalidAssignment(_)));

		let stored = fx.departments.get_department(fx.admin, b.id).await.unwrap();
		assert_eq!(stored.name, "B");
		assert!(stored.description.is_none());
		assert!(stored.manager_id.is_none());
	}

	#[tokio::test]
	async fn rename_with_member_manager_applies_both() {
		let fx = Fixture::new().await;
		let a = fx.department("A").await;
		let e = fx.employee("A001", a.id, 1).await;

		let patch = DepartmentPatch {
			name: Some("Alpha".to_string()),
			manager_id: Some(Some(e.id)),
			..Default::default()
		};
		let updated = fx.departments.update_department(fx.admin, a.id, patch).await.unwrap();
		assert_eq!(updated.name, "Alpha");
		assert_eq!(updated.manager_id, Some(e.id));
	}

	#[tokio::test]
	async fn creating_with_a_manager_always_fails() {
		let fx = Fixture::new().await;
		let a = fx.department("A").await;
		let e = fx.employee("A001", a.id, 1).await;

		let input = NewDepartment {
			manager_id: Some(e.id),
			..named("New")
		};
		let err = fx.departments.create_department(fx.admin, input).await.unwrap_err();
		assert!(matches!(err, DirectoryError::InvalidAssignment(_)));
		assert!(fx
			.state
			.stores
			.departments
			.get_department_by_name("New")
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn unknown_candidate_is_not_found() {
		let fx = Fixture::new().await;
		let a = fx.department("A").await;
		let err = fx
			.departments
			.assign_manager(fx.admin, a.id, Some(staffgate_server_auth::EmployeeId::generate()))
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::NotFound { kind: "employee", .. }));
	}
}

mod administration {
	use super::*;

	#[tokio::test]
	async fn only_admin_writes_departments() {
		let fx = Fixture::new().await;
		let hr = fx.department("HR").await;
		let head = fx.employee("HR001", hr.id, 1).await;
		let user = fx.user("head", Some(&head), &[RoleType::HrManager]).await;

		let err = fx
			.departments
			.create_department(user, named("Ops"))
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::Forbidden));

		let err = fx
			.departments
			.assign_manager(user, hr.id, Some(head.id))
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::Forbidden));

		let ops = fx.departments.create_department(fx.admin, named("  Ops ")).await.unwrap();
		assert_eq!(ops.name, "Ops");
	}

	#[tokio::test]
	async fn names_are_unique_and_non_empty() {
		let fx = Fixture::new().await;
		fx.departments.create_department(fx.admin, named("Ops")).await.unwrap();

		let err = fx
			.departments
			.create_department(fx.admin, named("Ops"))
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::Conflict(_)));

		let err = fx
			.departments
			.create_department(fx.admin, named(" "))
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::Validation(_)));
	}

	#[tokio::test]
	async fn department_with_members_cannot_be_deleted() {
		let fx = Fixture::new().await;
		let it = fx.department("IT").await;
		let e = fx.employee("IT001", it.id, 1).await;

		let err = fx.departments.delete_department(fx.admin, it.id).await.unwrap_err();
		assert!(matches!(err, DirectoryError::Conflict(_)));

		fx.employees.delete_employee(fx.admin, e.id).await.unwrap();
		fx.departments.delete_department(fx.admin, it.id).await.unwrap();
		let err = fx.departments.get_department(fx.admin, it.id).await.unwrap_err();
		assert!(matches!(err, DirectoryError::NotFound { .. }));
	}

	#[tokio::test]
	async fn rename_keeps_manager() {
		let fx = Fixture::new().await;
		let it = fx.department("IT").await;
		let lead = fx.employee("IT001", it.id, 1).await;
		fx.make_manager(&it, &lead).await;

		let renamed = fx
			.departments
			.update_department(
				fx.admin,
				it.id,
				DepartmentPatch {
					name: Some("Engineering".to_string()),
					description: Some(Some("builds things".to_string())),
					..Default::default()
				},
			)
			.await
			.unwrap();
		assert_eq!(renamed.name, "Engineering");
		assert_eq!(renamed.manager_id, Some(lead.id));
	}
}

mod reads {
	use super::*;

	#[tokio::test]
	async fn visibility_follows_department_rules() {
		let fx = Fixture::new().await;
		let hr = fx.department("HR").await;
		let it = fx.department("IT").await;
		let sales = fx.department("Sales").await;
		let hr_actor = fx.employee("HR001", hr.id, 1).await;
		let it_actor = fx.employee("IT001", it.id, 1).await;
		let hr_user = fx.user("hr", Some(&hr_actor), &[RoleType::HrStaff]).await;
		let it_user = fx.user("it", Some(&it_actor), &[RoleType::Employee]).await;

		assert_eq!(fx.departments.list_departments(hr_user).await.unwrap().len(), 3);
		let visible = fx.departments.list_departments(it_user).await.unwrap();
		assert_eq!(visible.len(), 1);
		assert_eq!(visible[0].id, it.id);

		let err = fx
			.departments
			.get_department(it_user, sales.id)
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::Forbidden));
	}

	#[tokio::test]
	async fn member_listing_is_redacted_per_viewer() {
		let fx = Fixture::new().await;
		let it = fx.department("IT").await;
		let lead = fx.employee("IT001", it.id, 500).await;
		fx.employee("IT002", it.id, 100).await;
		fx.make_manager(&it, &lead).await;
		let manager = fx.user("lead", Some(&lead), &[RoleType::Manager]).await;
		let peer = fx.employee("IT003", it.id, 100).await;
		let employee = fx.user("peer", Some(&peer), &[RoleType::Employee]).await;

		let as_manager = fx
			.departments
			.list_department_employees(manager, it.id)
			.await
			.unwrap();
		assert_eq!(as_manager.len(), 3);
		assert!(as_manager.iter().all(|v| !v.is_redacted()));

		let as_employee = fx
			.departments
			.list_department_employees(employee, it.id)
			.await
			.unwrap();
		assert!(as_employee.iter().all(|v| v.is_redacted()));
	}

	#[tokio::test]
	async fn statistics_are_admin_only() {
		let fx = Fixture::new().await;
		let it = fx.department("IT").await;
		let lead = fx.employee("IT001", it.id, 300).await;
		fx.employee("IT002", it.id, 100).await;
		fx.make_manager(&it, &lead).await;
		let manager = fx.user("lead", Some(&lead), &[RoleType::Manager]).await;

		let err = fx.departments.department_statistics(manager).await.unwrap_err();
		assert!(matches!(err, DirectoryError::Forbidden));

		let stats = fx.departments.department_statistics(fx.admin).await.unwrap();
		let it_stats = stats.iter().find(|s| s.department_id == it.id).unwrap();
		assert_eq!(it_stats.employee_count, 2);
		assert_eq!(it_stats.total_salary, 400);
		assert_eq!(it_stats.manager_name.as_deref(), Some("Employee IT001"));
	}
}
