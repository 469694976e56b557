// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Employee service: per-row authorization and redaction.

use chrono::NaiveDate;
use staffgate_server::{DirectoryError, EmployeePatch, NewEmployee};
use staffgate_server_auth::{DepartmentId, RoleType};

use super::support::Fixture;

fn new_employee(code: &str, department_id: DepartmentId) -> NewEmployee {
	NewEmployee {
		employee_code: code.to_string(),
		full_name: format!("New {code}"),
		birth_date: NaiveDate::from_ymd_opt(1992, 3, 1).unwrap(),
		email: format!("{}@new.example.com", code.to_lowercase()),
		salary: 15_000_000,
		tax_code: format!("NEW-{code}"),
		department_id,
	}
}

mod reads {
	use super::*;

	#[tokio::test]
	async fn employee_lists_only_own_department_without_salaries() {
		let fx = Fixture::new().await;
		let it = fx.department("IT").await;
		let sales = fx.department("Sales").await;
		let me = fx.employee("IT001", it.id, 100).await;
		fx.employee("IT002", it.id, 200).await;
		fx.employee("SA001", sales.id, 300).await;
		let user = fx.user("me", Some(&me), &[RoleType::Employee]).await;

		let rows = fx.employees.list_employees(user).await.unwrap();
		assert_eq!(rows.len(), 2);
		assert!(rows.iter().all(|r| r.department_id == it.id));
		assert!(rows.iter().all(|r| r.is_redacted()));
		assert!(rows.iter().all(|r| r.department_name.as_deref() == Some("IT")));
	}

	#[tokio::test]
	async fn hr_listing_mixes_redacted_and_full_rows() {
		let fx = Fixture::new().await;
		let hr = fx.department("HR").await;
		let it = fx.department("IT").await;
		let actor = fx.employee("HR001", hr.id, 1).await;
		let peer = fx.employee("HR002", hr.id, 2).await;
		let other = fx.employee("IT001", it.id, 3).await;
		let user = fx.user("hr", Some(&actor), &[RoleType::HrStaff]).await;

		let rows = fx.employees.list_employees(user).await.unwrap();
		assert_eq!(rows.len(), 3);
		let peer_row = rows.iter().find(|r| r.id == peer.id).unwrap();
		assert!(peer_row.salary.is_none());
		assert!(peer_row.tax_code.is_none());
		let other_row = rows.iter().find(|r| r.id == other.id).unwrap();
		assert_eq!(other_row.salary, Some(3));
	}

	#[tokio::test]
	async fn get_distinguishes_missing_from_forbidden() {
		let fx = Fixture::new().await;
		let it = fx.department("IT").await;
		let sales = fx.department("Sales").await;
		let me = fx.employee("IT001", it.id, 1).await;
		let stranger = fx.employee("SA001", sales.id, 1).await;
		let user = fx.user("me", Some(&me), &[RoleType::Employee]).await;

		let err = fx.employees.get_employee(user, stranger.id).await.unwrap_err();
		assert!(matches!(err, DirectoryError::Forbidden));

		let err = fx
			.employees
			.get_employee(user, staffgate_server_auth::EmployeeId::generate())
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::NotFound { .. }));

		let own = fx.employees.get_employee(user, me.id).await.unwrap();
		assert!(own.is_redacted());
	}

	#[tokio::test]
	async fn search_respects_department_read_rules() {
		let fx = Fixture::new().await;
		let it = fx.department("IT").await;
		let sales = fx.department("Sales").await;
		let me = fx.employee("IT001", it.id, 1).await;
		fx.employee("IT002", it.id, 1).await;
		fx.employee("SA001", sales.id, 1).await;
		let user = fx.user("me", Some(&me), &[RoleType::Employee]).await;

		let hits = fx.employees.search_employees(user, "it00", None).await.unwrap();
		assert_eq!(hits.len(), 2);

		let hits = fx.employees.search_employees(user, "SA", None).await.unwrap();
		assert!(hits.is_empty());

		let err = fx
			.employees
			.search_employees(user, "", Some(sales.id))
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::Forbidden));

		let hits = fx
			.employees
			.search_employees(fx.admin, "", Some(sales.id))
			.await
			.unwrap();
		assert_eq!(hits.len(), 1);
		assert!(!hits[0].is_redacted());
	}
}

mod writes {
	use super::*;

	#[tokio::test]
	async fn hr_creates_and_duplicates_conflict() {
		let fx = Fixture::new().await;
		let hr = fx.department("HR").await;
		let it = fx.department("IT").await;
		let actor = fx.employee("HR001", hr.id, 1).await;
		let user = fx.user("hr", Some(&actor), &[RoleType::HrStaff]).await;

		let created = fx
			.employees
			.create_employee(user, new_employee("IT010", it.id))
			.await
			.unwrap();
		assert_eq!(created.salary, Some(15_000_000));
		assert_eq!(created.department_name.as_deref(), Some("IT"));

		let err = fx
			.employees
			.create_employee(user, new_employee("IT010", it.id))
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::Conflict(_)));

		let err = fx
			.employees
			.create_employee(user, new_employee("XX001", DepartmentId::generate()))
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::NotFound { kind: "department", .. }));
	}

	#[tokio::test]
	async fn rank_and_file_cannot_create_or_delete() {
		let fx = Fixture::new().await;
		let it = fx.department("IT").await;
		let me = fx.employee("IT001", it.id, 1).await;
		let peer = fx.employee("IT002", it.id, 1).await;
		let user = fx.user("me", Some(&me), &[RoleType::Employee]).await;

		let err = fx
			.employees
			.create_employee(user, new_employee("IT010", it.id))
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::Forbidden));

		let err = fx.employees.delete_employee(user, peer.id).await.unwrap_err();
		assert!(matches!(err, DirectoryError::Forbidden));
	}

	#[tokio::test]
	async fn invalid_input_is_rejected_before_the_store() {
		let fx = Fixture::new().await;
		let it = fx.department("IT").await;

		let mut input = new_employee("IT010", it.id);
		input.salary = -1;
		let err = fx.employees.create_employee(fx.admin, input).await.unwrap_err();
		assert!(matches!(err, DirectoryError::Validation(_)));

		let mut input = new_employee("IT011", it.id);
		input.full_name = "   ".to_string();
		let err = fx.employees.create_employee(fx.admin, input).await.unwrap_err();
		assert!(matches!(err, DirectoryError::Validation(_)));
	}

	#[tokio::test]
	async fn hr_cannot_update_same_department_peer() {
		let fx = Fixture::new().await;
		let hr = fx.department("HR").await;
		let it = fx.department("IT").await;
		let actor = fx.employee("HR001", hr.id, 1).await;
		let peer = fx.employee("HR002", hr.id, 1).await;
		let other = fx.employee("IT001", it.id, 1).await;
		let user = fx.user("hr", Some(&actor), &[RoleType::HrStaff]).await;

		let raise = EmployeePatch {
			salary: Some(999),
			..Default::default()
		};
		let err = fx
			.employees
			.update_employee(user, peer.id, raise.clone())
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::Forbidden));

		let updated = fx.employees.update_employee(user, other.id, raise).await.unwrap();
		assert_eq!(updated.salary, Some(999));
	}

	#[tokio::test]
	async fn manager_cannot_be_moved_out_of_managed_department() {
		let fx = Fixture::new().await;
		let it = fx.department("IT").await;
		let sales = fx.department("Sales").await;
		let lead = fx.employee("IT001", it.id, 1).await;
		fx.make_manager(&it, &lead).await;

		let move_out = EmployeePatch {
			department_id: Some(sales.id),
			..Default::default()
		};
		let err = fx
			.employees
			.update_employee(fx.admin, lead.id, move_out.clone())
			.await
			.unwrap_err();
		assert!(matches!(err, DirectoryError::Conflict(_)));

		fx.departments.assign_manager(fx.admin, it.id, None).await.unwrap();
		let moved = fx
			.employees
			.update_employee(fx.admin, lead.id, move_out)
			.await
			.unwrap();
		assert_eq!(moved.department_id, sales.id);
		assert_eq!(moved.department_name.as_deref(), Some("Sales"));
	}

	#[tokio::test]
	async fn deleting_a_manager_clears_the_department() {
		let fx = Fixture::new().await;
		let it = fx.department("IT").await;
		let lead = fx.employee("IT001", it.id, 1).await;
		fx.make_manager(&it, &lead).await;

		fx.employees.delete_employee(fx.admin, lead.id).await.unwrap();

		let department = fx.departments.get_department(fx.admin, it.id).await.unwrap();
		assert!(department.manager_id.is_none());
		let err = fx.employees.get_employee(fx.admin, lead.id).await.unwrap_err();
		assert!(matches!(err, DirectoryError::NotFound { .. }));
	}
}
