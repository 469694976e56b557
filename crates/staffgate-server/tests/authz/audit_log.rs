// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Decisions and mutations reach the audit log; only administrators read it.

use staffgate_server::DirectoryError;
use staffgate_server_audit::AuditEventType;
use staffgate_server_auth::{Action, ResourceKind, RoleType};
use staffgate_server_db::AuditQuery;

use super::support::{id, Fixture};

#[tokio::test]
async fn decisions_are_recorded() {
	let fx = Fixture::new().await;
	let it = fx.department("IT").await;
	let sales = fx.department("Sales").await;
	let me = fx.employee("IT001", it.id, 1).await;
	let stranger = fx.employee("SA001", sales.id, 1).await;
	let user = fx.user("me", Some(&me), &[RoleType::Employee]).await;

	assert!(!fx
		.state
		.authz
		.authorize(user, ResourceKind::Employee, Action::Read, id(stranger.id))
		.await
		.unwrap());
	fx.flush_audit().await;

	let denied = AuditQuery {
		event_type: Some(AuditEventType::AccessDenied),
		actor_id: Some(user),
		..Default::default()
	};
	let page = fx.audit_log.query(fx.admin, &denied).await.unwrap();
	assert_eq!(page.total, 1);
	let entry = &page.entries[0];
	assert_eq!(entry.resource_type.as_deref(), Some("employee"));
	assert_eq!(entry.resource_id, Some(stranger.id.to_string()));
	assert_eq!(entry.action, "read");
}

#[tokio::test]
async fn manager_outcomes_are_recorded() {
	let fx = Fixture::new().await;
	let a = fx.department("A").await;
	let b = fx.department("B").await;
	let e = fx.employee("A001", a.id, 1).await;

	fx.departments
		.assign_manager(fx.admin, b.id, Some(e.id))
		.await
		.unwrap_err();
	fx.departments
		.assign_manager(fx.admin, a.id, Some(e.id))
		.await
		.unwrap();
	fx.employees.delete_employee(fx.admin, e.id).await.unwrap();
	fx.flush_audit().await;

	for (event, resource_id) in [
		(AuditEventType::ManagerAssignmentRejected, b.id.to_string()),
		(AuditEventType::ManagerAssigned, a.id.to_string()),
		(AuditEventType::ManagerCleared, a.id.to_string()),
		(AuditEventType::EmployeeDeleted, e.id.to_string()),
	] {
		let query = AuditQuery {
			event_type: Some(event),
			..Default::default()
		};
		let page = fx.audit_log.query(fx.admin, &query).await.unwrap();
		assert_eq!(page.total, 1, "expected one {event} entry");
		assert_eq!(page.entries[0].resource_id.as_deref(), Some(resource_id.as_str()));
	}
}

#[tokio::test]
async fn only_admin_reads_the_log() {
	let fx = Fixture::new().await;
	let hr = fx.department("HR").await;
	let head = fx.employee("HR001", hr.id, 1).await;
	let user = fx.user("head", Some(&head), &[RoleType::HrManager]).await;

	let err = fx
		.audit_log
		.query(user, &AuditQuery::default())
		.await
		.unwrap_err();
	assert!(matches!(err, DirectoryError::Forbidden));
	let err = fx.audit_log.statistics(user).await.unwrap_err();
	assert!(matches!(err, DirectoryError::Forbidden));

	fx.flush_audit().await;
	let stats = fx.audit_log.statistics(fx.admin).await.unwrap();
	assert!(stats.total >= 2);
	assert!(stats
		.by_event_type
		.iter()
		.any(|(event, count)| event == "access_denied" && *count >= 2));
	assert!(stats.top_actors.iter().any(|(actor, _)| *actor == user));
}
