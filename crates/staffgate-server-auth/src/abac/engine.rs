// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! ABAC policy evaluation engine.
//!
//! [`is_allowed`] evaluates in order:
//!
//! 1. **Admin bypass**: an Admin role allows everything
//! 2. **Coarse grant**: some role must carry the (resource, action) permission
//! 3. **Target scoping**: when a target is named, each granting role's rule
//!    table is consulted against the subject's relationship to the target,
//!    and the results are OR-ed
//!
//! A subject with no employee profile cannot reach a targeted record.

use tracing::{debug, instrument};

use super::policies::{department, employee, salary, Relationship};
use super::types::{ResourceAttrs, SubjectAttrs, Target};
use crate::types::{Action, ResourceKind, RoleType};

type ScopeFn = fn(RoleType, &Relationship, Action) -> bool;

/// Evaluates whether a subject is allowed to perform an action on a resource.
///
/// Total over structurally valid input: absence of a matching rule is a
/// denial, never an error.
#[instrument(
    level = "debug",
    skip(subject, resource),
    fields(
        user_id = %subject.user_id,
        action = %action,
        resource = %resource.kind,
        targeted = resource.target.is_some(),
    )
)]
pub fn is_allowed(subject: &SubjectAttrs, action: Action, resource: &ResourceAttrs) -> bool {
	if subject.is_admin() {
		return true;
	}

	let mut granting = subject.roles_granting(resource.kind, action).peekable();
	if granting.peek().is_none() {
		debug!("no role carries the grant");
		return false;
	}

	let Some(target) = resource.target else {
		return true;
	};

	let (Some(scope), Some(target_department)) =
		(scope_for(resource.kind, &target), target.department_id())
	else {
		debug!("no scoping rules for targeted resource");
		return false;
	};

	let Some(rel) = Relationship::between(subject, target_department) else {
		debug!("subject has no employee profile");
		return false;
	};
	granting.any(|role| scope(role, &rel, action))
}

fn scope_for(kind: ResourceKind, target: &Target) -> Option<ScopeFn> {
	match (kind, target) {
		(ResourceKind::Employee, Target::Employee { .. }) => Some(employee::can_access_employee),
		(ResourceKind::EmployeeSalary, Target::Employee { .. }) => Some(salary::can_view_salary),
		(ResourceKind::Department, Target::Department { .. }) => {
			Some(department::can_access_department)
		}
		_ => None,
	}
}
