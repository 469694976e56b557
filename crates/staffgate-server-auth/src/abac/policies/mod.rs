// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Relationship-scoped rule tables.
//!
//! Each resource kind has one table of [`ScopeRule`] rows. A row names the
//! archetype it applies to (or any archetype), a relationship [`Condition`]
//! and the actions it allows. For a given role, every row whose archetype and
//! condition match contributes its actions; a row with no actions is an
//! explicit deny that contributes nothing. Adding an archetype means adding
//! rows, not branches.

pub mod department;
pub mod employee;
pub mod salary;

use crate::abac::types::{DepartmentUnit, SubjectAttrs};
use crate::types::{Action, DepartmentId, RoleType};

/// How the acting employee relates to the target's department.
///
/// Computed once per decision; rule rows only read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship {
	pub actor_unit: DepartmentUnit,
	/// Target's department is the actor's own department.
	pub same_department: bool,
	/// Target's department is one the actor manages.
	pub target_managed: bool,
}

impl Relationship {
	/// `None` when the subject has no employee profile to relate from.
	pub fn between(subject: &SubjectAttrs, target_department: DepartmentId) -> Option<Self> {
		let actor = subject.employee.as_ref()?;
		Some(Self {
			actor_unit: actor.unit,
			same_department: actor.department_id == target_department,
			target_managed: subject.manages(target_department),
		})
	}
}

/// A relationship predicate a rule row requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
	ActorInHr,
	ActorInHrTargetElsewhere,
	ActorInHrTargetPeer,
	ActorInAccounting,
	TargetManaged,
	TargetInOwnDepartment,
}

impl Condition {
	pub fn holds(&self, rel: &Relationship) -> bool {
		let in_hr = rel.actor_unit == DepartmentUnit::HumanResources;
		match self {
			Condition::ActorInHr => in_hr,
			Condition::ActorInHrTargetElsewhere => in_hr && !rel.same_department,
			Condition::ActorInHrTargetPeer => in_hr && rel.same_department,
			Condition::ActorInAccounting => rel.actor_unit == DepartmentUnit::Accounting,
			Condition::TargetManaged => rel.target_managed,
			Condition::TargetInOwnDepartment => rel.same_department,
		}
	}
}

/// One row of a rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeRule {
	/// `None` applies to every archetype.
	pub role: Option<RoleType>,
	pub condition: Condition,
	pub actions: &'static [Action],
}

impl ScopeRule {
	pub const fn only(role: RoleType, condition: Condition, actions: &'static [Action]) -> Self {
		Self {
			role: Some(role),
			condition,
			actions,
		}
	}

	pub const fn any(condition: Condition, actions: &'static [Action]) -> Self {
		Self {
			role: None,
			condition,
			actions,
		}
	}

	fn applies_to(&self, role: RoleType) -> bool {
		self.role.map_or(true, |r| r == role)
	}
}

pub(crate) const READ_ONLY: &[Action] = &[Action::Read];
pub(crate) const ALL_ACTIONS: &[Action] = &[Action::Read, Action::Create, Action::Update, Action::Delete];
pub(crate) const NONE: &[Action] = &[];

/// Returns true if some matching row of `table` allows `action` for `role`.
pub fn evaluate_table(
	table: &[ScopeRule],
	role: RoleType,
	rel: &Relationship,
	action: Action,
) -> bool {
	table
		.iter()
		.filter(|row| row.applies_to(role) && row.condition.holds(rel))
		.any(|row| row.actions.contains(&action))
}
