// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Employee record scoping.
//!
//! HR staff administer other departments but only observe their own
//! department's peers. The HR manager has no such restriction. Managers and
//! Accounting read within their domain; rank-and-file employees read
//! same-department peers.

use super::{evaluate_table, Condition, Relationship, ScopeRule, ALL_ACTIONS, READ_ONLY};
use crate::types::{Action, RoleType};

pub const RULES: &[ScopeRule] = &[
	ScopeRule::only(
		RoleType::HrStaff,
		Condition::ActorInHrTargetElsewhere,
		ALL_ACTIONS,
	),
	ScopeRule::only(RoleType::HrStaff, Condition::ActorInHrTargetPeer, READ_ONLY),
	ScopeRule::only(RoleType::HrManager, Condition::ActorInHr, ALL_ACTIONS),
	ScopeRule::only(RoleType::Accounting, Condition::ActorInAccounting, READ_ONLY),
	ScopeRule::only(RoleType::Manager, Condition::TargetManaged, READ_ONLY),
	ScopeRule::only(RoleType::Employee, Condition::TargetInOwnDepartment, READ_ONLY),
];

pub fn can_access_employee(role: RoleType, rel: &Relationship, action: Action) -> bool {
	evaluate_table(RULES, role, rel, action)
}
