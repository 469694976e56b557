// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Compensation visibility.
//!
//! Salary is read-only through this resource; changing it goes through an
//! employee update. Any other action is denied before the table is consulted.

use super::{evaluate_table, Condition, Relationship, ScopeRule, NONE, READ_ONLY};
use crate::types::{Action, RoleType};

pub const RULES: &[ScopeRule] = &[
	ScopeRule::only(RoleType::HrManager, Condition::ActorInHr, READ_ONLY),
	ScopeRule::only(
		RoleType::HrStaff,
		Condition::ActorInHrTargetElsewhere,
		READ_ONLY,
	),
	ScopeRule::only(RoleType::HrStaff, Condition::ActorInHrTargetPeer, NONE),
	ScopeRule::only(RoleType::Accounting, Condition::ActorInAccounting, READ_ONLY),
	ScopeRule::only(RoleType::Manager, Condition::TargetManaged, READ_ONLY),
];

pub fn can_view_salary(role: RoleType, rel: &Relationship, action: Action) -> bool {
	if action != Action::Read {
		return false;
	}
	evaluate_table(RULES, role, rel, action)
}
