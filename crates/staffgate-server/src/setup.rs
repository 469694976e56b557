// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! First-run initialization: role catalog, optional administrator account and
//! audit retention.

use staffgate_server_auth::{catalog, RoleType, User};
use staffgate_server_db::SeedReport;

use crate::error::{DirectoryError, Result};
use crate::state::Stores;

/// Bootstrap administrator requested on the command line.
#[derive(Debug, Clone)]
pub struct AdminAccount {
	pub username: String,
	pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
	pub seed: SeedReport,
	pub admin_created: bool,
	pub audit_entries_pruned: u64,
}

/// Seeds the catalog, creates the administrator if missing and prunes audit
/// entries older than `retention_days`. Safe to run repeatedly.
#[tracing::instrument(skip(stores, admin))]
pub async fn initialize(
	stores: &Stores,
	retention_days: i64,
	admin: Option<&AdminAccount>,
) -> Result<InitReport> {
	let mut report = InitReport {
		seed: stores.users.seed_catalog().await?,
		..Default::default()
	};

	if let Some(admin) = admin {
		report.admin_created = ensure_admin(stores, admin).await?;
	}

	report.audit_entries_pruned = stores.audit_logs.prune_older_than(retention_days).await?;
	Ok(report)
}

async fn ensure_admin(stores: &Stores, admin: &AdminAccount) -> Result<bool> {
	let (role_name, _) = catalog::role_name(RoleType::Admin);
	let role = stores
		.users
		.get_role_by_name(role_name)
		.await?
		.ok_or_else(|| DirectoryError::not_found("role", role_name))?;

	let (user, created) = match stores.users.get_user_by_username(&admin.username).await? {
		Some(user) => (user, false),
		None => {
			let user = User::new(admin.username.trim(), admin.email.trim());
			if user.username.is_empty() || !user.email.contains('@') {
				return Err(DirectoryError::validation(
					"administrator needs a username and a valid email",
				));
			}
			stores.users.create_user(&user).await?;
			(user, true)
		}
	};

	stores.users.assign_role(user.id, role.id).await?;
	tracing::info!(user_id = %user.id, username = %user.username, created, "administrator ensured");
	Ok(created)
}
