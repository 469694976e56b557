// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! staffgate-server administration binary.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use staffgate_server::{initialize, version, AdminAccount, AppState};
use staffgate_server_auth::{Action, EmployeeId, ResourceKind, UserId};
use staffgate_server_config::{LogFormat, LoggingConfig, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// staffgate - employee directory with relationship-scoped access control.
#[derive(Parser, Debug)]
#[command(name = "staffgate-server", about = "Employee directory administration", version)]
struct Args {
	/// Config file to read instead of /etc/staffgate/server.toml
	#[arg(long, global = true, env = "STAFFGATE_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Create the schema, seed the role catalog and prune old audit entries
	Init {
		/// Username of an administrator to create if missing
		#[arg(long)]
		admin: Option<String>,
		/// Email of the administrator
		#[arg(long, requires = "admin")]
		admin_email: Option<String>,
	},
	/// Evaluate one authorization decision
	Check {
		#[arg(long)]
		user: Uuid,
		/// Resource kind, e.g. employee, employee_salary, department
		#[arg(long)]
		resource: ResourceKind,
		/// create, read, update or delete
		#[arg(long)]
		action: Action,
		/// Target record ID
		#[arg(long)]
		target: Option<Uuid>,
	},
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	if let Command::Version = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	let config = match &args.config {
		Some(path) => staffgate_server_config::load_config_with_file(path.clone()),
		None => staffgate_server_config::load_config(),
	}
	.context("failed to load configuration")?;

	init_tracing(&config.logging);

	tracing::info!(database = %config.database.url, "starting staffgate-server");

	let pool = staffgate_server_db::create_pool(&config.database.url)
		.await
		.context("failed to open database")?;
	staffgate_server_db::ensure_schema(&pool)
		.await
		.context("failed to create schema")?;

	let state = AppState::from_config(pool, &config);

	match args.command {
		Command::Init { admin, admin_email } => {
			run_init(&state, &config, admin, admin_email).await?
		}
		Command::Check {
			user,
			resource,
			action,
			target,
		} => run_check(&state, UserId::new(user), resource, action, target).await?,
		Command::Version => {}
	}

	state.audit.flush().await.context("audit pipeline shut down")?;
	Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| logging.level.clone().into());

	let registry = tracing_subscriber::registry().with(filter);
	match logging.format {
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
			.init(),
		LogFormat::Pretty => registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.init(),
	}
}

async fn run_init(
	state: &AppState,
	config: &ServerConfig,
	admin: Option<String>,
	admin_email: Option<String>,
) -> anyhow::Result<()> {
	let admin = admin.map(|username| AdminAccount {
		email: admin_email.unwrap_or_else(|| format!("{username}@localhost")),
		username,
	});

	let report = initialize(&state.stores, config.audit.retention_days, admin.as_ref())
		.await
		.context("initialization failed")?;

	println!(
		"roles created: {}\npermissions created: {}\nadministrator created: {}\naudit entries pruned: {}",
		report.seed.roles_created,
		report.seed.permissions_created,
		report.admin_created,
		report.audit_entries_pruned,
	);
	Ok(())
}

async fn run_check(
	state: &AppState,
	user: UserId,
	resource: ResourceKind,
	action: Action,
	target: Option<Uuid>,
) -> anyhow::Result<()> {
	let allowed = state
		.authz
		.authorize(user, resource, action, target)
		.await
		.context("authorization check failed")?;
	println!("{}", if allowed { "allow" } else { "deny" });

	if let (ResourceKind::Employee | ResourceKind::EmployeeSalary, Some(id)) = (resource, target) {
		let salary = state
			.authz
			.include_salary(user, EmployeeId::new(id))
			.await
			.context("salary visibility check failed")?;
		println!("salary visible: {salary}");
	}
	Ok(())
}
