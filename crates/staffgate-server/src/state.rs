// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared service state.

use std::sync::Arc;

use sqlx::sqlite::SqlitePool;
use staffgate_server_audit::{
	AuditService, AuditSink, SqliteAuditSink, TracingAuditSink, DEFAULT_QUEUE_CAPACITY,
};
use staffgate_server_auth::DepartmentUnits;
use staffgate_server_config::{AuditConfig, PolicyConfig, ServerConfig};
use staffgate_server_db::{
	AuditRepository, AuditStore, DepartmentRepository, DepartmentStore, EmployeeRepository,
	EmployeeStore, UserRepository, UserStore,
};

use crate::authz::Authorizer;

/// The directory store, one handle per entity family.
#[derive(Clone)]
pub struct Stores {
	pub users: Arc<dyn UserStore>,
	pub employees: Arc<dyn EmployeeStore>,
	pub departments: Arc<dyn DepartmentStore>,
	pub audit_logs: Arc<dyn AuditStore>,
}

impl Stores {
	pub fn sqlite(pool: SqlitePool) -> Self {
		Self {
			users: Arc::new(UserRepository::new(pool.clone())),
			employees: Arc::new(EmployeeRepository::new(pool.clone())),
			departments: Arc::new(DepartmentRepository::new(pool.clone())),
			audit_logs: Arc::new(AuditRepository::new(pool)),
		}
	}
}

/// Everything a service needs: stores, the authorizer and the audit pipeline.
#[derive(Clone)]
pub struct AppState {
	pub stores: Stores,
	pub authz: Authorizer,
	pub audit: Arc<AuditService>,
}

impl AppState {
	pub fn new(stores: Stores, units: DepartmentUnits, audit: Arc<AuditService>) -> Self {
		let authz = Authorizer::new(stores.clone(), units, Arc::clone(&audit));
		Self {
			stores,
			authz,
			audit,
		}
	}

	/// Must be called from within a tokio runtime.
	pub fn from_config(pool: SqlitePool, config: &ServerConfig) -> Self {
		let audit = Arc::new(build_audit_service(pool.clone(), &config.audit));
		Self::new(Stores::sqlite(pool), department_units(&config.policy), audit)
	}
}

pub fn department_units(policy: &PolicyConfig) -> DepartmentUnits {
	DepartmentUnits::new(&policy.hr_department, &policy.accounting_department)
}

/// Builds the audit pipeline with the sinks enabled in `config`.
pub fn build_audit_service(pool: SqlitePool, config: &AuditConfig) -> AuditService {
	if !config.enabled {
		tracing::info!("audit logging disabled");
		return AuditService::disabled();
	}

	let mut sinks: Vec<Arc<dyn AuditSink>> = Vec::new();
	if config.tracing_sink {
		sinks.push(Arc::new(TracingAuditSink::new()));
	}
	if config.sqlite_sink {
		sinks.push(Arc::new(SqliteAuditSink::new(pool)));
	}
	tracing::debug!(sinks = sinks.len(), "audit pipeline started");

	AuditService::new(DEFAULT_QUEUE_CAPACITY, sinks)
}
