// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Read side of the audit log.
//!
//! Entries are written by the audit crate's SQLite sink; this repository only
//! queries them and prunes by retention.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqlitePool, Row};
use staffgate_server_audit::{AuditEventType, AuditLogEntry};
use staffgate_server_auth::UserId;

use crate::error::{DbError, Result};
use crate::row;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 500;
const TOP_ACTORS: i64 = 10;

/// Filters for [`AuditStore::query_logs`]. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditQuery {
	pub event_type: Option<AuditEventType>,
	pub actor_id: Option<UserId>,
	pub resource_type: Option<String>,
	pub resource_id: Option<String>,
	pub from: Option<DateTime<Utc>>,
	pub to: Option<DateTime<Utc>>,
	pub limit: Option<i64>,
	pub offset: Option<i64>,
}

impl AuditQuery {
	fn page(&self) -> (i64, i64) {
		let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
		let offset = self.offset.unwrap_or(0).max(0);
		(limit, offset)
	}
}

/// Aggregate counts over the whole log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStats {
	pub total: i64,
	pub by_event_type: Vec<(String, i64)>,
	pub by_resource_type: Vec<(String, i64)>,
	pub top_actors: Vec<(UserId, i64)>,
}

#[async_trait]
pub trait AuditStore: Send + Sync {
	async fn query_logs(&self, query: &AuditQuery) -> Result<(Vec<AuditLogEntry>, i64)>;
	async fn statistics(&self) -> Result<AuditStats>;
	async fn prune_older_than(&self, days: i64) -> Result<u64>;
}

#[derive(Clone)]
pub struct AuditRepository {
	pool: SqlitePool,
}

const FILTER: &str = r#"
	WHERE (?1 IS NULL OR event_type = ?1)
	  AND (?2 IS NULL OR actor_user_id = ?2)
	  AND (?3 IS NULL OR resource_type = ?3)
	  AND (?4 IS NULL OR resource_id = ?4)
	  AND (?5 IS NULL OR timestamp >= ?5)
	  AND (?6 IS NULL OR timestamp <= ?6)
"#;

impl AuditRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Matching entries newest first, with the total match count.
	#[tracing::instrument(skip(self, query))]
	pub async fn query_logs(&self, query: &AuditQuery) -> Result<(Vec<AuditLogEntry>, i64)> {
		let (limit, offset) = query.page();

		let select = format!(
			r#"
			SELECT id, timestamp, event_type, severity, actor_user_id, resource_type,
			       resource_id, action, ip_address, details
			FROM audit_logs
			{FILTER}
			ORDER BY timestamp DESC, id
			LIMIT ?7 OFFSET ?8
			"#
		);
		let rows = bind_filter(sqlx::query(&select), query)
			.bind(limit)
			.bind(offset)
			.fetch_all(&self.pool)
			.await?;

		let count = format!("SELECT COUNT(*) AS cnt FROM audit_logs {FILTER}");
		let total: i64 = bind_filter(sqlx::query(&count), query)
			.fetch_one(&self.pool)
			.await?
			.get("cnt");

		let entries = rows.iter().map(row_to_entry).collect::<Result<Vec<_>>>()?;
		Ok((entries, total))
	}

	#[tracing::instrument(skip(self))]
	pub async fn statistics(&self) -> Result<AuditStats> {
		let total: i64 = sqlx::query("SELECT COUNT(*) AS cnt FROM audit_logs")
			.fetch_one(&self.pool)
			.await?
			.get("cnt");

		let by_event_type = self
			.grouped(
				r#"
				SELECT event_type AS k, COUNT(*) AS cnt FROM audit_logs
				GROUP BY event_type ORDER BY cnt DESC, k
				"#,
			)
			.await?;

		let by_resource_type = self
			.grouped(
				r#"
				SELECT resource_type AS k, COUNT(*) AS cnt FROM audit_logs
				WHERE resource_type IS NOT NULL
				GROUP BY resource_type ORDER BY cnt DESC, k
				"#,
			)
			.await?;

		let actor_rows = sqlx::query(
			r#"
			SELECT actor_user_id, COUNT(*) AS cnt FROM audit_logs
			WHERE actor_user_id IS NOT NULL
			GROUP BY actor_user_id ORDER BY cnt DESC, actor_user_id
			LIMIT ?
			"#,
		)
		.bind(TOP_ACTORS)
		.fetch_all(&self.pool)
		.await?;
		let top_actors = actor_rows
			.iter()
			.map(|r| Ok((UserId::new(row::uuid(r, "actor_user_id")?), r.get("cnt"))))
			.collect::<Result<Vec<_>>>()?;

		Ok(AuditStats {
			total,
			by_event_type,
			by_resource_type,
			top_actors,
		})
	}

	/// Deletes entries older than `days`. Returns the number removed.
	#[tracing::instrument(skip(self))]
	pub async fn prune_older_than(&self, days: i64) -> Result<u64> {
		if days < 0 {
			return Err(DbError::Internal(format!("negative retention: {days}")));
		}
		let cutoff = Utc::now() - Duration::days(days);
		let result = sqlx::query("DELETE FROM audit_logs WHERE timestamp < ?")
			.bind(cutoff.to_rfc3339())
			.execute(&self.pool)
			.await?;

		let removed = result.rows_affected();
		if removed > 0 {
			tracing::info!(removed, days, "pruned audit log");
		}
		Ok(removed)
	}

	async fn grouped(&self, sql: &str) -> Result<Vec<(String, i64)>> {
		let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
		Ok(rows.iter().map(|r| (r.get("k"), r.get("cnt"))).collect())
	}
}

fn bind_filter<'q>(
	q: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
	query: &AuditQuery,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
	q.bind(query.event_type.map(|t| t.as_str()))
		.bind(query.actor_id.map(|id| id.to_string()))
		.bind(query.resource_type.clone())
		.bind(query.resource_id.clone())
		.bind(query.from.map(|t| t.to_rfc3339()))
		.bind(query.to.map(|t| t.to_rfc3339()))
}

fn row_to_entry(r: &sqlx::sqlite::SqliteRow) -> Result<AuditLogEntry> {
	let details: Option<String> = r.get("details");
	let details = match details {
		Some(raw) => serde_json::from_str(&raw)?,
		None => serde_json::Value::Null,
	};

	Ok(AuditLogEntry {
		id: row::uuid(r, "id")?,
		timestamp: row::timestamp(r, "timestamp")?,
		event_type: row::parsed(r, "event_type")?,
		severity: row::parsed(r, "severity")?,
		actor_user_id: row::opt_uuid(r, "actor_user_id")?.map(UserId::new),
		resource_type: r.get("resource_type"),
		resource_id: r.get("resource_id"),
		action: r.get("action"),
		ip_address: r.get("ip_address"),
		details,
	})
}

#[async_trait]
impl AuditStore for AuditRepository {
	async fn query_logs(&self, query: &AuditQuery) -> Result<(Vec<AuditLogEntry>, i64)> {
		self.query_logs(query).await
	}

	async fn statistics(&self) -> Result<AuditStats> {
		self.statistics().await
	}

	async fn prune_older_than(&self, days: i64) -> Result<u64> {
		self.prune_older_than(days).await
	}
}
