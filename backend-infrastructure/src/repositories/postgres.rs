use std::str::FromStr;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use backend_domain::{
    AttendanceStatus, Attendee, AttendeeChange, AttendeeId, AttendeeImport, AttendeeRepository,
    ImportOutcome, ScanAction, ScanCounts, ScanIdentifier, ScanLogEntry, ScanLogId,
    ScanLogRepository, StatusCounts,
};

const ATTENDEE_COLUMNS: &str = "id, qr_payload, name, phone, seat_id, category, status, \
    check_in_time, check_out_time, last_scanned_by, device_id, created_at, updated_at";

const UPSERT_CHUNK: usize = 1_000;

pub const REFRESH_STATS_VIEW: &str = "REFRESH MATERIALIZED VIEW attendee_stats";

#[derive(Clone)]
pub struct PostgresRepo {
    pool: PgPool,
}

impl PostgresRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        let create_attendees = r#"
CREATE TABLE IF NOT EXISTS attendees (
    id UUID PRIMARY KEY,
    qr_payload TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL DEFAULT '',
    phone TEXT NOT NULL DEFAULT '',
    seat_id TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'not_checked_in'
        CHECK (status IN ('not_checked_in', 'checked_in', 'checked_out')),
    check_in_time TIMESTAMPTZ,
    check_out_time TIMESTAMPTZ,
    last_scanned_by TEXT,
    device_id TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CHECK (status = 'not_checked_in' OR check_in_time IS NOT NULL)
)
"#;
        sqlx::query(create_attendees).execute(&self.pool).await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS attendees_status_updated_idx \
             ON attendees (status, updated_at DESC)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS attendees_updated_idx ON attendees (updated_at DESC)",
        )
        .execute(&self.pool)
        .await?;

        let create_scan_logs = r#"
CREATE TABLE IF NOT EXISTS scan_logs (
    id UUID PRIMARY KEY,
    attendee_id UUID NOT NULL REFERENCES attendees (id) ON DELETE CASCADE,
    scan_type TEXT NOT NULL CHECK (scan_type IN ('check_in', 'check_out')),
    device_id TEXT,
    operator_name TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;
        sqlx::query(create_scan_logs).execute(&self.pool).await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS scan_logs_attendee_idx \
             ON scan_logs (attendee_id, created_at DESC)",
        )
        .execute(&self.pool)
        .await?;

        let create_stats_view = r#"
CREATE MATERIALIZED VIEW IF NOT EXISTS attendee_stats AS
SELECT
    count(*) AS total,
    count(*) FILTER (WHERE status = 'not_checked_in') AS not_checked_in,
    count(*) FILTER (WHERE status = 'checked_in') AS checked_in,
    count(*) FILTER (WHERE status = 'checked_out') AS checked_out,
    now() AS refreshed_at
FROM attendees
"#;
        sqlx::query(create_stats_view).execute(&self.pool).await?;

        Ok(())
    }

    async fn upsert_chunk(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        records: &[AttendeeImport],
        now: DateTime<Utc>,
    ) -> Result<ImportOutcome> {
        let ids: Vec<Uuid> = records.iter().map(|_| Uuid::new_v4()).collect();
        let payloads: Vec<String> = records
            .iter()
            .map(|record| record.scan_identifier.as_str().to_string())
            .collect();
        let names: Vec<String> = records.iter().map(|record| record.name.clone()).collect();
        let phones: Vec<String> = records.iter().map(|record| record.phone.clone()).collect();
        let seats: Vec<String> = records.iter().map(|record| record.seat_id.clone()).collect();
        let categories: Vec<String> = records
            .iter()
            .map(|record| record.category.clone())
            .collect();

        // Status and scan provenance are left alone on conflict; a no-op row is not returned.
        let upsert = r#"
INSERT INTO attendees (id, qr_payload, name, phone, seat_id, category, status, created_at, updated_at)
SELECT id, qr_payload, name, phone, seat_id, category, 'not_checked_in', $7, $7
FROM UNNEST($1::uuid[], $2::text[], $3::text[], $4::text[], $5::text[], $6::text[])
    AS incoming (id, qr_payload, name, phone, seat_id, category)
ON CONFLICT (qr_payload) DO UPDATE
SET name = EXCLUDED.name,
    phone = EXCLUDED.phone,
    seat_id = EXCLUDED.seat_id,
    category = EXCLUDED.category,
    updated_at = EXCLUDED.updated_at
WHERE (attendees.name, attendees.phone, attendees.seat_id, attendees.category)
    IS DISTINCT FROM (EXCLUDED.name, EXCLUDED.phone, EXCLUDED.seat_id, EXCLUDED.category)
RETURNING (xmax = 0) AS inserted
"#;
        let written: Vec<(bool,)> = sqlx::query_as(upsert)
            .bind(&ids)
            .bind(&payloads)
            .bind(&names)
            .bind(&phones)
            .bind(&seats)
            .bind(&categories)
            .bind(now)
            .fetch_all(&mut **tx)
            .await?;

        let inserted = written.iter().filter(|(inserted,)| *inserted).count() as u64;
        let updated = written.len() as u64 - inserted;
        Ok(ImportOutcome {
            inserted,
            updated,
            unchanged: records.len() as u64 - written.len() as u64,
        })
    }
}

#[derive(Debug, FromRow)]
struct AttendeeRecord {
    id: Uuid,
    qr_payload: String,
    name: String,
    phone: String,
    seat_id: String,
    category: String,
    status: String,
    check_in_time: Option<DateTime<Utc>>,
    check_out_time: Option<DateTime<Utc>>,
    last_scanned_by: Option<String>,
    device_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AttendeeRecord> for Attendee {
    type Error = anyhow::Error;

    fn try_from(record: AttendeeRecord) -> Result<Self> {
        Ok(Attendee {
            id: AttendeeId(record.id),
            scan_identifier: ScanIdentifier::parse(&record.qr_payload)?,
            name: record.name,
            phone: record.phone,
            seat_id: record.seat_id,
            category: record.category,
            status: AttendanceStatus::from_str(&record.status)?,
            check_in_time: record.check_in_time,
            check_out_time: record.check_out_time,
            last_scanned_by: record.last_scanned_by,
            device_id: record.device_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ScanLogRecord {
    id: Uuid,
    attendee_id: Uuid,
    scan_type: String,
    device_id: Option<String>,
    operator_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ScanLogRecord> for ScanLogEntry {
    type Error = anyhow::Error;

    fn try_from(record: ScanLogRecord) -> Result<Self> {
        Ok(ScanLogEntry {
            id: ScanLogId(record.id),
            attendee_id: AttendeeId(record.attendee_id),
            scan_type: ScanAction::from_str(&record.scan_type)?,
            device_id: record.device_id,
            operator_name: record.operator_name,
            created_at: record.created_at,
        })
    }
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

#[async_trait]
impl AttendeeRepository for PostgresRepo {
    async fn find_by_scan_identifier(
        &self,
        scan_identifier: &ScanIdentifier,
    ) -> Result<Option<Attendee>> {
        let query = format!("SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE qr_payload = $1");
        let record: Option<AttendeeRecord> = sqlx::query_as(&query)
            .bind(scan_identifier.as_str())
            .fetch_optional(&self.pool)
            .await?;
        record.map(Attendee::try_from).transpose()
    }

    async fn update_if_status(
        &self,
        id: AttendeeId,
        expected: AttendanceStatus,
        change: &AttendeeChange,
    ) -> Result<Option<Attendee>> {
        let query = format!(
            "UPDATE attendees \
             SET status = $3, check_in_time = $4, check_out_time = $5, \
                 last_scanned_by = $6, device_id = $7, updated_at = $8 \
             WHERE id = $1 AND status = $2 \
             RETURNING {ATTENDEE_COLUMNS}"
        );
        let record: Option<AttendeeRecord> = sqlx::query_as(&query)
            .bind(id.0)
            .bind(expected.as_str())
            .bind(change.status.as_str())
            .bind(change.check_in_time)
            .bind(change.check_out_time)
            .bind(change.last_scanned_by.as_deref())
            .bind(change.device_id.as_deref())
            .bind(change.updated_at)
            .fetch_optional(&self.pool)
            .await?;
        record.map(Attendee::try_from).transpose()
    }

    async fn upsert_many(&self, records: &[AttendeeImport]) -> Result<ImportOutcome> {
        let now = Utc::now();
        let mut outcome = ImportOutcome::default();
        let mut tx = self.pool.begin().await?;
        for chunk in records.chunks(UPSERT_CHUNK) {
            let written = Self::upsert_chunk(&mut tx, chunk, now).await?;
            outcome.inserted += written.inserted;
            outcome.updated += written.updated;
            outcome.unchanged += written.unchanged;
        }
        tx.commit().await?;
        Ok(outcome)
    }

    async fn list(&self, status: Option<AttendanceStatus>, limit: usize) -> Result<Vec<Attendee>> {
        let query = format!(
            "SELECT {ATTENDEE_COLUMNS} FROM attendees \
             WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY updated_at DESC \
             LIMIT $2"
        );
        let limit = i64::try_from(limit).map_err(|_| anyhow!("limit out of range"))?;
        let records: Vec<AttendeeRecord> = sqlx::query_as(&query)
            .bind(status.map(|status| status.as_str()))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        records.into_iter().map(Attendee::try_from).collect()
    }

    async fn count_by_status(&self) -> Result<StatusCounts> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, count(*) FROM attendees GROUP BY status")
                .fetch_all(&self.pool)
                .await?;
        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            counts.add(AttendanceStatus::from_str(&status)?, to_count(count));
        }
        Ok(counts)
    }

    async fn ping(&self) -> Result<()> {
        let _: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ScanLogRepository for PostgresRepo {
    async fn append(&self, entry: &ScanLogEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO scan_logs (id, attendee_id, scan_type, device_id, operator_name, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(entry.id.0)
        .bind(entry.attendee_id.0)
        .bind(entry.scan_type.as_str())
        .bind(entry.device_id.as_deref())
        .bind(entry.operator_name.as_deref())
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_attendee(
        &self,
        attendee_id: AttendeeId,
        limit: usize,
    ) -> Result<Vec<ScanLogEntry>> {
        let limit = i64::try_from(limit).map_err(|_| anyhow!("limit out of range"))?;
        let records: Vec<ScanLogRecord> = sqlx::query_as(
            "SELECT id, attendee_id, scan_type, device_id, operator_name, created_at \
             FROM scan_logs \
             WHERE attendee_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2",
        )
        .bind(attendee_id.0)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        records.into_iter().map(ScanLogEntry::try_from).collect()
    }

    async fn count_by_type(&self) -> Result<ScanCounts> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT scan_type, count(*) FROM scan_logs GROUP BY scan_type")
                .fetch_all(&self.pool)
                .await?;
        let mut counts = ScanCounts::default();
        for (scan_type, count) in rows {
            match ScanAction::from_str(&scan_type)? {
                ScanAction::CheckIn => counts.check_ins += to_count(count),
                ScanAction::CheckOut => counts.check_outs += to_count(count),
            }
        }
        Ok(counts)
    }
}
