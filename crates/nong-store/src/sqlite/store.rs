use std::{
    fmt::Display,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use nong_core::{AssignmentStore, StoreError};
use nong_model::{
    MAX_SLOTS, PartnerId, Preference, QuotaSnapshot, Registrant, RegistrantId, SlotCounts,
};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, ffi, params};
use tracing::debug;

use super::{
    DbError, DbResult,
    events::EventWriter,
    open::{open_db, open_db_in_memory},
};
use crate::seed::SeedTarget;

const SNAPSHOT_SQL: &str = "SELECT preference, slots, COUNT(*) FROM (
    SELECT r.preference AS preference, COUNT(a.partner_id) AS slots
    FROM registrants r
    LEFT JOIN assignments a ON a.registrant_id = r.id
    GROUP BY r.id
)
GROUP BY preference, slots";

const UNASSIGNED_SQL: &str = "SELECT p.id FROM partners p
WHERE NOT EXISTS (SELECT 1 FROM assignments a WHERE a.partner_id = p.id)
ORDER BY p.id";

/// Store over a single SQLite connection.
///
/// The connection sits behind a mutex and every async call hops onto the
/// blocking pool, so callers never block a runtime worker on disk I/O.
/// Diagnostic events go through a dedicated writer thread on the same
/// connection.
#[derive(Clone)]
pub struct SqliteStore {
    pub(super) conn: Arc<Mutex<Connection>>,
    pub(super) events: EventWriter,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Self::from_connection(open_db(path.as_ref())?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    fn from_connection(conn: Connection) -> DbResult<Self> {
        let conn = Arc::new(Mutex::new(conn));
        let events = EventWriter::spawn(Arc::clone(&conn)).map_err(DbError::EventWriter)?;
        Ok(Self { conn, events })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = lock(&conn)?;
            f(&mut *guard)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("sqlite task failed: {e}")))?
    }
}

pub(super) fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, StoreError> {
    conn.lock()
        .map_err(|_| StoreError::Backend("sqlite connection mutex poisoned".into()))
}

fn backend(err: impl Display) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Map a failed slot insert onto the store error taxonomy.
fn classify_insert(
    err: rusqlite::Error,
    registrant: &RegistrantId,
    partner: &PartnerId,
) -> StoreError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        match failure.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE => {
                return StoreError::UniqueViolation {
                    partner: partner.clone(),
                };
            }
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                return StoreError::SlotOccupied {
                    registrant: registrant.clone(),
                };
            }
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                return StoreError::NotFound(format!("partner {partner}"));
            }
            _ => {}
        }
    }
    backend(err)
}

fn parse_preference(raw: &str) -> Result<Preference, StoreError> {
    raw.parse()
        .map_err(|e| StoreError::Backend(format!("invalid persisted preference: {e}")))
}

fn registrant_preference(
    conn: &Connection,
    id: &RegistrantId,
) -> Result<Option<Preference>, StoreError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT preference FROM registrants WHERE id = ?1",
            params![id.as_str()],
            |row| row.get(0),
        )
        .optional()
        .map_err(backend)?;
    raw.as_deref().map(parse_preference).transpose()
}

fn occupied_slots(conn: &Connection, id: &RegistrantId) -> Result<Vec<(i64, String)>, StoreError> {
    let mut stmt = conn
        .prepare("SELECT slot, partner_id FROM assignments WHERE registrant_id = ?1 ORDER BY slot")
        .map_err(backend)?;
    let rows = stmt
        .query_map(params![id.as_str()], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(backend)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(backend)
}

impl SeedTarget for SqliteStore {
    fn insert_registrant(
        &self,
        id: &RegistrantId,
        preference: Preference,
    ) -> Result<(), StoreError> {
        lock(&self.conn)?
            .execute(
                "INSERT INTO registrants (id, preference) VALUES (?1, ?2)",
                params![id.as_str(), preference.as_str()],
            )
            .map_err(backend)?;
        Ok(())
    }

    fn insert_partner(&self, id: &PartnerId) -> Result<(), StoreError> {
        lock(&self.conn)?
            .execute("INSERT INTO partners (id) VALUES (?1)", params![id.as_str()])
            .map_err(backend)?;
        Ok(())
    }
}

#[async_trait]
impl AssignmentStore for SqliteStore {
    async fn read_unassigned_partners(&self) -> Result<Vec<PartnerId>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(UNASSIGNED_SQL).map_err(backend)?;
            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(backend)?;
            rows.map(|r| r.map(PartnerId::from).map_err(backend))
                .collect()
        })
        .await
    }

    async fn read_registrant_preference(
        &self,
        id: &RegistrantId,
    ) -> Result<Option<Preference>, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| registrant_preference(conn, &id))
            .await
    }

    async fn read_slot_counts(&self, id: &RegistrantId) -> Result<SlotCounts, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            if registrant_preference(conn, &id)?.is_none() {
                return Err(StoreError::NotFound(format!("registrant {id}")));
            }
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM assignments WHERE registrant_id = ?1",
                    params![id.as_str()],
                    |row| row.get(0),
                )
                .map_err(backend)?;
            Ok(SlotCounts::new(count as u8))
        })
        .await
    }

    async fn read_quota_snapshot(&self) -> Result<QuotaSnapshot, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(SNAPSHOT_SQL).map_err(backend)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                })
                .map_err(backend)?;

            let mut snapshot = QuotaSnapshot::new();
            for row in rows {
                let (preference, slots, n) = row.map_err(backend)?;
                snapshot
                    .add(parse_preference(&preference)?, slots as u8, n as u64)
                    .map_err(backend)?;
            }
            Ok(snapshot)
        })
        .await
    }

    async fn atomic_assign(
        &self,
        id: &RegistrantId,
        partners: &[PartnerId],
    ) -> Result<(), StoreError> {
        let id = id.clone();
        let partners = partners.to_vec();
        self.with_conn(move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(backend)?;

            if registrant_preference(&tx, &id)?.is_none() {
                return Err(StoreError::NotFound(format!("registrant {id}")));
            }
            if !occupied_slots(&tx, &id)?.is_empty() || partners.len() > MAX_SLOTS {
                return Err(StoreError::SlotOccupied { registrant: id });
            }

            for (slot, partner) in (1_i64..).zip(&partners) {
                tx.execute(
                    "INSERT INTO assignments (registrant_id, slot, partner_id) VALUES (?1, ?2, ?3)",
                    params![id.as_str(), slot, partner.as_str()],
                )
                .map_err(|e| classify_insert(e, &id, partner))?;
            }

            // Dropping an uncommitted transaction rolls it back.
            tx.commit().map_err(backend)?;
            debug!(registrant = %id, partners = partners.len(), "slots persisted");
            Ok(())
        })
        .await
    }

    async fn fetch_registrant(&self, id: &RegistrantId) -> Result<Option<Registrant>, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let Some(preference) = registrant_preference(conn, &id)? else {
                return Ok(None);
            };
            let mut registrant = Registrant::new(id.clone(), preference);
            for (slot, partner) in occupied_slots(conn, &id)? {
                let index = usize::try_from(slot - 1)
                    .ok()
                    .filter(|i| *i < MAX_SLOTS)
                    .ok_or_else(|| StoreError::Backend(format!("invalid persisted slot {slot}")))?;
                registrant.slots[index] = Some(PartnerId::from(partner));
            }
            Ok(Some(registrant))
        })
        .await
    }
}
