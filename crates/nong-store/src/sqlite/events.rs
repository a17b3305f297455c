use std::{
    io,
    sync::{Arc, Mutex, mpsc},
    thread,
};

use nong_core::{AssignEvent, EventSink, StoreError};
use rusqlite::{Connection, params};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::store::{SqliteStore, lock};

struct EventRow {
    kind: &'static str,
    registrant: String,
    metadata: String,
}

enum Command {
    Append(EventRow),
    Flush(oneshot::Sender<()>),
}

/// Handle to the single thread that appends to `event_log`.
///
/// Rows are written in the order `record` was called. The thread exits once
/// every clone of the owning store is dropped.
#[derive(Clone)]
pub(super) struct EventWriter {
    tx: mpsc::Sender<Command>,
}

impl EventWriter {
    pub(super) fn spawn(conn: Arc<Mutex<Connection>>) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("nong-event-log".into())
            .spawn(move || drain(&conn, rx))?;
        Ok(Self { tx })
    }

    fn send(&self, command: Command) -> bool {
        self.tx.send(command).is_ok()
    }
}

fn drain(conn: &Mutex<Connection>, rx: mpsc::Receiver<Command>) {
    for command in rx {
        match command {
            Command::Append(row) => {
                if let Err(e) = append(conn, &row) {
                    warn!(
                        kind = row.kind,
                        registrant = %row.registrant,
                        error = %e,
                        "failed to persist event"
                    );
                }
            }
            Command::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("event writer stopped");
}

fn append(conn: &Mutex<Connection>, row: &EventRow) -> Result<(), StoreError> {
    lock(conn)?
        .execute(
            "INSERT INTO event_log (kind, registrant_id, metadata) VALUES (?1, ?2, ?3)",
            params![row.kind, row.registrant, row.metadata],
        )
        .map_err(|e| StoreError::Backend(e.to_string()))?;
    Ok(())
}

impl SqliteStore {
    /// Waits until every event recorded so far has been written.
    pub async fn flush_events(&self) {
        let (done, written) = oneshot::channel();
        if self.events.send(Command::Flush(done)) {
            let _ = written.await;
        }
    }
}

/// Persists every event as a JSON row. Write failures are logged and dropped.
impl EventSink for SqliteStore {
    fn record(&self, event: &AssignEvent) {
        let metadata = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                warn!(kind = event.kind(), error = %e, "failed to encode event");
                return;
            }
        };
        let row = EventRow {
            kind: event.kind(),
            registrant: event.registrant().to_string(),
            metadata,
        };
        if !self.events.send(Command::Append(row)) {
            warn!(kind = event.kind(), "event writer is gone; event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use nong_model::{PartnerId, RegistrantId};

    use super::*;

    fn rows(store: &SqliteStore) -> Vec<(String, String, serde_json::Value)> {
        let conn = store.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT kind, registrant_id, metadata FROM event_log ORDER BY id")
            .unwrap();
        stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .unwrap()
        .map(|r| {
            let (kind, registrant, metadata) = r.unwrap();
            (kind, registrant, serde_json::from_str(&metadata).unwrap())
        })
        .collect()
    }

    #[tokio::test]
    async fn events_are_appended_in_order() {
        let store = SqliteStore::open_in_memory().unwrap();
        let s1 = RegistrantId::from("s-1");

        store.record(&AssignEvent::Started {
            registrant: s1.clone(),
        });
        store.record(&AssignEvent::Succeeded {
            registrant: s1,
            iteration: 3,
            partners: vec![PartnerId::from("f-9")],
        });
        store.flush_events().await;

        let rows = rows(&store);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, "started");
        assert_eq!(rows[1].0, "succeeded");
        assert_eq!(rows[1].1, "s-1");
        assert_eq!(rows[1].2["iteration"], 3);
        assert_eq!(rows[1].2["partners"][0], "f-9");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn ordering_holds_under_a_busy_runtime() {
        let store = SqliteStore::open_in_memory().unwrap();

        for i in 0..200u32 {
            let registrant = RegistrantId::from(format!("s-{i:03}"));
            store.record(&AssignEvent::Started {
                registrant: registrant.clone(),
            });
            store.record(&AssignEvent::Exhausted {
                registrant,
                iterations: i,
            });
        }
        store.flush_events().await;

        let rows = rows(&store);
        assert_eq!(rows.len(), 400);
        for (i, pair) in rows.chunks(2).enumerate() {
            let expected = format!("s-{i:03}");
            assert_eq!(pair[0].0, "started");
            assert_eq!(pair[0].1, expected);
            assert_eq!(pair[1].0, "exhausted");
            assert_eq!(pair[1].1, expected);
            assert_eq!(pair[1].2["iterations"], i as u64);
        }
    }

    #[tokio::test]
    async fn events_from_cloned_stores_share_one_log() {
        let store = SqliteStore::open_in_memory().unwrap();
        let clone = store.clone();

        store.record(&AssignEvent::Started {
            registrant: RegistrantId::from("s-1"),
        });
        clone.record(&AssignEvent::Started {
            registrant: RegistrantId::from("s-2"),
        });
        clone.flush_events().await;

        let registrants: Vec<_> = rows(&store).into_iter().map(|r| r.1).collect();
        assert_eq!(registrants, vec!["s-1", "s-2"]);
    }
}
