use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::error::LedgerError;

/// Durable problem → ticket mapping. One row per problem, written once on
/// ticket creation, never updated or deleted by this tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub problem_id: u64,
    pub ticket_id: u64,
    pub ticket_number: String,
}

pub struct ProblemLedger {
    conn: Connection,
}

impl ProblemLedger {
    /// Open (or create) the ledger database and make sure the schema
    /// exists. Setup is idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be opened or the schema
    /// cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| LedgerError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "ledger opened");
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, LedgerError> {
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|source| LedgerError::Schema { source })?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(|source| LedgerError::Schema { source })?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS problem_ticket (
                problem_id INTEGER PRIMARY KEY,
                ticket_id INTEGER NOT NULL,
                ticket_number TEXT NOT NULL
            )",
            [],
        )
        .map_err(|source| LedgerError::Schema { source })?;
        Ok(Self { conn })
    }

    /// Look up the ticket previously created for a problem.
    ///
    /// # Errors
    ///
    /// Returns an error when the query itself fails; an absent row is
    /// `Ok(None)`.
    pub fn find(&self, problem_id: u64) -> Result<Option<LedgerEntry>, LedgerError> {
        self.conn
            .query_row(
                "SELECT ticket_id, ticket_number FROM problem_ticket WHERE problem_id = ?1",
                params![problem_id],
                |row| {
                    Ok(LedgerEntry {
                        problem_id,
                        ticket_id: row.get(0)?,
                        ticket_number: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(|source| LedgerError::Query { source })
    }

    /// Record the ticket created for a problem.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DuplicateKey`] when the problem is already
    /// mapped; the stored row is left untouched in that case.
    pub fn insert(
        &self,
        problem_id: u64,
        ticket_id: u64,
        ticket_number: &str,
    ) -> Result<(), LedgerError> {
        match self.conn.execute(
            "INSERT INTO problem_ticket (problem_id, ticket_id, ticket_number) VALUES (?1, ?2, ?3)",
            params![problem_id, ticket_id, ticket_number],
        ) {
            Ok(_) => Ok(()),
            Err(err) if is_constraint_violation(&err) => {
                Err(LedgerError::DuplicateKey { problem_id })
            }
            Err(source) => Err(LedgerError::Insert { source }),
        }
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{LedgerEntry, ProblemLedger};
    use crate::error::LedgerError;
    use rusqlite::Connection;

    fn ledger() -> ProblemLedger {
        ProblemLedger::with_connection(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn find_on_empty_ledger_returns_none() {
        assert_eq!(ledger().find(42).unwrap(), None);
    }

    #[test]
    fn insert_then_find_round_trips() {
        let ledger = ledger();
        ledger.insert(42, 100, "2024010100001").unwrap();
        assert_eq!(
            ledger.find(42).unwrap(),
            Some(LedgerEntry {
                problem_id: 42,
                ticket_id: 100,
                ticket_number: "2024010100001".to_string(),
            })
        );
    }

    #[test]
    fn duplicate_insert_fails_and_keeps_original_row() {
        let ledger = ledger();
        ledger.insert(42, 100, "2024010100001").unwrap();
        let err = ledger.insert(42, 999, "other").unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateKey { problem_id: 42 }));
        let entry = ledger.find(42).unwrap().unwrap();
        assert_eq!(entry.ticket_id, 100);
        assert_eq!(entry.ticket_number, "2024010100001");
    }

    #[test]
    fn schema_setup_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        {
            let ledger = ProblemLedger::open(&path).unwrap();
            ledger.insert(7, 70, "777").unwrap();
        }
        let reopened = ProblemLedger::open(&path).unwrap();
        assert_eq!(reopened.find(7).unwrap().unwrap().ticket_id, 70);
    }
}
