use crate::model::StorageError;
use crate::storage::LedgerStore;

use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::path::Path;

/// Ledger kept in a single-table SQLite database.
pub struct SqliteLedgerStore {
    conn: Connection,
}

impl SqliteLedgerStore {
    /// Opens (or creates) the database and makes sure the table exists.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;
        Self::migrate(&conn)?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Self::migrate(&conn)?;
        Ok(Self { conn })
    }

    fn migrate(conn: &Connection) -> Result<(), StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS ledger (
                key TEXT PRIMARY KEY
            );
            ",
        )?;
        Ok(())
    }
}

impl LedgerStore for SqliteLedgerStore {
    fn load(&self) -> Result<HashSet<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT key FROM ledger")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut keys = HashSet::new();
        for key in rows {
            keys.insert(key?);
        }
        Ok(keys)
    }

    /// Replaces the table contents in one transaction.
    fn persist(&self, keys: &HashSet<String>) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM ledger", [])?;
        {
            let mut stmt = tx.prepare("INSERT INTO ledger (key) VALUES (?1)")?;
            for key in keys {
                stmt.execute(params![key])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
