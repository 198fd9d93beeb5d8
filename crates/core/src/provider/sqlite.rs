//! SQLite-backed provider store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{NewProvider, Provider, ProviderError, ProviderFilter, ProviderStore};
use crate::offer::Mode;

const SELECT_COLUMNS: &str =
    "SELECT id, name, mode, logo_url, website_url, active, created_at FROM providers";

/// SQLite-backed provider store.
pub struct SqliteProviderStore {
    conn: Mutex<Connection>,
}

impl SqliteProviderStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn new(path: &Path) -> Result<Self, ProviderError> {
        let conn = Connection::open(path).map_err(|e| ProviderError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, ProviderError> {
        let conn =
            Connection::open_in_memory().map_err(|e| ProviderError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), ProviderError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS providers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                mode TEXT NOT NULL,
                logo_url TEXT,
                website_url TEXT,
                active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_providers_mode ON providers(mode);
            "#,
        )
        .map_err(|e| ProviderError::Database(e.to_string()))
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, ProviderError> {
        self.conn
            .lock()
            .map_err(|_| ProviderError::Database("connection lock poisoned".to_string()))
    }

    fn row_to_provider(row: &rusqlite::Row) -> rusqlite::Result<Provider> {
        let mode_str: String = row.get(2)?;
        let created_at_str: String = row.get(6)?;

        let mode = mode_str.parse::<Mode>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;

        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    6,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        Ok(Provider {
            id: row.get(0)?,
            name: row.get(1)?,
            mode,
            logo_url: row.get(3)?,
            website_url: row.get(4)?,
            active: row.get(5)?,
            created_at,
        })
    }

    fn get_locked(conn: &Connection, id: &str) -> Result<Option<Provider>, ProviderError> {
        conn.query_row(
            &format!("{} WHERE id = ?", SELECT_COLUMNS),
            params![id],
            Self::row_to_provider,
        )
        .optional()
        .map_err(|e| ProviderError::Database(e.to_string()))
    }
}

impl ProviderStore for SqliteProviderStore {
    fn upsert(&self, provider: NewProvider) -> Result<Provider, ProviderError> {
        let conn = self.conn()?;
        let now = Utc::now();

        // ON CONFLICT keeps the original rowid, so listing order is stable.
        conn.execute(
            r#"
            INSERT INTO providers (id, name, mode, logo_url, website_url, active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                mode = excluded.mode,
                logo_url = excluded.logo_url,
                website_url = excluded.website_url,
                active = excluded.active
            "#,
            params![
                provider.id,
                provider.name,
                provider.mode.as_str(),
                provider.logo_url,
                provider.website_url,
                provider.active,
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| ProviderError::Database(e.to_string()))?;

        Self::get_locked(&conn, &provider.id)?.ok_or(ProviderError::NotFound(provider.id))
    }

    fn get(&self, id: &str) -> Result<Option<Provider>, ProviderError> {
        let conn = self.conn()?;
        Self::get_locked(&conn, id)
    }

    fn list(&self, filter: &ProviderFilter) -> Result<Vec<Provider>, ProviderError> {
        let conn = self.conn()?;

        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(mode) = filter.mode {
            conditions.push("mode = ?");
            params.push(Box::new(mode.as_str()));
        }
        if filter.active_only {
            conditions.push("active = 1");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let sql = format!("{} {} ORDER BY rowid", SELECT_COLUMNS, where_clause);

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| ProviderError::Database(e.to_string()))?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let providers = stmt
            .query_map(param_refs.as_slice(), Self::row_to_provider)
            .map_err(|e| ProviderError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ProviderError::Database(e.to_string()))?;

        Ok(providers)
    }

    fn count(&self) -> Result<i64, ProviderError> {
        let conn = self.conn()?;
        conn.query_row("SELECT COUNT(*) FROM providers", [], |row| row.get(0))
            .map_err(|e| ProviderError::Database(e.to_string()))
    }

    fn set_active(&self, id: &str, active: bool) -> Result<Provider, ProviderError> {
        let conn = self.conn()?;
        let updated = conn
            .execute(
                "UPDATE providers SET active = ? WHERE id = ?",
                params![active, id],
            )
            .map_err(|e| ProviderError::Database(e.to_string()))?;

        if updated == 0 {
            return Err(ProviderError::NotFound(id.to_string()));
        }

        Self::get_locked(&conn, id)?.ok_or_else(|| ProviderError::NotFound(id.to_string()))
    }
}
