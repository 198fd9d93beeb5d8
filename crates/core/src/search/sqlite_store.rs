//! SQLite-backed search store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{SearchError, SearchFilter, SearchRecord, SearchRequest, SearchStore};
use crate::offer::{Mode, Offer, RouteKind};

/// SQLite-backed search store.
pub struct SqliteSearchStore {
    conn: Mutex<Connection>,
}

impl SqliteSearchStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn new(path: &Path) -> Result<Self, SearchError> {
        let conn = Connection::open(path).map_err(|e| SearchError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, SearchError> {
        let conn =
            Connection::open_in_memory().map_err(|e| SearchError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), SearchError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS searches (
                id TEXT PRIMARY KEY,
                mode TEXT NOT NULL,
                origin TEXT NOT NULL,
                destination TEXT NOT NULL,
                departure_date TEXT NOT NULL,
                return_date TEXT,
                passengers INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_searches_created_at ON searches(created_at);

            CREATE TABLE IF NOT EXISTS offers (
                search_id TEXT NOT NULL REFERENCES searches(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                id TEXT NOT NULL,
                provider_id TEXT NOT NULL,
                route_kind TEXT NOT NULL,
                departure TEXT NOT NULL,
                arrival TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                price INTEGER NOT NULL,
                currency TEXT NOT NULL,
                stops INTEGER NOT NULL,
                carrier TEXT NOT NULL,
                booking_reference TEXT NOT NULL,
                PRIMARY KEY (search_id, id)
            );

            CREATE INDEX IF NOT EXISTS idx_offers_search ON offers(search_id, position);
            "#,
        )
        .map_err(|e| SearchError::Database(e.to_string()))
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, SearchError> {
        self.conn
            .lock()
            .map_err(|_| SearchError::Database("connection lock poisoned".to_string()))
    }

    fn row_to_search(row: &rusqlite::Row) -> rusqlite::Result<SearchRecord> {
        let mode_str: String = row.get(1)?;
        let departure_str: String = row.get(4)?;
        let return_str: Option<String> = row.get(5)?;
        let created_at_str: String = row.get(7)?;

        let mode = mode_str.parse::<Mode>().map_err(|e| conversion_error(1, e))?;
        let departure_date = NaiveDate::parse_from_str(&departure_str, "%Y-%m-%d")
            .map_err(|e| conversion_error(4, e))?;
        let return_date = return_str
            .map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d"))
            .transpose()
            .map_err(|e| conversion_error(5, e))?;

        Ok(SearchRecord {
            id: row.get(0)?,
            request: SearchRequest {
                mode,
                origin: row.get(2)?,
                destination: row.get(3)?,
                departure_date,
                return_date,
                passengers: row.get(6)?,
            },
            created_at: parse_timestamp(&created_at_str, 7)?,
        })
    }

    fn row_to_offer(row: &rusqlite::Row) -> rusqlite::Result<Offer> {
        let departure_str: String = row.get(4)?;
        let arrival_str: String = row.get(5)?;
        let stops: u8 = row.get(9)?;

        Ok(Offer {
            id: row.get(0)?,
            search_id: row.get(1)?,
            provider_id: row.get(2)?,
            // Derived from stops so the two can never disagree.
            route_kind: RouteKind::from_stops(stops),
            departure: parse_timestamp(&departure_str, 4)?,
            arrival: parse_timestamp(&arrival_str, 5)?,
            duration_minutes: row.get(6)?,
            price: row.get(7)?,
            currency: row.get(8)?,
            stops,
            carrier: row.get(10)?,
            booking_reference: row.get(11)?,
        })
    }
}

fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}

fn parse_timestamp(value: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(column, e))
}

impl SearchStore for SqliteSearchStore {
    fn create(&self, request: SearchRequest) -> Result<SearchRecord, SearchError> {
        let conn = self.conn()?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO searches (id, mode, origin, destination, departure_date, return_date, passengers, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                request.mode.as_str(),
                request.origin,
                request.destination,
                request.departure_date.to_string(),
                request.return_date.map(|d| d.to_string()),
                request.passengers,
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| SearchError::Database(e.to_string()))?;

        Ok(SearchRecord {
            id,
            request,
            created_at: now,
        })
    }

    fn get(&self, id: &str) -> Result<Option<SearchRecord>, SearchError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, mode, origin, destination, departure_date, return_date, passengers, created_at FROM searches WHERE id = ?",
            params![id],
            Self::row_to_search,
        )
        .optional()
        .map_err(|e| SearchError::Database(e.to_string()))
    }

    fn list(&self, filter: &SearchFilter) -> Result<Vec<SearchRecord>, SearchError> {
        let conn = self.conn()?;

        let (where_clause, mode_param) = match filter.mode {
            Some(mode) => ("WHERE mode = ?1", Some(mode.as_str())),
            None => ("", None),
        };
        let sql = format!(
            "SELECT id, mode, origin, destination, departure_date, return_date, passengers, created_at FROM searches {} ORDER BY rowid DESC LIMIT {} OFFSET {}",
            where_clause,
            filter.limit.max(0),
            filter.offset.max(0)
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| SearchError::Database(e.to_string()))?;

        let rows = match mode_param {
            Some(mode) => stmt.query_map(params![mode], Self::row_to_search),
            None => stmt.query_map([], Self::row_to_search),
        }
        .map_err(|e| SearchError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| SearchError::Database(e.to_string()))
    }

    fn count(&self) -> Result<i64, SearchError> {
        let conn = self.conn()?;
        conn.query_row("SELECT COUNT(*) FROM searches", [], |row| row.get(0))
            .map_err(|e| SearchError::Database(e.to_string()))
    }

    fn save_offers(&self, search_id: &str, offers: &[Offer]) -> Result<(), SearchError> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| SearchError::Database(e.to_string()))?;

        tx.execute("DELETE FROM offers WHERE search_id = ?", params![search_id])
            .map_err(|e| SearchError::Database(e.to_string()))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO offers (search_id, position, id, provider_id, route_kind, departure, arrival, duration_minutes, price, currency, stops, carrier, booking_reference) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .map_err(|e| SearchError::Database(e.to_string()))?;

            for (position, offer) in offers.iter().enumerate() {
                stmt.execute(params![
                    search_id,
                    position as i64,
                    offer.id,
                    offer.provider_id,
                    offer.route_kind.as_str(),
                    offer.departure.to_rfc3339(),
                    offer.arrival.to_rfc3339(),
                    offer.duration_minutes,
                    offer.price,
                    offer.currency,
                    offer.stops,
                    offer.carrier,
                    offer.booking_reference,
                ])
                .map_err(|e| SearchError::Database(e.to_string()))?;
            }
        }

        tx.commit()
            .map_err(|e| SearchError::Database(e.to_string()))
    }

    fn offers(&self, search_id: &str) -> Result<Vec<Offer>, SearchError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, search_id, provider_id, route_kind, departure, arrival, duration_minutes, price, currency, stops, carrier, booking_reference FROM offers WHERE search_id = ? ORDER BY position",
            )
            .map_err(|e| SearchError::Database(e.to_string()))?;

        let offers = stmt
            .query_map(params![search_id], Self::row_to_offer)
            .map_err(|e| SearchError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SearchError::Database(e.to_string()))?;

        Ok(offers)
    }
}
