//! Customer repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the idempotent upsert statement and id-based reads over the
//!   `customers` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `upsert_customer` returns the inserted-or-matched primary key.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Lists are ordered by `id ASC`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::customer::{Customer, CustomerId};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CUSTOMER_SELECT_SQL: &str = "SELECT
    id,
    name,
    subscribed
FROM customers";

const CUSTOMER_UPSERT_SQL: &str = "INSERT INTO customers (name, subscribed)
VALUES (?1, ?2)
ON CONFLICT (name) DO UPDATE SET subscribed = excluded.subscribed
RETURNING id;";

const REQUIRED_COLUMNS: [&str; 3] = ["id", "name", "subscribed"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for customer persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// The upsert statement produced no key row.
    MissingGeneratedKey,
    /// The upsert statement produced a key that is not an integer.
    InvalidGeneratedKey(String),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingGeneratedKey => write!(f, "upsert returned no generated key"),
            Self::InvalidGeneratedKey(value) => {
                write!(f, "upsert returned a non-integer generated key: {value}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted customer data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match required {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column missing: {table}.{column}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage collaborator used by the upsert path.
pub trait CustomerRepository {
    /// Inserts `name`, or updates `subscribed` on the row already holding it.
    /// Returns the primary key of the inserted or matched row.
    fn upsert_customer(&self, name: &str, subscribed: bool) -> RepoResult<CustomerId>;
    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>>;
    /// Returns every customer ordered by `id ASC`.
    fn list_customers(&self) -> RepoResult<Vec<Customer>>;
}

/// SQLite-backed customer repository.
///
/// Works on any `&Connection`, including the one behind a `Transaction`.
pub struct SqliteCustomerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCustomerRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CustomerRepository for SqliteCustomerRepository<'_> {
    fn upsert_customer(&self, name: &str, subscribed: bool) -> RepoResult<CustomerId> {
        let key = self
            .conn
            .query_row(
                CUSTOMER_UPSERT_SQL,
                params![name, bool_to_int(subscribed)],
                |row| row.get::<_, Value>(0),
            )
            .optional()?;

        match key {
            Some(value) => parse_generated_key(value),
            None => Err(RepoError::MissingGeneratedKey),
        }
    }

    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CUSTOMER_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_customer_row(row)?));
        }

        Ok(None)
    }

    fn list_customers(&self) -> RepoResult<Vec<Customer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CUSTOMER_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut customers = Vec::new();

        while let Some(row) = rows.next()? {
            customers.push(parse_customer_row(row)?);
        }

        Ok(customers)
    }
}

/// Normalizes the key value returned by the upsert statement.
pub fn parse_generated_key(value: Value) -> RepoResult<CustomerId> {
    match value {
        Value::Integer(id) => Ok(id),
        Value::Null => Err(RepoError::MissingGeneratedKey),
        other => Err(RepoError::InvalidGeneratedKey(format!("{other:?}"))),
    }
}

fn parse_customer_row(row: &Row<'_>) -> RepoResult<Customer> {
    let id: CustomerId = row.get("id")?;
    let subscribed = match row.get::<_, i64>("subscribed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid subscribed value `{other}` in customers.subscribed for id {id}"
            )));
        }
    };

    Ok(Customer::persisted(id, row.get::<_, String>("name")?, subscribed))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "customers")? {
        return Err(RepoError::MissingRequiredTable("customers"));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "customers", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "customers",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
