//! SQLite-backed account repository.
//!
//! Every call opens its own connection and drops it before returning, so no
//! handle outlives the statement it was opened for.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::domain::{Account, AccountField, AccountRepository, Error};

const CREATE_USERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    user_name         TEXT NOT NULL,
    account_no        TEXT NOT NULL UNIQUE,
    amount            TEXT,
    current_balance   TEXT,
    total_deposits    TEXT,
    total_withdrawals TEXT
)";

const SELECT_USERS: &str = "SELECT account_no, user_name, amount, current_balance, \
     total_deposits, total_withdrawals FROM users";

const INSERT_USER: &str = "INSERT INTO users (user_name, account_no, amount) VALUES (?1, ?2, ?3)";

/// Decimal column codec. Written as text to stay exact; read back from
/// whatever affinity the column ended up with.
struct SqlDecimal(Decimal);

impl FromSql for SqlDecimal {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(i) => Ok(Self(Decimal::from(i))),
            ValueRef::Real(f) => Decimal::try_from(f)
                .map(Self)
                .map_err(|e| FromSqlError::Other(Box::new(e))),
            ValueRef::Text(bytes) => {
                let text =
                    std::str::from_utf8(bytes).map_err(|e| FromSqlError::Other(Box::new(e)))?;
                Decimal::from_str(text.trim())
                    .map(Self)
                    .map_err(|e| FromSqlError::Other(Box::new(e)))
            }
            ValueRef::Null | ValueRef::Blob(_) => Err(FromSqlError::InvalidType),
        }
    }
}

impl ToSql for SqlDecimal {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

/// Account numbers from older tables may have been stored as integers.
fn text_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    match row.get_ref(idx)? {
        ValueRef::Integer(i) => Ok(i.to_string()),
        ValueRef::Null => Ok(String::new()),
        _ => row.get(idx),
    }
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    let account_number = text_column(row, 0)?;
    let user_name = text_column(row, 1)?;
    let amount: Option<SqlDecimal> = row.get(2)?;
    let current_balance: Option<SqlDecimal> = row.get(3)?;
    let total_deposits: Option<SqlDecimal> = row.get(4)?;
    let total_withdrawals: Option<SqlDecimal> = row.get(5)?;

    // The insert only writes `amount`; current_balance stays NULL until the
    // first balance update.
    let balance = current_balance
        .or(amount)
        .map(|d| d.0)
        .unwrap_or(Decimal::ZERO);

    let mut account = Account::new(account_number, user_name, balance);
    account.total_deposits = total_deposits.map(|d| d.0).unwrap_or(Decimal::ZERO);
    account.total_withdrawals = total_withdrawals.map(|d| d.0).unwrap_or(Decimal::ZERO);
    Ok(account)
}

#[derive(Debug, Clone)]
pub struct SqliteRepository {
    path: PathBuf,
}

impl SqliteRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, Error> {
        Ok(Connection::open(&self.path)?)
    }

    /// Creates the `users` table when it is missing. An existing table is
    /// left exactly as it is.
    pub fn ensure_schema(&self) -> Result<(), Error> {
        let conn = self.connect()?;
        conn.execute_batch(CREATE_USERS_TABLE)?;
        Ok(())
    }
}

impl AccountRepository for SqliteRepository {
    fn load_accounts(&self) -> Result<Vec<Account>, Error> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(SELECT_USERS)?;
        let rows = stmt.query_map([], account_from_row)?;

        let mut accounts = Vec::new();
        for row in rows {
            match row {
                Ok(account) => accounts.push(account),
                Err(e) => warn!(error = %e, "Skipping users row that could not be decoded"),
            }
        }

        debug!(count = accounts.len(), path = ?self.path, "Loaded accounts");
        Ok(accounts)
    }

    fn insert_account(
        &self,
        user_name: &str,
        account_number: &str,
        initial_balance: Decimal,
    ) -> Result<(), Error> {
        let conn = self.connect()?;
        conn.execute(
            INSERT_USER,
            params![user_name, account_number, SqlDecimal(initial_balance)],
        )?;
        Ok(())
    }

    fn update_field(
        &self,
        account_number: &str,
        field: AccountField,
        value: Decimal,
    ) -> Result<(), Error> {
        let conn = self.connect()?;
        let sql = format!(
            "UPDATE users SET {} = ?1 WHERE account_no = ?2",
            field.column()
        );
        let changed = conn.execute(&sql, params![SqlDecimal(value), account_number])?;

        if changed == 0 {
            return Err(Error::AccountNotFound(account_number.to_owned()));
        }
        Ok(())
    }
}
