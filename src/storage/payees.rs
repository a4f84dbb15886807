//! Payee repository

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::error::MoneybagsResult;
use crate::models::{Payee, PayeeId, PayeeUsage};

use super::{enum_column, id_column};

const SELECT_PAYEE: &str = "SELECT id, name, type, created_at FROM moneybags_payees";

fn payee_from_row(row: &SqliteRow) -> MoneybagsResult<Payee> {
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    Ok(Payee {
        id: id_column(row, "id")?,
        name: row.try_get("name")?,
        payee_type: enum_column(row, "type")?,
        created_at,
    })
}

pub async fn insert(conn: &mut SqliteConnection, payee: &Payee) -> MoneybagsResult<()> {
    sqlx::query("INSERT INTO moneybags_payees (id, name, type, created_at) VALUES (?, ?, ?, ?)")
        .bind(payee.id.to_db())
        .bind(&payee.name)
        .bind(payee.payee_type.as_str())
        .bind(payee.created_at)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn get(conn: &mut SqliteConnection, id: PayeeId) -> MoneybagsResult<Option<Payee>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_PAYEE))
        .bind(id.to_db())
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(payee_from_row).transpose()
}

pub async fn get_by_name(conn: &mut SqliteConnection, name: &str) -> MoneybagsResult<Option<Payee>> {
    let row = sqlx::query(&format!("{} WHERE name = ? COLLATE NOCASE", SELECT_PAYEE))
        .bind(name.trim())
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(payee_from_row).transpose()
}

pub async fn list(conn: &mut SqliteConnection) -> MoneybagsResult<Vec<Payee>> {
    let rows = sqlx::query(&format!("{} ORDER BY name COLLATE NOCASE", SELECT_PAYEE))
        .fetch_all(&mut *conn)
        .await?;
    rows.iter().map(payee_from_row).collect()
}

/// All payees with their transaction count and latest transaction date
pub async fn list_with_usage(conn: &mut SqliteConnection) -> MoneybagsResult<Vec<PayeeUsage>> {
    let rows = sqlx::query(
        "SELECT p.id, p.name, p.type, p.created_at, \
                COUNT(t.id) AS transaction_count, MAX(t.date) AS last_used \
         FROM moneybags_payees p \
         LEFT JOIN moneybags_transactions t ON t.payee_id = p.id \
         GROUP BY p.id, p.name, p.type, p.created_at \
         ORDER BY p.name COLLATE NOCASE",
    )
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|row| {
            let last_used: Option<String> = row.try_get("last_used")?;
            Ok(PayeeUsage {
                payee: payee_from_row(row)?,
                transaction_count: row.try_get("transaction_count")?,
                last_used: last_used
                    .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
            })
        })
        .collect()
}

pub async fn update(conn: &mut SqliteConnection, payee: &Payee) -> MoneybagsResult<()> {
    sqlx::query("UPDATE moneybags_payees SET name = ?, type = ? WHERE id = ?")
        .bind(&payee.name)
        .bind(payee.payee_type.as_str())
        .bind(payee.id.to_db())
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, id: PayeeId) -> MoneybagsResult<bool> {
    let result = sqlx::query("DELETE FROM moneybags_payees WHERE id = ?")
        .bind(id.to_db())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn transaction_count(conn: &mut SqliteConnection, id: PayeeId) -> MoneybagsResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM moneybags_transactions WHERE payee_id = ?")
            .bind(id.to_db())
            .fetch_one(&mut *conn)
            .await?;
    Ok(count)
}
