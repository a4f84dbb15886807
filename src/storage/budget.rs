//! Budget entry repository
//!
//! `(category_id, year, month)` is unique; saving an entry for an existing
//! key updates the stored row in place.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::error::{MoneybagsError, MoneybagsResult};
use crate::models::{Amount, BudgetEntry, BudgetEntryId, CategoryId};

use super::id_column;

const SELECT_ENTRY: &str = "SELECT id, category_id, year, month, amount, comment, created_at, updated_at \
                            FROM moneybags_budget_entries";

fn entry_from_row(row: &SqliteRow) -> MoneybagsResult<BudgetEntry> {
    let month: i64 = row.try_get("month")?;
    let amount: i64 = row.try_get("amount")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;
    Ok(BudgetEntry {
        id: id_column(row, "id")?,
        category_id: id_column(row, "category_id")?,
        year: row.try_get("year")?,
        month: u32::try_from(month)
            .map_err(|_| MoneybagsError::Storage(format!("Invalid month {}", month)))?,
        amount: Amount::new(amount),
        comment: row.try_get("comment")?,
        created_at,
        updated_at,
    })
}

/// Insert the entry, or update amount and comment of the existing entry for
/// the same category and month. Returns the stored row.
pub async fn upsert(conn: &mut SqliteConnection, entry: &BudgetEntry) -> MoneybagsResult<BudgetEntry> {
    sqlx::query(
        "INSERT INTO moneybags_budget_entries \
            (id, category_id, year, month, amount, comment, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT (category_id, year, month) DO UPDATE SET \
            amount = excluded.amount, \
            comment = excluded.comment, \
            updated_at = excluded.updated_at",
    )
    .bind(entry.id.to_db())
    .bind(entry.category_id.to_db())
    .bind(entry.year)
    .bind(i64::from(entry.month))
    .bind(entry.amount.units())
    .bind(entry.comment.as_deref())
    .bind(entry.created_at)
    .bind(entry.updated_at)
    .execute(&mut *conn)
    .await?;

    find(conn, entry.category_id, entry.year, entry.month)
        .await?
        .ok_or_else(|| MoneybagsError::Storage("Budget entry vanished after save".into()))
}

pub async fn get(conn: &mut SqliteConnection, id: BudgetEntryId) -> MoneybagsResult<Option<BudgetEntry>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_ENTRY))
        .bind(id.to_db())
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(entry_from_row).transpose()
}

pub async fn find(
    conn: &mut SqliteConnection,
    category_id: CategoryId,
    year: i32,
    month: u32,
) -> MoneybagsResult<Option<BudgetEntry>> {
    let row = sqlx::query(&format!(
        "{} WHERE category_id = ? AND year = ? AND month = ?",
        SELECT_ENTRY
    ))
    .bind(category_id.to_db())
    .bind(year)
    .bind(i64::from(month))
    .fetch_optional(&mut *conn)
    .await?;
    row.as_ref().map(entry_from_row).transpose()
}

pub async fn delete(conn: &mut SqliteConnection, id: BudgetEntryId) -> MoneybagsResult<bool> {
    let result = sqlx::query("DELETE FROM moneybags_budget_entries WHERE id = ?")
        .bind(id.to_db())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Every entry of a year, ordered by category and month
pub async fn list_for_year(conn: &mut SqliteConnection, year: i32) -> MoneybagsResult<Vec<BudgetEntry>> {
    let rows = sqlx::query(&format!(
        "{} WHERE year = ? ORDER BY category_id, month",
        SELECT_ENTRY
    ))
    .bind(year)
    .fetch_all(&mut *conn)
    .await?;
    rows.iter().map(entry_from_row).collect()
}

pub async fn list_for_category_year(
    conn: &mut SqliteConnection,
    category_id: CategoryId,
    year: i32,
) -> MoneybagsResult<Vec<BudgetEntry>> {
    let rows = sqlx::query(&format!(
        "{} WHERE category_id = ? AND year = ? ORDER BY month",
        SELECT_ENTRY
    ))
    .bind(category_id.to_db())
    .bind(year)
    .fetch_all(&mut *conn)
    .await?;
    rows.iter().map(entry_from_row).collect()
}

pub async fn count_for_category_year(
    conn: &mut SqliteConnection,
    category_id: CategoryId,
    year: i32,
) -> MoneybagsResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM moneybags_budget_entries WHERE category_id = ? AND year = ?",
    )
    .bind(category_id.to_db())
    .bind(year)
    .fetch_one(&mut *conn)
    .await?;
    Ok(count)
}

pub async fn list_all(conn: &mut SqliteConnection) -> MoneybagsResult<Vec<BudgetEntry>> {
    let rows = sqlx::query(&format!("{} ORDER BY year, month, category_id", SELECT_ENTRY))
        .fetch_all(&mut *conn)
        .await?;
    rows.iter().map(entry_from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CategoryType};
    use crate::storage::{categories, Storage};

    #[tokio::test]
    async fn test_upsert_updates_existing_month() {
        let storage = Storage::in_memory().await.unwrap();
        let mut conn = storage.acquire().await.unwrap();

        let housing = Category::new("Housing", CategoryType::Expenses);
        categories::insert(&mut conn, &housing).await.unwrap();

        let first = upsert(
            &mut conn,
            &BudgetEntry::new(housing.id, 2024, 3, Amount::new(12000), Some("rent".into())),
        )
        .await
        .unwrap();

        let second = upsert(
            &mut conn,
            &BudgetEntry::new(housing.id, 2024, 3, Amount::new(12500), None),
        )
        .await
        .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.amount, Amount::new(12500));
        assert!(second.comment.is_none());
        assert_eq!(count_for_category_year(&mut conn, housing.id, 2024).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_listing_and_delete() {
        let storage = Storage::in_memory().await.unwrap();
        let mut conn = storage.acquire().await.unwrap();

        let cars = Category::new("Cars", CategoryType::Expenses);
        categories::insert(&mut conn, &cars).await.unwrap();

        for month in [2, 1, 3] {
            upsert(&mut conn, &BudgetEntry::new(cars.id, 2024, month, Amount::new(100), None))
                .await
                .unwrap();
        }
        upsert(&mut conn, &BudgetEntry::new(cars.id, 2025, 1, Amount::new(100), None))
            .await
            .unwrap();

        let months: Vec<_> = list_for_category_year(&mut conn, cars.id, 2024)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.month)
            .collect();
        assert_eq!(months, vec![1, 2, 3]);
        assert_eq!(list_for_year(&mut conn, 2025).await.unwrap().len(), 1);

        let entry = find(&mut conn, cars.id, 2024, 2).await.unwrap().unwrap();
        assert!(delete(&mut conn, entry.id).await.unwrap());
        assert!(get(&mut conn, entry.id).await.unwrap().is_none());
        assert_eq!(list_all(&mut conn).await.unwrap().len(), 3);
    }
}
