//! Supersaver repository
//!
//! Savings categories and their deposits. Dates are `YYYY-MM-DD` text, the
//! same as transactions.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::error::MoneybagsResult;
use crate::models::{
    Amount, DateRange, SupersaverCategory, SupersaverCategoryId, SupersaverCategorySummary,
    SupersaverEntry, SupersaverEntryDetail, SupersaverEntryId,
};

use super::id_column;

const SELECT_CATEGORY: &str =
    "SELECT id, name, created_at, updated_at FROM moneybags_supersaver_categories";

const ENTRY_COLUMNS: &str =
    "e.id, e.category_id, e.date, e.amount, e.comment, e.created_at, e.updated_at";

fn category_from_row(row: &SqliteRow) -> MoneybagsResult<SupersaverCategory> {
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;
    Ok(SupersaverCategory {
        id: id_column(row, "id")?,
        name: row.try_get("name")?,
        created_at,
        updated_at,
    })
}

fn entry_from_row(row: &SqliteRow) -> MoneybagsResult<SupersaverEntry> {
    let date: NaiveDate = row.try_get("date")?;
    let amount: i64 = row.try_get("amount")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;
    Ok(SupersaverEntry {
        id: id_column(row, "id")?,
        category_id: id_column(row, "category_id")?,
        date,
        amount: Amount::new(amount),
        comment: row.try_get("comment")?,
        created_at,
        updated_at,
    })
}

pub async fn insert_category(
    conn: &mut SqliteConnection,
    category: &SupersaverCategory,
) -> MoneybagsResult<()> {
    sqlx::query(
        "INSERT INTO moneybags_supersaver_categories (id, name, created_at, updated_at) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(category.id.to_db())
    .bind(&category.name)
    .bind(category.created_at)
    .bind(category.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get_category(
    conn: &mut SqliteConnection,
    id: SupersaverCategoryId,
) -> MoneybagsResult<Option<SupersaverCategory>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_CATEGORY))
        .bind(id.to_db())
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(category_from_row).transpose()
}

pub async fn get_category_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> MoneybagsResult<Option<SupersaverCategory>> {
    let row = sqlx::query(&format!("{} WHERE name = ? COLLATE NOCASE", SELECT_CATEGORY))
        .bind(name.trim())
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(category_from_row).transpose()
}

pub async fn list_categories(conn: &mut SqliteConnection) -> MoneybagsResult<Vec<SupersaverCategory>> {
    let rows = sqlx::query(&format!("{} ORDER BY name COLLATE NOCASE", SELECT_CATEGORY))
        .fetch_all(&mut *conn)
        .await?;
    rows.iter().map(category_from_row).collect()
}

/// All categories by name with their deposit count and balance
pub async fn list_categories_with_balance(
    conn: &mut SqliteConnection,
) -> MoneybagsResult<Vec<SupersaverCategorySummary>> {
    let rows = sqlx::query(
        "SELECT c.id, c.name, c.created_at, c.updated_at, \
                COUNT(e.id) AS entry_count, COALESCE(SUM(e.amount), 0) AS balance \
         FROM moneybags_supersaver_categories c \
         LEFT JOIN moneybags_supersaver_entries e ON e.category_id = c.id \
         GROUP BY c.id, c.name, c.created_at, c.updated_at \
         ORDER BY c.name COLLATE NOCASE",
    )
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|row| {
            let balance: i64 = row.try_get("balance")?;
            Ok(SupersaverCategorySummary {
                category: category_from_row(row)?,
                entry_count: row.try_get("entry_count")?,
                balance: Amount::new(balance),
            })
        })
        .collect()
}

pub async fn update_category(
    conn: &mut SqliteConnection,
    category: &SupersaverCategory,
) -> MoneybagsResult<()> {
    sqlx::query("UPDATE moneybags_supersaver_categories SET name = ?, updated_at = ? WHERE id = ?")
        .bind(&category.name)
        .bind(category.updated_at)
        .bind(category.id.to_db())
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn delete_category(
    conn: &mut SqliteConnection,
    id: SupersaverCategoryId,
) -> MoneybagsResult<bool> {
    let result = sqlx::query("DELETE FROM moneybags_supersaver_categories WHERE id = ?")
        .bind(id.to_db())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn entry_count(conn: &mut SqliteConnection, id: SupersaverCategoryId) -> MoneybagsResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM moneybags_supersaver_entries WHERE category_id = ?")
            .bind(id.to_db())
            .fetch_one(&mut *conn)
            .await?;
    Ok(count)
}

/// Sum of all deposits of a category, zero when it has none
pub async fn balance(conn: &mut SqliteConnection, id: SupersaverCategoryId) -> MoneybagsResult<Amount> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0) FROM moneybags_supersaver_entries WHERE category_id = ?",
    )
    .bind(id.to_db())
    .fetch_one(&mut *conn)
    .await?;
    Ok(Amount::new(total))
}

pub async fn insert_entry(conn: &mut SqliteConnection, entry: &SupersaverEntry) -> MoneybagsResult<()> {
    sqlx::query(
        "INSERT INTO moneybags_supersaver_entries \
            (id, category_id, date, amount, comment, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(entry.id.to_db())
    .bind(entry.category_id.to_db())
    .bind(entry.date)
    .bind(entry.amount.units())
    .bind(entry.comment.as_deref())
    .bind(entry.created_at)
    .bind(entry.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get_entry(
    conn: &mut SqliteConnection,
    id: SupersaverEntryId,
) -> MoneybagsResult<Option<SupersaverEntry>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM moneybags_supersaver_entries e WHERE e.id = ?",
        ENTRY_COLUMNS
    ))
    .bind(id.to_db())
    .fetch_optional(&mut *conn)
    .await?;
    row.as_ref().map(entry_from_row).transpose()
}

pub async fn update_entry(conn: &mut SqliteConnection, entry: &SupersaverEntry) -> MoneybagsResult<()> {
    sqlx::query(
        "UPDATE moneybags_supersaver_entries \
         SET category_id = ?, date = ?, amount = ?, comment = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(entry.category_id.to_db())
    .bind(entry.date)
    .bind(entry.amount.units())
    .bind(entry.comment.as_deref())
    .bind(entry.updated_at)
    .bind(entry.id.to_db())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn delete_entry(conn: &mut SqliteConnection, id: SupersaverEntryId) -> MoneybagsResult<bool> {
    let result = sqlx::query("DELETE FROM moneybags_supersaver_entries WHERE id = ?")
        .bind(id.to_db())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Every deposit, oldest first
pub async fn list_all_entries(conn: &mut SqliteConnection) -> MoneybagsResult<Vec<SupersaverEntry>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM moneybags_supersaver_entries e ORDER BY e.date, e.created_at",
        ENTRY_COLUMNS
    ))
    .fetch_all(&mut *conn)
    .await?;
    rows.iter().map(entry_from_row).collect()
}

/// Deposits of one category in `[range.start, range.end)`, newest first
pub async fn list_entries_for_category(
    conn: &mut SqliteConnection,
    category_id: SupersaverCategoryId,
    range: DateRange,
) -> MoneybagsResult<Vec<SupersaverEntryDetail>> {
    let rows = sqlx::query(&format!(
        "SELECT {}, c.name AS category_name \
         FROM moneybags_supersaver_entries e \
         JOIN moneybags_supersaver_categories c ON c.id = e.category_id \
         WHERE e.category_id = ? AND e.date >= ? AND e.date < ? \
         ORDER BY e.date DESC, e.created_at DESC",
        ENTRY_COLUMNS
    ))
    .bind(category_id.to_db())
    .bind(range.start)
    .bind(range.end)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(SupersaverEntryDetail {
                entry: entry_from_row(row)?,
                category_name: row.try_get("category_name")?,
            })
        })
        .collect()
}

/// Deposits of all categories summed per day in `[range.start, range.end)`
pub async fn daily_totals(
    conn: &mut SqliteConnection,
    range: DateRange,
) -> MoneybagsResult<BTreeMap<NaiveDate, Amount>> {
    let rows = sqlx::query(
        "SELECT date, SUM(amount) AS total FROM moneybags_supersaver_entries \
         WHERE date >= ? AND date < ? \
         GROUP BY date",
    )
    .bind(range.start)
    .bind(range.end)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|row| {
            let date: NaiveDate = row.try_get("date")?;
            let total: i64 = row.try_get("total")?;
            Ok((date, Amount::new(total)))
        })
        .collect()
}

/// Deposits of all categories in `[range.start, range.end)`
pub async fn total_in_range(conn: &mut SqliteConnection, range: DateRange) -> MoneybagsResult<Amount> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0) FROM moneybags_supersaver_entries \
         WHERE date >= ? AND date < ?",
    )
    .bind(range.start)
    .bind(range.end)
    .fetch_one(&mut *conn)
    .await?;
    Ok(Amount::new(total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearMonth;
    use crate::storage::Storage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_category_crud() {
        let storage = Storage::in_memory().await.unwrap();
        let mut conn = storage.acquire().await.unwrap();

        let mut category = SupersaverCategory::new("Holiday");
        insert_category(&mut conn, &category).await.unwrap();
        assert_eq!(
            get_category_by_name(&mut conn, "holiday").await.unwrap().unwrap().id,
            category.id
        );

        category.name = "Summer holiday".into();
        update_category(&mut conn, &category).await.unwrap();
        let fetched = get_category(&mut conn, category.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Summer holiday");

        assert!(delete_category(&mut conn, category.id).await.unwrap());
        assert!(!delete_category(&mut conn, category.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_entries_balance_and_totals() {
        let storage = Storage::in_memory().await.unwrap();
        let mut conn = storage.acquire().await.unwrap();

        let car = SupersaverCategory::new("Car");
        let house = SupersaverCategory::new("House");
        let empty = SupersaverCategory::new("Empty");
        for category in [&car, &house, &empty] {
            insert_category(&mut conn, category).await.unwrap();
        }

        for (category, day, amount) in [(&car, date(2024, 3, 1), 100), (&car, date(2024, 3, 20), 250)] {
            let entry = SupersaverEntry::new(category.id, day, Amount::new(amount), None);
            insert_entry(&mut conn, &entry).await.unwrap();
        }
        let moved = SupersaverEntry::new(house.id, date(2024, 3, 20), Amount::new(50), None);
        insert_entry(&mut conn, &moved).await.unwrap();
        insert_entry(
            &mut conn,
            &SupersaverEntry::new(house.id, date(2024, 4, 2), Amount::new(7), None),
        )
        .await
        .unwrap();

        assert_eq!(balance(&mut conn, car.id).await.unwrap(), Amount::new(350));
        assert_eq!(balance(&mut conn, empty.id).await.unwrap(), Amount::zero());
        assert_eq!(entry_count(&mut conn, house.id).await.unwrap(), 2);

        let march = YearMonth::new(2024, 3).unwrap().range();
        let car_march = list_entries_for_category(&mut conn, car.id, march).await.unwrap();
        assert_eq!(car_march.len(), 2);
        assert_eq!(car_march[0].entry.date, date(2024, 3, 20));
        assert_eq!(car_march[0].category_name, "Car");

        let days = daily_totals(&mut conn, DateRange::year(2024)).await.unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days[&date(2024, 3, 20)], Amount::new(300));
        assert_eq!(total_in_range(&mut conn, march).await.unwrap(), Amount::new(400));

        let summaries = list_categories_with_balance(&mut conn).await.unwrap();
        let names: Vec<_> = summaries.iter().map(|s| s.category.name.as_str()).collect();
        assert_eq!(names, vec!["Car", "Empty", "House"]);
        assert_eq!(summaries[1].entry_count, 0);
        assert_eq!(summaries[1].balance, Amount::zero());
        assert_eq!(summaries[2].balance, Amount::new(57));

        let mut updated = moved.clone();
        updated.category_id = car.id;
        updated.amount = Amount::new(60);
        update_entry(&mut conn, &updated).await.unwrap();
        assert_eq!(get_entry(&mut conn, moved.id).await.unwrap().unwrap().category_id, car.id);
        assert_eq!(balance(&mut conn, car.id).await.unwrap(), Amount::new(410));

        assert_eq!(list_all_entries(&mut conn).await.unwrap().len(), 4);
        assert_eq!(list_categories(&mut conn).await.unwrap()[0].name, "Car");

        assert!(delete_entry(&mut conn, moved.id).await.unwrap());
        assert!(get_entry(&mut conn, moved.id).await.unwrap().is_none());
    }
}
