//! Category repository
//!
//! Names are compared case-insensitively through the column collation.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::error::MoneybagsResult;
use crate::models::{Category, CategoryId};

use super::{enum_column, id_column};

const SELECT_CATEGORY: &str = "SELECT id, name, type, created_at FROM moneybags_categories";

/// How many rows elsewhere reference a category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryUsage {
    pub template_count: i64,
    pub budget_entry_count: i64,
    pub transaction_count: i64,
}

impl CategoryUsage {
    pub fn has_data(&self) -> bool {
        self.budget_entry_count > 0 || self.transaction_count > 0
    }
}

fn category_from_row(row: &SqliteRow) -> MoneybagsResult<Category> {
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    Ok(Category {
        id: id_column(row, "id")?,
        name: row.try_get("name")?,
        category_type: enum_column(row, "type")?,
        created_at,
    })
}

pub async fn insert(conn: &mut SqliteConnection, category: &Category) -> MoneybagsResult<()> {
    sqlx::query("INSERT INTO moneybags_categories (id, name, type, created_at) VALUES (?, ?, ?, ?)")
        .bind(category.id.to_db())
        .bind(&category.name)
        .bind(category.category_type.as_str())
        .bind(category.created_at)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn get(conn: &mut SqliteConnection, id: CategoryId) -> MoneybagsResult<Option<Category>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_CATEGORY))
        .bind(id.to_db())
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(category_from_row).transpose()
}

pub async fn get_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> MoneybagsResult<Option<Category>> {
    let row = sqlx::query(&format!("{} WHERE name = ? COLLATE NOCASE", SELECT_CATEGORY))
        .bind(name.trim())
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(category_from_row).transpose()
}

/// All categories, income first, then by name
pub async fn list(conn: &mut SqliteConnection) -> MoneybagsResult<Vec<Category>> {
    let rows = sqlx::query(&format!(
        "{} ORDER BY CASE type WHEN 'income' THEN 0 ELSE 1 END, name COLLATE NOCASE",
        SELECT_CATEGORY
    ))
    .fetch_all(&mut *conn)
    .await?;
    rows.iter().map(category_from_row).collect()
}

pub async fn rename(conn: &mut SqliteConnection, id: CategoryId, name: &str) -> MoneybagsResult<()> {
    sqlx::query("UPDATE moneybags_categories SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id.to_db())
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, id: CategoryId) -> MoneybagsResult<bool> {
    let result = sqlx::query("DELETE FROM moneybags_categories WHERE id = ?")
        .bind(id.to_db())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn usage(conn: &mut SqliteConnection, id: CategoryId) -> MoneybagsResult<CategoryUsage> {
    let row = sqlx::query(
        "SELECT \
            (SELECT COUNT(*) FROM moneybags_budget_templates WHERE category_id = ?) AS template_count, \
            (SELECT COUNT(*) FROM moneybags_budget_entries WHERE category_id = ?) AS budget_entry_count, \
            (SELECT COUNT(*) FROM moneybags_transactions WHERE category_id = ?) AS transaction_count",
    )
    .bind(id.to_db())
    .bind(id.to_db())
    .bind(id.to_db())
    .fetch_one(&mut *conn)
    .await?;

    Ok(CategoryUsage {
        template_count: row.try_get("template_count")?,
        budget_entry_count: row.try_get("budget_entry_count")?,
        transaction_count: row.try_get("transaction_count")?,
    })
}
