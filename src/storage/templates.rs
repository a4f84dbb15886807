//! Budget template repository

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::error::MoneybagsResult;
use crate::models::{BudgetTemplate, Category, CategoryId};

use super::{enum_column, id_column};

fn template_from_row(row: &SqliteRow) -> MoneybagsResult<BudgetTemplate> {
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    Ok(BudgetTemplate {
        id: id_column(row, "id")?,
        year: row.try_get("year")?,
        category_id: id_column(row, "category_id")?,
        created_at,
    })
}

pub async fn insert(conn: &mut SqliteConnection, template: &BudgetTemplate) -> MoneybagsResult<()> {
    sqlx::query(
        "INSERT INTO moneybags_budget_templates (id, year, category_id, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(template.id.to_db())
    .bind(template.year)
    .bind(template.category_id.to_db())
    .bind(template.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn exists(
    conn: &mut SqliteConnection,
    year: i32,
    category_id: CategoryId,
) -> MoneybagsResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM moneybags_budget_templates WHERE year = ? AND category_id = ?",
    )
    .bind(year)
    .bind(category_id.to_db())
    .fetch_one(&mut *conn)
    .await?;
    Ok(count > 0)
}

/// Categories in a year's template, income first, then by name
pub async fn categories_for_year(
    conn: &mut SqliteConnection,
    year: i32,
) -> MoneybagsResult<Vec<Category>> {
    let rows = sqlx::query(
        "SELECT c.id, c.name, c.type, c.created_at \
         FROM moneybags_budget_templates t \
         JOIN moneybags_categories c ON c.id = t.category_id \
         WHERE t.year = ? \
         ORDER BY CASE c.type WHEN 'income' THEN 0 ELSE 1 END, c.name COLLATE NOCASE",
    )
    .bind(year)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|row| {
            let created_at: DateTime<Utc> = row.try_get("created_at")?;
            Ok(Category {
                id: id_column(row, "id")?,
                name: row.try_get("name")?,
                category_type: enum_column(row, "type")?,
                created_at,
            })
        })
        .collect()
}

pub async fn delete(
    conn: &mut SqliteConnection,
    year: i32,
    category_id: CategoryId,
) -> MoneybagsResult<bool> {
    let result =
        sqlx::query("DELETE FROM moneybags_budget_templates WHERE year = ? AND category_id = ?")
            .bind(year)
            .bind(category_id.to_db())
            .execute(&mut *conn)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove a category from every year's template
pub async fn delete_for_category(
    conn: &mut SqliteConnection,
    category_id: CategoryId,
) -> MoneybagsResult<u64> {
    let result = sqlx::query("DELETE FROM moneybags_budget_templates WHERE category_id = ?")
        .bind(category_id.to_db())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Distinct template years, ascending
pub async fn years(conn: &mut SqliteConnection) -> MoneybagsResult<Vec<i32>> {
    let years: Vec<i32> =
        sqlx::query_scalar("SELECT DISTINCT year FROM moneybags_budget_templates ORDER BY year")
            .fetch_all(&mut *conn)
            .await?;
    Ok(years)
}

/// Years whose template contains the category, ascending
pub async fn years_for_category(
    conn: &mut SqliteConnection,
    category_id: CategoryId,
) -> MoneybagsResult<Vec<i32>> {
    let years: Vec<i32> = sqlx::query_scalar(
        "SELECT year FROM moneybags_budget_templates WHERE category_id = ? ORDER BY year",
    )
    .bind(category_id.to_db())
    .fetch_all(&mut *conn)
    .await?;
    Ok(years)
}

pub async fn list_all(conn: &mut SqliteConnection) -> MoneybagsResult<Vec<BudgetTemplate>> {
    let rows = sqlx::query(
        "SELECT id, year, category_id, created_at FROM moneybags_budget_templates ORDER BY year",
    )
    .fetch_all(&mut *conn)
    .await?;
    rows.iter().map(template_from_row).collect()
}
