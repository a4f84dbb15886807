//! Transaction repository
//!
//! Dates are stored as `YYYY-MM-DD` text, so range filters compare strings.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::error::MoneybagsResult;
use crate::models::{
    Amount, CategoryId, DateRange, PayeeId, Transaction, TransactionDetail, TransactionId,
    TransactionWithPayee,
};

use super::{enum_column, id_column, optional_id_column};

const TRANSACTION_COLUMNS: &str =
    "t.id, t.category_id, t.payee_id, t.date, t.amount, t.comment, t.created_at, t.updated_at";

fn transaction_from_row(row: &SqliteRow) -> MoneybagsResult<Transaction> {
    let date: NaiveDate = row.try_get("date")?;
    let amount: i64 = row.try_get("amount")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;
    Ok(Transaction {
        id: id_column(row, "id")?,
        category_id: id_column(row, "category_id")?,
        payee_id: optional_id_column(row, "payee_id")?,
        date,
        amount: Amount::new(amount),
        comment: row.try_get("comment")?,
        created_at,
        updated_at,
    })
}

/// One expense payment to a known payee, used for recurring detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayeePayment {
    pub payee_id: PayeeId,
    pub payee_name: String,
    pub date: NaiveDate,
    pub amount: Amount,
}

pub async fn insert(conn: &mut SqliteConnection, txn: &Transaction) -> MoneybagsResult<()> {
    sqlx::query(
        "INSERT INTO moneybags_transactions \
            (id, category_id, payee_id, date, amount, comment, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(txn.id.to_db())
    .bind(txn.category_id.to_db())
    .bind(txn.payee_id.map(|p| p.to_db()))
    .bind(txn.date)
    .bind(txn.amount.units())
    .bind(txn.comment.as_deref())
    .bind(txn.created_at)
    .bind(txn.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get(conn: &mut SqliteConnection, id: TransactionId) -> MoneybagsResult<Option<Transaction>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM moneybags_transactions t WHERE t.id = ?",
        TRANSACTION_COLUMNS
    ))
    .bind(id.to_db())
    .fetch_optional(&mut *conn)
    .await?;
    row.as_ref().map(transaction_from_row).transpose()
}

/// Persist date, amount, payee and comment of an existing transaction
pub async fn update(conn: &mut SqliteConnection, txn: &Transaction) -> MoneybagsResult<()> {
    sqlx::query(
        "UPDATE moneybags_transactions \
         SET payee_id = ?, date = ?, amount = ?, comment = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(txn.payee_id.map(|p| p.to_db()))
    .bind(txn.date)
    .bind(txn.amount.units())
    .bind(txn.comment.as_deref())
    .bind(txn.updated_at)
    .bind(txn.id.to_db())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, id: TransactionId) -> MoneybagsResult<bool> {
    let result = sqlx::query("DELETE FROM moneybags_transactions WHERE id = ?")
        .bind(id.to_db())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Transactions of one category in `[range.start, range.end)` with payee names
pub async fn list_for_category(
    conn: &mut SqliteConnection,
    category_id: CategoryId,
    range: DateRange,
) -> MoneybagsResult<Vec<TransactionWithPayee>> {
    let rows = sqlx::query(&format!(
        "SELECT {}, p.name AS payee_name \
         FROM moneybags_transactions t \
         LEFT JOIN moneybags_payees p ON p.id = t.payee_id \
         WHERE t.category_id = ? AND t.date >= ? AND t.date < ? \
         ORDER BY t.date, t.created_at",
        TRANSACTION_COLUMNS
    ))
    .bind(category_id.to_db())
    .bind(range.start)
    .bind(range.end)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(TransactionWithPayee {
                transaction: transaction_from_row(row)?,
                payee_name: row.try_get("payee_name")?,
            })
        })
        .collect()
}

/// All transactions in `[range.start, range.end)`
pub async fn list_in_range(
    conn: &mut SqliteConnection,
    range: DateRange,
) -> MoneybagsResult<Vec<TransactionWithPayee>> {
    let rows = sqlx::query(&format!(
        "SELECT {}, p.name AS payee_name \
         FROM moneybags_transactions t \
         LEFT JOIN moneybags_payees p ON p.id = t.payee_id \
         WHERE t.date >= ? AND t.date < ? \
         ORDER BY t.date, t.created_at",
        TRANSACTION_COLUMNS
    ))
    .bind(range.start)
    .bind(range.end)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(TransactionWithPayee {
                transaction: transaction_from_row(row)?,
                payee_name: row.try_get("payee_name")?,
            })
        })
        .collect()
}

pub async fn count_for_category(
    conn: &mut SqliteConnection,
    category_id: CategoryId,
    range: DateRange,
) -> MoneybagsResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM moneybags_transactions WHERE category_id = ? AND date >= ? AND date < ?",
    )
    .bind(category_id.to_db())
    .bind(range.start)
    .bind(range.end)
    .fetch_one(&mut *conn)
    .await?;
    Ok(count)
}

/// The most recent transactions, newest first
pub async fn recent(conn: &mut SqliteConnection, limit: u32) -> MoneybagsResult<Vec<TransactionDetail>> {
    let rows = sqlx::query(
        "SELECT t.id, t.date, t.amount, t.comment, \
                COALESCE(p.name, 'Unknown') AS payee_name, \
                c.id AS category_id, c.name AS category_name, c.type AS category_type \
         FROM moneybags_transactions t \
         JOIN moneybags_categories c ON c.id = t.category_id \
         LEFT JOIN moneybags_payees p ON p.id = t.payee_id \
         ORDER BY t.date DESC, t.created_at DESC \
         LIMIT ?",
    )
    .bind(i64::from(limit))
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|row| {
            let amount: i64 = row.try_get("amount")?;
            Ok(TransactionDetail {
                id: id_column(row, "id")?,
                date: row.try_get("date")?,
                amount: Amount::new(amount),
                comment: row.try_get("comment")?,
                payee_name: row.try_get("payee_name")?,
                category_id: id_column(row, "category_id")?,
                category_name: row.try_get("category_name")?,
                category_type: enum_column(row, "category_type")?,
            })
        })
        .collect()
}

/// Expense transactions with a payee in `[range.start, range.end)`
pub async fn expense_payments(
    conn: &mut SqliteConnection,
    range: DateRange,
) -> MoneybagsResult<Vec<PayeePayment>> {
    let rows = sqlx::query(
        "SELECT t.payee_id, p.name AS payee_name, t.date, t.amount \
         FROM moneybags_transactions t \
         JOIN moneybags_payees p ON p.id = t.payee_id \
         JOIN moneybags_categories c ON c.id = t.category_id \
         WHERE c.type = 'expenses' AND t.date >= ? AND t.date < ? \
         ORDER BY t.date, t.created_at",
    )
    .bind(range.start)
    .bind(range.end)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|row| {
            let amount: i64 = row.try_get("amount")?;
            Ok(PayeePayment {
                payee_id: id_column(row, "payee_id")?,
                payee_name: row.try_get("payee_name")?,
                date: row.try_get("date")?,
                amount: Amount::new(amount),
            })
        })
        .collect()
}

pub async fn list_all(conn: &mut SqliteConnection) -> MoneybagsResult<Vec<Transaction>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM moneybags_transactions t ORDER BY t.date, t.created_at",
        TRANSACTION_COLUMNS
    ))
    .fetch_all(&mut *conn)
    .await?;
    rows.iter().map(transaction_from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CategoryType, Payee, PayeeType, YearMonth};
    use crate::storage::{categories, payees, Storage};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_range_queries_are_half_open() {
        let storage = Storage::in_memory().await.unwrap();
        let mut conn = storage.acquire().await.unwrap();

        let food = Category::new("Food", CategoryType::Expenses);
        categories::insert(&mut conn, &food).await.unwrap();
        let shop = Payee::new("Grocer", PayeeType::Actual);
        payees::insert(&mut conn, &shop).await.unwrap();

        for (d, amount) in [(date(2024, 2, 29), 100), (date(2024, 3, 1), 200), (date(2024, 3, 31), 300), (date(2024, 4, 1), 400)] {
            insert(&mut conn, &Transaction::new(food.id, Some(shop.id), d, Amount::new(amount), None))
                .await
                .unwrap();
        }

        let march = YearMonth::new(2024, 3).unwrap().range();
        let listed = list_for_category(&mut conn, food.id, march).await.unwrap();
        let amounts: Vec<_> = listed.iter().map(|t| t.transaction.amount.units()).collect();
        assert_eq!(amounts, vec![200, 300]);
        assert_eq!(listed[0].payee_name.as_deref(), Some("Grocer"));

        assert_eq!(count_for_category(&mut conn, food.id, march).await.unwrap(), 2);
        assert_eq!(list_in_range(&mut conn, DateRange::year(2024)).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let storage = Storage::in_memory().await.unwrap();
        let mut conn = storage.acquire().await.unwrap();

        let food = Category::new("Food", CategoryType::Expenses);
        categories::insert(&mut conn, &food).await.unwrap();

        let mut txn = Transaction::new(food.id, None, date(2024, 1, 5), Amount::new(50), None);
        insert(&mut conn, &txn).await.unwrap();

        txn.amount = Amount::new(-20);
        txn.comment = Some("refund".into());
        update(&mut conn, &txn).await.unwrap();

        let stored = get(&mut conn, txn.id).await.unwrap().unwrap();
        assert_eq!(stored.amount, Amount::new(-20));
        assert_eq!(stored.comment.as_deref(), Some("refund"));
        assert!(stored.payee_id.is_none());

        assert!(delete(&mut conn, txn.id).await.unwrap());
        assert!(list_all(&mut conn).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recent_uses_unknown_for_missing_payee() {
        let storage = Storage::in_memory().await.unwrap();
        let mut conn = storage.acquire().await.unwrap();

        let salary = Category::new("Salary", CategoryType::Income);
        categories::insert(&mut conn, &salary).await.unwrap();
        for day in 1..=3 {
            insert(&mut conn, &Transaction::new(salary.id, None, date(2024, 5, day), Amount::new(day as i64), None))
                .await
                .unwrap();
        }

        let recent = recent(&mut conn, 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].date, date(2024, 5, 3));
        assert_eq!(recent[0].payee_name, "Unknown");
        assert_eq!(recent[0].category_type, CategoryType::Income);
    }

    #[tokio::test]
    async fn test_expense_payments_skip_income_and_missing_payees() {
        let storage = Storage::in_memory().await.unwrap();
        let mut conn = storage.acquire().await.unwrap();

        let salary = Category::new("Salary", CategoryType::Income);
        let rent = Category::new("Rent", CategoryType::Expenses);
        categories::insert(&mut conn, &salary).await.unwrap();
        categories::insert(&mut conn, &rent).await.unwrap();
        let landlord = Payee::new("Landlord", PayeeType::Generic);
        let employer = Payee::new("Employer", PayeeType::Actual);
        payees::insert(&mut conn, &landlord).await.unwrap();
        payees::insert(&mut conn, &employer).await.unwrap();

        let d = date(2024, 6, 1);
        insert(&mut conn, &Transaction::new(rent.id, Some(landlord.id), d, Amount::new(9000), None)).await.unwrap();
        insert(&mut conn, &Transaction::new(rent.id, None, d, Amount::new(10), None)).await.unwrap();
        insert(&mut conn, &Transaction::new(salary.id, Some(employer.id), d, Amount::new(40000), None)).await.unwrap();

        let payments = expense_payments(&mut conn, DateRange::year(2024)).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].payee_name, "Landlord");
        assert_eq!(payments[0].amount, Amount::new(9000));
    }
}
