//! CSV Export functionality
//!
//! Exports transactions and budget entries to spreadsheet-friendly CSV.

use std::collections::HashMap;
use std::io::Write;

use crate::error::{MoneybagsError, MoneybagsResult};
use crate::models::{Category, CategoryId, PayeeId};
use crate::storage::{budget, categories, payees, transactions, Storage};

fn export_err(e: impl std::fmt::Display) -> MoneybagsError {
    MoneybagsError::Export(e.to_string())
}

fn category_lookup(list: Vec<Category>) -> HashMap<CategoryId, Category> {
    list.into_iter().map(|c| (c.id, c)).collect()
}

/// Export all transactions to CSV, oldest first
pub async fn export_transactions_csv<W: Write>(storage: &Storage, writer: W) -> MoneybagsResult<()> {
    let mut conn = storage.acquire().await?;
    let categories = category_lookup(categories::list(&mut conn).await?);
    let payee_names: HashMap<PayeeId, String> = payees::list(&mut conn)
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();
    let transactions = transactions::list_all(&mut conn).await?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(["ID", "Date", "Category", "Type", "Payee", "Amount", "Comment"])
        .map_err(export_err)?;

    for txn in &transactions {
        let (category_name, category_type) = categories
            .get(&txn.category_id)
            .map(|c| (c.name.as_str(), c.category_type.as_str()))
            .unwrap_or(("Unknown", ""));
        let payee = txn
            .payee_id
            .and_then(|id| payee_names.get(&id))
            .map(String::as_str)
            .unwrap_or("");

        csv_writer
            .write_record([
                txn.id.to_string().as_str(),
                txn.date.to_string().as_str(),
                category_name,
                category_type,
                payee,
                txn.amount.units().to_string().as_str(),
                txn.comment.as_deref().unwrap_or(""),
            ])
            .map_err(export_err)?;
    }

    csv_writer.flush().map_err(export_err)?;
    Ok(())
}

/// Export all budget entries to CSV, by year, category and month
pub async fn export_budget_csv<W: Write>(storage: &Storage, writer: W) -> MoneybagsResult<()> {
    let mut conn = storage.acquire().await?;
    let categories = category_lookup(categories::list(&mut conn).await?);
    let entries = budget::list_all(&mut conn).await?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(["Year", "Month", "Category", "Type", "Amount", "Comment"])
        .map_err(export_err)?;

    for entry in &entries {
        let (category_name, category_type) = categories
            .get(&entry.category_id)
            .map(|c| (c.name.as_str(), c.category_type.as_str()))
            .unwrap_or(("Unknown", ""));

        csv_writer
            .write_record([
                entry.year.to_string().as_str(),
                entry.month.to_string().as_str(),
                category_name,
                category_type,
                entry.amount.units().to_string().as_str(),
                entry.comment.as_deref().unwrap_or(""),
            ])
            .map_err(export_err)?;
    }

    csv_writer.flush().map_err(export_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Amount, BudgetEntry, CategoryType, Payee, PayeeType, Transaction};
    use chrono::NaiveDate;

    async fn create_test_storage() -> (Storage, Category) {
        let storage = Storage::in_memory().await.unwrap();
        let food = Category::new("Food, groceries", CategoryType::Expenses);
        let shop = Payee::new("Shop", PayeeType::Actual);
        {
            let mut conn = storage.acquire().await.unwrap();
            categories::insert(&mut conn, &food).await.unwrap();
            payees::insert(&mut conn, &shop).await.unwrap();
            let date = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
            transactions::insert(
                &mut conn,
                &Transaction::new(food.id, Some(shop.id), date, Amount::new(250), Some("weekly".into())),
            )
            .await
            .unwrap();
            budget::upsert(&mut conn, &BudgetEntry::new(food.id, 2024, 2, Amount::new(4000), None))
                .await
                .unwrap();
        }
        (storage, food)
    }

    #[tokio::test]
    async fn test_export_transactions_csv() {
        let (storage, _) = create_test_storage().await;
        let mut output = Vec::new();
        export_transactions_csv(&storage, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "ID,Date,Category,Type,Payee,Amount,Comment");
        assert!(lines[1].contains("2024-02-03,\"Food, groceries\",expenses,Shop,250,weekly"));
    }

    #[tokio::test]
    async fn test_export_budget_csv() {
        let (storage, _) = create_test_storage().await;
        let mut output = Vec::new();
        export_budget_csv(&storage, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(
            text,
            "Year,Month,Category,Type,Amount,Comment\n2024,2,\"Food, groceries\",expenses,4000,\n"
        );
    }
}
