//! Table views of categories, payees, templates and transactions

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Category, CurrencyFormat, PayeeUsage, TransactionDetail, TransactionWithPayee};
use crate::services::category::CategoryListItem;

use super::report::truncate;

fn render<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    format!("{}\n", table)
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    category_type: String,
    #[tabled(rename = "Years")]
    years: String,
    #[tabled(rename = "Data")]
    has_data: String,
    #[tabled(rename = "ID")]
    id: String,
}

/// Format the category list with usage
pub fn format_category_list(items: &[CategoryListItem]) -> String {
    if items.is_empty() {
        return "No categories found.\n\nRun 'moneybags init' to create default categories.\n"
            .to_string();
    }

    let rows = items
        .iter()
        .map(|item| CategoryRow {
            name: item.category.name.clone(),
            category_type: item.category.category_type.to_string(),
            years: item
                .years_used
                .iter()
                .map(i32::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            has_data: if item.has_data { "yes" } else { "" }.to_string(),
            id: item.category.id.short(),
        })
        .collect();
    render(rows)
}

/// Format the categories of a year's template
pub fn format_template(year: i32, categories: &[Category]) -> String {
    if categories.is_empty() {
        return format!("The {} template is empty.\n", year);
    }

    let mut output = format!("Budget template {}\n", year);
    for category in categories {
        output.push_str(&format!("  {:<9} {}\n", category.category_type, category.name));
    }
    output
}

#[derive(Tabled)]
struct PayeeRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    payee_type: String,
    #[tabled(rename = "Transactions")]
    count: i64,
    #[tabled(rename = "Last used")]
    last_used: String,
}

/// Format payees with usage statistics
pub fn format_payee_list(payees: &[PayeeUsage]) -> String {
    if payees.is_empty() {
        return "No payees found.\n".to_string();
    }

    let rows = payees
        .iter()
        .map(|usage| PayeeRow {
            name: usage.payee.name.clone(),
            payee_type: usage.payee.payee_type.to_string(),
            count: usage.transaction_count,
            last_used: usage.last_used.map(|d| d.to_string()).unwrap_or_default(),
        })
        .collect();
    render(rows)
}

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Payee")]
    payee: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Comment")]
    comment: String,
    #[tabled(rename = "ID")]
    id: String,
}

/// Format the transactions of one category
pub fn format_transaction_list(transactions: &[TransactionWithPayee], currency: CurrencyFormat) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows = transactions
        .iter()
        .map(|item| TransactionRow {
            date: item.transaction.date.to_string(),
            payee: item.payee_name.clone().unwrap_or_default(),
            amount: item.transaction.amount.format(currency),
            comment: truncate(item.transaction.comment.as_deref().unwrap_or(""), 30),
            id: item.transaction.id.short(),
        })
        .collect();
    render(rows)
}

#[derive(Tabled)]
struct RecentRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Payee")]
    payee: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

/// Format the newest transactions across categories
pub fn format_recent(transactions: &[TransactionDetail], currency: CurrencyFormat) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows = transactions
        .iter()
        .map(|txn| RecentRow {
            date: txn.date.to_string(),
            category: txn.category_name.clone(),
            payee: txn.payee_name.clone(),
            amount: txn.amount.format(currency),
        })
        .collect();
    render(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryType, Payee, PayeeType};

    #[test]
    fn test_empty_lists() {
        assert!(format_category_list(&[]).contains("moneybags init"));
        assert_eq!(format_payee_list(&[]), "No payees found.\n");
        assert_eq!(format_template(2024, &[]), "The 2024 template is empty.\n");
    }

    #[test]
    fn test_category_table() {
        let item = CategoryListItem {
            category: Category::new("Salary", CategoryType::Income),
            years_used: vec![2023, 2024],
            has_data: true,
        };
        let output = format_category_list(&[item]);
        assert!(output.contains("Salary"));
        assert!(output.contains("2023, 2024"));
        assert!(output.contains("income"));
    }

    #[test]
    fn test_payee_table() {
        let usage = PayeeUsage {
            payee: Payee::new("Netflix", PayeeType::Actual),
            transaction_count: 3,
            last_used: None,
        };
        let output = format_payee_list(&[usage]);
        assert!(output.contains("Netflix"));
        assert!(output.contains("Actual"));
    }
}
