//! Dashboard service
//!
//! Data for the dashboard widgets: recurring payment status, recent
//! transactions, the year summary and monitored category budgets.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::configuration::ConfigurationService;
use super::transaction::TransactionService;
use crate::error::{MoneybagsError, MoneybagsResult};
use crate::models::period::validate_year;
use crate::models::{
    Amount, CategoryId, CategoryType, DateRange, PayeeId, TransactionDetail, YearMonth,
};
use crate::reports::aggregate::percentage;
use crate::storage::transactions::PayeePayment;
use crate::storage::{budget, categories, transactions, Storage};

/// Whether a recurring payment has been made this month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

/// An expense payee paid in each of the two previous months
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurringPayment {
    pub payee_id: PayeeId,
    pub payee_name: String,
    pub status: PaymentStatus,
    pub last_payment_date: NaiveDate,
    pub last_amount: Amount,
}

/// Income and expense totals of a year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub income_budget: Amount,
    pub income_actual: Amount,
    pub expense_budget: Amount,
    pub expense_actual: Amount,
    pub net_budget: Amount,
    pub net_actual: Amount,
}

/// Current month status of a monitored category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoredCategory {
    pub category_id: CategoryId,
    pub category_name: String,
    pub category_type: CategoryType,
    pub budget: Amount,
    pub actual: Amount,
    pub remaining: Amount,
    pub percentage: f64,
}

/// Find recurring payments among payments from the current month and the
/// two months before it
///
/// A payee is recurring when it was paid in both previous months. It is
/// `Paid` when it was also paid in the current month. Pending payments come
/// first, each group sorted by payee name.
pub fn detect_recurring(payments: &[PayeePayment], today: NaiveDate) -> Vec<RecurringPayment> {
    let current = YearMonth::of(today);
    let previous = current.prev();
    let before_previous = previous.prev();

    let mut by_payee: HashMap<PayeeId, Vec<&PayeePayment>> = HashMap::new();
    for payment in payments {
        by_payee.entry(payment.payee_id).or_default().push(payment);
    }

    let mut recurring: Vec<RecurringPayment> = by_payee
        .into_values()
        .filter_map(|payee_payments| {
            let paid_in = |month: YearMonth| {
                let range = month.range();
                payee_payments.iter().any(|p| range.contains(p.date))
            };
            if !(paid_in(previous) && paid_in(before_previous)) {
                return None;
            }

            let last = payee_payments.iter().max_by_key(|p| p.date)?;
            Some(RecurringPayment {
                payee_id: last.payee_id,
                payee_name: last.payee_name.clone(),
                status: if paid_in(current) {
                    PaymentStatus::Paid
                } else {
                    PaymentStatus::Pending
                },
                last_payment_date: last.date,
                last_amount: last.amount,
            })
        })
        .collect();

    recurring.sort_by(|a, b| {
        a.status
            .cmp(&b.status)
            .then_with(|| a.payee_name.to_lowercase().cmp(&b.payee_name.to_lowercase()))
    });
    recurring
}

/// Service for dashboard widgets
pub struct DashboardService<'a> {
    storage: &'a Storage,
}

impl<'a> DashboardService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Recurring payment status as of `today`
    pub async fn recurring_payments(&self, today: NaiveDate) -> MoneybagsResult<Vec<RecurringPayment>> {
        let current = YearMonth::of(today);
        let range = DateRange {
            start: current.prev().prev().first_day(),
            end: current.next().first_day(),
        };

        let mut conn = self.storage.acquire().await?;
        let payments = transactions::expense_payments(&mut conn, range).await?;
        let recurring = detect_recurring(&payments, today);
        debug!(payments = payments.len(), recurring = recurring.len(), "detected recurring payments");
        Ok(recurring)
    }

    /// The newest transactions
    pub async fn recent_transactions(&self, limit: Option<u32>) -> MoneybagsResult<Vec<TransactionDetail>> {
        TransactionService::new(self.storage).recent(limit).await
    }

    /// Budget and actual totals per type for a year, over all categories
    pub async fn year_summary(&self, year: i32) -> MoneybagsResult<YearSummary> {
        validate_year(year).map_err(|e| MoneybagsError::Validation(e.to_string()))?;

        let mut conn = self.storage.acquire().await?;
        let types: HashMap<CategoryId, CategoryType> = categories::list(&mut conn)
            .await?
            .into_iter()
            .map(|c| (c.id, c.category_type))
            .collect();
        let entries = budget::list_for_year(&mut conn, year).await?;
        let txns = transactions::list_in_range(&mut conn, DateRange::year(year)).await?;

        let mut budget_totals: HashMap<CategoryType, Amount> = HashMap::new();
        for entry in &entries {
            if let Some(t) = types.get(&entry.category_id) {
                *budget_totals.entry(*t).or_default() += entry.amount;
            }
        }
        let mut actual_totals: HashMap<CategoryType, Amount> = HashMap::new();
        for txn in &txns {
            if let Some(t) = types.get(&txn.transaction.category_id) {
                *actual_totals.entry(*t).or_default() += txn.transaction.amount;
            }
        }

        let get = |map: &HashMap<CategoryType, Amount>, t: CategoryType| {
            map.get(&t).copied().unwrap_or_default()
        };
        let income_budget = get(&budget_totals, CategoryType::Income);
        let income_actual = get(&actual_totals, CategoryType::Income);
        let expense_budget = get(&budget_totals, CategoryType::Expenses);
        let expense_actual = get(&actual_totals, CategoryType::Expenses);

        Ok(YearSummary {
            year,
            income_budget,
            income_actual,
            expense_budget,
            expense_actual,
            net_budget: income_budget - expense_budget,
            net_actual: income_actual - expense_actual,
        })
    }

    /// Budget status of the configured categories for the month of `today`
    pub async fn monitored_categories(&self, today: NaiveDate) -> MoneybagsResult<Vec<MonitoredCategory>> {
        let ids = ConfigurationService::new(self.storage).monitored_categories().await?;
        let month = YearMonth::of(today);

        let mut conn = self.storage.acquire().await?;
        let mut result = Vec::with_capacity(ids.len());
        for id in ids {
            // Categories deleted after being configured are skipped
            let Some(category) = categories::get(&mut conn, id).await? else {
                continue;
            };

            let budget = budget::find(&mut conn, id, month.year, month.month)
                .await?
                .map(|e| e.amount)
                .unwrap_or_default();
            let actual: Amount = transactions::list_for_category(&mut conn, id, month.range())
                .await?
                .iter()
                .map(|t| t.transaction.amount)
                .sum();

            result.push(MonitoredCategory {
                category_id: id,
                category_name: category.name,
                category_type: category.category_type,
                budget,
                actual,
                remaining: budget - actual,
                percentage: percentage(actual, budget),
            });
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::configuration::MONITORED_CATEGORIES_KEY;
    use crate::models::{BudgetEntry, Category, Payee, PayeeType, Transaction};
    use crate::storage::payees;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn payment(payee_id: PayeeId, name: &str, date: NaiveDate, amount: i64) -> PayeePayment {
        PayeePayment {
            payee_id,
            payee_name: name.to_string(),
            date,
            amount: Amount::new(amount),
        }
    }

    #[test]
    fn test_detect_recurring() {
        let netflix = PayeeId::new();
        let gym = PayeeId::new();
        let once = PayeeId::new();
        let today = date(2024, 3, 15);

        let payments = vec![
            payment(netflix, "Netflix", date(2024, 1, 5), 129),
            payment(netflix, "Netflix", date(2024, 2, 5), 139),
            payment(netflix, "Netflix", date(2024, 3, 5), 139),
            payment(gym, "Gym", date(2024, 1, 2), 400),
            payment(gym, "Gym", date(2024, 2, 2), 450),
            payment(once, "Once", date(2024, 2, 9), 50),
            payment(once, "Once", date(2024, 3, 9), 50),
        ];

        let recurring = detect_recurring(&payments, today);
        assert_eq!(recurring.len(), 2);

        assert_eq!(recurring[0].payee_name, "Gym");
        assert_eq!(recurring[0].status, PaymentStatus::Pending);
        assert_eq!(recurring[0].last_payment_date, date(2024, 2, 2));
        assert_eq!(recurring[0].last_amount, Amount::new(450));

        assert_eq!(recurring[1].payee_name, "Netflix");
        assert_eq!(recurring[1].status, PaymentStatus::Paid);
        assert_eq!(recurring[1].last_payment_date, date(2024, 3, 5));
    }

    #[test]
    fn test_detect_recurring_across_year_boundary() {
        let rent = PayeeId::new();
        let payments = vec![
            payment(rent, "Rent", date(2023, 11, 1), 9000),
            payment(rent, "Rent", date(2023, 12, 1), 9000),
        ];
        let recurring = detect_recurring(&payments, date(2024, 1, 3));
        assert_eq!(recurring.len(), 1);
        assert_eq!(recurring[0].status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_recurring_ignores_income() {
        let storage = Storage::in_memory().await.unwrap();
        let salary = Category::new("Salary", CategoryType::Income);
        let streaming = Category::new("Streaming", CategoryType::Expenses);
        let employer = Payee::new("Employer", PayeeType::Actual);
        let netflix = Payee::new("Netflix", PayeeType::Actual);
        {
            let mut conn = storage.acquire().await.unwrap();
            categories::insert(&mut conn, &salary).await.unwrap();
            categories::insert(&mut conn, &streaming).await.unwrap();
            payees::insert(&mut conn, &employer).await.unwrap();
            payees::insert(&mut conn, &netflix).await.unwrap();
            for m in [4, 5] {
                transactions::insert(
                    &mut conn,
                    &Transaction::new(salary.id, Some(employer.id), date(2024, m, 25), Amount::new(50000), None),
                )
                .await
                .unwrap();
                transactions::insert(
                    &mut conn,
                    &Transaction::new(streaming.id, Some(netflix.id), date(2024, m, 5), Amount::new(139), None),
                )
                .await
                .unwrap();
            }
        }

        let recurring = DashboardService::new(&storage)
            .recurring_payments(date(2024, 6, 1))
            .await
            .unwrap();
        assert_eq!(recurring.len(), 1);
        assert_eq!(recurring[0].payee_id, netflix.id);
    }

    #[tokio::test]
    async fn test_year_summary_and_monitored() {
        let storage = Storage::in_memory().await.unwrap();
        let salary = Category::new("Salary", CategoryType::Income);
        let food = Category::new("Food", CategoryType::Expenses);
        {
            let mut conn = storage.acquire().await.unwrap();
            categories::insert(&mut conn, &salary).await.unwrap();
            categories::insert(&mut conn, &food).await.unwrap();
            budget::upsert(&mut conn, &BudgetEntry::new(salary.id, 2024, 6, Amount::new(50000), None))
                .await
                .unwrap();
            budget::upsert(&mut conn, &BudgetEntry::new(food.id, 2024, 6, Amount::new(4000), None))
                .await
                .unwrap();
            transactions::insert(&mut conn, &Transaction::new(salary.id, None, date(2024, 6, 25), Amount::new(52000), None))
                .await
                .unwrap();
            transactions::insert(&mut conn, &Transaction::new(food.id, None, date(2024, 6, 3), Amount::new(1000), None))
                .await
                .unwrap();
            crate::storage::configuration::set(&mut conn, MONITORED_CATEGORIES_KEY, &food.id.to_string())
                .await
                .unwrap();
        }

        let service = DashboardService::new(&storage);
        let summary = service.year_summary(2024).await.unwrap();
        assert_eq!(summary.income_budget, Amount::new(50000));
        assert_eq!(summary.expense_actual, Amount::new(1000));
        assert_eq!(summary.net_budget, Amount::new(46000));
        assert_eq!(summary.net_actual, Amount::new(51000));

        let monitored = service.monitored_categories(date(2024, 6, 20)).await.unwrap();
        assert_eq!(monitored.len(), 1);
        assert_eq!(monitored[0].category_name, "Food");
        assert_eq!(monitored[0].remaining, Amount::new(3000));
        assert_eq!(monitored[0].percentage, 25.0);
    }
}
