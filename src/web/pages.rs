//! Server-rendered pages and HTML fragments
//!
//! Pages are plain HTML built from the same services the JSON API uses.
//! Fragments are table bodies that pages fetch to refresh one widget.

use std::fmt::Write as _;

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::{Datelike, Local};
use serde::Deserialize;

use crate::error::MoneybagsError;
use crate::models::period::MONTH_NAMES;
use crate::models::{Amount, CurrencyFormat, TransactionDetail, TransactionWithPayee};
use crate::reports::{CategoryOverviewRow, YearOverviewReport};
use crate::services::configuration::DatabaseConfig;
use crate::services::{BudgetService, ConfigurationService, DashboardService, TransactionService};
use crate::web::api::analysis::RecentQuery;
use crate::web::api::ledger::TransactionQuery;
use crate::web::response::error_status;
use crate::web::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/budget", get(budget_page))
        .route("/analysis", get(analysis_page))
        .route("/config", get(config_page))
        .route("/import", get(import_page))
        .route("/fragments/transactions", get(transactions_fragment))
        .route("/fragments/recent", get(recent_fragment))
}

/// An error rendered as an HTML page
#[derive(Debug)]
pub struct PageError(pub MoneybagsError);

impl<E: Into<MoneybagsError>> From<E> for PageError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = error_status(&self.0);
        let body = layout(
            "Error",
            &format!("<p class=\"error\">{}</p>", escape_html(&self.0.to_string())),
        );
        (status, Html(body)).into_response()
    }
}

type PageResult = Result<Html<String>, PageError>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct YearQuery {
    #[serde(default)]
    pub year: Option<i32>,
}

impl YearQuery {
    fn year_or_current(&self) -> i32 {
        self.year.unwrap_or_else(|| Local::now().year())
    }
}

/// Escape text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(title: &str, content: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} - Moneybags</title>\n</head>\n<body>\n\
         <nav><a href=\"/\">Dashboard</a> <a href=\"/budget\">Budget</a> \
         <a href=\"/analysis\">Analysis</a> <a href=\"/import\">Import</a> \
         <a href=\"/config\">Configuration</a></nav>\n\
         <main>\n<h1>{title}</h1>\n{content}\n</main>\n</body>\n</html>\n",
        title = escape_html(title),
        content = content
    )
}

fn money(amount: Amount, currency: CurrencyFormat) -> String {
    escape_html(&amount.format(currency))
}

fn recent_rows(transactions: &[TransactionDetail], currency: CurrencyFormat) -> String {
    if transactions.is_empty() {
        return "<tr><td colspan=\"4\">No transactions yet</td></tr>\n".to_string();
    }
    let mut rows = String::new();
    for txn in transactions {
        let _ = writeln!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"amount\">{}</td></tr>",
            txn.date,
            escape_html(&txn.category_name),
            escape_html(&txn.payee_name),
            money(txn.amount, currency)
        );
    }
    rows
}

fn transaction_rows(transactions: &[TransactionWithPayee], currency: CurrencyFormat) -> String {
    if transactions.is_empty() {
        return "<tr><td colspan=\"4\">No transactions</td></tr>\n".to_string();
    }
    let mut rows = String::new();
    for item in transactions {
        let txn = &item.transaction;
        let _ = writeln!(
            rows,
            "<tr data-id=\"{}\"><td>{}</td><td>{}</td><td class=\"amount\">{}</td><td>{}</td></tr>",
            txn.id,
            txn.date,
            escape_html(item.payee_name.as_deref().unwrap_or("")),
            money(txn.amount, currency),
            escape_html(txn.comment.as_deref().unwrap_or(""))
        );
    }
    rows
}

async fn dashboard_page(State(state): State<AppState>) -> PageResult {
    let currency = ConfigurationService::new(&state.storage).currency_format().await?;
    let dashboard = DashboardService::new(&state.storage);
    let today = Local::now().date_naive();

    let summary = dashboard.year_summary(today.year()).await?;
    let recurring = dashboard.recurring_payments(today).await?;
    let monitored = dashboard.monitored_categories(today).await?;
    let recent = dashboard.recent_transactions(None).await?;

    let mut content = String::new();
    let _ = write!(
        content,
        "<section id=\"summary\"><h2>{year}</h2><table>\n\
         <tr><th></th><th>Budget</th><th>Actual</th></tr>\n\
         <tr><td>Income</td><td>{ib}</td><td>{ia}</td></tr>\n\
         <tr><td>Expenses</td><td>{eb}</td><td>{ea}</td></tr>\n\
         <tr><td>Net</td><td>{nb}</td><td>{na}</td></tr>\n</table></section>\n",
        year = summary.year,
        ib = money(summary.income_budget, currency),
        ia = money(summary.income_actual, currency),
        eb = money(summary.expense_budget, currency),
        ea = money(summary.expense_actual, currency),
        nb = money(summary.net_budget, currency),
        na = money(summary.net_actual, currency),
    );

    content.push_str("<section id=\"recurring\"><h2>Recurring payments</h2><ul>\n");
    for payment in &recurring {
        let _ = writeln!(
            content,
            "<li class=\"{status}\">{name}: {amount} ({date}) {status}</li>",
            status = payment.status.as_str(),
            name = escape_html(&payment.payee_name),
            amount = money(payment.last_amount, currency),
            date = payment.last_payment_date,
        );
    }
    content.push_str("</ul></section>\n");

    content.push_str("<section id=\"monitored\"><h2>This month</h2><table>\n");
    for item in &monitored {
        let _ = writeln!(
            content,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}%</td></tr>",
            escape_html(&item.category_name),
            money(item.budget, currency),
            money(item.actual, currency),
            money(item.remaining, currency),
            item.percentage
        );
    }
    content.push_str("</table></section>\n");

    let _ = write!(
        content,
        "<section id=\"recent\"><h2>Recent transactions</h2><table><tbody>\n{}</tbody></table></section>\n",
        recent_rows(&recent, currency)
    );

    Ok(Html(layout("Dashboard", &content)))
}

async fn budget_page(State(state): State<AppState>, Query(query): Query<YearQuery>) -> PageResult {
    let year = query.year_or_current();
    let currency = ConfigurationService::new(&state.storage).currency_format().await?;
    let data = BudgetService::new(&state.storage).year_data(year).await?;

    let mut content = String::from("<table class=\"budget\">\n<tr><th>Category</th>");
    for name in MONTH_NAMES {
        let _ = write!(content, "<th>{}</th>", name);
    }
    content.push_str("</tr>\n");

    for category in &data.categories {
        let _ = write!(
            content,
            "<tr data-category=\"{}\" class=\"{}\"><td>{}</td>",
            category.id,
            category.category_type,
            escape_html(&category.name)
        );
        let cells = data.budget_entries.get(&category.id);
        for month in 1..=12u32 {
            let amount = cells
                .and_then(|c| c.get(&month))
                .map(|cell| money(cell.amount, currency))
                .unwrap_or_default();
            let _ = write!(content, "<td data-month=\"{}\">{}</td>", month, amount);
        }
        content.push_str("</tr>\n");
    }
    content.push_str("</table>\n");

    Ok(Html(layout(&format!("Budget {}", year), &content)))
}

fn overview_rows(content: &mut String, rows: &[CategoryOverviewRow], currency: CurrencyFormat) {
    for row in rows {
        let _ = writeln!(
            content,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}%</td></tr>",
            escape_html(&row.category_name),
            money(row.total.budget, currency),
            money(row.total.actual, currency),
            money(row.total.variance, currency),
            row.total.percentage
        );
    }
}

async fn analysis_page(State(state): State<AppState>, Query(query): Query<YearQuery>) -> PageResult {
    let year = query.year_or_current();
    let currency = ConfigurationService::new(&state.storage).currency_format().await?;
    let report = YearOverviewReport::generate(&state.storage, year).await?;

    let mut content = String::from(
        "<table class=\"overview\">\n<tr><th>Category</th><th>Budget</th><th>Actual</th>\
         <th>Variance</th><th>%</th></tr>\n<tr><th colspan=\"5\">Income</th></tr>\n",
    );
    overview_rows(&mut content, &report.income, currency);
    content.push_str("<tr><th colspan=\"5\">Expenses</th></tr>\n");
    overview_rows(&mut content, &report.expenses, currency);
    let _ = write!(
        content,
        "<tr><th>Net</th><td>{}</td><td>{}</td><td></td><td></td></tr>\n</table>\n",
        money(report.net_budget, currency),
        money(report.net_actual, currency)
    );

    Ok(Html(layout(&format!("Analysis {}", year), &content)))
}

async fn config_page(State(state): State<AppState>) -> PageResult {
    let values = ConfigurationService::new(&state.storage).get_all().await?;
    let database = {
        let settings = state.settings.read().await;
        DatabaseConfig::from(&settings.database)
    };

    let mut content = String::from("<h2>Preferences</h2>\n<dl>\n");
    for (key, value) in &values {
        let _ = writeln!(content, "<dt>{}</dt><dd>{}</dd>", escape_html(key), escape_html(value));
    }
    let _ = write!(
        content,
        "</dl>\n<h2>Database</h2>\n<dl>\n<dt>URL</dt><dd>{}</dd>\n\
         <dt>Pool size</dt><dd>{}</dd>\n<dt>Acquire timeout</dt><dd>{} s</dd>\n</dl>\n",
        escape_html(database.url.as_deref().unwrap_or("default")),
        database.pool_size,
        database.acquire_timeout_secs
    );

    Ok(Html(layout("Configuration", &content)))
}

async fn import_page() -> Html<String> {
    let content = "<form method=\"post\" action=\"/api/import/parse\" enctype=\"multipart/form-data\">\n\
                   <label>Year <input type=\"number\" name=\"year\" min=\"1900\" max=\"2100\"></label>\n\
                   <label>Sheet (CSV) <input type=\"file\" name=\"file\" accept=\".csv\"></label>\n\
                   <button type=\"submit\">Parse</button>\n</form>\n";
    Html(layout("Import", content))
}

async fn transactions_fragment(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> Result<Html<String>, PageError> {
    let currency = ConfigurationService::new(&state.storage).currency_format().await?;
    let list = TransactionService::new(&state.storage)
        .list(query.category_id, query.year, query.month)
        .await?;
    Ok(Html(transaction_rows(&list, currency)))
}

async fn recent_fragment(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Html<String>, PageError> {
    let currency = ConfigurationService::new(&state.storage).currency_format().await?;
    let recent = TransactionService::new(&state.storage).recent(query.limit).await?;
    Ok(Html(recent_rows(&recent, currency)))
}
