//! Expense service - Expense records and spending summaries.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::TREND_MONTHS;
use crate::domain::{
    CategoryTotal, CreateExpense, Expense, ExpenseFilter, ExpenseSummary, MonthlyTotal,
    TenantContext, UpdateExpense,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::Paginated;
use crate::utils::{month_key, trailing_months};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ExpenseService: Send + Sync {
    async fn create_expense(&self, ctx: &TenantContext, input: CreateExpense) -> AppResult<Expense>;

    async fn list_expenses(
        &self,
        ctx: &TenantContext,
        filter: ExpenseFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<Expense>>;

    async fn get_expense(&self, ctx: &TenantContext, id: Uuid) -> AppResult<Expense>;

    async fn update_expense(&self, ctx: &TenantContext, id: Uuid, input: UpdateExpense) -> AppResult<Expense>;

    async fn delete_expense(&self, ctx: &TenantContext, id: Uuid) -> AppResult<()>;

    /// Totals for `filter` plus the trailing monthly trend
    async fn summary(&self, ctx: &TenantContext, filter: ExpenseFilter) -> AppResult<ExpenseSummary>;

    async fn categories(&self, ctx: &TenantContext) -> AppResult<Vec<String>>;
}

pub struct ExpenseManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ExpenseManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

fn ensure_positive(amount: Decimal) -> AppResult<()> {
    if amount <= Decimal::ZERO {
        return Err(AppError::validation("Amount must be greater than zero"));
    }
    Ok(())
}

#[async_trait]
impl<U: UnitOfWork> ExpenseService for ExpenseManager<U> {
    async fn create_expense(&self, ctx: &TenantContext, input: CreateExpense) -> AppResult<Expense> {
        ensure_positive(input.amount)?;
        self.uow
            .repos()
            .expenses()
            .create(ctx.tenant_id, ctx.user_id, input)
            .await
    }

    async fn list_expenses(
        &self,
        ctx: &TenantContext,
        filter: ExpenseFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<Expense>> {
        self.uow
            .repos()
            .expenses()
            .list(ctx.tenant_id, &filter, page, limit)
            .await
    }

    async fn get_expense(&self, ctx: &TenantContext, id: Uuid) -> AppResult<Expense> {
        self.uow
            .repos()
            .expenses()
            .find(ctx.tenant_id, id)
            .await?
            .ok_or_not_found("Expense")
    }

    async fn update_expense(&self, ctx: &TenantContext, id: Uuid, input: UpdateExpense) -> AppResult<Expense> {
        if let Some(amount) = input.amount {
            ensure_positive(amount)?;
        }
        self.uow.repos().expenses().update(ctx.tenant_id, id, input).await
    }

    async fn delete_expense(&self, ctx: &TenantContext, id: Uuid) -> AppResult<()> {
        self.uow.repos().expenses().delete(ctx.tenant_id, id).await
    }

    async fn summary(&self, ctx: &TenantContext, filter: ExpenseFilter) -> AppResult<ExpenseSummary> {
        let repos = self.uow.repos();
        let matching = repos.expenses().matching(ctx.tenant_id, &filter).await?;

        let months = trailing_months(Utc::now().date_naive(), TREND_MONTHS);
        let recent = match months.first() {
            Some(from) => repos.expenses().since(ctx.tenant_id, *from).await?,
            None => Vec::new(),
        };

        Ok(summarize(&matching, &recent, &months))
    }

    async fn categories(&self, ctx: &TenantContext) -> AppResult<Vec<String>> {
        self.uow.repos().expenses().categories(ctx.tenant_id).await
    }
}

fn summarize(matching: &[Expense], recent: &[Expense], months: &[NaiveDate]) -> ExpenseSummary {
    let mut by_category: BTreeMap<&str, (Decimal, u64)> = BTreeMap::new();
    for expense in matching {
        let entry = by_category.entry(expense.category.as_str()).or_default();
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    let mut by_month: BTreeMap<String, Decimal> = months
        .iter()
        .map(|m| (month_key(*m), Decimal::ZERO))
        .collect();
    for expense in recent {
        if let Some(total) = by_month.get_mut(&month_key(expense.expense_date)) {
            *total += expense.amount;
        }
    }

    let mut by_category: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category: category.to_string(),
            total,
            count,
        })
        .collect();
    by_category.sort_by(|a, b| b.total.cmp(&a.total));

    ExpenseSummary {
        total_amount: matching.iter().map(|e| e.amount).sum(),
        expense_count: matching.len() as u64,
        by_category,
        monthly_trend: by_month
            .into_iter()
            .map(|(month, total)| MonthlyTotal { month, total })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(category: &str, amount: i64, date: (i32, u32, u32)) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            category: category.into(),
            amount: Decimal::from(amount),
            description: None,
            expense_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            payment_method: None,
            vendor: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_groups_by_category_and_month() {
        let rows = vec![
            expense("rent", 1000, (2024, 3, 1)),
            expense("supplies", 40, (2024, 3, 9)),
            expense("supplies", 60, (2024, 1, 20)),
        ];
        let months = trailing_months(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), 3);

        let summary = summarize(&rows, &rows, &months);

        assert_eq!(summary.total_amount, Decimal::from(1100));
        assert_eq!(summary.expense_count, 3);
        assert_eq!(summary.by_category[0].category, "rent");
        assert_eq!(summary.by_category[1].count, 2);

        let trend: Vec<(String, Decimal)> = summary
            .monthly_trend
            .into_iter()
            .map(|m| (m.month, m.total))
            .collect();
        assert_eq!(
            trend,
            vec![
                ("2024-01".to_string(), Decimal::from(60)),
                ("2024-02".to_string(), Decimal::ZERO),
                ("2024-03".to_string(), Decimal::from(1040)),
            ]
        );
    }
}
