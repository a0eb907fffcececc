//! Expense records.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::expense;
use super::fetch_page;
use crate::domain::{CreateExpense, Expense, ExpenseFilter, UpdateExpense};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::Paginated;

pub struct ExpenseStore<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> ExpenseStore<'c, C> {
    pub(super) fn new(db: &'c C) -> Self {
        Self { db }
    }

    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Expense>> {
        let model = expense::Entity::find_by_id(id)
            .filter(expense::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?;
        Ok(model.map(Expense::from))
    }

    pub async fn create(
        &self,
        tenant_id: Uuid,
        created_by: Uuid,
        input: CreateExpense,
    ) -> AppResult<Expense> {
        let now = Utc::now();
        let model = expense::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            category: Set(input.category),
            amount: Set(input.amount),
            description: Set(input.description),
            expense_date: Set(input.expense_date),
            payment_method: Set(input.payment_method),
            vendor: Set(input.vendor),
            created_by: Set(Some(created_by)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db)
        .await?;

        Ok(Expense::from(model))
    }

    pub async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdateExpense) -> AppResult<Expense> {
        let model = expense::Entity::find_by_id(id)
            .filter(expense::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?
            .ok_or_not_found("Expense")?;

        let mut active: expense::ActiveModel = model.into();
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(amount) = input.amount {
            active.amount = Set(amount);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(date) = input.expense_date {
            active.expense_date = Set(date);
        }
        if let Some(method) = input.payment_method {
            active.payment_method = Set(Some(method));
        }
        if let Some(vendor) = input.vendor {
            active.vendor = Set(Some(vendor));
        }
        active.updated_at = Set(Utc::now());

        Ok(Expense::from(active.update(self.db).await?))
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = expense::Entity::delete_many()
            .filter(expense::Column::Id.eq(id))
            .filter(expense::Column::TenantId.eq(tenant_id))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Expense"));
        }
        Ok(())
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: &ExpenseFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<Paginated<Expense>> {
        let query = expense::Entity::find()
            .filter(expense::Column::TenantId.eq(tenant_id))
            .filter(date_filter(filter))
            .order_by_desc(expense::Column::ExpenseDate)
            .order_by_desc(expense::Column::CreatedAt);

        fetch_page(self.db, query, page, limit).await
    }

    /// Every expense matching `filter`, for summaries
    pub async fn matching(&self, tenant_id: Uuid, filter: &ExpenseFilter) -> AppResult<Vec<Expense>> {
        let models = expense::Entity::find()
            .filter(expense::Column::TenantId.eq(tenant_id))
            .filter(date_filter(filter))
            .all(self.db)
            .await?;
        Ok(models.into_iter().map(Expense::from).collect())
    }

    pub async fn since(&self, tenant_id: Uuid, from: NaiveDate) -> AppResult<Vec<Expense>> {
        let models = expense::Entity::find()
            .filter(expense::Column::TenantId.eq(tenant_id))
            .filter(expense::Column::ExpenseDate.gte(from))
            .all(self.db)
            .await?;
        Ok(models.into_iter().map(Expense::from).collect())
    }

    pub async fn categories(&self, tenant_id: Uuid) -> AppResult<Vec<String>> {
        Ok(expense::Entity::find()
            .select_only()
            .column(expense::Column::Category)
            .distinct()
            .filter(expense::Column::TenantId.eq(tenant_id))
            .order_by_asc(expense::Column::Category)
            .into_tuple::<String>()
            .all(self.db)
            .await?)
    }
}

fn date_filter(filter: &ExpenseFilter) -> sea_orm::Condition {
    let mut condition = sea_orm::Condition::all();
    if let Some(category) = &filter.category {
        condition = condition.add(expense::Column::Category.eq(category.as_str()));
    }
    if let Some(start) = filter.start_date {
        condition = condition.add(expense::Column::ExpenseDate.gte(start));
    }
    if let Some(end) = filter.end_date {
        condition = condition.add(expense::Column::ExpenseDate.lte(end));
    }
    condition
}
