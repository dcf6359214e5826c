use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QuerySelect, prelude::*};

use crate::{Amount, Category, CategoryTotal, EngineError, OwnerId, ResultEngine, expenses};

use super::Engine;

impl Engine {
    /// Sums the expenses of `owner_id` created at or after `since`, per
    /// category.
    ///
    /// Categories without expenses are omitted. The result is sorted by total
    /// (largest first), ties broken by category order.
    pub async fn aggregate_by_category(
        &self,
        owner_id: OwnerId,
        since: DateTime<Utc>,
    ) -> ResultEngine<Vec<CategoryTotal>> {
        let rows: Vec<(String, i64)> = expenses::Entity::find()
            .select_only()
            .column(expenses::Column::Category)
            .column(expenses::Column::AmountMinor)
            .filter(expenses::Column::OwnerId.eq(owner_id))
            .filter(expenses::Column::CreatedAt.gte(since))
            .into_tuple()
            .all(&self.database)
            .await?;

        let mut sums: BTreeMap<Category, Amount> = BTreeMap::new();
        for (category, amount_minor) in rows {
            let category = Category::try_from(category.as_str())?;
            let entry = sums.entry(category).or_default();
            *entry = entry
                .checked_add(Amount::new(amount_minor))
                .ok_or_else(|| EngineError::InvalidAmount("total too large".to_string()))?;
        }

        let mut totals: Vec<CategoryTotal> = sums
            .into_iter()
            .map(|(category, total)| CategoryTotal { category, total })
            .collect();
        totals.sort_by(|a, b| b.total.cmp(&a.total).then(a.category.cmp(&b.category)));
        Ok(totals)
    }
}
