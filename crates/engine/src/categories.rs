//! Budget categories.
//!
//! A category is a named envelope with three balances. The stored columns keep
//! `remaining_balance_minor = planned_budget_minor - actual_balance_minor` on
//! every committed row; all writers in `ops` preserve it with relative
//! (`col = col + delta`) updates.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{MoneyCents, ResultEngine, util::parse_uuid};

/// Snapshot of a category row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub planned_budget: MoneyCents,
    pub remaining_balance: MoneyCents,
    pub actual_balance: MoneyCents,
}

impl Category {
    /// A fresh category: nothing spent, everything remaining.
    pub fn new(name: String, planned_budget: MoneyCents) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            planned_budget,
            remaining_balance: planned_budget,
            actual_balance: MoneyCents::ZERO,
        }
    }

    /// `remaining == planned - actual`.
    pub fn is_balanced(&self) -> bool {
        self.planned_budget
            .checked_sub(self.actual_balance)
            .is_some_and(|expected| expected == self.remaining_balance)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub planned_budget_minor: i64,
    pub remaining_balance_minor: i64,
    pub actual_balance_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Category> for ActiveModel {
    fn from(category: &Category) -> Self {
        Self {
            id: ActiveValue::Set(category.id.to_string()),
            name: ActiveValue::Set(category.name.clone()),
            planned_budget_minor: ActiveValue::Set(category.planned_budget.cents()),
            remaining_balance_minor: ActiveValue::Set(category.remaining_balance.cents()),
            actual_balance_minor: ActiveValue::Set(category.actual_balance.cents()),
        }
    }
}

impl TryFrom<Model> for Category {
    type Error = crate::EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "category")?,
            name: model.name,
            planned_budget: MoneyCents::new(model.planned_budget_minor),
            remaining_balance: MoneyCents::new(model.remaining_balance_minor),
            actual_balance: MoneyCents::new(model.actual_balance_minor),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_category_starts_balanced() {
        let category = Category::new("Rent".to_string(), MoneyCents::from_units(1500));
        assert_eq!(category.remaining_balance, MoneyCents::from_units(1500));
        assert_eq!(category.actual_balance, MoneyCents::ZERO);
        assert!(category.is_balanced());
    }

    #[test]
    fn model_round_trip_keeps_balances() {
        let category = Category::new("Food".to_string(), MoneyCents::new(35_000));
        let model = Model {
            id: category.id.to_string(),
            name: category.name.clone(),
            planned_budget_minor: 35_000,
            remaining_balance_minor: 35_000,
            actual_balance_minor: 0,
        };
        assert_eq!(Category::try_from(model).unwrap(), category);
    }
}
