//! Expenses posted against a category.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{MoneyCents, ResultEngine, util::parse_uuid};

/// Descriptive fields of an expense. None of them take part in reconciliation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseMeta {
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub entity_id: Option<i64>,
    pub entity_type: Option<String>,
}

/// Snapshot of an expense row.
///
/// `amount` is always positive: posting it raises the category's actual
/// balance and lowers its remaining balance by the same value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub category_id: Uuid,
    pub amount: MoneyCents,
    pub meta: ExpenseMeta,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(category_id: Uuid, amount: MoneyCents, meta: ExpenseMeta) -> Self {
        Self {
            id: Uuid::new_v4(),
            category_id,
            amount,
            meta,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub category_id: String,
    pub amount_minor: i64,
    pub date: Option<Date>,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub entity_id: Option<i64>,
    pub entity_type: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            category_id: ActiveValue::Set(expense.category_id.to_string()),
            amount_minor: ActiveValue::Set(expense.amount.cents()),
            date: ActiveValue::Set(expense.meta.date),
            description: ActiveValue::Set(expense.meta.description.clone()),
            payment_method: ActiveValue::Set(expense.meta.payment_method.clone()),
            entity_id: ActiveValue::Set(expense.meta.entity_id),
            entity_type: ActiveValue::Set(expense.meta.entity_type.clone()),
            created_at: ActiveValue::Set(expense.created_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = crate::EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            category_id: parse_uuid(&model.category_id, "category")?,
            amount: MoneyCents::new(model.amount_minor),
            meta: ExpenseMeta {
                date: model.date,
                description: model.description,
                payment_method: model.payment_method,
                entity_id: model.entity_id,
                entity_type: model.entity_type,
            },
            created_at: model.created_at,
        })
    }
}
