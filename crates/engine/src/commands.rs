//! Command structs for engine write operations.
//!
//! Patch types carry `Option`s: `None` means "not supplied" and the stored
//! value is left as is. Nothing here is ever merged with a default record.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{ExpenseMeta, MoneyCents};

/// Partial update of a category.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub planned_budget: Option<MoneyCents>,
}

impl CategoryPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn planned_budget(mut self, planned_budget: MoneyCents) -> Self {
        self.planned_budget = Some(planned_budget);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.planned_budget.is_none()
    }
}

/// Post a new expense.
#[derive(Clone, Debug)]
pub struct NewExpenseCmd {
    pub category_id: Uuid,
    pub amount: MoneyCents,
    pub meta: ExpenseMeta,
}

impl NewExpenseCmd {
    #[must_use]
    pub fn new(category_id: Uuid, amount: MoneyCents) -> Self {
        Self {
            category_id,
            amount,
            meta: ExpenseMeta::default(),
        }
    }

    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.meta.date = Some(date);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.meta.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: impl Into<String>) -> Self {
        self.meta.payment_method = Some(payment_method.into());
        self
    }

    #[must_use]
    pub fn entity(mut self, entity_id: i64, entity_type: impl Into<String>) -> Self {
        self.meta.entity_id = Some(entity_id);
        self.meta.entity_type = Some(entity_type.into());
        self
    }

    #[must_use]
    pub fn meta(mut self, meta: ExpenseMeta) -> Self {
        self.meta = meta;
        self
    }
}

/// Partial update of an expense.
///
/// For the optional text fields, `Some("")` clears the stored value.
/// `date` and `entity_id` have no empty form: `Some` replaces the stored
/// value and `None` keeps it, so once set they cannot be cleared through a
/// patch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpensePatch {
    pub category_id: Option<Uuid>,
    pub amount: Option<MoneyCents>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub entity_id: Option<i64>,
    pub entity_type: Option<String>,
}

impl ExpensePatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: MoneyCents) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: impl Into<String>) -> Self {
        self.payment_method = Some(payment_method.into());
        self
    }

    #[must_use]
    pub fn entity_id(mut self, entity_id: i64) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    #[must_use]
    pub fn entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Whether applying the patch can move money between balances.
    pub fn touches_balances(&self) -> bool {
        self.amount.is_some() || self.category_id.is_some()
    }
}

/// Move planned budget from one category to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferCmd {
    pub from_category_id: Uuid,
    pub to_category_id: Uuid,
    pub amount: MoneyCents,
}

impl TransferCmd {
    #[must_use]
    pub fn new(from_category_id: Uuid, to_category_id: Uuid, amount: MoneyCents) -> Self {
        Self {
            from_category_id,
            to_category_id,
            amount,
        }
    }
}
