//! The payment record and its create input

use crate::core::field::FieldValue;
use crate::query::Column;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status assigned by the store to every newly created payment.
pub const DEFAULT_STATUS: &str = "pending";

/// A stored payment.
///
/// `id`, `status`, `created_at` and `updated_at` are assigned by the store;
/// they are never taken from client input. `amount` is an exact decimal and
/// serializes to JSON as a string so no precision is lost in transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: Uuid,
    pub tag: String,
    pub description: String,
    pub amount: BigDecimal,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// The value stored in `column`, `None` for an unset timestamp
    pub fn field(&self, column: Column) -> Option<FieldValue> {
        match column {
            Column::Id => Some(FieldValue::Uuid(self.id)),
            Column::Tag => Some(FieldValue::Text(self.tag.clone())),
            Column::Description => Some(FieldValue::Text(self.description.clone())),
            Column::Amount => Some(FieldValue::Decimal(self.amount.clone())),
            Column::Status => Some(FieldValue::Text(self.status.clone())),
            Column::CreatedAt => self.created_at.map(FieldValue::Timestamp),
            Column::UpdatedAt => self.updated_at.map(FieldValue::Timestamp),
        }
    }
}

/// Client-supplied fields of a payment to create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub tag: String,
    pub description: String,
    pub amount: BigDecimal,
}

impl NewPayment {
    pub fn new(tag: impl Into<String>, description: impl Into<String>, amount: BigDecimal) -> Self {
        Self {
            tag: tag.into(),
            description: description.into(),
            amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_amount_serializes_without_precision_loss() {
        let payment = Payment {
            id: Uuid::nil(),
            tag: "invoice".to_string(),
            description: "May rent".to_string(),
            amount: BigDecimal::from_str("1234567890.123456789012345").unwrap(),
            status: DEFAULT_STATUS.to_string(),
            created_at: None,
            updated_at: None,
        };

        let json = serde_json::to_value(&payment).unwrap();
        let back: Payment = serde_json::from_value(json).unwrap();
        assert_eq!(back.amount, payment.amount);
    }

    #[test]
    fn test_field_by_column() {
        let payment = Payment {
            id: Uuid::new_v4(),
            tag: "rent".to_string(),
            description: "June".to_string(),
            amount: BigDecimal::from(42),
            status: DEFAULT_STATUS.to_string(),
            created_at: None,
            updated_at: None,
        };

        assert_eq!(payment.field(Column::Tag), Some(FieldValue::Text("rent".to_string())));
        assert_eq!(payment.field(Column::Id), Some(FieldValue::Uuid(payment.id)));
        assert_eq!(payment.field(Column::CreatedAt), None);
    }
}
