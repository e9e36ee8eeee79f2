//! Payment plan derivation for school fee structures.
//!
//! Splits a fee total into dated installments for the plan shapes the
//! platform offers. Amounts are rounded to two decimal places; the
//! rounding remainder folds into the first installment so the installments
//! always sum to the discounted total.

use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiError, Result};

const MAX_CUSTOM_INSTALLMENTS: u32 = 36;

/// Shape of a payment plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanType {
    /// Twelve monthly installments
    Monthly,
    /// Three termly installments, four months apart
    Termly,
    /// A single payment up front
    OneTime,
    /// A chosen number of monthly installments
    Custom { installments: u32 },
}

impl PlanType {
    fn installment_count(&self) -> Result<u32> {
        match self {
            PlanType::Monthly => Ok(12),
            PlanType::Termly => Ok(3),
            PlanType::OneTime => Ok(1),
            PlanType::Custom { installments } => {
                if *installments == 0 || *installments > MAX_CUSTOM_INSTALLMENTS {
                    return Err(ApiError::validation_field(
                        "installments",
                        format!(
                            "Custom plans take between 1 and {} installments",
                            MAX_CUSTOM_INSTALLMENTS
                        ),
                    ));
                }
                Ok(*installments)
            }
        }
    }

    fn interval_months(&self) -> u32 {
        match self {
            PlanType::Termly => 4,
            _ => 1,
        }
    }
}

/// Discount applied to the fee total before splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Discount {
    Percentage { value: Decimal },
    Fixed { value: Decimal },
}

impl Discount {
    fn amount(&self, total: Decimal) -> Result<Decimal> {
        match self {
            Discount::Percentage { value } => {
                if *value < Decimal::ZERO || *value > Decimal::from(100) {
                    return Err(ApiError::validation_field(
                        "discount",
                        "Percentage discount must be between 0 and 100",
                    ));
                }
                Ok((total * *value / Decimal::from(100))
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
            }
            Discount::Fixed { value } => {
                if *value < Decimal::ZERO || *value > total {
                    return Err(ApiError::validation_field(
                        "discount",
                        "Fixed discount must be between 0 and the fee total",
                    ));
                }
                Ok(*value)
            }
        }
    }
}

/// One dated slice of a payment plan.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Installment {
    pub sequence: u32,
    pub due_date: NaiveDate,
    pub amount: Decimal,
}

/// A derived payment plan.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeePlanPreview {
    pub total_due: Decimal,
    pub discount_applied: Decimal,
    pub installments: Vec<Installment>,
}

/// Derive the installment schedule for a fee total.
pub fn derive_plan(
    total: Decimal,
    plan_type: &PlanType,
    start_date: NaiveDate,
    discount: Option<&Discount>,
) -> Result<FeePlanPreview> {
    if total < Decimal::ZERO {
        return Err(ApiError::validation_field(
            "total_amount",
            "Fee total must not be negative",
        ));
    }

    let discount_applied = match discount {
        Some(d) => d.amount(total)?,
        None => Decimal::ZERO,
    };
    let total_due = total - discount_applied;

    let count = plan_type.installment_count()?;
    let interval = plan_type.interval_months();

    // Round each slice toward zero; the remainder lands on the first
    // installment so the schedule sums exactly to the total due.
    let base = (total_due / Decimal::from(count))
        .round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let first = total_due - base * Decimal::from(count - 1);

    let mut installments = Vec::with_capacity(count as usize);
    for sequence in 0..count {
        let due_date = start_date
            .checked_add_months(Months::new(sequence * interval))
            .ok_or_else(|| {
                ApiError::validation_field("start_date", "Start date is out of range")
            })?;
        installments.push(Installment {
            sequence: sequence + 1,
            due_date,
            amount: if sequence == 0 { first } else { base },
        });
    }

    Ok(FeePlanPreview {
        total_due,
        discount_applied,
        installments,
    })
}
