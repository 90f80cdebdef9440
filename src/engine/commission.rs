//! Commission ledger.
//!
//! Everything owed is derived from the committed order and payment rows; no
//! running totals are stored. `compute_commission` is pure so the same inputs
//! always produce the same summary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::Engine;
use crate::db::commission_payments as payment_db;
use crate::db::orders as order_db;
use crate::error::CoreError;
use crate::models::commission_payments::{self, PaymentStatus, SubmitCommissionPayment};
use crate::models::notifications::NotificationKind;
use crate::models::orders::{self, OrderStatus};
use crate::notify::Notification;

#[derive(Debug, Clone, PartialEq)]
pub struct CommissionRates {
    /// Rate on free-form custom requests.
    pub standard_rate: Decimal,
    /// Rate on orders built from a curated template.
    pub template_rate: Decimal,
    /// Delivery fee assumed when an order carries no explicit breakdown.
    pub default_delivery_fee: i64,
}

impl Default for CommissionRates {
    fn default() -> Self {
        Self {
            standard_rate: Decimal::new(15, 2),
            template_rate: Decimal::new(20, 2),
            default_delivery_fee: 5000,
        }
    }
}

impl CommissionRates {
    pub fn rate_for(&self, order: &orders::Model) -> Decimal {
        if order.template_id.is_some() {
            self.template_rate
        } else {
            self.standard_rate
        }
    }
}

/// One order's contribution to the accrued total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommissionLine {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub price: i64,
    pub delivery_fee: i64,
    pub commissionable: Decimal,
    pub rate: Decimal,
    pub commission: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommissionSummary {
    pub designer_id: Uuid,
    pub accrued: Decimal,
    pub paid: Decimal,
    pub pending: Decimal,
    pub balance: Decimal,
    pub lines: Vec<CommissionLine>,
}

/// Commission on a single order, or `None` when it is not billable or has no price yet.
pub fn commission_for_order(order: &orders::Model, rates: &CommissionRates) -> Option<CommissionLine> {
    if !order.status.is_billable() {
        return None;
    }
    let price = order.price?;
    let delivery_fee = order.delivery_fee.unwrap_or(rates.default_delivery_fee);

    let commissionable = Decimal::from(price - delivery_fee).max(Decimal::ZERO);
    let rate = rates.rate_for(order);

    Some(CommissionLine {
        order_id: order.id,
        status: order.status,
        price,
        delivery_fee,
        commissionable,
        rate,
        commission: commissionable * rate,
        created_at: order.created_at,
    })
}

/// Derive what `designer_id` has earned and been paid.
///
/// Orders assigned to someone else are ignored, as are payments belonging to
/// other designers, so callers may pass wider slices than strictly needed.
pub fn compute_commission(
    designer_id: Uuid,
    orders: &[orders::Model],
    payments: &[commission_payments::Model],
    rates: &CommissionRates,
) -> CommissionSummary {
    let mut lines: Vec<CommissionLine> = orders
        .iter()
        .filter(|o| o.assigned_designer_id == Some(designer_id))
        .filter_map(|o| commission_for_order(o, rates))
        .collect();
    lines.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.order_id.cmp(&b.order_id))
    });

    let accrued: Decimal = lines.iter().map(|l| l.commission).sum();

    let sum_with = |status: PaymentStatus| -> Decimal {
        payments
            .iter()
            .filter(|p| p.designer_id == designer_id && p.status == status)
            .map(|p| Decimal::from(p.amount))
            .sum()
    };
    let paid = sum_with(PaymentStatus::Approved);
    let pending = sum_with(PaymentStatus::Pending);

    CommissionSummary {
        designer_id,
        accrued,
        paid,
        pending,
        balance: (accrued - paid).max(Decimal::ZERO),
        lines,
    }
}

impl Engine {
    pub async fn commission_summary(
        &self,
        designer_id: Uuid,
    ) -> Result<CommissionSummary, CoreError> {
        // Surface unknown designers as 404 rather than an empty ledger.
        self.get_designer(designer_id).await?;

        let orders = order_db::get_orders_by_designer(&self.db, designer_id).await?;
        let payments = payment_db::get_payments_by_designer(&self.db, designer_id).await?;

        Ok(compute_commission(
            designer_id,
            &orders,
            &payments,
            &self.settings.commission,
        ))
    }

    /// A designer reports a commission payment; it stays `pending` until an admin reviews it.
    pub async fn submit_commission_payment(
        &self,
        designer_id: Uuid,
        input: SubmitCommissionPayment,
    ) -> Result<commission_payments::Model, CoreError> {
        if input.amount <= 0 {
            return Err(CoreError::Validation(
                "payment amount must be positive".to_string(),
            ));
        }
        let designer = self.get_designer(designer_id).await?;

        let payment = payment_db::insert_payment(&self.db, designer_id, input, self.now()).await?;
        tracing::info!(
            payment_id = %payment.id,
            %designer_id,
            amount = payment.amount,
            "commission payment submitted"
        );

        self.audit(
            designer.user_id,
            "commission.payment_submitted",
            format!("amount {}", payment.amount),
            Some(payment.id),
        )
        .await;

        Ok(payment)
    }

    pub async fn review_commission_payment(
        &self,
        payment_id: Uuid,
        admin_id: Uuid,
        approve: bool,
    ) -> Result<commission_payments::Model, CoreError> {
        let payment = payment_db::get_payment_by_id(&self.db, payment_id)
            .await?
            .ok_or_else(|| CoreError::not_found("CommissionPayment", payment_id))?;

        let status = if approve {
            PaymentStatus::Approved
        } else {
            PaymentStatus::Declined
        };
        if !payment_db::try_review(&self.db, payment_id, status, admin_id, self.now()).await? {
            return Err(CoreError::InvalidState(format!(
                "payment {payment_id} has already been reviewed"
            )));
        }

        let reviewed = payment_db::get_payment_by_id(&self.db, payment_id)
            .await?
            .ok_or_else(|| CoreError::not_found("CommissionPayment", payment_id))?;
        tracing::info!(%payment_id, %admin_id, status = ?reviewed.status, "commission payment reviewed");

        match self.get_designer(payment.designer_id).await {
            Ok(designer) => {
                let verdict = if approve { "approved" } else { "declined" };
                self.notify(Notification::new(
                    designer.user_id,
                    NotificationKind::CommissionPaymentReviewed,
                    format!("Your commission payment of {} was {verdict}", payment.amount),
                ))
                .await;
            }
            Err(e) => {
                tracing::warn!(%payment_id, error = %e, "could not notify designer of payment review");
            }
        }

        self.audit(
            admin_id,
            "commission.payment_reviewed",
            format!("{:?}", reviewed.status),
            Some(payment_id),
        )
        .await;

        Ok(reviewed)
    }
}
