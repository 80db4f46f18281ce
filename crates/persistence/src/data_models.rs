// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row structs and conversions between stored columns and domain types.
//!
//! Timestamps are stored as RFC 3339 TEXT, money as whole currency
//! units in BIGINT columns, and applicability lists as JSON TEXT.

use chrono::{DateTime, Utc};
use classledger_domain::{Campaign, DiscountKind, Product, Voucher};
use diesel::prelude::*;
use serde::Serialize;
use std::str::FromStr;

use crate::error::PersistenceError;

pub(crate) fn parse_datetime(value: &str) -> Result<DateTime<Utc>, PersistenceError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| PersistenceError::InvalidStoredData(format!("Bad timestamp '{value}': {e}")))
}

pub(crate) fn parse_opt_datetime(
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, PersistenceError> {
    value.map(parse_datetime).transpose()
}

pub(crate) fn parse_id_list(value: Option<&str>) -> Result<Option<Vec<i64>>, PersistenceError> {
    value.map(|json| Ok(serde_json::from_str(json)?)).transpose()
}

pub(crate) fn parse_string_list(
    value: Option<&str>,
) -> Result<Option<Vec<String>>, PersistenceError> {
    value.map(|json| Ok(serde_json::from_str(json)?)).transpose()
}

#[derive(Debug, Clone, Queryable)]
pub struct ProductRow {
    pub product_id: i64,
    pub code: String,
    pub name: String,
    pub category: Option<String>,
    pub list_price: i64,
    pub sale_price: Option<i64>,
    pub sale_active: i32,
    pub total_sessions: i64,
    pub price_per_session: i64,
    pub created_at: String,
}

impl ProductRow {
    #[must_use]
    pub fn into_domain(self) -> Product {
        Product {
            product_id: self.product_id,
            code: self.code,
            name: self.name,
            category: self.category,
            list_price: self.list_price,
            sale_price: self.sale_price,
            sale_active: self.sale_active != 0,
            total_sessions: self.total_sessions,
            price_per_session: self.price_per_session,
        }
    }
}

#[derive(Debug, Clone, Queryable, Serialize)]
pub struct CustomerRow {
    pub customer_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub branch_id: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone, Queryable, Serialize)]
pub struct ChildRow {
    pub child_id: i64,
    pub customer_id: i64,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Queryable)]
pub struct VoucherRow {
    pub voucher_id: i64,
    pub code: String,
    pub name: String,
    pub active: i32,
    pub discount_kind: String,
    pub discount_value: i64,
    pub max_discount_amount: Option<i64>,
    pub min_order_amount: Option<i64>,
    pub valid_from: Option<String>,
    pub valid_until: Option<String>,
    pub usage_limit: Option<i64>,
    pub usage_count: i64,
    pub usage_per_customer: i64,
    pub applicable_customer_ids: Option<String>,
    pub applicable_product_ids: Option<String>,
    pub applicable_categories: Option<String>,
    pub created_at: String,
}

impl VoucherRow {
    /// # Errors
    ///
    /// Returns an error if a stored column cannot be interpreted.
    pub fn into_domain(self) -> Result<Voucher, PersistenceError> {
        Ok(Voucher {
            voucher_id: self.voucher_id,
            code: self.code,
            name: self.name,
            active: self.active != 0,
            discount_kind: DiscountKind::from_str(&self.discount_kind)?,
            discount_value: self.discount_value,
            max_discount_amount: self.max_discount_amount,
            min_order_amount: self.min_order_amount,
            valid_from: parse_opt_datetime(self.valid_from.as_deref())?,
            valid_until: parse_opt_datetime(self.valid_until.as_deref())?,
            usage_limit: self.usage_limit,
            usage_count: self.usage_count,
            usage_per_customer: self.usage_per_customer,
            applicable_customer_ids: parse_id_list(self.applicable_customer_ids.as_deref())?,
            applicable_product_ids: parse_id_list(self.applicable_product_ids.as_deref())?,
            applicable_categories: parse_string_list(self.applicable_categories.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Serialize)]
pub struct VoucherUsageRow {
    pub usage_id: i64,
    pub voucher_id: i64,
    pub customer_id: i64,
    pub enrollment_id: Option<i64>,
    pub amount: i64,
    pub used_at: String,
}

#[derive(Debug, Clone, Queryable)]
pub struct CampaignRow {
    pub campaign_id: i64,
    pub name: String,
    pub active: i32,
    pub discount_kind: String,
    pub discount_value: i64,
    pub max_discount_amount: Option<i64>,
    pub min_order_amount: Option<i64>,
    pub start_date: String,
    pub end_date: String,
    pub usage_limit: Option<i64>,
    pub usage_count: i64,
    pub auto_apply: i32,
    pub priority: i64,
    pub applicable_product_ids: Option<String>,
    pub applicable_categories: Option<String>,
    pub target_customer_segments: Option<String>,
    pub created_at: String,
}

impl CampaignRow {
    /// # Errors
    ///
    /// Returns an error if a stored column cannot be interpreted.
    pub fn into_domain(self) -> Result<Campaign, PersistenceError> {
        Ok(Campaign {
            campaign_id: self.campaign_id,
            name: self.name,
            active: self.active != 0,
            discount_kind: DiscountKind::from_str(&self.discount_kind)?,
            discount_value: self.discount_value,
            max_discount_amount: self.max_discount_amount,
            min_order_amount: self.min_order_amount,
            start_date: parse_datetime(&self.start_date)?,
            end_date: parse_datetime(&self.end_date)?,
            usage_limit: self.usage_limit,
            usage_count: self.usage_count,
            auto_apply: self.auto_apply != 0,
            priority: self.priority,
            applicable_product_ids: parse_id_list(self.applicable_product_ids.as_deref())?,
            applicable_categories: parse_string_list(self.applicable_categories.as_deref())?,
            target_customer_segments: parse_string_list(self.target_customer_segments.as_deref())?,
        })
    }
}

/// An enrollment as stored. Status and timestamps stay as TEXT here;
/// callers parse them into domain enums where decisions are made.
#[derive(Debug, Clone, Queryable, Serialize)]
pub struct EnrollmentRow {
    pub enrollment_id: i64,
    pub customer_id: i64,
    pub student_type: String,
    pub student_id: i64,
    pub product_id: i64,
    pub branch_id: Option<i64>,
    pub status: String,
    pub original_price: i64,
    pub discount_amount: i64,
    pub final_price: i64,
    pub paid_amount: i64,
    pub remaining_amount: i64,
    pub voucher_id: Option<i64>,
    pub voucher_code: Option<String>,
    pub campaign_id: Option<i64>,
    pub total_sessions: i64,
    pub attended_sessions: i64,
    pub remaining_sessions: i64,
    pub price_per_session: i64,
    pub notes: Option<String>,
    pub cancelled_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Queryable, Serialize)]
pub struct WalletRow {
    pub wallet_id: i64,
    pub student_type: String,
    pub student_id: i64,
    pub balance: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Queryable, Serialize)]
pub struct WalletTransactionRow {
    pub wallet_transaction_id: i64,
    pub wallet_id: i64,
    pub amount: i64,
    pub kind: String,
    pub reference: Option<String>,
    pub payment_method: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Queryable, Serialize)]
pub struct IncomeReportRow {
    pub income_report_id: i64,
    pub title: String,
    pub amount: i64,
    pub status: String,
    pub payment_method: String,
    pub payer_info: Option<String>,
    pub category: Option<String>,
    pub financial_plan_id: Option<i64>,
    pub account_item_id: Option<i64>,
    pub branch_id: Option<i64>,
    pub report_date: String,
    pub approved_by: Option<i64>,
    pub approved_at: Option<String>,
    pub rejected_reason: Option<String>,
    pub cash_account_id: Option<i64>,
    pub payment_ref: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl IncomeReportRow {
    /// Extracts the enrollment id embedded in the `payer_info` JSON,
    /// when the report was generated for an enrollment.
    #[must_use]
    pub fn linked_enrollment_id(&self) -> Option<i64> {
        let info = self.payer_info.as_deref()?;
        let value: serde_json::Value = serde_json::from_str(info).ok()?;
        value.get("enrollment_id")?.as_i64()
    }
}

#[derive(Debug, Clone, Queryable, Serialize)]
pub struct ExpenseProposalRow {
    pub expense_proposal_id: i64,
    pub title: String,
    pub amount: i64,
    pub status: String,
    pub category: Option<String>,
    pub financial_plan_id: i64,
    pub cash_account_id: i64,
    pub branch_id: Option<i64>,
    pub proposal_date: String,
    pub approved_by: Option<i64>,
    pub approved_at: Option<String>,
    pub rejected_reason: Option<String>,
    pub payment_date: Option<String>,
    pub payment_method: Option<String>,
    pub payment_ref: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Queryable, Serialize)]
pub struct FinancialTransactionRow {
    pub transaction_id: i64,
    pub kind: String,
    pub status: String,
    pub amount: i64,
    pub source_type: String,
    pub source_id: i64,
    pub cash_account_id: Option<i64>,
    pub payment_method: Option<String>,
    pub payment_ref: Option<String>,
    pub payment_date: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Queryable, Serialize)]
pub struct AuditEventRow {
    pub event_id: i64,
    pub actor_id: String,
    pub actor_type: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: i64,
    pub before_status: Option<String>,
    pub after_status: Option<String>,
    pub details: Option<String>,
    pub occurred_at: String,
}

/// Aggregate counts and revenue over the enrollments table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrollmentStatistics {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub paid: i64,
    pub active: i64,
    pub completed: i64,
    pub cancelled: i64,
    /// Sum of `paid_amount` over non-cancelled enrollments.
    pub realized_revenue: i64,
    /// Sum of `remaining_amount` over non-cancelled enrollments.
    pub pending_revenue: i64,
}
