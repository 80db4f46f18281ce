// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the ClassLedger system.
//!
//! This crate provides Diesel/SQLite storage for the enrollment
//! lifecycle, voucher and campaign bookkeeping, the financial approval
//! workflow and audit events.
//!
//! `SQLite` is the only backend: in-memory databases for tests (with
//! atomic-counter names for deterministic isolation) and file-based
//! databases with WAL mode for deployments.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use chrono::{DateTime, Utc};
use classledger_audit::AuditEvent;
use classledger_domain::{Campaign, Product, StudentRef, Voucher};
use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{
    AuditEventRow, CustomerRow, EnrollmentRow, EnrollmentStatistics, ExpenseProposalRow,
    FinancialTransactionRow, IncomeReportRow, VoucherUsageRow, WalletRow, WalletTransactionRow,
};
pub use error::PersistenceError;
pub use mutations::campaigns::NewCampaign;
pub use mutations::catalog::NewProduct;
pub use mutations::enrollments::{EnrollmentPayment, NewEnrollment};
pub use mutations::finance::{
    ExpenseProposalChanges, IncomeReportChanges, NewExpenseProposal, NewIncomeReport,
};
pub use mutations::vouchers::NewVoucher;
pub use queries::enrollments::EnrollmentFilter;
pub use queries::finance::FinanceFilter;

/// Atomic counter for generating unique in-memory database names.
///
/// This ensures deterministic test isolation by eliminating time-based collisions.
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter over a single `SQLite` connection.
///
/// The adapter is the only way the rest of the system reaches the
/// database. Callers share it behind `Arc<Mutex<_>>`.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite`
    /// database.
    ///
    /// Each call receives a unique database instance via atomic
    /// counter, ensuring deterministic test isolation without
    /// time-based collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_test_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite`
    /// database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Creates a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_product(
        &mut self,
        product: &NewProduct,
        now: DateTime<Utc>,
    ) -> Result<i64, PersistenceError> {
        mutations::catalog::create_product(&mut self.conn, product, now)
    }

    /// Fetches a product by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    pub fn get_product(&mut self, product_id: i64) -> Result<Product, PersistenceError> {
        queries::catalog::get_product(&mut self.conn, product_id)
    }

    /// Creates a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_customer(
        &mut self,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
        branch_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<i64, PersistenceError> {
        mutations::catalog::create_customer(&mut self.conn, name, phone, email, branch_id, now)
    }

    /// Fetches a customer by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the customer does not exist.
    pub fn get_customer(&mut self, customer_id: i64) -> Result<CustomerRow, PersistenceError> {
        queries::catalog::get_customer(&mut self.conn, customer_id)
    }

    /// Creates a child record under a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_child(
        &mut self,
        customer_id: i64,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<i64, PersistenceError> {
        mutations::catalog::create_child(&mut self.conn, customer_id, name, now)
    }

    /// Checks whether a child record belongs to the given customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn child_belongs_to(
        &mut self,
        customer_id: i64,
        child_id: i64,
    ) -> Result<bool, PersistenceError> {
        queries::catalog::child_belongs_to(&mut self.conn, customer_id, child_id)
    }

    // ========================================================================
    // Vouchers
    // ========================================================================

    /// Creates a voucher.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_voucher(
        &mut self,
        voucher: &NewVoucher,
        now: DateTime<Utc>,
    ) -> Result<i64, PersistenceError> {
        mutations::vouchers::create_voucher(&mut self.conn, voucher, now)
    }

    /// Fetches a voucher by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the voucher does not exist.
    pub fn get_voucher(&mut self, voucher_id: i64) -> Result<Voucher, PersistenceError> {
        queries::catalog::get_voucher(&mut self.conn, voucher_id)
    }

    /// Fetches a voucher by its code.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no voucher carries the code.
    pub fn get_voucher_by_code(&mut self, code: &str) -> Result<Voucher, PersistenceError> {
        queries::catalog::get_voucher_by_code(&mut self.conn, code)
    }

    /// Lists vouchers, optionally only active ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_vouchers(&mut self, active_only: bool) -> Result<Vec<Voucher>, PersistenceError> {
        queries::catalog::list_vouchers(&mut self.conn, active_only)
    }

    /// Counts how many times a customer has redeemed a voucher.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_customer_voucher_uses(
        &mut self,
        voucher_id: i64,
        customer_id: i64,
    ) -> Result<i64, PersistenceError> {
        queries::catalog::count_customer_voucher_uses(&mut self.conn, voucher_id, customer_id)
    }

    /// Records a voucher redemption (usage row plus atomic counter
    /// increment) in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if either write fails.
    pub fn record_voucher_usage(
        &mut self,
        voucher_id: i64,
        customer_id: i64,
        enrollment_id: i64,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        mutations::vouchers::record_voucher_usage(
            &mut self.conn,
            voucher_id,
            customer_id,
            enrollment_id,
            amount,
            now,
        )
    }

    /// Releases a voucher redemption tied to an enrollment. Returns
    /// `false` when no usage row existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub fn release_voucher_usage(
        &mut self,
        voucher_id: i64,
        enrollment_id: i64,
    ) -> Result<bool, PersistenceError> {
        mutations::vouchers::release_voucher_usage(&mut self.conn, voucher_id, enrollment_id)
    }

    // ========================================================================
    // Campaigns
    // ========================================================================

    /// Creates a campaign.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_campaign(
        &mut self,
        campaign: &NewCampaign,
        now: DateTime<Utc>,
    ) -> Result<i64, PersistenceError> {
        mutations::campaigns::create_campaign(&mut self.conn, campaign, now)
    }

    /// Fetches a campaign by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the campaign does not exist.
    pub fn get_campaign(&mut self, campaign_id: i64) -> Result<Campaign, PersistenceError> {
        queries::catalog::get_campaign(&mut self.conn, campaign_id)
    }

    /// Lists auto-apply campaigns ordered by priority descending then
    /// id ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_auto_apply_campaigns(&mut self) -> Result<Vec<Campaign>, PersistenceError> {
        queries::catalog::list_auto_apply_campaigns(&mut self.conn)
    }

    /// Atomically increments a campaign's usage counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn increment_campaign_usage(&mut self, campaign_id: i64) -> Result<(), PersistenceError> {
        mutations::campaigns::increment_campaign_usage(&mut self.conn, campaign_id)
    }

    // ========================================================================
    // Enrollments
    // ========================================================================

    /// Inserts an enrollment and its pending income report in one
    /// transaction. Returns `(enrollment_id, income_report_id)`.
    ///
    /// # Errors
    ///
    /// Returns an error if either insert fails.
    pub fn create_enrollment_with_income_report(
        &mut self,
        enrollment: &NewEnrollment,
        report_title: &str,
        now: DateTime<Utc>,
    ) -> Result<(i64, i64), PersistenceError> {
        mutations::enrollments::create_enrollment_with_income_report(
            &mut self.conn,
            enrollment,
            report_title,
            now,
        )
    }

    /// Fetches an enrollment by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the enrollment does not exist.
    pub fn get_enrollment(&mut self, enrollment_id: i64) -> Result<EnrollmentRow, PersistenceError> {
        queries::enrollments::get_enrollment(&mut self.conn, enrollment_id)
    }

    /// Lists enrollments matching the filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_enrollments(
        &mut self,
        filter: &EnrollmentFilter,
    ) -> Result<Vec<EnrollmentRow>, PersistenceError> {
        queries::enrollments::list_enrollments(&mut self.conn, filter)
    }

    /// Applies a confirmed payment in one transaction: wallet deposit
    /// plus the enrollment's payment columns. Returns the wallet
    /// balance after the deposit.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the enrollment does not exist; nothing is
    /// written then.
    pub fn record_enrollment_payment(
        &mut self,
        payment: &EnrollmentPayment,
        now: DateTime<Utc>,
    ) -> Result<i64, PersistenceError> {
        mutations::enrollments::record_enrollment_payment(&mut self.conn, payment, now)
    }

    /// Updates the payment columns and status of an enrollment.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no enrollment row matched.
    pub fn update_enrollment_payment(
        &mut self,
        enrollment_id: i64,
        paid_amount: i64,
        remaining_amount: i64,
        status: &str,
        now: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        mutations::enrollments::update_enrollment_payment(
            &mut self.conn,
            enrollment_id,
            paid_amount,
            remaining_amount,
            status,
            now,
        )
    }

    /// Marks an enrollment cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn set_enrollment_cancelled(
        &mut self,
        enrollment_id: i64,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        mutations::enrollments::set_enrollment_cancelled(&mut self.conn, enrollment_id, reason, now)
    }

    /// Deletes an enrollment row.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no row was deleted.
    pub fn delete_enrollment(&mut self, enrollment_id: i64) -> Result<(), PersistenceError> {
        mutations::enrollments::delete_enrollment(&mut self.conn, enrollment_id)
    }

    /// Aggregates enrollment counts and revenue.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn enrollment_statistics(&mut self) -> Result<EnrollmentStatistics, PersistenceError> {
        queries::enrollments::enrollment_statistics(&mut self.conn)
    }

    /// Checks whether an approved income report is linked to the
    /// enrollment.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn has_approved_income_report(
        &mut self,
        enrollment_id: i64,
    ) -> Result<bool, PersistenceError> {
        queries::enrollments::has_approved_income_report(&mut self.conn, enrollment_id)
    }

    // ========================================================================
    // Wallets
    // ========================================================================

    /// Fetches the wallet for a student, creating an empty one if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup or insert fails.
    pub fn get_or_create_wallet(
        &mut self,
        student: StudentRef,
        now: DateTime<Utc>,
    ) -> Result<WalletRow, PersistenceError> {
        mutations::wallets::get_or_create_wallet(&mut self.conn, student, now)
    }

    /// Fetches the wallet for a student, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_wallet(&mut self, student: StudentRef) -> Result<Option<WalletRow>, PersistenceError> {
        queries::wallets::get_wallet(&mut self.conn, student)
    }

    /// Deposits into a wallet and records the ledger row.
    ///
    /// # Errors
    ///
    /// Returns an error if either write fails.
    pub fn deposit_to_wallet(
        &mut self,
        wallet_id: i64,
        amount: i64,
        reference: Option<&str>,
        payment_method: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<i64, PersistenceError> {
        mutations::wallets::deposit(&mut self.conn, wallet_id, amount, reference, payment_method, now)
    }

    /// Lists a wallet's transactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_wallet_transactions(
        &mut self,
        wallet_id: i64,
    ) -> Result<Vec<WalletTransactionRow>, PersistenceError> {
        queries::wallets::list_wallet_transactions(&mut self.conn, wallet_id)
    }

    // ========================================================================
    // Income reports
    // ========================================================================

    /// Creates an income report with status `pending`.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_income_report(
        &mut self,
        report: &NewIncomeReport,
        now: DateTime<Utc>,
    ) -> Result<i64, PersistenceError> {
        mutations::finance::create_income_report(&mut self.conn, report, now)
    }

    /// Fetches an income report by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the report does not exist.
    pub fn get_income_report(
        &mut self,
        income_report_id: i64,
    ) -> Result<IncomeReportRow, PersistenceError> {
        queries::finance::get_income_report(&mut self.conn, income_report_id)
    }

    /// Lists income reports matching the filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_income_reports(
        &mut self,
        filter: &FinanceFilter,
    ) -> Result<Vec<IncomeReportRow>, PersistenceError> {
        queries::finance::list_income_reports(&mut self.conn, filter)
    }

    /// Approves a pending income report and stages one `approved`
    /// ledger row. Returns the transaction id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the report is missing or no longer pending.
    pub fn approve_income_report(
        &mut self,
        income_report_id: i64,
        approver: Option<i64>,
        cash_account_id: i64,
        payment_method: Option<&str>,
        payment_ref: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<i64, PersistenceError> {
        mutations::finance::approve_income_report(
            &mut self.conn,
            income_report_id,
            approver,
            cash_account_id,
            payment_method,
            payment_ref,
            now,
        )
    }

    /// Rejects a pending income report.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the report is missing or no longer pending.
    pub fn reject_income_report(
        &mut self,
        income_report_id: i64,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        mutations::finance::reject_income_report(&mut self.conn, income_report_id, reason, now)
    }

    /// Applies a partial update to a pending income report.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_income_report(
        &mut self,
        income_report_id: i64,
        changes: &IncomeReportChanges,
        now: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        mutations::finance::update_income_report(&mut self.conn, income_report_id, changes, now)
    }

    /// Deletes an income report row.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no row was deleted.
    pub fn delete_income_report(&mut self, income_report_id: i64) -> Result<(), PersistenceError> {
        mutations::finance::delete_income_report(&mut self.conn, income_report_id)
    }

    // ========================================================================
    // Expense proposals
    // ========================================================================

    /// Creates an expense proposal together with its `pending` ledger
    /// row. Returns `(proposal_id, transaction_id)`.
    ///
    /// # Errors
    ///
    /// Returns an error if either insert fails.
    pub fn create_expense_proposal(
        &mut self,
        proposal: &NewExpenseProposal,
        now: DateTime<Utc>,
    ) -> Result<(i64, i64), PersistenceError> {
        mutations::finance::create_expense_proposal(&mut self.conn, proposal, now)
    }

    /// Fetches an expense proposal by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the proposal does not exist.
    pub fn get_expense_proposal(
        &mut self,
        expense_proposal_id: i64,
    ) -> Result<ExpenseProposalRow, PersistenceError> {
        queries::finance::get_expense_proposal(&mut self.conn, expense_proposal_id)
    }

    /// Lists expense proposals matching the filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_expense_proposals(
        &mut self,
        filter: &FinanceFilter,
    ) -> Result<Vec<ExpenseProposalRow>, PersistenceError> {
        queries::finance::list_expense_proposals(&mut self.conn, filter)
    }

    /// Approves a pending expense proposal. The ledger is untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the proposal is missing or no longer pending.
    pub fn approve_expense_proposal(
        &mut self,
        expense_proposal_id: i64,
        approver: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        mutations::finance::approve_expense_proposal(
            &mut self.conn,
            expense_proposal_id,
            approver,
            now,
        )
    }

    /// Rejects a pending expense proposal.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the proposal is missing or no longer pending.
    pub fn reject_expense_proposal(
        &mut self,
        expense_proposal_id: i64,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        mutations::finance::reject_expense_proposal(&mut self.conn, expense_proposal_id, reason, now)
    }

    /// Marks an approved expense proposal paid and records the second
    /// ledger row. Returns the new transaction id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the proposal is missing or not approved.
    pub fn mark_expense_proposal_paid(
        &mut self,
        expense_proposal_id: i64,
        payment_date: DateTime<Utc>,
        payment_method: &str,
        payment_ref: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<i64, PersistenceError> {
        mutations::finance::mark_expense_proposal_paid(
            &mut self.conn,
            expense_proposal_id,
            payment_date,
            payment_method,
            payment_ref,
            now,
        )
    }

    /// Applies a partial update to a pending expense proposal.
    ///
    /// # Errors
    ///
    /// Returns an error if any update fails.
    pub fn update_expense_proposal(
        &mut self,
        expense_proposal_id: i64,
        changes: &ExpenseProposalChanges,
        now: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        mutations::finance::update_expense_proposal(
            &mut self.conn,
            expense_proposal_id,
            changes,
            now,
        )
    }

    /// Deletes an expense proposal and its ledger rows.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the proposal does not exist.
    pub fn delete_expense_proposal(
        &mut self,
        expense_proposal_id: i64,
    ) -> Result<(), PersistenceError> {
        mutations::finance::delete_expense_proposal(&mut self.conn, expense_proposal_id)
    }

    /// Lists every ledger row staged for a source record.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn transactions_for_source(
        &mut self,
        source_type: &str,
        source_id: i64,
    ) -> Result<Vec<FinancialTransactionRow>, PersistenceError> {
        queries::finance::transactions_for_source(&mut self.conn, source_type, source_id)
    }

    // ========================================================================
    // Audit
    // ========================================================================

    /// Persists an audit event and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn persist_audit_event(&mut self, event: &AuditEvent) -> Result<i64, PersistenceError> {
        mutations::audit::persist_audit_event(&mut self.conn, event)
    }

    /// Lists audit events recorded for an entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn audit_events_for_entity(
        &mut self,
        entity_type: &str,
        entity_id: i64,
    ) -> Result<Vec<AuditEventRow>, PersistenceError> {
        queries::audit::events_for_entity(&mut self.conn, entity_type, entity_id)
    }
}
