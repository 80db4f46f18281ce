// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Wallet mutations.
//!
//! Each student has at most one wallet, keyed by the persisted student
//! reference. Deposits pair an atomic balance update with a ledger row.

use chrono::{DateTime, Utc};
use classledger_domain::StudentRef;
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::WalletRow;
use crate::diesel_schema::{wallet_transactions, wallets};
use crate::error::PersistenceError;

/// Fetches the wallet for a student, creating an empty one if missing.
///
/// # Errors
///
/// Returns an error if the lookup or insert fails.
pub fn get_or_create_wallet(
    conn: &mut SqliteConnection,
    student: StudentRef,
    now: DateTime<Utc>,
) -> Result<WalletRow, PersistenceError> {
    let existing: Option<WalletRow> = wallets::table
        .filter(
            wallets::student_type
                .eq(student.kind_str())
                .and(wallets::student_id.eq(student.student_id())),
        )
        .first::<WalletRow>(conn)
        .optional()?;

    if let Some(wallet) = existing {
        return Ok(wallet);
    }

    debug!(
        student_type = student.kind_str(),
        student_id = student.student_id(),
        "Creating wallet"
    );

    diesel::insert_into(wallets::table)
        .values((
            wallets::student_type.eq(student.kind_str()),
            wallets::student_id.eq(student.student_id()),
            wallets::balance.eq(0),
            wallets::created_at.eq(now.to_rfc3339()),
        ))
        .execute(conn)?;

    let wallet_id: i64 = get_last_insert_rowid(conn)?;

    Ok(WalletRow {
        wallet_id,
        student_type: student.kind_str().to_string(),
        student_id: student.student_id(),
        balance: 0,
        created_at: now.to_rfc3339(),
    })
}

/// Deposits into a wallet: atomic balance increment plus one
/// `wallet_transactions` row, in one transaction.
///
/// # Errors
///
/// Returns an error if either write fails; neither is applied then.
pub fn deposit(
    conn: &mut SqliteConnection,
    wallet_id: i64,
    amount: i64,
    reference: Option<&str>,
    payment_method: Option<&str>,
    now: DateTime<Utc>,
) -> Result<i64, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        diesel::update(wallets::table.filter(wallets::wallet_id.eq(wallet_id)))
            .set(wallets::balance.eq(wallets::balance + amount))
            .execute(conn)?;

        diesel::insert_into(wallet_transactions::table)
            .values((
                wallet_transactions::wallet_id.eq(wallet_id),
                wallet_transactions::amount.eq(amount),
                wallet_transactions::kind.eq("deposit"),
                wallet_transactions::reference.eq(reference),
                wallet_transactions::payment_method.eq(payment_method),
                wallet_transactions::created_at.eq(now.to_rfc3339()),
            ))
            .execute(conn)?;

        get_last_insert_rowid(conn)
    })
}
