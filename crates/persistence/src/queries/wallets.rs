// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Wallet lookups.

use classledger_domain::StudentRef;
use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::data_models::{WalletRow, WalletTransactionRow};
use crate::diesel_schema::{wallet_transactions, wallets};
use crate::error::PersistenceError;

/// Fetches the wallet for a student, if one exists.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_wallet(
    conn: &mut SqliteConnection,
    student: StudentRef,
) -> Result<Option<WalletRow>, PersistenceError> {
    Ok(wallets::table
        .filter(
            wallets::student_type
                .eq(student.kind_str())
                .and(wallets::student_id.eq(student.student_id())),
        )
        .first::<WalletRow>(conn)
        .optional()?)
}

/// Lists a wallet's transactions, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_wallet_transactions(
    conn: &mut SqliteConnection,
    wallet_id: i64,
) -> Result<Vec<WalletTransactionRow>, PersistenceError> {
    Ok(wallet_transactions::table
        .filter(wallet_transactions::wallet_id.eq(wallet_id))
        .order(wallet_transactions::wallet_transaction_id.asc())
        .load::<WalletTransactionRow>(conn)?)
}
