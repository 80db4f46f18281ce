// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod campaign;
mod enrollment;
mod error;
mod finance;
mod pricing;
mod product;
mod voucher;

pub use campaign::{Campaign, CampaignRejection, best_auto_apply};
pub use enrollment::{
    CampaignQuote, DiscountSelection, EnrollmentStatus, StudentRef, VoucherQuote, select_discount,
};
pub use error::DomainError;
pub use finance::{
    ExpenseProposalStatus, IncomeReportStatus, TransactionKind, TransactionStatus,
};
pub use pricing::{DiscountKind, DiscountRule, resolve_discount};
pub use product::Product;
pub use voucher::{Voucher, VoucherRejection};
