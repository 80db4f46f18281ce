// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write operations. Every multi-row write runs inside a database
//! transaction so a failure never leaves partial state behind.

pub mod audit;
pub mod campaigns;
pub mod catalog;
pub mod enrollments;
pub mod finance;
pub mod vouchers;
pub mod wallets;
