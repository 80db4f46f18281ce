// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read operations.

pub mod audit;
pub mod catalog;
pub mod enrollments;
pub mod finance;
pub mod wallets;
