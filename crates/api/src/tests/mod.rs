// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod discount_tests;
mod enrollment_tests;
mod finance_tests;
mod helpers;
