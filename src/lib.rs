// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Culprit Search - minimal failing subset enumeration
//!
//! Given an ordered list of items and an expensive oracle, enumerate which items to omit,
//! one more at a time, and report each candidate's verdict. Candidates live in a packed bit
//! vector driven by a chain of cursors, so the enumeration itself allocates nothing per
//! candidate.

pub mod bitvec;
pub mod config;
pub mod cursor;
pub mod driver;
pub mod enumerator;
pub mod error;
pub mod monitor;
pub mod oracle;
pub mod prelude;
pub mod report;
pub mod worker;


pub use bitvec::*;
pub use config::*;
pub use cursor::*;
pub use driver::*;
pub use enumerator::*;
pub use error::*;
pub use monitor::*;
pub use oracle::*;
pub use report::*;
pub use worker::*;
