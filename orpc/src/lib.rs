// Copyright 2025 OPPO.
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

pub mod client;
pub mod common;
pub mod error;
pub mod io;
pub mod sync;

pub use crate::error::CommonError;

pub type CommonResult<T> = Result<T, CommonError>;

/// Build a `CommonError::Common` from a format string.
#[macro_export]
macro_rules! err_msg {
    ($($arg:tt)*) => {
        $crate::CommonError::Common(format!($($arg)*))
    };
}

/// Return early with an `Err` built from a format string.
/// The error is converted with `Into`, so it works for any result type whose
/// error implements `From<CommonError>`.
#[macro_export]
macro_rules! err_box {
    ($($arg:tt)*) => {
        Err($crate::err_msg!($($arg)*).into())
    };
}

/// Unwrap a result, converting the error to a `CommonError::Common`.
#[macro_export]
macro_rules! try_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => return Err($crate::err_msg!("{}", e).into()),
        }
    };
}
