//! Core library for the easyalias-tools command line application.
//!
//! Free-form labels in spreadsheet cells are cleaned into identifier-valid
//! aliases and assigned to the neighbouring cells. The text pipeline lives in
//! [`easyalias::tools::sanitize`], batch collision handling and the host
//! abstraction in [`easyalias::tools::batch`], and the `.xlsx` adapter in
//! [`easyalias::tools::host`] and [`easyalias::tools::io`]. File-level
//! orchestration is found under [`easyalias::tools::apply`].

pub mod easyalias;

pub use easyalias::tools::{
    Result, ToolError, apply, batch, cell, error, host, io, logging, model, report, sanitize,
};
