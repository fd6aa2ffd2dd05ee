//! Core library for the invoice-etl command line application.
//!
//! The library turns the invoice export of an ERP system into a validated,
//! client-keyed aggregate plus a diagnostics report. Field sanitizers live in
//! [`erp::invoices::sanitize`], row classification in
//! [`erp::invoices::classify`], the per-client fold in
//! [`erp::invoices::aggregate`] and the run driver in
//! [`erp::invoices::pipeline`]. Spreadsheet and JSON adapters sit under
//! [`erp::invoices::io`], and the file-to-file entry points used by the CLI
//! under [`erp::invoices::convert`].

pub mod erp;

pub use erp::invoices::{
    EtlError, Result, aggregate, classify, config, convert, error, io, model, pipeline, report,
    sanitize,
};
