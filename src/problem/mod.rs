//! Flexible job-shop problem definition.
//!
//! A [`Problem`] is an ordered list of [`Job`]s; each job is an ordered list
//! of [`Operation`]s, and every operation can run on any machine at a
//! machine-dependent duration. Operation order inside a job is a precedence
//! chain.
//!
//! Problems are immutable once built. They come either from
//! [`Problem::new`] or from the textual `.dat` format via
//! [`Problem::parse`] / [`Problem::from_file`].

mod loader;
mod model;

pub use model::{Job, Operation, Problem};
