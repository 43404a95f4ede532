//! Library side of the `credit-normalize` CLI.

pub mod logging;
pub mod pipeline;
