#![deny(unsafe_code)]

pub mod error;
pub mod registry;

pub use crate::error::{Result, StandardsError};
pub use crate::registry::{
    SpecRegistry, builtin_source, builtin_spec, load_spec_file, parse_spec, spec_for_key,
    spec_to_toml,
};
