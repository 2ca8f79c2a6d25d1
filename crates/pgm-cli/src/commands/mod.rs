//! CLI command implementations

pub(crate) mod execute;
pub(crate) mod new;
pub(crate) mod status;
