//! Types shared between the designer core, the solver port and front-ends.

pub mod domain;
pub mod error;
pub mod protocol;
