//! Data structures for representing targets and trace results.
mod record;
mod result;
mod target;

pub use record::*;
pub use result::*;
pub use target::*;
