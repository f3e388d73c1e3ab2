//! Reference constituent table port trait.

use crate::domain::constituents::ConstituentRecord;
use crate::domain::error::PortvalError;

pub trait ReferenceTable {
    fn constituent_records(&self) -> Result<Vec<ConstituentRecord>, PortvalError>;
}
