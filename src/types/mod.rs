//! Domain types layered over the markup value tree.

mod receipt;
mod ucr;

pub use receipt::{Entity, Inspection, Proof, Receipt, Source, Violation};
pub use ucr::{Evidence, Payload, Subject, Time, Ucr};
