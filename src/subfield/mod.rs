pub mod aggregate;
pub mod taxonomy;

pub use aggregate::{aggregate_subfields, normalized_weight, FieldGraph, SubfieldEdge, SubfieldNode};
pub use taxonomy::Taxonomy;
