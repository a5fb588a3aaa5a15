pub mod builtin;
pub mod registry;
pub mod table;

pub use registry::{SpecRegistry, SpecSource, BUNDLED_TABLE};
pub use table::{CanonicalCaseTable, SpecSchema, TableOrigin};
