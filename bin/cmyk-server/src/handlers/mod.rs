pub mod conversion;

pub use conversion::{ConversionError, ConversionService};
