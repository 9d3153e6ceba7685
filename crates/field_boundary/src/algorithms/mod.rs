pub mod validation;
pub mod simplification;
pub mod projection;
pub mod closure;
pub mod area;
pub mod classification;
pub mod assembly;
pub mod filters;

pub use validation::*;
pub use simplification::*;
pub use projection::*;
pub use closure::*;
pub use area::*;
pub use classification::*;
pub use assembly::*;
pub use filters::*;
