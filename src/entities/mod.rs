//! Entity types - the three catalogs of the work library

pub mod labor;
pub mod material;
pub mod work;

pub use labor::Labor;
pub use material::Material;
pub use work::{ComponentKind, Work, WorkComponent, WorkCosts};
