//! Pages

pub mod check;
pub mod generate;

pub use check::Check;
pub use generate::Generate;
