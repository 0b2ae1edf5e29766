pub mod check;
pub mod prepare;
pub mod profile;
