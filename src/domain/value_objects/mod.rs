pub mod enums;
pub mod orders;
