pub mod dump;
pub mod import;
pub mod inspect;
