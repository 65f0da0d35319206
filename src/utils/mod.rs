pub mod export;
pub mod index;
pub(crate) mod urls;
