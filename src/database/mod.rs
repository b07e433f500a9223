pub mod index;
pub mod mongodb;
pub mod traits;

#[cfg(test)]
pub(crate) mod memory;
