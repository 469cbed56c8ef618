//! Command implementations for the ndims-extract CLI

pub mod extract;
