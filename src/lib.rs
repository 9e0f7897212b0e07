// lib.rs
pub mod artifact;
pub mod classic;
pub mod completeness;
pub mod loci;
pub mod merge;
pub mod scan;
pub mod tools;
