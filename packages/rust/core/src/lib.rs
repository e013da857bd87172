//! Pipeline orchestration for Despachos.
//!
//! Ties the directory client and the artifact writer together:
//! fetch personnel → resolve offices → sort → write.

pub mod pipeline;
