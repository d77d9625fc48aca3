// src/core/mod.rs
//! Backend access and file system plumbing shared by the upload flow

pub mod fs_ops;
pub mod service_client;

pub use fs_ops::FsOps;
pub use service_client::{CvApi, ServiceClient};
