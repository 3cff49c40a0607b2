pub mod backend;
pub mod gateway_service;
pub mod keys;
pub mod memory_backend;
pub mod s3_backend;
