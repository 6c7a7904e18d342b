//! Wire protocols spoken to remote object stores

pub mod s3;
