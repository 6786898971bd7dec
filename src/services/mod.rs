pub mod remote;
pub mod staging;
pub mod storage;
