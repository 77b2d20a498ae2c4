pub mod generation;
pub mod storage;
