pub mod latch;

pub use latch::BinaryLatch;
