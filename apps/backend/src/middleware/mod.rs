pub mod structured_logger;

pub use structured_logger::StructuredLogger;
