pub mod cron;
pub mod error;
pub mod locker;
pub mod paths;

// Trait-based client abstractions for testability
pub mod destination;
pub mod fetch;
pub mod source;

// Re-export commonly used types and traits (used by test crate)
pub use destination::{DestinationStorage, S3Destination};
pub use error::StorageError;
pub use fetch::{HttpFetcher, ObjectFetcher};
pub use source::{ListOptions, SourceStorage, StorageEntry, SupabaseStorage};
