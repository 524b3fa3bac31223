//! Document source abstraction.
//!
//! The schema engine consumes documents through this narrow seam; the
//! rest of the application (query panels, CRUD, import/export) has its
//! own richer access paths. Keeping the seam small lets tests drive the
//! analyzer with in-memory fixtures.

pub mod mongo;

pub use mongo::MongoSource;

use crate::Result;
use async_trait::async_trait;
use mongodb::bson::Document;

/// Read-only access to sampled documents and collection listings.
///
/// Object-safe so the analyzer can hold `Arc<dyn DocumentSource>` and be
/// driven by either the live driver-backed source or a test double.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetches up to `limit` documents from a collection.
    ///
    /// # Arguments
    /// * `database` - Database name
    /// * `collection` - Collection name
    /// * `filter` - Optional query filter (`None` fetches unfiltered)
    /// * `limit` - Maximum number of documents to return
    /// * `skip` - Number of documents to skip
    ///
    /// # Errors
    /// Returns error if the query fails or the connection is lost.
    async fn find_documents(
        &self,
        database: &str,
        collection: &str,
        filter: Option<Document>,
        limit: u32,
        skip: u64,
    ) -> Result<Vec<Document>>;

    /// Lists the collections of a database, excluding system collections.
    ///
    /// # Errors
    /// Returns error if the listing fails or the connection is lost.
    async fn list_collections(&self, database: &str) -> Result<Vec<String>>;
}
