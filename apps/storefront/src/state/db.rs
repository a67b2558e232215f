//! # Database and Object Store State
//!
//! `Database` holds a `SqlitePool`, which is already safe to share, so
//! handlers query concurrently without extra locking. The object store is
//! a directory tree plus the public URL it is served under.

use ekaksha_db::{Database, ObjectStore};

#[derive(Debug)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    ///
    /// ```rust,ignore
    /// let coupons = state.db.inner().coupons().list_active(today).await?;
    /// ```
    pub fn inner(&self) -> &Database {
        &self.db
    }
}

/// Object storage for product images.
#[derive(Debug)]
pub struct ObjectState {
    store: ObjectStore,
    bucket: String,
}

impl ObjectState {
    pub fn new(store: ObjectStore, bucket: impl Into<String>) -> Self {
        ObjectState {
            store,
            bucket: bucket.into(),
        }
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// Bucket product images live in.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Public URL of a product image, if the product has one.
    pub fn image_url(&self, image_key: Option<&str>) -> Option<String> {
        image_key.map(|key| self.store.public_url(&self.bucket, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url() {
        let objects = ObjectState::new(
            ObjectStore::new("/tmp/objects", "https://shop.ekaksha.in/"),
            "outfit_images",
        );
        assert_eq!(
            objects.image_url(Some("1700_kurta.jpg")).as_deref(),
            Some("https://shop.ekaksha.in/storage/v1/object/public/outfit_images/1700_kurta.jpg")
        );
        assert_eq!(objects.image_url(None), None);
    }
}
