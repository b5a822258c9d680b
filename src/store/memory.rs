use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::{
    bucket::{Bucket, BucketKey},
    error::{Error, Result},
};

use super::BucketStore;

/// A [`BucketStore`] that keeps everything in memory.
#[derive(Default)]
pub struct MemoryStore {
    buckets: RwLock<HashMap<BucketKey, Bucket>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buckets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.read().is_empty()
    }
}

impl BucketStore for MemoryStore {
    fn load(&self, key: BucketKey) -> Result<Option<Bucket>> {
        Ok(self.buckets.read().get(&key).cloned())
    }

    fn row_count(&self, key: BucketKey) -> Result<Option<usize>> {
        Ok(self.buckets.read().get(&key).map(Bucket::len))
    }

    fn is_complete(&self, key: BucketKey) -> Result<bool> {
        Ok(self.buckets.read().contains_key(&key))
    }

    fn save(&self, bucket: &Bucket) -> Result<()> {
        let mut buckets = self.buckets.write();
        if buckets.contains_key(&bucket.key()) {
            return Err(Error::AlreadyExists(bucket.key()));
        }
        buckets.insert(bucket.key(), bucket.clone());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{collinearity::Collinearity, geometry::Family};

    #[test]
    pub fn save_once() {
        let store = MemoryStore::new();
        let seed = Bucket::seed(Family::Square, Collinearity::Plane);

        store.save(&seed).unwrap();
        assert!(matches!(store.save(&seed), Err(Error::AlreadyExists(_))));

        assert_eq!(store.row_count(seed.key()).unwrap(), Some(1));
        assert!(store.is_complete(seed.key()).unwrap());
        assert_eq!(store.load(seed.key()).unwrap(), Some(seed.clone()));
        assert_eq!(store.load(seed.key().at(2, 1)).unwrap(), None);
        assert!(matches!(
            store.require(seed.key().at(2, 1)),
            Err(Error::MissingBucket(_))
        ));
    }
}
