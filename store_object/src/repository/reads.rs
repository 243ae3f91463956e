//! Lookups, listing and counting

use super::core::{decode, Repository};
use crate::errors::StoreError;
use crate::query_builder::{merge_filter, Filter};
use crate::traits::Record;
use futures::StreamExt;

impl<T: Record> Repository<T> {
    /// Load the live record with the given id into `record`.
    ///
    /// Returns false and leaves `record` untouched when nothing matches.
    pub async fn find(&self, record: &mut T, id: &str) -> Result<bool, StoreError> {
        let id = self.pk.parse_id(id)?;
        let found = self
            .run(
                "find",
                self.collection
                    .find_one(self.live_by_id(id), Default::default()),
            )
            .await?;

        match found {
            Some(document) => {
                *record = decode(document)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Load the first record matching `filter` into `record`, honoring sort and skip
    pub async fn find_one(&self, record: &mut T, filter: Filter) -> Result<bool, StoreError> {
        let filter = merge_filter(filter);
        let options = filter.find_one_options();
        let found = self
            .run(
                "find_one",
                self.collection.find_one(filter.filter, options),
            )
            .await?;

        match found {
            Some(document) => {
                *record = decode(document)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Append every record matching `filter` to `target` in cursor order.
    ///
    /// `target` may hold values or boxes. The cursor is dropped on every return path,
    /// including decode failures, which leave the already decoded records in `target`.
    pub async fn get<E>(&self, target: &mut Vec<E>, filter: Filter) -> Result<usize, StoreError>
    where
        E: From<T>,
    {
        let filter = merge_filter(filter);
        let options = filter.find_options();

        self.run("get", async {
            let mut cursor = self.collection.find(filter.filter, options).await?;
            let mut appended = 0;
            while let Some(document) = cursor.next().await {
                let record: T = decode(document?)?;
                target.push(E::from(record));
                appended += 1;
            }
            Ok::<_, StoreError>(appended)
        })
        .await
    }

    /// Number of live records matching `filter`
    pub async fn count(&self, filter: Filter) -> Result<u64, StoreError> {
        let filter = merge_filter(filter);
        self.run("count", self.collection.count_documents(filter.filter))
            .await
    }
}
