use super::*;
use crate::error::StoreError;

/// The spatial store as the executor sees it: one session with explicit
/// transaction control and positional value binding.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> Result<(), StoreError>;
    async fn commit(&self) -> Result<(), StoreError>;
    async fn rollback(&self) -> Result<(), StoreError>;
    /// Runs one statement, returning the rows it produced or touched.
    async fn execute(&self, sql: &str, params: &[Bound]) -> Result<u64, StoreError>;
    async fn exists(&self, table: &str) -> Result<bool, StoreError>;
    /// Session-level exclusive lock on `key`, held until [`Store::unlock`].
    async fn lock(&self, key: &str) -> Result<(), StoreError>;
    async fn unlock(&self, key: &str) -> Result<(), StoreError>;
}

#[cfg(feature = "database")]
mod postgres {
    use super::*;
    use std::sync::Arc;
    use tokio_postgres::Client;
    use tokio_postgres::types::ToSql;

    #[rustfmt::skip]
    const EXISTS: &str = "SELECT to_regclass($1) IS NOT NULL";
    #[rustfmt::skip]
    const LOCK:   &str = "SELECT pg_advisory_lock(hashtext($1))";
    #[rustfmt::skip]
    const UNLOCK: &str = "SELECT pg_advisory_unlock(hashtext($1))";

    #[async_trait::async_trait]
    impl Store for Client {
        async fn begin(&self) -> Result<(), StoreError> {
            Ok(self.batch_execute("BEGIN").await?)
        }
        async fn commit(&self) -> Result<(), StoreError> {
            Ok(self.batch_execute("COMMIT").await?)
        }
        async fn rollback(&self) -> Result<(), StoreError> {
            Ok(self.batch_execute("ROLLBACK").await?)
        }
        async fn execute(&self, sql: &str, params: &[Bound]) -> Result<u64, StoreError> {
            let params = params
                .iter()
                .map(|p| p as &(dyn ToSql + Sync))
                .collect::<Vec<_>>();
            Ok(Client::execute(self, sql, &params).await?)
        }
        async fn exists(&self, table: &str) -> Result<bool, StoreError> {
            Ok(self.query_one(EXISTS, &[&table]).await?.get::<_, bool>(0))
        }
        async fn lock(&self, key: &str) -> Result<(), StoreError> {
            self.query_one(LOCK, &[&key]).await?;
            Ok(())
        }
        async fn unlock(&self, key: &str) -> Result<(), StoreError> {
            self.query_one(UNLOCK, &[&key]).await?;
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl Store for Arc<Client> {
        async fn begin(&self) -> Result<(), StoreError> {
            Store::begin(self.as_ref()).await
        }
        async fn commit(&self) -> Result<(), StoreError> {
            Store::commit(self.as_ref()).await
        }
        async fn rollback(&self) -> Result<(), StoreError> {
            Store::rollback(self.as_ref()).await
        }
        async fn execute(&self, sql: &str, params: &[Bound]) -> Result<u64, StoreError> {
            Store::execute(self.as_ref(), sql, params).await
        }
        async fn exists(&self, table: &str) -> Result<bool, StoreError> {
            Store::exists(self.as_ref(), table).await
        }
        async fn lock(&self, key: &str) -> Result<(), StoreError> {
            Store::lock(self.as_ref(), key).await
        }
        async fn unlock(&self, key: &str) -> Result<(), StoreError> {
            Store::unlock(self.as_ref(), key).await
        }
    }
}
