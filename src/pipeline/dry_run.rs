use super::*;
use crate::error::StoreError;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

/// A table catalog that understands just enough DDL to stand in for the
/// spatial store: `CREATE TABLE` and `DROP TABLE [IF EXISTS]` change the
/// set of tables, everything else is recorded and succeeds.
///
/// Backs `pipeline --dry-run` and the executor tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    tables: BTreeSet<String>,
    pending: Option<BTreeSet<String>>,
    rows: BTreeMap<String, u64>,
    log: Vec<(String, Vec<Bound>)>,
    fail: Option<String>,
    delay: Option<Duration>,
    locks: BTreeSet<String>,
}

impl State {
    fn working(&mut self) -> &mut BTreeSet<String> {
        match self.pending {
            Some(ref mut pending) => pending,
            None => &mut self.tables,
        }
    }
}

impl MemoryStore {
    /// Starts out holding the named source tables.
    pub fn seeded(tables: &[&str]) -> Self {
        let store = Self::default();
        store.state().tables = tables.iter().map(|t| t.to_string()).collect();
        store
    }
    /// Reports `rows` for every `CREATE TABLE` of `table`.
    pub fn with_rows(self, table: &str, rows: u64) -> Self {
        self.state().rows.insert(table.to_string(), rows);
        self
    }
    /// Fails any statement containing `needle`.
    pub fn failing_on(&self, needle: &str) {
        self.state().fail = Some(needle.to_string());
    }
    /// Sleeps before every statement.
    pub fn delayed(self, delay: Duration) -> Self {
        self.state().delay = Some(delay);
        self
    }
    pub fn tables(&self) -> BTreeSet<String> {
        self.state().tables.clone()
    }
    /// Every statement seen so far with its parameters, in order.
    pub fn statements(&self) -> Vec<(String, Vec<Bound>)> {
        self.state().log.clone()
    }
    pub fn in_transaction(&self) -> bool {
        self.state().pending.is_some()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn apply(state: &mut State, sql: &str) -> Result<u64, StoreError> {
        let words = sql
            .split_whitespace()
            .map(|w| w.trim_end_matches(['(', ';']))
            .collect::<Vec<_>>();
        let upper = words
            .iter()
            .take(5)
            .map(|w| w.to_ascii_uppercase())
            .collect::<Vec<_>>();
        let upper = upper.iter().map(String::as_str).collect::<Vec<_>>();
        match upper.as_slice() {
            ["DROP", "TABLE", "IF", "EXISTS", ..] => {
                if let Some(table) = words.get(4) {
                    state.working().remove(*table);
                }
                Ok(0)
            }
            ["DROP", "TABLE", ..] => {
                let table = words.get(2).copied().unwrap_or_default();
                match state.working().remove(table) {
                    true => Ok(0),
                    false => Err(StoreError::MissingInput(table.to_string())),
                }
            }
            ["CREATE", "TABLE", "IF", "NOT", "EXISTS", ..] => {
                if let Some(table) = words.get(5) {
                    state.working().insert(table.to_string());
                }
                Ok(0)
            }
            ["CREATE", "TABLE", ..] => {
                let table = words.get(2).copied().unwrap_or_default().to_string();
                if !state.working().insert(table.clone()) {
                    return Err(StoreError::AlreadyExists(table));
                }
                Ok(state.rows.get(&table).copied().unwrap_or(0))
            }
            _ => Ok(0),
        }
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<(), StoreError> {
        let mut state = self.state();
        state.pending = Some(state.tables.clone());
        Ok(())
    }
    async fn commit(&self) -> Result<(), StoreError> {
        let mut state = self.state();
        if let Some(pending) = state.pending.take() {
            state.tables = pending;
        }
        Ok(())
    }
    async fn rollback(&self) -> Result<(), StoreError> {
        self.state().pending = None;
        Ok(())
    }
    async fn execute(&self, sql: &str, params: &[Bound]) -> Result<u64, StoreError> {
        let delay = self.state().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state();
        state.log.push((sql.to_string(), params.to_vec()));
        if let Some(ref needle) = state.fail {
            if sql.contains(needle.as_str()) {
                return Err(StoreError::Injected(needle.clone()));
            }
        }
        Self::apply(&mut state, sql)
    }
    async fn exists(&self, table: &str) -> Result<bool, StoreError> {
        Ok(self.state().working().contains(table))
    }
    async fn lock(&self, key: &str) -> Result<(), StoreError> {
        match self.state().locks.insert(key.to_string()) {
            true => Ok(()),
            false => Err(StoreError::Injected(format!("lock {} already held", key))),
        }
    }
    async fn unlock(&self, key: &str) -> Result<(), StoreError> {
        self.state().locks.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rollback_discards_created_tables() {
        let store = MemoryStore::seeded(&["dtm"]);
        store.begin().await.unwrap();
        store.execute("CREATE TABLE a AS SELECT 1", &[]).await.unwrap();
        assert!(store.exists("a").await.unwrap());
        store.rollback().await.unwrap();
        assert!(!store.exists("a").await.unwrap());
        assert!(store.exists("dtm").await.unwrap());
    }

    #[tokio::test]
    async fn create_twice_without_drop_fails() {
        let store = MemoryStore::default().with_rows("a", 7);
        assert_eq!(store.execute("CREATE TABLE a AS SELECT 1", &[]).await.unwrap(), 7);
        assert!(matches!(
            store.execute("CREATE TABLE a AS SELECT 1", &[]).await,
            Err(StoreError::AlreadyExists(_))
        ));
        store.execute("DROP TABLE IF EXISTS a", &[]).await.unwrap();
        store.execute("DROP TABLE IF EXISTS a", &[]).await.unwrap();
        assert!(store.execute("DROP TABLE a", &[]).await.is_err());
    }

    #[tokio::test]
    async fn injected_failures_match_statement_text() {
        let store = MemoryStore::default();
        store.failing_on("boom");
        assert!(store.execute("SELECT 1", &[]).await.is_ok());
        assert!(matches!(
            store.execute("SELECT boom", &[Bound::Int(1)]).await,
            Err(StoreError::Injected(_))
        ));
        assert_eq!(store.statements().len(), 2);
    }
}
