use std::sync::Arc;
use tokio_postgres::Client;

/// Existence and size checks over pipeline tables, used for status reports.
#[async_trait::async_trait]
pub trait Check: Send + Sync {
    async fn present(&self, table: &str) -> bool;
    async fn count(&self, table: &str) -> usize;
    async fn status(&self, tables: &[String]) {
        fn commas(n: usize) -> String {
            n.to_string()
                .as_bytes()
                .rchunks(3)
                .rev()
                .map(|c| String::from_utf8_lossy(c).into_owned())
                .collect::<Vec<_>>()
                .join(",")
        }
        let width = tables.iter().map(String::len).max().unwrap_or(0).max(5);
        log::info!("┌{}┬─────────────┐", "─".repeat(width + 2));
        log::info!("│ {:<width$} │        Rows │", "Table", width = width);
        log::info!("├{}┼─────────────┤", "─".repeat(width + 2));
        for table in tables.iter() {
            let rows = match self.present(table).await {
                true => commas(self.count(table).await),
                false => "missing".to_string(),
            };
            log::info!("│ {:<width$} │ {:>11} │", table, rows, width = width);
        }
        log::info!("└{}┴─────────────┘", "─".repeat(width + 2));
    }
}

/// Table names reach these queries from constants and sanitized identifiers only.
#[async_trait::async_trait]
impl Check for Client {
    async fn present(&self, table: &str) -> bool {
        const SQL: &str = "SELECT to_regclass($1) IS NOT NULL";
        self.query_one(SQL, &[&table])
            .await
            .map(|r| r.get::<_, bool>(0))
            .unwrap_or(false)
    }
    async fn count(&self, table: &str) -> usize {
        let sql = format!("SELECT COUNT(*) FROM {t}", t = table);
        self.query_opt(&sql, &[])
            .await
            .ok()
            .flatten()
            .map(|r| r.get::<_, i64>(0) as usize)
            .unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl Check for Arc<Client> {
    async fn present(&self, table: &str) -> bool {
        self.as_ref().present(table).await
    }
    async fn count(&self, table: &str) -> usize {
        self.as_ref().count(table).await
    }
}
