use super::*;
use crate::config::Config;
use crate::error::Error;
use crate::error::Result;
use crate::error::StoreError;
use crate::region::Region;
use std::time::Duration;
use std::time::Instant;

/// Runs stage lists against a [`Store`], one transaction per stage.
pub struct Executor<S> {
    store: S,
    catalog: Catalog,
    timeout: Duration,
    lock: bool,
}

impl<S> Executor<S>
where
    S: Store,
{
    pub fn new(store: S, catalog: Catalog, timeout: Duration, lock: bool) -> Self {
        Self {
            store,
            catalog,
            timeout,
            lock,
        }
    }
    pub fn configured(store: S, config: &Config) -> Self {
        Self::new(
            store,
            Catalog::from(config),
            config.stage_timeout,
            config.advisory_lock,
        )
    }
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolves every stage up front so template and naming errors surface
    /// before anything touches the store.
    pub fn prepare(&self, specs: &[StageSpec], region: Option<&Region>) -> Result<Vec<Stage>> {
        let stages = specs
            .iter()
            .map(|spec| Stage::prepare(spec, self.catalog.load(&spec.template)?, region))
            .collect::<Result<Vec<_>>>()?;
        check_order(&stages)?;
        Ok(stages)
    }

    pub async fn run(&self, specs: &[StageSpec], region: Option<&Region>) -> Result<Vec<StageResult>> {
        let ref stages = self.prepare(specs, region)?;
        let key = match region {
            Some(region) if self.lock => Some(format!("roadslope:{}", Identifier::sanitize(region.name())?)),
            _ => None,
        };
        let start = Instant::now();
        if let Some(ref key) = key {
            log::debug!("acquiring advisory lock {}", key);
            self.store.lock(key).await.map_err(|e| Error::StoreExecution {
                stage: "lock".to_string(),
                elapsed: start.elapsed(),
                params: key.clone(),
                source: e,
            })?;
        }
        let mut results = Vec::with_capacity(stages.len());
        let mut outcome = Ok(());
        for stage in stages.iter() {
            match self.execute(stage).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }
        if let Some(ref key) = key {
            if let Err(e) = self.store.unlock(key).await {
                log::warn!("failed to release advisory lock {}: {}", key, e);
            }
        }
        outcome?;
        log::info!(
            "pipeline complete: {} stages in {:.2}s",
            results.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(results)
    }

    async fn execute(&self, stage: &Stage) -> Result<StageResult> {
        let start = Instant::now();
        let fail = |source: StoreError| Error::StoreExecution {
            stage: stage.name.clone(),
            elapsed: start.elapsed(),
            params: stage.bound.to_string(),
            source,
        };
        log::info!("{:<24} starting", stage.name);
        for input in stage.inputs.iter() {
            match self.store.exists(input).await {
                Ok(true) => {}
                Ok(false) => return Err(fail(StoreError::MissingInput(input.clone()))),
                Err(e) => return Err(fail(e)),
            }
        }
        self.store.begin().await.map_err(fail)?;
        let work = async {
            // the local timeout alone leaves the statement running on the server
            self.store
                .execute(&statement_timeout(self.timeout), &[])
                .await?;
            for output in stage.outputs.iter() {
                self.store
                    .execute(&format!("DROP TABLE IF EXISTS {}", output), &[])
                    .await?;
            }
            let mut rows = 0;
            for statement in stage.statements() {
                log::debug!("{}: {}", stage.name, statement.sql);
                rows += self.store.execute(&statement.sql, &statement.params).await?;
            }
            Ok::<u64, StoreError>(rows)
        };
        let outcome = match tokio::time::timeout(self.timeout, work).await {
            Ok(outcome) => outcome,
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        };
        let outcome = match outcome {
            Ok(rows) => self.store.commit().await.map(|_| rows),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(rows) => {
                let elapsed = start.elapsed();
                log::info!(
                    "{:<24} complete {:>10} rows in {:.2}s",
                    stage.name,
                    rows,
                    elapsed.as_secs_f64()
                );
                Ok(StageResult {
                    stage: stage.name.clone(),
                    elapsed,
                    rows,
                    outputs: stage.outputs.clone(),
                })
            }
            Err(e) => {
                if let Err(rollback) = self.store.rollback().await {
                    log::error!("{} rollback failed: {}", stage.name, rollback);
                }
                let error = fail(e);
                log::error!("{}", error);
                Err(error)
            }
        }
    }
}

/// Server-side bound for every statement of the current transaction.
pub fn statement_timeout(timeout: Duration) -> String {
    format!("SET LOCAL statement_timeout = {}", timeout.as_millis().max(1))
}

/// Rejects lists where a stage reads a table only a later stage writes.
pub fn check_order(stages: &[Stage]) -> Result<()> {
    for (i, stage) in stages.iter().enumerate() {
        for input in stage.inputs.iter() {
            let earlier = stages[..i].iter().any(|s| s.outputs.contains(input));
            let later = stages[i + 1..].iter().any(|s| s.outputs.contains(input));
            if later && !earlier {
                return Err(Error::OutOfOrder {
                    stage: stage.name.clone(),
                    table: input.clone(),
                });
            }
        }
    }
    Ok(())
}
