use super::*;
use crate::config::Config;
use crate::error::Error;
use crate::error::StoreError;
use crate::region::Region;
use crate::region::Registry;
use std::time::Duration;

const SOURCES: &[&str] = &[DTM, ROADS];

fn koeln() -> Region {
    Registry::seeded(&Config::default())
        .unwrap()
        .get("koeln_center")
        .unwrap()
        .clone()
}

fn executor(store: MemoryStore) -> Executor<MemoryStore> {
    Executor::new(store, Catalog::embedded(), Duration::from_secs(5), true)
}

fn store() -> MemoryStore {
    MemoryStore::seeded(SOURCES)
        .with_rows("road_points_koeln_center", 48_000)
        .with_rows("road_segments_slope_koeln_center", 47_500)
}

#[tokio::test]
async fn both_stages_run_in_order() {
    let ref region = koeln();
    let executor = executor(store());
    let results = executor.run(&StageSpec::standard(), Some(region)).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].stage, "extract_points");
    assert_eq!(results[0].rows, 48_000);
    assert_eq!(results[1].outputs, vec!["road_segments_slope_koeln_center"]);
    assert!(executor.store().tables().contains("road_segments_slope_koeln_center"));
    assert!(!executor.store().in_transaction());
}

#[tokio::test]
async fn rerun_is_idempotent() {
    let ref region = koeln();
    let ref specs = StageSpec::standard();
    let executor = executor(store());
    let first = executor.run(specs, Some(region)).await.unwrap();
    let second = executor.run(specs, Some(region)).await.unwrap();
    let rows = |rs: &[StageResult]| rs.iter().map(|r| r.rows).collect::<Vec<_>>();
    assert_eq!(rows(&first), rows(&second));
}

#[tokio::test]
async fn second_stage_alone_is_missing_its_input() {
    let ref region = koeln();
    let executor = executor(store());
    let result = executor
        .run(&[StageSpec::derive_segment_slopes()], Some(region))
        .await;
    match result {
        Err(Error::StoreExecution { stage, source, .. }) => {
            assert_eq!(stage, "derive_segment_slopes");
            assert!(matches!(source, StoreError::MissingInput(ref t) if t == "road_points_koeln_center"));
        }
        other => panic!("expected store execution error, got {:?}", other),
    }
    assert!(!executor.store().tables().contains("road_segments_slope_koeln_center"));
}

#[tokio::test]
async fn reversed_stages_are_out_of_order() {
    let ref region = koeln();
    let executor = executor(store());
    let reversed = vec![StageSpec::derive_segment_slopes(), StageSpec::extract_points()];
    assert!(matches!(
        executor.run(&reversed, Some(region)).await,
        Err(Error::OutOfOrder { .. })
    ));
    assert!(executor.store().statements().is_empty());
}

#[tokio::test]
async fn failure_rolls_back_and_halts() {
    let ref region = koeln();
    let executor = executor(store());
    executor.store().failing_on("ST_MakeLine");
    let result = executor.run(&StageSpec::standard(), Some(region)).await;
    match result {
        Err(Error::StoreExecution { stage, params, .. }) => {
            assert_eq!(stage, "derive_segment_slopes");
            assert!(params.contains("crs=25832"));
        }
        other => panic!("expected store execution error, got {:?}", other),
    }
    let tables = executor.store().tables();
    assert!(tables.contains("road_points_koeln_center"));
    assert!(!tables.contains("road_segments_slope_koeln_center"));
    assert!(!executor.store().in_transaction());
}

#[tokio::test]
async fn failed_rerun_keeps_previous_output() {
    let ref region = koeln();
    let ref specs = StageSpec::standard();
    let executor = executor(store());
    executor.run(specs, Some(region)).await.unwrap();
    executor.store().failing_on("ANALYZE");
    assert!(executor.run(specs, Some(region)).await.is_err());
    assert!(executor.store().tables().contains("road_segments_slope_koeln_center"));
}

#[tokio::test]
async fn region_values_travel_as_parameters() {
    let ref region = koeln();
    let executor = executor(store());
    executor.run(&[StageSpec::extract_points()], Some(region)).await.unwrap();
    let statements = executor.store().statements();
    let (sql, params) = statements
        .iter()
        .find(|(sql, _)| sql.starts_with("CREATE TABLE road_points_koeln_center"))
        .unwrap();
    assert!(sql.contains("ST_MakeEnvelope($1, $2, $3, $4, $5)"));
    assert!(!sql.contains("352218"));
    assert!(params.contains(&Bound::Float(region.bbox().min_x)));
    assert!(params.contains(&Bound::Int(25832)));
}

#[tokio::test]
async fn drop_precedes_create_inside_the_transaction() {
    let ref region = koeln();
    let executor = executor(store());
    executor.run(&[StageSpec::extract_points()], Some(region)).await.unwrap();
    let statements = executor.store().statements();
    assert_eq!(statements[1].0, "DROP TABLE IF EXISTS road_points_koeln_center");
}

#[tokio::test]
async fn stage_timeout_is_enforced_by_the_server() {
    let ref region = koeln();
    let executor = executor(store());
    executor.run(&StageSpec::standard(), Some(region)).await.unwrap();
    let statements = executor.store().statements();
    let timeouts = statements
        .iter()
        .filter(|(sql, _)| sql == "SET LOCAL statement_timeout = 5000")
        .count();
    assert_eq!(timeouts, 2);
    assert_eq!(statements[0].0, "SET LOCAL statement_timeout = 5000");
}

#[tokio::test]
async fn hostile_region_name_is_rejected_before_execution() {
    let region = Region::new("x; DROP TABLE dtm", 0., 0., 1000., 1000., 25832);
    let executor = executor(store());
    assert!(matches!(
        executor.run(&StageSpec::standard(), Some(&region)).await,
        Err(Error::SanitizationRejected { .. })
    ));
    assert!(executor.store().statements().is_empty());
    assert!(executor.store().tables().contains(DTM));
}

#[tokio::test]
async fn regional_stage_without_region_is_rejected() {
    let executor = executor(store());
    assert!(matches!(
        executor.run(&StageSpec::standard(), None).await,
        Err(Error::RegionRequired { .. })
    ));
}

#[tokio::test]
async fn missing_template_is_reported() {
    let executor = executor(store());
    let spec = StageSpec::new("ghost", "99_does_not_exist");
    assert!(matches!(
        executor.run(&[spec], Some(&koeln())).await,
        Err(Error::TemplateNotFound(_))
    ));
}

#[tokio::test]
async fn custom_stage_from_catalog() {
    let catalog = Catalog::embedded().with(
        "03_summary",
        "CREATE TABLE summary_{{name_area}} AS SELECT count(*) FROM road_segments_slope_{{name_area}} WHERE slope_pct > :threshold;",
    );
    let executor = Executor::new(store(), catalog, Duration::from_secs(5), false);
    let mut specs = StageSpec::standard();
    specs.push(
        StageSpec::new("summarize", "03_summary")
            .reads(SEGMENTS)
            .writes("summary_{{name_area}}")
            .bind("threshold", 10.0),
    );
    let results = executor.run(&specs, Some(&koeln())).await.unwrap();
    assert_eq!(results.len(), 3);
    assert!(executor.store().tables().contains("summary_koeln_center"));
}

#[tokio::test]
async fn slow_stage_times_out_and_rolls_back() {
    let executor = Executor::new(
        store().delayed(Duration::from_millis(200)),
        Catalog::embedded(),
        Duration::from_millis(50),
        false,
    );
    match executor.run(&StageSpec::standard(), Some(&koeln())).await {
        Err(Error::StoreExecution { source, .. }) => {
            assert!(matches!(source, StoreError::Timeout(_)))
        }
        other => panic!("expected timeout, got {:?}", other),
    }
    assert!(!executor.store().in_transaction());
    assert!(!executor.store().tables().contains("road_points_koeln_center"));
}

#[tokio::test]
async fn advisory_lock_is_released_after_failure() {
    let ref region = koeln();
    let executor = executor(store());
    executor.store().failing_on("ST_MakeLine");
    assert!(executor.run(&StageSpec::standard(), Some(region)).await.is_err());
    // a held lock would make the store refuse the next run outright
    executor.store().failing_on("never matches");
    assert!(executor.run(&StageSpec::standard(), Some(region)).await.is_ok());
}
