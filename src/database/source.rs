use crate::error::Error;
use crate::error::Result;
use crate::pipeline::DTM;
use crate::pipeline::Identifier;
use crate::pipeline::segments_table;
use crate::region::Bbox;
use crate::slope::*;
use const_format::concatcp;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_postgres::Client;

/// Finite slopes inside the inclusive range `[$1, $2]`.
/// NaN sorts above infinity in PostgreSQL, so the upper bound excludes it too.
#[rustfmt::skip]
const FILTER: &str = concatcp!(
    "WHERE  slope_pct >  '-Infinity'::float8 ",
    "AND    slope_pct <  'Infinity'::float8 ",
    "AND    slope_pct BETWEEN $1 AND $2"
);

/// Read interface over the per-region slope tables and the DTM.
/// Every SELECT the analysis surfaces issue lives here.
#[async_trait::async_trait]
pub trait Source: Send + Sync {
    async fn summary(&self, area: &Identifier, range: SlopeRange) -> Result<Summary>;
    async fn segments(&self, area: &Identifier, range: SlopeRange, crs: u32) -> Result<Vec<Segment>>;
    async fn layers(&self, area: &Identifier, range: SlopeRange, crs: u32) -> Result<BTreeMap<Category, Value>>;
    async fn slopes(&self, area: &Identifier, range: SlopeRange) -> Result<Vec<f64>>;
    async fn extent(&self) -> Result<Bbox>;
    async fn coverage(&self, crs: u32) -> Result<Value>;
}

#[rustfmt::skip]
#[async_trait::async_trait]
impl Source for Client {
    async fn summary(&self, area: &Identifier, range: SlopeRange) -> Result<Summary> {
        range.check()?;
        let sql = format!(
            concat!(
                "SELECT COUNT(slope_pct), ",
                       "COUNT(DISTINCT fid), ",
                       "MIN(slope_pct), ",
                       "MAX(slope_pct), ",
                       "AVG(slope_pct), ",
                       "PERCENTILE_CONT(0.5) WITHIN GROUP (ORDER BY slope_pct) ",
                "FROM   {t} ",
                "{filter}"
            ),
            t = segments_table(area),
            filter = FILTER
        );
        let row = self.query_one(&sql, &[&range.min, &range.max]).await?;
        let count = row.get::<_, i64>(0);
        if count == 0 {
            return Err(Error::NotFound(format!("segments of {} with slope in {}", area, range)));
        }
        Ok(Summary {
            count_segments:       count as u64,
            count_distinct_roads: row.get::<_, i64>(1) as u64,
            min:                  row.get::<_, f64>(2),
            max:                  row.get::<_, f64>(3),
            mean:                 row.get::<_, f64>(4),
            median:               row.get::<_, f64>(5),
        })
    }
    async fn segments(&self, area: &Identifier, range: SlopeRange, crs: u32) -> Result<Vec<Segment>> {
        range.check()?;
        let sql = format!(
            concat!(
                "SELECT fid, ",
                       "ST_AsGeoJSON(ST_Transform(segment_geom, $3)), ",
                       "slope_pct ",
                "FROM   {t} ",
                "{filter}"
            ),
            t = segments_table(area),
            filter = FILTER
        );
        self.query(&sql, &[&range.min, &range.max, &(crs as i32)])
            .await?
            .into_iter()
            .map(|row| {
                Ok::<_, Error>(Segment::new(
                    row.get::<_, i64>(0),
                    serde_json::from_str(row.get::<_, &str>(1))?,
                    row.get::<_, Option<f64>>(2),
                ))
            })
            .collect()
    }
    async fn layers(&self, area: &Identifier, range: SlopeRange, crs: u32) -> Result<BTreeMap<Category, Value>> {
        range.check()?;
        let sql = format!(
            concat!(
                "SELECT   category, ",
                         "ST_AsGeoJSON(ST_Transform(ST_Collect(segment_geom), $3)) ",
                "FROM     (SELECT {case} AS category, segment_geom FROM {t} {filter}) s ",
                "WHERE    category IS NOT NULL ",
                "GROUP BY category"
            ),
            case = CASE,
            t = segments_table(area),
            filter = FILTER
        );
        self.query(&sql, &[&range.min, &range.max, &(crs as i32)])
            .await?
            .into_iter()
            .map(|row| {
                let category = row.get::<_, &str>(0).parse::<Category>()?;
                let geometry = serde_json::from_str::<Value>(row.get::<_, &str>(1))?;
                Ok::<_, Error>((category, geometry))
            })
            .collect()
    }
    async fn slopes(&self, area: &Identifier, range: SlopeRange) -> Result<Vec<f64>> {
        range.check()?;
        let sql = format!(
            concat!(
                "SELECT slope_pct ",
                "FROM   {t} ",
                "{filter}"
            ),
            t = segments_table(area),
            filter = FILTER
        );
        Ok(self
            .query(&sql, &[&range.min, &range.max])
            .await?
            .iter()
            .map(|row| row.get::<_, f64>(0))
            .collect())
    }
    async fn extent(&self) -> Result<Bbox> {
        const SQL: &str = concatcp!(
            "SELECT ST_XMin(e), ST_YMin(e), ST_XMax(e), ST_YMax(e) ",
            "FROM   (SELECT ST_Extent(ST_Envelope(rast)) AS e FROM ", DTM, ") x"
        );
        let row = self.query_one(SQL, &[]).await?;
        match (
            row.get::<_, Option<f64>>(0),
            row.get::<_, Option<f64>>(1),
            row.get::<_, Option<f64>>(2),
            row.get::<_, Option<f64>>(3),
        ) {
            (Some(min_x), Some(min_y), Some(max_x), Some(max_y)) => Ok(Bbox::new(min_x, min_y, max_x, max_y)),
            _ => Err(Error::NotFound(format!("raster tiles in {}", DTM))),
        }
    }
    async fn coverage(&self, crs: u32) -> Result<Value> {
        const SQL: &str = concatcp!(
            "SELECT ST_AsGeoJSON(ST_Transform(ST_Union(ST_Envelope(rast)), $1)) ",
            "FROM   ", DTM, " ",
            "WHERE  NOT ST_BandIsNoData(rast)"
        );
        match self.query_one(SQL, &[&(crs as i32)]).await?.get::<_, Option<&str>>(0) {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Err(Error::NotFound(format!("raster coverage in {}", DTM))),
        }
    }
}

#[async_trait::async_trait]
impl Source for Arc<Client> {
    async fn summary(&self, area: &Identifier, range: SlopeRange) -> Result<Summary> {
        self.as_ref().summary(area, range).await
    }
    async fn segments(&self, area: &Identifier, range: SlopeRange, crs: u32) -> Result<Vec<Segment>> {
        self.as_ref().segments(area, range, crs).await
    }
    async fn layers(&self, area: &Identifier, range: SlopeRange, crs: u32) -> Result<BTreeMap<Category, Value>> {
        self.as_ref().layers(area, range, crs).await
    }
    async fn slopes(&self, area: &Identifier, range: SlopeRange) -> Result<Vec<f64>> {
        self.as_ref().slopes(area, range).await
    }
    async fn extent(&self) -> Result<Bbox> {
        self.as_ref().extent().await
    }
    async fn coverage(&self, crs: u32) -> Result<Value> {
        self.as_ref().coverage(crs).await
    }
}
