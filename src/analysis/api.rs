use super::*;
use crate::config::Config;
use crate::database::Check;
use crate::database::Source;
use crate::pipeline::DTM;
use crate::pipeline::Identifier;
use crate::pipeline::ROADS;
use crate::pipeline::points_table;
use crate::pipeline::segments_table;
use crate::region::*;
use crate::slope::*;
use crate::transform::Transformer;
use crate::transform::transform_bbox;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_postgres::Client;

/// Region, slope and raster queries shared by the REPL and the HTTP server.
pub struct API {
    client: Arc<Client>,
    registry: RwLock<Registry>,
    transformer: Transformer,
}

impl API {
    pub fn new(client: Arc<Client>, config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            client,
            registry: RwLock::new(Registry::seeded(config)?),
            transformer: Transformer::try_from(config)?,
        })
    }

    pub async fn regions(&self) -> anyhow::Result<Vec<RegionInfo>> {
        let registry = self.registry.read().await;
        registry.regions().map(|r| self.describe(r)).collect()
    }
    pub async fn region(&self, name: Option<&str>) -> anyhow::Result<Region> {
        Ok(self.registry.read().await.resolve(name)?.clone())
    }
    pub async fn area(&self, name: Option<&str>) -> anyhow::Result<f64> {
        Ok(self.region(name).await?.area_km2())
    }
    pub async fn draw(
        &self,
        name: &str,
        ring: &[(f64, f64)],
        mode: Envelope,
    ) -> anyhow::Result<RegionInfo> {
        let region = self
            .registry
            .write()
            .await
            .draw(name, ring, &self.transformer, mode)?;
        log::info!("registered drawn region {}", region);
        self.describe(&region)
    }
    pub fn legend(&self) -> Vec<Entry> {
        legend()
    }

    pub async fn summary(
        &self,
        name: Option<&str>,
        range: Option<SlopeRange>,
    ) -> anyhow::Result<(Corrected, Summary)> {
        let ref area = self.identifier(name).await?;
        let baseline = self.client.summary(area, SlopeRange::all()).await?;
        let corrected = correct(range, &baseline);
        let summary = self.client.summary(area, corrected.range).await?;
        Ok((corrected, summary))
    }
    pub async fn layers(
        &self,
        name: Option<&str>,
        range: SlopeRange,
    ) -> anyhow::Result<BTreeMap<Category, serde_json::Value>> {
        let ref area = self.identifier(name).await?;
        Ok(self
            .client
            .layers(area, range, self.transformer.display())
            .await?)
    }
    /// Statistics, category layers and histogram for one region, with the
    /// requested range corrected the way the dashboard does.
    pub async fn overview(
        &self,
        name: Option<&str>,
        range: Option<SlopeRange>,
    ) -> anyhow::Result<Overview> {
        let region = self.region(name).await?;
        let ref area = Identifier::sanitize(region.name())?;
        let baseline = self.client.summary(area, SlopeRange::all()).await?;
        let corrected = correct(range, &baseline);
        let (summary, layers, slopes) = futures::try_join!(
            self.client.summary(area, corrected.range),
            self.client.layers(area, corrected.range, self.transformer.display()),
            self.client.slopes(area, corrected.range),
        )?;
        Ok(Overview {
            region: region.name().to_string(),
            baseline,
            range: corrected,
            summary,
            layers: features(&layers),
            histogram: Histogram::new(&slopes, corrected.range, BINS),
        })
    }
    /// Classifies and merges segments locally instead of in the store.
    /// Returns the FeatureCollection with the statistics it was built from.
    pub async fn export(
        &self,
        name: Option<&str>,
        range: SlopeRange,
    ) -> anyhow::Result<(serde_json::Value, Summary, Histogram)> {
        let ref area = self.identifier(name).await?;
        let segments = self
            .client
            .segments(area, range, self.transformer.display())
            .await?;
        log::debug!("classifying {} segments of {}", segments.len(), area);
        let summary = summary_statistics(&segments, range)?;
        let histogram = histogram(&segments, range);
        Ok((features(&aggregate(&segments)), summary, histogram))
    }
    pub async fn extent(&self) -> anyhow::Result<Extent> {
        let working = self.client.extent().await?;
        let ref tiles = Region::from_bbox(DTM, working, self.transformer.working());
        Ok(Extent {
            working,
            display: transform_bbox(tiles, self.transformer.display())?,
            coverage: self.client.coverage(self.transformer.display()).await?,
        })
    }
    /// Logs a table of source and pipeline tables for the region.
    pub async fn status(&self, name: Option<&str>) -> anyhow::Result<()> {
        let ref area = self.identifier(name).await?;
        let tables = vec![
            DTM.to_string(),
            ROADS.to_string(),
            points_table(area),
            segments_table(area),
        ];
        self.client.status(&tables).await;
        Ok(())
    }

    async fn identifier(&self, name: Option<&str>) -> anyhow::Result<Identifier> {
        let region = self.region(name).await?;
        Ok(Identifier::sanitize(region.name())?)
    }
    fn describe(&self, region: &Region) -> anyhow::Result<RegionInfo> {
        Ok(RegionInfo {
            region: region.clone(),
            area_km2: region.area_km2(),
            display: transform_bbox(region, self.transformer.display())?,
        })
    }
}
