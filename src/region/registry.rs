use super::*;
use crate::config::Config;
use crate::error::Error;
use crate::error::Result;
use crate::pipeline::Identifier;
use crate::transform::Crs;
use crate::transform::Transformer;
use std::collections::BTreeMap;
use std::path::Path;

/// Named regions eligible for pipeline runs.
///
/// Everything registered here is expressed in the working CRS and fits the
/// configured area ceiling.
#[derive(Debug, Clone)]
pub struct Registry {
    working_crs: u32,
    max_area_km2: f64,
    default_region: String,
    regions: BTreeMap<String, Region>,
}

impl Registry {
    /// An empty registry bound to the configured policy.
    pub fn new(config: &Config) -> Self {
        Self {
            working_crs: config.working_crs,
            max_area_km2: config.max_area_km2,
            default_region: config.default_region.clone(),
            regions: BTreeMap::new(),
        }
    }

    /// Built-in regions plus whatever the configured regions file declares.
    pub fn seeded(config: &Config) -> Result<Self> {
        let mut registry = Self::new(config);
        for region in builtin() {
            registry.register(region)?;
        }
        if let Some(ref path) = config.regions_file {
            let n = registry.load(path)?;
            log::info!("loaded {} regions from {}", n, path.display());
        }
        Ok(registry)
    }

    pub fn validate(&self, region: &Region) -> Result<()> {
        let name = region.name();
        let bbox = region.bbox();
        Identifier::sanitize(name)?;
        if !bbox.is_finite() {
            return Err(Error::validation(name, "non-finite extent"));
        }
        if bbox.min_x >= bbox.max_x || bbox.min_y >= bbox.max_y {
            return Err(Error::validation(name, "extent must satisfy min < max on both axes"));
        }
        if !Crs::try_from(region.crs())?.is_projected() {
            return Err(Error::validation(
                name,
                format!("EPSG:{} has angular units", region.crs()),
            ));
        }
        if region.crs() != self.working_crs {
            return Err(Error::validation(
                name,
                format!(
                    "EPSG:{} is not the working CRS EPSG:{}",
                    region.crs(),
                    self.working_crs
                ),
            ));
        }
        let area = region.area_km2();
        if area > self.max_area_km2 {
            return Err(Error::AreaExceeded {
                name: name.to_string(),
                area,
                max: self.max_area_km2,
            });
        }
        Ok(())
    }

    /// Names that sanitize to the same identifier would share output tables
    /// and lock keys, so only the first of them is accepted.
    pub fn register(&mut self, region: Region) -> Result<()> {
        self.validate(&region)?;
        if self.regions.contains_key(region.name()) {
            return Err(Error::validation(region.name(), "already registered"));
        }
        let ref identifier = Identifier::sanitize(region.name())?;
        if let Some(other) = self
            .regions
            .keys()
            .find(|name| Identifier::sanitize(name).ok().as_ref() == Some(identifier))
        {
            return Err(Error::validation(
                region.name(),
                format!("shares the identifier {} with region {}", identifier, other),
            ));
        }
        log::debug!("registered region {}", region);
        self.regions.insert(region.name().to_string(), region);
        Ok(())
    }

    /// Derives a region from a ring drawn in the display CRS and registers it.
    pub fn draw(
        &mut self,
        name: &str,
        ring: &[(f64, f64)],
        transformer: &Transformer,
        mode: Envelope,
    ) -> Result<Region> {
        let region = derive(name, ring, transformer, mode)?;
        self.register(region.clone())?;
        Ok(region)
    }

    pub fn get(&self, name: &str) -> Result<&Region> {
        self.regions
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("region {}", name)))
    }

    pub fn default_region(&self) -> Result<&Region> {
        self.get(&self.default_region)
    }

    /// The named region, or the configured default when no name is given.
    pub fn resolve(&self, name: Option<&str>) -> Result<&Region> {
        match name {
            Some(name) => self.get(name),
            None => self.default_region(),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    pub fn max_area_km2(&self) -> f64 {
        self.max_area_km2
    }

    /// Registers every entry of a JSON object shaped
    /// `{"name": {"minx": .., "miny": .., "maxx": .., "maxy": .., "crs": ..}}`.
    pub fn load(&mut self, path: &Path) -> Result<usize> {
        #[derive(serde::Deserialize)]
        struct Entry {
            #[serde(flatten)]
            bbox: Bbox,
            crs: u32,
        }
        let text = std::fs::read_to_string(path)?;
        let entries = serde_json::from_str::<BTreeMap<String, Entry>>(&text)?;
        let n = entries.len();
        for (name, entry) in entries {
            self.register(Region::from_bbox(&name, entry.bbox, entry.crs))?;
        }
        Ok(n)
    }
}
