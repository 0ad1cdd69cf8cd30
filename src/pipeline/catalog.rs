use super::*;
use crate::error::Error;
use crate::error::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[rustfmt::skip]
const EMBEDDED: &[(&str, &str)] = &[
    ("01_extract_points_window",       include_str!("../../queries/01_extract_points_window.sql")),
    ("02_create_segment_slopes_table", include_str!("../../queries/02_create_segment_slopes_table.sql")),
];

/// Where stage templates come from.
///
/// Lookup order: templates added with [`Catalog::with`], then
/// `<dir>/<name>.sql`, then the copies compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    dir: Option<PathBuf>,
    extra: BTreeMap<String, String>,
}

impl Catalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            extra: BTreeMap::new(),
        }
    }
    pub fn embedded() -> Self {
        Self::default()
    }
    pub fn with(mut self, name: &str, text: &str) -> Self {
        self.extra.insert(name.to_string(), text.to_string());
        self
    }

    pub fn source(&self, name: &str) -> Result<String> {
        let missing = || Error::TemplateNotFound(name.to_string());
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(missing());
        }
        if let Some(text) = self.extra.get(name) {
            return Ok(text.clone());
        }
        if let Some(ref dir) = self.dir {
            let path = dir.join(format!("{}.sql", name));
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    log::debug!("loaded template {} from {}", name, path.display());
                    return Ok(text);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        EMBEDDED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, text)| text.to_string())
            .ok_or_else(missing)
    }

    pub fn load(&self, name: &str) -> Result<Template> {
        Template::parse(name, &self.source(name)?)
    }
}

impl From<&crate::config::Config> for Catalog {
    fn from(config: &crate::config::Config) -> Self {
        Self::new(&config.queries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_templates_are_embedded() {
        let ref catalog = Catalog::embedded();
        for spec in StageSpec::standard() {
            let template = catalog.load(&spec.template).unwrap();
            assert!(template.structural().contains("name_area"));
        }
        let extract = catalog.load("01_extract_points_window").unwrap();
        let bound = extract.bound();
        for name in ["minx", "miny", "maxx", "maxy", "crs", "spacing"] {
            assert!(bound.contains(name), "{} not bound", name);
        }
    }

    #[test]
    fn vertices_sample_a_single_tile() {
        let ref catalog = Catalog::embedded();
        let ref sql = catalog.source("01_extract_points_window").unwrap();
        assert!(sql.contains("LEFT JOIN LATERAL"));
        assert!(sql.contains("LIMIT 1"));
        assert!(sql.contains("CREATE UNIQUE INDEX ON road_points_{{name_area}} (fid, part, seq)"));
        assert!(!sql.contains("LEFT JOIN dtm"));
    }

    #[test]
    fn unknown_or_pathlike_names_are_not_found() {
        let ref catalog = Catalog::new("/nonexistent");
        assert!(matches!(catalog.load("03_missing"), Err(Error::TemplateNotFound(_))));
        assert!(matches!(catalog.load("../etc/passwd"), Err(Error::TemplateNotFound(_))));
        assert!(matches!(catalog.load(""), Err(Error::TemplateNotFound(_))));
    }

    #[test]
    fn directory_shadows_embedded() {
        let dir = std::env::temp_dir().join("roadslope-catalog-test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("01_extract_points_window.sql"), "SELECT 1").unwrap();
        let ref catalog = Catalog::new(&dir);
        assert_eq!(catalog.source("01_extract_points_window").unwrap(), "SELECT 1");
        assert!(catalog.source("02_create_segment_slopes_table").unwrap().contains("slope_pct"));
        std::fs::remove_dir_all(dir).ok();
    }
}
