use const_format::concatcp;
use serde::Deserialize;
use serde::Serialize;

/// Discrete slope buckets keyed by inclusive upper bounds in percent.
/// Boundary values fall into the lower bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Flat,
    Gentle,
    Moderate,
    Steep,
    VerySteep,
}

#[rustfmt::skip]
impl Category {
    pub const ALL: [Self; 5] = [Self::Flat, Self::Gentle, Self::Moderate, Self::Steep, Self::VerySteep];

    pub const fn upper(&self) -> Option<f64> {
        match self {
            Self::Flat      => Some(1.),
            Self::Gentle    => Some(3.),
            Self::Moderate  => Some(6.),
            Self::Steep     => Some(10.),
            Self::VerySteep => None,
        }
    }
    pub const fn lower(&self) -> f64 {
        match self {
            Self::Flat      => 0.,
            Self::Gentle    => 1.,
            Self::Moderate  => 3.,
            Self::Steep     => 6.,
            Self::VerySteep => 10.,
        }
    }
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Flat      => "flat",
            Self::Gentle    => "gentle",
            Self::Moderate  => "moderate",
            Self::Steep     => "steep",
            Self::VerySteep => "very_steep",
        }
    }
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Flat      => "Flat (0-1%)",
            Self::Gentle    => "Gentle (1-3%)",
            Self::Moderate  => "Moderate (3-6%)",
            Self::Steep     => "Steep (6-10%)",
            Self::VerySteep => "Very Steep (>10%)",
        }
    }
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Flat      => "#00ff00",
            Self::Gentle    => "#ffff00",
            Self::Moderate  => "#ffa500",
            Self::Steep     => "#982d80",
            Self::VerySteep => "#ff0000",
        }
    }
}

impl Category {
    /// `None` for NaN and negative slopes, which have no bucket.
    pub fn classify(slope_pct: f64) -> Option<Self> {
        if slope_pct.is_nan() || slope_pct < 0. {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|c| c.upper().is_none_or(|upper| slope_pct <= upper))
    }
}

pub fn classify(slope_pct: f64) -> Option<Category> {
    Category::classify(slope_pct)
}

impl std::str::FromStr for Category {
    type Err = crate::error::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| crate::error::Error::NotFound(format!("slope category {}", s)))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The same partition as [`Category::classify`], evaluated by the store.
/// Yields category keys; NULL, NaN and negative slopes yield NULL.
#[rustfmt::skip]
pub const CASE: &str = concatcp!(
    "CASE ",
    "WHEN slope_pct IS NULL OR slope_pct = 'NaN'::float8 OR slope_pct < 0 THEN NULL ",
    "WHEN slope_pct <= 1  THEN '", "flat",       "' ",
    "WHEN slope_pct <= 3  THEN '", "gentle",     "' ",
    "WHEN slope_pct <= 6  THEN '", "moderate",   "' ",
    "WHEN slope_pct <= 10 THEN '", "steep",      "' ",
    "ELSE '",                      "very_steep", "' ",
    "END"
);

/// One legend row for the visualization layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub category: Category,
    pub label: &'static str,
    pub color: &'static str,
    pub lower: f64,
    pub upper: Option<f64>,
}

pub fn legend() -> Vec<Entry> {
    Category::ALL
        .into_iter()
        .map(|category| Entry {
            category,
            label: category.label(),
            color: category.color(),
            lower: category.lower(),
            upper: category.upper(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_fall_into_lower_bucket() {
        assert_eq!(classify(0.), Some(Category::Flat));
        assert_eq!(classify(1.), Some(Category::Flat));
        assert_eq!(classify(1.0001), Some(Category::Gentle));
        assert_eq!(classify(3.), Some(Category::Gentle));
        assert_eq!(classify(6.), Some(Category::Moderate));
        assert_eq!(classify(10.), Some(Category::Steep));
        assert_eq!(classify(10.0001), Some(Category::VerySteep));
        assert_eq!(classify(f64::INFINITY), Some(Category::VerySteep));
    }

    #[test]
    fn nan_and_negative_have_no_bucket() {
        assert_eq!(classify(f64::NAN), None);
        assert_eq!(classify(-0.5), None);
    }

    #[test]
    fn classification_is_monotone() {
        let mut previous = Category::Flat;
        for i in 0..=2000 {
            let category = classify(i as f64 / 100.).unwrap();
            assert!(category >= previous);
            previous = category;
        }
        assert_eq!(previous, Category::VerySteep);
    }

    #[test]
    fn buckets_are_contiguous() {
        for pair in Category::ALL.windows(2) {
            assert_eq!(pair[0].upper(), Some(pair[1].lower()));
        }
    }

    #[test]
    fn legend_matches_dashboard() {
        let legend = legend();
        assert_eq!(legend.len(), 5);
        assert_eq!(legend[0].label, "Flat (0-1%)");
        assert_eq!(legend[3].color, "#982d80");
        assert_eq!(legend[4].upper, None);
    }

    #[test]
    fn keys_round_trip_through_sql_case() {
        for category in Category::ALL {
            assert!(CASE.contains(&format!("'{}'", category.key())));
            assert_eq!(category.key().parse::<Category>().unwrap(), category);
        }
    }
}
