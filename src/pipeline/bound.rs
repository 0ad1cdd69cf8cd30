use crate::region::Region;
use std::collections::BTreeMap;
use std::fmt;

/// A value travelling through the driver's parameter channel.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Bound {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for Bound {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}
impl From<i32> for Bound {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}
impl From<u32> for Bound {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}
impl From<f64> for Bound {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}
impl From<&str> for Bound {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}
impl From<String> for Bound {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(v) => write!(f, "{:?}", v),
        }
    }
}

/// Integers widen or narrow to whatever the server inferred for the placeholder,
/// so `ST_MakeEnvelope(.., :crs)` binds an int4 without a cast in the template.
#[cfg(feature = "database")]
impl tokio_postgres::types::ToSql for Bound {
    fn to_sql(
        &self,
        ty: &tokio_postgres::types::Type,
        out: &mut bytes::BytesMut,
    ) -> Result<tokio_postgres::types::IsNull, Box<dyn std::error::Error + Sync + Send>> {
        use tokio_postgres::types::Type;
        match self {
            Self::Int(v) if *ty == Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
            Self::Int(v) if *ty == Type::INT4 => i32::try_from(*v)?.to_sql(ty, out),
            Self::Int(v) if *ty == Type::INT8 => v.to_sql(ty, out),
            Self::Int(v) if *ty == Type::FLOAT4 => (*v as f32).to_sql(ty, out),
            Self::Int(v) if *ty == Type::FLOAT8 => (*v as f64).to_sql(ty, out),
            Self::Float(v) if *ty == Type::FLOAT4 => (*v as f32).to_sql(ty, out),
            Self::Float(v) if *ty == Type::FLOAT8 => v.to_sql(ty, out),
            Self::Text(v) if <&str as tokio_postgres::types::ToSql>::accepts(ty) => {
                v.as_str().to_sql(ty, out)
            }
            v => Err(format!("cannot bind {} as {}", v, ty).into()),
        }
    }
    fn accepts(ty: &tokio_postgres::types::Type) -> bool {
        use tokio_postgres::types::Type;
        [
            Type::INT2,
            Type::INT4,
            Type::INT8,
            Type::FLOAT4,
            Type::FLOAT8,
        ]
        .contains(ty)
            || <&str as tokio_postgres::types::ToSql>::accepts(ty)
    }
    tokio_postgres::types::to_sql_checked!();
}

/// Named values for the parameter channel of one stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings(BTreeMap<String, Bound>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with(mut self, name: &str, value: impl Into<Bound>) -> Self {
        self.set(name, value);
        self
    }
    pub fn set(&mut self, name: &str, value: impl Into<Bound>) {
        self.0.insert(name.to_string(), value.into());
    }
    pub fn get(&self, name: &str) -> Option<&Bound> {
        self.0.get(name)
    }
    pub fn merge(&mut self, other: &Bindings) {
        self.0
            .extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bound)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The region's extent and SRID as value parameters.
/// The name is deliberately absent: it only ever reaches SQL as an identifier.
impl From<&Region> for Bindings {
    fn from(region: &Region) -> Self {
        let bbox = region.bbox();
        Self::new()
            .with("minx", bbox.min_x)
            .with("miny", bbox.min_y)
            .with("maxx", bbox.max_x)
            .with("maxy", bbox.max_y)
            .with("crs", region.crs())
    }
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs = self
            .0
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{{{}}}", pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_binds_extent_but_not_name() {
        let region = Region::new("koeln_center", 1., 2., 3., 4., 25832);
        let bindings = Bindings::from(&region);
        assert_eq!(bindings.get("minx"), Some(&Bound::Float(1.)));
        assert_eq!(bindings.get("crs"), Some(&Bound::Int(25832)));
        assert_eq!(bindings.get("name_area"), None);
        assert_eq!(bindings.len(), 5);
    }

    #[test]
    fn display_lists_parameters_in_order() {
        let bindings = Bindings::new().with("b", 2i64).with("a", "x");
        assert_eq!(bindings.to_string(), "{a=\"x\", b=2}");
    }
}
