use crate::error::Error;
use crate::error::Result;

/// Longest accepted value. Leaves room for table prefixes and index suffixes
/// inside PostgreSQL's 63 byte identifier limit.
pub const MAX_IDENTIFIER: usize = 40;

/// A value safe to splice into an identifier position of a statement.
///
/// Hyphens and spaces normalize to underscores and letters fold to lowercase,
/// matching how PostgreSQL folds unquoted names. Anything else outside
/// `[A-Za-z0-9_]` is rejected outright, never repaired.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    pub fn sanitize(raw: &str) -> Result<Self> {
        let reject = |reason| {
            Err(Error::SanitizationRejected {
                value: raw.to_string(),
                reason,
            })
        };
        if raw.trim().is_empty() {
            return reject("empty");
        }
        if raw.contains("--") {
            return reject("contains comment marker");
        }
        if raw.contains(';') {
            return reject("contains statement separator");
        }
        let normalized = raw
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect::<String>();
        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return reject("contains characters outside [A-Za-z0-9_]");
        }
        if normalized.len() > MAX_IDENTIFIER {
            return reject("too long");
        }
        Ok(Self(normalized))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Identifier {
    type Error = Error;
    fn try_from(raw: &str) -> Result<Self> {
        Self::sanitize(raw)
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
