use super::*;
use crate::error::Error;
use crate::error::Result;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Structural placeholders a template may use. Each fills an identifier
/// position and is only ever resolved from a sanitized [`Identifier`].
pub const STRUCTURAL: &[&str] = &["name_area"];

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Sql(String),
    Structural(String),
    Bound(String),
    End,
}

/// One statement of a rendered template: positional SQL plus the
/// parameter name standing behind each `$n`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub names: Vec<String>,
}

/// A parsed SQL template.
///
/// `{{name}}` marks a structural placeholder, `:name` a bound one. Quoted
/// literals, quoted identifiers, dollar-quoted bodies and `::` casts pass
/// through untouched; comments are dropped so they cannot hide a separator.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    text: String,
    pieces: Vec<Piece>,
}

impl Template {
    pub fn parse(name: &str, text: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            text: text.to_string(),
            pieces: scan(name, text)?,
        })
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn structural(&self) -> BTreeSet<&str> {
        self.pieces
            .iter()
            .filter_map(|p| match p {
                Piece::Structural(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
    pub fn bound(&self) -> BTreeSet<&str> {
        self.pieces
            .iter()
            .filter_map(|p| match p {
                Piece::Bound(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Substitutes structural values and numbers bound placeholders per statement.
    /// Empty statements are skipped.
    pub fn render(
        &self,
        stage: &str,
        structural: &BTreeMap<String, Identifier>,
    ) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();
        let mut sql = String::new();
        let mut names = Vec::<String>::new();
        for piece in self.pieces.iter() {
            match piece {
                Piece::Sql(text) => sql.push_str(text),
                Piece::Structural(name) => sql.push_str(resolve(stage, name, structural)?.as_str()),
                Piece::Bound(name) => {
                    let n = match names.iter().position(|x| x == name) {
                        Some(i) => i + 1,
                        None => {
                            names.push(name.clone());
                            names.len()
                        }
                    };
                    sql.push('$');
                    sql.push_str(&n.to_string());
                }
                Piece::End => {
                    if !sql.trim().is_empty() {
                        statements.push(Statement {
                            sql: sql.trim().to_string(),
                            names: std::mem::take(&mut names),
                        });
                    }
                    sql.clear();
                    names.clear();
                }
            }
        }
        if !sql.trim().is_empty() {
            statements.push(Statement {
                sql: sql.trim().to_string(),
                names,
            });
        }
        Ok(statements)
    }
}

/// Renders a table name pattern such as `road_points_{{name_area}}`.
pub fn table(
    stage: &str,
    pattern: &str,
    structural: &BTreeMap<String, Identifier>,
) -> Result<String> {
    let mut name = String::new();
    for piece in scan(stage, pattern)? {
        match piece {
            Piece::Sql(text) => name.push_str(&text),
            Piece::Structural(key) => name.push_str(resolve(stage, &key, structural)?.as_str()),
            Piece::Bound(key) => {
                return Err(Error::UnknownPlaceholder {
                    stage: stage.to_string(),
                    name: format!(":{}", key),
                });
            }
            Piece::End => return Err(Error::validation(pattern, "table pattern contains ';'")),
        }
    }
    Ok(name.trim().to_string())
}

fn resolve<'a>(
    stage: &str,
    name: &str,
    structural: &'a BTreeMap<String, Identifier>,
) -> Result<&'a Identifier> {
    if !STRUCTURAL.contains(&name) {
        return Err(Error::UnknownPlaceholder {
            stage: stage.to_string(),
            name: name.to_string(),
        });
    }
    structural.get(name).ok_or_else(|| Error::RegionRequired {
        stage: stage.to_string(),
    })
}

fn scan(stage: &str, text: &str) -> Result<Vec<Piece>> {
    let chars = text.chars().collect::<Vec<_>>();
    let mut pieces = Vec::new();
    let mut sql = String::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match (c, next) {
            ('-', Some('-')) => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            ('/', Some('*')) => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
                sql.push(' ');
            }
            ('\'', _) | ('"', _) => {
                let end = closing(&chars, i + 1, c);
                sql.extend(&chars[i..end]);
                i = end;
            }
            ('$', _) => {
                let end = dollar(&chars, i).unwrap_or(i + 1);
                sql.extend(&chars[i..end]);
                i = end;
            }
            (':', Some(':')) => {
                sql.push_str("::");
                i += 2;
            }
            (':', Some(n)) if n.is_ascii_alphabetic() || n == '_' => {
                let end = word(&chars, i + 1);
                flush(&mut sql, &mut pieces);
                pieces.push(Piece::Bound(chars[i + 1..end].iter().collect()));
                i = end;
            }
            ('{', Some('{')) => {
                let end = (i + 2..chars.len().saturating_sub(1))
                    .find(|&j| chars[j] == '}' && chars[j + 1] == '}')
                    .ok_or_else(|| Error::UnknownPlaceholder {
                        stage: stage.to_string(),
                        name: chars[i..].iter().collect::<String>().trim().to_string(),
                    })?;
                flush(&mut sql, &mut pieces);
                let name = chars[i + 2..end].iter().collect::<String>();
                pieces.push(Piece::Structural(name.trim().to_string()));
                i = end + 2;
            }
            (';', _) => {
                flush(&mut sql, &mut pieces);
                pieces.push(Piece::End);
                i += 1;
            }
            _ => {
                sql.push(c);
                i += 1;
            }
        }
    }
    flush(&mut sql, &mut pieces);
    Ok(pieces)
}

fn flush(sql: &mut String, pieces: &mut Vec<Piece>) {
    if !sql.is_empty() {
        pieces.push(Piece::Sql(std::mem::take(sql)));
    }
}

fn word(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
        i += 1;
    }
    i
}

/// Index just past the closing quote. Doubled quotes are escapes.
fn closing(chars: &[char], mut i: usize, quote: char) -> usize {
    while i < chars.len() {
        if chars[i] == quote {
            if chars.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    chars.len()
}

/// Index just past a `$tag$ .. $tag$` body starting at `i`, if one starts there.
fn dollar(chars: &[char], i: usize) -> Option<usize> {
    if chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }
    let open = word(chars, i + 1);
    if chars.get(open) != Some(&'$') {
        return None;
    }
    let tag = &chars[i..=open];
    let body = open + 1;
    let close = (body..chars.len())
        .find(|&j| chars[j..].starts_with(tag))
        .map(|j| j + tag.len())
        .unwrap_or(chars.len());
    Some(close)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(name: &str) -> BTreeMap<String, Identifier> {
        let mut map = BTreeMap::new();
        map.insert("name_area".to_string(), Identifier::sanitize(name).unwrap());
        map
    }

    #[test]
    fn structural_and_bound_channels_separate() {
        let ref template = Template::parse(
            "t",
            "CREATE TABLE pts_{{name_area}} AS SELECT * FROM dtm WHERE ST_Intersects(rast, ST_MakeEnvelope(:minx, :miny, :maxx, :maxy, :crs));",
        )
        .unwrap();
        let statements = template.render("s", &area("my area-1")).unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0].sql,
            "CREATE TABLE pts_my_area_1 AS SELECT * FROM dtm WHERE ST_Intersects(rast, ST_MakeEnvelope($1, $2, $3, $4, $5))"
        );
        assert_eq!(statements[0].names, vec!["minx", "miny", "maxx", "maxy", "crs"]);
    }

    #[test]
    fn parameters_number_per_statement_and_repeat() {
        let ref template =
            Template::parse("t", "SELECT :a, :b, :a; SELECT :b").unwrap();
        let statements = template.render("s", &BTreeMap::new()).unwrap();
        assert_eq!(statements[0].sql, "SELECT $1, $2, $1");
        assert_eq!(statements[0].names, vec!["a", "b"]);
        assert_eq!(statements[1].sql, "SELECT $1");
        assert_eq!(statements[1].names, vec!["b"]);
    }

    #[test]
    fn casts_literals_and_comments_are_not_placeholders() {
        let ref template = Template::parse(
            "t",
            "SELECT slope::float8, ':fake', \"col:x\" -- :gone ; {{nope}}\n/* :also; */ FROM t WHERE x = :real",
        )
        .unwrap();
        let statements = template.render("s", &BTreeMap::new()).unwrap();
        assert_eq!(statements.len(), 1);
        assert!(statements[0].sql.starts_with("SELECT slope::float8, ':fake', \"col:x\""));
        assert!(statements[0].sql.ends_with("WHERE x = $1"));
        assert_eq!(statements[0].names, vec!["real"]);
    }

    #[test]
    fn dollar_quoted_bodies_pass_through() {
        let ref template =
            Template::parse("t", "DO $$ BEGIN PERFORM 1; x := :y; END $$; SELECT $1").unwrap();
        let statements = template.render("s", &BTreeMap::new()).unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].sql, "DO $$ BEGIN PERFORM 1; x := :y; END $$");
        assert!(statements[0].names.is_empty());
        assert_eq!(statements[1].sql, "SELECT $1");
    }

    #[test]
    fn placeholders_outside_allow_list_are_rejected() {
        let ref template = Template::parse("t", "DROP TABLE {{table}}").unwrap();
        assert!(matches!(
            template.render("s", &area("x")),
            Err(Error::UnknownPlaceholder { .. })
        ));
        assert!(matches!(
            Template::parse("t", "SELECT {{name_area"),
            Err(Error::UnknownPlaceholder { .. })
        ));
    }

    #[test]
    fn structural_placeholder_without_region_needs_one() {
        let ref template = Template::parse("t", "SELECT * FROM pts_{{ name_area }}").unwrap();
        assert!(matches!(
            template.render("s", &BTreeMap::new()),
            Err(Error::RegionRequired { .. })
        ));
        assert_eq!(template.structural().into_iter().collect::<Vec<_>>(), vec!["name_area"]);
    }

    #[test]
    fn table_patterns_render() {
        assert_eq!(
            table("s", "road_points_{{name_area}}", &area("koeln_center")).unwrap(),
            "road_points_koeln_center"
        );
        assert_eq!(table("s", "dtm", &BTreeMap::new()).unwrap(), "dtm");
        assert!(table("s", "t_:x", &BTreeMap::new()).is_err());
    }
}
