//! Reading WKT text into [`Geometry`] values.
//!
//! The entry point is [`unmarshal`]. Keywords are matched case-insensitively
//! against the leading run of letters, so `MULTIPOINT` can never be taken for
//! `POINT`. Nested lists are split on top-level commas by bracket depth.

use std::fmt;
use std::str::FromStr;

use serde::de;
use tracing::{debug, trace};

use crate::{
    error::{Error, GeometryKind, Result},
    ewkt::Ewkt,
    geometry::{
        Collection, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
        Polygon, Ring,
    },
};

const EMPTY: &str = "EMPTY";

/// Parses a WKT string into a geometry.
///
/// # Errors
///
/// Returns [`Error::UnsupportedGeometry`] when no keyword is recognized, and
/// [`Error::Unmarshal`] wrapping the cause for malformed bodies.
pub fn unmarshal(text: &str) -> Result<Geometry> {
    parse_geometry(&text.trim().to_ascii_uppercase())
}

/// Parses an already trimmed, upper-case geometry expression.
fn parse_geometry(text: &str) -> Result<Geometry> {
    let split = text
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    let (keyword, body) = text.split_at(split);
    let kind = GeometryKind::from_keyword(keyword)
        .ok_or_else(|| Error::UnsupportedGeometry(text.to_string()))?;
    trace!(%kind, "dispatching geometry");

    let body = body.trim();
    if body == EMPTY {
        return empty_geometry(kind);
    }

    parse_body(kind, body).map_err(|source| Error::unmarshal(kind, source))
}

fn empty_geometry(kind: GeometryKind) -> Result<Geometry> {
    let geometry: Geometry = match kind {
        GeometryKind::Point => return Err(Error::unmarshal(kind, Error::EmptyPoint)),
        GeometryKind::MultiPoint => MultiPoint::default().into(),
        GeometryKind::LineString => LineString::default().into(),
        GeometryKind::MultiLineString => MultiLineString::default().into(),
        GeometryKind::Polygon => Polygon::default().into(),
        GeometryKind::MultiPolygon => MultiPolygon::default().into(),
        GeometryKind::GeometryCollection => Collection::default().into(),
    };
    Ok(geometry)
}

fn parse_body(kind: GeometryKind, body: &str) -> Result<Geometry> {
    if body.is_empty() {
        return Err(Error::MissingBody(kind));
    }
    let inner = trim_brackets(body);

    let geometry: Geometry = match kind {
        GeometryKind::Point => parse_coordinate(inner)?.into(),
        GeometryKind::MultiPoint => split_top_level(inner)?
            .into_iter()
            .map(|p| parse_coordinate(trim_brackets(p)))
            .collect::<Result<MultiPoint>>()?
            .into(),
        GeometryKind::LineString => parse_points(inner)?.into_iter().collect::<LineString>().into(),
        GeometryKind::MultiLineString => split_top_level(inner)?
            .into_iter()
            .map(|l| nested(l, |s| Ok(parse_points(s)?.into_iter().collect::<LineString>())))
            .collect::<Result<MultiLineString>>()?
            .into(),
        GeometryKind::Polygon => parse_rings(inner)?.into(),
        GeometryKind::MultiPolygon => split_top_level(inner)?
            .into_iter()
            .map(|p| nested(p, parse_rings))
            .collect::<Result<MultiPolygon>>()?
            .into(),
        GeometryKind::GeometryCollection => parse_collection(body)?.into(),
    };
    Ok(geometry)
}

/// Parses one bracketed member of a list, where `EMPTY` stands for an empty member.
/// Any other member must be wrapped in its own pair of brackets.
fn nested<T: Default>(member: &str, parse: impl Fn(&str) -> Result<T>) -> Result<T> {
    let member = member.trim();
    if member == EMPTY {
        return Ok(T::default());
    }
    let inner = member
        .strip_prefix('(')
        .and_then(|m| m.strip_suffix(')'))
        .ok_or_else(|| Error::UnbalancedBrackets(member.to_string()))?;
    parse(inner.trim())
}

fn parse_points(text: &str) -> Result<Vec<Point>> {
    text.split(',')
        .map(|p| parse_coordinate(trim_brackets(p)))
        .collect()
}

fn parse_rings(text: &str) -> Result<Polygon> {
    split_top_level(text)?
        .into_iter()
        .map(|r| nested(r, |s| Ok(parse_points(s)?.into_iter().collect::<Ring>())))
        .collect()
}

fn parse_collection(body: &str) -> Result<Collection> {
    let members = split_collection(body)?;
    let mut collection = Vec::with_capacity(members.len());
    for (index, member) in members.into_iter().enumerate() {
        let geometry = parse_geometry(member).map_err(|source| {
            debug!(index, member, "collection member failed to parse");
            Error::CollectionMember {
                index,
                source: Box::new(source),
            }
        })?;
        collection.push(geometry);
    }
    Ok(Collection(collection))
}

/// Parses `"x y"` into a point. Both tokens must be finite numbers separated
/// by a single space.
///
/// # Errors
///
/// Returns [`Error::MalformedCoordinate`] if there are not exactly two tokens
/// or either one is not a finite number.
pub fn parse_coordinate(text: &str) -> Result<Point> {
    let malformed = |source| Error::MalformedCoordinate {
        text: text.to_string(),
        source,
    };

    let mut tokens = text.trim().split(' ');
    let (Some(x), Some(y), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(malformed(None));
    };

    let x: f64 = x.parse().map_err(|err| malformed(Some(err)))?;
    let y: f64 = y.parse().map_err(|err| malformed(Some(err)))?;
    if !x.is_finite() || !y.is_finite() {
        return Err(malformed(None));
    }
    Ok(Point::new(x, y))
}

/// Trims whitespace, then at most one leading `(` and one trailing `)`, then
/// whitespace again. The two brackets are removed independently of each other.
#[must_use]
pub fn trim_brackets(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix('(').unwrap_or(text);
    let text = text.strip_suffix(')').unwrap_or(text);
    text.trim()
}

/// Splits `text` on commas that are not nested inside brackets.
///
/// # Errors
///
/// Returns [`Error::UnbalancedBrackets`] if a `)` has no matching `(` or a
/// `(` is never closed.
pub fn split_top_level(text: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| Error::UnbalancedBrackets(text.to_string()))?;
            }
            ',' if depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(Error::UnbalancedBrackets(text.to_string()));
    }
    parts.push(text[start..].trim());
    Ok(parts)
}

/// Splits the bracketed body of a `GEOMETRYCOLLECTION` into its member
/// expressions by bracket depth.
///
/// # Errors
///
/// Returns [`Error::UnbalancedBrackets`] if the body is not wrapped in one
/// balanced pair of brackets.
pub fn split_collection(body: &str) -> Result<Vec<&str>> {
    let body = body.trim();
    let inner = body
        .strip_prefix('(')
        .and_then(|b| b.strip_suffix(')'))
        .ok_or_else(|| Error::UnbalancedBrackets(body.to_string()))?;
    split_top_level(inner)
}

/// The letter-triggered collection splitter kept for compatibility checks.
///
/// Once the current member has opened a bracket, any upper-case letter starts
/// the next member and the character before it (the separating comma) is
/// dropped. The last character of the body (its closing bracket) is dropped
/// too. Empty members are returned as empty strings. This breaks on inputs
/// such as exponents (`1E5`) inside a member; [`split_collection`] does not.
#[must_use]
pub fn split_collection_legacy(body: &str) -> Vec<String> {
    let mut members = Vec::new();
    let mut current = String::new();
    let last = body.chars().count().saturating_sub(1);

    for (i, c) in body.chars().enumerate() {
        if !current.contains('(') {
            current.push(c);
            continue;
        }
        if c.is_ascii_uppercase() {
            current.pop();
            members.push(std::mem::take(&mut current));
            current.push(c);
            continue;
        }
        if i == last {
            members.push(std::mem::take(&mut current));
            continue;
        }
        current.push(c);
    }
    members
}

impl FromStr for Geometry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        unmarshal(s)
    }
}

struct TextVisitor<T>(std::marker::PhantomData<T>);

impl<T> de::Visitor<'_> for TextVisitor<T>
where
    T: FromStr<Err = Error>,
{
    type Value = T;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a WKT or EWKT string")
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<T, E>
    where
        E: de::Error,
    {
        v.parse().map_err(E::custom)
    }
}

impl<'de> de::Deserialize<'de> for Geometry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_str(TextVisitor(std::marker::PhantomData))
    }
}

impl<'de> de::Deserialize<'de> for Ewkt {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_str(TextVisitor(std::marker::PhantomData))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use serde::Deserialize;

    fn ring(points: &[(f64, f64)]) -> Ring {
        Ring::from(points.to_vec())
    }

    fn line(points: &[(f64, f64)]) -> LineString {
        LineString::from(points.to_vec())
    }

    #[test]
    fn test_trim_brackets() {
        let cases = [
            ("(1 2)", "1 2"),
            ("((1 2),(0.5 1.5))", "(1 2),(0.5 1.5)"),
            ("(1 2,0.5 1.5)", "1 2,0.5 1.5"),
            ("((1 2,3 4),(5 6,7 8))", "(1 2,3 4),(5 6,7 8)"),
            (
                "(((1 2,3 4)),((5 6,7 8),(1 2,5 4)))",
                "((1 2,3 4)),((5 6,7 8),(1 2,5 4))",
            ),
            ("  ( 1 2 )  ", "1 2"),
            ("1 2)", "1 2"),
            ("(1 2", "1 2"),
            ("", ""),
        ];

        for (input, expected) in cases {
            assert_eq!(trim_brackets(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn test_parse_coordinate() -> anyhow::Result<()> {
        let point = parse_coordinate("1.34 2.35")?;
        assert_relative_eq!(point.x, 1.34);
        assert_relative_eq!(point.y, 2.35);

        let point = parse_coordinate(" -1E3 +2.5e-1 ")?;
        assert_relative_eq!(point.x, -1000.0);
        assert_relative_eq!(point.y, 0.25);

        for bad in ["1", "1 2 3", "1  2", "A 2", "1 B", "NAN 1", "1 INF", ""] {
            let err = parse_coordinate(bad).unwrap_err();
            assert!(
                matches!(err, Error::MalformedCoordinate { .. }),
                "input: {bad:?}"
            );
        }
        Ok(())
    }

    #[test]
    fn test_split_top_level() -> anyhow::Result<()> {
        assert_eq!(
            split_top_level("(1 2,3 4), (5 6,7 8)")?,
            vec!["(1 2,3 4)", "(5 6,7 8)"]
        );
        assert_eq!(
            split_top_level("((1 2,3 4)),((5 6,7 8),(1 2,5 4))")?,
            vec!["((1 2,3 4))", "((5 6,7 8),(1 2,5 4))"]
        );
        assert_eq!(split_top_level("1 2")?, vec!["1 2"]);
        assert!(matches!(
            split_top_level("(1 2))"),
            Err(Error::UnbalancedBrackets(_))
        ));
        assert!(matches!(
            split_top_level("((1 2)"),
            Err(Error::UnbalancedBrackets(_))
        ));
        Ok(())
    }

    #[test]
    fn test_split_collection() -> anyhow::Result<()> {
        let members = split_collection("(POINT(1 2),LINESTRING(3 4,5 6))")?;
        assert_eq!(members, vec!["POINT(1 2)", "LINESTRING(3 4,5 6)"]);

        let members = split_collection(
            "(GEOMETRYCOLLECTION(POINT(1 2),POINT(3 4)),POINT EMPTY, POINT(1E5 2))",
        )?;
        assert_eq!(
            members,
            vec![
                "GEOMETRYCOLLECTION(POINT(1 2),POINT(3 4))",
                "POINT EMPTY",
                "POINT(1E5 2)"
            ]
        );

        assert!(split_collection("(POINT(1 2)").is_err());
        assert!(split_collection("POINT(1 2)").is_err());
        Ok(())
    }

    #[test]
    fn test_split_collection_legacy() {
        let members = split_collection_legacy("(POINT(1 2),LINESTRING(3 4,5 6))");
        assert_eq!(members, vec!["", "POINT(1 2)", "LINESTRING(3 4,5 6)"]);

        // an exponent is mistaken for the next keyword and the tail is lost
        let members = split_collection_legacy("(POINT(1E5 2))");
        assert_eq!(members, vec!["", "POINT("]);

        // Z is a boundary like every other upper-case letter
        let members = split_collection_legacy("(POINT(1 2),ZPOINT(3 4))");
        assert_eq!(members, vec!["", "POINT(1 2)", "ZPOINT(3 4)"]);
    }

    #[test]
    fn test_unmarshal_point() -> anyhow::Result<()> {
        assert_eq!(unmarshal("POINT(1 2)")?, Geometry::Point(Point::new(1.0, 2.0)));
        assert_eq!(unmarshal("point(1 2)")?, unmarshal("POINT(1 2)")?);
        assert_eq!(
            unmarshal("  Point (1.34 2.35) ")?,
            Geometry::Point(Point::new(1.34, 2.35))
        );
        Ok(())
    }

    #[test]
    fn test_unmarshal_empty() -> anyhow::Result<()> {
        assert_eq!(unmarshal("MULTIPOINT EMPTY")?, Geometry::from(MultiPoint::default()));
        assert_eq!(unmarshal("linestring empty")?, Geometry::from(LineString::default()));
        assert_eq!(
            unmarshal("MULTILINESTRING EMPTY")?,
            Geometry::from(MultiLineString::default())
        );
        assert_eq!(unmarshal("POLYGON EMPTY")?, Geometry::from(Polygon::default()));
        assert_eq!(unmarshal("MULTIPOLYGON EMPTY")?, Geometry::from(MultiPolygon::default()));
        assert_eq!(
            unmarshal("GEOMETRYCOLLECTION EMPTY")?,
            Geometry::from(Collection::default())
        );

        let err = unmarshal("POINT EMPTY").unwrap_err();
        assert!(matches!(err.root_cause(), Error::EmptyPoint));
        Ok(())
    }

    #[test]
    fn test_unmarshal_multipoint() -> anyhow::Result<()> {
        let expected: Geometry = MultiPoint::from(vec![(1.0, 2.0), (0.5, 1.5)]).into();
        assert_eq!(unmarshal("MULTIPOINT((1 2),(0.5 1.5))")?, expected);
        assert_eq!(unmarshal("MULTIPOINT(1 2,0.5 1.5)")?, expected);
        Ok(())
    }

    #[test]
    fn test_unmarshal_linestring() -> anyhow::Result<()> {
        assert_eq!(
            unmarshal("LINESTRING(1 2,0.5 1.5)")?,
            Geometry::from(line(&[(1.0, 2.0), (0.5, 1.5)]))
        );
        assert_eq!(
            unmarshal("LINESTRING(0 0, 1 1, 2 0)")?,
            Geometry::from(line(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]))
        );
        Ok(())
    }

    #[test]
    fn test_unmarshal_multilinestring() -> anyhow::Result<()> {
        let expected = MultiLineString::from(vec![
            line(&[(1.0, 2.0), (3.0, 4.0)]),
            line(&[(5.0, 6.0), (7.0, 8.0)]),
        ]);
        assert_eq!(
            unmarshal("MULTILINESTRING((1 2,3 4),(5 6,7 8))")?,
            Geometry::from(expected)
        );

        let with_empty = MultiLineString::from(vec![line(&[(1.0, 2.0)]), LineString::default()]);
        assert_eq!(
            unmarshal("MULTILINESTRING((1 2),EMPTY)")?,
            Geometry::from(with_empty)
        );
        Ok(())
    }

    #[test]
    fn test_unmarshal_polygon() -> anyhow::Result<()> {
        let single = Polygon::from(vec![ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)])]);
        assert_eq!(unmarshal("POLYGON((0 0,1 0,1 1,0 0))")?, Geometry::from(single));

        let holes = Polygon::from(vec![
            ring(&[(1.0, 2.0), (3.0, 4.0)]),
            ring(&[(5.0, 6.0), (7.0, 8.0)]),
        ]);
        assert_eq!(unmarshal("POLYGON((1 2,3 4),(5 6,7 8))")?, Geometry::from(holes.clone()));
        assert_eq!(unmarshal("POLYGON((1 2, 3 4), (5 6, 7 8))")?, Geometry::from(holes));
        Ok(())
    }

    #[test]
    fn test_unmarshal_multipolygon() -> anyhow::Result<()> {
        let expected = MultiPolygon::from(vec![
            Polygon::from(vec![ring(&[(1.0, 2.0), (3.0, 4.0)])]),
            Polygon::from(vec![
                ring(&[(5.0, 6.0), (7.0, 8.0)]),
                ring(&[(1.0, 2.0), (5.0, 4.0)]),
            ]),
        ]);
        assert_eq!(
            unmarshal("MULTIPOLYGON(((1 2,3 4)),((5 6,7 8),(1 2,5 4)))")?,
            Geometry::from(expected)
        );
        Ok(())
    }

    #[test]
    fn test_unmarshal_collection() -> anyhow::Result<()> {
        let expected = Collection::from(vec![
            Geometry::from(Point::new(1.0, 2.0)),
            Geometry::from(line(&[(3.0, 4.0), (5.0, 6.0)])),
        ]);
        assert_eq!(
            unmarshal("GEOMETRYCOLLECTION(POINT(1 2),LINESTRING(3 4,5 6))")?,
            Geometry::from(expected)
        );

        let nested = unmarshal(
            "GEOMETRYCOLLECTION(GEOMETRYCOLLECTION(POINT(1 2)),GEOMETRYCOLLECTION EMPTY,\
             MULTIPOLYGON(((1 2,3 4)),((5 6,7 8),(1 2,5 4))))",
        )?;
        let Geometry::Collection(members) = nested else {
            panic!("Expected Collection geometry");
        };
        assert_eq!(members.len(), 3);
        assert_eq!(
            members.0[0],
            Geometry::from(Collection::from(vec![Geometry::from(Point::new(1.0, 2.0))]))
        );
        assert_eq!(members.0[1], Geometry::from(Collection::default()));
        assert!(matches!(members.0[2], Geometry::MultiPolygon(ref m) if m.len() == 2));
        Ok(())
    }

    #[test]
    fn test_unmarshal_collection_member_error() {
        let err = unmarshal("GEOMETRYCOLLECTION(POINT(1 2),POINT(1))").unwrap_err();
        let Error::Unmarshal { kind, source } = &err else {
            panic!("Expected Unmarshal error, got {err:?}");
        };
        assert_eq!(*kind, GeometryKind::GeometryCollection);
        assert!(matches!(**source, Error::CollectionMember { index: 1, .. }));
        assert!(matches!(err.root_cause(), Error::MalformedCoordinate { .. }));
    }

    #[test]
    fn test_unmarshal_collection_missing_bracket() {
        // the closing bracket of the collection is missing
        let err = unmarshal(
            "GEOMETRYCOLLECTION(POINT(1 2),LINESTRING(3 4,5 6),\
             MULTIPOLYGON(((1 2,3 4)),((5 6,7 8),(1 2,5 4)))",
        )
        .unwrap_err();
        assert!(matches!(err.root_cause(), Error::UnbalancedBrackets(_)));

        let err = unmarshal("GEOMETRYCOLLECTION(POINT(1 2),)").unwrap_err();
        assert!(matches!(err.root_cause(), Error::UnsupportedGeometry(_)));
    }

    #[test]
    fn test_unmarshal_errors() {
        let err = unmarshal("POINT(1)").unwrap_err();
        assert!(matches!(
            err,
            Error::Unmarshal {
                kind: GeometryKind::Point,
                ..
            }
        ));
        assert!(matches!(err.root_cause(), Error::MalformedCoordinate { .. }));

        let err = unmarshal("LINESTRING(1 2,3 x)").unwrap_err();
        assert!(matches!(
            err,
            Error::Unmarshal {
                kind: GeometryKind::LineString,
                ..
            }
        ));

        for unsupported in ["CIRCULARSTRING(1 2,3 4)", "", "(1 2)", "POINTS(1 2)"] {
            let err = unmarshal(unsupported).unwrap_err();
            assert!(
                matches!(err, Error::UnsupportedGeometry(_)),
                "input: {unsupported:?}"
            );
        }

        assert!(unmarshal("POLYGON((1 2,3 4)").is_err());
    }

    #[test]
    fn test_unmarshal_missing_body() {
        for (text, expected) in [
            ("POINT", GeometryKind::Point),
            ("linestring ", GeometryKind::LineString),
            ("GEOMETRYCOLLECTION", GeometryKind::GeometryCollection),
        ] {
            let err = unmarshal(text).unwrap_err();
            assert!(
                matches!(err, Error::Unmarshal { kind, .. } if kind == expected),
                "input: {text:?}"
            );
            assert!(
                matches!(err.root_cause(), Error::MissingBody(kind) if *kind == expected),
                "input: {text:?}"
            );
        }
    }

    #[test]
    fn test_unmarshal_unbracketed_members() {
        for (text, kind) in [
            ("POLYGON(1 2,3 4)", GeometryKind::Polygon),
            ("MULTILINESTRING(1 2,3 4)", GeometryKind::MultiLineString),
            ("MULTIPOLYGON((1 2,3 4))", GeometryKind::MultiPolygon),
            ("MULTIPOLYGON((1 2,3 4),(5 6,7 8))", GeometryKind::MultiPolygon),
        ] {
            let err = unmarshal(text).unwrap_err();
            assert!(
                matches!(err, Error::Unmarshal { kind: k, .. } if k == kind),
                "input: {text:?}"
            );
            assert!(
                matches!(err.root_cause(), Error::UnbalancedBrackets(_)),
                "input: {text:?}"
            );
        }

        // bracketed members still parse, EMPTY needs no brackets
        assert!(unmarshal("POLYGON((1 2,3 4),EMPTY)").is_ok());
        assert!(unmarshal("MULTIPOLYGON(((1 2,3 4)),EMPTY)").is_ok());
    }

    #[test]
    fn test_from_str() -> anyhow::Result<()> {
        let geometry: Geometry = "POINT(1 2)".parse()?;
        assert_eq!(geometry, Geometry::Point(Point::new(1.0, 2.0)));
        Ok(())
    }

    #[test]
    fn test_deserialize() -> anyhow::Result<()> {
        #[derive(Debug, Deserialize)]
        struct Place {
            name: String,
            geometry: Geometry,
            location: Ewkt,
        }

        let json = r#"{
            "name": "Berlin",
            "geometry": "POINT(13.4 52.5)",
            "location": "SRID=4326;POINT(13.4 52.5)"
        }"#;
        let place: Place = serde_json::from_str(json)?;

        assert_eq!(place.name, "Berlin");
        assert_eq!(place.geometry, Geometry::Point(Point::new(13.4, 52.5)));
        assert_eq!(place.location.srid, 4326);
        assert_eq!(place.location.geometry, place.geometry);

        let bad = serde_json::from_str::<Place>(
            r#"{"name": "x", "geometry": "POINT(1)", "location": "POINT(1 2)"}"#,
        );
        assert!(bad.is_err());
        Ok(())
    }
}
