//! Extended WKT: WKT with an optional `SRID=<n>;` prefix.
//!
//! Text without a prefix has SRID `0`. The prefix is matched
//! case-insensitively and the SRID must fit in an `i32`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::{
    de,
    error::{Error, Result},
    geometry::{
        Collection, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
        Polygon,
    },
    ser::ToWkt,
};

/// Captures everything up to the first `;` so that a bad value is reported as
/// [`Error::InvalidSrid`] rather than as unknown WKT. A signed value such as
/// `SRID=-1;` is accepted, matching [`marshal_string`], which writes any `i32`.
static SRID_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^SRID=([^;]*);").expect("SRID pattern is valid"));

/// A geometry together with its spatial reference identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ewkt {
    pub srid: i32,
    pub geometry: Geometry,
}

impl Ewkt {
    #[must_use]
    pub fn new(geometry: impl Into<Geometry>, srid: i32) -> Self {
        Self {
            srid,
            geometry: geometry.into(),
        }
    }
}

impl fmt::Display for Ewkt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SRID={};", self.srid)?;
        self.geometry.write_wkt(f)
    }
}

impl FromStr for Ewkt {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (geometry, srid) = unmarshal(s)?;
        Ok(Self { srid, geometry })
    }
}

/// Splits EWKT text into its upper-cased WKT part and SRID.
///
/// # Errors
///
/// Returns [`Error::InvalidSrid`] if the prefix is present but its value is not an `i32`.
/// An explicit sign is allowed.
pub fn split_ewkt(text: &str) -> Result<(String, i32)> {
    let text = text.trim();
    let Some(captures) = SRID_PREFIX.captures(text) else {
        return Ok((text.to_ascii_uppercase(), 0));
    };

    let digits = &captures[1];
    let srid = digits.parse().map_err(|source| Error::InvalidSrid {
        text: digits.to_string(),
        source,
    })?;
    trace!(srid, "stripped SRID prefix");

    Ok((text[captures[0].len()..].to_ascii_uppercase(), srid))
}

/// Returns `SRID=<srid>;` followed by the WKT text of `geometry`.
#[must_use]
pub fn marshal_string<G: ToWkt + ?Sized>(geometry: &G, srid: i32) -> String {
    let mut out = format!("SRID={srid};");
    // writing to a String never fails
    let _ = geometry.write_wkt(&mut out);
    out
}

/// Parses EWKT text into a geometry and its SRID.
///
/// # Errors
///
/// Fails with [`Error::InvalidSrid`] for a bad prefix, otherwise as
/// [`de::unmarshal`] does.
pub fn unmarshal(text: &str) -> Result<(Geometry, i32)> {
    let (wkt, srid) = split_ewkt(text)?;
    Ok((de::unmarshal(&wkt)?, srid))
}

/// Parses EWKT text and converts the geometry to `T`.
///
/// # Errors
///
/// Fails as [`unmarshal`] does, or with [`Error::Conversion`] if the text
/// holds a different kind of geometry.
pub fn unmarshal_as<T>(text: &str) -> Result<(T, i32)>
where
    T: TryFrom<Geometry, Error = Error>,
{
    let (geometry, srid) = unmarshal(text)?;
    Ok((T::try_from(geometry)?, srid))
}

/// # Errors
///
/// See [`unmarshal_as`].
pub fn unmarshal_point(text: &str) -> Result<(Point, i32)> {
    unmarshal_as(text)
}

/// # Errors
///
/// See [`unmarshal_as`].
pub fn unmarshal_multi_point(text: &str) -> Result<(MultiPoint, i32)> {
    unmarshal_as(text)
}

/// # Errors
///
/// See [`unmarshal_as`].
pub fn unmarshal_line_string(text: &str) -> Result<(LineString, i32)> {
    unmarshal_as(text)
}

/// # Errors
///
/// See [`unmarshal_as`].
pub fn unmarshal_multi_line_string(text: &str) -> Result<(MultiLineString, i32)> {
    unmarshal_as(text)
}

/// # Errors
///
/// See [`unmarshal_as`].
pub fn unmarshal_polygon(text: &str) -> Result<(Polygon, i32)> {
    unmarshal_as(text)
}

/// # Errors
///
/// See [`unmarshal_as`].
pub fn unmarshal_multi_polygon(text: &str) -> Result<(MultiPolygon, i32)> {
    unmarshal_as(text)
}

/// # Errors
///
/// See [`unmarshal_as`].
pub fn unmarshal_collection(text: &str) -> Result<(Collection, i32)> {
    unmarshal_as(text)
}
