//! Typed WKT entry points, one per geometry kind.
//!
//! Each `unmarshal_*` function parses with [`crate::de::unmarshal`] and then
//! checks the kind, failing with [`Error::Conversion`] on a mismatch.

use crate::{
    de,
    error::{Error, Result},
    geometry::{
        Collection, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
        Polygon,
    },
    ser::ToWkt,
};

/// Returns the WKT text of any value the serializer knows, including
/// [`Ring`](crate::geometry::Ring) and [`Bound`](crate::geometry::Bound).
#[must_use]
pub fn marshal_string<G: ToWkt + ?Sized>(geometry: &G) -> String {
    geometry.to_wkt()
}

/// # Errors
///
/// Fails if the text does not parse.
pub fn unmarshal(text: &str) -> Result<Geometry> {
    de::unmarshal(text)
}

/// Parses `text` and converts the result to `T`.
///
/// # Errors
///
/// Fails if the text does not parse, or with [`Error::Conversion`] if it holds
/// a different kind of geometry.
pub fn unmarshal_as<T>(text: &str) -> Result<T>
where
    T: TryFrom<Geometry, Error = Error>,
{
    T::try_from(de::unmarshal(text)?)
}

/// # Errors
///
/// See [`unmarshal_as`].
pub fn unmarshal_point(text: &str) -> Result<Point> {
    unmarshal_as(text)
}

/// # Errors
///
/// See [`unmarshal_as`].
pub fn unmarshal_multi_point(text: &str) -> Result<MultiPoint> {
    unmarshal_as(text)
}

/// # Errors
///
/// See [`unmarshal_as`].
pub fn unmarshal_line_string(text: &str) -> Result<LineString> {
    unmarshal_as(text)
}

/// # Errors
///
/// See [`unmarshal_as`].
pub fn unmarshal_multi_line_string(text: &str) -> Result<MultiLineString> {
    unmarshal_as(text)
}

/// # Errors
///
/// See [`unmarshal_as`].
pub fn unmarshal_polygon(text: &str) -> Result<Polygon> {
    unmarshal_as(text)
}

/// # Errors
///
/// See [`unmarshal_as`].
pub fn unmarshal_multi_polygon(text: &str) -> Result<MultiPolygon> {
    unmarshal_as(text)
}

/// # Errors
///
/// See [`unmarshal_as`].
pub fn unmarshal_collection(text: &str) -> Result<Collection> {
    unmarshal_as(text)
}
