//! The geometry values the codec reads and writes.
//!
//! Containers keep insertion order and perform no validation: rings are not
//! required to be closed and any container may be empty. Conversions to and
//! from [`geo`] types are provided for interop; note that `geo::Polygon`
//! closes its rings on construction, so converting an unclosed [`Polygon`]
//! into `geo` is not lossless.

use crate::error::{Error, GeometryKind};

/// A single `(x, y)` coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

macro_rules! sequence_type {
    ($(#[$meta:meta])* $name:ident, $item:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct $name(pub Vec<$item>);

        impl $name {
            #[must_use]
            pub fn new(items: Vec<$item>) -> Self {
                Self(items)
            }

            #[must_use]
            pub fn len(&self) -> usize {
                self.0.len()
            }

            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn iter(&self) -> std::slice::Iter<'_, $item> {
                self.0.iter()
            }
        }

        impl<T: Into<$item>> From<Vec<T>> for $name {
            fn from(items: Vec<T>) -> Self {
                Self(items.into_iter().map(Into::into).collect())
            }
        }

        impl FromIterator<$item> for $name {
            fn from_iter<I: IntoIterator<Item = $item>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a $item;
            type IntoIter = std::slice::Iter<'a, $item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }
    };
}

sequence_type!(
    /// An ordered set of points.
    MultiPoint,
    Point
);
sequence_type!(
    /// A path through its points, in order.
    LineString,
    Point
);
sequence_type!(
    /// A conventionally closed path. Closure is not checked.
    Ring,
    Point
);
sequence_type!(MultiLineString, LineString);
sequence_type!(
    /// The first ring is the exterior, the rest are holes.
    Polygon,
    Ring
);
sequence_type!(MultiPolygon, Polygon);
sequence_type!(
    /// A heterogeneous, possibly nested, list of geometries.
    Collection,
    Geometry
);

/// An axis-aligned box. Written as a closed rectangular polygon, never read back.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bound {
    pub min: Point,
    pub max: Point,
}

impl Bound {
    #[must_use]
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// The five-point ring `min, (max.x, min.y), max, (min.x, max.y), min`.
    #[must_use]
    pub fn to_ring(&self) -> Ring {
        Ring(vec![
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
            self.min,
        ])
    }

    #[must_use]
    pub fn to_polygon(&self) -> Polygon {
        Polygon(vec![self.to_ring()])
    }
}

/// Every geometry the grammar can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    MultiPoint(MultiPoint),
    LineString(LineString),
    MultiLineString(MultiLineString),
    Polygon(Polygon),
    MultiPolygon(MultiPolygon),
    Collection(Collection),
}

impl Geometry {
    #[must_use]
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::Collection(_) => GeometryKind::GeometryCollection,
        }
    }
}

macro_rules! geometry_variant {
    ($variant:ident, $kind:ident) => {
        impl From<$variant> for Geometry {
            fn from(value: $variant) -> Self {
                Geometry::$variant(value)
            }
        }

        impl TryFrom<Geometry> for $variant {
            type Error = Error;

            fn try_from(geometry: Geometry) -> Result<Self, Self::Error> {
                match geometry {
                    Geometry::$variant(value) => Ok(value),
                    other => Err(Error::Conversion {
                        expected: GeometryKind::$kind,
                        found: other.kind(),
                    }),
                }
            }
        }
    };
}

geometry_variant!(Point, Point);
geometry_variant!(MultiPoint, MultiPoint);
geometry_variant!(LineString, LineString);
geometry_variant!(MultiLineString, MultiLineString);
geometry_variant!(Polygon, Polygon);
geometry_variant!(MultiPolygon, MultiPolygon);
geometry_variant!(Collection, GeometryCollection);

impl From<Ring> for Polygon {
    fn from(ring: Ring) -> Self {
        Polygon(vec![ring])
    }
}

impl From<Bound> for Polygon {
    fn from(bound: Bound) -> Self {
        bound.to_polygon()
    }
}

impl From<LineString> for Ring {
    fn from(line: LineString) -> Self {
        Ring(line.0)
    }
}

// geo interop

impl From<geo::Coord> for Point {
    fn from(coord: geo::Coord) -> Self {
        Point::new(coord.x, coord.y)
    }
}

impl From<geo::Point> for Point {
    fn from(point: geo::Point) -> Self {
        point.0.into()
    }
}

impl From<Point> for geo::Coord {
    fn from(point: Point) -> Self {
        geo::coord! { x: point.x, y: point.y }
    }
}

impl From<Point> for geo::Point {
    fn from(point: Point) -> Self {
        geo::Point::new(point.x, point.y)
    }
}

fn coords_from_geo(line: &geo::LineString) -> Vec<Point> {
    line.0.iter().copied().map(Point::from).collect()
}

fn coords_to_geo(points: &[Point]) -> geo::LineString {
    geo::LineString::new(points.iter().copied().map(geo::Coord::from).collect())
}

impl From<geo::LineString> for LineString {
    fn from(line: geo::LineString) -> Self {
        LineString(coords_from_geo(&line))
    }
}

impl From<LineString> for geo::LineString {
    fn from(line: LineString) -> Self {
        coords_to_geo(&line.0)
    }
}

impl From<geo::Line> for LineString {
    fn from(line: geo::Line) -> Self {
        LineString(vec![line.start.into(), line.end.into()])
    }
}

impl From<geo::MultiPoint> for MultiPoint {
    fn from(points: geo::MultiPoint) -> Self {
        points.0.into_iter().map(Point::from).collect()
    }
}

impl From<MultiPoint> for geo::MultiPoint {
    fn from(points: MultiPoint) -> Self {
        geo::MultiPoint::new(points.0.into_iter().map(geo::Point::from).collect())
    }
}

impl From<geo::MultiLineString> for MultiLineString {
    fn from(lines: geo::MultiLineString) -> Self {
        lines.0.into_iter().map(LineString::from).collect()
    }
}

impl From<MultiLineString> for geo::MultiLineString {
    fn from(lines: MultiLineString) -> Self {
        geo::MultiLineString::new(lines.0.into_iter().map(geo::LineString::from).collect())
    }
}

impl From<geo::Polygon> for Polygon {
    fn from(polygon: geo::Polygon) -> Self {
        if polygon.exterior().0.is_empty() && polygon.interiors().is_empty() {
            return Polygon::default();
        }
        std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .map(|ring| Ring(coords_from_geo(ring)))
            .collect()
    }
}

impl From<Polygon> for geo::Polygon {
    fn from(polygon: Polygon) -> Self {
        let mut rings = polygon.0.iter().map(|ring| coords_to_geo(&ring.0));
        let exterior = rings.next().unwrap_or_else(|| geo::LineString::new(vec![]));
        geo::Polygon::new(exterior, rings.collect())
    }
}

impl From<geo::MultiPolygon> for MultiPolygon {
    fn from(polygons: geo::MultiPolygon) -> Self {
        polygons.0.into_iter().map(Polygon::from).collect()
    }
}

impl From<MultiPolygon> for geo::MultiPolygon {
    fn from(polygons: MultiPolygon) -> Self {
        geo::MultiPolygon::new(polygons.0.into_iter().map(geo::Polygon::from).collect())
    }
}

impl From<geo::Rect> for Bound {
    fn from(rect: geo::Rect) -> Self {
        Bound::new(rect.min().into(), rect.max().into())
    }
}

impl From<Bound> for geo::Rect {
    fn from(bound: Bound) -> Self {
        geo::Rect::new(geo::Coord::from(bound.min), geo::Coord::from(bound.max))
    }
}

impl From<geo::GeometryCollection> for Collection {
    fn from(collection: geo::GeometryCollection) -> Self {
        collection.0.into_iter().map(Geometry::from).collect()
    }
}

impl From<Collection> for geo::GeometryCollection {
    fn from(collection: Collection) -> Self {
        geo::GeometryCollection::new_from(
            collection.0.into_iter().map(geo::Geometry::from).collect(),
        )
    }
}

impl From<geo::Geometry> for Geometry {
    fn from(geometry: geo::Geometry) -> Self {
        match geometry {
            geo::Geometry::Point(g) => Geometry::Point(g.into()),
            geo::Geometry::Line(g) => Geometry::LineString(g.into()),
            geo::Geometry::LineString(g) => Geometry::LineString(g.into()),
            geo::Geometry::Polygon(g) => Geometry::Polygon(g.into()),
            geo::Geometry::MultiPoint(g) => Geometry::MultiPoint(g.into()),
            geo::Geometry::MultiLineString(g) => Geometry::MultiLineString(g.into()),
            geo::Geometry::MultiPolygon(g) => Geometry::MultiPolygon(g.into()),
            geo::Geometry::GeometryCollection(g) => Geometry::Collection(g.into()),
            geo::Geometry::Rect(g) => Geometry::Polygon(Bound::from(g).to_polygon()),
            geo::Geometry::Triangle(g) => Geometry::Polygon(g.to_polygon().into()),
        }
    }
}

impl From<Geometry> for geo::Geometry {
    fn from(geometry: Geometry) -> Self {
        match geometry {
            Geometry::Point(g) => geo::Geometry::Point(g.into()),
            Geometry::MultiPoint(g) => geo::Geometry::MultiPoint(g.into()),
            Geometry::LineString(g) => geo::Geometry::LineString(g.into()),
            Geometry::MultiLineString(g) => geo::Geometry::MultiLineString(g.into()),
            Geometry::Polygon(g) => geo::Geometry::Polygon(g.into()),
            Geometry::MultiPolygon(g) => geo::Geometry::MultiPolygon(g.into()),
            Geometry::Collection(g) => geo::Geometry::GeometryCollection(g.into()),
        }
    }
}
