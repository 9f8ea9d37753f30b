use std::fmt::{self, Write};

use serde::ser;

use crate::{
    ewkt::Ewkt,
    geometry::{
        Bound, Collection, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
        Polygon, Ring,
    },
};

/// Writes a value as canonical WKT.
///
/// Coordinates use the shortest text that parses back to the same `f64`.
/// Empty containers are written as `<KEYWORD> EMPTY`.
pub trait ToWkt {
    /// Appends the WKT text of `self` to `out`.
    ///
    /// # Errors
    ///
    /// Only fails if `out` does.
    fn write_wkt<W: Write>(&self, out: &mut W) -> fmt::Result;

    #[must_use]
    fn to_wkt(&self) -> String {
        let mut out = String::new();
        // writing to a String never fails
        let _ = self.write_wkt(&mut out);
        out
    }
}

fn write_point<W: Write>(out: &mut W, point: &Point) -> fmt::Result {
    write!(out, "{} {}", point.x, point.y)
}

fn write_list<W: Write, T>(
    out: &mut W,
    items: &[T],
    mut write_item: impl FnMut(&mut W, &T) -> fmt::Result,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.write_char(',')?;
        }
        write_item(out, item)?;
    }
    Ok(())
}

fn write_points<W: Write>(out: &mut W, points: &[Point]) -> fmt::Result {
    write_list(out, points, write_point)
}

/// A bracketed coordinate list, or `EMPTY` when there are no coordinates.
fn write_path<W: Write>(out: &mut W, points: &[Point]) -> fmt::Result {
    if points.is_empty() {
        return out.write_str("EMPTY");
    }
    out.write_char('(')?;
    write_points(out, points)?;
    out.write_char(')')
}

fn write_rings<W: Write>(out: &mut W, polygon: &Polygon) -> fmt::Result {
    if polygon.is_empty() {
        return out.write_str("EMPTY");
    }
    out.write_char('(')?;
    write_list(out, &polygon.0, |out, ring| write_path(out, &ring.0))?;
    out.write_char(')')
}

/// `KEYWORD EMPTY` when `empty`, otherwise `KEYWORD(` + `body` + `)`.
fn write_tagged<W: Write>(
    out: &mut W,
    keyword: &str,
    empty: bool,
    body: impl FnOnce(&mut W) -> fmt::Result,
) -> fmt::Result {
    if empty {
        return write!(out, "{keyword} EMPTY");
    }
    write!(out, "{keyword}(")?;
    body(out)?;
    out.write_char(')')
}

impl ToWkt for Point {
    fn write_wkt<W: Write>(&self, out: &mut W) -> fmt::Result {
        write_tagged(out, "POINT", false, |out| write_point(out, self))
    }
}

impl ToWkt for MultiPoint {
    fn write_wkt<W: Write>(&self, out: &mut W) -> fmt::Result {
        write_tagged(out, "MULTIPOINT", self.is_empty(), |out| {
            write_list(out, &self.0, |out, point| {
                out.write_char('(')?;
                write_point(out, point)?;
                out.write_char(')')
            })
        })
    }
}

impl ToWkt for LineString {
    fn write_wkt<W: Write>(&self, out: &mut W) -> fmt::Result {
        write_tagged(out, "LINESTRING", self.is_empty(), |out| {
            write_points(out, &self.0)
        })
    }
}

impl ToWkt for MultiLineString {
    fn write_wkt<W: Write>(&self, out: &mut W) -> fmt::Result {
        write_tagged(out, "MULTILINESTRING", self.is_empty(), |out| {
            write_list(out, &self.0, |out, line| write_path(out, &line.0))
        })
    }
}

impl ToWkt for Ring {
    fn write_wkt<W: Write>(&self, out: &mut W) -> fmt::Result {
        write_tagged(out, "POLYGON", self.is_empty(), |out| write_path(out, &self.0))
    }
}

impl ToWkt for Polygon {
    fn write_wkt<W: Write>(&self, out: &mut W) -> fmt::Result {
        write_tagged(out, "POLYGON", self.is_empty(), |out| {
            write_list(out, &self.0, |out, ring| write_path(out, &ring.0))
        })
    }
}

impl ToWkt for MultiPolygon {
    fn write_wkt<W: Write>(&self, out: &mut W) -> fmt::Result {
        write_tagged(out, "MULTIPOLYGON", self.is_empty(), |out| {
            write_list(out, &self.0, write_rings)
        })
    }
}

impl ToWkt for Collection {
    fn write_wkt<W: Write>(&self, out: &mut W) -> fmt::Result {
        write_tagged(out, "GEOMETRYCOLLECTION", self.is_empty(), |out| {
            write_list(out, &self.0, |out, geometry| geometry.write_wkt(out))
        })
    }
}

impl ToWkt for Bound {
    fn write_wkt<W: Write>(&self, out: &mut W) -> fmt::Result {
        self.to_ring().write_wkt(out)
    }
}

impl ToWkt for Geometry {
    fn write_wkt<W: Write>(&self, out: &mut W) -> fmt::Result {
        match self {
            Geometry::Point(g) => g.write_wkt(out),
            Geometry::MultiPoint(g) => g.write_wkt(out),
            Geometry::LineString(g) => g.write_wkt(out),
            Geometry::MultiLineString(g) => g.write_wkt(out),
            Geometry::Polygon(g) => g.write_wkt(out),
            Geometry::MultiPolygon(g) => g.write_wkt(out),
            Geometry::Collection(g) => g.write_wkt(out),
        }
    }
}

impl<T: ToWkt + ?Sized> ToWkt for &T {
    fn write_wkt<W: Write>(&self, out: &mut W) -> fmt::Result {
        (**self).write_wkt(out)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_wkt(f)
    }
}

impl ser::Serialize for Geometry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl ser::Serialize for Ewkt {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.collect_str(self)
    }
}
