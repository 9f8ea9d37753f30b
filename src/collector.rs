//! Interop with [`geozero`] processors and data sources.
//!
//! [`Geometry`] and [`Ewkt`] implement [`GeozeroGeometry`], so every geozero
//! writer (`GeoJSON`, WKB, ...) can consume them; an [`Ewkt`] announces its
//! SRID to the processor first. In the other direction
//! [`GeometryCollector`] is a processor that builds [`Geometry`] values out
//! of any geozero source. Unlike `geo`, it keeps rings exactly as read.
//!
//! # Example
//!
//! ```rust
//! use geozero::GeozeroGeometry;
//! use geo_ewkt::collector::GeometryCollector;
//! use geo_ewkt::wkt::marshal_string;
//!
//! let geojson = r#"{"type": "LineString", "coordinates": [[1, 2], [3, 4]]}"#;
//!
//! let mut collector = GeometryCollector::new();
//! geozero::geojson::GeoJson(geojson).process_geom(&mut collector).unwrap();
//!
//! let geometry = collector.take_geometry().unwrap();
//! assert_eq!(marshal_string(&geometry), "LINESTRING(1 2,3 4)");
//! ```
use geozero::{
    error::{GeozeroError, Result as GeozeroResult},
    FeatureProcessor, GeomProcessor, GeozeroDatasource, GeozeroGeometry, PropertyProcessor,
};
use tracing::trace;

use crate::{
    error::Result,
    ewkt::Ewkt,
    geometry::{
        Collection, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
        Polygon, Ring,
    },
};

fn process_points<P: GeomProcessor>(points: &[Point], processor: &mut P) -> GeozeroResult<()> {
    for (idx, point) in points.iter().enumerate() {
        processor.xy(point.x, point.y, idx)?;
    }
    Ok(())
}

fn process_path<P: GeomProcessor>(
    points: &[Point],
    tagged: bool,
    idx: usize,
    processor: &mut P,
) -> GeozeroResult<()> {
    processor.linestring_begin(tagged, points.len(), idx)?;
    process_points(points, processor)?;
    processor.linestring_end(tagged, idx)
}

fn process_polygon<P: GeomProcessor>(
    polygon: &Polygon,
    tagged: bool,
    idx: usize,
    processor: &mut P,
) -> GeozeroResult<()> {
    processor.polygon_begin(tagged, polygon.len(), idx)?;
    for (ring_idx, ring) in polygon.iter().enumerate() {
        process_path(&ring.0, false, ring_idx, processor)?;
    }
    processor.polygon_end(tagged, idx)
}

fn process_geometry<P: GeomProcessor>(
    geometry: &Geometry,
    idx: usize,
    processor: &mut P,
) -> GeozeroResult<()> {
    match geometry {
        Geometry::Point(point) => {
            processor.point_begin(idx)?;
            processor.xy(point.x, point.y, 0)?;
            processor.point_end(idx)
        }
        Geometry::MultiPoint(points) => {
            processor.multipoint_begin(points.len(), idx)?;
            process_points(&points.0, processor)?;
            processor.multipoint_end(idx)
        }
        Geometry::LineString(line) => process_path(&line.0, true, idx, processor),
        Geometry::MultiLineString(lines) => {
            processor.multilinestring_begin(lines.len(), idx)?;
            for (line_idx, line) in lines.iter().enumerate() {
                process_path(&line.0, false, line_idx, processor)?;
            }
            processor.multilinestring_end(idx)
        }
        Geometry::Polygon(polygon) => process_polygon(polygon, true, idx, processor),
        Geometry::MultiPolygon(polygons) => {
            processor.multipolygon_begin(polygons.len(), idx)?;
            for (polygon_idx, polygon) in polygons.iter().enumerate() {
                process_polygon(polygon, false, polygon_idx, processor)?;
            }
            processor.multipolygon_end(idx)
        }
        Geometry::Collection(collection) => {
            processor.geometrycollection_begin(collection.len(), idx)?;
            for (member_idx, member) in collection.iter().enumerate() {
                process_geometry(member, member_idx, processor)?;
            }
            processor.geometrycollection_end(idx)
        }
    }
}

impl GeozeroGeometry for Geometry {
    fn process_geom<P: GeomProcessor>(&self, processor: &mut P) -> GeozeroResult<()>
    where
        Self: Sized,
    {
        process_geometry(self, 0, processor)
    }
}

impl GeozeroGeometry for Ewkt {
    fn process_geom<P: GeomProcessor>(&self, processor: &mut P) -> GeozeroResult<()>
    where
        Self: Sized,
    {
        processor.srid(Some(self.srid))?;
        process_geometry(&self.geometry, 0, processor)
    }
}

/// Builds [`Geometry`] values from geozero processing events.
///
/// Every completed top-level geometry is appended to `geometries`, so the
/// collector can be fed a single geometry or a whole feature source.
#[derive(Debug, Default)]
pub struct GeometryCollector {
    pub geometries: Vec<Geometry>,
    /// The last SRID announced by the source, if any.
    pub srid: Option<i32>,

    collections: Vec<Vec<Geometry>>,
    polygons: Option<Vec<Polygon>>,
    paths: Option<Vec<Vec<Point>>>,
    coords: Option<Vec<Point>>,
}

impl GeometryCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the most recently completed geometry.
    pub fn take_geometry(&mut self) -> Option<Geometry> {
        self.geometries.pop()
    }

    fn finish(&mut self, geometry: Geometry) {
        trace!(kind = %geometry.kind(), "collected geometry");
        match self.collections.last_mut() {
            Some(members) => members.push(geometry),
            None => self.geometries.push(geometry),
        }
    }

    fn take_coords(&mut self) -> GeozeroResult<Vec<Point>> {
        self.coords
            .take()
            .ok_or_else(|| GeozeroError::Geometry("coordinates ended before they began".into()))
    }

    fn take_paths(&mut self) -> GeozeroResult<Vec<Vec<Point>>> {
        self.paths
            .take()
            .ok_or_else(|| GeozeroError::Geometry("line list ended before it began".into()))
    }

    fn unsupported(kind: &str) -> GeozeroResult<()> {
        Err(GeozeroError::Geometry(format!("{kind} is not supported")))
    }
}

impl GeomProcessor for GeometryCollector {
    fn srid(&mut self, srid: Option<i32>) -> GeozeroResult<()> {
        if srid.is_some() {
            self.srid = srid;
        }
        Ok(())
    }

    fn xy(&mut self, x: f64, y: f64, _idx: usize) -> GeozeroResult<()> {
        self.coords
            .as_mut()
            .ok_or_else(|| GeozeroError::Geometry("coordinate outside of a geometry".into()))?
            .push(Point::new(x, y));
        Ok(())
    }

    fn coordinate(
        &mut self,
        x: f64,
        y: f64,
        _z: Option<f64>,
        _m: Option<f64>,
        _t: Option<f64>,
        _tm: Option<u64>,
        idx: usize,
    ) -> GeozeroResult<()> {
        self.xy(x, y, idx)
    }

    fn empty_point(&mut self, _idx: usize) -> GeozeroResult<()> {
        Err(GeozeroError::Geometry(crate::error::Error::EmptyPoint.to_string()))
    }

    fn point_begin(&mut self, _idx: usize) -> GeozeroResult<()> {
        self.coords = Some(Vec::with_capacity(1));
        Ok(())
    }

    fn point_end(&mut self, _idx: usize) -> GeozeroResult<()> {
        let point = self
            .take_coords()?
            .pop()
            .ok_or_else(|| GeozeroError::Geometry("point without coordinates".into()))?;
        self.finish(point.into());
        Ok(())
    }

    fn multipoint_begin(&mut self, size: usize, _idx: usize) -> GeozeroResult<()> {
        self.coords = Some(Vec::with_capacity(size));
        Ok(())
    }

    fn multipoint_end(&mut self, _idx: usize) -> GeozeroResult<()> {
        let points = self.take_coords()?;
        self.finish(MultiPoint(points).into());
        Ok(())
    }

    fn linestring_begin(&mut self, _tagged: bool, size: usize, _idx: usize) -> GeozeroResult<()> {
        self.coords = Some(Vec::with_capacity(size));
        Ok(())
    }

    fn linestring_end(&mut self, tagged: bool, _idx: usize) -> GeozeroResult<()> {
        let points = self.take_coords()?;
        if tagged {
            self.finish(LineString(points).into());
        } else {
            self.paths
                .as_mut()
                .ok_or_else(|| GeozeroError::Geometry("untagged line outside of a list".into()))?
                .push(points);
        }
        Ok(())
    }

    fn multilinestring_begin(&mut self, size: usize, _idx: usize) -> GeozeroResult<()> {
        self.paths = Some(Vec::with_capacity(size));
        Ok(())
    }

    fn multilinestring_end(&mut self, _idx: usize) -> GeozeroResult<()> {
        let lines = self.take_paths()?;
        self.finish(lines.into_iter().map(LineString).collect::<MultiLineString>().into());
        Ok(())
    }

    fn polygon_begin(&mut self, _tagged: bool, size: usize, _idx: usize) -> GeozeroResult<()> {
        self.paths = Some(Vec::with_capacity(size));
        Ok(())
    }

    fn polygon_end(&mut self, tagged: bool, _idx: usize) -> GeozeroResult<()> {
        let polygon: Polygon = self.take_paths()?.into_iter().map(Ring).collect();
        if tagged {
            self.finish(polygon.into());
        } else {
            self.polygons
                .as_mut()
                .ok_or_else(|| {
                    GeozeroError::Geometry("untagged polygon outside of a multipolygon".into())
                })?
                .push(polygon);
        }
        Ok(())
    }

    fn multipolygon_begin(&mut self, size: usize, _idx: usize) -> GeozeroResult<()> {
        self.polygons = Some(Vec::with_capacity(size));
        Ok(())
    }

    fn multipolygon_end(&mut self, _idx: usize) -> GeozeroResult<()> {
        let polygons = self.polygons.take().ok_or_else(|| {
            GeozeroError::Geometry("multipolygon ended before it began".into())
        })?;
        self.finish(MultiPolygon(polygons).into());
        Ok(())
    }

    fn geometrycollection_begin(&mut self, size: usize, _idx: usize) -> GeozeroResult<()> {
        self.collections.push(Vec::with_capacity(size));
        Ok(())
    }

    fn geometrycollection_end(&mut self, _idx: usize) -> GeozeroResult<()> {
        let members = self.collections.pop().ok_or_else(|| {
            GeozeroError::Geometry("collection ended before it began".into())
        })?;
        self.finish(Collection(members).into());
        Ok(())
    }

    fn circularstring_begin(&mut self, _size: usize, _idx: usize) -> GeozeroResult<()> {
        Self::unsupported("circularstring")
    }

    fn compoundcurve_begin(&mut self, _size: usize, _idx: usize) -> GeozeroResult<()> {
        Self::unsupported("compoundcurve")
    }

    fn curvepolygon_begin(&mut self, _size: usize, _idx: usize) -> GeozeroResult<()> {
        Self::unsupported("curvepolygon")
    }

    fn multicurve_begin(&mut self, _size: usize, _idx: usize) -> GeozeroResult<()> {
        Self::unsupported("multicurve")
    }

    fn multisurface_begin(&mut self, _size: usize, _idx: usize) -> GeozeroResult<()> {
        Self::unsupported("multisurface")
    }

    fn triangle_begin(&mut self, _tagged: bool, _size: usize, _idx: usize) -> GeozeroResult<()> {
        Self::unsupported("triangle")
    }

    fn polyhedralsurface_begin(&mut self, _size: usize, _idx: usize) -> GeozeroResult<()> {
        Self::unsupported("polyhedralsurface")
    }

    fn tin_begin(&mut self, _size: usize, _idx: usize) -> GeozeroResult<()> {
        Self::unsupported("tin")
    }
}

impl PropertyProcessor for GeometryCollector {}

impl FeatureProcessor for GeometryCollector {}

/// Collects the geometry of every feature in a `GeozeroDatasource`.
///
/// # Examples
///
/// ```
/// use geo_ewkt::collector::from_datasource;
/// use geo_ewkt::wkt::marshal_string;
///
/// let geojson = r#"{
///     "type": "Feature",
///     "geometry": {
///         "type": "Point",
///         "coordinates": [13.4, 52.5]
///     },
///     "properties": {
///         "name": "Berlin"
///     }
/// }"#;
///
/// let mut reader = geozero::geojson::GeoJsonReader(geojson.as_bytes());
/// let geometries = from_datasource(&mut reader).unwrap();
///
/// assert_eq!(marshal_string(&geometries[0]), "POINT(13.4 52.5)");
/// ```
///
/// # Errors
///
/// Returns an error if the datasource processing fails or a geometry uses a
/// type the model does not have (curves, surfaces, empty points).
pub fn from_datasource<S: GeozeroDatasource>(source: &mut S) -> Result<Vec<Geometry>> {
    let mut collector = GeometryCollector::new();
    source.process(&mut collector)?;
    Ok(collector.geometries)
}

/// Builds a [`Geometry`] from any single geozero geometry.
///
/// # Errors
///
/// Returns an error if processing fails or produces no geometry.
pub fn from_geozero<G: GeozeroGeometry>(geometry: &G) -> Result<Geometry> {
    let mut collector = GeometryCollector::new();
    geometry.process_geom(&mut collector)?;
    collector
        .take_geometry()
        .ok_or_else(|| GeozeroError::Geometry("no geometry processed".into()).into())
}
