//! # geo-ewkt
//!
//! A library for reading and writing geometries as Well-Known Text (WKT) and
//! Extended Well-Known Text (EWKT, WKT with an `SRID=<n>;` prefix).
//!
//! The grammar engine is hand written: nested bracket lists are split by
//! bracket depth and decoded into a typed [`Geometry`] tree, and the
//! serializer writes the same canonical text back, so marshalling and then
//! unmarshalling a value gives an equal value.
//!
//! ## Features
//!
//! - Points, multipoints, linestrings, multilinestrings, polygons,
//!   multipolygons and nested geometry collections, including `EMPTY` forms
//! - Case-insensitive keywords
//! - Typed entry points that fail with a conversion error on a kind mismatch
//! - Rings and bounding boxes written as polygons
//! - `serde` support for [`Geometry`] and [`ewkt::Ewkt`] as strings
//! - Conversions to and from `geo` types and processing through `geozero`
//!
//! ## Example
//!
//! ```rust
//! use geo_ewkt::geometry::{Point, Polygon, Ring};
//! use geo_ewkt::{ewkt, wkt};
//!
//! let polygon = Polygon::from(vec![
//!     Ring::from(vec![(1.0, 2.0), (3.0, 4.0)]),
//!     Ring::from(vec![(5.0, 6.0), (7.0, 8.0)]),
//! ]);
//!
//! let text = ewkt::marshal_string(&polygon, 4326);
//! assert_eq!(text, "SRID=4326;POLYGON((1 2,3 4),(5 6,7 8))");
//!
//! let (parsed, srid) = ewkt::unmarshal_polygon(&text).unwrap();
//! assert_eq!(parsed, polygon);
//! assert_eq!(srid, 4326);
//!
//! assert_eq!(wkt::unmarshal_point("point(1 2)").unwrap(), Point::new(1.0, 2.0));
//! assert!(wkt::unmarshal_point("LINESTRING(1 2,3 4)").is_err());
//! ```
//!
//! ## Modules
//!
//! - [`wkt`] - Typed WKT entry points
//! - [`ewkt`] - The SRID prefix and typed EWKT entry points
//! - [`de`] - The grammar engine and its helpers
//! - [`ser`] - The [`ToWkt`] serializer
//! - [`geometry`] - The geometry model
//! - [`collector`] - `geozero` interop
//! - [`error`] - Error types and handling

#[allow(clippy::module_name_repetitions)]
pub mod collector;
pub mod de;
pub mod error;
#[allow(clippy::module_name_repetitions)]
pub mod ewkt;
pub mod geometry;
pub mod ser;
pub mod wkt;

pub use de::unmarshal;
pub use error::{Error, GeometryKind, Result};
pub use geometry::Geometry;
pub use ser::ToWkt;
