use std::fmt;
use std::num::{ParseFloatError, ParseIntError};

/// The geometry kinds the grammar knows a keyword for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryKind {
    /// All kinds, longest keyword first within each family.
    pub const ALL: [GeometryKind; 7] = [
        GeometryKind::GeometryCollection,
        GeometryKind::MultiPoint,
        GeometryKind::Point,
        GeometryKind::MultiLineString,
        GeometryKind::LineString,
        GeometryKind::MultiPolygon,
        GeometryKind::Polygon,
    ];

    /// The upper-case WKT keyword.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            GeometryKind::Point => "POINT",
            GeometryKind::MultiPoint => "MULTIPOINT",
            GeometryKind::LineString => "LINESTRING",
            GeometryKind::MultiLineString => "MULTILINESTRING",
            GeometryKind::Polygon => "POLYGON",
            GeometryKind::MultiPolygon => "MULTIPOLYGON",
            GeometryKind::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }

    /// Looks up the kind for an exact upper-case keyword.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<GeometryKind> {
        GeometryKind::ALL
            .into_iter()
            .find(|kind| kind.keyword() == keyword)
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeometryKind::Point => "point",
            GeometryKind::MultiPoint => "multipoint",
            GeometryKind::LineString => "linestring",
            GeometryKind::MultiLineString => "multilinestring",
            GeometryKind::Polygon => "polygon",
            GeometryKind::MultiPolygon => "multipolygon",
            GeometryKind::GeometryCollection => "collection",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unmarshal {kind} error")]
    Unmarshal {
        kind: GeometryKind,
        #[source]
        source: Box<Error>,
    },

    #[error("can't get x,y from `{text}`")]
    MalformedCoordinate {
        text: String,
        #[source]
        source: Option<ParseFloatError>,
    },

    #[error("unbalanced brackets in `{0}`")]
    UnbalancedBrackets(String),

    #[error("wkt: unsupported geometry `{0}`")]
    UnsupportedGeometry(String),

    #[error("{0} has no body")]
    MissingBody(GeometryKind),

    #[error("empty point can't be represented")]
    EmptyPoint,

    #[error("collection member {index} is invalid")]
    CollectionMember {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("convert to {expected} error: found {found}")]
    Conversion {
        expected: GeometryKind,
        found: GeometryKind,
    },

    #[error("invalid SRID `{text}`")]
    InvalidSrid {
        text: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Error while processing the geozero source.")]
    Geozero(#[from] geozero::error::GeozeroError),
}

impl Error {
    /// Follows `Unmarshal` and `CollectionMember` wrappers down to the error that started it.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Unmarshal { source, .. } | Error::CollectionMember { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    pub(crate) fn unmarshal(kind: GeometryKind, source: Error) -> Self {
        Error::Unmarshal {
            kind,
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
