use chrono::{Duration, NaiveDateTime};
use postgis::ewkb;
use postgres::rows::Row;
use postgres::types::FromSql;

use crate::error::{Error, Result};

/// Spatial reference of every stored geometry (WGS84 lon/lat).
pub const SRID_WGS84: i32 = 4326;

/// A table that can be read row by row into a record type.
pub trait Entity: Sized {
    const TABLE_NAME: &'static str;

    /// Select list matching what `from_row` expects.
    const COLUMNS: &'static str;

    const PRIMARY_KEY: &'static str = "ogc_fid";

    fn from_row(row: &Row) -> Result<Self>;
}

fn column<T: FromSql>(row: &Row, table: &'static str, name: &'static str) -> Result<T> {
    match row.get_opt(name) {
        Some(value) => Ok(value?),
        None => Err(Error::MissingColumn {
            table,
            column: name,
        }),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: i32,
    /// Source GPX file the track was imported from.
    pub gpx_id: Option<i32>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    /// Sequence number of the track within its GPX file.
    pub number: Option<i32>,
    pub geometry: Option<ewkb::MultiLineString>,
}

impl Entity for Track {
    const TABLE_NAME: &'static str = "tracks";
    const COLUMNS: &'static str =
        "ogc_fid, gpx_id, name, cmt, \"desc\", src, number, wkb_geometry";

    fn from_row(row: &Row) -> Result<Self> {
        let table = Self::TABLE_NAME;
        let id: i32 = column(row, table, "ogc_fid")?;
        let geometry: Option<ewkb::MultiLineString> = column(row, table, "wkb_geometry")?;
        if let Some(srid) = geometry.as_ref().and_then(|geom| geom.srid) {
            if srid != SRID_WGS84 {
                return Err(Error::UnexpectedSrid { table, id, srid });
            }
        }
        Ok(Track {
            id,
            gpx_id: column(row, table, "gpx_id")?,
            name: column(row, table, "name")?,
            comment: column(row, table, "cmt")?,
            description: column(row, table, "desc")?,
            source: column(row, table, "src")?,
            number: column(row, table, "number")?,
            geometry,
        })
    }
}

/// Statistics derived from one track by the importer.
///
/// Lengths are in meters. `length_3d` accounts for elevation and is expected
/// to be at least `length_2d`, but nothing here enforces it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackInfo {
    pub id: i32,
    pub gpx_id: Option<i32>,
    pub segment_count: Option<i32>,
    pub length_2d: Option<f64>,
    pub length_3d: Option<f64>,
    pub moving_duration: Option<Duration>,
    pub stopped_duration: Option<Duration>,
    pub max_speed: Option<f64>,
    /// Cumulative elevation gain.
    pub ascent: Option<f64>,
    /// Cumulative elevation loss.
    pub descent: Option<f64>,
    pub started_at: Option<NaiveDateTime>,
    pub ended_at: Option<NaiveDateTime>,
    pub point_count: Option<i32>,
    pub start_longitude: Option<f64>,
    pub start_latitude: Option<f64>,
    pub end_longitude: Option<f64>,
    pub end_latitude: Option<f64>,
}

// The client has no INTERVAL decoder, so intervals are read as seconds.
// EXTRACT(EPOCH ..) counts a year as 365.25 days; the select list takes the
// quarter day back out so a year reads as 365 days and a month as 30.
fn interval_from_seconds(seconds: Option<f64>) -> Option<Duration> {
    seconds.map(|secs| Duration::microseconds((secs * 1_000_000.0).round() as i64))
}

impl Entity for TrackInfo {
    const TABLE_NAME: &'static str = "trackinfo";
    const COLUMNS: &'static str = "ogc_fid, gpx_id, segments, length_2d, length_3d, \
         (EXTRACT(EPOCH FROM moving_time) - EXTRACT(YEAR FROM moving_time) * 21600)::float8 \
         AS moving_time, \
         (EXTRACT(EPOCH FROM stopped_time) - EXTRACT(YEAR FROM stopped_time) * 21600)::float8 \
         AS stopped_time, \
         max_speed, uphill, downhill, started, ended, points, \
         start_lon, start_lat, end_lon, end_lat";

    fn from_row(row: &Row) -> Result<Self> {
        let table = Self::TABLE_NAME;
        Ok(TrackInfo {
            id: column(row, table, "ogc_fid")?,
            gpx_id: column(row, table, "gpx_id")?,
            segment_count: column(row, table, "segments")?,
            length_2d: column(row, table, "length_2d")?,
            length_3d: column(row, table, "length_3d")?,
            moving_duration: interval_from_seconds(column(row, table, "moving_time")?),
            stopped_duration: interval_from_seconds(column(row, table, "stopped_time")?),
            max_speed: column(row, table, "max_speed")?,
            ascent: column(row, table, "uphill")?,
            descent: column(row, table, "downhill")?,
            started_at: column(row, table, "started")?,
            ended_at: column(row, table, "ended")?,
            point_count: column(row, table, "points")?,
            start_longitude: column(row, table, "start_lon")?,
            start_latitude: column(row, table, "start_lat")?,
            end_longitude: column(row, table, "end_lon")?,
            end_latitude: column(row, table, "end_lat")?,
        })
    }
}
