use postgis::ewkb;
use postgres::Connection;

use crate::error::Result;

/// Converts stored geometries to GeoJSON text.
///
/// The conversion is done by the spatial engine, so the exact output
/// (coordinate precision, member order) is whatever the engine emits.
pub trait GeoJsonEngine {
    /// Returns `None` when the engine yields SQL NULL.
    fn multi_line_string_as_geojson(
        &self,
        geometry: &ewkb::MultiLineString,
    ) -> Result<Option<String>>;
}

impl GeoJsonEngine for Connection {
    fn multi_line_string_as_geojson(
        &self,
        geometry: &ewkb::MultiLineString,
    ) -> Result<Option<String>> {
        let rows = self.query("SELECT ST_AsGeoJSON($1::geometry)", &[geometry])?;
        if rows.is_empty() {
            return Ok(None);
        }
        match rows.get(0).get_opt(0) {
            Some(geojson) => Ok(geojson?),
            None => Ok(None),
        }
    }
}
