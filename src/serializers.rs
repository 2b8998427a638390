//! Display-oriented JSON records for tracks and track statistics.
//!
//! Field labels are meant for end users and differ from the column names.
//! Field order in the JSON output follows declaration order.

use serde::Serialize;
use serde_json::Value;

use crate::display::{format_interval, format_timestamp};
use crate::error::{Error, Result};
use crate::geojson::GeoJsonEngine;
use crate::models::{Entity, Track, TrackInfo};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackRecord {
    #[serde(rename = "ID")]
    pub id: i32,
    #[serde(rename = "GPX ID")]
    pub gpx_id: Option<i32>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "CMT")]
    pub comment: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Source")]
    pub source: Option<String>,
    #[serde(rename = "Number")]
    pub number: Option<i32>,
    #[serde(rename = "GeoJSON")]
    pub geojson: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackInfoRecord {
    #[serde(rename = "ID")]
    pub id: i32,
    #[serde(rename = "GPX ID")]
    pub gpx_id: Option<i32>,
    #[serde(rename = "Segments")]
    pub segments: Option<i32>,
    #[serde(rename = "2D length")]
    pub length_2d: Option<f64>,
    #[serde(rename = "3D length")]
    pub length_3d: Option<f64>,
    #[serde(rename = "Moving time")]
    pub moving_time: Option<String>,
    #[serde(rename = "Stopped time")]
    pub stopped_time: Option<String>,
    #[serde(rename = "Max speed")]
    pub max_speed: Option<f64>,
    #[serde(rename = "Uphill")]
    pub uphill: Option<f64>,
    #[serde(rename = "Downhill")]
    pub downhill: Option<f64>,
    #[serde(rename = "Started at")]
    pub started_at: Option<String>,
    #[serde(rename = "Ended at")]
    pub ended_at: Option<String>,
    #[serde(rename = "Points")]
    pub points: Option<i32>,
    #[serde(rename = "Start lon")]
    pub start_lon: Option<f64>,
    #[serde(rename = "Start lat")]
    pub start_lat: Option<f64>,
    #[serde(rename = "End lon")]
    pub end_lon: Option<f64>,
    #[serde(rename = "End lat")]
    pub end_lat: Option<f64>,
}

/// Serializes a track, asking `engine` to transcode its geometry.
///
/// Fails with [`Error::MissingGeometry`] if the track has no geometry; the
/// engine is not contacted in that case.
pub fn serialize_track<E>(track: &Track, engine: &E) -> Result<TrackRecord>
where
    E: GeoJsonEngine + ?Sized,
{
    let missing_geometry = || Error::MissingGeometry {
        table: Track::TABLE_NAME,
        id: track.id,
    };
    let geometry = track.geometry.as_ref().ok_or_else(missing_geometry)?;
    let geojson = engine
        .multi_line_string_as_geojson(geometry)?
        .ok_or_else(missing_geometry)?;

    let record = TrackRecord {
        id: track.id,
        gpx_id: track.gpx_id,
        name: track.name.clone(),
        comment: track.comment.clone(),
        description: track.description.clone(),
        source: track.source.clone(),
        number: track.number,
        geojson: serde_json::from_str(&geojson)?,
    };
    log::debug!("Serialized track: {:?}", record);
    Ok(record)
}

pub fn serialize_trackinfo(info: &TrackInfo) -> TrackInfoRecord {
    if let (Some(started), Some(ended)) = (info.started_at, info.ended_at) {
        if ended < started {
            log::warn!(
                "Track info {} ends at {} before it starts at {}",
                info.id,
                ended,
                started
            );
        }
    }

    let record = TrackInfoRecord {
        id: info.id,
        gpx_id: info.gpx_id,
        segments: info.segment_count,
        length_2d: info.length_2d,
        length_3d: info.length_3d,
        moving_time: info.moving_duration.map(format_interval),
        stopped_time: info.stopped_duration.map(format_interval),
        max_speed: info.max_speed,
        uphill: info.ascent,
        downhill: info.descent,
        started_at: info.started_at.as_ref().map(format_timestamp),
        ended_at: info.ended_at.as_ref().map(format_timestamp),
        points: info.point_count,
        start_lon: info.start_longitude,
        start_lat: info.start_latitude,
        end_lon: info.end_longitude,
        end_lat: info.end_latitude,
    };
    log::debug!("Serialized trackinfo: {:?}", record);
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use postgis::ewkb;
    use serde_json::json;
    use std::cell::Cell;
    use std::io;

    /// Renders GeoJSON locally the way PostGIS does for integer coordinates.
    #[derive(Default)]
    struct FakeEngine {
        calls: Cell<usize>,
    }

    impl GeoJsonEngine for FakeEngine {
        fn multi_line_string_as_geojson(
            &self,
            geometry: &ewkb::MultiLineString,
        ) -> Result<Option<String>> {
            self.calls.set(self.calls.get() + 1);
            let lines: Vec<Vec<[f64; 2]>> = geometry
                .lines
                .iter()
                .map(|line| line.points.iter().map(|p| [p.x, p.y]).collect())
                .collect();
            let text = json!({ "type": "MultiLineString", "coordinates": lines }).to_string();
            Ok(Some(text))
        }
    }

    struct BrokenEngine;

    impl GeoJsonEngine for BrokenEngine {
        fn multi_line_string_as_geojson(
            &self,
            _geometry: &ewkb::MultiLineString,
        ) -> Result<Option<String>> {
            Ok(Some("MULTILINESTRING((0 0,1 1))".to_owned()))
        }
    }

    /// Answers every conversion with SQL NULL.
    struct NullEngine;

    impl GeoJsonEngine for NullEngine {
        fn multi_line_string_as_geojson(
            &self,
            _geometry: &ewkb::MultiLineString,
        ) -> Result<Option<String>> {
            Ok(None)
        }
    }

    struct DisconnectedEngine;

    impl GeoJsonEngine for DisconnectedEngine {
        fn multi_line_string_as_geojson(
            &self,
            _geometry: &ewkb::MultiLineString,
        ) -> Result<Option<String>> {
            Err(Error::Io(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "server closed the connection",
            )))
        }
    }

    fn point(x: f64, y: f64) -> ewkb::Point {
        ewkb::Point { x, y, srid: None }
    }

    fn morning_ride() -> Track {
        Track {
            id: 1,
            gpx_id: Some(7),
            name: Some("Morning Ride".to_owned()),
            comment: None,
            description: Some("Along the river".to_owned()),
            source: Some("Garmin Edge 520".to_owned()),
            number: Some(1),
            geometry: Some(ewkb::MultiLineString {
                lines: vec![ewkb::LineString {
                    points: vec![point(0.0, 0.0), point(1.0, 1.0)],
                    srid: None,
                }],
                srid: Some(4326),
            }),
        }
    }

    fn trackinfo() -> TrackInfo {
        let day = NaiveDate::from_ymd_opt(2018, 6, 3).unwrap();
        TrackInfo {
            id: 3,
            gpx_id: Some(7),
            segment_count: Some(2),
            length_2d: Some(41_250.5),
            length_3d: Some(41_377.25),
            moving_duration: Some(Duration::minutes(90)),
            stopped_duration: Some(Duration::days(1) + Duration::minutes(150)),
            max_speed: Some(5.2),
            ascent: Some(312.0),
            descent: Some(298.5),
            started_at: day.and_hms_opt(6, 15, 0),
            ended_at: day.and_hms_opt(8, 1, 30),
            point_count: Some(4_211),
            start_longitude: Some(11.97),
            start_latitude: Some(57.70),
            end_longitude: Some(12.01),
            end_latitude: Some(57.68),
        }
    }

    #[test]
    fn track_serializes_with_display_labels_and_geojson() {
        let engine = FakeEngine::default();
        let record = serialize_track(&morning_ride(), &engine).unwrap();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["ID"], json!(1));
        assert_eq!(value["Name"], json!("Morning Ride"));
        assert_eq!(value["CMT"], Value::Null);
        assert_eq!(
            value["GeoJSON"],
            json!({ "type": "MultiLineString", "coordinates": [[[0.0, 0.0], [1.0, 1.0]]] })
        );
        assert_eq!(engine.calls.get(), 1);
    }

    #[test]
    fn track_labels_keep_declaration_order() {
        let record = serialize_track(&morning_ride(), &FakeEngine::default()).unwrap();
        let text = serde_json::to_string(&record).unwrap();
        let labels = [
            "\"ID\"",
            "\"GPX ID\"",
            "\"Name\"",
            "\"CMT\"",
            "\"Description\"",
            "\"Source\"",
            "\"Number\"",
            "\"GeoJSON\"",
        ];
        let positions: Vec<usize> = labels.iter().map(|l| text.find(l).unwrap()).collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn track_without_geometry_fails_without_contacting_engine() {
        let engine = FakeEngine::default();
        let mut track = morning_ride();
        track.geometry = None;

        match serialize_track(&track, &engine) {
            Err(Error::MissingGeometry { table, id }) => {
                assert_eq!(table, "tracks");
                assert_eq!(id, 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(engine.calls.get(), 0);
    }

    #[test]
    fn malformed_engine_output_is_an_error() {
        let result = serialize_track(&morning_ride(), &BrokenEngine);
        assert!(matches!(result, Err(Error::GeoJson(_))));
    }

    #[test]
    fn null_engine_output_counts_as_missing_geometry() {
        match serialize_track(&morning_ride(), &NullEngine) {
            Err(Error::MissingGeometry { table, id }) => {
                assert_eq!(table, "tracks");
                assert_eq!(id, 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn engine_errors_propagate_unchanged() {
        match serialize_track(&morning_ride(), &DisconnectedEngine) {
            Err(Error::Io(err)) => {
                assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
                assert_eq!(err.to_string(), "server closed the connection");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn serializing_twice_is_byte_identical() {
        let engine = FakeEngine::default();
        let track = morning_ride();
        let first = serde_json::to_string(&serialize_track(&track, &engine).unwrap()).unwrap();
        let second = serde_json::to_string(&serialize_track(&track, &engine).unwrap()).unwrap();
        assert_eq!(first, second);

        let info = trackinfo();
        let first = serde_json::to_string(&serialize_trackinfo(&info)).unwrap();
        let second = serde_json::to_string(&serialize_trackinfo(&info)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn trackinfo_renders_intervals_and_timestamps_as_text() {
        let value = serde_json::to_value(&serialize_trackinfo(&trackinfo())).unwrap();

        assert_eq!(value["Max speed"], json!(5.2));
        assert_eq!(value["Moving time"], json!("1:30:00"));
        assert_eq!(value["Stopped time"], json!("1 day, 2:30:00"));
        assert_eq!(value["Started at"], json!("2018-06-03 06:15:00"));
        assert_eq!(value["Ended at"], json!("2018-06-03 08:01:30"));
        assert_eq!(value["Points"], json!(4_211));
        assert_eq!(value["End lat"], json!(57.68));
    }

    #[test]
    fn trackinfo_lengths_are_passed_through() {
        let mut info = trackinfo();
        info.length_2d = Some(100.0);
        info.length_3d = Some(99.5);
        let value = serde_json::to_value(&serialize_trackinfo(&info)).unwrap();

        assert_eq!(value["2D length"], json!(100.0));
        assert_eq!(value["3D length"], json!(99.5));
    }

    #[test]
    fn trackinfo_ending_before_it_starts_is_passed_through() {
        let info = trackinfo();
        let swapped = TrackInfo {
            started_at: info.ended_at,
            ended_at: info.started_at,
            ..info
        };
        let value = serde_json::to_value(&serialize_trackinfo(&swapped)).unwrap();

        assert_eq!(value["Started at"], json!("2018-06-03 08:01:30"));
        assert_eq!(value["Ended at"], json!("2018-06-03 06:15:00"));
    }

    #[test]
    fn trackinfo_nulls_stay_null() {
        let info = TrackInfo {
            moving_duration: None,
            started_at: None,
            max_speed: None,
            ..trackinfo()
        };
        let value = serde_json::to_value(&serialize_trackinfo(&info)).unwrap();

        assert_eq!(value["Moving time"], Value::Null);
        assert_eq!(value["Started at"], Value::Null);
        assert_eq!(value["Max speed"], Value::Null);
        assert_eq!(value.as_object().unwrap().len(), 17);
    }
}
