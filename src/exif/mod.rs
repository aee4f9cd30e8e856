//! Coordinate extraction from embedded image metadata
//!
//! Reads the GPS degrees/minutes/seconds triples, hemisphere references,
//! altitude and original capture timestamp from an image's EXIF tags and
//! derives decimal coordinates plus a normalized `dd.mm.yyyy` capture
//! date. Extraction fails with a missing-GPS condition when latitude,
//! longitude or either hemisphere reference is absent, which stops the
//! workflow before any enrichment lookup.

use exif::{In, Tag, Value};
use std::io::Cursor;

use crate::errors::ExtractionError;
use crate::models::CaptureMetadata;

/// Convert a degrees/minutes/seconds triple to decimal degrees, negated
/// for the southern and western hemispheres.
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64, reference: &str) -> f64 {
    let dd = degrees + minutes / 60.0 + seconds / 3600.0;
    if reference == "S" || reference == "W" {
        -dd
    } else {
        dd
    }
}

/// Reformat an EXIF timestamp (`"2023:07:04 10:00:00"`) to `"04.07.2023"`.
///
/// Returns `None` when the prefix is not a colon-delimited
/// year:month:day triple.
pub fn format_capture_date(timestamp: &str) -> Option<String> {
    let date_part = timestamp.split(' ').next()?;
    let mut parts = date_part.split(':');
    let year = parts.next()?;
    let month = parts.next()?;
    let day = parts.next()?;
    if year.is_empty() || month.is_empty() || day.is_empty() {
        return None;
    }
    Some(format!("{day}.{month}.{year}"))
}

/// Derive capture metadata from raw image bytes.
pub fn extract(data: &[u8]) -> Result<CaptureMetadata, ExtractionError> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(data))
        .map_err(|e| ExtractionError::UnreadableExif {
            message: e.to_string(),
        })?;

    let latitude = rational_triple(&exif, Tag::GPSLatitude);
    let latitude_ref = ascii_value(&exif, Tag::GPSLatitudeRef);
    let longitude = rational_triple(&exif, Tag::GPSLongitude);
    let longitude_ref = ascii_value(&exif, Tag::GPSLongitudeRef);
    let altitude = first_rational(&exif, Tag::GPSAltitude);
    let capture_date =
        ascii_value(&exif, Tag::DateTimeOriginal).and_then(|ts| format_capture_date(&ts));

    build_metadata(latitude, latitude_ref, longitude, longitude_ref, altitude, capture_date)
}

/// Assemble and validate metadata from the individual tag values.
pub fn build_metadata(
    latitude: Option<(f64, f64, f64)>,
    latitude_ref: Option<String>,
    longitude: Option<(f64, f64, f64)>,
    longitude_ref: Option<String>,
    altitude: Option<f64>,
    capture_date: Option<String>,
) -> Result<CaptureMetadata, ExtractionError> {
    let (lat, lat_ref, lon, lon_ref) = match (latitude, latitude_ref, longitude, longitude_ref) {
        (Some(lat), Some(lat_ref), Some(lon), Some(lon_ref)) => (lat, lat_ref, lon, lon_ref),
        _ => return Err(ExtractionError::MissingGpsData),
    };

    let latitude = dms_to_decimal(lat.0, lat.1, lat.2, &lat_ref);
    let longitude = dms_to_decimal(lon.0, lon.1, lon.2, &lon_ref);

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(ExtractionError::CoordinatesOutOfRange {
            latitude,
            longitude,
        });
    }

    Ok(CaptureMetadata {
        latitude,
        longitude,
        altitude,
        capture_date,
    })
}

/// Read the EXIF orientation value (1-8), defaulting to 1 when absent
/// or unreadable. Used by the archival pipeline for auto-rotation.
pub fn orientation(data: &[u8]) -> u32 {
    exif::Reader::new()
        .read_from_container(&mut Cursor::new(data))
        .ok()
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|f| f.value.get_uint(0))
        })
        .unwrap_or(1)
}

fn rational_triple(exif: &exif::Exif, tag: Tag) -> Option<(f64, f64, f64)> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(v) if v.len() >= 3 => {
            Some((v[0].to_f64(), v[1].to_f64(), v[2].to_f64()))
        }
        _ => None,
    }
}

fn first_rational(exif: &exif::Exif, tag: Tag) -> Option<f64> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(v) => v.first().map(|r| r.to_f64()),
        _ => None,
    }
}

fn ascii_value(exif: &exif::Exif, tag: Tag) -> Option<String> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Ascii(v) => v
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}
