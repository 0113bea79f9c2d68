//! GeoJSON reshaping of event documents
//!
//! GDELT events carry three coordinate pairs as flat `<X>_Lat` / `<X>_Long`
//! columns. The reshape copies every event whose six coordinates are all
//! doubles into `<collection>_geo`, with each pair folded into a GeoJSON
//! `Point` named after its prefix. Coordinates are `[longitude, latitude]`.

use crate::error::Result;
use crate::store::IngestStore;
use mongodb::bson::{doc, Bson, Document};
use tracing::info;

/// Suffix appended to the events collection to name the reshape target
pub const GEO_COLLECTION_SUFFIX: &str = "_geo";

/// Coordinate prefixes present on every GDELT event
pub const GDELT_GEO_PREFIXES: [&str; 3] = ["Actor1Geo", "Actor2Geo", "ActionGeo"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoPoint {
    /// Field receiving the GeoJSON point
    pub field: String,
    pub lat_field: String,
    pub lon_field: String,
}

impl GeoPoint {
    pub fn gdelt(prefix: &str) -> Self {
        Self {
            field: prefix.to_string(),
            lat_field: format!("{}_Lat", prefix),
            lon_field: format!("{}_Long", prefix),
        }
    }
}

/// One source-to-target reshape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoReshape {
    pub source: String,
    pub target: String,
    pub points: Vec<GeoPoint>,
}

impl GeoReshape {
    pub fn for_collection(name: &str) -> Self {
        Self {
            source: name.to_string(),
            target: format!("{}{}", name, GEO_COLLECTION_SUFFIX),
            points: GDELT_GEO_PREFIXES.iter().map(|p| GeoPoint::gdelt(p)).collect(),
        }
    }

    /// Aggregation pipeline: `$match` on double coordinates, `$addFields`
    /// for the points, `$out` to the target.
    pub fn pipeline(&self) -> Vec<Document> {
        let mut matcher = Document::new();
        let mut points = Document::new();
        for point in &self.points {
            matcher.insert(point.lat_field.clone(), doc! { "$type": "double" });
            matcher.insert(point.lon_field.clone(), doc! { "$type": "double" });
            points.insert(
                point.field.clone(),
                doc! {
                    "type": "Point",
                    "coordinates": [
                        format!("${}", point.lon_field),
                        format!("${}", point.lat_field),
                    ],
                },
            );
        }

        vec![
            doc! { "$match": matcher },
            doc! { "$addFields": points },
            doc! { "$out": self.target.clone() },
        ]
    }

    /// Apply the pipeline to one document in memory
    ///
    /// Returns `None` when any coordinate is missing or not a double.
    pub fn reshape_document(&self, document: &Document) -> Option<Document> {
        let mut coordinates = Vec::with_capacity(self.points.len());
        for point in &self.points {
            let lat = double_field(document, &point.lat_field)?;
            let lon = double_field(document, &point.lon_field)?;
            coordinates.push((point, lon, lat));
        }

        let mut reshaped = document.clone();
        for (point, lon, lat) in coordinates {
            reshaped.insert(
                point.field.clone(),
                doc! { "type": "Point", "coordinates": [lon, lat] },
            );
        }
        Some(reshaped)
    }
}

fn double_field(document: &Document, key: &str) -> Option<f64> {
    match document.get(key) {
        Some(Bson::Double(value)) => Some(*value),
        _ => None,
    }
}

/// Run the reshape and return the size of the target collection
pub async fn map_geo(store: &dyn IngestStore, reshape: &GeoReshape) -> Result<u64> {
    info!(source = %reshape.source, target = %reshape.target, "Mapping lat/lon to GeoJSON");
    let documents = store.reshape_geo(reshape).await?;
    info!(target = %reshape.target, documents, "Geo mapping complete");
    Ok(documents)
}
