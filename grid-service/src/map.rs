//! Projection of stored assets onto map geometry.
//!
//! Point tables become markers and power lines become two-point polylines.
//! Rows with a missing or unusable coordinate are skipped, never reported
//! as errors. The view is centred on the mean of every plotted point
//! (both endpoints of each line included), or on the configured default
//! when nothing is plotted.

use grid_client::{
    domain::{AssetKind, Customer, LatLon, OutageRecord, PointAsset, PowerLine, Table},
    GridError, Store,
};
use serde::Serialize;
use serde_json::{json, Value as Json};

use crate::config::{MapConfig, TileLayerConfig};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub table: Table,
    pub id: i64,
    pub position: LatLon,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyline {
    pub id: i64,
    pub line_id: String,
    pub start: LatLon,
    pub end: LatLon,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub name: String,
    pub url: String,
    pub attribution: String,
}

impl From<&TileLayerConfig> for TileLayer {
    fn from(cfg: &TileLayerConfig) -> Self {
        Self {
            name: cfg.name.clone(),
            url: cfg.url.clone(),
            attribution: cfg.attribution.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: LatLon,
    pub zoom: u8,
    pub tile_layers: Vec<TileLayer>,
    pub markers: Vec<Marker>,
    pub polylines: Vec<Polyline>,
}

impl MapView {
    /// GeoJSON FeatureCollection; positions are written `[lon, lat]`.
    pub fn to_geojson(&self) -> Json {
        let markers = self.markers.iter().map(|m| {
            json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [m.position.lon, m.position.lat] },
                "properties": { "table": m.table, "id": m.id, "label": m.label },
            })
        });
        let lines = self.polylines.iter().map(|l| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[l.start.lon, l.start.lat], [l.end.lon, l.end.lat]],
                },
                "properties": { "table": Table::PowerLines, "id": l.id, "line_id": l.line_id, "label": l.label },
            })
        });

        json!({
            "type": "FeatureCollection",
            "features": markers.chain(lines).collect::<Vec<_>>(),
        })
    }
}

/// Everything the map plots, as read from the store.
#[derive(Debug, Clone, Default)]
pub struct MapData {
    pub assets: Vec<PointAsset>,
    pub power_lines: Vec<PowerLine>,
    pub outages: Vec<OutageRecord>,
    pub customers: Vec<Customer>,
}

impl MapData {
    pub async fn load(store: &Store) -> Result<Self, GridError> {
        let mut assets = Vec::new();
        for kind in AssetKind::ALL {
            assets.extend(store.point_assets(kind).await?);
        }
        Ok(Self {
            assets,
            power_lines: store.power_lines().await?,
            outages: store.outages().await?,
            customers: store.customers().await?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct MapRenderer {
    default_center: LatLon,
    zoom: u8,
    tile_layers: Vec<TileLayer>,
}

impl MapRenderer {
    pub fn new(cfg: &MapConfig) -> Self {
        let [lat, lon] = cfg.default_center;
        Self {
            default_center: LatLon { lat, lon },
            zoom: cfg.zoom,
            tile_layers: cfg.tile_layers.iter().map(TileLayer::from).collect(),
        }
    }

    pub async fn render(&self, store: &Store) -> Result<MapView, GridError> {
        let data = MapData::load(store).await?;
        Ok(self.project(&data))
    }

    pub fn project(&self, data: &MapData) -> MapView {
        let mut markers = Vec::new();
        let mut skipped = 0usize;

        for asset in &data.assets {
            match asset.position() {
                Some(position) => markers.push(Marker {
                    table: asset.kind.table(),
                    id: asset.id,
                    position,
                    label: format!("{} {} - {}", asset.kind, asset.external_id, asset.location),
                }),
                None => skipped += 1,
            }
        }

        for outage in &data.outages {
            match outage.position() {
                Some(position) => markers.push(Marker {
                    table: Table::Outages,
                    id: outage.id,
                    position,
                    label: format!("Outage ({}) - {}", outage.status, outage.location),
                }),
                None => skipped += 1,
            }
        }

        // Customers without coordinates are common; not counted as skipped.
        markers.extend(data.customers.iter().filter_map(|c| {
            c.position().map(|position| Marker {
                table: Table::Customers,
                id: c.id,
                position,
                label: format!("{} - {}", c.name, c.location),
            })
        }));

        let mut polylines = Vec::new();
        for line in &data.power_lines {
            match line.endpoints() {
                Some((start, end)) => polylines.push(Polyline {
                    id: line.id,
                    line_id: line.line_id.clone(),
                    start,
                    end,
                    label: format!(
                        "Line {}: {} -> {}",
                        line.line_id, line.start_location, line.end_location
                    ),
                }),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!(skipped, "rows without usable coordinates left off the map");
        }

        let plotted = markers
            .iter()
            .map(|m| m.position)
            .chain(polylines.iter().flat_map(|l| [l.start, l.end]));
        let center = mean_position(plotted).unwrap_or(self.default_center);

        MapView {
            center,
            zoom: self.zoom,
            tile_layers: self.tile_layers.clone(),
            markers,
            polylines,
        }
    }
}

fn mean_position(points: impl Iterator<Item = LatLon>) -> Option<LatLon> {
    let (mut lat, mut lon, mut n) = (0.0, 0.0, 0usize);
    for p in points {
        lat += p.lat;
        lon += p.lon;
        n += 1;
    }
    (n > 0).then(|| LatLon { lat: lat / n as f64, lon: lon / n as f64 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_client::domain::OutageStatus;

    fn renderer() -> MapRenderer {
        MapRenderer::new(&MapConfig::default())
    }

    fn pole(id: i64, lat: Option<f64>, lon: Option<f64>) -> PointAsset {
        PointAsset {
            kind: AssetKind::Pole,
            id,
            location: "Nairobi CBD".to_string(),
            latitude: lat,
            longitude: lon,
            external_id: format!("P-{id:03}"),
        }
    }

    fn line(id: i64, end_latitude: Option<f64>) -> PowerLine {
        PowerLine {
            id,
            start_location: "A".to_string(),
            start_latitude: Some(-1.0),
            start_longitude: Some(36.0),
            end_location: "B".to_string(),
            end_latitude,
            end_longitude: Some(37.0),
            line_id: format!("L-{id}"),
        }
    }

    #[test]
    fn empty_store_uses_default_center() {
        let view = renderer().project(&MapData::default());
        assert_eq!(view.center, LatLon { lat: 0.4256, lon: 36.7552 });
        assert_eq!(view.zoom, 7);
        assert!(view.markers.is_empty());
        assert!(view.polylines.is_empty());
    }

    #[test]
    fn marker_label_names_kind_identifier_and_location() {
        let data = MapData { assets: vec![pole(1, Some(-1.2864), Some(36.8172))], ..MapData::default() };
        let view = renderer().project(&data);

        assert_eq!(view.markers.len(), 1);
        assert_eq!(view.markers[0].label, "Pole P-001 - Nairobi CBD");
        assert_eq!(view.markers[0].table, Table::Poles);
        assert_eq!(view.center, LatLon { lat: -1.2864, lon: 36.8172 });
    }

    #[test]
    fn line_with_missing_endpoint_is_skipped() {
        let data = MapData { power_lines: vec![line(1, Some(-2.0)), line(2, None)], ..MapData::default() };
        let view = renderer().project(&data);

        assert_eq!(view.polylines.len(), 1);
        assert_eq!(view.polylines[0].id, 1);
        assert_eq!(view.polylines[0].label, "Line L-1: A -> B");
    }

    #[test]
    fn center_is_mean_of_markers_and_line_endpoints() {
        let data = MapData {
            assets: vec![pole(1, Some(-3.0), Some(38.0)), pole(2, None, Some(30.0))],
            power_lines: vec![line(1, Some(-2.0))],
            ..MapData::default()
        };
        let view = renderer().project(&data);

        // (-3 + -1 + -2) / 3, (38 + 36 + 37) / 3
        assert_eq!(view.center, LatLon { lat: -2.0, lon: 37.0 });
    }

    #[test]
    fn outages_and_located_customers_become_markers() {
        let data = MapData {
            outages: vec![OutageRecord {
                id: 4,
                location: "Kisumu".to_string(),
                latitude: Some(-0.09),
                longitude: Some(34.77),
                status: OutageStatus::Pending,
                resolution_time: None,
            }],
            customers: vec![
                Customer {
                    id: 1,
                    name: "Amina".to_string(),
                    location: "Kisumu".to_string(),
                    meter_serial_number: "SN-1".to_string(),
                    latitude: Some(-0.1),
                    longitude: Some(34.75),
                    report: Some("no power".to_string()),
                },
                Customer {
                    id: 2,
                    name: "Baraka".to_string(),
                    location: "Kisii".to_string(),
                    meter_serial_number: String::new(),
                    latitude: None,
                    longitude: None,
                    report: None,
                },
            ],
            ..MapData::default()
        };
        let view = renderer().project(&data);

        let labels: Vec<&str> = view.markers.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Outage (Pending) - Kisumu", "Amina - Kisumu"]);
    }

    #[test]
    fn geojson_uses_lon_lat_order() {
        let data = MapData {
            assets: vec![pole(1, Some(-1.5), Some(36.5))],
            power_lines: vec![line(9, Some(-2.0))],
            ..MapData::default()
        };
        let geo = renderer().project(&data).to_geojson();

        assert_eq!(geo["type"], "FeatureCollection");
        assert_eq!(geo["features"][0]["geometry"]["coordinates"], json!([36.5, -1.5]));
        assert_eq!(geo["features"][0]["properties"]["table"], "poles");
        assert_eq!(
            geo["features"][1]["geometry"]["coordinates"],
            json!([[36.0, -1.0], [37.0, -2.0]])
        );
    }

    #[tokio::test]
    async fn render_reads_every_layer_from_store() {
        let store = Store::open_in_memory().await.unwrap();
        store.create_schema().await.unwrap();
        crate::importer::import_csv(
            &store,
            Table::Transformers,
            b"location,latitude,longitude,transformer_id\nRuiru,-1.15,36.96,T-1\n",
        )
        .await
        .unwrap();

        let view = renderer().render(&store).await.unwrap();
        assert_eq!(view.markers.len(), 1);
        assert_eq!(view.markers[0].label, "Transformer T-1 - Ruiru");
    }
}
