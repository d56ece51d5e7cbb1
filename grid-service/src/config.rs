use serde::Deserialize;
use std::{fs, path::PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TileLayerConfig {
    pub name: String,
    pub url: String,
    pub attribution: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// `[lat, lon]` used when nothing is plotted.
    pub default_center: [f64; 2],
    pub zoom: u8,
    pub tile_layers: Vec<TileLayerConfig>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            // Center of Kenya
            default_center: [0.4256, 36.7552],
            zoom: 7,
            tile_layers: vec![
                TileLayerConfig {
                    name: "OpenStreetMap".to_string(),
                    url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
                    attribution: "Map data © OpenStreetMap contributors".to_string(),
                },
                TileLayerConfig {
                    name: "Esri World Imagery".to_string(),
                    url: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}".to_string(),
                    attribution: "Tiles © Esri".to_string(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber` filter directives, e.g. `grid_service=debug`.
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    pub endpoint: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub log: LogConfig,
    pub metrics: Option<MetricsConfig>,
    pub notify: Option<NotifyConfig>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("GRID_CONFIG").unwrap_or_else(|_| "grid-config.toml".to_string());
        let contents = fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read config '{path}': {e}"))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_map_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [store]
            path = "kplc.db"

            [http]
            bind_addr = "127.0.0.1:8080"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.store.path, PathBuf::from("kplc.db"));
        assert_eq!(cfg.map.default_center, [0.4256, 36.7552]);
        assert_eq!(cfg.map.zoom, 7);
        assert_eq!(cfg.map.tile_layers.len(), 2);
        assert!(cfg.log.filter.is_none());
        assert!(cfg.metrics.is_none());
        assert!(cfg.notify.is_none());
    }

    #[test]
    fn notify_section_is_parsed() {
        let cfg = AppConfig::from_toml(
            r#"
            [store]
            path = "kplc.db"
            [http]
            bind_addr = "127.0.0.1:8080"
            [map]
            zoom = 9
            [log]
            filter = "grid_client=debug"
            [notify]
            endpoint = "https://sms.example/api/v1/sms"
            api_key = "k"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.map.zoom, 9);
        assert_eq!(cfg.map.default_center, [0.4256, 36.7552]);
        assert_eq!(cfg.log.filter.as_deref(), Some("grid_client=debug"));
        assert_eq!(cfg.notify.unwrap().endpoint, "https://sms.example/api/v1/sms");
    }

    #[test]
    fn missing_store_section_fails() {
        assert!(AppConfig::from_toml("[http]\nbind_addr = \"x\"").is_err());
    }
}
