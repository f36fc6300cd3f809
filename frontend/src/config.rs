//! 运行时配置
//!
//! 前端没有服务端环境变量，配置在构建时通过 `option_env!` 注入
//! （trunk 构建时设置），读不到就使用默认值。

const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_GEOCODING_URL: &str = "https://api.mapbox.com";
const DEFAULT_MAP_STYLE: &str = "mapbox/streets-v12";
/// 地图初始中心（无定位权限时使用）
const DEFAULT_MAP_CENTER: (f64, f64) = (-74.006, 40.7128);
const DEFAULT_MAP_ZOOM: f64 = 13.0;

/// 应用配置
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// 后端 API 基础地址
    pub api_base_url: String,
    /// 地理编码服务地址
    pub geocoding_base_url: String,
    /// Mapbox access token
    pub mapbox_token: String,
    /// 静态地图样式
    pub map_style: String,
    pub map_center: (f64, f64),
    pub map_zoom: f64,
}

/// 去掉空白；空串视为未设置
fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|v| !v.is_empty())
}

impl AppConfig {
    /// 从构建时环境读取配置
    pub fn from_build_env() -> Self {
        Self::from_values(
            option_env!("AUTOSERVE_API_URL"),
            option_env!("AUTOSERVE_GEOCODING_URL"),
            option_env!("AUTOSERVE_MAPBOX_TOKEN"),
            option_env!("AUTOSERVE_MAP_STYLE"),
        )
    }

    fn from_values(
        api_url: Option<&str>,
        geocoding_url: Option<&str>,
        mapbox_token: Option<&str>,
        map_style: Option<&str>,
    ) -> Self {
        Self {
            api_base_url: non_empty(api_url)
                .unwrap_or(DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            geocoding_base_url: non_empty(geocoding_url)
                .unwrap_or(DEFAULT_GEOCODING_URL)
                .trim_end_matches('/')
                .to_string(),
            mapbox_token: non_empty(mapbox_token).unwrap_or_default().to_string(),
            map_style: non_empty(map_style).unwrap_or(DEFAULT_MAP_STYLE).to_string(),
            map_center: DEFAULT_MAP_CENTER,
            map_zoom: DEFAULT_MAP_ZOOM,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_values(None, None, None, None)
    }
}
