//! 位置选择器
//!
//! 纯状态层：地址与坐标同步更新、防抖搜索、反向地理编码票据。
//! 地图渲染与浏览器定位在 `components::location_picker` 中。

use crate::error::ClientError;
use crate::request::{HttpClient, HttpRequest};
use autoserve_shared::protocol::HttpMethod;
use autoserve_shared::{Coordinates, FeatureCollection, GeoFeature, Location};
use std::f64::consts::PI;
use std::rc::Rc;

/// 搜索防抖间隔
pub const SEARCH_DEBOUNCE_MS: u32 = 300;
/// 少于该长度的查询不发请求
pub const MIN_QUERY_LEN: usize = 3;
/// 候选结果上限
pub const MAX_RESULTS: usize = 5;

/// Mapbox 静态图与瓦片使用 512 像素的瓦片
const TILE_SIZE: f64 = 512.0;
const MAX_LATITUDE: f64 = 85.051_128_78;

// =========================================================
// 防抖代数计数器
// =========================================================

/// 每次 `arm` 递增代数；只有最新一代的回调会生效
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Debouncer {
    generation: u64,
}

impl Debouncer {
    pub fn arm(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

// =========================================================
// 地图视口 (Web Mercator)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    pub center: Coordinates,
    pub zoom: f64,
    pub width: u32,
    pub height: u32,
}

impl MapViewport {
    pub fn new(center: Coordinates, zoom: f64, width: u32, height: u32) -> Self {
        Self {
            center,
            zoom,
            width,
            height,
        }
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    /// 经纬度 => 世界像素
    fn project(&self, c: Coordinates) -> (f64, f64) {
        let world = self.world_size();
        let lat = c.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = (c.lng + 180.0) / 360.0 * world;
        let y = (0.5 - ((1.0 + lat.sin()) / (1.0 - lat.sin())).ln() / (4.0 * PI)) * world;
        (x, y)
    }

    fn unproject(&self, x: f64, y: f64) -> Coordinates {
        let world = self.world_size();
        let lng = x / world * 360.0 - 180.0;
        let n = PI - 2.0 * PI * y / world;
        let lat = n.sinh().atan().to_degrees();
        Coordinates::new(lng, lat)
    }

    /// 地图图片上的像素坐标 => 经纬度
    pub fn pixel_to_coords(&self, px: f64, py: f64) -> Coordinates {
        let (cx, cy) = self.project(self.center);
        self.unproject(
            cx + px - f64::from(self.width) / 2.0,
            cy + py - f64::from(self.height) / 2.0,
        )
    }

    pub fn coords_to_pixel(&self, c: Coordinates) -> (f64, f64) {
        let (cx, cy) = self.project(self.center);
        let (x, y) = self.project(c);
        (
            x - cx + f64::from(self.width) / 2.0,
            y - cy + f64::from(self.height) / 2.0,
        )
    }

    /// Mapbox Static Images API 地址
    pub fn static_image_url(
        &self,
        base_url: &str,
        style: &str,
        token: &str,
        marker: Option<Coordinates>,
    ) -> String {
        let overlay = marker
            .map(|m| format!("pin-l+e11d48({:.6},{:.6})/", m.lng, m.lat))
            .unwrap_or_default();
        format!(
            "{base_url}/styles/v1/{style}/static/{overlay}{:.6},{:.6},{:.2}/{}x{}?access_token={}",
            self.center.lng,
            self.center.lat,
            self.zoom,
            self.width,
            self.height,
            urlencoding::encode(token)
        )
    }
}

// =========================================================
// 选择器状态
// =========================================================

#[derive(Debug, Clone)]
pub struct LocationPicker {
    query: String,
    results: Vec<GeoFeature>,
    search: Debouncer,
    reverse: Debouncer,
    location: Location,
    /// 等待反向地理编码结果的新坐标
    pending_pin: Option<Coordinates>,
    viewport: MapViewport,
    geolocation_requested: bool,
}

impl LocationPicker {
    pub fn new(viewport: MapViewport) -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            search: Debouncer::default(),
            reverse: Debouncer::default(),
            location: Location::default(),
            pending_pin: None,
            viewport,
            geolocation_requested: false,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[GeoFeature] {
        &self.results
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn viewport(&self) -> &MapViewport {
        &self.viewport
    }

    /// 地图上显示的标记位置（优先显示等待中的新坐标）
    pub fn marker(&self) -> Option<Coordinates> {
        self.pending_pin.or(self.location.coordinates)
    }

    /// 输入框变化：返回需要在防抖后执行的搜索票据
    ///
    /// 过短的查询会清空候选，并使之前的搜索失效。
    pub fn type_query(&mut self, text: &str) -> Option<u64> {
        self.query = text.to_string();
        let ticket = self.search.arm();
        if text.trim().chars().count() < MIN_QUERY_LEN {
            self.results.clear();
            return None;
        }
        Some(ticket)
    }

    /// 防抖到期：票据仍是最新时返回要查询的文本
    pub fn search_due(&self, ticket: u64) -> Option<String> {
        self.search
            .is_current(ticket)
            .then(|| self.query.trim().to_string())
    }

    /// 返回是否被采用
    pub fn apply_results(&mut self, ticket: u64, mut features: Vec<GeoFeature>) -> bool {
        if !self.search.is_current(ticket) {
            tracing::debug!("dropping stale search results");
            return false;
        }
        features.truncate(MAX_RESULTS);
        self.results = features;
        true
    }

    /// 选中候选：地址与坐标一次性更新
    pub fn select_result(&mut self, feature: &GeoFeature) -> Location {
        let coordinates = feature.coordinates();
        self.location = Location {
            full_address: feature.place_name.clone(),
            coordinates: Some(coordinates),
        };
        self.query = feature.place_name.clone();
        self.results.clear();
        self.search.arm();
        // 之前的拖动/点击结果不再有效
        self.reverse.arm();
        self.pending_pin = None;
        self.viewport.center = coordinates;
        self.location.clone()
    }

    /// 拖动、点击地图或定位成功：返回反向地理编码票据
    pub fn move_pin(&mut self, coordinates: Coordinates) -> u64 {
        self.pending_pin = Some(coordinates);
        self.viewport.center = coordinates;
        self.reverse.arm()
    }

    /// 地图图片上的点击
    pub fn click_map(&mut self, px: f64, py: f64) -> (Coordinates, u64) {
        let coordinates = self.viewport.pixel_to_coords(px, py);
        (coordinates, self.move_pin(coordinates))
    }

    /// 反向地理编码返回；票据过期时忽略
    pub fn apply_reverse(&mut self, ticket: u64, place_name: &str) -> Option<Location> {
        if !self.reverse.is_current(ticket) {
            return None;
        }
        let coordinates = self.pending_pin.take()?;
        self.location = Location {
            full_address: place_name.to_string(),
            coordinates: Some(coordinates),
        };
        self.query = place_name.to_string();
        Some(self.location.clone())
    }

    /// 反向地理编码失败：保留之前的地址与坐标
    pub fn reverse_failed(&mut self, ticket: u64) {
        if self.reverse.is_current(ticket) {
            self.pending_pin = None;
            if let Some(previous) = self.location.coordinates {
                self.viewport.center = previous;
            }
        }
    }

    /// 每次挂载只请求一次浏览器定位
    pub fn begin_geolocation(&mut self) -> bool {
        !std::mem::replace(&mut self.geolocation_requested, true)
    }
}

// =========================================================
// 地理编码客户端
// =========================================================

pub struct Geocoder<C: HttpClient> {
    base_url: String,
    access_token: String,
    client: Rc<C>,
}

impl<C: HttpClient> Clone for Geocoder<C> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            access_token: self.access_token.clone(),
            client: Rc::clone(&self.client),
        }
    }
}

impl<C: HttpClient> Geocoder<C> {
    pub fn new(base_url: &str, access_token: &str, client: C) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            client: Rc::new(client),
        }
    }

    fn places_url(&self, subject: &str, extra: &str) -> String {
        format!(
            "{}/geocoding/v5/mapbox.places/{subject}.json?access_token={}{extra}",
            self.base_url,
            urlencoding::encode(&self.access_token)
        )
    }

    async fn features(&self, url: String) -> Result<Vec<GeoFeature>, ClientError> {
        let response = self
            .client
            .send(HttpRequest::new(&url, HttpMethod::Get))
            .await?;
        if !response.ok() {
            return Err(ClientError::rejected(response.status, None));
        }
        Ok(response.json::<FeatureCollection>()?.features)
    }

    /// 正向地理编码
    pub async fn forward(&self, query: &str) -> Result<Vec<GeoFeature>, ClientError> {
        let url = self.places_url(
            &urlencoding::encode(query.trim()),
            &format!("&limit={MAX_RESULTS}"),
        );
        let mut features = self.features(url).await.inspect_err(|e| {
            tracing::warn!("forward geocoding failed: {e}");
        })?;
        features.truncate(MAX_RESULTS);
        Ok(features)
    }

    /// 反向地理编码：取第一个结果的地名
    pub async fn reverse(&self, at: Coordinates) -> Result<Option<String>, ClientError> {
        let url = self.places_url(&format!("{},{}", at.lng, at.lat), "");
        let features = self.features(url).await.inspect_err(|e| {
            tracing::warn!("reverse geocoding failed: {e}");
        })?;
        Ok(features.into_iter().next().map(|f| f.place_name))
    }
}

#[cfg(test)]
mod tests;
