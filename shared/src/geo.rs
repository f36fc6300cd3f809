use serde::{Deserialize, Serialize};

/// 经纬度坐标
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lng: f64,
    pub lat: f64,
}

impl Coordinates {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// 地理编码结果中的单个候选
///
/// `center` 的顺序为 `[lng, lat]`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFeature {
    #[serde(default)]
    pub id: String,
    pub place_name: String,
    pub center: [f64; 2],
}

impl GeoFeature {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.center[0], self.center[1])
    }
}

/// 正向/反向地理编码的响应体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<GeoFeature>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feature_collection() {
        let body = r#"{
            "type": "FeatureCollection",
            "query": ["market", "street"],
            "features": [
                {"id": "address.1", "place_name": "1 Market St, San Francisco, CA", "center": [-122.3949, 37.7946], "relevance": 1},
                {"id": "poi.2", "place_name": "Market Hall", "center": [-122.25, 37.84]}
            ]
        }"#;
        let parsed: FeatureCollection = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.features.len(), 2);
        assert_eq!(
            parsed.features[0].coordinates(),
            Coordinates::new(-122.3949, 37.7946)
        );
    }

    #[test]
    fn test_missing_features_is_empty() {
        let parsed: FeatureCollection = serde_json::from_str(r#"{"message":"Not Found"}"#).unwrap();
        assert!(parsed.features.is_empty());
    }
}
