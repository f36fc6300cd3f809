use serde::{Deserialize, Serialize};

// =========================================================
// 用户与令牌
// =========================================================

/// 用户资料快照（客户或管理员）
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "_id", alias = "userId", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl UserProfile {
    /// 用于问候语等展示场景
    pub fn display_name(&self) -> &str {
        if !self.name.trim().is_empty() {
            &self.name
        } else if !self.email.is_empty() {
            &self.email
        } else {
            "there"
        }
    }
}

/// JWT 载荷中前端关心的字段
///
/// 仅用于展示，不做签名校验。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(alias = "_id", alias = "userId", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// 过期时间（Unix 秒），缺省表示客户端不做过期处理
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    pub fn is_expired(&self, now_secs: i64) -> bool {
        self.exp.is_some_and(|exp| exp <= now_secs)
    }
}

impl From<TokenClaims> for UserProfile {
    fn from(claims: TokenClaims) -> Self {
        Self {
            id: claims.id,
            name: claims.name,
            email: claims.email,
            phone: None,
        }
    }
}

// =========================================================
// 引用：后端可能返回 id，也可能返回填充后的对象
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference<T> {
    Id(String),
    Populated(T),
}

// =========================================================
// 车辆
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(default)]
    pub license_plate: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub fuel_type: String,
}

impl Vehicle {
    /// 下拉框中的显示文本，如 "2019 Toyota Corolla (ABC-123)"
    pub fn label(&self) -> String {
        let mut label = match self.year {
            Some(year) => format!("{} {} {}", year, self.make, self.model),
            None => format!("{} {}", self.make, self.model),
        };
        if !self.license_plate.is_empty() {
            label.push_str(&format!(" ({})", self.license_plate));
        }
        label
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVehicle {
    pub user_id: String,
    pub make: String,
    pub model: String,
    pub year: u16,
    pub license_plate: String,
    pub color: String,
    pub fuel_type: String,
}

// =========================================================
// 通用服务记录
// =========================================================

/// 后端服务目录中的通用服务记录（每个类别一条）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub base_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_accepts_mongo_style_id() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"_id":"u1","name":"Ada","email":"ada@example.com"}"#).unwrap();
        assert_eq!(profile.id, "u1");
        assert_eq!(profile.display_name(), "Ada");
    }

    #[test]
    fn test_claims_expiry() {
        let claims: TokenClaims =
            serde_json::from_str(r#"{"userId":"u1","exp":1700000000}"#).unwrap();
        assert_eq!(claims.id, "u1");
        assert!(claims.is_expired(1_700_000_000));
        assert!(!claims.is_expired(1_699_999_999));

        let eternal = TokenClaims::default();
        assert!(!eternal.is_expired(i64::MAX));
    }

    #[test]
    fn test_reference_accepts_id_or_object() {
        let id: Reference<Service> = serde_json::from_str(r#""svc-1""#).unwrap();
        assert_eq!(id, Reference::Id("svc-1".to_string()));

        let populated: Reference<Service> =
            serde_json::from_str(r#"{"_id":"svc-1","name":"Battery Services"}"#).unwrap();
        match populated {
            Reference::Populated(service) => assert_eq!(service.name, "Battery Services"),
            Reference::Id(_) => panic!("expected populated service"),
        }
    }

    #[test]
    fn test_vehicle_label() {
        let vehicle: Vehicle = serde_json::from_str(
            r#"{"_id":"c1","make":"Toyota","model":"Corolla","year":2019,"licensePlate":"ABC-123"}"#,
        )
        .unwrap();
        assert_eq!(vehicle.label(), "2019 Toyota Corolla (ABC-123)");
    }
}
