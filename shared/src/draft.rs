//! 预约草稿
//!
//! 草稿由单个挂载中的表单独占，挂载时按类别配置填入默认值，
//! 离开页面或重置后丢弃。

use crate::catalog::{AttributeKind, CategoryConfig, Estimate};
use crate::category::{BookingType, ServiceCategory};
use crate::date::parse_schedule;
use crate::error::ValidationError;
use crate::geo::Coordinates;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// 类别专属属性：键 -> 选中值
pub type Attributes = BTreeMap<String, String>;

/// 服务地点
///
/// 地址文本与坐标由地点选择器同步维护。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub full_address: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl Location {
    pub fn is_set(&self) -> bool {
        !self.full_address.trim().is_empty()
    }
}

/// 紧急救援联系人信息
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub contact_name: String,
    pub contact_phone: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingDraft {
    pub category: ServiceCategory,
    pub service_type: String,
    pub attributes: Attributes,
    pub booking_type: BookingType,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub location: Location,
    pub vehicle_id: Option<String>,
    pub notes: String,
    pub contact: EmergencyContact,
}

impl BookingDraft {
    /// 以类别配置的默认值创建草稿
    pub fn new(config: &CategoryConfig) -> Self {
        let attributes = config
            .attributes
            .iter()
            .map(|a| (a.key.to_string(), a.default.to_string()))
            .collect();

        Self {
            category: config.category,
            service_type: config
                .service_types
                .first()
                .map(|s| s.key.to_string())
                .unwrap_or_default(),
            attributes,
            booking_type: if config.allows_scheduling {
                BookingType::Scheduled
            } else {
                BookingType::OnDemand
            },
            scheduled_date: String::new(),
            scheduled_time: String::new(),
            location: Location::default(),
            vehicle_id: None,
            notes: String::new(),
            contact: EmergencyContact::default(),
        }
    }

    /// 请求估算前的校验
    ///
    /// 返回解析后的预约时间（仅 `Scheduled` 时存在）。
    /// 车辆在提交阶段单独校验。
    pub fn validate(
        &self,
        config: &CategoryConfig,
        now: NaiveDateTime,
    ) -> Result<Option<NaiveDateTime>, ValidationError> {
        config.service_type(&self.service_type)?;

        for spec in config.applicable_attributes(&self.service_type) {
            match self.attributes.get(spec.key) {
                Some(value) if spec.accepts(value) => {}
                Some(value) => {
                    return Err(ValidationError::InvalidAttribute {
                        key: spec.key.to_string(),
                        value: value.clone(),
                    });
                }
                None => return Err(ValidationError::MissingAttribute(spec.label)),
            }
        }

        let schedule = match self.booking_type {
            BookingType::OnDemand => None,
            BookingType::Scheduled if !config.allows_scheduling => {
                return Err(ValidationError::SchedulingUnavailable);
            }
            BookingType::Scheduled => {
                if self.scheduled_date.trim().is_empty() || self.scheduled_time.trim().is_empty() {
                    return Err(ValidationError::MissingSchedule);
                }
                let at = parse_schedule(&self.scheduled_date, &self.scheduled_time)
                    .ok_or(ValidationError::InvalidSchedule)?;
                if at < now {
                    return Err(ValidationError::ScheduleInPast);
                }
                Some(at)
            }
        };

        if !self.location.is_set() {
            return Err(ValidationError::MissingLocation);
        }

        if config.requires_contact {
            if self.contact.contact_name.trim().is_empty() {
                return Err(ValidationError::Required("Contact name"));
            }
            if self.contact.contact_phone.trim().is_empty() {
                return Err(ValidationError::Required("Contact phone"));
            }
            if self.contact.description.trim().is_empty() {
                return Err(ValidationError::Required("Description of the emergency"));
            }
        }

        Ok(schedule)
    }

    /// 订单行中的 `serviceDetails`，供管理后台展示
    pub fn service_details(&self, config: &CategoryConfig, estimate: &Estimate) -> Value {
        let mut details = Map::new();
        details.insert("category".into(), json!(self.category.slug()));
        details.insert("serviceType".into(), json!(self.service_type));
        if let Ok(spec) = config.service_type(&self.service_type) {
            details.insert("serviceTypeLabel".into(), json!(spec.label));
        }

        for spec in config.applicable_attributes(&self.service_type) {
            let Some(value) = self.attributes.get(spec.key) else {
                continue;
            };
            let value = match spec.kind {
                AttributeKind::Toggle => json!(value == "true"),
                AttributeKind::Choice(_) => json!(value),
            };
            details.insert(spec.key.to_string(), value);
        }

        details.insert("bookingType".into(), json!(self.booking_type.as_str()));
        details.insert("estimatedDuration".into(), json!(estimate.duration.to_string()));
        details.insert("vehicleId".into(), json!(self.vehicle_id));

        if config.requires_contact {
            details.insert("contactName".into(), json!(self.contact.contact_name));
            details.insert("contactPhone".into(), json!(self.contact.contact_phone));
            details.insert("description".into(), json!(self.contact.description));
        }

        Value::Object(details)
    }

    /// 订单的 `specialInstructions`
    pub fn special_instructions(&self) -> String {
        let notes = self.notes.trim();
        let description = self.contact.description.trim();
        match (notes.is_empty(), description.is_empty()) {
            (true, true) => String::new(),
            (false, true) => notes.to_string(),
            (true, false) => description.to_string(),
            (false, false) => format!("{description}\n{notes}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BATTERY, EMERGENCY_RESCUE, TIRE};
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    fn located(mut draft: BookingDraft) -> BookingDraft {
        draft.location = Location {
            full_address: "221B Baker Street, London".to_string(),
            coordinates: Some(Coordinates { lng: -0.1586, lat: 51.5238 }),
        };
        draft
    }

    #[test]
    fn test_new_draft_uses_config_defaults() {
        let draft = BookingDraft::new(&BATTERY);
        assert_eq!(draft.service_type, "replacement");
        assert_eq!(draft.attributes.get("batteryType").unwrap(), "standard");
        assert_eq!(draft.attributes.get("addJumpStart").unwrap(), "false");
        assert_eq!(draft.booking_type, BookingType::Scheduled);

        let emergency = BookingDraft::new(&EMERGENCY_RESCUE);
        assert_eq!(emergency.booking_type, BookingType::OnDemand);
    }

    #[test]
    fn test_validate_requires_location() {
        let mut draft = BookingDraft::new(&BATTERY);
        draft.booking_type = BookingType::OnDemand;
        assert_eq!(
            draft.validate(&BATTERY, now()),
            Err(ValidationError::MissingLocation)
        );
        assert_eq!(located(draft).validate(&BATTERY, now()), Ok(None));
    }

    #[test]
    fn test_validate_scheduled_requires_date_and_time() {
        let mut draft = located(BookingDraft::new(&TIRE));
        assert_eq!(
            draft.validate(&TIRE, now()),
            Err(ValidationError::MissingSchedule)
        );

        draft.scheduled_date = "tomorrow".to_string();
        draft.scheduled_time = "09:00".to_string();
        assert_eq!(
            draft.validate(&TIRE, now()),
            Err(ValidationError::InvalidSchedule)
        );

        draft.scheduled_date = "2026-10-18".to_string();
        let at = draft.validate(&TIRE, now()).unwrap().unwrap();
        assert_eq!(at.to_string(), "2026-10-18 09:00:00");
    }

    #[test]
    fn test_validate_rejects_past_schedule() {
        let mut draft = located(BookingDraft::new(&TIRE));
        draft.scheduled_date = "2026-10-17".to_string();
        draft.scheduled_time = "09:00".to_string();
        assert_eq!(
            draft.validate(&TIRE, now()),
            Err(ValidationError::ScheduleInPast)
        );

        // 当天稍后的时间是允许的
        draft.scheduled_time = "16:45".to_string();
        assert!(draft.validate(&TIRE, now()).is_ok());
    }

    #[test]
    fn test_validate_emergency_contact_fields() {
        let mut draft = located(BookingDraft::new(&EMERGENCY_RESCUE));
        assert_eq!(
            draft.validate(&EMERGENCY_RESCUE, now()),
            Err(ValidationError::Required("Contact name"))
        );

        draft.contact.contact_name = "Dana".to_string();
        draft.contact.contact_phone = "555-0100".to_string();
        assert_eq!(
            draft.validate(&EMERGENCY_RESCUE, now()),
            Err(ValidationError::Required("Description of the emergency"))
        );

        draft.contact.description = "Stuck on the shoulder of I-90".to_string();
        assert_eq!(draft.validate(&EMERGENCY_RESCUE, now()), Ok(None));
    }

    #[test]
    fn test_validate_emergency_cannot_be_scheduled() {
        let mut draft = located(BookingDraft::new(&EMERGENCY_RESCUE));
        draft.booking_type = BookingType::Scheduled;
        assert_eq!(
            draft.validate(&EMERGENCY_RESCUE, now()),
            Err(ValidationError::SchedulingUnavailable)
        );
    }

    #[test]
    fn test_validate_ignores_attributes_of_other_service_types() {
        let mut draft = located(BookingDraft::new(&BATTERY));
        draft.booking_type = BookingType::OnDemand;
        draft.service_type = "charging".to_string();
        draft.attributes.remove("batteryType");
        assert!(draft.validate(&BATTERY, now()).is_ok());

        draft.service_type = "replacement".to_string();
        assert_eq!(
            draft.validate(&BATTERY, now()),
            Err(ValidationError::MissingAttribute("Battery type"))
        );
    }

    #[test]
    fn test_service_details_mirror_draft() {
        let mut draft = located(BookingDraft::new(&BATTERY));
        draft.attributes.insert("addJumpStart".into(), "true".into());
        draft.vehicle_id = Some("car-1".to_string());
        let estimate = BATTERY.estimate(&draft).unwrap();

        let details = draft.service_details(&BATTERY, &estimate);
        assert_eq!(details["category"], "battery");
        assert_eq!(details["serviceType"], "replacement");
        assert_eq!(details["batteryType"], "standard");
        assert_eq!(details["addJumpStart"], true);
        assert_eq!(details["addInspection"], false);
        assert_eq!(details["vehicleId"], "car-1");
        assert_eq!(details["estimatedDuration"], "40-55");
        assert!(details.get("contactName").is_none());
    }

    #[test]
    fn test_special_instructions_combine_description_and_notes() {
        let mut draft = BookingDraft::new(&EMERGENCY_RESCUE);
        assert_eq!(draft.special_instructions(), "");
        draft.notes = "Gate code 4411".to_string();
        assert_eq!(draft.special_instructions(), "Gate code 4411");
        draft.contact.description = "Engine will not start".to_string();
        assert_eq!(
            draft.special_instructions(),
            "Engine will not start\nGate code 4411"
        );
    }
}
