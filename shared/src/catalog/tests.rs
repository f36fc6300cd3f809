use super::*;
use crate::draft::BookingDraft;
use proptest::prelude::*;

// =========================================================
// 辅助函数
// =========================================================

fn draft(
    config: &CategoryConfig,
    service_type: &str,
    attributes: &[(&str, &str)],
    booking_type: BookingType,
) -> BookingDraft {
    let mut draft = BookingDraft::new(config);
    draft.service_type = service_type.to_string();
    for (key, value) in attributes {
        draft.attributes.insert(key.to_string(), value.to_string());
    }
    draft.booking_type = booking_type;
    draft
}

fn price_of(config: &CategoryConfig, draft: &BookingDraft) -> Price {
    config.estimate(draft).unwrap().price
}

// =========================================================
// 典型场景
// =========================================================

#[test]
fn test_battery_premium_replacement_on_demand() {
    let d = draft(
        &BATTERY,
        "replacement",
        &[("batteryType", "premium"), ("addJumpStart", "true"), ("addInspection", "false")],
        BookingType::OnDemand,
    );
    assert_eq!(price_of(&BATTERY, &d), Price::dollars(225));
}

#[test]
fn test_tire_change_three_tires_scheduled() {
    let d = draft(&TIRE, "tireChange", &[("tireCount", "3")], BookingType::Scheduled);
    let estimate = TIRE.estimate(&d).unwrap();
    assert_eq!(estimate.price, Price::dollars(75));
    assert_eq!(estimate.duration.to_string(), "45-60");
}

#[test]
fn test_engine_oil_full_service_synthetic_truck() {
    let d = draft(
        &ENGINE_OIL,
        "fullService",
        &[("oilType", "synthetic"), ("vehicleType", "truck")],
        BookingType::Scheduled,
    );
    assert_eq!(price_of(&ENGINE_OIL, &d), Price::dollars(105));
}

#[test]
fn test_emergency_towing_suv_inaccessible() {
    let d = draft(
        &EMERGENCY_RESCUE,
        "towing",
        &[("vehicleType", "suv"), ("isVehicleAccessible", "no")],
        BookingType::OnDemand,
    );
    let estimate = EMERGENCY_RESCUE.estimate(&d).unwrap();
    assert_eq!(estimate.price, Price::dollars(115));
    assert_eq!(estimate.duration.to_string(), "60-75");
}

#[test]
fn test_fuel_priced_per_gallon_plus_delivery_fee() {
    let d = draft(&FUEL, "regular", &[("quantity", "10")], BookingType::Scheduled);
    let estimate = FUEL.estimate(&d).unwrap();
    assert_eq!(estimate.price, Price::from_cents(4490));
    assert_eq!(estimate.price.to_string(), "$44.90");
    assert_eq!(estimate.duration, DurationRange { lo: 30, hi: 45 });
}

#[test]
fn test_car_wash_addons_and_vehicle_surcharge() {
    let d = draft(
        &CAR_WASH,
        "deluxe",
        &[("vehicleType", "suv"), ("interiorCleaning", "true"), ("waxing", "false")],
        BookingType::Scheduled,
    );
    let estimate = CAR_WASH.estimate(&d).unwrap();
    assert_eq!(estimate.price, Price::dollars(45 + 10 + 20));
    assert_eq!(estimate.duration, DurationRange { lo: 90, hi: 105 });
}

#[test]
fn test_flat_tire_service_ignores_tire_count() {
    let one = draft(&TIRE, "rotation", &[("tireCount", "1")], BookingType::Scheduled);
    let four = draft(&TIRE, "rotation", &[("tireCount", "4")], BookingType::Scheduled);
    assert_eq!(price_of(&TIRE, &one), Price::dollars(40));
    assert_eq!(price_of(&TIRE, &one), price_of(&TIRE, &four));
}

#[test]
fn test_filter_surcharge_only_for_applicable_service_types() {
    let top_up = draft(
        &ENGINE_OIL,
        "oilTopUp",
        &[("oilType", "conventional"), ("filterReplacement", "true")],
        BookingType::Scheduled,
    );
    assert_eq!(price_of(&ENGINE_OIL, &top_up), Price::dollars(20));

    let change = draft(
        &ENGINE_OIL,
        "oilChange",
        &[("oilType", "conventional"), ("filterReplacement", "true")],
        BookingType::Scheduled,
    );
    assert_eq!(price_of(&ENGINE_OIL, &change), Price::dollars(55));
}

// =========================================================
// 错误输入
// =========================================================

#[test]
fn test_unknown_service_type_is_rejected() {
    let d = draft(&BATTERY, "teleport", &[], BookingType::Scheduled);
    assert_eq!(
        BATTERY.estimate(&d),
        Err(ValidationError::UnknownServiceType("teleport".to_string()))
    );
}

#[test]
fn test_option_outside_table_is_rejected() {
    let d = draft(&BATTERY, "replacement", &[("batteryType", "lithium")], BookingType::Scheduled);
    assert!(matches!(
        BATTERY.estimate(&d),
        Err(ValidationError::InvalidAttribute { .. })
    ));
}

#[test]
fn test_check_attribute_membership() {
    assert!(TIRE.check_attribute("tireCount", "4").is_ok());
    assert!(TIRE.check_attribute("tireCount", "5").is_err());
    assert!(BATTERY.check_attribute("addJumpStart", "true").is_ok());
    assert!(BATTERY.check_attribute("addJumpStart", "yes").is_err());
    assert!(BATTERY.check_attribute("colour", "red").is_err());
}

#[test]
fn test_every_default_is_accepted() {
    for category in ServiceCategory::ALL {
        let config = category.config();
        assert_eq!(config.category, category);
        for spec in config.attributes {
            assert!(
                spec.accepts(spec.default),
                "{}: default `{}` for {} is not an option",
                category,
                spec.default,
                spec.key
            );
        }
        // 默认草稿总是可以估价
        let d = BookingDraft::new(config);
        assert!(config.estimate(&d).is_ok(), "{category} default draft");
    }
}

#[test]
fn test_display_name_falls_back_to_title() {
    assert_eq!(BATTERY.display_name("charging"), "Battery Services - Battery Charging");
    assert_eq!(BATTERY.display_name("nope"), "Battery Services");
}

#[test]
fn test_price_display() {
    assert_eq!(Price::dollars(225).to_string(), "$225");
    assert_eq!(Price::from_cents(1205).to_string(), "$12.05");
    assert_eq!(Price::from_cents(4490).as_dollars(), 44.9);
}

// =========================================================
// 性质测试
// =========================================================

/// 为某个类别生成任意合法草稿
fn arb_draft(category: ServiceCategory) -> impl Strategy<Value = BookingDraft> {
    let config = category.config();
    let service_types: Vec<&'static str> = config.service_types.iter().map(|s| s.key).collect();
    let attribute_values: Vec<_> = config
        .attributes
        .iter()
        .map(|spec| {
            let values: Vec<&'static str> = match spec.kind {
                AttributeKind::Choice(choices) => choices.iter().map(|c| c.value).collect(),
                AttributeKind::Toggle => vec!["true", "false"],
            };
            prop::sample::select(values).prop_map(move |v| (spec.key, v))
        })
        .collect();

    (prop::sample::select(service_types), attribute_values).prop_map(move |(service_type, attrs)| {
        let mut d = BookingDraft::new(config);
        d.service_type = service_type.to_string();
        for (key, value) in attrs {
            d.attributes.insert(key.to_string(), value.to_string());
        }
        d
    })
}

fn arb_any_draft() -> impl Strategy<Value = BookingDraft> {
    prop::sample::select(ServiceCategory::ALL.to_vec()).prop_flat_map(arb_draft)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 512,
        ..ProptestConfig::default()
    })]

    /// Property: 估价是草稿的纯函数
    #[test]
    fn estimate_is_deterministic(d in arb_any_draft()) {
        let config = d.category.config();
        let first = config.estimate(&d).unwrap();
        let second = config.estimate(&d.clone()).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Property: 切换为即时服务只增加该类别的固定加价
    #[test]
    fn on_demand_adds_exactly_the_surcharge(d in arb_any_draft()) {
        let config = d.category.config();
        let mut scheduled = d.clone();
        scheduled.booking_type = BookingType::Scheduled;
        let mut on_demand = d;
        on_demand.booking_type = BookingType::OnDemand;

        let base = config.estimate(&scheduled).unwrap();
        let rushed = config.estimate(&on_demand).unwrap();
        prop_assert_eq!(rushed.price, base.price + config.on_demand_surcharge());
        prop_assert_eq!(rushed.duration, base.duration);
    }

    /// Property: 时长区间宽度固定为缓冲值
    #[test]
    fn duration_range_width_is_buffer(d in arb_any_draft()) {
        let config = d.category.config();
        let estimate = config.estimate(&d).unwrap();
        prop_assert_eq!(estimate.duration.hi - estimate.duration.lo, config.duration_buffer);
    }
}
