use fitstat::defs::attrs;
use fitstat::*;
use std::sync::Arc;

fn bandwidth_data() -> Arc<SourceData> {
    SourceDataBuilder::new()
        .attribute(Attribute::new(attrs::DRONE_BANDWIDTH))
        .attribute(Attribute::new(attrs::DRONE_BANDWIDTH_USED))
        .item(ItemType::new(100, 4).attr(attrs::DRONE_BANDWIDTH, 50.0))
        .item(ItemType::new(101, 4))
        .item(ItemType::new(400, 56).attr(attrs::DRONE_BANDWIDTH_USED, 25.0))
        .item(ItemType::new(401, 56).attr(attrs::DRONE_BANDWIDTH_USED, 10.5))
        .item(ItemType::new(402, 56))
        .build()
}

#[test]
fn test_bandwidth_used_sums_online_drones() {
    let mut fit = Fit::new(bandwidth_data());
    fit.set_ship(100).unwrap();
    fit.add_drone(400, State::Online).unwrap();
    fit.add_drone(401, State::Online).unwrap();

    let stat = fit.drone_bandwidth();
    assert_eq!(stat.used, 35.5);
    assert_eq!(stat.output, Some(50.0));
}

#[test]
fn test_offline_drone_consumes_nothing() {
    let mut fit = Fit::new(bandwidth_data());
    fit.set_ship(100).unwrap();
    fit.add_drone(400, State::Online).unwrap();
    let idle = fit.add_drone(401, State::Offline).unwrap();

    assert_eq!(fit.drone_bandwidth().used, 25.0);

    fit.set_state(idle, State::Active).unwrap();
    assert_eq!(fit.drone_bandwidth().used, 35.5);
}

#[test]
fn test_drone_without_usage_attribute_skipped() {
    let mut fit = Fit::new(bandwidth_data());
    fit.set_ship(100).unwrap();
    fit.add_drone(400, State::Online).unwrap();
    fit.add_drone(402, State::Online).unwrap();
    assert_eq!(fit.drone_bandwidth().used, 25.0);
}

#[test]
fn test_output_none_without_ship() {
    let mut fit = Fit::new(bandwidth_data());
    fit.add_drone(400, State::Online).unwrap();
    let stat = fit.drone_bandwidth();
    assert_eq!(stat.used, 25.0);
    assert_eq!(stat.output, None);
}

#[test]
fn test_output_none_without_attribute() {
    let mut fit = Fit::new(bandwidth_data());
    fit.set_ship(101).unwrap();
    assert_eq!(fit.drone_bandwidth().output, None);
}

#[test]
fn test_stat_cache_cleared_by_mutation() {
    let mut fit = Fit::new(bandwidth_data());
    fit.set_ship(100).unwrap();
    fit.add_drone(400, State::Online).unwrap();
    assert_eq!(fit.drone_bandwidth().used, 25.0);

    // Cached value is returned as-is until something changes.
    assert_eq!(fit.drone_bandwidth().used, 25.0);

    fit.add_drone(401, State::Online).unwrap();
    assert_eq!(fit.drone_bandwidth().used, 35.5);
}

fn volley_data() -> Arc<SourceData> {
    SourceDataBuilder::new()
        .attribute(Attribute::new(attrs::DAMAGE_MULTIPLIER))
        .attribute(Attribute::new(attrs::EM_DAMAGE))
        .attribute(Attribute::new(attrs::THERMAL_DAMAGE))
        .attribute(Attribute::new(attrs::KINETIC_DAMAGE))
        .attribute(Attribute::new(attrs::EXPLOSIVE_DAMAGE))
        .item(
            ItemType::new(500, 100)
                .attr(attrs::EM_DAMAGE, 5.2)
                .attr(attrs::THERMAL_DAMAGE, 6.3)
                .attr(attrs::KINETIC_DAMAGE, 7.4)
                .attr(attrs::EXPLOSIVE_DAMAGE, 8.5)
                .attr(attrs::DAMAGE_MULTIPLIER, 5.5),
        )
        .item(
            ItemType::new(501, 100)
                .attr(attrs::EM_DAMAGE, 5.2)
                .attr(attrs::THERMAL_DAMAGE, 6.3)
                .attr(attrs::KINETIC_DAMAGE, 7.4)
                .attr(attrs::EXPLOSIVE_DAMAGE, 8.5),
        )
        .item(ItemType::new(510, 9).attr(attrs::DAMAGE_MULTIPLIER, 5.5))
        .item(
            ItemType::new(511, 12)
                .attr(attrs::EM_DAMAGE, 5.2)
                .attr(attrs::THERMAL_DAMAGE, 6.3)
                .attr(attrs::KINETIC_DAMAGE, 7.4)
                .attr(attrs::EXPLOSIVE_DAMAGE, 8.5),
        )
        .build()
}

fn assert_component(actual: Option<f64>, expected: f64) {
    let value = actual.unwrap();
    assert!(
        (value - expected).abs() < 1e-9,
        "got {value}, expected {expected}"
    );
}

#[test]
fn test_volley_splits_by_damage_type() {
    let mut fit = Fit::new(volley_data());
    let drone = fit.add_drone(500, State::Active).unwrap();
    let volley = fit.nominal_volley(drone).unwrap();
    assert_component(volley.em, 28.6);
    assert_component(volley.thermal, 34.65);
    assert_component(volley.kinetic, 40.7);
    assert_component(volley.explosive, 46.75);
    assert_component(volley.total(), 150.7);
}

#[test]
fn test_volley_multiplier_defaults_to_one() {
    let mut fit = Fit::new(volley_data());
    let drone = fit.add_drone(501, State::Active).unwrap();
    let volley = fit.nominal_volley(drone).unwrap();
    assert_component(volley.em, 5.2);
    assert_component(volley.total(), 27.4);
}

#[test]
fn test_volley_requires_active_state() {
    let mut fit = Fit::new(volley_data());
    let drone = fit.add_drone(500, State::Online).unwrap();
    let volley = fit.nominal_volley(drone).unwrap();
    assert_eq!(volley, Volley::default());
    assert_eq!(volley.total(), None);
}

#[test]
fn test_volley_reads_loaded_charge() {
    let mut fit = Fit::new(volley_data());
    let module = fit.add_module(510, State::Active).unwrap();
    // An empty launcher deals nothing.
    assert_eq!(fit.nominal_volley(module).unwrap().total(), None);

    fit.set_charge(module, 511).unwrap();
    let volley = fit.nominal_volley(module).unwrap();
    assert_component(volley.em, 28.6);
    assert_component(volley.thermal, 34.65);
    assert_component(volley.kinetic, 40.7);
    assert_component(volley.explosive, 46.75);
    assert_component(volley.total(), 150.7);
}

#[test]
fn test_volley_against_resistances() {
    let mut fit = Fit::new(volley_data());
    let drone = fit.add_drone(500, State::Active).unwrap();
    let target = ResistanceProfile {
        em: 0.2,
        thermal: 0.2,
        kinetic: 0.8,
        explosive: 1.0,
    };
    let volley = fit.nominal_volley_against(drone, &target).unwrap();
    assert_component(volley.em, 22.88);
    assert_component(volley.thermal, 27.72);
    assert_component(volley.kinetic, 8.14);
    assert_component(volley.explosive, 0.0);
    assert_component(volley.total(), 58.74);
}

#[test]
fn test_volley_cache_cleared_by_mutation() {
    let mut fit = Fit::new(volley_data());
    let drone = fit.add_drone(500, State::Active).unwrap();
    assert_component(fit.nominal_volley(drone).unwrap().total(), 150.7);

    fit.set_state(drone, State::Online).unwrap();
    assert_eq!(fit.nominal_volley(drone).unwrap().total(), None);
}

#[test]
fn test_modified_usage_counts() {
    let inflate = Effect::new(10, EffectCategory::Passive).modifier(Modifier {
        state: State::Offline,
        scope: Scope::Local,
        domain: Domain::Itself,
        filter: ModFilter::Direct,
        operator: Operator::PostMul,
        src: ModSrc::Literal(2.0),
        tgt_attr: attrs::DRONE_BANDWIDTH_USED,
    });
    let data = SourceDataBuilder::new()
        .attribute(Attribute::new(attrs::DRONE_BANDWIDTH))
        .attribute(Attribute::new(attrs::DRONE_BANDWIDTH_USED))
        .item(ItemType::new(100, 4).attr(attrs::DRONE_BANDWIDTH, 50.0))
        .item(
            ItemType::new(400, 56)
                .attr(attrs::DRONE_BANDWIDTH_USED, 25.0)
                .effect(Arc::new(inflate)),
        )
        .build();
    let mut fit = Fit::new(data);
    fit.set_ship(100).unwrap();
    fit.add_drone(400, State::Online).unwrap();
    // The statistic reads modified values, not base values.
    assert_eq!(fit.drone_bandwidth().used, 50.0);
}
