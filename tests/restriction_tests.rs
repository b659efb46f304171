use fitstat::defs::attrs;
use fitstat::*;

fn data_with_hulls() -> std::sync::Arc<SourceData> {
    SourceDataBuilder::new()
        .item(
            ItemType::new(100, 4)
                .attr(attrs::ALLOWED_DRONE_GROUP_1, 56.0)
                .attr(attrs::ALLOWED_DRONE_GROUP_2, 70.0),
        )
        .item(ItemType::new(101, 4).attr(attrs::ALLOWED_DRONE_GROUP_1, 56.0))
        .item(ItemType::new(102, 4))
        .item(ItemType::new(400, 56)) // drone of an allowed group
        .item(ItemType::new(401, 70))
        .item(ItemType::new(402, 88)) // drone of a forbidden group
        .build()
}

#[test]
fn test_allowed_drones_pass() {
    let mut fit = Fit::new(data_with_hulls());
    fit.set_ship(100).unwrap();
    fit.add_drone(400, State::Online).unwrap();
    fit.add_drone(401, State::Online).unwrap();
    assert!(fit.validate().is_ok());
}

#[test]
fn test_forbidden_drone_reported() {
    let mut fit = Fit::new(data_with_hulls());
    fit.set_ship(101).unwrap();
    fit.add_drone(400, State::Online).unwrap();
    let bad = fit.add_drone(402, State::Online).unwrap();

    let err = fit.validate().unwrap_err();
    assert_eq!(err.failures.len(), 1);
    assert_eq!(
        err.failures[&bad],
        vec![RestrictionFailure::DroneGroup {
            group: 88,
            allowed_groups: vec![56],
        }]
    );
}

#[test]
fn test_validation_has_no_side_effects() {
    let mut fit = Fit::new(data_with_hulls());
    fit.set_ship(101).unwrap();
    let bad = fit.add_drone(402, State::Online).unwrap();
    assert!(fit.validate().is_err());
    // The invalid fit keeps working: validation never removes holders.
    assert!(fit.holder(bad).is_some());
    assert!(fit.validate().is_err());
}

#[test]
fn test_hull_without_restriction_allows_all() {
    let mut fit = Fit::new(data_with_hulls());
    fit.set_ship(102).unwrap();
    fit.add_drone(402, State::Online).unwrap();
    assert!(fit.validate().is_ok());
}

#[test]
fn test_no_ship_allows_all() {
    let mut fit = Fit::new(data_with_hulls());
    fit.add_drone(402, State::Online).unwrap();
    assert!(fit.validate().is_ok());
}

#[test]
fn test_removed_drone_no_longer_reported() {
    let mut fit = Fit::new(data_with_hulls());
    fit.set_ship(101).unwrap();
    let bad = fit.add_drone(402, State::Online).unwrap();
    assert!(fit.validate().is_err());
    fit.remove_drone(bad).unwrap();
    assert!(fit.validate().is_ok());
}

/// The restriction reads the hull's original attributes; a modified
/// allowed-group value changes nothing.
#[test]
fn test_restriction_ignores_modified_values() {
    use std::sync::Arc;
    let relax = Effect::new(10, EffectCategory::Passive).modifier(Modifier {
        state: State::Offline,
        scope: Scope::Local,
        domain: Domain::Ship,
        filter: ModFilter::Direct,
        operator: Operator::PostAssign,
        src: ModSrc::Literal(88.0),
        tgt_attr: attrs::ALLOWED_DRONE_GROUP_1,
    });
    let data = SourceDataBuilder::new()
        .attribute(Attribute::new(attrs::ALLOWED_DRONE_GROUP_1))
        .item(ItemType::new(101, 4).attr(attrs::ALLOWED_DRONE_GROUP_1, 56.0))
        .item(ItemType::new(200, 9).effect(Arc::new(relax)))
        .item(ItemType::new(402, 88))
        .build();
    let mut fit = Fit::new(data);
    let ship = fit.set_ship(101).unwrap();
    fit.add_module(200, State::Offline).unwrap();
    fit.add_drone(402, State::Online).unwrap();

    assert_eq!(fit.attr(ship, attrs::ALLOWED_DRONE_GROUP_1).unwrap(), 88.0);
    assert_eq!(fit.original_attr(ship, attrs::ALLOWED_DRONE_GROUP_1), Ok(56.0));
    assert!(fit.validate().is_err());
}
