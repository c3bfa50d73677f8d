use super::*;

#[test]
fn argb_components_roundtrip_through_channels() {
    let c = Argb(0x80FF_4010);
    assert_eq!(c.a(), 0x80);
    assert_eq!(c.r(), 0xFF);
    assert_eq!(c.g(), 0x40);
    assert_eq!(c.b(), 0x10);
    assert_eq!(c.to_channels(), [255.0, 64.0, 16.0, 128.0]);
    assert_eq!(Argb::from_channels(c.to_channels()), c);
}

#[test]
fn argb_from_channels_clamps_and_rounds() {
    let c = Argb::from_channels([300.0, -4.0, 127.6, f64::NAN]);
    assert_eq!(c, Argb::from_components(0, 255, 0, 128));
}

#[test]
fn rotation_conversion_roundtrips() {
    assert!((deg_to_rad(180.0) - std::f64::consts::PI).abs() < 1e-12);
    assert!((rad_to_deg(deg_to_rad(37.5)) - 37.5).abs() < 1e-12);
}
