// tests/destination.rs

mod common;
use crate::common::builders::IntentBuilder;

use proptest::prelude::*;
use xcpilot::build::{compose_destination, destination_for, Selector};
use xcpilot::types::Platform;

#[test]
fn simulator_id_gives_id_qualified_destination() {
    let intent = IntentBuilder::new().simulator_id("SIM1").build();
    assert_eq!(destination_for(&intent), "platform=iOS Simulator,id=SIM1");
}

#[test]
fn device_id_gives_id_qualified_destination() {
    let intent = IntentBuilder::new()
        .platform(Platform::Ios)
        .device_id("00008110-001A")
        .build();
    assert_eq!(destination_for(&intent), "platform=iOS,id=00008110-001A");
}

#[test]
fn simulator_name_without_latest_os() {
    let intent = IntentBuilder::new()
        .simulator_name("iPhone 16", false)
        .build();
    assert_eq!(
        destination_for(&intent),
        "platform=iOS Simulator,name=iPhone 16"
    );
}

#[test]
fn simulator_name_with_latest_os() {
    let intent = IntentBuilder::new()
        .platform(Platform::VisionOsSimulator)
        .simulator_name("Apple Vision Pro", true)
        .build();
    assert_eq!(
        destination_for(&intent),
        "platform=visionOS Simulator,name=Apple Vision Pro,OS=latest"
    );
}

#[test]
fn macos_without_selector() {
    assert_eq!(
        compose_destination(Platform::MacOs, None, &[]),
        "platform=macOS"
    );
}

#[test]
fn macos_with_single_arch() {
    assert_eq!(
        compose_destination(Platform::MacOs, None, &["arm64".to_string()]),
        "platform=macOS,arch=arm64"
    );
}

#[test]
fn macos_with_multiple_archs_has_no_arch_qualifier() {
    let archs = vec!["arm64".to_string(), "x86_64".to_string()];
    assert_eq!(
        compose_destination(Platform::MacOs, None, &archs),
        "platform=macOS"
    );
}

#[test]
fn other_platforms_without_selector_are_generic() {
    assert_eq!(
        compose_destination(Platform::TvOs, None, &[]),
        "generic/platform=tvOS"
    );
    assert_eq!(
        compose_destination(Platform::WatchOsSimulator, None, &[]),
        "generic/platform=watchOS Simulator"
    );
}

fn platform_strategy() -> impl Strategy<Value = Platform> {
    prop::sample::select(Platform::ALL.to_vec())
}

fn ident_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9-]{1,36}"
}

proptest! {
    #[test]
    fn identifier_always_wins_and_latest_os_is_ignored(
        platform in platform_strategy(),
        id in ident_strategy(),
        use_device in any::<bool>(),
    ) {
        let selector = if use_device {
            Selector::DeviceId(id.clone())
        } else {
            Selector::SimulatorId(id.clone())
        };
        let dest = compose_destination(platform, Some(&selector), &[]);
        prop_assert_eq!(
            dest.clone(),
            format!("platform={},id={}", platform.as_destination_str(), id)
        );
        prop_assert!(!dest.contains("OS=latest"));
        prop_assert!(!dest.contains("name="));
    }

    #[test]
    fn name_destination_has_latest_os_only_when_requested(
        platform in platform_strategy(),
        name in "[A-Za-z0-9 ()]{1,30}",
        use_latest_os in any::<bool>(),
    ) {
        let selector = Selector::SimulatorName { name: name.clone(), use_latest_os };
        let dest = compose_destination(platform, Some(&selector), &[]);
        let prefix = format!("platform={},name={}", platform.as_destination_str(), name);
        prop_assert!(dest.starts_with(&prefix));
        prop_assert_eq!(dest.ends_with(",OS=latest"), use_latest_os);
        prop_assert!(!dest.contains(",id="));
    }
}
