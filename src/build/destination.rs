// src/build/destination.rs

//! Destination selector composition.
//!
//! Rules, in priority order:
//! 1. identifier present: `platform=<P>,id=<ID>` (an identifier already pins
//!    the OS, so "use latest OS" is ignored);
//! 2. simulator name present: `platform=<P>,name=<NAME>[,OS=latest]`;
//! 3. platform only: `platform=macOS[,arch=<A>]` for macOS,
//!    `generic/platform=<P>` for everything else.

use crate::build::intent::{BuildIntent, Selector};
use crate::types::Platform;

pub fn compose_destination(
    platform: Platform,
    selector: Option<&Selector>,
    archs: &[String],
) -> String {
    let p = platform.as_destination_str();
    match selector {
        Some(Selector::DeviceId(id)) | Some(Selector::SimulatorId(id)) => {
            format!("platform={p},id={id}")
        }
        Some(Selector::SimulatorName {
            name,
            use_latest_os,
        }) => {
            if *use_latest_os {
                format!("platform={p},name={name},OS=latest")
            } else {
                format!("platform={p},name={name}")
            }
        }
        None if platform == Platform::MacOs => match archs {
            [arch] => format!("platform=macOS,arch={arch}"),
            _ => "platform=macOS".to_string(),
        },
        None => format!("generic/platform={p}"),
    }
}

pub fn destination_for(intent: &BuildIntent) -> String {
    compose_destination(intent.platform, intent.selector.as_ref(), &intent.archs)
}
