//! Resolution against the sample files shipped in the repository's `config/`.

use std::path::PathBuf;

use droidrig_core::{
    CapabilityValue, ConfigurationResolver, Profile, ServerTarget, SourceFormat,
};

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn resolver() -> ConfigurationResolver {
    ConfigurationResolver::new(repo_root()).with_env_lookup(|_| None)
}

#[test]
fn android_dev_uses_json() {
    let set = resolver().resolve("android", "dev").unwrap();

    assert_eq!(set.provenance().source_format, SourceFormat::Json);
    assert_eq!(set.get("appium:noReset"), Some(&CapabilityValue::Bool(true)));
    assert_eq!(
        set.get("appium:newCommandTimeout"),
        Some(&CapabilityValue::Int(300))
    );
}

#[test]
fn android_staging_falls_back_to_yaml() {
    let set = resolver().resolve("android", "staging").unwrap();

    assert_eq!(set.provenance().source_format, SourceFormat::Yaml);
    // Quoted in YAML, still coerced from its text
    assert_eq!(
        set.get("appium:platformVersion"),
        Some(&CapabilityValue::Float(15.0))
    );
}

#[test]
fn resolved_values_survive_display_round_trip() {
    let set = resolver().resolve("android", "dev").unwrap();
    for (key, value) in set.iter() {
        assert_eq!(
            &CapabilityValue::coerce(&value.to_string()),
            value,
            "{key} changed when re-parsed"
        );
    }
}

#[test]
fn local_profile_flattens_nested_drivers() {
    let set = resolver().resolve_named_profile(Profile::Local).unwrap();

    assert_eq!(
        set.get("drivers.uiautomator2.emulators[0].deviceName"),
        Some(&CapabilityValue::String("Pixel 8 Pro API 35".to_string()))
    );
    assert_eq!(
        ServerTarget::from_capabilities(&set).url(),
        "http://127.0.0.1:4723"
    );
}

#[test]
fn profile_env_selects_production_and_port_override_applies() {
    let resolver = ConfigurationResolver::new(repo_root()).with_env_lookup(|name| match name {
        "APPIUM_ENV" => Some("production".to_string()),
        "APPIUM_PORT" => Some("8443".to_string()),
        _ => None,
    });
    let set = resolver.resolve_profile().unwrap();
    let target = ServerTarget::from_capabilities(&set);

    assert_eq!(target.host, "appium.prod.internal");
    assert_eq!(target.port, 8443);
    assert_eq!(set.provenance().overridden_keys, vec!["server.port".to_string()]);
}
