//! Configuration resolution: capability files and environment profiles.

mod flatten;
mod profile;
mod resolver;

pub use profile::{
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, HOST_OVERRIDE_VAR, PORT_OVERRIDE_VAR,
    PROFILE_ENV_VAR, Profile, ServerTarget,
};
pub use resolver::{
    CAPABILITIES_DIR, ConfigurationResolver, EnvLookup, EnvOverride, PROFILES_DIR,
};
