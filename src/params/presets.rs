//! Built-in control presets.

use super::ParameterSet;

pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub params: ParameterSet,
}

pub const CLASSIC_HUM: ParameterSet = ParameterSet {
    threshold: 0.6,
    smoothness: 500.0,
    spark_gain: 30.0,
    noise_gain: 0.4,
    hum_gain: 0.5,
    hum120_gain: 0.2,
    hum180_gain: 0.15,
    hum300_gain: 0.1,
    ring_mod_enabled: false,
    carrier_freq: 800.0,
    wow_flutter_depth: 0.0,
    saturation: 0.0,
    master_volume: 0.3,
};

pub const HEAVY_CRACKLE: ParameterSet = ParameterSet {
    threshold: 0.3,
    smoothness: 100.0,
    spark_gain: 150.0,
    noise_gain: 0.7,
    hum_gain: 0.3,
    hum120_gain: 0.15,
    hum180_gain: 0.1,
    hum300_gain: 0.05,
    master_volume: 0.4,
    ..CLASSIC_HUM
};

pub const ETHEREAL_DRONE: ParameterSet = ParameterSet {
    threshold: 0.8,
    smoothness: 1500.0,
    spark_gain: 20.0,
    noise_gain: 0.2,
    hum_gain: 0.7,
    hum120_gain: 0.3,
    hum180_gain: 0.25,
    hum300_gain: 0.15,
    master_volume: 0.35,
    ..CLASSIC_HUM
};

pub const UNSTABLE_SIGNAL: ParameterSet = ParameterSet {
    threshold: 0.4,
    smoothness: 200.0,
    spark_gain: 120.0,
    noise_gain: 0.6,
    hum_gain: 0.4,
    hum120_gain: 0.25,
    hum180_gain: 0.2,
    hum300_gain: 0.15,
    master_volume: 0.38,
    ..CLASSIC_HUM
};

pub const DEEP_RUMBLE: ParameterSet = ParameterSet {
    threshold: 0.55,
    smoothness: 800.0,
    spark_gain: 40.0,
    noise_gain: 0.3,
    hum_gain: 0.8,
    hum120_gain: 0.4,
    hum180_gain: 0.2,
    hum300_gain: 0.1,
    master_volume: 0.32,
    ..CLASSIC_HUM
};

pub static PRESETS: [Preset; 5] = [
    Preset {
        name: "Classic Hum",
        description: "Balanced 60Hz drone with subtle crackling",
        params: CLASSIC_HUM,
    },
    Preset {
        name: "Heavy Crackle",
        description: "Aggressive sparks with prominent electrical noise",
        params: HEAVY_CRACKLE,
    },
    Preset {
        name: "Ethereal Drone",
        description: "Smooth, haunting tone with minimal interference",
        params: ETHEREAL_DRONE,
    },
    Preset {
        name: "Unstable Signal",
        description: "Chaotic modulation with heavy sparking",
        params: UNSTABLE_SIGNAL,
    },
    Preset {
        name: "Deep Rumble",
        description: "Low frequency emphasis with organic fluctuation",
        params: DEEP_RUMBLE,
    },
];

/// Case-insensitive lookup; dashes and underscores match spaces.
pub fn by_name(name: &str) -> Option<&'static Preset> {
    let wanted = name.trim().replace(['-', '_'], " ");
    PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(&wanted))
}
