use std::str::FromStr;

use crate::limits::MAX_TOP_SLOTS;
use crate::model::ResourceType;

/// How the console renders results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("capacity for {0} must be positive")]
    ZeroCapacity(ResourceType),
    #[error("capacity {1} for {0} exceeds limit")]
    CapacityTooLarge(ResourceType, u32),
    #[error("resource {0} registered twice")]
    DuplicateResource(ResourceType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Resource types and their unit counts, in registration order.
    pub capacities: Vec<(ResourceType, u32)>,
    /// Rows shown by the `summary` command.
    pub top_slots: usize,
    pub output: OutputFormat,
    pub metrics_port: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacities: ResourceType::ALL
                .into_iter()
                .map(|rt| (rt, default_capacity(rt)))
                .collect(),
            top_slots: 5,
            output: OutputFormat::Text,
            metrics_port: None,
        }
    }
}

pub fn default_capacity(resource_type: ResourceType) -> u32 {
    match resource_type {
        ResourceType::Bed => 100,
        ResourceType::Ventilator | ResourceType::Ultrasound | ResourceType::Electrocardiograph => 50,
    }
}

/// Environment key for a resource's capacity, e.g. `CAREPOOL_CAPACITY_BED`.
pub fn capacity_key(resource_type: ResourceType) -> String {
    format!("CAREPOOL_CAPACITY_{}", resource_type.as_str().to_ascii_uppercase())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        for (resource_type, capacity) in config.capacities.iter_mut() {
            let key = capacity_key(*resource_type);
            if let Some(value) = lookup(&key) {
                *capacity = parse_value(&key, &value)?;
                if *capacity == 0 {
                    return Err(ConfigError::ZeroCapacity(*resource_type));
                }
            }
        }
        if let Some(value) = lookup("CAREPOOL_TOP_SLOTS") {
            let top: usize = parse_value("CAREPOOL_TOP_SLOTS", &value)?;
            config.top_slots = top.min(MAX_TOP_SLOTS);
        }
        if let Some(value) = lookup("CAREPOOL_OUTPUT") {
            config.output = value.parse().map_err(|()| invalid("CAREPOOL_OUTPUT", &value))?;
        }
        if let Some(value) = lookup("CAREPOOL_METRICS_PORT") {
            config.metrics_port = Some(parse_value("CAREPOOL_METRICS_PORT", &value)?);
        }
        Ok(config)
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_hospital_inventory() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(
            config.capacities,
            vec![
                (ResourceType::Bed, 100),
                (ResourceType::Ventilator, 50),
                (ResourceType::Ultrasound, 50),
                (ResourceType::Electrocardiograph, 50),
            ]
        );
        assert_eq!(config.top_slots, 5);
        assert_eq!(config.output, OutputFormat::Text);
        assert_eq!(config.metrics_port, None);
    }

    #[test]
    fn overrides_from_lookup() {
        let config = Config::from_lookup(lookup_from(&[
            ("CAREPOOL_CAPACITY_VENTILATOR", "2"),
            ("CAREPOOL_TOP_SLOTS", "3"),
            ("CAREPOOL_OUTPUT", "JSON"),
            ("CAREPOOL_METRICS_PORT", "9100"),
        ]))
        .unwrap();
        assert_eq!(config.capacities[1], (ResourceType::Ventilator, 2));
        assert_eq!(config.capacities[0], (ResourceType::Bed, 100));
        assert_eq!(config.top_slots, 3);
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.metrics_port, Some(9100));
    }

    #[test]
    fn rejects_bad_values() {
        let err = Config::from_lookup(lookup_from(&[("CAREPOOL_CAPACITY_BED", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(err.to_string().contains("CAREPOOL_CAPACITY_BED"));

        let err = Config::from_lookup(lookup_from(&[("CAREPOOL_CAPACITY_BED", "0")])).unwrap_err();
        assert_eq!(err, ConfigError::ZeroCapacity(ResourceType::Bed));

        let err = Config::from_lookup(lookup_from(&[("CAREPOOL_OUTPUT", "xml")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn top_slots_clamped() {
        let config = Config::from_lookup(lookup_from(&[("CAREPOOL_TOP_SLOTS", "999999")])).unwrap();
        assert_eq!(config.top_slots, MAX_TOP_SLOTS);
    }

    #[test]
    fn capacity_keys() {
        assert_eq!(capacity_key(ResourceType::Bed), "CAREPOOL_CAPACITY_BED");
        assert_eq!(
            capacity_key(ResourceType::Electrocardiograph),
            "CAREPOOL_CAPACITY_ELECTROCARDIOGRAPH"
        );
    }
}
