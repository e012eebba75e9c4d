//! Gauge table plumbing and label encoders shared by the gatherer stages.

use std::collections::HashMap;

use prometheus::{GaugeVec, Opts, Registry};

/// Declarative description of one labeled gauge. The label order is the
/// positional key used when setting values.
pub struct GaugeSpec {
    pub name: &'static str,
    pub help: &'static str,
    pub labels: &'static [&'static str],
}

/// Build one empty [`GaugeVec`] per spec and register each into the
/// registry exactly once. Registering a name that already exists fails
/// with [`prometheus::Error::AlreadyReg`] rather than silently
/// overwriting, so re-running a stage against the same registry is caught
/// loudly.
pub fn register_gauges(
    registry: &Registry,
    specs: &'static [GaugeSpec],
) -> Result<HashMap<&'static str, GaugeVec>, prometheus::Error> {
    let mut gauges = HashMap::with_capacity(specs.len());
    for spec in specs {
        let gauge = GaugeVec::new(Opts::new(spec.name, spec.help), spec.labels)?;
        registry.register(Box::new(gauge.clone()))?;
        gauge.reset();
        gauges.insert(spec.name, gauge);
    }
    Ok(gauges)
}

pub fn bool_label(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

pub fn bool_value(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// Normalize a textual health field to a gauge value: the literal `"ok"`
/// counts as true, anything else must parse as a boolean; unparseable
/// values are unhealthy.
pub fn health_value(health: &str) -> f64 {
    let normalized = if health == "ok" { "true" } else { health };
    match normalized.parse::<bool>() {
        Ok(true) => 1.0,
        _ => 0.0,
    }
}

/// Extract the interface identifier out of a device resource path, e.g.
/// `"0"` out of `/api/v1/units/D02018/network_interfaces/0`. Paths with
/// fewer than seven `/`-separated segments are used unchanged.
pub fn interface_id(path: &str) -> &str {
    match path.split('/').nth(6) {
        Some(id) => id,
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPECS: &[GaugeSpec] = &[
        GaugeSpec {
            name: "test_one",
            help: "First test gauge",
            labels: &["a", "b"],
        },
        GaugeSpec {
            name: "test_two",
            help: "Second test gauge",
            labels: &[],
        },
    ];

    #[test]
    fn register_gauges_builds_empty_collections() {
        let registry = Registry::new();
        let gauges = register_gauges(&registry, SPECS).unwrap();

        assert_eq!(gauges.len(), 2);
        // Nothing set yet: no samples are exposed.
        assert!(registry.gather().is_empty());

        gauges["test_one"].with_label_values(&["x", "y"]).set(1.5);
        assert_eq!(registry.gather().len(), 1);
    }

    #[test]
    fn register_gauges_rejects_duplicate_registration() {
        let registry = Registry::new();
        register_gauges(&registry, SPECS).unwrap();

        let err = register_gauges(&registry, SPECS).unwrap_err();
        assert!(matches!(err, prometheus::Error::AlreadyReg));
    }

    #[test]
    fn bool_label_renders_literals() {
        assert_eq!(bool_label(true), "true");
        assert_eq!(bool_label(false), "false");
    }

    #[test]
    fn bool_value_renders_zero_and_one() {
        assert_eq!(bool_value(true), 1.0);
        assert_eq!(bool_value(false), 0.0);
    }

    #[test]
    fn health_value_treats_ok_as_healthy() {
        assert_eq!(health_value("ok"), 1.0);
        assert_eq!(health_value("true"), 1.0);
        assert_eq!(health_value("false"), 0.0);
        assert_eq!(health_value("degraded"), 0.0);
        assert_eq!(health_value(""), 0.0);
    }

    #[test]
    fn interface_id_extracts_seventh_segment() {
        assert_eq!(
            interface_id("/api/v1/units/D02018/network_interfaces/0"),
            "0"
        );
        assert_eq!(
            interface_id("/api/v1/units/D02018/network_interfaces/1"),
            "1"
        );
    }

    #[test]
    fn interface_id_falls_back_to_raw_path() {
        assert_eq!(interface_id("eth0"), "eth0");
        assert_eq!(interface_id("/short/path"), "/short/path");
    }
}
