use std::collections::BTreeMap;

use lsrsim_frame::{Address, Label};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RouteMiss, RouterError};

/// The three static lookup structures a router is built with.
///
/// Interface-scoped tables are keyed by incoming interface index first, so each
/// inner map is that interface's own table. Lookups never fall back to a default:
/// a missing entry is a [`RouteMiss`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardingTables {
    /// incoming interface -> destination -> label
    #[serde(default)]
    pub encap: BTreeMap<usize, BTreeMap<Address, Label>>,
    /// label -> outgoing interface
    #[serde(default)]
    pub forward: BTreeMap<Label, usize>,
    /// incoming interface -> label -> outgoing interface
    #[serde(default)]
    pub decap: BTreeMap<usize, BTreeMap<Label, usize>>,
}

impl ForwardingTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encap(mut self, interface: usize, destination: Address, label: Label) -> Self {
        self.encap
            .entry(interface)
            .or_default()
            .insert(destination, label);
        self
    }

    pub fn with_forward(mut self, label: Label, out_interface: usize) -> Self {
        self.forward.insert(label, out_interface);
        self
    }

    pub fn with_decap(mut self, interface: usize, label: Label, out_interface: usize) -> Self {
        self.decap
            .entry(interface)
            .or_default()
            .insert(label, out_interface);
        self
    }

    /// True when frames arriving on `interface` leave the label-switched path here.
    pub fn is_egress(&self, interface: usize) -> bool {
        self.decap.contains_key(&interface)
    }

    pub fn encap_label(&self, interface: usize, destination: &Address) -> Result<Label> {
        self.encap
            .get(&interface)
            .and_then(|table| table.get(destination))
            .copied()
            .ok_or_else(|| {
                RouterError::NoRoute(RouteMiss::Encap {
                    interface,
                    destination: destination.clone(),
                })
            })
    }

    pub fn forward_interface(&self, label: Label) -> Result<usize> {
        self.forward
            .get(&label)
            .copied()
            .ok_or(RouterError::NoRoute(RouteMiss::Forward { label }))
    }

    pub fn decap_interface(&self, interface: usize, label: Label) -> Result<usize> {
        self.decap
            .get(&interface)
            .and_then(|table| table.get(&label))
            .copied()
            .ok_or(RouterError::NoRoute(RouteMiss::Decap { interface, label }))
    }

    /// Check every interface index in the tables against the router's interface count.
    pub fn validate(&self, count: usize) -> Result<()> {
        let check = |table: &'static str, interface: usize| {
            if interface < count {
                Ok(())
            } else {
                Err(RouterError::InterfaceOutOfRange {
                    table,
                    interface,
                    count,
                })
            }
        };

        for &incoming in self.encap.keys() {
            check("encap", incoming)?;
        }
        for &outgoing in self.forward.values() {
            check("forward", outgoing)?;
        }
        for (&incoming, table) in &self.decap {
            check("decap", incoming)?;
            for &outgoing in table.values() {
                check("decap", outgoing)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(v: u32) -> Label {
        Label::new(v).unwrap()
    }

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    #[test]
    fn lookups_hit() {
        let tables = ForwardingTables::new()
            .with_encap(0, addr("00042"), label(5))
            .with_forward(label(5), 2)
            .with_decap(1, label(7), 0);

        assert_eq!(tables.encap_label(0, &addr("42")).unwrap(), label(5));
        assert_eq!(tables.forward_interface(label(5)).unwrap(), 2);
        assert_eq!(tables.decap_interface(1, label(7)).unwrap(), 0);
        assert!(tables.is_egress(1));
        assert!(!tables.is_egress(0));
    }

    #[test]
    fn lookups_miss_explicitly() {
        let tables = ForwardingTables::new()
            .with_encap(0, addr("1"), label(5))
            .with_decap(1, label(7), 0);

        assert!(matches!(
            tables.encap_label(0, &addr("2")),
            Err(RouterError::NoRoute(RouteMiss::Encap { interface: 0, .. }))
        ));
        assert!(matches!(
            tables.encap_label(3, &addr("1")),
            Err(RouterError::NoRoute(RouteMiss::Encap { interface: 3, .. }))
        ));
        assert!(matches!(
            tables.forward_interface(label(5)),
            Err(RouterError::NoRoute(RouteMiss::Forward { .. }))
        ));
        assert!(matches!(
            tables.decap_interface(1, label(8)),
            Err(RouterError::NoRoute(RouteMiss::Decap { interface: 1, .. }))
        ));
    }

    #[test]
    fn validate_rejects_out_of_range_interfaces() {
        let ok = ForwardingTables::new()
            .with_forward(label(1), 1)
            .with_decap(0, label(2), 1);
        assert!(ok.validate(2).is_ok());

        let bad_forward = ForwardingTables::new().with_forward(label(1), 2);
        assert!(matches!(
            bad_forward.validate(2),
            Err(RouterError::InterfaceOutOfRange {
                table: "forward",
                interface: 2,
                count: 2
            })
        ));

        let bad_encap = ForwardingTables::new().with_encap(4, addr("1"), label(1));
        assert!(matches!(
            bad_encap.validate(2),
            Err(RouterError::InterfaceOutOfRange { table: "encap", .. })
        ));
    }

    #[test]
    fn deserializes_from_json() {
        let json = r#"{
            "encap": { "0": { "00003": 11 } },
            "forward": { "11": 1 },
            "decap": { "1": { "12": 0 } }
        }"#;
        let tables: ForwardingTables = serde_json::from_str(json).unwrap();
        assert_eq!(tables.encap_label(0, &addr("3")).unwrap(), label(11));
        assert_eq!(tables.forward_interface(label(11)).unwrap(), 1);
        assert_eq!(tables.decap_interface(1, label(12)).unwrap(), 0);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let tables: ForwardingTables = serde_json::from_str("{}").unwrap();
        assert_eq!(tables, ForwardingTables::default());
    }
}
