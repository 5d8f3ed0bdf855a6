//! Reactor specification catalog.
//!
//! A closed table of physical profiles keyed by reactor type, plus the
//! reference classes rendered once per run as buildable future prototypes.
//! Core masses come from vendor design-certification documents; the table is
//! trusted as is.

use serde::Serialize;

use cyclusgen_templates::ReactorClass;

/// Physical parameters of one reactor design.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpecProfile {
    /// Catalog key.
    pub key: &'static str,
    /// Template class the design renders through.
    pub class: ReactorClass,
    /// Heavy-metal mass of a full core, kg.
    pub core_fuel_mass_kg: f64,
    /// Electrical power the core mass corresponds to, MWe.
    pub reference_power_mwe: f64,
    /// Assemblies (batches) per core.
    pub assemblies_per_core: u32,
    /// Assemblies discharged per refuelling.
    pub assemblies_per_batch: u32,
    /// Months between refuellings.
    pub cycle_time: u32,
    /// Months a refuelling outage lasts.
    pub refuel_time: u32,
}

impl SpecProfile {
    /// Assembly mass per MWe of capacity.
    pub fn kg_per_mwe(&self) -> f64 {
        self.core_fuel_mass_kg / (self.reference_power_mwe * f64::from(self.assemblies_per_core))
    }

    /// Assembly mass for a unit of the given capacity, rounded to grams.
    pub fn assembly_size(&self, capacity_mwe: f64) -> f64 {
        round3(self.kg_per_mwe() * capacity_mwe)
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

const AP1000: SpecProfile = SpecProfile {
    key: "AP1000",
    class: ReactorClass::LightWater,
    core_fuel_mass_kg: 612.5 * 157.0,
    reference_power_mwe: 1100.0,
    assemblies_per_core: 3,
    assemblies_per_batch: 1,
    cycle_time: 17,
    refuel_time: 1,
};

const BWR: SpecProfile = SpecProfile {
    key: "BWR",
    class: ReactorClass::LightWater,
    core_fuel_mass_kg: 180.0 * 764.0,
    reference_power_mwe: 1098.0,
    assemblies_per_core: 4,
    assemblies_per_batch: 1,
    cycle_time: 12,
    refuel_time: 1,
};

const PWR: SpecProfile = SpecProfile {
    key: "PWR",
    class: ReactorClass::LightWater,
    core_fuel_mass_kg: 446.0 * 193.0,
    reference_power_mwe: 1000.0,
    assemblies_per_core: 3,
    assemblies_per_batch: 1,
    cycle_time: 13,
    refuel_time: 1,
};

const EPR: SpecProfile = SpecProfile {
    key: "EPR",
    class: ReactorClass::LightWater,
    core_fuel_mass_kg: 467.0 * 216.0,
    reference_power_mwe: 1600.0,
    assemblies_per_core: 3,
    assemblies_per_batch: 1,
    cycle_time: 18,
    refuel_time: 1,
};

const SMR: SpecProfile = SpecProfile {
    key: "SMR",
    class: ReactorClass::SmallModular,
    core_fuel_mass_kg: 2997.12 * 3.0,
    reference_power_mwe: 50.0,
    assemblies_per_core: 3,
    assemblies_per_batch: 1,
    cycle_time: 24,
    refuel_time: 1,
};

// 1000 MWe PWR with a heavier core, used for anything not in the table.
const GENERIC_PWR: SpecProfile = SpecProfile {
    key: "GENERIC_PWR",
    class: ReactorClass::LightWater,
    core_fuel_mass_kg: 523.4 * 193.0,
    reference_power_mwe: 1000.0,
    assemblies_per_core: 3,
    assemblies_per_batch: 1,
    cycle_time: 18,
    refuel_time: 1,
};

/// Reactor types with a catalog profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReactorType {
    Ap1000,
    Bwr,
    Pwr,
    Epr,
    Smr,
    /// Any type key not in the table.
    Generic,
}

impl ReactorType {
    /// Every type, fallback last.
    pub const ALL: [ReactorType; 6] = [
        Self::Ap1000,
        Self::Bwr,
        Self::Pwr,
        Self::Epr,
        Self::Smr,
        Self::Generic,
    ];

    /// Resolve a type key from the fleet table; never fails.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_uppercase().as_str() {
            "AP1000" => Self::Ap1000,
            "BWR" => Self::Bwr,
            "PWR" => Self::Pwr,
            "EPR" => Self::Epr,
            "SMR" => Self::Smr,
            _ => Self::Generic,
        }
    }

    pub fn profile(self) -> &'static SpecProfile {
        match self {
            Self::Ap1000 => &AP1000,
            Self::Bwr => &BWR,
            Self::Pwr => &PWR,
            Self::Epr => &EPR,
            Self::Smr => &SMR,
            Self::Generic => &GENERIC_PWR,
        }
    }

    pub fn is_fallback(self) -> bool {
        self == Self::Generic
    }
}

/// A synthetic prototype offered for future builds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceClass {
    /// Prototype name, also used as its type label.
    pub name: &'static str,
    pub reactor_type: ReactorType,
    pub capacity_mwe: f64,
}

/// Reference classes rendered once per run, in this order.
pub const REFERENCE_CLASSES: [ReferenceClass; 6] = [
    ReferenceClass { name: "AP1000", reactor_type: ReactorType::Ap1000, capacity_mwe: 1110.0 },
    ReferenceClass { name: "BWR", reactor_type: ReactorType::Bwr, capacity_mwe: 1260.0 },
    ReferenceClass { name: "PWR", reactor_type: ReactorType::Pwr, capacity_mwe: 1000.0 },
    ReferenceClass { name: "EPR", reactor_type: ReactorType::Epr, capacity_mwe: 1600.0 },
    ReferenceClass { name: "SMR", reactor_type: ReactorType::Smr, capacity_mwe: 50.0 },
    // A twelve-module SMR plant sized as one prototype.
    ReferenceClass { name: "12_SMR", reactor_type: ReactorType::Smr, capacity_mwe: 600.0 },
];

/// Flat view of the catalog for inspection output.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    pub profiles: Vec<SpecProfile>,
    pub reference_classes: Vec<ReferenceClass>,
}

/// Everything in the catalog, for printing.
pub fn catalog_view() -> CatalogView {
    CatalogView {
        profiles: ReactorType::ALL.iter().map(|t| *t.profile()).collect(),
        reference_classes: REFERENCE_CLASSES.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_resolve() {
        assert_eq!(ReactorType::from_key("PWR"), ReactorType::Pwr);
        assert_eq!(ReactorType::from_key(" bwr "), ReactorType::Bwr);
        assert_eq!(ReactorType::from_key("AP1000"), ReactorType::Ap1000);
        assert_eq!(ReactorType::from_key("SMR").profile().class, ReactorClass::SmallModular);
    }

    #[test]
    fn unknown_keys_fall_back_to_generic_pwr() {
        for key in ["VVER", "PHWR", "GCR", ""] {
            let t = ReactorType::from_key(key);
            assert!(t.is_fallback(), "{key} should fall back");
            assert_eq!(t.profile().class, ReactorClass::LightWater);
        }
    }

    #[test]
    fn kg_per_mwe_divides_core_by_power_and_batches() {
        let pwr = ReactorType::Pwr.profile();
        assert!((pwr.kg_per_mwe() - 446.0 * 193.0 / 3000.0).abs() < 1e-12);

        let bwr = ReactorType::Bwr.profile();
        assert!((bwr.kg_per_mwe() - 180.0 * 764.0 / 4392.0).abs() < 1e-12);

        let smr = ReactorType::Smr.profile();
        assert!((smr.kg_per_mwe() - 2997.12 / 50.0).abs() < 1e-9);
    }

    #[test]
    fn assembly_size_is_rounded_to_three_decimals() {
        assert_eq!(ReactorType::Pwr.profile().assembly_size(1000.0), 28692.667);
        assert_eq!(ReactorType::Generic.profile().assembly_size(1000.0), 33672.067);
    }

    #[test]
    fn reference_classes_cover_every_profile_but_the_fallback() {
        for t in ReactorType::ALL.iter().filter(|t| !t.is_fallback()) {
            assert!(REFERENCE_CLASSES.iter().any(|c| c.reactor_type == *t));
        }
        let twelve = REFERENCE_CLASSES.iter().find(|c| c.name == "12_SMR").unwrap();
        assert_eq!(twelve.reactor_type, ReactorType::Smr);
        assert_eq!(twelve.capacity_mwe, 600.0);
    }

    #[test]
    fn catalog_view_serializes() {
        let json = serde_json::to_value(catalog_view()).unwrap();
        assert_eq!(json["profiles"].as_array().unwrap().len(), 6);
        assert_eq!(json["profiles"][0]["key"], "AP1000");
        assert_eq!(json["profiles"][4]["class"], "small_modular");
        assert_eq!(json["reference_classes"][5]["name"], "12_SMR");
    }
}
