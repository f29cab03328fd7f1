use std::collections::BTreeMap;

use crate::models::{EquipmentStatus, EquipmentType};

const FIRE_EXTINGUISHER: &[&str] = &[
    "Pressure gauge needle in the green zone",
    "Pin and seal intact",
    "Hose and nozzle clear, not cracked",
    "Body free of rust, bulges or dents",
    "Instruction label legible and intact",
];

const SCAFFOLDING: &[&str] = &[
    "Base plates stable and level",
    "Frame not bent, twisted or cracked",
    "Guardrails and toeboards complete",
    "Walkway planks secured, no rot or damage",
];

const HEAVY_MACHINERY: &[&str] = &[
    "Brakes and warning alarms working",
    "No engine or hydraulic oil leaks",
    "Seat belt and safety systems ready",
];

const GENERIC: &[&str] = &["General condition normal and ready for use"];

pub fn checklist_for(equipment_type: &EquipmentType) -> &'static [&'static str] {
    match equipment_type {
        EquipmentType::FireExtinguisher => FIRE_EXTINGUISHER,
        EquipmentType::Scaffolding => SCAFFOLDING,
        EquipmentType::HeavyMachinery => HEAVY_MACHINERY,
        EquipmentType::Other => GENERIC,
    }
}

/// Pass/fail per checklist item, keyed by item index. Items start passing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checklist {
    items: &'static [&'static str],
    results: BTreeMap<usize, bool>,
}

impl Checklist {
    pub fn new(equipment_type: &EquipmentType) -> Self {
        let items = checklist_for(equipment_type);
        Self {
            items,
            results: (0..items.len()).map(|i| (i, true)).collect(),
        }
    }

    pub fn items(&self) -> impl Iterator<Item = (usize, &'static str, bool)> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(|(i, label)| (i, *label, self.results.get(&i).copied().unwrap_or(true)))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Mark one item. Indexes past the end are ignored.
    pub fn set(&mut self, index: usize, pass: bool) {
        if index < self.items.len() {
            self.results.insert(index, pass);
        }
    }

    pub fn fail(&mut self, index: usize) {
        self.set(index, false);
    }

    /// DEFECTIVE as soon as one item fails.
    pub fn verdict(&self) -> EquipmentStatus {
        if self.results.values().any(|pass| !pass) {
            EquipmentStatus::Defective
        } else {
            EquipmentStatus::Normal
        }
    }

    /// The result map as the backend stores it: `{"0":true,"1":false,...}`.
    pub fn details_json(&self) -> String {
        let map: BTreeMap<String, bool> = self.results.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        serde_json::to_string(&map).unwrap_or_else(|_| "{}".to_string())
    }
}
