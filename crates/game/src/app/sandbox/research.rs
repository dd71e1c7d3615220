use controller::ResearchEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Technology {
    pub(crate) label: &'static str,
    /// Item a lab consumes for one unit of progress.
    pub(crate) pack: &'static str,
    pub(crate) units: u32,
}

pub(crate) const TECHNOLOGIES: &[Technology] = &[
    Technology {
        label: "Automation",
        pack: "Gear",
        units: 10,
    },
    Technology {
        label: "Logistics",
        pack: "Gear",
        units: 20,
    },
    Technology {
        label: "Electronics",
        pack: "Circuit",
        units: 15,
    },
    Technology {
        label: "Steel Processing",
        pack: "Circuit",
        units: 25,
    },
];

pub(crate) const RESEARCH_UNIT_SECONDS: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Research {
    active: Option<usize>,
    units_done: Vec<u32>,
}

impl Default for Research {
    fn default() -> Self {
        Self {
            active: None,
            units_done: vec![0; TECHNOLOGIES.len()],
        }
    }
}

impl Research {
    pub(crate) fn is_unlocked(&self, index: usize) -> bool {
        match (TECHNOLOGIES.get(index), self.units_done.get(index)) {
            (Some(tech), Some(done)) => *done >= tech.units,
            _ => false,
        }
    }

    /// Makes `index` the active technology. Unlocked or unknown technologies are refused.
    pub(crate) fn select(&mut self, index: usize) -> bool {
        if index >= TECHNOLOGIES.len() || self.is_unlocked(index) {
            return false;
        }
        self.active = Some(index);
        true
    }

    pub(crate) fn active_pack(&self) -> Option<&'static str> {
        self.active
            .and_then(|index| TECHNOLOGIES.get(index))
            .map(|tech| tech.pack)
    }

    pub(crate) fn is_pack(item: &str) -> bool {
        TECHNOLOGIES.iter().any(|tech| tech.pack == item)
    }

    /// Credits one consumed pack to the active technology. Returns the label of a
    /// technology that just unlocked.
    pub(crate) fn add_unit(&mut self) -> Option<&'static str> {
        let index = self.active?;
        let tech = TECHNOLOGIES.get(index)?;
        let done = self.units_done.get_mut(index)?;
        *done = (*done + 1).min(tech.units);
        if *done < tech.units {
            return None;
        }
        self.active = None;
        Some(tech.label)
    }

    pub(crate) fn entries(&self) -> Vec<ResearchEntry> {
        TECHNOLOGIES
            .iter()
            .enumerate()
            .map(|(index, tech)| {
                let done = self.units_done.get(index).copied().unwrap_or_default();
                ResearchEntry {
                    label: tech.label.to_string(),
                    progress: done as f32 / tech.units.max(1) as f32,
                    unlocked: done >= tech.units,
                    active: self.active == Some(index),
                }
            })
            .collect()
    }

    /// Rejects progress tables that do not match the technology list.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.units_done.len() != TECHNOLOGIES.len() {
            return Err(format!(
                "expected {} research entries, found {}",
                TECHNOLOGIES.len(),
                self.units_done.len()
            ));
        }
        if let Some(active) = self.active {
            if active >= TECHNOLOGIES.len() {
                return Err(format!("active research {active} out of range"));
            }
        }
        Ok(())
    }
}
