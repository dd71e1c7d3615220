use controller::{InventoryLine, RecipeEntry, SlotCategory, StructureInfo};
use serde::{Deserialize, Serialize};

use super::inventory::Inventory;
use super::research::{Research, RESEARCH_UNIT_SECONDS};

/// Burn time in seconds of every item a burner accepts.
const FUELS: &[(&str, f64)] = &[("Coal Ore", 4.0)];

pub(crate) fn fuel_seconds(item: &str) -> Option<f64> {
    FUELS
        .iter()
        .find(|(fuel, _)| *fuel == item)
        .map(|(_, seconds)| *seconds)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Recipe {
    pub(crate) label: &'static str,
    pub(crate) inputs: &'static [(&'static str, u32)],
    pub(crate) outputs: &'static [(&'static str, u32)],
    pub(crate) seconds: f64,
}

pub(crate) const SMELTING: &[Recipe] = &[
    Recipe {
        label: "Iron Plate",
        inputs: &[("Iron Ore", 1)],
        outputs: &[("Iron Plate", 1)],
        seconds: 1.6,
    },
    Recipe {
        label: "Copper Plate",
        inputs: &[("Copper Ore", 1)],
        outputs: &[("Copper Plate", 1)],
        seconds: 1.6,
    },
    Recipe {
        label: "Steel Plate",
        inputs: &[("Iron Plate", 5)],
        outputs: &[("Steel Plate", 1)],
        seconds: 8.0,
    },
];

pub(crate) const ASSEMBLY: &[Recipe] = &[
    Recipe {
        label: "Gear",
        inputs: &[("Iron Plate", 2)],
        outputs: &[("Gear", 1)],
        seconds: 0.5,
    },
    Recipe {
        label: "Copper Wire",
        inputs: &[("Copper Plate", 1)],
        outputs: &[("Copper Wire", 2)],
        seconds: 0.5,
    },
    Recipe {
        label: "Circuit",
        inputs: &[("Iron Plate", 1), ("Copper Wire", 3)],
        outputs: &[("Circuit", 1)],
        seconds: 0.5,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum StructureKind {
    Chest,
    Furnace,
    Assembler,
    Lab,
}

impl StructureKind {
    pub(crate) const ALL: [StructureKind; 4] = [
        StructureKind::Chest,
        StructureKind::Furnace,
        StructureKind::Assembler,
        StructureKind::Lab,
    ];

    pub(crate) const fn item_name(self) -> &'static str {
        match self {
            StructureKind::Chest => "Chest",
            StructureKind::Furnace => "Furnace",
            StructureKind::Assembler => "Assembler",
            StructureKind::Lab => "Lab",
        }
    }

    pub(crate) fn from_item(item: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.item_name() == item)
    }

    pub(crate) const fn categories(self) -> &'static [SlotCategory] {
        match self {
            StructureKind::Chest => &[SlotCategory::Storage],
            StructureKind::Furnace => {
                &[SlotCategory::Input, SlotCategory::Output, SlotCategory::Burner]
            }
            StructureKind::Assembler => &[SlotCategory::Input, SlotCategory::Output],
            StructureKind::Lab => &[SlotCategory::Input],
        }
    }

    pub(crate) const fn recipes_enabled(self) -> bool {
        matches!(self, StructureKind::Assembler)
    }

    pub(crate) fn info(self) -> StructureInfo {
        StructureInfo {
            name: self.item_name().to_string(),
            categories: self.categories().to_vec(),
            recipes_enabled: self.recipes_enabled(),
        }
    }
}

/// Result of advancing one structure.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct StepReport {
    pub(crate) inventory_changed: bool,
    pub(crate) produced: Vec<(&'static str, u32)>,
    pub(crate) research_changed: bool,
    pub(crate) unlocked: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Structure {
    pub(crate) kind: StructureKind,
    slots: Vec<(SlotCategory, Inventory)>,
    pub(crate) recipe: Option<usize>,
    progress: f64,
    fuel_left: f64,
}

impl Structure {
    pub(crate) fn new(kind: StructureKind) -> Self {
        Self {
            kind,
            slots: kind
                .categories()
                .iter()
                .map(|category| (*category, Inventory::default()))
                .collect(),
            recipe: None,
            progress: 0.0,
            fuel_left: 0.0,
        }
    }

    pub(crate) fn inventory(&self, category: SlotCategory) -> Option<&Inventory> {
        self.slots
            .iter()
            .find(|(candidate, _)| *candidate == category)
            .map(|(_, inventory)| inventory)
    }

    fn inventory_mut(&mut self, category: SlotCategory) -> Option<&mut Inventory> {
        self.slots
            .iter_mut()
            .find(|(candidate, _)| *candidate == category)
            .map(|(_, inventory)| inventory)
    }

    pub(crate) fn accepts(&self, category: SlotCategory, item: &str) -> bool {
        if self.inventory(category).is_none() {
            return false;
        }
        match category {
            SlotCategory::Storage => true,
            SlotCategory::Burner => fuel_seconds(item).is_some(),
            SlotCategory::Output => false,
            SlotCategory::Input => match self.kind {
                StructureKind::Furnace => SMELTING
                    .iter()
                    .any(|recipe| recipe.inputs.iter().any(|(input, _)| *input == item)),
                StructureKind::Assembler => self
                    .selected_recipe()
                    .is_some_and(|recipe| recipe.inputs.iter().any(|(input, _)| *input == item)),
                StructureKind::Lab => Research::is_pack(item),
                StructureKind::Chest => false,
            },
        }
    }

    /// Categories tried, in order, when the engine picks where `item` goes: fuel first.
    pub(crate) fn fill_order(&self, item: &str) -> Vec<SlotCategory> {
        [
            SlotCategory::Burner,
            SlotCategory::Input,
            SlotCategory::Storage,
        ]
        .into_iter()
        .filter(|category| self.accepts(*category, item))
        .collect()
    }

    /// Stores `count` of `item`. Returns the category used, or `None` when nothing takes it.
    pub(crate) fn insert(
        &mut self,
        category: Option<SlotCategory>,
        item: &str,
        count: u32,
    ) -> Option<SlotCategory> {
        let target = match category {
            Some(category) => self.accepts(category, item).then_some(category)?,
            None => self.fill_order(item).into_iter().next()?,
        };
        self.inventory_mut(target)?.add(item, count);
        Some(target)
    }

    pub(crate) fn take(&mut self, category: SlotCategory, item: &str, count: u32) -> u32 {
        self.inventory_mut(category)
            .map_or(0, |inventory| inventory.remove(item, count))
    }

    pub(crate) fn drain(&mut self, category: SlotCategory) -> Vec<(String, u32)> {
        self.inventory_mut(category)
            .map(|inventory| {
                inventory
                    .drain()
                    .into_iter()
                    .map(|stack| (stack.item, stack.count))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn drain_all(&mut self) -> Vec<(String, u32)> {
        self.kind
            .categories()
            .iter()
            .flat_map(|category| self.drain(*category))
            .collect()
    }

    pub(crate) fn recipes(&self) -> &'static [Recipe] {
        match self.kind {
            StructureKind::Assembler => ASSEMBLY,
            StructureKind::Furnace => SMELTING,
            StructureKind::Chest | StructureKind::Lab => &[],
        }
    }

    pub(crate) fn selected_recipe(&self) -> Option<&'static Recipe> {
        self.recipe.and_then(|index| self.recipes().get(index))
    }

    pub(crate) fn select_recipe(&mut self, index: usize) -> bool {
        if !self.kind.recipes_enabled() || index >= self.recipes().len() {
            return false;
        }
        if self.recipe != Some(index) {
            self.recipe = Some(index);
            self.progress = 0.0;
        }
        true
    }

    pub(crate) fn recipe_entries(&self) -> Vec<RecipeEntry> {
        self.recipes()
            .iter()
            .enumerate()
            .map(|(index, recipe)| RecipeEntry {
                label: recipe.label.to_string(),
                inputs: to_lines(recipe.inputs),
                outputs: to_lines(recipe.outputs),
                selected: self.recipe == Some(index),
            })
            .collect()
    }

    pub(crate) fn step(&mut self, dt: f64, research: &mut Research) -> StepReport {
        match self.kind {
            StructureKind::Chest => StepReport::default(),
            StructureKind::Furnace => {
                let recipe = self.input().and_then(|input| {
                    SMELTING
                        .iter()
                        .find(|recipe| input.contains_all(recipe.inputs))
                });
                let Some(recipe) = recipe else {
                    self.progress = 0.0;
                    return StepReport::default();
                };
                let mut report = StepReport::default();
                if self.fuel_left <= 0.0 {
                    if !self.refuel() {
                        return report;
                    }
                    report.inventory_changed = true;
                }
                self.fuel_left -= dt;
                self.craft(recipe, dt, &mut report);
                report
            }
            StructureKind::Assembler => {
                let mut report = StepReport::default();
                if let Some(recipe) = self.selected_recipe() {
                    if self.input().is_some_and(|input| input.contains_all(recipe.inputs)) {
                        self.craft(recipe, dt, &mut report);
                    }
                }
                report
            }
            StructureKind::Lab => self.study(dt, research),
        }
    }

    fn input(&self) -> Option<&Inventory> {
        self.inventory(SlotCategory::Input)
    }

    fn refuel(&mut self) -> bool {
        let Some(burner) = self.inventory_mut(SlotCategory::Burner) else {
            return false;
        };
        let fuel = burner
            .stacks()
            .iter()
            .find_map(|stack| fuel_seconds(&stack.item).map(|seconds| (stack.item.clone(), seconds)));
        let Some((item, seconds)) = fuel else {
            return false;
        };
        burner.remove(&item, 1);
        self.fuel_left += seconds;
        true
    }

    fn craft(&mut self, recipe: &'static Recipe, dt: f64, report: &mut StepReport) {
        self.progress += dt;
        if self.progress < recipe.seconds {
            return;
        }
        self.progress -= recipe.seconds;
        for (item, count) in recipe.inputs {
            self.take(SlotCategory::Input, item, *count);
        }
        for (item, count) in recipe.outputs {
            if let Some(output) = self.inventory_mut(SlotCategory::Output) {
                output.add(item, *count);
            }
            report.produced.push((*item, *count));
        }
        report.inventory_changed = true;
    }

    fn study(&mut self, dt: f64, research: &mut Research) -> StepReport {
        let mut report = StepReport::default();
        let Some(pack) = research.active_pack() else {
            self.progress = 0.0;
            return report;
        };
        if self.input().map_or(0, |input| input.count_of(pack)) == 0 {
            return report;
        }
        self.progress += dt;
        if self.progress < RESEARCH_UNIT_SECONDS {
            return report;
        }
        self.progress -= RESEARCH_UNIT_SECONDS;
        self.take(SlotCategory::Input, pack, 1);
        report.inventory_changed = true;
        report.research_changed = true;
        report.unlocked = research.add_unit();
        report
    }

    /// Checks a loaded structure for slots that do not belong to its kind.
    pub(crate) fn validate(&self) -> Result<(), String> {
        let expected = self.kind.categories();
        let found: Vec<SlotCategory> = self.slots.iter().map(|(category, _)| *category).collect();
        if found != expected {
            return Err(format!(
                "{} slots {found:?} do not match {expected:?}",
                self.kind.item_name()
            ));
        }
        if let Some(recipe) = self.recipe {
            if recipe >= self.recipes().len() {
                return Err(format!("recipe {recipe} out of range"));
            }
        }
        Ok(())
    }
}

fn to_lines(counts: &[(&str, u32)]) -> Vec<InventoryLine> {
    counts
        .iter()
        .map(|(item, count)| InventoryLine::new(*item, *count))
        .collect()
}
