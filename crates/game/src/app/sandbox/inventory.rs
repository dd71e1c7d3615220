use controller::InventoryLine;
use serde::{Deserialize, Serialize};

/// Largest count shown on one slot; bigger counts spill onto following slots.
pub(crate) const STACK_SIZE: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ItemStack {
    pub(crate) item: String,
    pub(crate) count: u32,
}

/// Item counts in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct Inventory {
    stacks: Vec<ItemStack>,
}

impl Inventory {
    pub(crate) fn from_counts(counts: &[(&str, u32)]) -> Self {
        let mut inventory = Self::default();
        for (item, count) in counts {
            inventory.add(item, *count);
        }
        inventory
    }

    pub(crate) fn add(&mut self, item: &str, count: u32) {
        if count == 0 {
            return;
        }
        match self.stacks.iter_mut().find(|stack| stack.item == item) {
            Some(stack) => stack.count = stack.count.saturating_add(count),
            None => self.stacks.push(ItemStack {
                item: item.to_string(),
                count,
            }),
        }
    }

    /// Removes up to `count`, returning how many were actually taken.
    pub(crate) fn remove(&mut self, item: &str, count: u32) -> u32 {
        let Some(index) = self.stacks.iter().position(|stack| stack.item == item) else {
            return 0;
        };
        let taken = self.stacks[index].count.min(count);
        self.stacks[index].count -= taken;
        if self.stacks[index].count == 0 {
            self.stacks.remove(index);
        }
        taken
    }

    pub(crate) fn count_of(&self, item: &str) -> u32 {
        self.stacks
            .iter()
            .find(|stack| stack.item == item)
            .map_or(0, |stack| stack.count)
    }

    pub(crate) fn contains_all(&self, needs: &[(&str, u32)]) -> bool {
        needs
            .iter()
            .all(|(item, count)| self.count_of(item) >= *count)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub(crate) fn stacks(&self) -> &[ItemStack] {
        &self.stacks
    }

    pub(crate) fn drain(&mut self) -> Vec<ItemStack> {
        std::mem::take(&mut self.stacks)
    }

    /// Slots as the UI shows them, each holding at most [`STACK_SIZE`].
    pub(crate) fn lines(&self) -> Vec<InventoryLine> {
        let mut lines = Vec::new();
        for stack in &self.stacks {
            let mut remaining = stack.count;
            while remaining > 0 {
                let count = remaining.min(STACK_SIZE);
                lines.push(InventoryLine::new(stack.item.clone(), count));
                remaining -= count;
            }
        }
        lines
    }

    /// The shown slot at `index`.
    pub(crate) fn line_at(&self, index: usize) -> Option<InventoryLine> {
        self.lines().into_iter().nth(index)
    }
}
