use super::layout::Vec2;

pub const POPUP_LIFETIME_TICKS: u32 = 30;
pub const POPUP_RISE_PER_TICK: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PopupEntry {
    pub text: String,
    pub position: Vec2,
    pub remaining_ticks: u32,
}

/// Short-lived floating text. Each entry is visible for exactly `POPUP_LIFETIME_TICKS`
/// ticks and rises by `POPUP_RISE_PER_TICK` pixels per tick.
#[derive(Debug, Default)]
pub struct PopupQueue {
    entries: Vec<PopupEntry>,
}

impl PopupQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: impl Into<String>, position: Vec2) {
        self.entries.push(PopupEntry {
            text: text.into(),
            position,
            remaining_ticks: POPUP_LIFETIME_TICKS,
        });
    }

    pub fn tick(&mut self) {
        self.entries.retain_mut(|entry| {
            entry.remaining_ticks = entry.remaining_ticks.saturating_sub(1);
            entry.position.y -= POPUP_RISE_PER_TICK;
            entry.remaining_ticks > 0
        });
    }

    pub fn entries(&self) -> &[PopupEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_lives_exactly_lifetime_ticks() {
        let mut queue = PopupQueue::new();
        queue.push("+1 Iron Ore", Vec2::new(10.0, 100.0));

        for _ in 0..POPUP_LIFETIME_TICKS - 1 {
            queue.tick();
            assert_eq!(queue.len(), 1);
        }
        queue.tick();
        assert!(queue.is_empty());
    }

    #[test]
    fn entry_rises_each_tick() {
        let mut queue = PopupQueue::new();
        queue.push("+1 Coal Ore", Vec2::new(10.0, 100.0));
        queue.tick();
        queue.tick();

        let entry = &queue.entries()[0];
        assert_eq!(entry.position, Vec2::new(10.0, 98.0));
        assert_eq!(entry.remaining_ticks, POPUP_LIFETIME_TICKS - 2);
    }

    #[test]
    fn staggered_entries_expire_independently() {
        let mut queue = PopupQueue::new();
        queue.push("first", Vec2::ZERO);
        for _ in 0..10 {
            queue.tick();
        }
        queue.push("second", Vec2::ZERO);
        for _ in 0..POPUP_LIFETIME_TICKS - 10 {
            queue.tick();
        }

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.entries()[0].text, "second");
    }

    #[test]
    fn tick_on_empty_queue_is_noop() {
        let mut queue = PopupQueue::new();
        queue.tick();
        assert!(queue.is_empty());
    }
}
