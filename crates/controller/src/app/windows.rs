use tracing::debug;

use super::layout::{Rect, Vec2};

pub const BASE_Z_ORDER: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowKind {
    Inventory,
    RecipeSelector,
    ResearchSelector,
    Tooltip,
    MainMenu,
}

impl WindowKind {
    pub const ALL: [WindowKind; 5] = [
        WindowKind::Inventory,
        WindowKind::RecipeSelector,
        WindowKind::ResearchSelector,
        WindowKind::Tooltip,
        WindowKind::MainMenu,
    ];

    pub const fn title(self) -> &'static str {
        match self {
            WindowKind::Inventory => "Inventory",
            WindowKind::RecipeSelector => "Recipes",
            WindowKind::ResearchSelector => "Research",
            WindowKind::Tooltip => "",
            WindowKind::MainMenu => "Menu",
        }
    }

    /// Tooltips follow the pointer and never receive pointer input themselves.
    pub const fn hit_testable(self) -> bool {
        !matches!(self, WindowKind::Tooltip)
    }

    pub const fn draggable(self) -> bool {
        !matches!(self, WindowKind::Tooltip)
    }
}

/// Which UI element opened the current tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipOwner {
    ToolBelt,
    Inventory,
    RecipeSelector,
    ResearchSelector,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowHandle {
    kind: WindowKind,
    visible: bool,
    position: Vec2,
    size: Vec2,
    z_order: i32,
}

impl WindowHandle {
    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowDrag {
    kind: WindowKind,
    last_pointer: Vec2,
}

/// The shell's floating windows, kept in recency order (last = topmost).
///
/// Handles are created once and never destroyed; closing a window only hides it. Z-orders
/// are always `BASE_Z_ORDER + recency index`, reassigned on every `bring_to_front`. While a
/// title-bar drag is active the dragged window is lifted one level above the stack so it
/// stays on top of everything, and drops back when the drag ends.
#[derive(Debug)]
pub struct WindowStack {
    handles: Vec<WindowHandle>,
    drag: Option<WindowDrag>,
    tooltip_owner: Option<TooltipOwner>,
}

impl Default for WindowStack {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowStack {
    pub fn new() -> Self {
        let mut stack = Self {
            handles: WindowKind::ALL
                .iter()
                .map(|kind| WindowHandle {
                    kind: *kind,
                    visible: false,
                    position: Vec2::ZERO,
                    size: Vec2::ZERO,
                    z_order: BASE_Z_ORDER,
                })
                .collect(),
            drag: None,
            tooltip_owner: None,
        };
        stack.reassign_z_orders();
        stack
    }

    pub fn get(&self, kind: WindowKind) -> Option<&WindowHandle> {
        self.handles.iter().find(|handle| handle.kind == kind)
    }

    pub fn is_visible(&self, kind: WindowKind) -> bool {
        self.get(kind).is_some_and(WindowHandle::visible)
    }

    /// Visible windows, bottom to top.
    pub fn visible_in_order(&self) -> impl Iterator<Item = &WindowHandle> {
        let mut visible: Vec<&WindowHandle> =
            self.handles.iter().filter(|handle| handle.visible).collect();
        visible.sort_by_key(|handle| handle.z_order);
        visible.into_iter()
    }

    pub fn topmost_visible(&self) -> Option<WindowKind> {
        self.visible_in_order()
            .filter(|handle| handle.kind.hit_testable())
            .last()
            .map(WindowHandle::kind)
    }

    pub fn topmost_at(&self, point: Vec2) -> Option<WindowKind> {
        self.visible_in_order()
            .filter(|handle| handle.kind.hit_testable() && handle.rect().contains(point))
            .last()
            .map(WindowHandle::kind)
    }

    pub fn bring_to_front(&mut self, kind: WindowKind) {
        let Some(index) = self.index_of(kind) else {
            return;
        };
        if index + 1 != self.handles.len() {
            let handle = self.handles.remove(index);
            self.handles.push(handle);
        }
        self.reassign_z_orders();
    }

    /// Shows `kind` on top. Returns the windows hidden as a consequence.
    pub fn show(&mut self, kind: WindowKind) -> Vec<WindowKind> {
        let mut closed = Vec::new();
        match kind {
            WindowKind::Inventory => {
                closed.extend(self.hide(WindowKind::ResearchSelector));
            }
            WindowKind::ResearchSelector => {
                closed.extend(self.hide(WindowKind::Inventory));
            }
            _ => {}
        }
        if let Some(handle) = self.handle_mut(kind) {
            if !handle.visible {
                debug!(window = ?kind, "window_shown");
            }
            handle.visible = true;
        }
        self.bring_to_front(kind);
        closed
    }

    /// Hides `kind` and everything that depends on it. Returns every window that was
    /// visible and is now hidden, `kind` first.
    pub fn hide(&mut self, kind: WindowKind) -> Vec<WindowKind> {
        let mut closed = Vec::new();
        if self.hide_one(kind) {
            closed.push(kind);
        }
        match kind {
            WindowKind::Inventory => {
                if self.hide_one(WindowKind::RecipeSelector) {
                    closed.push(WindowKind::RecipeSelector);
                }
                self.hide_tooltip_owned_by(TooltipOwner::Inventory);
                self.hide_tooltip_owned_by(TooltipOwner::RecipeSelector);
            }
            WindowKind::RecipeSelector => {
                self.hide_tooltip_owned_by(TooltipOwner::RecipeSelector);
            }
            WindowKind::ResearchSelector => {
                self.hide_tooltip_owned_by(TooltipOwner::ResearchSelector);
            }
            WindowKind::Tooltip => {
                self.tooltip_owner = None;
            }
            WindowKind::MainMenu => {}
        }
        closed
    }

    /// Returns whether the window ended up visible, plus the windows closed on the way.
    pub fn toggle(&mut self, kind: WindowKind) -> (bool, Vec<WindowKind>) {
        if self.is_visible(kind) {
            (false, self.hide(kind))
        } else {
            (true, self.show(kind))
        }
    }

    pub fn set_size(&mut self, kind: WindowKind, size: Vec2) {
        if let Some(handle) = self.handle_mut(kind) {
            handle.size = size;
        }
    }

    pub fn move_to(&mut self, kind: WindowKind, position: Vec2) {
        if let Some(handle) = self.handle_mut(kind) {
            handle.position = position;
        }
    }

    /// Centres the window inside `surface` using its current measured size.
    pub fn place_center(&mut self, kind: WindowKind, surface: Vec2) {
        if let Some(handle) = self.handle_mut(kind) {
            handle.position = Vec2::new(
                ((surface.x - handle.size.x) / 2.0).max(0.0),
                ((surface.y - handle.size.y) / 2.0).max(0.0),
            );
        }
    }

    pub fn start_drag(&mut self, kind: WindowKind, pointer: Vec2) -> bool {
        if !kind.draggable() || !self.is_visible(kind) {
            return false;
        }
        self.bring_to_front(kind);
        self.drag = Some(WindowDrag {
            kind,
            last_pointer: pointer,
        });
        let capture_z = self.capture_z_order();
        if let Some(handle) = self.handle_mut(kind) {
            handle.z_order = capture_z;
        }
        debug!(window = ?kind, "window_drag_started");
        true
    }

    /// Moves the captured window by the pointer delta since the last event.
    pub fn drag_to(&mut self, pointer: Vec2) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        let delta = Vec2::new(
            pointer.x - drag.last_pointer.x,
            pointer.y - drag.last_pointer.y,
        );
        drag.last_pointer = pointer;
        let kind = drag.kind;
        if let Some(handle) = self.handle_mut(kind) {
            handle.position.x += delta.x;
            handle.position.y += delta.y;
        }
        true
    }

    pub fn end_drag(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        self.reassign_z_orders();
        debug!(window = ?drag.kind, "window_drag_ended");
        true
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn dragged_window(&self) -> Option<WindowKind> {
        self.drag.map(|drag| drag.kind)
    }

    pub fn show_tooltip(&mut self, owner: TooltipOwner, position: Vec2, size: Vec2) {
        self.tooltip_owner = Some(owner);
        if let Some(handle) = self.handle_mut(WindowKind::Tooltip) {
            handle.position = position;
            handle.size = size;
            handle.visible = true;
        }
        self.bring_to_front(WindowKind::Tooltip);
    }

    pub fn hide_tooltip_owned_by(&mut self, owner: TooltipOwner) -> bool {
        if self.tooltip_owner != Some(owner) {
            return false;
        }
        self.tooltip_owner = None;
        self.hide_one(WindowKind::Tooltip)
    }

    pub fn tooltip_owner(&self) -> Option<TooltipOwner> {
        self.tooltip_owner
    }

    fn hide_one(&mut self, kind: WindowKind) -> bool {
        if self.drag.is_some_and(|drag| drag.kind == kind) {
            self.end_drag();
        }
        match self.handle_mut(kind) {
            Some(handle) if handle.visible => {
                handle.visible = false;
                debug!(window = ?kind, "window_hidden");
                true
            }
            _ => false,
        }
    }

    fn capture_z_order(&self) -> i32 {
        BASE_Z_ORDER + self.handles.len() as i32
    }

    fn reassign_z_orders(&mut self) {
        for (index, handle) in self.handles.iter_mut().enumerate() {
            handle.z_order = BASE_Z_ORDER + index as i32;
        }
        if let Some(drag) = self.drag {
            let capture_z = self.capture_z_order();
            if let Some(handle) = self.handle_mut(drag.kind) {
                handle.z_order = capture_z;
            }
        }
    }

    fn index_of(&self, kind: WindowKind) -> Option<usize> {
        self.handles.iter().position(|handle| handle.kind == kind)
    }

    fn handle_mut(&mut self, kind: WindowKind) -> Option<&mut WindowHandle> {
        self.handles.iter_mut().find(|handle| handle.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn z(stack: &WindowStack, kind: WindowKind) -> i32 {
        stack.get(kind).expect("handle").z_order()
    }

    #[test]
    fn z_orders_are_distinct_and_based() {
        let stack = WindowStack::new();
        let mut orders: Vec<i32> = WindowKind::ALL.iter().map(|kind| z(&stack, *kind)).collect();
        orders.sort_unstable();
        orders.dedup();

        assert_eq!(orders.len(), WindowKind::ALL.len());
        assert_eq!(orders[0], BASE_Z_ORDER);
    }

    #[test]
    fn bring_to_front_makes_window_topmost() {
        let mut stack = WindowStack::new();
        stack.bring_to_front(WindowKind::Inventory);

        let top = WindowKind::ALL
            .iter()
            .max_by_key(|kind| z(&stack, **kind))
            .copied();
        assert_eq!(top, Some(WindowKind::Inventory));
    }

    #[test]
    fn showing_inventory_hides_research() {
        let mut stack = WindowStack::new();
        stack.show(WindowKind::ResearchSelector);
        stack.show_tooltip(TooltipOwner::ResearchSelector, Vec2::ZERO, Vec2::new(10.0, 10.0));

        let closed = stack.show(WindowKind::Inventory);

        assert_eq!(closed, vec![WindowKind::ResearchSelector]);
        assert!(stack.is_visible(WindowKind::Inventory));
        assert!(!stack.is_visible(WindowKind::ResearchSelector));
        assert!(!stack.is_visible(WindowKind::Tooltip));
    }

    #[test]
    fn showing_research_hides_inventory_and_its_children() {
        let mut stack = WindowStack::new();
        stack.show(WindowKind::Inventory);
        stack.show(WindowKind::RecipeSelector);

        let closed = stack.show(WindowKind::ResearchSelector);

        assert_eq!(
            closed,
            vec![WindowKind::Inventory, WindowKind::RecipeSelector]
        );
        assert!(!stack.is_visible(WindowKind::RecipeSelector));
    }

    #[test]
    fn hiding_inventory_keeps_unrelated_tooltip() {
        let mut stack = WindowStack::new();
        stack.show(WindowKind::Inventory);
        stack.show_tooltip(TooltipOwner::ToolBelt, Vec2::ZERO, Vec2::new(10.0, 10.0));

        stack.hide(WindowKind::Inventory);

        assert!(stack.is_visible(WindowKind::Tooltip));
        assert_eq!(stack.tooltip_owner(), Some(TooltipOwner::ToolBelt));
    }

    #[test]
    fn hiding_inventory_hides_recipe_tooltip() {
        let mut stack = WindowStack::new();
        stack.show(WindowKind::Inventory);
        stack.show(WindowKind::RecipeSelector);
        stack.show_tooltip(
            TooltipOwner::RecipeSelector,
            Vec2::ZERO,
            Vec2::new(10.0, 10.0),
        );

        stack.hide(WindowKind::Inventory);

        assert!(!stack.is_visible(WindowKind::Tooltip));
        assert_eq!(stack.tooltip_owner(), None);
    }

    #[test]
    fn place_center_uses_measured_size() {
        let mut stack = WindowStack::new();
        stack.set_size(WindowKind::Inventory, Vec2::new(200.0, 100.0));
        stack.place_center(WindowKind::Inventory, Vec2::new(800.0, 600.0));

        let handle = stack.get(WindowKind::Inventory).expect("handle");
        assert_eq!(handle.position(), Vec2::new(300.0, 250.0));
    }

    #[test]
    fn drag_lifts_window_above_stack_then_drops_back() {
        let mut stack = WindowStack::new();
        stack.show(WindowKind::Inventory);
        stack.show(WindowKind::MainMenu);
        stack.move_to(WindowKind::Inventory, Vec2::new(10.0, 10.0));

        assert!(stack.start_drag(WindowKind::Inventory, Vec2::new(20.0, 15.0)));
        let captured = z(&stack, WindowKind::Inventory);
        assert!(WindowKind::ALL
            .iter()
            .filter(|kind| **kind != WindowKind::Inventory)
            .all(|kind| z(&stack, *kind) < captured));

        stack.drag_to(Vec2::new(30.0, 40.0));
        stack.drag_to(Vec2::new(35.0, 45.0));
        assert_eq!(
            stack.get(WindowKind::Inventory).expect("handle").position(),
            Vec2::new(25.0, 40.0)
        );

        assert!(stack.end_drag());
        assert!(!stack.is_dragging());
        assert!(z(&stack, WindowKind::Inventory) < captured);
        assert_eq!(stack.topmost_visible(), Some(WindowKind::Inventory));
    }

    #[test]
    fn hidden_window_cannot_be_dragged() {
        let mut stack = WindowStack::new();
        assert!(!stack.start_drag(WindowKind::Inventory, Vec2::ZERO));
        assert!(!stack.drag_to(Vec2::new(5.0, 5.0)));
        assert!(!stack.end_drag());
    }

    #[test]
    fn hiding_dragged_window_releases_capture() {
        let mut stack = WindowStack::new();
        stack.show(WindowKind::MainMenu);
        stack.start_drag(WindowKind::MainMenu, Vec2::ZERO);

        stack.hide(WindowKind::MainMenu);

        assert!(!stack.is_dragging());
    }

    #[test]
    fn topmost_at_skips_tooltips_and_hidden_windows() {
        let mut stack = WindowStack::new();
        stack.set_size(WindowKind::Inventory, Vec2::new(100.0, 100.0));
        stack.show(WindowKind::Inventory);
        stack.show_tooltip(TooltipOwner::Inventory, Vec2::ZERO, Vec2::new(50.0, 50.0));

        assert_eq!(
            stack.topmost_at(Vec2::new(10.0, 10.0)),
            Some(WindowKind::Inventory)
        );
        assert_eq!(stack.topmost_at(Vec2::new(150.0, 10.0)), None);
    }
}
