//! Hierarchical settings menu.
//!
//! Pages are static item tables; runtime state is a bounded stack of
//! (page, selection) frames plus an edit flag. Items carry a typed
//! [`ItemKind`] naming the field they operate on, so the menu engine can
//! read and write the model without any per-item callback plumbing.
//!
//! The menu edits a working copy ([`MenuModel`]); the caller persists it
//! when the menu reports [`MenuOutcome::Exit`] and reprograms the alarm
//! hardware on [`MenuOutcome::AlarmChanged`].

use core::fmt::Write;

use platform::{AlarmTime, MenuLine, Units, MAX_VOLUME};
use settings::{BrightnessMode, UserSettings};

const MAX_DEPTH: usize = 4;
const MAX_ITEMS: usize = 8;

/// Menu pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageId {
    /// Top level.
    Main,
    /// Alarm time, song, volume, snooze.
    Alarm,
    /// Clock face and backlight.
    Display,
}

/// Boolean settings fields an item can flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleField {
    /// Arm/disarm the alarm.
    AlarmEnabled,
    /// 24-hour clock face.
    Use24h,
    /// Weather refresh task on/off.
    WeatherEnabled,
    /// Keep the Wi-Fi radio up between sessions.
    WifiPersistent,
}

/// Integer settings fields an item can step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    /// Alarm song track number.
    AlarmSong,
    /// Playback volume.
    Volume,
    /// Minutes before an undismissed alarm escalates.
    SnoozeMinutes,
    /// Manual backlight level.
    BrightnessLevel,
}

/// Multi-option settings fields an item can cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceField {
    /// Temperature units.
    Units,
    /// Backlight policy.
    BrightnessPolicy,
}

/// Side effects the menu asks the caller to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Force a network time sync.
    SyncTime,
    /// Ring the alarm briefly so volume/song can be judged.
    TestAlarm,
}

/// What an item does when selected or edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Flip a boolean field in place.
    Toggle(ToggleField),
    /// Enter edit mode; up/down step the field within `min..=max`.
    Numeric {
        /// Field to step.
        field: NumericField,
        /// Inclusive lower bound.
        min: u16,
        /// Inclusive upper bound.
        max: u16,
    },
    /// Cycle through `options` in place.
    Choice {
        /// Field to cycle.
        field: ChoiceField,
        /// Display names, in cycle order.
        options: &'static [&'static str],
    },
    /// Enter edit mode; up/down step the alarm time in five-minute
    /// increments.
    AlarmTime,
    /// Descend into another page.
    Submenu(PageId),
    /// Return an action for the caller to execute.
    Action(MenuAction),
    /// Ascend one page.
    Back,
}

/// One menu row.
#[derive(Debug, Clone, Copy)]
pub struct Item {
    /// Row label.
    pub label: &'static str,
    /// Behavior.
    pub kind: ItemKind,
}

const MAIN_ITEMS: &[Item] = &[
    Item { label: "alarm", kind: ItemKind::Submenu(PageId::Alarm) },
    Item { label: "display", kind: ItemKind::Submenu(PageId::Display) },
    Item { label: "weather", kind: ItemKind::Toggle(ToggleField::WeatherEnabled) },
    Item {
        label: "units",
        kind: ItemKind::Choice {
            field: ChoiceField::Units,
            options: &["celsius", "fahrenheit"],
        },
    },
    Item { label: "wifi hold", kind: ItemKind::Toggle(ToggleField::WifiPersistent) },
    Item { label: "sync time", kind: ItemKind::Action(MenuAction::SyncTime) },
];

const ALARM_ITEMS: &[Item] = &[
    Item { label: "time", kind: ItemKind::AlarmTime },
    Item { label: "enabled", kind: ItemKind::Toggle(ToggleField::AlarmEnabled) },
    Item {
        label: "song",
        kind: ItemKind::Numeric { field: NumericField::AlarmSong, min: 1, max: 99 },
    },
    Item {
        label: "volume",
        kind: ItemKind::Numeric {
            field: NumericField::Volume,
            min: 0,
            max: MAX_VOLUME as u16,
        },
    },
    Item {
        label: "snooze min",
        kind: ItemKind::Numeric { field: NumericField::SnoozeMinutes, min: 1, max: 60 },
    },
    Item { label: "test", kind: ItemKind::Action(MenuAction::TestAlarm) },
    Item { label: "back", kind: ItemKind::Back },
];

const DISPLAY_ITEMS: &[Item] = &[
    Item { label: "24-hour", kind: ItemKind::Toggle(ToggleField::Use24h) },
    Item {
        label: "backlight",
        kind: ItemKind::Choice {
            field: ChoiceField::BrightnessPolicy,
            options: &["auto", "manual"],
        },
    },
    Item {
        label: "level",
        kind: ItemKind::Numeric { field: NumericField::BrightnessLevel, min: 0, max: 255 },
    },
    Item { label: "back", kind: ItemKind::Back },
];

fn items(page: PageId) -> &'static [Item] {
    match page {
        PageId::Main => MAIN_ITEMS,
        PageId::Alarm => ALARM_ITEMS,
        PageId::Display => DISPLAY_ITEMS,
    }
}

fn title(page: PageId) -> &'static str {
    match page {
        PageId::Main => "settings",
        PageId::Alarm => "alarm",
        PageId::Display => "display",
    }
}

/// Navigation inputs, mapped from buttons by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuInput {
    /// Move up / increment.
    Up,
    /// Move down / decrement.
    Down,
    /// Enter / confirm.
    Select,
    /// Leave edit mode, page, or (at the root) the menu.
    Back,
}

/// What the caller must do after feeding an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    /// Nothing beyond redrawing.
    None,
    /// Menu closed; persist the model when `save` is set.
    Exit {
        /// Whether the working copy should be written to the store.
        save: bool,
    },
    /// Execute this side effect, menu stays open.
    Action(MenuAction),
    /// Alarm time or enable changed; reprogram the hardware register.
    AlarmChanged,
}

/// The working copy the menu edits.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuModel {
    /// User settings under edit.
    pub settings: UserSettings,
    /// Alarm under edit (hardware register is the caller's concern).
    pub alarm: AlarmTime,
}

impl MenuModel {
    fn toggle(&mut self, field: ToggleField) {
        match field {
            ToggleField::AlarmEnabled => {
                self.alarm = self.alarm.with_enabled(!self.alarm.enabled());
            }
            ToggleField::Use24h => self.settings.use_24h = !self.settings.use_24h,
            ToggleField::WeatherEnabled => {
                self.settings.weather_enabled = !self.settings.weather_enabled;
            }
            ToggleField::WifiPersistent => {
                self.settings.wifi_persistent = !self.settings.wifi_persistent;
            }
        }
    }

    fn toggle_value(&self, field: ToggleField) -> bool {
        match field {
            ToggleField::AlarmEnabled => self.alarm.enabled(),
            ToggleField::Use24h => self.settings.use_24h,
            ToggleField::WeatherEnabled => self.settings.weather_enabled,
            ToggleField::WifiPersistent => self.settings.wifi_persistent,
        }
    }

    fn numeric_value(&self, field: NumericField) -> u16 {
        match field {
            NumericField::AlarmSong => u16::from(self.settings.alarm_song),
            NumericField::Volume => u16::from(self.settings.volume),
            NumericField::SnoozeMinutes => u16::from(self.settings.snooze_minutes),
            NumericField::BrightnessLevel => match self.settings.brightness {
                BrightnessMode::Manual(level) => u16::from(level),
                BrightnessMode::Auto => 128,
            },
        }
    }

    fn numeric_set(&mut self, field: NumericField, value: u16) {
        match field {
            NumericField::AlarmSong => self.settings.alarm_song = value as u8,
            NumericField::Volume => self.settings.volume = value as u8,
            NumericField::SnoozeMinutes => self.settings.snooze_minutes = value as u8,
            // Adjusting the level implies manual mode.
            NumericField::BrightnessLevel => {
                self.settings.brightness = BrightnessMode::Manual(value as u8);
            }
        }
    }

    fn choice_index(&self, field: ChoiceField) -> usize {
        match field {
            ChoiceField::Units => match self.settings.units {
                Units::Celsius => 0,
                Units::Fahrenheit => 1,
            },
            ChoiceField::BrightnessPolicy => match self.settings.brightness {
                BrightnessMode::Auto => 0,
                BrightnessMode::Manual(_) => 1,
            },
        }
    }

    fn choice_cycle(&mut self, field: ChoiceField) {
        match field {
            ChoiceField::Units => {
                self.settings.units = match self.settings.units {
                    Units::Celsius => Units::Fahrenheit,
                    Units::Fahrenheit => Units::Celsius,
                };
            }
            ChoiceField::BrightnessPolicy => {
                self.settings.brightness = match self.settings.brightness {
                    BrightnessMode::Auto => BrightnessMode::Manual(128),
                    BrightnessMode::Manual(_) => BrightnessMode::Auto,
                };
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    page: PageId,
    selected: usize,
}

/// Menu engine. One lives per settings session; drop it on exit.
pub struct SettingsMenu {
    stack: heapless::Vec<Frame, MAX_DEPTH>,
    editing: bool,
    /// Working copy under edit.
    pub model: MenuModel,
}

impl SettingsMenu {
    /// Open the menu at the root page over a working copy of the current
    /// state.
    pub fn new(settings: UserSettings, alarm: AlarmTime) -> Self {
        let mut stack = heapless::Vec::new();
        // Stack starts empty with room for MAX_DEPTH frames.
        let _ = stack.push(Frame { page: PageId::Main, selected: 0 });
        Self {
            stack,
            editing: false,
            model: MenuModel { settings, alarm },
        }
    }

    fn frame(&self) -> Frame {
        match self.stack.last() {
            Some(f) => *f,
            // Unreachable: new() seeds the stack and back() guards the root.
            None => Frame { page: PageId::Main, selected: 0 },
        }
    }

    fn current_item(&self) -> Option<Item> {
        let frame = self.frame();
        items(frame.page).get(frame.selected).copied()
    }

    /// Page title for the header row.
    #[must_use]
    pub fn title(&self) -> &'static str {
        title(self.frame().page)
    }

    /// Index of the highlighted row.
    #[must_use]
    pub fn selected(&self) -> usize {
        self.frame().selected
    }

    /// Whether the highlighted row is in edit mode.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Feed one navigation input.
    pub fn handle(&mut self, input: MenuInput) -> MenuOutcome {
        if self.editing {
            return self.handle_edit(input);
        }
        match input {
            MenuInput::Up => {
                self.move_selection(-1);
                MenuOutcome::None
            }
            MenuInput::Down => {
                self.move_selection(1);
                MenuOutcome::None
            }
            MenuInput::Select => self.select(),
            MenuInput::Back => self.ascend(),
        }
    }

    fn handle_edit(&mut self, input: MenuInput) -> MenuOutcome {
        let Some(item) = self.current_item() else {
            self.editing = false;
            return MenuOutcome::None;
        };
        match input {
            MenuInput::Up => self.adjust(item.kind, 1),
            MenuInput::Down => self.adjust(item.kind, -1),
            MenuInput::Select | MenuInput::Back => {
                self.editing = false;
                if matches!(item.kind, ItemKind::AlarmTime) {
                    return MenuOutcome::AlarmChanged;
                }
                MenuOutcome::None
            }
        }
    }

    fn adjust(&mut self, kind: ItemKind, delta: i32) -> MenuOutcome {
        match kind {
            ItemKind::AlarmTime => {
                self.model.alarm = self.model.alarm.stepped(delta as i8);
            }
            ItemKind::Numeric { field, min, max } => {
                let current = i32::from(self.model.numeric_value(field));
                let next = (current + delta).clamp(i32::from(min), i32::from(max));
                self.model.numeric_set(field, next as u16);
            }
            // Only AlarmTime and Numeric items enter edit mode.
            _ => self.editing = false,
        }
        MenuOutcome::None
    }

    fn select(&mut self) -> MenuOutcome {
        let Some(item) = self.current_item() else {
            return MenuOutcome::None;
        };
        match item.kind {
            ItemKind::Toggle(field) => {
                self.model.toggle(field);
                if field == ToggleField::AlarmEnabled {
                    MenuOutcome::AlarmChanged
                } else {
                    MenuOutcome::None
                }
            }
            ItemKind::Choice { field, .. } => {
                self.model.choice_cycle(field);
                MenuOutcome::None
            }
            ItemKind::Numeric { .. } | ItemKind::AlarmTime => {
                self.editing = true;
                MenuOutcome::None
            }
            ItemKind::Submenu(page) => {
                // Full stack: the push is a silent no-op and the page
                // simply does not open (bounded-buffer contract).
                let _ = self.stack.push(Frame { page, selected: 0 });
                MenuOutcome::None
            }
            ItemKind::Action(action) => MenuOutcome::Action(action),
            ItemKind::Back => self.ascend(),
        }
    }

    fn ascend(&mut self) -> MenuOutcome {
        if self.stack.len() > 1 {
            self.stack.pop();
            MenuOutcome::None
        } else {
            MenuOutcome::Exit { save: true }
        }
    }

    fn move_selection(&mut self, delta: i32) {
        let len = items(self.frame().page).len() as i32;
        if let Some(frame) = self.stack.last_mut() {
            let next = (frame.selected as i32 + delta).rem_euclid(len);
            frame.selected = next as usize;
        }
    }

    /// Produce the rows for the current page.
    pub fn render(&self, out: &mut heapless::Vec<MenuLine<'static>, MAX_ITEMS>) {
        out.clear();
        for item in items(self.frame().page) {
            let mut value = heapless::String::new();
            match item.kind {
                ItemKind::Toggle(field) => {
                    let _ = value.push_str(if self.model.toggle_value(field) {
                        "on"
                    } else {
                        "off"
                    });
                }
                ItemKind::Numeric { field, .. } => {
                    let _ = write!(value, "{}", self.model.numeric_value(field));
                }
                ItemKind::Choice { field, options } => {
                    let name = options.get(self.model.choice_index(field)).unwrap_or(&"?");
                    let _ = value.push_str(name);
                }
                ItemKind::AlarmTime => {
                    let _ = write!(
                        value,
                        "{:02}:{:02}",
                        self.model.alarm.hour(),
                        self.model.alarm.minute()
                    );
                }
                ItemKind::Submenu(_) => {
                    let _ = value.push_str(">");
                }
                ItemKind::Action(_) | ItemKind::Back => {}
            }
            let _ = out.push(MenuLine { label: item.label, value });
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn menu() -> SettingsMenu {
        SettingsMenu::new(UserSettings::default(), AlarmTime::DEFAULT)
    }

    fn select_label(menu: &mut SettingsMenu, label: &str) -> MenuOutcome {
        let page_items = items(menu.frame().page);
        let idx = page_items.iter().position(|i| i.label == label).unwrap();
        while menu.selected() != idx {
            menu.handle(MenuInput::Down);
        }
        menu.handle(MenuInput::Select)
    }

    #[test]
    fn test_navigation_wraps_both_directions() {
        let mut m = menu();
        assert_eq!(m.selected(), 0);
        m.handle(MenuInput::Up);
        assert_eq!(m.selected(), MAIN_ITEMS.len() - 1);
        m.handle(MenuInput::Down);
        assert_eq!(m.selected(), 0);
    }

    #[test]
    fn test_submenu_descend_and_back() {
        let mut m = menu();
        select_label(&mut m, "alarm");
        assert_eq!(m.title(), "alarm");
        assert_eq!(m.selected(), 0);
        let out = select_label(&mut m, "back");
        assert_eq!(out, MenuOutcome::None);
        assert_eq!(m.title(), "settings");
    }

    #[test]
    fn test_back_at_root_exits_with_save() {
        let mut m = menu();
        assert_eq!(m.handle(MenuInput::Back), MenuOutcome::Exit { save: true });
    }

    #[test]
    fn test_alarm_time_edit_steps_five_minutes() {
        let mut m = menu();
        select_label(&mut m, "alarm");
        select_label(&mut m, "time");
        assert!(m.is_editing());
        m.handle(MenuInput::Up);
        m.handle(MenuInput::Up);
        assert_eq!((m.model.alarm.hour(), m.model.alarm.minute()), (7, 10));
        m.handle(MenuInput::Down);
        assert_eq!(m.model.alarm.minute(), 5);
        // Leaving edit asks the caller to reprogram the register.
        assert_eq!(m.handle(MenuInput::Select), MenuOutcome::AlarmChanged);
        assert!(!m.is_editing());
    }

    #[test]
    fn test_numeric_edit_clamps_at_bounds() {
        let mut m = menu();
        select_label(&mut m, "alarm");
        select_label(&mut m, "volume");
        for _ in 0..50 {
            m.handle(MenuInput::Up);
        }
        assert_eq!(m.model.settings.volume, MAX_VOLUME);
        for _ in 0..50 {
            m.handle(MenuInput::Down);
        }
        assert_eq!(m.model.settings.volume, 0);
        assert_eq!(m.handle(MenuInput::Back), MenuOutcome::None);
    }

    #[test]
    fn test_toggle_alarm_enabled_reports_change() {
        let mut m = menu();
        select_label(&mut m, "alarm");
        let out = select_label(&mut m, "enabled");
        assert_eq!(out, MenuOutcome::AlarmChanged);
        assert!(m.model.alarm.enabled());
    }

    #[test]
    fn test_units_choice_cycles() {
        let mut m = menu();
        select_label(&mut m, "units");
        assert_eq!(m.model.settings.units, Units::Fahrenheit);
        m.handle(MenuInput::Select);
        assert_eq!(m.model.settings.units, Units::Celsius);
    }

    #[test]
    fn test_backlight_policy_and_level() {
        let mut m = menu();
        select_label(&mut m, "display");
        select_label(&mut m, "backlight");
        assert_eq!(m.model.settings.brightness, BrightnessMode::Manual(128));
        select_label(&mut m, "level");
        m.handle(MenuInput::Up);
        assert_eq!(m.model.settings.brightness, BrightnessMode::Manual(129));
    }

    #[test]
    fn test_action_returned_to_caller() {
        let mut m = menu();
        let out = select_label(&mut m, "sync time");
        assert_eq!(out, MenuOutcome::Action(MenuAction::SyncTime));
        // Menu stays open.
        assert_eq!(m.title(), "settings");
    }

    #[test]
    fn test_render_shows_values() {
        let m = menu();
        let mut lines = heapless::Vec::new();
        m.render(&mut lines);
        assert_eq!(lines.len(), MAIN_ITEMS.len());
        assert_eq!(lines[0].label, "alarm");
        assert_eq!(lines[0].value.as_str(), ">");
        let weather = lines.iter().find(|l| l.label == "weather").unwrap();
        assert_eq!(weather.value.as_str(), "on");
        let units = lines.iter().find(|l| l.label == "units").unwrap();
        assert_eq!(units.value.as_str(), "celsius");
    }
}
