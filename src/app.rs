use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use std::time::{Duration, Instant};

use crate::chips::{Chip, ChipInput, KeyOutcome, MutationHook};
use crate::config::AppConfig;
use crate::ui::components::{self, Target};

/// How long a status message stays on screen
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Candidates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

/// Asks for the input field to take focus back after the chip row changes.
#[derive(Debug, Default)]
pub struct FocusRequest {
    pending: bool,
}

impl FocusRequest {
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl MutationHook for FocusRequest {
    fn chips_changed(&mut self) {
        self.pending = true;
    }
}

pub struct App {
    pub chips: ChipInput<FocusRequest>,
    pub focus: Focus,
    pub popup: Popup,
    pub placeholder: String,

    // Cursor into the visible (filtered) candidate list
    pub selected_candidate: usize,

    // Status message (shown in the top line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    pub quit: bool,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            chips: ChipInput::new(config.candidates.iter().cloned(), FocusRequest::default()),
            focus: Focus::Input,
            popup: Popup::None,
            placeholder: config.placeholder.clone(),
            selected_candidate: 0,
            status_message: None,
            status_message_time: None,
            quit: false,
        }
    }

    pub fn into_chips(self) -> Vec<Chip> {
        self.chips.into_chips()
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn tick(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() >= STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return;
        }

        // Any key closes help
        if self.popup == Popup::Help {
            self.popup = Popup::None;
            return;
        }

        if key.code == KeyCode::F(1) {
            self.popup = Popup::Help;
            return;
        }

        match self.focus {
            Focus::Input => self.handle_input_key(key),
            Focus::Candidates => self.handle_candidate_key(key),
        }
        self.after_event();
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                if let KeyOutcome::Committed(id) = self.chips.commit() {
                    if let Some(chip) = self.chips.chips().iter().find(|c| c.id == id) {
                        let msg = format!("Added {}", chip.label);
                        self.set_status(msg);
                    }
                }
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Down | KeyCode::Tab => {
                if !self.chips.visible_candidates().is_empty() {
                    self.focus = Focus::Candidates;
                }
            }
            KeyCode::Esc => {
                if self.chips.input().is_empty() {
                    self.quit = true;
                } else {
                    self.chips.set_input("");
                }
            }
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.chips.push_char(c);
                // Filter changed, start from the top again
                self.selected_candidate = 0;
            }
            _ => {}
        }
    }

    fn handle_candidate_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::BackTab => {
                if self.selected_candidate == 0 || key.code == KeyCode::BackTab {
                    self.focus = Focus::Input;
                } else {
                    self.selected_candidate -= 1;
                }
            }
            KeyCode::Down => self.selected_candidate += 1,
            KeyCode::Enter | KeyCode::Char(' ') => self.pick_candidate(self.selected_candidate),
            KeyCode::Esc | KeyCode::Tab => self.focus = Focus::Input,
            KeyCode::Backspace => {
                self.focus = Focus::Input;
                self.backspace();
            }
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.focus = Focus::Input;
                self.chips.push_char(c);
                self.selected_candidate = 0;
            }
            _ => {}
        }
    }

    /// Mouse clicks on remove controls and candidate rows. `area` is the
    /// full frame the UI was drawn into.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect) {
        if self.popup != Popup::None {
            if matches!(mouse.kind, MouseEventKind::Down(_)) {
                self.popup = Popup::None;
            }
            return;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let visible = self.chips.visible_candidates().len();
                let pos = Position::new(mouse.column, mouse.row);
                match components::hit_test(area, self.chips.chips(), visible, self.selected_candidate, pos) {
                    Some(Target::RemoveChip(id)) => {
                        if let Some(chip) = self.chips.remove_chip(id) {
                            self.set_status(format!("Removed {}", chip.label));
                        }
                    }
                    Some(Target::Candidate(index)) => {
                        self.selected_candidate = index;
                        self.pick_candidate(index);
                    }
                    Some(Target::Input) => self.focus = Focus::Input,
                    None => {}
                }
            }
            MouseEventKind::ScrollDown => self.selected_candidate += 1,
            MouseEventKind::ScrollUp => {
                self.selected_candidate = self.selected_candidate.saturating_sub(1);
            }
            _ => return,
        }
        self.after_event();
    }

    fn backspace(&mut self) {
        match self.chips.backspace() {
            KeyOutcome::Armed(id) => {
                if let Some(chip) = self.chips.chips().iter().find(|c| c.id == id) {
                    let msg = format!("Backspace again to remove {}", chip.label);
                    self.set_status(msg);
                }
            }
            KeyOutcome::Removed(chip) => self.set_status(format!("Removed {}", chip.label)),
            KeyOutcome::Edited => self.selected_candidate = 0,
            _ => {}
        }
    }

    fn pick_candidate(&mut self, index: usize) {
        let Some(label) = self.chips.visible_candidates().get(index).map(|s| s.to_string()) else {
            return;
        };
        self.chips.add_chip(&label);
        self.set_status(format!("Added {}", label));
    }

    /// Post-event bookkeeping: focus follows chip changes, cursor stays in range
    fn after_event(&mut self) {
        if self.chips.hook_mut().take() {
            self.focus = Focus::Input;
        }

        let visible = self.chips.visible_candidates().len();
        if visible == 0 {
            self.selected_candidate = 0;
            if self.focus == Focus::Candidates {
                self.focus = Focus::Input;
            }
        } else if self.selected_candidate >= visible {
            self.selected_candidate = visible - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chips::Highlight;

    fn app() -> App {
        App::new(&AppConfig::default())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn click(app: &mut App, column: u16, row: u16) {
        let mouse = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_mouse(mouse, area());
    }

    fn area() -> Rect {
        Rect::new(0, 0, 60, 24)
    }

    fn labels(app: &App) -> Vec<&str> {
        app.chips.chips().iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn test_type_then_click_candidate() {
        let mut app = app();
        type_text(&mut app, "Ma");
        assert_eq!(app.chips.visible_candidates(), vec!["Mango"]);

        let list = components::inner(components::regions(area(), app.chips.chips()).candidates);
        click(&mut app, list.x + 1, list.y);

        assert_eq!(labels(&app), vec!["Mango"]);
        assert_eq!(app.chips.pool(), ["Apple", "Orange", "Lichi", "Guava"]);
        // Clicking a candidate leaves the buffer alone
        assert_eq!(app.chips.input(), "Ma");
        assert_eq!(app.focus, Focus::Input);
        assert_eq!(app.status_message.as_deref(), Some("Added Mango"));
    }

    #[test]
    fn test_enter_commits_free_text() {
        let mut app = app();
        type_text(&mut app, "Kiwi");
        press(&mut app, KeyCode::Enter);

        assert_eq!(labels(&app), vec!["Kiwi"]);
        assert_eq!(app.chips.pool().len(), 5);
        assert_eq!(app.chips.input(), "");
    }

    #[test]
    fn test_enter_on_whitespace_does_nothing() {
        let mut app = app();
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        assert!(app.chips.chips().is_empty());
        assert_eq!(app.chips.input(), "   ");
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_click_remove_control_returns_label() {
        let mut app = app();
        type_text(&mut app, "Apple");
        press(&mut app, KeyCode::Enter);

        let chips = app.chips.chips().to_vec();
        let regions = components::regions(area(), &chips);
        let slot = components::chip_slots(components::inner(regions.chips), &chips)[0];
        click(&mut app, slot.remove.x, slot.remove.y);

        assert!(app.chips.chips().is_empty());
        assert_eq!(app.chips.pool(), ["Orange", "Mango", "Lichi", "Guava", "Apple"]);
        assert_eq!(app.status_message.as_deref(), Some("Removed Apple"));
    }

    #[test]
    fn test_backspace_twice_removes_last_chip() {
        let mut app = app();
        type_text(&mut app, "Kiwi");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Backspace);
        assert_eq!(labels(&app), vec!["Kiwi"]);
        assert!(matches!(app.chips.highlight(), Highlight::Armed(_)));

        press(&mut app, KeyCode::Backspace);
        assert!(app.chips.chips().is_empty());
        assert!(app.chips.pool().iter().any(|item| item == "Kiwi"));
    }

    #[test]
    fn test_keyboard_candidate_pick_returns_focus() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        assert_eq!(app.focus, Focus::Candidates);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        assert_eq!(labels(&app), vec!["Orange"]);
        assert_eq!(app.focus, Focus::Input);
        assert_eq!(app.selected_candidate, 1);
    }

    #[test]
    fn test_cursor_clamped_to_visible() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        for _ in 0..10 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.selected_candidate, 4);

        press(&mut app, KeyCode::Enter);
        assert_eq!(labels(&app), vec!["Guava"]);
        assert_eq!(app.selected_candidate, 3);
    }

    #[test]
    fn test_typing_in_list_goes_back_to_input() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "li");
        assert_eq!(app.focus, Focus::Input);
        assert_eq!(app.chips.visible_candidates(), vec!["Lichi"]);
    }

    #[test]
    fn test_no_candidates_keeps_input_focus() {
        let mut app = app();
        type_text(&mut app, "zzz");
        press(&mut app, KeyCode::Down);
        assert_eq!(app.focus, Focus::Input);
    }

    #[test]
    fn test_escape_clears_then_quits() {
        let mut app = app();
        type_text(&mut app, "ab");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.chips.input(), "");
        assert!(!app.quit);

        press(&mut app, KeyCode::Esc);
        assert!(app.quit);
    }

    #[test]
    fn test_ctrl_c_quits_without_typing() {
        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.quit);
        assert_eq!(app.chips.input(), "");
    }

    #[test]
    fn test_help_popup_swallows_next_key() {
        let mut app = app();
        press(&mut app, KeyCode::F(1));
        assert_eq!(app.popup, Popup::Help);

        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.popup, Popup::None);
        assert_eq!(app.chips.input(), "");
    }
}
