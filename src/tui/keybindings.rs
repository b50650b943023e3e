//! Key bindings — maps key events to explorer actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::harmonic::Preset;

/// Fine step for amplify/shift edits.
pub const FINE_STEP: f64 = 0.01;
/// Coarse step for amplify/shift edits.
pub const COARSE_STEP: f64 = 0.1;

/// Explorer actions triggered by key events.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    /// Start or stop audio playback.
    TogglePlayback,
    /// Move the harmonic cursor up.
    SelectPrev,
    /// Move the harmonic cursor down.
    SelectNext,
    /// Change the selected harmonic's amplitude by a delta.
    AdjustAmplify(f64),
    /// Change the selected harmonic's phase shift by a delta.
    AdjustShift(f64),
    /// Silence the selected harmonic.
    MuteSelected,
    /// Move compression by a number of configured steps.
    AdjustCompression(f64),
    /// Replace the series with a preset.
    LoadPreset(Preset),
    ToggleHelp,
    ToggleMessages,
    /// Close overlays.
    Escape,
}

/// Map a key event to an action. While an overlay is open only the keys
/// that close it (and quit) are live.
pub fn map_key(key: KeyEvent, overlay_visible: bool) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    if ctrl && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    if overlay_visible {
        return match key.code {
            KeyCode::Esc => Some(Action::Escape),
            KeyCode::Char('?') => Some(Action::ToggleHelp),
            KeyCode::Char('m') => Some(Action::ToggleMessages),
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        };
    }

    let step = if shift { COARSE_STEP } else { FINE_STEP };

    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char(' ') => Some(Action::TogglePlayback),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::SelectPrev),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::SelectNext),
        KeyCode::Right => Some(Action::AdjustAmplify(step)),
        KeyCode::Left => Some(Action::AdjustAmplify(-step)),
        KeyCode::Char('l') => Some(Action::AdjustAmplify(FINE_STEP)),
        KeyCode::Char('h') => Some(Action::AdjustAmplify(-FINE_STEP)),
        KeyCode::Char('L') => Some(Action::AdjustAmplify(COARSE_STEP)),
        KeyCode::Char('H') => Some(Action::AdjustAmplify(-COARSE_STEP)),
        KeyCode::Char(']') => Some(Action::AdjustShift(FINE_STEP)),
        KeyCode::Char('[') => Some(Action::AdjustShift(-FINE_STEP)),
        KeyCode::Char('}') => Some(Action::AdjustShift(COARSE_STEP)),
        KeyCode::Char('{') => Some(Action::AdjustShift(-COARSE_STEP)),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::AdjustCompression(1.0)),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::AdjustCompression(-1.0)),
        KeyCode::Char('>') => Some(Action::AdjustCompression(10.0)),
        KeyCode::Char('<') => Some(Action::AdjustCompression(-10.0)),
        KeyCode::Char('0') => Some(Action::MuteSelected),
        KeyCode::Char('r') => Some(Action::LoadPreset(Preset::Default)),
        KeyCode::Char('s') => Some(Action::LoadPreset(Preset::Square)),
        KeyCode::Char('w') => Some(Action::LoadPreset(Preset::Sawtooth)),
        KeyCode::Char('t') => Some(Action::LoadPreset(Preset::Triangle)),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Char('m') => Some(Action::ToggleMessages),
        KeyCode::Esc => Some(Action::Escape),
        _ => None,
    }
}

/// Key reference shown in the help overlay, as (keys, description).
pub const KEY_HELP: &[(&str, &str)] = &[
    ("Up/Down j/k", "select harmonic"),
    ("Left/Right h/l", "amplify -/+ 0.01"),
    ("Shift+Left/Right H/L", "amplify -/+ 0.1"),
    ("[ ]", "shift -/+ 0.01"),
    ("{ }", "shift -/+ 0.1"),
    ("- +", "compression -/+ one step"),
    ("< >", "compression -/+ ten steps"),
    ("0", "mute selected harmonic"),
    ("r s w t", "reset / square / sawtooth / triangle"),
    ("Space", "play / stop"),
    ("m", "message log"),
    ("?", "this help"),
    ("q Ctrl+C", "quit"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key_with(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        key_with(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_adjust_amplify() {
        assert_eq!(
            map_key(key(KeyCode::Right), false),
            Some(Action::AdjustAmplify(FINE_STEP))
        );
        assert_eq!(
            map_key(key_with(KeyCode::Left, KeyModifiers::SHIFT), false),
            Some(Action::AdjustAmplify(-COARSE_STEP))
        );
    }

    #[test]
    fn brackets_adjust_shift() {
        assert_eq!(
            map_key(key(KeyCode::Char(']')), false),
            Some(Action::AdjustShift(FINE_STEP))
        );
        assert_eq!(
            map_key(key(KeyCode::Char('{')), false),
            Some(Action::AdjustShift(-COARSE_STEP))
        );
    }

    #[test]
    fn preset_keys() {
        assert_eq!(
            map_key(key(KeyCode::Char('s')), false),
            Some(Action::LoadPreset(Preset::Square))
        );
        assert_eq!(
            map_key(key(KeyCode::Char('r')), false),
            Some(Action::LoadPreset(Preset::Default))
        );
    }

    #[test]
    fn overlay_swallows_edits() {
        assert_eq!(map_key(key(KeyCode::Right), true), None);
        assert_eq!(map_key(key(KeyCode::Esc), true), Some(Action::Escape));
        assert_eq!(map_key(key(KeyCode::Char('q')), true), Some(Action::Quit));
    }

    #[test]
    fn ctrl_c_always_quits() {
        let ctrl_c = key_with(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_c, false), Some(Action::Quit));
        assert_eq!(map_key(ctrl_c, true), Some(Action::Quit));
    }

    #[test]
    fn unbound_key_is_none() {
        assert_eq!(map_key(key(KeyCode::F(12)), false), None);
    }
}
