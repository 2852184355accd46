use timer_core::{preset_index, DEFAULT_PRESET_SECONDS, PRESET_SECONDS};

/// Cursor over the preset durations shown on the selector screen.
pub struct PresetPicker {
    pub cursor: usize,
}

impl PresetPicker {
    /// Start on `seconds` if it is a preset, otherwise on the stock default.
    pub fn new(seconds: u32) -> Self {
        let cursor = preset_index(seconds)
            .or_else(|| preset_index(DEFAULT_PRESET_SECONDS))
            .unwrap_or(0);
        Self { cursor }
    }

    pub fn presets(&self) -> &'static [u32] {
        &PRESET_SECONDS
    }

    pub fn selected_seconds(&self) -> u32 {
        PRESET_SECONDS[self.cursor]
    }

    /// Returns true if the cursor moved.
    pub fn prev(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    pub fn next(&mut self) -> bool {
        if self.cursor + 1 < PRESET_SECONDS.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_thirty() {
        let picker = PresetPicker::new(DEFAULT_PRESET_SECONDS);
        assert_eq!(picker.selected_seconds(), 30);
    }

    #[test]
    fn test_unknown_start_falls_back() {
        let picker = PresetPicker::new(17);
        assert_eq!(picker.selected_seconds(), 30);
    }

    #[test]
    fn test_cursor_clamps_at_ends() {
        let mut picker = PresetPicker::new(5);
        assert!(!picker.prev());
        assert_eq!(picker.selected_seconds(), 5);
        assert!(picker.next());
        assert_eq!(picker.selected_seconds(), 10);

        let mut picker = PresetPicker::new(60);
        assert!(!picker.next());
        assert!(picker.prev());
        assert_eq!(picker.selected_seconds(), 55);
    }

    #[test]
    fn test_always_yields_a_preset() {
        let mut picker = PresetPicker::new(5);
        for _ in 0..20 {
            assert!(picker.presets().contains(&picker.selected_seconds()));
            picker.next();
        }
    }
}
