use winit::event::VirtualKeyCode;

use crate::config::{
    Color, DEFAULT_CLEAR_COLOR, DEFAULT_PRIMARY_COLOR, DEFAULT_SECONDARY_COLOR,
};

/// A parameter change requested from the outside, applied by the app context.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Command {
    MorphTo(usize),
    SetDuration(f32),
    NudgeDuration(i32),
    SetClearColor(Color),
    SetPrimaryColor(Color),
    SetSecondaryColor(Color),
    CycleColor(ColorSlot),
}

/// The three theme colors that can be changed while running.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorSlot {
    Clear,
    Primary,
    Secondary,
}

impl ColorSlot {
    pub fn palette(self) -> &'static [Color] {
        match self {
            ColorSlot::Clear => &CLEAR_PALETTE,
            ColorSlot::Primary => &PRIMARY_PALETTE,
            ColorSlot::Secondary => &SECONDARY_PALETTE,
        }
    }

    /// Color after `current` in this slot's palette. Colors not on the
    /// palette continue from its first entry.
    pub fn next_color(self, current: Color) -> Color {
        let palette = self.palette();
        let next = palette
            .iter()
            .position(|color| *color == current)
            .map_or(0, |index| (index + 1) % palette.len());
        palette[next]
    }
}

/// Theme colors as picked, before conversion to linear space.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Theme {
    pub clear: Color,
    pub primary: Color,
    pub secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            clear: DEFAULT_CLEAR_COLOR,
            primary: DEFAULT_PRIMARY_COLOR,
            secondary: DEFAULT_SECONDARY_COLOR,
        }
    }
}

impl Theme {
    pub fn get(&self, slot: ColorSlot) -> Color {
        match slot {
            ColorSlot::Clear => self.clear,
            ColorSlot::Primary => self.primary,
            ColorSlot::Secondary => self.secondary,
        }
    }

    pub fn get_mut(&mut self, slot: ColorSlot) -> &mut Color {
        match slot {
            ColorSlot::Clear => &mut self.clear,
            ColorSlot::Primary => &mut self.primary,
            ColorSlot::Secondary => &mut self.secondary,
        }
    }
}

pub const CLEAR_PALETTE: [Color; 4] = [
    DEFAULT_CLEAR_COLOR,
    Color::new(0x00, 0x00, 0x00),
    Color::new(0x0b, 0x1a, 0x2b),
    Color::new(0x2b, 0x0b, 0x12),
];

pub const PRIMARY_PALETTE: [Color; 4] = [
    DEFAULT_PRIMARY_COLOR,
    Color::new(0xff, 0xd0, 0x00),
    Color::new(0xff, 0x2d, 0x55),
    Color::new(0xff, 0xff, 0xff),
];

pub const SECONDARY_PALETTE: [Color; 4] = [
    DEFAULT_SECONDARY_COLOR,
    Color::new(0x8a, 0x2b, 0xe2),
    Color::new(0x00, 0xe5, 0xc0),
    Color::new(0xff, 0x00, 0xaa),
];

pub const DEFAULT_SHAPE_LABELS: [&str; 4] = ["Donut", "Monkey", "Sphere", "Text"];

/// Maps released keys to commands: `1`..`4` morph, Up/Down change the
/// duration, `B`/`P`/`S` cycle the background, primary and secondary colors.
pub fn command_for_key(keycode: VirtualKeyCode) -> Option<Command> {
    let command = match keycode {
        VirtualKeyCode::Key1 | VirtualKeyCode::Numpad1 => Command::MorphTo(0),
        VirtualKeyCode::Key2 | VirtualKeyCode::Numpad2 => Command::MorphTo(1),
        VirtualKeyCode::Key3 | VirtualKeyCode::Numpad3 => Command::MorphTo(2),
        VirtualKeyCode::Key4 | VirtualKeyCode::Numpad4 => Command::MorphTo(3),
        VirtualKeyCode::Up => Command::NudgeDuration(1),
        VirtualKeyCode::Down => Command::NudgeDuration(-1),
        VirtualKeyCode::B => Command::CycleColor(ColorSlot::Clear),
        VirtualKeyCode::P => Command::CycleColor(ColorSlot::Primary),
        VirtualKeyCode::S => Command::CycleColor(ColorSlot::Secondary),
        _ => return None,
    };
    Some(command)
}

/// Label for shape `index`, preferring the stock names over asset node names.
pub fn shape_label(index: usize, asset_names: &[String]) -> String {
    DEFAULT_SHAPE_LABELS
        .get(index)
        .map(|label| label.to_string())
        .or_else(|| asset_names.get(index).cloned())
        .unwrap_or_else(|| format!("Shape {}", index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_keys_morph() {
        assert_eq!(command_for_key(VirtualKeyCode::Key1), Some(Command::MorphTo(0)));
        assert_eq!(command_for_key(VirtualKeyCode::Numpad4), Some(Command::MorphTo(3)));
        assert_eq!(command_for_key(VirtualKeyCode::Key5), None);
    }

    #[test]
    fn arrows_nudge_duration() {
        assert_eq!(command_for_key(VirtualKeyCode::Up), Some(Command::NudgeDuration(1)));
        assert_eq!(command_for_key(VirtualKeyCode::Down), Some(Command::NudgeDuration(-1)));
    }

    #[test]
    fn letter_keys_cycle_colors() {
        assert_eq!(
            command_for_key(VirtualKeyCode::B),
            Some(Command::CycleColor(ColorSlot::Clear))
        );
        assert_eq!(
            command_for_key(VirtualKeyCode::P),
            Some(Command::CycleColor(ColorSlot::Primary))
        );
        assert_eq!(
            command_for_key(VirtualKeyCode::S),
            Some(Command::CycleColor(ColorSlot::Secondary))
        );
    }

    #[test]
    fn palettes_start_at_the_defaults_and_wrap() {
        assert_eq!(
            ColorSlot::Primary.next_color(DEFAULT_PRIMARY_COLOR),
            PRIMARY_PALETTE[1]
        );
        assert_eq!(
            ColorSlot::Clear.next_color(CLEAR_PALETTE[3]),
            DEFAULT_CLEAR_COLOR
        );
        // Off-palette colors, such as ones given on the command line.
        assert_eq!(
            ColorSlot::Secondary.next_color(Color::new(1, 2, 3)),
            DEFAULT_SECONDARY_COLOR
        );
    }

    #[test]
    fn labels_fall_back_to_asset_names() {
        let names: Vec<_> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
        assert_eq!(shape_label(1, &names), "Monkey");
        assert_eq!(shape_label(4, &names), "e");
        assert_eq!(shape_label(9, &names), "Shape 9");
    }
}
