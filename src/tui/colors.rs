//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Header and status bar background.
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Command box text after a failed command.
pub const ERROR_RED: Color = Color::Rgb(220, 50, 47);

// Tag chips cycle through these, chosen by tag name so a tag keeps its
// colour between runs.
const TAG_PALETTE: [Color; 6] = [
    Color::Rgb(38, 139, 210),
    Color::Rgb(133, 153, 0),
    Color::Rgb(181, 137, 0),
    Color::Rgb(211, 54, 130),
    Color::Rgb(108, 113, 196),
    Color::Rgb(42, 161, 152),
];

pub fn tag_color(tag: &str) -> Color {
    let sum: usize = tag.bytes().map(usize::from).sum();
    TAG_PALETTE[sum % TAG_PALETTE.len()]
}
