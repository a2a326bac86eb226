//! Menu actions and the menu text shown to the operator

use std::fmt;

use crate::board::BoardChoice;
use crate::error::CoreError;

/// Menu number of the erase-only action
pub const ERASE_CHOICE: u32 = 16;
/// Menu number of the update action
pub const UPDATE_CHOICE: u32 = 17;
/// Menu number of the exit action
pub const EXIT_CHOICE: u32 = 18;

/// Anything the operator can pick from the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Erase, then write a firmware to a board
    Flash(BoardChoice),
    /// Erase the whole flash only
    Erase,
    /// Refresh all cached firmware files
    Update,
    /// Leave the program
    Exit,
}

impl MenuAction {
    /// Menu number (1-based)
    pub fn number(&self) -> u32 {
        match self {
            Self::Flash(board) => board.number(),
            Self::Erase => ERASE_CHOICE,
            Self::Update => UPDATE_CHOICE,
            Self::Exit => EXIT_CHOICE,
        }
    }

    /// Text shown in the menu
    pub fn label(&self) -> &'static str {
        match self {
            Self::Flash(board) => board.spec().menu_label,
            Self::Erase => "Just Erase ESP32 - Try this if you think you bricked it",
            Self::Update => "Update all files",
            Self::Exit => "Exit",
        }
    }

    /// Every menu entry in order
    pub fn all() -> impl Iterator<Item = MenuAction> {
        BoardChoice::ALL
            .into_iter()
            .map(MenuAction::Flash)
            .chain([MenuAction::Erase, MenuAction::Update, MenuAction::Exit])
    }
}

impl TryFrom<i64> for MenuAction {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let number = u32::try_from(value).map_err(|_| CoreError::InvalidChoice(value))?;
        match number {
            ERASE_CHOICE => Ok(Self::Erase),
            UPDATE_CHOICE => Ok(Self::Update),
            EXIT_CHOICE => Ok(Self::Exit),
            n => BoardChoice::from_number(n)
                .map(Self::Flash)
                .ok_or(CoreError::InvalidChoice(value)),
        }
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}) {}", self.number(), self.label())
    }
}

/// Render the boxed option menu
pub fn render_menu() -> String {
    let lines: Vec<String> = MenuAction::all()
        .map(|action| format!("{:>3}) {}", action.number(), action.label()))
        .collect();
    let width = lines.iter().map(|l| l.len()).max().unwrap_or(0) + 2;

    let mut menu = String::new();
    menu.push_str(&format!("//{}\\\\\n", "=".repeat(width + 1)));
    menu.push_str(&format!("|| {:<width$}||\n", "Options:", width = width));
    for line in &lines {
        menu.push_str(&format!("|| {:<width$}||\n", line, width = width));
    }
    menu.push_str(&format!("\\\\{}//\n", "=".repeat(width + 1)));
    menu
}
