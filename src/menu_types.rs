// Which screen the app is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    MainMenu,
    Options,
    Puzzle,
    Driving,
}

// Main menu selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    Puzzle,
    Driving,
    Options,
    Quit,
}

impl MenuOption {
    pub const ALL: [MenuOption; 4] = [
        MenuOption::Puzzle,
        MenuOption::Driving,
        MenuOption::Options,
        MenuOption::Quit,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            MenuOption::Puzzle => "Falling Blocks",
            MenuOption::Driving => "Lane Racer",
            MenuOption::Options => "Options",
            MenuOption::Quit => "Quit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsOption {
    MusicToggle,
    SoundToggle,
    VolumeUp,
    VolumeDown,
    GridToggle,
    Back,
}

impl OptionsOption {
    pub const ALL: [OptionsOption; 6] = [
        OptionsOption::MusicToggle,
        OptionsOption::SoundToggle,
        OptionsOption::VolumeUp,
        OptionsOption::VolumeDown,
        OptionsOption::GridToggle,
        OptionsOption::Back,
    ];
}

/// Commands on the falling-blocks screen, issued by keys or by clicking the
/// on-screen buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleControl {
    Left,
    Right,
    Down,
    Rotate,
    Start,
    Reset,
    Restart,
}

impl PuzzleControl {
    pub const MOVES: [PuzzleControl; 4] = [
        PuzzleControl::Left,
        PuzzleControl::Right,
        PuzzleControl::Down,
        PuzzleControl::Rotate,
    ];

    pub const ROUND: [PuzzleControl; 3] = [
        PuzzleControl::Start,
        PuzzleControl::Reset,
        PuzzleControl::Restart,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PuzzleControl::Left => "[ ← ]",
            PuzzleControl::Right => "[ → ]",
            PuzzleControl::Down => "[ ↓ ]",
            PuzzleControl::Rotate => "[ ↻ ]",
            PuzzleControl::Start => "[Start]",
            PuzzleControl::Reset => "[Reset]",
            PuzzleControl::Restart => "[Restart]",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Menu {
    pub state: MenuState,
    pub selected_option: MenuOption,
    pub options_selected: OptionsOption,
}

impl Default for Menu {
    fn default() -> Self {
        Self {
            state: MenuState::MainMenu,
            selected_option: MenuOption::Puzzle,
            options_selected: OptionsOption::Back,
        }
    }
}

impl Menu {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// Step through `items` from `current`, wrapping at both ends
pub(crate) fn cycle<T: Copy + PartialEq>(items: &[T], current: T, step: isize) -> T {
    let len = items.len() as isize;
    let index = items.iter().position(|&item| item == current).unwrap_or(0) as isize;
    items[(index + step).rem_euclid(len) as usize]
}
