#![warn(clippy::all, clippy::pedantic)]

#[cfg(test)]
mod tests {
    use crossterm::event::KeyCode;
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer, layout::Rect};

    use crate::app::App;
    use crate::components::{Board, PieceType};
    use crate::driving::Bounds;
    use crate::menu_types::{MenuOption, MenuState, PuzzleControl};
    use crate::tests::test_utils::{headless_app, press};
    use crate::ui::{self, centered_rect, puzzle_button_layout};
    use crate::ui_driving::{project, road_size};

    fn draw(app: &mut App, width: u16, height: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| ui::render(f, app)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn text(buffer: &Buffer) -> String {
        buffer.content().iter().map(ratatui::buffer::Cell::symbol).collect()
    }

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 100);
        assert_eq!(centered_rect(50, 40, area), Rect::new(25, 30, 50, 40));
        assert_eq!(centered_rect(200, 10, area), Rect::new(0, 45, 100, 10));
    }

    #[test]
    fn test_main_menu_lists_games() {
        let mut app = headless_app();
        let screen = text(&draw(&mut app, 80, 30));
        assert!(screen.contains("Falling Blocks"));
        assert!(screen.contains("Lane Racer"));
        assert!(screen.contains("Options"));
    }

    #[test]
    fn test_options_menu_shows_settings() {
        let mut app = headless_app();
        app.menu.state = MenuState::Options;
        let screen = text(&draw(&mut app, 80, 30));
        assert!(screen.contains("Music: ON"));
        assert!(screen.contains("Grid: ON"));
    }

    #[test]
    fn test_puzzle_idle_screen() {
        let mut app = headless_app();
        press(&mut app, KeyCode::Enter);
        let screen = text(&draw(&mut app, 80, 30));
        assert!(screen.contains("FALLING BLOCKS"));
        assert!(screen.contains("Press Enter"));
        assert!(screen.contains("Score: 0"));
    }

    #[test]
    fn test_puzzle_draws_locked_cells() {
        let mut app = headless_app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        app.puzzle.resource_mut::<Board>().cells[19][0] = Some(PieceType::I);

        let buffer = draw(&mut app, 80, 30);
        let screen = text(&buffer);
        assert!(screen.contains("██"));
        assert!(screen.contains("Next"));
    }

    #[test]
    fn test_puzzle_game_over_overlay() {
        let mut app = headless_app();
        press(&mut app, KeyCode::Enter);
        *app.puzzle.resource_mut::<crate::components::RunPhase>() =
            crate::components::RunPhase::Terminal;
        let screen = text(&draw(&mut app, 80, 30));
        assert!(screen.contains("GAME OVER"));
    }

    #[test]
    fn test_small_terminal_shows_notice() {
        let mut app = headless_app();
        press(&mut app, KeyCode::Enter);
        let screen = text(&draw(&mut app, 40, 12));
        assert!(screen.contains("Terminal too small!"));
    }

    #[test]
    fn test_driving_screen_records_road_area() {
        let mut app = headless_app();
        app.menu.selected_option = MenuOption::Driving;
        press(&mut app, KeyCode::Enter);

        let screen = text(&draw(&mut app, 80, 40));
        assert!(screen.contains("Lives:"));
        assert!(screen.contains("Press Enter"));

        let road = app.road_area.expect("road area");
        assert_eq!(road.width % 3, 0);
        assert!(road.height >= 16);
    }

    #[test]
    fn test_driving_too_small_clears_road_area() {
        let mut app = headless_app();
        app.menu.selected_option = MenuOption::Driving;
        press(&mut app, KeyCode::Enter);
        app.road_area = Some(Rect::new(0, 0, 10, 10));

        let screen = text(&draw(&mut app, 20, 10));
        assert!(screen.contains("Terminal too small!"));
        assert!(app.road_area.is_none());
    }

    #[test]
    fn test_road_size() {
        assert_eq!(road_size(Rect::new(0, 0, 20, 10)), None);
        let (width, height) = road_size(Rect::new(0, 0, 80, 40)).expect("fits");
        assert_eq!(height, 35);
        assert_eq!(width, 39);
    }

    #[test]
    fn test_project_scales_and_clips() {
        let road = Rect::new(1, 1, 36, 64);

        let full = Bounds::new(0.0, 0.0, 360.0, 640.0);
        assert_eq!(project(&full, road), Some(road));

        let player = Bounds::new(155.0, 540.0, 50.0, 80.0);
        assert_eq!(project(&player, road), Some(Rect::new(17, 55, 5, 8)));

        let above = Bounds::new(155.0, -80.0, 50.0, 80.0);
        assert_eq!(project(&above, road), None);

        let partial = Bounds::new(155.0, -40.0, 50.0, 80.0);
        assert_eq!(project(&partial, road), Some(Rect::new(17, 1, 5, 4)));
    }

    #[test]
    fn test_puzzle_button_layout() {
        let buttons = puzzle_button_layout(Rect::new(10, 5, 26, 2));
        let controls: Vec<PuzzleControl> = buttons.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            controls,
            vec![
                PuzzleControl::Left,
                PuzzleControl::Right,
                PuzzleControl::Down,
                PuzzleControl::Rotate,
                PuzzleControl::Start,
                PuzzleControl::Reset,
                PuzzleControl::Restart,
            ]
        );
        assert_eq!(buttons[0].1, Rect::new(10, 5, 5, 1));
        assert_eq!(buttons[1].1, Rect::new(16, 5, 5, 1));
        assert_eq!(buttons[6].1, Rect::new(26, 6, 9, 1));

        // Narrow or short areas drop what does not fit
        let narrow = puzzle_button_layout(Rect::new(0, 0, 12, 1));
        assert_eq!(narrow.len(), 2);
    }

    #[test]
    fn test_puzzle_screen_shows_buttons() {
        let mut app = headless_app();
        press(&mut app, KeyCode::Enter);
        let screen = text(&draw(&mut app, 80, 30));
        assert!(screen.contains("[Start]"));
        assert!(screen.contains("[Restart]"));
        assert_eq!(app.puzzle_buttons.len(), 7);

        draw(&mut app, 40, 12);
        assert!(app.puzzle_buttons.is_empty());
    }
}
