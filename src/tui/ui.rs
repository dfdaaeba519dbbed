//! Stateless UI rendering for the guessing game.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use super::app::App;
use crate::controller::GameController;
use crate::games::guessing::{GameStatus, Hint, MAX_GUESSES, RANGE_MAX, RANGE_MIN};

/// Draws the whole screen.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Game master
            Constraint::Length(5), // Input or result
            Constraint::Min(3),    // History
            Constraint::Length(1), // Help
        ])
        .split(frame.area());

    let controller = app.controller();

    draw_title(frame, chunks[0], controller);
    draw_advisory(frame, chunks[1], controller);
    match controller.status() {
        GameStatus::Won | GameStatus::Lost => draw_result(frame, chunks[2], controller),
        GameStatus::Playing | GameStatus::Idle => draw_input(frame, chunks[2], app),
    }
    draw_history(frame, chunks[3], controller);

    let help = if controller.status().is_terminal() {
        "R: Restart | Q: Quit"
    } else {
        "0-9: Type | Enter: Guess | Q: Quit"
    };
    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[4]);
}

fn draw_title(frame: &mut Frame, area: Rect, controller: &GameController) {
    let counter = format!(" {} / {} ", controller.attempts(), MAX_GUESSES);
    let title = Paragraph::new("Mind Reader - 숫자 맞추기 챌린지")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title_top(Line::from(counter).right_aligned()),
        );
    frame.render_widget(title, area);
}

fn draw_advisory(frame: &mut Frame, area: Rect, controller: &GameController) {
    let line = match controller.advisory() {
        _ if controller.is_loading() => Line::from(vec![
            Span::raw("🤖  "),
            Span::styled("...", Style::default().fg(Color::Magenta)),
        ]),
        Some(advisory) => Line::from(vec![
            Span::raw(format!("{}  ", advisory.emoji())),
            Span::raw(advisory.message().as_str()),
        ]),
        None => Line::from("🤖"),
    };
    let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn draw_input(frame: &mut Frame, area: Rect, app: &App) {
    let cursor = if app.controller().is_loading() { "" } else { "_" };
    let input = Paragraph::new(format!("> {}{}", app.input(), cursor))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Guess ({}-{}) ", RANGE_MIN, RANGE_MAX)),
        );
    frame.render_widget(input, area);
}

fn draw_result(frame: &mut Frame, area: Rect, controller: &GameController) {
    let (banner, color) = match controller.status() {
        GameStatus::Won => ("🏆 정답입니다!", Color::Green),
        _ => ("💀 게임 오버", Color::Red),
    };
    let answer = controller
        .revealed_target()
        .map(|target| target.to_string())
        .unwrap_or_default();

    let text = vec![
        Line::from(Span::styled(
            banner,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::raw("정답은 "),
            Span::styled(answer, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" 이었습니다."),
        ]),
    ];
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn draw_history(frame: &mut Frame, area: Rect, controller: &GameController) {
    let total = controller.attempts();
    let items: Vec<ListItem> = controller
        .history_newest_first()
        .enumerate()
        .map(|(i, record)| {
            let color = match record.hint() {
                Hint::Up => Color::Blue,
                Hint::Down => Color::Red,
                Hint::Correct => Color::Green,
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("#{:<3}", total - i), Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{:>3}", record.value()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {} {}", record.hint().arrow(), record.hint()),
                    Style::default().fg(color),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" History "));
    frame.render_widget(list, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 24)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn shows_counter_and_history() {
        let mut app = App::new();
        app.controller_mut().start_with_target(60).unwrap();
        app.controller_mut().submit_guess("42");

        let screen = render(&app);

        assert!(screen.contains("1 / 10"));
        assert!(screen.contains("42"));
        assert!(screen.contains("UP"));
        assert!(screen.contains("..."));
    }

    #[test]
    fn reveals_target_when_finished() {
        let mut app = App::new();
        app.controller_mut().start_with_target(60).unwrap();
        app.controller_mut().submit_guess("60");

        let screen = render(&app);

        assert!(screen.contains("60"));
        assert!(screen.contains("CORRECT"));
        assert!(screen.contains("R: Restart"));
    }
}
