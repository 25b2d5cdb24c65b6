use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::collections::VecDeque;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tui_textarea::TextArea;

use paradox::config::Config;
use paradox::game::{Game, RenderSnapshot, TurnOutput};
use paradox::state::{FileSnapshot, GameStateStore, NoSnapshot, SnapshotStore};

const MAX_OUTPUT_LINES: usize = 500;
const ECHO_DELAY_MS: u64 = 1500;
const TICK: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "terminal-paradox")]
#[command(about = "A text adventure inside a terminal that is falling apart")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "paradox.toml")]
    config: PathBuf,

    /// Seed the RNG for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Ignore any saved game
    #[arg(long)]
    fresh: bool,

    /// Verbose logging (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

enum Screen {
    TitleScreen,
    Playing,
    Escaped,
}

#[derive(Clone, Copy, PartialEq)]
enum MenuOption {
    Continue,
    NewGame,
    Quit,
}

impl MenuOption {
    fn next(&self) -> Self {
        match self {
            MenuOption::Continue => MenuOption::NewGame,
            MenuOption::NewGame => MenuOption::Quit,
            MenuOption::Quit => MenuOption::Continue,
        }
    }

    fn prev(&self) -> Self {
        match self {
            MenuOption::Continue => MenuOption::Quit,
            MenuOption::NewGame => MenuOption::Continue,
            MenuOption::Quit => MenuOption::NewGame,
        }
    }
}

struct App<'a> {
    game: Game,
    input: TextArea<'a>,
    output: Vec<String>,
    output_scroll: u16,
    /// Lines held back by input lag or scheduled as echoes.
    pending: VecDeque<(Instant, Vec<String>)>,
    screen: Screen,
    menu_selection: MenuOption,
}

impl<'a> App<'a> {
    fn new(game: Game) -> Self {
        App {
            game,
            input: new_input(),
            output: Vec::new(),
            output_scroll: 0,
            pending: VecDeque::new(),
            screen: Screen::TitleScreen,
            menu_selection: MenuOption::Continue,
        }
    }

    fn start(&mut self, fresh: bool) {
        self.output.clear();
        self.pending.clear();
        self.output_scroll = 0;
        if fresh {
            self.game.reset();
        }
        let intro = self.game.intro();
        self.push_lines(intro);
        self.screen = Screen::Playing;
    }

    fn push_lines(&mut self, lines: Vec<String>) {
        self.output.extend(lines);
        if self.output.len() > MAX_OUTPUT_LINES {
            let excess = self.output.len() - MAX_OUTPUT_LINES;
            self.output.drain(..excess);
        }
        self.output_scroll = 0;
    }

    /// Submit the editor line. Returns `true` when the player asked to quit.
    fn submit(&mut self) -> bool {
        let line = self.input.lines().join(" ");
        self.input = new_input();

        let TurnOutput {
            lines,
            delay_ms,
            echo,
            quit,
            escaped,
        } = self.game.turn(&line);

        let now = Instant::now();
        if delay_ms > 0 {
            self.pending
                .push_back((now + Duration::from_millis(delay_ms), lines));
        } else {
            self.push_lines(lines);
        }
        if let Some(echo) = echo {
            let at = now + Duration::from_millis(delay_ms + ECHO_DELAY_MS);
            self.pending.push_back((at, vec![echo]));
        }
        if escaped {
            self.screen = Screen::Escaped;
        }
        quit
    }

    fn flush_pending(&mut self) {
        let now = Instant::now();
        let mut due = Vec::new();
        self.pending.retain(|(at, lines)| {
            if *at <= now {
                due.extend(lines.iter().cloned());
                false
            } else {
                true
            }
        });
        if !due.is_empty() {
            self.push_lines(due);
        }
    }
}

fn new_input<'a>() -> TextArea<'a> {
    let mut input = TextArea::default();
    input.set_block(
        Block::default()
            .borders(Borders::ALL)
            .title(" $ [Enter: run | PgUp/PgDn: scroll | Ctrl+C: quit] "),
    );
    input.set_cursor_line_style(Style::default());
    input
}

fn init_logging(config: &Config, verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => config.log_level().unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::new();
    // The TUI owns the terminal; without a log file there is nowhere to write.
    let file = config.logging.file.as_ref().and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });
    match file {
        Some(file) => {
            builder
                .filter_level(level)
                .target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.format(|fmt, record| {
        let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
    });
    builder.try_init()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?;
    init_logging(&config, cli.verbose)?;

    let snapshots: Box<dyn SnapshotStore> = match &config.game.save_path {
        Some(path) => Box::new(FileSnapshot::new(path)),
        None => Box::new(NoSnapshot),
    };
    let autoload = config.game.autoload && !cli.fresh;
    let store = GameStateStore::new(snapshots, config.game.max_inventory, autoload);

    let rng = match cli.seed.or(config.game.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let game = Game::builtin(store, rng)?;
    log::info!("session started (autoload={})", autoload);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(game);

    loop {
        app.flush_pending();
        let snapshot = app.game.render(28, 4);
        terminal.draw(|f| draw_ui(f, &app, &snapshot))?;

        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            break;
        }

        match app.screen {
            Screen::TitleScreen => {
                match key.code {
                    KeyCode::Down | KeyCode::Char('j') => {
                        app.menu_selection = app.menu_selection.next();
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        app.menu_selection = app.menu_selection.prev();
                    }
                    KeyCode::Enter => match app.menu_selection {
                        MenuOption::Continue => app.start(false),
                        MenuOption::NewGame => app.start(true),
                        MenuOption::Quit => break,
                    },
                    KeyCode::Char('q') => break,
                    _ => {}
                }
                continue;
            }
            Screen::Escaped => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
                    break;
                }
                continue;
            }
            Screen::Playing => {}
        }

        match key.code {
            KeyCode::Enter => {
                if app.submit() {
                    break;
                }
            }
            KeyCode::PageUp => {
                let max = row_count(app.output.len());
                app.output_scroll = app.output_scroll.saturating_add(5).min(max);
            }
            KeyCode::PageDown => {
                app.output_scroll = app.output_scroll.saturating_sub(5);
            }
            KeyCode::Esc => {
                app.push_lines(vec!["Type \"quit\" to disconnect.".to_string()]);
            }
            _ => {
                app.input.input(key);
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    let state = app.game.state();
    if app.game.escaped() {
        println!(
            "\nYou escaped the Terminal Paradox in {} moves ({}).\n",
            state.moves, app.game.store().format_elapsed()
        );
    } else {
        println!(
            "\nThe terminal keeps waiting for you. Corruption: {}%\n",
            state.corruption
        );
    }
    log::info!("session ended after {} moves", state.moves);

    Ok(())
}

/// Terminal row count for a list length, saturating at the widest `u16`.
fn row_count(len: usize) -> u16 {
    u16::try_from(len).unwrap_or(u16::MAX)
}

/// Height of the inventory panel: one row per slot plus borders and title.
fn inventory_height(max_inventory: usize) -> u16 {
    row_count(max_inventory).saturating_add(3)
}

fn corruption_color(level: u8) -> Color {
    if level > 70 {
        Color::Red
    } else if level > 40 {
        Color::Magenta
    } else if level > 15 {
        Color::Yellow
    } else {
        Color::Green
    }
}

fn line_style(line: &str) -> Style {
    if line.starts_with("ERROR") || line.starts_with("WARNING") || line.starts_with("CRITICAL") {
        Style::default().fg(Color::Red)
    } else if line.starts_with("[!]") || line.starts_with("HINT") {
        Style::default().fg(Color::Yellow)
    } else if line.starts_with("> ") {
        Style::default().fg(Color::Cyan)
    } else if line.starts_with("[PUZZLE") {
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn draw_ui(f: &mut Frame, app: &App, snapshot: &RenderSnapshot) {
    if matches!(app.screen, Screen::TitleScreen) {
        draw_title_screen(f, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(f.area());

    // Status bar
    let state = &snapshot.state;
    let mut status = vec![
        Span::styled(
            " TERMINAL PARADOX ",
            Style::default().fg(Color::Black).bg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" {} ", snapshot.room.name),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" Corruption: {}% ", state.corruption),
            Style::default().fg(corruption_color(state.corruption)),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" Moves: {} ", state.moves),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" {} ", snapshot.elapsed),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if app.game.shield_turns() > 0 {
        status.push(Span::raw("  "));
        status.push(Span::styled(
            format!(" SHIELD {} ", app.game.shield_turns()),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ));
    }
    let status_block =
        Paragraph::new(Line::from(status)).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(status_block, chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[1]);

    // Output panel, pinned to the bottom unless scrolled back
    let visible = main_chunks[0].height.saturating_sub(2);
    let total = row_count(app.output.len());
    let top = total
        .saturating_sub(visible)
        .saturating_sub(app.output_scroll);
    let lines: Vec<Line> = app
        .output
        .iter()
        .map(|l| Line::styled(l.as_str(), line_style(l)))
        .collect();
    let (title, border) = match app.screen {
        Screen::Escaped => (
            " ESCAPED! [Enter to exit] ",
            Style::default().fg(Color::Green),
        ),
        _ if app.output_scroll > 0 => (" Terminal [scrolled] ", Style::default().fg(Color::Gray)),
        _ => (" Terminal ", Style::default().fg(Color::Gray)),
    };
    let output = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(title),
        )
        .wrap(Wrap { trim: false })
        .scroll((top, 0));
    f.render_widget(output, main_chunks[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),
            Constraint::Length(inventory_height(state.max_inventory)),
        ])
        .split(main_chunks[1]);

    // Room art plus whatever the corruption paints over it
    let mut room_text: Vec<Line> = snapshot
        .room
        .ascii
        .as_deref()
        .unwrap_or_default()
        .lines()
        .map(|l| Line::styled(l.to_string(), Style::default().fg(Color::Green)))
        .collect();
    room_text.extend(
        snapshot
            .glitch
            .lines()
            .map(|l| Line::styled(l.to_string(), Style::default().fg(Color::Magenta))),
    );
    let room_border = if snapshot.room.corrupted {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Gray)
    };
    let room = Paragraph::new(room_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(room_border)
            .title(format!(" {} ", snapshot.room.id)),
    );
    f.render_widget(room, side[0]);

    let mut inventory: Vec<Line> = state
        .inventory
        .iter()
        .enumerate()
        .map(|(i, item)| Line::raw(format!(" {}. {}", i + 1, item)))
        .collect();
    if inventory.is_empty() {
        inventory.push(Line::styled(" [empty]", Style::default().fg(Color::DarkGray)));
    }
    let inventory = Paragraph::new(inventory).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Memory {}/{} ", state.inventory.len(), state.max_inventory)),
    );
    f.render_widget(inventory, side[1]);

    f.render_widget(&app.input, chunks[2]);
}

fn draw_title_screen(f: &mut Frame, app: &App) {
    let area = f.area();

    let title_art = r#"
    ╔═══════════════════════════════════════════════════════════╗
    ║                                                           ║
    ║   ▀█▀ █▀▀ █▀█ █▀▄▀█ █ █▄ █ ▄▀█ █                          ║
    ║    █  ██▄ █▀▄ █ ▀ █ █ █ ▀█ █▀█ █▄▄                        ║
    ║                                                           ║
    ║            █▀█ ▄▀█ █▀█ ▄▀█ █▀▄ █▀█ ▀▄▀                    ║
    ║            █▀▀ █▀█ █▀▄ █▀█ █▄▀ █▄█ █ █                    ║
    ║                                                           ║
    ║        "The system is corrupt. So is your input."         ║
    ║                                                           ║
    ╚═══════════════════════════════════════════════════════════╝
"#;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(14),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(area);

    let title = Paragraph::new(title_art)
        .style(Style::default().fg(Color::Green))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let selected = Style::default()
        .fg(Color::Black)
        .bg(Color::Green)
        .add_modifier(Modifier::BOLD);
    let options = [
        (MenuOption::Continue, "  CONTINUE  "),
        (MenuOption::NewGame, "  NEW GAME  "),
        (MenuOption::Quit, "  QUIT  "),
    ];
    for (i, (option, label)) in options.iter().enumerate() {
        let style = if *option == app.menu_selection {
            selected
        } else {
            Style::default().fg(Color::White)
        };
        let item = Paragraph::new(*label)
            .style(style)
            .alignment(Alignment::Center);
        f.render_widget(item, chunks[i + 1]);
    }

    let help = Paragraph::new("↑/↓ to select  •  ENTER to confirm  •  q to quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[4]);
}
