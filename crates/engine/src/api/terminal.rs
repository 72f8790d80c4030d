//! Terminal front end - line-oriented setup and play screens.
//!
//! The setup screen prompts for each field in turn (an empty line keeps the
//! current value) and reprompts a field until it validates. The play screen
//! reads commands and redraws the score line on every draw state change.

use std::fmt::Write as _;
use std::str::FromStr;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

use bowldraw_domain::{
    DomainError, DrawState, GameIndex, GameSession, GameSlot, LeagueName, MinScore, PrizeAmount,
    PrizeSlot, Screen, SetupField, SetupForm,
};

use crate::app::App;

const RULE: &str = "----------------------------------------";

const HELP: &str = "Commands:
  1, 2, 3              draw that game
  r                    reset the drawing
  p <1|2|3|s> <amount> set a prize
  e                    show or hide the prize editor
  t                    toggle light/dark mode
  s                    back to setup
  q                    quit
";

/// Errors that end the terminal session
#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Commands
// =============================================================================

/// A command typed on the play screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Draw(GameIndex),
    Reset,
    SetPrize { slot: PrizeSlot, amount: String },
    TogglePrizeEditor,
    ToggleTheme,
    ReturnToSetup,
    Quit,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command '{0}'")]
    Unknown(String),
    #[error("Usage: p <1|2|3|s> <amount>")]
    MissingPrizeArgs,
    #[error(transparent)]
    Slot(#[from] DomainError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(CommandError::Empty);
        };
        match head.to_ascii_lowercase().as_str() {
            "1" => Ok(Command::Draw(GameIndex::First)),
            "2" => Ok(Command::Draw(GameIndex::Second)),
            "3" => Ok(Command::Draw(GameIndex::Third)),
            "r" | "reset" => Ok(Command::Reset),
            "p" | "prize" => {
                let slot = parts
                    .next()
                    .ok_or(CommandError::MissingPrizeArgs)?
                    .parse::<PrizeSlot>()?;
                let amount = parts.collect::<Vec<_>>().join(" ");
                if amount.is_empty() {
                    return Err(CommandError::MissingPrizeArgs);
                }
                Ok(Command::SetPrize { slot, amount })
            }
            "e" | "edit" => Ok(Command::TogglePrizeEditor),
            "t" | "theme" => Ok(Command::ToggleTheme),
            "s" | "setup" => Ok(Command::ReturnToSetup),
            "q" | "quit" | "exit" => Ok(Command::Quit),
            "h" | "help" | "?" => Ok(Command::Help),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// A game's cell: the committed value, the animation frame marked with `*`,
/// or `--` when absent.
pub fn format_slot(slot: &GameSlot) -> String {
    match (slot.value(), slot.displayed()) {
        (Some(value), _) => value.to_string(),
        (None, Some(preview)) if slot.is_drawing() => format!("{}*", preview),
        (None, _) if slot.is_drawing() => "...".to_string(),
        _ => "--".to_string(),
    }
}

/// One-line summary of the draw
pub fn render_scores(state: &DrawState) -> String {
    let mut line = String::new();
    for slot in state.slots() {
        let _ = write!(line, "{}: {} | ", slot.index(), format_slot(slot));
    }
    let total = state
        .series_total()
        .map_or_else(|| "--".to_string(), |t| t.to_string());
    let _ = write!(line, "Series: {}", total);
    line
}

fn prize_row(title: String, cell: String) -> String {
    format!("{:<32}{:>6}\n", title, cell)
}

/// The full play screen.
pub fn render_play(session: &GameSession, state: &DrawState) -> String {
    let config = session.config();
    let prizes = config.prizes();
    let mut frame = String::new();

    frame.push_str(RULE);
    frame.push('\n');
    let _ = writeln!(frame, "{}", config.league_name());
    let _ = writeln!(frame, "{}", config.range_description());
    frame.push_str(RULE);
    frame.push('\n');

    for slot in state.slots() {
        let prize_slot = slot.index().prize_slot();
        frame.push_str(&prize_row(
            format!("{} - {}", prize_slot.title(), prizes.get(prize_slot)),
            format_slot(slot),
        ));
    }
    let total = state
        .series_total()
        .map_or_else(|| "--".to_string(), |t| t.to_string());
    frame.push_str(&prize_row(
        format!("{} - {}", PrizeSlot::Series.title(), prizes.get(PrizeSlot::Series)),
        total,
    ));
    frame.push_str(RULE);
    frame.push('\n');

    if session.is_prize_editor_open() {
        frame.push_str("Prizes (change with: p <1|2|3|s> <amount>)\n");
        for slot in PrizeSlot::ALL {
            let _ = writeln!(frame, "  {}: {}", SetupField::Prize(slot), prizes.get(slot));
        }
        frame.push_str(RULE);
        frame.push('\n');
    }

    let next = state
        .next_drawable()
        .map_or_else(|| "-".to_string(), |index| (index.position() + 1).to_string());
    let editor = if session.is_prize_editor_open() {
        "hide settings"
    } else {
        "edit prizes"
    };
    let _ = writeln!(
        frame,
        "[next: {}]  1|2|3 draw  r reset  e {}  t {}  s setup  q quit",
        next,
        editor,
        session.theme().label()
    );
    frame
}

fn render_setup_header(session: &GameSession) -> String {
    format!(
        "{}\nSetup Mystery Game  [{}]\n{}\n",
        RULE,
        session.theme().label(),
        RULE
    )
}

// =============================================================================
// Screens
// =============================================================================

async fn emit<W>(out: &mut W, text: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(text.as_bytes()).await?;
    out.flush().await
}

fn form_field(form: &mut SetupForm, field: SetupField) -> &mut String {
    match field {
        SetupField::LeagueName => &mut form.league_name,
        SetupField::MinScore => &mut form.min_score,
        SetupField::Prize(PrizeSlot::Game1) => &mut form.game1_prize,
        SetupField::Prize(PrizeSlot::Game2) => &mut form.game2_prize,
        SetupField::Prize(PrizeSlot::Game3) => &mut form.game3_prize,
        SetupField::Prize(PrizeSlot::Series) => &mut form.series_prize,
    }
}

fn check_field(field: SetupField, input: &str) -> Result<(), DomainError> {
    match field {
        SetupField::LeagueName => LeagueName::new(input).map(drop),
        SetupField::MinScore => MinScore::parse(input).map(drop),
        SetupField::Prize(_) => PrizeAmount::parse(input).map(drop),
    }
}

const SETUP_FIELDS: [SetupField; 6] = [
    SetupField::LeagueName,
    SetupField::MinScore,
    SetupField::Prize(PrizeSlot::Game1),
    SetupField::Prize(PrizeSlot::Game2),
    SetupField::Prize(PrizeSlot::Game3),
    SetupField::Prize(PrizeSlot::Series),
];

/// Returns `false` when input ends or the user quits.
async fn setup_screen<R, W>(
    app: &App,
    lines: &mut Lines<R>,
    out: &mut W,
) -> Result<bool, TerminalError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let session = app.session.session().await;
    let mut form = SetupForm::from_config(session.config());
    emit(out, &render_setup_header(&session)).await?;

    for field in SETUP_FIELDS {
        loop {
            let current = form_field(&mut form, field).clone();
            emit(out, &format!("{} [{}]: ", field, current)).await?;
            let Some(line) = lines.next_line().await? else {
                return Ok(false);
            };
            let input = match line.trim() {
                "" => current,
                typed => typed.to_string(),
            };
            match check_field(field, &input) {
                Ok(()) => {
                    *form_field(&mut form, field) = input;
                    break;
                }
                Err(e) => emit(out, &format!("  ! {}\n", e)).await?,
            }
        }
    }

    if let Err(e) = app.session.configure(&form).await {
        emit(out, &format!("  ! {}\n", e)).await?;
        return Ok(true);
    }

    loop {
        emit(out, "Press Enter to start drawing (t = toggle theme, q = quit): ").await?;
        let Some(line) = lines.next_line().await? else {
            return Ok(false);
        };
        match line.trim().to_ascii_lowercase().as_str() {
            "" => break,
            "q" | "quit" => return Ok(false),
            "t" => {
                let theme = app.session.toggle_theme().await;
                emit(out, &format!("  {}\n", theme.label())).await?;
            }
            _ => {}
        }
    }

    if let Err(e) = app.session.start().await {
        emit(out, &format!("  ! {}\n", e)).await?;
    }
    Ok(true)
}

async fn emit_frame<W>(app: &App, out: &mut W) -> Result<(), TerminalError>
where
    W: AsyncWrite + Unpin,
{
    let session = app.session.session().await;
    if let Some(state) = app.session.draw_state().await {
        emit(out, &render_play(&session, &state)).await?;
    }
    Ok(())
}

/// Returns `false` when input ends or the user quits.
async fn play_screen<R, W>(
    app: &App,
    lines: &mut Lines<R>,
    out: &mut W,
) -> Result<bool, TerminalError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let Some(mut states) = app.session.subscribe_draws().await else {
        return Ok(true);
    };
    states.borrow_and_update();
    emit_frame(app, out).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(false);
                };
                let command = match line.parse::<Command>() {
                    Ok(command) => command,
                    Err(CommandError::Empty) => continue,
                    Err(e) => {
                        emit(out, &format!("! {}\n{}", e, HELP)).await?;
                        continue;
                    }
                };
                tracing::debug!(command = ?command, "Terminal command");

                // Draws are followed by score lines instead of a full frame
                let redraw = !matches!(command, Command::Draw(_));
                let outcome = match command {
                    Command::Draw(index) => app.session.draw(index).await.map(drop),
                    Command::Reset => app.session.reset().await,
                    Command::SetPrize { slot, amount } => {
                        app.session.set_prize(slot, &amount).await.map(drop)
                    }
                    Command::TogglePrizeEditor => app.session.toggle_prize_editor().await.map(drop),
                    Command::ToggleTheme => {
                        app.session.toggle_theme().await;
                        Ok(())
                    }
                    Command::ReturnToSetup => {
                        return match app.session.return_to_setup().await {
                            Ok(_) => Ok(true),
                            Err(e) => {
                                emit(out, &format!("! {}\n", e)).await?;
                                Ok(true)
                            }
                        };
                    }
                    Command::Quit => return Ok(false),
                    Command::Help => {
                        emit(out, HELP).await?;
                        continue;
                    }
                };

                match outcome {
                    Ok(()) if redraw => emit_frame(app, out).await?,
                    Ok(()) => {}
                    Err(e) => emit(out, &format!("! {}\n", e)).await?,
                }
            }
            changed = states.changed() => {
                if changed.is_err() {
                    return Ok(true);
                }
                let state = states.borrow_and_update().clone();
                let line = render_scores(&state);
                if state.active_draw().is_some() {
                    emit(out, &format!("\r{}", line)).await?;
                } else {
                    emit(out, &format!("\r{}\n", line)).await?;
                }
            }
        }
    }
}

/// Run the terminal until input ends or the user quits.
pub async fn run<R, W>(app: &App, reader: R, mut writer: W) -> Result<(), TerminalError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    tracing::info!("Terminal session started");

    loop {
        let keep_going = match app.session.screen().await {
            Screen::Setup => setup_screen(app, &mut lines, &mut writer).await?,
            Screen::Play => play_screen(app, &mut lines, &mut writer).await?,
        };
        if !keep_going {
            break;
        }
    }

    if app.session.screen().await == Screen::Play {
        // Stop any timer still animating
        let _ = app.session.return_to_setup().await;
    }
    emit(&mut writer, "\n").await?;
    tracing::info!("Terminal session ended");
    Ok(())
}
