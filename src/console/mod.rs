//! Line-oriented console over a `BookingSession`.

pub mod render;

use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::error::BookingError;
use crate::session::BookingSession;

pub const HELP: &str = "\
Commands:
  seats                          show the seat map
  click <seat>                   select / deselect a free seat
  clear                          clear the selection
  book <name...> [--seat <code>] book the selected seat (or the given code)
  list                           show all bookings
  rename <id> <name...>          change the passenger name of a booking
  delete <id>                    delete a booking
  delete-all                     delete every booking
  search name <query...>         search bookings by passenger name
  search range <start> <end>     search bookings by id range
  search clear                   clear search results
  results                        show the last search results
  available                      ask the server for free seats
  refresh                        reload bookings and the seat map
  dismiss                        hide notifications
  help                           show this help
  quit                           exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Seats,
    Click(String),
    Clear,
    Book { name: String, seat: Option<String> },
    List,
    Rename { id: i64, name: String },
    Delete(i64),
    DeleteAll,
    SearchName(String),
    SearchRange { start: String, end: String },
    SearchClear,
    Results,
    Available,
    Refresh,
    Dismiss,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}, type `help` for the list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0:?} is not a booking id")]
    BadId(String),
}

fn parse_id(raw: &str) -> Result<i64, CommandError> {
    raw.parse().map_err(|_| CommandError::BadId(raw.to_string()))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, rest)) = words.split_first() else {
            return Err(CommandError::Empty);
        };

        let command = match (head.to_ascii_lowercase().as_str(), rest) {
            ("seats", []) => Command::Seats,
            ("click", [seat]) => Command::Click(seat.to_uppercase()),
            ("click", _) => return Err(CommandError::Usage("click <seat>")),
            ("clear", []) => Command::Clear,
            ("book", rest) => {
                let (name, seat) = match rest.iter().position(|w| *w == "--seat") {
                    Some(at) => match &rest[at + 1..] {
                        [code] => (rest[..at].join(" "), Some(code.to_string())),
                        _ => return Err(CommandError::Usage("book <name...> [--seat <code>]")),
                    },
                    None => (rest.join(" "), None),
                };
                Command::Book { name, seat }
            }
            ("list", []) => Command::List,
            ("rename", [id, name @ ..]) if !name.is_empty() => Command::Rename {
                id: parse_id(id)?,
                name: name.join(" "),
            },
            ("rename", _) => return Err(CommandError::Usage("rename <id> <name...>")),
            ("delete", [id]) => Command::Delete(parse_id(id)?),
            ("delete", _) => return Err(CommandError::Usage("delete <id>")),
            ("delete-all", []) => Command::DeleteAll,
            ("search", ["name", query @ ..]) => Command::SearchName(query.join(" ")),
            ("search", ["range", start, end]) => Command::SearchRange {
                start: start.to_string(),
                end: end.to_string(),
            },
            ("search", ["clear"]) => Command::SearchClear,
            ("search", _) => {
                return Err(CommandError::Usage(
                    "search name <query...> | search range <start> <end> | search clear",
                ))
            }
            ("results", []) => Command::Results,
            ("available", []) => Command::Available,
            ("refresh", []) => Command::Refresh,
            ("dismiss", []) => Command::Dismiss,
            ("help", _) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            _ => return Err(CommandError::Unknown(line.trim().to_string())),
        };
        Ok(command)
    }
}

/// What the binary should do after a command ran.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit,
}

/// Runs one command against the session and renders the resulting screen.
/// Action failures are already on the session's error notification, so they
/// only show up through `render::notifications`.
pub async fn execute(session: &BookingSession, command: Command) -> Flow {
    debug!(?command, "Executing console command");
    let outcome: Result<Option<String>, BookingError> = match command {
        Command::Quit => return Flow::Quit,
        Command::Help => Ok(Some(HELP.to_string())),
        Command::Seats => Ok(Some(render::seat_view(session))),
        Command::Click(seat) => {
            session.click_seat(&seat);
            Ok(Some(render::seat_view(session)))
        }
        Command::Clear => {
            session.clear_selection();
            Ok(Some(render::seat_view(session)))
        }
        Command::Book { name, seat } => session
            .submit_booking(&name, seat.as_deref().unwrap_or(""))
            .await
            .map(|b| Some(format!("Booked seat {} for {} (#{})", b.seat, b.name, b.id))),
        Command::List => Ok(Some(render::booking_table(&session.bookings()))),
        Command::Rename { id, name } => session.update(id, &name).await.map(|_| None),
        Command::Delete(id) => session.delete(id).await.map(|_| None),
        Command::DeleteAll => session.delete_all().await.map(|_| None),
        Command::SearchName(query) => session
            .search_by_name(&query)
            .await
            .map(|found| Some(render::booking_table(&found))),
        Command::SearchRange { start, end } => session
            .search_by_range(&start, &end)
            .await
            .map(|found| Some(render::booking_table(&found))),
        Command::SearchClear => {
            session.clear_search();
            Ok(None)
        }
        Command::Results => Ok(Some(render::booking_table(&session.search_results()))),
        Command::Available => session
            .fetch_available_seats()
            .await
            .map(|seats| Some(render::seat_list(&seats))),
        Command::Refresh => session
            .refresh()
            .await
            .map(|_| Some(render::seat_view(session))),
        Command::Dismiss => {
            session.dismiss_all();
            Ok(None)
        }
    };

    let mut screen = outcome.ok().flatten().unwrap_or_default();
    let notices = render::notifications(&session.notifications());
    if !notices.is_empty() {
        if !screen.is_empty() {
            screen.push('\n');
        }
        screen.push_str(&notices);
    }
    Flow::Continue(screen)
}
