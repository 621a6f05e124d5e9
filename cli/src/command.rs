//! Line commands typed at the prompt.

use pathmem_engine::GameCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HostCommand {
    Game(GameCommand),
    Spawn,
    Status,
    Profile,
    Help,
    Quit,
}

pub(crate) const HELP: &str = "\
commands:
  start | s          start a new game
  howto              how to play
  <n> | click <n>    click tile n
  next | n           next level
  restart | r        restart the level
  again | a          play again from level 1
  menu | m           back to the menu
  spawn              create your player profile on the ledger
  status             transaction status
  profile            show your profile
  help | ?           this list
  quit | q           exit";

/// `Ok(None)` for a blank line.
pub(crate) fn parse(line: &str) -> Result<Option<HostCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let head = head.to_ascii_lowercase();

    let command = match head.as_str() {
        "start" | "s" => HostCommand::Game(GameCommand::StartGame),
        "howto" | "how" => HostCommand::Game(GameCommand::ShowHowToPlay),
        "next" | "n" => HostCommand::Game(GameCommand::NextLevel),
        "restart" | "r" => HostCommand::Game(GameCommand::RestartLevel),
        "again" | "a" => HostCommand::Game(GameCommand::PlayAgain),
        "menu" | "m" => HostCommand::Game(GameCommand::ReturnToMenu),
        "click" | "c" => {
            let raw = words
                .next()
                .ok_or_else(|| "usage: click <tile>".to_string())?;
            HostCommand::Game(GameCommand::ClickTile(parse_tile(raw)?))
        }
        "spawn" => HostCommand::Spawn,
        "status" => HostCommand::Status,
        "profile" | "p" => HostCommand::Profile,
        "help" | "?" => HostCommand::Help,
        "quit" | "q" | "exit" => HostCommand::Quit,
        other if other.starts_with(|c: char| c.is_ascii_digit()) => {
            HostCommand::Game(GameCommand::ClickTile(parse_tile(other)?))
        }
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };

    if words.next().is_some() {
        return Err(format!("'{head}' takes no further arguments"));
    }
    Ok(Some(command))
}

fn parse_tile(raw: &str) -> Result<usize, String> {
    raw.parse()
        .map_err(|_| format!("'{raw}' is not a tile number"))
}
