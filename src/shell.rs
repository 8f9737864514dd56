//! Line-oriented shell — the text presentation layer over [`Navigator`].
//!
//! Commands are read one per line. `back`, `forward`, `reload`, `ext <url>`,
//! and `quit` are recognized; anything else is address-bar input. State
//! changes are printed to stdout as JSON lines; everything else goes to stderr.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use url::Url;

use crate::error::{AddressError, Result};
use crate::navigation::{NavigationState, Navigator};

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Back,
    Forward,
    Reload,
    /// Install the extension at the given location.
    Extension(String),
    Quit,
    /// Address-bar input.
    Address(String),
}

impl ShellCommand {
    /// Parse a line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let command = match line {
            "back" => Self::Back,
            "forward" => Self::Forward,
            "reload" => Self::Reload,
            "quit" | "exit" => Self::Quit,
            // Bare `ext` fails as an empty location rather than becoming a search.
            "ext" => Self::Extension(String::new()),
            _ => match line.split_once(char::is_whitespace) {
                Some(("ext", location)) => Self::Extension(location.trim().to_string()),
                _ => Self::Address(line.to_string()),
            },
        };
        Some(command)
    }

    /// Run the command against `navigator`. `Quit` is a no-op here.
    pub async fn execute(&self, navigator: &Navigator) -> Result<()> {
        match self {
            Self::Back => navigator.go_back().await,
            Self::Forward => navigator.go_forward().await,
            Self::Reload => navigator.reload().await,
            Self::Address(input) => navigator.load_url(input).await.map(|_| ()),
            Self::Extension(location) => {
                let location = Url::parse(location).map_err(|e| AddressError::InvalidUrl {
                    input: location.clone(),
                    reason: e.to_string(),
                })?;
                let descriptor = navigator.install_extension(location).await?;
                eprintln!(
                    "Installed {} by {} (applies to {})",
                    descriptor.name(),
                    descriptor.author(),
                    descriptor.applies_to().as_str()
                );
                Ok(())
            }
            Self::Quit => Ok(()),
        }
    }
}

/// Read commands from `input` until EOF or `quit`.
///
/// Command failures are reported and the loop continues.
pub async fn run<R>(input: R, navigator: &Navigator) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let Some(command) = ShellCommand::parse(&line) else {
            continue;
        };
        if command == ShellCommand::Quit {
            break;
        }
        if let Err(e) = command.execute(navigator).await {
            eprintln!("error: {e}");
        }
    }

    Ok(())
}

/// Render one state update as a JSON line.
pub fn render_state(state: &NavigationState) -> serde_json::Result<String> {
    serde_json::to_string(state)
}

/// Print every state update to stdout until the controller goes away.
pub fn spawn_state_printer(mut updates: watch::Receiver<NavigationState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            match render_state(&state) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!("Failed to render navigation state: {}", e),
            }
        }
    })
}
