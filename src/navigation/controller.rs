//! Navigation controller — the single owner of navigation state.
//!
//! All commands run on one spawned task. Extension fetches run on their own
//! tasks, but their results are handed back to the controller task before
//! any state is touched. Presentation layers observe changes through
//! [`Navigator::subscribe`] instead of sharing a mutable address field.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};
use url::Url;

use super::address::AddressResolver;
use super::state::NavigationState;
use crate::error::{Error, NavigationError, Result};
use crate::extensions::{ExtensionDescriptor, ExtensionLoader, ExtensionSource};
use crate::page::PageHost;

type Reply<T> = oneshot::Sender<Result<T>>;

/// Completed extension fetch, waiting to be installed by the controller task.
type FetchedExtension = (ExtensionSource, Result<ExtensionDescriptor>, Reply<ExtensionDescriptor>);

enum Command {
    Load { input: String, reply: Reply<Url> },
    Back { reply: Reply<()> },
    Forward { reply: Reply<()> },
    Reload { reply: Reply<()> },
    InstallExtension { location: Url, reply: Reply<ExtensionDescriptor> },
    Extensions { reply: Reply<Vec<ExtensionDescriptor>> },
    Shutdown,
}

/// Handle to a running navigation controller. Cheap to clone.
#[derive(Clone)]
pub struct Navigator {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<NavigationState>,
}

impl Navigator {
    /// Start the controller task for `page`.
    pub fn spawn(
        page: Arc<dyn PageHost>,
        resolver: AddressResolver,
        loader: ExtensionLoader,
    ) -> (Self, JoinHandle<()>) {
        let (commands, rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(NavigationState::default());

        let controller = Controller {
            page,
            resolver,
            loader,
            extensions: Vec::new(),
            state: state_tx,
        };
        let handle = tokio::spawn(controller.run(rx));

        (Self { commands, state }, handle)
    }

    /// Resolve address-bar input and load it.
    pub async fn load_url(&self, input: &str) -> Result<Url> {
        let input = input.to_string();
        self.request(|reply| Command::Load { input, reply }).await
    }

    pub async fn go_back(&self) -> Result<()> {
        self.request(|reply| Command::Back { reply }).await
    }

    pub async fn go_forward(&self) -> Result<()> {
        self.request(|reply| Command::Forward { reply }).await
    }

    pub async fn reload(&self) -> Result<()> {
        self.request(|reply| Command::Reload { reply }).await
    }

    /// Fetch the extension at `location` and keep it installed.
    ///
    /// It runs immediately if it applies to the current page, and again after
    /// every navigation to a page it applies to.
    pub async fn install_extension(&self, location: Url) -> Result<ExtensionDescriptor> {
        self.request(|reply| Command::InstallExtension { location, reply })
            .await
    }

    /// Descriptors of the installed extensions, in install order.
    pub async fn extensions(&self) -> Result<Vec<ExtensionDescriptor>> {
        self.request(|reply| Command::Extensions { reply }).await
    }

    pub fn current_url(&self) -> Option<Url> {
        self.state.borrow().current_url.clone()
    }

    /// Latest published state.
    pub fn state(&self) -> NavigationState {
        self.state.borrow().clone()
    }

    /// Receive every state the controller publishes.
    pub fn subscribe(&self) -> watch::Receiver<NavigationState> {
        self.state.clone()
    }

    /// Stop the controller task. Pending extension fetches are dropped.
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }

    async fn request<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(command(reply))
            .map_err(|_| NavigationError::Stopped)?;
        rx.await.map_err(|_| NavigationError::Stopped)?
    }
}

struct Controller {
    page: Arc<dyn PageHost>,
    resolver: AddressResolver,
    loader: ExtensionLoader,
    extensions: Vec<ExtensionSource>,
    state: watch::Sender<NavigationState>,
}

impl Controller {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let mut fetches: JoinSet<FetchedExtension> = JoinSet::new();

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    if !self.handle(command, &mut fetches).await {
                        break;
                    }
                }
                Some(joined) = fetches.join_next() => {
                    self.finish_install(joined).await;
                }
            }
        }

        debug!("Navigation controller stopped");
    }

    /// Returns false when the controller should stop.
    async fn handle(&self, command: Command, fetches: &mut JoinSet<FetchedExtension>) -> bool {
        match command {
            Command::Load { input, reply } => {
                let result = self.load(&input).await;
                let _ = reply.send(result);
            }
            Command::Back { reply } => {
                let result = if self.page.can_go_back().await {
                    let outcome = self.page.back().await.map_err(Error::from);
                    self.navigated(outcome).await
                } else {
                    Ok(())
                };
                let _ = reply.send(result);
            }
            Command::Forward { reply } => {
                let result = if self.page.can_go_forward().await {
                    let outcome = self.page.forward().await.map_err(Error::from);
                    self.navigated(outcome).await
                } else {
                    Ok(())
                };
                let _ = reply.send(result);
            }
            Command::Reload { reply } => {
                let result = self.page.reload().await.map_err(Error::from);
                let _ = reply.send(self.navigated(result).await);
            }
            Command::InstallExtension { location, reply } => {
                let loader = self.loader.clone();
                fetches.spawn(async move {
                    let mut source = ExtensionSource::new(location);
                    let result = source.load(&loader).await.cloned();
                    (source, result, reply)
                });
            }
            Command::Extensions { reply } => {
                let installed = self
                    .extensions
                    .iter()
                    .filter_map(|s| s.descriptor().cloned())
                    .collect();
                let _ = reply.send(Ok(installed));
            }
            Command::Shutdown => return false,
        }
        true
    }

    async fn load(&self, input: &str) -> Result<Url> {
        let url = match self.resolver.resolve(input) {
            Ok(url) => url,
            Err(e) => {
                let err = Error::from(e);
                self.publish(Some(err.to_string())).await;
                return Err(err);
            }
        };

        info!(input, url = %url, "Loading");
        let result = self.page.navigate(&url).await.map_err(Error::from);
        self.navigated(result).await.map(|()| url)
    }

    /// Publish the outcome of a page command and run matching extensions.
    async fn navigated(&self, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => {
                self.publish(None).await;
                if let Some(url) = self.page.current_url().await {
                    self.run_extensions(&url).await;
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Navigation failed");
                self.publish(Some(e.to_string())).await;
                Err(e)
            }
        }
    }

    async fn run_extensions(&self, url: &Url) {
        for source in &self.extensions {
            if source.apply_if_matching(url, self.page.as_ref()).await {
                debug!(extension = %source.location(), url = %url, "Extension applied");
            }
        }
    }

    async fn finish_install(&mut self, joined: std::result::Result<FetchedExtension, JoinError>) {
        let (source, result, reply) = match joined {
            Ok(fetched) => fetched,
            Err(e) => {
                error!(error = %e, "Extension fetch task failed");
                return;
            }
        };

        let result = match result {
            Ok(descriptor) => {
                if let Some(url) = self.page.current_url().await {
                    source.apply_if_matching(&url, self.page.as_ref()).await;
                }
                self.extensions.retain(|s| s.location() != source.location());
                self.extensions.push(source);
                Ok(descriptor)
            }
            Err(e) => {
                warn!(extension = %source.location(), error = %e, "Extension install failed");
                Err(e)
            }
        };

        let _ = reply.send(result);
    }

    async fn publish(&self, last_error: Option<String>) {
        let state = NavigationState {
            current_url: self.page.current_url().await,
            can_go_back: self.page.can_go_back().await,
            can_go_forward: self.page.can_go_forward().await,
            last_error,
            updated_at: Utc::now(),
        };
        self.state.send_replace(state);
    }
}
