//! The application runtime: widget tree, focus and the message worker.
//!
//! All mutation happens on a single worker task. Public mutators enqueue a
//! message and return a [`Pending`] handle; synchronous accessors read the
//! state as of the last applied message.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::events::LifecycleEvent;
use crate::application::key::Key;
use crate::application::pending::Pending;
use crate::application::query::DomQuery;
use crate::config::Settings;
use crate::domain::{
    focus_chain, DomArena, DomError, DomResult, FocusChange, FocusPolicy, FocusState, NodeData, NodeId,
    RemovalPlan, RemovalReport, Selector, TreeRender, Widget, WidgetKind,
};

type Reply<T> = oneshot::Sender<ApplicationResult<T>>;

enum Command {
    Mount {
        parent: Option<NodeId>,
        widgets: Vec<Widget>,
        reply: Reply<Vec<NodeId>>,
    },
    Remove {
        nodes: Vec<NodeId>,
        reply: Reply<RemovalReport>,
    },
    Press {
        key: Key,
        reply: Reply<Option<NodeId>>,
    },
    Focus {
        node: NodeId,
        reply: Reply<Option<NodeId>>,
    },
    Settle {
        reply: Reply<()>,
    },
    Shutdown {
        reply: Reply<()>,
    },
}

struct Envelope {
    command: Command,
    token: CancellationToken,
}

/// Tree plus focus pointer, guarded as one unit.
#[derive(Debug, Default)]
pub struct AppState {
    pub dom: DomArena,
    pub focus: FocusState,
}

impl AppState {
    fn mount(
        &mut self,
        parent: Option<NodeId>,
        widgets: Vec<Widget>,
        auto_focus: bool,
        events: &mut Vec<LifecycleEvent>,
    ) -> DomResult<Vec<NodeId>> {
        let parent = parent.unwrap_or_else(|| self.dom.screen());
        if !self.dom.contains(parent) {
            return Err(DomError::NodeNotFound(parent));
        }
        // A rejected batch inserts nothing.
        if widgets
            .iter()
            .any(|widget| widget.contains_kind(&WidgetKind::Screen))
        {
            return Err(DomError::CannotMountScreen);
        }

        let mut roots = Vec::with_capacity(widgets.len());
        for widget in widgets {
            let root = self.dom.insert_widget(parent, widget)?;
            for node in self.dom.walk_children(root, true) {
                if let Some(data) = self.dom.data(node) {
                    events.push(LifecycleEvent::Mounted {
                        node,
                        kind: data.kind.clone(),
                    });
                }
            }
            roots.push(root);
        }

        if auto_focus {
            push_focus_change(events, self.focus.focus_first_if_unfocused(&self.dom));
        }
        Ok(roots)
    }

    fn remove(
        &mut self,
        nodes: &[NodeId],
        policy: FocusPolicy,
        events: &mut Vec<LifecycleEvent>,
    ) -> DomResult<RemovalReport> {
        let plan = RemovalPlan::new(&self.dom, nodes)?;
        if plan.is_empty() {
            return Ok(plan.apply(&mut self.dom).report);
        }

        let chain = focus_chain(&self.dom);
        let doomed = plan.doomed_set();
        let outcome = plan.apply(&mut self.dom);
        events.extend(
            outcome
                .disposed
                .into_iter()
                .map(|(node, data)| LifecycleEvent::Unmounted {
                    node,
                    kind: data.kind,
                }),
        );
        push_focus_change(
            events,
            self.focus.resolve_after_removal(&chain, &doomed, policy),
        );
        Ok(outcome.report)
    }

    fn press(&mut self, key: Key, events: &mut Vec<LifecycleEvent>) -> Option<NodeId> {
        let change = match key {
            Key::Tab => self.focus.focus_next(&self.dom),
            Key::ShiftTab => self.focus.focus_previous(&self.dom),
        };
        push_focus_change(events, change);
        self.focus.focused()
    }
}

fn push_focus_change(events: &mut Vec<LifecycleEvent>, change: Option<FocusChange>) {
    if let Some(FocusChange { from, to }) = change {
        events.push(LifecycleEvent::FocusChanged { from, to });
    }
}

struct Shared {
    state: Arc<RwLock<AppState>>,
    tx: mpsc::UnboundedSender<Envelope>,
    events: broadcast::Sender<LifecycleEvent>,
    settings: Settings,
}

/// Handle to a running application. Cheap to clone; all clones share state.
///
/// Must be started inside a tokio runtime. The worker stops on
/// [`App::shutdown`] or when the last handle is dropped.
#[derive(Clone)]
pub struct App {
    shared: Arc<Shared>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("settings", &self.shared.settings)
            .field("running", &!self.shared.tx.is_closed())
            .finish()
    }
}

impl App {
    /// Starts the worker task on the current tokio runtime.
    #[instrument(level = "debug")]
    pub fn start(settings: Settings) -> Self {
        let state = Arc::new(RwLock::new(AppState::default()));
        let (tx, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(settings.event_capacity.max(1));

        tokio::spawn(run_worker(
            Arc::clone(&state),
            events.clone(),
            settings.clone(),
            rx,
        ));
        info!("app started");

        Self {
            shared: Arc::new(Shared {
                state,
                tx,
                events,
                settings,
            }),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.shared.settings
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.shared.events.subscribe()
    }

    fn send<T>(&self, build: impl FnOnce(Reply<T>) -> Command) -> Pending<T> {
        let (reply, rx) = oneshot::channel();
        let token = CancellationToken::new();
        let envelope = Envelope {
            command: build(reply),
            token: token.clone(),
        };
        if self.shared.tx.send(envelope).is_err() {
            return Pending::ready(Err(ApplicationError::Closed));
        }
        Pending::new(rx, token)
    }

    /// Mounts widgets as the last children of the screen, in order.
    pub fn mount(&self, widgets: impl IntoIterator<Item = Widget>) -> Pending<Vec<NodeId>> {
        let widgets = widgets.into_iter().collect();
        self.send(|reply| Command::Mount {
            parent: None,
            widgets,
            reply,
        })
    }

    /// Mounts widgets as the last children of `parent`, in order.
    pub fn mount_into(
        &self,
        parent: NodeId,
        widgets: impl IntoIterator<Item = Widget>,
    ) -> Pending<Vec<NodeId>> {
        let widgets = widgets.into_iter().collect();
        self.send(|reply| Command::Mount {
            parent: Some(parent),
            widgets,
            reply,
        })
    }

    /// Removes the given nodes and their subtrees as one batch.
    pub fn remove(&self, nodes: impl IntoIterator<Item = NodeId>) -> Pending<RemovalReport> {
        let nodes = nodes.into_iter().collect();
        self.send(|reply| Command::Remove { nodes, reply })
    }

    pub fn remove_node(&self, node: NodeId) -> Pending<RemovalReport> {
        self.remove([node])
    }

    /// Simulates a key press; resolves to the focused node afterwards.
    pub fn press(&self, key: &str) -> Pending<Option<NodeId>> {
        match key.parse::<Key>() {
            Ok(key) => self.send(|reply| Command::Press { key, reply }),
            Err(e) => Pending::ready(Err(e)),
        }
    }

    pub fn set_focus(&self, node: NodeId) -> Pending<Option<NodeId>> {
        self.send(|reply| Command::Focus { node, reply })
    }

    /// Resolves once every previously queued message has been applied.
    pub fn settle(&self) -> Pending<()> {
        self.send(|reply| Command::Settle { reply })
    }

    /// Stops the worker after the messages queued before this call.
    pub fn shutdown(&self) -> Pending<()> {
        self.send(|reply| Command::Shutdown { reply })
    }

    /// Read access to the current state.
    pub fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.shared.state.read())
    }

    pub fn with_dom<R>(&self, f: impl FnOnce(&DomArena) -> R) -> R {
        self.with_state(|state| f(&state.dom))
    }

    pub fn screen(&self) -> NodeId {
        self.with_dom(|dom| dom.screen())
    }

    pub fn screen_children(&self) -> Vec<NodeId> {
        self.with_dom(|dom| dom.children(dom.screen()).to_vec())
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.with_dom(|dom| dom.children(node).to_vec())
    }

    /// Pre-order snapshot of the subtree under `node`.
    pub fn walk_children(&self, node: NodeId, with_self: bool) -> Vec<NodeId> {
        self.with_dom(|dom| dom.walk_children(node, with_self).collect())
    }

    pub fn node(&self, node: NodeId) -> Option<NodeData> {
        self.with_dom(|dom| dom.data(node).cloned())
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.with_dom(|dom| dom.contains(node))
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.with_state(|state| state.focus.focused())
    }

    /// All nodes matching `selector`; malformed selectors fail immediately.
    pub fn query(&self, selector: &str) -> ApplicationResult<DomQuery> {
        let selector = Selector::parse(selector)?;
        let nodes = self.with_dom(|dom| selector.select(dom));
        Ok(DomQuery::new(self.clone(), selector, nodes))
    }

    /// The single node matching `selector`.
    pub fn query_one(&self, selector: &str) -> ApplicationResult<NodeId> {
        let selector = Selector::parse(selector)?;
        Ok(self.with_dom(|dom| selector.select_one(dom))?)
    }

    /// The tree as text, focused node marked.
    pub fn render(&self) -> String {
        self.with_state(|state| state.dom.render_text(state.focus.focused()))
    }
}

async fn run_worker(
    state: Arc<RwLock<AppState>>,
    events: broadcast::Sender<LifecycleEvent>,
    settings: Settings,
    mut rx: mpsc::UnboundedReceiver<Envelope>,
) {
    debug!("worker running");
    while let Some(Envelope { command, token }) = rx.recv().await {
        let mut pending_events = Vec::new();
        let stop = match command {
            Command::Mount {
                parent,
                widgets,
                reply,
            } => {
                let result = guarded(&token, || {
                    let count: usize = widgets.iter().map(Widget::node_count).sum();
                    let roots = state.write().mount(
                        parent,
                        widgets,
                        settings.auto_focus,
                        &mut pending_events,
                    )?;
                    debug!(roots = roots.len(), nodes = count, "mounted");
                    Ok(roots)
                });
                publish(&events, &mut pending_events);
                let _ = reply.send(result);
                false
            }
            Command::Remove { nodes, reply } => {
                let result = guarded(&token, || {
                    let report =
                        state
                            .write()
                            .remove(&nodes, settings.focus_policy, &mut pending_events)?;
                    info!(
                        removed = report.removed.len(),
                        skipped = report.skipped,
                        "removed nodes"
                    );
                    Ok(report)
                });
                if let Err(e) = &result {
                    warn!("removal failed: {}", e);
                }
                publish(&events, &mut pending_events);
                let _ = reply.send(result);
                false
            }
            Command::Press { key, reply } => {
                let result = guarded(&token, || {
                    debug!(%key, "key pressed");
                    Ok(state.write().press(key, &mut pending_events))
                });
                publish(&events, &mut pending_events);
                let _ = reply.send(result);
                false
            }
            Command::Focus { node, reply } => {
                let result = guarded(&token, || {
                    let mut guard = state.write();
                    let AppState { dom, focus } = &mut *guard;
                    push_focus_change(&mut pending_events, focus.set_focus(dom, node)?);
                    Ok(focus.focused())
                });
                publish(&events, &mut pending_events);
                let _ = reply.send(result);
                false
            }
            Command::Settle { reply } => {
                let _ = reply.send(Ok(()));
                false
            }
            Command::Shutdown { reply } => {
                let _ = reply.send(Ok(()));
                true
            }
        };

        if stop {
            break;
        }
    }
    rx.close();
    info!("worker stopped");
}

/// Drains queued events to subscribers; called before each reply.
fn publish(events: &broadcast::Sender<LifecycleEvent>, pending: &mut Vec<LifecycleEvent>) {
    for event in pending.drain(..) {
        // No subscribers is fine.
        let _ = events.send(event);
    }
}

/// Runs `op` unless the envelope was cancelled while queued.
fn guarded<T>(
    token: &CancellationToken,
    op: impl FnOnce() -> ApplicationResult<T>,
) -> ApplicationResult<T> {
    if token.is_cancelled() {
        debug!("skipping cancelled operation");
        return Err(ApplicationError::Cancelled);
    }
    op()
}
