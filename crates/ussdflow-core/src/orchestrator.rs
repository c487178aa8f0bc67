//! The orchestrator: one inbound message in, one response out.
//!
//! Per message:
//! 1. Optionally serialize on the session id.
//! 2. Load the session, or create it and enter the root screen.
//! 3. Dispatch the message to the current screen. On an input screen it is
//!    the next input value; on a menu or notice it goes to `on_respond`.
//! 4. Follow the resulting transition, persisting screen moves.
//!
//! The orchestrator keeps no per-session state between calls.

use std::sync::Arc;

use tracing::Instrument;
use ussdflow_types::config::FlowConfig;
use ussdflow_types::error::{ContractViolation, ErrorKind, FlowError};
use ussdflow_types::response::Response;
use ussdflow_types::session::{InboundMessage, ScreenId, SessionId};

use crate::cipher::{BoxValueCipher, ValueCipher};
use crate::collect::{Collected, collect_and_respond, materialize};
use crate::screen::prompt::{annotate, render_prompt};
use crate::screen::{InputScreen, Screen, ScreenContext, ScreenGraph, Transition};
use crate::session::lock::SessionLocks;
use crate::session::{Session, SessionKeys, SessionState};
use crate::storage::{BoxHashStore, HashStore};

/// Drives sessions through a shared, immutable screen graph.
#[derive(Clone)]
pub struct Orchestrator {
    graph: Arc<ScreenGraph>,
    store: BoxHashStore,
    cipher: BoxValueCipher,
    config: FlowConfig,
    locks: Option<SessionLocks>,
}

impl Orchestrator {
    pub fn new<S, C>(graph: ScreenGraph, store: S, cipher: C, config: FlowConfig) -> Self
    where
        S: HashStore + 'static,
        C: ValueCipher + 'static,
    {
        Self::from_boxed(
            Arc::new(graph),
            BoxHashStore::new(store),
            BoxValueCipher::new(cipher),
            config,
        )
    }

    pub fn from_boxed(
        graph: Arc<ScreenGraph>,
        store: BoxHashStore,
        cipher: BoxValueCipher,
        config: FlowConfig,
    ) -> Self {
        let locks = config.serialize_sessions.then(SessionLocks::new);
        Self {
            graph,
            store,
            cipher,
            config,
            locks,
        }
    }

    pub fn graph(&self) -> &ScreenGraph {
        &self.graph
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Handle one inbound message.
    ///
    /// Invalid selections never surface here: the prompt is re-rendered
    /// instead. Contract violations and collaborator failures are returned
    /// unchanged for the caller to log, abort or retry.
    pub async fn handle(&self, message: InboundMessage) -> Result<Response, FlowError> {
        let span = tracing::info_span!("ussd.handle", session_id = %message.session_id);
        async move {
            let _guard = match &self.locks {
                Some(locks) => Some(locks.acquire(&message.session_id).await),
                None => None,
            };

            let result = self.dispatch(message).await;
            match &result {
                Ok(response) => {
                    tracing::debug!(kind = ?response.kind, "response ready");
                }
                Err(e) if e.kind() == ErrorKind::Contract => {
                    tracing::error!(error = %e, "contract violation");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "collaborator failure");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Read a session's screen and cursor without touching it.
    pub async fn inspect(&self, id: &SessionId) -> Result<Option<SessionState>, FlowError> {
        let keys = SessionKeys::new(&self.config, id);
        let loaded = Session::load(id.clone(), keys, self.store.clone(), self.cipher.clone()).await?;
        Ok(loaded.map(|(_, state)| state))
    }

    async fn dispatch(&self, message: InboundMessage) -> Result<Response, FlowError> {
        let keys = SessionKeys::new(&self.config, &message.session_id);
        let loaded = Session::load(
            message.session_id.clone(),
            keys.clone(),
            self.store.clone(),
            self.cipher.clone(),
        )
        .await?;

        let Some((session, state)) = loaded else {
            let root = self.graph.root().clone();
            let session = Session::create(
                message.session_id,
                keys,
                self.store.clone(),
                self.cipher.clone(),
                &root,
            )
            .await?;
            tracing::info!(screen = %root, "session created");

            let screen = self.graph.get(&root)?;
            let transition = self.enter(&session, &root, screen).await?;
            return self.follow(&session, transition).await;
        };

        let SessionState { screen: screen_id, cursor } = state;
        let screen = self.graph.get(&screen_id)?;
        let ctx = ScreenContext::new(session.clone(), screen_id.clone(), Some(message.text.clone()));

        let transition = match screen {
            Screen::Menu(menu) => (menu.on_respond)(ctx).await?,
            Screen::Notice(notice) => (notice.on_respond)(ctx).await?,
            Screen::Input(input) => {
                match self.collect(&session, input, cursor, &message.text).await? {
                    Step::Respond(response) => return Ok(response),
                    Step::Complete => {
                        let values = materialize(&session, input).await?;
                        tracing::info!(screen = %screen_id, inputs = values.len(), "inputs complete");
                        (input.on_inputs_complete)(ctx, values).await?
                    }
                }
            }
        };

        self.follow(&session, transition).await
    }

    /// Feed `text` to an input screen, turning a bad selection into a re-prompt.
    async fn collect(
        &self,
        session: &Session,
        screen: &InputScreen,
        cursor: usize,
        text: &str,
    ) -> Result<Step, FlowError> {
        let len = screen.inputs.len();
        if cursor > len {
            return Err(ContractViolation::CursorOutOfBounds { cursor, len }.into());
        }
        // Already complete: the completion behavior replied without moving on.
        if cursor == len {
            return Ok(Step::Complete);
        }

        match collect_and_respond(session, screen, text).await {
            Ok(Collected::Prompt(response)) => Ok(Step::Respond(response)),
            Ok(Collected::Complete) => Ok(Step::Complete),
            Err(FlowError::InvalidSelection) => {
                let prompt = render_prompt(screen, cursor)?;
                let text = annotate(self.config.invalid_selection_notice.as_deref(), prompt);
                Ok(Step::Respond(Response::con(text)))
            }
            Err(e) => Err(e),
        }
    }

    /// Apply transitions until one yields a response.
    async fn follow(
        &self,
        session: &Session,
        mut transition: Transition,
    ) -> Result<Response, FlowError> {
        let mut redirects = 0;
        loop {
            match transition {
                Transition::Reply(response) => return Ok(response),
                Transition::Goto(target) => {
                    if redirects == self.config.max_redirects {
                        return Err(ContractViolation::RedirectLimit(self.config.max_redirects).into());
                    }
                    redirects += 1;

                    let screen = self.graph.get(&target)?;
                    session.move_to(&target).await?;
                    tracing::debug!(screen = %target, "moved to screen");
                    transition = self.enter(session, &target, screen).await?;
                }
            }
        }
    }

    /// Render the entry of a screen the session has just moved to.
    async fn enter(
        &self,
        session: &Session,
        id: &ScreenId,
        screen: &Screen,
    ) -> Result<Transition, FlowError> {
        let ctx = || ScreenContext::new(session.clone(), id.clone(), None);
        match screen {
            Screen::Menu(menu) => (menu.on_respond)(ctx()).await,
            Screen::Notice(notice) => (notice.on_respond)(ctx()).await,
            Screen::Input(input) => Ok(Transition::Reply(Response::con(render_prompt(input, 0)?))),
        }
    }
}

enum Step {
    Respond(Response),
    Complete,
}
