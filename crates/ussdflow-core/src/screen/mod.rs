//! Screen templates.
//!
//! A screen is an immutable node of the conversation graph. The closed set of
//! kinds (menu, input, notice) is a sum type; each variant carries its
//! application behavior as a closure captured at construction. Screens never
//! hold per-session data, so one graph is shared by every request.

pub mod graph;
pub mod prompt;

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use ussdflow_types::error::{ContractViolation, FlowError};
use ussdflow_types::input::InputDescriptor;
use ussdflow_types::response::Response;
use ussdflow_types::session::ScreenId;

use crate::collect::CollectedValues;
use crate::session::Session;

pub use graph::{ScreenGraph, ScreenGraphBuilder};

/// What a behavior decided after handling a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Answer and keep the session on the current screen.
    Reply(Response),
    /// Move the session to another screen and render its entry.
    Goto(ScreenId),
}

impl Transition {
    pub fn goto(id: impl Into<String>) -> Self {
        Transition::Goto(ScreenId::new(id))
    }
}

impl From<Response> for Transition {
    fn from(response: Response) -> Self {
        Transition::Reply(response)
    }
}

/// Everything a behavior can see about the request that triggered it.
#[derive(Debug, Clone)]
pub struct ScreenContext {
    session: Session,
    screen: ScreenId,
    input: Option<String>,
}

impl ScreenContext {
    pub fn new(session: Session, screen: ScreenId, input: Option<String>) -> Self {
        Self {
            session,
            screen,
            input,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The screen this behavior belongs to.
    pub fn screen(&self) -> &ScreenId {
        &self.screen
    }

    /// The user's message, or `None` when the screen is being entered.
    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    pub fn is_entry(&self) -> bool {
        self.input.is_none()
    }
}

pub type BehaviorFuture = Pin<Box<dyn Future<Output = Result<Transition, FlowError>> + Send>>;

/// Behavior of menu and notice screens.
pub type RespondFn = Arc<dyn Fn(ScreenContext) -> BehaviorFuture + Send + Sync>;

/// Behavior of input screens, run once every input is collected.
pub type InputsCompleteFn =
    Arc<dyn Fn(ScreenContext, CollectedValues) -> BehaviorFuture + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    Menu,
    Input,
    Notice,
}

pub struct MenuScreen {
    pub title: String,
    pub on_respond: RespondFn,
}

pub struct InputScreen {
    pub title: String,
    pub inputs: Vec<InputDescriptor>,
    pub on_inputs_complete: InputsCompleteFn,
}

pub struct NoticeScreen {
    pub title: String,
    pub on_respond: RespondFn,
}

/// A node in the conversation graph.
pub enum Screen {
    Menu(MenuScreen),
    Input(InputScreen),
    Notice(NoticeScreen),
}

/// One numbered entry of [`Screen::menu_routes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRoute {
    pub label: String,
    pub target: ScreenId,
}

impl MenuRoute {
    pub fn new(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: ScreenId::new(target),
        }
    }
}

fn respond_fn<F, Fut>(f: F) -> RespondFn
where
    F: Fn(ScreenContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Transition, FlowError>> + Send + 'static,
{
    Arc::new(move |ctx| -> BehaviorFuture { Box::pin(f(ctx)) })
}

impl Screen {
    pub fn menu<F, Fut>(title: impl Into<String>, on_respond: F) -> Self
    where
        F: Fn(ScreenContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Transition, FlowError>> + Send + 'static,
    {
        Screen::Menu(MenuScreen {
            title: title.into(),
            on_respond: respond_fn(on_respond),
        })
    }

    /// Build an input screen.
    ///
    /// Fails if `inputs` is empty or two inputs share a name.
    pub fn input<F, Fut>(
        title: impl Into<String>,
        inputs: Vec<InputDescriptor>,
        on_inputs_complete: F,
    ) -> Result<Self, ContractViolation>
    where
        F: Fn(ScreenContext, CollectedValues) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Transition, FlowError>> + Send + 'static,
    {
        let title = title.into();
        if inputs.is_empty() {
            return Err(ContractViolation::EmptyInputs { title });
        }

        let mut seen = HashSet::new();
        for input in &inputs {
            if !seen.insert(input.name.as_str()) {
                return Err(ContractViolation::DuplicateInput {
                    title,
                    name: input.name.clone(),
                });
            }
            if input.options.as_ref().is_some_and(|options| options.is_empty()) {
                return Err(ContractViolation::EmptyOptions {
                    name: input.name.clone(),
                });
            }
        }

        Ok(Screen::Input(InputScreen {
            title,
            inputs,
            on_inputs_complete: Arc::new(move |ctx, values| -> BehaviorFuture {
                Box::pin(on_inputs_complete(ctx, values))
            }),
        }))
    }

    pub fn notice<F, Fut>(title: impl Into<String>, on_respond: F) -> Self
    where
        F: Fn(ScreenContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Transition, FlowError>> + Send + 'static,
    {
        Screen::Notice(NoticeScreen {
            title: title.into(),
            on_respond: respond_fn(on_respond),
        })
    }

    /// A notice that just shows `title` and `body` and ends the session.
    pub fn farewell(title: impl Into<String>, body: impl Into<String>) -> Self {
        let title = title.into();
        let text = format!("{title}\n{}", body.into());
        Screen::notice(title, move |_ctx| {
            let text = text.clone();
            async move { Ok(Transition::Reply(Response::end(text))) }
        })
    }

    /// A menu that lists `routes` under `title` and follows the chosen one.
    ///
    /// Anything other than a valid 1-based ordinal re-renders the menu.
    pub fn menu_routes(title: impl Into<String>, routes: Vec<MenuRoute>) -> Self {
        let title = title.into();
        let labels: Vec<&str> = routes.iter().map(|route| route.label.as_str()).collect();
        let text = prompt::render_menu(&title, &labels);
        let routes = Arc::new(routes);

        Screen::menu(title, move |ctx| {
            let text = text.clone();
            let routes = Arc::clone(&routes);
            async move {
                let chosen = ctx
                    .input()
                    .and_then(|input| input.trim().parse::<usize>().ok())
                    .and_then(|ordinal| ordinal.checked_sub(1))
                    .and_then(|index| routes.get(index));
                match chosen {
                    Some(route) => Ok(Transition::Goto(route.target.clone())),
                    None => Ok(Transition::Reply(Response::con(text))),
                }
            }
        })
    }

    pub fn title(&self) -> &str {
        match self {
            Screen::Menu(menu) => &menu.title,
            Screen::Input(input) => &input.title,
            Screen::Notice(notice) => &notice.title,
        }
    }

    pub fn kind(&self) -> ScreenKind {
        match self {
            Screen::Menu(_) => ScreenKind::Menu,
            Screen::Input(_) => ScreenKind::Input,
            Screen::Notice(_) => ScreenKind::Notice,
        }
    }

    /// Input descriptors, empty for menus and notices.
    pub fn inputs(&self) -> &[InputDescriptor] {
        match self {
            Screen::Input(input) => &input.inputs,
            _ => &[],
        }
    }
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screen")
            .field("kind", &self.kind())
            .field("title", &self.title())
            .field("inputs", &self.inputs())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockStore, session};
    use ussdflow_types::input::InputOption;

    fn done(_ctx: ScreenContext, _values: CollectedValues) -> BehaviorFuture {
        Box::pin(async { Ok(Transition::Reply(Response::end("done"))) })
    }

    #[test]
    fn test_input_screen_requires_inputs() {
        let err = Screen::input("Empty", Vec::new(), done).unwrap_err();
        assert_eq!(
            err,
            ContractViolation::EmptyInputs {
                title: "Empty".to_string()
            }
        );
    }

    #[test]
    fn test_input_screen_rejects_duplicate_names() {
        let err = Screen::input(
            "Dup",
            vec![
                InputDescriptor::new("name", "Name"),
                InputDescriptor::new("name", "Other name"),
            ],
            done,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ContractViolation::DuplicateInput {
                title: "Dup".to_string(),
                name: "name".to_string()
            }
        );
    }

    #[test]
    fn test_input_screen_rejects_empty_options_set_directly() {
        let mut input = InputDescriptor::new("fruit", "fruit");
        input.options = Some(Vec::new());
        let err = Screen::input("Fruit", vec![input], done).unwrap_err();
        assert!(matches!(err, ContractViolation::EmptyOptions { .. }));
    }

    #[test]
    fn test_kinds_and_titles() {
        let menu = Screen::menu("Main", |_ctx| async {
            Ok(Transition::Reply(Response::con("Main")))
        });
        let notice = Screen::farewell("Bye", "See you");
        let input = Screen::input(
            "Fruit",
            vec![
                InputDescriptor::new("fruit", "fruit")
                    .with_options([InputOption::new("A", "Apple")])
                    .unwrap(),
            ],
            done,
        )
        .unwrap();

        assert_eq!(menu.kind(), ScreenKind::Menu);
        assert_eq!(notice.kind(), ScreenKind::Notice);
        assert_eq!(input.kind(), ScreenKind::Input);
        assert_eq!(input.title(), "Fruit");
        assert_eq!(input.inputs().len(), 1);
        assert!(menu.inputs().is_empty());
    }

    async fn respond(screen: &Screen, input: Option<&str>) -> Transition {
        let store = MockStore::default();
        let ctx = ScreenContext::new(
            session(&store, "abc"),
            ScreenId::from("main"),
            input.map(str::to_string),
        );
        match screen {
            Screen::Menu(menu) => (menu.on_respond)(ctx).await.unwrap(),
            Screen::Notice(notice) => (notice.on_respond)(ctx).await.unwrap(),
            Screen::Input(_) => panic!("not a responding screen"),
        }
    }

    #[tokio::test]
    async fn test_menu_routes_renders_and_routes() {
        let screen = Screen::menu_routes(
            "Welcome",
            vec![
                MenuRoute::new("Register", "register"),
                MenuRoute::new("Exit", "bye"),
            ],
        );

        assert_eq!(
            respond(&screen, None).await,
            Transition::Reply(Response::con("Welcome\n1. Register\n2. Exit"))
        );
        assert_eq!(respond(&screen, Some("2")).await, Transition::goto("bye"));
        assert_eq!(
            respond(&screen, Some("3")).await,
            Transition::Reply(Response::con("Welcome\n1. Register\n2. Exit"))
        );
        assert_eq!(
            respond(&screen, Some("zero")).await,
            Transition::Reply(Response::con("Welcome\n1. Register\n2. Exit"))
        );
    }

    #[tokio::test]
    async fn test_farewell_ends_session() {
        let screen = Screen::farewell("Thanks", "Goodbye");
        assert_eq!(
            respond(&screen, None).await,
            Transition::Reply(Response::end("Thanks\nGoodbye"))
        );
    }
}
