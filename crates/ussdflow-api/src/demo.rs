//! The demo service served by `ussdflow serve` and `ussdflow simulate`.
//!
//! ```text
//! main ─┬─ 1 register ── (name, PIN) ── registered
//!       ├─ 2 fruit ───── (fruit)
//!       ├─ 3 profile
//!       └─ 4 bye
//! ```

use ussdflow_core::collect::CollectedValues;
use ussdflow_core::screen::{MenuRoute, Screen, ScreenContext, ScreenGraph, Transition};
use ussdflow_types::error::{ContractViolation, FlowError};
use ussdflow_types::input::{InputDescriptor, InputOption};
use ussdflow_types::response::Response;

/// Application hash holding the registered profile.
const PROFILE_NAMESPACE: &str = "Profile";

pub fn demo_graph() -> Result<ScreenGraph, ContractViolation> {
    ScreenGraph::builder("main")
        .screen(
            "main",
            Screen::menu_routes(
                "Welcome to ussdflow",
                vec![
                    MenuRoute::new("Register", "register"),
                    MenuRoute::new("Pick a fruit", "fruit"),
                    MenuRoute::new("My profile", "profile"),
                    MenuRoute::new("Exit", "bye"),
                ],
            ),
        )
        .screen(
            "register",
            Screen::input(
                "Registration",
                vec![
                    InputDescriptor::new("name", "your name"),
                    InputDescriptor::new("pin", "a 4-digit PIN").encrypted(),
                ],
                save_profile,
            )?,
        )
        .screen("registered", Screen::notice("Registered", greet))
        .screen(
            "fruit",
            Screen::input(
                "Fruit",
                vec![
                    InputDescriptor::new("fruit", "fruit").with_options([
                        InputOption::new("apple", "Apple"),
                        InputOption::new("banana", "Banana"),
                        InputOption::new("mango", "Mango"),
                    ])?,
                ],
                |_ctx: ScreenContext, values: CollectedValues| async move {
                    let fruit = values.get("fruit").unwrap_or_default().to_string();
                    Ok(Transition::Reply(Response::end(format!("You picked {fruit}. Enjoy!"))))
                },
            )?,
        )
        .screen("profile", Screen::notice("Profile", show_profile))
        .screen("bye", Screen::farewell("Goodbye", "Thanks for using ussdflow."))
        .build()
}

async fn save_profile(ctx: ScreenContext, values: CollectedValues) -> Result<Transition, FlowError> {
    let pin = values.get("pin").unwrap_or_default();
    if pin.len() != 4 || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Ok(Transition::Reply(Response::end(
            "Registration failed: the PIN must be 4 digits.",
        )));
    }

    let session = ctx.session();
    let key = session.keys().namespaced(PROFILE_NAMESPACE);
    let name = values.get("name").unwrap_or_default();
    session.store().hset(&key, "name", name).await?;
    tracing::info!(screen = %ctx.screen(), session_id = %session.id(), "profile saved");

    Ok(Transition::goto("registered"))
}

async fn profile_name(ctx: &ScreenContext) -> Result<Option<String>, FlowError> {
    let session = ctx.session();
    let key = session.keys().namespaced(PROFILE_NAMESPACE);
    Ok(session.store().hget(&key, "name").await?)
}

async fn greet(ctx: ScreenContext) -> Result<Transition, FlowError> {
    let name = profile_name(&ctx).await?.unwrap_or_default();
    Ok(Transition::Reply(Response::end(format!(
        "Registered\nWelcome aboard, {name}."
    ))))
}

async fn show_profile(ctx: ScreenContext) -> Result<Transition, FlowError> {
    let text = match profile_name(&ctx).await? {
        Some(name) => format!("Profile\nName: {name}"),
        None => "Profile\nYou are not registered yet.".to_string(),
    };
    Ok(Transition::Reply(Response::end(text)))
}
