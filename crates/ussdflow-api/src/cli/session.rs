//! `ussdflow inspect`: show where a stored session stands.

use anyhow::Result;
use console::style;

use ussdflow_types::session::SessionId;

use crate::state::AppState;

pub async fn inspect_session(state: &AppState, session: &str) -> Result<()> {
    let id = SessionId::new(session);
    match state.orchestrator.inspect(&id).await? {
        Some(session_state) => {
            println!();
            println!("  {}  {}", style("Session").bold(), style(&id).cyan());
            println!("  {}   {}", style("Screen").dim(), session_state.screen);
            println!("  {}   {}", style("Cursor").dim(), session_state.cursor);
            println!();
        }
        None => {
            println!("  {} no session '{id}'", style("!").yellow().bold());
        }
    }
    Ok(())
}
