//! `ussdflow simulate`: drive a session from the terminal.
//!
//! Each line typed is sent as one inbound message, exactly as the gateway
//! would deliver its last `*` segment. The loop stops on an `END` reply,
//! `/quit`, or end of input.

use std::io::Write as _;

use anyhow::Result;
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};

use ussdflow_types::response::Response;
use ussdflow_types::session::{InboundMessage, SessionId};

use crate::state::AppState;

const QUIT: &str = "/quit";

pub async fn run_simulation(state: &AppState, session: Option<String>) -> Result<()> {
    let session_id =
        SessionId::new(session.unwrap_or_else(|| format!("sim-{}", uuid::Uuid::now_v7())));

    println!();
    println!(
        "  {} session {}",
        style("☎").bold(),
        style(&session_id).cyan()
    );
    println!("  {}", style(format!("Type {QUIT} to hang up")).dim());
    println!();

    // Dial-in carries no answer.
    let mut response = send(state, &session_id, "").await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_screen(&response);
        if response.is_end() {
            break;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line == QUIT {
            println!("  {}", style("Hung up.").dim());
            break;
        }

        response = send(state, &session_id, line).await?;
    }

    Ok(())
}

async fn send(state: &AppState, session_id: &SessionId, text: &str) -> Result<Response> {
    let message = InboundMessage::new(session_id.clone(), text);
    match state.orchestrator.handle(message).await {
        Ok(response) => Ok(response),
        Err(e) => {
            tracing::error!(error = %e, "simulated request failed");
            Ok(Response::end(state.config.flow.service_unavailable_text.clone()))
        }
    }
}

fn print_screen(response: &Response) {
    let frame = style("│").dim();
    for line in response.text.lines() {
        println!("  {frame} {line}");
    }
    if response.is_end() {
        println!("  {}", style("└ session ended").dim());
    } else {
        print!("  {} ", style(">").green().bold());
        let _ = std::io::stdout().flush();
    }
}
