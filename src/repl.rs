use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use tracing::{debug, info};

use crate::model_gateway::ModelGateway;

const AGENT_LABEL: &str = "AI Agent:";
const TURN_SEPARATOR: &str = "#####################################################";

pub async fn run_repl(gateway: &impl ModelGateway) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_repl_with(gateway, &mut stdin.lock(), &mut stdout).await
}

pub async fn run_repl_with<R, W>(
    gateway: &impl ModelGateway,
    input: &mut R,
    out: &mut W,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    print_banner(out)?;

    let mut turns = 0usize;
    loop {
        write!(out, "You: ").context("Failed to write prompt")?;
        out.flush().context("Failed to flush stdout")?;

        let mut raw = Vec::new();
        let read = input
            .read_until(b'\n', &mut raw)
            .context("Failed to read stdin")?;
        if read == 0 {
            writeln!(out).context("Failed to write output")?;
            break;
        }

        // Undecodable bytes become U+FFFD rather than ending the session.
        let line = String::from_utf8_lossy(&raw);
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }
        if prompt.eq_ignore_ascii_case("exit") || prompt.eq_ignore_ascii_case("quit") {
            break;
        }

        writeln!(out, "{AGENT_LABEL} Thinking...").context("Failed to write output")?;
        out.flush().context("Failed to flush stdout")?;

        turns += 1;
        let written = match gateway.send_prompt(prompt).await {
            Ok(reply) => writeln!(out, "{AGENT_LABEL} {}\n", reply.text().trim()),
            Err(err) => {
                let message = format!("{err:#}");
                debug!(turn = turns, error = %message, "turn failed");
                writeln!(out, "{AGENT_LABEL} An error occurred: {message}\n")
            }
        };
        written.context("Failed to write output")?;
        writeln!(out, "{TURN_SEPARATOR}\n").context("Failed to write output")?;
    }

    info!(turns, "chat session ended");
    writeln!(out, "Goodbye!").context("Failed to write output")?;
    Ok(())
}

fn print_banner(out: &mut impl Write) -> Result<()> {
    writeln!(out, "Welcome! This is your AI agent powered by Gemini.")
        .context("Failed to write banner")?;
    writeln!(
        out,
        "You can ask any question, and I'll search for the latest information to help you."
    )
    .context("Failed to write banner")?;
    writeln!(out, "Ask me anything, and I'll do my best to provide a response.")
        .context("Failed to write banner")?;
    writeln!(out, "Type 'exit' or 'quit' to end the conversation.")
        .context("Failed to write banner")?;
    writeln!(out, "{}", "-".repeat(50)).context("Failed to write banner")?;
    Ok(())
}
