use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match gemini_agent::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
