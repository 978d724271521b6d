use std::io::{self, Write};

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::client::{ChatClient, ChatSession, STREAM_ERROR_ANNOTATION, SendOutcome};
use crate::core::AppConfig;

const CLEAR_COMMAND: &str = "/clear";

pub async fn run(config: AppConfig) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let client = ChatClient::new(&config.api_url);

    if let Err(err) = client.health().await {
        eprintln!("Warning: {} is not responding ({})", client.api_url(), err);
    }

    let mut session = ChatSession::new(client);

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                if line.trim() == CLEAR_COMMAND {
                    if session.clear() {
                        println!("Transcript cleared.");
                    }
                    continue;
                }
                if !session.can_send(&line) {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                // Print the raw markdown as it arrives
                let outcome = session
                    .send(&line, |update| {
                        print!("{}", update.chunk);
                        let _ = io::stdout().flush();
                    })
                    .await;

                if let SendOutcome::Failed { error, .. } = outcome {
                    println!("{}", STREAM_ERROR_ANNOTATION);
                    tracing::debug!("Send failed: {}", error);
                }
                println!();
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
