//! Conversation loop.
//!
//! One turn at a time: prompt, read a line, handle it, print the reply.
//! Query failures are replies like any other; only I/O errors on the
//! terminal itself end the loop early.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use cbq_protocol::Query;

use crate::handler::QueryHandler;

pub const BANNER: &str = "cBioPortal LUAD chatbot. Type a question, or 'quit' to exit.";
pub const PROMPT: &str = "> ";
pub const GOODBYE: &str = "Goodbye!";

/// Whether a line ends the conversation: it starts with "quit" or
/// contains "exit" anywhere, case-insensitively.
pub fn is_exit(line: &str) -> bool {
    let lower = line.trim().to_lowercase();
    lower.starts_with("quit") || lower.contains("exit")
}

/// Run the loop until an exit keyword or end of input.
pub async fn run<R, W>(handler: &QueryHandler<'_>, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output.write_all(format!("{BANNER}\n").as_bytes()).await?;

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            tracing::debug!("end of input");
            break;
        };

        let query = Query::new(line);
        if is_exit(query.cleaned()) {
            output.write_all(format!("{GOODBYE}\n").as_bytes()).await?;
            break;
        }
        if query.cleaned().is_empty() {
            continue;
        }

        let reply = handler.handle(&query).await;
        let rendered = format!("{}\n\n", reply.text);
        output.write_all(rendered.as_bytes()).await?;
    }

    output.flush().await
}
