//! Terminal front end for the chat widget.
//!
//! Reads one message per line and prints each new bubble with
//! [`render_line`]. `quit` or `exit` ends the session, `/theme` toggles the
//! theme.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::widget::render::render_line;
use crate::widget::{ChatBackend, ChatWidget};

const BANNER: &str = "Policy Assistant - type 'quit' to exit, '/theme' to toggle the theme";
const TYPING: &str = "Bot is typing...";

/// Run the chat loop until EOF or `quit`.
pub async fn run<R, W>(
    widget: &mut ChatWidget,
    backend: &dyn ChatBackend,
    input: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut printed = widget.scroll_position();

    out.write_all(format!("{BANNER}\n").as_bytes()).await?;
    out.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let command = line.trim();
        if command.eq_ignore_ascii_case("quit") || command.eq_ignore_ascii_case("exit") {
            out.write_all(b"Bye!\n").await?;
            break;
        }
        if command == "/theme" {
            let theme = widget.toggle_theme();
            out.write_all(format!("Theme: {theme:?}\n").as_bytes())
                .await?;
            continue;
        }

        widget.set_input(line);
        let Some(pending) = widget.begin_send() else {
            continue;
        };
        printed = print_new(widget, printed, out).await?;
        out.write_all(format!("{TYPING}\n").as_bytes()).await?;
        out.flush().await?;

        let result = backend.send(pending.message()).await;
        widget.complete_send(pending, result);
        printed = print_new(widget, printed, out).await?;
    }

    out.flush().await?;
    Ok(())
}

/// Print bubbles the view has scrolled to since `from`; returns the new mark.
async fn print_new<W>(widget: &ChatWidget, from: usize, out: &mut W) -> anyhow::Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let to = widget.scroll_position();
    for message in &widget.messages()[from..to] {
        out.write_all(render_line(message).as_bytes()).await?;
        out.write_all(b"\n").await?;
    }
    out.flush().await?;
    Ok(to)
}
