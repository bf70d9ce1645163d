//! Projections of [`ChatWidget`] state: HTML for the browser page and plain
//! lines for the terminal client.

use super::controller::ChatWidget;
use super::message::Message;

/// Element id of the message list.
pub const CHAT_BOX_ID: &str = "chat-box";
/// Element id of the text input.
pub const INPUT_ID: &str = "user-input";
/// Element id of the typing indicator.
pub const TYPING_INDICATOR_ID: &str = "typing-indicator";
/// Element id of the theme toggle button.
pub const THEME_TOGGLE_ID: &str = "theme-toggle";

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render one bubble.
#[must_use]
pub fn render_bubble(message: &Message) -> String {
    format!(
        r#"<div class="message {class}"><div class="message-content">{text}</div><div class="message-time">{time}</div></div>"#,
        class = message.sender.css_class(),
        text = escape_html(&message.text),
        time = escape_html(&message.timestamp),
    )
}

/// Render the widget container: message list, typing indicator and input.
#[must_use]
pub fn render_widget(widget: &ChatWidget) -> String {
    let mut bubbles = String::new();
    for message in widget.messages() {
        bubbles.push_str(&render_bubble(message));
        bubbles.push('\n');
    }

    let hidden = if widget.is_typing() { "" } else { " hidden" };
    let theme = widget.theme().css_class();

    format!(
        r#"<div class="chat-container {theme}">
  <div class="chat-header">
    <h2>Policy Assistant</h2>
    <button id="{THEME_TOGGLE_ID}" type="button" aria-label="Toggle dark mode">&#9680;</button>
  </div>
  <div id="{CHAT_BOX_ID}" class="chat-box" aria-live="polite">
{bubbles}  </div>
  <div id="{TYPING_INDICATOR_ID}" class="typing-indicator"{hidden}>Bot is typing&hellip;</div>
  <form id="chat-form" class="chat-input">
    <input id="{INPUT_ID}" name="message" type="text" autocomplete="off" placeholder="Ask about your policy..." value="{input}">
    <button type="submit">Send</button>
  </form>
</div>"#,
        input = escape_html(widget.input()),
    )
}

/// Render the full browser page around the widget.
///
/// The inline script mirrors the controller contract: blank input is
/// ignored, the outgoing bubble is shown before the request, and any
/// failure (including a reply-less body) becomes an error bubble.
#[must_use]
pub fn render_page(widget: &ChatWidget, endpoint: &str) -> String {
    let endpoint = serde_json::to_string(endpoint).unwrap_or_else(|_| "\"/chat\"".to_string());
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>Policy Assistant</title>
<style>
*{{margin:0;padding:0;box-sizing:border-box}}
body{{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',sans-serif;background:#f4f5f7;color:#1e1e1e;height:100vh;display:flex;justify-content:center;align-items:center}}
.chat-container{{width:min(480px,100%);height:min(680px,100vh);display:flex;flex-direction:column;background:#fff;border-radius:12px;box-shadow:0 4px 24px #0002;overflow:hidden}}
.chat-container.dark-mode{{background:#1e1e1e;color:#ddd}}
.chat-header{{display:flex;justify-content:space-between;align-items:center;padding:14px 18px;border-bottom:1px solid #0001}}
.chat-header button{{background:none;border:none;font-size:18px;cursor:pointer;color:inherit}}
.chat-box{{flex:1;overflow-y:auto;padding:16px;display:flex;flex-direction:column;gap:10px}}
.message{{max-width:80%;padding:10px 14px;border-radius:12px;font-size:14px;line-height:1.5;white-space:pre-wrap;word-wrap:break-word}}
.user-message{{align-self:flex-end;background:#2563eb;color:#fff}}
.bot-message{{align-self:flex-start;background:#eef0f3}}
.dark-mode .bot-message{{background:#2c2c2c}}
.error-message{{align-self:center;color:#d33;font-size:13px}}
.message-time{{font-size:11px;opacity:.6;margin-top:4px}}
.typing-indicator{{padding:4px 18px;font-size:13px;color:#888}}
.chat-input{{display:flex;gap:8px;padding:12px 16px;border-top:1px solid #0001}}
.chat-input input{{flex:1;padding:10px 12px;border:1px solid #ccc;border-radius:8px;font-size:14px;background:inherit;color:inherit}}
.chat-input button{{padding:10px 18px;border:none;border-radius:8px;background:#2563eb;color:#fff;cursor:pointer}}
</style>
</head>
<body>
{widget}
<script>
const ENDPOINT={endpoint};
const box=document.getElementById("{CHAT_BOX_ID}");
const input=document.getElementById("{INPUT_ID}");
const typing=document.getElementById("{TYPING_INDICATOR_ID}");
let pending=0;
function formatTime(){{return new Date().toLocaleTimeString([],{{hour:"2-digit",minute:"2-digit",hour12:false}})}}
function bubble(cls,text){{
  const m=document.createElement("div");m.className="message "+cls;
  const c=document.createElement("div");c.className="message-content";c.textContent=text;
  const t=document.createElement("div");t.className="message-time";t.textContent=formatTime();
  m.append(c,t);box.append(m);box.scrollTop=box.scrollHeight;
}}
function setTyping(){{typing.hidden=pending===0}}
async function sendMessage(){{
  const text=input.value.trim();
  if(!text)return;
  bubble("user-message",text);input.value="";
  pending++;setTyping();
  try{{
    const res=await fetch(ENDPOINT,{{method:"POST",headers:{{"Content-Type":"application/json"}},body:JSON.stringify({{message:text}})}});
    const data=await res.json();
    if(typeof data.reply!=="string")throw new Error("Malformed response: missing reply field");
    if(!res.ok)throw new Error("Server error ("+res.status+"): "+data.reply);
    pending--;setTyping();bubble("bot-message",data.reply);
  }}catch(e){{
    pending--;setTyping();bubble("error-message",e.message);
  }}
}}
document.getElementById("chat-form").addEventListener("submit",e=>{{e.preventDefault();sendMessage()}});
document.getElementById("{THEME_TOGGLE_ID}").addEventListener("click",()=>document.querySelector(".chat-container").classList.toggle("dark-mode"));
</script>
</body>
</html>"##,
        widget = render_widget(widget),
    )
}

/// Render one bubble as a terminal line: `[HH:MM] You: text`.
#[must_use]
pub fn render_line(message: &Message) -> String {
    format!(
        "[{}] {}: {}",
        message.timestamp,
        message.sender.label(),
        message.text
    )
}
