//! Server-rendered pages. Small string-building functions instead of a
//! template engine; every user-controlled value goes through `escape`.

use crate::auth::session::SessionUser;
use crate::search::ranking::ScoredRecord;

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - PolicySeek</title>
<style>
  body {{ font-family: system-ui, sans-serif; max-width: 720px; margin: 2rem auto; padding: 0 1rem; color: #222; }}
  form.auth {{ display: flex; flex-direction: column; gap: .6rem; max-width: 320px; }}
  input, button {{ padding: .5rem; font-size: 1rem; }}
  .msg {{ color: #b00020; }}
  .card {{ border: 1px solid #ddd; border-radius: 6px; padding: 1rem; margin: 1rem 0; }}
  .card h3 {{ margin: 0 0 .3rem 0; }}
  .meta {{ color: #666; font-size: .9rem; }}
  .score {{ float: right; font-weight: bold; }}
  nav {{ margin-bottom: 1.5rem; }}
</style>
</head>
<body>
{body}
</body>
</html>
"#
    )
}

fn message_block(msg: &str) -> String {
    if msg.is_empty() {
        String::new()
    } else {
        format!("<p class=\"msg\">{}</p>\n", escape(msg))
    }
}

pub fn signup_page(msg: &str) -> String {
    let body = format!(
        r#"<h1>Sign up</h1>
{}<form class="auth" method="post" action="/signup">
  <input name="username" placeholder="Username" autocomplete="username" required>
  <input name="password" type="password" placeholder="Password" autocomplete="new-password" required>
  <button type="submit">Create account</button>
</form>
<p>Already registered? <a href="/login">Log in</a></p>"#,
        message_block(msg)
    );
    page("Sign up", &body)
}

pub fn login_page(msg: &str) -> String {
    let body = format!(
        r#"<h1>Log in</h1>
{}<form class="auth" method="post" action="/login">
  <input name="username" placeholder="Username" autocomplete="username" required>
  <input name="password" type="password" placeholder="Password" autocomplete="current-password" required>
  <button type="submit">Log in</button>
</form>
<p>New here? <a href="/signup">Sign up</a></p>"#,
        message_block(msg)
    );
    page("Log in", &body)
}

pub fn home_page(
    user: &SessionUser,
    query: Option<&str>,
    results: Option<&[ScoredRecord]>,
) -> String {
    let mut body = format!(
        r#"<nav>Signed in as <strong>{}</strong> | <a href="/logout">Log out</a></nav>
<h1>Find a policy scheme</h1>
<form method="post" action="/search">
  <input name="query" placeholder="e.g. crop insurance for farmers" value="{}" size="40" required>
  <button type="submit">Search</button>
</form>
"#,
        escape(&user.username),
        escape(query.unwrap_or("")),
    );

    if let Some(results) = results {
        if results.is_empty() {
            body.push_str("<p>No matching schemes found.</p>\n");
        }
        for r in results {
            body.push_str(&render_result(r));
        }
    }

    page("Home", &body)
}

fn render_result(r: &ScoredRecord) -> String {
    format!(
        r#"<div class="card">
  <span class="score">{score:.3}</span>
  <h3>{name}</h3>
  <p class="meta">{category} | {level}</p>
  <p>{summary}</p>
  <p><strong>Benefits:</strong> {benefits}</p>
  <p><strong>Eligibility:</strong> {eligibility}</p>
  <p><strong>How to apply:</strong> {application}</p>
  <p><strong>Documents:</strong> {documents}</p>
  <p class="meta">Tags: {tags}</p>
</div>
"#,
        score = r.score,
        name = escape(&r.scheme_name),
        category = escape(&r.scheme_category),
        level = escape(&r.level),
        summary = escape(&r.summary),
        benefits = escape(&r.benefits),
        eligibility = escape(&r.eligibility),
        application = escape(&r.application),
        documents = escape(&r.documents),
        tags = escape(&r.tags),
    )
}

pub fn error_page(msg: &str) -> String {
    page("Error", &format!("<h1>Something went wrong</h1>\n{}", message_block(msg)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape(r#"<b onclick="x('&')">"#),
            "&lt;b onclick=&quot;x(&#39;&amp;&#39;)&quot;&gt;"
        );
    }

    #[test]
    fn pages_escape_user_content() {
        let user = SessionUser {
            user_id: 1,
            username: "<script>".to_string(),
        };
        let html = home_page(&user, Some("<img>"), None);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&lt;img&gt;"));
    }

    #[test]
    fn empty_message_renders_no_msg_block() {
        assert!(!login_page("").contains("class=\"msg\""));
        assert!(login_page("Invalid username or password.").contains("class=\"msg\""));
    }
}
