//! Minimal HTML pages.
//!
//! Presentation only: each handler renders what the middleware already
//! resolved. There is no templating dependency; the pages are small
//! enough that formatted strings with HTML escaping suffice.

use axum::extract::Query;
use axum::response::Html;
use axum::Extension;
use serde::Deserialize;

use crate::auth::CurrentUser;

/// Query parameters the auth pages render as notices.
#[derive(Debug, Deserialize)]
pub struct AuthPageQuery {
    error: Option<String>,
    message: Option<String>,
    #[serde(rename = "returnUrl")]
    return_url: Option<String>,
}

/// `GET /` — public landing page.
pub async fn home() -> Html<String> {
    Html(layout(
        "StudySync",
        r#"<h1>StudySync</h1>
<p>Study together, book tutors, keep your streak.</p>
<p><a href="/auth/login">Log in</a> or <a href="/auth/register">create an account</a>.</p>"#
            .to_string(),
    ))
}

/// `GET /auth/login` — login form.
pub async fn login_page(Query(query): Query<AuthPageQuery>) -> Html<String> {
    let notice = notice_html(&query);
    let return_field = query
        .return_url
        .as_deref()
        .filter(|p| p.starts_with('/'))
        .map(|p| {
            format!(
                r#"<input type="hidden" name="returnUrl" value="{}">"#,
                escape_html(p)
            )
        })
        .unwrap_or_default();

    Html(layout(
        "Log in — StudySync",
        format!(
            r#"<h1>Log in</h1>
{notice}
<form method="post" action="/auth/login">
  {return_field}
  <label>Email <input type="email" name="email" required></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit">Log in</button>
</form>
<p>No account? <a href="/auth/register">Register</a>.</p>"#
        ),
    ))
}

/// `GET /auth/register` — registration form.
pub async fn register_page(Query(query): Query<AuthPageQuery>) -> Html<String> {
    let notice = notice_html(&query);
    Html(layout(
        "Register — StudySync",
        format!(
            r#"<h1>Create your account</h1>
{notice}
<form method="post" action="/auth/register">
  <label>Email <input type="email" name="email" required></label>
  <label>Password <input type="password" name="password" required></label>
  <label>Display name <input type="text" name="display_name"></label>
  <label>I am a
    <select name="role">
      <option value="student">Student</option>
      <option value="teacher">Teacher</option>
    </select>
  </label>
  <button type="submit">Register</button>
</form>
<p>Already registered? <a href="/auth/login">Log in</a>.</p>"#
        ),
    ))
}

/// `GET /auth/setup` — shown when a session exists but the profile row
/// could not be found or created.
pub async fn setup_page(user: Option<Extension<CurrentUser>>) -> Html<String> {
    let email = user
        .as_ref()
        .map(|Extension(u)| escape_html(&u.principal.email))
        .unwrap_or_default();
    Html(layout(
        "Finish setup — StudySync",
        format!(
            r#"<h1>Almost there</h1>
<p>Your account {email} is signed in, but the profile could not be set up.</p>
<p>Retry by <a href="/auth/logout">logging out</a> and signing in again, or contact support if this persists.</p>"#
        ),
    ))
}

/// `GET /student` — student dashboard.
pub async fn student_dashboard(Extension(user): Extension<CurrentUser>) -> Html<String> {
    let name = display_name(&user);
    let stats = user
        .profile
        .as_ref()
        .map(|p| {
            format!(
                "<p>Level {} &middot; {} XP &middot; {} day streak</p>",
                p.study_level, p.total_xp, p.study_streak
            )
        })
        .unwrap_or_default();
    Html(layout(
        "Student dashboard — StudySync",
        format!(
            r#"<h1>Welcome back, {name}</h1>
{stats}
<p><a href="/auth/logout">Log out</a></p>"#
        ),
    ))
}

/// `GET /teacher` — teacher dashboard.
pub async fn teacher_dashboard(Extension(user): Extension<CurrentUser>) -> Html<String> {
    let name = display_name(&user);
    Html(layout(
        "Teacher dashboard — StudySync",
        format!(
            r#"<h1>Welcome back, {name}</h1>
<p>Your bookings and tutor profile live here.</p>
<p><a href="/auth/logout">Log out</a></p>"#
        ),
    ))
}

fn display_name(user: &CurrentUser) -> String {
    let name = user
        .profile
        .as_ref()
        .and_then(|p| p.display_name.as_deref())
        .or_else(|| user.principal.display_name_hint())
        .unwrap_or(&user.principal.email);
    escape_html(name)
}

fn notice_html(query: &AuthPageQuery) -> String {
    if let Some(error) = &query.error {
        let text = match error.as_str() {
            "callback_error" => "Sign-in could not be completed. Please try again.",
            "invalid_credentials" => "Email or password is incorrect.",
            "signup_failed" => "Registration was rejected. Check your details and try again.",
            "provider_unavailable" => "The sign-in service is unavailable. Please retry shortly.",
            _ => "Something went wrong. Please try again.",
        };
        return format!(r#"<p class="error">{text}</p>"#);
    }
    if let Some(message) = &query.message {
        if message == "confirm_email" {
            return r#"<p class="notice">Check your inbox to confirm your email, then log in.</p>"#
                .to_string();
        }
    }
    String::new()
}

fn layout(title: &str, body: String) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{}</title>
  <link rel="stylesheet" href="/assets/main.css">
</head>
<body>
<main>
{body}
</main>
</body>
</html>"#,
        escape_html(title)
    )
}

/// Escapes text for interpolation into HTML.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
