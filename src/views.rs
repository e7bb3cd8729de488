//! Server-rendered HTML pages.

use crate::flash::Flash;
use crate::forms::FormErrors;
use crate::models::{Gif, GifCollection, SearchTerm, User};
use axum::http::StatusCode;
use axum::response::Html;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use std::fmt::Write;

/// Escapes text for use in element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Path of the cached results page for `term`.
pub fn search_results_path(term: &str) -> String {
    format!("/gifs_searched/{}", utf8_percent_encode(term, NON_ALPHANUMERIC))
}

fn nav(user: Option<&User>) -> String {
    let mut links = String::from(
        r#"<a href="/">Search</a> | <a href="/search_terms">Search terms</a> | <a href="/all_gifs">All GIFs</a>"#,
    );
    match user {
        Some(user) => {
            let _ = write!(
                links,
                r#" | <a href="/create_collection">New collection</a> | <a href="/collections">My collections</a> | <a href="/logout">Log out {}</a>"#,
                escape(&user.username)
            );
        }
        None => links.push_str(r#" | <a href="/login">Log in</a> | <a href="/register">Register</a>"#),
    }
    format!("<nav>{}</nav>", links)
}

fn layout(title: &str, user: Option<&User>, flash: Option<Flash>, body: &str) -> Html<String> {
    let flash = flash
        .map(|f| format!(r#"<p class="flash">{}</p>"#, escape(f.message())))
        .unwrap_or_default();
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n{nav}\n{flash}\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n",
        title = escape(title),
        nav = nav(user),
    ))
}

fn errors_for(errors: &FormErrors, field: &str) -> String {
    errors
        .for_field(field)
        .iter()
        .map(|message| format!(r#"<span class="error">{}</span>"#, escape(message)))
        .collect()
}

fn text_input(label: &str, name: &str, kind: &str, value: &str, errors: &FormErrors) -> String {
    format!(
        r#"<p><label>{label} <input type="{kind}" name="{name}" value="{value}"></label>{errors}</p>"#,
        label = escape(label),
        value = escape(value),
        errors = errors_for(errors, name),
    )
}

fn gif_figure(gif: &Gif) -> String {
    format!(
        r#"<li><a href="{url}">{title}</a></li>"#,
        url = escape(&gif.url),
        title = escape(&gif.title)
    )
}

fn gif_list(gifs: &[Gif]) -> String {
    if gifs.is_empty() {
        return "<p>No GIFs here yet.</p>".to_string();
    }
    format!("<ul>{}</ul>", gifs.iter().map(gif_figure).collect::<String>())
}

pub fn index_page(user: Option<&User>, flash: Option<Flash>, search: &str, errors: &FormErrors) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/">{}<p><button type="submit">Submit</button></p></form>"#,
        text_input("Enter a term to search GIFs", "search", "text", search, errors)
    );
    layout("Search GIFs", user, flash, &body)
}

pub fn login_page(
    flash: Option<Flash>,
    next: Option<&str>,
    email: &str,
    errors: &FormErrors,
    invalid_credentials: bool,
) -> Html<String> {
    let action = crate::auth::login_url(next);
    let mut body = String::new();
    if invalid_credentials {
        body.push_str(r#"<p class="error">Invalid username or password.</p>"#);
    }
    let _ = write!(
        body,
        r#"<form method="post" action="{action}">{email}{password}<p><label><input type="checkbox" name="remember_me" value="y"> Keep me logged in</label></p><p><button type="submit">Log In</button></p></form><p>New here? <a href="/register">Register</a></p>"#,
        action = escape(&action),
        email = text_input("Email", "email", "email", email, errors),
        password = text_input("Password", "password", "password", "", errors),
    );
    layout("Log In", None, flash, &body)
}

pub fn register_page(email: &str, username: &str, errors: &FormErrors) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/register">{}{}{}{}<p><button type="submit">Register User</button></p></form>"#,
        text_input("Email:", "email", "email", email, errors),
        text_input("Username:", "username", "text", username, errors),
        text_input("Password:", "password", "password", "", errors),
        text_input("Confirm Password:", "password2", "password", "", errors),
    );
    layout("Register", None, None, &body)
}

pub fn search_results_page(user: Option<&User>, term: &SearchTerm, gifs: &[Gif]) -> Html<String> {
    layout(&format!("GIFs for \"{}\"", term.term), user, None, &gif_list(gifs))
}

pub fn search_terms_page(user: Option<&User>, terms: &[SearchTerm]) -> Html<String> {
    let body = if terms.is_empty() {
        "<p>Nothing has been searched yet.</p>".to_string()
    } else {
        let items: String = terms
            .iter()
            .map(|t| {
                format!(
                    r#"<li><a href="{}">{}</a></li>"#,
                    escape(&search_results_path(&t.term)),
                    escape(&t.term)
                )
            })
            .collect();
        format!("<ul>{}</ul>", items)
    };
    layout("Search terms", user, None, &body)
}

/// Every cached GIF together with the terms that found it.
pub fn all_gifs_page(user: Option<&User>, gifs: &[(Gif, Vec<SearchTerm>)]) -> Html<String> {
    let body = if gifs.is_empty() {
        "<p>No GIFs cached yet.</p>".to_string()
    } else {
        let items: String = gifs
            .iter()
            .map(|(gif, terms)| {
                let found_by = terms.iter().map(|t| escape(&t.term)).collect::<Vec<_>>().join(", ");
                format!(
                    r#"<li><a href="{}">{}</a> <small>found by: {}</small></li>"#,
                    escape(&gif.url),
                    escape(&gif.title),
                    found_by
                )
            })
            .collect();
        format!("<ul>{}</ul>", items)
    };
    layout("All GIFs", user, None, &body)
}

pub fn create_collection_page(
    user: &User,
    gifs: &[Gif],
    name: &str,
    selected: &[i64],
    errors: &FormErrors,
) -> Html<String> {
    let choices: String = gifs
        .iter()
        .map(|gif| {
            format!(
                r#"<li><label><input type="checkbox" name="gif_picks" value="{id}"{checked}> {title}</label></li>"#,
                id = gif.id,
                checked = if selected.contains(&gif.id) { " checked" } else { "" },
                title = escape(&gif.title)
            )
        })
        .collect();
    let body = format!(
        r#"<form method="post" action="/create_collection">{name}<fieldset><legend>GIFs to include</legend><ul>{choices}</ul>{pick_errors}</fieldset><p><button type="submit">Create Collection</button></p></form>"#,
        name = text_input("Collection Name", "name", "text", name, errors),
        pick_errors = errors_for(errors, "gif_picks"),
    );
    layout("Create a collection", Some(user), None, &body)
}

pub fn collections_page(user: &User, flash: Option<Flash>, collections: &[GifCollection]) -> Html<String> {
    let body = if collections.is_empty() {
        r#"<p>You have no collections. <a href="/create_collection">Create one</a>.</p>"#.to_string()
    } else {
        let items: String = collections
            .iter()
            .map(|c| format!(r#"<li><a href="/collection/{}">{}</a></li>"#, c.id, escape(&c.title)))
            .collect();
        format!("<ul>{}</ul>", items)
    };
    layout("My collections", Some(user), flash, &body)
}

pub fn collection_page(user: Option<&User>, collection: &GifCollection, owner: Option<&User>, gifs: &[Gif]) -> Html<String> {
    let by = owner
        .map(|o| format!("<p>Collected by {}</p>", escape(&o.username)))
        .unwrap_or_default();
    layout(&collection.title, user, None, &format!("{}{}", by, gif_list(gifs)))
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let title = match status {
        StatusCode::NOT_FOUND => "Page not found",
        s if s.is_server_error() => "Something went wrong",
        _ => "Bad request",
    };
    let body = format!(r#"<p>{}</p><p><a href="/">Back to search</a></p>"#, escape(message));
    layout(title, None, None, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<a href="x">Tom & 'Jerry'</a>"#), "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;");
    }

    #[test]
    fn result_paths_encode_the_term() {
        assert_eq!(search_results_path("cats"), "/gifs_searched/cats");
        assert_eq!(search_results_path("funny cat/dog"), "/gifs_searched/funny%20cat%2Fdog");
    }

    #[test]
    fn gif_titles_are_escaped_in_pages() {
        let gifs = vec![Gif { id: 1, title: "<script>".into(), url: "https://g/1".into() }];
        let term = SearchTerm { id: 1, term: "x".into() };
        let Html(page) = search_results_page(None, &term, &gifs);
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn form_errors_render_inline() {
        let mut errors = FormErrors::default();
        errors.add("search", crate::forms::REQUIRED);
        let Html(page) = index_page(None, None, "", &errors);
        assert!(page.contains(crate::forms::REQUIRED));
    }
}
