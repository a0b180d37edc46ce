use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    error::AppResult,
    models::Credentials,
    session::{self, AuthSession, Flash, Session},
    store::CreateUserError,
    templates,
};

pub async fn login_page(session: Session) -> Response {
    let html = templates::login_page(&session.context());
    (session.jar, Html(html)).into_response()
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<Credentials>,
) -> AppResult<Response> {
    let username = form.username.trim();

    if let Some(user) = state.store.find_user_by_username(username).await? {
        let hash = user.password_hash.clone();
        let password = form.password;
        let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;

        if valid {
            tracing::info!(user_id = user.id, "user logged in");
            let jar = session::log_in(session.jar, user.id);
            let jar = session::with_flash(jar, Flash::success("Logged in successfully!"));
            return Ok((jar, Redirect::to("/")).into_response());
        }
    }

    tracing::debug!(username, "invalid credentials");
    let mut ctx = session.context();
    ctx.push_flash(Flash::danger("Invalid credentials"));
    Ok((session.jar, Html(templates::login_page(&ctx))).into_response())
}

pub async fn register_page(session: Session) -> Response {
    let html = templates::register_page(&session.context());
    (session.jar, Html(html)).into_response()
}

pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<Credentials>,
) -> AppResult<Response> {
    let username = form.username.trim().to_string();

    if username.is_empty() || form.password.is_empty() {
        return Ok(register_again(session, "Username and password are required."));
    }
    if username.chars().count() > 150 {
        return Ok(register_again(session, "Username must be at most 150 characters."));
    }

    let cost = state.config.bcrypt_cost;
    let password = form.password;
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;

    match state.store.create_user(&username, &hash).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, username = %user.username, "user registered");
            let flash = Flash::success("Registration successful. Please log in.");
            let jar = session::with_flash(session.jar, flash);
            Ok((jar, Redirect::to("/login")).into_response())
        },
        Err(CreateUserError::UsernameTaken) => {
            Ok(register_again(session, "Username already taken."))
        },
        Err(CreateUserError::Db(err)) => Err(err.into()),
    }
}

pub async fn logout(session: AuthSession) -> Response {
    tracing::info!(user_id = session.user.id, "user logged out");
    let jar = session::log_out(session.jar);
    let jar = session::with_flash(jar, Flash::info("Logged out successfully."));
    (jar, Redirect::to("/login")).into_response()
}

fn register_again(session: Session, message: &str) -> Response {
    let mut ctx = session.context();
    ctx.push_flash(Flash::danger(message));
    (session.jar, Html(templates::register_page(&ctx))).into_response()
}
