//! Request handlers for the tracker pages.
//!
//! Every write redirects to `/` with `302 Found` when it succeeds. A
//! rejected submission re-renders the tracker page instead, with the
//! message and the raw input; the page data for that re-render is read
//! fresh from the store, roster included.
//!
//! # Endpoints
//!
//! | Method | Path | Form fields | Description |
//! |--------|------|-------------|-------------|
//! | `GET` | `/` | -- | Tracker page |
//! | `POST` | `/add` | `country` | Add a visited country |
//! | `POST` | `/add-city` | `city` | Add a visited city |
//! | `POST` | `/delete-city` | `city_name` | Remove a visited city |
//! | `POST` | `/user` | `add` or `user` | Open the new-user form or switch profile |
//! | `POST` | `/new` | `name`, `color` | Create a profile and switch to it |

use std::sync::Arc;

use axum::Form;
use axum::extract::State;
use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use tower_sessions::Session;
use travel_db::{DbError, InsertOutcome};
use travel_types::{CityName, CountryQuery, UserId, UserName};

use crate::error::{FormError, NEW_USER_ERROR, WebError};
use crate::state::AppState;
use crate::views::{DEFAULT_COLOR, FormField, IndexView, NewUserView};

// ---------------------------------------------------------------------------
// Form bodies
// ---------------------------------------------------------------------------

// Missing fields deserialize as empty strings so they hit the same
// "cannot be empty" path as a blank submission.

/// Body of `POST /add`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct AddCountryForm {
    /// Country name as typed.
    #[serde(default)]
    pub country: String,
}

/// Body of `POST /add-city`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct AddCityForm {
    /// City name as typed.
    #[serde(default)]
    pub city: String,
}

/// Body of `POST /delete-city`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct DeleteCityForm {
    /// Stored city name.
    #[serde(default)]
    pub city_name: String,
}

/// Body of `POST /user`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct SelectUserForm {
    /// `"new"` when the "add family member" button was pressed.
    pub add: Option<String>,
    /// Id of the profile to switch to.
    pub user: Option<String>,
}

/// Body of `POST /new`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct NewUserForm {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Display colour.
    #[serde(default)]
    pub color: String,
}

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

/// Render the tracker page for the current user.
pub async fn index(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Html<String>, WebError> {
    let user = state.sessions.current(&session).await;
    let view = load_index(&state, user, Roster::Cached, None).await?;
    Ok(Html(state.views.render_index(&view)?))
}

// ---------------------------------------------------------------------------
// POST /add
// ---------------------------------------------------------------------------

/// Add a country to the current user's visited set.
pub async fn add_country(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<AddCountryForm>,
) -> Response {
    let user = state.sessions.current(&session).await;
    let result = record_country(&state, user, &form.country).await;
    settle(&state, user, "/add", result, FormField::Country, form.country).await
}

async fn record_country(state: &AppState, user: UserId, raw: &str) -> Result<(), FormError> {
    let query = CountryQuery::parse(raw).ok_or(FormError::EmptyCountry)?;
    let code = state
        .store
        .find_country_code_by_name(&query)
        .await?
        .ok_or(FormError::UnknownCountry)?;

    match state.store.insert_visited_country(user, &code).await? {
        InsertOutcome::Inserted => {
            tracing::info!(%user, %code, "Country added");
            Ok(())
        }
        InsertOutcome::Duplicate => Err(FormError::DuplicateCountry),
    }
}

// ---------------------------------------------------------------------------
// POST /add-city
// ---------------------------------------------------------------------------

/// Add a city to the current user's visited set.
pub async fn add_city(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<AddCityForm>,
) -> Response {
    let user = state.sessions.current(&session).await;
    let result = record_city(&state, user, &form.city).await;
    settle(&state, user, "/add-city", result, FormField::City, form.city).await
}

async fn record_city(state: &AppState, user: UserId, raw: &str) -> Result<(), FormError> {
    let city = CityName::parse(raw).ok_or(FormError::EmptyCity)?;

    match state.store.insert_visited_city(user, &city).await? {
        InsertOutcome::Inserted => {
            tracing::info!(%user, %city, "City added");
            Ok(())
        }
        InsertOutcome::Duplicate => Err(FormError::DuplicateCity),
    }
}

// ---------------------------------------------------------------------------
// POST /delete-city
// ---------------------------------------------------------------------------

/// Remove a city from the current user's visited set.
///
/// Always redirects: a blank name, an unknown city, and a store failure
/// all end on the tracker page without a message.
pub async fn delete_city(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<DeleteCityForm>,
) -> Response {
    let Some(city) = CityName::parse(&form.city_name) else {
        return redirect_home();
    };
    let user = state.sessions.current(&session).await;

    match state.store.delete_visited_city(user, &city).await {
        Ok(removed) => tracing::info!(%user, %city, removed, "City deleted"),
        Err(e) => tracing::warn!(%user, %city, error = %e, "Failed to delete city"),
    }
    redirect_home()
}

// ---------------------------------------------------------------------------
// POST /user
// ---------------------------------------------------------------------------

/// Open the new-user form, or switch the current user.
///
/// The submitted id must belong to a known profile; anything else
/// leaves the current user unchanged. The check reads the cached
/// roster, which only this process invalidates, so a profile created
/// by another process is accepted once the cache next reloads.
pub async fn select_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<SelectUserForm>,
) -> Response {
    if form.add.as_deref() == Some("new") {
        return render_new_user(&state, &NewUserView::default());
    }

    let Some(raw) = form.user else {
        tracing::warn!("User switch without a user id");
        return redirect_home();
    };
    let Ok(id) = raw.parse::<UserId>() else {
        tracing::warn!(user = %raw, "User switch with a malformed id");
        return redirect_home();
    };

    match state.roster.find_user(state.store(), id).await {
        Ok(Some(_)) => {
            if let Err(e) = state.sessions.switch(&session, id).await {
                tracing::error!(user = %id, error = %e, "Failed to store session");
            }
            redirect_home()
        }
        Ok(None) => {
            tracing::warn!(user = %id, "User switch to an unknown id");
            redirect_home()
        }
        Err(e) => {
            tracing::error!(user = %id, error = %e, "Failed to load roster for user switch");
            redirect_home()
        }
    }
}

// ---------------------------------------------------------------------------
// POST /new
// ---------------------------------------------------------------------------

/// Create a profile and make it current.
pub async fn new_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<NewUserForm>,
) -> Response {
    let Some(name) = UserName::parse(&form.name) else {
        let view = NewUserView {
            error: Some(FormError::EmptyName.to_string()),
            name: Some(form.name),
            color: Some(form.color),
        };
        return render_new_user(&state, &view);
    };

    match state.store.insert_user(&name, &form.color).await {
        Ok(id) => {
            state.roster.invalidate();
            if let Err(e) = state.sessions.switch(&session, id).await {
                tracing::error!(user = %id, error = %e, "Failed to store session");
            }
            tracing::info!(user = %id, name = name.as_str(), "User created");
            redirect_home()
        }
        Err(e) => {
            tracing::error!(route = "/new", error = %e, "Failed to create user");
            (StatusCode::OK, NEW_USER_ERROR).into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A rejected submission to show on the re-rendered page.
struct Notice {
    error: String,
    field: FormField,
    input: String,
}

/// Which roster read a page uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Roster {
    /// Serve from the cache when it is current.
    Cached,
    /// Always re-query.
    Fresh,
}

/// Gather everything the tracker page shows for `user`.
async fn load_index(
    state: &AppState,
    user: UserId,
    roster: Roster,
    notice: Option<Notice>,
) -> Result<IndexView, DbError> {
    let countries = state.store.list_visited_country_codes(user).await?;
    let users = match roster {
        Roster::Cached => state.roster.users(state.store()).await?,
        Roster::Fresh => state.roster.refresh(state.store()).await?,
    };
    let visited_cities = state.store.list_visited_cities(user).await?;

    let color = users
        .iter()
        .find(|u| u.id == user)
        .map_or_else(|| DEFAULT_COLOR.to_owned(), |u| u.color.clone());
    let (error, country_input, city_input) = match notice {
        None => (None, None, None),
        Some(Notice { error, field: FormField::Country, input }) => (Some(error), Some(input), None),
        Some(Notice { error, field: FormField::City, input }) => (Some(error), None, Some(input)),
    };

    Ok(IndexView {
        total: countries.len(),
        countries,
        users: users.to_vec(),
        color,
        current_user_id: user,
        visited_cities,
        error,
        country_input,
        city_input,
    })
}

/// Turn the outcome of a tracker-page submission into a response.
async fn settle(
    state: &AppState,
    user: UserId,
    route: &'static str,
    result: Result<(), FormError>,
    field: FormField,
    input: String,
) -> Response {
    let err = match result {
        Ok(()) => return redirect_home(),
        Err(err) => err,
    };

    if let FormError::Store(e) = &err {
        tracing::error!(route, %user, error = %e, "Store operation failed");
    } else {
        tracing::debug!(route, %user, reason = %err, "Submission rejected");
    }

    let notice = Notice {
        error: err.to_string(),
        field,
        input,
    };
    let page = match load_index(state, user, Roster::Fresh, Some(notice)).await {
        Ok(view) => state.views.render_index(&view),
        Err(e) => Err(WebError::from(e)),
    };
    match page {
        Ok(html) => Html(html).into_response(),
        Err(e) => e.into_response(),
    }
}

fn render_new_user(state: &AppState, view: &NewUserView) -> Response {
    match state.views.render_new_user(view) {
        Ok(html) => Html(html).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `302 Found` to `/`.
fn redirect_home() -> Response {
    (StatusCode::FOUND, [(LOCATION, HeaderValue::from_static("/"))]).into_response()
}
