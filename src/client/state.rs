use std::{
    future::Future,
    time::{Duration, Instant},
};

use tracing::{info, warn};

use crate::{
    auth::dto::PublicUser,
    books::{dto::BookRequest, repo_types::Book},
    client::{
        api::{ApiClient, ClientError},
        session::SessionStore,
    },
    contact::dto::ContactRequest,
};

/// How long a success banner stays visible.
pub const SUCCESS_BANNER_TTL: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Books,
    BookDetails,
    About,
    Contact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success { text: String, shown_at: Instant },
    Error(String),
}

impl Banner {
    pub fn text(&self) -> &str {
        match self {
            Banner::Success { text, .. } => text,
            Banner::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Banner::Error(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub id: String,
    pub title: String,
    pub price: String,
    pub description: String,
}

impl BookForm {
    fn request(&self) -> BookRequest {
        BookRequest {
            title: Some(self.title.clone()),
            price: Some(self.price.clone()),
            description: Some(self.description.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Everything the client renders from.
#[derive(Debug, Default)]
pub struct ClientState {
    pub page: Page,
    pub user: Option<PublicUser>,
    pub books: Vec<Book>,
    pub selected: Option<Book>,
    pub book_form: BookForm,
    pub contact_form: ContactForm,
    pub search: String,
    /// True while a request to the API is in flight.
    pub loading: bool,
    banner: Option<Banner>,
}

impl ClientState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// The banner as seen at `now`; success banners lapse after the TTL.
    pub fn banner_at(&self, now: Instant) -> Option<&Banner> {
        match &self.banner {
            Some(Banner::Success { shown_at, .. })
                if now.saturating_duration_since(*shown_at) >= SUCCESS_BANNER_TTL =>
            {
                None
            }
            other => other.as_ref(),
        }
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner_at(Instant::now())
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    fn show_success(&mut self, text: impl Into<String>) {
        self.banner = Some(Banner::Success {
            text: text.into(),
            shown_at: Instant::now(),
        });
    }

    fn show_error(&mut self, text: impl Into<String>) {
        self.banner = Some(Banner::Error(text.into()));
    }

    fn show_failure(&mut self, err: &ClientError, fallback: &str) {
        warn!(error = %err, "request failed");
        self.show_error(err.server_message().unwrap_or(fallback).to_string());
    }

    /// Books whose title contains the search text, ignoring case.
    pub fn visible_books(&self) -> Vec<&Book> {
        let needle = self.search.to_lowercase();
        self.books
            .iter()
            .filter(|b| b.title.to_lowercase().contains(&needle))
            .collect()
    }
}

/// Holds `loading` up for as long as `request` runs.
async fn in_flight<T>(loading: &mut bool, request: impl Future<Output = T>) -> T {
    *loading = true;
    let out = request.await;
    *loading = false;
    out
}

/// Drives `ClientState` through calls to the REST API.
pub struct Bookstore {
    api: ApiClient,
    session: SessionStore,
    state: ClientState,
}

impl Bookstore {
    /// Restores a previously saved user, if any.
    pub fn new(api: ApiClient, session: SessionStore) -> Self {
        let state = ClientState {
            user: session.load(),
            ..ClientState::default()
        };
        Self {
            api,
            session,
            state,
        }
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    /// Form fields and the search text are edited directly.
    pub fn state_mut(&mut self) -> &mut ClientState {
        &mut self.state
    }

    pub async fn login(&mut self, username: &str, password: &str) {
        if username.is_empty() || password.is_empty() {
            self.state.show_error("Please fill in all fields");
            return;
        }
        match in_flight(&mut self.state.loading, self.api.login(username, password)).await {
            Ok(resp) => {
                if let Err(e) = self.session.save(&resp.user) {
                    warn!(error = %e, "could not persist session");
                }
                info!(user_id = resp.user.id, "logged in");
                self.state
                    .show_success(format!("Welcome back, {}!", resp.user.username));
                self.state.user = Some(resp.user);
                self.reload_if_on_books().await;
            }
            Err(e) => self
                .state
                .show_failure(&e, "Login failed. Please try again."),
        }
    }

    /// Returns whether the account was created.
    pub async fn register(&mut self, username: &str, email: &str, password: &str) -> bool {
        if username.is_empty() || email.is_empty() || password.is_empty() {
            self.state.show_error("Please fill in all fields");
            return false;
        }
        let call = self.api.register(username, email, password);
        match in_flight(&mut self.state.loading, call).await {
            Ok(_) => {
                self.state
                    .show_success("Registration successful! Please login.");
                true
            }
            Err(e) => {
                self.state
                    .show_failure(&e, "Registration failed. Please try again.");
                false
            }
        }
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "could not clear session");
        }
        self.state.user = None;
        self.state.page = Page::Home;
        self.state.show_success("Logged out successfully");
    }

    /// Switch page; entering Books while logged in reloads the list.
    pub async fn navigate(&mut self, page: Page) {
        self.state.page = page;
        self.reload_if_on_books().await;
    }

    async fn reload_if_on_books(&mut self) {
        if self.state.page == Page::Books && self.state.is_authenticated() {
            self.refresh_books().await;
        }
    }

    pub async fn refresh_books(&mut self) {
        match in_flight(&mut self.state.loading, self.api.list_books()).await {
            Ok(books) => self.state.books = books,
            Err(e) => self.state.show_failure(&e, "Error loading books."),
        }
    }

    pub async fn add_book(&mut self) {
        let form = &self.state.book_form;
        if form.title.is_empty() || form.price.is_empty() {
            self.state
                .show_error("Please fill in title and price before adding a book.");
            return;
        }
        let request = form.request();
        match in_flight(&mut self.state.loading, self.api.create_book(&request)).await {
            Ok(resp) => {
                self.state.show_success(resp.message);
                self.state.book_form = BookForm::default();
                self.refresh_books().await;
            }
            Err(e) => self.state.show_failure(&e, "Error adding book."),
        }
    }

    pub async fn update_book(&mut self) {
        let form = &self.state.book_form;
        if form.title.is_empty() || form.price.is_empty() {
            self.state
                .show_error("Please fill in title and price before updating a book.");
            return;
        }
        if form.id.is_empty() {
            self.state
                .show_error("Please provide an ID for updating a book.");
            return;
        }
        let (id, request) = (form.id.clone(), form.request());
        let call = self.api.update_book(&id, &request);
        match in_flight(&mut self.state.loading, call).await {
            Ok(resp) => {
                self.state.show_success(resp.message);
                self.state.book_form = BookForm::default();
                self.refresh_books().await;
            }
            Err(e) => self.state.show_failure(&e, "Error updating book."),
        }
    }

    pub async fn delete_book(&mut self, id: i64) {
        match in_flight(&mut self.state.loading, self.api.delete_book(id)).await {
            Ok(resp) => {
                self.state.show_success(resp.message);
                if self.state.selected.as_ref().is_some_and(|b| b.id == id) {
                    self.state.selected = None;
                }
                self.refresh_books().await;
            }
            Err(e) => self.state.show_failure(&e, "Error deleting book."),
        }
    }

    pub async fn open_book(&mut self, id: i64) {
        match in_flight(&mut self.state.loading, self.api.get_book(id)).await {
            Ok(book) => {
                self.state.selected = Some(book);
                self.state.page = Page::BookDetails;
            }
            Err(e) => self.state.show_failure(&e, "Error loading book details."),
        }
    }

    /// Copy the selected book into the form and go back to the list.
    pub async fn edit_selected(&mut self) {
        if let Some(book) = &self.state.selected {
            self.state.book_form = BookForm {
                id: book.id.to_string(),
                title: book.title.clone(),
                price: book.price.clone(),
                description: book.description.clone(),
            };
        }
        self.navigate(Page::Books).await;
    }

    pub async fn submit_contact(&mut self) {
        let form = &self.state.contact_form;
        if form.name.is_empty() || form.email.is_empty() || form.message.is_empty() {
            self.state.show_error("Please fill in all contact fields.");
            return;
        }
        let req = ContactRequest {
            name: Some(form.name.clone()),
            email: Some(form.email.clone()),
            message: Some(form.message.clone()),
        };
        match in_flight(&mut self.state.loading, self.api.send_contact(&req)).await {
            Ok(resp) => {
                self.state.show_success(resp.message);
                self.state.contact_form = ContactForm::default();
            }
            Err(e) => self.state.show_failure(&e, "Error sending message."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::spawn_server;

    async fn bookstore(dir: &tempfile::TempDir) -> Bookstore {
        let api = ApiClient::new(&spawn_server().await).unwrap();
        Bookstore::new(api, SessionStore::new(dir.path().join("session.json")))
    }

    fn book(id: i64, title: &str) -> Book {
        Book {
            id,
            title: title.into(),
            price: "$1".into(),
            description: String::new(),
        }
    }

    #[test]
    fn success_banner_expires_error_banner_stays() {
        let mut state = ClientState::default();
        state.show_success("Saved");
        let now = Instant::now();
        assert_eq!(state.banner_at(now).map(Banner::text), Some("Saved"));
        assert!(state.banner_at(now + SUCCESS_BANNER_TTL).is_none());

        state.show_error("Broken");
        let later = now + Duration::from_secs(60);
        assert!(state.banner_at(later).is_some_and(Banner::is_error));
        state.dismiss_banner();
        assert!(state.banner_at(later).is_none());
    }

    #[tokio::test]
    async fn in_flight_raises_then_clears_loading() {
        let mut loading = false;
        let seen = in_flight(&mut loading, async { 7 }).await;
        assert_eq!(seen, 7);
        assert!(!loading);
    }

    #[test]
    fn visible_books_filter_ignores_case() {
        let state = ClientState {
            books: vec![book(1, "The Great Gatsby"), book(2, "Harry Potter")],
            search: "POT".into(),
            ..ClientState::default()
        };
        let titles: Vec<&str> = state.visible_books().iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Harry Potter"]);
    }

    #[tokio::test]
    async fn login_persists_and_restores_the_user() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = bookstore(&dir).await;
        assert!(app.register("admin", "admin@bookstore.com", "admin123").await);

        app.login("admin", "admin123").await;
        assert!(app.state().is_authenticated());
        assert_eq!(
            app.state().banner().map(Banner::text),
            Some("Welcome back, admin!")
        );

        let restored = Bookstore::new(
            ApiClient::new("http://127.0.0.1:9").unwrap(),
            SessionStore::new(dir.path().join("session.json")),
        );
        assert_eq!(
            restored.state().user.as_ref().map(|u| u.username.as_str()),
            Some("admin")
        );

        app.logout();
        assert!(!app.state().is_authenticated());
        assert_eq!(app.state().page, Page::Home);
        assert!(SessionStore::new(dir.path().join("session.json")).load().is_none());
    }

    #[tokio::test]
    async fn failed_login_shows_server_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = bookstore(&dir).await;
        app.login("ghost", "boo").await;
        assert!(!app.state().is_authenticated());
        let banner = app.state().banner().cloned().unwrap();
        assert!(banner.is_error());
        assert_eq!(banner.text(), "Invalid username or password");
    }

    #[tokio::test]
    async fn add_edit_delete_flow() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = bookstore(&dir).await;
        app.register("admin", "admin@bookstore.com", "admin123").await;
        app.login("admin", "admin123").await;
        app.navigate(Page::Books).await;
        assert!(app.state().books.is_empty());
        assert!(app.state().banner().map_or(true, |b| !b.is_error()));

        app.add_book().await;
        assert_eq!(
            app.state().banner().map(Banner::text),
            Some("Please fill in title and price before adding a book.")
        );

        {
            let form = &mut app.state_mut().book_form;
            form.title = "Dune".into();
            form.price = "$9".into();
        }
        app.add_book().await;
        assert_eq!(
            app.state().banner().map(Banner::text),
            Some("Book created successfully")
        );
        assert_eq!(app.state().book_form, BookForm::default());
        assert_eq!(app.state().books.len(), 1);
        assert!(!app.state().loading);
        let id = app.state().books[0].id;

        app.open_book(id).await;
        assert_eq!(app.state().page, Page::BookDetails);

        app.edit_selected().await;
        assert_eq!(app.state().page, Page::Books);
        assert_eq!(app.state().book_form.id, id.to_string());
        app.state_mut().book_form.price = "$11".into();
        app.update_book().await;
        assert_eq!(
            app.state().banner().map(Banner::text),
            Some("Book updated successfully")
        );
        assert_eq!(app.state().books[0].price, "$11");

        app.delete_book(id).await;
        assert!(app.state().books.is_empty());
        assert!(app.state().selected.is_none());

        app.delete_book(id).await;
        assert_eq!(app.state().banner().map(Banner::text), Some("Book not found"));
    }

    #[tokio::test]
    async fn update_needs_an_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = bookstore(&dir).await;
        {
            let form = &mut app.state_mut().book_form;
            form.title = "Dune".into();
            form.price = "$9".into();
        }
        app.update_book().await;
        assert_eq!(
            app.state().banner().map(Banner::text),
            Some("Please provide an ID for updating a book.")
        );
    }

    #[tokio::test]
    async fn contact_form_is_cleared_after_sending() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = bookstore(&dir).await;
        app.submit_contact().await;
        assert_eq!(
            app.state().banner().map(Banner::text),
            Some("Please fill in all contact fields.")
        );

        app.state_mut().contact_form = ContactForm {
            name: "Ann".into(),
            email: "ann@example.com".into(),
            message: "Do you stock Dune?".into(),
        };
        app.submit_contact().await;
        assert_eq!(
            app.state().banner().map(Banner::text),
            Some("Message sent successfully")
        );
        assert_eq!(app.state().contact_form, ContactForm::default());
    }

    #[tokio::test]
    async fn unreachable_server_uses_fallback_message() {
        let dir = tempfile::tempdir().unwrap();
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        let mut app = Bookstore::new(api, SessionStore::new(dir.path().join("s.json")));
        app.refresh_books().await;
        assert_eq!(
            app.state().banner().map(Banner::text),
            Some("Error loading books.")
        );
        assert!(!app.state().loading);
    }
}
