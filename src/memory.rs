use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::{
    auth::{
        repo::UserRepo,
        repo_types::{NewUser, User},
    },
    books::{
        repo::BookRepo,
        repo_types::{Book, BookFields},
    },
    contact::repo::{ContactRepo, NewContactMessage},
    error::StoreError,
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    books: Vec<Book>,
    contact_messages: Vec<(i64, NewContactMessage)>,
    next_user_id: i64,
    next_book_id: i64,
    next_contact_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// In-process store with the same observable behavior as the Postgres
/// schema: serial ids starting at 1, unique username and email.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    pub fn user_count(&self) -> usize {
        self.lock().map(|t| t.users.len()).unwrap_or(0)
    }

    pub fn contact_count(&self) -> usize {
        self.lock().map(|t| t.contact_messages.len()).unwrap_or(0)
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError> {
        let t = self.lock()?;
        Ok(t.users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let t = self.lock()?;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<i64, StoreError> {
        let mut t = self.lock()?;
        if t.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(
                "duplicate key value violates unique constraint \"users_username_key\"".into(),
            ));
        }
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(
                "duplicate key value violates unique constraint \"users_email_key\"".into(),
            ));
        }
        let id = next_id(&mut t.next_user_id);
        t.users.push(User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
        });
        Ok(id)
    }
}

#[async_trait]
impl BookRepo for MemoryStore {
    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.lock()?.books.clone())
    }

    async fn get(&self, id: i64) -> Result<Option<Book>, StoreError> {
        Ok(self.lock()?.books.iter().find(|b| b.id == id).cloned())
    }

    async fn search_by_title(&self, fragment: &str) -> Result<Vec<Book>, StoreError> {
        let needle = fragment.to_lowercase();
        Ok(self
            .lock()?
            .books
            .iter()
            .filter(|b| b.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn create(&self, book: &BookFields) -> Result<i64, StoreError> {
        let mut t = self.lock()?;
        let id = next_id(&mut t.next_book_id);
        t.books.push(Book {
            id,
            title: book.title.clone(),
            price: book.price.clone(),
            description: book.description.clone(),
        });
        Ok(id)
    }

    async fn update(&self, id: i64, book: &BookFields) -> Result<u64, StoreError> {
        let mut t = self.lock()?;
        match t.books.iter_mut().find(|b| b.id == id) {
            Some(row) => {
                row.title = book.title.clone();
                row.price = book.price.clone();
                row.description = book.description.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i64) -> Result<u64, StoreError> {
        let mut t = self.lock()?;
        let before = t.books.len();
        t.books.retain(|b| b.id != id);
        Ok((before - t.books.len()) as u64)
    }
}

#[async_trait]
impl ContactRepo for MemoryStore {
    async fn create(&self, msg: &NewContactMessage) -> Result<i64, StoreError> {
        let mut t = self.lock()?;
        let id = next_id(&mut t.next_contact_id);
        t.contact_messages.push((id, msg.clone()));
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(title: &str) -> BookFields {
        BookFields {
            title: title.into(),
            price: "$10".into(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn ids_are_serial_and_not_reused() {
        let store = MemoryStore::new();
        let a = BookRepo::create(&store, &fields("A")).await.unwrap();
        let b = BookRepo::create(&store, &fields("B")).await.unwrap();
        assert_eq!((a, b), (1, 2));
        assert_eq!(store.delete(b).await.unwrap(), 1);
        let c = BookRepo::create(&store, &fields("C")).await.unwrap();
        assert_eq!(c, 3);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let store = MemoryStore::new();
        BookRepo::create(&store, &fields("The Great Gatsby")).await.unwrap();
        BookRepo::create(&store, &fields("Harry Potter")).await.unwrap();
        let hits = store.search_by_title("GREAT").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "The Great Gatsby");
        assert!(store.search_by_title("dune").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryStore::new();
        let user = NewUser {
            username: "admin".into(),
            email: "admin@bookstore.com".into(),
            password: "admin123".into(),
        };
        UserRepo::create(&store, &user).await.unwrap();
        let other = NewUser {
            username: "someone".into(),
            ..user
        };
        let err = UserRepo::create(&store, &other).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(m) if m.contains("users_email_key")));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn update_of_missing_row_touches_nothing() {
        let store = MemoryStore::new();
        BookRepo::create(&store, &fields("A")).await.unwrap();
        assert_eq!(store.update(99, &fields("Z")).await.unwrap(), 0);
        assert_eq!(store.list().await.unwrap()[0].title, "A");
    }
}
