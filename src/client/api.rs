use reqwest::{Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::{
    auth::dto::{LoginResponse, RegisterResponse},
    books::{
        dto::{BookRequest, CreatedResponse, MessageResponse},
        repo_types::Book,
    },
    contact::dto::ContactRequest,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {status}: {}", .message.as_deref().unwrap_or("<no message>"))]
    Api {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("session storage: {0}")]
    Session(#[from] std::io::Error),
    #[error("session encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl ClientError {
    /// The `message` the server sent back, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServerMessage {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: ServerMessage,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct Registration<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Typed HTTP client for the bookstore REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn error_from(res: Response) -> ClientError {
        let status = res.status();
        let message = match res.json::<ErrorBody>().await {
            Ok(ErrorBody {
                message: ServerMessage::One(m),
            }) => Some(m),
            Ok(ErrorBody {
                message: ServerMessage::Many(ms),
            }) => Some(ms.join(", ")),
            Err(_) => None,
        };
        debug!(%status, ?message, "api call failed");
        ClientError::Api { status, message }
    }

    async fn expect_json<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
        if res.status().is_success() {
            Ok(res.json::<T>().await?)
        } else {
            Err(Self::error_from(res).await)
        }
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, ClientError> {
        let res = self
            .http
            .post(self.endpoint(&["auth", "login"])?)
            .json(&Credentials { username, password })
            .send()
            .await?;
        Self::expect_json(res).await
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse, ClientError> {
        let res = self
            .http
            .post(self.endpoint(&["auth", "register"])?)
            .json(&Registration {
                username,
                email,
                password,
            })
            .send()
            .await?;
        Self::expect_json(res).await
    }

    /// All books; an empty catalogue (204) comes back as an empty vector.
    pub async fn list_books(&self) -> Result<Vec<Book>, ClientError> {
        let res = self.http.get(self.endpoint(&["books"])?).send().await?;
        if res.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        Self::expect_json(res).await
    }

    pub async fn get_book(&self, id: i64) -> Result<Book, ClientError> {
        let res = self
            .http
            .get(self.endpoint(&["books", &id.to_string()])?)
            .send()
            .await?;
        Self::expect_json(res).await
    }

    /// Title search; "no matches" (404) comes back as an empty vector.
    pub async fn search_books(&self, title: &str) -> Result<Vec<Book>, ClientError> {
        let res = self
            .http
            .get(self.endpoint(&["books", "search", title])?)
            .send()
            .await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        Self::expect_json(res).await
    }

    pub async fn create_book(&self, book: &BookRequest) -> Result<CreatedResponse, ClientError> {
        let res = self
            .http
            .post(self.endpoint(&["books"])?)
            .json(book)
            .send()
            .await?;
        Self::expect_json(res).await
    }

    /// `id` is sent as typed; the server decides whether it is a valid id.
    pub async fn update_book(
        &self,
        id: &str,
        book: &BookRequest,
    ) -> Result<MessageResponse, ClientError> {
        let res = self
            .http
            .put(self.endpoint(&["books", id])?)
            .json(book)
            .send()
            .await?;
        Self::expect_json(res).await
    }

    pub async fn delete_book(&self, id: i64) -> Result<MessageResponse, ClientError> {
        let res = self
            .http
            .delete(self.endpoint(&["books", &id.to_string()])?)
            .send()
            .await?;
        Self::expect_json(res).await
    }

    pub async fn send_contact(&self, msg: &ContactRequest) -> Result<CreatedResponse, ClientError> {
        let res = self
            .http
            .post(self.endpoint(&["contact"])?)
            .json(msg)
            .send()
            .await?;
        Self::expect_json(res).await
    }
}
