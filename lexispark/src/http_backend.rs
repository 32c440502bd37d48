//! HTTP client for a remote puzzle server
//!
//! Talks to the two puzzle endpoints:
//!
//! - `GET  {base}/api/categories/{ref}/grid?language=..`
//! - `POST {base}/api/categories/{ref}/guess?language=..`
//!
//! Only available when the "http" feature is enabled.

#[cfg(feature = "http")]
pub mod http_impl {
    use std::collections::HashMap;
    use std::future::Future;

    use lexispark_core::PuzzleRef;
    use reqwest::{Client, Response, StatusCode, Url};
    use tokio::sync::RwLock;

    use crate::verifier::GuessConfirmer;
    use crate::wire::{ErrorBody, GuessRequest, GuessResponse, PuzzleStart};
    use crate::{Error, Result};

    /// Client for one puzzle server
    pub struct HttpPuzzleClient {
        client: Client,
        base: Url,
        starts: RwLock<HashMap<(u32, String), PuzzleStart>>,
    }

    impl HttpPuzzleClient {
        /// Create a client for the server at `base_url`
        pub fn new(base_url: &str) -> Result<Self> {
            let base = Url::parse(base_url).map_err(|e| Error::Remote {
                status: 400,
                message: format!("invalid server URL {base_url}: {e}"),
            })?;
            Ok(Self {
                client: Client::new(),
                base,
                starts: RwLock::new(HashMap::new()),
            })
        }

        pub fn base_url(&self) -> &Url {
            &self.base
        }

        /// URL of an endpoint (`grid` or `guess`) for a puzzle
        pub fn endpoint(&self, puzzle: PuzzleRef, action: &str, language: &str) -> Result<Url> {
            let path = format!("api/categories/{puzzle}/{action}");
            let mut url = self.base.join(&path).map_err(|e| Error::Remote {
                status: 400,
                message: format!("cannot build URL for {path}: {e}"),
            })?;
            url.query_pairs_mut().append_pair("language", language);
            Ok(url)
        }

        /// Open a puzzle
        ///
        /// Starts of fixed category ids are cached; daily and random
        /// references always go to the server.
        pub async fn start(&self, puzzle: PuzzleRef, language: &str) -> Result<PuzzleStart> {
            let key = match puzzle {
                PuzzleRef::Id(id) => Some((id, language.to_string())),
                _ => None,
            };
            if let Some(key) = &key {
                let cache = self.starts.read().await;
                if let Some(start) = cache.get(key) {
                    return Ok(start.clone());
                }
            }

            let url = self.endpoint(puzzle, "grid", language)?;
            log::debug!("http: GET {}", url);
            let response = self.client.get(url).send().await?;
            let start: PuzzleStart = check(response).await?.json().await?;

            if let Some(key) = key {
                let mut cache = self.starts.write().await;
                cache.insert(key, start.clone());
            }
            Ok(start)
        }

        /// Ask the server to confirm a guess
        pub async fn guess(
            &self,
            puzzle: PuzzleRef,
            language: &str,
            word: &str,
        ) -> Result<GuessResponse> {
            let url = self.endpoint(puzzle, "guess", language)?;
            log::debug!("http: POST {}", url);
            let request = GuessRequest {
                word: word.to_string(),
            };
            let response = self.client.post(url).json(&request).send().await?;
            Ok(check(response).await?.json().await?)
        }

        /// Confirmer bound to one puzzle, for [`crate::GuessVerifier`]
        pub fn confirmer(&self, puzzle: PuzzleRef, language: &str) -> RemoteConfirmer<'_> {
            RemoteConfirmer {
                client: self,
                puzzle,
                language: language.to_string(),
            }
        }

        /// Forget cached puzzle starts
        pub async fn clear_cache(&self) {
            self.starts.write().await.clear();
        }
    }

    /// Confirms guesses through an [`HttpPuzzleClient`]
    pub struct RemoteConfirmer<'a> {
        client: &'a HttpPuzzleClient,
        puzzle: PuzzleRef,
        language: String,
    }

    impl GuessConfirmer for RemoteConfirmer<'_> {
        fn confirm(&self, normalized: &str) -> impl Future<Output = Result<GuessResponse>> + Send {
            let word = normalized.to_string();
            async move { self.client.guess(self.puzzle, &self.language, &word).await }
        }
    }

    /// Turn a non-success response into [`Error::Remote`]
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = remote_error(status, &body);
        log::warn!("http: {}", err);
        Err(err)
    }

    /// Build the error for a failed response body
    ///
    /// Uses the `{ "error": .. }` message when present, the status reason
    /// otherwise.
    pub fn remote_error(status: StatusCode, body: &str) -> Error {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected response")
                    .to_string()
            });
        Error::Remote {
            status: status.as_u16(),
            message,
        }
    }

}

#[cfg(feature = "http")]
pub use http_impl::*;

#[cfg(not(feature = "http"))]
pub mod http_stub {
    use lexispark_core::PuzzleRef;

    use crate::wire::{GuessResponse, PuzzleStart};
    use crate::{Error, Result};

    const DISABLED: &str = "HTTP support not enabled. Build with --features http";

    pub struct HttpPuzzleClient;

    impl HttpPuzzleClient {
        pub fn new(_base_url: &str) -> Result<Self> {
            Err(disabled())
        }

        pub async fn start(&self, _puzzle: PuzzleRef, _language: &str) -> Result<PuzzleStart> {
            Err(disabled())
        }

        pub async fn guess(
            &self,
            _puzzle: PuzzleRef,
            _language: &str,
            _word: &str,
        ) -> Result<GuessResponse> {
            Err(disabled())
        }
    }

    fn disabled() -> Error {
        Error::Remote {
            status: 501,
            message: DISABLED.to_string(),
        }
    }
}

#[cfg(not(feature = "http"))]
pub use http_stub::*;
