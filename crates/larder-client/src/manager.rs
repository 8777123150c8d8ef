//! Per-collection data-manager.
//!
//! Holds the fetched collection in memory, answers searches over it, and
//! issues mutations. Every successful mutation triggers a full reload; there
//! is no optimistic local merge. Failures surface as a single error string
//! and leave the in-memory list (and any open draft) untouched. No retry,
//! no backoff, no explicit request timeout.

use reqwest::Method;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use larder_core::{filter_entries, Collection, Entry, Error, FieldMap, Result, Season};

use crate::csv_import::parse_rows;

/// Header carrying the caller's verified email, as the serving proxy would.
const IDENTITY_HEADER: &str = "x-auth-request-email";

/// Lifecycle of a data-manager instance. Long-lived; there is no terminal
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Submitting,
    Deleting,
    Importing,
}

/// An open create or edit form.
///
/// Edit drafts hold a clone of the entry's fields, never a reference into
/// the manager's list, so editing cannot mutate the list behind its back.
#[derive(Debug, Clone)]
pub struct Draft {
    editing: Option<Uuid>,
    fields: FieldMap,
}

impl Draft {
    /// The entry being edited, or `None` for a create draft.
    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Set one field of the draft.
    pub fn set_field(&mut self, name: &str, value: impl Into<serde_json::Value>) {
        self.fields.insert(name.to_string(), value.into());
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    data: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct WriteAccessResponse {
    #[serde(rename = "hasAccess")]
    has_access: bool,
}

/// Client-side state and controller for one collection.
pub struct DataManager {
    client: reqwest::Client,
    base_url: String,
    collection: Collection,
    identity_email: Option<String>,
    entries: Vec<Entry>,
    search_term: String,
    draft: Option<Draft>,
    error: Option<String>,
    phase: Phase,
}

impl DataManager {
    pub fn new(base_url: impl Into<String>, collection: Collection) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            collection,
            identity_email: None,
            entries: Vec::new(),
            search_term: String::new(),
            draft: None,
            error: None,
            phase: Phase::Idle,
        }
    }

    /// Send requests as this signed-in user.
    pub fn with_identity(mut self, email: impl Into<String>) -> Self {
        self.identity_email = Some(email.into());
        self
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Last error message, if the most recent operation failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The full fetched list, unfiltered.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        self.draft.as_mut()
    }

    // ------------------------------------------------------------------
    // Loading and search
    // ------------------------------------------------------------------

    /// Fetch the full collection. On failure the prior list stays as-is.
    pub async fn load(&mut self) -> Result<()> {
        self.phase = Phase::Loading;
        let result = self.fetch_all().await;
        self.phase = Phase::Ready;
        match result {
            Ok(entries) => {
                debug!(
                    collection = %self.collection,
                    count = entries.len(),
                    "Collection loaded"
                );
                self.entries = entries;
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Entries matching the current search term; everything when the term is
    /// empty. Recomputed on every call.
    pub fn visible(&self) -> Vec<Entry> {
        filter_entries(&self.entries, &self.search_term)
    }

    /// Entries tagged with the given season.
    pub fn in_season(&self, season: Season) -> Vec<Entry> {
        self.entries
            .iter()
            .filter(|e| e.in_season(season))
            .cloned()
            .collect()
    }

    /// The meteorological season right now.
    pub fn current_season(&self) -> Season {
        Season::current(&chrono::Utc::now())
    }

    /// Entries tagged with the season containing the current instant; the
    /// seasonal calendar's default view.
    pub fn currently_in_season(&self) -> Vec<Entry> {
        self.in_season(self.current_season())
    }

    // ------------------------------------------------------------------
    // Drafts and mutations
    // ------------------------------------------------------------------

    /// Open an empty create draft.
    pub fn begin_create(&mut self) {
        self.draft = Some(Draft {
            editing: None,
            fields: FieldMap::new(),
        });
    }

    /// Open an edit draft pre-populated with a clone of the entry's fields.
    pub fn begin_edit(&mut self, id: Uuid) -> Result<()> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.id == id)
            .ok_or(Error::EntryNotFound(id))?;
        self.draft = Some(Draft {
            editing: Some(id),
            fields: entry.fields.clone(),
        });
        Ok(())
    }

    /// Discard the open draft without submitting.
    pub fn cancel_draft(&mut self) {
        self.draft = None;
    }

    /// Submit the open draft: POST for a create draft, PUT for an edit one.
    /// On success the draft closes and the collection reloads; on failure
    /// the draft stays open with the error recorded.
    pub async fn submit(&mut self) -> Result<()> {
        let Some(draft) = self.draft.clone() else {
            return Err(Error::InvalidInput("No draft to submit".to_string()));
        };

        self.phase = Phase::Submitting;
        let result = match draft.editing {
            Some(id) => {
                let url = format!("{}/{}", self.collection_url(), id);
                self.send_json(Method::PUT, &url, &draft.fields).await
            }
            None => {
                let url = self.collection_url();
                self.send_json(Method::POST, &url, &draft.fields).await
            }
        };
        self.phase = Phase::Ready;

        match result {
            Ok(_) => {
                self.draft = None;
                self.error = None;
                self.load().await
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Delete immediately, no confirmation. A delete racing another delete of
    /// the same id sees the not-found signal as a plain error.
    pub async fn delete(&mut self, id: Uuid) -> Result<()> {
        self.phase = Phase::Deleting;
        let url = format!("{}/{}", self.collection_url(), id);
        let result = self.send(Method::DELETE, &url).await;
        self.phase = Phase::Ready;

        match result {
            Ok(_) => {
                self.error = None;
                self.load().await
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Parse CSV text, reshape rows to this collection's schema, and post
    /// them as one batch. A bad header or zero usable rows rejects the
    /// import before any network call.
    pub async fn import_csv(&mut self, text: &str) -> Result<()> {
        let rows = match parse_rows(text, self.collection.fields()) {
            Ok(rows) => rows,
            Err(err) => {
                self.error = Some(err.to_string());
                return Err(err);
            }
        };

        self.phase = Phase::Importing;
        let url = format!("{}/bulk", self.collection_url());
        let result = self.send_json(Method::POST, &url, &rows).await;
        self.phase = Phase::Ready;

        match result {
            Ok(_) => {
                self.error = None;
                self.load().await
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Whether the current identity may mutate entries. Advisory only; the
    /// server re-checks every write.
    pub async fn check_write_access(&self) -> Result<bool> {
        let url = format!("{}/api/check-write-access", self.base_url);
        let response = self.request(Method::GET, &url).send().await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(false);
        }
        let body: WriteAccessResponse = Self::expect_success(response).await?.json().await?;
        Ok(body.has_access)
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    fn collection_url(&self) -> String {
        format!("{}/api/{}", self.base_url, self.collection)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.request(method, url);
        if let Some(email) = &self.identity_email {
            request = request.header(IDENTITY_HEADER, email);
        }
        request
    }

    async fn fetch_all(&self) -> Result<Vec<Entry>> {
        let response = self.request(Method::GET, &self.collection_url()).send().await?;
        let body: ListResponse = Self::expect_success(response).await?.json().await?;
        Ok(body.data)
    }

    async fn send(&self, method: Method, url: &str) -> Result<reqwest::Response> {
        let response = self.request(method, url).send().await?;
        Self::expect_success(response).await
    }

    async fn send_json<T: serde::Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        let response = self.request(method, url).json(body).send().await?;
        Self::expect_success(response).await
    }

    // Collapse any non-success response into one error string, preferring
    // the server's own `{"error": ...}` body.
    async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        Err(Error::Request(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manager_with_entries(entries: Vec<Entry>) -> DataManager {
        let mut manager = DataManager::new("http://localhost:0", Collection::Meals);
        manager.entries = entries;
        manager.phase = Phase::Ready;
        manager
    }

    fn entry(id: Uuid, pairs: &[(&str, serde_json::Value)]) -> Entry {
        Entry {
            id,
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn test_new_manager_starts_idle_and_empty() {
        let manager = DataManager::new("http://localhost:0", Collection::Ideas);
        assert_eq!(manager.phase(), Phase::Idle);
        assert!(manager.entries().is_empty());
        assert!(manager.error().is_none());
        assert!(manager.draft().is_none());
    }

    #[test]
    fn test_visible_applies_search_term() {
        let manager = {
            let mut m = manager_with_entries(vec![
                entry(
                    Uuid::now_v7(),
                    &[("name", json!("Stew")), ("notes", json!("winter warmer"))],
                ),
                entry(Uuid::now_v7(), &[("name", json!("Salad"))]),
            ]);
            m.set_search_term("WINTER");
            m
        };

        let visible = manager.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].fields["name"], "Stew");

        let mut manager = manager;
        manager.set_search_term("");
        assert_eq!(manager.visible().len(), 2);
    }

    #[test]
    fn test_begin_edit_clones_fields() {
        let id = Uuid::now_v7();
        let mut manager =
            manager_with_entries(vec![entry(id, &[("name", json!("Stew"))])]);

        manager.begin_edit(id).unwrap();
        manager
            .draft_mut()
            .unwrap()
            .set_field("name", "Goulash");

        // The list is untouched until the draft is submitted and reloaded
        assert_eq!(manager.entries()[0].fields["name"], "Stew");
        assert_eq!(manager.draft().unwrap().fields()["name"], "Goulash");
    }

    #[test]
    fn test_begin_edit_of_unknown_id_fails() {
        let mut manager = manager_with_entries(vec![]);
        let err = manager.begin_edit(Uuid::now_v7()).unwrap_err();
        assert!(matches!(err, Error::EntryNotFound(_)));
    }

    #[test]
    fn test_begin_create_opens_empty_draft() {
        let mut manager = manager_with_entries(vec![]);
        manager.begin_create();
        let draft = manager.draft().unwrap();
        assert!(draft.editing().is_none());
        assert!(draft.fields().is_empty());
    }

    #[test]
    fn test_cancel_draft_discards_it() {
        let mut manager = manager_with_entries(vec![]);
        manager.begin_create();
        manager.cancel_draft();
        assert!(manager.draft().is_none());
    }

    #[tokio::test]
    async fn test_submit_without_draft_is_an_error() {
        let mut manager = manager_with_entries(vec![]);
        let err = manager.submit().await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_currently_in_season_uses_the_current_season() {
        let entries = Season::ALL
            .iter()
            .map(|season| {
                entry(
                    Uuid::now_v7(),
                    &[
                        ("name", json!(format!("{} pick", season))),
                        ("seasons", json!([season.as_str()])),
                    ],
                )
            })
            .collect();
        let manager = manager_with_entries(entries);

        let current = manager.currently_in_season();
        assert_eq!(current.len(), 1);
        assert!(current[0].in_season(manager.current_season()));
    }

    #[test]
    fn test_in_season_filters_by_seasons_field() {
        let manager = manager_with_entries(vec![
            entry(
                Uuid::now_v7(),
                &[("name", json!("Squash")), ("seasons", json!(["autumn"]))],
            ),
            entry(
                Uuid::now_v7(),
                &[("name", json!("Basil")), ("seasons", json!(["summer"]))],
            ),
        ]);

        let autumn = manager.in_season(Season::Autumn);
        assert_eq!(autumn.len(), 1);
        assert_eq!(autumn[0].fields["name"], "Squash");
    }
}
