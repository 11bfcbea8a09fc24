use chrono::{DateTime, NaiveDateTime, Utc};
use milk_core::{Credentials, ListSummary, RtmError, TaskSummary, Transport};
use serde::{de::DeserializeOwned, de::IgnoredAny, Deserialize};
use tracing::{debug, instrument};
use url::Url;

use crate::{
    envelope,
    http::ReqwestTransport,
    request::{ApiRequest, Perms, UrlBuilder},
};

const CREATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Typed operations over the REST API. Owns the credentials and the
/// transport; every operation is a single signed GET.
pub struct ApiClient<T: Transport> {
    transport: T,
    urls: UrlBuilder,
    credentials: Credentials,
}

impl ApiClient<ReqwestTransport> {
    /// Client talking to the production API over reqwest.
    pub fn from_credentials(credentials: Credentials) -> Result<Self, RtmError> {
        Self::new(credentials, ReqwestTransport::new()?)
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(credentials: Credentials, transport: T) -> Result<Self, RtmError> {
        let urls = UrlBuilder::new(credentials.api_key(), credentials.shared_secret())?;
        Ok(Self {
            transport,
            urls,
            credentials,
        })
    }

    pub fn with_base_url(mut self, base: &str) -> Result<Self, RtmError> {
        self.urls = self.urls.with_base(base)?;
        Ok(self)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn credentials_mut(&mut self) -> &mut Credentials {
        &mut self.credentials
    }

    /// URL the user must open to grant `perms` for `frob`.
    pub fn permission_url(&self, perms: Perms, frob: &str) -> Result<Url, RtmError> {
        self.urls.auth_url(perms, frob)
    }

    /// Start the auth handshake.
    #[instrument(skip_all)]
    pub async fn get_frob(&self) -> Result<String, RtmError> {
        let payload: FrobPayload = self.call(ApiRequest::service("rtm.auth.getFrob")).await?;
        Ok(payload.frob)
    }

    /// Exchange a frob for a long-lived token. Fails until the user has
    /// granted access at the frob's permission URL.
    #[instrument(skip_all)]
    pub async fn get_token(&self, frob: &str) -> Result<String, RtmError> {
        let payload: TokenPayload = self
            .call(ApiRequest::service("rtm.auth.getToken").param("frob", frob))
            .await?;
        Ok(payload.auth.token)
    }

    /// Whether the stored token is still accepted. Never errors: any failure,
    /// a missing token included, reads as `false`.
    #[instrument(skip_all)]
    pub async fn check_token_valid(&self) -> bool {
        let request = ApiRequest::service("rtm.auth.checkToken").authenticated();
        match self.call::<IgnoredAny>(request).await {
            Ok(_) => true,
            Err(err) => {
                debug!(%err, "token check failed");
                false
            }
        }
    }

    #[instrument(skip_all)]
    pub async fn get_all_lists(&self) -> Result<Vec<ListSummary>, RtmError> {
        let payload: ListsPayload = self
            .call(ApiRequest::service("rtm.lists.getList").authenticated())
            .await?;
        Ok(payload
            .lists
            .list
            .into_iter()
            .map(|l| ListSummary {
                id: l.id,
                name: l.name,
            })
            .collect())
    }

    /// Tasks of one list. With `open_only`, series whose first task instance
    /// is completed are left out.
    #[instrument(skip(self))]
    pub async fn get_tasks_from_list(
        &self,
        list_id: &str,
        open_only: bool,
    ) -> Result<Vec<TaskSummary>, RtmError> {
        const OPERATION: &str = "rtm.tasks.getList";
        let payload: TasksPayload = self
            .call(
                ApiRequest::service(OPERATION)
                    .param("list_id", list_id)
                    .authenticated(),
            )
            .await?;

        let series = payload
            .tasks
            .list
            .into_iter()
            .next()
            .map(|l| l.taskseries)
            .unwrap_or_default();

        let mut tasks = Vec::with_capacity(series.len());
        for s in series {
            let completed = s
                .task
                .first()
                .and_then(|t| t.completed.as_deref())
                .is_some_and(|c| !c.is_empty());
            if completed && open_only {
                continue;
            }
            let created = parse_created(&s.created).map_err(|e| {
                RtmError::decode(OPERATION, format!("created {:?}: {e}", s.created))
            })?;
            tasks.push(TaskSummary {
                created,
                id: s.id,
                name: s.name,
                completed,
            });
        }
        Ok(tasks)
    }

    async fn call<P: DeserializeOwned>(&self, request: ApiRequest) -> Result<P, RtmError> {
        let operation = request.operation();
        let url = self.urls.build(&request, self.credentials.auth_token())?;
        debug!(operation, "issuing request");
        let response = self.transport.get(&url).await?;
        if !response.is_success() {
            return Err(RtmError::request_failed(
                operation,
                response.status.to_string(),
                response.reason,
            ));
        }
        envelope::decode(operation, &response.body)
    }
}

fn parse_created(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    Ok(NaiveDateTime::parse_from_str(raw, CREATED_FORMAT)?.and_utc())
}

#[derive(Debug, Deserialize)]
struct FrobPayload {
    frob: String,
}

#[derive(Debug, Deserialize)]
struct TokenPayload {
    auth: AuthBody,
}

#[derive(Debug, Deserialize)]
struct AuthBody {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ListsPayload {
    lists: ListsBody,
}

#[derive(Debug, Deserialize)]
struct ListsBody {
    #[serde(default)]
    list: Vec<RawList>,
}

#[derive(Debug, Deserialize)]
struct RawList {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct TasksPayload {
    tasks: TasksBody,
}

// Empty lists come back without `list` / `taskseries`.
#[derive(Debug, Deserialize)]
struct TasksBody {
    #[serde(default)]
    list: Vec<RawTaskList>,
}

#[derive(Debug, Deserialize)]
struct RawTaskList {
    #[serde(default)]
    taskseries: Vec<RawTaskSeries>,
}

#[derive(Debug, Deserialize)]
struct RawTaskSeries {
    id: String,
    name: String,
    created: String,
    #[serde(default)]
    task: Vec<RawTask>,
}

#[derive(Debug, Deserialize)]
struct RawTask {
    #[serde(default)]
    completed: Option<String>,
}
