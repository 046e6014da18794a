//! GitHub REST implementation of the workflow host.

use base64::{Engine as _, engine::general_purpose};
use log::debug;
use pipedrift_core::{PipedriftError, Result, WorkflowHost};
use reqwest::blocking::{Client, Response};
use serde::Deserialize;

const WORKFLOW_DIR: &str = ".github/workflows";
const PER_PAGE: usize = 100;

/// Fetches workflow data from the GitHub REST API with a blocking client.
pub struct GithubHost {
    client: Client,
    api_url: String,
    token: Option<String>,
    user_agent: String,
}

#[derive(Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct FileContent {
    content: String,
    #[serde(default)]
    encoding: String,
}

#[derive(Deserialize)]
struct CommitEntry {
    commit: Option<CommitDetail>,
}

#[derive(Deserialize)]
struct CommitDetail {
    author: Option<CommitAuthor>,
}

#[derive(Deserialize)]
struct CommitAuthor {
    name: Option<String>,
}

#[derive(Deserialize)]
struct Advisory {
    ghsa_id: Option<String>,
}

impl GithubHost {
    /// Build a host against the given API base URL, optionally
    /// authenticated with a bearer token.
    pub fn new(api_url: &str, token: Option<String>, user_agent: &str) -> Self {
        GithubHost {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            user_agent: user_agent.to_string(),
        }
    }

    fn get(&self, url: &str) -> Result<Response> {
        debug!("GET {url}");
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", self.user_agent.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .map_err(|err| PipedriftError::Other(err.to_string()))?;
        if !response.status().is_success() {
            return Err(PipedriftError::Other(format!(
                "GitHub request to {url} failed: {}",
                response.status()
            )));
        }
        Ok(response)
    }

    /// Follow a paginated endpoint to exhaustion, feeding each page's
    /// parsed body to `collect`.
    fn get_all_pages<T, F>(&self, first_url: &str, mut collect: F) -> Result<()>
    where
        T: for<'de> Deserialize<'de>,
        F: FnMut(Vec<T>),
    {
        let mut url = first_url.to_string();
        loop {
            let response = self.get(&url)?;
            let next = next_page(&response);
            let page: Vec<T> = response
                .json()
                .map_err(|err| PipedriftError::Other(err.to_string()))?;
            collect(page);
            match next {
                Some(next_url) => url = next_url,
                None => return Ok(()),
            }
        }
    }
}

impl WorkflowHost for GithubHost {
    fn find_workflows(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        let url = format!("{}/repos/{owner}/{repo}/contents/{WORKFLOW_DIR}", self.api_url);
        let entries: Vec<ContentEntry> = self
            .get(&url)?
            .json()
            .map_err(|err| PipedriftError::Other(err.to_string()))?;
        Ok(entries
            .into_iter()
            .filter(|entry| {
                let name = entry.name.to_lowercase();
                entry.kind == "file" && (name.ends_with(".yml") || name.ends_with(".yaml"))
            })
            .map(|entry| entry.name)
            .collect())
    }

    fn workflow_content(&self, owner: &str, repo: &str, path: &str) -> Result<String> {
        let url = format!(
            "{}/repos/{owner}/{repo}/contents/{WORKFLOW_DIR}/{path}",
            self.api_url
        );
        let file: FileContent = self
            .get(&url)?
            .json()
            .map_err(|err| PipedriftError::Other(err.to_string()))?;
        if file.encoding == "base64" {
            decode_content(&file.content)
        } else {
            Ok(file.content)
        }
    }

    fn workflow_contributors(&self, owner: &str, repo: &str, path: &str) -> Result<Vec<String>> {
        let workflow_path = urlencoding::encode(&format!("{WORKFLOW_DIR}/{path}")).into_owned();
        let url = format!(
            "{}/repos/{owner}/{repo}/commits?path={workflow_path}&per_page={PER_PAGE}",
            self.api_url
        );
        let mut contributors = Vec::new();
        self.get_all_pages(&url, |page: Vec<CommitEntry>| {
            let names = page
                .into_iter()
                .filter_map(|entry| entry.commit?.author?.name);
            for name in names {
                if !contributors.contains(&name) {
                    contributors.push(name);
                }
            }
        })?;
        Ok(contributors)
    }

    fn security_advisories(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/repos/{owner}/{repo}/security-advisories?per_page={PER_PAGE}",
            self.api_url
        );
        let mut advisories = Vec::new();
        self.get_all_pages(&url, |page: Vec<Advisory>| {
            advisories.extend(page.into_iter().filter_map(|advisory| advisory.ghsa_id));
        })?;
        Ok(advisories)
    }
}

/// The contents API returns base64 with embedded newlines.
fn decode_content(encoded: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = general_purpose::STANDARD
        .decode(compact)
        .map_err(|err| PipedriftError::Other(format!("content decode failed: {err}")))?;
    String::from_utf8(bytes)
        .map_err(|err| PipedriftError::Other(format!("content is not UTF-8: {err}")))
}

/// Extract the `rel="next"` target from a Link header, if any.
fn next_page(response: &Response) -> Option<String> {
    let header = response.headers().get("link")?.to_str().ok()?;
    header.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        if !params.contains("rel=\"next\"") {
            return None;
        }
        let target = target.trim();
        Some(
            target
                .strip_prefix('<')?
                .strip_suffix('>')?
                .to_string(),
        )
    })
}
