//! CLI runner - executes the request

use crate::cli::commands::Cli;
use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::context::RequestOption;
use crate::error::{Error, Result};
use crate::options::{
    with_accepted_errors, with_all_pages, with_auto_retries, with_auto_throttle,
    with_bearer_auth, with_header, with_json_payload, with_payload, with_raw_receiver,
    with_tls_skip_verify,
};
use reqwest::Method;
use std::io::Write;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the request and write the raw body to stdout
    pub async fn run(&self) -> Result<()> {
        let body = self.fetch().await?;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&body)?;
        if !body.ends_with(b"\n") {
            stdout.write_all(b"\n")?;
        }
        stdout.flush()?;
        Ok(())
    }

    /// Run the request and return the raw merged body
    pub async fn fetch(&self) -> Result<Vec<u8>> {
        let method = self.method()?;
        let (client, endpoint) = self.client()?;
        if self.cli.verbose {
            info!("{} {}", method, client.endpoint(&endpoint));
        }

        let mut body = Vec::new();
        let mut options = self.options()?;
        options.push(with_raw_receiver(&mut body));
        client.request(method, &endpoint, options).await?;

        debug!("Received {} bytes", body.len());
        Ok(body)
    }

    fn method(&self) -> Result<Method> {
        Method::from_bytes(self.cli.method.to_uppercase().as_bytes())
            .map_err(|e| Error::config(format!("Invalid method '{}': {e}", self.cli.method)))
    }

    /// A profile makes the URL an endpoint under its base URL; without one
    /// the URL is used as is.
    fn client(&self) -> Result<(ApiClient, String)> {
        match &self.cli.profile {
            Some(path) => {
                let config = ClientConfig::from_file(path)?;
                Ok((config.into_client()?, self.cli.url.clone()))
            }
            None => {
                url::Url::parse(&self.cli.url)?;
                let client = ApiClient::new(self.cli.url.clone(), Vec::new())?;
                Ok((client, String::new()))
            }
        }
    }

    fn options<'a>(&self) -> Result<Vec<RequestOption<'a>>> {
        let mut options: Vec<RequestOption<'a>> = Vec::new();

        if let Some(data) = &self.cli.data {
            options.push(with_payload(data.clone()).into());
        }
        if let Some(json) = &self.cli.json {
            let value: serde_json::Value = serde_json::from_str(json)?;
            options.push(with_json_payload(&value).into());
        }
        for header in &self.cli.headers {
            let (name, value) = split_pair(header, "header")?;
            options.push(with_header(name, value).into());
        }
        if let Some(paging) = &self.cli.all_pages {
            let (param, header) = split_pair(paging, "--all-pages")?;
            options.push(with_all_pages(param, header).into());
        }
        if !self.cli.accepted.is_empty() {
            options.push(with_accepted_errors(self.cli.accepted.clone()).into());
        }
        if let Some(token) = &self.cli.bearer {
            options.push(with_bearer_auth(token.clone()).into());
        }
        if let Some(retries) = self.cli.retries {
            options.push(with_auto_retries(retries).into());
        }
        if self.cli.no_throttle {
            options.push(with_auto_throttle(false).into());
        }
        if self.cli.insecure {
            options.push(with_tls_skip_verify(true).into());
        }

        Ok(options)
    }
}

fn split_pair<'s>(raw: &'s str, what: &str) -> Result<(&'s str, &'s str)> {
    raw.split_once(':')
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| Error::config(format!("Invalid {what} '{raw}', expected NAME:VALUE")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn runner(args: &[&str]) -> Runner {
        let mut argv = vec!["apimate"];
        argv.extend_from_slice(args);
        Runner::new(Cli::parse_from(argv))
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::parse_from([
            "apimate",
            "post",
            "https://api.test/items",
            "-H",
            "X-A: 1",
            "-H",
            "X-B:2",
            "--json",
            r#"{"a":1}"#,
            "--accept",
            "404",
            "--accept",
            "409",
            "--retries",
            "0",
            "--no-throttle",
        ]);
        assert_eq!(cli.method, "post");
        assert_eq!(cli.headers, vec!["X-A: 1", "X-B:2"]);
        assert_eq!(cli.accepted, vec![404, 409]);
        assert_eq!(cli.retries, Some(0));
        assert!(cli.no_throttle);
        assert!(!cli.insecure);
    }

    #[test]
    fn test_data_conflicts_with_json() {
        let result = Cli::try_parse_from([
            "apimate", "POST", "https://x.test", "--data", "a", "--json", "{}",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_split_pair() {
        assert_eq!(split_pair("X-A: 1", "header").unwrap(), ("X-A", "1"));
        assert_eq!(
            split_pair("page:X-Total-Pages", "--all-pages").unwrap(),
            ("page", "X-Total-Pages")
        );
        assert!(split_pair("nocolon", "header").is_err());
        assert!(split_pair(":value", "header").is_err());
    }

    #[test]
    fn test_invalid_method() {
        assert!(runner(&["GE T", "https://x.test"]).method().is_err());
        assert_eq!(runner(&["patch", "https://x.test"]).method().unwrap(), Method::PATCH);
    }

    #[tokio::test]
    async fn test_fetch_sends_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/items"))
            .and(header("X-Tenant", "acme"))
            .and(header("Authorization", "Bearer t0k"))
            .and(body_string("hello"))
            .respond_with(ResponseTemplate::new(201).set_body_string("created"))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/items", server.uri());
        let body = runner(&[
            "POST", &url, "-H", "X-Tenant:acme", "--bearer", "t0k", "--data", "hello",
        ])
        .fetch()
        .await
        .unwrap();
        assert_eq!(body, b"created");
    }

    #[tokio::test]
    async fn test_fetch_all_pages_concatenates() {
        let server = MockServer::start().await;
        for page in ["1", "2"] {
            Mock::given(method("GET"))
                .and(path("/list"))
                .and(query_param("page", page))
                .respond_with(
                    ResponseTemplate::new(200)
                        .insert_header("X-Total-Pages", "2")
                        .set_body_string(format!("[{page}]")),
                )
                .mount(&server)
                .await;
        }

        let url = format!("{}/list", server.uri());
        let body = runner(&["GET", &url, "--all-pages", "page:X-Total-Pages"])
            .fetch()
            .await
            .unwrap();
        assert_eq!(String::from_utf8(body).unwrap(), "[1][2]");
    }

    #[tokio::test]
    async fn test_fetch_with_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .and(header("X-Tenant", "acme"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let profile = dir.path().join("profile.yaml");
        std::fs::write(
            &profile,
            format!("base_url: {}/v1\nheaders:\n  X-Tenant: acme\n", server.uri()),
        )
        .unwrap();

        let body = runner(&["--profile", profile.to_str().unwrap(), "GET", "me"])
            .fetch()
            .await
            .unwrap();
        assert_eq!(body, b"ok");
    }

    #[tokio::test]
    async fn test_fetch_accepted_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
            .mount(&server)
            .await;

        let url = format!("{}/thing", server.uri());
        let body = runner(&["DELETE", &url, "--accept", "404"])
            .fetch()
            .await
            .unwrap();
        assert!(body.is_empty());

        let err = runner(&["DELETE", &url]).fetch().await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }
}
