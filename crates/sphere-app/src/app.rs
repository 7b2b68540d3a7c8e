//! Application builder.

use sphere_cache::{EntityCache, RetryPolicy};
use sphere_config::AppConfig;
use sphere_core::{Course, Post, Principal, SphereResult};
use sphere_port::{HttpPortFactory, IdentityProvider, PortFactory, SessionIdentity};
use sphere_sync::feed::newest_first;
use sphere_sync::forms::PostForm;
use sphere_sync::queries::{AllCoursesQuery, AllPostsQuery};
use sphere_sync::SyncClient;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Wired application: sync client, identity and the task linking them.
pub struct App {
    config: AppConfig,
    client: SyncClient,
    identity: Arc<SessionIdentity>,
    identity_task: JoinHandle<()>,
}

impl App {
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn client(&self) -> &SyncClient {
        &self.client
    }

    #[must_use]
    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    /// Logs in as the configured identity, if there is one.
    pub async fn sign_in(&self) -> SphereResult<Option<Principal>> {
        if self.config.remote.identity.is_none() {
            info!("No identity configured; staying anonymous");
            return Ok(None);
        }
        let principal = self.identity.login().await?;
        // The identity task reconnects as well; connecting here makes the
        // port usable before this returns.
        self.client.connect(Some(principal.clone()))?;
        Ok(Some(principal))
    }

    /// The global feed, newest first.
    pub async fn feed(&self) -> SphereResult<Vec<Post>> {
        let posts = self.client.fetch(AllPostsQuery).await?;
        Ok(newest_first(posts))
    }

    /// Every course on the marketplace.
    pub async fn courses(&self) -> SphereResult<Vec<Course>> {
        self.client.fetch(AllCoursesQuery).await
    }

    /// Publishes a post as the signed-in caller.
    pub async fn publish(&self, content: &str) -> SphereResult<()> {
        let mut form = PostForm::new();
        form.set_content(content);
        form.submit(&self.client).await
    }

    /// Stops following identity changes and drops every cached entry.
    pub fn shutdown(self) {
        self.identity_task.abort();
        self.client.disconnect();
        info!("Application shut down");
    }
}

/// Application builder for wiring the sync stack.
pub struct AppBuilder {
    config: Option<AppConfig>,
    factory: Option<Arc<dyn PortFactory>>,
}

impl AppBuilder {
    /// Creates a new application builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: None,
            factory: None,
        }
    }

    /// Sets the configuration.
    #[must_use]
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the HTTP port factory.
    #[must_use]
    pub fn with_port_factory(mut self, factory: Arc<dyn PortFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Builds the application.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> SphereResult<App> {
        let config = self.config.unwrap_or_default();
        let factory: Arc<dyn PortFactory> = match self.factory {
            Some(factory) => factory,
            None => Arc::new(HttpPortFactory::new(&config.remote)?),
        };

        let cache = EntityCache::new(RetryPolicy::from(&config.cache.fetch_retry));
        let client = SyncClient::new(cache, factory);
        let identity = Arc::new(SessionIdentity::new(
            config.remote.identity.clone().map(Principal::new),
        ));
        let identity_task = client.follow_identity(identity.as_ref())?;

        info!(
            environment = %config.app.environment,
            remote = %config.remote.base_url,
            "Application wired"
        );
        Ok(App {
            config,
            client,
            identity,
            identity_task,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
