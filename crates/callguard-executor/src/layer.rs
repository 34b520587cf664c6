use crate::{ExecuteOptions, RateLimitExecutor, Resilient};
use std::sync::Arc;
use tower::Layer;

pub(crate) type KeyExtractor<Req> = Arc<dyn Fn(&Req) -> String + Send + Sync>;

/// A Tower [`Layer`] that runs every request through a [`RateLimitExecutor`].
///
/// Requests must be `Clone` so they can be re-sent on retry. Without a key
/// extractor every request shares the template's key.
///
/// # Examples
///
/// ```
/// use callguard_executor::{ExecuteOptions, ResilientLayer, RateLimitExecutor};
/// use tower::ServiceBuilder;
/// use std::time::Duration;
///
/// # async fn example() {
/// let layer = ResilientLayer::new(
///     RateLimitExecutor::builder().name("records").build(),
///     ExecuteOptions::new("records").max_retries(3),
/// )
/// .key_extractor(|path: &String| path.clone());
///
/// let service = ServiceBuilder::new()
///     .layer(layer)
///     .service(my_service());
/// # }
/// # fn my_service() -> impl tower::Service<String, Response = String, Error = std::io::Error> + Clone {
/// #     tower::service_fn(|req: String| async move { Ok::<_, std::io::Error>(req) })
/// # }
/// ```
pub struct ResilientLayer<Req> {
    executor: RateLimitExecutor,
    options: ExecuteOptions,
    key_extractor: Option<KeyExtractor<Req>>,
}

impl<Req> ResilientLayer<Req> {
    pub fn new(executor: RateLimitExecutor, options: ExecuteOptions) -> Self {
        Self {
            executor,
            options,
            key_extractor: None,
        }
    }

    /// Derives each request's circuit key instead of using the template key.
    pub fn key_extractor<F>(mut self, f: F) -> Self
    where
        F: Fn(&Req) -> String + Send + Sync + 'static,
    {
        self.key_extractor = Some(Arc::new(f));
        self
    }

    pub fn executor(&self) -> &RateLimitExecutor {
        &self.executor
    }
}

impl<Req> Clone for ResilientLayer<Req> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            options: self.options.clone(),
            key_extractor: self.key_extractor.clone(),
        }
    }
}

impl<S, Req> Layer<S> for ResilientLayer<Req> {
    type Service = Resilient<S, Req>;

    fn layer(&self, service: S) -> Self::Service {
        Resilient::new(
            service,
            self.executor.clone(),
            self.options.clone(),
            self.key_extractor.clone(),
        )
    }
}
