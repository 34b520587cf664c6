use crate::{Admission, AdmissionController, RequestContext};
use std::sync::Arc;
use tower::Layer;

pub(crate) type ContextExtractor<Req> = Arc<dyn Fn(&Req) -> RequestContext + Send + Sync>;

/// A Tower [`Layer`] that checks every request against an [`AdmissionController`].
///
/// The extractor turns a request into the [`RequestContext`] whose key is
/// checked. Services produced by one layer share the controller's windows.
///
/// # Examples
///
/// ```
/// use callguard_admission::{AdmissionController, RequestContext};
/// use tower::ServiceBuilder;
/// use std::time::Duration;
///
/// # async fn example() {
/// let admission = AdmissionController::builder()
///     .max_requests(100)
///     .window(Duration::from_secs(60))
///     .build()
///     .layer(|req: &String| RequestContext::for_user(req.clone()));
///
/// let service = ServiceBuilder::new()
///     .layer(admission)
///     .service(my_service());
/// # }
/// # fn my_service() -> impl tower::Service<String, Response = String, Error = std::io::Error> {
/// #     tower::service_fn(|req: String| async move { Ok::<_, std::io::Error>(req) })
/// # }
/// ```
pub struct AdmissionLayer<Req> {
    controller: AdmissionController,
    extractor: ContextExtractor<Req>,
}

impl<Req> AdmissionLayer<Req> {
    pub fn new<F>(controller: AdmissionController, extractor: F) -> Self
    where
        F: Fn(&Req) -> RequestContext + Send + Sync + 'static,
    {
        Self {
            controller,
            extractor: Arc::new(extractor),
        }
    }

    pub fn controller(&self) -> &AdmissionController {
        &self.controller
    }
}

impl<Req> Clone for AdmissionLayer<Req> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
            extractor: Arc::clone(&self.extractor),
        }
    }
}

impl<S, Req> Layer<S> for AdmissionLayer<Req> {
    type Service = Admission<S, Req>;

    fn layer(&self, service: S) -> Self::Service {
        Admission::new(service, self.controller.clone(), Arc::clone(&self.extractor))
    }
}

impl AdmissionController {
    /// Wraps this controller in a Tower layer.
    pub fn layer<Req, F>(&self, extractor: F) -> AdmissionLayer<Req>
    where
        F: Fn(&Req) -> RequestContext + Send + Sync + 'static,
    {
        AdmissionLayer::new(self.clone(), extractor)
    }
}
