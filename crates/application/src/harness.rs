//! The controller test harness.
//!
//! A [`Test`] accumulates request configuration and expectations, then
//! `end` invokes the controller once and evaluates the expectations as soon
//! as the controller sends a body.

use std::cell::RefCell;
use std::fmt;

use serde_json::Value;
use spyrr_domain::{AssertionFailure, HarnessSettings, MockRequest, MockResponse};
use tracing::{debug, warn};

use crate::contract::{
    BodyTransformer, BoxedController, Continuation, Next, Response, Session, boxed,
};
use crate::error::{ApplicationError, ApplicationResult};
use crate::expectations::{ExpectationRegistry, IntoExpectations};
use crate::ports::AssertionEngine;

/// What `end` hands back once the controller has returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// The request the controller saw.
    pub request: MockRequest,
    /// The response as the controller left it.
    pub response: MockResponse,
    /// Whether the controller sent a body, and so whether the completion
    /// callback ran.
    pub sent: bool,
}

/// Fluent harness for a single controller invocation.
pub struct Test<E> {
    controller: Option<BoxedController>,
    request: MockRequest,
    response: MockResponse,
    expectations: ExpectationRegistry,
    next_fn: Option<Continuation>,
    err_next_fn: Option<Continuation>,
    transformer: Option<BodyTransformer>,
    settings: HarnessSettings,
    engine: E,
}

impl<E: AssertionEngine> Test<E> {
    /// Creates a harness with no controller assigned.
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self {
            controller: None,
            request: MockRequest::new(),
            response: MockResponse::new(),
            expectations: ExpectationRegistry::new(),
            next_fn: None,
            err_next_fn: None,
            transformer: None,
            settings: HarnessSettings::default(),
            engine,
        }
    }

    /// Assigns a `(request, response)` controller.
    #[must_use]
    pub fn controller<C>(mut self, mut controller: C) -> Self
    where
        C: FnMut(&MockRequest, &mut Response<'_>) + 'static,
    {
        self.controller = Some(boxed(move |request, response, _next| {
            controller(request, response);
        }));
        self
    }

    /// Assigns a `(request, response, next)` controller.
    #[must_use]
    pub fn controller_with_next<C>(mut self, controller: C) -> Self
    where
        C: for<'r> FnMut(&MockRequest, &mut Response<'r>, Next<'r>) + 'static,
    {
        self.controller = Some(boxed(controller));
        self
    }

    /// Replaces the harness settings.
    #[must_use]
    pub fn settings(mut self, settings: HarnessSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Swaps the assertion engine.
    #[must_use]
    pub fn with_engine<E2: AssertionEngine>(self, engine: E2) -> Test<E2> {
        Test {
            controller: self.controller,
            request: self.request,
            response: self.response,
            expectations: self.expectations,
            next_fn: self.next_fn,
            err_next_fn: self.err_next_fn,
            transformer: self.transformer,
            settings: self.settings,
            engine,
        }
    }

    /// Sets the request route parameters.
    #[must_use]
    pub fn params(mut self, params: impl Into<Value>) -> Self {
        self.request.params = Some(params.into());
        self
    }

    /// Sets the request query parameters.
    #[must_use]
    pub fn query(mut self, query: impl Into<Value>) -> Self {
        self.request.query = Some(query.into());
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.request.body = Some(body.into());
        self
    }

    /// Sets the request headers.
    #[must_use]
    pub fn headers(mut self, headers: impl Into<Value>) -> Self {
        self.request.headers = Some(headers.into());
        self
    }

    /// Sets the uploaded files on the request.
    #[must_use]
    pub fn files(mut self, files: impl Into<Value>) -> Self {
        self.request.files = Some(files.into());
        self
    }

    /// Shallow-merges fields into the request.
    #[must_use]
    pub fn extend_req(mut self, data: Value) -> Self {
        self.request.extend(data);
        self
    }

    /// Shallow-merges fields into the response.
    #[must_use]
    pub fn extend_res(mut self, data: Value) -> Self {
        self.response.extend(data);
        self
    }

    /// Registers the continuation run when the controller calls
    /// [`Next::call`].
    #[must_use]
    pub fn next<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&MockRequest, &MockResponse) + 'static,
    {
        self.next_fn = Some(Box::new(callback));
        self
    }

    /// Registers the continuation run when the controller calls
    /// [`Next::fail`].
    #[must_use]
    pub fn err_next<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&MockRequest, &MockResponse) + 'static,
    {
        self.err_next_fn = Some(Box::new(callback));
        self
    }

    /// Registers a transformation applied to every body before it is
    /// recorded.
    #[must_use]
    pub fn before_send<F>(mut self, transformer: F) -> Self
    where
        F: FnMut(Value) -> Value + 'static,
    {
        self.transformer = Some(Box::new(transformer));
        self
    }

    /// Registers one or more expectations.
    #[must_use]
    pub fn expect(mut self, expectation: impl IntoExpectations) -> Self {
        self.expectations.register(expectation);
        self
    }

    /// Registers an expectation, then finalizes exactly like [`Test::end`].
    ///
    /// # Errors
    /// Returns [`ApplicationError::MissingController`] if no controller has
    /// been assigned.
    pub fn expect_and_end<F>(
        self,
        expectation: impl IntoExpectations,
        on_complete: F,
    ) -> ApplicationResult<Completion>
    where
        F: FnOnce(Option<AssertionFailure>, &MockResponse),
    {
        self.expect(expectation).end(on_complete)
    }

    /// Returns the request as configured so far.
    #[must_use]
    pub const fn request(&self) -> &MockRequest {
        &self.request
    }

    /// Returns the response as prepared so far.
    #[must_use]
    pub const fn response(&self) -> &MockResponse {
        &self.response
    }

    /// Returns the registered expectations.
    #[must_use]
    pub const fn expectations(&self) -> &ExpectationRegistry {
        &self.expectations
    }

    /// Invokes the controller and evaluates expectations.
    ///
    /// `on_complete` receives the first failure (or `None`) and the finished
    /// response as soon as the controller sends a body. If the controller
    /// returns without sending, `on_complete` is never called and the
    /// returned [`Completion`] reports `sent: false`.
    ///
    /// # Errors
    /// Returns [`ApplicationError::MissingController`] if no controller has
    /// been assigned.
    pub fn end<F>(self, on_complete: F) -> ApplicationResult<Completion>
    where
        F: FnOnce(Option<AssertionFailure>, &MockResponse),
    {
        let Self {
            controller,
            request,
            response,
            expectations,
            next_fn,
            err_next_fn,
            transformer,
            settings,
            engine,
        } = self;

        let Some(mut controller) = controller else {
            return Err(ApplicationError::MissingController);
        };

        debug!(expectations = expectations.len(), "invoking controller");

        let (response, sent) = {
            let exchange = Exchange {
                request: &request,
                response: RefCell::new(response),
                expectations: &expectations,
                engine: &engine,
                settings,
                transformer: RefCell::new(transformer),
                next_fn: RefCell::new(next_fn),
                err_next_fn: RefCell::new(err_next_fn),
                on_complete: RefCell::new(Some(on_complete)),
            };
            {
                let mut contract = Response::new(&exchange);
                controller(&request, &mut contract, Next::new(&exchange));
            }
            exchange.finish()
        };

        if !sent {
            debug!("controller returned without sending a response; completion callback not invoked");
        }

        Ok(Completion {
            request,
            response,
            sent,
        })
    }
}

impl<E: fmt::Debug> fmt::Debug for Test<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Test")
            .field("has_controller", &self.controller.is_some())
            .field("request", &self.request)
            .field("response", &self.response)
            .field("expectations", &self.expectations)
            .field("settings", &self.settings)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

/// State of one controller invocation.
struct Exchange<'a, E, F> {
    request: &'a MockRequest,
    response: RefCell<MockResponse>,
    expectations: &'a ExpectationRegistry,
    engine: &'a E,
    settings: HarnessSettings,
    transformer: RefCell<Option<BodyTransformer>>,
    next_fn: RefCell<Option<Continuation>>,
    err_next_fn: RefCell<Option<Continuation>>,
    on_complete: RefCell<Option<F>>,
}

impl<E, F> Exchange<'_, E, F> {
    /// Returns the final response and whether the completion callback ran.
    fn finish(self) -> (MockResponse, bool) {
        let sent = self.on_complete.into_inner().is_none();
        (self.response.into_inner(), sent)
    }
}

impl<E, F> Session for Exchange<'_, E, F>
where
    E: AssertionEngine,
    F: FnOnce(Option<AssertionFailure>, &MockResponse),
{
    fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    fn response(&self) -> &RefCell<MockResponse> {
        &self.response
    }

    fn send(&self, body: Value) {
        let Some(on_complete) = self.on_complete.borrow_mut().take() else {
            warn!("response already sent, ignoring repeated send");
            return;
        };

        let body = match self.transformer.borrow_mut().as_mut() {
            Some(transform) => transform(body),
            None => body,
        };
        self.response.borrow_mut().record_body(body);

        let response = self.response.borrow();
        let failure = self
            .engine
            .evaluate(self.expectations.as_slice(), &response, None);
        debug!(
            passed = failure.is_none(),
            expectations = self.expectations.len(),
            "evaluated expectations"
        );
        on_complete(failure, &response);
    }

    fn advance(&self, error: Option<String>) {
        let slot = match &error {
            Some(error) => {
                debug!(%error, "controller advanced with an error");
                &self.err_next_fn
            }
            None => &self.next_fn,
        };

        match slot.borrow_mut().as_mut() {
            Some(continuation) => {
                let response = self.response.borrow();
                continuation(self.request, &response);
            }
            None => debug!(
                failed = error.is_some(),
                "controller advanced without a registered continuation"
            ),
        }
    }
}
