//! Controller contract
//!
//! A controller is handed a [`Response`] to drive to completion and, for
//! middleware-style controllers, a [`Next`] continuation. Both are views
//! over the harness's in-flight exchange, built once per `end` call.

use std::cell::RefCell;
use std::fmt;

use serde_json::Value;
use spyrr_domain::{HarnessSettings, MockRequest, MockResponse};

/// Callback run when a controller advances through [`Next`].
pub type Continuation = Box<dyn FnMut(&MockRequest, &MockResponse)>;

/// Transformation applied to a body right before it is recorded.
pub type BodyTransformer = Box<dyn FnMut(Value) -> Value>;

pub(crate) type BoxedController =
    Box<dyn for<'r> FnMut(&MockRequest, &mut Response<'r>, Next<'r>)>;

/// Forces the higher-ranked signature onto a controller closure.
pub(crate) fn boxed<F>(controller: F) -> BoxedController
where
    F: for<'r> FnMut(&MockRequest, &mut Response<'r>, Next<'r>) + 'static,
{
    Box::new(controller)
}

/// Operations the response contract needs from the running exchange.
pub(crate) trait Session {
    fn settings(&self) -> &HarnessSettings;
    fn response(&self) -> &RefCell<MockResponse>;
    fn send(&self, body: Value);
    fn advance(&self, error: Option<String>);
}

/// The response object a controller writes to.
pub struct Response<'r> {
    session: &'r dyn Session,
}

impl<'r> Response<'r> {
    pub(crate) fn new(session: &'r dyn Session) -> Self {
        Self { session }
    }

    /// Records the response status.
    pub fn status(&mut self, code: u16) -> &mut Self {
        self.session.response().borrow_mut().set_status(code);
        self
    }

    /// Merges headers into the response.
    ///
    /// Names are stored lower-cased; string values are lower-cased too
    /// unless the harness settings say otherwise.
    pub fn headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let lowercase = self.session.settings().lowercase_header_values;
        self.session
            .response()
            .borrow_mut()
            .merge_headers(headers, lowercase);
        self
    }

    /// Sets a single header.
    pub fn set_header(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.headers([(name, value.into())])
    }

    /// Writes a field onto the response.
    ///
    /// Recognized names such as `status` or `headers` replace that field;
    /// anything else becomes an extension field.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.session.response().borrow_mut().set(field, value);
        self
    }

    /// Reads a field, such as one injected with `extend_res`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<Value> {
        self.session.response().borrow().get(field)
    }

    /// Reads a header written so far.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<Value> {
        self.session.response().borrow().header(name).cloned()
    }

    /// Sends the body, finishing the response.
    ///
    /// The harness evaluates its expectations and runs the completion
    /// callback before this returns. Only the first send counts.
    pub fn send(&mut self, body: impl Into<Value>) {
        self.session.send(body.into());
    }

    /// Same as [`Response::send`].
    pub fn json(&mut self, body: impl Into<Value>) {
        self.send(body);
    }
}

impl fmt::Debug for Response<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("state", &*self.session.response().borrow())
            .finish()
    }
}

/// Continuation handed to middleware-style controllers.
pub struct Next<'r> {
    session: &'r dyn Session,
}

impl<'r> Next<'r> {
    pub(crate) fn new(session: &'r dyn Session) -> Self {
        Self { session }
    }

    /// Advances to the continuation registered with `next`.
    pub fn call(self) {
        self.session.advance(None);
    }

    /// Advances with an error, running the continuation registered with
    /// `err_next`.
    pub fn fail(self, error: impl fmt::Display) {
        self.session.advance(Some(error.to_string()));
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Next")
    }
}
