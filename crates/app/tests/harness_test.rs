//! Integration tests for the controller harness
//!
//! These tests drive controllers end to end through the facade and check the
//! outcome delivered to the completion callback.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pretty_assertions::assert_eq;
use spyrr::prelude::*;
use spyrr::{ApplicationError, ApplicationResult, HarnessSettings, harness_from_env};

/// Controller answering `200 OK` with a JSON success body.
fn json_controller(_req: &MockRequest, res: &mut Response<'_>) {
    res.status(200)
        .headers([("Content-Type", "application/json")])
        .send(json!({"success": true}));
}

/// Runs the harness and returns the failure handed to the callback.
fn outcome(test: Test) -> Option<AssertionFailure> {
    let mut delivered = None;
    let completion = test.end(|failure, _res| delivered = Some(failure)).unwrap();
    assert!(completion.sent, "controller did not send a response");
    delivered.expect("completion callback was not invoked")
}

#[test]
fn test_status_expectation() {
    assert_eq!(outcome(spyrr(json_controller).expect(200)), None);

    let failure = outcome(spyrr(json_controller).expect(201)).unwrap();
    assert!(failure.message.contains(r#"200 "OK""#));
    assert!(failure.message.contains(r#"201 "Created""#));
}

#[test]
fn test_header_expectation_any_case() {
    for name in ["content-type", "Content-Type", "CONTENT-TYPE"] {
        let test = spyrr(json_controller).expect((name, "application/json"));
        assert_eq!(outcome(test), None, "header name {name}");
    }
}

#[test]
fn test_header_expectation_pattern() {
    let matching = spyrr(json_controller).expect(("Content-Type", Pattern::new("json").unwrap()));
    assert_eq!(outcome(matching), None);

    let failing =
        spyrr(json_controller).expect(("Content-Type", Pattern::new("sandwich").unwrap()));
    let failure = outcome(failing).unwrap();
    assert!(failure.message.contains("/sandwich/"));
    assert!(failure.message.contains("application/json"));
}

#[test]
fn test_header_expectation_missing() {
    let failure = outcome(spyrr(json_controller).expect(("X-Request-Id", "abc"))).unwrap();
    assert_eq!(failure.message, r#"expected "X-Request-Id" header field"#);
}

#[test]
fn test_body_expectation() {
    assert_eq!(
        outcome(spyrr(json_controller).expect(json!({"success": true}))),
        None
    );

    let failure = outcome(spyrr(json_controller).expect(json!({"success": false}))).unwrap();
    assert!(failure.message.contains(r#"{"success":false}"#));
    assert!(failure.message.contains(r#"{"success":true}"#));
    assert!(failure.show_diff);
    assert_eq!(failure.expected, Some(json!({"success": false})));
    assert_eq!(failure.actual, Some(json!({"success": true})));
}

#[test]
fn test_status_and_body_pair() {
    let test = spyrr(|_, res| {
        res.status(404).send("Not Found");
    })
    .expect((404, "Not Found"));
    assert_eq!(outcome(test), None);

    let test = spyrr(|_, res| {
        res.status(404).send("Missing");
    })
    .expect((404, Pattern::new("^Not").unwrap()));
    let failure = outcome(test).unwrap();
    assert_eq!(failure.message, r#"expected body "Missing" to match /^Not/"#);
}

#[test]
fn test_extend_req_is_visible_to_controller() {
    let test = spyrr(|req, res| {
        let user = req.get("user").cloned().unwrap_or(Value::Null);
        res.status(200).send(json!({"user": user}));
    })
    .extend_req(json!({"user": {"id": 7, "name": "ada"}}))
    .expect(json!({"user": {"id": 7, "name": "ada"}}));

    assert_eq!(outcome(test), None);
}

#[test]
fn test_extend_res_is_visible_to_predicates() {
    let test = spyrr(|_, res| {
        let theme = res.get("locals").unwrap_or(Value::Null);
        res.set("rendered", theme).status(200).send("page");
    })
    .extend_res(json!({"locals": {"theme": "dark"}}))
    .expect(check(|res: &MockResponse| {
        res.get("locals") == Some(json!({"theme": "dark"}))
    }))
    .expect(check(|res: &MockResponse| {
        res.get("rendered")
            .filter(|rendered| rendered["theme"] == "dark")
            .map(|_| ())
            .ok_or("controller did not render with the injected locals")
    }));

    assert_eq!(outcome(test), None);
}

#[test]
fn test_extend_res_seeds_status_and_headers() {
    let test = spyrr(|_, res| res.send("ok"))
        .extend_res(json!({"status": 200, "headers": {"X-Powered-By": "spyrr"}}))
        .expect(200)
        .expect(("x-powered-by", "spyrr"));
    assert_eq!(outcome(test), None);

    let test = spyrr(|_, res| res.status(503).send("down"))
        .extend_res(json!({"status": 200}))
        .expect(200);
    assert_eq!(
        outcome(test).unwrap().message,
        r#"expected 200 "OK", got 503 "Service Unavailable""#
    );
}

#[test]
fn test_extend_res_serializes_each_key_once() {
    let completion = spyrr(|_, res| res.status(200).send("ok"))
        .extend_res(json!({"headers": {"X-Powered-By": "spyrr"}}))
        .end(|_, _| {})
        .unwrap();

    let serialized = serde_json::to_string(&completion.response).unwrap();
    assert_eq!(serialized.matches(r#""headers""#).count(), 1);
    assert_eq!(
        completion.response.get("headers"),
        Some(json!({"x-powered-by": "spyrr"}))
    );
}

#[test]
fn test_numeric_body_values_compare_by_value() {
    let test = spyrr(|_, res| res.status(200).send(json!({"price": 10.0})))
        .expect(json!({"price": 10}));
    assert_eq!(outcome(test), None);
}

#[test]
fn test_full_request_configuration() {
    let test = spyrr(|req, res| {
        let id = req.param("id").and_then(Value::as_u64).unwrap_or_default();
        let verbose = req.query_value("verbose") == Some(&json!("true"));
        let token = req.header("authorization").cloned();
        let name = req.body.as_ref().and_then(|body| body.get("name")).cloned();

        res.status(201)
            .set_header("Location", format!("/users/{id}"))
            .send(json!({
                "id": id,
                "name": name,
                "verbose": verbose,
                "authorized": token.is_some(),
            }));
    })
    .params(json!({"id": 42}))
    .query(json!({"verbose": "true"}))
    .headers(json!({"Authorization": "Bearer t"}))
    .body(json!({"name": "ada"}))
    .expect(201)
    .expect(("location", "/users/42"))
    .expect(json!({"id": 42, "name": "ada", "verbose": true, "authorized": true}));

    assert_eq!(outcome(test), None);
}

#[test]
fn test_controller_that_never_sends() {
    let invoked = Cell::new(false);

    let completion = spyrr(|_, res| {
        res.status(200);
    })
    .expect(200)
    .end(|_, _| invoked.set(true))
    .unwrap();

    assert!(!invoked.get());
    assert!(!completion.sent);
    assert_eq!(completion.response.status, Some(200));
    assert_eq!(completion.response.body, None);
}

#[test]
fn test_first_failure_short_circuits() {
    let later_ran = Rc::new(Cell::new(false));
    let flag = Rc::clone(&later_ran);

    let failure = outcome(
        spyrr(json_controller)
            .expect(200)
            .expect(("content-type", "text/html"))
            .expect(check(move |_: &MockResponse| flag.set(true)))
            .expect(404),
    )
    .unwrap();

    assert_eq!(
        failure.message,
        r#"expected "content-type" of "text/html", got "application/json""#
    );
    assert!(!later_ran.get());
}

#[test]
fn test_evaluation_follows_registration_order() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let record = |label: &'static str| {
        let order = Rc::clone(&order);
        check(move |_: &MockResponse| order.borrow_mut().push(label))
    };

    let result = outcome(
        spyrr(json_controller)
            .expect(record("first"))
            .expect(record("second"))
            .expect(record("third")),
    );

    assert_eq!(result, None);
    assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn test_predicate_panic_becomes_failure() {
    let failure = outcome(spyrr(json_controller).expect(check(|res: &MockResponse| {
        assert_eq!(res.status, Some(500), "status mismatch");
    })))
    .unwrap();

    assert!(failure.message.contains("status mismatch"));
}

#[test]
fn test_middleware_continuation() {
    let reached = Rc::new(Cell::new(false));
    let flag = Rc::clone(&reached);

    let completion = spyrr_with_next(|req, res, next| {
        if req.header("authorization").is_some() {
            next.call();
        } else {
            res.status(401).send("unauthorized");
        }
    })
    .headers(json!({"Authorization": "Bearer t"}))
    .next(move |_, _| flag.set(true))
    .end(|_, _| panic!("middleware should not respond"))
    .unwrap();

    assert!(reached.get());
    assert!(!completion.sent);
}

#[test]
fn test_middleware_rejection() {
    let failure = outcome(
        spyrr_with_next(|req, res, next| {
            if req.header("authorization").is_some() {
                next.call();
            } else {
                res.status(401).send("unauthorized");
            }
        })
        .expect((401, "unauthorized")),
    );

    assert_eq!(failure, None);
}

#[test]
fn test_missing_controller() {
    let result = harness().expect(200).end(|_, _| {});
    assert!(matches!(result, Err(ApplicationError::MissingController)));
}

#[test]
fn test_invalid_pattern_propagates() {
    fn build() -> ApplicationResult<Test> {
        Ok(spyrr(json_controller).expect(("content-type", Pattern::new("(json")?)))
    }

    let error = build().unwrap_err();
    assert!(matches!(error, ApplicationError::Domain(_)));
    assert!(error.to_string().contains("(json"));
}

#[test]
fn test_settings_preserve_header_case_and_pretty_print() {
    let settings = HarnessSettings {
        lowercase_header_values: false,
        pretty_diff: true,
    };

    let failure = outcome(
        harness_with(settings)
            .controller(|_, res| {
                res.status(200)
                    .set_header("Content-Type", "Application/JSON")
                    .send(json!({"ok": true}));
            })
            .expect(("content-type", "Application/JSON"))
            .expect(json!({"ok": false})),
    )
    .unwrap();

    assert_eq!(
        failure.message,
        "expected {\n  \"ok\": false\n} response body, got {\n  \"ok\": true\n}"
    );
}

#[test]
fn test_harness_from_env_uses_defaults() {
    // Assumes the SPYRR_* variables are unset in the test environment.
    let test = harness_from_env().controller(|_, res| {
        res.status(200)
            .set_header("Content-Type", "Text/Plain")
            .send("hi");
    });
    assert_eq!(outcome(test.expect(("content-type", "text/plain"))), None);
}
