use std::rc::Rc;

use crate::error::FrontendError;
use crate::request::{ActionRequest, Method};

/// A request ready to go on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingRequest {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Called once with the raw response body, or the transport failure.
pub type Completion = Box<dyn FnOnce(Result<String, FrontendError>)>;

pub trait Transport {
    fn send(&self, request: OutgoingRequest, on_done: Completion);
}

pub trait Reload {
    fn reload(&self);
}

/// Sends action requests and reloads the page once a JSON response comes
/// back. Status codes are not inspected.
pub struct Dispatcher<T: Transport> {
    transport: T,
    reloader: Rc<dyn Reload>,
    csrf_header: String,
    csrf_token: Option<String>,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(
        transport: T,
        reloader: Rc<dyn Reload>,
        csrf_header: String,
        csrf_token: Option<String>,
    ) -> Self {
        Dispatcher {
            transport,
            reloader,
            csrf_header,
            csrf_token,
        }
    }

    pub fn prepare(&self, request: &ActionRequest) -> Result<OutgoingRequest, FrontendError> {
        let mut headers: Vec<(String, String)> = request
            .headers()
            .into_iter()
            .map(|(name, value)| (name.to_owned(), value.to_owned()))
            .collect();

        if request.needs_csrf() {
            let token = self
                .csrf_token
                .as_ref()
                .ok_or(FrontendError::MissingCsrfToken)?;
            headers.push((self.csrf_header.clone(), token.clone()));
        }

        Ok(OutgoingRequest {
            method: request.method(),
            path: request.path(),
            headers,
            body: request.body()?,
        })
    }

    /// Nothing is sent when the request cannot be prepared.
    pub fn dispatch(&self, request: ActionRequest) -> Result<(), FrontendError> {
        let outgoing = self.prepare(&request)?;
        log::debug!("sending {}", request);

        let reloader = self.reloader.clone();
        self.transport.send(
            outgoing,
            Box::new(move |result| match handle_response(result) {
                Ok(data) => {
                    log::info!("success: {} {}", request, data);
                    reloader.reload();
                }
                Err(err) => log::error!("{} failed: {}", request, err),
            }),
        );

        Ok(())
    }
}

/// The body must be JSON; its contents are opaque.
pub fn handle_response(
    result: Result<String, FrontendError>,
) -> Result<serde_json::Value, FrontendError> {
    let text = result?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posts::PostId;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Immediate {
        response: RefCell<Option<Result<String, FrontendError>>>,
        sent: RefCell<Vec<OutgoingRequest>>,
    }

    impl Transport for Immediate {
        fn send(&self, request: OutgoingRequest, on_done: Completion) {
            self.sent.borrow_mut().push(request);
            let response = self
                .response
                .borrow_mut()
                .take()
                .unwrap_or_else(|| Ok("{}".into()));
            on_done(response);
        }
    }

    #[derive(Default)]
    struct Counter(Cell<usize>);

    impl Reload for Counter {
        fn reload(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn dispatcher(token: Option<&str>) -> (Dispatcher<Immediate>, Rc<Counter>) {
        let counter = Rc::new(Counter::default());
        let dispatcher = Dispatcher::new(
            Immediate::default(),
            counter.clone(),
            "X-CSRF-Token".into(),
            token.map(String::from),
        );
        (dispatcher, counter)
    }

    #[test]
    fn csrf_header_on_mutations() {
        let (dispatcher, _) = dispatcher(Some("tok"));

        let delete = dispatcher
            .prepare(&ActionRequest::Delete { post_id: PostId(1) })
            .unwrap();
        assert_eq!(
            delete.headers,
            vec![("X-CSRF-Token".to_string(), "tok".to_string())]
        );

        let react = dispatcher
            .prepare(&ActionRequest::React {
                action: "unlike".into(),
                post_id: PostId(1),
            })
            .unwrap();
        assert!(react.headers.is_empty());
    }

    #[test]
    fn missing_token_sends_nothing() {
        let (dispatcher, counter) = dispatcher(None);

        let err = dispatcher
            .dispatch(ActionRequest::Delete { post_id: PostId(1) })
            .unwrap_err();

        assert!(matches!(err, FrontendError::MissingCsrfToken));
        assert!(dispatcher.transport.sent.borrow().is_empty());
        assert_eq!(counter.0.get(), 0);
    }

    #[test]
    fn json_reloads() {
        let (dispatcher, counter) = dispatcher(Some("tok"));
        dispatcher
            .dispatch(ActionRequest::Delete { post_id: PostId(1) })
            .unwrap();
        assert_eq!(counter.0.get(), 1);
    }

    #[test]
    fn non_json_does_not_reload() {
        let (dispatcher, counter) = dispatcher(Some("tok"));
        *dispatcher.transport.response.borrow_mut() = Some(Ok("<html>oops</html>".into()));

        dispatcher
            .dispatch(ActionRequest::Delete { post_id: PostId(1) })
            .unwrap();

        assert_eq!(dispatcher.transport.sent.borrow().len(), 1);
        assert_eq!(counter.0.get(), 0);
    }

    #[test]
    fn transport_error_does_not_reload() {
        let (dispatcher, counter) = dispatcher(Some("tok"));
        *dispatcher.transport.response.borrow_mut() =
            Some(Err(FrontendError::Transport("offline".into())));

        dispatcher
            .dispatch(ActionRequest::Delete { post_id: PostId(1) })
            .unwrap();

        assert_eq!(counter.0.get(), 0);
    }

    #[test]
    fn handle_response_is_opaque() {
        let value = handle_response(Ok(r#"{"error": "Post does not exist"}"#.into())).unwrap();
        assert_eq!(value["error"], "Post does not exist");
        assert!(matches!(
            handle_response(Ok(String::new())),
            Err(FrontendError::Parse(_))
        ));
    }
}
