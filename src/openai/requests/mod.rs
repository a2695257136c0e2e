extern crate serde;

pub mod evaluate;
pub mod generate;

use reqwest::header::{HeaderMap, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");
const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// One schema-constrained exchange with the exercise service.
///
/// A request declares the shape it expects back: the associated `Response`
/// type is the deserialization target and `schema` is the JSON schema the
/// service is held to. `validate` runs after deserialization for checks the
/// schema cannot express. The two implementations are module generation and
/// module evaluation.
pub trait Exchange {
    /// The shape the service must answer with.
    type Response: for<'de> Deserialize<'de>;

    /// Name under which the shape is declared to the service.
    const SHAPE: &'static str;

    /// System instructions framing the exchange.
    fn instructions(&self) -> Cow<'_, str>;

    /// Free-form user payload: the topic context, or the answered module.
    fn payload(&self) -> String;

    /// JSON schema the response must conform to.
    fn schema(&self) -> Value;

    /// Shape checks the schema cannot express. The default accepts
    /// everything.
    fn validate(&self, _response: &Self::Response) -> Result<(), String> {
        Ok(())
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(
            USER_AGENT,
            format!("{}/{} ({})", NAME, VERSION, REPO).parse().unwrap(),
        );

        headers
    }
}

impl<R: Exchange> Exchange for &R {
    type Response = R::Response;

    const SHAPE: &'static str = R::SHAPE;

    fn instructions(&self) -> Cow<'_, str> {
        (**self).instructions()
    }

    fn payload(&self) -> String {
        (**self).payload()
    }

    fn schema(&self) -> Value {
        (**self).schema()
    }

    fn validate(&self, response: &Self::Response) -> Result<(), String> {
        (**self).validate(response)
    }

    fn headers(&self) -> HeaderMap {
        (**self).headers()
    }
}

impl<R: Exchange> Exchange for &mut R {
    type Response = R::Response;

    const SHAPE: &'static str = R::SHAPE;

    fn instructions(&self) -> Cow<'_, str> {
        (**self).instructions()
    }

    fn payload(&self) -> String {
        (**self).payload()
    }

    fn schema(&self) -> Value {
        (**self).schema()
    }

    fn validate(&self, response: &Self::Response) -> Result<(), String> {
        (**self).validate(response)
    }

    fn headers(&self) -> HeaderMap {
        (**self).headers()
    }
}
