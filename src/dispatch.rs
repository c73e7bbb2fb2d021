//! Maps XML-RPC calls onto backend routes and renders the answers.

use std::fmt;

use crate::error::{Error, Result};
use crate::json;
use crate::xmlrpc::{self, to_string_map, CallRequest, DecodeOptions, StringMap, Value};

pub const CONTENT_TYPE: &str = "text/xml";

const HELLO_PATH: &str = "/1";
const INPUT_PATH: &str = "/cc";
const SUA_PATH: &str = "/sua";
const INT_PATH: &str = "/int";
const SUA_DEFAULT_NAME: &str = "minh";

/// A request to the backend, relative to its base URL.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Get { path: String, query: Vec<(String, String)> },
    Post { path: String, body: String },
}

impl Route {
    pub fn get(path: &str, key: &str, value: &str) -> Route {
        Route::Get {
            path: path.to_string(),
            query: vec![(key.to_string(), value.to_string())],
        }
    }

    pub fn post(path: &str, body: &str) -> Route {
        Route::Post {
            path: path.to_string(),
            body: body.to_string(),
        }
    }

    pub fn path(&self) -> &str {
        match *self {
            Route::Get { ref path, .. } | Route::Post { ref path, .. } => path,
        }
    }

    /// Full URL under `base`. Query values are passed through as given.
    pub fn url(&self, base: &str) -> String {
        let mut url = format!("{}{}", base.trim_end_matches('/'), self.path());
        if let Route::Get { ref query, .. } = *self {
            for (idx, (key, value)) in query.iter().enumerate() {
                url.push(if idx == 0 { '?' } else { '&' });
                url.push_str(key);
                url.push('=');
                url.push_str(value);
            }
        }
        url
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Route::Get { .. } => write!(f, "GET {}", self.url("")),
            Route::Post { ref path, ref body } => write!(f, "POST {} ({} bytes)", path, body.len()),
        }
    }
}

/// Something that answers routes with a decoded JSON body. `None` means an
/// empty body.
pub trait Backend {
    fn fetch(&self, route: &Route) -> Result<Option<Value>>;
}

impl<'a, B: Backend + ?Sized> Backend for &'a B {
    fn fetch(&self, route: &Route) -> Result<Option<Value>> {
        (**self).fetch(route)
    }
}

/// Answers every route with the same JSON body.
#[derive(Debug, Clone)]
pub struct ReplayBackend {
    base_url: String,
    body: String,
}

impl ReplayBackend {
    pub fn new(base_url: &str, body: &str) -> ReplayBackend {
        ReplayBackend {
            base_url: base_url.to_string(),
            body: body.to_string(),
        }
    }
}

impl Backend for ReplayBackend {
    fn fetch(&self, route: &Route) -> Result<Option<Value>> {
        debug!("replaying canned body for {}", route.url(&self.base_url));
        json::parse(&self.body).map_err(|e| Error::Backend(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
}

impl Status {
    pub fn code(&self) -> u16 {
        match *self {
            Status::Ok => 200,
            Status::BadRequest => 400,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Status::Ok => write!(f, "200 OK"),
            Status::BadRequest => write!(f, "400 Bad Request"),
        }
    }
}

/// What goes back to the XML-RPC client.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: Status,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn ok(body: String) -> Reply {
        Reply { status: Status::Ok, content_type: CONTENT_TYPE, body }
    }

    fn bad_request(body: String) -> Reply {
        Reply { status: Status::BadRequest, content_type: CONTENT_TYPE, body }
    }
}

/// The operations a call can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Hello,
    Input,
    Sua,
}

impl Operation {
    pub fn from_name(name: &str) -> Option<Operation> {
        match name {
            "hello" => Some(Operation::Hello),
            "input" => Some(Operation::Input),
            "sua" => Some(Operation::Sua),
            _ => None,
        }
    }

    /// The call parameter carrying this operation's argument.
    pub fn param_name(&self) -> &'static str {
        match *self {
            Operation::Hello | Operation::Sua => "name",
            Operation::Input => "input",
        }
    }
}

pub struct Dispatcher<B> {
    backend: B,
    options: DecodeOptions,
}

impl<B: Backend> Dispatcher<B> {
    pub fn new(backend: B) -> Dispatcher<B> {
        Dispatcher::with_options(backend, DecodeOptions::default())
    }

    pub fn with_options(backend: B, options: DecodeOptions) -> Dispatcher<B> {
        Dispatcher { backend, options }
    }

    fn fetch_map(&self, route: Route) -> Result<StringMap> {
        debug!("fetching {}", route);
        let body = self.backend.fetch(&route)?;
        Ok(to_string_map(body.as_ref().and_then(Value::as_struct)))
    }

    pub fn hello(&self, name: Option<&str>) -> Result<StringMap> {
        self.fetch_map(Route::get(HELLO_PATH, "name", name.unwrap_or("")))
    }

    pub fn input(&self, input: Option<&str>) -> Result<StringMap> {
        self.fetch_map(Route::post(INPUT_PATH, input.unwrap_or("")))
    }

    pub fn sua(&self, name: Option<&str>) -> Result<StringMap> {
        self.fetch_map(Route::get(SUA_PATH, "name", name.unwrap_or(SUA_DEFAULT_NAME)))
    }

    /// The backend answer as-is, without coercing members to text. An empty
    /// body is encoded as nil.
    pub fn int(&self, nam: Option<&str>) -> Result<Value> {
        let route = Route::get(INT_PATH, "nam", nam.unwrap_or(SUA_DEFAULT_NAME));
        debug!("fetching {}", route);
        Ok(self.backend.fetch(&route)?.unwrap_or(Value::Nil))
    }

    pub fn hello_xml(&self, name: Option<&str>) -> Result<String> {
        self.hello(name).map(|map| xmlrpc::response(&Value::from(map)))
    }

    pub fn input_xml(&self, input: Option<&str>) -> Result<String> {
        self.input(input).map(|map| xmlrpc::response(&Value::from(map)))
    }

    pub fn sua_xml(&self, name: Option<&str>) -> Result<String> {
        self.sua(name).map(|map| xmlrpc::response(&Value::from(map)))
    }

    pub fn int_xml(&self, nam: Option<&str>) -> Result<String> {
        self.int(nam).map(|value| xmlrpc::response(&value))
    }

    /// Runs an operation with the argument found in `request`.
    pub fn invoke(&self, operation: Operation, request: &CallRequest) -> Result<StringMap> {
        let argument = string_param(request, operation.param_name())?;
        match operation {
            Operation::Hello => self.hello(argument),
            Operation::Input => self.input(argument),
            Operation::Sua => self.sua(argument),
        }
    }

    fn call(&self, body: &str) -> Result<StringMap> {
        let request = self.options.parse_request(body)?;
        let method = request
            .method_name()
            .ok_or_else(|| Error::Dispatch("missing methodName".to_string()))?;
        debug!("dispatching XML-RPC method {:?}", method);
        let operation = Operation::from_name(method)
            .ok_or_else(|| Error::Dispatch(format!("Unknown method: {}", method)))?;
        self.invoke(operation, &request)
    }

    /// Handles a raw `methodCall`. Every failure comes back as a
    /// `BadRequest` reply whose body is an XML-RPC struct with one `error`
    /// member.
    pub fn handle(&self, body: &str) -> Reply {
        trace!("XMLRPC request body: {}", body);
        match self.call(body) {
            Ok(map) => Reply::ok(xmlrpc::response(&Value::from(map))),
            Err(e) => {
                warn!("rejecting XML-RPC request: {}", e);
                let message = format!("Failed to process XML-RPC request: {}", e);
                Reply::bad_request(xmlrpc::error_response(&message))
            }
        }
    }
}

// Absent and nil parameters both fall back to the operation's default.
fn string_param<'a>(request: &'a CallRequest, name: &str) -> Result<Option<&'a str>> {
    match request.param(name) {
        None | Some(Value::Nil) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(Error::Dispatch(format!(
            "parameter `{}` must be a string, got {}",
            name,
            other.type_tag()
        ))),
    }
}
